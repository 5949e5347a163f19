//! # Blueprints
//!
//! A blueprint describes a kind of entity: its initial properties, the
//! routines behind its states, what happens when it is destroyed and, for
//! entities that do not render as a plain image, how to draw it.
//!
//! Spawning a blueprint creates one entity. Many entities may share a
//! blueprint; per-entity state lives in routines or entity user data.

use std::rc::Rc;

use crate::backend::Canvas;
use crate::entity::Entity;
use crate::error::MyrmidonResult;
use crate::scheduler::StepContext;
use crate::state::{Idle, Routine, StateArgs, StateFactory};

/// A kind of entity.
#[allow(unused_variables)]
pub trait Blueprint: 'static {
    /// Name used when signalling entities by kind.
    ///
    /// Defaults to the type name without its module path.
    fn kind(&self) -> &'static str {
        let full = std::any::type_name::<Self>();
        let base = full.split('<').next().unwrap_or(full);
        base.rsplit("::").next().unwrap_or(base)
    }

    /// Sets initial properties. Runs before the entity is registered.
    fn defaults(&self, entity: &mut Entity) {}

    /// Builds the routine for the initial `execute` state.
    fn execute(&self, args: &StateArgs) -> Box<dyn Routine>;

    /// Builds the routine for a named state on first use.
    ///
    /// Names this returns `None` for become idle states.
    fn state(&self, name: &str, args: &StateArgs) -> Option<Box<dyn Routine>> {
        None
    }

    /// True if `state` can build `name`. Override when building a
    /// routine just to ask is costly or has side effects.
    fn has_state(&self, name: &str) -> bool {
        self.state(name, &StateArgs::new()).is_some()
    }

    /// Called exactly once when the entity is destroyed.
    ///
    /// # Errors
    /// Errors propagate to whoever triggered the destruction.
    fn on_exit(&self, ctx: &mut StepContext<'_>) -> MyrmidonResult<()> {
        Ok(())
    }

    /// Draws the entity when its `normal_draw` flag is off.
    fn draw(&self, entity: &Entity, canvas: &mut dyn Canvas) {}
}

type DefaultsFn = Rc<dyn Fn(&mut Entity)>;

/// Blueprint assembled from closures, for small entities that do not
/// warrant their own type.
///
/// ```rust,ignore
/// let ticker = RoutineBlueprint::new("ticker", |_| {
///     let mut frames = 0;
///     routine(move |_ctx| {
///         frames += 1;
///         Ok(if frames < 10 { Step::Continue } else { Step::finish() })
///     })
/// });
/// scheduler.spawn(ticker)?;
/// ```
#[derive(Clone)]
pub struct RoutineBlueprint {
    kind: &'static str,
    execute: StateFactory,
    states: Vec<(String, StateFactory)>,
    defaults: Option<DefaultsFn>,
}

impl RoutineBlueprint {
    /// Blueprint whose `execute` state is built by `execute`.
    pub fn new(kind: &'static str, execute: impl Fn(&StateArgs) -> Box<dyn Routine> + 'static) -> Self {
        Self {
            kind,
            execute: Rc::new(execute),
            states: Vec::new(),
            defaults: None,
        }
    }

    /// Blueprint that idles forever.
    #[must_use]
    pub fn idle(kind: &'static str) -> Self {
        Self::new(kind, |_| Box::new(Idle))
    }

    /// Adds a named state.
    #[must_use]
    pub fn with_state(
        mut self,
        name: impl Into<String>,
        factory: impl Fn(&StateArgs) -> Box<dyn Routine> + 'static,
    ) -> Self {
        self.states.push((name.into(), Rc::new(factory)));
        self
    }

    /// Sets initial properties.
    #[must_use]
    pub fn with_defaults(mut self, defaults: impl Fn(&mut Entity) + 'static) -> Self {
        self.defaults = Some(Rc::new(defaults));
        self
    }
}

impl Blueprint for RoutineBlueprint {
    fn kind(&self) -> &'static str {
        self.kind
    }

    fn defaults(&self, entity: &mut Entity) {
        if let Some(defaults) = &self.defaults {
            defaults(entity);
        }
    }

    fn execute(&self, args: &StateArgs) -> Box<dyn Routine> {
        (self.execute)(args)
    }

    fn state(&self, name: &str, args: &StateArgs) -> Option<Box<dyn Routine>> {
        self.states
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, factory)| factory(args))
    }

    fn has_state(&self, name: &str) -> bool {
        self.states.iter().any(|(n, _)| n == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Spaceship;

    impl Blueprint for Spaceship {
        fn execute(&self, _args: &StateArgs) -> Box<dyn Routine> {
            Box::new(Idle)
        }
    }

    struct Wrapper<T>(T);

    impl<T: 'static> Blueprint for Wrapper<T> {
        fn execute(&self, _args: &StateArgs) -> Box<dyn Routine> {
            Box::new(Idle)
        }
    }

    #[test]
    fn test_default_kind_is_short_type_name() {
        assert_eq!(Spaceship.kind(), "Spaceship");
        assert_eq!(Wrapper(Spaceship).kind(), "Wrapper");
    }

    #[test]
    fn test_routine_blueprint_states() {
        let bp = RoutineBlueprint::idle("probe").with_state("hover", |_| Box::new(Idle));
        assert_eq!(bp.kind(), "probe");
        assert!(bp.state("hover", &StateArgs::new()).is_some());
        assert!(bp.state("dive", &StateArgs::new()).is_none());
        assert!(bp.has_state("hover"));
        assert!(!bp.has_state("dive"));
    }

    #[test]
    fn test_default_has_state_follows_state() {
        struct Lander;

        impl Blueprint for Lander {
            fn execute(&self, _args: &StateArgs) -> Box<dyn Routine> {
                Box::new(Idle)
            }

            fn state(&self, name: &str, _args: &StateArgs) -> Option<Box<dyn Routine>> {
                (name == "land").then(|| Box::new(Idle) as Box<dyn Routine>)
            }
        }

        assert!(Lander.has_state("land"));
        assert!(!Lander.has_state("orbit"));
        assert!(!Spaceship.has_state("land"));
    }
}
