//! # Cooperative State Routines
//!
//! Each entity owns a set of named states. A state is a [`Routine`]: a
//! resumable computation that the scheduler advances by exactly one
//! [`Step`] per frame. Routines keep their own progress between steps,
//! typically as fields of a struct or variables captured by a closure.
//!
//! A routine that never returns from `resume` stalls the whole process.
//! Scheduling is cooperative and nothing preempts a running step.

use std::fmt;
use std::rc::Rc;

use myrmidon_shared::{Vec2, EXECUTE_STATE};

use crate::entity::EntityId;
use crate::error::MyrmidonResult;
use crate::scheduler::StepContext;

/// Outcome of advancing a routine by one step.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Step {
    /// Yield until next frame.
    Continue,
    /// Skip the next `n` frames, then resume. Zero behaves as `Continue`.
    SleepFor(u32),
    /// The routine has finished.
    ///
    /// With `None` the entity is destroyed. With the name of a state the
    /// entity already has, that state is resumed instead.
    Terminate(Option<String>),
}

impl Step {
    /// Finish and destroy the entity.
    #[must_use]
    pub const fn finish() -> Self {
        Self::Terminate(None)
    }

    /// Finish and hand over to another state.
    #[must_use]
    pub fn goto(state: impl Into<String>) -> Self {
        Self::Terminate(Some(state.into()))
    }
}

/// A resumable unit of entity logic.
pub trait Routine {
    /// Runs until the next suspension point.
    ///
    /// # Errors
    /// Errors propagate out of the frame and stop the main loop.
    fn resume(&mut self, ctx: &mut StepContext<'_>) -> MyrmidonResult<Step>;
}

impl<F> Routine for F
where
    F: FnMut(&mut StepContext<'_>) -> MyrmidonResult<Step>,
{
    fn resume(&mut self, ctx: &mut StepContext<'_>) -> MyrmidonResult<Step> {
        self(ctx)
    }
}

/// Boxes a closure as a routine.
///
/// Going through this function pins the closure's signature, which plain
/// `Box::new(|ctx| ...)` cannot infer.
pub fn routine<F>(f: F) -> Box<dyn Routine>
where
    F: FnMut(&mut StepContext<'_>) -> MyrmidonResult<Step> + 'static,
{
    Box::new(f)
}

/// Yields forever.
#[derive(Clone, Copy, Debug, Default)]
pub struct Idle;

impl Routine for Idle {
    fn resume(&mut self, _ctx: &mut StepContext<'_>) -> MyrmidonResult<Step> {
        Ok(Step::Continue)
    }
}

// =============================================================================
// STATE ARGUMENTS
// =============================================================================

/// A single argument passed to a state when it is (re)started.
#[derive(Clone, Debug, PartialEq)]
pub enum ArgValue {
    /// Integer
    Int(i64),
    /// Float
    Float(f64),
    /// Flag
    Bool(bool),
    /// Text
    Text(String),
    /// Point
    Point(Vec2),
    /// Another entity
    Entity(EntityId),
}

macro_rules! arg_from {
    ($($ty:ty => $variant:ident $(as $cast:ty)?),* $(,)?) => {
        $(
            impl From<$ty> for ArgValue {
                fn from(value: $ty) -> Self {
                    Self::$variant((value $(as $cast)?).into())
                }
            }
        )*
    };
}

arg_from! {
    i64 => Int,
    i32 => Int as i64,
    u32 => Int as i64,
    f64 => Float,
    bool => Bool,
    String => Text,
    &str => Text,
    Vec2 => Point,
    EntityId => Entity,
}

/// Positional arguments handed to a state factory.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StateArgs(Vec<ArgValue>);

impl StateArgs {
    /// No arguments
    #[must_use]
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    /// Appends an argument (builder style).
    #[must_use]
    pub fn with(mut self, value: impl Into<ArgValue>) -> Self {
        self.0.push(value.into());
        self
    }

    /// Number of arguments
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True if there are no arguments
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Raw access
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&ArgValue> {
        self.0.get(index)
    }

    /// Integer at `index`
    #[must_use]
    pub fn int(&self, index: usize) -> Option<i64> {
        match self.get(index)? {
            ArgValue::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// Float at `index`, widening integers
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn float(&self, index: usize) -> Option<f64> {
        match self.get(index)? {
            ArgValue::Float(v) => Some(*v),
            ArgValue::Int(v) => Some(*v as f64),
            _ => None,
        }
    }

    /// Flag at `index`
    #[must_use]
    pub fn bool(&self, index: usize) -> Option<bool> {
        match self.get(index)? {
            ArgValue::Bool(v) => Some(*v),
            _ => None,
        }
    }

    /// Text at `index`
    #[must_use]
    pub fn text(&self, index: usize) -> Option<&str> {
        match self.get(index)? {
            ArgValue::Text(v) => Some(v),
            _ => None,
        }
    }

    /// Point at `index`
    #[must_use]
    pub fn point(&self, index: usize) -> Option<Vec2> {
        match self.get(index)? {
            ArgValue::Point(v) => Some(*v),
            _ => None,
        }
    }

    /// Entity handle at `index`
    #[must_use]
    pub fn entity(&self, index: usize) -> Option<EntityId> {
        match self.get(index)? {
            ArgValue::Entity(v) => Some(*v),
            _ => None,
        }
    }
}

impl From<Vec<ArgValue>> for StateArgs {
    fn from(values: Vec<ArgValue>) -> Self {
        Self(values)
    }
}

/// Builds [`StateArgs`] from a list of values.
///
/// ```rust,ignore
/// let args = state_args![3, 1.5, "left"];
/// ```
#[macro_export]
macro_rules! state_args {
    () => {
        $crate::state::StateArgs::new()
    };
    ($($value:expr),+ $(,)?) => {
        $crate::state::StateArgs::from(vec![$($crate::state::ArgValue::from($value)),+])
    };
}

// =============================================================================
// STATE MACHINE
// =============================================================================

/// Builds a fresh routine from arguments.
pub type StateFactory = Rc<dyn Fn(&StateArgs) -> Box<dyn Routine>>;

struct StateSlot {
    name: String,
    factory: Option<StateFactory>,
    routine: Option<Box<dyn Routine>>,
    started: bool,
    // bumped on every restart, so a routine taken out for stepping is not
    // put back over its own replacement
    epoch: u64,
}

/// Named states of one entity plus the current/previous bookkeeping.
pub struct StateMachine {
    slots: Vec<StateSlot>,
    current: String,
    previous: Option<String>,
    sleep_counter: u32,
}

impl Default for StateMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl StateMachine {
    /// Starts in the `execute` state with nothing instantiated.
    #[must_use]
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            current: EXECUTE_STATE.to_owned(),
            previous: None,
            sleep_counter: 0,
        }
    }

    /// Name of the current state
    #[must_use]
    pub fn current(&self) -> &str {
        &self.current
    }

    /// Name of the state before the last transition
    #[must_use]
    pub fn previous(&self) -> Option<&str> {
        self.previous.as_deref()
    }

    /// Frames left to sleep
    #[must_use]
    pub const fn sleep_counter(&self) -> u32 {
        self.sleep_counter
    }

    /// Sleeps for `frames` frames.
    pub fn set_sleep(&mut self, frames: u32) {
        self.sleep_counter = frames;
    }

    /// Consumes one frame of sleep. Returns true if the entity is asleep.
    pub fn tick_sleep(&mut self) -> bool {
        if self.sleep_counter > 0 {
            self.sleep_counter -= 1;
            true
        } else {
            false
        }
    }

    /// True if a state with this name has been registered or started.
    #[must_use]
    pub fn has_state(&self, name: &str) -> bool {
        self.slot(name).is_some()
    }

    /// True if the state has a live routine instance.
    #[must_use]
    pub fn is_started(&self, name: &str) -> bool {
        self.slot(name).is_some_and(|s| s.started)
    }

    /// Names of every known state, in registration order.
    pub fn state_names(&self) -> impl Iterator<Item = &str> {
        self.slots.iter().map(|s| s.name.as_str())
    }

    /// Registered factory for a state, if any.
    #[must_use]
    pub fn factory(&self, name: &str) -> Option<StateFactory> {
        self.slot(name).and_then(|s| s.factory.clone())
    }

    /// Installs a fresh routine for `name`, replacing any running one.
    pub fn install(&mut self, name: &str, factory: Option<StateFactory>, routine: Box<dyn Routine>) {
        let slot = self.slot_or_insert(name);
        if factory.is_some() {
            slot.factory = factory;
        }
        slot.routine = Some(routine);
        slot.started = true;
        slot.epoch += 1;
    }

    /// Makes `name` current, remembering the old one as previous.
    pub fn set_current(&mut self, name: &str) {
        let old = std::mem::replace(&mut self.current, name.to_owned());
        self.previous = Some(old);
    }

    /// Removes the routine of `name` for stepping.
    pub fn take(&mut self, name: &str) -> Option<(Box<dyn Routine>, u64)> {
        let slot = self.slot_mut(name)?;
        let routine = slot.routine.take()?;
        Some((routine, slot.epoch))
    }

    /// Returns a stepped routine, unless the state was restarted meanwhile.
    pub fn restore(&mut self, name: &str, routine: Box<dyn Routine>, epoch: u64) {
        if let Some(slot) = self.slot_mut(name) {
            if slot.epoch == epoch && slot.routine.is_none() {
                slot.routine = Some(routine);
            }
        }
    }

    /// Marks a routine as run to completion.
    pub fn finish(&mut self, name: &str, epoch: u64) {
        if let Some(slot) = self.slot_mut(name) {
            if slot.epoch == epoch {
                slot.started = false;
                slot.routine = None;
            }
        }
    }

    fn slot(&self, name: &str) -> Option<&StateSlot> {
        self.slots.iter().find(|s| s.name == name)
    }

    fn slot_mut(&mut self, name: &str) -> Option<&mut StateSlot> {
        self.slots.iter_mut().find(|s| s.name == name)
    }

    fn slot_or_insert(&mut self, name: &str) -> &mut StateSlot {
        let index = match self.slots.iter().position(|s| s.name == name) {
            Some(index) => index,
            None => {
                self.slots.push(StateSlot {
                    name: name.to_owned(),
                    factory: None,
                    routine: None,
                    started: false,
                    epoch: 0,
                });
                self.slots.len() - 1
            }
        };
        &mut self.slots[index]
    }
}

impl fmt::Debug for StateMachine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateMachine")
            .field("current", &self.current)
            .field("previous", &self.previous)
            .field("sleep_counter", &self.sleep_counter)
            .field("states", &self.state_names().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_args_macro() {
        let id = EntityId::new(1, 1);
        let args = state_args![3, 1.5, "left", true, Vec2::new(1.0, 2.0), id];
        assert_eq!(args.len(), 6);
        assert_eq!(args.int(0), Some(3));
        assert_eq!(args.float(0), Some(3.0));
        assert_eq!(args.float(1), Some(1.5));
        assert_eq!(args.text(2), Some("left"));
        assert_eq!(args.bool(3), Some(true));
        assert_eq!(args.point(4), Some(Vec2::new(1.0, 2.0)));
        assert_eq!(args.entity(5), Some(id));
        assert_eq!(args.int(2), None);
        assert!(state_args![].is_empty());
    }

    #[test]
    fn test_builder_args() {
        let args = StateArgs::new().with(7_i64).with("x");
        assert_eq!(args.int(0), Some(7));
        assert_eq!(args.text(1), Some("x"));
    }

    #[test]
    fn test_set_current_tracks_previous() {
        let mut machine = StateMachine::new();
        assert_eq!(machine.current(), EXECUTE_STATE);
        assert_eq!(machine.previous(), None);

        machine.set_current("jump");
        assert_eq!(machine.current(), "jump");
        assert_eq!(machine.previous(), Some(EXECUTE_STATE));
    }

    #[test]
    fn test_restore_skips_restarted_routine() {
        let mut machine = StateMachine::new();
        machine.install("walk", None, Box::new(Idle));

        let (routine, epoch) = machine.take("walk").unwrap();
        // restarted while the old instance was out
        machine.install("walk", None, Box::new(Idle));
        machine.restore("walk", routine, epoch);

        let (_, current_epoch) = machine.take("walk").unwrap();
        assert_eq!(current_epoch, epoch + 1);
    }

    #[test]
    fn test_finish_clears_started() {
        let mut machine = StateMachine::new();
        machine.install("walk", None, Box::new(Idle));
        let (_, epoch) = machine.take("walk").unwrap();
        machine.finish("walk", epoch);
        assert!(machine.has_state("walk"));
        assert!(!machine.is_started("walk"));
    }

    #[test]
    fn test_sleep_counter() {
        let mut machine = StateMachine::new();
        machine.set_sleep(2);
        assert!(machine.tick_sleep());
        assert!(machine.tick_sleep());
        assert!(!machine.tick_sleep());
    }
}
