//! Backend selection by name.
//!
//! Backends are resolved once at startup from the names in
//! [`BackendSelection`](crate::config::BackendSelection). Built in:
//!
//! | slot | names |
//! |---|---|
//! | window | `dummy` (paced clock), `headless` (unpaced) |
//! | gfx | `dummy` |
//! | input | `dummy`, `none` |
//! | audio | `dummy`, `none` |

use std::collections::HashMap;

use tracing::info;

use super::dummy::{DummyAudio, DummyGfx, DummyInput, DummyWindow};
use super::{AudioBackend, BackendKind, Backends, InputBackend, RenderBackend, WindowBackend};
use crate::config::GameConfig;
use crate::error::{MyrmidonError, MyrmidonResult};

type Ctor<T> = Box<dyn Fn(&GameConfig) -> MyrmidonResult<T>>;

/// Maps backend names to constructors.
pub struct BackendRegistry {
    window: HashMap<String, Ctor<Box<dyn WindowBackend>>>,
    gfx: HashMap<String, Ctor<Box<dyn RenderBackend>>>,
    input: HashMap<String, Ctor<Option<Box<dyn InputBackend>>>>,
    audio: HashMap<String, Ctor<Option<Box<dyn AudioBackend>>>>,
}

impl Default for BackendRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

impl BackendRegistry {
    /// A registry with no backends at all.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            window: HashMap::new(),
            gfx: HashMap::new(),
            input: HashMap::new(),
            audio: HashMap::new(),
        }
    }

    /// A registry with the dummy backends.
    #[must_use]
    pub fn with_builtins() -> Self {
        let mut registry = Self::empty();
        registry.register_window("dummy", |_| Ok(Box::new(DummyWindow::paced())));
        registry.register_window("headless", |_| Ok(Box::new(DummyWindow::unpaced())));
        registry.register_gfx("dummy", |_| Ok(Box::new(DummyGfx::new())));
        registry.register_input("dummy", |_| Ok(Some(Box::new(DummyInput::new()))));
        registry.register_input("none", |_| Ok(None));
        registry.register_audio("dummy", |_| Ok(Some(Box::new(DummyAudio::new()))));
        registry.register_audio("none", |_| Ok(None));
        registry
    }

    /// Adds or replaces a window backend.
    pub fn register_window(
        &mut self,
        name: &str,
        ctor: impl Fn(&GameConfig) -> MyrmidonResult<Box<dyn WindowBackend>> + 'static,
    ) {
        self.window.insert(name.to_owned(), Box::new(ctor));
    }

    /// Adds or replaces a render backend.
    pub fn register_gfx(
        &mut self,
        name: &str,
        ctor: impl Fn(&GameConfig) -> MyrmidonResult<Box<dyn RenderBackend>> + 'static,
    ) {
        self.gfx.insert(name.to_owned(), Box::new(ctor));
    }

    /// Adds or replaces an input backend. Constructors may return `None`.
    pub fn register_input(
        &mut self,
        name: &str,
        ctor: impl Fn(&GameConfig) -> MyrmidonResult<Option<Box<dyn InputBackend>>> + 'static,
    ) {
        self.input.insert(name.to_owned(), Box::new(ctor));
    }

    /// Adds or replaces an audio backend. Constructors may return `None`.
    pub fn register_audio(
        &mut self,
        name: &str,
        ctor: impl Fn(&GameConfig) -> MyrmidonResult<Option<Box<dyn AudioBackend>>> + 'static,
    ) {
        self.audio.insert(name.to_owned(), Box::new(ctor));
    }

    /// Names registered for a slot, sorted.
    #[must_use]
    pub fn names(&self, kind: BackendKind) -> Vec<&str> {
        let mut names: Vec<&str> = match kind {
            BackendKind::Window => self.window.keys().map(String::as_str).collect(),
            BackendKind::Gfx => self.gfx.keys().map(String::as_str).collect(),
            BackendKind::Input => self.input.keys().map(String::as_str).collect(),
            BackendKind::Audio => self.audio.keys().map(String::as_str).collect(),
        };
        names.sort_unstable();
        names
    }

    /// Constructs the backends named in `config`.
    ///
    /// # Errors
    /// `UnknownBackend` for a name with no constructor, or whatever a
    /// constructor returns.
    pub fn build(&self, config: &GameConfig) -> MyrmidonResult<Backends> {
        let names = &config.backends;
        let window_ctor = resolve(&self.window, BackendKind::Window, &names.window)?;
        let gfx_ctor = resolve(&self.gfx, BackendKind::Gfx, &names.gfx)?;
        let input_ctor = resolve(&self.input, BackendKind::Input, &names.input)?;
        let audio_ctor = resolve(&self.audio, BackendKind::Audio, &names.audio)?;

        let window = window_ctor(config)?;
        let gfx = gfx_ctor(config)?;
        let input = input_ctor(config)?;
        let audio = audio_ctor(config)?;

        info!(
            window = %names.window,
            gfx = %names.gfx,
            input = %names.input,
            audio = %names.audio,
            "Backends selected"
        );

        Ok(Backends {
            window,
            gfx,
            input,
            audio,
        })
    }
}

fn resolve<'r, T>(
    table: &'r HashMap<String, Ctor<T>>,
    kind: BackendKind,
    name: &str,
) -> MyrmidonResult<&'r Ctor<T>> {
    table.get(name).ok_or_else(|| MyrmidonError::UnknownBackend {
        kind,
        name: name.to_owned(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_names() {
        let registry = BackendRegistry::with_builtins();
        assert_eq!(registry.names(BackendKind::Window), vec!["dummy", "headless"]);
        assert_eq!(registry.names(BackendKind::Input), vec!["dummy", "none"]);
    }

    #[test]
    fn test_build_default_config() {
        let backends = BackendRegistry::with_builtins()
            .build(&GameConfig::default())
            .unwrap();
        assert!(backends.input.is_some());
        assert!(backends.audio.is_some());
    }

    #[test]
    fn test_build_headless_config() {
        let backends = BackendRegistry::with_builtins()
            .build(&GameConfig::headless())
            .unwrap();
        assert!(backends.input.is_none());
    }

    #[test]
    fn test_unknown_backend() {
        let mut config = GameConfig::default();
        config.backends.gfx = "opengl".into();
        let Err(err) = BackendRegistry::with_builtins().build(&config) else {
            panic!("expected an error");
        };
        assert!(matches!(
            err,
            MyrmidonError::UnknownBackend { kind: BackendKind::Gfx, ref name } if name == "opengl"
        ));
    }

    #[test]
    fn test_custom_backend() {
        let mut registry = BackendRegistry::empty();
        registry.register_window("w", |_| Ok(Box::new(DummyWindow::unpaced())));
        registry.register_gfx("g", |_| Ok(Box::new(DummyGfx::new())));
        registry.register_input("i", |_| Ok(None));
        registry.register_audio("a", |_| Ok(None));

        let mut config = GameConfig::default();
        config.backends.window = "w".into();
        config.backends.gfx = "g".into();
        config.backends.input = "i".into();
        config.backends.audio = "a".into();
        assert!(registry.build(&config).is_ok());
    }
}
