//! # Backends
//!
//! The scheduler talks to the outside world only through these traits:
//!
//! | Trait | Role |
//! |---|---|
//! | [`WindowBackend`] | window, frame clock, fonts |
//! | [`RenderBackend`] | entity registration, change notifications, drawing, images, text |
//! | [`InputBackend`] | once-per-frame polling, keyboard and mouse queries |
//! | [`AudioBackend`] | sound loading |
//!
//! Concrete backends are picked by name at startup through the
//! [`BackendRegistry`]. The [`dummy`] implementations do no I/O and are
//! what tests and headless runs use.

mod depth;
pub mod dummy;
mod registry;

pub use depth::DepthOrder;
pub use registry::BackendRegistry;

use std::fmt;

use myrmidon_shared::{Alignment, Colour, Rgba, Vec2};
use serde::{Deserialize, Serialize};

use crate::entity::{Entity, EntityArena, EntityId};
use crate::error::MyrmidonResult;

/// Backend slots.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BackendKind {
    /// Window and clock
    Window,
    /// Rendering
    Gfx,
    /// Input
    Input,
    /// Audio
    Audio,
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Window => "window",
            Self::Gfx => "gfx",
            Self::Input => "input",
            Self::Audio => "audio",
        })
    }
}

// =============================================================================
// HANDLES
// =============================================================================

/// Image owned by the render backend.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Image {
    /// Backend-specific id
    pub id: u64,
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
}

impl Image {
    /// Size as a vector
    #[must_use]
    pub fn size(&self) -> Vec2 {
        Vec2::new(f64::from(self.width), f64::from(self.height))
    }
}

/// Font owned by the window backend.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Font {
    /// Backend-specific id
    pub id: u64,
    /// Point size
    pub size: u32,
}

/// Sound owned by the audio backend.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct AudioClip {
    /// Backend-specific id
    pub id: u64,
}

/// Handle to text written through the render backend.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TextId(pub u64);

/// Text to be rendered.
#[derive(Clone, Debug, PartialEq)]
pub struct TextSpec {
    /// Font, or the backend default
    pub font: Option<Font>,
    /// Anchor position
    pub position: Vec2,
    /// Which point of the text sits on `position`
    pub alignment: Alignment,
    /// The string
    pub text: String,
    /// Depth
    pub z: i32,
    /// Tint
    pub colour: Colour,
    /// Opacity
    pub alpha: f64,
}

impl TextSpec {
    /// White, top-left aligned text at `position`.
    #[must_use]
    pub fn new(text: impl Into<String>, position: Vec2) -> Self {
        Self {
            font: None,
            position,
            alignment: Alignment::TopLeft,
            text: text.into(),
            z: 0,
            colour: Colour::WHITE,
            alpha: 1.0,
        }
    }
}

/// Backend key code.
pub type KeyCode = u32;

/// Snapshot of the mouse.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct MouseState {
    /// Cursor position
    pub position: Vec2,
    /// Movement since last frame
    pub relative: Vec2,
    /// Left button held
    pub left: bool,
    /// Middle button held
    pub middle: bool,
    /// Right button held
    pub right: bool,
    /// Wheel scrolled up this frame
    pub wheel_up: bool,
    /// Wheel scrolled down this frame
    pub wheel_down: bool,
}

// =============================================================================
// TRAITS
// =============================================================================

/// Frame pacing.
pub trait Clock {
    /// Waits out the rest of the frame at `target_fps`.
    fn tick(&mut self, target_fps: u32);

    /// Frame rate actually achieved.
    fn get_fps(&self) -> f64;
}

/// Window management.
pub trait WindowBackend {
    /// Creates the frame clock.
    fn clock(&mut self) -> Box<dyn Clock>;

    /// Resizes the window.
    ///
    /// # Errors
    /// Backend specific.
    fn change_resolution(&mut self, resolution: (u32, u32)) -> MyrmidonResult<()>;

    /// Loads a font, or the default one when `path` is `None`.
    ///
    /// # Errors
    /// `AssetLoad` if the font cannot be read.
    fn load_font(&mut self, path: Option<&str>, size: u32) -> MyrmidonResult<Font>;
}

/// Immediate-mode primitives for entities that draw themselves.
pub trait Canvas {
    /// Filled rectangle
    fn draw_rectangle(&mut self, top_left: Vec2, size: Vec2, colour: Rgba);

    /// Line segment
    fn draw_line(&mut self, from: Vec2, to: Vec2, colour: Rgba, width: f64);

    /// Circle, filled or outlined
    fn draw_circle(&mut self, centre: Vec2, radius: f64, colour: Rgba, filled: bool);
}

/// Rendering.
///
/// The `alter_*` methods are change notifications sent whenever an
/// entity's visual state changes. Backends that read entity state at draw
/// time can ignore them.
#[allow(unused_variables)]
pub trait RenderBackend: Canvas {
    /// A new entity exists.
    fn register_entity(&mut self, id: EntityId, entity: &Entity);

    /// An entity was destroyed. It must not be drawn again.
    fn remove_entity(&mut self, id: EntityId);

    /// X position changed
    fn alter_x(&mut self, id: EntityId, x: f64) {}
    /// Y position changed
    fn alter_y(&mut self, id: EntityId, y: f64) {}
    /// Depth changed
    fn alter_z(&mut self, id: EntityId, z: i32) {}
    /// Image changed
    fn alter_image(&mut self, id: EntityId, image: Option<Image>) {}
    /// Tint changed
    fn alter_colour(&mut self, id: EntityId, colour: Colour) {}
    /// Opacity changed
    fn alter_alpha(&mut self, id: EntityId, alpha: f64) {}
    /// Scale changed
    fn alter_scale(&mut self, id: EntityId, scale: f64) {}
    /// Rotation changed
    fn alter_rotation(&mut self, id: EntityId, rotation: f64) {}
    /// Visibility changed
    fn alter_display(&mut self, id: EntityId, drawing: bool) {}

    /// Called before drawing a frame.
    fn update_screen_pre(&mut self) {}

    /// Draws every visible entity, in the backend's own depth order.
    fn draw_entities(&mut self, scene: &SceneView<'_>);

    /// Called after drawing a frame.
    fn update_screen_post(&mut self) {}

    /// Loads an image from disk.
    ///
    /// # Errors
    /// `AssetLoad` if the image cannot be read.
    fn load_image(&mut self, path: &str) -> MyrmidonResult<Image>;

    /// Creates a blank image filled with `colour`.
    ///
    /// # Errors
    /// Backend specific.
    fn new_image(&mut self, width: u32, height: u32, colour: Rgba) -> MyrmidonResult<Image>;

    /// Renders text.
    ///
    /// # Errors
    /// `AssetLoad` if the font cannot be used.
    fn write_text(&mut self, text: &TextSpec) -> MyrmidonResult<TextId>;

    /// Removes text written earlier.
    fn delete_text(&mut self, text: TextId);

    /// The window was resized.
    fn change_resolution(&mut self, resolution: (u32, u32)) {}
}

/// Input polling.
pub trait InputBackend {
    /// Drains pending events. Called once per frame before logic.
    fn process_input(&mut self);

    /// True while `key` is held.
    fn keyboard_key_down(&self, key: KeyCode) -> bool;

    /// True on the frame `key` was let go.
    fn keyboard_key_released(&self, key: KeyCode) -> bool;

    /// Mouse snapshot.
    fn mouse(&self) -> MouseState;

    /// True once the user asked to close the window.
    fn quit_requested(&self) -> bool {
        false
    }
}

/// Sound loading.
pub trait AudioBackend {
    /// Loads a sound file.
    ///
    /// # Errors
    /// `AssetLoad` if the file cannot be read.
    fn load_audio(&mut self, path: &str) -> MyrmidonResult<AudioClip>;
}

/// The set of backends a scheduler runs on.
pub struct Backends {
    /// Window and clock
    pub window: Box<dyn WindowBackend>,
    /// Rendering
    pub gfx: Box<dyn RenderBackend>,
    /// Input, if any
    pub input: Option<Box<dyn InputBackend>>,
    /// Audio, if any
    pub audio: Option<Box<dyn AudioBackend>>,
}

impl Backends {
    /// Dummy backends everywhere, with a paced clock.
    #[must_use]
    pub fn dummy() -> Self {
        Self {
            window: Box::new(dummy::DummyWindow::paced()),
            gfx: Box::new(dummy::DummyGfx::new()),
            input: Some(Box::new(dummy::DummyInput::new())),
            audio: Some(Box::new(dummy::DummyAudio::new())),
        }
    }

    /// Unpaced dummy window and gfx, no input or audio.
    #[must_use]
    pub fn headless() -> Self {
        Self {
            window: Box::new(dummy::DummyWindow::unpaced()),
            gfx: Box::new(dummy::DummyGfx::new()),
            input: None,
            audio: None,
        }
    }

    /// Replaces the render backend.
    #[must_use]
    pub fn with_gfx(mut self, gfx: impl RenderBackend + 'static) -> Self {
        self.gfx = Box::new(gfx);
        self
    }

    /// Replaces the input backend.
    #[must_use]
    pub fn with_input(mut self, input: impl InputBackend + 'static) -> Self {
        self.input = Some(Box::new(input));
        self
    }
}

/// Read-only view of live entities handed to the render backend.
pub struct SceneView<'a> {
    arena: &'a EntityArena,
    live: &'a [EntityId],
}

impl<'a> SceneView<'a> {
    pub(crate) fn new(arena: &'a EntityArena, live: &'a [EntityId]) -> Self {
        Self { arena, live }
    }

    /// Looks up a live entity. Destroyed entities are not visible.
    #[must_use]
    pub fn get(&self, id: EntityId) -> Option<&'a Entity> {
        self.arena.get(id).filter(|e| !e.is_destroyed())
    }

    /// Live entities in scheduling order.
    pub fn iter(&self) -> impl Iterator<Item = &'a Entity> + '_ {
        self.live.iter().filter_map(|&id| self.get(id))
    }

    /// Number of live entities, including ones pending removal.
    #[must_use]
    pub fn len(&self) -> usize {
        self.live.len()
    }

    /// True if nothing is live.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.live.is_empty()
    }
}
