//! # Dummy Backends
//!
//! No window, no pixels, no sound. They keep just enough state to be
//! useful in tests: the gfx backend records what it drew each frame and
//! the input backend is driven by an [`InputScript`].

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::rc::Rc;
use std::time::{Duration, Instant};

use myrmidon_shared::{Rgba, Vec2};

use super::{
    AudioBackend, AudioClip, Canvas, Clock, DepthOrder, Font, Image, InputBackend, KeyCode,
    MouseState, RenderBackend, SceneView, TextId, TextSpec, WindowBackend,
};
use crate::entity::{Entity, EntityId};
use crate::error::{MyrmidonError, MyrmidonResult};

fn require_file(path: &str) -> MyrmidonResult<()> {
    if Path::new(path).is_file() {
        Ok(())
    } else {
        Err(MyrmidonError::AssetLoad {
            path: path.to_owned(),
            reason: "file not found".into(),
        })
    }
}

// =============================================================================
// WINDOW
// =============================================================================

/// Clock measuring real frame time, optionally sleeping to the target rate.
#[derive(Debug)]
pub struct DummyClock {
    paced: bool,
    last: Instant,
    last_frame: Duration,
}

impl DummyClock {
    /// Creates a clock. Unpaced clocks never sleep.
    #[must_use]
    pub fn new(paced: bool) -> Self {
        Self {
            paced,
            last: Instant::now(),
            last_frame: Duration::ZERO,
        }
    }
}

impl Clock for DummyClock {
    fn tick(&mut self, target_fps: u32) {
        if self.paced && target_fps > 0 {
            let budget = Duration::from_secs_f64(1.0 / f64::from(target_fps));
            let elapsed = self.last.elapsed();
            if elapsed < budget {
                std::thread::sleep(budget - elapsed);
            }
        }
        let now = Instant::now();
        self.last_frame = now - self.last;
        self.last = now;
    }

    fn get_fps(&self) -> f64 {
        let secs = self.last_frame.as_secs_f64();
        if secs > 0.0 {
            1.0 / secs
        } else {
            0.0
        }
    }
}

/// Window that only remembers its resolution.
#[derive(Debug)]
pub struct DummyWindow {
    paced: bool,
    resolution: (u32, u32),
    next_font: u64,
}

impl DummyWindow {
    /// Window whose clock sleeps to the target frame rate.
    #[must_use]
    pub fn paced() -> Self {
        Self {
            paced: true,
            resolution: myrmidon_shared::DEFAULT_RESOLUTION,
            next_font: 0,
        }
    }

    /// Window whose clock runs as fast as possible.
    #[must_use]
    pub fn unpaced() -> Self {
        Self {
            paced: false,
            ..Self::paced()
        }
    }

    /// Current resolution
    #[must_use]
    pub const fn resolution(&self) -> (u32, u32) {
        self.resolution
    }
}

impl WindowBackend for DummyWindow {
    fn clock(&mut self) -> Box<dyn Clock> {
        Box::new(DummyClock::new(self.paced))
    }

    fn change_resolution(&mut self, resolution: (u32, u32)) -> MyrmidonResult<()> {
        self.resolution = resolution;
        Ok(())
    }

    fn load_font(&mut self, path: Option<&str>, size: u32) -> MyrmidonResult<Font> {
        if let Some(path) = path {
            require_file(path)?;
        }
        self.next_font += 1;
        Ok(Font {
            id: self.next_font,
            size,
        })
    }
}

// =============================================================================
// GFX
// =============================================================================

/// Render backend that records instead of drawing.
#[derive(Debug, Default)]
pub struct DummyGfx {
    depth: DepthOrder,
    scratch: Vec<EntityId>,
    last_drawn: Vec<EntityId>,
    texts: HashMap<TextId, TextSpec>,
    next_handle: u64,
    frames_drawn: u64,
    primitives: usize,
    resolution: Option<(u32, u32)>,
}

impl DummyGfx {
    /// Creates an empty backend
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Entities drawn in the last frame, in paint order.
    #[must_use]
    pub fn last_drawn(&self) -> &[EntityId] {
        &self.last_drawn
    }

    /// Frames drawn so far
    #[must_use]
    pub const fn frames_drawn(&self) -> u64 {
        self.frames_drawn
    }

    /// Canvas primitives drawn by custom-draw entities, in total.
    #[must_use]
    pub const fn primitives(&self) -> usize {
        self.primitives
    }

    /// Number of registered entities
    #[must_use]
    pub fn registered(&self) -> usize {
        self.depth.len()
    }

    /// Text currently written
    pub fn texts(&self) -> impl Iterator<Item = &TextSpec> {
        self.texts.values()
    }

    /// Last resolution change, if any.
    #[must_use]
    pub const fn resolution(&self) -> Option<(u32, u32)> {
        self.resolution
    }

    fn next_id(&mut self) -> u64 {
        self.next_handle += 1;
        self.next_handle
    }
}

impl Canvas for DummyGfx {
    fn draw_rectangle(&mut self, _top_left: Vec2, _size: Vec2, _colour: Rgba) {
        self.primitives += 1;
    }

    fn draw_line(&mut self, _from: Vec2, _to: Vec2, _colour: Rgba, _width: f64) {
        self.primitives += 1;
    }

    fn draw_circle(&mut self, _centre: Vec2, _radius: f64, _colour: Rgba, _filled: bool) {
        self.primitives += 1;
    }
}

impl RenderBackend for DummyGfx {
    fn register_entity(&mut self, id: EntityId, entity: &Entity) {
        self.depth.insert(id, entity.z());
    }

    fn remove_entity(&mut self, id: EntityId) {
        self.depth.remove(id);
    }

    fn alter_z(&mut self, id: EntityId, z: i32) {
        self.depth.set_z(id, z);
    }

    fn draw_entities(&mut self, scene: &SceneView<'_>) {
        let mut order = std::mem::take(&mut self.scratch);
        order.clear();
        order.extend_from_slice(self.depth.ordered());

        self.last_drawn.clear();
        for &id in &order {
            let Some(entity) = scene.get(id) else {
                continue;
            };
            if !entity.drawing() {
                continue;
            }
            if !entity.normal_draw() {
                entity.blueprint().draw(entity, self);
            }
            self.last_drawn.push(id);
        }

        self.scratch = order;
        self.frames_drawn += 1;
    }

    fn load_image(&mut self, path: &str) -> MyrmidonResult<Image> {
        require_file(path)?;
        Ok(Image {
            id: self.next_id(),
            width: 0,
            height: 0,
        })
    }

    fn new_image(&mut self, width: u32, height: u32, _colour: Rgba) -> MyrmidonResult<Image> {
        Ok(Image {
            id: self.next_id(),
            width,
            height,
        })
    }

    fn write_text(&mut self, text: &TextSpec) -> MyrmidonResult<TextId> {
        let id = TextId(self.next_id());
        self.texts.insert(id, text.clone());
        Ok(id)
    }

    fn delete_text(&mut self, text: TextId) {
        self.texts.remove(&text);
    }

    fn change_resolution(&mut self, resolution: (u32, u32)) {
        self.resolution = Some(resolution);
    }
}

// =============================================================================
// INPUT
// =============================================================================

#[derive(Debug, Default)]
struct ScriptState {
    pending_down: Vec<KeyCode>,
    pending_up: Vec<KeyCode>,
    held: HashSet<KeyCode>,
    released: HashSet<KeyCode>,
    mouse: MouseState,
    quit: bool,
}

/// Handle for feeding events to a [`DummyInput`] from outside the scheduler.
///
/// Events are queued and become visible at the next `process_input`.
#[derive(Clone, Debug, Default)]
pub struct InputScript(Rc<RefCell<ScriptState>>);

impl InputScript {
    /// Queues a key press.
    pub fn press(&self, key: KeyCode) {
        self.0.borrow_mut().pending_down.push(key);
    }

    /// Queues a key release.
    pub fn release(&self, key: KeyCode) {
        self.0.borrow_mut().pending_up.push(key);
    }

    /// Moves the mouse.
    pub fn move_mouse(&self, position: Vec2) {
        let mut state = self.0.borrow_mut();
        state.mouse.relative = position - state.mouse.position;
        state.mouse.position = position;
    }

    /// Sets the left button.
    pub fn set_left_button(&self, held: bool) {
        self.0.borrow_mut().mouse.left = held;
    }

    /// Asks the main loop to stop.
    pub fn request_quit(&self) {
        self.0.borrow_mut().quit = true;
    }
}

/// Input backend driven by an [`InputScript`].
#[derive(Debug, Default)]
pub struct DummyInput {
    script: InputScript,
}

impl DummyInput {
    /// Creates an input backend with no events.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle to queue events with.
    #[must_use]
    pub fn script(&self) -> InputScript {
        self.script.clone()
    }
}

impl InputBackend for DummyInput {
    fn process_input(&mut self) {
        let mut state = self.script.0.borrow_mut();
        let state = &mut *state;
        state.released.clear();
        for key in state.pending_up.drain(..) {
            if state.held.remove(&key) {
                state.released.insert(key);
            }
        }
        state.held.extend(state.pending_down.drain(..));
    }

    fn keyboard_key_down(&self, key: KeyCode) -> bool {
        self.script.0.borrow().held.contains(&key)
    }

    fn keyboard_key_released(&self, key: KeyCode) -> bool {
        self.script.0.borrow().released.contains(&key)
    }

    fn mouse(&self) -> MouseState {
        self.script.0.borrow().mouse
    }

    fn quit_requested(&self) -> bool {
        self.script.0.borrow().quit
    }
}

// =============================================================================
// AUDIO
// =============================================================================

/// Audio backend that checks files exist and plays nothing.
#[derive(Debug, Default)]
pub struct DummyAudio {
    next_clip: u64,
}

impl DummyAudio {
    /// Creates the backend
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl AudioBackend for DummyAudio {
    fn load_audio(&mut self, path: &str) -> MyrmidonResult<AudioClip> {
        require_file(path)?;
        self.next_clip += 1;
        Ok(AudioClip { id: self.next_clip })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_script_press_and_release() {
        let mut input = DummyInput::new();
        let script = input.script();

        script.press(32);
        assert!(!input.keyboard_key_down(32));
        input.process_input();
        assert!(input.keyboard_key_down(32));
        assert!(!input.keyboard_key_released(32));

        script.release(32);
        input.process_input();
        assert!(!input.keyboard_key_down(32));
        assert!(input.keyboard_key_released(32));

        input.process_input();
        assert!(!input.keyboard_key_released(32));
    }

    #[test]
    fn test_script_quit_and_mouse() {
        let input = DummyInput::new();
        let script = input.script();
        assert!(!input.quit_requested());
        script.move_mouse(Vec2::new(10.0, 20.0));
        script.request_quit();
        assert!(input.quit_requested());
        assert_eq!(input.mouse().position, Vec2::new(10.0, 20.0));
    }

    #[test]
    fn test_missing_assets_fail() {
        let mut gfx = DummyGfx::new();
        assert!(matches!(
            gfx.load_image("/no/such/image.png"),
            Err(MyrmidonError::AssetLoad { .. })
        ));
        let mut audio = DummyAudio::new();
        assert!(audio.load_audio("/no/such/sound.wav").is_err());
        let mut window = DummyWindow::unpaced();
        assert!(window.load_font(Some("/no/such/font.ttf"), 12).is_err());
        assert!(window.load_font(None, 12).is_ok());
    }

    #[test]
    fn test_text_lifecycle() {
        let mut gfx = DummyGfx::new();
        let id = gfx.write_text(&TextSpec::new("hi", Vec2::ZERO)).unwrap();
        assert_eq!(gfx.texts().count(), 1);
        gfx.delete_text(id);
        assert_eq!(gfx.texts().count(), 0);
    }

    #[test]
    fn test_unpaced_clock_reports_fps() {
        let mut clock = DummyClock::new(false);
        std::thread::sleep(Duration::from_millis(2));
        clock.tick(30);
        assert!(clock.get_fps() > 0.0);
    }
}
