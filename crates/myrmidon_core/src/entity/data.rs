//! # Entity Data
//!
//! Everything the scheduler knows about one entity: transform, visuals,
//! states, ownership links and collision configuration.
//!
//! Fields are read through getters. Changes after spawning go through an
//! [`EntityMut`](super::EntityMut) so the render backend is notified;
//! the setters here are for [`Blueprint::defaults`](crate::blueprint::Blueprint::defaults),
//! which runs before the entity is registered anywhere.

use std::any::Any;
use std::fmt;
use std::rc::Rc;

use myrmidon_shared::{Colour, Vec2};

use crate::backend::Image;
use crate::blueprint::Blueprint;
use crate::collision::{CollisionGeometry, CollisionShape};
use crate::entity::EntityId;
use crate::state::StateMachine;

/// Rectangular clip region in screen space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ClipRect {
    /// Top left corner
    pub position: Vec2,
    /// Width and height
    pub size: Vec2,
}

/// Intrusive ownership links. Children form a doubly linked list,
/// newest first.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TreeLinks {
    /// Entity that was executing when this one was spawned
    pub parent: Option<EntityId>,
    /// Newest child
    pub child: Option<EntityId>,
    /// Newer sibling
    pub prev_sibling: Option<EntityId>,
    /// Older sibling
    pub next_sibling: Option<EntityId>,
}

/// A scheduled actor.
pub struct Entity {
    id: EntityId,
    kind: &'static str,
    blueprint: Rc<dyn Blueprint>,

    // transform
    position: Vec2,
    z: i32,
    rotation: f64,
    scale: f64,
    centre_point: Option<Vec2>,
    flip_horizontal: bool,
    flip_vertical: bool,

    // visuals
    image: Option<Image>,
    image_seq: usize,
    colour: Colour,
    alpha: f64,
    blend: bool,
    drawing: bool,
    normal_draw: bool,
    clip: Option<ClipRect>,

    // scheduling
    pub(crate) states: StateMachine,
    executing: bool,
    priority: i32,
    destroyed: bool,

    pub(crate) links: TreeLinks,

    collision: CollisionShape,
    geometry: Option<CollisionGeometry>,

    data: Option<Box<dyn Any>>,
}

impl Entity {
    pub(crate) fn new(id: EntityId, blueprint: Rc<dyn Blueprint>) -> Self {
        Self {
            id,
            kind: blueprint.kind(),
            blueprint,
            position: Vec2::ZERO,
            z: 0,
            rotation: 0.0,
            scale: 1.0,
            centre_point: None,
            flip_horizontal: false,
            flip_vertical: false,
            image: None,
            image_seq: 0,
            colour: Colour::WHITE,
            alpha: 1.0,
            blend: false,
            drawing: true,
            normal_draw: true,
            clip: None,
            states: StateMachine::new(),
            executing: true,
            priority: 0,
            destroyed: false,
            links: TreeLinks::default(),
            collision: CollisionShape::default(),
            geometry: None,
            data: None,
        }
    }

    // =========================================================================
    // Identity
    // =========================================================================

    /// Handle of this entity
    #[inline]
    #[must_use]
    pub const fn id(&self) -> EntityId {
        self.id
    }

    /// Blueprint kind name, used for signalling by kind
    #[inline]
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        self.kind
    }

    /// Blueprint this entity was spawned from
    #[inline]
    #[must_use]
    pub fn blueprint(&self) -> &Rc<dyn Blueprint> {
        &self.blueprint
    }

    // =========================================================================
    // Transform
    // =========================================================================

    /// X position
    #[inline]
    #[must_use]
    pub const fn x(&self) -> f64 {
        self.position.x
    }

    /// Y position
    #[inline]
    #[must_use]
    pub const fn y(&self) -> f64 {
        self.position.y
    }

    /// Position
    #[inline]
    #[must_use]
    pub const fn position(&self) -> Vec2 {
        self.position
    }

    /// Depth; only affects paint order
    #[inline]
    #[must_use]
    pub const fn z(&self) -> i32 {
        self.z
    }

    /// Rotation in degrees
    #[inline]
    #[must_use]
    pub const fn rotation(&self) -> f64 {
        self.rotation
    }

    /// Uniform scale
    #[inline]
    #[must_use]
    pub const fn scale(&self) -> f64 {
        self.scale
    }

    /// Explicit centre point, if one was set
    #[inline]
    #[must_use]
    pub const fn explicit_centre_point(&self) -> Option<Vec2> {
        self.centre_point
    }

    /// Point the entity is drawn and rotated around, unscaled.
    ///
    /// Falls back to the middle of the image, then the middle of an
    /// explicit collision rectangle, then the origin.
    #[must_use]
    pub fn centre_point(&self) -> Vec2 {
        if let Some(centre) = self.centre_point {
            return centre;
        }
        if let Some(image) = self.image {
            return image.size() * 0.5;
        }
        match (self.collision.rectangle_width, self.collision.rectangle_height) {
            (Some(w), Some(h)) => Vec2::new(w / 2.0, h / 2.0),
            _ => Vec2::ZERO,
        }
    }

    /// Where the top left of the image lands on screen.
    #[must_use]
    pub fn screen_draw_position(&self) -> Vec2 {
        self.position - self.centre_point() * self.scale
    }

    /// Mirrored left to right
    #[inline]
    #[must_use]
    pub const fn flip_horizontal(&self) -> bool {
        self.flip_horizontal
    }

    /// Mirrored top to bottom
    #[inline]
    #[must_use]
    pub const fn flip_vertical(&self) -> bool {
        self.flip_vertical
    }

    // =========================================================================
    // Visuals
    // =========================================================================

    /// Current image
    #[inline]
    #[must_use]
    pub const fn image(&self) -> Option<Image> {
        self.image
    }

    /// Frame within an image sequence
    #[inline]
    #[must_use]
    pub const fn image_seq(&self) -> usize {
        self.image_seq
    }

    /// Tint
    #[inline]
    #[must_use]
    pub const fn colour(&self) -> Colour {
        self.colour
    }

    /// Opacity
    #[inline]
    #[must_use]
    pub const fn alpha(&self) -> f64 {
        self.alpha
    }

    /// Additive blending
    #[inline]
    #[must_use]
    pub const fn blend(&self) -> bool {
        self.blend
    }

    /// Visible; hidden entities keep executing
    #[inline]
    #[must_use]
    pub const fn drawing(&self) -> bool {
        self.drawing
    }

    /// Drawn as a plain image. When false the blueprint draws it.
    #[inline]
    #[must_use]
    pub const fn normal_draw(&self) -> bool {
        self.normal_draw
    }

    /// Clip region
    #[inline]
    #[must_use]
    pub const fn clip(&self) -> Option<ClipRect> {
        self.clip
    }

    // =========================================================================
    // Scheduling
    // =========================================================================

    /// Steps run only while this is true
    #[inline]
    #[must_use]
    pub const fn executing(&self) -> bool {
        self.executing
    }

    /// Higher priorities step earlier in each frame
    #[inline]
    #[must_use]
    pub const fn priority(&self) -> i32 {
        self.priority
    }

    /// Destroyed and waiting to be purged
    #[inline]
    #[must_use]
    pub const fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    /// Name of the running state
    #[inline]
    #[must_use]
    pub fn current_state(&self) -> &str {
        self.states.current()
    }

    /// Name of the state before the last transition
    #[inline]
    #[must_use]
    pub fn previous_state(&self) -> Option<&str> {
        self.states.previous()
    }

    /// Frames left asleep
    #[inline]
    #[must_use]
    pub const fn sleep_counter(&self) -> u32 {
        self.states.sleep_counter()
    }

    /// State bookkeeping
    #[inline]
    #[must_use]
    pub const fn states(&self) -> &StateMachine {
        &self.states
    }

    // =========================================================================
    // Ownership tree
    // =========================================================================

    /// Parent
    #[inline]
    #[must_use]
    pub const fn parent(&self) -> Option<EntityId> {
        self.links.parent
    }

    /// Newest child
    #[inline]
    #[must_use]
    pub const fn child(&self) -> Option<EntityId> {
        self.links.child
    }

    /// Newer sibling
    #[inline]
    #[must_use]
    pub const fn prev_sibling(&self) -> Option<EntityId> {
        self.links.prev_sibling
    }

    /// Older sibling
    #[inline]
    #[must_use]
    pub const fn next_sibling(&self) -> Option<EntityId> {
        self.links.next_sibling
    }

    /// All four links
    #[inline]
    #[must_use]
    pub const fn links(&self) -> TreeLinks {
        self.links
    }

    // =========================================================================
    // Collision
    // =========================================================================

    /// Collision configuration
    #[inline]
    #[must_use]
    pub const fn collision(&self) -> &CollisionShape {
        &self.collision
    }

    /// True while cached geometry is valid
    #[inline]
    #[must_use]
    pub const fn geometry_cached(&self) -> bool {
        self.geometry.is_some()
    }

    /// World-space geometry, computed on first use after a change.
    pub fn geometry(&mut self) -> CollisionGeometry {
        if let Some(geometry) = self.geometry {
            return geometry;
        }
        let geometry = CollisionGeometry::from_entity(self);
        self.geometry = Some(geometry);
        geometry
    }

    /// Forces geometry to be recomputed on next use.
    #[inline]
    pub fn invalidate_geometry(&mut self) {
        self.geometry = None;
    }

    // =========================================================================
    // User data
    // =========================================================================

    /// Data shared between this entity's routines, if it is a `T`.
    #[must_use]
    pub fn data<T: Any>(&self) -> Option<&T> {
        self.data.as_deref()?.downcast_ref()
    }

    /// Mutable access to user data, if it is a `T`.
    pub fn data_mut<T: Any>(&mut self) -> Option<&mut T> {
        self.data.as_deref_mut()?.downcast_mut()
    }

    /// Replaces user data.
    pub fn set_data<T: Any>(&mut self, value: T) {
        self.data = Some(Box::new(value));
    }

    /// Removes user data.
    pub fn take_data(&mut self) -> Option<Box<dyn Any>> {
        self.data.take()
    }

    // =========================================================================
    // Raw setters
    // =========================================================================

    /// Sets the position
    pub fn set_position(&mut self, position: Vec2) {
        self.position = position;
        self.geometry = None;
    }

    /// Sets the depth
    pub fn set_z(&mut self, z: i32) {
        self.z = z;
    }

    /// Sets the rotation
    pub fn set_rotation(&mut self, rotation: f64) {
        self.rotation = rotation;
        self.geometry = None;
    }

    /// Sets the scale
    pub fn set_scale(&mut self, scale: f64) {
        self.scale = scale;
        self.geometry = None;
    }

    /// Sets or clears the explicit centre point
    pub fn set_centre_point(&mut self, centre: Option<Vec2>) {
        self.centre_point = centre;
        self.geometry = None;
    }

    /// Sets mirroring
    pub fn set_flip(&mut self, horizontal: bool, vertical: bool) {
        self.flip_horizontal = horizontal;
        self.flip_vertical = vertical;
    }

    /// Sets the image
    pub fn set_image(&mut self, image: Option<Image>) {
        self.image = image;
        self.geometry = None;
    }

    /// Sets the sequence frame
    pub fn set_image_seq(&mut self, seq: usize) {
        self.image_seq = seq;
    }

    /// Sets the tint
    pub fn set_colour(&mut self, colour: Colour) {
        self.colour = colour;
    }

    /// Sets the opacity
    pub fn set_alpha(&mut self, alpha: f64) {
        self.alpha = alpha;
    }

    /// Sets additive blending
    pub fn set_blend(&mut self, blend: bool) {
        self.blend = blend;
    }

    /// Shows or hides
    pub fn set_drawing(&mut self, drawing: bool) {
        self.drawing = drawing;
    }

    /// Chooses plain or custom drawing
    pub fn set_normal_draw(&mut self, normal_draw: bool) {
        self.normal_draw = normal_draw;
    }

    /// Sets the clip region
    pub fn set_clip(&mut self, clip: Option<ClipRect>) {
        self.clip = clip;
    }

    /// Sets the step priority. Only use before spawning; afterwards go
    /// through [`EntityMut::set_priority`](super::EntityMut::set_priority)
    /// so the scheduler re-sorts.
    pub fn set_priority(&mut self, priority: i32) {
        self.priority = priority;
    }

    /// Replaces the collision configuration
    pub fn set_collision(&mut self, shape: CollisionShape) {
        self.collision = shape;
        self.geometry = None;
    }

    /// Turns collision on or off
    pub fn set_collision_enabled(&mut self, enabled: bool) {
        self.collision.enabled = enabled;
    }

    pub(crate) fn set_executing(&mut self, executing: bool) {
        self.executing = executing;
    }

    pub(crate) fn mark_destroyed(&mut self) {
        self.destroyed = true;
        self.executing = false;
    }
}

impl fmt::Debug for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Entity")
            .field("id", &self.id)
            .field("kind", &self.kind)
            .field("position", &self.position)
            .field("z", &self.z)
            .field("priority", &self.priority)
            .field("state", &self.states.current())
            .field("executing", &self.executing)
            .field("drawing", &self.drawing)
            .field("destroyed", &self.destroyed)
            .field("links", &self.links)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::Image;
    use crate::blueprint::RoutineBlueprint;
    use crate::collision::CollisionKind;

    fn entity() -> Entity {
        Entity::new(EntityId::new(0, 1), Rc::new(RoutineBlueprint::idle("probe")))
    }

    #[test]
    fn test_defaults() {
        let e = entity();
        assert_eq!(e.kind(), "probe");
        assert!((e.scale() - 1.0).abs() < f64::EPSILON);
        assert!((e.alpha() - 1.0).abs() < f64::EPSILON);
        assert_eq!(e.colour(), Colour::WHITE);
        assert!(e.drawing());
        assert!(e.normal_draw());
        assert!(e.executing());
        assert!(!e.collision().enabled);
        assert_eq!(e.collision().kind, CollisionKind::Rectangle);
        assert_eq!(e.current_state(), "execute");
    }

    #[test]
    fn test_centre_point_fallbacks() {
        let mut e = entity();
        assert_eq!(e.centre_point(), Vec2::ZERO);

        e.set_collision(CollisionShape::rectangle(10.0, 4.0));
        assert_eq!(e.centre_point(), Vec2::new(5.0, 2.0));

        e.set_image(Some(Image { id: 1, width: 32, height: 16 }));
        assert_eq!(e.centre_point(), Vec2::new(16.0, 8.0));

        e.set_centre_point(Some(Vec2::new(1.0, 1.0)));
        assert_eq!(e.centre_point(), Vec2::new(1.0, 1.0));
    }

    #[test]
    fn test_screen_draw_position() {
        let mut e = entity();
        e.set_image(Some(Image { id: 1, width: 20, height: 10 }));
        e.set_position(Vec2::new(100.0, 50.0));
        e.set_scale(2.0);
        assert_eq!(e.screen_draw_position(), Vec2::new(80.0, 40.0));
    }

    #[test]
    fn test_geometry_cache_invalidation() {
        let mut e = entity();
        e.set_collision(CollisionShape::circle(5.0));
        let _ = e.geometry();
        assert!(e.geometry_cached());

        e.set_position(Vec2::new(1.0, 1.0));
        assert!(!e.geometry_cached());
        let _ = e.geometry();

        e.set_rotation(10.0);
        assert!(!e.geometry_cached());
        let _ = e.geometry();

        e.set_scale(2.0);
        assert!(!e.geometry_cached());
        let _ = e.geometry();

        e.set_centre_point(Some(Vec2::ZERO));
        assert!(!e.geometry_cached());
        let _ = e.geometry();

        e.set_image(None);
        assert!(!e.geometry_cached());
    }

    #[test]
    fn test_scaled_circle_radius() {
        let mut e = entity();
        e.set_collision(CollisionShape::circle(5.0));
        e.set_scale(2.0);
        match e.geometry() {
            CollisionGeometry::Circle(c) => assert!((c.radius - 10.0).abs() < f64::EPSILON),
            other => panic!("unexpected geometry {other:?}"),
        }
    }

    #[test]
    fn test_image_derived_radius() {
        let mut e = entity();
        e.set_collision(CollisionShape {
            enabled: true,
            kind: CollisionKind::Circle,
            ..CollisionShape::default()
        });
        e.set_image(Some(Image { id: 1, width: 30, height: 30 }));
        e.set_scale(2.0);
        match e.geometry() {
            CollisionGeometry::Circle(c) => assert!((c.radius - 30.0).abs() < f64::EPSILON),
            other => panic!("unexpected geometry {other:?}"),
        }
    }

    #[test]
    fn test_user_data() {
        let mut e = entity();
        assert!(e.data::<u32>().is_none());
        e.set_data(5_u32);
        *e.data_mut::<u32>().unwrap() += 1;
        assert_eq!(e.data::<u32>(), Some(&6));
        assert!(e.data::<String>().is_none());
    }
}
