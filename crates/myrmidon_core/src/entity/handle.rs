//! Mutable access to a live entity.

use std::any::Any;
use std::ops::Deref;

use myrmidon_shared::{move_forward, Colour, Vec2};

use crate::backend::{Image, RenderBackend};
use crate::collision::CollisionShape;
use crate::entity::{ClipRect, Entity, EntityId};

/// Borrowed entity whose setters notify the render backend.
///
/// Obtained from [`Scheduler::entity_mut`](crate::scheduler::Scheduler::entity_mut)
/// or [`StepContext::entity_mut`](crate::scheduler::StepContext::entity_mut).
/// Reads go through `Deref` to [`Entity`].
pub struct EntityMut<'a> {
    pub(crate) id: EntityId,
    pub(crate) entity: &'a mut Entity,
    pub(crate) gfx: &'a mut dyn RenderBackend,
    pub(crate) priority_dirty: &'a mut bool,
}

impl Deref for EntityMut<'_> {
    type Target = Entity;

    fn deref(&self) -> &Entity {
        &*self.entity
    }
}

impl EntityMut<'_> {
    /// Sets X
    pub fn set_x(&mut self, x: f64) {
        let y = self.entity.y();
        self.entity.set_position(Vec2::new(x, y));
        self.gfx.alter_x(self.id, x);
    }

    /// Sets Y
    pub fn set_y(&mut self, y: f64) {
        let x = self.entity.x();
        self.entity.set_position(Vec2::new(x, y));
        self.gfx.alter_y(self.id, y);
    }

    /// Sets both coordinates
    pub fn set_position(&mut self, position: Vec2) {
        self.entity.set_position(position);
        self.gfx.alter_x(self.id, position.x);
        self.gfx.alter_y(self.id, position.y);
    }

    /// Moves by an offset
    pub fn move_by(&mut self, delta: Vec2) {
        let position = self.entity.position() + delta;
        self.set_position(position);
    }

    /// Moves `distance` units along `angle` degrees.
    pub fn move_forward(&mut self, distance: f64, angle: f64) {
        let position = move_forward(self.entity.position(), distance, angle);
        self.set_position(position);
    }

    /// Sets depth
    pub fn set_z(&mut self, z: i32) {
        self.entity.set_z(z);
        self.gfx.alter_z(self.id, z);
    }

    /// Sets rotation in degrees
    pub fn set_rotation(&mut self, rotation: f64) {
        self.entity.set_rotation(rotation);
        self.gfx.alter_rotation(self.id, rotation);
    }

    /// Sets scale
    pub fn set_scale(&mut self, scale: f64) {
        self.entity.set_scale(scale);
        self.gfx.alter_scale(self.id, scale);
    }

    /// Sets or clears the explicit centre point
    pub fn set_centre_point(&mut self, centre: Option<Vec2>) {
        self.entity.set_centre_point(centre);
    }

    /// Sets mirroring
    pub fn set_flip(&mut self, horizontal: bool, vertical: bool) {
        self.entity.set_flip(horizontal, vertical);
    }

    /// Sets the image
    pub fn set_image(&mut self, image: Option<Image>) {
        self.entity.set_image(image);
        self.gfx.alter_image(self.id, image);
    }

    /// Sets the sequence frame
    pub fn set_image_seq(&mut self, seq: usize) {
        self.entity.set_image_seq(seq);
    }

    /// Sets the tint
    pub fn set_colour(&mut self, colour: Colour) {
        self.entity.set_colour(colour);
        self.gfx.alter_colour(self.id, colour);
    }

    /// Sets opacity
    pub fn set_alpha(&mut self, alpha: f64) {
        self.entity.set_alpha(alpha);
        self.gfx.alter_alpha(self.id, alpha);
    }

    /// Sets additive blending
    pub fn set_blend(&mut self, blend: bool) {
        self.entity.set_blend(blend);
    }

    /// Shows or hides
    pub fn set_drawing(&mut self, drawing: bool) {
        self.entity.set_drawing(drawing);
        self.gfx.alter_display(self.id, drawing);
    }

    /// Chooses plain or custom drawing
    pub fn set_normal_draw(&mut self, normal_draw: bool) {
        self.entity.set_normal_draw(normal_draw);
    }

    /// Sets the clip region
    pub fn set_clip(&mut self, clip: Option<ClipRect>) {
        self.entity.set_clip(clip);
    }

    /// Sets the step priority. Entities are re-sorted before the next pass.
    pub fn set_priority(&mut self, priority: i32) {
        if self.entity.priority() != priority {
            self.entity.set_priority(priority);
            *self.priority_dirty = true;
        }
    }

    /// Replaces the collision configuration
    pub fn set_collision(&mut self, shape: CollisionShape) {
        self.entity.set_collision(shape);
    }

    /// Turns collision on or off
    pub fn set_collision_enabled(&mut self, enabled: bool) {
        self.entity.set_collision_enabled(enabled);
    }

    /// Mutable user data, if it is a `T`.
    pub fn data_mut<T: Any>(&mut self) -> Option<&mut T> {
        self.entity.data_mut()
    }

    /// Replaces user data.
    pub fn set_data<T: Any>(&mut self, value: T) {
        self.entity.set_data(value);
    }
}
