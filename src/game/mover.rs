use bevy::prelude::*;

/// Capsule mover contract: resolves a displacement against the world and reports the result.
pub trait CapsuleMover {
    /// Apply `displacement` to `position`, resolving collisions.
    fn move_by(&mut self, position: &mut Vec3, displacement: Vec3, dt: f32);
    /// Whether the last move ended in ground contact.
    fn is_grounded(&self) -> bool;
    /// Actual velocity of the last move after resolution.
    fn velocity(&self) -> Vec3;
}

/// Flat-ground mover with an optional circular boundary.
///
/// Ground is the plane `y = ground_height`; the boundary keeps the character within
/// `bounds_radius` of the origin on XZ. Both show up in the reported velocity.
#[derive(Component, Debug, Clone)]
pub struct PlaneMover {
    pub ground_height: f32,
    pub bounds_radius: Option<f32>,
    grounded: bool,
    velocity: Vec3,
}

impl PlaneMover {
    pub fn new(ground_height: f32) -> Self {
        Self {
            ground_height,
            bounds_radius: None,
            grounded: false,
            velocity: Vec3::ZERO,
        }
    }

    pub fn with_bounds(mut self, radius: f32) -> Self {
        self.bounds_radius = Some(radius);
        self
    }
}

impl Default for PlaneMover {
    fn default() -> Self {
        Self::new(0.0)
    }
}

impl CapsuleMover for PlaneMover {
    fn move_by(&mut self, position: &mut Vec3, displacement: Vec3, dt: f32) {
        let start = *position;
        let mut next = start + displacement;

        self.grounded = next.y <= self.ground_height;
        if self.grounded {
            next.y = self.ground_height;
        }

        if let Some(radius) = self.bounds_radius {
            let flat = Vec2::new(next.x, next.z);
            let dist = flat.length();
            if dist > radius && dist > 0.0 {
                // Push back inside
                let clamped = flat / dist * radius;
                next.x = clamped.x;
                next.z = clamped.y;
            }
        }

        *position = next;
        self.velocity = if dt > 0.0 { (next - start) / dt } else { Vec3::ZERO };
    }

    fn is_grounded(&self) -> bool {
        self.grounded
    }

    fn velocity(&self) -> Vec3 {
        self.velocity
    }
}
