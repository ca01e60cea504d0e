/// Vector helpers, axis rotations and rigid transforms
use nalgebra::{Matrix4, Point3, Rotation3, Unit, Vector3};
use std::f32::consts::PI;

/// One full turn, in radians
pub const FULL_TURN: f32 = 2.0 * PI;

/// Wrap an angle into the canonical range [-PI, PI).
pub fn normalize_angle(angle: f32) -> f32 {
    let wrapped = (angle + PI).rem_euclid(FULL_TURN) - PI;
    // rem_euclid may round up to the modulus itself
    if wrapped >= PI {
        wrapped - FULL_TURN
    } else {
        wrapped
    }
}

/// Shortest signed angular distance from `from` to `to`
pub fn angle_delta(from: f32, to: f32) -> f32 {
    normalize_angle(to - from)
}

/// Principal axes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    pub fn unit(self) -> Vector3<f32> {
        match self {
            Axis::X => Vector3::x(),
            Axis::Y => Vector3::y(),
            Axis::Z => Vector3::z(),
        }
    }

    pub fn unit_axis(self) -> Unit<Vector3<f32>> {
        match self {
            Axis::X => Vector3::x_axis(),
            Axis::Y => Vector3::y_axis(),
            Axis::Z => Vector3::z_axis(),
        }
    }
}

pub fn scale(k: f32, v: &Vector3<f32>) -> Vector3<f32> {
    v * k
}

/// Rotate `v` about a principal axis by `angle` radians (right-handed)
pub fn rotate_axis(v: &Vector3<f32>, axis: Axis, angle: f32) -> Vector3<f32> {
    Rotation3::from_axis_angle(&axis.unit_axis(), angle) * v
}

/// Orthonormal camera basis
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Basis {
    pub forward: Vector3<f32>,
    pub up: Vector3<f32>,
    pub right: Vector3<f32>,
}

impl Basis {
    /// Basis looking from `view_point` towards the origin, keeping `up_hint` on screen up.
    ///
    /// When the view direction is parallel to the hint another principal axis
    /// stands in for it, so the result is always orthonormal.
    pub fn look_at_origin(view_point: &Vector3<f32>, up_hint: &Vector3<f32>) -> Self {
        let forward = (-view_point)
            .try_normalize(1e-9)
            .unwrap_or_else(|| -Vector3::y());

        let mut right = forward.cross(up_hint);
        if right.norm() < 1e-6 {
            let fallback = if up_hint.y.abs() < 0.9 {
                Vector3::y()
            } else {
                Vector3::x()
            };
            right = forward.cross(&fallback);
        }
        let right = right.normalize();
        let up = right.cross(&forward);

        Self { forward, up, right }
    }

    /// Express a world-space offset in (right, up, forward) coordinates
    pub fn to_local(&self, v: &Vector3<f32>) -> Vector3<f32> {
        Vector3::new(v.dot(&self.right), v.dot(&self.up), v.dot(&self.forward))
    }
}

/// A rotation about one principal axis, optionally scaled and translated.
///
/// Applied as scale, then rotation, then translation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub axis: Axis,
    pub angle: f32,
    pub scale: f32,
    pub translation: Vector3<f32>,
}

impl Transform {
    pub fn rotation(axis: Axis, angle: f32) -> Self {
        Self {
            axis,
            angle: normalize_angle(angle),
            scale: 1.0,
            translation: Vector3::zeros(),
        }
    }

    pub fn identity() -> Self {
        Self::rotation(Axis::Z, 0.0)
    }

    pub fn with_scale(mut self, scale: f32) -> Self {
        self.scale = scale;
        self
    }

    pub fn with_translation(mut self, translation: Vector3<f32>) -> Self {
        self.translation = translation;
        self
    }

    pub fn matrix(&self) -> Matrix4<f32> {
        Self::translation_matrix(&self.translation)
            * Self::rotation_matrix(self.axis, self.angle)
            * Self::scale_matrix(self.scale)
    }

    pub fn apply(&self, point: &Point3<f32>) -> Point3<f32> {
        self.matrix().transform_point(point)
    }

    pub fn rotation_matrix(axis: Axis, angle: f32) -> Matrix4<f32> {
        Matrix4::new_rotation(axis.unit() * angle)
    }

    pub fn translation_matrix(t: &Vector3<f32>) -> Matrix4<f32> {
        Matrix4::new_translation(t)
    }

    pub fn scale_matrix(k: f32) -> Matrix4<f32> {
        Matrix4::new_scaling(k)
    }

    /// Matrix mapping local (x, y, z) onto the frame (right, up, normal) placed at `origin`
    #[rustfmt::skip]
    pub fn frame_matrix(
        origin: &Point3<f32>,
        right: &Vector3<f32>,
        up: &Vector3<f32>,
        normal: &Vector3<f32>,
    ) -> Matrix4<f32> {
        Matrix4::new(
            right.x, up.x, normal.x, origin.x,
            right.y, up.y, normal.y, origin.y,
            right.z, up.z, normal.z, origin.z,
            0.0, 0.0, 0.0, 1.0,
        )
    }
}
