/// Camera and projection utilities
use nalgebra::{Point2, Point3, Vector3};

use crate::transform::Basis;

/// Projection mode for rendering
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectionMode {
    Perspective,
}

/// Minimum camera-space depth used for the perspective divide
const NEAR: f32 = 1e-3;

/// A projected point: surface coordinates plus camera-space depth
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenPoint {
    pub x: f32,
    pub y: f32,
    pub depth: f32,
}

impl ScreenPoint {
    pub fn point(&self) -> Point2<f32> {
        Point2::new(self.x, self.y)
    }
}

/// Camera looking at the origin with world +Z kept upright on screen
#[derive(Debug, Clone)]
pub struct Camera {
    pub eye: Point3<f32>,
    pub basis: Basis,
    pub zoom: f32,
    pub focal_length: f32,
    pub mode: ProjectionMode,
}

impl Camera {
    pub fn new(view_point: Vector3<f32>, zoom: f32, mode: ProjectionMode) -> Self {
        let mut camera = Self {
            eye: Point3::origin(),
            basis: Basis::look_at_origin(&Vector3::y(), &Vector3::z()),
            zoom,
            focal_length: 1.5,
            mode,
        };
        camera.look_at_origin_upright(view_point, zoom, mode);
        camera
    }

    /// Place the eye at `view_point`, face the origin and recompute the basis
    pub fn look_at_origin_upright(&mut self, view_point: Vector3<f32>, zoom: f32, mode: ProjectionMode) {
        self.eye = Point3::from(view_point);
        self.basis = Basis::look_at_origin(&view_point, &Vector3::z());
        self.zoom = zoom;
        self.mode = mode;
    }

    pub fn to_camera_space(&self, point: &Point3<f32>) -> Vector3<f32> {
        self.basis.to_local(&(point - self.eye))
    }

    /// Depth of a world point along the view direction
    pub fn depth(&self, point: &Point3<f32>) -> f32 {
        (point - self.eye).dot(&self.basis.forward)
    }

    /// Project a world point onto a `width` x `height` surface
    pub fn project(&self, point: &Point3<f32>, width: u32, height: u32) -> ScreenPoint {
        let local = self.to_camera_space(point);
        let half_w = width as f32 * 0.5;
        let half_h = height as f32 * 0.5;
        let scale = self.zoom * half_w.min(half_h);

        let z = local.z.max(NEAR);
        let nx = local.x * self.focal_length / z;
        let ny = local.y * self.focal_length / z;

        ScreenPoint {
            x: half_w + nx * scale,
            y: half_h - ny * scale,
            depth: local.z,
        }
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(Vector3::new(0.0, -2.2, 1.0), 1.0, ProjectionMode::Perspective)
    }
}
