/// Geometry primitives for 3D rendering
use nalgebra::{Point2, Point3, Vector3};

/// A planar, convex polygon referencing mesh vertices in counter-clockwise
/// order when seen from its front side
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Face {
    pub indices: Vec<usize>,
}

impl Face {
    pub fn new(indices: Vec<usize>) -> Self {
        Self { indices }
    }
}

/// Outward normal of a polygon (Newell's method)
pub fn polygon_normal(points: &[Point3<f32>]) -> Vector3<f32> {
    let mut normal = Vector3::zeros();
    for (i, a) in points.iter().enumerate() {
        let b = points[(i + 1) % points.len()];
        normal.x += (a.y - b.y) * (a.z + b.z);
        normal.y += (a.z - b.z) * (a.x + b.x);
        normal.z += (a.x - b.x) * (a.y + b.y);
    }
    normal.try_normalize(1e-12).unwrap_or_else(Vector3::zeros)
}

pub fn centroid(points: &[Point3<f32>]) -> Point3<f32> {
    let sum = points
        .iter()
        .fold(Vector3::zeros(), |acc, p| acc + p.coords);
    Point3::from(sum / points.len().max(1) as f32)
}

/// A 3D mesh composed of polygon faces over a shared vertex list
#[derive(Debug, Clone, Default)]
pub struct Mesh {
    pub vertices: Vec<Point3<f32>>,
    pub faces: Vec<Face>,
}

impl Mesh {
    pub fn with_capacity(vertices: usize, faces: usize) -> Self {
        Self {
            vertices: Vec::with_capacity(vertices),
            faces: Vec::with_capacity(faces),
        }
    }

    pub fn add_vertex(&mut self, vertex: Point3<f32>) -> usize {
        self.vertices.push(vertex);
        self.vertices.len() - 1
    }

    /// Append a polygon given by its own vertices
    pub fn add_polygon(&mut self, points: &[Point3<f32>]) -> usize {
        let indices = points.iter().map(|p| self.add_vertex(*p)).collect();
        self.faces.push(Face::new(indices));
        self.faces.len() - 1
    }

    /// Append a flat polygon given in the XY plane at height `z`
    pub fn add_planar_polygon(&mut self, points: &[Point2<f32>], z: f32) -> usize {
        let lifted: Vec<Point3<f32>> = points.iter().map(|p| Point3::new(p.x, p.y, z)).collect();
        self.add_polygon(&lifted)
    }

    pub fn face_points(&self, face: &Face) -> Vec<Point3<f32>> {
        face.indices.iter().map(|&i| self.vertices[i]).collect()
    }

    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    /// Axis-aligned cube centred on the origin with outward-facing quads
    pub fn cube(size: f32) -> Self {
        let h = size / 2.0;
        let mut mesh = Self::with_capacity(8, 6);
        for &(x, y, z) in &[
            (-h, -h, -h),
            (h, -h, -h),
            (h, h, -h),
            (-h, h, -h),
            (-h, -h, h),
            (h, -h, h),
            (h, h, h),
            (-h, h, h),
        ] {
            mesh.add_vertex(Point3::new(x, y, z));
        }

        // Front (-Y), back (+Y), bottom, top, right (+X), left (-X)
        for quad in [
            [0, 1, 5, 4],
            [2, 3, 7, 6],
            [0, 3, 2, 1],
            [4, 5, 6, 7],
            [1, 2, 6, 5],
            [3, 0, 4, 7],
        ] {
            mesh.faces.push(Face::new(quad.to_vec()));
        }

        mesh
    }

    /// Rectangle of `width` x `height` centred on the origin in the XY plane, facing +Z
    pub fn quad(width: f32, height: f32) -> Self {
        let (w, h) = (width / 2.0, height / 2.0);
        let mut mesh = Self::with_capacity(4, 1);
        mesh.add_planar_polygon(
            &[
                Point2::new(-w, -h),
                Point2::new(w, -h),
                Point2::new(w, h),
                Point2::new(-w, h),
            ],
            0.0,
        );
        mesh
    }
}
