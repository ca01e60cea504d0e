/// Projection of the clock meshes onto a 2D drawing surface
use nalgebra::{Matrix4, Point2, Point3, Vector3};
use std::fmt;

use crate::blinker::Ink;
use crate::clock::Clock3D;
use crate::error::SettingError;
use crate::geometry::{centroid, polygon_normal, Mesh};
use crate::interpolator::AnimationTables;
use crate::projection::Camera;
use crate::transform::Transform;

/// Height of glyph polygons above their card, in card units
const GLYPH_OFFSET: f32 = 0.005;
const BODY_INK: Ink = Ink::new(12);
const CARD_INK: Ink = Ink::new(30);
const BODY_EDGE_INK: Ink = Ink::new(45);
const CARD_EDGE_INK: Ink = Ink::new(65);

/// How mesh faces are painted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TransparencyMode {
    /// Opaque faces, back faces culled, painted back to front
    #[default]
    Solid,
    /// Every face filled with see-through blending
    XRay,
    /// Edges only
    Wireframe,
}

impl TransparencyMode {
    pub fn next(self) -> Self {
        match self {
            TransparencyMode::Solid => TransparencyMode::XRay,
            TransparencyMode::XRay => TransparencyMode::Wireframe,
            TransparencyMode::Wireframe => TransparencyMode::Solid,
        }
    }
}

impl fmt::Display for TransparencyMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TransparencyMode::Solid => "solid",
            TransparencyMode::XRay => "x-ray",
            TransparencyMode::Wireframe => "wireframe",
        };
        f.write_str(name)
    }
}

impl From<TransparencyMode> for i32 {
    fn from(mode: TransparencyMode) -> i32 {
        match mode {
            TransparencyMode::Solid => 0,
            TransparencyMode::XRay => 1,
            TransparencyMode::Wireframe => 2,
        }
    }
}

impl TryFrom<i32> for TransparencyMode {
    type Error = SettingError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(TransparencyMode::Solid),
            1 => Ok(TransparencyMode::XRay),
            2 => Ok(TransparencyMode::Wireframe),
            other => Err(SettingError::UnknownTransparency(other)),
        }
    }
}

/// How a filled polygon combines with what is already on the surface
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Blend {
    Opaque,
    SeeThrough,
}

/// Drawable surface provided by the host
pub trait Canvas {
    /// Surface size in pixels (width, height)
    fn size(&self) -> (u32, u32);

    /// Fill a convex polygon
    fn fill_polygon(&mut self, points: &[Point2<f32>], ink: Ink, blend: Blend);

    fn draw_line(&mut self, from: Point2<f32>, to: Point2<f32>, ink: Ink);
}

/// Paint order class; lower layers are painted first in solid mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Layer {
    Body,
    Card,
    Glyph,
}

/// A face after projection
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectedFace {
    pub points: Vec<Point2<f32>>,
    pub depth: f32,
    /// Index of the digit slot owning the face; `None` for the body
    pub slot: Option<usize>,
    /// Depth of the owning slot's card centre, or the face depth for the body
    pub slot_depth: f32,
    pub layer: Layer,
    pub ink: Ink,
    pub edge_ink: Ink,
    pub front_facing: bool,
}

struct FaceCollector<'a> {
    camera: &'a Camera,
    width: u32,
    height: u32,
    /// Slot currently being collected and its depth
    slot: Option<(usize, f32)>,
    faces: Vec<ProjectedFace>,
}

impl FaceCollector<'_> {
    fn push(&mut self, world: &[Point3<f32>], layer: Layer, ink: Ink, edge_ink: Ink) {
        if world.len() < 3 {
            return;
        }
        let normal = polygon_normal(world);
        let front_facing = normal.dot(&(world[0] - self.camera.eye)) < 0.0;

        let points = world
            .iter()
            .map(|p| self.camera.project(p, self.width, self.height).point())
            .collect();

        let depth = self.camera.depth(&centroid(world));
        self.faces.push(ProjectedFace {
            points,
            depth,
            slot: self.slot.map(|(index, _)| index),
            slot_depth: self.slot.map_or(depth, |(_, slot_depth)| slot_depth),
            layer,
            ink,
            edge_ink,
            front_facing,
        });
    }

    fn push_mesh(&mut self, mesh: &Mesh, model: &Matrix4<f32>, layer: Layer, ink: Ink, edge_ink: Ink) {
        for face in &mesh.faces {
            let world: Vec<_> = mesh
                .face_points(face)
                .iter()
                .map(|p| model.transform_point(p))
                .collect();
            self.push(&world, layer, ink, edge_ink);
        }
    }
}

/// Project every face of the clock for the current frame, in draw order
pub fn project_clock(
    clock: &Clock3D,
    camera: &Camera,
    tables: &AnimationTables,
    width: u32,
    height: u32,
) -> Vec<ProjectedFace> {
    let mut collector = FaceCollector {
        camera,
        width,
        height,
        slot: None,
        faces: Vec::new(),
    };

    let body = Transform::identity().matrix();
    collector.push_mesh(clock.body(), &body, Layer::Body, BODY_INK, BODY_EDGE_INK);

    for (index, slot) in clock.slots().iter().enumerate() {
        let pose = slot.pose(tables);
        let placement = &slot.placement;
        let center = pose.model.transform_point(&Point3::origin());
        collector.slot = Some((index, camera.depth(&center)));

        let card = Mesh::quad(placement.width, placement.height);
        collector.push_mesh(&card, &pose.model, Layer::Card, CARD_INK, CARD_EDGE_INK);

        let ink = slot.mesh.ink(Ink::FULL);
        let on_card = Transform::identity()
            .with_scale(placement.glyph_scale())
            .with_translation(Vector3::new(0.0, 0.0, GLYPH_OFFSET));
        for outline in clock.glyphs().glyph(clock.skin(), pose.digit) {
            let world: Vec<_> = outline
                .iter()
                .map(|p| pose.model.transform_point(&on_card.apply(&Point3::new(p.x, p.y, 0.0))))
                .collect();
            collector.push(&world, Layer::Glyph, ink, ink);
        }
    }

    collector.faces
}

/// Paint the clock onto `canvas` in the given transparency mode.
///
/// Reads clock and camera state only; nothing is kept between frames.
pub fn render<C: Canvas + ?Sized>(
    canvas: &mut C,
    clock: &Clock3D,
    camera: &Camera,
    tables: &AnimationTables,
    mode: TransparencyMode,
) {
    let (width, height) = canvas.size();
    let mut faces = project_clock(clock, camera, tables, width, height);

    match mode {
        TransparencyMode::Solid => {
            faces.retain(|face| face.front_facing);
            sort_back_to_front(&mut faces);
            for face in &faces {
                canvas.fill_polygon(&face.points, face.ink, Blend::Opaque);
            }
        }
        TransparencyMode::XRay => {
            for face in &faces {
                canvas.fill_polygon(&face.points, face.ink, Blend::SeeThrough);
            }
        }
        TransparencyMode::Wireframe => {
            for face in &faces {
                let n = face.points.len();
                for i in 0..n {
                    canvas.draw_line(face.points[i], face.points[(i + 1) % n], face.edge_ink);
                }
            }
        }
    }
}

/// Painter's order for solid mode.
///
/// The body goes first. Each slot's card and glyphs then stay together as one
/// unit, slots farthest first, so a nearer card covers the glyphs of the
/// slots behind it. Within a unit the card is painted before its glyphs.
pub fn sort_back_to_front(faces: &mut [ProjectedFace]) {
    faces.sort_by(|a, b| {
        a.slot
            .is_some()
            .cmp(&b.slot.is_some())
            .then(b.slot_depth.total_cmp(&a.slot_depth))
            .then(a.slot.cmp(&b.slot))
            .then(a.layer.cmp(&b.layer))
            .then(b.depth.total_cmp(&a.depth))
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::{ClockTime, SlotGroup};
    use crate::glyph::DigitSkin;
    use crate::projection::ProjectionMode;
    use std::collections::HashSet;

    #[derive(Debug, Clone, PartialEq)]
    enum Op {
        Fill(Vec<Point2<f32>>, Ink, Blend),
        Line(Ink),
    }

    struct RecordingCanvas {
        ops: Vec<Op>,
    }

    impl Canvas for RecordingCanvas {
        fn size(&self) -> (u32, u32) {
            (144, 168)
        }

        fn fill_polygon(&mut self, points: &[Point2<f32>], ink: Ink, blend: Blend) {
            self.ops.push(Op::Fill(points.to_vec(), ink, blend));
        }

        fn draw_line(&mut self, _from: Point2<f32>, _to: Point2<f32>, ink: Ink) {
            self.ops.push(Op::Line(ink));
        }
    }

    fn scene() -> (Clock3D, Camera, AnimationTables) {
        let mut clock = Clock3D::new(DigitSkin::Segment);
        clock.set_time(ClockTime::new(18, 8, 8, 8));
        let tables = AnimationTables::new(50, 75);
        for _ in 0..50 {
            clock.update_animation(50);
        }
        let camera = Camera::new(Vector3::new(1.2, 1.5, 1.3), 1.25, ProjectionMode::Perspective);
        (clock, camera, tables)
    }

    fn record(mode: TransparencyMode) -> Vec<Op> {
        let (clock, camera, tables) = scene();
        let mut canvas = RecordingCanvas { ops: Vec::new() };
        render(&mut canvas, &clock, &camera, &tables, mode);
        canvas.ops
    }

    #[test]
    fn test_solid_culls_back_faces() {
        let (clock, camera, tables) = scene();
        let all = project_clock(&clock, &camera, &tables, 144, 168);
        let body_front = all
            .iter()
            .filter(|f| f.layer == Layer::Body && f.front_facing)
            .count();
        // viewed from a corner: three cube faces
        assert_eq!(body_front, 3);

        let ops = record(TransparencyMode::Solid);
        let fills = ops.iter().filter(|op| matches!(op, Op::Fill(_, _, Blend::Opaque))).count();
        assert_eq!(fills, all.iter().filter(|f| f.front_facing).count());
        assert!(fills < all.len());
    }

    /// Solid paint order of the current frame
    fn solid_order(clock: &Clock3D, camera: &Camera, tables: &AnimationTables) -> Vec<ProjectedFace> {
        let mut faces = project_clock(clock, camera, tables, 144, 168);
        faces.retain(|f| f.front_facing);
        sort_back_to_front(&mut faces);
        faces
    }

    fn inside_convex(polygon: &[Point2<f32>], p: &Point2<f32>) -> bool {
        let n = polygon.len();
        let sides: Vec<f32> = (0..n)
            .map(|i| {
                let a = polygon[i];
                let b = polygon[(i + 1) % n];
                (b - a).perp(&(p - a))
            })
            .collect();
        sides.iter().all(|s| *s > 0.0) || sides.iter().all(|s| *s < 0.0)
    }

    /// Each slot is one contiguous run, card before glyphs, body first, runs farthest first
    fn assert_slot_runs(faces: &[ProjectedFace]) {
        let body = faces.iter().take_while(|f| f.slot.is_none()).count();
        assert!(faces[..body].iter().all(|f| f.layer == Layer::Body));
        for pair in faces[..body].windows(2) {
            assert!(pair[0].depth >= pair[1].depth);
        }

        let mut finished = HashSet::new();
        for pair in faces[body..].windows(2) {
            let (a, b) = (&pair[0], &pair[1]);
            assert!(b.slot.is_some(), "body face after slot faces");
            if a.slot == b.slot {
                assert!(a.layer <= b.layer);
            } else {
                assert!(finished.insert(a.slot), "slot {:?} painted in two runs", a.slot);
                assert!(!finished.contains(&b.slot), "slot {:?} painted in two runs", b.slot);
                assert!(a.slot_depth >= b.slot_depth);
            }
        }
    }

    #[test]
    fn test_solid_paints_slots_back_to_front() {
        let (clock, camera, tables) = scene();
        let faces = solid_order(&clock, &camera, &tables);
        assert!(faces.iter().any(|f| f.layer == Layer::Glyph));
        assert_slot_runs(&faces);
    }

    #[test]
    fn test_flipping_cards_cover_glyphs_behind_them() {
        let tables = AnimationTables::new(50, 75);
        let camera = Camera::new(Vector3::new(1.2, 1.5, 1.3), 1.25, ProjectionMode::Perspective);
        let mut clock = Clock3D::new(DigitSkin::Segment);
        clock.set_time(ClockTime::new(11, 11, 11, 11));
        for _ in 0..50 {
            clock.update_animation(50);
        }
        clock.set_time(ClockTime::new(22, 22, 22, 22));

        for step in 0..=50 {
            let faces = solid_order(&clock, &camera, &tables);
            assert_slot_runs(&faces);

            // a glyph painted over another slot's card never belongs to a slot behind it
            for (i, card) in faces.iter().enumerate().filter(|(_, f)| f.layer == Layer::Card) {
                for glyph in faces[i + 1..]
                    .iter()
                    .filter(|f| f.layer == Layer::Glyph && f.slot != card.slot)
                {
                    if glyph.points.iter().any(|p| inside_convex(&card.points, p)) {
                        assert!(
                            glyph.slot_depth <= card.slot_depth,
                            "step {}: glyph of slot {:?} painted over nearer card of slot {:?}",
                            step,
                            glyph.slot,
                            card.slot
                        );
                    }
                }
            }
            clock.update_animation(50);
        }
        assert!(!clock.is_animating());
    }

    #[test]
    fn test_xray_fills_everything_see_through() {
        let (clock, camera, tables) = scene();
        let total = project_clock(&clock, &camera, &tables, 144, 168).len();
        let ops = record(TransparencyMode::XRay);
        assert_eq!(ops.len(), total);
        assert!(ops.iter().all(|op| matches!(op, Op::Fill(_, _, Blend::SeeThrough))));
    }

    #[test]
    fn test_wireframe_draws_only_edges() {
        let (clock, camera, tables) = scene();
        let edges: usize = project_clock(&clock, &camera, &tables, 144, 168)
            .iter()
            .map(|f| f.points.len())
            .sum();
        let ops = record(TransparencyMode::Wireframe);
        assert_eq!(ops.len(), edges);
        assert!(ops.iter().all(|op| matches!(op, Op::Line(_))));
    }

    #[test]
    fn test_blank_clock_draws_no_glyphs() {
        let clock = Clock3D::default();
        let tables = AnimationTables::new(50, 75);
        let camera = Camera::default();
        let faces = project_clock(&clock, &camera, &tables, 100, 100);
        assert!(faces.iter().all(|f| f.layer != Layer::Glyph));
        assert_eq!(faces.len(), 6 + clock.slots().len());
    }

    #[test]
    fn test_blinking_ink_reaches_glyphs() {
        let (mut clock, camera, tables) = scene();
        let blinker = crate::blinker::Blinker::new();
        let handle = blinker.start(250, 250, Ink::FULL, Ink::NONE);
        clock.bind_blinker(|g| g == SlotGroup::Minutes, Some(&handle));
        blinker.advance(std::time::Duration::from_millis(250));

        let faces = project_clock(&clock, &camera, &tables, 144, 168);
        let dark = faces
            .iter()
            .filter(|f| f.layer == Layer::Glyph && f.ink == Ink::NONE)
            .count();
        // "08" on both minute copies: 6 + 7 segments each
        assert_eq!(dark, 26);
    }

    #[test]
    fn test_transparency_settings_round_trip() {
        for mode in [TransparencyMode::Solid, TransparencyMode::XRay, TransparencyMode::Wireframe] {
            assert_eq!(TransparencyMode::try_from(i32::from(mode)), Ok(mode));
        }
        assert_eq!(
            TransparencyMode::try_from(7),
            Err(SettingError::UnknownTransparency(7))
        );
        assert_eq!(TransparencyMode::Wireframe.next(), TransparencyMode::Solid);
    }
}
