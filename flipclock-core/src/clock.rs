/// Digit meshes, the flip state machine and the composed 3D clock
use nalgebra::{Matrix4, Point3, Vector3};
use std::f32::consts::{FRAC_PI_2, PI};

use crate::blinker::{BlinkerHandle, Ink};
use crate::geometry::Mesh;
use crate::glyph::{DigitSkin, GlyphLibrary};
use crate::interpolator::AnimationTables;
use crate::transform::{Axis, Transform};

/// Edge length of the clock cube
pub const CUBE_SIZE: f32 = 1.0;
/// Peak outward lift of a flipping card
pub const FLIP_LIFT: f32 = 0.12;
/// Gap between a cube face and the cards on it
const CARD_OFFSET: f32 = 0.01;
/// Glyph box (in glyph units) a card must fit, margins included
const GLYPH_BOX_WIDTH: f32 = 0.64;
const GLYPH_BOX_HEIGHT: f32 = 0.96;

pub const DIGIT_SLOTS: usize = 16;

/// Wall-clock fields fed to the clock
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClockTime {
    pub day: u8,
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
}

impl ClockTime {
    pub fn new(day: u8, hour: u8, minute: u8, second: u8) -> Self {
        Self {
            day,
            hour,
            minute,
            second,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SlotGroup {
    Days,
    Hours,
    Minutes,
    Seconds,
    Hundredths,
}

impl SlotGroup {
    pub const ALL: [SlotGroup; 5] = [
        SlotGroup::Days,
        SlotGroup::Hours,
        SlotGroup::Minutes,
        SlotGroup::Seconds,
        SlotGroup::Hundredths,
    ];
}

/// Which decimal digit of its group a slot shows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Place {
    Tens,
    Units,
}

impl Place {
    pub fn digit_of(self, value: u8) -> u8 {
        match self {
            Place::Tens => (value / 10) % 10,
            Place::Units => value % 10,
        }
    }
}

/// Days, hours and minutes are shown twice: on a side face (A) and on top (B)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SlotCopy {
    A,
    B,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SlotId {
    pub group: SlotGroup,
    pub place: Place,
    pub copy: SlotCopy,
}

impl SlotId {
    pub fn new(group: SlotGroup, place: Place, copy: SlotCopy) -> Self {
        Self { group, place, copy }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlipState {
    Idle(Option<u8>),
    Flipping {
        from: Option<u8>,
        to: Option<u8>,
        step: usize,
    },
}

/// Flip state of one digit card. `None` values are blank cards.
#[derive(Debug, Clone, Default)]
pub struct DigitMesh {
    value: Option<u8>,
    incoming: Option<u8>,
    step: usize,
    flipping: bool,
    pub ink_blinker: Option<BlinkerHandle>,
}

impl DigitMesh {
    pub fn blank() -> Self {
        Self::default()
    }

    /// Settled value (the old face while flipping)
    pub fn value(&self) -> Option<u8> {
        self.value
    }

    /// The value this card is showing or turning towards
    pub fn target(&self) -> Option<u8> {
        if self.flipping {
            self.incoming
        } else {
            self.value
        }
    }

    pub fn is_flipping(&self) -> bool {
        self.flipping
    }

    pub fn step(&self) -> usize {
        self.step
    }

    pub fn flip_state(&self) -> FlipState {
        if self.flipping {
            FlipState::Flipping {
                from: self.value,
                to: self.incoming,
                step: self.step,
            }
        } else {
            FlipState::Idle(self.value)
        }
    }

    /// Request `digit`; starts a flip and returns true only if it differs from the target.
    ///
    /// A change arriving mid-flip settles the running flip on its incoming
    /// face and turns again from step 0.
    pub fn set_digit(&mut self, digit: Option<u8>) -> bool {
        if digit == self.target() {
            return false;
        }
        if self.flipping {
            self.value = self.incoming;
        }
        self.incoming = digit;
        self.step = 0;
        self.flipping = true;
        true
    }

    /// Show `digit` immediately, abandoning any flip
    pub fn snap(&mut self, digit: Option<u8>) {
        self.value = digit;
        self.incoming = digit;
        self.step = 0;
        self.flipping = false;
    }

    /// Advance one tick; returns true when this tick completes the flip
    pub fn advance(&mut self, flip_steps: usize) -> bool {
        if !self.flipping {
            return false;
        }
        self.step += 1;
        if self.step >= flip_steps {
            self.value = self.incoming;
            self.step = 0;
            self.flipping = false;
            return true;
        }
        false
    }

    /// Blinker ink while bound and running, otherwise `default`
    pub fn ink(&self, default: Ink) -> Ink {
        self.ink_blinker
            .as_ref()
            .and_then(|blinker| blinker.intensity())
            .unwrap_or(default)
    }
}

/// Where a card sits on the cube: a right-handed frame plus its size
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CardPlacement {
    pub center: Point3<f32>,
    pub right: Vector3<f32>,
    pub up: Vector3<f32>,
    pub normal: Vector3<f32>,
    pub width: f32,
    pub height: f32,
}

impl CardPlacement {
    /// Card on the cube face with outward `normal`, offset by (u, v) along (right, up)
    fn on_face(normal: Vector3<f32>, up: Vector3<f32>, u: f32, v: f32, width: f32, height: f32) -> Self {
        let right = up.cross(&normal);
        let center = normal * (CUBE_SIZE / 2.0 + CARD_OFFSET) + right * u + up * v;
        Self {
            center: Point3::from(center),
            right,
            up,
            normal,
            width,
            height,
        }
    }

    pub fn matrix(&self) -> Matrix4<f32> {
        Transform::frame_matrix(&self.center, &self.right, &self.up, &self.normal)
    }

    /// Uniform scale taking glyph units onto this card
    pub fn glyph_scale(&self) -> f32 {
        (self.width / GLYPH_BOX_WIDTH).min(self.height / GLYPH_BOX_HEIGHT)
    }
}

/// Card-space model matrix and the digit to paint on it for this frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SlotPose {
    pub model: Matrix4<f32>,
    pub digit: Option<u8>,
}

#[derive(Debug, Clone)]
pub struct DigitSlot {
    pub id: SlotId,
    pub mesh: DigitMesh,
    pub placement: CardPlacement,
}

impl DigitSlot {
    /// Current pose: a card turning about its horizontal axis while lifting off the face.
    ///
    /// The old face shows for the first quarter turn; past it the new face,
    /// pre-turned by half a turn, so it lands upright.
    pub fn pose(&self, tables: &AnimationTables) -> SlotPose {
        let base = self.placement.matrix();
        match self.mesh.flip_state() {
            FlipState::Idle(digit) => SlotPose { model: base, digit },
            FlipState::Flipping { from, to, step } => {
                let angle = PI * tables.flip_rotation.at(step);
                let lift = Vector3::new(0.0, 0.0, FLIP_LIFT * tables.flip_translation.at(step));
                let (turn, digit) = if angle < FRAC_PI_2 {
                    (angle, from)
                } else {
                    (angle - PI, to)
                };
                let flip = Transform::rotation(Axis::X, turn).with_translation(lift);
                SlotPose {
                    model: base * flip.matrix(),
                    digit,
                }
            }
        }
    }
}

fn layout() -> Vec<DigitSlot> {
    let z = Vector3::z();
    let top_up = -Vector3::y();
    let side = |group, copy, normal: Vector3<f32>| {
        [(Place::Tens, -0.22), (Place::Units, 0.22)].map(move |(place, u)| DigitSlot {
            id: SlotId::new(group, place, copy),
            mesh: DigitMesh::blank(),
            placement: CardPlacement::on_face(normal, z, u, 0.0, 0.4, 0.6),
        })
    };
    let top = |group, v: f32| {
        [(Place::Tens, -0.12), (Place::Units, 0.12)].map(move |(place, u)| DigitSlot {
            id: SlotId::new(group, place, SlotCopy::B),
            mesh: DigitMesh::blank(),
            placement: CardPlacement::on_face(z, top_up, u, v, 0.2, 0.28),
        })
    };
    let row = |group, v: f32, u: f32, width: f32, height: f32| {
        [(Place::Tens, -u), (Place::Units, u)].map(move |(place, u)| DigitSlot {
            id: SlotId::new(group, place, SlotCopy::A),
            mesh: DigitMesh::blank(),
            placement: CardPlacement::on_face(-Vector3::x(), z, u, v, width, height),
        })
    };

    let mut slots = Vec::with_capacity(DIGIT_SLOTS);
    slots.extend(side(SlotGroup::Days, SlotCopy::A, Vector3::y()));
    slots.extend(top(SlotGroup::Days, 0.32));
    slots.extend(side(SlotGroup::Hours, SlotCopy::A, Vector3::x()));
    slots.extend(top(SlotGroup::Hours, 0.0));
    slots.extend(side(SlotGroup::Minutes, SlotCopy::A, -Vector3::y()));
    slots.extend(top(SlotGroup::Minutes, -0.32));
    slots.extend(row(SlotGroup::Seconds, 0.16, 0.19, 0.34, 0.46));
    slots.extend(row(SlotGroup::Hundredths, -0.28, 0.15, 0.26, 0.34));
    slots
}

/// The whole clock: a cube carrying 16 digit cards.
///
/// Days are on +Y, hours on +X, minutes on -Y, seconds and hundredths on -X;
/// the top face repeats days, hours and minutes.
#[derive(Debug, Clone)]
pub struct Clock3D {
    slots: Vec<DigitSlot>,
    skin: DigitSkin,
    glyphs: GlyphLibrary,
    body: Mesh,
    time: Option<ClockTime>,
    millis: u32,
}

impl Clock3D {
    pub fn new(skin: DigitSkin) -> Self {
        Self {
            slots: layout(),
            skin,
            glyphs: GlyphLibrary::new(),
            body: Mesh::cube(CUBE_SIZE),
            time: None,
            millis: 0,
        }
    }

    pub fn skin(&self) -> DigitSkin {
        self.skin
    }

    pub fn cycle_skin(&mut self) -> DigitSkin {
        self.skin = self.skin.next();
        self.skin
    }

    pub fn glyphs(&self) -> &GlyphLibrary {
        &self.glyphs
    }

    pub fn body(&self) -> &Mesh {
        &self.body
    }

    /// Slots in draw order: days, hours, minutes, seconds, hundredths
    pub fn slots(&self) -> &[DigitSlot] {
        &self.slots
    }

    pub fn slot(&self, id: SlotId) -> Option<&DigitSlot> {
        self.slots.iter().find(|slot| slot.id == id)
    }

    pub fn group(&self, group: SlotGroup) -> impl Iterator<Item = &DigitSlot> + '_ {
        self.slots.iter().filter(move |slot| slot.id.group == group)
    }

    /// Last time supplied by [`Clock3D::set_time`]
    pub fn time(&self) -> Option<ClockTime> {
        self.time
    }

    pub fn hundredths(&self) -> u8 {
        (self.millis / 10) as u8
    }

    /// Decompose `time` into digits; returns how many slots started flipping
    pub fn set_time(&mut self, time: ClockTime) -> usize {
        self.time = Some(time);
        let mut flips = 0;
        for slot in &mut self.slots {
            let value = match slot.id.group {
                SlotGroup::Days => time.day,
                SlotGroup::Hours => time.hour,
                SlotGroup::Minutes => time.minute,
                SlotGroup::Seconds => time.second,
                SlotGroup::Hundredths => continue,
            };
            if slot.mesh.set_digit(Some(slot.id.place.digit_of(value))) {
                flips += 1;
            }
        }
        flips
    }

    /// Run the free hundredths counter forward by `elapsed_ms`; returns flips started
    pub fn advance_hundredths(&mut self, elapsed_ms: u32) -> usize {
        self.millis = (self.millis + elapsed_ms % 1000) % 1000;
        let hundredths = self.hundredths();
        let mut flips = 0;
        for slot in self
            .slots
            .iter_mut()
            .filter(|slot| slot.id.group == SlotGroup::Hundredths)
        {
            if slot.mesh.set_digit(Some(slot.id.place.digit_of(hundredths))) {
                flips += 1;
            }
        }
        flips
    }

    /// Step every running flip; returns how many completed this tick
    pub fn update_animation(&mut self, flip_steps: usize) -> usize {
        self.slots
            .iter_mut()
            .map(|slot| slot.mesh.advance(flip_steps))
            .filter(|done| *done)
            .count()
    }

    pub fn is_animating(&self) -> bool {
        self.slots.iter().any(|slot| slot.mesh.is_flipping())
    }

    /// Two-digit value a group is showing or turning towards (copy A)
    pub fn displayed_value(&self, group: SlotGroup) -> Option<u8> {
        let digit = |place| {
            self.slot(SlotId::new(group, place, SlotCopy::A))
                .and_then(|slot| slot.mesh.target())
        };
        Some(digit(Place::Tens)? * 10 + digit(Place::Units)?)
    }

    pub fn displayed_time(&self) -> Option<ClockTime> {
        Some(ClockTime::new(
            self.displayed_value(SlotGroup::Days)?,
            self.displayed_value(SlotGroup::Hours)?,
            self.displayed_value(SlotGroup::Minutes)?,
            self.displayed_value(SlotGroup::Seconds)?,
        ))
    }

    /// Bind (or with `None`, unbind) the blinker of every slot whose group passes `filter`
    pub fn bind_blinker<F>(&mut self, filter: F, blinker: Option<&BlinkerHandle>)
    where
        F: Fn(SlotGroup) -> bool,
    {
        for slot in self.slots.iter_mut().filter(|slot| filter(slot.id.group)) {
            slot.mesh.ink_blinker = blinker.cloned();
        }
    }
}

impl Default for Clock3D {
    fn default() -> Self {
        Self::new(DigitSkin::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blinker::Blinker;
    use std::collections::HashSet;

    const STEPS: usize = 50;

    fn flipping_groups(clock: &Clock3D) -> Vec<(SlotGroup, Place)> {
        clock
            .slots()
            .iter()
            .filter(|slot| slot.mesh.is_flipping() && slot.id.copy == SlotCopy::A)
            .map(|slot| (slot.id.group, slot.id.place))
            .collect()
    }

    fn settle(clock: &mut Clock3D) {
        for _ in 0..STEPS {
            clock.update_animation(STEPS);
        }
        assert!(!clock.is_animating());
    }

    #[test]
    fn test_layout_has_sixteen_unique_slots() {
        let clock = Clock3D::default();
        assert_eq!(clock.slots().len(), DIGIT_SLOTS);
        let ids: HashSet<_> = clock.slots().iter().map(|slot| slot.id).collect();
        assert_eq!(ids.len(), DIGIT_SLOTS);
        assert_eq!(clock.group(SlotGroup::Days).count(), 4);
        assert_eq!(clock.group(SlotGroup::Hours).count(), 4);
        assert_eq!(clock.group(SlotGroup::Minutes).count(), 4);
        assert_eq!(clock.group(SlotGroup::Seconds).count(), 2);
        assert_eq!(clock.group(SlotGroup::Hundredths).count(), 2);
    }

    #[test]
    fn test_slots_are_in_draw_order() {
        let clock = Clock3D::default();
        let order: Vec<_> = clock.slots().iter().map(|slot| slot.id.group).collect();
        let mut sorted = order.clone();
        sorted.sort_by_key(|group| SlotGroup::ALL.iter().position(|g| g == group));
        assert_eq!(order, sorted);
    }

    #[test]
    fn test_cards_sit_just_outside_their_face() {
        let clock = Clock3D::default();
        for slot in clock.slots() {
            let p = &slot.placement;
            assert!((p.right.cross(&p.up) - p.normal).norm() < 1e-6);
            let height = p.center.coords.dot(&p.normal);
            assert!((height - (CUBE_SIZE / 2.0 + CARD_OFFSET)).abs() < 1e-6);
            let reach_u = p.center.coords.dot(&p.right).abs() + p.width / 2.0;
            let reach_v = p.center.coords.dot(&p.up).abs() + p.height / 2.0;
            assert!(reach_u <= CUBE_SIZE / 2.0 && reach_v <= CUBE_SIZE / 2.0);
        }
    }

    #[test]
    fn test_set_time_decomposes_digits() {
        let mut clock = Clock3D::default();
        clock.set_time(ClockTime::new(7, 14, 5, 38));
        assert_eq!(clock.displayed_time(), Some(ClockTime::new(7, 14, 5, 38)));
        settle(&mut clock);
        assert_eq!(clock.displayed_time(), Some(ClockTime::new(7, 14, 5, 38)));
        let day_b = clock
            .slot(SlotId::new(SlotGroup::Days, Place::Units, SlotCopy::B))
            .unwrap();
        assert_eq!(day_b.mesh.value(), Some(7));
    }

    #[test]
    fn test_minute_rollover_flips_only_changed_digits() {
        let mut clock = Clock3D::default();
        clock.set_time(ClockTime::new(15, 23, 59, 59));
        settle(&mut clock);

        let flips = clock.set_time(ClockTime::new(15, 23, 0, 0));
        assert_eq!(clock.displayed_time(), Some(ClockTime::new(15, 23, 0, 0)));

        let flipping = flipping_groups(&clock);
        assert_eq!(
            flipping,
            vec![
                (SlotGroup::Minutes, Place::Tens),
                (SlotGroup::Minutes, Place::Units),
                (SlotGroup::Seconds, Place::Tens),
                (SlotGroup::Seconds, Place::Units),
            ]
        );
        // minute digits flip on both copies, seconds only once
        assert_eq!(flips, 6);
        assert!(clock.group(SlotGroup::Hours).all(|slot| !slot.mesh.is_flipping()));
        assert!(clock.group(SlotGroup::Days).all(|slot| !slot.mesh.is_flipping()));
    }

    #[test]
    fn test_update_animation_counts_finished_flips() {
        let mut clock = Clock3D::default();
        clock.set_time(ClockTime::new(15, 23, 59, 59));
        settle(&mut clock);
        assert_eq!(clock.set_time(ClockTime::new(15, 23, 0, 0)), 6);
        for _ in 1..STEPS {
            assert_eq!(clock.update_animation(STEPS), 0);
        }
        assert_eq!(clock.update_animation(STEPS), 6);
        assert!(!clock.is_animating());
        assert_eq!(clock.update_animation(STEPS), 0);
    }

    #[test]
    fn test_unchanged_digit_never_flips() {
        let mut clock = Clock3D::default();
        clock.set_time(ClockTime::new(3, 10, 20, 30));
        settle(&mut clock);
        assert_eq!(clock.set_time(ClockTime::new(3, 10, 20, 30)), 0);
        assert!(!clock.is_animating());

        assert_eq!(clock.set_time(ClockTime::new(3, 10, 20, 31)), 1);
        assert_eq!(
            flipping_groups(&clock),
            vec![(SlotGroup::Seconds, Place::Units)]
        );
    }

    #[test]
    fn test_flip_completes_after_exactly_n_ticks() {
        let mut mesh = DigitMesh::blank();
        mesh.snap(Some(4));
        assert!(mesh.set_digit(Some(5)));
        for tick in 1..STEPS {
            assert!(!mesh.advance(STEPS), "completed early at {}", tick);
            assert_eq!(mesh.flip_state(), FlipState::Flipping { from: Some(4), to: Some(5), step: tick });
        }
        assert!(mesh.advance(STEPS));
        assert_eq!(mesh.flip_state(), FlipState::Idle(Some(5)));
        for _ in 0..100 {
            assert!(!mesh.advance(STEPS));
            assert_eq!(mesh.value(), Some(5));
        }
    }

    #[test]
    fn test_change_mid_flip_restarts_from_incoming() {
        let mut mesh = DigitMesh::blank();
        mesh.snap(Some(1));
        mesh.set_digit(Some(2));
        mesh.advance(STEPS);
        mesh.advance(STEPS);
        assert!(mesh.set_digit(Some(3)));
        assert_eq!(mesh.flip_state(), FlipState::Flipping { from: Some(2), to: Some(3), step: 0 });
        assert!(!mesh.set_digit(Some(3)));
    }

    #[test]
    fn test_hundredths_wrap() {
        let mut clock = Clock3D::default();
        for _ in 0..28 {
            clock.advance_hundredths(35);
        }
        // 980 ms
        assert_eq!(clock.hundredths(), 98);
        clock.advance_hundredths(35);
        assert_eq!(clock.hundredths(), 1);
        assert_eq!(clock.displayed_value(SlotGroup::Hundredths), Some(1));
    }

    #[test]
    fn test_hundredths_survive_huge_elapsed() {
        let mut clock = Clock3D::default();
        clock.advance_hundredths(900);
        clock.advance_hundredths(u32::MAX);
        // (900 + 4294967295) % 1000 = 195
        assert_eq!(clock.hundredths(), 19);
        clock.advance_hundredths(u32::MAX);
        assert_eq!(clock.hundredths(), 49);
    }

    #[test]
    fn test_hundredths_units_turn_again_every_tick() {
        let mut clock = Clock3D::default();
        let units = |clock: &Clock3D| {
            clock
                .group(SlotGroup::Hundredths)
                .find(|slot| slot.id.place == Place::Units)
                .map(|slot| slot.mesh.flip_state())
                .unwrap()
        };
        clock.advance_hundredths(35);
        clock.update_animation(STEPS);

        for _ in 0..60 {
            let shown = match units(&clock) {
                FlipState::Flipping { to, .. } => to,
                FlipState::Idle(value) => value,
            };
            clock.advance_hundredths(35);
            let latest = Some(clock.hundredths() % 10);
            assert_eq!(units(&clock), FlipState::Flipping { from: shown, to: latest, step: 0 });
            clock.update_animation(STEPS);
            // settled on the previous tick's digit, one step into the next turn
            assert_eq!(units(&clock), FlipState::Flipping { from: shown, to: latest, step: 1 });
        }
    }

    #[test]
    fn test_flip_lift_follows_normal() {
        let tables = AnimationTables::new(STEPS, 75);
        let mut clock = Clock3D::default();
        clock.set_time(ClockTime::new(1, 1, 1, 1));
        settle(&mut clock);
        clock.set_time(ClockTime::new(1, 1, 1, 2));
        for _ in 0..STEPS / 2 {
            clock.update_animation(STEPS);
        }

        let id = SlotId::new(SlotGroup::Seconds, Place::Units, SlotCopy::A);
        let slot = clock.slot(id).unwrap();
        let pose = slot.pose(&tables);
        let center = pose.model.transform_point(&Point3::origin());
        let lift = (center - slot.placement.center).dot(&slot.placement.normal);
        let expected = FLIP_LIFT * tables.flip_translation.at(STEPS / 2);
        assert!((lift - expected).abs() < 1e-5);
        assert!(lift > 0.0);
    }

    #[test]
    fn test_pose_switches_face_halfway() {
        let tables = AnimationTables::new(STEPS, 75);
        let mut clock = Clock3D::default();
        clock.set_time(ClockTime::new(1, 1, 1, 1));
        settle(&mut clock);
        clock.set_time(ClockTime::new(1, 1, 1, 2));

        let id = SlotId::new(SlotGroup::Seconds, Place::Units, SlotCopy::A);
        let start = clock.slot(id).unwrap().pose(&tables);
        assert_eq!(start.digit, Some(1));
        assert!((start.model - clock.slot(id).unwrap().placement.matrix()).norm() < 1e-5);

        for _ in 0..STEPS - 1 {
            clock.update_animation(STEPS);
        }
        let late = clock.slot(id).unwrap().pose(&tables);
        assert_eq!(late.digit, Some(2));

        // the new face's normal points outwards again near the end
        let normal = late.model.transform_vector(&Vector3::z());
        assert!(normal.dot(&clock.slot(id).unwrap().placement.normal) > 0.9);
    }

    #[test]
    fn test_blinker_binding_and_fallback() {
        let mut clock = Clock3D::default();
        let blinker = Blinker::new();
        let handle = blinker.start(500, 500, Ink::FULL, Ink::HALF);
        clock.bind_blinker(|group| group == SlotGroup::Minutes, Some(&handle));

        let minutes: Vec<_> = clock.group(SlotGroup::Minutes).collect();
        assert!(minutes.iter().all(|slot| slot.mesh.ink_blinker.is_some()));
        assert!(clock.group(SlotGroup::Hours).all(|slot| slot.mesh.ink_blinker.is_none()));

        blinker.advance(std::time::Duration::from_millis(500));
        assert_eq!(minutes[0].mesh.ink(Ink::FULL), Ink::HALF);

        blinker.stop();
        assert_eq!(minutes[0].mesh.ink(Ink::FULL), Ink::FULL);
    }

    #[test]
    fn test_cycle_skin_does_not_flip() {
        let mut clock = Clock3D::new(DigitSkin::Segment);
        clock.set_time(ClockTime::new(1, 2, 3, 4));
        settle(&mut clock);
        assert_eq!(clock.cycle_skin(), DigitSkin::Curvy);
        assert!(!clock.is_animating());
    }
}
