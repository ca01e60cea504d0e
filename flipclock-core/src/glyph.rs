/// Digit glyph outlines ("skins") drawn on the clock cards
use nalgebra::{Point2, Vector2};
use std::fmt;
use std::str::FromStr;

/// A convex outline in glyph space, counter-clockwise
pub type Outline = Vec<Point2<f32>>;

/// Half extents of the glyph box; cards scale this to their own size
const HALF_WIDTH: f32 = 0.28;
const HALF_HEIGHT: f32 = 0.42;
const STROKE: f32 = 0.12;

/// Segment masks for a, b, c, d, e, f, g
const SEVEN_SEGMENT: [u8; 10] = [
    0b0111111, 0b0000110, 0b1011011, 0b1001111, 0b1100110,
    0b1101101, 0b1111101, 0b0000111, 0b1111111, 0b1101111,
];

/// 3x5 dot-matrix rows, top first, most significant bit on the left
const PIXEL_FONT: [[u8; 5]; 10] = [
    [0b111, 0b101, 0b101, 0b101, 0b111],
    [0b010, 0b110, 0b010, 0b010, 0b111],
    [0b111, 0b001, 0b111, 0b100, 0b111],
    [0b111, 0b001, 0b111, 0b001, 0b111],
    [0b101, 0b101, 0b111, 0b001, 0b001],
    [0b111, 0b100, 0b111, 0b001, 0b111],
    [0b111, 0b100, 0b111, 0b101, 0b111],
    [0b111, 0b001, 0b001, 0b001, 0b001],
    [0b111, 0b101, 0b111, 0b101, 0b111],
    [0b111, 0b101, 0b111, 0b001, 0b111],
];

/// How digits are drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DigitSkin {
    /// Rectangular seven-segment bars
    Segment,
    /// Seven-segment bars with pointed ends
    Curvy,
    /// 3x5 dot matrix
    Pixel,
}

impl DigitSkin {
    pub const ALL: [DigitSkin; 3] = [DigitSkin::Segment, DigitSkin::Curvy, DigitSkin::Pixel];

    pub fn next(self) -> Self {
        match self {
            DigitSkin::Segment => DigitSkin::Curvy,
            DigitSkin::Curvy => DigitSkin::Pixel,
            DigitSkin::Pixel => DigitSkin::Segment,
        }
    }

    fn index(self) -> usize {
        match self {
            DigitSkin::Segment => 0,
            DigitSkin::Curvy => 1,
            DigitSkin::Pixel => 2,
        }
    }

    /// Outlines for `digit`, built from scratch
    pub fn outlines(self, digit: u8) -> Vec<Outline> {
        match self {
            DigitSkin::Segment => segment_outlines(digit, false),
            DigitSkin::Curvy => segment_outlines(digit, true),
            DigitSkin::Pixel => pixel_outlines(digit),
        }
    }
}

impl Default for DigitSkin {
    fn default() -> Self {
        DigitSkin::Curvy
    }
}

impl fmt::Display for DigitSkin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DigitSkin::Segment => "segment",
            DigitSkin::Curvy => "curvy",
            DigitSkin::Pixel => "pixel",
        };
        f.write_str(name)
    }
}

impl FromStr for DigitSkin {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "segment" => Ok(DigitSkin::Segment),
            "curvy" => Ok(DigitSkin::Curvy),
            "pixel" => Ok(DigitSkin::Pixel),
            other => Err(format!("unknown digit skin '{}'", other)),
        }
    }
}

/// Seven-segment endpoints: a, b, c, d, e, f, g
fn segment_endpoints() -> [(Point2<f32>, Point2<f32>); 7] {
    let (w, h) = (HALF_WIDTH - STROKE / 2.0, HALF_HEIGHT - STROKE / 2.0);
    let tl = Point2::new(-w, h);
    let tr = Point2::new(w, h);
    let ml = Point2::new(-w, 0.0);
    let mr = Point2::new(w, 0.0);
    let bl = Point2::new(-w, -h);
    let br = Point2::new(w, -h);
    [
        (tl, tr),
        (tr, mr),
        (mr, br),
        (br, bl),
        (bl, ml),
        (ml, tl),
        (ml, mr),
    ]
}

/// Bar from `p` to `q` with the given stroke; `pointed` gives hexagonal ends
fn bar(p: Point2<f32>, q: Point2<f32>, stroke: f32, pointed: bool) -> Outline {
    let d = (q - p).normalize();
    let n = Vector2::new(-d.y, d.x);
    let h = stroke / 2.0;
    if pointed {
        let gap = 0.015;
        let p = p + d * gap;
        let q = q - d * gap;
        vec![
            p,
            p + d * h - n * h,
            q - d * h - n * h,
            q,
            q - d * h + n * h,
            p + d * h + n * h,
        ]
    } else {
        let gap = h + 0.02;
        let p = p + d * gap;
        let q = q - d * gap;
        vec![p - n * h, q - n * h, q + n * h, p + n * h]
    }
}

fn segment_outlines(digit: u8, pointed: bool) -> Vec<Outline> {
    let mask = SEVEN_SEGMENT[(digit % 10) as usize];
    segment_endpoints()
        .iter()
        .enumerate()
        .filter(|(i, _)| mask & (1 << i) != 0)
        .map(|(_, &(p, q))| bar(p, q, STROKE, pointed))
        .collect()
}

fn pixel_outlines(digit: u8) -> Vec<Outline> {
    let rows = PIXEL_FONT[(digit % 10) as usize];
    let cell_w = 2.0 * HALF_WIDTH / 3.0;
    let cell_h = 2.0 * HALF_HEIGHT / 5.0;
    let margin = 0.015;

    let mut outlines = Vec::new();
    for (row, bits) in rows.iter().enumerate() {
        for col in 0..3 {
            if bits & (0b100 >> col) == 0 {
                continue;
            }
            let x0 = -HALF_WIDTH + col as f32 * cell_w + margin;
            let x1 = x0 + cell_w - 2.0 * margin;
            let y1 = HALF_HEIGHT - row as f32 * cell_h - margin;
            let y0 = y1 - cell_h + 2.0 * margin;
            outlines.push(vec![
                Point2::new(x0, y0),
                Point2::new(x1, y0),
                Point2::new(x1, y1),
                Point2::new(x0, y1),
            ]);
        }
    }
    outlines
}

/// Outlines for every digit of every skin, built once and shared read-only
#[derive(Debug, Clone)]
pub struct GlyphLibrary {
    glyphs: Vec<[Vec<Outline>; 10]>,
}

impl GlyphLibrary {
    pub fn new() -> Self {
        let glyphs = DigitSkin::ALL
            .iter()
            .map(|skin| std::array::from_fn(|digit| skin.outlines(digit as u8)))
            .collect();
        Self { glyphs }
    }

    /// Outlines for `digit` in `skin`; a blank digit has none
    pub fn glyph(&self, skin: DigitSkin, digit: Option<u8>) -> &[Outline] {
        match digit {
            Some(d) => &self.glyphs[skin.index()][(d % 10) as usize],
            None => &[],
        }
    }
}

impl Default for GlyphLibrary {
    fn default() -> Self {
        Self::new()
    }
}
