/// ASCII canvas for terminal rendering
use crossterm::{
    style::{Color, Print, ResetColor, SetForegroundColor},
    QueueableCommand,
};
use flipclock_core::{Blend, Canvas, Ink};
use nalgebra::Point2;
use std::io::Write;

/// Character luminosity ramp for ink intensity (darkest to lightest)
const LUMINOSITY_RAMP: &[char] = &[' ', '.', ':', '-', '=', '+', '*', '#', '%', '@'];

/// Canvas pixels per terminal row; cells are about twice as tall as wide
const PIXELS_PER_ROW: usize = 2;

/// Terminal character grid that the clock paints into.
///
/// Reports twice as many pixel rows as it has terminal rows so that
/// projected shapes keep their aspect ratio.
pub struct AsciiCanvas {
    width: usize,
    height: usize,
    intensity: Vec<f32>,
    /// Cells covered by the see-through polygon being filled
    mask: Vec<bool>,
}

impl AsciiCanvas {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            intensity: vec![0.0; width * height],
            mask: vec![false; width * height],
        }
    }

    pub fn resize(&mut self, width: usize, height: usize) {
        if width != self.width || height != self.height {
            self.width = width;
            self.height = height;
            self.intensity = vec![0.0; width * height];
            self.mask = vec![false; width * height];
        }
    }

    pub fn clear(&mut self) {
        self.intensity.fill(0.0);
    }

    /// Intensity of one terminal cell in `[0, 1]`
    pub fn intensity_at(&self, x: usize, y: usize) -> Option<f32> {
        (x < self.width && y < self.height).then(|| self.intensity[y * self.width + x])
    }

    pub fn character_at(&self, x: usize, y: usize) -> Option<char> {
        self.intensity_at(x, y).map(ramp_character)
    }

    fn cell_of(&self, x: f32, y: f32) -> Option<usize> {
        if x < 0.0 || y < 0.0 {
            return None;
        }
        let col = x as usize;
        let row = y as usize / PIXELS_PER_ROW;
        (col < self.width && row < self.height).then(|| row * self.width + col)
    }

    fn plot(&mut self, idx: usize, ink: f32, blend: Blend) {
        let cell = &mut self.intensity[idx];
        *cell = match blend {
            Blend::Opaque => ink,
            Blend::SeeThrough => (*cell + ink) * 0.5,
        };
    }

    pub fn draw<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        for y in 0..self.height {
            for x in 0..self.width {
                let c = ramp_character(self.intensity[y * self.width + x]);

                // Color based on character intensity
                let color = match c {
                    ' ' | '.' | ':' => Color::DarkGrey,
                    '-' | '=' => Color::Grey,
                    '+' | '*' => Color::White,
                    '#' | '%' | '@' => Color::Cyan,
                    _ => Color::White,
                };

                writer.queue(SetForegroundColor(color))?;
                writer.queue(Print(c))?;
            }
            if y + 1 < self.height {
                writer.queue(Print("\r\n"))?;
            }
        }
        writer.queue(ResetColor)?;
        Ok(())
    }
}

impl Canvas for AsciiCanvas {
    fn size(&self) -> (u32, u32) {
        (self.width as u32, (self.height * PIXELS_PER_ROW) as u32)
    }

    fn fill_polygon(&mut self, points: &[Point2<f32>], ink: Ink, blend: Blend) {
        if points.len() < 3 {
            return;
        }
        // See-through fills blend each cell once, so track what this polygon covered
        match blend {
            Blend::Opaque => {
                for i in 1..points.len() - 1 {
                    let intensity = &mut self.intensity;
                    rasterize_triangle(self.width, self.height, [points[0], points[i], points[i + 1]], |idx| {
                        intensity[idx] = ink.fraction();
                    });
                }
            }
            Blend::SeeThrough => {
                self.mask.fill(false);
                for i in 1..points.len() - 1 {
                    let mask = &mut self.mask;
                    rasterize_triangle(self.width, self.height, [points[0], points[i], points[i + 1]], |idx| {
                        mask[idx] = true;
                    });
                }
                for idx in 0..self.mask.len() {
                    if self.mask[idx] {
                        self.plot(idx, ink.fraction(), Blend::SeeThrough);
                    }
                }
            }
        }
    }

    fn draw_line(&mut self, from: Point2<f32>, to: Point2<f32>, ink: Ink) {
        let delta = to - from;
        let steps = delta.x.abs().max(delta.y.abs()).ceil().max(1.0) as usize;
        for i in 0..=steps {
            let p = from + delta * (i as f32 / steps as f32);
            if let Some(idx) = self.cell_of(p.x, p.y) {
                let cell = &mut self.intensity[idx];
                *cell = cell.max(ink.fraction());
            }
        }
    }
}

fn ramp_character(intensity: f32) -> char {
    let char_index = (intensity.clamp(0.0, 1.0) * (LUMINOSITY_RAMP.len() - 1) as f32).round() as usize;
    LUMINOSITY_RAMP[char_index.min(LUMINOSITY_RAMP.len() - 1)]
}

/// Visit every cell of a `width` x `height` grid whose centre lies in the triangle
fn rasterize_triangle(width: usize, height: usize, [v0, v1, v2]: [Point2<f32>; 3], mut visit: impl FnMut(usize)) {
    let pixel_height = (height * PIXELS_PER_ROW) as i32;

    // Bounding box in canvas pixels
    let min_x = v0.x.min(v1.x).min(v2.x).floor() as i32;
    let max_x = v0.x.max(v1.x).max(v2.x).ceil() as i32;
    let min_y = v0.y.min(v1.y).min(v2.y).floor() as i32;
    let max_y = v0.y.max(v1.y).max(v2.y).ceil() as i32;

    // Clip to screen bounds, stepping whole terminal rows
    let min_x = min_x.max(0);
    let max_x = max_x.min(width as i32 - 1);
    let min_row = min_y.max(0) / PIXELS_PER_ROW as i32;
    let max_row = max_y.min(pixel_height - 1) / PIXELS_PER_ROW as i32;

    for row in min_row..=max_row {
        for x in min_x..=max_x {
            let px = x as f32 + 0.5;
            let py = (row as usize * PIXELS_PER_ROW) as f32 + PIXELS_PER_ROW as f32 * 0.5;

            if let Some((w0, w1, w2)) = barycentric(v0, v1, v2, Point2::new(px, py)) {
                let inside = (w0 >= 0.0 && w1 >= 0.0 && w2 >= 0.0)
                    || (w0 <= 0.0 && w1 <= 0.0 && w2 <= 0.0);
                if inside {
                    visit(row as usize * width + x as usize);
                }
            }
        }
    }
}

/// Calculate barycentric coordinates for a point in a triangle
fn barycentric(v0: Point2<f32>, v1: Point2<f32>, v2: Point2<f32>, p: Point2<f32>) -> Option<(f32, f32, f32)> {
    let denom = (v1.y - v2.y) * (v0.x - v2.x) + (v2.x - v1.x) * (v0.y - v2.y);

    if denom.abs() < 1e-6 {
        return None;
    }

    let w0 = ((v1.y - v2.y) * (p.x - v2.x) + (v2.x - v1.x) * (p.y - v2.y)) / denom;
    let w1 = ((v2.y - v0.y) * (p.x - v2.x) + (v0.x - v2.x) * (p.y - v2.y)) / denom;
    let w2 = 1.0 - w0 - w1;

    Some((w0, w1, w2))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(x0: f32, y0: f32, x1: f32, y1: f32) -> Vec<Point2<f32>> {
        vec![
            Point2::new(x0, y0),
            Point2::new(x1, y0),
            Point2::new(x1, y1),
            Point2::new(x0, y1),
        ]
    }

    #[test]
    fn test_size_doubles_rows() {
        let canvas = AsciiCanvas::new(80, 24);
        assert_eq!(canvas.size(), (80, 48));
    }

    #[test]
    fn test_opaque_fill_covers_interior_only() {
        let mut canvas = AsciiCanvas::new(20, 10);
        canvas.fill_polygon(&square(4.0, 4.0, 12.0, 12.0), Ink::FULL, Blend::Opaque);
        assert_eq!(canvas.character_at(8, 4), Some('@'));
        assert_eq!(canvas.character_at(1, 1), Some(' '));
        assert_eq!(canvas.character_at(15, 4), Some(' '));
    }

    #[test]
    fn test_winding_does_not_matter() {
        let mut canvas = AsciiCanvas::new(20, 10);
        let mut points = square(4.0, 4.0, 12.0, 12.0);
        points.reverse();
        canvas.fill_polygon(&points, Ink::FULL, Blend::Opaque);
        assert_eq!(canvas.intensity_at(8, 4), Some(1.0));
    }

    #[test]
    fn test_opaque_overwrites_and_see_through_blends() {
        let mut canvas = AsciiCanvas::new(20, 10);
        let area = square(0.0, 0.0, 20.0, 20.0);
        canvas.fill_polygon(&area, Ink::FULL, Blend::Opaque);
        canvas.fill_polygon(&area, Ink::NONE, Blend::Opaque);
        assert_eq!(canvas.intensity_at(5, 5), Some(0.0));

        canvas.fill_polygon(&area, Ink::FULL, Blend::SeeThrough);
        let value = canvas.intensity_at(5, 5).unwrap();
        assert!((value - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_see_through_fills_blend_each_cell_once() {
        let mut canvas = AsciiCanvas::new(20, 10);
        // cell (5, 5) sits on the diagonal shared by both fan triangles
        canvas.fill_polygon(&square(0.0, 0.0, 10.0, 20.0), Ink::FULL, Blend::SeeThrough);
        assert_eq!(canvas.intensity_at(5, 5), Some(0.5));

        // the next polygon does not re-blend cells the previous one covered
        canvas.fill_polygon(&square(10.0, 0.0, 20.0, 20.0), Ink::FULL, Blend::SeeThrough);
        assert_eq!(canvas.intensity_at(5, 5), Some(0.5));
        assert_eq!(canvas.intensity_at(15, 5), Some(0.5));

        canvas.fill_polygon(&square(0.0, 0.0, 10.0, 20.0), Ink::FULL, Blend::SeeThrough);
        assert_eq!(canvas.intensity_at(5, 5), Some(0.75));
        assert_eq!(canvas.intensity_at(15, 5), Some(0.5));
    }

    #[test]
    fn test_resize_keeps_see_through_working() {
        let mut canvas = AsciiCanvas::new(4, 2);
        canvas.resize(20, 10);
        canvas.fill_polygon(&square(0.0, 0.0, 20.0, 20.0), Ink::FULL, Blend::SeeThrough);
        assert_eq!(canvas.intensity_at(19, 9), Some(0.5));
    }

    #[test]
    fn test_line_marks_cells() {
        let mut canvas = AsciiCanvas::new(20, 10);
        canvas.draw_line(Point2::new(0.5, 1.0), Point2::new(18.5, 1.0), Ink::HALF);
        for x in 0..=18 {
            assert!(canvas.intensity_at(x, 0).unwrap() > 0.0);
        }
        assert_eq!(canvas.intensity_at(5, 3), Some(0.0));
    }

    #[test]
    fn test_offscreen_geometry_is_clipped() {
        let mut canvas = AsciiCanvas::new(10, 5);
        canvas.fill_polygon(&square(-50.0, -50.0, -10.0, -10.0), Ink::FULL, Blend::Opaque);
        canvas.draw_line(Point2::new(-5.0, -5.0), Point2::new(-1.0, 30.0), Ink::FULL);
        assert!((0..5).all(|y| (0..10).all(|x| canvas.intensity_at(x, y) == Some(0.0))));
    }

    #[test]
    fn test_draw_emits_every_row() {
        let mut canvas = AsciiCanvas::new(4, 3);
        canvas.fill_polygon(&square(0.0, 0.0, 4.0, 6.0), Ink::FULL, Blend::Opaque);
        let mut out = Vec::new();
        canvas.draw(&mut out).unwrap();
        let text = String::from_utf8_lossy(&out);
        assert_eq!(text.matches('@').count(), 12);
        assert_eq!(text.matches("\r\n").count(), 2);
    }
}
