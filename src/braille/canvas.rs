use ratatui::style::Color;

/// Braille Unicode canvas for high-resolution terminal graphics.
/// Each character cell represents a 2x4 pixel grid (8 dots) and carries
/// the colour of the last shape that touched it.
pub struct BrailleCanvas {
    width: usize,  // Characters
    height: usize, // Characters
    dots: Vec<u8>, // Bit pattern per char, row-major
    colors: Vec<Option<Color>>,
    pen: Option<Color>,
}

impl BrailleCanvas {
    /// Create a new canvas with the given character dimensions.
    /// Effective pixel resolution: width*2 x height*4
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            dots: vec![0; width * height],
            colors: vec![None; width * height],
            pen: None,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Colour applied to every pixel set from now on (`None` = widget default)
    pub fn set_pen(&mut self, color: Option<Color>) {
        self.pen = color;
    }

    /// Set a pixel at the given coordinates.
    /// Braille dot layout per character:
    /// ```text
    /// (0,0) (1,0)   bits: 0x01 0x08
    /// (0,1) (1,1)   bits: 0x02 0x10
    /// (0,2) (1,2)   bits: 0x04 0x20
    /// (0,3) (1,3)   bits: 0x40 0x80
    /// ```
    pub fn set_pixel(&mut self, x: usize, y: usize) {
        let cx = x / 2;
        let cy = y / 4;

        if cx >= self.width || cy >= self.height {
            return;
        }

        let bit = match (x % 2, y % 4) {
            (0, 0) => 0x01,
            (1, 0) => 0x08,
            (0, 1) => 0x02,
            (1, 1) => 0x10,
            (0, 2) => 0x04,
            (1, 2) => 0x20,
            (0, 3) => 0x40,
            _ => 0x80,
        };

        let idx = cy * self.width + cx;
        self.dots[idx] |= bit;
        if self.pen.is_some() {
            self.colors[idx] = self.pen;
        }
    }

    /// Set a pixel using signed coordinates (ignores negative values)
    pub fn set_pixel_signed(&mut self, x: i32, y: i32) {
        if x >= 0 && y >= 0 {
            self.set_pixel(x as usize, y as usize);
        }
    }

    /// Glyph and colour of a non-empty cell
    pub fn cell(&self, col: usize, row: usize) -> Option<(char, Option<Color>)> {
        if col >= self.width || row >= self.height {
            return None;
        }
        let idx = row * self.width + col;
        let bits = self.dots[idx];
        if bits == 0 {
            return None;
        }
        let ch = char::from_u32(0x2800 + bits as u32).unwrap_or(' ');
        Some((ch, self.colors[idx]))
    }

    /// Number of lit dots, handy for asserting something was drawn
    pub fn lit_dots(&self) -> u32 {
        self.dots.iter().map(|b| b.count_ones()).sum()
    }

    #[cfg(test)]
    pub fn to_string(&self) -> String {
        (0..self.height)
            .map(|row| {
                (0..self.width)
                    .map(|col| self.cell(col, row).map_or('\u{2800}', |(ch, _)| ch))
                    .collect::<String>()
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_pixel() {
        let mut canvas = BrailleCanvas::new(1, 1);
        canvas.set_pixel(0, 0);
        assert_eq!(canvas.to_string(), "⠁");
    }

    #[test]
    fn test_all_dots() {
        let mut canvas = BrailleCanvas::new(1, 1);
        for x in 0..2 {
            for y in 0..4 {
                canvas.set_pixel(x, y);
            }
        }
        assert_eq!(canvas.to_string(), "⣿");
        assert_eq!(canvas.lit_dots(), 8);
    }

    #[test]
    fn test_pen_colours_cells() {
        let mut canvas = BrailleCanvas::new(2, 1);
        canvas.set_pixel(0, 0);
        canvas.set_pen(Some(Color::Red));
        canvas.set_pixel(2, 0);
        assert_eq!(canvas.cell(0, 0), Some(('⠁', None)));
        assert_eq!(canvas.cell(1, 0), Some(('⠁', Some(Color::Red))));
    }

    #[test]
    fn test_out_of_bounds_ignored() {
        let mut canvas = BrailleCanvas::new(1, 1);
        canvas.set_pixel(2, 0);
        canvas.set_pixel_signed(-1, 0);
        assert_eq!(canvas.lit_dots(), 0);
        assert!(canvas.cell(5, 5).is_none());
    }
}
