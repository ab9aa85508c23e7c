use crate::braille::BrailleCanvas;

/// Draw a line using Bresenham's algorithm
pub fn draw_line(canvas: &mut BrailleCanvas, x0: i32, y0: i32, x1: i32, y1: i32) {
    let dx = (x1 - x0).abs();
    let dy = -(y1 - y0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    let mut x = x0;
    let mut y = y0;

    loop {
        canvas.set_pixel_signed(x, y);

        if x == x1 && y == y1 {
            break;
        }

        let e2 = 2 * err;

        if e2 >= dy {
            if x == x1 {
                break;
            }
            err += dy;
            x += sx;
        }

        if e2 <= dx {
            if y == y1 {
                break;
            }
            err += dx;
            y += sy;
        }
    }
}

/// Draw a filled disc. With `sparse` only every other dot is set, which
/// reads as a half-transparent fill on the braille grid.
pub fn fill_circle(canvas: &mut BrailleCanvas, cx: i32, cy: i32, radius: i32, sparse: bool) {
    for dy in -radius..=radius {
        for dx in -radius..=radius {
            if dx * dx + dy * dy > radius * radius {
                continue;
            }
            let (x, y) = (cx + dx, cy + dy);
            if sparse && (x + y).rem_euclid(2) != 0 {
                continue;
            }
            canvas.set_pixel_signed(x, y);
        }
    }
}

/// Draw a circle outline (midpoint algorithm)
pub fn stroke_circle(canvas: &mut BrailleCanvas, cx: i32, cy: i32, radius: i32) {
    if radius <= 0 {
        canvas.set_pixel_signed(cx, cy);
        return;
    }

    let mut x = radius;
    let mut y = 0;
    let mut err = 1 - radius;

    while x >= y {
        for (px, py) in [
            (x, y), (y, x), (-y, x), (-x, y),
            (-x, -y), (-y, -x), (y, -x), (x, -y),
        ] {
            canvas.set_pixel_signed(cx + px, cy + py);
        }
        y += 1;
        if err < 0 {
            err += 2 * y + 1;
        } else {
            x -= 1;
            err += 2 * (y - x) + 1;
        }
    }
}
