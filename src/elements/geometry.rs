//! Pure geometry helpers shared by calibration, matching and checks.
use crate::elements::types::Bounds;

pub type Point = (f64, f64);

pub fn center(b: &Bounds) -> Point {
    (b.x + b.w / 2.0, b.y + b.h / 2.0)
}

/// Center of `b` after multiplying design coordinates by per-axis scale.
pub fn scaled_center(b: &Bounds, scale_x: f64, scale_y: f64) -> Point {
    let (cx, cy) = center(b);
    (cx * scale_x, cy * scale_y)
}

pub fn distance(a: Point, b: Point) -> f64 {
    (a.0 - b.0).hypot(a.1 - b.1)
}

/// Width over height; 0.0 for degenerate boxes.
pub fn aspect_ratio(b: &Bounds) -> f64 {
    if b.h > 0.0 {
        b.w / b.h
    } else {
        0.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    /// Parses `#RGB`, `#RRGGBB` or Android-style `#AARRGGBB` (alpha dropped).
    /// The leading `#` is optional.
    pub fn from_hex(s: &str) -> Option<Self> {
        let hex = s.trim().trim_start_matches('#');
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
        match hex.len() {
            3 => {
                let short = |i: usize| u8::from_str_radix(&hex[i..i + 1], 16).ok().map(|v| v * 17);
                Some(Self { r: short(0)?, g: short(1)?, b: short(2)? })
            }
            6 => Some(Self { r: channel(0)?, g: channel(2)?, b: channel(4)? }),
            8 => Some(Self { r: channel(2)?, g: channel(4)?, b: channel(6)? }),
            _ => None,
        }
    }

    pub fn to_hex(self) -> String {
        format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

/// Euclidean distance in RGB space, 0.0 ..= ~441.7.
pub fn color_distance(a: Rgb, b: Rgb) -> f64 {
    let dr = f64::from(a.r) - f64::from(b.r);
    let dg = f64::from(a.g) - f64::from(b.g);
    let db = f64::from(a.b) - f64::from(b.b);
    (dr * dr + dg * dg + db * db).sqrt()
}

/// Median of a sample; `None` when empty. Non-finite values are ignored.
pub fn median(values: &[f64]) -> Option<f64> {
    let mut sorted: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if sorted.is_empty() {
        return None;
    }
    sorted.sort_by(f64::total_cmp);
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    } else {
        Some(sorted[mid])
    }
}
