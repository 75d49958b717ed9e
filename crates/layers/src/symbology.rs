use catalog::Category;
use serde::Serialize;

/// How a marker is drawn, independent of the view it lives in.
#[derive(Debug, Copy, Clone, PartialEq, Serialize)]
pub struct MarkerStyle {
    pub visible: bool,
    pub color: [f32; 4],
    pub hex: &'static str,
}

impl MarkerStyle {
    pub const fn new(visible: bool, color: [f32; 4], hex: &'static str) -> Self {
        Self {
            visible,
            color,
            hex,
        }
    }

    /// The one category palette both the map and the tour use.
    pub const fn for_category(category: Category) -> Self {
        let hex = category_hex(category);
        Self::new(true, hex_rgba(hex), hex)
    }
}

impl Default for MarkerStyle {
    fn default() -> Self {
        Self::for_category(Category::Building)
    }
}

pub const fn category_hex(category: Category) -> &'static str {
    match category {
        Category::Admin => "#e74c3c",
        Category::Faculty => "#3498db",
        Category::Sports => "#2ecc71",
        Category::Residence => "#f39c12",
        Category::Service => "#9b59b6",
        Category::Building => "#95a5a6",
    }
}

pub const fn category_color(category: Category) -> [f32; 4] {
    hex_rgba(category_hex(category))
}

/// Parses `#rrggbb` into linear-ish RGBA in [0, 1] with opaque alpha.
///
/// Malformed digits read as zero; the palette above is the only caller.
const fn hex_rgba(hex: &str) -> [f32; 4] {
    let b = hex.as_bytes();
    if b.len() != 7 {
        return [0.0, 0.0, 0.0, 1.0];
    }
    [
        channel(b[1], b[2]),
        channel(b[3], b[4]),
        channel(b[5], b[6]),
        1.0,
    ]
}

const fn channel(hi: u8, lo: u8) -> f32 {
    ((nibble(hi) << 4) | nibble(lo)) as f32 / 255.0
}

const fn nibble(c: u8) -> u8 {
    match c {
        b'0'..=b'9' => c - b'0',
        b'a'..=b'f' => c - b'a' + 10,
        b'A'..=b'F' => c - b'A' + 10,
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::{MarkerStyle, category_color, category_hex};
    use catalog::Category;

    #[test]
    fn palette_is_distinct_per_category() {
        let mut seen: Vec<&str> = Category::ALL.iter().map(|c| category_hex(*c)).collect();
        seen.sort();
        seen.dedup();
        assert_eq!(seen.len(), Category::ALL.len());
    }

    #[test]
    fn hex_converts_to_rgba() {
        let [r, g, b, a] = category_color(Category::Admin);
        assert_eq!(r, 0xe7 as f32 / 255.0);
        assert_eq!(g, 0x4c as f32 / 255.0);
        assert_eq!(b, 0x3c as f32 / 255.0);
        assert_eq!(a, 1.0);
    }

    #[test]
    fn default_style_is_building_gray() {
        let style = MarkerStyle::default();
        assert!(style.visible);
        assert_eq!(style.hex, "#95a5a6");
    }
}
