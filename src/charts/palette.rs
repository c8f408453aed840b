//! Region color mapping. Only the presentation layer knows about colors.

/// RGB triple shared by the egui and plotters front ends.
pub type Rgb = (u8, u8, u8);

/// Used for regions outside the known set.
pub const DEFAULT_COLOR: Rgb = (149, 165, 166);

const REGION_COLORS: [(&str, Rgb); 5] = [
    ("all", (233, 30, 99)),   // Pink
    ("north", (52, 152, 219)), // Blue
    ("east", (46, 204, 113)), // Green
    ("south", (243, 156, 18)), // Orange
    ("west", (155, 89, 182)), // Purple
];

/// Color for a region label. Keys are matched exactly against the lowercase set.
pub fn region_color(region: &str) -> Rgb {
    REGION_COLORS
        .iter()
        .find(|(name, _)| *name == region)
        .map(|(_, rgb)| *rgb)
        .unwrap_or(DEFAULT_COLOR)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_regions_fall_back_to_default() {
        assert_eq!(region_color("north"), (52, 152, 219));
        assert_eq!(region_color("North"), DEFAULT_COLOR);
        assert_eq!(region_color("atlantis"), DEFAULT_COLOR);
    }
}
