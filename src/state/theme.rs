use egui::{Color32, Visuals};

/// Series colors, indexed by algorithm position.
pub const COLOR_PALETTE: [[u8; 3]; 8] = [
    [31, 119, 180],  // Blue
    [255, 127, 14],  // Orange
    [44, 160, 44],   // Green
    [214, 39, 40],   // Red
    [148, 103, 189], // Purple
    [140, 86, 75],   // Brown
    [227, 119, 194], // Pink
    [23, 190, 207],  // Cyan
];

pub fn color_for_index(index: usize) -> Color32 {
    let [r, g, b] = COLOR_PALETTE[index % COLOR_PALETTE.len()];
    Color32::from_rgb(r, g, b)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Theme {
    Dark,
    Light,
}

impl Theme {
    pub fn toggle(&self) -> Self {
        match self {
            Theme::Dark => Theme::Light,
            Theme::Light => Theme::Dark,
        }
    }

    pub fn visuals(&self) -> Visuals {
        match self {
            Theme::Dark => Visuals::dark(),
            Theme::Light => Visuals::light(),
        }
    }

    pub fn pass_color(&self) -> Color32 {
        match self {
            Theme::Dark => Color32::from_rgb(110, 200, 110),
            Theme::Light => Color32::from_rgb(30, 130, 30),
        }
    }

    pub fn fail_color(&self) -> Color32 {
        match self {
            Theme::Dark => Color32::from_rgb(235, 90, 90),
            Theme::Light => Color32::from_rgb(190, 30, 30),
        }
    }

    pub fn warning_color(&self) -> Color32 {
        match self {
            Theme::Dark => Color32::from_rgb(240, 190, 80),
            Theme::Light => Color32::from_rgb(160, 100, 0),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Theme::Dark => "Dark",
            Theme::Light => "Light",
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Theme::Dark
    }
}
