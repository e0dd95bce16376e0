use iced::color;
use iced::theme::Palette;
use iced::{Color, Theme};

/// The application theme. Single dark palette; there are no persisted
/// appearance settings in this tool.
pub fn resolve_theme() -> Theme {
    Theme::custom("FaceAlign", dark_palette())
}

fn dark_palette() -> Palette {
    Palette {
        background: color!(0x1c, 0x1c, 0x1e),
        text: color!(0xcc, 0xcc, 0xcc),
        primary: color!(0x5e, 0x9f, 0xf5),
        success: color!(0x30, 0xd1, 0x58),
        warning: color!(0xff, 0xcc, 0x00),
        danger: color!(0xff, 0x45, 0x3a),
    }
}

/// Stroke color of the guide frame while the user is still positioning.
pub fn guide_color() -> Color {
    color!(0x8e, 0x8e, 0x93)
}

/// Guide frame color once the face is fully contained.
pub fn verified_color() -> Color {
    color!(0x30, 0xd1, 0x58)
}

/// Debug overlay color for the raw detection box and landmarks.
pub fn detection_color() -> Color {
    color!(0x5e, 0x9f, 0xf5)
}
