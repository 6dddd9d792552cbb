use bevy::prelude::*;

/// #f4e3c1
pub const LABEL_TEXT: Color = Color::srgb(0.957, 0.890, 0.757);

/// #dc2626
pub const HEADER_TEXT: Color = Color::srgb(0.863, 0.149, 0.149);

/// #facc15
pub const GOLD_TEXT: Color = Color::srgb(0.980, 0.800, 0.082);

/// #ffffff
pub const GREETING_TEXT: Color = Color::WHITE;

/// Dimmed white used for small print.
pub const FAINT_TEXT: Color = Color::srgba(1.0, 1.0, 1.0, 0.4);

/// #ffffff
pub const BUTTON_TEXT: Color = Color::srgb(1.0, 1.0, 1.0);
/// Translucent black, like the control bar behind it.
pub const BUTTON_BACKGROUND: Color = Color::srgba(0.0, 0.0, 0.0, 0.6);
pub const BUTTON_HOVERED_BACKGROUND: Color = Color::srgba(1.0, 1.0, 1.0, 0.1);
pub const BUTTON_PRESSED_BACKGROUND: Color = Color::srgba(1.0, 1.0, 1.0, 0.2);

pub const PROGRESS_TRACK: Color = Color::srgba(1.0, 1.0, 1.0, 0.1);
/// #ef4444
pub const PROGRESS_FILL: Color = Color::srgb(0.937, 0.267, 0.267);
