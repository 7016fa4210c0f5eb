//! Theme and Colors
//!
//! Button colors follow the usual printer-UI convention: blue for the
//! default action, grey for secondary, cyan, amber and red for info,
//! warning and error.

use panel_core::ButtonStyle;
use ratatui::style::{Color, Modifier, Style};

// ============================================================================
// Button Palette
// ============================================================================

/// Primary button
pub const BUTTON_PRIMARY: Color = Color::Rgb(33, 150, 243);

/// Secondary button
pub const BUTTON_SECONDARY: Color = Color::Rgb(96, 125, 139);

/// Info button
pub const BUTTON_INFO: Color = Color::Rgb(0, 188, 212);

/// Warning button
pub const BUTTON_WARNING: Color = Color::Rgb(255, 160, 0);

/// Error button
pub const BUTTON_ERROR: Color = Color::Rgb(229, 57, 53);

/// Label text on a button
pub const BUTTON_TEXT: Color = Color::Rgb(250, 250, 250);

// ============================================================================
// UI Colors
// ============================================================================

/// Modal border
pub const MODAL_BORDER: Color = Color::Rgb(200, 200, 200);

/// Modal header text
pub const MODAL_HEADER: Color = Color::Rgb(255, 255, 255);

/// Console text
pub const CONSOLE_TEXT: Color = Color::Rgb(170, 170, 170);

/// Commands sent to the printer
pub const CONSOLE_COMMAND: Color = Color::Rgb(129, 199, 132);

/// Status bar
pub const STATUS_BAR: Color = Color::Rgb(120, 120, 120);

/// Background color for a button style
pub fn button_color(style: ButtonStyle) -> Color {
    match style {
        ButtonStyle::Primary => BUTTON_PRIMARY,
        ButtonStyle::Secondary => BUTTON_SECONDARY,
        ButtonStyle::Info => BUTTON_INFO,
        ButtonStyle::Warning => BUTTON_WARNING,
        ButtonStyle::Error => BUTTON_ERROR,
    }
}

/// Full style for a button, highlighted when focused
pub fn button_style(style: ButtonStyle, focused: bool) -> Style {
    let base = Style::default().fg(BUTTON_TEXT).bg(button_color(style));
    if focused {
        base.add_modifier(Modifier::BOLD | Modifier::REVERSED)
    } else {
        base
    }
}
