//! Prompt Geometry
//!
//! The dialog occupies a fixed share of the screen, centered. Buttons sit
//! in one full-width row at the bottom of the dialog. The row height is
//! sized for a 480-line reference display and scaled to the real one:
//!
//! ```text
//! height = (100 / button_count) * (vertical_resolution / 480)
//! ```
//!
//! `100 / button_count` is integer division, so three buttons get 33
//! units, not 33.3. A prompt without buttons gets a zero-height row.

use serde::{Deserialize, Serialize};

/// Vertical resolution the button sizes are designed for
pub const REFERENCE_VERTICAL_RESOLUTION: f32 = 480.0;

/// Dialog width as a share of the screen
pub const DIALOG_WIDTH_PERCENT: u16 = 70;

/// Dialog height as a share of the screen
pub const DIALOG_HEIGHT_PERCENT: u16 = 50;

/// Button row width as a share of the dialog
pub const BUTTON_ROW_WIDTH_PERCENT: u16 = 100;

/// Height budget shared by the buttons at the reference resolution
const BUTTON_ROW_BUDGET: usize = 100;

/// Geometry of one presented prompt
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PromptLayout {
    /// Number of footer buttons
    pub button_count: usize,
    /// Display height in pixels (or rows)
    pub vertical_resolution: u32,
    /// `vertical_resolution / 480`
    pub scale: f32,
    /// Dialog width, percent of screen
    pub dialog_width_percent: u16,
    /// Dialog height, percent of screen
    pub dialog_height_percent: u16,
    /// Button row width, percent of dialog
    pub button_row_width_percent: u16,
    /// Button row height in display units
    pub button_row_height: f32,
}

impl PromptLayout {
    /// Compute the layout for `button_count` buttons on a display
    /// `vertical_resolution` units tall
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn compute(button_count: usize, vertical_resolution: u32) -> Self {
        let scale = vertical_resolution as f32 / REFERENCE_VERTICAL_RESOLUTION;
        let button_row_height = match button_count {
            0 => 0.0,
            n => (BUTTON_ROW_BUDGET / n) as f32 * scale,
        };

        Self {
            button_count,
            vertical_resolution,
            scale,
            dialog_width_percent: DIALOG_WIDTH_PERCENT,
            dialog_height_percent: DIALOG_HEIGHT_PERCENT,
            button_row_width_percent: BUTTON_ROW_WIDTH_PERCENT,
            button_row_height,
        }
    }

    /// Button row height truncated to whole display units
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn button_row_height_px(&self) -> u32 {
        self.button_row_height as u32
    }

    /// Dialog height in display units
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn dialog_height(&self) -> f32 {
        self.vertical_resolution as f32 * f32::from(self.dialog_height_percent) / 100.0
    }

    /// Share of the dialog's height taken by the button row, clamped to 1
    ///
    /// Resolution independent; useful for surfaces whose units are not
    /// pixels, such as terminal rows.
    #[must_use]
    pub fn button_row_fraction(&self) -> f32 {
        let dialog = self.dialog_height();
        if dialog <= 0.0 {
            return 0.0;
        }
        (self.button_row_height / dialog).min(1.0)
    }
}
