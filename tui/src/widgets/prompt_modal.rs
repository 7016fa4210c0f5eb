//! PromptModal Widget
//!
//! Draws an action prompt as a centered, bordered dialog: header in the
//! title, body centered in the middle, and one full-width row of buttons
//! along the bottom. Proportions come from `PromptLayout` so the terminal
//! matches what a touchscreen would show.

use panel_core::{PromptButton, PromptLayout};
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Clear, Widget};
use textwrap::wrap;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::presenter::ModalView;
use crate::theme::{button_style, CONSOLE_TEXT, MODAL_BORDER, MODAL_HEADER};

/// Modal dialog for one prompt
pub struct PromptModal<'a> {
    view: &'a ModalView,
}

impl<'a> PromptModal<'a> {
    pub fn new(view: &'a ModalView) -> Self {
        Self { view }
    }
}

/// Centered dialog area for `layout` inside `area`
pub fn dialog_rect(area: Rect, layout: &PromptLayout) -> Rect {
    let scale = |len: u16, percent: u16| -> u16 {
        // Fits: the result never exceeds `len`
        u16::try_from(u32::from(len) * u32::from(percent) / 100).unwrap_or(len)
    };
    let width = scale(area.width, layout.dialog_width_percent);
    let height = scale(area.height, layout.dialog_height_percent);

    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

/// Terminal rows given to the button row of a dialog `dialog_rows` tall
///
/// Keeps the row's share of the dialog from `PromptLayout`, with at least
/// one row whenever there are buttons.
pub fn button_row_rows(layout: &PromptLayout, dialog_rows: u16) -> u16 {
    if layout.button_count == 0 {
        return 0;
    }
    let rows = (layout.button_row_fraction() * f32::from(dialog_rows)).round();
    // Fraction is clamped to 1, so rows <= dialog_rows
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let rows = rows as u16;
    rows.max(1)
}

/// Truncate `text` to at most `width` display columns
fn fit(text: &str, width: usize) -> &str {
    let mut used = 0;
    for (index, ch) in text.char_indices() {
        used += ch.width().unwrap_or(0);
        if used > width {
            return &text[..index];
        }
    }
    text
}

/// Write `text` centered horizontally on row `y` of `area`
fn set_centered(buf: &mut Buffer, area: Rect, y: u16, text: &str, style: Style) {
    let text = fit(text, usize::from(area.width));
    let width = u16::try_from(text.width()).unwrap_or(area.width);
    let x = area.x + area.width.saturating_sub(width) / 2;
    buf.set_stringn(x, y, text, usize::from(area.width), style);
}

fn render_body(body: &str, area: Rect, buf: &mut Buffer) {
    if area.width == 0 || area.height == 0 {
        return;
    }

    let lines: Vec<String> = body
        .lines()
        .flat_map(|line| {
            if line.is_empty() {
                vec![String::new()]
            } else {
                wrap(line, usize::from(area.width))
                    .into_iter()
                    .map(|cow| cow.to_string())
                    .collect()
            }
        })
        .collect();

    let visible = lines.len().min(usize::from(area.height));
    let top = area.y + (area.height - u16::try_from(visible).unwrap_or(area.height)) / 2;
    let style = Style::default().fg(CONSOLE_TEXT);

    for (offset, line) in (0u16..).zip(lines.iter().take(visible)) {
        set_centered(buf, area, top + offset, line, style);
    }
}

fn render_buttons(buttons: &[PromptButton], focus: usize, area: Rect, buf: &mut Buffer) {
    if buttons.is_empty() || area.width == 0 || area.height == 0 {
        return;
    }

    let count = u16::try_from(buttons.len()).unwrap_or(u16::MAX).min(area.width);
    let cell_width = area.width / count;
    let label_row = area.y + area.height / 2;

    for (index, button) in buttons.iter().enumerate().take(usize::from(count)) {
        let column = u16::try_from(index).unwrap_or(count);
        let x = area.x + column * cell_width;
        // Last cell absorbs the remainder so the row spans the full width
        let width = if column + 1 == count {
            area.x + area.width - x
        } else {
            cell_width
        };
        let cell = Rect {
            x,
            width,
            ..area
        };

        let style = button_style(button.style, index == focus);
        buf.set_style(cell, style);

        let padded = Rect {
            x: cell.x + 1,
            width: cell.width.saturating_sub(2),
            ..cell
        };
        set_centered(buf, padded, label_row, &button.label, style);
    }
}

impl Widget for PromptModal<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let snapshot = &self.view.snapshot;
        let layout = PromptLayout::compute(snapshot.button_count(), u32::from(area.height));
        let dialog = dialog_rect(area, &layout);
        if dialog.width < 3 || dialog.height < 3 {
            return;
        }

        Clear.render(dialog, buf);

        let title = Span::styled(
            format!(" {} ", snapshot.header_text()),
            Style::default()
                .fg(MODAL_HEADER)
                .add_modifier(Modifier::BOLD),
        );
        let block = Block::bordered()
            .border_style(Style::default().fg(MODAL_BORDER))
            .title(Line::from(title).centered());
        let inner = block.inner(dialog);
        block.render(dialog, buf);

        let rows = button_row_rows(&layout, dialog.height).min(inner.height);
        let body_area = Rect {
            height: inner.height - rows,
            ..inner
        };
        let button_area = Rect {
            y: inner.y + inner.height - rows,
            height: rows,
            ..inner
        };

        render_body(snapshot.body_text(), body_area, buf);
        render_buttons(&snapshot.buttons, self.view.focus, button_area, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use panel_core::{ButtonStyle, PromptId, PromptSnapshot};
    use pretty_assertions::assert_eq;

    fn view(body: Option<&str>, buttons: &[(&str, ButtonStyle)]) -> ModalView {
        ModalView {
            snapshot: PromptSnapshot {
                id: PromptId::new(),
                header: Some("Filament runout".into()),
                body: body.map(str::to_string),
                buttons: buttons
                    .iter()
                    .map(|(label, style)| PromptButton::new(*label, label.to_uppercase(), *style))
                    .collect(),
            },
            focus: 0,
        }
    }

    fn row(buf: &Buffer, y: u16) -> String {
        (0..buf.area.width).map(|x| buf[(x, y)].symbol()).collect()
    }

    fn screen(buf: &Buffer) -> String {
        (0..buf.area.height)
            .map(|y| row(buf, y))
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn test_dialog_is_centered() {
        let layout = PromptLayout::compute(2, 24);
        let dialog = dialog_rect(Rect::new(0, 0, 60, 24), &layout);
        assert_eq!(dialog, Rect::new(9, 6, 42, 12));
    }

    #[test]
    fn test_button_rows_follow_layout_share() {
        // 50 / 240 of a 24-row dialog
        assert_eq!(button_row_rows(&PromptLayout::compute(2, 48), 24), 5);
        // 100 / 240 of 12 rows
        assert_eq!(button_row_rows(&PromptLayout::compute(1, 24), 12), 5);
        // Never below one row
        assert_eq!(button_row_rows(&PromptLayout::compute(9, 24), 4), 1);
        assert_eq!(button_row_rows(&PromptLayout::compute(0, 24), 12), 0);
    }

    #[test]
    fn test_renders_header_body_and_buttons() {
        let view = view(
            Some("Load filament"),
            &[("Resume", ButtonStyle::Primary), ("Cancel", ButtonStyle::Error)],
        );
        let area = Rect::new(0, 0, 60, 48);
        let mut buf = Buffer::empty(area);
        PromptModal::new(&view).render(area, &mut buf);

        let text = screen(&buf);
        assert!(text.contains(" Filament runout "));
        assert!(text.contains("Load filament"));
        assert!(text.contains("Resume"));
        assert!(text.contains("Cancel"));

        // Dialog is 42x24 at (9, 12); buttons take interior rows 30..35
        let label_row = row(&buf, 32);
        assert!(label_row.find("Resume").unwrap() < label_row.find("Cancel").unwrap());
    }

    #[test]
    fn test_button_colors_follow_style() {
        let view = view(None, &[("Ok", ButtonStyle::Primary), ("Stop", ButtonStyle::Error)]);
        let area = Rect::new(0, 0, 60, 48);
        let mut buf = Buffer::empty(area);
        PromptModal::new(&view).render(area, &mut buf);

        // Interior spans x 10..50; two cells of 20 columns
        assert_eq!(buf[(11, 32)].bg, crate::theme::BUTTON_PRIMARY);
        assert_eq!(buf[(45, 32)].bg, crate::theme::BUTTON_ERROR);
    }

    #[test]
    fn test_no_buttons_gives_body_the_whole_interior() {
        let view = view(Some("Heating..."), &[]);
        let area = Rect::new(0, 0, 60, 24);
        let mut buf = Buffer::empty(area);
        PromptModal::new(&view).render(area, &mut buf);

        assert!(screen(&buf).contains("Heating..."));
    }

    #[test]
    fn test_tiny_terminal_does_not_panic() {
        let view = view(Some("Body"), &[("A", ButtonStyle::Info)]);
        for (w, h) in [(0, 0), (1, 1), (4, 4), (10, 3)] {
            let area = Rect::new(0, 0, w, h);
            let mut buf = Buffer::empty(area);
            PromptModal::new(&view).render(area, &mut buf);
        }
    }

    #[test]
    fn test_fit_respects_display_width() {
        assert_eq!(fit("Resume", 3), "Res");
        assert_eq!(fit("日本語", 4), "日本");
        assert_eq!(fit("ok", 10), "ok");
    }
}
