// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Note button row.

use std::time::{Duration, Instant};

use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, Paragraph, Widget},
};

use crate::music::Note;

/// How long a pressed button stays dimmed
pub const FLASH_DURATION: Duration = Duration::from_millis(200);

/// How long the take panel keeps the pressed button's color
pub const TINT_DURATION: Duration = Duration::from_millis(500);

/// Bar colors, left to right, like the keys of a toy xylophone
const BAR_COLORS: [Color; 7] = [
    Color::Red,
    Color::LightRed,
    Color::Yellow,
    Color::Green,
    Color::Cyan,
    Color::Blue,
    Color::Magenta,
];

/// Color for the button at `index`
pub fn bar_color(index: usize) -> Color {
    BAR_COLORS[index % BAR_COLORS.len()]
}

/// Background tint for the most recent press, while it lasts
pub fn tint_color(flash: Option<(usize, Instant)>) -> Option<Color> {
    match flash {
        Some((index, at)) if at.elapsed() < TINT_DURATION => Some(bar_color(index)),
        _ => None,
    }
}

/// Widget drawing one button per note
pub struct ButtonsWidget<'a> {
    notes: &'a [Note],
    flash: Option<(usize, Instant)>,
}

impl<'a> ButtonsWidget<'a> {
    /// Create a new buttons widget
    pub fn new(notes: &'a [Note]) -> Self {
        Self { notes, flash: None }
    }

    /// Set the most recently pressed button
    pub fn flash(mut self, flash: Option<(usize, Instant)>) -> Self {
        self.flash = flash;
        self
    }

    fn is_flashing(&self, index: usize) -> bool {
        matches!(self.flash, Some((i, at)) if i == index && at.elapsed() < FLASH_DURATION)
    }
}

impl Widget for ButtonsWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if self.notes.is_empty() {
            Paragraph::new("No notes configured")
                .style(Style::default().fg(Color::DarkGray))
                .render(area, buf);
            return;
        }

        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints(
                self.notes
                    .iter()
                    .map(|_| Constraint::Ratio(1, self.notes.len() as u32))
                    .collect::<Vec<_>>(),
            )
            .split(area);

        for (i, note) in self.notes.iter().enumerate() {
            let style = if self.is_flashing(i) {
                Style::default().fg(Color::Black).bg(Color::DarkGray)
            } else {
                Style::default()
                    .fg(Color::Black)
                    .bg(bar_color(i))
                    .add_modifier(Modifier::BOLD)
            };

            let label = if i < 9 {
                format!("{}\n[{}]", note, i + 1)
            } else {
                note.to_string()
            };

            Paragraph::new(label)
                .alignment(Alignment::Center)
                .style(style)
                .block(Block::default().borders(Borders::ALL))
                .render(chunks[i], buf);
        }
    }
}
