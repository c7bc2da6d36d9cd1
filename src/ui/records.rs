// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Saved records list.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Paragraph, Widget},
};

use crate::music::transcript;
use crate::store::SavedRecord;

/// Row text for a saved record
pub fn format_record_row(record: &SavedRecord) -> String {
    format!("Name: {}, Record: {}", record.name, transcript(&record.record))
}

/// Widget listing saved records with a cursor and a selection marker
pub struct RecordsWidget<'a> {
    rows: &'a [String],
    cursor: usize,
    selected: Option<usize>,
    block: Option<Block<'a>>,
}

impl<'a> RecordsWidget<'a> {
    /// Create a new records widget
    pub fn new(rows: &'a [String]) -> Self {
        Self {
            rows,
            cursor: 0,
            selected: None,
            block: None,
        }
    }

    /// Set the highlighted row
    pub fn cursor(mut self, cursor: usize) -> Self {
        self.cursor = cursor;
        self
    }

    /// Set the selected row
    pub fn selected(mut self, index: Option<usize>) -> Self {
        self.selected = index;
        self
    }

    /// Set the block wrapper
    pub fn block(mut self, block: Block<'a>) -> Self {
        self.block = Some(block);
        self
    }
}

impl Widget for RecordsWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let area = if let Some(block) = self.block {
            let inner = block.inner(area);
            block.render(area, buf);
            inner
        } else {
            area
        };

        if self.rows.is_empty() {
            Paragraph::new("No saved records")
                .style(Style::default().fg(Color::DarkGray))
                .render(area, buf);
            return;
        }

        // Keep the cursor on screen
        let visible = area.height.max(1) as usize;
        let first = self.cursor.saturating_sub(visible - 1);

        let lines: Vec<Line> = self
            .rows
            .iter()
            .enumerate()
            .skip(first)
            .take(visible)
            .map(|(i, row)| {
                let marker = if self.selected == Some(i) { "* " } else { "  " };
                let style = if i == self.cursor {
                    Style::default()
                        .fg(Color::Black)
                        .bg(Color::Cyan)
                        .add_modifier(Modifier::BOLD)
                } else {
                    Style::default().fg(Color::White)
                };
                Line::from(vec![
                    Span::styled(marker, Style::default().fg(Color::Yellow)),
                    Span::styled(row.as_str(), style),
                ])
            })
            .collect();

        Paragraph::new(lines).render(area, buf);
    }
}
