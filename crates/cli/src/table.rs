// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Minimal fixed-width table renderer for `vsync`'s text-mode list output.

use std::io::Write;

#[derive(Clone, Copy)]
pub enum Align {
    Left,
    Muted,
}

pub struct Column {
    header: &'static str,
    align: Align,
    max_width: Option<usize>,
}

impl Column {
    pub fn left(header: &'static str) -> Self {
        Self { header, align: Align::Left, max_width: None }
    }

    /// A column rendered in the muted color — ids, timestamps, anything
    /// secondary to the row's main fields.
    pub fn muted(header: &'static str) -> Self {
        Self { header, align: Align::Muted, max_width: None }
    }

    pub fn with_max(mut self, max: usize) -> Self {
        self.max_width = Some(max);
        self
    }
}

pub struct Table {
    columns: Vec<Column>,
    rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(columns: Vec<Column>) -> Self {
        Self { columns, rows: Vec::new() }
    }

    pub fn row(&mut self, cells: Vec<String>) {
        assert_eq!(cells.len(), self.columns.len(), "row width must match column count");
        self.rows.push(cells);
    }

    pub fn render(&self, out: &mut dyn Write) {
        let mut widths: Vec<usize> = self.columns.iter().map(|c| c.header.len()).collect();
        let truncated_rows: Vec<Vec<String>> = self
            .rows
            .iter()
            .map(|row| {
                row.iter()
                    .enumerate()
                    .map(|(i, cell)| truncate(cell, self.columns[i].max_width))
                    .collect()
            })
            .collect();
        for row in &truncated_rows {
            for (i, cell) in row.iter().enumerate() {
                widths[i] = widths[i].max(cell.len());
            }
        }

        let header: Vec<String> =
            self.columns.iter().enumerate().map(|(i, c)| pad(c.header, widths[i])).collect();
        let _ = writeln!(out, "{}", header.join("  "));

        for row in &truncated_rows {
            let cells: Vec<String> = row
                .iter()
                .enumerate()
                .map(|(i, cell)| {
                    let padded = pad(cell, widths[i]);
                    match self.columns[i].align {
                        Align::Left => padded,
                        Align::Muted => crate::color::muted(&padded),
                    }
                })
                .collect();
            let _ = writeln!(out, "{}", cells.join("  "));
        }
    }
}

fn truncate(s: &str, max: Option<usize>) -> String {
    match max {
        Some(max) if s.chars().count() > max && max > 0 => {
            let head: String = s.chars().take(max - 1).collect();
            format!("{head}…")
        }
        _ => s.to_string(),
    }
}

fn pad(s: &str, width: usize) -> String {
    format!("{s:<width$}")
}

#[cfg(test)]
#[path = "table_tests.rs"]
mod tests;
