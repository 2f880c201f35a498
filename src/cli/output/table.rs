//! Table output formatting for CLI commands
//!
//! Renders playlists, moves and degradations using comfy-table.

use comfy_table::{presets, Attribute, Cell, Color, ContentArrangement, Table};
use std::env;

use super::truncate;
use crate::adapters::PlaylistItem;
use crate::domain::models::{Degradation, MoveRecord};
use crate::services::key_extractor::parse_duration;

/// Table formatter for CLI output
pub struct TableFormatter {
    /// Whether to use colors in output
    use_colors: bool,
    /// Maximum width for tables (None = auto)
    max_width: Option<u16>,
}

impl TableFormatter {
    pub fn new() -> Self {
        Self {
            use_colors: supports_color(),
            max_width: None,
        }
    }

    pub const fn with_config(use_colors: bool, max_width: Option<u16>) -> Self {
        Self {
            use_colors,
            max_width,
        }
    }

    /// Format the playlist in its current order
    pub fn format_playlist(&self, items: &[PlaylistItem]) -> String {
        let mut table = self.create_base_table();
        table.set_header(vec![
            header("#"),
            header("Title"),
            header("Duration"),
            header("Channel"),
        ]);

        for (position, item) in items.iter().enumerate() {
            let duration = item.duration.as_deref().unwrap_or("-");
            let duration_cell = if self.use_colors && parse_duration(duration).is_none() {
                Cell::new(duration).fg(Color::Yellow)
            } else {
                Cell::new(duration)
            };
            table.add_row(vec![
                Cell::new(position),
                Cell::new(truncate(&item.title, 48)),
                duration_cell,
                Cell::new(item.channel.as_deref().unwrap_or("-")),
            ]);
        }

        table.to_string()
    }

    /// Format the moves a run performed
    pub fn format_moves(&self, moves: &[MoveRecord]) -> String {
        let mut table = self.create_base_table();
        table.set_header(vec![header("From"), header("To"), header("Key")]);
        for record in moves {
            table.add_row(vec![
                Cell::new(record.from),
                Cell::new(record.to),
                Cell::new(record.key.to_string()),
            ]);
        }
        table.to_string()
    }

    /// Format degradations as a single-column warning table
    pub fn format_degradations(&self, degradations: &[Degradation]) -> String {
        let mut table = self.create_base_table();
        table.set_header(vec![header("Warning")]);
        for degradation in degradations {
            let cell = Cell::new(degradation.to_string());
            table.add_row(vec![if self.use_colors {
                cell.fg(Color::Yellow)
            } else {
                cell
            }]);
        }
        table.to_string()
    }

    fn create_base_table(&self) -> Table {
        let mut table = Table::new();

        table
            .load_preset(presets::UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic);

        if let Some(width) = self.max_width {
            table.set_width(width);
        }

        table
    }
}

impl Default for TableFormatter {
    fn default() -> Self {
        Self::new()
    }
}

fn header(name: &str) -> Cell {
    Cell::new(name).add_attribute(Attribute::Bold)
}

/// Check if color output is supported
fn supports_color() -> bool {
    // Respect NO_COLOR environment variable
    if env::var("NO_COLOR").is_ok() {
        return false;
    }

    if let Ok(term) = env::var("TERM") {
        if term == "dumb" {
            return false;
        }
    }

    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::SortKey;

    #[test]
    fn playlist_table_lists_every_item_in_order() {
        let formatter = TableFormatter::with_config(false, Some(120));
        let items = vec![
            PlaylistItem::with_duration("First", "1:00").and_channel("Alpha"),
            PlaylistItem::with_channel("Second", "Beta"),
        ];

        let rendered = formatter.format_playlist(&items);

        assert!(rendered.contains("First"));
        assert!(rendered.contains("Alpha"));
        assert!(rendered.find("First") < rendered.find("Second"));
    }

    #[test]
    fn moves_table_formats_keys() {
        let formatter = TableFormatter::with_config(false, None);
        let moves = vec![MoveRecord {
            from: 5,
            to: 1,
            key: SortKey::DurationSeconds(180),
        }];
        assert!(formatter.format_moves(&moves).contains("00:03:00"));
    }
}
