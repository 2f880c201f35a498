//! Sort key extraction from rendered rows.
//!
//! Never fails: text that is missing or not a timestamp becomes a sentinel
//! key, a missing channel byline becomes [`CHANNEL_NOT_AVAILABLE`].

use crate::domain::models::{RowView, SortKey, SortKeyKind, CHANNEL_NOT_AVAILABLE};

const TIME_SEPARATOR: char = ':';

/// Multipliers for fields read right to left: seconds, minutes, hours.
const FIELD_WEIGHTS: [u64; 3] = [1, 60, 3600];

/// Derive the sort key of one row.
pub fn extract(row: &RowView, kind: SortKeyKind) -> SortKey {
    match kind {
        SortKeyKind::Duration => extract_duration(row),
        SortKeyKind::Channel => extract_channel(row),
    }
}

fn extract_duration(row: &RowView) -> SortKey {
    let Some(text) = row.duration_text.as_deref().filter(|_| row.rendered) else {
        return SortKey::DurationSentinel(String::new());
    };
    parse_duration(text).map_or_else(
        || SortKey::DurationSentinel(text.trim().to_string()),
        SortKey::DurationSeconds,
    )
}

fn extract_channel(row: &RowView) -> SortKey {
    let label = row
        .channel_label
        .as_deref()
        .map(str::trim)
        .filter(|label| !label.is_empty())
        .unwrap_or(CHANNEL_NOT_AVAILABLE);
    SortKey::ChannelLabel(label.to_string())
}

/// Parse `SS`-suffixed timestamps such as `12:34` or `1:02:03` into seconds.
///
/// Returns `None` for single-field labels (`Upcoming`, `LIVE`), for fields
/// that are not numbers and for more than three fields.
pub fn parse_duration(text: &str) -> Option<u64> {
    let fields: Vec<&str> = text.trim().split(TIME_SEPARATOR).collect();
    if fields.len() < 2 || fields.len() > FIELD_WEIGHTS.len() {
        return None;
    }

    fields
        .iter()
        .rev()
        .zip(FIELD_WEIGHTS)
        .try_fold(0u64, |total, (field, weight)| {
            let value: u64 = field.trim().parse().ok()?;
            total.checked_add(value.checked_mul(weight)?)
        })
}
