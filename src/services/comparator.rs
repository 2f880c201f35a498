//! Total order over sort keys and stable ranking of a snapshot.

use std::cmp::Ordering;

use crate::domain::models::{RankedItem, SortDirection, SortKey};

/// Compare two keys for the given direction.
///
/// Duration sentinels sort after every real duration in both directions.
/// Channel labels compare case-insensitively. Durations sort before channel
/// labels; a single run never mixes the two.
pub fn compare(a: &SortKey, b: &SortKey, direction: SortDirection) -> Ordering {
    match (a, b) {
        (SortKey::DurationSeconds(x), SortKey::DurationSeconds(y)) => directed(x.cmp(y), direction),
        (SortKey::DurationSentinel(_), SortKey::DurationSentinel(_)) => Ordering::Equal,
        (SortKey::DurationSentinel(_), SortKey::DurationSeconds(_)) => Ordering::Greater,
        (SortKey::DurationSeconds(_), SortKey::DurationSentinel(_)) => Ordering::Less,
        (SortKey::ChannelLabel(x), SortKey::ChannelLabel(y)) => {
            directed(x.to_uppercase().cmp(&y.to_uppercase()), direction)
        }
        (SortKey::ChannelLabel(_), _) => Ordering::Greater,
        (_, SortKey::ChannelLabel(_)) => Ordering::Less,
    }
}

const fn directed(ordering: Ordering, direction: SortDirection) -> Ordering {
    match direction {
        SortDirection::Ascending => ordering,
        SortDirection::Descending => ordering.reverse(),
    }
}

/// Rank keys given in current visual order.
///
/// The result is indexed by current position. Desired positions come from a
/// stable sort, so equal keys keep their relative order.
pub fn rank(keys: Vec<SortKey>, direction: SortDirection) -> Vec<RankedItem> {
    let mut order: Vec<usize> = (0..keys.len()).collect();
    order.sort_by(|&a, &b| compare(&keys[a], &keys[b], direction));

    let mut desired = vec![0; keys.len()];
    for (rank, &position) in order.iter().enumerate() {
        desired[position] = rank;
    }

    keys.into_iter()
        .zip(desired)
        .enumerate()
        .map(|(current_position, (key, desired_position))| RankedItem {
            key,
            current_position,
            desired_position,
        })
        .collect()
}
