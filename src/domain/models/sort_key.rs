use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Label substituted when a row carries no readable channel name.
pub const CHANNEL_NOT_AVAILABLE: &str = "Not Available";

/// Direction of the target order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    /// Shortest / alphabetically first at the top.
    #[default]
    #[serde(alias = "asc")]
    Ascending,
    /// Longest / alphabetically last at the top.
    #[serde(alias = "desc")]
    Descending,
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ascending => write!(f, "ascending"),
            Self::Descending => write!(f, "descending"),
        }
    }
}

impl FromStr for SortDirection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "asc" | "ascending" => Ok(Self::Ascending),
            "desc" | "descending" => Ok(Self::Descending),
            other => Err(format!(
                "invalid sort direction '{other}', expected ascending or descending"
            )),
        }
    }
}

/// Which visible value of a row the order is computed from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortKeyKind {
    /// Elapsed duration overlay, e.g. `12:34`.
    #[default]
    #[serde(alias = "dur")]
    Duration,
    /// Channel byline.
    #[serde(alias = "chan")]
    Channel,
}

impl fmt::Display for SortKeyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Duration => write!(f, "duration"),
            Self::Channel => write!(f, "channel"),
        }
    }
}

impl FromStr for SortKeyKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "dur" | "duration" => Ok(Self::Duration),
            "chan" | "channel" => Ok(Self::Channel),
            other => Err(format!(
                "invalid sort key '{other}', expected duration or channel"
            )),
        }
    }
}

/// Sortable value extracted from one rendered row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum SortKey {
    /// Parsed duration in seconds.
    DurationSeconds(u64),
    /// A duration slot holding a non-timestamp label such as `Upcoming`.
    ///
    /// Ranks after every real duration in both directions.
    DurationSentinel(String),
    /// Channel name as displayed; compared case-insensitively.
    ChannelLabel(String),
}

impl SortKey {
    /// Whether this key is the out-of-band duration sentinel.
    pub const fn is_sentinel(&self) -> bool {
        matches!(self, Self::DurationSentinel(_))
    }

    /// Case-folded channel label, if this is a channel key.
    pub fn folded_channel(&self) -> Option<String> {
        match self {
            Self::ChannelLabel(label) => Some(label.to_uppercase()),
            _ => None,
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DurationSeconds(total) => {
                let hours = total / 3600;
                let minutes = (total % 3600) / 60;
                let seconds = total % 60;
                write!(f, "{hours:02}:{minutes:02}:{seconds:02}")
            }
            Self::DurationSentinel(label) => write!(f, "{label}"),
            Self::ChannelLabel(label) => write!(f, "{label}"),
        }
    }
}
