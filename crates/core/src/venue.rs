use serde::{Deserialize, Serialize};

/// A trading venue taking part in the cross-venue pair.
///
/// Polymarket is "venue A" and Kalshi is "venue B" everywhere in the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Venue {
    /// Polymarket CLOB (venue A).
    #[serde(alias = "pm", alias = "poly", alias = "POLYMARKET", alias = "PM")]
    Polymarket,
    /// Kalshi exchange (venue B).
    #[serde(alias = "k", alias = "KALSHI", alias = "K")]
    Kalshi,
}

impl Venue {
    /// Returns the other venue of the pair.
    #[must_use]
    pub fn other(self) -> Self {
        match self {
            Self::Polymarket => Self::Kalshi,
            Self::Kalshi => Self::Polymarket,
        }
    }

    /// Returns the display name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Polymarket => "Polymarket",
            Self::Kalshi => "Kalshi",
        }
    }
}

impl std::fmt::Display for Venue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Venue {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "polymarket" | "poly" | "pm" => Ok(Self::Polymarket),
            "kalshi" | "k" => Ok(Self::Kalshi),
            other => Err(format!("unknown venue: {other}")),
        }
    }
}
