use std::fmt;

use serde::{Deserialize, Serialize};

/// Closed set of supported venues.
///
/// Every externally-exposed identifier is namespaced as
/// `venue:externalId[:outcome]` so the two venues' ids never collide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Venue {
    Polymarket,
    Kalshi,
}

impl Venue {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Polymarket => "polymarket",
            Self::Kalshi => "kalshi",
        }
    }

    /// Namespace an external id so it is unique across venues.
    #[must_use]
    pub fn namespace(self, external_id: &str) -> String {
        format!("{}:{}", self.as_str(), external_id)
    }
}

impl fmt::Display for Venue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn namespace_prefixes_external_id() {
        assert_eq!(Venue::Polymarket.namespace("abc123"), "polymarket:abc123");
        assert_eq!(Venue::Kalshi.namespace("XYZ-24"), "kalshi:XYZ-24");
    }

    #[test]
    fn display_matches_as_str() {
        assert_eq!(Venue::Polymarket.to_string(), "polymarket");
        assert_eq!(Venue::Kalshi.to_string(), "kalshi");
    }
}
