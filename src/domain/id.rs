//! Domain identifier newtypes.
//!
//! Each id wraps a private inner value so all construction goes through the
//! defined constructors. Strategies and detectors hold these ids only —
//! never references into the stores that own the underlying records.

use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! string_id {
    ($name:ident, $display_prefix:expr) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(String);

        impl $name {
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            #[must_use]
            pub fn generate() -> Self {
                Self(uuid::Uuid::new_v4().to_string())
            }

            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}{}", $display_prefix, self.0)
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self::new(s)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self::new(s)
            }
        }
    };
}

string_id!(MarketId, "");
string_id!(OutcomeId, "");
string_id!(OrderId, "order-");
string_id!(PositionId, "pos-");
string_id!(TradeId, "trade-");
string_id!(SignalId, "sig-");
string_id!(OpportunityId, "opp-");
string_id!(StrategyId, "");
