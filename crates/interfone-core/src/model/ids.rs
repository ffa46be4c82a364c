// ── Core identity types ──
//
// Record ids and the dialable Extension newtype. Extensions carry the
// numeric-aware ordering that defines the canonical apartment order.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ── Record ids ──────────────────────────────────────────────────────

macro_rules! record_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Mint a fresh random id.
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok(Self(Uuid::parse_str(s)?))
            }
        }
    };
}

record_id!(
    /// Stable identifier of an apartment record.
    ApartmentId
);
record_id!(
    /// Stable identifier of a resident record.
    ResidentId
);

// ── Extension ───────────────────────────────────────────────────────

/// A dialable apartment extension: a non-empty string of ASCII digits.
///
/// Ordering is numeric when the digits fit an integer and falls back to
/// lexical comparison otherwise. This ordering *is* the canonical
/// apartment order used for display and artifact generation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Extension(String);

impl Extension {
    /// Parse a raw operator-supplied extension. `None` when the input
    /// is empty or contains anything but ASCII digits.
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        Some(Self(trimmed.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Extension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for Extension {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value).ok_or_else(|| format!("invalid extension '{value}'"))
    }
}

impl From<Extension> for String {
    fn from(ext: Extension) -> Self {
        ext.0
    }
}

impl PartialOrd for Extension {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Extension {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self.0.parse::<u64>(), other.0.parse::<u64>()) {
            // Tie-break equal values lexically so "007" and "7" order stably.
            (Ok(a), Ok(b)) => a.cmp(&b).then_with(|| self.0.cmp(&other.0)),
            _ => self.0.cmp(&other.0),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn extension_rejects_non_digits() {
        assert!(Extension::parse("12a").is_none());
        assert!(Extension::parse("").is_none());
        assert!(Extension::parse("  ").is_none());
        assert!(Extension::parse("1 2").is_none());
    }

    #[test]
    fn extension_trims_whitespace() {
        assert_eq!(Extension::parse(" 101 ").unwrap().as_str(), "101");
    }

    #[test]
    fn extension_orders_numerically() {
        let mut exts = vec![
            Extension::parse("1010").unwrap(),
            Extension::parse("9").unwrap(),
            Extension::parse("101").unwrap(),
        ];
        exts.sort();
        let order: Vec<&str> = exts.iter().map(Extension::as_str).collect();
        assert_eq!(order, ["9", "101", "1010"]);
    }

    #[test]
    fn extension_leading_zeros_order_by_value() {
        let a = Extension::parse("007").unwrap();
        let b = Extension::parse("10").unwrap();
        assert!(a < b);
    }

    #[test]
    fn record_id_round_trips_through_display() {
        let id = ApartmentId::new();
        let parsed: ApartmentId = id.to_string().parse().unwrap();
        assert_eq!(id, parsed);
    }
}
