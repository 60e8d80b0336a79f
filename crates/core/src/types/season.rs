//! Growing seasons for catalog products.
//!
//! A product carries a *set* of seasons ("plant in Spring or Fall"). The set
//! is stored in the database as a comma-separated canonical list and parsed
//! from the same format in bulk imports and query strings.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Error returned when parsing an unknown season token.
#[derive(thiserror::Error, Debug, Clone)]
#[error("unknown season: {0}. Valid seasons: Spring, Summer, Fall, Winter")]
pub struct SeasonParseError(pub String);

/// A growing season tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Season {
    Spring,
    Summer,
    Fall,
    Winter,
}

impl Season {
    /// Canonical display/storage form.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Spring => "Spring",
            Self::Summer => "Summer",
            Self::Fall => "Fall",
            Self::Winter => "Winter",
        }
    }

    /// Parse a comma-separated season list into a deduplicated set.
    ///
    /// Tokens are trimmed and matched case-insensitively; empty tokens are
    /// skipped, so an empty or all-whitespace input yields an empty set.
    ///
    /// # Errors
    ///
    /// Returns `SeasonParseError` on the first unrecognized token.
    pub fn parse_set(s: &str) -> Result<Vec<Self>, SeasonParseError> {
        let mut seasons = Vec::new();
        for token in s.split(',') {
            let token = token.trim();
            if token.is_empty() {
                continue;
            }
            let season = token.parse::<Self>()?;
            if !seasons.contains(&season) {
                seasons.push(season);
            }
        }
        Ok(seasons)
    }

    /// Pack a season set into the comma-separated storage form.
    #[must_use]
    pub fn pack(seasons: &[Self]) -> String {
        seasons
            .iter()
            .map(Self::as_str)
            .collect::<Vec<_>>()
            .join(",")
    }

    /// Whether two season sets share at least one season.
    ///
    /// An empty `filter` matches everything (no restriction).
    #[must_use]
    pub fn intersects(product: &[Self], filter: &[Self]) -> bool {
        filter.is_empty() || product.iter().any(|s| filter.contains(s))
    }
}

impl fmt::Display for Season {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Season {
    type Err = SeasonParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("spring") {
            Ok(Self::Spring)
        } else if s.eq_ignore_ascii_case("summer") {
            Ok(Self::Summer)
        } else if s.eq_ignore_ascii_case("fall") {
            Ok(Self::Fall)
        } else if s.eq_ignore_ascii_case("winter") {
            Ok(Self::Winter)
        } else {
            Err(SeasonParseError(s.to_owned()))
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_set_trims_and_dedups() {
        let set = Season::parse_set(" spring, Fall ,SPRING").unwrap();
        assert_eq!(set, vec![Season::Spring, Season::Fall]);
    }

    #[test]
    fn test_parse_set_empty_input() {
        assert!(Season::parse_set("").unwrap().is_empty());
        assert!(Season::parse_set("  , ,").unwrap().is_empty());
    }

    #[test]
    fn test_parse_set_rejects_unknown_token() {
        assert!(Season::parse_set("Spring,Monsoon").is_err());
    }

    #[test]
    fn test_pack_round_trip() {
        let set = vec![Season::Summer, Season::Winter];
        let packed = Season::pack(&set);
        assert_eq!(packed, "Summer,Winter");
        assert_eq!(Season::parse_set(&packed).unwrap(), set);
    }

    #[test]
    fn test_intersects() {
        let product = vec![Season::Spring, Season::Fall];
        assert!(Season::intersects(&product, &[]));
        assert!(Season::intersects(&product, &[Season::Fall, Season::Winter]));
        assert!(!Season::intersects(&product, &[Season::Summer]));
    }
}
