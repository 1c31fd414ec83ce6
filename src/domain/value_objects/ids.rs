use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a country/region whose market and local currency this is.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct RegionId(pub u32);

impl fmt::Display for RegionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Slug identifying a tradable good ("grain", "iron", "weapon", ...).
///
/// Lowercase ASCII letters, digits and hyphens, 1..=50 chars.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct GoodId(String);

impl GoodId {
    pub fn new(slug: impl Into<String>) -> Result<Self, &'static str> {
        let slug = slug.into();
        if slug.is_empty() || slug.len() > 50 {
            return Err("Good slug must be 1..=50 characters");
        }
        if !slug
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
        {
            return Err("Good slug must be lowercase ASCII letters, digits or hyphens");
        }
        Ok(GoodId(slug))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for GoodId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// What a market trades against the region's local currency.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TradedGood {
    /// A resource at a quality tier (0 for quality-less goods, 1..=5 otherwise).
    Resource { good: GoodId, quality: u8 },
    /// The global gold currency, exchanged against local currency.
    Gold,
}

impl TradedGood {
    pub fn resource(good: GoodId, quality: u8) -> Self {
        TradedGood::Resource { good, quality }
    }

    pub fn is_gold(&self) -> bool {
        matches!(self, TradedGood::Gold)
    }
}

impl fmt::Display for TradedGood {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TradedGood::Resource { good, quality } => {
                if *quality > 0 {
                    write!(f, "{} Q{}", good, quality)
                } else {
                    write!(f, "{}", good)
                }
            }
            TradedGood::Gold => write!(f, "gold"),
        }
    }
}

/// Identity of one price-level market: a traded good on one region's market.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MarketId {
    pub region: RegionId,
    pub good: TradedGood,
}

impl MarketId {
    pub fn resource(region: RegionId, good: GoodId, quality: u8) -> Self {
        MarketId {
            region,
            good: TradedGood::Resource { good, quality },
        }
    }

    pub fn gold(region: RegionId) -> Self {
        MarketId {
            region,
            good: TradedGood::Gold,
        }
    }
}

impl fmt::Display for MarketId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.good, self.region)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_good_slug_validation() {
        assert!(GoodId::new("grain").is_ok());
        assert!(GoodId::new("iron-ore").is_ok());
        assert!(GoodId::new("").is_err());
        assert!(GoodId::new("Grain").is_err());
        assert!(GoodId::new("iron ore").is_err());
    }

    #[test]
    fn test_market_id_display() {
        let id = MarketId::resource(RegionId(7), GoodId::new("weapon").unwrap(), 3);
        assert_eq!(id.to_string(), "weapon Q3@7");
        assert_eq!(MarketId::gold(RegionId(7)).to_string(), "gold@7");
    }
}
