//! Processing guarantee levels and their combination

use crate::error::Error;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// Delivery guarantee of a processing pipeline, from weakest to strongest
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProcessingGuarantee {
    /// Items may be lost or processed more than once after a failure
    #[default]
    None,
    /// Every item is processed, possibly more than once after a failure
    AtLeastOnce,
    /// Every item is processed exactly once, even after a failure
    ExactlyOnce,
}

impl ProcessingGuarantee {
    /// All levels in ascending strength
    pub const ALL: [ProcessingGuarantee; 3] = [Self::None, Self::AtLeastOnce, Self::ExactlyOnce];

    /// Strength ordinal; ordering is defined on this, not on declaration order
    pub const fn rank(self) -> u8 {
        match self {
            Self::None => 0,
            Self::AtLeastOnce => 1,
            Self::ExactlyOnce => 2,
        }
    }

    /// The weaker of two guarantees
    pub fn min(self, other: Self) -> Self {
        if other.rank() < self.rank() {
            other
        } else {
            self
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::None => "NONE",
            Self::AtLeastOnce => "AT_LEAST_ONCE",
            Self::ExactlyOnce => "EXACTLY_ONCE",
        }
    }
}

/// The weaker of two guarantees; a pipeline is only as strong as its weakest stage.
pub fn min(a: ProcessingGuarantee, b: ProcessingGuarantee) -> ProcessingGuarantee {
    a.min(b)
}

impl PartialOrd for ProcessingGuarantee {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ProcessingGuarantee {
    fn cmp(&self, other: &Self) -> Ordering {
        self.rank().cmp(&other.rank())
    }
}

impl fmt::Display for ProcessingGuarantee {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProcessingGuarantee {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|g| g.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| Error::invalid_argument(format!("unknown processing guarantee: {s}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ProcessingGuarantee::{AtLeastOnce, ExactlyOnce};

    const NONE: ProcessingGuarantee = ProcessingGuarantee::None;

    #[test]
    fn test_min_guarantee() {
        assert_eq!(min(NONE, AtLeastOnce), NONE);
        assert_eq!(min(AtLeastOnce, ExactlyOnce), AtLeastOnce);
        assert_eq!(min(NONE, ExactlyOnce), NONE);
        assert_eq!(min(NONE, NONE), NONE);
        assert_eq!(min(ExactlyOnce, AtLeastOnce), AtLeastOnce);
        assert_eq!(ExactlyOnce.min(ExactlyOnce), ExactlyOnce);
    }

    #[test]
    fn test_min_is_symmetric() {
        for a in ProcessingGuarantee::ALL {
            for b in ProcessingGuarantee::ALL {
                assert_eq!(min(a, b), min(b, a));
                assert!(min(a, b) <= a && min(a, b) <= b);
            }
        }
    }

    #[test]
    fn test_ordering_follows_rank() {
        assert!(NONE < AtLeastOnce);
        assert!(AtLeastOnce < ExactlyOnce);
        assert_eq!(ProcessingGuarantee::ALL.iter().max(), Some(&ExactlyOnce));
        assert_eq!(ProcessingGuarantee::default(), NONE);
    }

    #[test]
    fn test_display_and_parse() {
        for g in ProcessingGuarantee::ALL {
            assert_eq!(g.to_string().parse::<ProcessingGuarantee>().unwrap(), g);
        }
        assert_eq!("exactly_once".parse::<ProcessingGuarantee>().unwrap(), ExactlyOnce);
        assert!("twice".parse::<ProcessingGuarantee>().unwrap_err().is_invalid_argument());
    }

    #[test]
    fn test_serialization() {
        let json = serde_json::to_string(&AtLeastOnce).unwrap();
        assert_eq!(json, r#""AT_LEAST_ONCE""#);

        let parsed: ProcessingGuarantee = serde_json::from_str(r#""EXACTLY_ONCE""#).unwrap();
        assert_eq!(parsed, ExactlyOnce);
    }
}
