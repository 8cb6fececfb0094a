//! Content quality tiers.
//!
//! Quality is derived purely from the trimmed character count of the
//! extracted plain text, whatever the output format. The thresholds are
//! empirical and kept tunable here.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Below this the content is `Poor`.
pub const MIN_USABLE_LENGTH: usize = 50;

/// Below this the content is at most `Usable`.
pub const MIN_SHORT_LENGTH: usize = 200;

/// At or above this the content is `Good`.
pub const MIN_GOOD_LENGTH: usize = 800;

/// Ordered quality tier: `Poor < Usable < Short < Good`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Quality {
    /// Fewer than 50 characters.
    Poor,
    /// 50 to 199 characters.
    Usable,
    /// 200 to 799 characters.
    Short,
    /// 800 characters or more.
    Good,
}

impl Quality {
    /// Tier for a character count.
    #[must_use]
    pub const fn from_length(length: usize) -> Self {
        if length >= MIN_GOOD_LENGTH {
            Self::Good
        } else if length >= MIN_SHORT_LENGTH {
            Self::Short
        } else if length >= MIN_USABLE_LENGTH {
            Self::Usable
        } else {
            Self::Poor
        }
    }

    /// Whether callers should be warned about this tier.
    #[must_use]
    pub const fn needs_warning(self) -> bool {
        matches!(self, Self::Poor | Self::Short)
    }

    /// Lowercase tier name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Poor => "poor",
            Self::Usable => "usable",
            Self::Short => "short",
            Self::Good => "good",
        }
    }
}

impl fmt::Display for Quality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Assess the quality of formatted content.
///
/// # Example
///
/// ```rust
/// use rs_harvest::{assess_quality, Quality};
///
/// assert_eq!(assess_quality("  short  "), Quality::Poor);
/// assert_eq!(assess_quality(&"x".repeat(800)), Quality::Good);
/// ```
#[must_use]
pub fn assess_quality(text: &str) -> Quality {
    Quality::from_length(text.trim().chars().count())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_threshold_boundaries() {
        let cases = [
            (0, Quality::Poor),
            (49, Quality::Poor),
            (50, Quality::Usable),
            (199, Quality::Usable),
            (200, Quality::Short),
            (799, Quality::Short),
            (800, Quality::Good),
            (5000, Quality::Good),
        ];
        for (len, expected) in cases {
            assert_eq!(assess_quality(&"a".repeat(len)), expected, "length {len}");
        }
    }

    #[test]
    fn test_monotonic_in_length() {
        let mut previous = Quality::Poor;
        for len in 0..1000 {
            let q = assess_quality(&"b".repeat(len));
            assert!(q >= previous, "quality dropped at {len}");
            previous = q;
        }
    }

    #[test]
    fn test_surrounding_whitespace_is_ignored() {
        let padded = format!("\n\n   {}   \n", "c".repeat(49));
        assert_eq!(assess_quality(&padded), Quality::Poor);
    }

    #[test]
    fn test_warning_tiers() {
        assert!(Quality::Poor.needs_warning());
        assert!(Quality::Short.needs_warning());
        assert!(!Quality::Usable.needs_warning());
        assert!(!Quality::Good.needs_warning());
    }
}
