//! Global financial assumptions
//!
//! One immutable [`Assumptions`] value is built per computation (compiled
//! defaults, then TOML, environment and command line, see [`crate::config`])
//! and passed by reference into every metric. Nothing in the engine mutates it.
//!
//! # Parameter metadata
//!
//! Each tunable is described once in [`Assumptions::metadata`]: key,
//! environment variable, default, range and validator. Loading from any source
//! goes through [`Assumptions::set`], so range checks live in one place.
//!
//! ```rust
//! # use mma_common::assumptions::Assumptions;
//! let rpm = Assumptions::metadata().iter().find(|m| m.key == "rpm").unwrap();
//! assert!((rpm.validator)("4.0").is_ok());
//! assert!((rpm.validator)("12").is_err());
//! ```

use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// Revenue assumptions shared by every metric
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Assumptions {
    /// Revenue per 1,000 views ($)
    ///
    /// Valid range: [0.5, 10.0]
    /// Default: 4.0
    pub rpm: f64,

    /// Average flat fee paid to an artist for the rights to one video ($)
    ///
    /// Valid range: >= 0
    /// Default: 3000
    pub flat_fee: f64,

    /// Average production cost of one video ($)
    ///
    /// Valid range: >= 0
    /// Default: 2000
    pub prod_cost: f64,

    /// Percentage kept by the platform in the proposed revenue share
    ///
    /// Valid range: [0, 50]
    /// Default: 10
    pub platform_cut_pct: f64,

    /// Age after which a video counts as a ghost-income source (years)
    ///
    /// Valid range: [0.5, 10.0]
    /// Default: 2.0
    pub ghost_years: f64,
}

impl Default for Assumptions {
    fn default() -> Self {
        Self {
            rpm: 4.0,
            flat_fee: 3000.0,
            prod_cost: 2000.0,
            platform_cut_pct: 10.0,
            ghost_years: 2.0,
        }
    }
}

/// Metadata for a single assumption
///
/// Validators share the signature `fn(&str) -> Result<(), String>` and report
/// errors as `"{key}: {reason}"`.
pub struct ParamMetadata {
    pub key: &'static str,
    pub env_var: &'static str,
    pub default_value: &'static str,
    pub description: &'static str,
    pub validation_range: &'static str,
    pub validator: fn(&str) -> std::result::Result<(), String>,
}

fn parse_in_range(key: &str, s: &str, min: f64, max: f64) -> std::result::Result<f64, String> {
    let v: f64 = s
        .trim()
        .parse()
        .map_err(|_| format!("{}: invalid number format", key))?;
    if !v.is_finite() || v < min || v > max {
        let upper = if max.is_infinite() {
            "inf".to_string()
        } else {
            max.to_string()
        };
        return Err(format!("{}: value {} out of range [{}, {}]", key, v, min, upper));
    }
    Ok(v)
}

impl Assumptions {
    /// Metadata for all tunable assumptions
    pub fn metadata() -> &'static [ParamMetadata] {
        &[
            ParamMetadata {
                key: "rpm",
                env_var: "MMA_RPM",
                default_value: "4.0",
                description: "Revenue per 1,000 views ($)",
                validation_range: "0.5-10.0",
                validator: |s| parse_in_range("rpm", s, 0.5, 10.0).map(|_| ()),
            },
            ParamMetadata {
                key: "flat_fee",
                env_var: "MMA_FLAT_FEE",
                default_value: "3000",
                description: "Average flat fee paid to the artist per video ($)",
                validation_range: ">=0",
                validator: |s| parse_in_range("flat_fee", s, 0.0, f64::INFINITY).map(|_| ()),
            },
            ParamMetadata {
                key: "prod_cost",
                env_var: "MMA_PROD_COST",
                default_value: "2000",
                description: "Average production cost per video ($)",
                validation_range: ">=0",
                validator: |s| parse_in_range("prod_cost", s, 0.0, f64::INFINITY).map(|_| ()),
            },
            ParamMetadata {
                key: "platform_cut_pct",
                env_var: "MMA_PLATFORM_CUT",
                default_value: "10",
                description: "Platform share of revenue in the proposed deal (%)",
                validation_range: "0-50",
                validator: |s| parse_in_range("platform_cut_pct", s, 0.0, 50.0).map(|_| ()),
            },
            ParamMetadata {
                key: "ghost_years",
                env_var: "MMA_GHOST_YEARS",
                default_value: "2.0",
                description: "Years until a video counts as old (ghost income)",
                validation_range: "0.5-10.0",
                validator: |s| parse_in_range("ghost_years", s, 0.5, 10.0).map(|_| ()),
            },
        ]
    }

    /// Validate and set one assumption by key
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let meta = Self::metadata()
            .iter()
            .find(|m| m.key == key)
            .ok_or_else(|| Error::InvalidInput(format!("unknown assumption '{}'", key)))?;
        (meta.validator)(value).map_err(Error::InvalidInput)?;

        let v: f64 = value
            .trim()
            .parse()
            .map_err(|_| Error::InvalidInput(format!("{}: invalid number format", key)))?;
        match key {
            "rpm" => self.rpm = v,
            "flat_fee" => self.flat_fee = v,
            "prod_cost" => self.prod_cost = v,
            "platform_cut_pct" => self.platform_cut_pct = v,
            "ghost_years" => self.ghost_years = v,
            _ => return Err(Error::InvalidInput(format!("unknown assumption '{}'", key))),
        }
        Ok(())
    }

    /// Current value by key
    pub fn get(&self, key: &str) -> Option<f64> {
        match key {
            "rpm" => Some(self.rpm),
            "flat_fee" => Some(self.flat_fee),
            "prod_cost" => Some(self.prod_cost),
            "platform_cut_pct" => Some(self.platform_cut_pct),
            "ghost_years" => Some(self.ghost_years),
            _ => None,
        }
    }

    /// Check every field against its metadata
    pub fn validate(&self) -> Result<()> {
        for meta in Self::metadata() {
            let value = self.get(meta.key).unwrap_or(f64::NAN);
            (meta.validator)(&value.to_string()).map_err(Error::InvalidInput)?;
        }
        Ok(())
    }

    /// Percentage the artist keeps under the proposed deal
    pub fn artist_cut_pct(&self) -> f64 {
        100.0 - self.platform_cut_pct
    }

    /// Ghost-income age threshold in days
    pub fn ghost_days(&self) -> f64 {
        self.ghost_years * 365.0
    }

    /// Revenue earned by `views` at the configured RPM
    pub fn revenue_for_views(&self, views: f64) -> f64 {
        views / 1000.0 * self.rpm
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let a = Assumptions::default();
        assert!(a.validate().is_ok());
        assert_eq!(a.artist_cut_pct(), 90.0);
        assert_eq!(a.ghost_days(), 730.0);
    }

    #[test]
    fn test_metadata_defaults_match_struct_defaults() {
        let a = Assumptions::default();
        for meta in Assumptions::metadata() {
            let default: f64 = meta.default_value.parse().unwrap();
            assert_eq!(a.get(meta.key), Some(default), "{}", meta.key);
        }
    }

    #[test]
    fn test_set_rejects_out_of_range() {
        let mut a = Assumptions::default();
        assert!(a.set("rpm", "0.4").is_err());
        assert!(a.set("rpm", "10.1").is_err());
        assert!(a.set("platform_cut_pct", "51").is_err());
        assert!(a.set("ghost_years", "0.25").is_err());
        assert!(a.set("flat_fee", "-1").is_err());
        assert!(a.set("prod_cost", "abc").is_err());
        assert_eq!(a, Assumptions::default());
    }

    #[test]
    fn test_set_accepts_boundaries() {
        let mut a = Assumptions::default();
        a.set("rpm", "0.5").unwrap();
        a.set("platform_cut_pct", "50").unwrap();
        a.set("ghost_years", "10").unwrap();
        a.set("flat_fee", "0").unwrap();
        assert_eq!(a.rpm, 0.5);
        assert_eq!(a.platform_cut_pct, 50.0);
        assert_eq!(a.ghost_years, 10.0);
        assert_eq!(a.flat_fee, 0.0);
    }

    #[test]
    fn test_set_unknown_key() {
        let mut a = Assumptions::default();
        assert!(matches!(a.set("volume", "1"), Err(Error::InvalidInput(_))));
    }

    #[test]
    fn test_validate_catches_direct_construction() {
        let a = Assumptions {
            rpm: 20.0,
            ..Default::default()
        };
        assert!(a.validate().is_err());
    }

    #[test]
    fn test_revenue_for_views() {
        let a = Assumptions::default();
        assert_eq!(a.revenue_for_views(1_000_000.0), 4000.0);
    }
}
