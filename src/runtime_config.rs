//! # Runtime Configuration Module
//!
//! Environment-driven knobs for the two input-handling decisions that have more
//! than one defensible answer.
//!
//! ## Environment Variables
//!
//! ### `OAS_PARAM_ODD_PAIRS`
//!
//! How a non-exploded object parameter with an odd number of comma-separated
//! elements is handled (`color=R,100,G`):
//! - `reject` (default): fail with `MalformedValue`
//! - `drop`: drop the trailing key and log a warning
//!
//! ### `OAS_PARAM_STRICT_BOOLEANS`
//!
//! Boolean parameters map `"true"` to `true` and every other string to `false`.
//! Setting this to `true` makes anything other than `true`/`false` a
//! `ConversionError` instead.
//!
//! Default: `false`
//!
//! ## Usage
//!
//! ```rust
//! use oas_param::runtime_config::{OddPairPolicy, ParamConfig};
//!
//! let config = ParamConfig::from_env();
//! println!("odd pairs: {:?}", config.odd_pairs);
//!
//! let strict = ParamConfig {
//!     odd_pairs: OddPairPolicy::Reject,
//!     strict_booleans: true,
//! };
//! assert!(strict.strict_booleans);
//! ```

use std::env;

/// Policy for an odd-length `key,value,...` list in a non-exploded object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OddPairPolicy {
    /// Fail the extraction with `MalformedValue`
    #[default]
    Reject,
    /// Ignore the unpaired trailing key
    DropTrailing,
}

impl OddPairPolicy {
    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "drop" | "drop-trailing" | "drop_trailing" => OddPairPolicy::DropTrailing,
            _ => OddPairPolicy::Reject,
        }
    }
}

/// Parameter handling configuration.
///
/// Load it at startup with [`ParamConfig::from_env()`] and hand it to
/// [`crate::spec::ParameterSpec::with_config`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ParamConfig {
    /// What to do with an unpaired trailing key (default: reject)
    pub odd_pairs: OddPairPolicy,
    /// Reject booleans other than `true`/`false` (default: false)
    pub strict_booleans: bool,
}

impl ParamConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let odd_pairs = env::var("OAS_PARAM_ODD_PAIRS")
            .map(|v| OddPairPolicy::parse(&v))
            .unwrap_or_default();
        let strict_booleans = env::var("OAS_PARAM_STRICT_BOOLEANS")
            .map(|v| parse_flag(&v))
            .unwrap_or(false);
        ParamConfig {
            odd_pairs,
            strict_booleans,
        }
    }
}

fn parse_flag(val: &str) -> bool {
    matches!(
        val.trim().to_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
