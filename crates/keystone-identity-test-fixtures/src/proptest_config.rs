//! Shared proptest configuration.
//!
//! The default case count follows the active test tier (Cargo features):
//!
//! | Tier     | Feature Flag  | Default Cases |
//! |----------|---------------|---------------|
//! | Fast     | `test-fast`   | 10            |
//! | Standard | (default)     | 50            |
//! | Full     | `test-full`   | 500           |
//!
//! `PROPTEST_CASES` overrides the tier default:
//!
//! ```bash
//! PROPTEST_CASES=100 cargo test
//! ```
//!
//! For async tests drive a `TestRunner` directly:
//!
//! ```no_run
//! use keystone_identity_test_fixtures::proptest_config::proptest_config;
//! use proptest::prelude::*;
//! use proptest::test_runner::TestRunner;
//!
//! let mut runner = TestRunner::new(proptest_config());
//! runner.run(&any::<u32>(), |_input| Ok(())).expect("proptest failed");
//! ```

use proptest::test_runner::Config as ProptestConfig;

/// Test execution tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tier {
    Fast,
    Standard,
    Full,
}

impl Tier {
    #[must_use]
    pub const fn proptest_cases(self) -> u32 {
        match self {
            Self::Fast => 10,
            Self::Standard => 50,
            Self::Full => 500,
        }
    }
}

/// The tier selected by Cargo features. `test-full` wins over `test-fast`.
#[must_use]
pub const fn current_tier() -> Tier {
    if cfg!(feature = "test-full") {
        Tier::Full
    } else if cfg!(feature = "test-fast") {
        Tier::Fast
    } else {
        Tier::Standard
    }
}

pub const DEFAULT_PROPTEST_CASES: u32 = current_tier().proptest_cases();

/// Number of cases to run: `PROPTEST_CASES` if set and valid, otherwise the
/// tier default.
#[must_use]
pub fn test_cases() -> u32 {
    std::env::var("PROPTEST_CASES")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(DEFAULT_PROPTEST_CASES)
}

#[must_use]
pub fn proptest_config() -> ProptestConfig {
    ProptestConfig::with_cases(test_cases())
}
