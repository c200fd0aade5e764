//! `InputMatcher` — Domain-agnostic value matching
//!
//! The `InputMatcher` trait matches against type-erased `MatchingData`.
//! It is intentionally **non-generic**: one matcher type serves every
//! context type.
//!
//! # Available Matchers
//!
//! - [`ExactMatcher`] — Exact string equality
//! - [`IntMatcher`] — Exact integer equality

use crate::MatchingData;
use std::fmt::Debug;

/// Matches against type-erased [`MatchingData`].
///
/// # Example
///
/// ```
/// use firesim::{InputMatcher, MatchingData, ExactMatcher};
///
/// let matcher = ExactMatcher::new("TCP");
/// assert!(matcher.matches(&MatchingData::String("TCP".to_string())));
/// assert!(!matcher.matches(&MatchingData::String("UDP".to_string())));
/// ```
#[diagnostic::on_unimplemented(
    message = "`{Self}` does not implement `InputMatcher`",
    label = "this type cannot match against MatchingData",
    note = "implement the `matches(&self, &MatchingData) -> bool` method or use ExactMatcher / IntMatcher"
)]
pub trait InputMatcher: Send + Sync + Debug {
    /// Check if the given value matches.
    ///
    /// Returns `false` if the value type is incompatible with this matcher.
    fn matches(&self, value: &MatchingData) -> bool;
}

#[diagnostic::do_not_recommend]
impl InputMatcher for Box<dyn InputMatcher> {
    fn matches(&self, value: &MatchingData) -> bool {
        (**self).matches(value)
    }
}

/// Exact string equality matcher.
///
/// Case-sensitive and untrimmed: callers normalize before building it.
///
/// ```
/// use firesim::{InputMatcher, ExactMatcher};
///
/// let matcher = ExactMatcher::new("10.0.0.5");
/// assert!(matcher.matches(&"10.0.0.5".into()));
/// assert!(!matcher.matches(&"10.0.0.50".into()));
/// ```
#[derive(Debug, Clone)]
pub struct ExactMatcher {
    expected: String,
}

impl ExactMatcher {
    /// Create a new exact matcher with the given expected value.
    pub fn new(expected: impl Into<String>) -> Self {
        Self {
            expected: expected.into(),
        }
    }

    /// Returns the expected value.
    #[must_use]
    pub fn expected(&self) -> &str {
        &self.expected
    }
}

impl InputMatcher for ExactMatcher {
    fn matches(&self, value: &MatchingData) -> bool {
        value.as_str().is_some_and(|s| s == self.expected)
    }
}

/// Exact integer equality matcher.
///
/// ```
/// use firesim::{InputMatcher, IntMatcher, MatchingData};
///
/// let matcher = IntMatcher::new(443);
/// assert!(matcher.matches(&MatchingData::Int(443)));
/// assert!(!matcher.matches(&"443".into()));
/// ```
#[derive(Debug, Clone, Copy)]
pub struct IntMatcher {
    expected: i64,
}

impl IntMatcher {
    /// Create a new integer matcher.
    #[must_use]
    pub fn new(expected: i64) -> Self {
        Self { expected }
    }

    /// Returns the expected value.
    #[must_use]
    pub fn expected(&self) -> i64 {
        self.expected
    }
}

impl InputMatcher for IntMatcher {
    fn matches(&self, value: &MatchingData) -> bool {
        value.as_int() == Some(self.expected)
    }
}
