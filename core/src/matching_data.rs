//! `MatchingData` — Type-erased data that flows between `DataInput` and `InputMatcher`
//!
//! `DataInputs` produce `MatchingData`, and `InputMatchers` consume it.
//! Erasing at the data level keeps `InputMatchers` non-generic, so the same
//! `ExactMatcher` can test a protocol name or an address.

use std::fmt::Debug;

/// The erased data type that flows between `DataInput` and `InputMatcher`.
///
/// # Variants
///
/// - `None` — No data available (extractor returned nothing)
/// - `String` — String data (protocol names, addresses)
/// - `Int` — Integer data (ports)
///
/// # Example
///
/// ```
/// use firesim::MatchingData;
///
/// let data = MatchingData::String("TCP".to_string());
/// assert_eq!(data.as_str(), Some("TCP"));
/// assert!(!data.is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum MatchingData {
    /// No data available (extractor returned nothing).
    /// When a predicate receives this, it evaluates to `false`.
    #[default]
    None,

    /// String data.
    String(String),

    /// Integer data.
    Int(i64),
}

impl MatchingData {
    /// Returns `true` if this is the `None` variant.
    ///
    /// # Example
    ///
    /// ```
    /// use firesim::MatchingData;
    ///
    /// assert!(MatchingData::None.is_none());
    /// assert!(!MatchingData::Int(80).is_none());
    /// ```
    #[inline]
    #[must_use]
    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }

    /// Try to get the value as a string slice.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s.as_str()),
            _ => Option::None,
        }
    }

    /// Try to get the value as an integer.
    #[inline]
    #[must_use]
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            _ => Option::None,
        }
    }

    /// Returns a static string describing the variant.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::String(_) => "string",
            Self::Int(_) => "int",
        }
    }
}

impl From<String> for MatchingData {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<&str> for MatchingData {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<i64> for MatchingData {
    fn from(i: i64) -> Self {
        Self::Int(i)
    }
}

impl From<u16> for MatchingData {
    fn from(i: u16) -> Self {
        Self::Int(i64::from(i))
    }
}

impl<T> From<Option<T>> for MatchingData
where
    T: Into<MatchingData>,
{
    fn from(opt: Option<T>) -> Self {
        match opt {
            Some(v) => v.into(),
            Option::None => Self::None,
        }
    }
}
