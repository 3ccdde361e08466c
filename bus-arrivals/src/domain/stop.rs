//! Bus stop identifier type.

use std::fmt;

/// A bus stop identifier as entered by the user.
///
/// Identifiers are opaque to this crate: whatever the upstream API accepts
/// is valid. Surrounding whitespace is trimmed at construction. The empty
/// identifier means "no subscription" and is never sent upstream.
///
/// # Examples
///
/// ```
/// use bus_arrivals::domain::StopId;
///
/// let stop = StopId::new("  83139 ");
/// assert_eq!(stop.as_str(), "83139");
///
/// // Whitespace-only input is the empty sentinel
/// assert!(StopId::new("   ").is_empty());
/// ```
#[derive(Clone, Default, PartialEq, Eq, Hash)]
pub struct StopId(String);

impl StopId {
    /// Create a stop identifier, trimming surrounding whitespace.
    pub fn new(raw: &str) -> Self {
        Self(raw.trim().to_string())
    }

    /// Returns the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this is the "no subscription" sentinel.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<&str> for StopId {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

impl From<String> for StopId {
    fn from(raw: String) -> Self {
        Self::new(&raw)
    }
}

impl fmt::Debug for StopId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StopId({})", self.0)
    }
}

impl fmt::Display for StopId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
