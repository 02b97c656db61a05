//! Symbol identifiers and registry records.

use derive_more::{Display, Into};
use serde::{Deserialize, Serialize};

use crate::SymbolError;

/// A normalized ticker symbol.
///
/// Symbols are trimmed and lowercased, so `" AAPL"` and `"aapl"` name the
/// same series. Only ASCII alphanumerics and `. - ^ = _` are accepted, which
/// keeps a symbol usable as a file stem.
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Display, Into, Serialize, Deserialize,
)]
#[serde(try_from = "String", into = "String")]
pub struct Symbol(String);

impl Symbol {
    /// Normalizes a raw symbol.
    ///
    /// # Errors
    ///
    /// Returns an error if the symbol is empty, starts with `.`, or contains
    /// characters outside the accepted set.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, SymbolError> {
        let normalized = raw.as_ref().trim().to_lowercase();

        if normalized.is_empty() {
            return Err(SymbolError::Empty);
        }

        let invalid = normalized
            .chars()
            .find(|&ch| !(ch.is_ascii_alphanumeric() || matches!(ch, '.' | '-' | '^' | '=' | '_')));
        let leading_dot = normalized.starts_with('.').then_some('.');

        if let Some(ch) = invalid.or(leading_dot) {
            return Err(SymbolError::InvalidCharacter {
                symbol: raw.as_ref().to_string(),
                ch,
            });
        }

        Ok(Self(normalized))
    }

    /// Returns the symbol as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for Symbol {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::str::FromStr for Symbol {
    type Err = SymbolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for Symbol {
    type Error = SymbolError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// A validated symbol and its description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolRecord {
    symbol: Symbol,
    about: String,
}

impl SymbolRecord {
    /// Creates a new record.
    #[must_use]
    pub fn new(symbol: Symbol, about: impl Into<String>) -> Self {
        Self {
            symbol,
            about: about.into(),
        }
    }

    /// Returns the symbol.
    #[must_use]
    pub const fn symbol(&self) -> &Symbol {
        &self.symbol
    }

    /// Returns the description obtained on validation.
    #[must_use]
    pub fn about(&self) -> &str {
        &self.about
    }
}

impl std::fmt::Display for SymbolRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.about, self.symbol)
    }
}
