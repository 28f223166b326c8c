//! Tri-state operation result
//!
//! `Result<Outcome<T>>` carries the three outcomes a provider call can
//! have: `Err` for a failure, `Ok` with no warnings for a clean success,
//! and `Ok` with warnings for a success that needs the caller's attention.

use serde::{Deserialize, Serialize};

/// Value produced by a successful operation plus any warnings raised on the way
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Outcome<T> {
    pub value: T,
    pub warnings: Vec<String>,
}

impl<T> Outcome<T> {
    /// Clean success
    pub fn ok(value: T) -> Self {
        Self {
            value,
            warnings: Vec::new(),
        }
    }

    /// Success carrying one warning
    pub fn with_warning<S: Into<String>>(value: T, warning: S) -> Self {
        Self {
            value,
            warnings: vec![warning.into()],
        }
    }

    /// Append a warning
    pub fn warn<S: Into<String>>(&mut self, warning: S) {
        self.warnings.push(warning.into());
    }

    /// Append several warnings
    pub fn extend_warnings<I: IntoIterator<Item = String>>(&mut self, warnings: I) {
        self.warnings.extend(warnings);
    }

    /// Whether the success carries warnings
    pub fn is_warning(&self) -> bool {
        !self.warnings.is_empty()
    }

    /// Always false; failures are represented by `Err`
    pub fn is_error(&self) -> bool {
        false
    }

    /// Transform the value, keeping the warnings
    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> Outcome<U> {
        Outcome {
            value: f(self.value),
            warnings: self.warnings,
        }
    }

    pub fn into_value(self) -> T {
        self.value
    }
}

impl<T> From<T> for Outcome<T> {
    fn from(value: T) -> Self {
        Self::ok(value)
    }
}
