//! Typed errors for parsing, registration and conversion
//!
//! Every failure carries the offending symbol or raw text so callers can
//! report something actionable. No operation falls back to a default value;
//! an unparseable number is an error, never zero.

use thiserror::Error;

use crate::Dimension;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum UnitsError {
    /// Symbol is not in the registry.
    #[error("unknown unit '{symbol}'")]
    UnknownUnit { symbol: String },

    /// Registration collided with an existing symbol.
    #[error("unit '{symbol}' is already registered")]
    DuplicateUnit { symbol: String },

    /// Definition parsed but cannot produce a usable unit.
    #[error("invalid unit definition '{text}': {reason}")]
    InvalidDefinition { reason: String, text: String },

    /// Input does not match `<number> <unit>`.
    #[error("malformed quantity '{text}': expected '<number> <unit>'")]
    MalformedQuantity { text: String },

    /// Input does not match `<symbol> = <number> <unit>`.
    #[error("malformed unit definition '{text}': expected '<symbol> = <number> <unit>'")]
    MalformedDefinition { text: String },

    /// Conversion requested across incompatible dimensions.
    #[error("cannot convert {from} ({from_dim}) to {to} ({to_dim}): incompatible dimensions")]
    DimensionMismatch {
        from: String,
        to: String,
        from_dim: Dimension,
        to_dim: Dimension,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_carry_context() {
        let err = UnitsError::UnknownUnit { symbol: "glorp".to_string() };
        assert!(err.to_string().contains("glorp"));

        let err = UnitsError::DimensionMismatch {
            from: "m".to_string(),
            to: "s".to_string(),
            from_dim: Dimension::LENGTH,
            to_dim: Dimension::TIME,
        };
        let msg = err.to_string();
        assert!(msg.contains("m (L)"));
        assert!(msg.contains("s (T)"));
    }
}
