//! Unit representation with conversion factors
//!
//! Every unit stores its affine map onto the coherent base unit of its
//! dimension: `base = magnitude * scale + offset`. Conversion between two
//! units is a single composition through that base, so the registry never
//! needs a pairwise factor table.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{Dimension, UnitsError};

/// A named physical unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Unit {
    /// Symbol used for lookup and display (e.g. "m", "kg", "ft")
    pub symbol: String,
    /// Spelled-out name (e.g. "meter", "kilogram", "foot")
    pub name: String,
    /// The dimensional signature
    pub dimension: Dimension,
    /// Multiplicative factor onto the coherent base unit. Finite and nonzero.
    pub scale: f64,
    /// Additive part of the base map; nonzero only for affine units
    /// such as degree Celsius.
    pub offset: f64,
}

impl Unit {
    /// A purely multiplicative unit (no offset)
    pub fn new(symbol: &str, name: &str, dimension: Dimension, scale: f64) -> Self {
        Unit {
            symbol: symbol.to_string(),
            name: name.to_string(),
            dimension,
            scale,
            offset: 0.0,
        }
    }

    /// An affine unit (temperature scales)
    pub fn with_offset(
        symbol: &str,
        name: &str,
        dimension: Dimension,
        scale: f64,
        offset: f64,
    ) -> Self {
        Unit {
            symbol: symbol.to_string(),
            name: name.to_string(),
            dimension,
            scale,
            offset,
        }
    }

    /// True for the coherent base unit of a dimension
    pub fn is_base(&self) -> bool {
        self.scale == 1.0 && self.offset == 0.0
    }

    /// True when conversion needs the additive offset
    pub fn is_affine(&self) -> bool {
        self.offset != 0.0
    }

    /// Check if two units are dimensionally compatible (can be converted)
    pub fn is_compatible(&self, other: &Unit) -> bool {
        self.dimension == other.dimension
    }

    /// Map a magnitude in this unit onto the coherent base unit
    pub fn to_base(&self, magnitude: f64) -> f64 {
        magnitude * self.scale + self.offset
    }

    /// Map a base-unit magnitude back into this unit
    pub fn from_base(&self, base: f64) -> f64 {
        (base - self.offset) / self.scale
    }

    /// Convert a magnitude from this unit into `target`
    pub fn convert_to(&self, magnitude: f64, target: &Unit) -> Result<f64, UnitsError> {
        if !self.is_compatible(target) {
            return Err(UnitsError::DimensionMismatch {
                from: self.symbol.clone(),
                to: target.symbol.clone(),
                from_dim: self.dimension,
                to_dim: target.dimension,
            });
        }
        Ok(target.from_base(self.to_base(magnitude)))
    }

    /// Multiply two units (e.g. N * m). Offsets do not survive composition.
    pub fn multiply(&self, other: &Unit) -> Unit {
        Unit {
            symbol: format!("{}*{}", self.symbol, other.symbol),
            name: format!("{} {}", self.name, other.name),
            dimension: self.dimension.multiply(&other.dimension),
            scale: self.scale * other.scale,
            offset: 0.0,
        }
    }

    /// Divide two units (e.g. m / s)
    pub fn divide(&self, other: &Unit) -> Unit {
        Unit {
            symbol: format!("{}/{}", self.symbol, other.symbol),
            name: format!("{} per {}", self.name, other.name),
            dimension: self.dimension.divide(&other.dimension),
            scale: self.scale / other.scale,
            offset: 0.0,
        }
    }

    /// Raise a unit to an integer power (e.g. m^2)
    pub fn powi(&self, exp: i32) -> Unit {
        if exp == 1 {
            return self.clone();
        }
        Unit {
            symbol: format!("{}^{}", self.symbol, exp),
            name: format!("{}^{}", self.name, exp),
            dimension: self.dimension.powi(exp),
            scale: self.scale.powi(exp),
            offset: 0.0,
        }
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol)
    }
}
