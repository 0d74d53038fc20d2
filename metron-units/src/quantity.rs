//! Quantity type - a magnitude with an associated unit

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{Dimension, Unit, UnitRegistry, UnitsError};

/// A physical quantity: a numeric magnitude with an associated unit.
///
/// Quantities are transient values owned by the caller; the registry is
/// only read, never mutated, when one is constructed or converted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Quantity {
    pub magnitude: f64,
    pub unit: Unit,
}

impl Quantity {
    pub fn new(magnitude: f64, unit: Unit) -> Self {
        Quantity { magnitude, unit }
    }

    /// The dimension of this quantity
    pub fn dimension(&self) -> Dimension {
        self.unit.dimension
    }

    pub fn is_dimensionless(&self) -> bool {
        self.unit.dimension.is_dimensionless()
    }

    /// Check if two quantities have compatible dimensions
    pub fn is_compatible(&self, other: &Quantity) -> bool {
        self.unit.is_compatible(&other.unit)
    }

    /// The magnitude expressed in the dimension's coherent base unit
    pub fn base_magnitude(&self) -> f64 {
        self.unit.to_base(self.magnitude)
    }

    /// Convert to another unit
    pub fn convert_to(&self, target: &Unit) -> Result<Quantity, UnitsError> {
        let magnitude = self.unit.convert_to(self.magnitude, target)?;
        Ok(Quantity::new(magnitude, target.clone()))
    }

    /// Express this quantity in the canonical unit of its dimension.
    ///
    /// Falls back to a synthesized scale-1 unit named after the dimension
    /// when the registry has no canonical entry (composed dimensions).
    pub fn to_base(&self, registry: &UnitRegistry) -> Quantity {
        let unit = registry.canonical_unit(&self.unit.dimension).unwrap_or_else(|| {
            let symbol = self.unit.dimension.to_string();
            let name = self
                .unit
                .dimension
                .name()
                .map(str::to_string)
                .unwrap_or_else(|| symbol.clone());
            Unit::new(&symbol, &name, self.unit.dimension, 1.0)
        });
        Quantity::new(self.base_magnitude(), unit)
    }

    /// Add two quantities; the result keeps this quantity's unit
    pub fn add(&self, other: &Quantity) -> Result<Quantity, UnitsError> {
        let converted = other.convert_to(&self.unit)?;
        Ok(Quantity::new(self.magnitude + converted.magnitude, self.unit.clone()))
    }

    /// Subtract two quantities; the result keeps this quantity's unit
    pub fn sub(&self, other: &Quantity) -> Result<Quantity, UnitsError> {
        let converted = other.convert_to(&self.unit)?;
        Ok(Quantity::new(self.magnitude - converted.magnitude, self.unit.clone()))
    }

    /// Multiply two quantities (dimensions are multiplied)
    pub fn mul(&self, other: &Quantity) -> Quantity {
        Quantity::new(self.magnitude * other.magnitude, self.unit.multiply(&other.unit))
    }

    /// Divide two quantities (dimensions are divided)
    pub fn div(&self, other: &Quantity) -> Quantity {
        Quantity::new(self.magnitude / other.magnitude, self.unit.divide(&other.unit))
    }

    /// Raise to an integer power
    pub fn powi(&self, exp: i32) -> Quantity {
        Quantity::new(self.magnitude.powi(exp), self.unit.powi(exp))
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.unit.symbol.is_empty() {
            write!(f, "{}", self.magnitude)
        } else {
            write!(f, "{} {}", self.magnitude, self.unit.symbol)
        }
    }
}

impl PartialEq for Quantity {
    fn eq(&self, other: &Self) -> bool {
        self.is_compatible(other) && self.base_magnitude() == other.base_magnitude()
    }
}
