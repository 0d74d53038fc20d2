//! Dimension vectors for dimensional analysis
//!
//! A unit's physical dimension is a vector of integer exponents over the
//! seven SI base dimensions plus plane angle:
//! [length, mass, time, current, temperature, amount, luminosity, angle]
//!
//! Two units are convertible exactly when their dimension vectors are equal.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Number of base dimension slots.
pub const BASE_DIMENSIONS: usize = 8;

/// The base dimensions, in slot order.
///
/// Plane angle gets its own slot so angle units convert among themselves
/// without being interchangeable with bare numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Base {
    Length = 0,
    Mass,
    Time,
    Current,
    Temperature,
    Amount,
    Luminosity,
    Angle,
}

/// Exponents of the base dimensions identifying a physical quantity kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Dimension {
    exponents: [i32; BASE_DIMENSIONS],
}

impl Dimension {
    /// Dimensionless quantity (all exponents zero)
    pub const DIMENSIONLESS: Dimension = Dimension { exponents: [0, 0, 0, 0, 0, 0, 0, 0] };

    /// Length [L]
    pub const LENGTH: Dimension = Dimension { exponents: [1, 0, 0, 0, 0, 0, 0, 0] };

    /// Mass [M]
    pub const MASS: Dimension = Dimension { exponents: [0, 1, 0, 0, 0, 0, 0, 0] };

    /// Time [T]
    pub const TIME: Dimension = Dimension { exponents: [0, 0, 1, 0, 0, 0, 0, 0] };

    /// Electric current [I]
    pub const CURRENT: Dimension = Dimension { exponents: [0, 0, 0, 1, 0, 0, 0, 0] };

    /// Temperature [Θ]
    pub const TEMPERATURE: Dimension = Dimension { exponents: [0, 0, 0, 0, 1, 0, 0, 0] };

    /// Amount of substance [N]
    pub const AMOUNT: Dimension = Dimension { exponents: [0, 0, 0, 0, 0, 1, 0, 0] };

    /// Luminous intensity [J]
    pub const LUMINOSITY: Dimension = Dimension { exponents: [0, 0, 0, 0, 0, 0, 1, 0] };

    /// Plane angle [A]
    pub const ANGLE: Dimension = Dimension { exponents: [0, 0, 0, 0, 0, 0, 0, 1] };

    /// Velocity [L T^-1]
    pub const VELOCITY: Dimension = Dimension { exponents: [1, 0, -1, 0, 0, 0, 0, 0] };

    /// Acceleration [L T^-2]
    pub const ACCELERATION: Dimension = Dimension { exponents: [1, 0, -2, 0, 0, 0, 0, 0] };

    /// Force [M L T^-2]
    pub const FORCE: Dimension = Dimension { exponents: [1, 1, -2, 0, 0, 0, 0, 0] };

    /// Energy [M L^2 T^-2]
    pub const ENERGY: Dimension = Dimension { exponents: [2, 1, -2, 0, 0, 0, 0, 0] };

    /// Power [M L^2 T^-3]
    pub const POWER: Dimension = Dimension { exponents: [2, 1, -3, 0, 0, 0, 0, 0] };

    /// Pressure [M L^-1 T^-2]
    pub const PRESSURE: Dimension = Dimension { exponents: [-1, 1, -2, 0, 0, 0, 0, 0] };

    /// Area [L^2]
    pub const AREA: Dimension = Dimension { exponents: [2, 0, 0, 0, 0, 0, 0, 0] };

    /// Volume [L^3]
    pub const VOLUME: Dimension = Dimension { exponents: [3, 0, 0, 0, 0, 0, 0, 0] };

    /// Frequency [T^-1]
    pub const FREQUENCY: Dimension = Dimension { exponents: [0, 0, -1, 0, 0, 0, 0, 0] };

    /// Create a dimension from raw exponents
    pub fn new(exponents: [i32; BASE_DIMENSIONS]) -> Self {
        Dimension { exponents }
    }

    /// The dimension of a single base quantity
    pub fn base(base: Base) -> Self {
        let mut exponents = [0; BASE_DIMENSIONS];
        exponents[base as usize] = 1;
        Dimension { exponents }
    }

    /// Exponent of one base dimension
    pub fn exponent(&self, base: Base) -> i32 {
        self.exponents[base as usize]
    }

    /// Check if this is a dimensionless quantity
    pub fn is_dimensionless(&self) -> bool {
        self.exponents.iter().all(|&e| e == 0)
    }

    /// Multiply dimensions (add exponents)
    pub fn multiply(&self, other: &Dimension) -> Dimension {
        Dimension {
            exponents: std::array::from_fn(|i| self.exponents[i] + other.exponents[i]),
        }
    }

    /// Divide dimensions (subtract exponents)
    pub fn divide(&self, other: &Dimension) -> Dimension {
        Dimension {
            exponents: std::array::from_fn(|i| self.exponents[i] - other.exponents[i]),
        }
    }

    /// Raise to an integer power (scale exponents)
    pub fn powi(&self, exp: i32) -> Dimension {
        Dimension {
            exponents: std::array::from_fn(|i| self.exponents[i] * exp),
        }
    }

    /// Invert (negate exponents)
    pub fn invert(&self) -> Dimension {
        self.powi(-1)
    }

    /// Name of the dimension if it matches a common one
    pub fn name(&self) -> Option<&'static str> {
        match self.exponents {
            [0, 0, 0, 0, 0, 0, 0, 0] => Some("dimensionless"),
            [1, 0, 0, 0, 0, 0, 0, 0] => Some("length"),
            [0, 1, 0, 0, 0, 0, 0, 0] => Some("mass"),
            [0, 0, 1, 0, 0, 0, 0, 0] => Some("time"),
            [0, 0, 0, 1, 0, 0, 0, 0] => Some("current"),
            [0, 0, 0, 0, 1, 0, 0, 0] => Some("temperature"),
            [0, 0, 0, 0, 0, 1, 0, 0] => Some("amount"),
            [0, 0, 0, 0, 0, 0, 1, 0] => Some("luminosity"),
            [0, 0, 0, 0, 0, 0, 0, 1] => Some("angle"),
            [1, 0, -1, 0, 0, 0, 0, 0] => Some("velocity"),
            [1, 0, -2, 0, 0, 0, 0, 0] => Some("acceleration"),
            [1, 1, -2, 0, 0, 0, 0, 0] => Some("force"),
            [2, 1, -2, 0, 0, 0, 0, 0] => Some("energy"),
            [2, 1, -3, 0, 0, 0, 0, 0] => Some("power"),
            [-1, 1, -2, 0, 0, 0, 0, 0] => Some("pressure"),
            [2, 0, 0, 0, 0, 0, 0, 0] => Some("area"),
            [3, 0, 0, 0, 0, 0, 0, 0] => Some("volume"),
            [0, 0, -1, 0, 0, 0, 0, 0] => Some("frequency"),
            _ => None,
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbols = ["L", "M", "T", "I", "Θ", "N", "J", "A"];
        let mut parts = Vec::new();

        for (i, &exp) in self.exponents.iter().enumerate() {
            if exp == 1 {
                parts.push(symbols[i].to_string());
            } else if exp != 0 {
                parts.push(format!("{}^{}", symbols[i], exp));
            }
        }

        if parts.is_empty() {
            write!(f, "1")
        } else {
            write!(f, "{}", parts.join(" "))
        }
    }
}

impl Default for Dimension {
    fn default() -> Self {
        Self::DIMENSIONLESS
    }
}
