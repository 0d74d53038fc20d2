//! Metron Units - Quantity Parsing and Unit Conversion
//!
//! A units-of-measure engine: parses textual quantities ("2 m"), converts
//! magnitudes between compatible units, answers dimensional-compatibility
//! questions, and registers new derived units at run time from definition
//! strings ("football_field = 100 yd").
//!
//! Units carry a dimension vector (exponents over the seven SI base
//! dimensions plus plane angle) and an affine map onto the coherent base
//! unit of that dimension, so converting between any two compatible units
//! is a single composition through the base - no pairwise factor table.
//!
//! The registry is a value owned by the caller; independent registries can
//! coexist, and a single registry can be shared across threads.
//!
//! ```
//! use metron_units::{add_unit_definition, get_magnitude_in_unit, UnitRegistry};
//!
//! let registry = UnitRegistry::with_builtins();
//!
//! let cm = get_magnitude_in_unit(&registry, "2 m", "cm").unwrap();
//! assert!((cm - 200.0).abs() < 1e-9);
//!
//! add_unit_definition(&registry, "football_field = 100 yd").unwrap();
//! let fields = get_magnitude_in_unit(&registry, "150 ft", "football_field").unwrap();
//! assert!((fields - 0.5).abs() < 1e-9);
//! ```

mod convert;
mod dimension;
mod error;
mod parse;
mod quantity;
mod unit;
mod units;

pub use convert::{
    add_unit_definition, get_magnitude_in_unit, have_same_dimensions, unit_convert_string,
};
pub use dimension::{Base, Dimension, BASE_DIMENSIONS};
pub use error::UnitsError;
pub use parse::{parse_definition, parse_quantity, parse_unit_expr, UnitDefinition};
pub use quantity::Quantity;
pub use unit::Unit;
pub use units::{DuplicatePolicy, UnitRegistry};
