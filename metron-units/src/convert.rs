//! High-level string operations - the engine's host-facing surface
//!
//! Four operations cover everything an embedding host needs: convert a
//! quantity string and render the result, get the raw magnitude, compare
//! dimensions, and register a new unit from a definition string. All of
//! them take the registry explicitly; there is no process-global state.

use tracing::debug;

use crate::parse::{parse_definition, parse_quantity, parse_unit_expr};
use crate::{Dimension, UnitRegistry, UnitsError};

/// Convert a quantity string into `target_unit` and return the magnitude.
///
/// `get_magnitude_in_unit(&reg, "2 m", "cm")` returns `200.0`.
pub fn get_magnitude_in_unit(
    registry: &UnitRegistry,
    text: &str,
    target_unit: &str,
) -> Result<f64, UnitsError> {
    let quantity = parse_quantity(registry, text)?;
    let target = parse_unit_expr(registry, target_unit)?;
    Ok(quantity.convert_to(&target)?.magnitude)
}

/// Convert a quantity string and render it as `"<magnitude> <target_unit>"`.
///
/// The magnitude renders as the shortest decimal that round-trips to the
/// same double; the target unit text is appended verbatim after a single
/// space.
pub fn unit_convert_string(
    registry: &UnitRegistry,
    text: &str,
    target_unit: &str,
) -> Result<String, UnitsError> {
    let magnitude = get_magnitude_in_unit(registry, text, target_unit)?;
    Ok(format!("{} {}", magnitude, target_unit.trim()))
}

/// Check whether two inputs share a physical dimension.
///
/// Each input may be a bare unit expression (`"ft"`, `"m/s"`) or a full
/// quantity string (`"2 m"`). An unresolvable unit is an error, never
/// `false`: an absent unit is a distinct failure mode from a dimension
/// mismatch.
pub fn have_same_dimensions(
    registry: &UnitRegistry,
    a: &str,
    b: &str,
) -> Result<bool, UnitsError> {
    Ok(resolve_dimension(registry, a)? == resolve_dimension(registry, b)?)
}

/// Parse a definition string like `"football_field = 100 yd"` and register
/// the new unit. Failure at any step leaves the registry untouched.
pub fn add_unit_definition(registry: &UnitRegistry, def_text: &str) -> Result<(), UnitsError> {
    let definition = parse_definition(registry, def_text)?;
    debug!(symbol = %definition.symbol, "registering unit definition");
    registry.register(definition.unit)
}

/// The dimension of either a quantity string or a bare unit expression.
fn resolve_dimension(registry: &UnitRegistry, text: &str) -> Result<Dimension, UnitsError> {
    match parse_quantity(registry, text) {
        Ok(quantity) => Ok(quantity.dimension()),
        // no leading number: treat the input as a unit expression
        Err(UnitsError::MalformedQuantity { .. }) => {
            Ok(parse_unit_expr(registry, text)?.dimension)
        }
        Err(err) => Err(err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> UnitRegistry {
        UnitRegistry::with_builtins()
    }

    fn assert_close(actual: f64, expected: f64, tolerance: f64) {
        assert!(
            (actual - expected).abs() <= tolerance * expected.abs().max(1.0),
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn test_unit_convert_string() {
        let reg = registry();
        let rendered = unit_convert_string(&reg, "2 m", "ft").unwrap();
        assert!(rendered.starts_with("6.56"), "got {rendered}");
        assert!(rendered.ends_with(" ft"), "got {rendered}");
    }

    #[test]
    fn test_get_magnitude_in_unit() {
        let reg = registry();
        let cm = get_magnitude_in_unit(&reg, "2 m", "cm").unwrap();
        assert_close(cm, 200.0, 1e-6);
    }

    #[test]
    fn test_have_same_dimensions() {
        let reg = registry();
        assert!(have_same_dimensions(&reg, "2 m", "ft").unwrap());
        assert!(!have_same_dimensions(&reg, "2 m", "s").unwrap());
        // bare unit expressions work on either side
        assert!(have_same_dimensions(&reg, "mph", "m/s").unwrap());
        assert!(have_same_dimensions(&reg, "N", "kg m / s^2").unwrap());
    }

    #[test]
    fn test_have_same_dimensions_is_symmetric() {
        let reg = registry();
        for (a, b) in [("2 m", "ft"), ("2 m", "s"), ("kg", "lb"), ("rad", "m")] {
            assert_eq!(
                have_same_dimensions(&reg, a, b).unwrap(),
                have_same_dimensions(&reg, b, a).unwrap(),
                "asymmetric for ({a}, {b})"
            );
        }
    }

    #[test]
    fn test_have_same_dimensions_unknown_unit_is_an_error() {
        let reg = registry();
        assert!(matches!(
            have_same_dimensions(&reg, "2 m", "glorp"),
            Err(UnitsError::UnknownUnit { .. })
        ));
        assert!(matches!(
            have_same_dimensions(&reg, "glorp", "2 m"),
            Err(UnitsError::UnknownUnit { .. })
        ));
    }

    #[test]
    fn test_add_unit_definition() {
        let reg = registry();
        add_unit_definition(&reg, "football_field = 100 yd").unwrap();

        // 150 ft = 50 yd = half a football field
        let fields = get_magnitude_in_unit(&reg, "150 ft", "football_field").unwrap();
        assert_close(fields, 0.5, 1e-9);
    }

    #[test]
    fn test_definitions_can_chain() {
        let reg = registry();
        add_unit_definition(&reg, "football_field = 100 yd").unwrap();
        add_unit_definition(&reg, "drive = 0.8 football_field").unwrap();
        let yards = get_magnitude_in_unit(&reg, "1 drive", "yd").unwrap();
        assert_close(yards, 80.0, 1e-9);
    }

    #[test]
    fn test_add_unit_definition_duplicate_fails() {
        let reg = registry();
        let err = add_unit_definition(&reg, "m = 2 ft").unwrap_err();
        assert_eq!(err, UnitsError::DuplicateUnit { symbol: "m".to_string() });
        // the built-in meter is untouched
        assert_close(get_magnitude_in_unit(&reg, "1 m", "cm").unwrap(), 100.0, 1e-9);
    }

    #[test]
    fn test_unknown_target_unit() {
        let reg = registry();
        let err = get_magnitude_in_unit(&reg, "2 m", "glorp").unwrap_err();
        assert_eq!(err, UnitsError::UnknownUnit { symbol: "glorp".to_string() });
    }

    #[test]
    fn test_dimension_mismatch() {
        let reg = registry();
        assert!(matches!(
            get_magnitude_in_unit(&reg, "2 m", "s"),
            Err(UnitsError::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn test_identity_conversion() {
        let reg = registry();
        for unit in ["m", "ft", "kg", "s", "degC", "rad", "psi", "km/h"] {
            let text = format!("3.7 {unit}");
            let back = get_magnitude_in_unit(&reg, &text, unit).unwrap();
            assert_close(back, 3.7, 1e-9);
        }
    }

    #[test]
    fn test_round_trip_law() {
        let reg = registry();
        let pairs = [
            ("m", "ft"),
            ("km", "mi"),
            ("kg", "lb"),
            ("degC", "degF"),
            ("J", "BTU"),
            ("rad", "deg"),
            ("m/s", "mph"),
        ];
        for (u, v) in pairs {
            let there = get_magnitude_in_unit(&reg, &format!("12.5 {u}"), v).unwrap();
            let back = get_magnitude_in_unit(&reg, &format!("{there} {v}"), u).unwrap();
            assert_close(back, 12.5, 1e-9);
        }
    }

    #[test]
    fn test_affine_temperature_conversions() {
        let reg = registry();
        assert_close(get_magnitude_in_unit(&reg, "0 degC", "K").unwrap(), 273.15, 1e-9);
        assert_close(get_magnitude_in_unit(&reg, "32 degF", "degC").unwrap(), 0.0, 1e-9);
        assert_close(get_magnitude_in_unit(&reg, "100 degC", "degF").unwrap(), 212.0, 1e-9);
        assert_close(get_magnitude_in_unit(&reg, "0 K", "degC").unwrap(), -273.15, 1e-9);
    }

    #[test]
    fn test_expression_targets() {
        let reg = registry();
        let joules = get_magnitude_in_unit(&reg, "1 kWh", "kg m^2 / s^2").unwrap();
        assert_close(joules, 3.6e6, 1e-9);
    }

    #[test]
    fn test_angle_is_not_dimensionless() {
        let reg = registry();
        assert_close(get_magnitude_in_unit(&reg, "180 deg", "rad").unwrap(), std::f64::consts::PI, 1e-9);
        assert!(matches!(
            get_magnitude_in_unit(&reg, "1 rad", "m/m"),
            Err(UnitsError::DimensionMismatch { .. })
        ));
    }
}
