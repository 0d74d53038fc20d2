//! Grammars for quantity strings, unit expressions and unit definitions
//!
//! Three small recursive-descent grammars with typed results:
//!
//! - quantity:   `ws? number ws unit-expr ws?`          ("2 m", "-3.5e2 km/h")
//! - unit-expr:  `product ('/' product)*`
//!   product:    `factor (('*' | ws) factor)*`
//!   factor:     `symbol ('^' integer)?`                ("kg m^2 / s^2")
//! - definition: `symbol ws? '=' ws? number? ws? unit-expr`
//!                                                      ("football_field = 100 yd")
//!
//! Grammar violations are typed errors; a number that does not parse is an
//! error, never a zero magnitude.

use crate::{Quantity, Unit, UnitRegistry, UnitsError};

/// A parsed `<symbol> = <factor> <unit>` definition, ready for registration.
#[derive(Debug, Clone)]
pub struct UnitDefinition {
    pub symbol: String,
    pub unit: Unit,
}

/// Parse a quantity string like `"2 m"` or `"-9.81 m/s^2"`.
///
/// The number and the unit must be separated by whitespace. Unit symbols
/// are resolved against `registry`; unknown symbols propagate as
/// [`UnitsError::UnknownUnit`].
pub fn parse_quantity(registry: &UnitRegistry, text: &str) -> Result<Quantity, UnitsError> {
    let malformed = || UnitsError::MalformedQuantity { text: text.to_string() };

    let s = text.trim();
    let (number, rest) = split_number(s).ok_or_else(malformed)?;
    let magnitude: f64 = number.parse().map_err(|_| malformed())?;
    if !magnitude.is_finite() {
        return Err(malformed());
    }
    if !rest.starts_with(char::is_whitespace) {
        return Err(malformed());
    }
    let unit_text = rest.trim();
    if unit_text.is_empty() {
        return Err(malformed());
    }
    let unit = parse_unit_expr(registry, unit_text)?;
    Ok(Quantity::new(magnitude, unit))
}

/// Parse a unit expression like `"m"`, `"m/s^2"` or `"kg m^2 / s^2"`.
///
/// A registered symbol matches directly (so catalog entries like `"m/s"`
/// win over expression parsing); otherwise the expression grammar builds a
/// composed unit from registered factors.
pub fn parse_unit_expr(registry: &UnitRegistry, text: &str) -> Result<Unit, UnitsError> {
    let s = text.trim();
    if s.is_empty() {
        return Err(UnitsError::MalformedQuantity { text: text.to_string() });
    }
    if let Ok(unit) = registry.resolve(s) {
        return Ok(unit);
    }

    let mut quotient = s.split('/');
    let mut unit = parse_product(registry, quotient.next().unwrap_or(""))?;
    for part in quotient {
        unit = unit.divide(&parse_product(registry, part)?);
    }
    Ok(unit)
}

/// Parse a definition string like `"football_field = 100 yd"`.
///
/// The numeric factor is optional (`"kph = km/h"`); the right-hand side may
/// be any unit expression. The right-hand unit must already be registered.
pub fn parse_definition(registry: &UnitRegistry, text: &str) -> Result<UnitDefinition, UnitsError> {
    let malformed = || UnitsError::MalformedDefinition { text: text.to_string() };

    let (lhs, rhs) = text.split_once('=').ok_or_else(malformed)?;
    let symbol = lhs.trim();
    if symbol.is_empty() || symbol.contains(char::is_whitespace) {
        return Err(malformed());
    }

    let rhs = rhs.trim();
    if rhs.is_empty() {
        return Err(malformed());
    }
    let (factor, unit_text) = match split_number(rhs) {
        Some((number, rest)) => {
            let factor: f64 = number.parse().map_err(|_| malformed())?;
            (factor, rest.trim())
        }
        None => (1.0, rhs),
    };
    if unit_text.is_empty() {
        return Err(malformed());
    }
    if !factor.is_finite() || factor == 0.0 {
        return Err(UnitsError::InvalidDefinition {
            reason: "scale factor must be finite and nonzero".to_string(),
            text: text.to_string(),
        });
    }

    let base = parse_unit_expr(registry, unit_text)?;
    let unit = Unit {
        symbol: symbol.to_string(),
        name: symbol.to_string(),
        dimension: base.dimension,
        scale: factor * base.scale,
        offset: base.offset,
    };
    Ok(UnitDefinition { symbol: symbol.to_string(), unit })
}

/// Parse a product of factors like `"kg m^2"` or `"N*m"`.
fn parse_product(registry: &UnitRegistry, text: &str) -> Result<Unit, UnitsError> {
    let mut factors = text
        .split(|c: char| c == '*' || c.is_whitespace())
        .filter(|part| !part.is_empty());

    let mut unit = match factors.next() {
        Some(factor) => parse_factor(registry, factor)?,
        // empty side of a '/' or '*'
        None => return Err(UnitsError::MalformedQuantity { text: text.to_string() }),
    };
    for factor in factors {
        unit = unit.multiply(&parse_factor(registry, factor)?);
    }
    Ok(unit)
}

/// Parse a single factor with an optional integer power, like `"m"` or `"s^-2"`.
fn parse_factor(registry: &UnitRegistry, text: &str) -> Result<Unit, UnitsError> {
    match text.split_once('^') {
        Some((base, exponent)) => {
            let unit = registry.resolve(base)?;
            let exponent: i32 = exponent
                .parse()
                .map_err(|_| UnitsError::MalformedQuantity { text: text.to_string() })?;
            Ok(unit.powi(exponent))
        }
        None => registry.resolve(text),
    }
}

/// Split a leading numeric token (sign, decimal point, exponent notation)
/// off a string. Returns `None` when no digits lead the string.
fn split_number(s: &str) -> Option<(&str, &str)> {
    let bytes = s.as_bytes();
    let mut end = 0;

    if matches!(bytes.first(), Some(b'+') | Some(b'-')) {
        end += 1;
    }
    let mut digits = 0;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
        digits += 1;
    }
    if end < bytes.len() && bytes[end] == b'.' {
        end += 1;
        while end < bytes.len() && bytes[end].is_ascii_digit() {
            end += 1;
            digits += 1;
        }
    }
    if digits == 0 {
        return None;
    }

    // optional exponent, only consumed when complete ("2e3", not "2e")
    if end < bytes.len() && (bytes[end] == b'e' || bytes[end] == b'E') {
        let mut exp_end = end + 1;
        if exp_end < bytes.len() && matches!(bytes[exp_end], b'+' | b'-') {
            exp_end += 1;
        }
        let mut exp_digits = 0;
        while exp_end < bytes.len() && bytes[exp_end].is_ascii_digit() {
            exp_end += 1;
            exp_digits += 1;
        }
        if exp_digits > 0 {
            end = exp_end;
        }
    }

    Some(s.split_at(end))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Dimension;

    fn registry() -> UnitRegistry {
        UnitRegistry::with_builtins()
    }

    #[test]
    fn test_parse_quantity() {
        let reg = registry();

        let q = parse_quantity(&reg, "2 m").unwrap();
        assert_eq!(q.magnitude, 2.0);
        assert_eq!(q.unit.symbol, "m");

        let q = parse_quantity(&reg, "  -3.14   rad  ").unwrap();
        assert_eq!(q.magnitude, -3.14);
        assert_eq!(q.unit.symbol, "rad");

        let q = parse_quantity(&reg, "6.022e23 mol").unwrap();
        assert_eq!(q.magnitude, 6.022e23);

        let q = parse_quantity(&reg, "+2.5E-2 km").unwrap();
        assert_eq!(q.magnitude, 0.025);
    }

    #[test]
    fn test_parse_quantity_with_expression_unit() {
        let reg = registry();
        let q = parse_quantity(&reg, "9.81 m/s^2").unwrap();
        assert_eq!(q.dimension(), Dimension::ACCELERATION);
    }

    #[test]
    fn test_quantity_requires_number() {
        let reg = registry();
        for text in ["m", "abc m", "", "   ", ". m"] {
            assert!(
                matches!(
                    parse_quantity(&reg, text),
                    Err(UnitsError::MalformedQuantity { .. })
                ),
                "expected malformed: {text:?}"
            );
        }
    }

    #[test]
    fn test_quantity_requires_unit() {
        let reg = registry();
        assert!(matches!(
            parse_quantity(&reg, "42"),
            Err(UnitsError::MalformedQuantity { .. })
        ));
        assert!(matches!(
            parse_quantity(&reg, "42  "),
            Err(UnitsError::MalformedQuantity { .. })
        ));
    }

    #[test]
    fn test_quantity_requires_separator() {
        let reg = registry();
        assert!(matches!(
            parse_quantity(&reg, "100kg"),
            Err(UnitsError::MalformedQuantity { .. })
        ));
    }

    #[test]
    fn test_quantity_unknown_unit_propagates() {
        let reg = registry();
        let err = parse_quantity(&reg, "2 glorp").unwrap_err();
        assert_eq!(err, UnitsError::UnknownUnit { symbol: "glorp".to_string() });
    }

    #[test]
    fn test_non_finite_magnitude_rejected() {
        let reg = registry();
        assert!(matches!(
            parse_quantity(&reg, "1e999 m"),
            Err(UnitsError::MalformedQuantity { .. })
        ));
    }

    #[test]
    fn test_parse_unit_expr() {
        let reg = registry();

        assert_eq!(parse_unit_expr(&reg, "m").unwrap().dimension, Dimension::LENGTH);
        assert_eq!(parse_unit_expr(&reg, "m^2").unwrap().dimension, Dimension::AREA);
        assert_eq!(parse_unit_expr(&reg, "s^-1").unwrap().dimension, Dimension::FREQUENCY);
        assert_eq!(parse_unit_expr(&reg, "m/s").unwrap().dimension, Dimension::VELOCITY);

        let joule = parse_unit_expr(&reg, "kg m^2 / s^2").unwrap();
        assert_eq!(joule.dimension, Dimension::ENERGY);
        assert!((joule.scale - 1.0).abs() < 1e-12);

        let newton = parse_unit_expr(&reg, "kg*m/s^2").unwrap();
        assert_eq!(newton.dimension, Dimension::FORCE);
    }

    #[test]
    fn test_expression_scale_composes() {
        let reg = registry();
        // km/h as an expression agrees with the catalog entry
        let composed = parse_unit_expr(&reg, "km / h").unwrap();
        let catalog = reg.resolve("km/h").unwrap();
        assert!((composed.scale - catalog.scale).abs() < 1e-12);
    }

    #[test]
    fn test_expression_errors() {
        let reg = registry();
        assert!(parse_unit_expr(&reg, "glorp").is_err());
        assert!(parse_unit_expr(&reg, "m/").is_err());
        assert!(parse_unit_expr(&reg, "m^two").is_err());
        assert!(parse_unit_expr(&reg, "").is_err());
    }

    #[test]
    fn test_parse_definition() {
        let reg = registry();

        let def = parse_definition(&reg, "football_field = 100 yd").unwrap();
        assert_eq!(def.symbol, "football_field");
        assert_eq!(def.unit.dimension, Dimension::LENGTH);
        assert!((def.unit.scale - 91.44).abs() < 1e-9);

        // tolerant of whitespace around '='
        let def = parse_definition(&reg, "  smoot=1.702 m ").unwrap();
        assert_eq!(def.symbol, "smoot");
        assert!((def.unit.scale - 1.702).abs() < 1e-12);
    }

    #[test]
    fn test_parse_definition_without_factor() {
        let reg = registry();
        let def = parse_definition(&reg, "kps = km/s").unwrap();
        assert_eq!(def.unit.dimension, Dimension::VELOCITY);
        assert!((def.unit.scale - 1000.0).abs() < 1e-9);
    }

    #[test]
    fn test_definition_preserves_offset() {
        let reg = registry();
        let def = parse_definition(&reg, "centigrade = degC").unwrap();
        assert!((def.unit.offset - 273.15).abs() < 1e-12);
    }

    #[test]
    fn test_malformed_definitions() {
        let reg = registry();
        for text in [
            "football_field 100 yd", // no '='
            "= 100 yd",              // no symbol
            "football_field =",      // no right-hand side
            "big field = 100 yd",    // symbol contains whitespace
            "x = 100",               // no unit
        ] {
            assert!(
                matches!(
                    parse_definition(&reg, text),
                    Err(UnitsError::MalformedDefinition { .. })
                ),
                "expected malformed: {text:?}"
            );
        }
    }

    #[test]
    fn test_definition_zero_factor_rejected() {
        let reg = registry();
        assert!(matches!(
            parse_definition(&reg, "nothing = 0 m"),
            Err(UnitsError::InvalidDefinition { .. })
        ));
    }

    #[test]
    fn test_definition_unknown_base_unit() {
        let reg = registry();
        let err = parse_definition(&reg, "x = 100 glorp").unwrap_err();
        assert_eq!(err, UnitsError::UnknownUnit { symbol: "glorp".to_string() });
    }

    #[test]
    fn test_split_number() {
        assert_eq!(split_number("2 m"), Some(("2", " m")));
        assert_eq!(split_number("-3.14 rad"), Some(("-3.14", " rad")));
        assert_eq!(split_number("1e3m"), Some(("1e3", "m")));
        assert_eq!(split_number("2e m"), Some(("2", "e m")));
        assert_eq!(split_number(".5 m"), Some((".5", " m")));
        assert_eq!(split_number("m"), None);
        assert_eq!(split_number("-"), None);
        assert_eq!(split_number(""), None);
    }
}
