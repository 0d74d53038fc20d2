//! Unit registry - symbol resolution, run-time registration, built-in catalog
//!
//! The registry is an explicitly constructed value owned by the caller, so
//! independent registries can coexist (test isolation, layered catalogs).
//! Interior state lives behind a read-write lock: resolution takes the read
//! lock, registration the write lock, and a resolve racing a register sees
//! either the pre- or post-registration state, never a torn entry.

use std::collections::HashMap;

use parking_lot::RwLock;
use tracing::{debug, warn};

use crate::{Dimension, Unit, UnitsError};

/// What `register` does when the symbol is already present.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DuplicatePolicy {
    /// Fail with `DuplicateUnit` and leave the registry unchanged.
    #[default]
    Reject,
    /// Replace the existing definition.
    Overwrite,
    /// Keep the existing definition and report success.
    Ignore,
}

/// Registry of all known units.
pub struct UnitRegistry {
    inner: RwLock<Inner>,
    policy: DuplicatePolicy,
}

#[derive(Default)]
struct Inner {
    units: HashMap<String, Unit>,
    /// alias -> canonical symbol ("meter" -> "m")
    aliases: HashMap<String, String>,
    /// dimension -> symbol of its coherent base unit, recorded for the
    /// first scale-1 offset-0 unit seen so conversion does not depend on
    /// catalog insertion order
    canonical: HashMap<Dimension, String>,
}

impl UnitRegistry {
    /// An empty registry with the default fail-on-duplicate policy.
    pub fn new() -> Self {
        UnitRegistry {
            inner: RwLock::new(Inner::default()),
            policy: DuplicatePolicy::Reject,
        }
    }

    /// A registry seeded with the built-in SI and imperial catalog.
    pub fn with_builtins() -> Self {
        let mut inner = Inner::default();
        inner.seed_all();
        UnitRegistry {
            inner: RwLock::new(inner),
            policy: DuplicatePolicy::Reject,
        }
    }

    /// Change the duplicate-registration policy.
    pub fn with_policy(mut self, policy: DuplicatePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Exact-match lookup by symbol, falling back to the alias table.
    pub fn resolve(&self, symbol: &str) -> Result<Unit, UnitsError> {
        let inner = self.inner.read();
        if let Some(unit) = inner.units.get(symbol) {
            return Ok(unit.clone());
        }
        if let Some(canonical) = inner.aliases.get(symbol) {
            if let Some(unit) = inner.units.get(canonical) {
                return Ok(unit.clone());
            }
        }
        Err(UnitsError::UnknownUnit { symbol: symbol.to_string() })
    }

    pub fn contains(&self, symbol: &str) -> bool {
        let inner = self.inner.read();
        inner.units.contains_key(symbol) || inner.aliases.contains_key(symbol)
    }

    /// Insert a unit. All-or-nothing: on any error the registry is unchanged.
    pub fn register(&self, unit: Unit) -> Result<(), UnitsError> {
        validate_symbol(&unit.symbol)?;
        if !unit.scale.is_finite() || unit.scale == 0.0 {
            return Err(UnitsError::InvalidDefinition {
                reason: "scale factor must be finite and nonzero".to_string(),
                text: unit.symbol.clone(),
            });
        }
        if !unit.offset.is_finite() {
            return Err(UnitsError::InvalidDefinition {
                reason: "offset must be finite".to_string(),
                text: unit.symbol.clone(),
            });
        }

        let mut inner = self.inner.write();
        if inner.units.contains_key(&unit.symbol) || inner.aliases.contains_key(&unit.symbol) {
            match self.policy {
                DuplicatePolicy::Reject => {
                    return Err(UnitsError::DuplicateUnit { symbol: unit.symbol });
                }
                DuplicatePolicy::Ignore => {
                    debug!(symbol = %unit.symbol, "ignoring duplicate unit registration");
                    return Ok(());
                }
                DuplicatePolicy::Overwrite => {
                    warn!(symbol = %unit.symbol, "overwriting existing unit");
                    inner.aliases.remove(&unit.symbol);
                }
            }
        }
        debug!(symbol = %unit.symbol, dimension = %unit.dimension, "registered unit");
        inner.insert(unit);
        Ok(())
    }

    /// Register an alternate spelling for an existing symbol.
    pub fn register_alias(&self, alias: &str, symbol: &str) -> Result<(), UnitsError> {
        validate_symbol(alias)?;
        let mut inner = self.inner.write();
        if !inner.units.contains_key(symbol) {
            return Err(UnitsError::UnknownUnit { symbol: symbol.to_string() });
        }
        if inner.units.contains_key(alias) || inner.aliases.contains_key(alias) {
            match self.policy {
                DuplicatePolicy::Reject => {
                    return Err(UnitsError::DuplicateUnit { symbol: alias.to_string() });
                }
                DuplicatePolicy::Ignore => return Ok(()),
                DuplicatePolicy::Overwrite => {}
            }
        }
        inner.aliases.insert(alias.to_string(), symbol.to_string());
        Ok(())
    }

    /// The coherent base unit recorded for a dimension, if any.
    pub fn canonical_unit(&self, dimension: &Dimension) -> Option<Unit> {
        let inner = self.inner.read();
        inner
            .canonical
            .get(dimension)
            .and_then(|symbol| inner.units.get(symbol))
            .cloned()
    }

    /// Number of registered units (aliases not counted).
    pub fn len(&self) -> usize {
        self.inner.read().units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().units.is_empty()
    }

    /// All registered symbols, unordered.
    pub fn symbols(&self) -> Vec<String> {
        self.inner.read().units.keys().cloned().collect()
    }
}

impl Default for UnitRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

/// A registrable symbol must survive a round trip through the expression
/// grammar, so the operator characters are out.
fn validate_symbol(symbol: &str) -> Result<(), UnitsError> {
    let valid = !symbol.is_empty()
        && !symbol.starts_with(|c: char| c.is_ascii_digit())
        && !symbol.contains(['=', '*', '^', '"', '\''])
        && !symbol.contains(char::is_whitespace);
    if valid {
        Ok(())
    } else {
        Err(UnitsError::InvalidDefinition {
            reason: "unit symbol must be non-empty, must not start with a digit and must not contain whitespace or operator characters".to_string(),
            text: symbol.to_string(),
        })
    }
}

impl Inner {
    fn insert(&mut self, unit: Unit) {
        if unit.is_base() && !self.canonical.contains_key(&unit.dimension) {
            self.canonical.insert(unit.dimension, unit.symbol.clone());
        }
        self.units.insert(unit.symbol.clone(), unit);
    }

    fn unit(&mut self, symbol: &str, name: &str, dimension: Dimension, scale: f64) {
        self.insert(Unit::new(symbol, name, dimension, scale));
    }

    fn affine(&mut self, symbol: &str, name: &str, dimension: Dimension, scale: f64, offset: f64) {
        self.insert(Unit::with_offset(symbol, name, dimension, scale, offset));
    }

    fn alias(&mut self, alias: &str, symbol: &str) {
        self.aliases.insert(alias.to_string(), symbol.to_string());
    }

    fn seed_all(&mut self) {
        self.seed_length();
        self.seed_mass();
        self.seed_time();
        self.seed_current();
        self.seed_temperature();
        self.seed_amount_and_luminosity();
        self.seed_angle();
        self.seed_mechanics();
        self.seed_area_and_volume();
        self.seed_velocity();
    }

    fn seed_length(&mut self) {
        self.unit("m", "meter", Dimension::LENGTH, 1.0);
        self.unit("km", "kilometer", Dimension::LENGTH, 1000.0);
        self.unit("cm", "centimeter", Dimension::LENGTH, 0.01);
        self.unit("mm", "millimeter", Dimension::LENGTH, 0.001);
        self.unit("um", "micrometer", Dimension::LENGTH, 1e-6);
        self.unit("nm", "nanometer", Dimension::LENGTH, 1e-9);

        self.unit("in", "inch", Dimension::LENGTH, 0.0254);
        self.unit("ft", "foot", Dimension::LENGTH, 0.3048);
        self.unit("yd", "yard", Dimension::LENGTH, 0.9144);
        self.unit("mi", "mile", Dimension::LENGTH, 1609.344);
        self.unit("nmi", "nautical mile", Dimension::LENGTH, 1852.0);

        self.alias("meter", "m");
        self.alias("meters", "m");
        self.alias("metre", "m");
        self.alias("metres", "m");
        self.alias("kilometer", "km");
        self.alias("kilometers", "km");
        self.alias("centimeter", "cm");
        self.alias("centimeters", "cm");
        self.alias("millimeter", "mm");
        self.alias("millimeters", "mm");
        self.alias("inch", "in");
        self.alias("inches", "in");
        self.alias("foot", "ft");
        self.alias("feet", "ft");
        self.alias("yard", "yd");
        self.alias("yards", "yd");
        self.alias("mile", "mi");
        self.alias("miles", "mi");
        self.alias("micron", "um");
    }

    fn seed_mass(&mut self) {
        self.unit("kg", "kilogram", Dimension::MASS, 1.0);
        self.unit("g", "gram", Dimension::MASS, 0.001);
        self.unit("mg", "milligram", Dimension::MASS, 1e-6);
        self.unit("t", "tonne", Dimension::MASS, 1000.0);
        self.unit("lb", "pound", Dimension::MASS, 0.45359237);
        self.unit("oz", "ounce", Dimension::MASS, 0.028349523125);
        self.unit("st", "stone", Dimension::MASS, 6.35029318);

        self.alias("kilogram", "kg");
        self.alias("kilograms", "kg");
        self.alias("gram", "g");
        self.alias("grams", "g");
        self.alias("pound", "lb");
        self.alias("pounds", "lb");
        self.alias("lbs", "lb");
        self.alias("ounce", "oz");
        self.alias("ounces", "oz");
        self.alias("tonne", "t");
        self.alias("tonnes", "t");
    }

    fn seed_time(&mut self) {
        self.unit("s", "second", Dimension::TIME, 1.0);
        self.unit("ms", "millisecond", Dimension::TIME, 0.001);
        self.unit("us", "microsecond", Dimension::TIME, 1e-6);
        self.unit("ns", "nanosecond", Dimension::TIME, 1e-9);
        self.unit("min", "minute", Dimension::TIME, 60.0);
        self.unit("h", "hour", Dimension::TIME, 3600.0);
        self.unit("d", "day", Dimension::TIME, 86400.0);
        self.unit("wk", "week", Dimension::TIME, 604800.0);
        self.unit("yr", "year", Dimension::TIME, 31556952.0); // average Gregorian year

        self.alias("second", "s");
        self.alias("seconds", "s");
        self.alias("sec", "s");
        self.alias("minute", "min");
        self.alias("minutes", "min");
        self.alias("hour", "h");
        self.alias("hours", "h");
        self.alias("hr", "h");
        self.alias("day", "d");
        self.alias("days", "d");
        self.alias("week", "wk");
        self.alias("weeks", "wk");
        self.alias("year", "yr");
        self.alias("years", "yr");
    }

    fn seed_current(&mut self) {
        self.unit("A", "ampere", Dimension::CURRENT, 1.0);
        self.unit("mA", "milliampere", Dimension::CURRENT, 0.001);
        self.unit("kA", "kiloampere", Dimension::CURRENT, 1000.0);

        self.alias("ampere", "A");
        self.alias("amperes", "A");
        self.alias("amp", "A");
        self.alias("amps", "A");
    }

    fn seed_temperature(&mut self) {
        // Kelvin is the coherent base; Celsius and Fahrenheit are affine
        self.unit("K", "kelvin", Dimension::TEMPERATURE, 1.0);
        self.affine("degC", "celsius", Dimension::TEMPERATURE, 1.0, 273.15);
        // K = (F + 459.67) * 5/9
        self.affine(
            "degF",
            "fahrenheit",
            Dimension::TEMPERATURE,
            0.5555555555555556,
            255.3722222222222,
        );
        self.unit("degR", "rankine", Dimension::TEMPERATURE, 0.5555555555555556);

        self.alias("kelvin", "K");
        self.alias("C", "degC");
        self.alias("celsius", "degC");
        self.alias("F", "degF");
        self.alias("fahrenheit", "degF");
        self.alias("R", "degR");
        self.alias("rankine", "degR");
    }

    fn seed_amount_and_luminosity(&mut self) {
        self.unit("mol", "mole", Dimension::AMOUNT, 1.0);
        self.unit("mmol", "millimole", Dimension::AMOUNT, 0.001);
        self.unit("cd", "candela", Dimension::LUMINOSITY, 1.0);

        self.alias("mole", "mol");
        self.alias("moles", "mol");
        self.alias("candela", "cd");
    }

    fn seed_angle(&mut self) {
        self.unit("rad", "radian", Dimension::ANGLE, 1.0);
        self.unit("deg", "degree", Dimension::ANGLE, 0.017453292519943295); // pi/180
        self.unit("grad", "gradian", Dimension::ANGLE, 0.015707963267948967); // pi/200
        self.unit("arcmin", "arcminute", Dimension::ANGLE, 0.0002908882086657216);
        self.unit("arcsec", "arcsecond", Dimension::ANGLE, 4.84813681109536e-6);
        self.unit("rev", "revolution", Dimension::ANGLE, 6.283185307179586); // 2*pi

        self.alias("radian", "rad");
        self.alias("radians", "rad");
        self.alias("degree", "deg");
        self.alias("degrees", "deg");
        self.alias("gradian", "grad");
        self.alias("revolution", "rev");
    }

    fn seed_mechanics(&mut self) {
        self.unit("N", "newton", Dimension::FORCE, 1.0);
        self.unit("kN", "kilonewton", Dimension::FORCE, 1000.0);
        self.unit("dyn", "dyne", Dimension::FORCE, 1e-5);
        self.unit("lbf", "pound-force", Dimension::FORCE, 4.4482216152605);

        self.unit("J", "joule", Dimension::ENERGY, 1.0);
        self.unit("kJ", "kilojoule", Dimension::ENERGY, 1000.0);
        self.unit("cal", "calorie", Dimension::ENERGY, 4.184);
        self.unit("kcal", "kilocalorie", Dimension::ENERGY, 4184.0);
        self.unit("Wh", "watt-hour", Dimension::ENERGY, 3600.0);
        self.unit("kWh", "kilowatt-hour", Dimension::ENERGY, 3.6e6);
        self.unit("BTU", "British thermal unit", Dimension::ENERGY, 1055.05585262);

        self.unit("W", "watt", Dimension::POWER, 1.0);
        self.unit("kW", "kilowatt", Dimension::POWER, 1000.0);
        self.unit("MW", "megawatt", Dimension::POWER, 1e6);
        self.unit("hp", "horsepower", Dimension::POWER, 745.699872);

        self.unit("Pa", "pascal", Dimension::PRESSURE, 1.0);
        self.unit("kPa", "kilopascal", Dimension::PRESSURE, 1000.0);
        self.unit("bar", "bar", Dimension::PRESSURE, 100000.0);
        self.unit("mbar", "millibar", Dimension::PRESSURE, 100.0);
        self.unit("atm", "atmosphere", Dimension::PRESSURE, 101325.0);
        self.unit("psi", "pounds per square inch", Dimension::PRESSURE, 6894.757293168);
        self.unit("torr", "torr", Dimension::PRESSURE, 133.322368421);

        self.unit("Hz", "hertz", Dimension::FREQUENCY, 1.0);
        self.unit("kHz", "kilohertz", Dimension::FREQUENCY, 1000.0);
        self.unit("MHz", "megahertz", Dimension::FREQUENCY, 1e6);
        self.unit("rpm", "revolutions per minute", Dimension::FREQUENCY, 0.016666666666666666);

        self.alias("newton", "N");
        self.alias("newtons", "N");
        self.alias("joule", "J");
        self.alias("joules", "J");
        self.alias("calorie", "cal");
        self.alias("calories", "cal");
        self.alias("watt", "W");
        self.alias("watts", "W");
        self.alias("horsepower", "hp");
        self.alias("pascal", "Pa");
        self.alias("pascals", "Pa");
        self.alias("atmosphere", "atm");
        self.alias("atmospheres", "atm");
        self.alias("hertz", "Hz");
    }

    fn seed_area_and_volume(&mut self) {
        self.unit("m2", "square meter", Dimension::AREA, 1.0);
        self.unit("ha", "hectare", Dimension::AREA, 10000.0);
        self.unit("ac", "acre", Dimension::AREA, 4046.8564224);

        self.unit("m3", "cubic meter", Dimension::VOLUME, 1.0);
        self.unit("L", "liter", Dimension::VOLUME, 0.001);
        self.unit("mL", "milliliter", Dimension::VOLUME, 1e-6);
        self.unit("gal", "gallon", Dimension::VOLUME, 0.003785411784);
        self.unit("qt", "quart", Dimension::VOLUME, 0.000946352946);
        self.unit("pt", "pint", Dimension::VOLUME, 0.000473176473);

        self.alias("hectare", "ha");
        self.alias("hectares", "ha");
        self.alias("acre", "ac");
        self.alias("acres", "ac");
        self.alias("liter", "L");
        self.alias("liters", "L");
        self.alias("litre", "L");
        self.alias("litres", "L");
        self.alias("l", "L");
        self.alias("ml", "mL");
        self.alias("gallon", "gal");
        self.alias("gallons", "gal");
    }

    fn seed_velocity(&mut self) {
        self.unit("m/s", "meter per second", Dimension::VELOCITY, 1.0);
        self.unit("km/h", "kilometer per hour", Dimension::VELOCITY, 0.2777777777777778);
        self.unit("mph", "mile per hour", Dimension::VELOCITY, 0.44704);
        self.unit("kn", "knot", Dimension::VELOCITY, 0.5144444444444444);
        self.unit("g0", "standard gravity", Dimension::ACCELERATION, 9.80665);

        self.alias("kph", "km/h");
        self.alias("knot", "kn");
        self.alias("knots", "kn");
    }
}
