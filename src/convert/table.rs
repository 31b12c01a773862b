//! The immutable conversion registry.
//!
//! The table is flat and declarative: each category lists its direction labels
//! in display order, and every entry is either a scalar factor or one of the
//! named temperature formulas. Callers never special-case temperature.

use crate::domain::{ConversionError, ConversionRule, TemperatureFormula};

use ConversionRule::{Formula, Scalar};

/// All direction labels registered under one category.
#[derive(Debug)]
pub struct CategoryEntry {
    pub name: &'static str,
    pub rules: &'static [(&'static str, ConversionRule)],
}

static STANDARD: &[CategoryEntry] = &[
    CategoryEntry {
        name: "Length",
        rules: &[
            ("Kilometers to Miles", Scalar(0.621371)),
            ("Miles to Kilometers", Scalar(1.60934)),
            ("Meters to Feet", Scalar(3.28084)),
            ("Feet to Meters", Scalar(0.3048)),
            ("Centimeters to Inches", Scalar(0.393701)),
            ("Inches to Centimeters", Scalar(2.54)),
            ("Millimeters to Inches", Scalar(0.0393701)),
            ("Inches to Millimeters", Scalar(25.4)),
            ("Yards to Meters", Scalar(0.9144)),
            ("Meters to Yards", Scalar(1.09361)),
        ],
    },
    CategoryEntry {
        name: "Mass",
        rules: &[
            ("Kilograms to Pounds", Scalar(2.20462)),
            ("Pounds to Kilograms", Scalar(0.453592)),
            ("Grams to Ounces", Scalar(0.035274)),
            ("Ounces to Grams", Scalar(28.3495)),
            ("Tons to Kilograms", Scalar(907.184)),
            ("Kilograms to Tons", Scalar(0.00110231)),
        ],
    },
    CategoryEntry {
        name: "Time",
        rules: &[
            ("Seconds to Minutes", Scalar(1.0 / 60.0)),
            ("Minutes to Seconds", Scalar(60.0)),
            ("Minutes to Hours", Scalar(1.0 / 60.0)),
            ("Hours to Minutes", Scalar(60.0)),
            ("Hours to Days", Scalar(1.0 / 24.0)),
            ("Days to Hours", Scalar(24.0)),
        ],
    },
    CategoryEntry {
        name: "Temperature",
        rules: &[
            ("Celsius to Fahrenheit", Formula(TemperatureFormula::CelsiusToFahrenheit)),
            ("Fahrenheit to Celsius", Formula(TemperatureFormula::FahrenheitToCelsius)),
            ("Celsius to Kelvin", Formula(TemperatureFormula::CelsiusToKelvin)),
            ("Kelvin to Celsius", Formula(TemperatureFormula::KelvinToCelsius)),
            ("Fahrenheit to Kelvin", Formula(TemperatureFormula::FahrenheitToKelvin)),
            ("Kelvin to Fahrenheit", Formula(TemperatureFormula::KelvinToFahrenheit)),
        ],
    },
    CategoryEntry {
        name: "Digital Storage",
        rules: &[
            ("Bytes to Kilobytes", Scalar(1.0 / 1024.0)),
            ("Kilobytes to Bytes", Scalar(1024.0)),
            ("Kilobytes to Megabytes", Scalar(1.0 / 1024.0)),
            ("Megabytes to Kilobytes", Scalar(1024.0)),
            ("Megabytes to Gigabytes", Scalar(1.0 / 1024.0)),
            ("Gigabytes to Megabytes", Scalar(1024.0)),
            ("Gigabytes to Terabytes", Scalar(1.0 / 1024.0)),
            ("Terabytes to Gigabytes", Scalar(1024.0)),
        ],
    },
    CategoryEntry {
        name: "Speed",
        rules: &[
            ("Kilometers per Hour to Miles per Hour", Scalar(0.621371)),
            ("Miles per Hour to Kilometers per Hour", Scalar(1.60934)),
            ("Meters per Second to Kilometers per Hour", Scalar(3.6)),
            ("Kilometers per Hour to Meters per Second", Scalar(1.0 / 3.6)),
        ],
    },
    CategoryEntry {
        name: "Volume",
        rules: &[
            ("Liters to Milliliters", Scalar(1000.0)),
            ("Milliliters to Liters", Scalar(1.0 / 1000.0)),
            ("Gallons to Liters", Scalar(3.78541)),
            ("Liters to Gallons", Scalar(1.0 / 3.78541)),
            ("Cups to Milliliters", Scalar(236.588)),
            ("Milliliters to Cups", Scalar(1.0 / 236.588)),
        ],
    },
];

/// Read-only view over a set of registered categories.
#[derive(Debug, Clone, Copy)]
pub struct ConversionTable {
    categories: &'static [CategoryEntry],
}

impl Default for ConversionTable {
    fn default() -> Self {
        Self::standard()
    }
}

impl ConversionTable {
    /// The built-in table (length, mass, time, temperature, digital storage,
    /// speed, volume).
    pub fn standard() -> Self {
        Self { categories: STANDARD }
    }

    /// Category names in display order.
    pub fn categories(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.categories.iter().map(|c| c.name)
    }

    /// Direction labels registered under `category`, in display order.
    pub fn directions(
        &self,
        category: &str,
    ) -> Result<impl Iterator<Item = &'static str> + '_, ConversionError> {
        let entry = self.category(category)?;
        Ok(entry.rules.iter().map(|(label, _)| *label))
    }

    /// Every `(category, direction, rule)` triple in the table.
    pub fn entries(&self) -> impl Iterator<Item = (&'static str, &'static str, ConversionRule)> + '_ {
        self.categories
            .iter()
            .flat_map(|c| c.rules.iter().map(move |(label, rule)| (c.name, *label, *rule)))
    }

    pub fn rule(&self, category: &str, direction: &str) -> Result<ConversionRule, ConversionError> {
        let entry = self.category(category)?;
        entry
            .rules
            .iter()
            .find(|(label, _)| *label == direction)
            .map(|(_, rule)| *rule)
            .ok_or_else(|| ConversionError::UnknownDirection {
                category: category.to_string(),
                direction: direction.to_string(),
            })
    }

    /// Look up the rule for `(category, direction)` and apply it to `value`.
    pub fn lookup_and_apply(
        &self,
        category: &str,
        direction: &str,
        value: f64,
    ) -> Result<f64, ConversionError> {
        Ok(self.rule(category, direction)?.apply(value))
    }

    /// The label converting the other way ("A to B" -> "B to A"), if registered.
    pub fn inverse_of(&self, category: &str, direction: &str) -> Option<&'static str> {
        let (from, to) = direction.split_once(" to ")?;
        let wanted = format!("{to} to {from}");
        let entry = self.category(category).ok()?;
        entry
            .rules
            .iter()
            .map(|(label, _)| *label)
            .find(|label| *label == wanted)
    }

    fn category(&self, category: &str) -> Result<&'static CategoryEntry, ConversionError> {
        self.categories
            .iter()
            .find(|c| c.name == category)
            .ok_or_else(|| ConversionError::UnknownCategory {
                category: category.to_string(),
            })
    }
}
