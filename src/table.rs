use std::collections::BTreeMap;
use std::fmt;

use thiserror::Error;

use crate::config::DeviceKey;
use crate::scan::Unit;

/// A resolved numeric value, typed by the parameter's unit.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum ParamValue {
    Int(i64),
    Real(f64),
}

impl ParamValue {
    /// Converts a simulator-reported literal according to the unit. Integer
    /// parameters reject fractional literals.
    pub fn parse(raw: &str, unit: Unit) -> Option<Self> {
        if unit.is_real() {
            raw.parse().ok().map(ParamValue::Real)
        } else {
            raw.parse().ok().map(ParamValue::Int)
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Int(v) => write!(f, "{v}"),
            ParamValue::Real(v) => write!(f, "{v:?}"),
        }
    }
}

#[derive(Debug, Error)]
pub enum TableError {
    #[error("parameter {0} not found")]
    UnknownParameter(String),

    #[error("could not parse '{raw}' as a {unit} value for parameter {name}")]
    BadValue {
        name: String,
        raw: String,
        unit: Unit,
    },

    #[error("parameter {name} has no value for configuration {key}")]
    MissingValue { name: String, key: DeviceKey },
}

/// A named timing parameter with one value per swept configuration.
#[derive(Debug, Clone)]
pub struct Parameter {
    pub unit: Unit,
    pub values: BTreeMap<DeviceKey, ParamValue>,
}

/// One row of the filtered table, ready for rendering.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedParam {
    pub name: String,
    pub unit: Unit,
    pub value: ParamValue,
}

/// Mapping from parameter name to unit and per-configuration values.
///
/// The set of admissible names is fixed at construction from the scanned
/// header; the simulator reporting any other name is a protocol violation.
#[derive(Debug, Clone)]
pub struct ParamTable {
    units: BTreeMap<String, Unit>,
    parameters: BTreeMap<String, Parameter>,
}

impl ParamTable {
    pub fn new(units: BTreeMap<String, Unit>) -> Self {
        Self {
            units,
            parameters: BTreeMap::new(),
        }
    }

    /// Records one `NAME VALUE` report from the simulator.
    pub fn record(&mut self, key: DeviceKey, name: &str, raw: &str) -> Result<(), TableError> {
        let unit = *self
            .units
            .get(name)
            .ok_or_else(|| TableError::UnknownParameter(name.to_string()))?;
        let value = ParamValue::parse(raw, unit).ok_or_else(|| TableError::BadValue {
            name: name.to_string(),
            raw: raw.to_string(),
            unit,
        })?;
        self.parameters
            .entry(name.to_string())
            .or_insert_with(|| Parameter {
                unit,
                values: BTreeMap::new(),
            })
            .values
            .insert(key, value);
        Ok(())
    }

    /// Narrows the table to a single configuration. Every scanned parameter
    /// must hold a value for that configuration; a parameter the simulator
    /// never reported is an incomplete table, not an empty column.
    pub fn filter(&self, key: DeviceKey) -> Result<Vec<ResolvedParam>, TableError> {
        self.units
            .iter()
            .map(|(name, &unit)| {
                let value = self
                    .parameters
                    .get(name)
                    .and_then(|parameter| parameter.values.get(&key))
                    .copied()
                    .ok_or_else(|| TableError::MissingValue {
                        name: name.clone(),
                        key,
                    })?;
                Ok(ResolvedParam {
                    name: name.clone(),
                    unit,
                    value,
                })
            })
            .collect()
    }

    pub fn get(&self, name: &str) -> Option<&Parameter> {
        self.parameters.get(name)
    }

    pub fn len(&self) -> usize {
        self.parameters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parameters.is_empty()
    }
}
