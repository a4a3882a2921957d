//! Table- and closure-backed utility functions.

use std::fmt;
use std::sync::Arc;

use super::ufun::UtilityFunction;
use crate::outcomes::Outcome;

#[derive(Clone)]
enum Mapping {
    Table {
        entries: Vec<(Outcome, f64)>,
        default: f64,
    },
    Fn(Arc<dyn Fn(&Outcome) -> f64 + Send + Sync>),
}

/// A utility function defined by an explicit outcome table or an arbitrary
/// mapping closure.
///
/// Rescaling is tracked as an affine layer over the raw mapping, so closure
/// backed instances normalize like any other utility function.
#[derive(Clone)]
pub struct MappingUtilityFunction {
    mapping: Mapping,
    scale: f64,
    offset: f64,
    reserved: Option<f64>,
}

impl MappingUtilityFunction {
    /// Creates a table-backed utility; unmapped outcomes get `default`.
    pub fn from_entries(entries: Vec<(Outcome, f64)>, default: f64) -> Self {
        Self {
            mapping: Mapping::Table { entries, default },
            scale: 1.0,
            offset: 0.0,
            reserved: None,
        }
    }

    /// Creates a closure-backed utility.
    pub fn from_fn(f: impl Fn(&Outcome) -> f64 + Send + Sync + 'static) -> Self {
        Self {
            mapping: Mapping::Fn(Arc::new(f)),
            scale: 1.0,
            offset: 0.0,
            reserved: None,
        }
    }

    /// Sets the reservation value.
    pub fn with_reserved_value(mut self, reserved: f64) -> Self {
        self.reserved = Some(reserved);
        self
    }

    fn raw(&self, outcome: &Outcome) -> f64 {
        match &self.mapping {
            Mapping::Table { entries, default } => entries
                .iter()
                .find(|(o, _)| o == outcome)
                .map(|(_, u)| *u)
                .unwrap_or(*default),
            Mapping::Fn(f) => f(outcome),
        }
    }
}

impl UtilityFunction for MappingUtilityFunction {
    fn evaluate(&self, outcome: &Outcome) -> f64 {
        self.raw(outcome) * self.scale + self.offset
    }

    fn reserved_value(&self) -> Option<f64> {
        self.reserved
    }

    fn shift_by(&mut self, offset: f64) {
        self.offset += offset;
        if let Some(r) = self.reserved.as_mut() {
            *r += offset;
        }
    }

    fn scale_by(&mut self, factor: f64) {
        self.scale *= factor;
        self.offset *= factor;
        if let Some(r) = self.reserved.as_mut() {
            *r *= factor;
        }
    }
}

impl fmt::Debug for MappingUtilityFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let backing = match &self.mapping {
            Mapping::Table { entries, .. } => format!("table[{}]", entries.len()),
            Mapping::Fn(_) => "fn".to_string(),
        };
        f.debug_struct("MappingUtilityFunction")
            .field("mapping", &backing)
            .field("scale", &self.scale)
            .field("offset", &self.offset)
            .field("reserved", &self.reserved)
            .finish()
    }
}
