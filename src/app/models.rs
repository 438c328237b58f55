//! Data models for OIFITS processing
//!
//! This module contains the value types shared by the loader and the analyzer:
//! catalog targets, instrument modes, granules and station indexes. The table
//! and file aggregates live in the submodules.

use crate::constants::{UNDEFINED_INSTRUMENT_NAME, UNDEFINED_TARGET_NAME};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

pub mod columns;
pub mod oifits_file;
pub mod schema;
pub mod tables;
pub mod units;
pub mod validation;

pub use columns::{ColumnArray, ColumnData, KeywordValue, Shape};
pub use oifits_file::{GranuleIndex, OiFitsFile};
pub use schema::{Cardinality, ColumnDescriptor, KeywordDescriptor, TableKind, TableSchema};
pub use tables::{DataDerived, OiArray, OiData, OiTable, OiTarget, OiWavelength, TargetIndex};
pub use units::{ScalarType, Unit};
pub use validation::{Checker, Severity, ValidationIssue};

/// Ordered tuple of station ids shared between rows of one file
///
/// Used both for observed station indexes (order significant) and for
/// inferred station configurations (sorted).
pub type StaIndex = Arc<[i16]>;

// =============================================================================
// Target
// =============================================================================

/// Logical target built from one OI_TARGET row
///
/// Equality and hashing use the bit patterns of the floating point fields so
/// that identical catalog rows collapse to one target.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Target {
    pub name: String,
    pub ra_ep0: f64,
    pub dec_ep0: f64,
    pub equinox: f32,
    pub pm_ra: f64,
    pub pm_dec: f64,
    pub parallax: f32,
    pub spec_type: String,
}

impl Target {
    /// Placeholder for rows whose target id is unknown
    pub fn undefined() -> Self {
        Self {
            name: UNDEFINED_TARGET_NAME.to_string(),
            ra_ep0: f64::NAN,
            dec_ep0: f64::NAN,
            equinox: f32::NAN,
            pm_ra: f64::NAN,
            pm_dec: f64::NAN,
            parallax: f32::NAN,
            spec_type: String::new(),
        }
    }

    fn key(&self) -> (&str, u64, u64, u32, u64, u64, u32, &str) {
        (
            &self.name,
            self.ra_ep0.to_bits(),
            self.dec_ep0.to_bits(),
            self.equinox.to_bits(),
            self.pm_ra.to_bits(),
            self.pm_dec.to_bits(),
            self.parallax.to_bits(),
            &self.spec_type,
        )
    }
}

impl PartialEq for Target {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for Target {}

impl Hash for Target {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key().hash(state);
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (RA {:.6}, DEC {:.6})", self.name, self.ra_ep0, self.dec_ep0)
    }
}

// =============================================================================
// Instrument Mode
// =============================================================================

/// Spectral setup derived from an OI_WAVELENGTH table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstrumentMode {
    pub ins_name: String,
    pub nb_channels: usize,
    pub lambda_min: f32,
    pub lambda_max: f32,
    pub res_power: f32,
}

impl InstrumentMode {
    /// Placeholder for data tables without a matching wavelength table
    pub fn undefined() -> Self {
        Self {
            ins_name: UNDEFINED_INSTRUMENT_NAME.to_string(),
            nb_channels: 0,
            lambda_min: f32::NAN,
            lambda_max: f32::NAN,
            res_power: f32::NAN,
        }
    }

    fn key(&self) -> (&str, usize, u32, u32, u32) {
        (
            &self.ins_name,
            self.nb_channels,
            self.lambda_min.to_bits(),
            self.lambda_max.to_bits(),
            self.res_power.to_bits(),
        )
    }
}

impl PartialEq for InstrumentMode {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for InstrumentMode {}

impl Hash for InstrumentMode {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key().hash(state);
    }
}

impl fmt::Display for InstrumentMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({} channels, {:.3e} - {:.3e} m, R = {:.1})",
            self.ins_name, self.nb_channels, self.lambda_min, self.lambda_max, self.res_power
        )
    }
}

// =============================================================================
// Granule
// =============================================================================

/// Grouping key for observation rows: target, instrument mode and night
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Granule {
    pub target: Target,
    pub ins_mode: InstrumentMode,
    pub night_id: i32,
}

impl Granule {
    pub fn new(target: Target, ins_mode: InstrumentMode, night_id: i32) -> Self {
        Self {
            target,
            ins_mode,
            night_id,
        }
    }
}

impl fmt::Display for Granule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{} | {} | night {}]",
            self.target.name, self.ins_mode.ins_name, self.night_id
        )
    }
}

/// Format station ids as `[1, 2, 3]`
pub fn format_sta_index(ids: &[i16]) -> String {
    let items: Vec<String> = ids.iter().map(|id| id.to_string()).collect();
    format!("[{}]", items.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn target(name: &str, ra: f64) -> Target {
        Target {
            name: name.to_string(),
            ra_ep0: ra,
            dec_ep0: -12.5,
            equinox: 2000.0,
            pm_ra: 0.0,
            pm_dec: 0.0,
            parallax: 0.0,
            spec_type: "K0III".to_string(),
        }
    }

    #[test]
    fn test_identical_targets_collapse() {
        let mut set = HashSet::new();
        set.insert(target("HD 1234", 10.0));
        set.insert(target("HD 1234", 10.0));
        set.insert(target("HD 1234", 10.5));
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_undefined_target_equals_itself() {
        // NaN fields compare by bit pattern
        assert_eq!(Target::undefined(), Target::undefined());
        assert_eq!(InstrumentMode::undefined(), InstrumentMode::undefined());
    }

    #[test]
    fn test_granule_equality() {
        let mode = InstrumentMode {
            ins_name: "AMBER".to_string(),
            nb_channels: 3,
            lambda_min: 2.0e-6,
            lambda_max: 2.4e-6,
            res_power: 35.0,
        };
        let a = Granule::new(target("A", 1.0), mode.clone(), 58000);
        let b = Granule::new(target("A", 1.0), mode.clone(), 58000);
        let c = Granule::new(target("A", 1.0), mode, 58001);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_format_sta_index() {
        assert_eq!(format_sta_index(&[1, 12, 3]), "[1, 12, 3]");
        assert_eq!(format_sta_index(&[]), "[]");
    }
}
