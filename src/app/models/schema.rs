//! Declarative OIFITS table schemas
//!
//! Each table kind is described by ordered keyword and column descriptors.
//! The loader interprets these records with one generic routine, so adding a
//! field to a table is a data change only.

use super::units::{ScalarType, Unit};
use crate::constants::{self, columns as col, keywords as kw};
use serde::{Deserialize, Serialize};
use std::fmt;

// =============================================================================
// Descriptors
// =============================================================================

/// Expected number of elements per row for a column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Cardinality {
    /// Fixed repeat count (string width for character columns)
    Fixed(usize),
    /// Number of spectral channels of the referenced wavelength table
    NWave,
}

/// Schema entry for a header keyword
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KeywordDescriptor {
    pub name: &'static str,
    pub data_type: ScalarType,
    pub mandatory: bool,
    pub accepted_values: Option<&'static [&'static str]>,
}

/// Schema entry for a table column
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColumnDescriptor {
    pub name: &'static str,
    pub data_type: ScalarType,
    pub cardinality: Cardinality,
    pub unit: Unit,
    pub mandatory: bool,
    pub accepted_values: Option<&'static [&'static str]>,
}

impl ColumnDescriptor {
    /// True when the column holds one value per spectral channel
    pub fn is_wave_dependent(&self) -> bool {
        self.cardinality == Cardinality::NWave
    }
}

const fn keyword(name: &'static str, data_type: ScalarType) -> KeywordDescriptor {
    KeywordDescriptor {
        name,
        data_type,
        mandatory: true,
        accepted_values: None,
    }
}

const fn optional_keyword(name: &'static str, data_type: ScalarType) -> KeywordDescriptor {
    KeywordDescriptor {
        name,
        data_type,
        mandatory: false,
        accepted_values: None,
    }
}

const fn column(
    name: &'static str,
    data_type: ScalarType,
    cardinality: Cardinality,
    unit: Unit,
) -> ColumnDescriptor {
    ColumnDescriptor {
        name,
        data_type,
        cardinality,
        unit,
        mandatory: true,
        accepted_values: None,
    }
}

const fn optional_column(
    name: &'static str,
    data_type: ScalarType,
    cardinality: Cardinality,
    unit: Unit,
) -> ColumnDescriptor {
    ColumnDescriptor {
        name,
        data_type,
        cardinality,
        unit,
        mandatory: false,
        accepted_values: None,
    }
}

use Cardinality::{Fixed, NWave};
use ScalarType::{Char, Complex, Double, Int, Logical, Real};

// =============================================================================
// Table Schemas
// =============================================================================

const OI_REVN: KeywordDescriptor = keyword(kw::OI_REVN, Int);

const TARGET_KEYWORDS: &[KeywordDescriptor] = &[OI_REVN];

const TARGET_COLUMNS: &[ColumnDescriptor] = &[
    column(col::TARGET_ID, Int, Fixed(1), Unit::NoUnit),
    column(col::TARGET, Char, Fixed(16), Unit::NoUnit),
    column(col::RAEP0, Double, Fixed(1), Unit::Degree),
    column(col::DECEP0, Double, Fixed(1), Unit::Degree),
    column(col::EQUINOX, Real, Fixed(1), Unit::Year),
    column(col::RA_ERR, Double, Fixed(1), Unit::Degree),
    column(col::DEC_ERR, Double, Fixed(1), Unit::Degree),
    column(col::SYSVEL, Double, Fixed(1), Unit::MeterPerSecond),
    ColumnDescriptor {
        accepted_values: Some(constants::VELTYP_VALUES),
        ..column(col::VELTYP, Char, Fixed(8), Unit::NoUnit)
    },
    ColumnDescriptor {
        accepted_values: Some(constants::VELDEF_VALUES),
        ..column(col::VELDEF, Char, Fixed(8), Unit::NoUnit)
    },
    column(col::PMRA, Double, Fixed(1), Unit::DegreePerYear),
    column(col::PMDEC, Double, Fixed(1), Unit::DegreePerYear),
    column(col::PMRA_ERR, Double, Fixed(1), Unit::DegreePerYear),
    column(col::PMDEC_ERR, Double, Fixed(1), Unit::DegreePerYear),
    column(col::PARALLAX, Real, Fixed(1), Unit::Degree),
    column(col::PARA_ERR, Real, Fixed(1), Unit::Degree),
    column(col::SPECTYP, Char, Fixed(16), Unit::NoUnit),
];

const ARRAY_KEYWORDS: &[KeywordDescriptor] = &[
    OI_REVN,
    keyword(kw::ARRNAME, Char),
    KeywordDescriptor {
        accepted_values: Some(constants::FRAME_VALUES),
        ..keyword(kw::FRAME, Char)
    },
    keyword(kw::ARRAYX, Double),
    keyword(kw::ARRAYY, Double),
    keyword(kw::ARRAYZ, Double),
];

const ARRAY_COLUMNS: &[ColumnDescriptor] = &[
    column(col::TEL_NAME, Char, Fixed(16), Unit::NoUnit),
    column(col::STA_NAME, Char, Fixed(16), Unit::NoUnit),
    column(col::STA_INDEX, Int, Fixed(1), Unit::NoUnit),
    column(col::DIAMETER, Real, Fixed(1), Unit::Meter),
    column(col::STAXYZ, Double, Fixed(3), Unit::Meter),
];

const WAVELENGTH_KEYWORDS: &[KeywordDescriptor] = &[OI_REVN, keyword(kw::INSNAME, Char)];

const WAVELENGTH_COLUMNS: &[ColumnDescriptor] = &[
    column(col::EFF_WAVE, Real, Fixed(1), Unit::Meter),
    column(col::EFF_BAND, Real, Fixed(1), Unit::Meter),
];

const DATA_KEYWORDS: &[KeywordDescriptor] = &[
    OI_REVN,
    keyword(kw::DATE_OBS, Char),
    optional_keyword(kw::ARRNAME, Char),
    keyword(kw::INSNAME, Char),
];

const DATA_LEADING_COLUMNS: &[ColumnDescriptor] = &[
    column(col::TARGET_ID, Int, Fixed(1), Unit::NoUnit),
    column(col::TIME, Double, Fixed(1), Unit::Second),
    column(col::MJD, Double, Fixed(1), Unit::Mjd),
    column(col::INT_TIME, Double, Fixed(1), Unit::Second),
];

const VIS_COLUMNS: &[ColumnDescriptor] = &[
    optional_column(col::VISDATA, Complex, NWave, Unit::NoUnit),
    optional_column(col::VISERR, Complex, NWave, Unit::NoUnit),
    column(col::VISAMP, Double, NWave, Unit::NoUnit),
    column(col::VISAMPERR, Double, NWave, Unit::NoUnit),
    column(col::VISPHI, Double, NWave, Unit::Degree),
    column(col::VISPHIERR, Double, NWave, Unit::Degree),
    column(col::UCOORD, Double, Fixed(1), Unit::Meter),
    column(col::VCOORD, Double, Fixed(1), Unit::Meter),
    column(col::STA_INDEX, Int, Fixed(2), Unit::NoUnit),
    column(col::FLAG, Logical, NWave, Unit::NoUnit),
];

const VIS2_COLUMNS: &[ColumnDescriptor] = &[
    column(col::VIS2DATA, Double, NWave, Unit::NoUnit),
    column(col::VIS2ERR, Double, NWave, Unit::NoUnit),
    column(col::UCOORD, Double, Fixed(1), Unit::Meter),
    column(col::VCOORD, Double, Fixed(1), Unit::Meter),
    column(col::STA_INDEX, Int, Fixed(2), Unit::NoUnit),
    column(col::FLAG, Logical, NWave, Unit::NoUnit),
];

const T3_COLUMNS: &[ColumnDescriptor] = &[
    column(col::T3AMP, Double, NWave, Unit::NoUnit),
    column(col::T3AMPERR, Double, NWave, Unit::NoUnit),
    column(col::T3PHI, Double, NWave, Unit::Degree),
    column(col::T3PHIERR, Double, NWave, Unit::Degree),
    column(col::U1COORD, Double, Fixed(1), Unit::Meter),
    column(col::V1COORD, Double, Fixed(1), Unit::Meter),
    column(col::U2COORD, Double, Fixed(1), Unit::Meter),
    column(col::V2COORD, Double, Fixed(1), Unit::Meter),
    column(col::STA_INDEX, Int, Fixed(3), Unit::NoUnit),
    column(col::FLAG, Logical, NWave, Unit::NoUnit),
];

/// Ordered keyword and column descriptors for one table kind
#[derive(Debug)]
pub struct TableSchema {
    keywords: &'static [KeywordDescriptor],
    column_groups: &'static [&'static [ColumnDescriptor]],
}

impl TableSchema {
    pub fn keywords(&self) -> impl Iterator<Item = &'static KeywordDescriptor> {
        self.keywords.iter()
    }

    pub fn columns(&self) -> impl Iterator<Item = &'static ColumnDescriptor> {
        self.column_groups.iter().flat_map(|group| group.iter())
    }

    pub fn column(&self, name: &str) -> Option<&'static ColumnDescriptor> {
        self.columns().find(|c| c.name == name)
    }

    pub fn keyword(&self, name: &str) -> Option<&'static KeywordDescriptor> {
        self.keywords().find(|k| k.name == name)
    }
}

static TARGET_SCHEMA: TableSchema = TableSchema {
    keywords: TARGET_KEYWORDS,
    column_groups: &[TARGET_COLUMNS],
};

static ARRAY_SCHEMA: TableSchema = TableSchema {
    keywords: ARRAY_KEYWORDS,
    column_groups: &[ARRAY_COLUMNS],
};

static WAVELENGTH_SCHEMA: TableSchema = TableSchema {
    keywords: WAVELENGTH_KEYWORDS,
    column_groups: &[WAVELENGTH_COLUMNS],
};

static VIS_SCHEMA: TableSchema = TableSchema {
    keywords: DATA_KEYWORDS,
    column_groups: &[DATA_LEADING_COLUMNS, VIS_COLUMNS],
};

static VIS2_SCHEMA: TableSchema = TableSchema {
    keywords: DATA_KEYWORDS,
    column_groups: &[DATA_LEADING_COLUMNS, VIS2_COLUMNS],
};

static T3_SCHEMA: TableSchema = TableSchema {
    keywords: DATA_KEYWORDS,
    column_groups: &[DATA_LEADING_COLUMNS, T3_COLUMNS],
};

// =============================================================================
// Table Kinds
// =============================================================================

/// OIFITS table kinds recognised by extension name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TableKind {
    Target,
    Array,
    Wavelength,
    Vis,
    Vis2,
    T3,
}

impl TableKind {
    pub const ALL: [TableKind; 6] = [
        TableKind::Target,
        TableKind::Array,
        TableKind::Wavelength,
        TableKind::Vis,
        TableKind::Vis2,
        TableKind::T3,
    ];

    /// Match an `EXTNAME` value to a table kind (exact match)
    pub fn from_ext_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.ext_name() == name)
    }

    pub fn ext_name(&self) -> &'static str {
        match self {
            TableKind::Target => constants::TABLE_OI_TARGET,
            TableKind::Array => constants::TABLE_OI_ARRAY,
            TableKind::Wavelength => constants::TABLE_OI_WAVELENGTH,
            TableKind::Vis => constants::TABLE_OI_VIS,
            TableKind::Vis2 => constants::TABLE_OI_VIS2,
            TableKind::T3 => constants::TABLE_OI_T3,
        }
    }

    pub fn schema(&self) -> &'static TableSchema {
        match self {
            TableKind::Target => &TARGET_SCHEMA,
            TableKind::Array => &ARRAY_SCHEMA,
            TableKind::Wavelength => &WAVELENGTH_SCHEMA,
            TableKind::Vis => &VIS_SCHEMA,
            TableKind::Vis2 => &VIS2_SCHEMA,
            TableKind::T3 => &T3_SCHEMA,
        }
    }

    /// Observation data tables are loaded in the second pass
    pub fn is_data(&self) -> bool {
        matches!(self, TableKind::Vis | TableKind::Vis2 | TableKind::T3)
    }

    /// Station index arity of data tables
    pub fn station_arity(&self) -> Option<usize> {
        match self {
            TableKind::Vis | TableKind::Vis2 => Some(constants::BASELINE_ARITY),
            TableKind::T3 => Some(constants::TRIPLET_ARITY),
            _ => None,
        }
    }
}

impl fmt::Display for TableKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.ext_name())
    }
}
