//! Application constants for the OIFITS processor
//!
//! This module contains the FITS container constants, the OIFITS table,
//! keyword and column names, and the enumerated values accepted by the
//! standard.

// =============================================================================
// FITS Container
// =============================================================================

/// Size of a FITS logical record in bytes
pub const FITS_BLOCK_SIZE: usize = 2880;

/// Size of a header card in bytes
pub const FITS_CARD_SIZE: usize = 80;

/// BITPIX values allowed by the FITS standard
pub const VALID_BITPIX: &[i64] = &[8, 16, 32, 64, -32, -64];

/// Largest column count of a binary table
pub const MAX_TFIELDS: usize = 999;

/// Extension type of binary tables
pub const XTENSION_BINTABLE: &str = "BINTABLE";

/// File extensions picked up when a directory is scanned
pub const DEFAULT_FILE_EXTENSIONS: &[&str] = &["fits", "oifits", "fit"];

/// Supported OIFITS revision
pub const OI_REVN_SUPPORTED: i32 = 1;

// =============================================================================
// Table Names
// =============================================================================

pub const TABLE_OI_TARGET: &str = "OI_TARGET";
pub const TABLE_OI_ARRAY: &str = "OI_ARRAY";
pub const TABLE_OI_WAVELENGTH: &str = "OI_WAVELENGTH";
pub const TABLE_OI_VIS: &str = "OI_VIS";
pub const TABLE_OI_VIS2: &str = "OI_VIS2";
pub const TABLE_OI_T3: &str = "OI_T3";

// =============================================================================
// Keywords
// =============================================================================

pub mod keywords {
    pub const EXTNAME: &str = "EXTNAME";
    pub const XTENSION: &str = "XTENSION";
    pub const SIMPLE: &str = "SIMPLE";
    pub const BITPIX: &str = "BITPIX";
    pub const NAXIS: &str = "NAXIS";
    pub const PCOUNT: &str = "PCOUNT";
    pub const GCOUNT: &str = "GCOUNT";
    pub const TFIELDS: &str = "TFIELDS";
    pub const END: &str = "END";

    pub const OI_REVN: &str = "OI_REVN";
    pub const DATE_OBS: &str = "DATE-OBS";
    pub const ARRNAME: &str = "ARRNAME";
    pub const INSNAME: &str = "INSNAME";
    pub const FRAME: &str = "FRAME";
    pub const ARRAYX: &str = "ARRAYX";
    pub const ARRAYY: &str = "ARRAYY";
    pub const ARRAYZ: &str = "ARRAYZ";
}

// =============================================================================
// Columns
// =============================================================================

pub mod columns {
    // OI_TARGET
    pub const TARGET_ID: &str = "TARGET_ID";
    pub const TARGET: &str = "TARGET";
    pub const RAEP0: &str = "RAEP0";
    pub const DECEP0: &str = "DECEP0";
    pub const EQUINOX: &str = "EQUINOX";
    pub const RA_ERR: &str = "RA_ERR";
    pub const DEC_ERR: &str = "DEC_ERR";
    pub const SYSVEL: &str = "SYSVEL";
    pub const VELTYP: &str = "VELTYP";
    pub const VELDEF: &str = "VELDEF";
    pub const PMRA: &str = "PMRA";
    pub const PMDEC: &str = "PMDEC";
    pub const PMRA_ERR: &str = "PMRA_ERR";
    pub const PMDEC_ERR: &str = "PMDEC_ERR";
    pub const PARALLAX: &str = "PARALLAX";
    pub const PARA_ERR: &str = "PARA_ERR";
    pub const SPECTYP: &str = "SPECTYP";

    // OI_ARRAY
    pub const TEL_NAME: &str = "TEL_NAME";
    pub const STA_NAME: &str = "STA_NAME";
    pub const STA_INDEX: &str = "STA_INDEX";
    pub const DIAMETER: &str = "DIAMETER";
    pub const STAXYZ: &str = "STAXYZ";

    // OI_WAVELENGTH
    pub const EFF_WAVE: &str = "EFF_WAVE";
    pub const EFF_BAND: &str = "EFF_BAND";

    // OI_VIS, OI_VIS2, OI_T3
    pub const TIME: &str = "TIME";
    pub const MJD: &str = "MJD";
    pub const INT_TIME: &str = "INT_TIME";
    pub const FLAG: &str = "FLAG";
    pub const UCOORD: &str = "UCOORD";
    pub const VCOORD: &str = "VCOORD";
    pub const VISAMP: &str = "VISAMP";
    pub const VISAMPERR: &str = "VISAMPERR";
    pub const VISPHI: &str = "VISPHI";
    pub const VISPHIERR: &str = "VISPHIERR";
    pub const VISDATA: &str = "VISDATA";
    pub const VISERR: &str = "VISERR";
    pub const VIS2DATA: &str = "VIS2DATA";
    pub const VIS2ERR: &str = "VIS2ERR";
    pub const T3AMP: &str = "T3AMP";
    pub const T3AMPERR: &str = "T3AMPERR";
    pub const T3PHI: &str = "T3PHI";
    pub const T3PHIERR: &str = "T3PHIERR";
    pub const U1COORD: &str = "U1COORD";
    pub const V1COORD: &str = "V1COORD";
    pub const U2COORD: &str = "U2COORD";
    pub const V2COORD: &str = "V2COORD";
}

// =============================================================================
// Accepted Values
// =============================================================================

/// Accepted values of the OI_ARRAY FRAME keyword
pub const FRAME_VALUES: &[&str] = &["GEOCENTRIC"];

/// Accepted values of the OI_TARGET VELTYP column
pub const VELTYP_VALUES: &[&str] = &["LSR", "HELIOCEN", "BARYCENT", "GEOCENTR", "TOPOCENT"];

/// Accepted values of the OI_TARGET VELDEF column
pub const VELDEF_VALUES: &[&str] = &["RADIO", "OPTICAL"];

// =============================================================================
// Station Indexes
// =============================================================================

/// Arity of a baseline station index
pub const BASELINE_ARITY: usize = 2;

/// Arity of a triplet station index
pub const TRIPLET_ARITY: usize = 3;

/// Name of the target used when a data row references no known target
pub const UNDEFINED_TARGET_NAME: &str = "UNDEFINED";

/// Name of the instrument mode used when no wavelength table matches
pub const UNDEFINED_INSTRUMENT_NAME: &str = "UNDEFINED";
