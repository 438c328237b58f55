//! Scalar types and physical units understood by the OIFITS schemas
//!
//! Units are matched against a fixed token set, case-insensitively, in
//! declaration order. The first unit whose token set contains the text wins.

use serde::{Deserialize, Serialize};
use std::fmt;

// =============================================================================
// Scalar Types
// =============================================================================

/// Scalar element type of a keyword or column
///
/// The character representation matches the FITS `TFORMn` type code used by
/// the OIFITS standard for that logical type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScalarType {
    /// Character string (`A`)
    Char,
    /// 16-bit signed integer (`I`)
    Int,
    /// 64-bit float (`D`)
    Double,
    /// 32-bit float (`E`)
    Real,
    /// Pair of 32-bit floats (`C`)
    Complex,
    /// Boolean (`L`)
    Logical,
}

impl ScalarType {
    /// FITS type code for this scalar type
    pub fn code(&self) -> char {
        match self {
            ScalarType::Char => 'A',
            ScalarType::Int => 'I',
            ScalarType::Double => 'D',
            ScalarType::Real => 'E',
            ScalarType::Complex => 'C',
            ScalarType::Logical => 'L',
        }
    }

    /// Resolve a FITS type code to the scalar type it declares, if any
    pub fn from_code(code: char) -> Option<Self> {
        match code {
            'A' => Some(ScalarType::Char),
            'I' => Some(ScalarType::Int),
            'D' => Some(ScalarType::Double),
            'E' => Some(ScalarType::Real),
            'C' => Some(ScalarType::Complex),
            'L' => Some(ScalarType::Logical),
            _ => None,
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            ScalarType::Int | ScalarType::Double | ScalarType::Real | ScalarType::Complex
        )
    }
}

impl fmt::Display for ScalarType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

// =============================================================================
// Units
// =============================================================================

/// Physical unit attached to a column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Unit {
    NoUnit,
    Meter,
    Degree,
    Second,
    Mjd,
    Year,
    MeterPerSecond,
    DegreePerYear,
}

/// Units in the order their token sets are tested
const PARSE_ORDER: &[Unit] = &[
    Unit::Meter,
    Unit::Degree,
    Unit::Second,
    Unit::Mjd,
    Unit::Year,
    Unit::MeterPerSecond,
    Unit::DegreePerYear,
];

impl Unit {
    /// Accepted textual representations, canonical token first
    pub fn tokens(&self) -> &'static [&'static str] {
        match self {
            Unit::NoUnit => &[""],
            Unit::Meter => &["m", "meter", "meters"],
            Unit::Degree => &["deg", "degree", "degrees"],
            Unit::Second => &["s", "sec", "second", "seconds"],
            Unit::Mjd => &["day", "days"],
            Unit::Year => &["yr", "year", "years"],
            Unit::MeterPerSecond => &[
                "m/s",
                "m / s",
                "meter per second",
                "meters per second",
                "meter/second",
                "meters/second",
                "meter / second",
                "meters / second",
            ],
            Unit::DegreePerYear => &[
                "deg/yr",
                "deg / yr",
                "degree/yr",
                "degree / yr",
                "degrees/yr",
                "degrees / yr",
                "deg/year",
                "deg / year",
                "degree/year",
                "degree / year",
                "degrees/year",
                "degrees / year",
            ],
        }
    }

    /// Canonical token written for this unit
    pub fn canonical_token(&self) -> &'static str {
        self.tokens()[0]
    }

    /// Parse a unit string
    ///
    /// Returns `Some(Unit::NoUnit)` for absent or empty text and `None` when
    /// the text matches no token of any unit.
    pub fn parse(text: Option<&str>) -> Option<Unit> {
        let text = match text {
            None => return Some(Unit::NoUnit),
            Some(t) if t.is_empty() => return Some(Unit::NoUnit),
            Some(t) => t,
        };

        PARSE_ORDER
            .iter()
            .copied()
            .find(|unit| unit.matches(text))
    }

    fn matches(&self, text: &str) -> bool {
        self.tokens()
            .iter()
            .any(|token| token.eq_ignore_ascii_case(text))
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.tokens().join("|"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_empty_is_no_unit() {
        assert_eq!(Unit::parse(None), Some(Unit::NoUnit));
        assert_eq!(Unit::parse(Some("")), Some(Unit::NoUnit));
    }

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!(Unit::parse(Some("M")), Some(Unit::Meter));
        assert_eq!(Unit::parse(Some("Degrees")), Some(Unit::Degree));
        assert_eq!(Unit::parse(Some("DAY")), Some(Unit::Mjd));
        assert_eq!(Unit::parse(Some("Meters / Second")), Some(Unit::MeterPerSecond));
        assert_eq!(Unit::parse(Some("DEG/YR")), Some(Unit::DegreePerYear));
    }

    #[test]
    fn test_parse_no_substring_match() {
        assert_eq!(Unit::parse(Some("mm")), None);
        assert_eq!(Unit::parse(Some(" m")), None);
        assert_eq!(Unit::parse(Some("degC")), None);
    }

    #[test]
    fn test_parse_is_idempotent_for_every_token() {
        for unit in PARSE_ORDER.iter().chain(std::iter::once(&Unit::NoUnit)) {
            for token in unit.tokens() {
                let parsed = Unit::parse(Some(token)).unwrap();
                assert_eq!(parsed, *unit, "token '{}'", token);
                assert_eq!(Unit::parse(Some(parsed.canonical_token())), Some(parsed));
            }
        }
    }

    #[test]
    fn test_scalar_type_codes() {
        for ty in [
            ScalarType::Char,
            ScalarType::Int,
            ScalarType::Double,
            ScalarType::Real,
            ScalarType::Complex,
            ScalarType::Logical,
        ] {
            assert_eq!(ScalarType::from_code(ty.code()), Some(ty));
        }
        assert_eq!(ScalarType::from_code('J'), None);
        assert!(!ScalarType::Char.is_numeric());
        assert!(ScalarType::Complex.is_numeric());
    }
}
