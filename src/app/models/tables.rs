//! OIFITS tables owned by a loaded file
//!
//! `OiTable` holds the raw converted keywords and columns of one extension.
//! The typed wrappers add the accessors and derived indexes for each table
//! kind. Any raw mutation sets the `changed` flag; derived accessors return
//! `None` until the analyzer has recomputed them.

use super::columns::{ColumnArray, ColumnData, KeywordValue};
use super::schema::TableKind;
use super::{Granule, InstrumentMode, StaIndex, Target};
use crate::constants::{columns as col, keywords as kw};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::ops::{Deref, DerefMut};

// =============================================================================
// Raw Table
// =============================================================================

/// Raw keywords and columns of one OIFITS extension
#[derive(Debug, Clone)]
pub struct OiTable {
    kind: TableKind,
    ext_index: usize,
    n_rows: usize,
    keywords: BTreeMap<String, KeywordValue>,
    columns: BTreeMap<String, ColumnData>,
    changed: bool,
}

impl OiTable {
    /// Create an empty table for extension `ext_index` of the container
    pub fn new(kind: TableKind, ext_index: usize, n_rows: usize) -> Self {
        Self {
            kind,
            ext_index,
            n_rows,
            keywords: BTreeMap::new(),
            columns: BTreeMap::new(),
            changed: true,
        }
    }

    pub fn kind(&self) -> TableKind {
        self.kind
    }

    /// Position of the extension in the container (primary HDU is 0)
    pub fn ext_index(&self) -> usize {
        self.ext_index
    }

    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    pub fn keyword(&self, name: &str) -> Option<&KeywordValue> {
        self.keywords.get(name)
    }

    pub fn keyword_str(&self, name: &str) -> Option<&str> {
        self.keywords.get(name).and_then(KeywordValue::as_str)
    }

    pub fn keyword_i32(&self, name: &str) -> Option<i32> {
        self.keywords.get(name).and_then(KeywordValue::as_i32)
    }

    pub fn keywords(&self) -> impl Iterator<Item = (&str, &KeywordValue)> {
        self.keywords.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn column(&self, name: &str) -> Option<&ColumnData> {
        self.columns.get(name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.contains_key(name)
    }

    pub fn columns(&self) -> impl Iterator<Item = (&str, &ColumnData)> {
        self.columns.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn text_column(&self, name: &str) -> Option<&[String]> {
        self.column(name).and_then(ColumnData::as_text)
    }

    pub fn int_column(&self, name: &str) -> Option<&ColumnArray<i16>> {
        self.column(name).and_then(ColumnData::as_int)
    }

    pub fn double_column(&self, name: &str) -> Option<&ColumnArray<f64>> {
        self.column(name).and_then(ColumnData::as_double)
    }

    pub fn real_column(&self, name: &str) -> Option<&ColumnArray<f32>> {
        self.column(name).and_then(ColumnData::as_real)
    }

    pub fn logical_column(&self, name: &str) -> Option<&ColumnArray<bool>> {
        self.column(name).and_then(ColumnData::as_logical)
    }

    pub fn set_keyword(&mut self, name: impl Into<String>, value: KeywordValue) {
        self.keywords.insert(name.into(), value);
        self.changed = true;
    }

    pub fn set_column(&mut self, name: impl Into<String>, data: ColumnData) {
        self.columns.insert(name.into(), data);
        self.changed = true;
    }

    pub fn remove_column(&mut self, name: &str) -> Option<ColumnData> {
        let removed = self.columns.remove(name);
        if removed.is_some() {
            self.changed = true;
        }
        removed
    }

    /// True when derived indexes are stale
    pub fn is_changed(&self) -> bool {
        self.changed
    }

    pub fn mark_changed(&mut self) {
        self.changed = true;
    }

    pub(crate) fn clear_changed(&mut self) {
        self.changed = false;
    }

    /// `OI_REVN` value if present
    pub fn revision(&self) -> Option<i32> {
        self.keyword_i32(kw::OI_REVN)
    }
}

macro_rules! table_wrapper {
    ($name:ident) => {
        impl Deref for $name {
            type Target = OiTable;

            fn deref(&self) -> &OiTable {
                &self.table
            }
        }

        impl DerefMut for $name {
            fn deref_mut(&mut self) -> &mut OiTable {
                &mut self.table
            }
        }

        impl $name {
            pub fn table(&self) -> &OiTable {
                &self.table
            }
        }
    };
}

// =============================================================================
// OI_TARGET
// =============================================================================

/// Lookup maps built over the target catalog
#[derive(Debug, Clone, Default)]
pub struct TargetIndex {
    pub(crate) id_to_row: HashMap<i16, usize>,
    pub(crate) id_to_target: HashMap<i16, Target>,
    pub(crate) name_to_id: HashMap<String, i16>,
    pub(crate) target_to_ids: HashMap<Target, Vec<i16>>,
}

impl TargetIndex {
    pub fn row_of(&self, id: i16) -> Option<usize> {
        self.id_to_row.get(&id).copied()
    }

    pub fn target_of(&self, id: i16) -> Option<&Target> {
        self.id_to_target.get(&id)
    }

    /// Target id for a name (last row wins when names collide)
    pub fn id_of(&self, name: &str) -> Option<i16> {
        self.name_to_id.get(name).copied()
    }

    /// All ids describing the same logical target
    pub fn ids_of(&self, target: &Target) -> &[i16] {
        self.target_to_ids
            .get(target)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Number of distinct logical targets
    pub fn distinct_targets(&self) -> usize {
        self.target_to_ids.len()
    }
}

/// Target catalog table
#[derive(Debug, Clone)]
pub struct OiTarget {
    table: OiTable,
    index: TargetIndex,
}

table_wrapper!(OiTarget);

impl OiTarget {
    pub fn new(table: OiTable) -> Self {
        Self {
            table,
            index: TargetIndex::default(),
        }
    }

    /// Raw `TARGET_ID` values in row order
    pub fn target_ids(&self) -> Vec<i16> {
        self.int_column(col::TARGET_ID)
            .map(|c| c.iter_rows().map(|r| r[0]).collect())
            .unwrap_or_default()
    }

    /// Build the logical target described by row `row`
    ///
    /// Missing columns leave the matching field undefined.
    pub fn create_target(&self, row: usize) -> Target {
        let text = |name: &str| {
            self.text_column(name)
                .and_then(|v| v.get(row))
                .cloned()
                .unwrap_or_default()
        };
        let double = |name: &str| {
            self.double_column(name)
                .and_then(|c| c.get(row))
                .unwrap_or(f64::NAN)
        };
        let real = |name: &str| {
            self.real_column(name)
                .and_then(|c| c.get(row))
                .unwrap_or(f32::NAN)
        };

        Target {
            name: text(col::TARGET),
            ra_ep0: double(col::RAEP0),
            dec_ep0: double(col::DECEP0),
            equinox: real(col::EQUINOX),
            pm_ra: double(col::PMRA),
            pm_dec: double(col::PMDEC),
            parallax: real(col::PARALLAX),
            spec_type: text(col::SPECTYP),
        }
    }

    pub fn index(&self) -> Option<&TargetIndex> {
        (!self.table.is_changed()).then_some(&self.index)
    }

    pub(crate) fn set_index(&mut self, index: TargetIndex) {
        self.index = index;
        self.table.clear_changed();
    }
}

// =============================================================================
// OI_ARRAY
// =============================================================================

/// Array geometry table
#[derive(Debug, Clone)]
pub struct OiArray {
    table: OiTable,
    station_rows: HashMap<i16, usize>,
}

table_wrapper!(OiArray);

impl OiArray {
    pub fn new(table: OiTable) -> Self {
        Self {
            table,
            station_rows: HashMap::new(),
        }
    }

    pub fn arr_name(&self) -> Option<&str> {
        self.keyword_str(kw::ARRNAME)
    }

    /// Raw `STA_INDEX` values in row order
    pub fn station_ids(&self) -> Vec<i16> {
        self.int_column(col::STA_INDEX)
            .map(|c| c.iter_rows().map(|r| r[0]).collect())
            .unwrap_or_default()
    }

    pub fn station_rows(&self) -> Option<&HashMap<i16, usize>> {
        (!self.table.is_changed()).then_some(&self.station_rows)
    }

    pub fn station_row(&self, id: i16) -> Option<usize> {
        self.station_rows().and_then(|rows| rows.get(&id).copied())
    }

    pub fn station_name(&self, id: i16) -> Option<&str> {
        let row = self.station_row(id)?;
        self.text_column(col::STA_NAME)
            .and_then(|names| names.get(row))
            .map(String::as_str)
    }

    pub(crate) fn set_station_rows(&mut self, rows: HashMap<i16, usize>) {
        self.station_rows = rows;
        self.table.clear_changed();
    }
}

// =============================================================================
// OI_WAVELENGTH
// =============================================================================

/// Spectral channel table
#[derive(Debug, Clone)]
pub struct OiWavelength {
    table: OiTable,
    instrument_mode: Option<InstrumentMode>,
}

table_wrapper!(OiWavelength);

impl OiWavelength {
    pub fn new(table: OiTable) -> Self {
        Self {
            table,
            instrument_mode: None,
        }
    }

    pub fn ins_name(&self) -> Option<&str> {
        self.keyword_str(kw::INSNAME)
    }

    /// Number of spectral channels
    pub fn n_wave(&self) -> usize {
        self.n_rows()
    }

    pub fn eff_wave(&self) -> Option<&ColumnArray<f32>> {
        self.real_column(col::EFF_WAVE)
    }

    pub fn eff_band(&self) -> Option<&ColumnArray<f32>> {
        self.real_column(col::EFF_BAND)
    }

    pub fn instrument_mode(&self) -> Option<&InstrumentMode> {
        if self.table.is_changed() {
            return None;
        }
        self.instrument_mode.as_ref()
    }

    pub(crate) fn set_instrument_mode(&mut self, mode: InstrumentMode) {
        self.instrument_mode = Some(mode);
        self.table.clear_changed();
    }
}

// =============================================================================
// OI_VIS / OI_VIS2 / OI_T3
// =============================================================================

/// Indexes derived by the analyzer for one data table
#[derive(Debug, Clone, Default)]
pub struct DataDerived {
    pub distinct_target_ids: BTreeSet<i16>,
    /// Granule of each row
    pub granules: Vec<Granule>,
    pub flagged_count: usize,
    /// Canonical observed tuples in first-seen order
    pub distinct_sta_indexes: Vec<StaIndex>,
    /// Canonical tuple of each row
    pub row_sta_indexes: Vec<StaIndex>,
    pub distinct_configurations: Vec<StaIndex>,
    /// Configuration of each row, `None` when inference left it unassigned
    pub row_configurations: Vec<Option<StaIndex>>,
    /// Sorted tuples implied by the configurations but never observed
    pub missing_sta_indexes: BTreeSet<Vec<i16>>,
}

/// Observation data table
#[derive(Debug, Clone)]
pub struct OiData {
    table: OiTable,
    n_wave: Option<usize>,
    derived: DataDerived,
}

table_wrapper!(OiData);

impl OiData {
    /// Wrap a data table; `n_wave` comes from the matching wavelength table
    pub fn new(table: OiTable, n_wave: Option<usize>) -> Self {
        Self {
            table,
            n_wave,
            derived: DataDerived::default(),
        }
    }

    pub fn ins_name(&self) -> Option<&str> {
        self.keyword_str(kw::INSNAME)
    }

    pub fn arr_name(&self) -> Option<&str> {
        self.keyword_str(kw::ARRNAME)
    }

    pub fn date_obs(&self) -> Option<&str> {
        self.keyword_str(kw::DATE_OBS)
    }

    /// Channel count resolved at load time
    pub fn n_wave(&self) -> Option<usize> {
        self.n_wave
    }

    /// Station index arity of this table kind
    pub fn arity(&self) -> usize {
        self.kind().station_arity().unwrap_or_default()
    }

    /// `TARGET_ID` of each row (empty when the column is missing)
    pub fn target_ids(&self) -> Vec<i16> {
        self.int_column(col::TARGET_ID)
            .map(|c| c.iter_rows().map(|r| r[0]).collect())
            .unwrap_or_default()
    }

    pub fn mjd(&self) -> Option<&ColumnArray<f64>> {
        self.double_column(col::MJD)
    }

    pub fn flags(&self) -> Option<&ColumnArray<bool>> {
        self.logical_column(col::FLAG)
    }

    pub fn sta_index(&self) -> Option<&ColumnArray<i16>> {
        self.int_column(col::STA_INDEX)
    }

    /// Night identifier of each row, the MJD rounded to the nearest day
    ///
    /// Rows without an MJD fall on night 0.
    pub fn night_ids(&self) -> Vec<i32> {
        match self.mjd() {
            Some(mjd) => mjd
                .iter_rows()
                .map(|r| r[0].round() as i32)
                .collect(),
            None => vec![0; self.n_rows()],
        }
    }

    pub fn derived(&self) -> Option<&DataDerived> {
        (!self.table.is_changed()).then_some(&self.derived)
    }

    pub fn distinct_target_ids(&self) -> Option<&BTreeSet<i16>> {
        self.derived().map(|d| &d.distinct_target_ids)
    }

    pub fn granule(&self, row: usize) -> Option<&Granule> {
        self.derived().and_then(|d| d.granules.get(row))
    }

    pub fn flagged_count(&self) -> Option<usize> {
        self.derived().map(|d| d.flagged_count)
    }

    pub fn distinct_sta_indexes(&self) -> Option<&[StaIndex]> {
        self.derived().map(|d| d.distinct_sta_indexes.as_slice())
    }

    pub fn row_sta_index(&self, row: usize) -> Option<&StaIndex> {
        self.derived().and_then(|d| d.row_sta_indexes.get(row))
    }

    pub fn distinct_configurations(&self) -> Option<&[StaIndex]> {
        self.derived().map(|d| d.distinct_configurations.as_slice())
    }

    pub fn row_configuration(&self, row: usize) -> Option<&StaIndex> {
        self.derived()
            .and_then(|d| d.row_configurations.get(row))
            .and_then(Option::as_ref)
    }

    pub fn missing_sta_indexes(&self) -> Option<&BTreeSet<Vec<i16>>> {
        self.derived().map(|d| &d.missing_sta_indexes)
    }

    pub(crate) fn set_derived(&mut self, derived: DataDerived) {
        self.derived = derived;
        self.table.clear_changed();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn data_table() -> OiData {
        let mut table = OiTable::new(TableKind::Vis2, 3, 2);
        table.set_keyword(kw::INSNAME, KeywordValue::Text("AMBER".into()));
        table.set_column(
            col::MJD,
            ColumnData::Double(ColumnArray::scalar(vec![58000.4, 58000.6])),
        );
        table.set_column(
            col::STA_INDEX,
            ColumnData::Int(ColumnArray::vector(vec![1, 2, 2, 3], 2)),
        );
        OiData::new(table, Some(1))
    }

    #[test]
    fn test_new_table_is_changed() {
        let data = data_table();
        assert!(data.is_changed());
        assert!(data.derived().is_none());
        assert!(data.flagged_count().is_none());
    }

    #[test]
    fn test_setter_invalidates_derived() {
        let mut data = data_table();
        data.set_derived(DataDerived {
            flagged_count: 4,
            ..DataDerived::default()
        });
        assert_eq!(data.flagged_count(), Some(4));

        data.set_keyword(kw::DATE_OBS, KeywordValue::Text("2017-01-01".into()));
        assert!(data.is_changed());
        assert_eq!(data.flagged_count(), None);
    }

    #[test]
    fn test_night_ids_round_mjd() {
        let data = data_table();
        assert_eq!(data.night_ids(), vec![58000, 58001]);
        assert_eq!(data.arity(), 2);
        assert_eq!(data.ins_name(), Some("AMBER"));
    }

    #[test]
    fn test_create_target_with_missing_columns() {
        let mut table = OiTable::new(TableKind::Target, 1, 1);
        table.set_column(col::TARGET, ColumnData::Char(vec!["HD 1".into()]));
        table.set_column(
            col::RAEP0,
            ColumnData::Double(ColumnArray::scalar(vec![12.5])),
        );
        let target = OiTarget::new(table).create_target(0);
        assert_eq!(target.name, "HD 1");
        assert_eq!(target.ra_ep0, 12.5);
        assert!(target.dec_ep0.is_nan());
        assert!(target.spec_type.is_empty());
    }

    #[test]
    fn test_station_lookup_requires_analysis() {
        let mut table = OiTable::new(TableKind::Array, 2, 2);
        table.set_column(
            col::STA_NAME,
            ColumnData::Char(vec!["A0".into(), "K0".into()]),
        );
        table.set_column(
            col::STA_INDEX,
            ColumnData::Int(ColumnArray::scalar(vec![1, 7])),
        );
        let mut array = OiArray::new(table);
        assert_eq!(array.station_ids(), vec![1, 7]);
        assert_eq!(array.station_row(7), None);

        array.set_station_rows(HashMap::from([(1, 0), (7, 1)]));
        assert_eq!(array.station_name(7), Some("K0"));
    }
}
