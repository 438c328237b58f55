//! Root object of a loaded OIFITS file

use super::tables::{OiArray, OiData, OiTarget, OiWavelength};
use super::Granule;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::path::{Path, PathBuf};

/// Granule to data-table map, iterated in first-seen order
#[derive(Debug, Clone, Default)]
pub struct GranuleIndex {
    order: Vec<Granule>,
    tables: HashMap<Granule, BTreeSet<usize>>,
}

impl GranuleIndex {
    /// Record that data table `table` has rows in `granule`
    pub fn insert(&mut self, granule: Granule, table: usize) {
        if let Some(set) = self.tables.get_mut(&granule) {
            set.insert(table);
            return;
        }
        self.order.push(granule.clone());
        self.tables.insert(granule, BTreeSet::from([table]));
    }

    pub fn get(&self, granule: &Granule) -> Option<&BTreeSet<usize>> {
        self.tables.get(granule)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Granule, &BTreeSet<usize>)> {
        self.order
            .iter()
            .filter_map(|g| self.tables.get(g).map(|tables| (g, tables)))
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn clear(&mut self) {
        self.order.clear();
        self.tables.clear();
    }
}

/// Loaded OIFITS file owning all of its tables
///
/// Data tables are referenced by their position in [`OiFitsFile::data_tables`].
#[derive(Debug, Clone)]
pub struct OiFitsFile {
    path: PathBuf,
    pub(crate) targets: Vec<OiTarget>,
    pub(crate) arrays: Vec<OiArray>,
    pub(crate) wavelengths: Vec<OiWavelength>,
    pub(crate) data: Vec<OiData>,
    pub(crate) granules: GranuleIndex,
    pub(crate) tables_per_target: BTreeMap<String, Vec<usize>>,
}

impl OiFitsFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            targets: Vec::new(),
            arrays: Vec::new(),
            wavelengths: Vec::new(),
            data: Vec::new(),
            granules: GranuleIndex::default(),
            tables_per_target: BTreeMap::new(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Target catalog in use (the first one when several are present)
    pub fn oi_target(&self) -> Option<&OiTarget> {
        self.targets.first()
    }

    pub fn target_tables(&self) -> &[OiTarget] {
        &self.targets
    }

    pub fn array_tables(&self) -> &[OiArray] {
        &self.arrays
    }

    pub fn wavelength_tables(&self) -> &[OiWavelength] {
        &self.wavelengths
    }

    pub fn data_tables(&self) -> &[OiData] {
        &self.data
    }

    pub fn data_tables_mut(&mut self) -> &mut [OiData] {
        &mut self.data
    }

    pub fn has_data(&self) -> bool {
        !self.data.is_empty()
    }

    /// Wavelength table whose `INSNAME` equals `ins_name`
    pub fn wavelength_for(&self, ins_name: &str) -> Option<&OiWavelength> {
        self.wavelengths
            .iter()
            .find(|w| w.ins_name() == Some(ins_name))
    }

    /// Array table whose `ARRNAME` equals `arr_name`
    pub fn array_for(&self, arr_name: &str) -> Option<&OiArray> {
        self.arrays.iter().find(|a| a.arr_name() == Some(arr_name))
    }

    pub fn add_target(&mut self, table: OiTarget) {
        self.targets.push(table);
    }

    pub fn add_array(&mut self, table: OiArray) {
        self.arrays.push(table);
    }

    pub fn add_wavelength(&mut self, table: OiWavelength) {
        self.wavelengths.push(table);
    }

    pub fn add_data(&mut self, table: OiData) {
        self.data.push(table);
    }

    /// Granule to data-table map built by the analyzer
    pub fn granules(&self) -> &GranuleIndex {
        &self.granules
    }

    /// Data tables with rows on the named target
    pub fn tables_for_target(&self, name: &str) -> &[usize] {
        self.tables_per_target
            .get(name)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn target_names(&self) -> impl Iterator<Item = &str> {
        self.tables_per_target.keys().map(String::as_str)
    }

    /// True when any table was modified since the last analysis
    pub fn is_changed(&self) -> bool {
        self.targets.iter().any(|t| t.is_changed())
            || self.arrays.iter().any(|t| t.is_changed())
            || self.wavelengths.iter().any(|t| t.is_changed())
            || self.data.iter().any(|t| t.is_changed())
    }

    /// Total number of OIFITS tables
    pub fn table_count(&self) -> usize {
        self.targets.len() + self.arrays.len() + self.wavelengths.len() + self.data.len()
    }

    pub(crate) fn reset_file_indexes(&mut self) {
        self.granules.clear();
        self.tables_per_target.clear();
    }
}
