//! Per-table indexing passes
//!
//! Reference tables are indexed first; data tables then resolve targets and
//! instrument modes through them.

use super::combinations::CombinationCache;
use super::configuration::infer_configurations;
use super::station_index::{canonicalize, station_names};
use crate::app::models::{
    DataDerived, Granule, GranuleIndex, InstrumentMode, OiArray, OiData, OiTarget, OiWavelength,
    Target, TargetIndex, format_sta_index,
};
use crate::config::AnalyzerConfig;
use crate::constants::columns as col;
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, info, warn};

/// Build the id, name and target lookups of a target catalog
pub fn index_target(target: &mut OiTarget) {
    let mut index = TargetIndex::default();
    let names = target.text_column(col::TARGET).map(<[String]>::to_vec);

    for (row, id) in target.target_ids().into_iter().enumerate() {
        index.id_to_row.insert(id, row);

        let name = names
            .as_ref()
            .and_then(|n| n.get(row).cloned())
            .unwrap_or_default();
        if let Some(previous) = index.name_to_id.insert(name.clone(), id) {
            if previous != id {
                warn!(
                    "Target name '{}' used by TARGET_ID {} and {}: keeping {}",
                    name, previous, id, id
                );
            }
        }

        let logical = target.create_target(row);
        index.target_to_ids.entry(logical.clone()).or_default().push(id);
        index.id_to_target.insert(id, logical);
    }

    debug!(
        "OI_TARGET [{}]: {} ids, {} distinct targets",
        target.ext_index(),
        index.id_to_row.len(),
        index.distinct_targets()
    );
    target.set_index(index);
}

/// Derive the instrument mode of a wavelength table
pub fn index_wavelength(wavelength: &mut OiWavelength) {
    let waves: Vec<f32> = wavelength
        .eff_wave()
        .map(|c| c.values().to_vec())
        .unwrap_or_default();
    let bands: Vec<f32> = wavelength
        .eff_band()
        .map(|c| c.values().to_vec())
        .unwrap_or_default();

    let finite = waves.iter().copied().filter(|w| w.is_finite());
    let lambda_min = finite.clone().fold(f32::NAN, f32::min);
    let lambda_max = finite.fold(f32::NAN, f32::max);

    let ratios: Vec<f32> = waves
        .iter()
        .zip(&bands)
        .filter(|(_, band)| **band > 0.0)
        .map(|(wave, band)| wave / band)
        .collect();
    let res_power = if ratios.is_empty() {
        0.0
    } else {
        ratios.iter().sum::<f32>() / ratios.len() as f32
    };

    let mode = InstrumentMode {
        ins_name: wavelength.ins_name().unwrap_or_default().to_string(),
        nb_channels: wavelength.n_wave(),
        lambda_min,
        lambda_max,
        res_power,
    };
    debug!("OI_WAVELENGTH [{}]: {}", wavelength.ext_index(), mode);
    wavelength.set_instrument_mode(mode);
}

/// Map station ids of an array table to their rows
pub fn index_array(array: &mut OiArray) {
    let rows: HashMap<i16, usize> = array
        .station_ids()
        .into_iter()
        .enumerate()
        .map(|(row, id)| (id, row))
        .collect();
    debug!("OI_ARRAY [{}]: {} stations", array.ext_index(), rows.len());
    array.set_station_rows(rows);
}

/// Reference tables a data table resolves against
pub struct DataContext<'a> {
    pub target: Option<&'a OiTarget>,
    pub wavelengths: &'a [OiWavelength],
    pub arrays: &'a [OiArray],
    pub cache: &'a CombinationCache,
    pub config: &'a AnalyzerConfig,
}

/// File-level maps filled while data tables are indexed
pub struct FileIndexes<'a> {
    pub granules: &'a mut GranuleIndex,
    pub tables_per_target: &'a mut BTreeMap<String, Vec<usize>>,
}

/// Compute the derived state of one data table
pub fn index_data(position: usize, data: &mut OiData, ctx: &DataContext<'_>, files: &mut FileIndexes<'_>) {
    let mut derived = DataDerived::default();
    let target_index = ctx.target.and_then(OiTarget::index);

    let ins_mode = data
        .ins_name()
        .and_then(|name| ctx.wavelengths.iter().find(|w| w.ins_name() == Some(name)))
        .and_then(OiWavelength::instrument_mode)
        .cloned()
        .unwrap_or_else(InstrumentMode::undefined);
    let array = data
        .arr_name()
        .and_then(|name| ctx.arrays.iter().find(|a| a.arr_name() == Some(name)));

    // granules
    let mut row_granules: HashMap<(i16, i32), Granule> = HashMap::new();
    for (target_id, night_id) in data.target_ids().into_iter().zip(data.night_ids()) {
        derived.distinct_target_ids.insert(target_id);

        let granule = row_granules
            .entry((target_id, night_id))
            .or_insert_with(|| {
                let target = target_index
                    .and_then(|index| index.target_of(target_id))
                    .cloned()
                    .unwrap_or_else(Target::undefined);
                Granule::new(target, ins_mode.clone(), night_id)
            })
            .clone();
        files.granules.insert(granule.clone(), position);
        derived.granules.push(granule);
    }

    derived.flagged_count = data
        .flags()
        .map(|flags| flags.values().iter().filter(|f| **f).count())
        .unwrap_or_default();

    // station indexes and configurations
    if let Some(sta_index) = data.sta_index() {
        let canonical = canonicalize(sta_index);
        derived.distinct_sta_indexes = canonical.distinct;
        derived.row_sta_indexes = canonical.rows;
    }

    if ctx.config.compute_configurations && !derived.distinct_sta_indexes.is_empty() {
        let arity = derived.distinct_sta_indexes[0].len();
        let inference = infer_configurations(&derived.distinct_sta_indexes, arity, ctx.cache);

        derived.row_configurations = derived
            .row_sta_indexes
            .iter()
            .map(|sta_index| {
                let configuration = inference.configuration_of(sta_index).cloned();
                if configuration.is_none() {
                    warn!(
                        "Missing station configuration for station index {} in table [{}]",
                        station_names(array, sta_index),
                        data.ext_index()
                    );
                }
                configuration
            })
            .collect();

        if ctx.config.report_missing && !inference.missing.is_empty() {
            let missing: Vec<String> = inference
                .missing
                .iter()
                .map(|tuple| format_sta_index(tuple))
                .collect();
            info!(
                "Table [{}]: missing {} / {} station indexes: [{}]",
                data.ext_index(),
                inference.missing.len(),
                derived.distinct_sta_indexes.len(),
                missing.join(", ")
            );
        }

        derived.distinct_configurations = inference.configurations;
        derived.missing_sta_indexes = inference.missing;
    } else {
        derived.row_configurations = vec![None; derived.row_sta_indexes.len()];
    }

    if let Some(index) = target_index {
        for (name, id) in &index.name_to_id {
            if derived.distinct_target_ids.contains(id) {
                files
                    .tables_per_target
                    .entry(name.clone())
                    .or_default()
                    .push(position);
            }
        }
    }

    debug!(
        "{} [{}]: {} granule rows, {} flagged, {} station indexes, {} configurations",
        data.kind(),
        data.ext_index(),
        derived.granules.len(),
        derived.flagged_count,
        derived.distinct_sta_indexes.len(),
        derived.distinct_configurations.len()
    );
    data.set_derived(derived);
}
