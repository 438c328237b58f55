//! Station index canonicalisation
//!
//! Rows carrying the same ordered station tuple share one instance. Order is
//! significant here: `(1, 2)` and `(2, 1)` stay distinct.

use crate::app::models::{ColumnArray, OiArray, StaIndex, format_sta_index};
use std::collections::HashMap;
use std::sync::Arc;

/// Shared tuple instances of one data table
#[derive(Debug, Clone, Default)]
pub struct CanonicalStaIndexes {
    /// Distinct tuples in first-seen order
    pub distinct: Vec<StaIndex>,
    /// Tuple of each row, pointing into `distinct`
    pub rows: Vec<StaIndex>,
}

/// Map every row of a `STA_INDEX` column to a shared tuple instance
pub fn canonicalize(sta_index: &ColumnArray<i16>) -> CanonicalStaIndexes {
    let mut canonical = CanonicalStaIndexes::default();
    let mut instances: HashMap<&[i16], StaIndex> = HashMap::new();

    for row in sta_index.iter_rows() {
        let instance = match instances.get(row) {
            Some(existing) => Arc::clone(existing),
            None => {
                let instance: StaIndex = Arc::from(row);
                instances.insert(row, Arc::clone(&instance));
                canonical.distinct.push(Arc::clone(&instance));
                instance
            }
        };
        canonical.rows.push(instance);
    }

    canonical
}

/// Station names of a tuple joined by `-`, e.g. `A0-K0-G1`
///
/// Falls back to the numeric form when the array table or a station is
/// unknown.
pub fn station_names(array: Option<&OiArray>, sta_index: &[i16]) -> String {
    let names: Option<Vec<&str>> = array.and_then(|array| {
        sta_index
            .iter()
            .map(|&id| array.station_name(id))
            .collect()
    });

    match names {
        Some(names) => names.join("-"),
        None => format_sta_index(sta_index),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_equal_rows_share_one_instance() {
        let column = ColumnArray::vector(vec![1, 2, 2, 1, 1, 2, 3, 4], 2);
        let canonical = canonicalize(&column);

        assert_eq!(canonical.distinct.len(), 3);
        assert_eq!(canonical.distinct[0].as_ref(), &[1, 2]);
        assert_eq!(canonical.distinct[1].as_ref(), &[2, 1]);
        assert!(Arc::ptr_eq(&canonical.rows[0], &canonical.rows[2]));
        assert!(!Arc::ptr_eq(&canonical.rows[0], &canonical.rows[1]));
        assert_eq!(canonical.rows.len(), 4);
    }

    #[test]
    fn test_names_without_array_use_numbers() {
        assert_eq!(station_names(None, &[1, 3]), "[1, 3]");
    }
}
