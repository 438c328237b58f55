//! Station configuration inference
//!
//! Observed baselines or triplets only say which stations were paired. The
//! configuration of the array (which stations were open together) is inferred
//! by growing station cliques from the observed tuples and then carving them
//! into clusters. Stations are graph nodes held in an arena; a node's
//! relations are the sorted tuples it belongs to.
//!
//! Every selection step breaks ties on `(relation count, station id)` so the
//! result never depends on hashing order.

use super::combinations::CombinationCache;
use crate::app::models::StaIndex;
use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::Arc;
use tracing::{debug, trace};

/// Outcome of the inference over one table's distinct station indexes
#[derive(Debug, Clone, Default)]
pub struct InferenceResult {
    /// Distinct configurations in the order they were produced
    pub configurations: Vec<StaIndex>,
    /// Configuration of each observed (ordered) tuple
    pub by_station_index: HashMap<Vec<i16>, StaIndex>,
    /// Sorted tuples implied by a configuration but never observed
    pub missing: BTreeSet<Vec<i16>>,
}

impl InferenceResult {
    pub fn configuration_of(&self, sta_index: &[i16]) -> Option<&StaIndex> {
        self.by_station_index.get(sta_index)
    }
}

#[derive(Debug)]
struct StationNode {
    sta_id: i16,
    relations: BTreeSet<Vec<i16>>,
    marked: bool,
}

impl StationNode {
    fn count(&self) -> usize {
        self.relations.len()
    }

    fn rank(&self) -> (usize, i16) {
        (self.count(), self.sta_id)
    }
}

/// Station graph over the sorted observed tuples
struct StationGraph {
    nodes: Vec<StationNode>,
    slots: HashMap<i16, usize>,
}

impl StationGraph {
    fn build(sorted_forms: &[Vec<i16>]) -> Self {
        let mut graph = Self {
            nodes: Vec::new(),
            slots: HashMap::new(),
        };
        for form in sorted_forms {
            for &sta_id in form {
                let slot = graph.slot(sta_id);
                graph.nodes[slot].relations.insert(form.clone());
            }
        }
        graph
    }

    fn slot(&mut self, sta_id: i16) -> usize {
        if let Some(&slot) = self.slots.get(&sta_id) {
            return slot;
        }
        self.nodes.push(StationNode {
            sta_id,
            relations: BTreeSet::new(),
            marked: false,
        });
        self.slots.insert(sta_id, self.nodes.len() - 1);
        self.nodes.len() - 1
    }

    /// Sorted station set made of a node and everything it relates to
    fn trial_configuration(&self, slot: usize) -> Vec<i16> {
        let node = &self.nodes[slot];
        let stations: BTreeSet<i16> = std::iter::once(node.sta_id)
            .chain(node.relations.iter().flatten().copied())
            .collect();
        stations.into_iter().collect()
    }

    /// Unmarked node with the highest `(count, id)`
    fn next_to_grow(&self) -> Option<usize> {
        (0..self.nodes.len())
            .filter(|&slot| !self.nodes[slot].marked)
            .max_by_key(|&slot| self.nodes[slot].rank())
    }

    /// Node with the lowest non-zero `(count, id)`
    fn next_to_cluster(&self) -> Option<usize> {
        (0..self.nodes.len())
            .filter(|&slot| self.nodes[slot].count() > 0)
            .min_by_key(|&slot| self.nodes[slot].rank())
    }
}

/// Every `arity`-subset of a sorted configuration, each one sorted
fn sub_tuples(configuration: &[i16], arity: usize, cache: &CombinationCache) -> Vec<Vec<i16>> {
    cache
        .get(configuration.len(), arity)
        .iter()
        .map(|combination| combination.iter().map(|&i| configuration[i]).collect())
        .collect()
}

/// Infer station configurations from distinct observed tuples of one arity
pub fn infer_configurations(
    distinct: &[StaIndex],
    arity: usize,
    cache: &CombinationCache,
) -> InferenceResult {
    let mut result = InferenceResult::default();
    if distinct.is_empty() || arity == 0 {
        return result;
    }

    // sorted form -> observed orderings, in first-seen order
    let mut sorted_forms: Vec<Vec<i16>> = Vec::new();
    let mut equivalents: HashMap<Vec<i16>, Vec<Vec<i16>>> = HashMap::new();
    for sta_index in distinct {
        let mut sorted = sta_index.to_vec();
        sorted.sort_unstable();
        let entry = equivalents.entry(sorted.clone()).or_default();
        if entry.is_empty() {
            sorted_forms.push(sorted);
        }
        entry.push(sta_index.to_vec());
    }

    if let [single] = sorted_forms.as_slice() {
        let configuration: StaIndex = Arc::from(single.as_slice());
        for sta_index in distinct {
            result
                .by_station_index
                .insert(sta_index.to_vec(), Arc::clone(&configuration));
        }
        result.configurations.push(configuration);
        return result;
    }

    let observed: HashSet<&Vec<i16>> = sorted_forms.iter().collect();
    let mut graph = StationGraph::build(&sorted_forms);
    trace!("station graph: {} nodes, {} sorted tuples", graph.nodes.len(), sorted_forms.len());

    grow(&mut graph, arity, &observed, cache, &mut result.missing);
    cluster(&mut graph, arity, &equivalents, cache, &mut result);

    debug!(
        "inferred {} configuration(s) from {} station indexes, {} missing",
        result.configurations.len(),
        distinct.len(),
        result.missing.len()
    );
    result
}

/// Growing pass: complete every node's clique with the unobserved tuples
fn grow(
    graph: &mut StationGraph,
    arity: usize,
    observed: &HashSet<&Vec<i16>>,
    cache: &CombinationCache,
    missing: &mut BTreeSet<Vec<i16>>,
) {
    let mut known: HashSet<Vec<i16>> = observed.iter().map(|t| (*t).clone()).collect();
    let mut produced: HashSet<Vec<i16>> = HashSet::new();

    while let Some(slot) = graph.next_to_grow() {
        let configuration = graph.trial_configuration(slot);
        let origin = graph.nodes[slot].sta_id;

        if produced.insert(configuration.clone()) {
            trace!("growing station {}: {:?}", origin, configuration);

            let candidates: Vec<Vec<i16>> = sub_tuples(&configuration, arity, cache)
                .into_iter()
                .filter(|tuple| known.insert(tuple.clone()))
                .collect();

            for tuple in &candidates {
                if !observed.contains(tuple) {
                    missing.insert(tuple.clone());
                }
                for &sta_id in tuple.iter().filter(|&&id| id != origin) {
                    if let Some(&other) = graph.slots.get(&sta_id) {
                        let node = &mut graph.nodes[other];
                        if node.relations.insert(tuple.clone()) {
                            node.marked = false;
                        }
                    }
                }
            }
        }

        graph.nodes[slot].marked = true;
    }
}

/// Clustering pass: carve configurations out of the completed graph
fn cluster(
    graph: &mut StationGraph,
    arity: usize,
    equivalents: &HashMap<Vec<i16>, Vec<Vec<i16>>>,
    cache: &CombinationCache,
    result: &mut InferenceResult,
) {
    let mut interned: HashMap<Vec<i16>, StaIndex> = HashMap::new();

    while let Some(slot) = graph.next_to_cluster() {
        let sorted_conf = graph.trial_configuration(slot);
        let origin = graph.nodes[slot].sta_id;
        trace!("clustering station {}: {:?}", origin, sorted_conf);

        let configuration = match interned.get(&sorted_conf) {
            Some(existing) => Arc::clone(existing),
            None => {
                let configuration: StaIndex = Arc::from(sorted_conf.as_slice());
                interned.insert(sorted_conf.clone(), Arc::clone(&configuration));
                result.configurations.push(Arc::clone(&configuration));
                configuration
            }
        };

        let tuples = sub_tuples(&sorted_conf, arity, cache);
        for tuple in &tuples {
            // later configurations override earlier assignments
            if let Some(orderings) = equivalents.get(tuple) {
                for ordering in orderings {
                    result
                        .by_station_index
                        .insert(ordering.clone(), Arc::clone(&configuration));
                }
            }
        }

        graph.nodes[slot].relations.clear();
        for tuple in &tuples {
            for &sta_id in tuple.iter().filter(|&&id| id != origin) {
                if let Some(&other) = graph.slots.get(&sta_id) {
                    graph.nodes[other].relations.remove(tuple);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tuples(items: &[&[i16]]) -> Vec<StaIndex> {
        items.iter().map(|t| Arc::from(*t)).collect()
    }

    fn infer(items: &[&[i16]], arity: usize) -> InferenceResult {
        infer_configurations(&tuples(items), arity, &CombinationCache::new())
    }

    fn configurations(result: &InferenceResult) -> Vec<Vec<i16>> {
        result.configurations.iter().map(|c| c.to_vec()).collect()
    }

    #[test]
    fn test_empty_input() {
        let result = infer(&[], 2);
        assert!(result.configurations.is_empty());
        assert!(result.missing.is_empty());
    }

    #[test]
    fn test_permutations_collapse_to_one_configuration() {
        let result = infer(&[&[1, 2], &[2, 1]], 2);

        assert_eq!(configurations(&result), vec![vec![1, 2]]);
        assert!(Arc::ptr_eq(
            result.configuration_of(&[1, 2]).unwrap(),
            result.configuration_of(&[2, 1]).unwrap()
        ));
        assert!(result.missing.is_empty());
    }

    #[test]
    fn test_missing_baseline_is_reported() {
        let result = infer(&[&[1, 2], &[1, 3], &[1, 4], &[2, 3], &[2, 4]], 2);

        assert_eq!(configurations(&result), vec![vec![1, 2, 3, 4]]);
        assert_eq!(result.missing, BTreeSet::from([vec![3, 4]]));
        for observed in [[1, 2], [1, 3], [1, 4], [2, 3], [2, 4]] {
            assert_eq!(result.configuration_of(&observed).unwrap().as_ref(), &[1, 2, 3, 4]);
        }
        assert!(result.configuration_of(&[3, 4]).is_none());
    }

    #[test]
    fn test_disjoint_baselines() {
        let result = infer(&[&[1, 2], &[5, 6]], 2);

        let mut found = configurations(&result);
        found.sort();
        assert_eq!(found, vec![vec![1, 2], vec![5, 6]]);
        assert!(result.missing.is_empty());
        assert_eq!(result.configuration_of(&[5, 6]).unwrap().as_ref(), &[5, 6]);
    }

    #[test]
    fn test_complete_triplets() {
        let result = infer(&[&[1, 2, 3], &[1, 2, 4], &[1, 3, 4], &[2, 3, 4]], 3);

        assert_eq!(configurations(&result), vec![vec![1, 2, 3, 4]]);
        assert!(result.missing.is_empty());
    }

    #[test]
    fn test_missing_triplet() {
        let result = infer(&[&[1, 2, 3], &[1, 2, 4], &[1, 3, 4]], 3);

        assert_eq!(configurations(&result), vec![vec![1, 2, 3, 4]]);
        assert_eq!(result.missing, BTreeSet::from([vec![2, 3, 4]]));
    }

    #[test]
    fn test_result_is_deterministic() {
        let items: &[&[i16]] = &[&[3, 1], &[4, 1], &[2, 3], &[7, 8], &[2, 1], &[8, 9]];
        let first = configurations(&infer(items, 2));
        for _ in 0..5 {
            assert_eq!(configurations(&infer(items, 2)), first);
        }
    }

    #[test]
    fn test_every_observed_tuple_is_in_its_configuration() {
        let items: &[&[i16]] = &[&[1, 2], &[2, 3], &[4, 5], &[5, 6], &[4, 6], &[3, 1]];
        let result = infer(items, 2);

        for item in items {
            let configuration = result.configuration_of(item).unwrap();
            assert!(item.iter().all(|id| configuration.contains(id)));
        }
    }
}
