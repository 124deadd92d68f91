//! Arena of live clusters owned by the agglomeration engine.

use std::{collections::BTreeSet, mem};

use crate::{
    ClusterId,
    graph::{EdgeKey, Graph, NodeSet},
};

/// One slot of the arena.
///
/// `edges` starts as the edges induced inside the original base and is only
/// ever unioned on merge; it is never recomputed from the merged node-set.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct ClusterRecord {
    pub(crate) nodes: NodeSet,
    pub(crate) edges: BTreeSet<EdgeKey>,
    pub(crate) id: ClusterId,
    alive: bool,
}

#[derive(Clone, Debug)]
pub(crate) struct ClusterArena {
    records: Vec<ClusterRecord>,
}

impl ClusterArena {
    pub(crate) fn from_bases(graph: &Graph, bases: &[NodeSet]) -> Self {
        let records = bases
            .iter()
            .enumerate()
            .map(|(index, base)| ClusterRecord {
                nodes: base.clone(),
                edges: graph.induced_edges(base),
                id: ClusterId::new(index as u64),
                alive: true,
            })
            .collect();
        Self { records }
    }

    #[rustfmt::skip]
    pub(crate) fn len(&self) -> usize { self.records.len() }

    #[rustfmt::skip]
    pub(crate) fn get(&self, slot: usize) -> &ClusterRecord { &self.records[slot] }

    pub(crate) fn alive_slots(&self) -> impl Iterator<Item = usize> + '_ {
        self.records
            .iter()
            .enumerate()
            .filter_map(|(slot, record)| record.alive.then_some(slot))
    }

    /// Folds `absorbed` into `survivor`, relabels the survivor and tombstones
    /// the absorbed slot. Returns the merged node count.
    pub(crate) fn merge(&mut self, survivor: usize, absorbed: usize, id: ClusterId) -> usize {
        debug_assert_ne!(survivor, absorbed, "a cluster cannot merge with itself");
        let taken_nodes = mem::take(&mut self.records[absorbed].nodes);
        let taken_edges = mem::take(&mut self.records[absorbed].edges);
        self.records[absorbed].alive = false;

        let record = &mut self.records[survivor];
        record.nodes.extend(taken_nodes);
        record.edges.extend(taken_edges);
        record.id = id;
        record.nodes.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(nodes: &[usize]) -> NodeSet {
        nodes.iter().copied().collect()
    }

    #[test]
    fn bases_carry_their_induced_edges() {
        let graph = Graph::try_new(4, [(0, 1), (1, 2), (2, 3)]).expect("graph must build");
        let arena = ClusterArena::from_bases(&graph, &[set(&[0, 1, 2]), set(&[2, 3])]);
        assert_eq!(arena.len(), 2);
        assert_eq!(
            arena.get(0).edges.iter().copied().collect::<Vec<_>>(),
            vec![(0, 1), (1, 2)]
        );
        assert_eq!(arena.get(1).id, ClusterId::new(1));
    }

    #[test]
    fn merge_unions_sets_and_tombstones_absorbed_slot() {
        let graph = Graph::try_new(4, [(0, 1), (2, 3), (1, 2)]).expect("graph must build");
        let mut arena = ClusterArena::from_bases(&graph, &[set(&[0, 1]), set(&[2, 3])]);
        let size = arena.merge(0, 1, ClusterId::new(2));
        assert_eq!(size, 4);
        assert_eq!(arena.get(0).id, ClusterId::new(2));
        // (1, 2) was never inside a base, so the union does not gain it.
        assert_eq!(
            arena.get(0).edges.iter().copied().collect::<Vec<_>>(),
            vec![(0, 1), (2, 3)]
        );
        assert_eq!(arena.alive_slots().collect::<Vec<_>>(), vec![0]);
        assert!(arena.get(1).nodes.is_empty());
    }
}
