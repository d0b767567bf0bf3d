//! Cells of the feature space and the cyclic cell picker.
//!
//! Every node is projected onto the cell of its feature vector. Cells are
//! created on first projection and kept in creation order; the picker walks
//! that order round-robin so that every cell keeps receiving expansions.

use std::collections::HashMap;

use sokofess_evaluator::FeatureVector;

use crate::tree::NodeId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
#[display("cell{_0}")]
pub struct CellId(pub usize);

#[derive(Debug, Clone)]
pub struct FeatureSpaceCell {
    features: FeatureVector,
    nodes: Vec<NodeId>,
}

impl FeatureSpaceCell {
    #[must_use]
    pub fn features(&self) -> FeatureVector {
        self.features
    }

    #[must_use]
    pub fn nodes(&self) -> &[NodeId] {
        &self.nodes
    }
}

#[derive(Debug, Default)]
pub struct FeatureSpace {
    cells: Vec<FeatureSpaceCell>,
    index: HashMap<FeatureVector, CellId>,
    cursor: usize,
}

impl FeatureSpace {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    #[must_use]
    pub fn cell(&self, id: CellId) -> &FeatureSpaceCell {
        &self.cells[id.0]
    }

    #[must_use]
    pub fn find(&self, features: &FeatureVector) -> Option<CellId> {
        self.index.get(features).copied()
    }

    /// Adds `node` to the cell of `features`, creating the cell at the end of
    /// the cycle if needed. Returns the cell and whether it is new.
    pub fn project(&mut self, features: FeatureVector, node: NodeId) -> (CellId, bool) {
        if let Some(&id) = self.index.get(&features) {
            self.cells[id.0].nodes.push(node);
            return (id, false);
        }
        let id = CellId(self.cells.len());
        self.cells.push(FeatureSpaceCell {
            features,
            nodes: vec![node],
        });
        self.index.insert(features, id);
        (id, true)
    }

    /// Next cell in creation order, wrapping around.
    pub fn next_cell(&mut self) -> Option<CellId> {
        if self.cells.is_empty() {
            return None;
        }
        let id = CellId(self.cursor % self.cells.len());
        self.cursor = id.0 + 1;
        Some(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vector(packing: u32) -> FeatureVector {
        FeatureVector {
            packing,
            ..FeatureVector::default()
        }
    }

    #[test]
    fn test_projection_reuses_cells() {
        let mut space = FeatureSpace::new();
        assert_eq!(space.project(vector(0), NodeId(0)), (CellId(0), true));
        assert_eq!(space.project(vector(1), NodeId(1)), (CellId(1), true));
        assert_eq!(space.project(vector(0), NodeId(2)), (CellId(0), false));
        assert_eq!(space.cell(CellId(0)).nodes(), &[NodeId(0), NodeId(2)]);
        assert_eq!(space.find(&vector(1)), Some(CellId(1)));
    }

    #[test]
    fn test_picker_visits_every_cell_before_repeating() {
        let mut space = FeatureSpace::new();
        assert_eq!(space.next_cell(), None);
        let n = 5;
        for i in 0..n {
            space.project(vector(u32::try_from(i).unwrap()), NodeId(i));
        }
        let picks: Vec<CellId> = (0..=n).filter_map(|_| space.next_cell()).collect();
        let mut first_round = picks[..n].to_vec();
        first_round.sort();
        first_round.dedup();
        assert_eq!(first_round.len(), n);
        assert_eq!(picks[n], picks[0]);
    }

    #[test]
    fn test_new_cells_join_the_cycle() {
        let mut space = FeatureSpace::new();
        space.project(vector(0), NodeId(0));
        assert_eq!(space.next_cell(), Some(CellId(0)));
        space.project(vector(1), NodeId(1));
        assert_eq!(space.next_cell(), Some(CellId(1)));
        assert_eq!(space.next_cell(), Some(CellId(0)));
    }
}
