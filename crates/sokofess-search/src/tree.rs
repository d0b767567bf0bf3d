//! Arena of search nodes.
//!
//! Nodes are addressed by [`NodeId`]; parents are stored as ids, children as
//! id lists. Nodes are never removed. When a state is reached again with a
//! strictly lower accumulated weight it is moved under the new parent and the
//! weights and depths of its whole subtree are recomputed, so every node's
//! weight stays equal to its parent's weight plus the weight of the move that
//! produced it.

use std::collections::HashMap;

use sokofess_engine::{MacroMove, State, StateKey};
use sokofess_evaluator::FeatureVector;

use crate::weight::WeightedMove;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
#[display("#{_0}")]
pub struct NodeId(pub usize);

#[derive(Debug, Clone)]
pub struct SearchNode {
    state: State,
    features: FeatureVector,
    parent: Option<NodeId>,
    via: Option<MacroMove>,
    weight: u32,
    depth: usize,
    children: Vec<NodeId>,
    unexpanded: Vec<WeightedMove>,
}

impl SearchNode {
    #[must_use]
    pub fn state(&self) -> &State {
        &self.state
    }

    #[must_use]
    pub fn features(&self) -> FeatureVector {
        self.features
    }

    #[must_use]
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Move leading here from the parent.
    #[must_use]
    pub fn via(&self) -> Option<&MacroMove> {
        self.via.as_ref()
    }

    /// Sum of move weights on the path from the root.
    #[must_use]
    pub fn weight(&self) -> u32 {
        self.weight
    }

    #[must_use]
    pub fn depth(&self) -> usize {
        self.depth
    }

    #[must_use]
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    #[must_use]
    pub fn unexpanded(&self) -> &[WeightedMove] {
        &self.unexpanded
    }
}

#[derive(Debug, Default)]
pub struct SearchTree {
    nodes: Vec<SearchNode>,
    index: HashMap<StateKey, NodeId>,
}

impl SearchTree {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    #[must_use]
    pub fn node(&self, id: NodeId) -> &SearchNode {
        &self.nodes[id.0]
    }

    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &SearchNode)> + '_ {
        self.nodes.iter().enumerate().map(|(i, node)| (NodeId(i), node))
    }

    #[must_use]
    pub fn find(&self, key: &StateKey) -> Option<NodeId> {
        self.index.get(key).copied()
    }

    pub fn insert_root(
        &mut self,
        key: StateKey,
        state: State,
        features: FeatureVector,
        unexpanded: Vec<WeightedMove>,
    ) -> NodeId {
        self.push(key, SearchNode {
            state,
            features,
            parent: None,
            via: None,
            weight: 0,
            depth: 0,
            children: vec![],
            unexpanded,
        })
    }

    pub fn insert_child(
        &mut self,
        parent: NodeId,
        via: MacroMove,
        key: StateKey,
        state: State,
        features: FeatureVector,
        unexpanded: Vec<WeightedMove>,
    ) -> NodeId {
        let (weight, depth) = self.child_weight_and_depth(parent, &via);
        let id = self.push(key, SearchNode {
            state,
            features,
            parent: Some(parent),
            via: Some(via),
            weight,
            depth,
            children: vec![],
            unexpanded,
        });
        self.nodes[parent.0].children.push(id);
        id
    }

    fn push(&mut self, key: StateKey, node: SearchNode) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(node);
        self.index.insert(key, id);
        id
    }

    fn child_weight_and_depth(&self, parent: NodeId, via: &MacroMove) -> (u32, usize) {
        let parent = &self.nodes[parent.0];
        (parent.weight + via.weight().value(), parent.depth + 1)
    }

    /// Removes and returns the `index`-th unexpanded move of `node`.
    pub fn take_move(&mut self, node: NodeId, index: usize) -> WeightedMove {
        self.nodes[node.0].unexpanded.remove(index)
    }

    /// Moves `node` under `new_parent` when that lowers its accumulated
    /// weight. Returns whether the tree changed.
    pub fn reparent(&mut self, node: NodeId, new_parent: NodeId, via: MacroMove) -> bool {
        let (weight, depth) = self.child_weight_and_depth(new_parent, &via);
        if weight >= self.nodes[node.0].weight {
            // also rules out cycles: descendants never weigh less than `node`
            return false;
        }
        if let Some(old) = self.nodes[node.0].parent {
            self.nodes[old.0].children.retain(|c| *c != node);
        }
        let target = &mut self.nodes[node.0];
        target.parent = Some(new_parent);
        target.via = Some(via);
        target.weight = weight;
        target.depth = depth;
        self.nodes[new_parent.0].children.push(node);

        let mut stack = self.nodes[node.0].children.clone();
        while let Some(child) = stack.pop() {
            let Some(parent) = self.nodes[child.0].parent else {
                continue;
            };
            let Some(via) = self.nodes[child.0].via.as_ref() else {
                continue;
            };
            let (weight, depth) = self.child_weight_and_depth(parent, via);
            let child = &mut self.nodes[child.0];
            child.weight = weight;
            child.depth = depth;
            stack.extend_from_slice(&child.children);
        }
        true
    }

    /// Moves from the root to `node`.
    #[must_use]
    pub fn path_to(&self, node: NodeId) -> Vec<MacroMove> {
        let mut moves = vec![];
        let mut current = node;
        while let Some(parent) = self.nodes[current.0].parent {
            if let Some(via) = &self.nodes[current.0].via {
                moves.push(via.clone());
            }
            current = parent;
        }
        moves.reverse();
        moves
    }
}
