//! Adaptive quadtree over a rectangular region of the plane.
//!
//! Every node carries an `accumulator` that collects splatted mass during a
//! training pass and a `density` learned from the previous pass. Densities
//! are normalized so that they integrate to one over the tree bounds, with
//! the bounds taken as the unit square.
//!
//! Nodes live in a slotmap arena and refer to their four children by key.
//! Child `i` covers quadrant `i` of its parent as addressed by
//! [`Bounds2::child`].

use focal_math::{Bounds2, DVec2};
use serde::{Deserialize, Serialize};
use slotmap::SlotMap;

slotmap::new_key_type! {
    /// Handle to a node of a [`QuadTree`].
    pub struct NodeKey;
}

/// Refinement parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuadTreeConfig {
    /// Nodes shallower than this are always split
    pub min_depth: u32,
    /// Nodes at this depth are never split
    pub max_depth: u32,
    /// Fraction of the total mass above which a node is split
    pub split_threshold: f64,
}

impl Default for QuadTreeConfig {
    fn default() -> Self {
        Self {
            min_depth: 4,
            max_depth: 16,
            split_threshold: 0.02,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct QuadTreeNode {
    /// Unique within the tree, never reused
    pub id: u64,
    pub accumulator: f64,
    pub density: f64,
    pub children: Option<[NodeKey; 4]>,
}

impl QuadTreeNode {
    fn new(id: u64, accumulator: f64, density: f64) -> Self {
        Self {
            id,
            accumulator,
            density,
            children: None,
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_none()
    }
}

/// A leaf together with the region it covers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct QuadTreePatch {
    #[serde(skip)]
    pub node: NodeKey,
    pub id: u64,
    pub density: f64,
    pub bounds: Bounds2,
}

#[derive(Default)]
struct RefineStats {
    split: usize,
    merged: usize,
}

#[derive(Debug, Clone)]
pub struct QuadTree {
    bounds: Bounds2,
    /// Parameters used by the next [`QuadTree::refine`]
    pub config: QuadTreeConfig,
    pub(crate) nodes: SlotMap<NodeKey, QuadTreeNode>,
    root: NodeKey,
    last_id: u64,
}

impl QuadTree {
    /// Create a tree over `bounds`, refined once to `config.min_depth`.
    pub fn new(bounds: Bounds2, config: QuadTreeConfig) -> Self {
        let mut nodes = SlotMap::with_key();
        let root = nodes.insert(QuadTreeNode::new(0, 0.0, 0.0));
        let mut tree = Self {
            bounds,
            config,
            nodes,
            root,
            last_id: 0,
        };
        tree.refine_with(0.0);
        tree
    }

    pub fn bounds(&self) -> Bounds2 {
        self.bounds
    }

    pub fn root(&self) -> NodeKey {
        self.root
    }

    /// Look up a node. Keys of merged nodes return `None`.
    pub fn node(&self, key: NodeKey) -> Option<&QuadTreeNode> {
        self.nodes.get(key)
    }

    /// Add mass to a node's accumulator.
    ///
    /// Stale keys are ignored.
    pub fn accumulate(&mut self, key: NodeKey, weight: f64) {
        if let Some(node) = self.nodes.get_mut(key) {
            node.accumulator += weight;
        }
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn leaf_count(&self) -> usize {
        self.nodes.values().filter(|n| n.is_leaf()).count()
    }

    /// Depth of the deepest leaf; a lone root has depth zero.
    pub fn depth(&self) -> u32 {
        self.node_depth(self.root)
    }

    fn node_depth(&self, key: NodeKey) -> u32 {
        match self.nodes[key].children {
            Some(children) => 1 + children.iter().map(|&c| self.node_depth(c)).max().unwrap_or(0),
            None => 0,
        }
    }

    fn next_id(&mut self) -> u64 {
        self.last_id += 1;
        self.last_id
    }

    /// Sum leaf accumulators into every inner node, returning the root total.
    fn propagate(&mut self, key: NodeKey) -> f64 {
        if let Some(children) = self.nodes[key].children {
            let sum: f64 = children.iter().map(|&c| self.propagate(c)).sum();
            self.nodes[key].accumulator = sum;
        }
        self.nodes[key].accumulator
    }

    /// Turn the accumulated mass into densities without touching topology,
    /// then clear the accumulators.
    pub fn rebuild(&mut self) {
        let root_weight = self.propagate(self.root);
        if root_weight <= 0.0 {
            log::warn!("Rebuilding quadtree without any accumulated mass");
        }
        self.rebuild_node(self.root, root_weight, 1.0);
    }

    fn rebuild_node(&mut self, key: NodeKey, root_weight: f64, inv_area: f64) {
        let node = &mut self.nodes[key];
        node.density = density(node.accumulator, root_weight, inv_area);
        node.accumulator = 0.0;

        if let Some(children) = node.children {
            for child in children {
                self.rebuild_node(child, root_weight, 4.0 * inv_area);
            }
        }
    }

    /// Adapt the topology to the accumulated mass, update densities and
    /// clear the accumulators.
    ///
    /// A node is split while it is shallower than `min_depth` or holds more
    /// than `split_threshold` of the total mass, and never at `max_depth`.
    /// Split nodes that no longer qualify are merged back into leaves. New
    /// children inherit a quarter of the parent's mass and its previous
    /// density.
    pub fn refine(&mut self) {
        let root_weight = self.propagate(self.root);
        if root_weight <= 0.0 {
            log::warn!("Refining quadtree without any accumulated mass");
        }
        self.refine_with(root_weight);
    }

    fn refine_with(&mut self, root_weight: f64) {
        let mut stats = RefineStats::default();
        self.refine_node(self.root, 0, root_weight, 1.0, &mut stats);

        log::debug!(
            "Refined quadtree: {} splits, {} merges, {} leaves, depth {}",
            stats.split,
            stats.merged,
            self.leaf_count(),
            self.depth()
        );
    }

    fn refine_node(
        &mut self,
        key: NodeKey,
        depth: u32,
        root_weight: f64,
        inv_area: f64,
        stats: &mut RefineStats,
    ) {
        let (accumulator, previous_density, children) = {
            let node = &self.nodes[key];
            (node.accumulator, node.density, node.children)
        };

        let can_split = depth < self.config.max_depth;
        let wants_split = depth < self.config.min_depth
            || accumulator > self.config.split_threshold * root_weight;
        let will_split = can_split && wants_split;

        let children = match (children, will_split) {
            (Some(children), false) => {
                for child in children {
                    self.remove_subtree(child);
                }
                stats.merged += 1;
                None
            }
            (None, true) => {
                let children = [(); 4].map(|_| {
                    let id = self.next_id();
                    self.nodes
                        .insert(QuadTreeNode::new(id, accumulator / 4.0, previous_density))
                });
                stats.split += 1;
                Some(children)
            }
            (children, _) => children,
        };

        let node = &mut self.nodes[key];
        node.children = children;
        node.density = density(accumulator, root_weight, inv_area);
        node.accumulator = 0.0;

        if let Some(children) = children {
            for child in children {
                self.refine_node(child, depth + 1, root_weight, 4.0 * inv_area, stats);
            }
        }
    }

    fn remove_subtree(&mut self, key: NodeKey) {
        if let Some(node) = self.nodes.remove(key) {
            for child in node.children.into_iter().flatten() {
                self.remove_subtree(child);
            }
        }
    }

    /// All leaves with their bounds, in depth-first child order.
    pub fn visualize(&self) -> Vec<QuadTreePatch> {
        let mut patches = Vec::with_capacity(self.leaf_count());
        self.collect_leaves(self.root, self.bounds, &mut patches);
        patches
    }

    fn collect_leaves(&self, key: NodeKey, bounds: Bounds2, patches: &mut Vec<QuadTreePatch>) {
        match self.nodes[key].children {
            Some(children) => {
                for (i, child) in children.into_iter().enumerate() {
                    self.collect_leaves(child, bounds.child(i), patches);
                }
            }
            None => patches.push(self.patch(key, bounds)),
        }
    }

    /// The leaf containing `point`.
    ///
    /// Points on a split line belong to the lower quadrant. Points outside
    /// the bounds still end at the leaf their coordinates select.
    pub fn lookup(&self, point: DVec2) -> QuadTreePatch {
        let mut key = self.root;
        let mut bounds = self.bounds;
        while let Some(children) = self.nodes[key].children {
            let i = bounds.child_index(point);
            bounds = bounds.child(i);
            key = children[i];
        }
        self.patch(key, bounds)
    }

    pub(crate) fn patch(&self, key: NodeKey, bounds: Bounds2) -> QuadTreePatch {
        let node = &self.nodes[key];
        QuadTreePatch {
            node: key,
            id: node.id,
            density: node.density,
            bounds,
        }
    }
}

fn density(accumulator: f64, root_weight: f64, inv_area: f64) -> f64 {
    if accumulator > 0.0 {
        inv_area * accumulator / root_weight
    } else {
        0.0
    }
}
