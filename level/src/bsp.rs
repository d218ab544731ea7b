//! The BSP tree: point location, leaf enumeration and an ordered walk.
//!
//! Each node splits space with a line. `direction` is the unit normal of that
//! line and `dir_deg` the signed distance of the line from the origin along
//! it, so a point is on the left of the split when `point · direction` is
//! greater than `dir_deg`.

use glam::Vec2;
use log::warn;
use wad::lumps::{NodeChild, WadNode};

use crate::error::{BspError, LevelError};
use crate::map_defs::BBox;
use crate::segments::{Segment, SubSector};

/// Which of a level's two trees to query
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BspKind {
    /// NODES, SSECTORS and SEGS
    Base,
    /// GL_NODES, GL_SSECT and GL_SEGS
    Extended,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    /// Where the line used for splitting the level starts
    pub xy: Vec2,
    /// Where the line used for splitting the level ends, relative to `xy`
    pub delta: Vec2,
    /// Unit normal of the split, pointing to the left side
    pub direction: Vec2,
    pub dir_deg: f32,
    /// `[right, left]`
    pub bboxes: [BBox; 2],
    /// `[right, left]`
    pub children: [NodeChild; 2],
}

impl From<&WadNode> for Node {
    fn from(n: &WadNode) -> Self {
        let xy = Vec2::new(n.x as f32, n.y as f32);
        let delta = Vec2::new(n.dx as f32, n.dy as f32);
        let direction = delta.perp().normalize_or_zero();
        Self {
            xy,
            delta,
            direction,
            dir_deg: xy.dot(direction),
            bboxes: [
                BBox::from_wad(n.bounding_boxes[0]),
                BBox::from_wad(n.bounding_boxes[1]),
            ],
            children: n.children,
        }
    }
}

impl Node {
    /// 0 for the right child, 1 for the left
    #[inline]
    pub fn point_on_side(&self, point: Vec2) -> usize {
        if point.dot(self.direction) > self.dir_deg {
            1
        } else {
            0
        }
    }
}

/// A leaf as seen from the node holding it
#[derive(Debug, Clone, Copy)]
pub struct Leaf<'a> {
    pub subsector: usize,
    /// Index of the node holding this leaf, `None` only for a tree without nodes
    pub node: Option<usize>,
    /// The box the node keeps for this child
    pub bbox: Option<&'a BBox>,
}

#[derive(Debug, Clone)]
pub struct BspTree {
    nodes: Vec<Node>,
    subsectors: Vec<SubSector>,
    segments: Vec<Segment>,
}

impl BspTree {
    /// Every child index must be in range. A node array that is not a proper
    /// tree is only logged; `locate` bounds its own descent.
    pub fn new(
        level: &str,
        nodes: Vec<Node>,
        subsectors: Vec<SubSector>,
        segments: Vec<Segment>,
    ) -> Result<Self, LevelError> {
        for (i, node) in nodes.iter().enumerate() {
            for child in node.children {
                let len = match child {
                    NodeChild::Leaf(_) => subsectors.len(),
                    NodeChild::Node(_) => nodes.len(),
                };
                let index = match child {
                    NodeChild::Leaf(n) | NodeChild::Node(n) => n as usize,
                };
                if index >= len {
                    return Err(LevelError::NodeChildOutOfRange {
                        node: i,
                        child,
                        len,
                    });
                }
            }
        }

        let tree = Self {
            nodes,
            subsectors,
            segments,
        };
        tree.check_shape(level);
        Ok(tree)
    }

    /// Warn if any subsector or node is not the child of exactly one node
    fn check_shape(&self, level: &str) {
        if self.nodes.is_empty() {
            if self.subsectors.len() > 1 {
                warn!(
                    "{}: no nodes for {} subsectors",
                    level,
                    self.subsectors.len()
                );
            }
            return;
        }
        let mut leaf_refs = vec![0u32; self.subsectors.len()];
        let mut node_refs = vec![0u32; self.nodes.len()];
        for node in &self.nodes {
            for child in node.children {
                match child {
                    NodeChild::Leaf(n) => leaf_refs[n as usize] += 1,
                    NodeChild::Node(n) => node_refs[n as usize] += 1,
                }
            }
        }
        let root = self.nodes.len() - 1;
        let bad_leaves = leaf_refs.iter().filter(|c| **c != 1).count();
        let bad_nodes = node_refs
            .iter()
            .enumerate()
            .filter(|(i, c)| **c != if *i == root { 0 } else { 1 })
            .count();
        if bad_leaves > 0 || bad_nodes > 0 {
            warn!(
                "{}: BSP is not a tree, {} subsectors and {} nodes are not referenced exactly once",
                level, bad_leaves, bad_nodes
            );
        }
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn subsectors(&self) -> &[SubSector] {
        &self.subsectors
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn subsector_segments(&self, subsector: usize) -> Result<&[Segment], BspError> {
        self.subsectors
            .get(subsector)
            .map(|ss| ss.segments(&self.segments))
            .ok_or(BspError::SubSectorOutOfRange {
                subsector,
                len: self.subsectors.len(),
            })
    }

    /// The last node is the root
    pub fn root(&self) -> Option<usize> {
        self.nodes.len().checked_sub(1)
    }

    /// Find the subsector containing `point` by descending from the root
    pub fn locate(&self, point: Vec2) -> Result<usize, BspError> {
        let Some(mut node_id) = self.root() else {
            return if self.subsectors.len() == 1 {
                Ok(0)
            } else {
                Err(BspError::EmptyTree)
            };
        };

        let depth = self.nodes.len();
        for _ in 0..depth {
            let node = self
                .nodes
                .get(node_id)
                .ok_or(BspError::Malformed { depth })?;
            match node.children[node.point_on_side(point)] {
                NodeChild::Leaf(n) => return Ok(n as usize),
                NodeChild::Node(n) => node_id = n as usize,
            }
        }
        Err(BspError::Malformed { depth })
    }

    /// Every leaf child of every node, in no particular order
    pub fn leaves(&self) -> impl Iterator<Item = Leaf<'_>> {
        let lone = (self.nodes.is_empty() && self.subsectors.len() == 1).then_some(Leaf {
            subsector: 0,
            node: None,
            bbox: None,
        });
        self.nodes
            .iter()
            .enumerate()
            .rev()
            .flat_map(|(i, node)| {
                node.children
                    .iter()
                    .zip(node.bboxes.iter())
                    .filter_map(move |(child, bbox)| match child {
                        NodeChild::Leaf(n) => Some(Leaf {
                            subsector: *n as usize,
                            node: Some(i),
                            bbox: Some(bbox),
                        }),
                        NodeChild::Node(_) => None,
                    })
            })
            .chain(lone)
    }

    /// Call `visit` once for each leaf. On a proper tree this is each
    /// subsector exactly once. Not ordered relative to any viewpoint, see
    /// `walk_front_to_back` for that.
    pub fn for_each_leaf(&self, mut visit: impl FnMut(Leaf<'_>)) {
        for leaf in self.leaves() {
            visit(leaf);
        }
    }

    /// Visit every leaf, the subsectors on the same side of each split as
    /// `point` before those on the far side
    pub fn walk_front_to_back(
        &self,
        point: Vec2,
        mut visit: impl FnMut(usize),
    ) -> Result<(), BspError> {
        let Some(root) = self.root() else {
            return if self.subsectors.len() == 1 {
                visit(0);
                Ok(())
            } else {
                Err(BspError::EmptyTree)
            };
        };

        // Each node is expanded at most once on a proper tree
        let limit = self.nodes.len();
        let mut expanded = 0;
        let mut stack = vec![NodeChild::Node(root as u32)];
        while let Some(child) = stack.pop() {
            match child {
                NodeChild::Leaf(n) => visit(n as usize),
                NodeChild::Node(n) => {
                    expanded += 1;
                    if expanded > limit {
                        return Err(BspError::Malformed { depth: limit });
                    }
                    let node = self
                        .nodes
                        .get(n as usize)
                        .ok_or(BspError::Malformed { depth: limit })?;
                    let side = node.point_on_side(point);
                    stack.push(node.children[side ^ 1]);
                    stack.push(node.children[side]);
                }
            }
        }
        Ok(())
    }
}
