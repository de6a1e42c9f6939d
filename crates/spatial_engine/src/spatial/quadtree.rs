//! Loose quadtree over the XY plane
//!
//! Nodes and elements live in slotmap arenas so that an element's key stays
//! valid while it moves between nodes. Each node's loose bounds are twice
//! the size of its tight cell, which lets an element settle at the level
//! matching its own footprint instead of straddling a split line.
//!
//! Elements whose footprint does not fit the root's loose bounds are kept in
//! an overflow bucket that every query scans, so insertion never fails.

use std::cell::Cell;

use crate::foundation::collections::{new_key_type, PooledVec, ScratchPool, SlotMap};
use crate::foundation::math::{utils, Vec2};
use crate::physics::{Aabb, Aabb2, Containment};
use crate::spatial::spatial_query::QueryVolume;

/// Loose bounds are this many times the size of a node's tight cell
pub const LOOSENESS: f32 = 2.0;

/// Unsettled elements a node holds before it pushes some into a child
pub const PUSH_DOWN_THRESHOLD: usize = 6;

/// Smallest loose radius as a fraction of the root radius (f32 mantissa)
const MIN_LOOSE_FRACTION: f32 = 1.0 / 16_777_216.0;

new_key_type! {
    /// Handle to a quadtree node
    pub struct NodeKey;

    /// Stable handle to an element stored in a quadtree
    pub struct ElementKey;
}

/// Where an element is currently stored
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slot {
    Unlinked,
    Node(NodeKey),
    Overflow,
}

#[derive(Debug)]
struct ElementRecord<E> {
    element: E,
    bounds: Aabb,
    slot: Slot,
    /// Stored at its target level, so push-downs leave it alone
    settled: bool,
}

/// Single node in the quadtree hierarchy
#[derive(Debug)]
struct QuadtreeNode {
    parent: Option<NodeKey>,
    children: [Option<NodeKey>; 4],
    loose_bounds: Aabb2,
    radius: f32,
    elements: Vec<ElementKey>,
    settled_count: usize,
}

impl QuadtreeNode {
    fn new(parent: Option<NodeKey>, loose_bounds: Aabb2) -> Self {
        Self {
            parent,
            children: [None; 4],
            radius: loose_bounds.width() / (2.0 * LOOSENESS),
            loose_bounds,
            elements: Vec::new(),
            settled_count: 0,
        }
    }

    fn is_empty(&self) -> bool {
        self.elements.is_empty() && self.children.iter().all(Option::is_none)
    }
}

#[derive(Debug, Clone, Copy)]
struct Candidate {
    node: NodeKey,
    /// The query volume covers the whole node, so descendants need no test
    contains: bool,
}

/// Loose quadtree indexing copyable elements by their AABB
#[derive(Debug)]
pub struct Quadtree<E: Copy> {
    bounds: Aabb,
    min_loose: f32,
    root: Option<NodeKey>,
    nodes: SlotMap<NodeKey, QuadtreeNode>,
    elements: SlotMap<ElementKey, ElementRecord<E>>,
    overflow: Vec<ElementKey>,
    iterator_count: Cell<usize>,
    candidate_pool: ScratchPool<Candidate>,
}

impl<E: Copy> Quadtree<E> {
    /// Create an empty tree covering `bounds`.
    ///
    /// `min_radius` is the smallest node radius subdivision will produce.
    pub fn new(bounds: Aabb, min_radius: f32) -> Self {
        let radius_2d = bounds.radius_2d();
        Self {
            bounds,
            min_loose: (min_radius * LOOSENESS).max(radius_2d * LOOSENESS * MIN_LOOSE_FRACTION),
            root: None,
            nodes: SlotMap::with_key(),
            elements: SlotMap::with_key(),
            overflow: Vec::new(),
            iterator_count: Cell::new(0),
            candidate_pool: ScratchPool::new(),
        }
    }

    /// Region the tree was created for
    pub fn bounds(&self) -> &Aabb {
        &self.bounds
    }

    /// Number of stored elements, overflow included
    pub fn element_count(&self) -> usize {
        self.elements.len()
    }

    /// Number of allocated nodes
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of elements stored outside the root
    pub fn overflow_count(&self) -> usize {
        self.overflow.len()
    }

    /// True if the tree stores nothing
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Number of element iterators currently alive
    pub fn iterators_in_flight(&self) -> usize {
        self.iterator_count.get()
    }

    /// Element stored under `key`
    pub fn get(&self, key: ElementKey) -> Option<&E> {
        self.elements.get(key).map(|record| &record.element)
    }

    /// Bounds last recorded for `key`
    pub fn element_bounds(&self, key: ElementKey) -> Option<&Aabb> {
        self.elements.get(key).map(|record| &record.bounds)
    }

    /// Add an element and return its stable key
    pub fn insert(&mut self, element: E, bounds: Aabb) -> ElementKey {
        self.warn_if_iterating("insert");
        let key = self.elements.insert(ElementRecord {
            element,
            bounds,
            slot: Slot::Unlinked,
            settled: false,
        });
        self.link(key);
        key
    }

    /// Remove an element, returning it if the key was live
    pub fn remove(&mut self, key: ElementKey) -> Option<E> {
        self.warn_if_iterating("remove");
        let node = self.unlink(key);
        let record = self.elements.remove(key)?;
        if let Some(node) = node {
            self.rewind(node, None);
        }
        Some(record.element)
    }

    /// Record new bounds for an element and move it if it left its node.
    ///
    /// Returns false if the key is not live.
    pub fn update(&mut self, key: ElementKey, bounds: Aabb) -> bool {
        self.warn_if_iterating("update");
        let Some(record) = self.elements.get_mut(key) else {
            return false;
        };
        record.bounds = bounds;
        let slot = record.slot;
        let footprint = bounds.to_2d();

        match slot {
            Slot::Node(node) => {
                if self.nodes[node].loose_bounds.contains(&footprint) {
                    return true;
                }
                self.unlink(key);

                let mut ancestor = self.nodes[node].parent;
                while let Some(candidate) = ancestor {
                    if self.nodes[candidate].loose_bounds.contains(&footprint) {
                        break;
                    }
                    ancestor = self.nodes[candidate].parent;
                }
                self.rewind(node, ancestor);

                match ancestor {
                    Some(start) => self.link_from(start, key),
                    None => self.link(key),
                }
            }
            Slot::Overflow | Slot::Unlinked => {
                self.unlink(key);
                self.link(key);
            }
        }
        true
    }

    /// Iterate elements whose AABB touches `volume`.
    ///
    /// Node elements come first, depth first from the root, then the
    /// overflow bucket.
    pub fn iterate_elements_in_volume<V: QueryVolume>(&self, volume: V) -> ElementIter<'_, E, V> {
        ElementIter::new(self, volume)
    }

    /// Iterate every stored element with its key
    pub fn iter(&self) -> impl Iterator<Item = (ElementKey, &E)> {
        self.elements.iter().map(|(key, record)| (key, &record.element))
    }

    fn warn_if_iterating(&self, operation: &str) {
        let count = self.iterator_count.get();
        if count != 0 {
            log::warn!("Quadtree {operation} while {count} iterator(s) are in flight");
        }
    }

    fn root_or_allocate(&mut self) -> NodeKey {
        if let Some(root) = self.root {
            return root;
        }
        let center = utils::to_2d(&self.bounds.center());
        let half = self.bounds.radius_2d() * LOOSENESS * 0.5;
        let root = self.nodes.insert(QuadtreeNode::new(None, Aabb2::from_center_half(center, half)));
        self.root = Some(root);
        root
    }

    fn at_target_level(&self, node: NodeKey, element_radius: f32) -> bool {
        let radius = self.nodes[node].radius;
        radius <= self.min_loose || element_radius >= radius * 0.5
    }

    fn link(&mut self, key: ElementKey) {
        let root = self.root_or_allocate();
        let footprint = self.elements[key].bounds.to_2d();
        if self.nodes[root].loose_bounds.contains(&footprint) {
            self.link_from(root, key);
        } else {
            log::warn!(
                "Element bounds {:?}..{:?} lie outside the quadtree root, storing in overflow",
                footprint.min,
                footprint.max
            );
            self.overflow.push(key);
            if let Some(record) = self.elements.get_mut(key) {
                record.slot = Slot::Overflow;
                record.settled = false;
            }
        }
    }

    /// Descend from `start`, whose loose bounds must contain the element
    fn link_from(&mut self, start: NodeKey, key: ElementKey) {
        let bounds = self.elements[key].bounds;
        let footprint = bounds.to_2d();
        let element_center = footprint.center();
        let element_radius = bounds.radius_2d();

        let mut node = start;
        loop {
            if self.at_target_level(node, element_radius) {
                self.attach(node, key, true);
                return;
            }

            let center = self.nodes[node].loose_bounds.center();
            let quadrant = quadrant_index(&element_center, &center);
            let existing = self.nodes[node].children[quadrant];
            match existing {
                Some(child) if self.nodes[child].loose_bounds.contains(&footprint) => node = child,
                // Too wide for the existing child and too small to sink
                // further, so this node is as deep as it will ever go
                Some(_) => {
                    self.attach(node, key, true);
                    return;
                }
                None => {
                    match self.push_down(node, quadrant) {
                        Some(child) if self.nodes[child].loose_bounds.contains(&footprint) => {
                            let settled = self.at_target_level(child, element_radius);
                            self.attach(child, key, settled);
                        }
                        Some(child) => {
                            self.attach(node, key, false);
                            self.rewind(child, Some(node));
                        }
                        None => self.attach(node, key, false),
                    }
                    return;
                }
            }
        }
    }

    /// Allocate the child at `quadrant` once enough unsettled elements pile
    /// up, and move the ones that fit into it
    fn push_down(&mut self, node: NodeKey, quadrant: usize) -> Option<NodeKey> {
        let parent = &self.nodes[node];
        if parent.elements.len() - parent.settled_count < PUSH_DOWN_THRESHOLD {
            return None;
        }

        let child_bounds = child_loose_bounds(&parent.loose_bounds, quadrant);
        let child = self.nodes.insert(QuadtreeNode::new(Some(node), child_bounds));
        self.nodes[node].children[quadrant] = Some(child);

        let movable: Vec<ElementKey> = self.nodes[node]
            .elements
            .iter()
            .copied()
            .filter(|key| {
                let record = &self.elements[*key];
                !record.settled && child_bounds.contains(&record.bounds.to_2d())
            })
            .collect();
        for key in movable {
            self.unlink(key);
            let settled = self.at_target_level(child, self.elements[key].bounds.radius_2d());
            self.attach(child, key, settled);
        }
        Some(child)
    }

    fn attach(&mut self, node: NodeKey, key: ElementKey, settled: bool) {
        let target = &mut self.nodes[node];
        target.elements.push(key);
        if settled {
            target.settled_count += 1;
        }
        if let Some(record) = self.elements.get_mut(key) {
            record.slot = Slot::Node(node);
            record.settled = settled;
        }
    }

    /// Detach an element from wherever it is stored, returning its old node
    fn unlink(&mut self, key: ElementKey) -> Option<NodeKey> {
        let record = self.elements.get_mut(key)?;
        let slot = std::mem::replace(&mut record.slot, Slot::Unlinked);
        let settled = std::mem::take(&mut record.settled);
        match slot {
            Slot::Node(node) => {
                let owner = self.nodes.get_mut(node)?;
                if let Some(index) = owner.elements.iter().position(|k| *k == key) {
                    owner.elements.swap_remove(index);
                    if settled {
                        owner.settled_count -= 1;
                    }
                }
                Some(node)
            }
            Slot::Overflow => {
                if let Some(index) = self.overflow.iter().position(|k| *k == key) {
                    self.overflow.swap_remove(index);
                }
                None
            }
            Slot::Unlinked => None,
        }
    }

    /// Free empty nodes walking up from `node`, stopping at `stop`
    fn rewind(&mut self, mut node: NodeKey, stop: Option<NodeKey>) {
        loop {
            if Some(node) == stop {
                return;
            }
            let Some(current) = self.nodes.get(node) else {
                return;
            };
            if !current.is_empty() {
                return;
            }
            let parent = current.parent;
            self.nodes.remove(node);
            match parent {
                Some(parent) => {
                    if let Some(slot) = self.nodes[parent].children.iter_mut().find(|c| **c == Some(node)) {
                        *slot = None;
                    }
                    node = parent;
                }
                None => {
                    self.root = None;
                    return;
                }
            }
        }
    }
}

/// Child quadrant of `point` relative to `center`: bit 1 is +X, bit 0 is +Y
fn quadrant_index(point: &Vec2, center: &Vec2) -> usize {
    (usize::from(point.x > center.x) << 1) | usize::from(point.y > center.y)
}

fn child_loose_bounds(parent: &Aabb2, quadrant: usize) -> Aabb2 {
    let side = parent.width() * 0.5;
    let offset = side / (LOOSENESS * 2.0);
    let sign = |bit: usize| if quadrant & bit != 0 { offset } else { -offset };
    let center = parent.center() + Vec2::new(sign(2), sign(1));
    Aabb2::from_center_half(center, side * 0.5)
}

/// Lazy iterator over elements touching a query volume.
///
/// Borrows its traversal stack from the tree's pool; the stack goes back on
/// drop whether or not the iteration finished.
pub struct ElementIter<'a, E: Copy, V: QueryVolume> {
    tree: &'a Quadtree<E>,
    volume: V,
    stack: PooledVec<'a, Candidate>,
    current: Option<Candidate>,
    index: usize,
    overflow_index: usize,
}

impl<'a, E: Copy, V: QueryVolume> ElementIter<'a, E, V> {
    fn new(tree: &'a Quadtree<E>, volume: V) -> Self {
        tree.iterator_count.set(tree.iterator_count.get() + 1);
        let mut iter = Self {
            tree,
            volume,
            stack: tree.candidate_pool.acquire(),
            current: None,
            index: 0,
            overflow_index: 0,
        };
        if let Some(root) = tree.root {
            iter.push(root, false);
        }
        iter
    }

    fn push(&mut self, node: NodeKey, parent_contains: bool) {
        if parent_contains {
            self.stack.push(Candidate { node, contains: true });
            return;
        }
        let Some(target) = self.tree.nodes.get(node) else {
            return;
        };
        match self.volume.contains_xy(&target.loose_bounds) {
            Containment::Disjoint => {}
            Containment::Contains => self.stack.push(Candidate { node, contains: true }),
            Containment::Intersects => self.stack.push(Candidate { node, contains: false }),
        }
    }

    fn accept(&self, key: ElementKey) -> Option<E> {
        let record = self.tree.elements.get(key)?;
        self.volume.intersects_aabb(&record.bounds).then_some(record.element)
    }
}

impl<E: Copy, V: QueryVolume> Iterator for ElementIter<'_, E, V> {
    type Item = E;

    fn next(&mut self) -> Option<E> {
        let tree = self.tree;
        loop {
            if let Some(candidate) = self.current {
                if let Some(node) = tree.nodes.get(candidate.node) {
                    while let Some(key) = node.elements.get(self.index).copied() {
                        self.index += 1;
                        if let Some(element) = self.accept(key) {
                            return Some(element);
                        }
                    }
                    for child in node.children.iter().flatten() {
                        self.push(*child, candidate.contains);
                    }
                }
                self.current = None;
            }

            if let Some(candidate) = self.stack.pop() {
                self.current = Some(candidate);
                self.index = 0;
                continue;
            }

            while let Some(key) = tree.overflow.get(self.overflow_index).copied() {
                self.overflow_index += 1;
                if let Some(element) = self.accept(key) {
                    return Some(element);
                }
            }
            return None;
        }
    }
}

impl<E: Copy, V: QueryVolume> Drop for ElementIter<'_, E, V> {
    fn drop(&mut self) {
        let count = self.tree.iterator_count.get();
        self.tree.iterator_count.set(count.saturating_sub(1));
    }
}
