//! A red-black tree of registration [`Record`]s keyed by (student ID, subject).
//!
//! Records live in an arena owned by the [`Tree`] and are addressed by [`NodeId`]. The `left` and
//! `right` links form the tree; `parent` links are only followed upwards (for depths, siblings
//! and rotations) and never decide what is kept alive. Records are never removed, so a `NodeId`
//! handed out by [`Tree::insert`] stays valid for as long as the tree does.
//!
//! # Examples
//!
//! ```
//! use course_index::record::{Color, Key, Registration};
//! use course_index::tree::Tree;
//!
//! fn registration(student_id: i64, timestamp: i64) -> Registration {
//!     Registration {
//!         key: Key::new(student_id, "Algo"),
//!         student_name: "Kim".into(),
//!         semester: 3,
//!         phone: "010".into(),
//!         timestamp,
//!     }
//! }
//!
//! let mut tree = Tree::new();
//! for student_id in 1..=3 {
//!     tree.insert(registration(student_id, 100)).unwrap();
//! }
//!
//! // Three ascending inserts rotate the middle key up to the root.
//! let root = tree.root().unwrap();
//! assert_eq!(root.student_id(), 2);
//! assert_eq!(root.color(), Color::Black);
//!
//! // Inserting an existing key only refreshes its timestamp.
//! let insertion = tree.insert(registration(1, 200)).unwrap();
//! assert!(insertion.is_duplicate());
//! assert_eq!(tree.len(), 3);
//! assert_eq!(tree.get(&Key::new(1, "Algo")).unwrap().timestamp(), 200);
//! ```

use std::cmp::Ordering;
use std::fmt;

use log::trace;

use crate::error::{Error, Result};
use crate::record::{Color, Key, Record, Registration};

/// Handle to a [`Record`] inside a [`Tree`]. Only meaningful for the tree that produced it.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(usize);

/// Which child slot of a parent a node hangs from.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Side {
    /// The smaller-keyed child.
    Left,
    /// The larger-keyed child.
    Right,
}

/// Where a key lives, or would live, in the tree.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Search {
    /// The tree has no records; a new one becomes the root.
    Empty,
    /// A record with this key already exists.
    Found(NodeId),
    /// No record has this key. A new one would be attached as the `side` child of `parent`.
    Vacant {
        /// The node the new record hangs from.
        parent: NodeId,
        /// Which of `parent`'s empty slots it takes.
        side: Side,
    },
}

/// Outcome of [`Tree::insert`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Insertion {
    /// A record was created for a key the tree hadn't seen.
    New(NodeId),
    /// The key already existed; only that record's timestamp was updated.
    Existing(NodeId),
}

impl Insertion {
    /// The record that was created or updated.
    pub fn id(self) -> NodeId {
        match self {
            Self::New(id) | Self::Existing(id) => id,
        }
    }

    /// Whether the key was already present.
    pub fn is_duplicate(self) -> bool {
        matches!(self, Self::Existing(_))
    }
}

/// A red-black tree owning every [`Record`] of a session.
#[derive(Clone, Default)]
pub struct Tree {
    nodes: Vec<Record>,
    root: Option<NodeId>,
}

impl fmt::Debug for Tree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let root = self.root.map(|id| DebugNode { tree: self, id });
        f.debug_struct("Tree")
            .field("len", &self.len())
            .field("root", &root)
            .finish()
    }
}

struct DebugNode<'a> {
    tree: &'a Tree,
    id: NodeId,
}

impl fmt::Debug for DebugNode<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let node = self.tree.node(self.id);
        let child = |link: Option<NodeId>| {
            link.map(|id| DebugNode {
                tree: self.tree,
                id,
            })
        };
        f.debug_struct("Node")
            .field("key", node.key())
            .field("color", &node.color)
            .field("left", &child(node.left))
            .field("right", &child(node.right))
            .finish()
    }
}

impl Tree {
    /// Generate a new, empty `Tree`.
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            root: None,
        }
    }

    /// Number of records in the tree.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the tree has no records.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// The root record, if any.
    pub fn root(&self) -> Option<&Record> {
        self.root.map(|id| self.node(id))
    }

    /// Handle of the root record, if any.
    pub fn root_id(&self) -> Option<NodeId> {
        self.root
    }

    /// The record behind a handle.
    ///
    /// ## Panics
    ///
    /// When `id` came from a different tree with more records than this one.
    pub fn record(&self, id: NodeId) -> &Record {
        self.node(id)
    }

    /// The record with the given key, if present.
    pub fn get(&self, key: &Key) -> Option<&Record> {
        match self.search(key) {
            Search::Found(id) => Some(self.node(id)),
            Search::Empty | Search::Vacant { .. } => None,
        }
    }

    /// Walks down from the root comparing `key` against each node. Stops at the node holding
    /// `key` or at the node whose empty child slot `key` belongs in.
    pub fn search(&self, key: &Key) -> Search {
        let Some(mut current) = self.root else {
            return Search::Empty;
        };

        loop {
            let node = self.node(current);
            match key.cmp(node.key()) {
                Ordering::Less => match node.left {
                    Some(left) => current = left,
                    None => {
                        return Search::Vacant {
                            parent: current,
                            side: Side::Left,
                        }
                    }
                },
                Ordering::Equal => return Search::Found(current),
                Ordering::Greater => match node.right {
                    Some(right) => current = right,
                    None => {
                        return Search::Vacant {
                            parent: current,
                            side: Side::Right,
                        }
                    }
                },
            }
        }
    }

    /// Inserts a registration. A new key gets a new red record, attached where [`Tree::search`]
    /// says, and the tree is rebalanced. An existing key only has its timestamp overwritten; the
    /// rest of the stored record is left as it was.
    ///
    /// Fails with [`Error::InvariantViolated`] if the tree's structure turns out to be broken
    /// along the way, which can't happen through this API.
    pub fn insert(&mut self, registration: Registration) -> Result<Insertion> {
        self.insert_with(registration, |_, _| {})
    }

    /// Like [`Tree::insert`], but calls `on_attach` with a new record right after it is linked
    /// in and before any rebalancing. Not called for an existing key.
    ///
    /// A record handed to `on_attach` stays in the tree even if rebalancing then fails.
    pub fn insert_with<F>(&mut self, registration: Registration, on_attach: F) -> Result<Insertion>
    where
        F: FnOnce(&Tree, NodeId),
    {
        if self.is_empty() {
            let id = self.push(registration);
            self.node_mut(id).color = Color::Black;
            self.root = Some(id);
            on_attach(self, id);
            return Ok(Insertion::New(id));
        }

        match self.search(&registration.key) {
            Search::Empty => Err(Error::invariant(format!(
                "tree holds {} records but has no root",
                self.len()
            ))),
            Search::Found(id) => {
                self.node_mut(id).set_timestamp(registration.timestamp);
                Ok(Insertion::Existing(id))
            }
            Search::Vacant { parent, side } => {
                let id = self.push(registration);
                self.attach(parent, side, id);
                on_attach(self, id);
                self.rebalance(id)?;
                Ok(Insertion::New(id))
            }
        }
    }

    /// Number of edges between the record and the root. Walks parent links, so `O(height)`.
    pub fn depth(&self, id: NodeId) -> usize {
        let mut depth = 0;
        let mut current = id;
        while let Some(parent) = self.node(current).parent {
            current = parent;
            depth += 1;
        }
        depth
    }

    /// Number of levels in the tree. An empty tree has height 0 and a lone root has height 1.
    pub fn height(&self) -> usize {
        fn subtree_height(tree: &Tree, link: Option<NodeId>) -> usize {
            link.map_or(0, |id| {
                let node = tree.node(id);
                subtree_height(tree, node.left).max(subtree_height(tree, node.right)) + 1
            })
        }
        subtree_height(self, self.root)
    }

    /// Iterates over the records in ascending key order.
    pub fn iter(&self) -> Iter<'_> {
        let mut iter = Iter {
            tree: self,
            stack: Vec::new(),
        };
        iter.push_left_spine(self.root);
        iter
    }

    /// Checks every structural and red-black invariant of the tree:
    ///
    /// 1. Keys are in binary-search-tree order.
    /// 2. Every child's parent link points back at its parent, and the root has none.
    /// 3. The root is black.
    /// 4. No red node has a red child.
    /// 5. Every path from a node down to a missing child passes the same number of black nodes.
    /// 6. Every record is reachable from the root.
    ///
    /// Returns the black height of the root (0 for an empty tree).
    pub fn validate(&self) -> Result<usize> {
        let Some(root) = self.root else {
            return if self.is_empty() {
                Ok(0)
            } else {
                Err(Error::invariant(format!(
                    "tree holds {} records but has no root",
                    self.len()
                )))
            };
        };

        let root_node = self.node(root);
        if let Some(parent) = root_node.parent {
            return Err(Error::invariant(format!(
                "root {} has parent {}",
                root_node.key(),
                self.node(parent).key()
            )));
        }
        if root_node.color != Color::Black {
            return Err(Error::invariant(format!("root {} is red", root_node.key())));
        }

        let mut reachable = 0;
        let black_height = self.validate_subtree(root, None, None, &mut reachable)?;
        if reachable != self.len() {
            return Err(Error::invariant(format!(
                "{} of {} records are reachable from the root",
                reachable,
                self.len()
            )));
        }
        Ok(black_height)
    }

    /// Recursive helper for [`Tree::validate`]. `lower` and `upper` are the exclusive key bounds
    /// imposed by the ancestors. Returns the subtree's black height.
    fn validate_subtree(
        &self,
        id: NodeId,
        lower: Option<&Key>,
        upper: Option<&Key>,
        reachable: &mut usize,
    ) -> Result<usize> {
        *reachable += 1;
        let node = self.node(id);
        let key = node.key();

        if lower.map_or(false, |lower| key <= lower) || upper.map_or(false, |upper| key >= upper) {
            return Err(Error::invariant(format!("{} is out of order", key)));
        }

        let mut black_heights = [0; 2];
        let children = [(node.left, lower, Some(key)), (node.right, Some(key), upper)];
        for (slot, (child, lower, upper)) in children.into_iter().enumerate() {
            let Some(child) = child else {
                continue;
            };
            let child_node = self.node(child);
            if child_node.parent != Some(id) {
                return Err(Error::invariant(format!(
                    "{} does not point back at its parent {}",
                    child_node.key(),
                    key
                )));
            }
            if node.color == Color::Red && child_node.color == Color::Red {
                return Err(Error::invariant(format!(
                    "red {} has red child {}",
                    key,
                    child_node.key()
                )));
            }
            black_heights[slot] = self.validate_subtree(child, lower, upper, reachable)?;
        }

        if black_heights[0] != black_heights[1] {
            return Err(Error::invariant(format!(
                "black heights under {} differ: {} on the left, {} on the right",
                key, black_heights[0], black_heights[1]
            )));
        }
        Ok(black_heights[0] + usize::from(node.color == Color::Black))
    }

    fn node(&self, id: NodeId) -> &Record {
        &self.nodes[id.0]
    }

    fn node_mut(&mut self, id: NodeId) -> &mut Record {
        &mut self.nodes[id.0]
    }

    fn push(&mut self, registration: Registration) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Record::new(registration));
        id
    }

    /// Hangs the unlinked `child` in the `side` slot of `parent`.
    fn attach(&mut self, parent: NodeId, side: Side, child: NodeId) {
        self.node_mut(child).parent = Some(parent);
        let parent = self.node_mut(parent);
        match side {
            Side::Left => parent.left = Some(child),
            Side::Right => parent.right = Some(child),
        }
    }

    fn parent_of(&self, id: NodeId) -> Result<NodeId> {
        self.node(id)
            .parent
            .ok_or_else(|| Error::invariant(format!("{} has no parent", self.node(id).key())))
    }

    /// The other child of `id`'s parent. `None` for the root or when that slot is empty.
    fn sibling(&self, id: NodeId) -> Option<NodeId> {
        let parent = self.node(self.node(id).parent?);
        if parent.left == Some(id) {
            parent.right
        } else {
            parent.left
        }
    }

    fn side_of(&self, parent: NodeId, child: NodeId) -> Side {
        if self.node(parent).right == Some(child) {
            Side::Right
        } else {
            Side::Left
        }
    }

    /// Missing children count as black.
    fn is_black(&self, link: Option<NodeId>) -> bool {
        link.map_or(true, |id| self.node(id).color == Color::Black)
    }

    fn is_double_red(&self, id: NodeId) -> bool {
        let node = self.node(id);
        node.color == Color::Red
            && node
                .parent
                .map_or(false, |parent| self.node(parent).color == Color::Red)
    }

    fn paint(&mut self, id: NodeId, color: Color) {
        self.node_mut(id).color = color;
    }

    /// Resolves red-red violations starting at the freshly attached `inserted` node.
    ///
    /// While the current node and its parent are both red: if the parent's sibling is black (or
    /// missing) one restructuring fixes everything; otherwise recoloring pushes the problem up
    /// to the grandparent and we go again from there.
    fn rebalance(&mut self, inserted: NodeId) -> Result<()> {
        let mut current = inserted;
        while self.is_double_red(current) {
            let parent = self.parent_of(current)?;
            if self.is_black(self.sibling(parent)) {
                self.restructure(current)?;
                break;
            }
            current = self.recolor(current)?;
        }

        if cfg!(debug_assertions) {
            if let Some(root) = self.root() {
                assert_eq!(root.color, Color::Black);
                assert!(root.parent.is_none());
            }
        }
        Ok(())
    }

    /// Fixes a red-red violation between `current` and its parent when the parent's sibling is
    /// black. The shape of grandparent -> parent -> current picks the rotations, and the node
    /// that ends up on top of the three is painted black with the other two red.
    fn restructure(&mut self, current: NodeId) -> Result<()> {
        let parent = self.parent_of(current)?;
        let grandparent = self.parent_of(parent)?;
        let shape = (
            self.side_of(grandparent, parent),
            self.side_of(parent, current),
        );
        trace!(
            "restructuring {:?} at {}",
            shape,
            self.node(grandparent).key()
        );

        match shape {
            (Side::Right, Side::Right) => {
                self.paint(parent, Color::Black);
                self.paint(current, Color::Red);
                self.paint(grandparent, Color::Red);
                self.rotate_left(grandparent)?;
            }
            (Side::Right, Side::Left) => {
                self.paint(current, Color::Black);
                self.paint(parent, Color::Red);
                self.paint(grandparent, Color::Red);
                self.rotate_right(parent)?;
                self.rotate_left(grandparent)?;
            }
            (Side::Left, Side::Left) => {
                self.paint(parent, Color::Black);
                self.paint(current, Color::Red);
                self.paint(grandparent, Color::Red);
                self.rotate_right(grandparent)?;
            }
            (Side::Left, Side::Right) => {
                self.paint(current, Color::Black);
                self.paint(parent, Color::Red);
                self.paint(grandparent, Color::Red);
                self.rotate_left(parent)?;
                self.rotate_right(grandparent)?;
            }
        }
        Ok(())
    }

    /// Fixes a red-red violation between `current` and its parent when the parent's sibling is
    /// red, by flipping the colors of the grandparent, the parent and the parent's sibling. The
    /// root is kept black. Returns the grandparent, which may now be in a violation of its own.
    fn recolor(&mut self, current: NodeId) -> Result<NodeId> {
        let parent = self.parent_of(current)?;
        let grandparent = self.parent_of(parent)?;
        let uncle = self.sibling(parent).ok_or_else(|| {
            Error::invariant(format!(
                "recoloring under {} without a sibling for {}",
                self.node(grandparent).key(),
                self.node(parent).key()
            ))
        })?;
        trace!("recoloring at {}", self.node(grandparent).key());

        for id in [grandparent, parent, uncle] {
            let flipped = self.node(id).color.flip();
            self.paint(id, flipped);
        }
        if self.root == Some(grandparent) {
            self.paint(grandparent, Color::Black);
        }
        Ok(grandparent)
    }

    /// Rotate `old_root` to the right. This moves its left child up vertically and `old_root`
    /// down vertically. It must only be called when there _is_ a left child.
    ///
    /// # Diagram
    ///
    /// ```text
    ///    Option<parent>            Option<parent>
    ///      /                         /
    ///   old_root                  new_root
    ///    /     \                  /     \
    /// new_root  z     rotate ->  x    old_root
    ///  / \                               /  \
    /// x   y                             y    z
    /// ```
    fn rotate_right(&mut self, old_root: NodeId) -> Result<()> {
        let new_root = self.node(old_root).left.ok_or_else(|| {
            Error::invariant(format!(
                "rotating {} right requires a left child",
                self.node(old_root).key()
            ))
        })?;
        let middle = self.node(new_root).right;

        self.node_mut(new_root).right = Some(old_root);
        self.node_mut(old_root).left = middle;
        if let Some(middle) = middle {
            self.node_mut(middle).parent = Some(old_root);
        }

        let old_parent = self.node(old_root).parent;
        self.node_mut(new_root).parent = old_parent;
        self.node_mut(old_root).parent = Some(new_root);
        self.replace_in_parent(old_parent, new_root)
    }

    /// Mirror image of [`Tree::rotate_right`]: the right child of `old_root` moves up.
    fn rotate_left(&mut self, old_root: NodeId) -> Result<()> {
        let new_root = self.node(old_root).right.ok_or_else(|| {
            Error::invariant(format!(
                "rotating {} left requires a right child",
                self.node(old_root).key()
            ))
        })?;
        let middle = self.node(new_root).left;

        self.node_mut(new_root).left = Some(old_root);
        self.node_mut(old_root).right = middle;
        if let Some(middle) = middle {
            self.node_mut(middle).parent = Some(old_root);
        }

        let old_parent = self.node(old_root).parent;
        self.node_mut(new_root).parent = old_parent;
        self.node_mut(old_root).parent = Some(new_root);
        self.replace_in_parent(old_parent, new_root)
    }

    /// Points `parent` at a freshly rotated-up `child`, or makes `child` the root when there is
    /// no parent. The slot is chosen by comparing keys: after a double rotation the direction of
    /// the last rotation says nothing about which side of `parent` the subtree hangs from.
    fn replace_in_parent(&mut self, parent: Option<NodeId>, child: NodeId) -> Result<()> {
        let Some(parent) = parent else {
            self.root = Some(child);
            return Ok(());
        };

        match self.node(child).key().cmp(self.node(parent).key()) {
            Ordering::Less => self.node_mut(parent).left = Some(child),
            Ordering::Greater => self.node_mut(parent).right = Some(child),
            Ordering::Equal => {
                return Err(Error::invariant(format!(
                    "{} appears twice in the tree",
                    self.node(child).key()
                )))
            }
        }
        Ok(())
    }
}

/// In-order iterator over a [`Tree`]'s records. See [`Tree::iter`].
pub struct Iter<'a> {
    tree: &'a Tree,
    stack: Vec<NodeId>,
}

impl Iter<'_> {
    fn push_left_spine(&mut self, mut link: Option<NodeId>) {
        while let Some(id) = link {
            self.stack.push(id);
            link = self.tree.node(id).left;
        }
    }
}

impl<'a> Iterator for Iter<'a> {
    type Item = &'a Record;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.stack.pop()?;
        let tree = self.tree;
        let node = tree.node(id);
        self.push_left_spine(node.right);
        Some(node)
    }
}
