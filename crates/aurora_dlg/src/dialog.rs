//! The in-memory conversation graph.

use std::collections::HashSet;

use aurora_gff::{ResRef, Struct};

use crate::error::{Error, Result};
use crate::node::{Node, NodeId, NodeKind, Pointer};

/// Where a pointer lives
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum PointerSource {
    Start,
    Node(NodeId),
}

impl PointerSource {
    fn describe(self) -> String {
        match self {
            PointerSource::Start => "start list".to_owned(),
            PointerSource::Node(id) => id.to_string(),
        }
    }

    /// Kind of node this source's pointers target
    pub fn target_kind(self) -> NodeKind {
        match self {
            PointerSource::Start => NodeKind::Entry,
            PointerSource::Node(id) => id.kind.opposite(),
        }
    }
}

/// A branching conversation
///
/// Entries and replies live in two arenas addressed by [`NodeId`]. Any number of pointers may
/// target the same node; when the dialog is written, the node is stored once, at the position
/// assigned by the first pointer to reach it, and every other pointer becomes a link to it.
#[derive(Debug, Clone, PartialEq)]
pub struct Dialog {
    pub delay_entry: u32,
    pub delay_reply: u32,
    /// Script run when the conversation ends normally
    pub end_conversation: ResRef,
    /// Script run when the conversation is aborted
    pub end_conver_abort: ResRef,
    pub prevent_zoom_in: bool,
    pub(crate) entries: Vec<Node>,
    pub(crate) replies: Vec<Node>,
    pub(crate) starts: Vec<Pointer>,
    pub(crate) raw: Struct,
}

impl Default for Dialog {
    fn default() -> Self {
        Self {
            delay_entry: 0,
            delay_reply: 0,
            end_conversation: ResRef::default(),
            end_conver_abort: ResRef::default(),
            prevent_zoom_in: false,
            entries: Vec::new(),
            replies: Vec::new(),
            starts: Vec::new(),
            raw: Struct::root(),
        }
    }
}

impl Dialog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[Node] {
        &self.entries
    }

    pub fn replies(&self) -> &[Node] {
        &self.replies
    }

    pub fn starts(&self) -> &[Pointer] {
        &self.starts
    }

    pub fn starts_mut(&mut self) -> &mut [Pointer] {
        &mut self.starts
    }

    /// Total number of entries and replies
    pub fn len(&self) -> usize {
        self.entries.len() + self.replies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn add_entry(&mut self, node: Node) -> NodeId {
        self.entries.push(node);
        NodeId::entry(self.entries.len() - 1)
    }

    pub fn add_reply(&mut self, node: Node) -> NodeId {
        self.replies.push(node);
        NodeId::reply(self.replies.len() - 1)
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        match id.kind {
            NodeKind::Entry => self.entries.get(id.index),
            NodeKind::Reply => self.replies.get(id.index),
        }
    }

    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        match id.kind {
            NodeKind::Entry => self.entries.get_mut(id.index),
            NodeKind::Reply => self.replies.get_mut(id.index),
        }
    }

    fn require(&self, id: NodeId) -> Result<&Node> {
        self.node(id).ok_or(Error::UnknownNode(id))
    }

    /// Add `entry` to the start list, returning the new pointer.
    pub fn add_start(&mut self, entry: NodeId) -> Result<&mut Pointer> {
        if entry.kind != NodeKind::Entry {
            return Err(Error::InvalidStart(entry));
        }
        self.require(entry)?;
        self.starts.push(Pointer::new(entry.index));
        Ok(self.starts.last_mut().ok_or(Error::UnknownNode(entry))?)
    }

    /// Add a pointer from `from` to `to`, returning it.
    ///
    /// The pointer is a link when `to` is already reachable before it; see [`Dialog::refresh_links`].
    pub fn connect(&mut self, from: NodeId, to: NodeId) -> Result<&mut Pointer> {
        if from.kind == to.kind {
            return Err(Error::SameKindPointer { from, to });
        }
        self.require(to)?;
        let node = self.node_mut(from).ok_or(Error::UnknownNode(from))?;
        node.pointers.push(Pointer::new(to.index));
        Ok(node.pointers.last_mut().ok_or(Error::UnknownNode(from))?)
    }

    /// The node a pointer found at `source` targets.
    pub fn target_of(source: PointerSource, pointer: &Pointer) -> NodeId {
        NodeId {
            kind: source.target_kind(),
            index: pointer.target,
        }
    }

    /// Every pointer of the dialog with where it lives and what it targets, start list first.
    pub fn iter_pointers(&self) -> impl Iterator<Item = (PointerSource, NodeId, &Pointer)> {
        let starts = self
            .starts
            .iter()
            .map(|p| (PointerSource::Start, NodeId::entry(p.target), p));
        let entries = self.entries.iter().enumerate().flat_map(|(index, node)| {
            node.pointers
                .iter()
                .map(move |p| (PointerSource::Node(NodeId::entry(index)), NodeId::reply(p.target), p))
        });
        let replies = self.replies.iter().enumerate().flat_map(|(index, node)| {
            node.pointers
                .iter()
                .map(move |p| (PointerSource::Node(NodeId::reply(index)), NodeId::entry(p.target), p))
        });
        starts.chain(entries).chain(replies)
    }

    /// Check that every pointer targets an existing node.
    pub fn validate(&self) -> Result<()> {
        for (source, target, _) in self.iter_pointers() {
            if self.node(target).is_none() {
                return Err(Error::DanglingPointer {
                    source_desc: source.describe(),
                    target,
                });
            }
        }
        Ok(())
    }

    /// Recompute every pointer's `is_link` flag from traversal order.
    pub fn refresh_links(&mut self) -> Result<()> {
        self.validate()?;
        let traversal = Traversal::run(self);

        for (position, pointer) in self.starts.iter_mut().enumerate() {
            pointer.is_link = !traversal.owns(PointerSource::Start, position);
        }
        for (kind, arena) in [
            (NodeKind::Entry, &mut self.entries),
            (NodeKind::Reply, &mut self.replies),
        ] {
            for (index, node) in arena.iter_mut().enumerate() {
                let source = PointerSource::Node(NodeId { kind, index });
                for (position, pointer) in node.pointers.iter_mut().enumerate() {
                    pointer.is_link = !traversal.owns(source, position);
                }
            }
        }
        Ok(())
    }

    /// Total words over every node's text.
    pub fn word_count(&self) -> usize {
        self.entries
            .iter()
            .chain(&self.replies)
            .map(Node::word_count)
            .sum()
    }
}

/// Node ordering produced by the index-assignment walk
///
/// Every node starts unassigned. Walking depth-first from the start list in order, and then from
/// every still unassigned node in arena order, the first pointer to reach a node assigns it the
/// next file index of its kind and becomes its owner. Every other pointer to the node is a link.
#[derive(Debug)]
pub(crate) struct Traversal {
    /// File index of each entry, by arena index
    pub entry_index: Vec<u32>,
    /// File index of each reply, by arena index
    pub reply_index: Vec<u32>,
    /// Arena indices of entries in file order
    pub entry_order: Vec<usize>,
    /// Arena indices of replies in file order
    pub reply_order: Vec<usize>,
    owners: HashSet<(PointerSource, usize)>,
}

const UNASSIGNED: u32 = u32::MAX;

impl Traversal {
    /// Run the walk. Pointer targets must have been validated.
    pub fn run(dialog: &Dialog) -> Self {
        let mut traversal = Traversal {
            entry_index: vec![UNASSIGNED; dialog.entries.len()],
            reply_index: vec![UNASSIGNED; dialog.replies.len()],
            entry_order: Vec::with_capacity(dialog.entries.len()),
            reply_order: Vec::with_capacity(dialog.replies.len()),
            owners: HashSet::new(),
        };

        for (position, start) in dialog.starts.iter().enumerate() {
            let target = NodeId::entry(start.target);
            if traversal.assign(target) {
                traversal.owners.insert((PointerSource::Start, position));
                traversal.walk(dialog, target);
            }
        }

        for index in 0..dialog.entries.len() {
            if traversal.assign(NodeId::entry(index)) {
                traversal.walk(dialog, NodeId::entry(index));
            }
        }
        for index in 0..dialog.replies.len() {
            if traversal.assign(NodeId::reply(index)) {
                traversal.walk(dialog, NodeId::reply(index));
            }
        }

        traversal
    }

    /// Assign the next file index to `id`, returning false if it already had one.
    fn assign(&mut self, id: NodeId) -> bool {
        let (indices, order) = match id.kind {
            NodeKind::Entry => (&mut self.entry_index, &mut self.entry_order),
            NodeKind::Reply => (&mut self.reply_index, &mut self.reply_order),
        };
        if indices[id.index] != UNASSIGNED {
            return false;
        }
        indices[id.index] = order.len() as u32;
        order.push(id.index);
        true
    }

    /// Depth-first walk below an already assigned node, with an explicit stack so long chains
    /// cannot exhaust the call stack.
    fn walk(&mut self, dialog: &Dialog, root: NodeId) {
        let mut stack = vec![(root, 0usize)];
        while let Some((id, position)) = stack.pop() {
            let Some(pointer) = dialog.node(id).and_then(|node| node.pointers.get(position)) else {
                continue;
            };
            stack.push((id, position + 1));

            let target = NodeId {
                kind: id.kind.opposite(),
                index: pointer.target,
            };
            if self.assign(target) {
                self.owners.insert((PointerSource::Node(id), position));
                stack.push((target, 0));
            }
        }
    }

    /// Whether the pointer at `position` in `source` is the one that assigned its target.
    pub fn owns(&self, source: PointerSource, position: usize) -> bool {
        self.owners.contains(&(source, position))
    }

    /// File index of `id`.
    pub fn file_index(&self, id: NodeId) -> u32 {
        match id.kind {
            NodeKind::Entry => self.entry_index[id.index],
            NodeKind::Reply => self.reply_index[id.index],
        }
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use crate::dialog::{Dialog, PointerSource, Traversal};
    use crate::error::{Error, Result};
    use crate::node::{Node, NodeId};

    #[test]
    fn connect_rejects_same_kind() {
        let mut dialog = Dialog::new();
        let a = dialog.add_entry(Node::new("a"));
        let b = dialog.add_entry(Node::new("b"));

        assert!(matches!(
            dialog.connect(a, b),
            Err(Error::SameKindPointer { .. })
        ));
    }

    #[test]
    fn connect_rejects_unknown_node() {
        let mut dialog = Dialog::new();
        let a = dialog.add_entry(Node::new("a"));

        assert!(matches!(
            dialog.connect(a, NodeId::reply(4)),
            Err(Error::UnknownNode(id)) if id == NodeId::reply(4)
        ));
    }

    #[test]
    fn start_must_target_entry() {
        let mut dialog = Dialog::new();
        let reply = dialog.add_reply(Node::new("r"));

        assert!(matches!(
            dialog.add_start(reply),
            Err(Error::InvalidStart(_))
        ));
    }

    #[test]
    fn validate_finds_dangling_pointer() -> Result<()> {
        let mut dialog = Dialog::new();
        let entry = dialog.add_entry(Node::new("hello"));
        dialog.add_start(entry)?;
        dialog.starts_mut()[0].target = 3;

        assert!(matches!(
            dialog.validate(),
            Err(Error::DanglingPointer { target, .. }) if target == NodeId::entry(3)
        ));

        Ok(())
    }

    #[test]
    fn traversal_assigns_in_visiting_order() -> Result<()> {
        // Arena order differs from the order the walk reaches the nodes.
        let mut dialog = Dialog::new();
        let late = dialog.add_entry(Node::new("late"));
        let first = dialog.add_entry(Node::new("first"));
        let reply = dialog.add_reply(Node::new("reply"));
        dialog.add_start(first)?;
        dialog.connect(first, reply)?;
        dialog.connect(reply, late)?;

        let traversal = Traversal::run(&dialog);

        assert_eq!(traversal.entry_order, vec![1, 0]);
        assert_eq!(traversal.file_index(first), 0);
        assert_eq!(traversal.file_index(late), 1);
        assert!(traversal.owns(PointerSource::Start, 0));

        Ok(())
    }

    #[test]
    fn refresh_links_marks_later_pointers() -> Result<()> {
        let mut dialog = Dialog::new();
        let greet = dialog.add_entry(Node::new("Hello"));
        let ask = dialog.add_reply(Node::new("Again?"));
        let leave = dialog.add_reply(Node::new("Bye"));
        dialog.add_start(greet)?;
        dialog.connect(greet, ask)?;
        dialog.connect(greet, leave)?;
        dialog.connect(ask, greet)?;

        dialog.refresh_links()?;

        let flags = dialog
            .iter_pointers()
            .map(|(_, target, p)| (target, p.is_link))
            .collect::<Vec<_>>();
        assert_eq!(
            flags,
            vec![
                (greet, false),
                (ask, false),
                (leave, false),
                (greet, true),
            ]
        );

        Ok(())
    }
}
