//! Conversation nodes and the pointers between them.

use std::fmt;

use aurora_gff::{Label, LocString, ResRef, Struct, Value};

/// Labels of node fields this library models
pub(crate) const NODE_FIELDS: &[&str] = &[
    "Speaker",
    "Listener",
    "Animation",
    "AnimLoop",
    "Text",
    "Script",
    "Delay",
    "Comment",
    "Sound",
    "Quest",
    "QuestEntry",
    "RepliesList",
    "EntriesList",
];

/// Labels of pointer fields this library models
pub(crate) const POINTER_FIELDS: &[&str] = &["Index", "Active", "IsChild", "LinkComment"];

fn unmodeled<'a>(
    raw: &'a Struct,
    known: &'static [&'static str],
) -> impl Iterator<Item = (&'a Label, &'a Value)> {
    raw.iter()
        .filter(move |(label, _)| !known.contains(&label.as_str()))
}

/// Whether a node is spoken by the NPC (entry) or picked by the player (reply)
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum NodeKind {
    Entry,
    Reply,
}

impl NodeKind {
    /// The kind of node this kind's pointers target
    pub fn opposite(self) -> NodeKind {
        match self {
            NodeKind::Entry => NodeKind::Reply,
            NodeKind::Reply => NodeKind::Entry,
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeKind::Entry => f.write_str("entry"),
            NodeKind::Reply => f.write_str("reply"),
        }
    }
}

/// Address of a node inside a [`Dialog`](crate::Dialog)
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NodeId {
    pub kind: NodeKind,
    pub index: usize,
}

impl NodeId {
    pub fn entry(index: usize) -> Self {
        Self {
            kind: NodeKind::Entry,
            index,
        }
    }

    pub fn reply(index: usize) -> Self {
        Self {
            kind: NodeKind::Reply,
            index,
        }
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind, self.index)
    }
}

/// Edge from a node (or the start list) to a node of the opposite kind
///
/// `target` indexes the arena of the opposite kind. `is_link` is recomputed whenever the dialog
/// is decoded or encoded: it is false on the pointer that reaches its target first in traversal
/// order and true on every other pointer to the same node.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Pointer {
    pub target: usize,
    /// Script that must return true for the pointer to be followed (`Active`)
    pub condition: ResRef,
    pub is_link: bool,
    /// Comment shown on link pointers in the toolset, kept if the pointer comes to own its target
    pub link_comment: String,
    pub(crate) raw: Struct,
}

impl Pointer {
    pub fn new(target: usize) -> Self {
        Self {
            target,
            ..Default::default()
        }
    }

    pub fn with_condition(mut self, condition: ResRef) -> Self {
        self.condition = condition;
        self
    }

    pub fn has_condition(&self) -> bool {
        !self.condition.is_empty()
    }

    /// Fields this library does not model, in file order.
    pub fn extra_fields(&self) -> impl Iterator<Item = (&Label, &Value)> {
        unmodeled(&self.raw, POINTER_FIELDS)
    }
}

/// A line of the conversation
///
/// Fields the engine reads but this type does not model are kept as read and written back
/// unchanged.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub text: LocString,
    /// Tag of the speaking creature, empty for the conversation owner. Only entries have one.
    pub speaker: String,
    pub listener: Option<String>,
    pub animation: u32,
    pub anim_loop: bool,
    /// Action script run when the node is displayed
    pub script: ResRef,
    pub delay: u32,
    pub comment: String,
    pub sound: ResRef,
    pub quest: String,
    pub quest_entry: Option<u32>,
    pub pointers: Vec<Pointer>,
    pub(crate) raw: Struct,
}

/// Engine default for "no explicit delay"
pub const DEFAULT_DELAY: u32 = 0xFFFF_FFFF;

impl Default for Node {
    fn default() -> Self {
        Self {
            text: LocString::default(),
            speaker: String::new(),
            listener: None,
            animation: 0,
            anim_loop: true,
            script: ResRef::default(),
            delay: DEFAULT_DELAY,
            comment: String::new(),
            sound: ResRef::default(),
            quest: String::new(),
            quest_entry: None,
            pointers: Vec::new(),
            raw: Struct::default(),
        }
    }
}

impl Node {
    /// A node with a single English line
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: LocString::english(text),
            ..Default::default()
        }
    }

    pub fn with_speaker(mut self, speaker: impl Into<String>) -> Self {
        self.speaker = speaker.into();
        self
    }

    pub fn with_script(mut self, script: ResRef) -> Self {
        self.script = script;
        self
    }

    pub fn has_action(&self) -> bool {
        !self.script.is_empty()
    }

    /// Number of whitespace separated words over every inline string.
    pub fn word_count(&self) -> usize {
        self.text
            .iter()
            .map(|(_, text)| text.split_whitespace().count())
            .sum()
    }

    /// Fields this library does not model, in file order.
    pub fn extra_fields(&self) -> impl Iterator<Item = (&Label, &Value)> {
        unmodeled(&self.raw, NODE_FIELDS)
    }
}
