//! Mapping between [`Dialog`] and the fields of a `DLG ` file.

use aurora_gff::{FileType, Gff, GffDocument, Struct};
use tracing::{debug, instrument, warn};

use crate::dialog::{Dialog, PointerSource, Traversal};
use crate::error::{Error, Result};
use crate::node::{Node, NodeId, NodeKind, Pointer, DEFAULT_DELAY};

impl NodeKind {
    /// Top-level list holding nodes of this kind
    fn list_label(self) -> &'static str {
        match self {
            NodeKind::Entry => "EntryList",
            NodeKind::Reply => "ReplyList",
        }
    }

    /// Per-node list holding this kind's pointers
    fn pointer_list_label(self) -> &'static str {
        match self {
            NodeKind::Entry => "RepliesList",
            NodeKind::Reply => "EntriesList",
        }
    }
}

impl GffDocument for Dialog {
    type Error = Error;

    const FILE_TYPE: FileType = FileType::DLG;

    #[instrument(skip_all, err)]
    fn from_gff(gff: Gff) -> Result<Self> {
        let mut root = gff.root;

        let entries = read_nodes(&root, NodeKind::Entry)?;
        let replies = read_nodes(&root, NodeKind::Reply)?;
        let starts = root
            .list("StartingList")?
            .iter()
            .map(read_pointer)
            .collect::<Result<Vec<_>>>()?;

        let mut dialog = Dialog {
            delay_entry: root.opt_dword("DelayEntry")?.unwrap_or_default(),
            delay_reply: root.opt_dword("DelayReply")?.unwrap_or_default(),
            end_conversation: root.opt_resref("EndConversation")?.unwrap_or_default(),
            end_conver_abort: root.opt_resref("EndConverAbort")?.unwrap_or_default(),
            prevent_zoom_in: root.opt_byte("PreventZoomIn")?.unwrap_or_default() != 0,
            entries,
            replies,
            starts,
            raw: Struct::default(),
        };
        for label in ["EntryList", "ReplyList", "StartingList"] {
            clear_list(&mut root, label)?;
        }
        dialog.raw = root;
        dialog.validate()?;

        let stored = dialog
            .iter_pointers()
            .map(|(_, _, pointer)| pointer.is_link)
            .collect::<Vec<_>>();
        dialog.refresh_links()?;
        let changed = dialog
            .iter_pointers()
            .zip(stored)
            .filter(|((_, _, pointer), stored)| pointer.is_link != *stored)
            .count();
        if changed > 0 {
            warn!(changed, "stored link flags disagree with traversal order");
        }

        debug!(
            entries = dialog.entries.len(),
            replies = dialog.replies.len(),
            starts = dialog.starts.len(),
            "read dialog"
        );
        Ok(dialog)
    }

    #[instrument(skip_all, err)]
    fn to_gff(&self) -> Result<Gff> {
        self.validate()?;
        let traversal = Traversal::run(self);

        let mut root = self.raw.clone();
        root.set("DelayEntry", self.delay_entry)?;
        root.set("DelayReply", self.delay_reply)?;
        root.set("NumWords", self.word_count() as u32)?;
        root.set("EndConversation", self.end_conversation.clone())?;
        root.set("EndConverAbort", self.end_conver_abort.clone())?;
        root.set("PreventZoomIn", self.prevent_zoom_in)?;

        for (kind, order) in [
            (NodeKind::Entry, &traversal.entry_order),
            (NodeKind::Reply, &traversal.reply_order),
        ] {
            let list = order
                .iter()
                .enumerate()
                .map(|(position, index)| {
                    let id = NodeId { kind, index: *index };
                    self.write_node(id, position as u32, &traversal)
                })
                .collect::<Result<Vec<_>>>()?;
            root.set(kind.list_label(), list)?;
        }

        let starts = self
            .starts
            .iter()
            .enumerate()
            .map(|(position, pointer)| {
                let target = traversal.file_index(NodeId::entry(pointer.target));
                write_start(pointer, position as u32, target)
            })
            .collect::<Result<Vec<_>>>()?;
        root.set("StartingList", starts)?;

        Ok(Gff::with_root(FileType::DLG, root))
    }
}

impl Dialog {
    fn write_node(&self, id: NodeId, position: u32, traversal: &Traversal) -> Result<Struct> {
        let node = self.node(id).ok_or(Error::UnknownNode(id))?;
        let mut s = node.raw.clone();
        s.struct_type = position;

        if id.kind == NodeKind::Entry {
            s.set("Speaker", node.speaker.as_str())?;
        }
        match &node.listener {
            Some(listener) => s.set("Listener", listener.as_str())?,
            None => s.remove("Listener"),
        };
        s.set("Animation", node.animation)?;
        s.set("AnimLoop", node.anim_loop)?;
        s.set("Text", node.text.clone())?;
        s.set("Script", node.script.clone())?;
        s.set("Delay", node.delay)?;
        s.set("Comment", node.comment.as_str())?;
        s.set("Sound", node.sound.clone())?;
        s.set("Quest", node.quest.as_str())?;
        match node.quest_entry {
            Some(entry) => s.set("QuestEntry", entry)?,
            None => s.remove("QuestEntry"),
        };

        let source = PointerSource::Node(id);
        let pointers = node
            .pointers
            .iter()
            .enumerate()
            .map(|(position, pointer)| {
                let target = traversal.file_index(Dialog::target_of(source, pointer));
                let is_link = !traversal.owns(source, position);
                write_pointer(pointer, position as u32, target, is_link)
            })
            .collect::<Result<Vec<_>>>()?;
        s.set(id.kind.pointer_list_label(), pointers)?;

        Ok(s)
    }
}

fn read_nodes(root: &Struct, kind: NodeKind) -> Result<Vec<Node>> {
    root.list(kind.list_label())?
        .iter()
        .map(|s| read_node(s, kind))
        .collect()
}

fn read_node(s: &Struct, kind: NodeKind) -> Result<Node> {
    Ok(Node {
        text: s.opt_locstring("Text")?.unwrap_or_default(),
        speaker: s.opt_string("Speaker")?.unwrap_or_default(),
        listener: s.opt_string("Listener")?,
        animation: s.opt_dword("Animation")?.unwrap_or_default(),
        anim_loop: s.opt_byte("AnimLoop")?.unwrap_or(1) != 0,
        script: s.opt_resref("Script")?.unwrap_or_default(),
        delay: s.opt_dword("Delay")?.unwrap_or(DEFAULT_DELAY),
        comment: s.opt_string("Comment")?.unwrap_or_default(),
        sound: s.opt_resref("Sound")?.unwrap_or_default(),
        quest: s.opt_string("Quest")?.unwrap_or_default(),
        quest_entry: s.opt_dword("QuestEntry")?,
        pointers: s
            .list(kind.pointer_list_label())?
            .iter()
            .map(read_pointer)
            .collect::<Result<Vec<_>>>()?,
        raw: {
            let mut raw = s.clone();
            clear_list(&mut raw, kind.pointer_list_label())?;
            raw
        },
    })
}

/// Empty a list that is rebuilt on write, keeping its position among the fields.
fn clear_list(s: &mut Struct, label: &str) -> Result<()> {
    if s.contains(label) {
        s.set(label, Vec::<Struct>::new())?;
    }
    Ok(())
}

fn read_pointer(s: &Struct) -> Result<Pointer> {
    Ok(Pointer {
        target: s.get_dword("Index")? as usize,
        condition: s.opt_resref("Active")?.unwrap_or_default(),
        is_link: s.opt_byte("IsChild")?.unwrap_or_default() != 0,
        link_comment: s.opt_string("LinkComment")?.unwrap_or_default(),
        raw: s.clone(),
    })
}

fn write_start(pointer: &Pointer, position: u32, target: u32) -> Result<Struct> {
    let mut s = pointer.raw.clone();
    s.struct_type = position;
    s.set("Index", target)?;
    s.set("Active", pointer.condition.clone())?;
    Ok(s)
}

fn write_pointer(pointer: &Pointer, position: u32, target: u32, is_link: bool) -> Result<Struct> {
    let mut s = write_start(pointer, position, target)?;
    s.set("IsChild", is_link)?;
    // An owning pointer keeps the comment it may have carried as a link.
    if is_link || !pointer.link_comment.is_empty() || s.contains("LinkComment") {
        s.set("LinkComment", pointer.link_comment.as_str())?;
    }
    Ok(s)
}
