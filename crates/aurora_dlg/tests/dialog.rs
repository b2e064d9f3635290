use std::path::PathBuf;

use aurora_dlg::error::{Error, Result};
use aurora_dlg::{Dialog, Node, NodeId, PointerSource};
use aurora_gff::{FileType, Gff, GffDocument, ResRef, Struct};
use miette::IntoDiagnostic;
use pretty_assertions::{assert_eq, assert_str_eq};
use tracing_test::traced_test;

fn resource(name: &str) -> PathBuf {
    PathBuf::from(format!("{}/resources/{name}", env!("CARGO_MANIFEST_DIR")))
}

fn text(node: &Node) -> &str {
    node.text.get(0u32).unwrap_or_default()
}

/// Every pointer as (source, target, is_link)
fn edges(dialog: &Dialog) -> Vec<(PointerSource, NodeId, bool)> {
    dialog
        .iter_pointers()
        .map(|(source, target, pointer)| (source, target, pointer.is_link))
        .collect()
}

#[traced_test]
#[test]
fn read_merchant() -> Result<()> {
    let dialog = Dialog::open(resource("merchant.dlg"))?;

    assert_eq!(
        dialog.entries().iter().map(text).collect::<Vec<_>>(),
        vec![
            "Welcome, traveler. Care to see my wares?",
            "Here you are.",
            "It is a quiet place.",
            "Back again?",
        ]
    );
    assert_eq!(
        dialog.replies().iter().map(text).collect::<Vec<_>>(),
        vec![
            "Show me what you have.",
            "Thanks.",
            "Tell me about the town.",
            "Goodbye.",
        ]
    );
    assert_eq!(dialog.end_conversation.as_str(), "nw_walk_wp");

    assert_eq!(dialog.starts().len(), 2);
    assert!(!dialog.starts()[0].has_condition());
    assert_eq!(dialog.starts()[1].condition.as_str(), "gc_met_before");

    let store = &dialog.entries()[1];
    assert_eq!(store.script.as_str(), "nw_open_store");
    assert!(store.has_action());
    assert_eq!(store.quest, "q_shop");
    assert_eq!(store.quest_entry, Some(10));

    let links = dialog
        .iter_pointers()
        .filter(|(_, _, p)| p.is_link)
        .map(|(source, target, p)| (source, target, p.link_comment.as_str()))
        .collect::<Vec<_>>();
    assert_eq!(
        links,
        vec![
            (PointerSource::Node(NodeId::entry(2)), NodeId::reply(0), "back to shop"),
            (PointerSource::Node(NodeId::entry(3)), NodeId::reply(0), ""),
        ]
    );

    assert_eq!(dialog.word_count(), 29);
    assert!(!logs_contain("disagree"));

    Ok(())
}

#[test]
fn rewrite_merchant_is_byte_identical() -> miette::Result<()> {
    let expected = std::fs::read(resource("merchant.dlg")).into_diagnostic()?;

    let result = Dialog::decode(&expected)?.encode()?;

    assert_str_eq!(format!("{:02X?}", result), format!("{:02X?}", expected));

    Ok(())
}

#[test]
fn unknown_fields_survive_edits() -> Result<()> {
    let mut dialog = Dialog::open(resource("merchant.dlg"))?;
    let welcome = NodeId::entry(0);

    let node = dialog.node_mut(welcome).ok_or(Error::UnknownNode(welcome))?;
    node.text.insert(0u32, "Greetings.");
    node.comment = "shortened".to_owned();

    let decoded = Dialog::decode(&dialog.encode()?)?;
    let node = decoded.node(welcome).ok_or(Error::UnknownNode(welcome))?;

    assert_eq!(text(node), "Greetings.");
    assert_eq!(node.comment, "shortened");
    let extra = node
        .extra_fields()
        .map(|(label, value)| (label.as_str().to_owned(), value.as_resref().map(ResRef::as_str)))
        .collect::<Vec<_>>();
    assert_eq!(extra, vec![("VO_ResRef".to_owned(), Some("vo_welcome"))]);
    assert_eq!(decoded.word_count(), 29 - 7 + 1);

    Ok(())
}

#[test]
fn single_path_round_trip() -> Result<()> {
    let mut dialog = Dialog::new();
    let hello = dialog.add_entry(Node::new("Hello"));
    let bye = dialog.add_reply(Node::new("Bye"));
    dialog.add_start(hello)?;
    dialog.connect(hello, bye)?;

    let decoded = Dialog::decode(&dialog.encode()?)?;

    assert_eq!(decoded.starts().len(), 1);
    assert_eq!(decoded.entries().len(), 1);
    assert_eq!(decoded.replies().len(), 1);
    assert_eq!(text(&decoded.entries()[0]), "Hello");
    assert_eq!(text(&decoded.replies()[0]), "Bye");
    assert_eq!(
        edges(&decoded),
        vec![
            (PointerSource::Start, hello, false),
            (PointerSource::Node(hello), bye, false),
        ]
    );

    Ok(())
}

#[test]
fn repeated_target_is_stored_once() -> Result<()> {
    let mut dialog = Dialog::new();
    let greet = dialog.add_entry(Node::new("What now?"));
    let answer = dialog.add_entry(Node::new("As you wish."));
    let choice = dialog.add_reply(Node::new("Either way."));
    dialog.add_start(greet)?;
    dialog.connect(greet, choice)?;
    dialog.connect(choice, answer)?;
    dialog.connect(choice, answer)?.link_comment = "same answer".to_owned();

    let bytes = dialog.encode()?;
    let gff = Gff::decode(&bytes)?;
    assert_eq!(gff.root.list("EntryList")?.len(), 2);

    let decoded = Dialog::decode(&bytes)?;
    let pointers = &decoded.replies()[0].pointers;
    assert_eq!(pointers.len(), 2);
    assert_eq!(pointers[0].target, pointers[1].target);
    assert_eq!(
        pointers.iter().map(|p| p.is_link).collect::<Vec<_>>(),
        vec![false, true]
    );
    assert_eq!(pointers[1].link_comment, "same answer");

    Ok(())
}

#[test]
fn start_reaching_an_assigned_entry_is_a_link() -> Result<()> {
    let mut dialog = Dialog::new();
    let opening = dialog.add_entry(Node::new("You again."));
    let shortcut = dialog.add_entry(Node::new("Straight to business, then."));
    let reply = dialog.add_reply(Node::new("Let us talk business."));
    dialog.add_start(opening)?;
    dialog.add_start(shortcut)?;
    dialog.connect(opening, reply)?;
    dialog.connect(reply, shortcut)?;

    let decoded = Dialog::decode(&dialog.encode()?)?;

    assert_eq!(decoded.entries().len(), 2);
    assert_eq!(
        decoded
            .starts()
            .iter()
            .map(|p| (p.target, p.is_link))
            .collect::<Vec<_>>(),
        vec![(0, false), (1, true)]
    );
    assert_eq!(
        decoded.replies()[0]
            .pointers
            .iter()
            .map(|p| (p.target, p.is_link))
            .collect::<Vec<_>>(),
        vec![(1, false)]
    );

    Ok(())
}

#[test]
fn owning_pointer_keeps_its_link_comment() -> Result<()> {
    let mut dialog = Dialog::new();
    let greet = dialog.add_entry(Node::new("What now?"));
    let answer = dialog.add_entry(Node::new("As you wish."));
    let choice = dialog.add_reply(Node::new("Either way."));
    dialog.add_start(greet)?;
    dialog.connect(greet, choice)?;
    dialog.connect(choice, answer)?.link_comment = "was the link".to_owned();
    dialog.connect(choice, answer)?;

    let bytes = dialog.encode()?;

    let gff = Gff::decode(&bytes)?;
    let stored = &gff.root.list("ReplyList")?[0].list("EntriesList")?[0];
    assert_eq!(stored.get_byte("IsChild")?, 0);
    assert_eq!(stored.get_string("LinkComment")?, "was the link");

    let decoded = Dialog::decode(&bytes)?;
    let pointers = &decoded.replies()[0].pointers;
    assert_eq!(
        pointers
            .iter()
            .map(|p| (p.is_link, p.link_comment.as_str()))
            .collect::<Vec<_>>(),
        vec![(false, "was the link"), (true, "")]
    );

    Ok(())
}

#[test]
fn link_never_owns_its_target() -> Result<()> {
    // A loop back to the greeting: the start pointer owns it, the reply's pointer is a link.
    let mut dialog = Dialog::new();
    let greet = dialog.add_entry(Node::new("Hello again"));
    let again = dialog.add_reply(Node::new("Say that again"));
    let leave = dialog.add_reply(Node::new("Farewell"));
    dialog.add_start(greet)?;
    dialog.connect(greet, again)?;
    dialog.connect(greet, leave)?;
    dialog.connect(again, greet)?;

    let decoded = Dialog::decode(&dialog.encode()?)?;

    assert_eq!(
        edges(&decoded),
        vec![
            (PointerSource::Start, greet, false),
            (PointerSource::Node(greet), again, false),
            (PointerSource::Node(greet), leave, false),
            (PointerSource::Node(again), greet, true),
        ]
    );

    Ok(())
}

#[test]
fn write_orders_nodes_by_first_visit() -> Result<()> {
    let mut dialog = Dialog::new();
    let unreachable = dialog.add_entry(Node::new("never said"));
    let late = dialog.add_entry(Node::new("second"));
    let first = dialog.add_entry(Node::new("first"));
    let reply = dialog.add_reply(Node::new("reply"));
    dialog.add_start(first)?;
    dialog.connect(first, reply)?;
    dialog.connect(reply, late)?;
    dialog.connect(unreachable, reply)?;

    let decoded = Dialog::decode(&dialog.encode()?)?;

    assert_eq!(
        decoded.entries().iter().map(text).collect::<Vec<_>>(),
        vec!["first", "second", "never said"]
    );
    assert_eq!(
        edges(&decoded),
        vec![
            (PointerSource::Start, NodeId::entry(0), false),
            (PointerSource::Node(NodeId::entry(0)), NodeId::reply(0), false),
            (PointerSource::Node(NodeId::entry(2)), NodeId::reply(0), true),
            (PointerSource::Node(NodeId::reply(0)), NodeId::entry(1), false),
        ]
    );

    Ok(())
}

#[test]
fn read_rejects_dangling_index() -> Result<()> {
    let pointer = Struct::new(0)
        .with("Index", 5u32)?
        .with("Active", ResRef::default())?
        .with("IsChild", false)?;
    let entry = Struct::new(0)
        .with("Text", aurora_gff::LocString::english("lost"))?
        .with("RepliesList", vec![pointer])?;
    let root = Struct::root()
        .with("EntryList", vec![entry])?
        .with("ReplyList", Vec::<Struct>::new())?
        .with("StartingList", Vec::<Struct>::new())?;
    let bytes = Gff::with_root(FileType::DLG, root).encode()?;

    let result = Dialog::decode(&bytes);

    assert!(matches!(
        result,
        Err(Error::DanglingPointer { target, .. }) if target == NodeId::reply(5)
    ));

    Ok(())
}

#[test]
fn read_rejects_other_file_types() -> Result<()> {
    let bytes = Gff::with_root(FileType::UTC, Struct::root()).encode()?;

    assert!(matches!(
        Dialog::decode(&bytes),
        Err(Error::Gff(aurora_gff::error::Error::UnsupportedFormat { .. }))
    ));

    Ok(())
}

#[traced_test]
#[test]
fn read_recomputes_stale_link_flags() -> Result<()> {
    let mut gff = Gff::open(resource("merchant.dlg"))?;
    let entries = gff
        .root
        .get_mut("EntryList")
        .and_then(|value| value.as_list_mut())
        .unwrap();
    // Clear the flag on the link from "It is a quiet place." back to the shop reply.
    entries[2]
        .get_mut("RepliesList")
        .and_then(|value| value.as_list_mut())
        .unwrap()[0]
        .set("IsChild", false)?;

    let dialog = Dialog::from_gff(gff)?;

    assert!(dialog.entries()[2].pointers[0].is_link);
    assert!(logs_contain("stored link flags disagree"));

    Ok(())
}

#[test]
fn flowchart_serializes_for_graph_viewers() -> miette::Result<()> {
    let dialog = Dialog::open(resource("merchant.dlg"))?;

    let json = serde_json::to_value(dialog.flowchart(None)).into_diagnostic()?;

    let nodes = &json["nodes"];
    assert_eq!(nodes[0]["type"], "root");
    assert_eq!(nodes[1]["type"], "npc");
    assert_eq!(nodes[1]["text"], "Welcome, traveler. Care to see my wares?");
    assert_eq!(nodes[1]["has_action"], false);
    assert!(nodes[1].get("action_script").is_none());
    assert_eq!(nodes[2]["action_script"], "nw_open_store");
    assert_eq!(nodes[5]["type"], "pc");
    assert_eq!(nodes[9]["type"], "link");
    assert_eq!(nodes[9]["is_link"], true);
    assert_eq!(nodes[9]["link_target"], "pc_0");

    assert_eq!(
        json["links"][0],
        serde_json::json!({ "source": "root", "target": "npc_0", "has_condition": false })
    );
    assert_eq!(
        json["links"][1],
        serde_json::json!({
            "source": "root",
            "target": "npc_3",
            "has_condition": true,
            "condition_script": "gc_met_before",
        })
    );

    Ok(())
}
