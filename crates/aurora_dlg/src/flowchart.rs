//! Node/link export of a dialog for graph viewers.
//!
//! Entries become `npc_<index>` nodes, replies `pc_<index>`, and the start list hangs off a
//! single `root` node. Link pointers are drawn as their own `link_<n>` node carrying the id of
//! the node they jump to, so the exported graph stays a tree.

use aurora_gff::{LocKey, TalkTable};

use crate::dialog::{Dialog, PointerSource};
use crate::node::{Node, NodeId, NodeKind, Pointer};

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum FlowNodeKind {
    Root,
    Npc,
    Pc,
    Link,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FlowNode {
    pub id: String,
    #[cfg_attr(feature = "serde", serde(rename = "type"))]
    pub kind: FlowNodeKind,
    pub text: String,
    pub speaker: String,
    pub has_action: bool,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub action_script: Option<String>,
    pub has_condition: bool,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub condition_script: Option<String>,
    pub is_link: bool,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub link_target: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FlowLink {
    pub source: String,
    pub target: String,
    pub has_condition: bool,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub condition_script: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Flowchart {
    pub nodes: Vec<FlowNode>,
    pub links: Vec<FlowLink>,
}

fn flow_id(id: NodeId) -> String {
    match id.kind {
        NodeKind::Entry => format!("npc_{}", id.index),
        NodeKind::Reply => format!("pc_{}", id.index),
    }
}

fn script(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_owned())
}

impl Dialog {
    /// Export nodes and links, resolving text through `talk_table` when given.
    ///
    /// Link flags are taken as they are; call [`Dialog::refresh_links`] after editing.
    pub fn flowchart(&self, talk_table: Option<&dyn TalkTable>) -> Flowchart {
        let text = |node: &Node| {
            node.text
                .resolve(talk_table, LocKey(0))
                .map(|text| text.into_owned())
                .unwrap_or_default()
        };

        let mut chart = Flowchart::default();
        chart.nodes.push(FlowNode {
            id: "root".to_owned(),
            kind: FlowNodeKind::Root,
            text: "Dialog Start".to_owned(),
            speaker: String::new(),
            has_action: false,
            action_script: None,
            has_condition: false,
            condition_script: None,
            is_link: false,
            link_target: None,
        });

        for (kind, nodes) in [(NodeKind::Entry, &self.entries), (NodeKind::Reply, &self.replies)] {
            for (index, node) in nodes.iter().enumerate() {
                chart.nodes.push(FlowNode {
                    id: flow_id(NodeId { kind, index }),
                    kind: match kind {
                        NodeKind::Entry => FlowNodeKind::Npc,
                        NodeKind::Reply => FlowNodeKind::Pc,
                    },
                    text: text(node),
                    speaker: node.speaker.clone(),
                    has_action: node.has_action(),
                    action_script: script(&node.script),
                    has_condition: false,
                    condition_script: None,
                    is_link: false,
                    link_target: None,
                });
            }
        }

        let mut links = 0;
        for (source, target, pointer) in self.iter_pointers() {
            let source_id = match source {
                PointerSource::Start => "root".to_owned(),
                PointerSource::Node(id) => flow_id(id),
            };
            let target_id = if pointer.is_link {
                let id = format!("link_{links}");
                links += 1;
                chart.nodes.push(link_node(&id, target, pointer, self.node(target).map(text)));
                id
            } else {
                flow_id(target)
            };
            chart.links.push(FlowLink {
                source: source_id,
                target: target_id,
                has_condition: pointer.has_condition(),
                condition_script: script(&pointer.condition),
            });
        }

        chart
    }
}

fn link_node(id: &str, target: NodeId, pointer: &Pointer, text: Option<String>) -> FlowNode {
    FlowNode {
        id: id.to_owned(),
        kind: FlowNodeKind::Link,
        text: format!("-> {}", text.unwrap_or_default()),
        speaker: String::new(),
        has_action: false,
        action_script: None,
        has_condition: pointer.has_condition(),
        condition_script: script(&pointer.condition),
        is_link: true,
        link_target: Some(flow_id(target)),
    }
}

#[cfg(test)]
mod test {
    use aurora_gff::{MemoryTalkTable, ResRef};
    use pretty_assertions::assert_eq;

    use crate::dialog::Dialog;
    use crate::error::Result;
    use crate::flowchart::FlowNodeKind;
    use crate::node::Node;

    #[test]
    fn flowchart_draws_links_as_nodes() -> Result<()> {
        let mut dialog = Dialog::new();
        let greet = dialog.add_entry(Node::new("Hello").with_speaker("Guard"));
        let again = dialog.add_reply(Node::new("Say that again"));
        dialog.add_start(greet)?;
        dialog.connect(greet, again)?;
        dialog.connect(again, greet)?.condition = ResRef::new("gc_patient")?;
        dialog.refresh_links()?;

        let chart = dialog.flowchart(None);

        let ids = chart.nodes.iter().map(|n| n.id.as_str()).collect::<Vec<_>>();
        assert_eq!(ids, vec!["root", "npc_0", "pc_0", "link_0"]);

        let link = &chart.nodes[3];
        assert_eq!(link.kind, FlowNodeKind::Link);
        assert_eq!(link.link_target.as_deref(), Some("npc_0"));
        assert_eq!(link.text, "-> Hello");
        assert_eq!(link.condition_script.as_deref(), Some("gc_patient"));

        let edges = chart
            .links
            .iter()
            .map(|l| (l.source.as_str(), l.target.as_str()))
            .collect::<Vec<_>>();
        assert_eq!(
            edges,
            vec![("root", "npc_0"), ("npc_0", "pc_0"), ("pc_0", "link_0")]
        );

        Ok(())
    }

    #[test]
    fn flowchart_prefers_talk_table_text() -> Result<()> {
        let mut dialog = Dialog::new();
        let mut node = Node::new("inline");
        node.text.str_ref = 7;
        let entry = dialog.add_entry(node);
        dialog.add_start(entry)?;

        let tlk = [(7, "from the talk table".to_owned())]
            .into_iter()
            .collect::<MemoryTalkTable>();
        let chart = dialog.flowchart(Some(&tlk));

        assert_eq!(chart.nodes[1].text, "from the talk table");

        Ok(())
    }
}
