use aurora_dlg::{Dialog, Node, NodeId, NodeKind, Pointer, PointerSource};
use aurora_gff::{GffDocument, LocKey};
use clap::Args;
use miette::{Context, Result};
use owo_colors::OwoColorize;
use std::path::PathBuf;

#[derive(Args)]
pub struct TreeArgs {
    /// An input DLG file
    #[arg(value_name = "FILE")]
    file: PathBuf,

    /// Show scripts and conditions next to each line
    #[arg(short, long, default_value_t = false)]
    scripts: bool,
}

fn line_text(node: &Node) -> String {
    match node.text.resolve(None, LocKey(0)) {
        Some(text) => text.into_owned(),
        None if node.text.has_str_ref() => format!("<strref {}>", node.text.str_ref),
        None => "[continue]".to_owned(),
    }
}

impl TreeArgs {
    fn print(&self, dialog: &Dialog, target: NodeId, pointer: &Pointer, depth: usize) {
        let Some(node) = dialog.node(target) else {
            return;
        };
        let indent = "  ".repeat(depth);
        let text = line_text(node);

        let mut line = if pointer.is_link {
            format!("{indent}{} {}", "->".dimmed(), text.dimmed())
        } else {
            match target.kind {
                NodeKind::Entry if node.speaker.is_empty() => {
                    format!("{indent}{} {text}", "NPC:".yellow())
                }
                NodeKind::Entry => format!("{indent}{} {text}", format!("{}:", node.speaker).yellow()),
                NodeKind::Reply => format!("{indent}{} {text}", "PC:".cyan()),
            }
        };
        if self.scripts {
            if pointer.has_condition() {
                line.push_str(&format!(" {}", format!("if {}", pointer.condition).magenta()));
            }
            if node.has_action() && !pointer.is_link {
                line.push_str(&format!(" {}", format!("runs {}", node.script).green()));
            }
        }
        println!("{line}");
    }

    pub fn handle(&self) -> Result<()> {
        let dialog = Dialog::open(&self.file).context(format!("reading {}", self.file.display()))?;

        let mut stack = dialog
            .starts()
            .iter()
            .rev()
            .map(|pointer| (PointerSource::Start, pointer, 0usize))
            .collect::<Vec<_>>();
        let mut shown = 0usize;

        while let Some((source, pointer, depth)) = stack.pop() {
            let target = Dialog::target_of(source, pointer);
            self.print(&dialog, target, pointer, depth);
            if pointer.is_link {
                continue;
            }
            shown += 1;
            if let Some(node) = dialog.node(target) {
                let source = PointerSource::Node(target);
                stack.extend(node.pointers.iter().rev().map(|p| (source, p, depth + 1)));
            }
        }

        let unreachable = dialog.len().saturating_sub(shown);
        if unreachable > 0 {
            println!(
                "{}",
                format!("{unreachable} nodes are not reachable from the start list").dimmed()
            );
        }
        Ok(())
    }
}
