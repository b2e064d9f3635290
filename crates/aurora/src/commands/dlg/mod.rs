pub mod graph;
pub mod tree;

#[derive(clap::Subcommand)]
pub enum DlgCommands {
    /// Print a conversation as an indented tree, links marked
    Tree(tree::TreeArgs),
    /// Export conversation nodes and links as JSON for graph viewers
    Graph(graph::GraphArgs),
}

impl DlgCommands {
    pub fn handle(&self) -> miette::Result<()> {
        match self {
            DlgCommands::Tree(tree) => tree.handle(),
            DlgCommands::Graph(graph) => graph.handle(),
        }
    }
}
