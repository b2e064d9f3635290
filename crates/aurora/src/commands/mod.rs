pub mod dlg;
pub mod gff;

#[derive(clap::Subcommand)]
pub enum Commands {
    /// Inspect, convert and check GFF files
    Gff {
        #[command(subcommand)]
        command: gff::GffCommands,
    },
    /// Inspect DLG conversation files
    Dlg {
        #[command(subcommand)]
        command: dlg::DlgCommands,
    },
}

impl Commands {
    pub fn handle(&self) -> miette::Result<()> {
        match self {
            Commands::Gff { command } => command.handle(),
            Commands::Dlg { command } => command.handle(),
        }
    }
}

/// Open `path` for writing, refusing to replace an existing file unless `overwrite` is set.
pub(crate) fn create_output(
    path: &std::path::Path,
    overwrite: bool,
) -> miette::Result<std::fs::File> {
    use miette::{Context, IntoDiagnostic};

    let file = if overwrite {
        std::fs::File::create(path)
    } else {
        std::fs::File::create_new(path)
    };
    file.into_diagnostic()
        .context(format!("creating {}", path.display()))
}
