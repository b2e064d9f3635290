use aurora_dlg::Dialog;
use aurora_gff::GffDocument;
use clap::Args;
use miette::{Context, IntoDiagnostic, Result};
use std::io::Write;
use std::path::PathBuf;
use tracing::info;

#[derive(Args)]
pub struct GraphArgs {
    /// An input DLG file
    #[arg(value_name = "FILE")]
    file: PathBuf,

    /// Write the JSON here instead of stdout
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Allow overwriting the target
    #[arg(long, default_value_t = false)]
    overwrite: bool,
}

impl GraphArgs {
    pub fn handle(&self) -> Result<()> {
        let dialog = Dialog::open(&self.file).context(format!("reading {}", self.file.display()))?;
        let chart = dialog.flowchart(None);
        info!(
            nodes = chart.nodes.len(),
            links = chart.links.len(),
            "built flowchart"
        );

        match &self.output {
            Some(path) => {
                let out = crate::commands::create_output(path, self.overwrite)?;
                serde_json::to_writer_pretty(std::io::BufWriter::new(out), &chart)
                    .into_diagnostic()?;
            }
            None => {
                let mut stdout = std::io::stdout().lock();
                serde_json::to_writer_pretty(&mut stdout, &chart).into_diagnostic()?;
                writeln!(stdout).into_diagnostic()?;
            }
        }
        Ok(())
    }
}
