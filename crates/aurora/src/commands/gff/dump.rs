use aurora_gff::Gff;
use clap::Args;
use miette::{Context, IntoDiagnostic, Result};
use std::io::Write;
use std::path::PathBuf;
use tracing::info;

#[derive(Args)]
pub struct DumpArgs {
    /// An input GFF file
    #[arg(value_name = "FILE")]
    file: PathBuf,

    /// Write the JSON here instead of stdout
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Allow overwriting the target
    #[arg(long, default_value_t = false)]
    overwrite: bool,
}

impl DumpArgs {
    pub fn handle(&self) -> Result<()> {
        let gff = Gff::open(&self.file).context(format!("reading {}", self.file.display()))?;

        match &self.output {
            Some(path) => {
                info!("writing {}", path.display());
                let out = crate::commands::create_output(path, self.overwrite)?;
                serde_json::to_writer_pretty(std::io::BufWriter::new(out), &gff).into_diagnostic()?;
            }
            None => {
                let mut stdout = std::io::stdout().lock();
                serde_json::to_writer_pretty(&mut stdout, &gff).into_diagnostic()?;
                writeln!(stdout).into_diagnostic()?;
            }
        }
        Ok(())
    }
}
