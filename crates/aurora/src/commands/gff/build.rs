use aurora_gff::{encode_with, Gff, GffWriterOptions};
use clap::Args;
use miette::{Context, IntoDiagnostic, Result};
use std::fs::File;
use std::io::{BufReader, Write};
use std::path::PathBuf;
use tracing::info;

#[derive(Args)]
pub struct BuildArgs {
    /// JSON produced by `aurora gff dump`
    #[arg(value_name = "JSON")]
    input: PathBuf,

    /// A target GFF file
    #[arg(short, long, value_name = "FILE")]
    output: PathBuf,

    /// Allow overwriting the target
    #[arg(long, default_value_t = false)]
    overwrite: bool,

    /// Pack field data without 4-byte alignment
    #[arg(long, default_value_t = false)]
    no_padding: bool,
}

impl BuildArgs {
    pub fn handle(&self) -> Result<()> {
        let reader = File::open(&self.input)
            .into_diagnostic()
            .context(format!("opening {}", self.input.display()))?;
        let gff: Gff = serde_json::from_reader(BufReader::new(reader))
            .into_diagnostic()
            .context(format!("parsing {}", self.input.display()))?;

        let bytes = encode_with(
            &gff,
            GffWriterOptions::builder()
                .pad_field_data(!self.no_padding)
                .build(),
        )?;

        info!("writing {} ({} bytes)", self.output.display(), bytes.len());
        let mut out = crate::commands::create_output(&self.output, self.overwrite)?;
        out.write_all(&bytes).into_diagnostic()?;
        Ok(())
    }
}
