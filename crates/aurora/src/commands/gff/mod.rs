pub mod build;
pub mod dump;
pub mod info;
pub mod verify;

#[derive(clap::Subcommand)]
pub enum GffCommands {
    /// Summarize a GFF file
    Info(info::InfoArgs),
    /// Write a GFF file as JSON
    Dump(dump::DumpArgs),
    /// Build a GFF file from JSON produced by `dump`
    Build(build::BuildArgs),
    /// Check that files decode and re-encode to the same bytes
    Verify(verify::VerifyArgs),
}

impl GffCommands {
    pub fn handle(&self) -> miette::Result<()> {
        match self {
            GffCommands::Info(info) => info.handle(),
            GffCommands::Dump(dump) => dump.handle(),
            GffCommands::Build(build) => build.handle(),
            GffCommands::Verify(verify) => verify.handle(),
        }
    }
}
