use aurora_gff::{decode, encode, FileType};
use clap::Args;
use itertools::Itertools;
use miette::{miette, IntoDiagnostic, Result};
use owo_colors::OwoColorize;
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

#[derive(Args)]
pub struct VerifyArgs {
    /// Files or directories to check; directories are searched for GFF extensions
    #[arg(value_name = "PATH", required = true)]
    paths: Vec<PathBuf>,

    /// Worker threads, defaults to one per core
    #[arg(short, long)]
    threads: Option<usize>,
}

enum Outcome {
    Identical,
    /// Re-encoding changed the bytes; the first differing offset
    Different(usize),
    Failed(String),
}

fn is_gff(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .and_then(FileType::from_extension)
        .is_some_and(|kind| {
            [
                FileType::GFF,
                FileType::DLG,
                FileType::UTC,
                FileType::UTI,
                FileType::BIC,
                FileType::IFO,
                FileType::ARE,
                FileType::GIT,
                FileType::JRL,
            ]
            .contains(&kind)
        })
}

fn check(path: &Path) -> Outcome {
    let bytes = match std::fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) => return Outcome::Failed(e.to_string()),
    };
    match decode(&bytes).and_then(|gff| encode(&gff)) {
        Ok(encoded) if encoded == bytes => Outcome::Identical,
        Ok(encoded) => Outcome::Different(
            encoded
                .iter()
                .zip(&bytes)
                .position(|(a, b)| a != b)
                .unwrap_or(encoded.len().min(bytes.len())),
        ),
        Err(e) => Outcome::Failed(e.to_string()),
    }
}

impl VerifyArgs {
    fn collect_files(&self) -> Vec<PathBuf> {
        self.paths
            .iter()
            .flat_map(|path| {
                if path.is_dir() {
                    WalkDir::new(path)
                        .into_iter()
                        .filter_map(|e| e.ok())
                        .filter(|e| e.file_type().is_file() && is_gff(e.path()))
                        .map(|e| e.into_path())
                        .collect::<Vec<_>>()
                } else {
                    vec![path.clone()]
                }
            })
            .sorted()
            .dedup()
            .collect()
    }

    pub fn handle(&self) -> Result<()> {
        let files = self.collect_files();
        if files.is_empty() {
            return Err(miette!("no GFF files found"));
        }
        info!("verifying {} files", files.len());

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.threads.unwrap_or(0))
            .build()
            .into_diagnostic()?;
        let outcomes = pool.install(|| {
            files
                .par_iter()
                .map(|path| (path, check(path)))
                .collect::<Vec<_>>()
        });

        let (mut identical, mut different, mut failed) = (0, 0, 0);
        for (path, outcome) in &outcomes {
            match outcome {
                Outcome::Identical => {
                    identical += 1;
                    debug!("{} is byte-stable", path.display());
                }
                Outcome::Different(offset) => {
                    different += 1;
                    warn!("{} re-encodes differently from offset {offset:#x}", path.display());
                    println!("{} {}", "changed".yellow(), path.display());
                }
                Outcome::Failed(reason) => {
                    failed += 1;
                    println!("{} {}: {reason}", "failed".red(), path.display());
                }
            }
        }

        println!(
            "{} identical, {} changed, {} failed",
            identical.green(),
            different.yellow(),
            failed.red()
        );

        if failed > 0 {
            return Err(miette!("{failed} files could not be decoded or encoded"));
        }
        Ok(())
    }
}
