use aurora_gff::{Gff, Value};
use clap::Args;
use itertools::Itertools;
use miette::{Context, Result};
use owo_colors::OwoColorize;
use std::path::PathBuf;

#[derive(Args)]
pub struct InfoArgs {
    /// An input GFF file
    #[arg(value_name = "FILE")]
    file: PathBuf,
}

fn summarize(value: &Value) -> String {
    match value {
        Value::String(s) => format!("{s:?}"),
        Value::ResRef(r) => format!("{:?}", r.as_str()),
        Value::LocString(l) => format!(
            "strref {:#x}, [{}]",
            l.str_ref,
            l.iter().map(|(key, text)| format!("{key}: {text:?}")).join(", ")
        ),
        Value::Void(bytes) => format!("{} bytes", bytes.len()),
        Value::Struct(s) => format!("struct {} with {} fields", s.struct_type, s.len()),
        Value::List(list) => format!("{} structs", list.len()),
        Value::Byte(v) => v.to_string(),
        Value::Char(v) => v.to_string(),
        Value::Word(v) => v.to_string(),
        Value::Short(v) => v.to_string(),
        Value::DWord(v) => v.to_string(),
        Value::Int(v) => v.to_string(),
        Value::DWord64(v) => v.to_string(),
        Value::Int64(v) => v.to_string(),
        Value::Float(v) => v.to_string(),
        Value::Double(v) => v.to_string(),
    }
}

impl InfoArgs {
    pub fn handle(&self) -> Result<()> {
        let gff = Gff::open(&self.file).context(format!("reading {}", self.file.display()))?;

        println!("{} {}", "file type:".bold(), gff.file_type);
        println!("{} {}", "structs:".bold(), gff.root.struct_count());
        println!("{} {}", "top-level fields:".bold(), gff.root.len());
        for (label, value) in &gff.root {
            println!(
                "  {:<16} {:<10} {}",
                label.as_str().cyan(),
                format!("{:?}", value.field_type()).dimmed(),
                summarize(value)
            );
        }
        Ok(())
    }
}
