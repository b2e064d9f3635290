use std::path::PathBuf;

use aurora_gff::error::{Error, Result};
use aurora_gff::types::MAX_NESTING;
use aurora_gff::{
    decode, encode, encode_with, FileType, Gff, GffWriterOptions, LocString, ResRef, Struct,
    Value,
};
use miette::IntoDiagnostic;
use pretty_assertions::{assert_eq, assert_str_eq};
use tracing_test::traced_test;

fn resource(name: &str) -> PathBuf {
    PathBuf::from(format!("{}/resources/{name}", env!("CARGO_MANIFEST_DIR")))
}

fn header(bytes: &[u8]) -> Vec<u32> {
    bytes[8..56]
        .chunks_exact(4)
        .map(|c| u32::from_le_bytes([c[0], c[1], c[2], c[3]]))
        .collect()
}

#[traced_test]
#[test]
fn rewrite_is_byte_identical() -> Result<()> {
    let expected = std::fs::read(resource("all_types.gff"))?;

    let result = encode(&decode(&expected)?)?;

    assert_str_eq!(format!("{:02X?}", result), format!("{:02X?}", expected));

    Ok(())
}

#[test]
fn write_then_read_built_document() -> Result<()> {
    let mut text = LocString::english("A sturdy chest");
    text.insert(2u32, "Eine stabile Truhe");

    let lock = Struct::new(3)
        .with("Locked", true)?
        .with("KeyName", "chest_key")?;
    let items = (0..3)
        .map(|i| Struct::new(i).with("InventoryRes", ResRef::new(format!("nw_it_{i}"))?))
        .collect::<Result<Vec<_>>>()?;

    let root = Struct::root()
        .with("Tag", "CHEST")?
        .with("LocName", text)?
        .with("HP", 15i16)?
        .with("Lock", lock)?
        .with("ItemList", items)?
        .with("Empty", Vec::<Struct>::new())?
        .with("Blob", Vec::<u8>::new())?;
    let gff = Gff::with_root(FileType::from_extension("utp").unwrap(), root);

    let bytes = gff.encode()?;
    let decoded = Gff::decode(&bytes)?;

    assert_eq!(decoded, gff);
    assert_eq!(
        decoded.root.list("ItemList")?[2]
            .get_resref("InventoryRes")?
            .as_str(),
        "nw_it_2"
    );
    assert_eq!(decoded.root.get("Blob"), Some(&Value::Void(Vec::new())));

    Ok(())
}

#[test]
fn field_data_entries_are_padded() -> Result<()> {
    let root = Struct::root()
        .with("A", "x")?
        .with("B", "yz")?
        .with("C", 7u64)?;
    let gff = Gff::with_root(FileType::GFF, root);

    let padded = gff.encode()?;
    let packed = encode_with(&gff, GffWriterOptions::builder().pad_field_data(false).build())?;

    // "x" and "yz" take 5 and 6 bytes, padded to 8 each; the u64 takes 8.
    assert_eq!(header(&padded)[7], 24);
    assert_eq!(header(&packed)[7], 19);
    assert_eq!(Gff::decode(&packed)?, Gff::decode(&padded)?);

    Ok(())
}

#[test]
fn offsets_follow_table_order() -> Result<()> {
    let bytes = std::fs::read(resource("all_types.gff"))?;
    let h = header(&bytes);

    let mut offset = 56;
    for table in 0..6 {
        assert_eq!(h[table * 2] as usize, offset, "table {table}");
        let size = match table {
            0 | 1 => h[table * 2 + 1] as usize * 12,
            2 => h[table * 2 + 1] as usize * 16,
            _ => h[table * 2 + 1] as usize,
        };
        offset += size;
    }
    assert_eq!(offset, bytes.len());

    Ok(())
}

#[test]
fn save_and_open() -> Result<()> {
    let path = std::env::temp_dir().join(format!("aurora_gff_{}.gff", std::process::id()));
    let gff = Gff::with_root(FileType::GFF, Struct::root().with("Answer", 42i32)?);

    gff.save(&path)?;
    let opened = Gff::open(&path);
    std::fs::remove_file(&path)?;

    assert_eq!(opened?, gff);

    Ok(())
}

#[cfg(feature = "serde")]
#[test]
fn serialize_as_json() -> miette::Result<()> {
    let gff = Gff::with_root(
        FileType::UTI,
        Struct::root()
            .with("Tag", "SWORD")?
            .with("Cost", 15u32)?,
    );

    let json = serde_json::to_value(&gff).into_diagnostic()?;

    assert_eq!(json["file_type"], "UTI ");
    assert_eq!(json["root"]["fields"]["Tag"]["type"], "String");
    assert_eq!(json["root"]["fields"]["Cost"]["value"], 15);

    let back: Gff = serde_json::from_value(json).into_diagnostic()?;
    assert_eq!(back, gff);

    Ok(())
}

/// A root with `depth` levels of "Next" structs below it.
fn nested(depth: usize) -> Result<Gff> {
    let mut current = Struct::new(0);
    for _ in 1..depth {
        current = Struct::new(0).with("Next", current)?;
    }
    let root = Struct::root().with("Next", current)?;
    Ok(Gff::with_root(FileType::GFF, root))
}

#[test]
fn write_nesting_up_to_the_limit() -> Result<()> {
    let gff = nested(MAX_NESTING)?;

    let decoded = decode(&gff.encode()?)?;

    assert_eq!(decoded.root.struct_count(), MAX_NESTING + 1);
    assert_eq!(decoded, gff);

    Ok(())
}

#[test]
fn write_rejects_nesting_past_the_limit() -> Result<()> {
    let gff = nested(MAX_NESTING + 1)?;

    assert!(matches!(
        gff.encode(),
        Err(Error::MalformedStructure {
            table: "struct table",
            index,
            ..
        }) if index == MAX_NESTING + 1
    ));

    Ok(())
}
