use aurora_gff::error::Error;
use aurora_gff::{FieldType, Label, Struct, Value};

use crate::error::Result;

/// Move the elements out of a list field, leaving it empty in place so it keeps its position.
pub(crate) fn take_list(s: &mut Struct, label: &str) -> Result<Vec<Struct>> {
    match s.get_mut(label) {
        None => Ok(Vec::new()),
        Some(Value::List(list)) => Ok(std::mem::take(list)),
        Some(other) => Err(Error::UnexpectedFieldType {
            label: label.to_owned(),
            expected: FieldType::List,
            found: other.field_type(),
        }
        .into()),
    }
}

/// Fields of `raw` whose label is not in `known`, in file order.
pub(crate) fn unmodeled<'a>(
    raw: &'a Struct,
    known: &'a [&'a str],
) -> impl Iterator<Item = (&'a Label, &'a Value)> {
    raw.iter()
        .filter(move |(label, _)| !known.contains(&label.as_str()))
}
