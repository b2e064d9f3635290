//! The typed value tree a GFF file decodes into.

use indexmap::IndexMap;

use crate::error::{Error, Result};
use crate::label::Label;
use crate::locstring::LocString;
use crate::resref::ResRef;
use crate::types::{FieldType, ROOT_STRUCT_TYPE};

/// Value of a single field
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "type", content = "value"))]
pub enum Value {
    Byte(u8),
    Char(i8),
    Word(u16),
    Short(i16),
    DWord(u32),
    Int(i32),
    DWord64(u64),
    Int64(i64),
    Float(f32),
    Double(f64),
    String(String),
    ResRef(ResRef),
    LocString(LocString),
    Void(Vec<u8>),
    Struct(Struct),
    List(Vec<Struct>),
}

macro_rules! value_accessor {
    ($name:ident, $variant:ident, $ty:ty) => {
        pub fn $name(&self) -> Option<$ty> {
            match self {
                Value::$variant(v) => Some(*v),
                _ => None,
            }
        }
    };
}

impl Value {
    pub fn field_type(&self) -> FieldType {
        match self {
            Value::Byte(_) => FieldType::Byte,
            Value::Char(_) => FieldType::Char,
            Value::Word(_) => FieldType::Word,
            Value::Short(_) => FieldType::Short,
            Value::DWord(_) => FieldType::DWord,
            Value::Int(_) => FieldType::Int,
            Value::DWord64(_) => FieldType::DWord64,
            Value::Int64(_) => FieldType::Int64,
            Value::Float(_) => FieldType::Float,
            Value::Double(_) => FieldType::Double,
            Value::String(_) => FieldType::String,
            Value::ResRef(_) => FieldType::ResRef,
            Value::LocString(_) => FieldType::LocString,
            Value::Void(_) => FieldType::Void,
            Value::Struct(_) => FieldType::Struct,
            Value::List(_) => FieldType::List,
        }
    }

    value_accessor!(as_byte, Byte, u8);
    value_accessor!(as_char, Char, i8);
    value_accessor!(as_word, Word, u16);
    value_accessor!(as_short, Short, i16);
    value_accessor!(as_dword, DWord, u32);
    value_accessor!(as_int, Int, i32);
    value_accessor!(as_dword64, DWord64, u64);
    value_accessor!(as_int64, Int64, i64);
    value_accessor!(as_float, Float, f32);
    value_accessor!(as_double, Double, f64);

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(v) => Some(v.as_str()),
            _ => None,
        }
    }

    pub fn as_resref(&self) -> Option<&ResRef> {
        match self {
            Value::ResRef(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_locstring(&self) -> Option<&LocString> {
        match self {
            Value::LocString(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_void(&self) -> Option<&[u8]> {
        match self {
            Value::Void(v) => Some(v.as_slice()),
            _ => None,
        }
    }

    pub fn as_struct(&self) -> Option<&Struct> {
        match self {
            Value::Struct(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_struct_mut(&mut self) -> Option<&mut Struct> {
        match self {
            Value::Struct(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Struct]> {
        match self {
            Value::List(v) => Some(v.as_slice()),
            _ => None,
        }
    }

    pub fn as_list_mut(&mut self) -> Option<&mut Vec<Struct>> {
        match self {
            Value::List(v) => Some(v),
            _ => None,
        }
    }
}

macro_rules! value_from {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Value {
                fn from(value: $ty) -> Self {
                    Value::$variant(value)
                }
            }
        )*
    };
}

value_from! {
    u8 => Byte,
    i8 => Char,
    u16 => Word,
    i16 => Short,
    u32 => DWord,
    i32 => Int,
    u64 => DWord64,
    i64 => Int64,
    f32 => Float,
    f64 => Double,
    String => String,
    ResRef => ResRef,
    LocString => LocString,
    Vec<u8> => Void,
    Struct => Struct,
    Vec<Struct> => List,
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_owned())
    }
}

impl From<bool> for Value {
    /// Booleans are stored as bytes by convention.
    fn from(value: bool) -> Self {
        Value::Byte(value as u8)
    }
}

/// Ordered, label-keyed bag of fields plus the struct's type id
///
/// Field order is preserved exactly as read and as inserted; replacing an existing field keeps
/// its position.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Struct {
    pub struct_type: u32,
    fields: IndexMap<Label, Value>,
}

macro_rules! typed_getters {
    ($($get:ident, $opt:ident, $variant:ident, $ty:ty);* $(;)?) => {
        $(
            pub fn $get(&self, label: &str) -> Result<$ty> {
                self.$opt(label)?.ok_or_else(|| Error::MissingField {
                    label: label.to_owned(),
                })
            }

            pub fn $opt(&self, label: &str) -> Result<Option<$ty>> {
                match self.fields.get(label) {
                    None => Ok(None),
                    Some(Value::$variant(v)) => Ok(Some(v.clone())),
                    Some(other) => Err(Error::UnexpectedFieldType {
                        label: label.to_owned(),
                        expected: FieldType::$variant,
                        found: other.field_type(),
                    }),
                }
            }
        )*
    };
}

impl Struct {
    pub fn new(struct_type: u32) -> Self {
        Self {
            struct_type,
            fields: IndexMap::new(),
        }
    }

    /// An empty struct carrying the reserved top-level type id
    pub fn root() -> Self {
        Self::new(ROOT_STRUCT_TYPE)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn contains(&self, label: &str) -> bool {
        self.fields.contains_key(label)
    }

    pub fn get(&self, label: &str) -> Option<&Value> {
        self.fields.get(label)
    }

    pub fn get_mut(&mut self, label: &str) -> Option<&mut Value> {
        self.fields.get_mut(label)
    }

    /// Insert a field, keeping the position of an existing field with the same label.
    pub fn insert(&mut self, label: Label, value: impl Into<Value>) -> Option<Value> {
        self.fields.insert(label, value.into())
    }

    /// Like [`Struct::insert`], validating the label first.
    pub fn set(&mut self, label: &str, value: impl Into<Value>) -> Result<Option<Value>> {
        if let Some(slot) = self.fields.get_mut(label) {
            return Ok(Some(std::mem::replace(slot, value.into())));
        }
        Ok(self.insert(Label::new(label)?, value))
    }

    /// Builder form of [`Struct::set`].
    pub fn with(mut self, label: &str, value: impl Into<Value>) -> Result<Self> {
        self.set(label, value)?;
        Ok(self)
    }

    /// Remove a field, keeping the order of the others.
    pub fn remove(&mut self, label: &str) -> Option<Value> {
        self.fields.shift_remove(label)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Label, &Value)> {
        self.fields.iter()
    }

    pub fn labels(&self) -> impl Iterator<Item = &Label> {
        self.fields.keys()
    }

    typed_getters! {
        get_byte, opt_byte, Byte, u8;
        get_char, opt_char, Char, i8;
        get_word, opt_word, Word, u16;
        get_short, opt_short, Short, i16;
        get_dword, opt_dword, DWord, u32;
        get_int, opt_int, Int, i32;
        get_dword64, opt_dword64, DWord64, u64;
        get_int64, opt_int64, Int64, i64;
        get_float, opt_float, Float, f32;
        get_double, opt_double, Double, f64;
        get_string, opt_string, String, String;
        get_resref, opt_resref, ResRef, ResRef;
        get_locstring, opt_locstring, LocString, LocString;
        get_struct, opt_struct, Struct, Struct;
    }

    /// Borrow a list field; a missing list reads as empty.
    pub fn list(&self, label: &str) -> Result<&[Struct]> {
        match self.fields.get(label) {
            None => Ok(&[]),
            Some(Value::List(list)) => Ok(list.as_slice()),
            Some(other) => Err(Error::UnexpectedFieldType {
                label: label.to_owned(),
                expected: FieldType::List,
                found: other.field_type(),
            }),
        }
    }

    /// Total number of structs in this subtree, this one included.
    pub fn struct_count(&self) -> usize {
        1 + self
            .fields
            .values()
            .map(|value| match value {
                Value::Struct(s) => s.struct_count(),
                Value::List(list) => list.iter().map(Struct::struct_count).sum(),
                _ => 0,
            })
            .sum::<usize>()
    }
}

impl<'a> IntoIterator for &'a Struct {
    type Item = (&'a Label, &'a Value);
    type IntoIter = indexmap::map::Iter<'a, Label, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.iter()
    }
}
