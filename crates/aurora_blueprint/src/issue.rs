//! Findings of template cross-checks.

use derive_more::derive::Display;

/// Something a template holds that the engine would reject or misbehave on
///
/// Cross-checks never fail decoding; they list what they find so editors can show it.
#[derive(Debug, Display, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Issue {
    #[display("has {_0} classes, expected 1 to 3")]
    ClassCount(usize),

    #[display("lists class {_0} more than once")]
    DuplicateClass(i32),

    #[display("class levels add up to zero")]
    NoClassLevels,

    #[display("current hit points {current} exceed maximum {max}")]
    HitPointsAboveMax { current: i16, max: i16 },

    #[display("equipment slot {_0:#x} is not a single bit")]
    InvalidEquipSlot(u32),

    #[display("equipment slot {_0:#x} is used more than once")]
    DuplicateEquipSlot(u32),

    #[display("stack size is zero")]
    EmptyStack,

    #[display("base item {_0} has no row in baseitems.2da")]
    UnknownBaseItem(i32),
}
