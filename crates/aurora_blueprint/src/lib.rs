//! Typed access to the blueprint files of *Aurora* engine games: creature templates (`.utc`),
//! item templates (`.uti`) and player characters (`.bic`).
//!
//! Every type implements [`GffDocument`](aurora_gff::GffDocument). Decoding keeps the whole
//! root struct; encoding writes the modeled fields back where they were found, so fields this
//! library does not know about, and the order of all fields, survive a round trip.
//!
//! ```
//! # fn doit() -> aurora_blueprint::error::Result<()> {
//! use aurora_blueprint::{Creature, CreatureClass};
//! use aurora_gff::GffDocument;
//!
//! let mut guard = Creature::new();
//! guard.tag = "GUARD".to_owned();
//! guard.classes.push(CreatureClass::new(4, 3));
//! assert!(guard.issues().is_empty());
//!
//! let decoded = Creature::decode(&guard.encode()?)?;
//! assert_eq!(decoded.total_level(), 3);
//! # Ok(())
//! # }
//! # doit().unwrap();
//! ```

pub mod character;
pub mod creature;
pub mod error;
mod fields;
pub mod issue;
pub mod item;
pub mod resource;
pub mod twoda;

pub use character::PlayerCharacter;
pub use creature::{Abilities, Creature, CreatureClass, EquippedItem, InventoryItem};
pub use issue::Issue;
pub use item::{Item, ItemProperty};
pub use resource::{MemoryResourceStore, References, ResourceStore, ResourceType};
pub use twoda::{MemoryTwoDa, TwoDaLookup};
