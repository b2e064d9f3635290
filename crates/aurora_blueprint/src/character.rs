//! Player characters (`BIC `): creature fields plus the player's progress.

use aurora_gff::{FileType, Gff, GffDocument, Label, ResRef, Value};
use tracing::{debug, instrument};

use crate::creature::Creature;
use crate::error::{Error, Result};
use crate::issue::Issue;
use crate::resource::{ReferenceList, References, ResourceType};

const CHARACTER_FIELDS: &[&str] = &["Experience", "Gold", "Age"];

/// A saved player character
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PlayerCharacter {
    pub creature: Creature,
    pub experience: u32,
    pub gold: u32,
    pub age: i32,
}

impl PlayerCharacter {
    /// Creature checks, plus characters must have gained at least one level.
    pub fn issues(&self) -> Vec<Issue> {
        let mut issues = self.creature.issues();
        if self.creature.total_level() == 0 {
            issues.push(Issue::NoClassLevels);
        }
        issues
    }

    /// Top-level fields this library does not model, in file order.
    pub fn extra_fields(&self) -> impl Iterator<Item = (&Label, &Value)> {
        self.creature
            .extra_fields()
            .filter(|(label, _)| !CHARACTER_FIELDS.contains(&label.as_str()))
    }
}

impl References for PlayerCharacter {
    fn references(&self) -> Vec<(ResRef, ResourceType)> {
        let mut list = ReferenceList::default();
        self.creature.push_references(&mut list);
        list.into_inner()
    }
}

impl GffDocument for PlayerCharacter {
    type Error = Error;

    const FILE_TYPE: FileType = FileType::BIC;

    #[instrument(skip_all, err)]
    fn from_gff(gff: Gff) -> Result<Self> {
        let root = gff.root;
        let experience = root.opt_dword("Experience")?.unwrap_or_default();
        let gold = root.opt_dword("Gold")?.unwrap_or_default();
        let age = root.opt_int("Age")?.unwrap_or_default();
        let creature = Creature::read(root)?;

        debug!(
            name = ?creature.first_name.get(0u32),
            level = creature.total_level(),
            "read player character"
        );
        Ok(PlayerCharacter {
            creature,
            experience,
            gold,
            age,
        })
    }

    #[instrument(skip_all, err)]
    fn to_gff(&self) -> Result<Gff> {
        let mut root = self.creature.raw.clone();
        self.creature.write(&mut root)?;
        root.set("Experience", self.experience)?;
        root.set("Gold", self.gold)?;
        root.set("Age", self.age)?;
        Ok(Gff::with_root(FileType::BIC, root))
    }
}

#[cfg(test)]
mod test {
    use crate::character::{PlayerCharacter, CHARACTER_FIELDS};
    use crate::creature::{CreatureClass, CREATURE_FIELDS};
    use crate::issue::Issue;

    #[test]
    fn character_labels_are_not_creature_labels() {
        assert!(CHARACTER_FIELDS
            .iter()
            .all(|label| !CREATURE_FIELDS.contains(label)));
    }

    #[test]
    fn character_needs_levels() {
        let mut pc = PlayerCharacter::default();
        pc.creature.classes.push(CreatureClass::new(4, 0));

        assert_eq!(pc.issues(), vec![Issue::NoClassLevels]);
    }
}
