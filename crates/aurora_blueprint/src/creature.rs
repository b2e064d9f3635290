//! Creature templates (`UTC `).
//!
//! | Label            | Type      | Field                                  |
//! |------------------|-----------|----------------------------------------|
//! | TemplateResRef   | ResRef    | [`Creature::template_resref`]          |
//! | Tag              | CExoString| [`Creature::tag`]                      |
//! | FirstName        | LocString | [`Creature::first_name`]               |
//! | LastName         | LocString | [`Creature::last_name`]                |
//! | Race, Gender     | BYTE      | indices into `racialtypes.2da` / `gender.2da` |
//! | Str … Cha        | BYTE      | [`Abilities`]                          |
//! | HitPoints        | SHORT     | base hit points                        |
//! | CurrentHitPoints | SHORT     |                                        |
//! | MaxHitPoints     | SHORT     |                                        |
//! | ChallengeRating  | FLOAT     |                                        |
//! | FactionID        | WORD      |                                        |
//! | Conversation     | ResRef    | dialog started when clicked            |
//! | ClassList        | List      | [`CreatureClass`], struct id 2         |
//! | ItemList         | List      | [`InventoryItem`], struct id = position|
//! | Equip_ItemList   | List      | [`EquippedItem`], struct id = slot bit |

use std::collections::HashSet;

use aurora_gff::{FileType, Gff, GffDocument, Label, LocString, ResRef, Struct, Value};
use tracing::{debug, instrument};

use crate::error::{Error, Result};
use crate::fields::{take_list, unmodeled};
use crate::issue::Issue;
use crate::resource::{ReferenceList, References, ResourceType};

/// Struct id the toolset gives every `ClassList` element
pub const CLASS_STRUCT_TYPE: u32 = 2;

/// Most classes a creature can have
pub const MAX_CLASSES: usize = 3;

pub(crate) const CREATURE_FIELDS: &[&str] = &[
    "TemplateResRef",
    "Tag",
    "FirstName",
    "LastName",
    "Race",
    "Gender",
    "Str",
    "Dex",
    "Con",
    "Int",
    "Wis",
    "Cha",
    "HitPoints",
    "CurrentHitPoints",
    "MaxHitPoints",
    "ChallengeRating",
    "FactionID",
    "Conversation",
    "ClassList",
    "ItemList",
    "Equip_ItemList",
];

const ABILITY_LABELS: [&str; 6] = ["Str", "Dex", "Con", "Int", "Wis", "Cha"];

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Abilities {
    pub strength: u8,
    pub dexterity: u8,
    pub constitution: u8,
    pub intelligence: u8,
    pub wisdom: u8,
    pub charisma: u8,
}

impl Default for Abilities {
    fn default() -> Self {
        Self::from_array([10; 6])
    }
}

impl Abilities {
    fn from_array(scores: [u8; 6]) -> Self {
        let [strength, dexterity, constitution, intelligence, wisdom, charisma] = scores;
        Self {
            strength,
            dexterity,
            constitution,
            intelligence,
            wisdom,
            charisma,
        }
    }

    fn to_array(self) -> [u8; 6] {
        [
            self.strength,
            self.dexterity,
            self.constitution,
            self.intelligence,
            self.wisdom,
            self.charisma,
        ]
    }

    /// Ability modifier as the rules compute it: `(score - 10) / 2`, rounded down
    pub fn modifier(score: u8) -> i8 {
        ((score as i16 - 10).div_euclid(2)) as i8
    }
}

/// One `ClassList` element
#[derive(Debug, Clone, PartialEq)]
pub struct CreatureClass {
    /// Row of `classes.2da`
    pub class: i32,
    pub level: i16,
    pub(crate) raw: Struct,
}

impl CreatureClass {
    pub fn new(class: i32, level: i16) -> Self {
        Self {
            class,
            level,
            raw: Struct::new(CLASS_STRUCT_TYPE),
        }
    }

    /// Fields this library does not model, such as known spell lists.
    pub fn extra_fields(&self) -> impl Iterator<Item = (&Label, &Value)> {
        unmodeled(&self.raw, &["Class", "ClassLevel"])
    }
}

/// One `ItemList` element: an item carried in the backpack
#[derive(Debug, Clone, PartialEq)]
pub struct InventoryItem {
    pub resref: ResRef,
    /// Position in the inventory grid
    pub x: u16,
    pub y: u16,
    pub(crate) raw: Struct,
}

impl InventoryItem {
    pub fn new(resref: ResRef) -> Self {
        Self {
            resref,
            x: 0,
            y: 0,
            raw: Struct::default(),
        }
    }
}

/// One `Equip_ItemList` element
#[derive(Debug, Clone, PartialEq)]
pub struct EquippedItem {
    /// Slot bit, stored as the element's struct id
    pub slot: u32,
    pub resref: ResRef,
    pub(crate) raw: Struct,
}

/// A creature blueprint
#[derive(Debug, Clone, PartialEq)]
pub struct Creature {
    pub template_resref: ResRef,
    pub tag: String,
    pub first_name: LocString,
    pub last_name: LocString,
    pub race: u8,
    pub gender: u8,
    pub abilities: Abilities,
    pub hit_points: i16,
    pub current_hit_points: i16,
    pub max_hit_points: i16,
    pub challenge_rating: f32,
    pub faction_id: u16,
    pub conversation: ResRef,
    pub classes: Vec<CreatureClass>,
    pub items: Vec<InventoryItem>,
    pub equipment: Vec<EquippedItem>,
    pub(crate) raw: Struct,
}

impl Default for Creature {
    fn default() -> Self {
        Self {
            template_resref: ResRef::default(),
            tag: String::new(),
            first_name: LocString::default(),
            last_name: LocString::default(),
            race: 0,
            gender: 0,
            abilities: Abilities::default(),
            hit_points: 0,
            current_hit_points: 0,
            max_hit_points: 0,
            challenge_rating: 0.0,
            faction_id: 0,
            conversation: ResRef::default(),
            classes: Vec::new(),
            items: Vec::new(),
            equipment: Vec::new(),
            raw: Struct::root(),
        }
    }
}

impl Creature {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read the creature fields of `root`, keeping everything else for the write back.
    pub(crate) fn read(mut root: Struct) -> Result<Self> {
        let mut scores = [10u8; 6];
        for (score, label) in scores.iter_mut().zip(ABILITY_LABELS) {
            if let Some(value) = root.opt_byte(label)? {
                *score = value;
            }
        }

        let classes = take_list(&mut root, "ClassList")?
            .into_iter()
            .map(|raw| {
                Ok(CreatureClass {
                    class: raw.get_int("Class")?,
                    level: raw.opt_short("ClassLevel")?.unwrap_or_default(),
                    raw,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        let items = take_list(&mut root, "ItemList")?
            .into_iter()
            .map(|raw| {
                Ok(InventoryItem {
                    resref: raw.get_resref("InventoryRes")?,
                    x: raw.opt_word("Repos_PosX")?.unwrap_or_default(),
                    y: raw.opt_word("Repos_Posy")?.unwrap_or_default(),
                    raw,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        let equipment = take_list(&mut root, "Equip_ItemList")?
            .into_iter()
            .map(|raw| {
                Ok(EquippedItem {
                    slot: raw.struct_type,
                    resref: raw.get_resref("EquippedRes")?,
                    raw,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Creature {
            template_resref: root.opt_resref("TemplateResRef")?.unwrap_or_default(),
            tag: root.opt_string("Tag")?.unwrap_or_default(),
            first_name: root.opt_locstring("FirstName")?.unwrap_or_default(),
            last_name: root.opt_locstring("LastName")?.unwrap_or_default(),
            race: root.opt_byte("Race")?.unwrap_or_default(),
            gender: root.opt_byte("Gender")?.unwrap_or_default(),
            abilities: Abilities::from_array(scores),
            hit_points: root.opt_short("HitPoints")?.unwrap_or_default(),
            current_hit_points: root.opt_short("CurrentHitPoints")?.unwrap_or_default(),
            max_hit_points: root.opt_short("MaxHitPoints")?.unwrap_or_default(),
            challenge_rating: root.opt_float("ChallengeRating")?.unwrap_or_default(),
            faction_id: root.opt_word("FactionID")?.unwrap_or_default(),
            conversation: root.opt_resref("Conversation")?.unwrap_or_default(),
            classes,
            items,
            equipment,
            raw: root,
        })
    }

    /// Write the creature fields into `root`, in place where they already exist.
    pub(crate) fn write(&self, root: &mut Struct) -> Result<()> {
        // Player characters are not instantiated from a template and carry no resref.
        if !self.template_resref.is_empty() || root.contains("TemplateResRef") {
            root.set("TemplateResRef", self.template_resref.clone())?;
        }
        root.set("Tag", self.tag.as_str())?;
        root.set("FirstName", self.first_name.clone())?;
        root.set("LastName", self.last_name.clone())?;
        root.set("Race", self.race)?;
        root.set("Gender", self.gender)?;
        for (score, label) in self.abilities.to_array().into_iter().zip(ABILITY_LABELS) {
            root.set(label, score)?;
        }
        root.set("HitPoints", self.hit_points)?;
        root.set("CurrentHitPoints", self.current_hit_points)?;
        root.set("MaxHitPoints", self.max_hit_points)?;
        root.set("ChallengeRating", self.challenge_rating)?;
        root.set("FactionID", self.faction_id)?;
        root.set("Conversation", self.conversation.clone())?;

        let classes = self
            .classes
            .iter()
            .map(|class| {
                let mut s = class.raw.clone();
                s.set("Class", class.class)?;
                s.set("ClassLevel", class.level)?;
                Ok(s)
            })
            .collect::<Result<Vec<_>>>()?;
        root.set("ClassList", classes)?;

        let items = self
            .items
            .iter()
            .enumerate()
            .map(|(position, item)| {
                let mut s = item.raw.clone();
                s.struct_type = position as u32;
                s.set("InventoryRes", item.resref.clone())?;
                s.set("Repos_PosX", item.x)?;
                s.set("Repos_Posy", item.y)?;
                Ok(s)
            })
            .collect::<Result<Vec<_>>>()?;
        root.set("ItemList", items)?;

        let equipment = self
            .equipment
            .iter()
            .map(|item| {
                let mut s = item.raw.clone();
                s.struct_type = item.slot;
                s.set("EquippedRes", item.resref.clone())?;
                Ok(s)
            })
            .collect::<Result<Vec<_>>>()?;
        root.set("Equip_ItemList", equipment)?;

        Ok(())
    }

    /// Sum of all class levels
    pub fn total_level(&self) -> i32 {
        self.classes.iter().map(|class| class.level as i32).sum()
    }

    pub fn equipped(&self, slot: u32) -> Option<&EquippedItem> {
        self.equipment.iter().find(|item| item.slot == slot)
    }

    /// Put `resref` in `slot`, replacing whatever was equipped there.
    pub fn equip(&mut self, slot: u32, resref: ResRef) -> Result<()> {
        if !slot.is_power_of_two() {
            return Err(Error::InvalidEquipSlot(slot));
        }
        match self.equipment.iter_mut().find(|item| item.slot == slot) {
            Some(item) => item.resref = resref,
            None => self.equipment.push(EquippedItem {
                slot,
                resref,
                raw: Struct::default(),
            }),
        }
        Ok(())
    }

    /// Consistency checks the toolset performs before saving.
    pub fn issues(&self) -> Vec<Issue> {
        let mut issues = Vec::new();

        if self.classes.is_empty() || self.classes.len() > MAX_CLASSES {
            issues.push(Issue::ClassCount(self.classes.len()));
        }
        let mut classes = HashSet::new();
        for class in &self.classes {
            if !classes.insert(class.class) {
                issues.push(Issue::DuplicateClass(class.class));
            }
        }

        if self.current_hit_points > self.max_hit_points {
            issues.push(Issue::HitPointsAboveMax {
                current: self.current_hit_points,
                max: self.max_hit_points,
            });
        }

        let mut slots = HashSet::new();
        for item in &self.equipment {
            if !item.slot.is_power_of_two() {
                issues.push(Issue::InvalidEquipSlot(item.slot));
            } else if !slots.insert(item.slot) {
                issues.push(Issue::DuplicateEquipSlot(item.slot));
            }
        }

        issues
    }

    /// Top-level fields this library does not model, in file order.
    pub fn extra_fields(&self) -> impl Iterator<Item = (&Label, &Value)> {
        unmodeled(&self.raw, CREATURE_FIELDS)
    }

    pub(crate) fn push_references(&self, list: &mut ReferenceList) {
        list.push(&self.conversation, ResourceType::Dlg);
        for item in &self.items {
            list.push(&item.resref, ResourceType::Uti);
        }
        for item in &self.equipment {
            list.push(&item.resref, ResourceType::Uti);
        }
    }
}

impl References for Creature {
    fn references(&self) -> Vec<(ResRef, ResourceType)> {
        let mut list = ReferenceList::default();
        self.push_references(&mut list);
        list.into_inner()
    }
}

impl GffDocument for Creature {
    type Error = Error;

    const FILE_TYPE: FileType = FileType::UTC;

    #[instrument(skip_all, err)]
    fn from_gff(gff: Gff) -> Result<Self> {
        let creature = Creature::read(gff.root)?;
        debug!(
            tag = %creature.tag,
            classes = creature.classes.len(),
            items = creature.items.len(),
            "read creature"
        );
        Ok(creature)
    }

    #[instrument(skip_all, err)]
    fn to_gff(&self) -> Result<Gff> {
        let mut root = self.raw.clone();
        self.write(&mut root)?;
        Ok(Gff::with_root(FileType::UTC, root))
    }
}

#[cfg(test)]
mod test {
    use aurora_gff::{GffDocument, ResRef};
    use pretty_assertions::assert_eq;

    use crate::creature::{Abilities, Creature, CreatureClass};
    use crate::error::{Error, Result};
    use crate::issue::Issue;

    #[test]
    fn ability_modifier_rounds_down() {
        assert_eq!(Abilities::modifier(10), 0);
        assert_eq!(Abilities::modifier(17), 3);
        assert_eq!(Abilities::modifier(9), -1);
        assert_eq!(Abilities::modifier(3), -4);
    }

    #[test]
    fn equip_replaces_slot() -> Result<()> {
        let mut creature = Creature::new();
        creature.equip(0x10, ResRef::new("nw_wswls001")?)?;
        creature.equip(0x10, ResRef::new("nw_wswss001")?)?;

        assert_eq!(creature.equipment.len(), 1);
        assert_eq!(
            creature.equipped(0x10).map(|item| item.resref.as_str()),
            Some("nw_wswss001")
        );
        assert!(matches!(
            creature.equip(0x12, ResRef::default()),
            Err(Error::InvalidEquipSlot(0x12))
        ));

        Ok(())
    }

    #[test]
    fn issues_cover_classes_and_hit_points() {
        let mut creature = Creature::new();
        assert_eq!(creature.issues(), vec![Issue::ClassCount(0)]);

        creature.classes = vec![CreatureClass::new(4, 3), CreatureClass::new(4, 1)];
        creature.current_hit_points = 12;
        creature.max_hit_points = 10;

        assert_eq!(
            creature.issues(),
            vec![
                Issue::DuplicateClass(4),
                Issue::HitPointsAboveMax {
                    current: 12,
                    max: 10
                },
            ]
        );
    }

    #[test]
    fn new_creature_round_trips() -> Result<()> {
        let mut creature = Creature::new();
        creature.tag = "BANDIT".to_owned();
        creature.template_resref = ResRef::new("bandit001")?;
        creature.classes.push(CreatureClass::new(8, 2));
        creature.equip(0x2, ResRef::new("nw_aarcl001")?)?;

        let decoded = Creature::decode(&creature.encode()?)?;

        assert_eq!(decoded.tag, "BANDIT");
        assert_eq!(decoded.total_level(), 2);
        assert_eq!(decoded.equipped(0x2).map(|i| i.resref.as_str()), Some("nw_aarcl001"));
        assert_eq!(decoded.abilities, Abilities::default());

        Ok(())
    }
}
