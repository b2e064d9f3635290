//! Item templates (`UTI `).

use aurora_gff::{FileType, Gff, GffDocument, Label, LocString, ResRef, Struct, Value};
use tracing::{debug, instrument};

use crate::error::{Error, Result};
use crate::fields::{take_list, unmodeled};
use crate::issue::Issue;
use crate::resource::{References, ResourceType};
use crate::twoda::TwoDaLookup;

const ITEM_FIELDS: &[&str] = &[
    "TemplateResRef",
    "Tag",
    "BaseItem",
    "LocalizedName",
    "Description",
    "DescIdentified",
    "StackSize",
    "Charges",
    "Cost",
    "Plot",
    "Cursed",
    "Identified",
    "PropertiesList",
];

/// One `PropertiesList` element, a row reference into `itempropdef.2da` and its cost tables
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ItemProperty {
    pub property_name: u16,
    pub subtype: u16,
    pub cost_table: u8,
    pub cost_value: u16,
    pub param1: u8,
    pub param1_value: u8,
    /// Percent chance the property appears on a random drop
    pub chance_appear: u8,
    pub(crate) raw: Struct,
}

impl ItemProperty {
    pub fn new(property_name: u16, subtype: u16) -> Self {
        Self {
            property_name,
            subtype,
            param1: 0xFF,
            chance_appear: 100,
            ..Default::default()
        }
    }

    fn read(raw: Struct) -> Result<Self> {
        Ok(Self {
            property_name: raw.get_word("PropertyName")?,
            subtype: raw.opt_word("Subtype")?.unwrap_or_default(),
            cost_table: raw.opt_byte("CostTable")?.unwrap_or_default(),
            cost_value: raw.opt_word("CostValue")?.unwrap_or_default(),
            param1: raw.opt_byte("Param1")?.unwrap_or(0xFF),
            param1_value: raw.opt_byte("Param1Value")?.unwrap_or_default(),
            chance_appear: raw.opt_byte("ChanceAppear")?.unwrap_or(100),
            raw,
        })
    }

    fn write(&self) -> Result<Struct> {
        let mut s = self.raw.clone();
        s.set("PropertyName", self.property_name)?;
        s.set("Subtype", self.subtype)?;
        s.set("CostTable", self.cost_table)?;
        s.set("CostValue", self.cost_value)?;
        s.set("Param1", self.param1)?;
        s.set("Param1Value", self.param1_value)?;
        s.set("ChanceAppear", self.chance_appear)?;
        Ok(s)
    }
}

/// An item blueprint
#[derive(Debug, Clone, PartialEq)]
pub struct Item {
    pub template_resref: ResRef,
    pub tag: String,
    /// Row of `baseitems.2da`
    pub base_item: i32,
    pub localized_name: LocString,
    /// Description shown before the item is identified
    pub description: LocString,
    pub desc_identified: LocString,
    pub stack_size: u16,
    pub charges: u8,
    pub cost: u32,
    pub plot: bool,
    pub cursed: bool,
    pub identified: bool,
    pub properties: Vec<ItemProperty>,
    raw: Struct,
}

impl Default for Item {
    fn default() -> Self {
        Self {
            template_resref: ResRef::default(),
            tag: String::new(),
            base_item: 0,
            localized_name: LocString::default(),
            description: LocString::default(),
            desc_identified: LocString::default(),
            stack_size: 1,
            charges: 0,
            cost: 0,
            plot: false,
            cursed: false,
            identified: true,
            properties: Vec::new(),
            raw: Struct::root(),
        }
    }
}

impl Item {
    pub fn new() -> Self {
        Self::default()
    }

    /// Consistency checks; the base item is only checked when `twoda` is given.
    pub fn issues(&self, twoda: Option<&dyn TwoDaLookup>) -> Vec<Issue> {
        let mut issues = Vec::new();
        if self.stack_size == 0 {
            issues.push(Issue::EmptyStack);
        }
        if let Some(twoda) = twoda {
            let known = usize::try_from(self.base_item)
                .map(|row| twoda.has_row("baseitems", row, "label"))
                .unwrap_or(false);
            if !known {
                issues.push(Issue::UnknownBaseItem(self.base_item));
            }
        }
        issues
    }

    /// Top-level fields this library does not model, in file order.
    pub fn extra_fields(&self) -> impl Iterator<Item = (&Label, &Value)> {
        unmodeled(&self.raw, ITEM_FIELDS)
    }
}

impl References for Item {
    /// Items name no other resources directly; their appearance and properties go through 2DA
    /// rows.
    fn references(&self) -> Vec<(ResRef, ResourceType)> {
        Vec::new()
    }
}

impl GffDocument for Item {
    type Error = Error;

    const FILE_TYPE: FileType = FileType::UTI;

    #[instrument(skip_all, err)]
    fn from_gff(gff: Gff) -> Result<Self> {
        let mut root = gff.root;
        let properties = take_list(&mut root, "PropertiesList")?
            .into_iter()
            .map(ItemProperty::read)
            .collect::<Result<Vec<_>>>()?;

        let item = Item {
            template_resref: root.opt_resref("TemplateResRef")?.unwrap_or_default(),
            tag: root.opt_string("Tag")?.unwrap_or_default(),
            base_item: root.opt_int("BaseItem")?.unwrap_or_default(),
            localized_name: root.opt_locstring("LocalizedName")?.unwrap_or_default(),
            description: root.opt_locstring("Description")?.unwrap_or_default(),
            desc_identified: root.opt_locstring("DescIdentified")?.unwrap_or_default(),
            stack_size: root.opt_word("StackSize")?.unwrap_or(1),
            charges: root.opt_byte("Charges")?.unwrap_or_default(),
            cost: root.opt_dword("Cost")?.unwrap_or_default(),
            plot: root.opt_byte("Plot")?.unwrap_or_default() != 0,
            cursed: root.opt_byte("Cursed")?.unwrap_or_default() != 0,
            identified: root.opt_byte("Identified")?.unwrap_or(1) != 0,
            properties,
            raw: root,
        };
        debug!(tag = %item.tag, properties = item.properties.len(), "read item");
        Ok(item)
    }

    #[instrument(skip_all, err)]
    fn to_gff(&self) -> Result<Gff> {
        let mut root = self.raw.clone();
        root.set("TemplateResRef", self.template_resref.clone())?;
        root.set("Tag", self.tag.as_str())?;
        root.set("BaseItem", self.base_item)?;
        root.set("LocalizedName", self.localized_name.clone())?;
        root.set("Description", self.description.clone())?;
        root.set("DescIdentified", self.desc_identified.clone())?;
        root.set("StackSize", self.stack_size)?;
        root.set("Charges", self.charges)?;
        root.set("Cost", self.cost)?;
        root.set("Plot", self.plot)?;
        root.set("Cursed", self.cursed)?;
        root.set("Identified", self.identified)?;

        let properties = self
            .properties
            .iter()
            .map(ItemProperty::write)
            .collect::<Result<Vec<_>>>()?;
        root.set("PropertiesList", properties)?;

        Ok(Gff::with_root(FileType::UTI, root))
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use crate::issue::Issue;
    use crate::item::Item;
    use crate::twoda::MemoryTwoDa;

    #[test]
    fn base_item_checked_against_twoda() {
        let twoda = MemoryTwoDa::new().with("baseitems", 1, "label", "longsword");
        let mut item = Item::new();
        item.base_item = 1;

        assert_eq!(item.issues(Some(&twoda)), vec![]);
        assert_eq!(item.issues(None), vec![]);

        item.base_item = -1;
        item.stack_size = 0;
        assert_eq!(
            item.issues(Some(&twoda)),
            vec![Issue::EmptyStack, Issue::UnknownBaseItem(-1)]
        );
    }
}
