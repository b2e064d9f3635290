//! 2DA rule table lookup.
//!
//! Templates store numbers that index the game's 2DA tables (`baseitems.2da`, `classes.2da`,
//! ...). Parsing the tables is someone else's job; cross-checks only need [`TwoDaLookup`].

use std::collections::HashMap;

/// Cell text for an empty 2DA cell
pub const EMPTY_CELL: &str = "****";

/// Read-only access to 2DA cells
pub trait TwoDaLookup {
    /// Text of `column` in `row` of `table`, or `None` if the row, the column or the cell is
    /// missing. Table and column names are case-insensitive.
    fn lookup(&self, table: &str, row: usize, column: &str) -> Option<String>;

    /// Whether `table` has a non-empty `column` in `row`.
    fn has_row(&self, table: &str, row: usize, column: &str) -> bool {
        self.lookup(table, row, column).is_some()
    }
}

/// 2DA cells held in memory
#[derive(Debug, Clone, Default)]
pub struct MemoryTwoDa {
    cells: HashMap<(String, usize, String), String>,
}

impl MemoryTwoDa {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a cell. Writing [`EMPTY_CELL`] stores an empty cell.
    pub fn insert(&mut self, table: &str, row: usize, column: &str, value: impl Into<String>) {
        self.cells.insert(
            (table.to_ascii_lowercase(), row, column.to_ascii_lowercase()),
            value.into(),
        );
    }

    /// Builder form of [`MemoryTwoDa::insert`].
    pub fn with(mut self, table: &str, row: usize, column: &str, value: impl Into<String>) -> Self {
        self.insert(table, row, column, value);
        self
    }
}

impl TwoDaLookup for MemoryTwoDa {
    fn lookup(&self, table: &str, row: usize, column: &str) -> Option<String> {
        self.cells
            .get(&(table.to_ascii_lowercase(), row, column.to_ascii_lowercase()))
            .filter(|value| value.as_str() != EMPTY_CELL)
            .cloned()
    }
}

#[cfg(test)]
mod test {
    use crate::twoda::{MemoryTwoDa, TwoDaLookup};

    #[test]
    fn lookup_is_case_insensitive() {
        let table = MemoryTwoDa::new().with("BaseItems", 1, "Label", "longsword");

        assert_eq!(table.lookup("baseitems", 1, "LABEL").as_deref(), Some("longsword"));
        assert_eq!(table.lookup("baseitems", 2, "label"), None);
    }

    #[test]
    fn empty_cells_read_as_missing() {
        let table = MemoryTwoDa::new().with("baseitems", 3, "label", "****");

        assert!(!table.has_row("baseitems", 3, "label"));
    }
}
