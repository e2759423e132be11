//! Placement policies for rows and cells created during a fill
//!
//! The defaults reproduce how templates have always been filled: new rows are
//! appended after the existing ones and new cells are ordered by comparing
//! their references as text. The alternatives give the ordering spreadsheet
//! readers expect (`Sorted` rows, `ColumnRank` cells).

use std::cmp::Ordering;

use crate::address::CellAddress;

/// Where a newly created row goes in a worksheet's row list
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum RowPlacement {
    /// Always append, regardless of row index
    #[default]
    Append,
    /// Insert before the first row with a greater index
    Sorted,
}

impl RowPlacement {
    /// Position at which a new row with `index` is inserted, given the
    /// indices of the existing rows in document order
    pub fn insert_position<I>(self, existing: I, index: u32) -> usize
    where
        I: IntoIterator<Item = u32>,
    {
        let mut count = 0;
        for (pos, existing_index) in existing.into_iter().enumerate() {
            if self == RowPlacement::Sorted && existing_index > index {
                return pos;
            }
            count = pos + 1;
        }
        count
    }
}

/// How cell references within a row are compared when inserting a cell
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum CellOrdering {
    /// Case-insensitive ordinal comparison of the reference text.
    ///
    /// `"AA1"` sorts before `"B1"` and `"A10"` before `"A2"`.
    #[default]
    Lexical,
    /// Compare by column rank, then row number
    ColumnRank,
}

impl CellOrdering {
    /// Compare two cell references under this ordering
    pub fn compare(self, a: &str, b: &str) -> Ordering {
        match self {
            CellOrdering::Lexical => compare_ignore_ascii_case(a, b),
            CellOrdering::ColumnRank => match (CellAddress::parse(a), CellAddress::parse(b)) {
                (Ok(a), Ok(b)) => a.cmp(&b),
                // References we cannot read fall back to text order.
                _ => compare_ignore_ascii_case(a, b),
            },
        }
    }

    /// Position at which a cell with `reference` is inserted: before the
    /// first existing cell that compares greater, else at the end
    pub fn insert_position<'a, I>(self, existing: I, reference: &str) -> usize
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut count = 0;
        for (pos, existing_ref) in existing.into_iter().enumerate() {
            if self.compare(existing_ref, reference) == Ordering::Greater {
                return pos;
            }
            count = pos + 1;
        }
        count
    }
}

/// Row and cell placement used when the engine has to create structure
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct LayoutOptions {
    pub row_placement: RowPlacement,
    pub cell_ordering: CellOrdering,
}

impl LayoutOptions {
    /// Placement that keeps rows and cells in spreadsheet order
    pub fn ordered() -> Self {
        Self {
            row_placement: RowPlacement::Sorted,
            cell_ordering: CellOrdering::ColumnRank,
        }
    }
}

fn compare_ignore_ascii_case(a: &str, b: &str) -> Ordering {
    a.bytes()
        .map(|c| c.to_ascii_uppercase())
        .cmp(b.bytes().map(|c| c.to_ascii_uppercase()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_append_ignores_index() {
        assert_eq!(RowPlacement::Append.insert_position([1, 5, 9], 3), 3);
        assert_eq!(RowPlacement::Append.insert_position(Vec::new(), 3), 0);
    }

    #[test]
    fn test_sorted_inserts_before_greater_index() {
        assert_eq!(RowPlacement::Sorted.insert_position([1, 5, 9], 3), 1);
        assert_eq!(RowPlacement::Sorted.insert_position([1, 5, 9], 12), 3);
        assert_eq!(RowPlacement::Sorted.insert_position([4], 1), 0);
    }

    #[test]
    fn test_lexical_compare_is_textual() {
        let lex = CellOrdering::Lexical;
        assert_eq!(lex.compare("A1", "B1"), Ordering::Less);
        assert_eq!(lex.compare("b1", "B1"), Ordering::Equal);
        // Text order, not column/row order.
        assert_eq!(lex.compare("A10", "B1"), Ordering::Less);
        assert_eq!(lex.compare("A10", "A2"), Ordering::Less);
        assert_eq!(lex.compare("AA1", "B1"), Ordering::Less);
    }

    #[test]
    fn test_column_rank_compare() {
        let rank = CellOrdering::ColumnRank;
        assert_eq!(rank.compare("AA1", "B1"), Ordering::Greater);
        assert_eq!(rank.compare("A2", "A10"), Ordering::Less);
        assert_eq!(rank.compare("c3", "C3"), Ordering::Equal);
    }

    #[test]
    fn test_cell_insert_position() {
        let row = ["B1", "K1"];
        assert_eq!(CellOrdering::Lexical.insert_position(row, "A1"), 0);
        assert_eq!(CellOrdering::Lexical.insert_position(row, "C1"), 1);
        assert_eq!(CellOrdering::Lexical.insert_position(row, "Z1"), 2);
        assert_eq!(CellOrdering::Lexical.insert_position(row, "AA1"), 0);
        assert_eq!(CellOrdering::ColumnRank.insert_position(row, "AA1"), 2);
    }

    #[test]
    fn test_defaults_are_source_compatible() {
        let options = LayoutOptions::default();
        assert_eq!(options.row_placement, RowPlacement::Append);
        assert_eq!(options.cell_ordering, CellOrdering::Lexical);
    }
}
