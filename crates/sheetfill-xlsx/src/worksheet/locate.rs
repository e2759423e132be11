//! Locate-or-create for rows and cells
//!
//! Lookups are plain scans. When a row or cell is missing it is inserted at
//! the position chosen by the [`LayoutOptions`] policies; nothing already in
//! the sheet is reordered.

use sheetfill_core::{CellAddress, CellOrdering, LayoutOptions};

use super::{Cell, Row, Worksheet};

impl Row {
    /// Position of the cell with `reference`, inserting an empty one if the
    /// row has none. The flag is `true` when a cell was created.
    pub(crate) fn locate_or_insert_cell(
        &mut self,
        reference: &str,
        ordering: CellOrdering,
    ) -> (usize, bool) {
        if let Some(pos) = self.cells.iter().position(|c| c.reference == reference) {
            return (pos, false);
        }

        let pos = ordering.insert_position(self.cells.iter().map(|c| c.reference.as_str()), reference);
        self.cells.insert(pos, Cell::new(reference));
        (pos, true)
    }
}

impl Worksheet {
    /// Find the cell at `address`, creating its row and cell when missing
    ///
    /// Repeated calls with the same address return the same cell; no
    /// duplicate row or cell is ever created.
    pub fn locate_or_create(&mut self, address: &CellAddress, layout: LayoutOptions) -> &mut Cell {
        let row_pos = match self.rows.iter().position(|r| r.index == address.row) {
            Some(pos) => pos,
            None => {
                let pos = layout
                    .row_placement
                    .insert_position(self.rows.iter().map(|r| r.index), address.row);
                self.rows.insert(pos, Row::new(address.row));
                self.modified = true;
                pos
            }
        };

        let reference = address.to_a1_string();
        let (cell_pos, created) =
            self.rows[row_pos].locate_or_insert_cell(&reference, layout.cell_ordering);
        if created {
            self.modified = true;
        }

        &mut self.rows[row_pos].cells[cell_pos]
    }

    /// Locate-or-create the cell at `address` and write `value` into it
    ///
    /// Blank values are a no-op: no row or cell is created and an existing
    /// cell keeps its content. Returns whether a value was written.
    pub fn set_value(&mut self, address: &CellAddress, value: Option<&str>, layout: LayoutOptions) -> bool {
        if super::is_blank(value) {
            return false;
        }
        let cell = self.locate_or_create(address, layout);
        let written = super::write_value(cell, value);
        if written {
            self.modified = true;
        }
        written
    }
}
