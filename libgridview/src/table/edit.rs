/// The cell currently being edited.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EditCursor {
    /// Position in the working set.
    pub row: usize,
    pub field: String,
}

/// Single-slot edit state: idle or editing one cell.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditState {
    cursor: Option<EditCursor>,
}

impl EditState {
    /// Starts editing a cell. Returns the cursor that was abandoned, if any.
    ///
    /// Abandoning does not commit; values already written stay in the working set.
    pub fn begin(&mut self, row: usize, field: impl Into<String>) -> Option<EditCursor> {
        self.cursor.replace(EditCursor {
            row,
            field: field.into(),
        })
    }

    /// Ends editing and returns the cell to commit.
    pub fn finish(&mut self) -> Option<EditCursor> {
        self.cursor.take()
    }

    #[must_use]
    pub fn cursor(&self) -> Option<&EditCursor> {
        self.cursor.as_ref()
    }

    #[must_use]
    pub fn is_editing(&self, row: usize, field: &str) -> bool {
        self.cursor
            .as_ref()
            .is_some_and(|cursor| cursor.row == row && cursor.field == field)
    }
}
