//! Page/sort cursor and the rules that reset it.
//!
//! Filter changes always send the user back to page 1. Paging and sorting
//! are independent axes: moving between pages keeps the sort, and sorting
//! keeps the page.

use super::params::{PageSize, SortDirection, SortField};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Cursor {
    /// 1-based page index as the server expects it
    pub page: u32,
    pub page_size: PageSize,
    pub sort_field: SortField,
    pub sort_direction: SortDirection,
}

impl Default for Cursor {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: PageSize::DEFAULT,
            sort_field: SortField::default(),
            sort_direction: SortDirection::default(),
        }
    }
}

/// Result of feeding a sort gesture to the cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOutcome {
    /// No direction or no column: nothing changed, nothing to fetch
    Ignored,
    /// Sort applied; `fell_back` is set when the column was not sortable
    Applied { field: SortField, fell_back: bool },
}

impl Cursor {
    pub fn with_page_size(page_size: PageSize) -> Self {
        Self {
            page_size,
            ..Self::default()
        }
    }

    /// A filter or search input changed.
    pub fn on_filter_change(&mut self) {
        self.page = 1;
    }

    /// Paging control moved to `index` (0-based) with page size `size`.
    ///
    /// A new, allowed page size restarts at page 1. A size outside the
    /// allowed set is ignored and the index is honoured.
    pub fn navigate(&mut self, index: u32, size: u32) {
        match PageSize::new(size) {
            Some(new_size) if new_size != self.page_size => {
                self.page_size = new_size;
                self.page = 1;
            }
            _ => {
                self.page = index.saturating_add(1);
            }
        }
    }

    /// Apply a sort gesture from a column header.
    pub fn apply_sort(&mut self, column: &str, direction: Option<SortDirection>) -> SortOutcome {
        let direction = match direction {
            Some(direction) if !column.trim().is_empty() => direction,
            _ => return SortOutcome::Ignored,
        };

        let (field, fell_back) = match SortField::from_column(column) {
            Some(field) => (field, false),
            None => (SortField::default(), true),
        };

        self.sort_field = field;
        self.sort_direction = direction;
        SortOutcome::Applied { field, fell_back }
    }

    /// Clear-filters: back to the first page, size and sort kept.
    pub fn on_clear(&mut self) {
        self.page = 1;
    }
}
