//! Assembly of the outgoing query from the current inputs and cursor.
//!
//! This is the one place where "no filter" is decided: blank text and the
//! `all` status sentinel become `None` here and nowhere else.

use super::cursor::Cursor;
use super::params::{QueryParams, StatusFilter};

/// Settled value of every filter control, stored exactly as entered.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterInputs {
    pub account_uuid: String,
    pub search: String,
    pub workflow_title: String,
    pub status: StatusFilter,
}

impl FilterInputs {
    pub fn is_empty(&self) -> bool {
        assemble(self, &Cursor::default()) == QueryParams::default()
    }
}

/// Build the query for the given inputs. Pure and deterministic.
pub fn assemble(filters: &FilterInputs, cursor: &Cursor) -> QueryParams {
    QueryParams {
        page: cursor.page.max(1),
        page_size: cursor.page_size,
        sort_field: cursor.sort_field,
        sort_direction: cursor.sort_direction,
        account_uuid: present(&filters.account_uuid),
        status: filters.status.status(),
        search: present(&filters.search),
        workflow_title: present(&filters.workflow_title),
    }
}

fn present(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}
