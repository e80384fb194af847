//! Query state for the accounts explorer: parameters, debounced inputs,
//! assembly, cursor policy and result state.

pub mod assembler;
pub mod cursor;
pub mod debounce;
pub mod params;
pub mod result_state;

pub use assembler::{FilterInputs, assemble};
pub use cursor::{Cursor, SortOutcome};
pub use debounce::{DEFAULT_QUIET_PERIOD, Debouncer};
pub use params::{
    ALLOWED_PAGE_SIZES, AccountStatus, PageSize, QueryParams, SortDirection, SortField,
    StatusFilter,
};
pub use result_state::{
    FailureKind, FetchFailure, Phase, RequestId, ResultMachine, ResultState, Settlement,
};
