//! Query-handle bookkeeping and result types.

use casdb_protocol::{ColumnMeta, ResultPage};

/// Client-side record of one open server result set.
///
/// Created on a successful execute, advanced only by fetch, removed on an
/// acknowledged close-query or session teardown. `current_row` never
/// exceeds `total_rows`.
#[derive(Debug, Clone)]
pub struct QueryHandle {
    id: i32,
    total_rows: i32,
    current_row: i32,
    columns: Vec<ColumnMeta>,
    last_page: ResultPage,
}

impl QueryHandle {
    pub(crate) fn new(
        id: i32,
        total_rows: i32,
        columns: Vec<ColumnMeta>,
        first_page: ResultPage,
    ) -> Self {
        let current_row = (first_page.tuple_count() as i32).min(total_rows);
        Self {
            id,
            total_rows,
            current_row,
            columns,
            last_page: first_page,
        }
    }

    pub fn id(&self) -> i32 {
        self.id
    }

    pub fn total_rows(&self) -> i32 {
        self.total_rows
    }

    pub fn current_row(&self) -> i32 {
        self.current_row
    }

    pub fn columns(&self) -> &[ColumnMeta] {
        &self.columns
    }

    pub fn last_page(&self) -> &ResultPage {
        &self.last_page
    }

    /// Whether every tuple has been consumed.
    pub fn exhausted(&self) -> bool {
        self.current_row >= self.total_rows
    }

    /// First row of the next page, 1-based.
    pub(crate) fn next_start_row(&self) -> i32 {
        self.current_row + 1
    }

    /// Records a fetched page, advancing the cursor by its tuple count.
    pub(crate) fn advance(&mut self, page: ResultPage) {
        self.current_row =
            (self.current_row + page.tuple_count() as i32).min(self.total_rows);
        self.last_page = page;
    }
}

/// The first page of a query, as returned to the caller.
///
/// `handle` is `None` for cache hits: a cached result cannot be fetched
/// further (the cache is meant for small result sets).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryResult {
    pub handle: Option<i32>,
    pub total_rows: i32,
    pub columns: Vec<ColumnMeta>,
    pub page: ResultPage,
}
