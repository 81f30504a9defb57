//! Browsing session: record snapshot plus the user's filter, page and column
//! choices.
//!
//! With no predicate active the session shows the recent & current view;
//! setting any predicate switches to the filtered, paginated view on page 1,
//! and clearing them all switches back.

use chrono::NaiveDate;

use crate::catalog::{ColumnCatalog, DEFAULT_SELECTED, OutputColumn};
use crate::export::{ExportError, to_csv};
use crate::filter::{Facet, FacetValue, FilterState, apply};
use crate::page::{PageError, PaginationState, RECENT_COUNT, latest_publication_current, recent_current};
use crate::record::Record;
use crate::status::{Status, StatusLabels};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayMode {
    /// The most recently published records in force.
    Recent,
    /// Every record in force from the latest publication day ("show more").
    RecentExpanded,
    /// Filtered and paginated.
    Filtered,
}

/// What the session currently shows.
#[derive(Debug)]
pub struct View<'a> {
    pub mode: DisplayMode,
    pub rows: Vec<&'a Record>,
    /// Current page; always 1 outside [`DisplayMode::Filtered`].
    pub page: usize,
    pub total_pages: usize,
    /// Records matching the filter (or shown, in the recent modes).
    pub matched: usize,
    /// Size of the whole snapshot.
    pub total: usize,
}

pub struct Session {
    records: Vec<Record>,
    today: NaiveDate,
    filter: FilterState,
    pagination: PaginationState,
    expanded: bool,
    recent_count: usize,
    catalog: ColumnCatalog,
    labels: StatusLabels,
    selected: Vec<String>,
}

impl Session {
    pub fn new(records: Vec<Record>, today: NaiveDate) -> Self {
        Self {
            records,
            today,
            filter: FilterState::default(),
            pagination: PaginationState::default(),
            expanded: false,
            recent_count: RECENT_COUNT,
            catalog: ColumnCatalog::default(),
            labels: StatusLabels::default(),
            selected: DEFAULT_SELECTED.iter().map(|s| s.to_string()).collect(),
        }
    }

    // ── Configuration ──

    pub fn with_catalog(mut self, catalog: ColumnCatalog) -> Self {
        self.catalog = catalog;
        self
    }

    pub fn with_labels(mut self, labels: StatusLabels) -> Self {
        self.labels = labels;
        self
    }

    pub fn with_page_size(mut self, page_size: usize) -> Result<Self, PageError> {
        self.pagination = PaginationState::new(page_size)?;
        self.refresh();
        Ok(self)
    }

    pub fn with_recent_count(mut self, n: usize) -> Self {
        self.recent_count = n;
        self
    }

    // ── Accessors ──

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn today(&self) -> NaiveDate {
        self.today
    }

    pub fn filter(&self) -> &FilterState {
        &self.filter
    }

    pub fn pagination(&self) -> &PaginationState {
        &self.pagination
    }

    pub fn catalog(&self) -> &ColumnCatalog {
        &self.catalog
    }

    pub fn labels(&self) -> &StatusLabels {
        &self.labels
    }

    pub fn selected_columns(&self) -> &[String] {
        &self.selected
    }

    /// Selected columns in display order.
    pub fn columns(&self) -> Vec<OutputColumn<'_>> {
        self.catalog.arrange(&self.selected)
    }

    pub fn find(&self, id: i64) -> Option<&Record> {
        self.records.iter().find(|r| r.id == id)
    }

    pub fn mode(&self) -> DisplayMode {
        if self.filter.is_active() {
            DisplayMode::Filtered
        } else if self.expanded {
            DisplayMode::RecentExpanded
        } else {
            DisplayMode::Recent
        }
    }

    // ── Filter changes ──

    /// Set the free-text query. An empty query with no facets returns to the
    /// recent view.
    pub fn set_query(&mut self, query: &str) {
        self.filter.query = Some(query.to_string()).filter(|q| !q.trim().is_empty());
        self.on_filter_changed();
    }

    pub fn set_facet(&mut self, facet: Facet, value: Option<FacetValue>) {
        self.filter.set_facet(facet, value);
        self.on_filter_changed();
    }

    pub fn set_status(&mut self, status: Option<Status>) {
        self.filter.status = status;
        self.on_filter_changed();
    }

    /// Replace the whole filter state at once.
    pub fn set_filter(&mut self, filter: FilterState) {
        self.filter = filter;
        self.on_filter_changed();
    }

    pub fn clear_filters(&mut self) {
        self.filter.clear();
        self.on_filter_changed();
    }

    /// "Show more" in the recent view. No effect while filtering.
    pub fn expand_recent(&mut self) {
        self.expanded = true;
    }

    // ── Columns ──

    /// Toggle a column; unknown ids are ignored. Returns whether the column
    /// is now selected.
    pub fn toggle_column(&mut self, id: &str) -> bool {
        if !self.catalog.is_known(id) {
            return false;
        }
        if let Some(pos) = self.selected.iter().position(|s| s == id) {
            self.selected.remove(pos);
            false
        } else {
            self.selected.push(id.to_string());
            true
        }
    }

    pub fn select_columns<S: AsRef<str>>(&mut self, ids: &[S]) {
        self.selected = ids
            .iter()
            .map(|s| s.as_ref().to_string())
            .filter(|s| self.catalog.is_known(s))
            .collect();
    }

    // ── Paging ──

    pub fn go_to_page(&mut self, page: usize) -> Result<(), PageError> {
        self.pagination.go_to(page)
    }

    pub fn next_page(&mut self) -> Result<(), PageError> {
        self.pagination.next()
    }

    pub fn previous_page(&mut self) -> Result<(), PageError> {
        self.pagination.previous()
    }

    // ── Views ──

    /// Records matching the current filter, unpaginated.
    pub fn filtered(&self) -> Vec<&Record> {
        apply(&self.records, &self.filter, self.today)
    }

    pub fn displayed(&self) -> View<'_> {
        let total = self.records.len();
        match self.mode() {
            DisplayMode::Filtered => {
                let filtered = self.filtered();
                let matched = filtered.len();
                let (rows, page, total_pages) = match self.pagination.window(&filtered) {
                    Ok(window) => (window.items.to_vec(), window.page, window.total_pages),
                    Err(err) => {
                        tracing::warn!(%err, "pagination out of sync with results");
                        (Vec::new(), 1, 1)
                    }
                };
                View {
                    mode: DisplayMode::Filtered,
                    rows,
                    page,
                    total_pages,
                    matched,
                    total,
                }
            }
            mode => {
                let rows = if mode == DisplayMode::RecentExpanded {
                    latest_publication_current(&self.records, self.today)
                } else {
                    recent_current(&self.records, self.today, self.recent_count)
                };
                View {
                    mode,
                    matched: rows.len(),
                    rows,
                    page: 1,
                    total_pages: 1,
                    total,
                }
            }
        }
    }

    /// CSV of the filtered set (or the whole snapshot with `all`).
    pub fn export_csv(&self, all: bool) -> Result<String, ExportError> {
        let rows: Vec<&Record> = if all {
            self.records.iter().collect()
        } else {
            self.filtered()
        };
        to_csv(&rows, &self.selected, &self.catalog, self.today, &self.labels)
    }

    fn on_filter_changed(&mut self) {
        if self.filter.is_active() {
            self.refresh();
            self.pagination.go_to(1).ok();
        } else {
            self.pagination.reset();
            self.expanded = false;
        }
    }

    fn refresh(&mut self) {
        let matched = if self.filter.is_active() {
            self.filtered().len()
        } else {
            0
        };
        self.pagination.set_total_items(matched);
    }
}
