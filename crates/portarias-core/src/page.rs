//! Pagination window and the "recent & current" view.

use std::cmp::Reverse;

use chrono::NaiveDate;
use thiserror::Error;

use crate::dates::parse_br_date;
use crate::record::Record;
use crate::status::{Status, status};

pub const DEFAULT_PAGE_SIZE: usize = 50;

/// Number of rows in the recent & current view.
pub const RECENT_COUNT: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PageError {
    #[error("page {requested} is out of range; choose a page between 1 and {total_pages}")]
    OutOfRange { requested: usize, total_pages: usize },

    #[error("page size must be at least 1")]
    ZeroPageSize,
}

/// Number of pages needed for `total_items`; never less than 1.
pub fn total_pages(total_items: usize, page_size: usize) -> usize {
    if page_size == 0 {
        return 1;
    }
    total_items.div_ceil(page_size).max(1)
}

/// One page of a result set.
#[derive(Debug, PartialEq, Eq)]
pub struct Page<'a, T> {
    pub items: &'a [T],
    pub page: usize,
    pub total_pages: usize,
}

/// Slice page `page` (1-based) out of `items`.
///
/// The page must already be within `1..=total_pages`; this function does not
/// clamp.
pub fn paginate<T>(items: &[T], page_size: usize, page: usize) -> Result<Page<'_, T>, PageError> {
    if page_size == 0 {
        return Err(PageError::ZeroPageSize);
    }
    let total = total_pages(items.len(), page_size);
    if page == 0 || page > total {
        return Err(PageError::OutOfRange {
            requested: page,
            total_pages: total,
        });
    }
    let start = ((page - 1) * page_size).min(items.len());
    let end = (start + page_size).min(items.len());
    Ok(Page {
        items: &items[start..end],
        page,
        total_pages: total,
    })
}

// ── Navigation state ──

/// Page size, current page and item count of the paginated view.
///
/// Keeps `1 <= current_page <= total_pages()` at all times.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaginationState {
    page_size: usize,
    current_page: usize,
    total_items: usize,
}

impl Default for PaginationState {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            current_page: 1,
            total_items: 0,
        }
    }
}

impl PaginationState {
    pub fn new(page_size: usize) -> Result<Self, PageError> {
        if page_size == 0 {
            return Err(PageError::ZeroPageSize);
        }
        Ok(Self {
            page_size,
            ..Self::default()
        })
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn current_page(&self) -> usize {
        self.current_page
    }

    pub fn total_items(&self) -> usize {
        self.total_items
    }

    pub fn total_pages(&self) -> usize {
        total_pages(self.total_items, self.page_size)
    }

    /// Record a new result size, pulling the current page back into range.
    pub fn set_total_items(&mut self, total_items: usize) {
        self.total_items = total_items;
        self.current_page = self.current_page.min(self.total_pages());
    }

    /// Jump to `page`. Out-of-range requests leave the state untouched.
    pub fn go_to(&mut self, page: usize) -> Result<(), PageError> {
        let total = self.total_pages();
        if page == 0 || page > total {
            return Err(PageError::OutOfRange {
                requested: page,
                total_pages: total,
            });
        }
        self.current_page = page;
        Ok(())
    }

    pub fn next(&mut self) -> Result<(), PageError> {
        self.go_to(self.current_page + 1)
    }

    pub fn previous(&mut self) -> Result<(), PageError> {
        self.go_to(self.current_page.saturating_sub(1))
    }

    /// Back to page 1 with no items, keeping the page size.
    pub fn reset(&mut self) {
        self.current_page = 1;
        self.total_items = 0;
    }

    /// Slice the current page out of `items`.
    pub fn window<'a, T>(&self, items: &'a [T]) -> Result<Page<'a, T>, PageError> {
        paginate(items, self.page_size, self.current_page)
    }
}

// ── Recent & current view ──

/// The `n` most recently published records that are `Current`, newest first.
///
/// Records without a parseable publication date sort after dated ones; ties
/// keep input order.
pub fn recent_current(records: &[Record], today: NaiveDate, n: usize) -> Vec<&Record> {
    let mut current: Vec<&Record> = records
        .iter()
        .filter(|r| status(r, today) == Status::Current)
        .collect();
    current.sort_by_key(|r| Reverse(publication_key(r)));
    current.truncate(n);
    current
}

/// Every `Current` record published on the most recent publication date in
/// the data set, in input order.
pub fn latest_publication_current(records: &[Record], today: NaiveDate) -> Vec<&Record> {
    let Some(latest) = records
        .iter()
        .filter_map(|r| r.publication_date().and_then(parse_br_date))
        .max()
    else {
        return Vec::new();
    };
    records
        .iter()
        .filter(|r| r.publication_date().and_then(parse_br_date) == Some(latest))
        .filter(|r| status(r, today) == Status::Current)
        .collect()
}

fn publication_key(record: &Record) -> Option<NaiveDate> {
    record.publication_date().and_then(parse_br_date)
}
