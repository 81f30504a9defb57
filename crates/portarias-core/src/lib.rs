//! Core of portarias: record model, status derivation, search/filter engine,
//! pagination and CSV export over an in-memory snapshot.

pub mod catalog;
pub mod dates;
pub mod export;
pub mod filter;
pub mod normalize;
pub mod page;
pub mod record;
pub mod session;
pub mod status;

pub use catalog::{Column, ColumnCatalog, OutputColumn, STATUS_COLUMN_ID};
pub use export::{ExportError, to_csv};
pub use filter::{Facet, FacetOptions, FacetValue, FilterState, apply, filter_by_facets, search};
pub use normalize::normalize;
pub use page::{Page, PageError, PaginationState, paginate};
pub use record::Record;
pub use session::{DisplayMode, Session, View};
pub use status::{Status, StatusLabels, StatusParseError, status};
