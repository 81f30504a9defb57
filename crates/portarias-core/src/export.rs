//! CSV projection of a record set.
//!
//! Every cell, header included, is wrapped in double quotes with embedded
//! quotes doubled (RFC 4180 quoting). Cells are separated by `,` and rows end
//! with `\n`.

use std::borrow::Cow;

use chrono::NaiveDate;
use thiserror::Error;

use crate::catalog::{ColumnCatalog, MISSING_VALUE, OutputColumn};
use crate::record::Record;
use crate::status::{StatusLabels, status};

const DELIMITER: char = ',';

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExportError {
    #[error("there are no records to export")]
    Empty,

    #[error("no known columns selected for export")]
    NoColumns,
}

/// Quote one CSV cell.
pub fn quote_cell(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        if c == '"' {
            out.push('"');
        }
        out.push(c);
    }
    out.push('"');
    out
}

/// Text of one output cell: computed status, raw field value, or the
/// placeholder when the field is absent or empty.
pub fn cell_value<'r>(
    record: &'r Record,
    column: OutputColumn<'_>,
    today: NaiveDate,
    labels: &StatusLabels,
) -> Cow<'r, str> {
    match column {
        OutputColumn::Status => Cow::Owned(labels.label(status(record, today)).to_string()),
        OutputColumn::Field(c) => match record.field(&c.id) {
            Some(v) if !v.is_empty() => v,
            _ => Cow::Borrowed(MISSING_VALUE),
        },
    }
}

/// Render `records` as CSV with the selected columns.
///
/// Column order follows [`ColumnCatalog::arrange`]: status first, then
/// catalog order.
pub fn to_csv<S: AsRef<str>>(
    records: &[&Record],
    selected: &[S],
    catalog: &ColumnCatalog,
    today: NaiveDate,
    labels: &StatusLabels,
) -> Result<String, ExportError> {
    if records.is_empty() {
        return Err(ExportError::Empty);
    }
    let columns = catalog.arrange(selected);
    if columns.is_empty() {
        return Err(ExportError::NoColumns);
    }

    let mut out = String::new();
    push_row(&mut out, columns.iter().map(|c| Cow::Borrowed(c.name())));
    for record in records {
        push_row(
            &mut out,
            columns
                .iter()
                .map(|&c| cell_value(record, c, today, labels)),
        );
    }
    tracing::info!(
        rows = records.len(),
        columns = columns.len(),
        bytes = out.len(),
        "rendered csv export"
    );
    Ok(out)
}

fn push_row<'a>(out: &mut String, cells: impl Iterator<Item = Cow<'a, str>>) {
    for (i, cell) in cells.enumerate() {
        if i > 0 {
            out.push(DELIMITER);
        }
        out.push_str(&quote_cell(&cell));
    }
    out.push('\n');
}
