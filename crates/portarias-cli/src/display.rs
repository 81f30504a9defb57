//! Terminal rendering: result tables, record cards and footers.
//!
//! Everything renders to a `String` so the output can be checked in tests;
//! `main` prints it.

use std::fmt::Write;

use chrono::NaiveDate;
use portarias_core::catalog::{LINK_COLUMNS, MISSING_VALUE, OutputColumn};
use portarias_core::export::cell_value;
use portarias_core::filter::FacetOptions;
use portarias_core::session::{DisplayMode, View};
use portarias_core::{ColumnCatalog, Record, Status, StatusLabels, status};

/// Cells wider than this are cut with an ellipsis.
const MAX_CELL_WIDTH: usize = 40;

// ── Card section groupings ──

const IDENTITY: &[&str] = &[
    "portaria",
    "n_autorizacao",
    "tipo",
    "regimento_normativo",
    "enquadramento_in",
    "processo",
    "anexo",
];

const DATES: &[&str] = &[
    "ano",
    "data_publicacao_dou",
    "prazo_validade",
    "data_expiracao",
];

const PROJECT: &[&str] = &[
    "empreendedor",
    "empreendimento",
    "projeto",
    "apoio_institucional",
];

const PEOPLE: &[&str] = &["arqueologos_coordenadores", "arqueologos_campo"];

const COVERAGE: &[&str] = &["municipios_abrangencias", "estados_abrangencias"];

const RECTIFICATION: &[&str] = &["retificado", "quantidade_retificado_dou"];

const TIMESTAMPS: &[&str] = &["updated_at"];

// ── Tables ──

/// Render rows as an aligned, pipe-separated table.
pub fn render_table(
    rows: &[&Record],
    columns: &[OutputColumn<'_>],
    today: NaiveDate,
    labels: &StatusLabels,
) -> String {
    if columns.is_empty() {
        return "(no columns selected)\n".to_string();
    }

    let header: Vec<String> = columns.iter().map(|c| truncate(c.name())).collect();
    let body: Vec<Vec<String>> = rows
        .iter()
        .map(|r| {
            columns
                .iter()
                .map(|&c| truncate(&cell_value(r, c, today, labels)))
                .collect()
        })
        .collect();

    let mut widths: Vec<usize> = header.iter().map(|h| h.chars().count()).collect();
    for row in &body {
        for (w, cell) in widths.iter_mut().zip(row) {
            *w = (*w).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    push_table_row(&mut out, &header, &widths);
    let rule: Vec<String> = widths.iter().map(|&w| "-".repeat(w)).collect();
    push_table_row(&mut out, &rule, &widths);
    for row in &body {
        push_table_row(&mut out, row, &widths);
    }
    out
}

fn push_table_row(out: &mut String, cells: &[String], widths: &[usize]) {
    let padded: Vec<String> = cells
        .iter()
        .zip(widths)
        .map(|(cell, &w)| pad(cell, w))
        .collect();
    let _ = writeln!(out, "{}", padded.join(" | ").trim_end());
}

/// Left-align `text` in `width` characters (counting chars, not bytes).
fn pad(text: &str, width: usize) -> String {
    let len = text.chars().count();
    format!("{text}{}", " ".repeat(width.saturating_sub(len)))
}

fn truncate(text: &str) -> String {
    let single_line = text.replace(['\n', '\r'], " ");
    if single_line.chars().count() <= MAX_CELL_WIDTH {
        return single_line;
    }
    let cut: String = single_line.chars().take(MAX_CELL_WIDTH - 3).collect();
    format!("{cut}...")
}

/// Footer under a result table.
pub fn render_footer(view: &View<'_>, query: Option<&str>) -> String {
    let mut out = format!(
        "Mostrando {} de {} registros",
        view.rows.len(),
        view.total
    );
    if let Some(q) = query {
        let _ = write!(out, " para '{q}'");
    }
    match view.mode {
        DisplayMode::Filtered => {
            let _ = write!(
                out,
                " ({} encontrados, página {} de {})",
                view.matched, view.page, view.total_pages
            );
        }
        DisplayMode::Recent => {
            out.push_str(" (publicações mais recentes vigentes; use --more para ver mais)");
        }
        DisplayMode::RecentExpanded => {
            out.push_str(" (vigentes da publicação mais recente)");
        }
    }
    out.push('\n');
    out
}

// ── Cards ──

/// Render one record as a vertical card grouped by section.
pub fn render_card(
    record: &Record,
    catalog: &ColumnCatalog,
    today: NaiveDate,
    labels: &StatusLabels,
) -> String {
    let mut out = String::new();
    let title = record.title().unwrap_or(MISSING_VALUE);
    let current = status(record, today);
    let _ = writeln!(out, "=== {title} (id {}) ===", record.id);
    let _ = writeln!(out, "{}", labels.label(current));
    out.push('\n');

    push_section(&mut out, record, "Identificação", IDENTITY);
    push_section(&mut out, record, "Datas", DATES);
    push_section(&mut out, record, "Empreendimento", PROJECT);
    push_section(&mut out, record, "Arqueólogos", PEOPLE);
    push_section(&mut out, record, "Abrangência", COVERAGE);
    push_section(&mut out, record, "Retificações", RECTIFICATION);
    push_section(&mut out, record, "Links", LINK_COLUMNS);
    push_section(&mut out, record, "Registro", TIMESTAMPS);

    // Catalog columns the sections above do not place, including unmodelled ones.
    let grouped = [
        IDENTITY,
        DATES,
        PROJECT,
        PEOPLE,
        COVERAGE,
        RECTIFICATION,
        LINK_COLUMNS,
        TIMESTAMPS,
    ];
    let mut others: Vec<&str> = Vec::new();
    for id in catalog
        .columns()
        .iter()
        .map(|c| c.id.as_str())
        .chain(record.extra.keys().map(String::as_str))
    {
        if !grouped.iter().any(|g| g.contains(&id)) && !others.contains(&id) {
            others.push(id);
        }
    }
    push_section(&mut out, record, "Outros", &others);

    if current == Status::Revoked {
        let _ = writeln!(out, "Nota: revogação tem precedência sobre a data de expiração.");
    }
    out
}

fn push_section(out: &mut String, record: &Record, header: &str, cols: &[&str]) {
    let values: Vec<(&str, String)> = cols
        .iter()
        .filter_map(|&col| {
            let v = record.field(col)?;
            let v = v.trim();
            (!v.is_empty()).then(|| (col, v.to_string()))
        })
        .collect();
    if values.is_empty() {
        return;
    }

    let _ = writeln!(out, "{header}");
    for (col, value) in values {
        if LINK_COLUMNS.contains(&col) && value.contains(',') {
            let _ = writeln!(out, "  {col}:");
            for link in value.split(',').map(str::trim).filter(|l| !l.is_empty()) {
                let _ = writeln!(out, "    {link}");
            }
        } else {
            let _ = writeln!(out, "  {col:<28} {value}");
        }
    }
    out.push('\n');
}

// ── Misc listings ──

pub fn render_columns(catalog: &ColumnCatalog, selected: &[String]) -> String {
    let mut out = String::new();
    let mark = |id: &str| if selected.iter().any(|s| s == id) { "x" } else { " " };
    let _ = writeln!(
        out,
        "[{}] {:<28} {}",
        mark(portarias_core::STATUS_COLUMN_ID),
        portarias_core::STATUS_COLUMN_ID,
        portarias_core::catalog::STATUS_COLUMN_NAME
    );
    for column in catalog.columns() {
        let _ = writeln!(out, "[{}] {:<28} {}", mark(&column.id), column.id, column.name);
    }
    out
}

pub fn render_facet_options(options: &FacetOptions) -> String {
    let mut out = String::new();
    for value in &options.values {
        let _ = writeln!(out, "{value}");
    }
    if options.has_missing {
        let _ = writeln!(out, "{}  (campo vazio)", portarias_core::filter::NULL_SENTINEL);
    }
    out
}

pub fn render_status_options(
    counts: &std::collections::BTreeMap<Status, usize>,
    labels: &StatusLabels,
) -> String {
    let mut out = String::new();
    for s in Status::ALL {
        let n = counts.get(&s).copied().unwrap_or(0);
        let _ = writeln!(out, "{:<20} {:<24} {n}", s.key(), labels.label(s));
    }
    out
}
