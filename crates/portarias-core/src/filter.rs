//! Free-text search and facet filtering over the in-memory record set.
//!
//! Both stages borrow from the snapshot and return references, so they
//! compose without cloning records:
//!
//! ```ignore
//! let hits = filter_by_facets(search(&records, "campo"), &state, today);
//! ```

use std::collections::BTreeMap;
use std::fmt;

use chrono::NaiveDate;

use crate::normalize::{is_blank, normalize, normalize_opt};
use crate::record::Record;
use crate::status::{Status, status};

/// Facet value meaning "field is empty or absent".
pub const NULL_SENTINEL: &str = "NULL";

/// Columns concatenated into the search haystack, in order.
pub const SEARCH_FIELDS: &[&str] = &[
    "portaria",
    "data_publicacao_dou",
    "processo",
    "empreendedor",
    "empreendimento",
    "projeto",
    "arqueologos_coordenadores",
    "arqueologos_campo",
    "apoio_institucional",
    "municipios_abrangencias",
    "estados_abrangencias",
    "tipo",
];

// ── Filter state ──

/// Value of an exact-match facet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FacetValue {
    /// Field must be empty or absent.
    Missing,
    /// Field must equal this value after normalisation.
    Equals(String),
}

impl FacetValue {
    /// Parse a user-supplied facet value; `NULL` selects missing fields.
    pub fn parse(text: &str) -> Self {
        if text.trim() == NULL_SENTINEL {
            FacetValue::Missing
        } else {
            FacetValue::Equals(text.to_string())
        }
    }

    fn matches(&self, field: Option<&str>) -> bool {
        match self {
            FacetValue::Missing => is_blank(field),
            FacetValue::Equals(want) => normalize_opt(field) == normalize(want),
        }
    }
}

impl fmt::Display for FacetValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FacetValue::Missing => f.write_str(NULL_SENTINEL),
            FacetValue::Equals(v) => f.write_str(v),
        }
    }
}

/// The exact-match facets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Facet {
    Year,
    Title,
    Type,
    Regulation,
}

impl Facet {
    pub const ALL: [Facet; 4] = [Facet::Year, Facet::Title, Facet::Type, Facet::Regulation];

    fn value_of(self, record: &Record) -> Option<std::borrow::Cow<'_, str>> {
        match self {
            Facet::Year => record.year(),
            Facet::Title => record.title().map(Into::into),
            Facet::Type => record.kind().map(Into::into),
            Facet::Regulation => record.regulation().map(Into::into),
        }
    }
}

/// Independent optional predicates, combined with AND.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterState {
    pub query: Option<String>,
    pub year: Option<FacetValue>,
    pub title: Option<FacetValue>,
    pub kind: Option<FacetValue>,
    pub regulation: Option<FacetValue>,
    pub status: Option<Status>,
}

impl FilterState {
    /// The query, if it has any content after normalisation.
    pub fn effective_query(&self) -> Option<&str> {
        self.query
            .as_deref()
            .filter(|q| !normalize(q).is_empty())
    }

    pub fn facet(&self, facet: Facet) -> Option<&FacetValue> {
        match facet {
            Facet::Year => self.year.as_ref(),
            Facet::Title => self.title.as_ref(),
            Facet::Type => self.kind.as_ref(),
            Facet::Regulation => self.regulation.as_ref(),
        }
    }

    pub fn set_facet(&mut self, facet: Facet, value: Option<FacetValue>) {
        let slot = match facet {
            Facet::Year => &mut self.year,
            Facet::Title => &mut self.title,
            Facet::Type => &mut self.kind,
            Facet::Regulation => &mut self.regulation,
        };
        *slot = value;
    }

    /// Whether any facet predicate (not counting the query) is set.
    pub fn has_facets(&self) -> bool {
        Facet::ALL.iter().any(|&f| self.facet(f).is_some()) || self.status.is_some()
    }

    /// Whether any predicate at all constrains the result.
    pub fn is_active(&self) -> bool {
        self.effective_query().is_some() || self.has_facets()
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

// ── Engine ──

/// Searchable text of a record: the search fields joined by one space,
/// skipping absent and empty ones, then normalised.
pub fn haystack(record: &Record) -> String {
    let joined = SEARCH_FIELDS
        .iter()
        .filter_map(|id| record.field(id))
        .filter(|v| !v.is_empty())
        .collect::<Vec<_>>()
        .join(" ");
    normalize(&joined)
}

/// Keep records whose haystack contains the normalised query as a substring.
///
/// A query that normalises to empty keeps everything, in input order.
pub fn search<'a, I>(records: I, query: &str) -> Vec<&'a Record>
where
    I: IntoIterator<Item = &'a Record>,
{
    let needle = normalize(query);
    if needle.is_empty() {
        return records.into_iter().collect();
    }
    records
        .into_iter()
        .filter(|r| haystack(r).contains(&needle))
        .collect()
}

/// Apply the facet predicates of `state` (the query is ignored here).
pub fn filter_by_facets<'a, I>(records: I, state: &FilterState, today: NaiveDate) -> Vec<&'a Record>
where
    I: IntoIterator<Item = &'a Record>,
{
    let exact: Vec<(Facet, &FacetValue)> = Facet::ALL
        .iter()
        .filter_map(|&f| state.facet(f).map(|v| (f, v)))
        .collect();

    records
        .into_iter()
        .filter(|r| {
            exact
                .iter()
                .all(|(facet, value)| value.matches(facet.value_of(r).as_deref()))
        })
        .filter(|r| state.status.is_none_or(|want| status(r, today) == want))
        .collect()
}

/// Search, then facets.
pub fn apply<'a>(records: &'a [Record], state: &FilterState, today: NaiveDate) -> Vec<&'a Record> {
    let searched = search(records, state.query.as_deref().unwrap_or_default());
    let filtered = filter_by_facets(searched, state, today);
    tracing::debug!(
        total = records.len(),
        matched = filtered.len(),
        "applied filter state"
    );
    filtered
}

// ── Facet options ──

/// Distinct values available for a facet.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FacetOptions {
    /// Distinct non-empty values, first spelling seen wins.
    pub values: Vec<String>,
    /// Whether some record leaves the field empty (offer `NULL`).
    pub has_missing: bool,
}

/// Collect the choices a front end can offer for `facet`.
///
/// Values are deduplicated and ordered by normalised form; years are listed
/// newest first.
pub fn facet_options(records: &[Record], facet: Facet) -> FacetOptions {
    let mut seen: BTreeMap<String, String> = BTreeMap::new();
    let mut has_missing = false;
    for record in records {
        match facet.value_of(record) {
            Some(v) if !v.trim().is_empty() => {
                seen.entry(normalize(&v))
                    .or_insert_with(|| v.trim().to_string());
            }
            _ => has_missing = true,
        }
    }
    let mut values: Vec<String> = seen.into_values().collect();
    if facet == Facet::Year {
        values.reverse();
    }
    FacetOptions {
        values,
        has_missing,
    }
}

/// Count of records per status.
pub fn status_counts(records: &[Record], today: NaiveDate) -> BTreeMap<Status, usize> {
    let mut counts = BTreeMap::new();
    for record in records {
        *counts.entry(status(record, today)).or_insert(0) += 1;
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, 1).unwrap()
    }

    fn sample() -> Vec<Record> {
        vec![
            Record {
                id: 1,
                portaria: Some("Portaria nº 10".into()),
                ano: Some("2024".into()),
                tipo: Some("Autorização".into()),
                regimento_normativo: Some("IN 01/2015".into()),
                arqueologos_campo: Some("Ana Souza".into()),
                municipios_abrangencias: Some("Municípios de Goiás".into()),
                data_expiracao: Some("31/12/2099".into()),
                ..Default::default()
            },
            Record {
                id: 2,
                portaria: Some("Portaria nº 11".into()),
                ano: Some("2023".into()),
                tipo: Some("Revogação".into()),
                link_revogado_dou: Some("http://x".into()),
                projeto: Some("Levantamento arqueológico".into()),
                data_expiracao: Some("01/01/2020".into()),
                ..Default::default()
            },
            Record {
                id: 3,
                portaria: Some("Portaria nº 12".into()),
                ano: Some("2024".into()),
                tipo: Some("autorizacao".into()),
                arqueologos_coordenadores: Some("José Lima".into()),
                data_expiracao: Some("01/01/2020".into()),
                ..Default::default()
            },
        ]
    }

    fn ids(records: &[&Record]) -> Vec<i64> {
        records.iter().map(|r| r.id).collect()
    }

    #[test]
    fn empty_query_is_identity() {
        let records = sample();
        assert_eq!(ids(&search(&records, "")), [1, 2, 3]);
        assert_eq!(ids(&search(&records, "   ")), [1, 2, 3]);
    }

    #[test]
    fn search_is_accent_insensitive_substring() {
        let records = sample();
        assert_eq!(ids(&search(&records, "municipios")), [1]);
        assert_eq!(ids(&search(&records, "ARQUEOLÓGICO")), [2]);
        assert_eq!(ids(&search(&records, "jose")), [3]);
        assert_eq!(ids(&search(&records, "souz")), [1]);
    }

    #[test]
    fn search_spans_joined_fields() {
        // Portaria title and project name are joined with a single space.
        let records = sample();
        assert_eq!(ids(&search(&records, "nº 11 levantamento")), [2]);
    }

    #[test]
    fn search_ignores_unsearched_columns() {
        let records = sample();
        assert!(search(&records, "IN 01/2015").is_empty());
    }

    #[test]
    fn haystack_skips_empty_fields() {
        let record = Record {
            portaria: Some("A".into()),
            data_publicacao_dou: Some("".into()),
            processo: Some("B".into()),
            ..Default::default()
        };
        assert_eq!(haystack(&record), "a b");
    }

    #[test]
    fn no_facets_returns_everything() {
        let records = sample();
        let state = FilterState::default();
        assert_eq!(ids(&filter_by_facets(&records, &state, today())), [1, 2, 3]);
        assert!(!state.is_active());
    }

    #[test]
    fn exact_facets_normalise_both_sides() {
        let records = sample();
        let state = FilterState {
            kind: Some(FacetValue::parse("AUTORIZAÇÃO")),
            ..Default::default()
        };
        assert_eq!(ids(&filter_by_facets(&records, &state, today())), [1, 3]);
    }

    #[test]
    fn exact_facet_is_not_substring() {
        let records = sample();
        let state = FilterState {
            title: Some(FacetValue::parse("Portaria nº 1")),
            ..Default::default()
        };
        assert!(filter_by_facets(&records, &state, today()).is_empty());
    }

    #[test]
    fn null_sentinel_selects_missing() {
        let records = sample();
        let state = FilterState {
            regulation: Some(FacetValue::parse("NULL")),
            ..Default::default()
        };
        assert_eq!(ids(&filter_by_facets(&records, &state, today())), [2, 3]);
    }

    #[test]
    fn facets_combine_with_and() {
        let records = sample();
        let state = FilterState {
            year: Some(FacetValue::parse("2024")),
            status: Some(Status::Expired),
            ..Default::default()
        };
        assert_eq!(ids(&filter_by_facets(&records, &state, today())), [3]);
    }

    #[test]
    fn status_facet() {
        let records = sample();
        let state = FilterState {
            status: Some(Status::Revoked),
            ..Default::default()
        };
        assert_eq!(ids(&filter_by_facets(&records, &state, today())), [2]);
    }

    #[test]
    fn apply_runs_search_then_facets() {
        let records = sample();
        let state = FilterState {
            query: Some("portaria".into()),
            year: Some(FacetValue::parse("2024")),
            ..Default::default()
        };
        assert_eq!(ids(&apply(&records, &state, today())), [1, 3]);
    }

    #[test]
    fn whitespace_query_is_inactive() {
        let state = FilterState {
            query: Some("  ".into()),
            ..Default::default()
        };
        assert!(!state.is_active());
        assert_eq!(state.effective_query(), None);
    }

    #[test]
    fn set_and_clear_facets() {
        let mut state = FilterState::default();
        state.set_facet(Facet::Regulation, Some(FacetValue::parse("IN 01/2015")));
        assert!(state.has_facets());
        assert!(state.is_active());
        state.clear();
        assert_eq!(state, FilterState::default());
    }

    #[test]
    fn facet_options_dedupe_by_normalised_form() {
        let records = sample();
        let types = facet_options(&records, Facet::Type);
        assert_eq!(types.values, ["Autorização", "Revogação"]);
        assert!(!types.has_missing);

        let regs = facet_options(&records, Facet::Regulation);
        assert_eq!(regs.values, ["IN 01/2015"]);
        assert!(regs.has_missing);
    }

    #[test]
    fn year_options_newest_first() {
        let records = sample();
        assert_eq!(facet_options(&records, Facet::Year).values, ["2024", "2023"]);
    }

    #[test]
    fn counts_per_status() {
        let records = sample();
        let counts = status_counts(&records, today());
        assert_eq!(counts.get(&Status::Current), Some(&1));
        assert_eq!(counts.get(&Status::Revoked), Some(&1));
        assert_eq!(counts.get(&Status::Expired), Some(&1));
    }
}
