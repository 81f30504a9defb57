//! Property tests for the normaliser, search, pagination, status and CSV
//! quoting.

use chrono::NaiveDate;
use portarias_core::export::quote_cell;
use portarias_core::page::total_pages;
use portarias_core::{
    FilterState, Record, Status, filter_by_facets, normalize, paginate, search, status,
};
use proptest::prelude::*;

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 1, 1).unwrap()
}

fn text() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9 áéíóúâêôãõçÁÉÍÓÚÂÊÔÃÕÇ/.,\"-]{0,24}"
}

fn record_strategy() -> impl Strategy<Value = Record> {
    (
        any::<i64>(),
        prop::option::of(text()),
        prop::option::of(text()),
        prop::option::of(prop_oneof![
            text(),
            (1u32..=31, 1u32..=12, 1990i32..=2100)
                .prop_map(|(d, m, y)| format!("{d:02}/{m:02}/{y:04}")),
        ]),
        prop::option::of(text()),
        prop::option::of("[0-9]{1,2}"),
        prop::option::of(text()),
    )
        .prop_map(
            |(id, tipo, projeto, data_expiracao, link_revogado_dou, qtd, ultimo)| Record {
                id,
                tipo,
                projeto,
                data_expiracao,
                link_revogado_dou,
                quantidade_retificado_dou: qtd,
                ultimo_link_retificado_dou: ultimo,
                ..Default::default()
            },
        )
}

/// Undo `quote_cell`.
fn unquote(cell: &str) -> Option<String> {
    let inner = cell.strip_prefix('"')?.strip_suffix('"')?;
    Some(inner.replace("\"\"", "\""))
}

proptest! {
    #[test]
    fn normalize_is_idempotent(s in text()) {
        let once = normalize(&s);
        prop_assert_eq!(normalize(&once), once);
    }

    #[test]
    fn normalize_ignores_case(s in text()) {
        prop_assert_eq!(normalize(&s.to_uppercase()), normalize(&s.to_lowercase()));
    }

    #[test]
    fn empty_search_is_identity(records in prop::collection::vec(record_strategy(), 0..30)) {
        let found = search(&records, "");
        prop_assert_eq!(found.len(), records.len());
        for (a, b) in found.iter().zip(records.iter()) {
            prop_assert!(std::ptr::eq(*a, b));
        }
    }

    #[test]
    fn search_results_are_a_subsequence(
        records in prop::collection::vec(record_strategy(), 0..30),
        query in text(),
    ) {
        let found = search(&records, &query);
        prop_assert!(found.len() <= records.len());
        let mut it = records.iter();
        for hit in found {
            prop_assert!(it.any(|r| std::ptr::eq(r, hit)));
        }
    }

    #[test]
    fn pages_partition_the_input(len in 0usize..500, page_size in 1usize..60) {
        let items: Vec<usize> = (0..len).collect();
        let pages = total_pages(len, page_size);
        prop_assert_eq!(pages, len.div_ceil(page_size).max(1));

        let mut seen = Vec::new();
        for page in 1..=pages {
            let window = paginate(&items, page_size, page).unwrap();
            prop_assert!(window.items.len() <= page_size);
            seen.extend_from_slice(window.items);
        }
        prop_assert_eq!(&seen, &items);
        prop_assert!(paginate(&items, page_size, pages + 1).is_err());
    }

    #[test]
    fn status_never_fails(record in record_strategy()) {
        let s = status(&record, today());
        prop_assert!(Status::ALL.contains(&s));
    }

    #[test]
    fn status_facet_keeps_exactly_matching(
        records in prop::collection::vec(record_strategy(), 0..60),
        which in prop::sample::select(Status::ALL.to_vec()),
    ) {
        let state = FilterState { status: Some(which), ..Default::default() };
        let kept = filter_by_facets(&records, &state, today());
        let expected = records.iter().filter(|r| status(r, today()) == which).count();
        prop_assert_eq!(kept.len(), expected);
        prop_assert!(kept.iter().all(|r| status(r, today()) == which));
    }

    #[test]
    fn csv_quoting_round_trips(s in ".*") {
        let quoted = quote_cell(&s);
        prop_assert_eq!(unquote(&quoted), Some(s.clone()));
    }
}

#[test]
fn expired_facet_over_hundred_records() {
    let records: Vec<Record> = (0..100)
        .map(|i| Record {
            id: i,
            data_expiracao: Some(if i % 10 < 3 {
                "01/06/2024".to_string()
            } else {
                "31/12/2099".to_string()
            }),
            ..Default::default()
        })
        .collect();
    let state = FilterState {
        status: Some(Status::Expired),
        ..Default::default()
    };
    let kept = filter_by_facets(&records, &state, today());
    assert_eq!(kept.len(), 30);
    assert!(kept.iter().all(|r| status(r, today()) == Status::Expired));
}
