use langrank_etl::core::reshape::{compare_years, normalize_history, normalize_top_n, widen_history};
use langrank_etl::core::RawTable;
use langrank_etl::domain::model::HistoryRow;
use langrank_etl::ReshapeOptions;
use proptest::prelude::*;
use proptest::sample::Index;
use std::cmp::Ordering;
use std::collections::{BTreeSet, HashSet};

fn no_exclusions() -> ReshapeOptions {
    ReshapeOptions {
        exclusion_list: vec![],
        ..ReshapeOptions::default()
    }
}

/// Wide history table: languages × years, `None` ranks written as "-".
fn wide_table(languages: &[String], years: &[u32], ranks: &[Option<u32>]) -> RawTable {
    let mut headers = vec!["Programming Language".to_string(), "-".to_string()];
    headers.extend(years.iter().map(|y| y.to_string()));

    let rows = languages
        .iter()
        .enumerate()
        .map(|(li, language)| {
            let mut row = vec![language.clone(), "x".to_string()];
            row.extend((0..years.len()).map(|yi| {
                match ranks[(li * years.len() + yi) % ranks.len()] {
                    Some(rank) => rank.to_string(),
                    None => "-".to_string(),
                }
            }));
            row
        })
        .collect();

    RawTable::new(headers, rows)
}

fn history_input() -> impl Strategy<Value = (Vec<String>, Vec<u32>, Vec<Option<u32>>)> {
    (
        prop::collection::hash_set("[A-Z][a-z]{2,8}", 1..6),
        prop::collection::btree_set(1990u32..2030, 1..6),
        prop::collection::vec(prop::option::weighted(0.8, 1u32..50), 1..30),
    )
        .prop_map(|(languages, years, ranks)| {
            (
                languages.into_iter().collect(),
                years.into_iter().collect(),
                ranks,
            )
        })
}

fn rank_order(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => x.total_cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

fn row_set(rows: &[HistoryRow]) -> BTreeSet<(String, String, Option<u64>)> {
    rows.iter()
        .map(|r| (r.year.clone(), r.language.clone(), r.rank.map(f64::to_bits)))
        .collect()
}

proptest! {
    #[test]
    fn top_n_renames_only_the_marked_column(
        others in prop::collection::hash_set("[a-z]{1,8}", 1..5),
        period in "[A-Z][a-z]{2,4} 20[0-9]{2}",
        position in any::<Index>(),
        cells in prop::collection::vec("[a-z0-9]{0,6}", 0..40),
    ) {
        let mut headers: Vec<String> = others.into_iter().collect();
        let marked = format!("{} Rank", period);
        let at = position.index(headers.len() + 1);
        headers.insert(at, marked);

        let width = headers.len();
        let rows: Vec<Vec<String>> = cells
            .chunks(width)
            .filter(|chunk| chunk.len() == width)
            .map(|chunk| chunk.to_vec())
            .collect();

        let options = ReshapeOptions {
            rank_column_marker: "Rank".to_string(),
            ..ReshapeOptions::default()
        };
        let raw = RawTable::new(headers.clone(), rows.clone());
        let snapshot = normalize_top_n(raw, &options).unwrap();

        prop_assert_eq!(snapshot.table.rows, rows);
        for (i, header) in snapshot.table.headers.iter().enumerate() {
            if i == at {
                prop_assert_eq!(header, "Rank");
            } else {
                prop_assert_eq!(header, &headers[i]);
            }
        }
    }

    #[test]
    fn history_has_one_row_per_language_and_year((languages, years, ranks) in history_input()) {
        let raw = wide_table(&languages, &years, &ranks);
        let series = normalize_history(raw, &no_exclusions()).unwrap();

        prop_assert_eq!(series.len(), languages.len() * years.len());
        let pairs: HashSet<(&str, &str)> = series
            .rows
            .iter()
            .map(|r| (r.year.as_str(), r.language.as_str()))
            .collect();
        prop_assert_eq!(pairs.len(), series.len());
    }

    #[test]
    fn history_is_sorted_by_year_then_rank((languages, years, ranks) in history_input()) {
        let raw = wide_table(&languages, &years, &ranks);
        let series = normalize_history(raw, &no_exclusions()).unwrap();

        for pair in series.rows.windows(2) {
            let by_year = compare_years(&pair[0].year, &pair[1].year);
            prop_assert_ne!(by_year, Ordering::Greater);
            if by_year == Ordering::Equal {
                prop_assert_ne!(rank_order(pair[0].rank, pair[1].rank), Ordering::Greater);
            }
        }
    }

    #[test]
    fn history_round_trips_through_wide_layout((languages, years, ranks) in history_input()) {
        let options = no_exclusions();
        let series = normalize_history(wide_table(&languages, &years, &ranks), &options).unwrap();

        let rewidened = widen_history(&series, &options);
        let again = normalize_history(rewidened, &options).unwrap();

        prop_assert_eq!(row_set(&again.rows), row_set(&series.rows));
    }

    #[test]
    fn excluded_languages_never_survive(
        (mut languages, years, ranks) in history_input(),
        excluded in prop::sample::subsequence(
            vec!["Pascal", "Visual Basic", "(Visual) Basic", "Prolog"],
            0..=4,
        ),
    ) {
        languages.retain(|l| !excluded.contains(&l.as_str()));
        languages.extend(excluded.iter().map(|l| l.to_string()));

        let options = ReshapeOptions::default();
        let series = normalize_history(wide_table(&languages, &years, &ranks), &options).unwrap();

        for row in &series.rows {
            prop_assert!(!options.is_excluded(&row.language));
        }
        let kept = languages.iter().filter(|l| !options.is_excluded(l)).count();
        prop_assert_eq!(series.len(), kept * years.len());
    }
}
