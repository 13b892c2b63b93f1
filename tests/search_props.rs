use aidboard_server::search::{filter, matches};
use proptest::prelude::*;

fn rows() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec("[A-Za-z ]{0,12}", 0..20)
}

fn contains_ignoring_case(row: &str, term: &str) -> bool {
    row.to_lowercase().contains(&term.to_lowercase())
}

proptest! {
    #[test]
    fn keeps_exactly_the_rows_containing_the_term(rows in rows(), term in "[A-Za-z ]{0,4}") {
        let expected: Vec<String> = rows
            .iter()
            .filter(|row| contains_ignoring_case(row, &term))
            .cloned()
            .collect();
        prop_assert_eq!(filter(rows, &term), expected);
    }

    #[test]
    fn every_kept_row_contains_the_term(rows in rows(), term in "[A-Za-z ]{1,4}") {
        for row in filter(rows, &term) {
            prop_assert!(contains_ignoring_case(&row, &term), "{:?} kept for {:?}", row, term);
        }
    }

    #[test]
    fn empty_term_keeps_everything(rows in rows()) {
        prop_assert_eq!(filter(rows.clone(), ""), rows);
    }

    #[test]
    fn whitespace_terms_only_keep_rows_with_that_run(rows in rows(), term in " {1,3}") {
        let kept = filter(rows.clone(), &term);
        let expected: Vec<String> = rows.into_iter().filter(|row| row.contains(&term)).collect();
        prop_assert_eq!(kept, expected);
    }

    #[test]
    fn a_row_always_finds_itself(row in "[A-Za-z ]{1,12}", start in 0usize..12, len in 1usize..6) {
        let start = start.min(row.len() - 1);
        let end = (start + len).min(row.len());
        let term = row[start..end].to_uppercase();
        prop_assert!(matches(&row, &term));
    }
}
