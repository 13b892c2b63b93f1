//! Local search over rows that were already fetched.
//!
//! Matching is a case-insensitive substring test over each row's searchable
//! fields. The term is used as typed, surrounding spaces included. Results
//! keep the input order. Every list is loaded in full before
//! filtering, so this only suits the small tables the dashboard manages.

use std::borrow::Cow;

pub trait Searchable {
    fn search_fields(&self) -> Vec<Cow<'_, str>>;
}

pub fn matches<T: Searchable>(row: &T, term: &str) -> bool {
    let needle = term.to_lowercase();
    needle.is_empty()
        || row
            .search_fields()
            .iter()
            .any(|field| field.to_lowercase().contains(&needle))
}

/// An empty term keeps every row.
pub fn filter<T: Searchable>(rows: Vec<T>, term: &str) -> Vec<T> {
    if term.is_empty() {
        return rows;
    }
    rows.into_iter().filter(|row| matches(row, term)).collect()
}

impl Searchable for String {
    fn search_fields(&self) -> Vec<Cow<'_, str>> {
        vec![Cow::Borrowed(self.as_str())]
    }
}
