use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};

use crate::analyzers::types::CatalogIndex;
use crate::cleaner::CleanRecord;

/// Compares strings treating runs of ASCII digits by numeric value, so `"2" < "8A" < "11"`.
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    let mut left = chunks(a);
    let mut right = chunks(b);

    loop {
        match (left.next(), right.next()) {
            (None, None) => return a.cmp(b),
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(x), Some(y)) => {
                let ord = match (x.parse::<u128>(), y.parse::<u128>()) {
                    (Ok(nx), Ok(ny)) => nx.cmp(&ny),
                    (Ok(_), Err(_)) => Ordering::Less,
                    (Err(_), Ok(_)) => Ordering::Greater,
                    (Err(_), Err(_)) => x.cmp(y),
                };
                if ord != Ordering::Equal {
                    return ord;
                }
            }
        }
    }
}

/// Splits into alternating digit and non-digit runs.
fn chunks(s: &str) -> impl Iterator<Item = &str> {
    let mut rest = s;
    std::iter::from_fn(move || {
        let first = rest.chars().next()?;
        let digit = first.is_ascii_digit();
        let end = rest
            .find(|c: char| c.is_ascii_digit() != digit)
            .unwrap_or(rest.len());
        let (head, tail) = rest.split_at(end);
        rest = tail;
        Some(head)
    })
}

/// Department → course numbers, deduplicated and naturally ordered.
pub fn index_catalog(records: &[CleanRecord]) -> CatalogIndex {
    let mut depts: BTreeMap<String, BTreeSet<&str>> = BTreeMap::new();

    for r in records {
        if let Some((dept, number)) = r.course.split_once(' ') {
            depts.entry(dept.to_string()).or_default().insert(number);
        }
    }

    depts
        .into_iter()
        .map(|(dept, numbers)| {
            let mut numbers: Vec<String> = numbers.into_iter().map(str::to_string).collect();
            numbers.sort_by(|a, b| natural_cmp(a, b));
            (dept, numbers)
        })
        .collect()
}
