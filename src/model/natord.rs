//! Natural ordering for lane keys: `node2_0 < node10_0 < node10_1`.

use regex::Regex;
use std::cmp::Ordering;
use std::sync::LazyLock;

static CHUNK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[0-9]+|[^0-9]+").expect("chunk pattern is valid"));

#[derive(Debug, PartialEq, Eq)]
enum Chunk<'a> {
    Num(&'a str),
    Text(&'a str),
}

fn chunks(s: &str) -> impl Iterator<Item = Chunk<'_>> {
    CHUNK_RE.find_iter(s).map(|m| {
        let text = m.as_str();
        if text.starts_with(|c: char| c.is_ascii_digit()) {
            Chunk::Num(text)
        } else {
            Chunk::Text(text)
        }
    })
}

fn cmp_digits(a: &str, b: &str) -> Ordering {
    let a_trim = a.trim_start_matches('0');
    let b_trim = b.trim_start_matches('0');
    a_trim
        .len()
        .cmp(&b_trim.len())
        .then_with(|| a_trim.cmp(b_trim))
        // "07" after "7" keeps the order total.
        .then_with(|| a.len().cmp(&b.len()))
}

/// Compare two strings treating runs of ASCII digits as numbers. Numbers sort
/// before text at the same position.
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    let mut left = chunks(a);
    let mut right = chunks(b);
    loop {
        let ord = match (left.next(), right.next()) {
            (None, None) => return Ordering::Equal,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(Chunk::Num(x)), Some(Chunk::Num(y))) => cmp_digits(x, y),
            (Some(Chunk::Text(x)), Some(Chunk::Text(y))) => x.cmp(y),
            (Some(Chunk::Num(_)), Some(Chunk::Text(_))) => Ordering::Less,
            (Some(Chunk::Text(_)), Some(Chunk::Num(_))) => Ordering::Greater,
        };
        if ord != Ordering::Equal {
            return ord;
        }
    }
}
