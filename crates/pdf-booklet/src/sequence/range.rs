use std::collections::BTreeSet;

/// Parse a page range string such as `"1,3,10-15"` into zero-based indices.
///
/// Numbers are 1-based and inclusive, a range may be written either way round
/// (`"15-10"` equals `"10-15"`), and anything that does not parse or falls
/// outside `1..=page_count` is dropped.
pub fn parse_range_spec(text: &str, page_count: usize) -> BTreeSet<usize> {
    let mut indices = BTreeSet::new();

    for token in text.split(',') {
        let token = token.trim();
        if token.is_empty() {
            continue;
        }

        let (start, end) = match token.split_once('-') {
            Some((a, b)) => match (parse_page_number(a), parse_page_number(b)) {
                (Some(a), Some(b)) => (a.min(b), a.max(b)),
                _ => continue,
            },
            None => match parse_page_number(token) {
                Some(n) => (n, n),
                None => continue,
            },
        };

        // Clamp before iterating so "1-4000000000" stays cheap
        let start = start.max(1);
        let end = end.min(page_count);
        indices.extend((start..=end).map(|n| n - 1));
    }

    indices
}

fn parse_page_number(text: &str) -> Option<usize> {
    text.trim().parse().ok()
}
