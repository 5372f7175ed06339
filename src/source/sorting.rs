use std::cmp::Ordering;

/// Compares strings so that embedded numbers order by value: `ext_2` < `ext_10`.
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    let mut left = chunks(a);
    let mut right = chunks(b);

    loop {
        match (left.next(), right.next()) {
            (None, None) => return a.cmp(b),
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(l), Some(r)) => {
                let ordering = match (l.parse::<u128>(), r.parse::<u128>()) {
                    (Ok(ln), Ok(rn)) => ln.cmp(&rn),
                    _ => l.cmp(r),
                };
                if ordering != Ordering::Equal {
                    return ordering;
                }
            }
        }
    }
}

/// Splits into maximal runs of digits and non-digits.
fn chunks(s: &str) -> impl Iterator<Item = &str> {
    let mut rest = s;
    std::iter::from_fn(move || {
        let first = rest.chars().next()?;
        let digits = first.is_ascii_digit();
        let end = rest
            .char_indices()
            .find(|(_, c)| c.is_ascii_digit() != digits)
            .map(|(i, _)| i)
            .unwrap_or(rest.len());
        let (chunk, tail) = rest.split_at(end);
        rest = tail;
        Some(chunk)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbers_sort_by_value() {
        let mut names = vec!["page_10", "page_2", "page_1", "page_02b", "page"];
        names.sort_by(|a, b| natural_cmp(a, b));
        assert_eq!(names, vec!["page", "page_1", "page_2", "page_02b", "page_10"]);
    }

    #[test]
    fn uris_with_numbers_sort_naturally() {
        let mut uris = vec![
            "http://x/ext/EDA-D10",
            "http://x/ext/EDA-D2",
            "http://x/ext/EDA-D1",
        ];
        uris.sort_by(|a, b| natural_cmp(a, b));
        assert_eq!(
            uris,
            vec![
                "http://x/ext/EDA-D1",
                "http://x/ext/EDA-D2",
                "http://x/ext/EDA-D10"
            ]
        );
    }
}
