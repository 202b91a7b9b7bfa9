//! Name filter deciding whether a job emits traces.
//!
//! Grammar, applied to the job's debug name:
//! - `*` matches every name, `-*` none;
//! - a leading `-` negates the rest of the filter;
//! - a trailing `*` turns the filter into a prefix match;
//! - `~` matches every non-empty name, `-~` only the empty name;
//! - the empty filter matches only the empty name.

/// Whether `name` passes `filter`.
pub fn passes_filter(name: &str, filter: &str) -> bool {
    let name = name.as_bytes();
    let mut pattern = filter.as_bytes();

    if pattern.is_empty() {
        return name.is_empty();
    }

    let mut positive = true;
    if pattern[0] == b'-' {
        positive = false;
        pattern = &pattern[1..];
    }

    // A lone "-" rejects the empty name only.
    if pattern.is_empty() {
        return !name.is_empty();
    }

    match pattern {
        b"*" => return positive,
        b"~" => return name.is_empty() != positive,
        _ => {}
    }

    let prefix_match = pattern.last() == Some(&b'*');
    let literal = if prefix_match {
        &pattern[..pattern.len() - 1]
    } else {
        pattern
    };

    let matched = if prefix_match {
        name.starts_with(literal)
    } else {
        name == literal
    };
    matched == positive
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wildcards() {
        assert!(passes_filter("foo", "*"));
        assert!(passes_filter("", "*"));
        assert!(!passes_filter("foo", "-*"));
    }

    #[test]
    fn test_empty_filter_matches_empty_name_only() {
        assert!(passes_filter("", ""));
        assert!(!passes_filter("foo", ""));
    }

    #[test]
    fn test_exact_and_negated() {
        assert!(passes_filter("foo", "foo"));
        assert!(!passes_filter("foobar", "foo"));
        assert!(!passes_filter("foo", "-foo"));
        assert!(passes_filter("bar", "-foo"));
        assert!(passes_filter("foobar", "-foo"));
    }

    #[test]
    fn test_prefix_match() {
        assert!(passes_filter("foobar", "foo*"));
        assert!(passes_filter("foo", "foo*"));
        assert!(!passes_filter("fo", "foo*"));
        assert!(!passes_filter("foobar", "-foo*"));
        assert!(passes_filter("bar", "-foo*"));
    }

    #[test]
    fn test_tilde_matches_named_functions() {
        assert!(passes_filter("f", "~"));
        assert!(!passes_filter("", "~"));
        assert!(passes_filter("", "-~"));
        assert!(!passes_filter("f", "-~"));
    }

    #[test]
    fn test_lone_dash() {
        assert!(passes_filter("f", "-"));
        assert!(!passes_filter("", "-"));
    }
}
