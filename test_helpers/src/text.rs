//! Gherkin step argument helpers for the behaviour suites.

/// Trim `value` and drop one pair of matching outer quotes.
#[must_use]
pub fn unquote(value: &str) -> &str {
    let trimmed = value.trim();
    for quote in ['"', '\''] {
        if let Some(inner) = trimmed
            .strip_prefix(quote)
            .and_then(|rest| rest.strip_suffix(quote))
        {
            return inner;
        }
    }
    trimmed
}

/// Splits a comma-separated step argument into unquoted, non-empty entries.
#[must_use]
pub fn list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(unquote)
        .filter(|entry| !entry.is_empty())
        .map(str::to_owned)
        .collect()
}
