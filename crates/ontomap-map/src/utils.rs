//! String helpers shared by the matching components.

/// Lookup key for a name: trimmed, upper-cased unless `case_sensitive`.
pub fn normalize_key(raw: &str, case_sensitive: bool) -> String {
    let trimmed = raw.trim();
    if case_sensitive {
        trimmed.to_string()
    } else {
        trimmed.to_uppercase()
    }
}

/// Splits an aggregated synonyms cell, trimming items and dropping empties.
pub fn split_synonyms<'a>(
    raw: &'a str,
    delimiter: &'a str,
) -> impl Iterator<Item = &'a str> + 'a {
    raw.split(delimiter)
        .map(str::trim)
        .filter(|item| !item.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_key_respects_case_mode() {
        assert_eq!(normalize_key(" Tp53 ", true), "Tp53");
        assert_eq!(normalize_key(" Tp53 ", false), "TP53");
    }

    #[test]
    fn split_synonyms_ignores_empty_items() {
        let items: Vec<&str> = split_synonyms("ASP| APOBEC1CF ||", "|").collect();
        assert_eq!(items, ["ASP", "APOBEC1CF"]);
    }
}
