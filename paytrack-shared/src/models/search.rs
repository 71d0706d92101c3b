/// Prefix tsquery construction
///
/// All three tables carry a generated `tsvector` column maintained by the
/// storage engine and queried with the `@@` operator. The search term is
/// turned into a `to_tsquery` expression here: tokens are AND-combined and
/// the last token becomes a prefix match (`tok:*`), reproducing a
/// search-as-you-type lookup. Ranking is left to storage default; results
/// are ordered the same way as the corresponding list operation.

/// Builds a `to_tsquery` input string for a prefix search
///
/// Tokens are stripped down to alphanumerics so user input cannot inject
/// tsquery syntax. Returns `None` when nothing searchable remains, in
/// which case callers skip the query and return an empty list.
pub fn prefix_query(term: &str) -> Option<String> {
    let tokens: Vec<String> = term
        .split_whitespace()
        .map(|tok| tok.chars().filter(|c| c.is_alphanumeric()).collect::<String>())
        .filter(|tok| !tok.is_empty())
        .collect();

    let (last, rest) = tokens.split_last()?;

    let mut query = String::new();
    for tok in rest {
        query.push_str(tok);
        query.push_str(" & ");
    }
    query.push_str(last);
    query.push_str(":*");

    Some(query)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_token_gets_prefix() {
        assert_eq!(prefix_query("alice"), Some("alice:*".to_string()));
    }

    #[test]
    fn test_multiple_tokens_and_combined() {
        assert_eq!(
            prefix_query("water bill ja"),
            Some("water & bill & ja:*".to_string())
        );
    }

    #[test]
    fn test_empty_term() {
        assert_eq!(prefix_query(""), None);
        assert_eq!(prefix_query("   "), None);
    }

    #[test]
    fn test_tsquery_syntax_stripped() {
        // Operators and quotes must not pass through to to_tsquery
        assert_eq!(prefix_query("a&b | 'c'"), Some("ab & c:*".to_string()));
        assert_eq!(prefix_query("!()&|:"), None);
    }

    #[test]
    fn test_whitespace_normalized() {
        assert_eq!(prefix_query("  alice   smith  "), Some("alice & smith:*".to_string()));
    }
}
