//! Delimiter-aware splitting of command lines and list values.

use crate::error::TokenizeError;

/// Quote pairs grouping the words of a command line.
pub const QUOTES: &[(char, char)] = &[('"', '"'), ('\'', '\'')];

/// Delimiter pairs grouping the elements of list and tuple values.
pub const LIST_DELIMITERS: &[(char, char)] = &[
    ('(', ')'),
    ('[', ']'),
    ('{', '}'),
    ('"', '"'),
    ('\'', '\''),
];

/// Splits `text` at every separator character that is not enclosed in a
/// delimiter pair.
///
/// While a delimiter is open, the only character that matters is its closer;
/// openers seen in between are not counted. Pieces borrow from `text` and keep
/// their delimiters.
///
/// # Errors
/// - [`TokenizeError::DelimiterIsSeparator`] if any delimiter satisfies
///   `is_separator`.
/// - [`TokenizeError::Unmatched`] if a delimiter is still open at the end of
///   the text and `allow_unmatched` is false. Otherwise the unterminated tail
///   becomes the last piece.
pub fn split<'t, F>(
    text: &'t str,
    is_separator: F,
    delimiters: &[(char, char)],
    allow_unmatched: bool,
) -> Result<Vec<&'t str>, TokenizeError>
where
    F: Fn(char) -> bool,
{
    for &(open, close) in delimiters {
        if is_separator(open) {
            return Err(TokenizeError::DelimiterIsSeparator(open));
        }
        if is_separator(close) {
            return Err(TokenizeError::DelimiterIsSeparator(close));
        }
    }

    let mut pending: Vec<char> = Vec::new();
    let mut pieces = Vec::new();
    let mut start = 0;

    for (idx, ch) in text.char_indices() {
        if let Some(&closer) = pending.last() {
            if ch == closer {
                pending.pop();
            }
        } else if let Some(&(_, closer)) = delimiters.iter().find(|(open, _)| *open == ch) {
            pending.push(closer);
        } else if is_separator(ch) {
            pieces.push(&text[start..idx]);
            start = idx + ch.len_utf8();
        }
    }

    if !pending.is_empty() && !allow_unmatched {
        return Err(TokenizeError::Unmatched {
            pending: pending.iter().collect(),
            text: text.to_string(),
        });
    }

    pieces.push(&text[start..]);
    Ok(pieces)
}

/// Splits a command line into whitespace-separated words, honoring quotes.
/// Runs of whitespace produce no empty words.
pub fn split_words(text: &str, allow_unmatched: bool) -> Result<Vec<&str>, TokenizeError> {
    let mut words = split(text, char::is_whitespace, QUOTES, allow_unmatched)?;
    words.retain(|word| !word.is_empty());
    Ok(words)
}

/// Splits a list or tuple body on `separator`, keeping bracketed and quoted
/// groups together.
pub fn split_list(
    text: &str,
    separator: char,
    allow_unmatched: bool,
) -> Result<Vec<&str>, TokenizeError> {
    split(text, |ch| ch == separator, LIST_DELIMITERS, allow_unmatched)
}

/// Strips one pair of matching quotes enclosing `word`, if there is one.
pub fn drop_enclosing_quotes(word: &str) -> &str {
    let mut chars = word.chars();
    match (chars.next(), chars.next_back()) {
        (Some(first), Some(last))
            if QUOTES.iter().any(|&(open, close)| open == first && close == last) =>
        {
            &word[first.len_utf8()..word.len() - last.len_utf8()]
        }
        _ => word,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_words_drops_empty_words() {
        assert_eq!(split_words("  foo   bar ", false).unwrap(), vec!["foo", "bar"]);
        assert!(split_words("", false).unwrap().is_empty());
        assert!(split_words("   ", false).unwrap().is_empty());
    }

    #[test]
    fn test_split_words_keeps_quoted_groups() {
        assert_eq!(
            split_words(r#"cmd "foo bar" 'a b' x="1 2""#, false).unwrap(),
            vec!["cmd", r#""foo bar""#, "'a b'", r#"x="1 2""#]
        );
    }

    #[test]
    fn test_split_words_unmatched_quote() {
        assert!(matches!(
            split_words(r#"cmd "foo bar"#, false),
            Err(TokenizeError::Unmatched { .. })
        ));
        assert_eq!(
            split_words(r#"cmd "foo bar"#, true).unwrap(),
            vec!["cmd", r#""foo bar"#]
        );
    }

    #[test]
    fn test_split_list_nested_groups() {
        assert_eq!(
            split_list(r#"(foo,"bar[baz]",{'qux'}),ggg"#, ',', false).unwrap(),
            vec![r#"(foo,"bar[baz]",{'qux'})"#, "ggg"]
        );
    }

    #[test]
    fn test_split_list_custom_separator() {
        assert_eq!(
            split_list("a,b|(c|d)|e", '|', false).unwrap(),
            vec!["a,b", "(c|d)", "e"]
        );
    }

    #[test]
    fn test_split_list_keeps_empty_pieces() {
        assert_eq!(split_list("First,", ',', false).unwrap(), vec!["First", ""]);
        assert_eq!(split_list("", ',', false).unwrap(), vec![""]);
    }

    #[test]
    fn test_split_list_unmatched_paren() {
        let err = split_list("(foo,bar", ',', false).unwrap_err();
        assert_eq!(
            err,
            TokenizeError::Unmatched {
                pending: ")".to_string(),
                text: "(foo,bar".to_string(),
            }
        );
        assert_eq!(split_list("(foo,bar", ',', true).unwrap(), vec!["(foo,bar"]);
    }

    #[test]
    fn test_split_rejects_delimiter_separator() {
        assert_eq!(
            split_list("a(b", '(', false),
            Err(TokenizeError::DelimiterIsSeparator('('))
        );
    }

    #[test]
    fn test_split_list_nested_parens_literal() {
        assert_eq!(
            split_list("(foo,(bar,baz)),(qux)", ',', false),
            Ok(vec!["(foo,(bar,baz))", "(qux)"])
        );
    }

    #[test]
    fn test_drop_enclosing_quotes_one_pair_at_a_time() {
        let once = drop_enclosing_quotes("\"'x'\"");
        assert_eq!(once, "'x'");
        assert_eq!(drop_enclosing_quotes(once), "x");
        assert_eq!(drop_enclosing_quotes(drop_enclosing_quotes("x")), "x");
    }

    #[test]
    fn test_drop_enclosing_quotes() {
        assert_eq!(drop_enclosing_quotes(r#""foo bar""#), "foo bar");
        assert_eq!(drop_enclosing_quotes("'x'"), "x");
        assert_eq!(drop_enclosing_quotes("\"\""), "");
        assert_eq!(drop_enclosing_quotes("\""), "\"");
        assert_eq!(drop_enclosing_quotes("'x\""), "'x\"");
        assert_eq!(drop_enclosing_quotes("plain"), "plain");
        assert_eq!(drop_enclosing_quotes(""), "");
    }
}
