//! Matching of sloppily typed names against known ones.

use log::debug;

use crate::error::InputError;

/// A way of deciding whether typed text refers to a candidate name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// The text equals the candidate.
    Exact,
    /// The candidate starts with the text.
    Prefix,
    /// The text is assembled from non-empty prefixes of the candidate's
    /// underscore-separated words, in order (`gval` for `get_value`).
    SnakeCase,
    /// Every character of the text occurs in the candidate, in order.
    Fuzzy,
}

/// Every strategy, most precise first.
pub const ALL_STRATEGIES: &[Strategy] = &[
    Strategy::Exact,
    Strategy::Prefix,
    Strategy::SnakeCase,
    Strategy::Fuzzy,
];

/// Exact and prefix matching only.
pub const SIMPLE_STRATEGIES: &[Strategy] = &[Strategy::Exact, Strategy::Prefix];

impl Strategy {
    /// Human readable name, used in diagnostics.
    pub fn name(self) -> &'static str {
        match self {
            Strategy::Exact => "exact",
            Strategy::Prefix => "prefix",
            Strategy::SnakeCase => "snake case",
            Strategy::Fuzzy => "fuzzy",
        }
    }

    /// Checks whether `text` refers to `candidate` under this strategy.
    pub fn matches(self, text: &str, candidate: &str) -> bool {
        match self {
            Strategy::Exact => text == candidate,
            Strategy::Prefix => candidate.starts_with(text),
            Strategy::SnakeCase => {
                let words: Vec<&str> = candidate.split('_').collect();
                matches_words(text, &words)
            }
            Strategy::Fuzzy => is_subsequence(text, candidate),
        }
    }
}

/// Byte length of the longest common prefix of `a` and `b`.
fn common_prefix_len(a: &str, b: &str) -> usize {
    a.char_indices()
        .zip(b.chars())
        .find(|((_, ca), cb)| ca != cb)
        .map_or_else(|| a.len().min(b.len()), |((idx, _), _)| idx)
}

fn matches_words(text: &str, words: &[&str]) -> bool {
    if text.is_empty() {
        return true;
    }
    let Some((word, rest)) = words.split_first() else {
        return false;
    };

    let common = common_prefix_len(text, word);
    if common == 0 {
        return false;
    }
    if common == text.len() {
        return true;
    }

    // Longest split point first; every shorter one is a backtracking step.
    text[..common]
        .char_indices()
        .map(|(idx, ch)| idx + ch.len_utf8())
        .rev()
        .any(|split_at| matches_words(&text[split_at..], rest))
}

fn is_subsequence(text: &str, candidate: &str) -> bool {
    let mut haystack = candidate.chars();
    text.chars().all(|needle| haystack.any(|ch| ch == needle))
}

/// Matches `text` against `candidates`, trying `strategies` in order.
///
/// Returns the sorted matches of the first strategy that matched anything, so
/// all returned names were matched the same way. Returns an empty list if no
/// strategy matched.
pub fn match_with<'c, I>(text: &str, candidates: I, strategies: &[Strategy]) -> Vec<&'c str>
where
    I: IntoIterator<Item = &'c str>,
{
    let candidates: Vec<&'c str> = candidates.into_iter().collect();
    for &strategy in strategies {
        let mut matches: Vec<&'c str> = candidates
            .iter()
            .copied()
            .filter(|candidate| strategy.matches(text, candidate))
            .collect();
        if !matches.is_empty() {
            matches.sort_unstable();
            matches.dedup();
            debug!("{}: {}", strategy.name(), matches.join(" "));
            return matches;
        }
    }
    Vec::new()
}

/// Matches `text` against `candidates` using [`ALL_STRATEGIES`].
pub fn match_string<'c, I>(text: &str, candidates: I) -> Vec<&'c str>
where
    I: IntoIterator<Item = &'c str>,
{
    match_with(text, candidates, ALL_STRATEGIES)
}

/// Picks the single candidate `text` refers to.
///
/// # Errors
/// - [`InputError::UnknownCommand`] if nothing matches.
/// - [`InputError::AmbiguousCommand`] if several candidates match equally well.
pub fn choose<'c, I>(text: &str, candidates: I) -> Result<&'c str, InputError>
where
    I: IntoIterator<Item = &'c str>,
{
    let matches = match_string(text, candidates);
    match matches.as_slice() {
        [] => Err(InputError::UnknownCommand(text.to_string())),
        [single] => Ok(*single),
        _ => Err(InputError::AmbiguousCommand {
            name: text.to_string(),
            matches: matches.iter().map(|m| m.to_string()).collect(),
        }),
    }
}
