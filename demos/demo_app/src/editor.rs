//! Interactive line editing with tab completion backed by the session.

use std::rc::Rc;

use anyhow::Result;
use rustyline::completion::{Completer, Pair};
use rustyline::error::ReadlineError;
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::history::DefaultHistory;
use rustyline::validate::Validator;
use rustyline::{Context, Editor, Helper};
use typeshell_core::{Completion, Session};

struct LineHelper {
    session: Rc<Session>,
}

impl Helper for LineHelper {}

impl Highlighter for LineHelper {}

impl Validator for LineHelper {}

impl Hinter for LineHelper {
    type Hint = String;

    fn hint(&self, _line: &str, _pos: usize, _ctx: &Context<'_>) -> Option<String> {
        None
    }
}

impl Completer for LineHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let before = line.get(..pos).unwrap_or(line);
        Ok(to_pairs(before, self.session.complete(line, pos)))
    }
}

/// Byte offset `count` characters back from the end of `before`.
fn back_chars(before: &str, count: usize) -> usize {
    before
        .char_indices()
        .rev()
        .take(count)
        .last()
        .map_or(before.len(), |(at, _)| at)
}

/// Turns completions into candidates replacing from one common start. A
/// completion replacing less than the others keeps the text in between.
fn to_pairs(before: &str, completions: Vec<Completion>) -> (usize, Vec<Pair>) {
    let start = completions
        .iter()
        .map(|completion| back_chars(before, completion.replace_len))
        .min()
        .unwrap_or(before.len());

    let pairs = completions
        .into_iter()
        .map(|completion| {
            let kept = &before[start..back_chars(before, completion.replace_len)];
            let display = match &completion.display {
                Some(hint) => format!("{}  ({hint})", completion.text),
                None => completion.text.clone(),
            };
            Pair {
                display,
                replacement: format!("{kept}{}", completion.text),
            }
        })
        .collect();
    (start, pairs)
}

/// Reads lines with history and completion until `exit` or end of input.
pub fn run(session: Rc<Session>, prompt: &str) -> Result<()> {
    let mut editor: Editor<LineHelper, DefaultHistory> = Editor::new()?;
    editor.set_helper(Some(LineHelper {
        session: Rc::clone(&session),
    }));

    while session.is_running() {
        let line = match editor.readline(prompt) {
            Ok(line) => line,
            Err(ReadlineError::Interrupted) => continue,
            Err(ReadlineError::Eof) => break,
            Err(err) => return Err(err.into()),
        };
        if !line.trim().is_empty() {
            editor.add_history_entry(line.as_str())?;
        }

        match session.onecmd(&line) {
            Ok(value) if value.is_unit() => {}
            Ok(value) => println!("{value}"),
            Err(err) => println!("❌ Error: {err} (try \"get_error\" for details)"),
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn replacements(before: &str, completions: Vec<Completion>) -> (usize, Vec<String>) {
        let (start, pairs) = to_pairs(before, completions);
        (start, pairs.into_iter().map(|pair| pair.replacement).collect())
    }

    #[test]
    fn test_back_chars() {
        assert_eq!(back_chars("sum 12", 0), 6);
        assert_eq!(back_chars("sum 12", 2), 4);
        assert_eq!(back_chars("mix żó", 2), 4);
        assert_eq!(back_chars("ab", 5), 0);
    }

    #[test]
    fn test_pairs_share_start() {
        let completions = vec![
            Completion::new("level", 1),
            Completion::new("high", 1).with_display("2"),
        ];
        assert_eq!(
            replacements("paint red h", completions),
            (10, vec!["level".to_string(), "high".to_string()])
        );

        let completions = vec![
            Completion::new("steps", 6),
            Completion::new("blue", 1),
        ];
        assert_eq!(
            replacements("mix [red,b", completions),
            (4, vec!["steps".to_string(), "[red,blue".to_string()])
        );
        assert_eq!(replacements("x", Vec::new()), (1, Vec::new()));
    }
}
