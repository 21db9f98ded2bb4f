// Parser for the row selection expressions typed at the prompt, e.g.
// `1-5, 8, 11-12` or `all`.

use crate::error::SelectionParseError;
use std::collections::BTreeSet;

/// Parse a selection expression into 1-based row indices within
/// `1..=max_index`. Empty input selects nothing; `all` selects every row.
pub fn parse_selection(
    input: &str,
    max_index: usize,
) -> Result<BTreeSet<usize>, SelectionParseError> {
    let input = input.trim();
    if input.is_empty() {
        return Ok(BTreeSet::new());
    }
    if input.eq_ignore_ascii_case("all") {
        return Ok((1..=max_index).collect());
    }

    let mut selected = BTreeSet::new();
    for token in input.split(',') {
        let token = token.trim();
        match token.split_once('-') {
            Some((start, end)) => {
                let start = parse_index(start, token)?;
                let end = parse_index(end, token)?;
                if start > end {
                    return Err(SelectionParseError::InvertedRange { start, end });
                }
                check_bounds(start, max_index)?;
                check_bounds(end, max_index)?;
                selected.extend(start..=end);
            }
            None => {
                let index = parse_index(token, token)?;
                check_bounds(index, max_index)?;
                selected.insert(index);
            }
        }
    }
    Ok(selected)
}

fn parse_index(raw: &str, token: &str) -> Result<usize, SelectionParseError> {
    let raw = raw.trim();
    // `usize::from_str` accepts a leading '+', which is not part of the grammar.
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return Err(SelectionParseError::Invalid(token.to_string()));
    }
    raw.parse()
        .map_err(|_| SelectionParseError::Invalid(token.to_string()))
}

fn check_bounds(index: usize, max: usize) -> Result<(), SelectionParseError> {
    if index < 1 || index > max {
        Err(SelectionParseError::OutOfRange { index, max })
    } else {
        Ok(())
    }
}
