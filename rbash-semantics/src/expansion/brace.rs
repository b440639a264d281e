//! Stage 1: brace expansion (`{a,b,c}`, `{1..10}`, `{01..05}`, `{a..z}`,
//! `{1..10..2}`).
//!
//! Grounded on §4.1 bullet 1. Operates purely on the `Word` tree — no
//! session state is needed, since brace expansion never looks at variables.

use rbash_syntax::syntax::{BraceItem, TextUnit, Word, WordUnit};

/// Expands every brace item in `word` by cartesian product with its
/// surrounding literal parts, returning one word per combination (just
/// `[word.clone()]` if it contains no brace item).
pub fn expand(word: &Word) -> Vec<Word> {
    let Some(pos) = word
        .units
        .iter()
        .position(|u| matches!(u, WordUnit::Brace(_)))
    else {
        return vec![word.clone()];
    };

    let prefix = &word.units[..pos];
    let suffix = &word.units[pos + 1..];
    let WordUnit::Brace(item) = &word.units[pos] else {
        unreachable!()
    };

    let alternatives = match item {
        BraceItem::Alternatives(words) => words.iter().map(|w| w.units.clone()).collect(),
        BraceItem::Range { from, to, step } => expand_range(from, to, step.as_deref())
            .unwrap_or_else(|| vec![reconstruct_range(from, to, step.as_deref())])
            .into_iter()
            .map(literal_units)
            .collect::<Vec<_>>(),
    };

    alternatives
        .into_iter()
        .flat_map(|alt| {
            let mut units = prefix.to_vec();
            units.extend(alt);
            units.extend_from_slice(suffix);
            expand(&Word {
                units,
                location: word.location.clone(),
            })
        })
        .collect()
}

fn literal_units(s: String) -> Vec<WordUnit> {
    s.chars()
        .map(|c| WordUnit::Unquoted(TextUnit::Literal(c)))
        .collect()
}

/// Reconstructs the original `{from..to[..step]}` source for a range this
/// crate treats as invalid, per §4.1's "invalid/zero steps left literal".
fn reconstruct_range(from: &str, to: &str, step: Option<&str>) -> String {
    match step {
        Some(step) => format!("{{{from}..{to}..{step}}}"),
        None => format!("{{{from}..{to}}}"),
    }
}

fn expand_range(from: &str, to: &str, step: Option<&str>) -> Option<Vec<String>> {
    if let (Ok(from_n), Ok(to_n)) = (from.parse::<i64>(), to.parse::<i64>()) {
        let step_n = match step.map(str::parse::<i64>) {
            None => 1,
            Some(Ok(0)) => return None,
            Some(Ok(n)) => n.abs(),
            Some(Err(_)) => return None,
        };
        let width = from
            .trim_start_matches('-')
            .len()
            .max(to.trim_start_matches('-').len());
        let zero_padded = from.trim_start_matches('-').starts_with('0')
            || to.trim_start_matches('-').starts_with('0');
        let descending = from_n > to_n;
        let mut values = Vec::new();
        let mut n = from_n;
        loop {
            values.push(if zero_padded {
                format!("{:0width$}", n.abs(), width = width)
            } else {
                n.to_string()
            });
            if n == to_n {
                break;
            }
            n += if descending { -step_n } else { step_n };
            if (descending && n < to_n) || (!descending && n > to_n) {
                break;
            }
        }
        return Some(values);
    }

    let mut from_chars = from.chars();
    let mut to_chars = to.chars();
    if let (Some(from_c), None, Some(to_c), None) = (
        from_chars.next(),
        from_chars.next(),
        to_chars.next(),
        to_chars.next(),
    ) {
        if step.is_some_and(|s| s.parse::<i64>() == Ok(0)) {
            return None;
        }
        let step_n = step.and_then(|s| s.parse::<i64>().ok()).unwrap_or(1).abs() as u32;
        let (from_u, to_u) = (from_c as u32, to_c as u32);
        let descending = from_u > to_u;
        let mut values = Vec::new();
        let mut n = from_u as i64;
        let to_i = to_u as i64;
        loop {
            values.push(char::from_u32(n as u32).unwrap().to_string());
            if n == to_i {
                break;
            }
            n += if descending {
                -(step_n as i64)
            } else {
                step_n as i64
            };
            if (descending && n < to_i) || (!descending && n > to_i) {
                break;
            }
        }
        return Some(values);
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alternatives_cartesian_product_with_surrounding_literals() {
        let word = Word {
            units: vec![
                WordUnit::Unquoted(TextUnit::Literal('x')),
                WordUnit::Brace(BraceItem::Alternatives(vec![
                    Word::from_literal("a"),
                    Word::from_literal("b"),
                ])),
            ],
            location: Default::default(),
        };
        let expanded: Vec<String> = expand(&word)
            .iter()
            .map(|w| w.to_string_if_literal().unwrap())
            .collect();
        assert_eq!(expanded, vec!["xa".to_owned(), "xb".to_owned()]);
    }

    #[test]
    fn numeric_range_zero_pads_to_widest_endpoint() {
        let word = Word {
            units: vec![WordUnit::Brace(BraceItem::Range {
                from: "01".to_owned(),
                to: "03".to_owned(),
                step: None,
            })],
            location: Default::default(),
        };
        let expanded: Vec<String> = expand(&word)
            .iter()
            .map(|w| w.to_string_if_literal().unwrap())
            .collect();
        assert_eq!(expanded, vec!["01", "02", "03"]);
    }

    #[test]
    fn descending_numeric_range_counts_down() {
        let word = Word {
            units: vec![WordUnit::Brace(BraceItem::Range {
                from: "3".to_owned(),
                to: "1".to_owned(),
                step: None,
            })],
            location: Default::default(),
        };
        let expanded: Vec<String> = expand(&word)
            .iter()
            .map(|w| w.to_string_if_literal().unwrap())
            .collect();
        assert_eq!(expanded, vec!["3", "2", "1"]);
    }

    #[test]
    fn alpha_range_steps_through_single_characters() {
        let word = Word {
            units: vec![WordUnit::Brace(BraceItem::Range {
                from: "a".to_owned(),
                to: "e".to_owned(),
                step: Some("2".to_owned()),
            })],
            location: Default::default(),
        };
        let expanded: Vec<String> = expand(&word)
            .iter()
            .map(|w| w.to_string_if_literal().unwrap())
            .collect();
        assert_eq!(expanded, vec!["a", "c", "e"]);
    }

    #[test]
    fn zero_step_is_left_literal() {
        let word = Word {
            units: vec![WordUnit::Brace(BraceItem::Range {
                from: "1".to_owned(),
                to: "5".to_owned(),
                step: Some("0".to_owned()),
            })],
            location: Default::default(),
        };
        let expanded: Vec<String> = expand(&word)
            .iter()
            .map(|w| w.to_string_if_literal().unwrap())
            .collect();
        assert_eq!(expanded, vec!["{1..5..0}"]);
    }
}
