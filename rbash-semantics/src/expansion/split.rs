//! Stage 7: word splitting on `IFS`.
//!
//! Grounded on §4.1 bullet 7. Only [`Segment`]s marked `splittable` (those
//! that came from an unquoted source) contribute delimiter characters; a
//! quoted segment's text is never treated as IFS, same as bash's `"$x"`
//! never splitting regardless of what `$x` contains. A run of IFS
//! whitespace collapses to a single boundary and is trimmed at the very
//! start/end of the word; a non-whitespace IFS character always starts a
//! new field on its own, so `IFS=: ; x=a::b` yields `a`, ``, `b` — the
//! middle empty field bash itself produces.
//!
//! A result built entirely from empty, unquoted expansions vanishes — no
//! field at all — per the "null string from an unquoted expansion is
//! removed" rule; a quoted empty string (e.g. `""`) survives as one empty
//! field, since quoting is what the caller used to ask for it.

use super::Segment;
use rbash_env::session::Env;

const DEFAULT_IFS: &str = " \t\n";

pub fn split(segments: &[Segment], env: &Env) -> Vec<String> {
    let ifs = env
        .get_variable("IFS")
        .and_then(|v| v.value())
        .and_then(|v| v.as_scalar())
        .unwrap_or(DEFAULT_IFS);

    if ifs.is_empty() {
        return vec![segments.iter().map(|s| s.text.as_str()).collect()];
    }

    let is_ws = |c: char| ifs.contains(c) && c.is_whitespace();
    let is_non_ws = |c: char| ifs.contains(c) && !c.is_whitespace();

    let mut fields = Vec::new();
    let mut field = String::new();
    let mut has_content = false;
    let mut pending_empty = false;
    let quoted_present = segments.iter().any(|s| !s.splittable);

    for segment in segments {
        if !segment.splittable {
            field.push_str(&segment.text);
            has_content = true;
            pending_empty = false;
            continue;
        }
        for c in segment.text.chars() {
            if is_ws(c) {
                if has_content {
                    fields.push(std::mem::take(&mut field));
                    has_content = false;
                }
            } else if is_non_ws(c) {
                fields.push(std::mem::take(&mut field));
                has_content = false;
                pending_empty = true;
            } else {
                field.push(c);
                has_content = true;
                pending_empty = false;
            }
        }
    }

    if has_content || pending_empty {
        fields.push(field);
    } else if fields.is_empty() && quoted_present {
        fields.push(field);
    }

    fields
}

#[cfg(test)]
mod tests {
    use super::*;
    use rbash_env::io::Collector;
    use rbash_env::variable::Variable;

    fn env_with_ifs(ifs: Option<&str>) -> Env {
        let collector = Collector::new();
        let mut env = Env::new(collector.sink(), collector.sink());
        if let Some(ifs) = ifs {
            env.variables.insert("IFS".to_owned(), Variable::new(ifs));
        }
        env
    }

    #[test]
    fn default_ifs_collapses_whitespace_runs() {
        let env = env_with_ifs(None);
        let segments = vec![Segment::unquoted("a   b\tc")];
        assert_eq!(split(&segments, &env), vec!["a", "b", "c"]);
    }

    #[test]
    fn quoted_segments_are_never_split() {
        let env = env_with_ifs(None);
        let segments = vec![Segment::quoted("a b c")];
        assert_eq!(split(&segments, &env), vec!["a b c"]);
    }

    #[test]
    fn empty_ifs_prevents_all_splitting() {
        let env = env_with_ifs(Some(""));
        let segments = vec![Segment::unquoted("a b c")];
        assert_eq!(split(&segments, &env), vec!["a b c"]);
    }

    #[test]
    fn repeated_non_whitespace_delimiter_yields_an_empty_field() {
        let env = env_with_ifs(Some(":"));
        let segments = vec![Segment::unquoted("a::b")];
        assert_eq!(split(&segments, &env), vec!["a", "", "b"]);
    }

    #[test]
    fn leading_and_trailing_whitespace_is_trimmed_without_empty_fields() {
        let env = env_with_ifs(None);
        let segments = vec![Segment::unquoted("  a  ")];
        assert_eq!(split(&segments, &env), vec!["a"]);
    }

    #[test]
    fn pure_unquoted_whitespace_vanishes_entirely() {
        let env = env_with_ifs(None);
        let segments = vec![Segment::unquoted("   ")];
        assert!(split(&segments, &env).is_empty());
    }

    #[test]
    fn a_quoted_empty_string_survives_as_one_field() {
        let env = env_with_ifs(None);
        let segments = vec![Segment::quoted("")];
        assert_eq!(split(&segments, &env), vec![""]);
    }

    #[test]
    fn an_unquoted_empty_expansion_vanishes() {
        let env = env_with_ifs(None);
        let segments = vec![Segment::unquoted("")];
        assert!(split(&segments, &env).is_empty());
    }
}
