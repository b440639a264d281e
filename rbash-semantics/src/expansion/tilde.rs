//! Stage 2: tilde expansion (`~`, `~+`, `~-`) at word start.
//!
//! Grounded on §4.1 bullet 2. `~user` (another user's home directory) is
//! not expanded: resolving it means consulting the system user database,
//! which this crate has no collaborator for — the tilde is left untouched,
//! same as an unset `~`/`~+`/`~-` leaves its text untouched.

use rbash_env::Env;
use rbash_syntax::syntax::{TextUnit, Word, WordUnit};

pub fn expand(word: &Word, env: &Env) -> Word {
    let Some(WordUnit::Tilde(suffix)) = word.units.first() else {
        return word.clone();
    };

    let replacement = match suffix.as_str() {
        "" => lookup(env, "HOME"),
        "+" => lookup(env, "PWD"),
        "-" => lookup(env, "OLDPWD"),
        _ => None,
    };

    let Some(path) = replacement else {
        return word.clone();
    };

    let mut units: Vec<WordUnit> = path
        .chars()
        .map(|c| WordUnit::Unquoted(TextUnit::Literal(c)))
        .collect();
    units.extend(word.units[1..].iter().cloned());
    Word {
        units,
        location: word.location.clone(),
    }
}

fn lookup(env: &Env, name: &str) -> Option<String> {
    env.get_variable(name)?.value()?.as_scalar().map(str::to_owned)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rbash_env::io::Collector;
    use rbash_env::variable::Variable;

    fn env_with_home(home: &str) -> Env {
        let collector = Collector::new();
        let mut env = Env::new(collector.sink(), collector.sink());
        env.variables.insert("HOME".to_owned(), Variable::new(home));
        env
    }

    #[test]
    fn bare_tilde_expands_to_home() {
        let env = env_with_home("/home/alice");
        let word = Word {
            units: vec![WordUnit::Tilde(String::new())],
            location: Default::default(),
        };
        assert_eq!(
            expand(&word, &env).to_string_if_literal().as_deref(),
            Some("/home/alice")
        );
    }

    #[test]
    fn unset_home_leaves_tilde_untouched() {
        let collector = Collector::new();
        let env = Env::new(collector.sink(), collector.sink());
        let word = Word {
            units: vec![WordUnit::Tilde(String::new())],
            location: Default::default(),
        };
        assert_eq!(expand(&word, &env), word);
    }
}
