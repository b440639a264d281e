//! Shell option flags (`set -o`/`shopt`, and the single-letter `set -e`
//! style toggles).
//!
//! Grounded on `yash_env::option`'s `enumset`-backed `Option`/`State` pair,
//! with the option list replaced by the one named in the external
//! interfaces section: `errexit`, `nounset`, `pipefail`, `noclobber`,
//! `noglob`, `allexport`, `xtrace`, `verbose`, `hashall`, `notify`,
//! `monitor`, `privileged`, `physical`, `histexpand`, `braceexpand`,
//! `interactive`.

use enumset::{EnumSet, EnumSetType};
use std::fmt;

#[derive(Debug, EnumSetType)]
pub enum Option {
    ErrExit,
    NoUnset,
    PipeFail,
    NoClobber,
    NoGlob,
    AllExport,
    XTrace,
    Verbose,
    HashAll,
    Notify,
    Monitor,
    Privileged,
    Physical,
    HistExpand,
    BraceExpand,
    Interactive,
}

pub use self::Option::*;

impl Option {
    /// Long name as recognized by `set -o name` / `shopt`.
    pub fn long_name(self) -> &'static str {
        match self {
            ErrExit => "errexit",
            NoUnset => "nounset",
            PipeFail => "pipefail",
            NoClobber => "noclobber",
            NoGlob => "noglob",
            AllExport => "allexport",
            XTrace => "xtrace",
            Verbose => "verbose",
            HashAll => "hashall",
            Notify => "notify",
            Monitor => "monitor",
            Privileged => "privileged",
            Physical => "physical",
            HistExpand => "histexpand",
            BraceExpand => "braceexpand",
            Interactive => "interactive",
        }
    }

    /// Single-letter `set -X` form, for options that have one.
    pub fn short_letter(self) -> std::option::Option<char> {
        match self {
            ErrExit => Some('e'),
            NoUnset => Some('u'),
            PipeFail => None,
            NoClobber => Some('C'),
            NoGlob => Some('f'),
            AllExport => Some('a'),
            XTrace => Some('x'),
            Verbose => Some('v'),
            HashAll => Some('h'),
            Notify => Some('b'),
            Monitor => Some('m'),
            Privileged => Some('p'),
            Physical => Some('P'),
            HistExpand => Some('H'),
            BraceExpand => Some('B'),
            Interactive => Some('i'),
        }
    }

    pub fn from_long_name(name: &str) -> std::option::Option<Self> {
        use Option::*;
        Some(match name {
            "errexit" => ErrExit,
            "nounset" => NoUnset,
            "pipefail" => PipeFail,
            "noclobber" => NoClobber,
            "noglob" => NoGlob,
            "allexport" => AllExport,
            "xtrace" => XTrace,
            "verbose" => Verbose,
            "hashall" => HashAll,
            "notify" => Notify,
            "monitor" => Monitor,
            "privileged" => Privileged,
            "physical" => Physical,
            "histexpand" => HistExpand,
            "braceexpand" => BraceExpand,
            "interactive" => Interactive,
            _ => return None,
        })
    }
}

impl fmt::Display for Option {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.long_name().fmt(f)
    }
}

/// Canonical letter order bash reports in `$-`. Options in this crate's
/// table each own exactly one slot via [`Option::short_letter`]; the
/// `o`/`n` bash itself reports here correspond to `set -o`/`noexec`
/// bookkeeping this workspace does not model as a boolean option and are
/// always omitted.
pub const DASH_LETTER_ORDER: &str = "hBfCueoxvnabimpPH";

/// Set of currently enabled options.
pub type OptionSet = EnumSet<Option>;

/// Renders the `$-` special parameter: every enabled option's short letter,
/// in [`DASH_LETTER_ORDER`].
pub fn dash_flags(options: OptionSet) -> String {
    let enabled: Vec<Option> = options.iter().collect();
    DASH_LETTER_ORDER
        .chars()
        .filter(|&c| enabled.iter().any(|&o| o.short_letter() == Some(c)))
        .collect()
}

/// The default set of options a freshly started non-interactive shell has
/// enabled, matching bash's defaults for the options this crate tracks.
pub fn defaults() -> OptionSet {
    HashAll | BraceExpand
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dash_flags_orders_enabled_letters_canonically() {
        let options = NoUnset | ErrExit | HashAll;
        assert_eq!(dash_flags(options), "hue");
    }

    #[test]
    fn long_name_round_trips_through_from_long_name() {
        for option in EnumSet::<Option>::all().iter() {
            assert_eq!(Option::from_long_name(option.long_name()), Some(option));
        }
    }
}
