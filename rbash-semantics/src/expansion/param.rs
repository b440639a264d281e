//! Stage 3 (parameter expansion) together with the surrounding text/word
//! unit walk that also drives stages 4-6 (command substitution, arithmetic
//! expansion, process substitution), since all of these live at the same
//! `TextUnit`/`WordUnit` granularity and must be threaded through the same
//! running `StateDelta`.
//!
//! Grounded on §4.1 bullet 3's operator list, including `${!ref}`
//! indirection and `${!prefix*}`/`${!prefix@}`/`${!name[@]}` name/key
//! listing: `rbash_syntax::syntax::BracedParam` carries an `indirection`
//! field (added alongside this evaluator, since the parser collaborator
//! that would otherwise produce it is out of scope per §1) distinguishing
//! these four `${!...}` shapes from an ordinary `${name}`.

use super::Segment;
use crate::context::Context;
use crate::error::{Error, Result};
use rbash_env::session::{Env, StateDelta};
use rbash_env::variable::{self, Attribute, Value, Variable};
use rbash_fnmatch::Pattern;
use rbash_syntax::source::Location;
use rbash_syntax::syntax::{
    BackquoteUnit, BracedParam, Index, Indirection, Modifier, Param, ParamType, SpecialParam,
    SwitchCondition, SwitchType, Text, TextUnit, TrimLength, TrimSide, Word, WordUnit,
};
use std::rc::Rc;

/// Expands every unit of `word` (already past brace/tilde expansion) into
/// segments carrying their quoted-ness, for stage 7 to split on.
pub fn expand_word_to_segments(
    word: &Word,
    context: &Context,
    env: &mut Env,
    delta: &mut StateDelta,
) -> Result<Vec<Segment>> {
    let mut segments = Vec::new();
    for unit in &word.units {
        segments.extend(expand_word_unit(unit, context, env, delta)?);
    }
    Ok(segments)
}

fn expand_word_unit(
    unit: &WordUnit,
    context: &Context,
    env: &mut Env,
    delta: &mut StateDelta,
) -> Result<Vec<Segment>> {
    match unit {
        WordUnit::Unquoted(text_unit) => {
            let (text, splittable) = expand_text_unit(text_unit, context, env, delta)?;
            Ok(vec![Segment {
                text,
                splittable,
            }])
        }
        WordUnit::SingleQuote(s) => Ok(vec![Segment::quoted(s.clone())]),
        WordUnit::DoubleQuote(text) => {
            Ok(vec![Segment::quoted(expand_text(text, context, env, delta)?)])
        }
        WordUnit::DollarSingleQuote(escaped) => {
            Ok(vec![Segment::quoted(decode_escaped_string(escaped))])
        }
        // Already resolved by the tilde stage if it was expandable; a
        // surviving Tilde unit here means it was left untouched.
        WordUnit::Tilde(suffix) => Ok(vec![Segment::unquoted(format!("~{suffix}"))]),
        // Already resolved by the brace stage.
        WordUnit::Brace(_) => Ok(vec![]),
    }
}

pub(crate) fn expand_text(
    text: &Text,
    context: &Context,
    env: &mut Env,
    delta: &mut StateDelta,
) -> Result<String> {
    let mut out = String::new();
    for unit in &text.0 {
        let (s, _) = expand_text_unit(unit, context, env, delta)?;
        out.push_str(&s);
    }
    Ok(out)
}

fn expand_text_unit(
    unit: &TextUnit,
    context: &Context,
    env: &mut Env,
    delta: &mut StateDelta,
) -> Result<(String, bool)> {
    match unit {
        TextUnit::Literal(c) => Ok((c.to_string(), true)),
        TextUnit::Backslashed(c) => Ok((c.to_string(), false)),
        TextUnit::RawParam { param, location } => {
            let value = expand_param(param, None, &Modifier::None, location, context, env, delta)?;
            Ok((value, true))
        }
        TextUnit::BracedParam(bp) => {
            let value = expand_braced_param(bp, context, env, delta)?;
            Ok((value, true))
        }
        TextUnit::CommandSubst { content, location } => {
            let value = crate::expansion::command_subst::run(content, location, context, env, delta)?;
            Ok((value, true))
        }
        TextUnit::Backquote { content, location } => {
            let source: String = content
                .iter()
                .map(|u| match u {
                    BackquoteUnit::Literal(c) => *c,
                    BackquoteUnit::Backslashed(c) => *c,
                })
                .collect();
            let value =
                crate::expansion::command_subst::run(&Rc::from(source), location, context, env, delta)?;
            Ok((value, true))
        }
        TextUnit::Arith { content, location } => {
            let value = crate::expansion::arith::expand(content, location, context, env, delta);
            Ok((value, true))
        }
        TextUnit::ProcessSubst {
            direction,
            command,
            location,
        } => {
            let path = crate::expansion::process_subst::expand(
                *direction, command, location, context, env,
            )?;
            Ok((path, true))
        }
    }
}

fn expand_braced_param(
    bp: &BracedParam,
    context: &Context,
    env: &mut Env,
    delta: &mut StateDelta,
) -> Result<String> {
    match bp.indirection {
        Indirection::Direct => {
            expand_param(&bp.param, bp.index.as_ref(), &bp.modifier, &bp.location, context, env, delta)
        }
        Indirection::Ref => expand_indirect_ref(bp, context, env, delta),
        Indirection::PrefixNames | Indirection::PrefixNamesAt => {
            // Embedded `$@`-like forms already collapse to `$*`'s
            // IFS-joined behavior in this crate (see `word::is_standalone_at`'s
            // doc comment); name-listing follows the same simplification
            // rather than splicing into separate fields here.
            let prefix = &bp.param.id;
            let mut names: Vec<&str> = env
                .variables
                .keys()
                .filter(|name| name.starts_with(prefix.as_str()))
                .map(String::as_str)
                .collect();
            names.sort_unstable();
            Ok(names.join(&ifs_first_char(env).to_string()))
        }
        Indirection::Keys => {
            let resolved = resolve(&bp.param, None, context, env, delta)?;
            Ok(match resolved {
                Resolved::Unset => String::new(),
                Resolved::Scalar(_) => "0".to_owned(),
                Resolved::Array(items) => items
                    .into_iter()
                    .map(|(k, _)| k)
                    .collect::<Vec<_>>()
                    .join(&ifs_first_char(env).to_string()),
            })
        }
    }
}

/// `${!ref}`: `ref`'s current scalar value names the variable to actually
/// expand — one level of indirection, not bash's full nameref chasing
/// (that is [`rbash_env::variable::resolve_name`]'s concern for assignment
/// targets; here it only matters for a read).
fn expand_indirect_ref(
    bp: &BracedParam,
    context: &Context,
    env: &mut Env,
    delta: &mut StateDelta,
) -> Result<String> {
    let target_name = match &bp.param.r#type {
        ParamType::Variable => variable::get(&env.variables, &bp.param.id)
            .and_then(|v| v.value())
            .and_then(|v| v.as_scalar())
            .map(str::to_owned)
            .unwrap_or_default(),
        ParamType::Positional(_) | ParamType::Special(_) => {
            expand_special_or_positional(&bp.param, env)
        }
    };
    if target_name.is_empty() {
        return Ok(String::new());
    }
    let target_param = Param::variable(target_name);
    expand_param(&target_param, bp.index.as_ref(), &bp.modifier, &bp.location, context, env, delta)
}

fn expand_special_or_positional(param: &Param, env: &Env) -> String {
    match &param.r#type {
        ParamType::Positional(n) => env
            .current_positional_params()
            .get(n.saturating_sub(1))
            .cloned()
            .unwrap_or_default(),
        ParamType::Special(special) => expand_special(*special, env),
        ParamType::Variable => unreachable!("handled by the caller"),
    }
}

/// What a parameter currently resolves to, unifying scalar and array
/// access so modifiers can operate uniformly.
enum Resolved {
    Unset,
    Scalar(String),
    /// Every element, in iteration order, as `(subscript, value)`.
    Array(Vec<(String, String)>),
}

fn resolve(
    param: &Param,
    index: Option<&Index>,
    context: &Context,
    env: &mut Env,
    delta: &mut StateDelta,
) -> Result<Resolved> {
    let base = match &param.r#type {
        ParamType::Variable => match variable::get(&env.variables, &param.id) {
            None => Resolved::Unset,
            Some(Variable::Nameref { .. }) => Resolved::Unset,
            Some(Variable::Value { value: None, .. }) => Resolved::Unset,
            Some(Variable::Value {
                value: Some(Value::Scalar(s)),
                ..
            }) => Resolved::Scalar(s.clone()),
            Some(Variable::Value {
                value: Some(Value::Indexed(map)),
                ..
            }) => Resolved::Array(map.iter().map(|(i, v)| (i.to_string(), v.clone())).collect()),
            Some(Variable::Value {
                value: Some(Value::Associative(map)),
                ..
            }) => Resolved::Array(map.iter().map(|(k, v)| (k.clone(), v.clone())).collect()),
        },
        ParamType::Positional(n) => Resolved::Scalar(
            env.current_positional_params()
                .get(n.saturating_sub(1))
                .cloned()
                .unwrap_or_default(),
        ),
        ParamType::Special(special) => Resolved::Scalar(expand_special(*special, env)),
    };

    match index {
        None => Ok(base),
        Some(Index::All) => Ok(base),
        Some(Index::Arith(text)) => {
            let source = expand_text(text, context, env, delta).unwrap_or_default();
            let mut adapter = crate::expansion::arith::ArithAdapter { env, delta };
            let i = rbash_arith::eval(&source, &mut adapter).unwrap_or(0);
            match base {
                Resolved::Array(items) => Ok(items
                    .into_iter()
                    .find(|(k, _)| *k == i.to_string() || k.parse::<i64>() == Ok(i))
                    .map(|(_, v)| Resolved::Scalar(v))
                    .unwrap_or(Resolved::Unset)),
                Resolved::Scalar(s) if i == 0 => Ok(Resolved::Scalar(s)),
                _ => Ok(Resolved::Unset),
            }
        }
    }
}

fn ifs_first_char(env: &Env) -> char {
    env.get_variable("IFS")
        .and_then(|v| v.value())
        .and_then(|v| v.as_scalar())
        .and_then(|s| s.chars().next())
        .unwrap_or(' ')
}

fn expand_special(special: SpecialParam, env: &Env) -> String {
    match special {
        SpecialParam::At | SpecialParam::Asterisk => {
            let sep = ifs_first_char(env).to_string();
            env.current_positional_params().join(&sep)
        }
        SpecialParam::Number => env.current_positional_params().len().to_string(),
        SpecialParam::Question => env.exit_status.to_string(),
        SpecialParam::Hyphen => rbash_env::option::dash_flags(env.options),
        SpecialParam::Dollar => env.pid.to_string(),
        SpecialParam::Exclamation => env
            .jobs
            .last_async_pid()
            .map(|p| p.to_string())
            .unwrap_or_default(),
        SpecialParam::Zero => env.shell_name.clone(),
    }
}

#[allow(clippy::too_many_arguments)]
fn expand_param(
    param: &Param,
    index: Option<&Index>,
    modifier: &Modifier,
    location: &Location,
    context: &Context,
    env: &mut Env,
    delta: &mut StateDelta,
) -> Result<String> {
    let is_set = matches!(param.r#type, ParamType::Variable)
        && variable::get(&env.variables, &param.id).is_some();
    let resolved = resolve(param, index, context, env, delta)?;

    let scalarized = |resolved: Resolved, env: &Env| -> String {
        match resolved {
            Resolved::Unset => String::new(),
            Resolved::Scalar(s) => s,
            Resolved::Array(items) => {
                let sep = ifs_first_char(env).to_string();
                items
                    .into_iter()
                    .map(|(_, v)| v)
                    .collect::<Vec<_>>()
                    .join(&sep)
            }
        }
    };

    match modifier {
        Modifier::None => {
            let is_unset_or_null = matches!(&resolved, Resolved::Unset)
                || matches!(&resolved, Resolved::Scalar(s) if s.is_empty());
            if is_unset_or_null && !is_set && env.options.contains(rbash_env::option::Option::NoUnset)
            {
                return Err(Error::Expansion {
                    name: param.id.clone(),
                    location: location.clone(),
                });
            }
            Ok(scalarized(resolved, env))
        }
        Modifier::Length => Ok(match resolved {
            Resolved::Unset => "0".to_owned(),
            Resolved::Scalar(s) => s.chars().count().to_string(),
            Resolved::Array(items) => items.len().to_string(),
        }),
        Modifier::Switch(sw) => expand_switch(sw, resolved, param, context, env, delta),
        Modifier::Trim(trim) => {
            let value = scalarized(resolved, env);
            Ok(apply_trim(trim, &value, context, env, delta)?)
        }
        Modifier::Subst(subst) => {
            let value = scalarized(resolved, env);
            apply_subst(subst, &value, context, env, delta)
        }
        Modifier::Transform(c) => apply_transform(*c, param, resolved, env),
    }
}

fn expand_switch(
    sw: &rbash_syntax::syntax::Switch,
    resolved: Resolved,
    param: &Param,
    context: &Context,
    env: &mut Env,
    delta: &mut StateDelta,
) -> Result<String> {
    let (is_unset, is_empty, current) = match &resolved {
        Resolved::Unset => (true, true, String::new()),
        Resolved::Scalar(s) => (false, s.is_empty(), s.clone()),
        Resolved::Array(items) => (
            false,
            items.is_empty(),
            items
                .iter()
                .map(|(_, v)| v.clone())
                .collect::<Vec<_>>()
                .join(" "),
        ),
    };
    let triggers = match sw.condition {
        SwitchCondition::Unset => is_unset,
        SwitchCondition::UnsetOrEmpty => is_unset || is_empty,
    };

    match sw.r#type {
        SwitchType::Default => {
            if triggers {
                expand_word_joined(&sw.word, context, env, delta)
            } else {
                Ok(current)
            }
        }
        SwitchType::Alter => {
            if triggers {
                Ok(String::new())
            } else {
                expand_word_joined(&sw.word, context, env, delta)
            }
        }
        SwitchType::Assign => {
            if triggers {
                let value = expand_word_joined(&sw.word, context, env, delta)?;
                assign_scalar(env, delta, &param.id, value.clone())?;
                Ok(value)
            } else {
                Ok(current)
            }
        }
        SwitchType::Error => {
            if triggers {
                let message = expand_word_joined(&sw.word, context, env, delta)?;
                let message = if message.is_empty() {
                    "parameter null or not set".to_owned()
                } else {
                    message
                };
                Err(Error::BadSubstitution {
                    name: param.id.clone(),
                    message,
                    location: Location::dummy(),
                })
            } else {
                Ok(current)
            }
        }
    }
}

fn expand_word_joined(
    word: &Word,
    context: &Context,
    env: &mut Env,
    delta: &mut StateDelta,
) -> Result<String> {
    let segments = expand_word_to_segments(word, context, env, delta)?;
    Ok(segments.into_iter().map(|s| s.text).collect())
}

fn assign_scalar(env: &mut Env, delta: &mut StateDelta, name: &str, value: String) -> Result<()> {
    let resolved = variable::resolve_name(&env.variables, name).unwrap_or_else(|| name.to_owned());
    let var = env
        .variables
        .entry(resolved.clone())
        .or_insert_with(Variable::unset);
    var.assign(&resolved, Value::scalar(value), None)
        .map_err(|_| Error::ReadOnly {
            name: resolved.clone(),
            location: Location::dummy(),
        })?;
    delta.var_updates.insert(resolved, var.clone());
    Ok(())
}

fn apply_trim(
    trim: &rbash_syntax::syntax::Trim,
    value: &str,
    context: &Context,
    env: &mut Env,
    delta: &mut StateDelta,
) -> Result<String> {
    let pattern_source = expand_word_joined(&trim.pattern, context, env, delta)?;
    let pattern = Pattern::parse(&pattern_source).map_err(|e| Error::Regex {
        pattern: pattern_source.clone(),
        message: e.to_string(),
        location: Location::dummy(),
    })?;
    let boundary = match (trim.side, trim.length) {
        (TrimSide::Prefix, TrimLength::Shortest) => pattern.shortest_prefix(value),
        (TrimSide::Prefix, TrimLength::Longest) => pattern.longest_prefix(value),
        (TrimSide::Suffix, TrimLength::Shortest) => pattern.shortest_suffix(value),
        (TrimSide::Suffix, TrimLength::Longest) => pattern.longest_suffix(value),
    };
    Ok(match (trim.side, boundary) {
        (TrimSide::Prefix, Some(len)) => value[len..].to_owned(),
        (TrimSide::Suffix, Some(start)) => value[..start].to_owned(),
        (_, None) => value.to_owned(),
    })
}

fn apply_subst(
    subst: &rbash_syntax::syntax::Subst,
    value: &str,
    context: &Context,
    env: &mut Env,
    delta: &mut StateDelta,
) -> Result<String> {
    let pattern_source = expand_word_joined(&subst.pattern, context, env, delta)?;
    let replacement = expand_word_joined(&subst.replacement, context, env, delta)?;
    let pattern = Pattern::parse(&pattern_source).map_err(|e| Error::Regex {
        pattern: pattern_source.clone(),
        message: e.to_string(),
        location: Location::dummy(),
    })?;

    if let Some(anchor) = subst.anchor {
        let boundary = match anchor {
            TrimSide::Prefix => pattern.longest_prefix(value),
            TrimSide::Suffix => pattern.longest_suffix(value),
        };
        return Ok(match (anchor, boundary) {
            (TrimSide::Prefix, Some(len)) => format!("{replacement}{}", &value[len..]),
            (TrimSide::Suffix, Some(start)) => format!("{}{replacement}", &value[..start]),
            (_, None) => value.to_owned(),
        });
    }

    let mut out = String::new();
    let mut rest = value;
    let mut replaced_once = false;
    loop {
        match pattern.find(rest) {
            Some((start, end)) if start == end && replaced_once && !subst.all => break,
            Some((start, end)) => {
                out.push_str(&rest[..start]);
                out.push_str(&replacement);
                replaced_once = true;
                if end == start {
                    // Zero-width match: advance one char to avoid looping forever.
                    let mut chars = rest[end..].char_indices();
                    if let Some((_, c)) = chars.next() {
                        out.push(c);
                        rest = &rest[end + c.len_utf8()..];
                    } else {
                        rest = &rest[end..];
                    }
                } else {
                    rest = &rest[end..];
                }
                if !subst.all {
                    out.push_str(rest);
                    return Ok(out);
                }
            }
            None => {
                out.push_str(rest);
                break;
            }
        }
    }
    Ok(out)
}

/// `${name@op}` operand transforms (§4.1 bullet 3). `op` is one of the nine
/// letters `QEAauLPKk`; everything but `A`/`a`/`K`/`k` only needs the
/// scalarized value, but those four need the unresolved shape (array vs.
/// scalar) and, for `A`, the variable's own attributes — so this takes
/// `resolved` rather than an already-joined string.
fn apply_transform(c: char, param: &Param, resolved: Resolved, env: &Env) -> Result<String> {
    match c {
        'Q' => Ok(rbash_quote::quote(&scalar_value(&resolved, env)).into_owned()),
        'E' => Ok(expand_backslash_escapes(&scalar_value(&resolved, env))),
        'U' => Ok(scalar_value(&resolved, env).to_uppercase()),
        'u' => {
            let value = scalar_value(&resolved, env);
            let mut chars = value.chars();
            Ok(match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            })
        }
        'L' => Ok(scalar_value(&resolved, env).to_lowercase()),
        'A' => Ok(declare_reassignment(&param.id, variable::get(&env.variables, &param.id))),
        'a' => Ok(attribute_flags(variable::get(&env.variables, &param.id))),
        'P' => Ok(expand_prompt_escapes(&scalar_value(&resolved, env), env)),
        'K' | 'k' => Ok(quoted_key_value_pairs(&resolved, c == 'k')),
        _ => Err(Error::BadSubstitution {
            name: param.id.clone(),
            message: format!("{c}: invalid parameter transformation operator"),
            location: Location::dummy(),
        }),
    }
}

fn scalar_value(resolved: &Resolved, env: &Env) -> String {
    match resolved {
        Resolved::Unset => String::new(),
        Resolved::Scalar(s) => s.clone(),
        Resolved::Array(items) => {
            let sep = ifs_first_char(env).to_string();
            items.iter().map(|(_, v)| v.clone()).collect::<Vec<_>>().join(&sep)
        }
    }
}

/// Decodes `$'...'`-style backslash escapes appearing literally in `value`
/// (as opposed to [`decode_escaped_string`], which walks an already-parsed
/// [`rbash_syntax::syntax::EscapedString`]) — the `E` transform applies
/// this to a plain runtime string, e.g. a variable holding `"a\\tb"`.
fn expand_backslash_escapes(value: &str) -> String {
    let mut out = String::new();
    let mut chars = value.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('a') => out.push('\u{7}'),
            Some('b') => out.push('\u{8}'),
            Some('e') | Some('E') => out.push('\u{1b}'),
            Some('f') => out.push('\u{c}'),
            Some('v') => out.push('\u{b}'),
            Some('\\') => out.push('\\'),
            Some('\'') => out.push('\''),
            Some('"') => out.push('"'),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}

/// `@A`'s `declare`-style reassignment text: what you'd type to recreate
/// this variable's current attributes and value.
fn declare_reassignment(name: &str, var: Option<&Variable>) -> String {
    let is_nameref = matches!(var, Some(Variable::Nameref { .. }));
    let mut flags = String::new();
    if is_nameref {
        flags.push('n');
    }
    if let Some(Variable::Value { attributes, value, .. }) = var {
        match value {
            Some(Value::Indexed(_)) => flags.push('a'),
            Some(Value::Associative(_)) => flags.push('A'),
            _ => {}
        }
        if attributes.contains(Attribute::Integer) {
            flags.push('i');
        }
        if attributes.contains(Attribute::Lowercase) {
            flags.push('l');
        }
        if attributes.contains(Attribute::Uppercase) {
            flags.push('u');
        }
        if attributes.contains(Attribute::Export) {
            flags.push('x');
        }
    }
    if var.map(Variable::is_read_only).unwrap_or(false) {
        flags.push('r');
    }
    let flags = if flags.is_empty() { "--".to_owned() } else { format!("-{flags}") };

    let body = match var {
        Some(Variable::Nameref { target, .. }) => format!("{name}={target}"),
        Some(Variable::Value { value: Some(Value::Scalar(s)), .. }) => {
            format!("{name}={}", declare_quote(s))
        }
        Some(Variable::Value { value: Some(Value::Indexed(map)), .. }) => {
            let items = map
                .iter()
                .map(|(i, v)| format!("[{i}]={}", declare_quote(v)))
                .collect::<Vec<_>>()
                .join(" ");
            format!("{name}=({items})")
        }
        Some(Variable::Value { value: Some(Value::Associative(map)), .. }) => {
            let items = map
                .iter()
                .map(|(k, v)| format!("[{k}]={}", declare_quote(v)))
                .collect::<Vec<_>>()
                .join(" ");
            format!("{name}=({items})")
        }
        Some(Variable::Value { value: None, .. }) | None => name.to_owned(),
    };
    format!("declare {flags} {body}")
}

fn declare_quote(value: &str) -> String {
    let mut out = String::from("\"");
    for c in value.chars() {
        if matches!(c, '\\' | '"' | '$' | '`') {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('"');
    out
}

/// `@a`'s attribute-letter string (bash's `declare -p` flag set, minus the
/// `-`), e.g. `"ax"` for an exported integer.
fn attribute_flags(var: Option<&Variable>) -> String {
    let mut flags = String::new();
    match var {
        Some(Variable::Nameref { .. }) => flags.push('n'),
        Some(Variable::Value { attributes, value, .. }) => {
            match value {
                Some(Value::Indexed(_)) => flags.push('a'),
                Some(Value::Associative(_)) => flags.push('A'),
                _ => {}
            }
            if attributes.contains(Attribute::Integer) {
                flags.push('i');
            }
            if attributes.contains(Attribute::Lowercase) {
                flags.push('l');
            }
            if attributes.contains(Attribute::Uppercase) {
                flags.push('u');
            }
            if attributes.contains(Attribute::Export) {
                flags.push('x');
            }
        }
        None => {}
    }
    if var.map(Variable::is_read_only).unwrap_or(false) {
        flags.push('r');
    }
    flags
}

/// `@P`: expands a handful of `PS1`-style backslash prompt escapes in
/// `value`, the way a prompt string itself would be expanded before
/// display. Unrecognized sequences are left as-is.
fn expand_prompt_escapes(value: &str, env: &Env) -> String {
    let username = || {
        env.get_variable("USER")
            .and_then(|v| v.value())
            .and_then(|v| v.as_scalar())
            .map(str::to_owned)
            .unwrap_or_default()
    };
    let hostname = || {
        env.get_variable("HOSTNAME")
            .and_then(|v| v.value())
            .and_then(|v| v.as_scalar())
            .map(str::to_owned)
            .unwrap_or_default()
    };
    let home = env
        .get_variable("HOME")
        .and_then(|v| v.value())
        .and_then(|v| v.as_scalar())
        .map(str::to_owned);
    let cwd = env.working_dir.to_string_lossy().into_owned();
    let cwd_tilde = match &home {
        Some(h) if !h.is_empty() && cwd.starts_with(h.as_str()) => {
            format!("~{}", &cwd[h.len()..])
        }
        _ => cwd.clone(),
    };

    let mut out = String::new();
    let mut chars = value.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('u') => out.push_str(&username()),
            Some('h') => out.push_str(hostname().split('.').next().unwrap_or_default()),
            Some('H') => out.push_str(&hostname()),
            Some('w') => out.push_str(&cwd_tilde),
            Some('W') => out.push_str(
                std::path::Path::new(&cwd_tilde)
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| cwd_tilde.clone())
                    .as_str(),
            ),
            Some('$') => out.push(if unsafe { libc::geteuid() } == 0 { '#' } else { '$' }),
            Some('!') => out.push_str(
                &env.jobs
                    .last_async_pid()
                    .map(|p| p.to_string())
                    .unwrap_or_default(),
            ),
            Some('s') => out.push_str(&env.shell_name),
            Some('\\') => out.push('\\'),
            Some('n') => out.push('\n'),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}

/// `@K`/`@k`: a quoted, reusable-as-input rendering of the value, with
/// array/associative indices included (`K`) or omitted (`k`).
fn quoted_key_value_pairs(resolved: &Resolved, omit_keys: bool) -> String {
    match resolved {
        Resolved::Unset => String::new(),
        Resolved::Scalar(s) => rbash_quote::quote(s).into_owned(),
        Resolved::Array(items) => items
            .iter()
            .map(|(k, v)| {
                if omit_keys {
                    rbash_quote::quote(v).into_owned()
                } else {
                    format!("[{k}]={}", rbash_quote::quote(v))
                }
            })
            .collect::<Vec<_>>()
            .join(" "),
    }
}

fn decode_escaped_string(escaped: &rbash_syntax::syntax::EscapedString) -> String {
    use rbash_syntax::syntax::EscapeUnit::*;
    let mut out = String::new();
    for unit in &escaped.0 {
        match unit {
            Literal(c) => out.push(*c),
            DoubleQuote => out.push('"'),
            SingleQuote => out.push('\''),
            Backslash => out.push('\\'),
            Question => out.push('?'),
            Alert => out.push('\u{7}'),
            Backspace => out.push('\u{8}'),
            Escape => out.push('\u{1b}'),
            FormFeed => out.push('\u{c}'),
            Newline => out.push('\n'),
            CarriageReturn => out.push('\r'),
            Tab => out.push('\t'),
            VerticalTab => out.push('\u{b}'),
            Control(b) => out.push((*b & 0x1f) as char),
            Octal(b) => out.push(*b as char),
            Hex(b) => out.push(*b as char),
            Unicode(c) => out.push(*c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{BuiltinRegistry, Context, NullParser, NullSpawner};
    use assert_matches::assert_matches;
    use rbash_env::io::Collector;
    use rbash_syntax::syntax::Param;

    fn test_env() -> Env {
        let collector = Collector::new();
        Env::new(collector.sink(), collector.sink())
    }

    fn test_context<'a>(builtins: &'a BuiltinRegistry) -> Context<'a> {
        Context::new(&NullParser, &NullSpawner, builtins, "rbash")
    }

    fn braced(param: Param, modifier: Modifier) -> BracedParam {
        BracedParam {
            param,
            index: None,
            modifier,
            indirection: Indirection::Direct,
            location: Location::dummy(),
        }
    }

    #[test]
    fn plain_lookup_returns_current_value() {
        let mut env = test_env();
        env.variables.insert("greeting".to_owned(), Variable::new("hi"));
        let mut delta = StateDelta::default();
        let builtins = BuiltinRegistry::new();
        let bp = braced(Param::variable("greeting"), Modifier::None);
        let value = expand_braced_param(&bp, &test_context(&builtins), &mut env, &mut delta).unwrap();
        assert_eq!(value, "hi");
    }

    #[test]
    fn nounset_rejects_an_unbound_variable() {
        let mut env = test_env();
        env.options.insert(rbash_env::option::Option::NoUnset);
        let mut delta = StateDelta::default();
        let builtins = BuiltinRegistry::new();
        let bp = braced(Param::variable("missing"), Modifier::None);
        let err = expand_braced_param(&bp, &test_context(&builtins), &mut env, &mut delta).unwrap_err();
        assert_matches!(err, Error::Expansion { name, .. } if name == "missing");
    }

    #[test]
    fn default_switch_substitutes_without_assigning() {
        let mut env = test_env();
        let mut delta = StateDelta::default();
        let builtins = BuiltinRegistry::new();
        let bp = braced(
            Param::variable("missing"),
            Modifier::Switch(rbash_syntax::syntax::Switch {
                r#type: SwitchType::Default,
                condition: SwitchCondition::UnsetOrEmpty,
                word: Word::from_literal("fallback"),
            }),
        );
        let value = expand_braced_param(&bp, &test_context(&builtins), &mut env, &mut delta).unwrap();
        assert_eq!(value, "fallback");
        assert!(!env.variables.contains_key("missing"));
    }

    #[test]
    fn assign_switch_writes_the_variable_and_the_delta() {
        let mut env = test_env();
        let mut delta = StateDelta::default();
        let builtins = BuiltinRegistry::new();
        let bp = braced(
            Param::variable("x"),
            Modifier::Switch(rbash_syntax::syntax::Switch {
                r#type: SwitchType::Assign,
                condition: SwitchCondition::UnsetOrEmpty,
                word: Word::from_literal("seeded"),
            }),
        );
        let value = expand_braced_param(&bp, &test_context(&builtins), &mut env, &mut delta).unwrap();
        assert_eq!(value, "seeded");
        assert_eq!(
            env.get_variable("x").and_then(|v| v.value()).and_then(|v| v.as_scalar()),
            Some("seeded")
        );
        assert!(delta.var_updates.contains_key("x"));
    }

    #[test]
    fn longest_suffix_trim_strips_greedily() {
        let mut env = test_env();
        env.variables
            .insert("path".to_owned(), Variable::new("a.b.c.txt"));
        let mut delta = StateDelta::default();
        let builtins = BuiltinRegistry::new();
        let bp = braced(
            Param::variable("path"),
            Modifier::Trim(rbash_syntax::syntax::Trim {
                side: TrimSide::Suffix,
                length: TrimLength::Longest,
                pattern: Word::from_literal(".*"),
            }),
        );
        let value = expand_braced_param(&bp, &test_context(&builtins), &mut env, &mut delta).unwrap();
        assert_eq!(value, "a");
    }

    #[test]
    fn global_subst_replaces_every_match() {
        let mut env = test_env();
        env.variables
            .insert("csv".to_owned(), Variable::new("a,b,c"));
        let mut delta = StateDelta::default();
        let builtins = BuiltinRegistry::new();
        let bp = braced(
            Param::variable("csv"),
            Modifier::Subst(rbash_syntax::syntax::Subst {
                all: true,
                anchor: None,
                pattern: Word::from_literal(","),
                replacement: Word::from_literal(";"),
            }),
        );
        let value = expand_braced_param(&bp, &test_context(&builtins), &mut env, &mut delta).unwrap();
        assert_eq!(value, "a;b;c");
    }

    #[test]
    fn uppercase_transform_folds_the_whole_value() {
        let mut env = test_env();
        env.variables.insert("name".to_owned(), Variable::new("abc"));
        let mut delta = StateDelta::default();
        let builtins = BuiltinRegistry::new();
        let bp = braced(Param::variable("name"), Modifier::Transform('U'));
        let value = expand_braced_param(&bp, &test_context(&builtins), &mut env, &mut delta).unwrap();
        assert_eq!(value, "ABC");
    }

    #[test]
    fn length_modifier_counts_characters() {
        let mut env = test_env();
        env.variables
            .insert("word".to_owned(), Variable::new("héllo"));
        let mut delta = StateDelta::default();
        let builtins = BuiltinRegistry::new();
        let bp = braced(Param::variable("word"), Modifier::Length);
        let value = expand_braced_param(&bp, &test_context(&builtins), &mut env, &mut delta).unwrap();
        assert_eq!(value, "5");
    }

    #[test]
    fn at_e_transform_decodes_backslash_escapes() {
        let mut env = test_env();
        env.variables
            .insert("line".to_owned(), Variable::new("a\\tb\\n"));
        let mut delta = StateDelta::default();
        let builtins = BuiltinRegistry::new();
        let bp = braced(Param::variable("line"), Modifier::Transform('E'));
        let value = expand_braced_param(&bp, &test_context(&builtins), &mut env, &mut delta).unwrap();
        assert_eq!(value, "a\tb\n");
    }

    #[test]
    fn at_a_transform_on_a_scalar_emits_a_declare_statement() {
        let mut env = test_env();
        env.variables.insert("name".to_owned(), Variable::new("abc"));
        let mut delta = StateDelta::default();
        let builtins = BuiltinRegistry::new();
        let bp = braced(Param::variable("name"), Modifier::Transform('A'));
        let value = expand_braced_param(&bp, &test_context(&builtins), &mut env, &mut delta).unwrap();
        assert_eq!(value, "declare -- name=\"abc\"");
    }

    #[test]
    fn at_a_transform_on_an_array_lists_indices() {
        let mut env = test_env();
        env.variables
            .insert("arr".to_owned(), Variable::new_array(["x", "y"]));
        let mut delta = StateDelta::default();
        let builtins = BuiltinRegistry::new();
        let bp = braced(Param::variable("arr"), Modifier::Transform('A'));
        let value = expand_braced_param(&bp, &test_context(&builtins), &mut env, &mut delta).unwrap();
        assert_eq!(value, "declare -a arr=([0]=\"x\" [1]=\"y\")");
    }

    #[test]
    fn at_lowercase_a_transform_reports_attribute_letters() {
        let mut env = test_env();
        env.variables.insert(
            "name".to_owned(),
            Variable::new("abc").export(),
        );
        let mut delta = StateDelta::default();
        let builtins = BuiltinRegistry::new();
        let bp = braced(Param::variable("name"), Modifier::Transform('a'));
        let value = expand_braced_param(&bp, &test_context(&builtins), &mut env, &mut delta).unwrap();
        assert_eq!(value, "x");
    }

    #[test]
    fn at_k_transform_lists_indexed_key_value_pairs() {
        let mut env = test_env();
        env.variables
            .insert("arr".to_owned(), Variable::new_array(["x", "y"]));
        let mut delta = StateDelta::default();
        let builtins = BuiltinRegistry::new();
        let bp = braced(Param::variable("arr"), Modifier::Transform('K'));
        let value = expand_braced_param(&bp, &test_context(&builtins), &mut env, &mut delta).unwrap();
        assert_eq!(value, "[0]=\"x\" [1]=\"y\"");
    }

    #[test]
    fn an_unrecognized_transform_letter_is_an_error() {
        let mut env = test_env();
        env.variables.insert("x".to_owned(), Variable::new("v"));
        let mut delta = StateDelta::default();
        let builtins = BuiltinRegistry::new();
        let bp = braced(Param::variable("x"), Modifier::Transform('Z'));
        let err = expand_braced_param(&bp, &test_context(&builtins), &mut env, &mut delta).unwrap_err();
        assert_matches!(err, Error::BadSubstitution { name, .. } if name == "x");
    }

    #[test]
    fn indirect_expansion_follows_the_referenced_name() {
        let mut env = test_env();
        env.variables.insert("ref".to_owned(), Variable::new("target"));
        env.variables
            .insert("target".to_owned(), Variable::new("hello"));
        let mut delta = StateDelta::default();
        let builtins = BuiltinRegistry::new();
        let bp = BracedParam {
            param: Param::variable("ref"),
            index: None,
            modifier: Modifier::None,
            indirection: Indirection::Ref,
            location: Location::dummy(),
        };
        let value = expand_braced_param(&bp, &test_context(&builtins), &mut env, &mut delta).unwrap();
        assert_eq!(value, "hello");
    }

    #[test]
    fn prefix_names_lists_matching_variable_names() {
        let mut env = test_env();
        env.variables.insert("foo_a".to_owned(), Variable::new("1"));
        env.variables.insert("foo_b".to_owned(), Variable::new("2"));
        env.variables.insert("bar".to_owned(), Variable::new("3"));
        let mut delta = StateDelta::default();
        let builtins = BuiltinRegistry::new();
        let bp = BracedParam {
            param: Param::variable("foo_"),
            index: None,
            modifier: Modifier::None,
            indirection: Indirection::PrefixNames,
            location: Location::dummy(),
        };
        let value = expand_braced_param(&bp, &test_context(&builtins), &mut env, &mut delta).unwrap();
        assert_eq!(value, "foo_a foo_b");
    }

    #[test]
    fn keys_indirection_lists_array_indices() {
        let mut env = test_env();
        env.variables
            .insert("arr".to_owned(), Variable::new_array(["x", "y", "z"]));
        let mut delta = StateDelta::default();
        let builtins = BuiltinRegistry::new();
        let bp = BracedParam {
            param: Param::variable("arr"),
            index: Some(Index::All),
            modifier: Modifier::None,
            indirection: Indirection::Keys,
            location: Location::dummy(),
        };
        let value = expand_braced_param(&bp, &test_context(&builtins), &mut env, &mut delta).unwrap();
        assert_eq!(value, "0 1 2");
    }
}
