//! `Display` implementations that reconstruct shell source text from an AST.
//!
//! Used for `xtrace`-style diagnostics and error messages, not for
//! round-tripping: locations are dropped and here-document bodies are
//! omitted, as is conventional for single-line reconstructions.

use super::*;
use std::fmt;
use std::fmt::Write as _;

impl fmt::Display for SpecialParam {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use SpecialParam::*;
        let c = match self {
            At => '@',
            Asterisk => '*',
            Number => '#',
            Question => '?',
            Hyphen => '-',
            Dollar => '$',
            Exclamation => '!',
            Zero => '0',
        };
        f.write_char(c)
    }
}

impl fmt::Display for Param {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.id)
    }
}

impl fmt::Display for SwitchType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use SwitchType::*;
        let c = match self {
            Alter => '+',
            Default => '-',
            Assign => '=',
            Error => '?',
        };
        f.write_char(c)
    }
}

impl fmt::Display for SwitchCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SwitchCondition::Unset => Ok(()),
            SwitchCondition::UnsetOrEmpty => f.write_char(':'),
        }
    }
}

impl fmt::Display for Switch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.condition, self.r#type, self.word)
    }
}

impl fmt::Display for TrimSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_char(match self {
            TrimSide::Prefix => '#',
            TrimSide::Suffix => '%',
        })
    }
}

impl fmt::Display for Trim {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.side.fmt(f)?;
        if self.length == TrimLength::Longest {
            self.side.fmt(f)?;
        }
        self.pattern.fmt(f)
    }
}

impl fmt::Display for Index {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Index::Arith(text) => write!(f, "[{text}]"),
            Index::All => f.write_str("[@]"),
        }
    }
}

impl fmt::Display for BracedParam {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("${")?;
        if let Modifier::Length = self.modifier {
            f.write_char('#')?;
        }
        if self.indirection != Indirection::Direct {
            f.write_char('!')?;
        }
        self.param.fmt(f)?;
        if let Some(index) = &self.index {
            index.fmt(f)?;
        }
        match self.indirection {
            Indirection::Direct | Indirection::Ref | Indirection::Keys => {}
            Indirection::PrefixNames => f.write_char('*')?,
            Indirection::PrefixNamesAt => f.write_char('@')?,
        }
        match &self.modifier {
            Modifier::None | Modifier::Length => (),
            Modifier::Switch(switch) => switch.fmt(f)?,
            Modifier::Trim(trim) => trim.fmt(f)?,
            Modifier::Subst(subst) => {
                if subst.all {
                    f.write_char('/')?;
                }
                match subst.anchor {
                    Some(TrimSide::Prefix) => f.write_char('#')?,
                    Some(TrimSide::Suffix) => f.write_char('%')?,
                    None => (),
                }
                write!(f, "/{}/{}", subst.pattern, subst.replacement)?;
            }
            Modifier::Transform(c) => write!(f, "@{c}")?,
        }
        f.write_char('}')
    }
}

impl fmt::Display for BackquoteUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackquoteUnit::Literal(c) => f.write_char(*c),
            BackquoteUnit::Backslashed(c) => write!(f, "\\{c}"),
        }
    }
}

impl fmt::Display for ProcessSubstDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_char(match self {
            ProcessSubstDirection::In => '<',
            ProcessSubstDirection::Out => '>',
        })
    }
}

impl fmt::Display for TextUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TextUnit::Literal(c) => f.write_char(*c),
            TextUnit::Backslashed(c) => write!(f, "\\{c}"),
            TextUnit::RawParam { param, .. } => write!(f, "${param}"),
            TextUnit::BracedParam(braced) => braced.fmt(f),
            TextUnit::CommandSubst { content, .. } => write!(f, "$({content})"),
            TextUnit::Backquote { content, .. } => {
                f.write_char('`')?;
                for unit in content {
                    unit.fmt(f)?;
                }
                f.write_char('`')
            }
            TextUnit::Arith { content, .. } => write!(f, "$(({content}))"),
            TextUnit::ProcessSubst {
                direction, command, ..
            } => write!(f, "{direction}({command})"),
        }
    }
}

impl fmt::Display for Text {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for unit in &self.0 {
            unit.fmt(f)?;
        }
        Ok(())
    }
}

impl fmt::Display for EscapeUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use EscapeUnit::*;
        match self {
            Literal(c) => f.write_char(*c),
            DoubleQuote => f.write_str("\\\""),
            SingleQuote => f.write_str("\\'"),
            Backslash => f.write_str("\\\\"),
            Question => f.write_str("\\?"),
            Alert => f.write_str("\\a"),
            Backspace => f.write_str("\\b"),
            Escape => f.write_str("\\e"),
            FormFeed => f.write_str("\\f"),
            Newline => f.write_str("\\n"),
            CarriageReturn => f.write_str("\\r"),
            Tab => f.write_str("\\t"),
            VerticalTab => f.write_str("\\v"),
            Control(b) => write!(f, "\\c{}", *b as char),
            Octal(b) => write!(f, "\\{b:03o}"),
            Hex(b) => write!(f, "\\x{b:02x}"),
            Unicode(c) => write!(f, "\\u{:x}", *c as u32),
        }
    }
}

impl fmt::Display for EscapedString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for unit in &self.0 {
            unit.fmt(f)?;
        }
        Ok(())
    }
}

/// Writes `s` quoted with single quotes only if it contains a character that
/// would otherwise be reinterpreted by the shell grammar when reconstructed.
pub fn quote_as_needed(s: &str, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    if s.is_empty() || s.contains(|c: char| " \t\n'\"\\$`|&;<>()*?[]#~!{}".contains(c)) {
        write!(f, "'{}'", s.replace('\'', r"'\''"))
    } else {
        f.write_str(s)
    }
}

impl fmt::Display for BraceItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_char('{')?;
        match self {
            BraceItem::Alternatives(words) => {
                for (i, word) in words.iter().enumerate() {
                    if i > 0 {
                        f.write_char(',')?;
                    }
                    word.fmt(f)?;
                }
            }
            BraceItem::Range { from, to, step } => {
                write!(f, "{from}..{to}")?;
                if let Some(step) = step {
                    write!(f, "..{step}")?;
                }
            }
        }
        f.write_char('}')
    }
}

impl fmt::Display for WordUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WordUnit::Unquoted(text_unit) => text_unit.fmt(f),
            WordUnit::SingleQuote(s) => write!(f, "'{s}'"),
            WordUnit::DoubleQuote(text) => write!(f, "\"{text}\""),
            WordUnit::DollarSingleQuote(s) => write!(f, "$'{s}'"),
            WordUnit::Tilde(s) => write!(f, "~{s}"),
            WordUnit::Brace(item) => item.fmt(f),
        }
    }
}

impl fmt::Display for Word {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for unit in &self.units {
            unit.fmt(f)?;
        }
        Ok(())
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Scalar(word) => word.fmt(f),
            Value::Array(words) => {
                f.write_char('(')?;
                for (i, word) in words.iter().enumerate() {
                    if i > 0 {
                        f.write_char(' ')?;
                    }
                    word.fmt(f)?;
                }
                f.write_char(')')
            }
            Value::Associative(pairs) => {
                f.write_char('(')?;
                for (i, (key, value)) in pairs.iter().enumerate() {
                    if i > 0 {
                        f.write_char(' ')?;
                    }
                    write!(f, "[{key}]={value}")?;
                }
                f.write_char(')')
            }
        }
    }
}

impl fmt::Display for Assign {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.name, self.value)
    }
}

impl fmt::Display for Fd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl fmt::Display for RedirOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use RedirOp::*;
        f.write_str(match self {
            FileIn => "<",
            FileInOut => "<>",
            FileOut => ">",
            FileAppend => ">>",
            FileClobber => ">|",
            FdIn => "<&",
            FdOut => ">&",
            String => "<<<",
        })
    }
}

impl fmt::Display for RedirBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RedirBody::Normal { operator, operand } => write!(f, "{operator}{operand}"),
            RedirBody::HereDoc(here_doc) => write!(f, "<<{}", here_doc.delimiter),
        }
    }
}

impl fmt::Display for Redir {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(fd) = self.fd {
            fd.fmt(f)?;
        }
        self.body.fmt(f)
    }
}

fn write_redirs(redirs: &[Redir], f: &mut fmt::Formatter<'_>) -> fmt::Result {
    for redir in redirs {
        write!(f, " {redir}")?;
    }
    Ok(())
}

impl fmt::Display for SimpleCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for assign in &self.assigns {
            if !first {
                f.write_char(' ')?;
            }
            first = false;
            assign.fmt(f)?;
        }
        for (word, _) in &self.words {
            if !first {
                f.write_char(' ')?;
            }
            first = false;
            word.fmt(f)?;
        }
        write_redirs(&self.redirs, f)
    }
}

impl fmt::Display for TestCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        f.write_str(" ]")
    }
}

impl fmt::Display for ElifThen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "elif {} then {}", self.condition, self.body)
    }
}

impl fmt::Display for CaseContinuation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            CaseContinuation::Break => ";;",
            CaseContinuation::FallThrough => ";&",
            CaseContinuation::Continue => ";;&",
        })
    }
}

impl fmt::Display for CaseItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, pattern) in self.patterns.iter().enumerate() {
            if i > 0 {
                f.write_str(" | ")?;
            }
            pattern.fmt(f)?;
        }
        write!(f, ") {} {}", self.body, self.continuation)
    }
}

impl fmt::Display for CompoundCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompoundCommand::Grouping(list) => write!(f, "{{ {list} }}"),
            CompoundCommand::Subshell { body, .. } => write!(f, "({body})"),
            CompoundCommand::For { name, values, body } => {
                write!(f, "for {name}")?;
                if let Some(values) = values {
                    f.write_str(" in")?;
                    for value in values {
                        write!(f, " {value}")?;
                    }
                }
                write!(f, "; do {body}; done")
            }
            CompoundCommand::CStyleFor {
                init,
                condition,
                update,
                body,
                ..
            } => write!(f, "for (({init}; {condition}; {update})); do {body}; done"),
            CompoundCommand::While { condition, body } => {
                write!(f, "while {condition}; do {body}; done")
            }
            CompoundCommand::Until { condition, body } => {
                write!(f, "until {condition}; do {body}; done")
            }
            CompoundCommand::If {
                condition,
                body,
                elifs,
                r#else,
            } => {
                write!(f, "if {condition}; then {body}")?;
                for elif in elifs {
                    write!(f, "; {elif}")?;
                }
                if let Some(r#else) = r#else {
                    write!(f, "; else {else}")?;
                }
                write!(f, "; fi")
            }
            CompoundCommand::Case { subject, items } => {
                write!(f, "case {subject} in ")?;
                for item in items {
                    write!(f, "{item} ")?;
                }
                f.write_str("esac")
            }
        }
    }
}

impl fmt::Display for FullCompoundCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.command.fmt(f)?;
        write_redirs(&self.redirs, f)
    }
}

impl fmt::Display for FunctionDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.has_keyword {
            write!(f, "function {} {}", self.name, self.body)
        } else {
            write!(f, "{}() {}", self.name, self.body)
        }
    }
}

impl fmt::Display for Coproc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("coproc ")?;
        if let Some(name) = &self.name {
            write!(f, "{name} ")?;
        }
        self.body.fmt(f)
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::Simple(simple) => simple.fmt(f),
            Command::Compound(compound) => compound.fmt(f),
            Command::Function(function) => function.fmt(f),
            Command::Test(test) => test.fmt(f),
            Command::ExtendedTest {
                condition, redirs, ..
            } => {
                write!(f, "[[ {condition} ]]")?;
                write_redirs(redirs, f)
            }
            Command::Arith {
                content, redirs, ..
            } => {
                write!(f, "(({content}))")?;
                write_redirs(redirs, f)
            }
            Command::Coproc(coproc) => coproc.fmt(f),
        }
    }
}

impl fmt::Display for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.negation {
            f.write_str("! ")?;
        }
        for (i, command) in self.commands.iter().enumerate() {
            if i > 0 {
                f.write_str(" | ")?;
            }
            command.fmt(f)?;
        }
        Ok(())
    }
}

impl fmt::Display for AndOr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            AndOr::AndThen => "&&",
            AndOr::OrElse => "||",
        })
    }
}

impl fmt::Display for AndOrList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.first.fmt(f)?;
        for (op, pipeline) in &self.rest {
            write!(f, " {op} {pipeline}")?;
        }
        Ok(())
    }
}

impl fmt::Display for Item {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.and_or.fmt(f)?;
        if self.async_flag.is_some() {
            f.write_str(" &")?;
        }
        Ok(())
    }
}

impl fmt::Display for List {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, item) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            item.fmt(f)?;
        }
        Ok(())
    }
}
