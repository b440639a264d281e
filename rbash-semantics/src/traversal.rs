//! Uniform child-statement enumeration and rebuild for compound commands.
//!
//! Grounded on the generic-dispatch shape the teacher uses for its
//! `Command` trait (`yash_semantics::command::Command`), adapted here from
//! "execute" dispatch to "enumerate / rebuild" dispatch, which is this
//! protocol's actual job: it lets a caller rewrite every `List` inside a
//! tree (e.g. alias post-processing, or a future optimization pass)
//! without a per-node `match` of its own.

use rbash_syntax::syntax::{CompoundCommand, ElifThen, List};

/// A node whose statement-list children can be enumerated and replaced
/// uniformly. Non-statement tokens a node also carries (pattern words,
/// loop variable names, `for`-C clause source text) are preserved
/// positionally by `rebuild`, which clones `self` and only swaps in the
/// lists at the positions `children` enumerated.
pub trait Walk {
    fn children(&self) -> Vec<&List>;
    fn rebuild(&self, children: Vec<List>) -> Self;
}

impl Walk for CompoundCommand {
    fn children(&self) -> Vec<&List> {
        match self {
            CompoundCommand::Grouping(body) => vec![body],
            CompoundCommand::Subshell { body, .. } => vec![body],
            CompoundCommand::For { body, .. } => vec![body],
            CompoundCommand::CStyleFor { body, .. } => vec![body],
            CompoundCommand::While { condition, body } => vec![condition, body],
            CompoundCommand::Until { condition, body } => vec![condition, body],
            CompoundCommand::If {
                condition,
                body,
                elifs,
                r#else,
            } => {
                let mut lists = vec![condition, body];
                for elif in elifs {
                    lists.push(&elif.condition);
                    lists.push(&elif.body);
                }
                if let Some(else_body) = r#else {
                    lists.push(else_body);
                }
                lists
            }
            CompoundCommand::Case { items, .. } => items.iter().map(|item| &item.body).collect(),
        }
    }

    fn rebuild(&self, mut children: Vec<List>) -> Self {
        let mut next = || children.remove(0);
        match self {
            CompoundCommand::Grouping(_) => CompoundCommand::Grouping(next()),
            CompoundCommand::Subshell { location, .. } => CompoundCommand::Subshell {
                body: std::rc::Rc::new(next()),
                location: location.clone(),
            },
            CompoundCommand::For { name, values, .. } => CompoundCommand::For {
                name: name.clone(),
                values: values.clone(),
                body: next(),
            },
            CompoundCommand::CStyleFor {
                init,
                condition,
                update,
                location,
                ..
            } => CompoundCommand::CStyleFor {
                init: init.clone(),
                condition: condition.clone(),
                update: update.clone(),
                body: next(),
                location: location.clone(),
            },
            CompoundCommand::While { .. } => CompoundCommand::While {
                condition: next(),
                body: next(),
            },
            CompoundCommand::Until { .. } => CompoundCommand::Until {
                condition: next(),
                body: next(),
            },
            CompoundCommand::If { elifs, r#else, .. } => CompoundCommand::If {
                condition: next(),
                body: next(),
                elifs: elifs
                    .iter()
                    .map(|_| ElifThen {
                        condition: next(),
                        body: next(),
                    })
                    .collect(),
                r#else: r#else.as_ref().map(|_| next()),
            },
            CompoundCommand::Case { subject, items } => CompoundCommand::Case {
                subject: subject.clone(),
                items: items
                    .iter()
                    .map(|item| rbash_syntax::syntax::CaseItem {
                        patterns: item.patterns.clone(),
                        body: next(),
                        continuation: item.continuation,
                    })
                    .collect(),
            },
        }
    }
}
