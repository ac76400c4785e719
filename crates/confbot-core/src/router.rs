use std::collections::HashMap;

use crate::{
    fault::HandlerResult,
    handlers::{self, CommandContext},
};

/// Every command the bot understands.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CommandKind {
    Stats,
    Needs,
    Need,
    NeedRemove,
    Help,
    About,
}

/// Handler names after token normalization (`need-remove` → `need_remove`).
const COMMAND_TABLE: &[(&str, CommandKind)] = &[
    ("stats", CommandKind::Stats),
    ("needs", CommandKind::Needs),
    ("need", CommandKind::Need),
    ("need_remove", CommandKind::NeedRemove),
    ("help", CommandKind::Help),
    ("about", CommandKind::About),
];

/// A command line with its addressing prefix already removed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CommandLine<'a> {
    /// The whole line, trimmed.
    pub raw: &'a str,
    /// Characters up to the first space.
    pub token: &'a str,
    /// Remainder after the first space; `None` when absent or blank.
    pub argument: Option<&'a str>,
}

impl<'a> CommandLine<'a> {
    pub fn parse(line: &'a str) -> Self {
        let raw = line.trim();
        let (token, argument) = match raw.split_once(' ') {
            Some((token, rest)) => {
                let rest = rest.trim();
                (token, (!rest.is_empty()).then_some(rest))
            }
            None => (raw, None),
        };
        Self {
            raw,
            token,
            argument,
        }
    }
}

/// Maps command tokens to handlers. Selection only: faults propagate to the
/// caller untouched.
#[derive(Clone, Debug)]
pub struct CommandRouter {
    table: HashMap<&'static str, CommandKind>,
}

impl Default for CommandRouter {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandRouter {
    pub fn new() -> Self {
        Self {
            table: COMMAND_TABLE.iter().copied().collect(),
        }
    }

    pub fn resolve(&self, token: &str) -> Option<CommandKind> {
        self.table.get(normalize_token(token).as_str()).copied()
    }

    pub async fn dispatch(&self, ctx: &CommandContext<'_>, line: &CommandLine<'_>) -> HandlerResult {
        let Some(kind) = self.resolve(line.token) else {
            return handlers::not_understood(ctx, line.raw).await;
        };

        match kind {
            CommandKind::Stats => handlers::info::stats(ctx).await,
            CommandKind::Needs => handlers::needs::list(ctx).await,
            CommandKind::Need => handlers::needs::create(ctx, line.argument).await,
            CommandKind::NeedRemove => handlers::needs::remove(ctx, line.argument).await,
            CommandKind::Help => handlers::info::help(ctx).await,
            CommandKind::About => handlers::info::about(ctx).await,
        }
    }
}

/// Map word separators in a token onto the handler naming convention.
fn normalize_token(token: &str) -> String {
    token.replace('-', "_")
}
