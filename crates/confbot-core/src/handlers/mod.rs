//! Command handlers.
//!
//! Each handler answers the requester with zero or more notices. Problems a
//! user can fix (missing argument, foreign need id) are answered here; anything
//! unexpected is returned as a [`HandlerFault`](crate::fault::HandlerFault) for
//! the session controller to report.

use crate::{
    fault::HandlerResult,
    ports::{ChatTransport, NeedStore},
};

pub mod info;
pub mod needs;

/// Everything a handler may touch during one command.
pub struct CommandContext<'a> {
    /// Nickname of the user who issued the command.
    pub requester: &'a str,
    /// The channel the bot joined.
    pub channel: &'a str,
    pub transport: &'a dyn ChatTransport,
    pub store: &'a dyn NeedStore,
}

impl CommandContext<'_> {
    /// Send one notice to the requester.
    pub async fn reply(&self, text: &str) -> HandlerResult {
        self.transport.notice(self.requester, text).await?;
        Ok(())
    }

    pub async fn reply_lines<S: AsRef<str>>(&self, lines: &[S]) -> HandlerResult {
        for line in lines {
            self.reply(line.as_ref()).await?;
        }
        Ok(())
    }
}

/// Fallback for tokens without a handler.
pub async fn not_understood(ctx: &CommandContext<'_>, line: &str) -> HandlerResult {
    ctx.reply(&format!("Not understood: {line}")).await
}
