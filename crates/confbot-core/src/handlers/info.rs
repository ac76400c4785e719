use std::collections::HashSet;

use crate::fault::HandlerResult;

use super::CommandContext;

const HELP_LINES: &[&str] = &[
    "confbot keeps a list of needs for this conference.",
    "Address me as \"<nick>: <command>\" in the channel, or message me directly.",
    "  needs -- list every open need",
    "  need <text> -- post a need",
    "  need-remove <id> -- remove a need you posted",
    "  about -- about this bot",
];

/// `stats`: membership summary of the joined channel.
pub async fn stats(ctx: &CommandContext<'_>) -> HandlerResult {
    let roster = ctx.transport.roster(ctx.channel).await?;

    ctx.reply_lines(&[
        "--- Channel statistics ---".to_string(),
        format!("Channel: {}", ctx.channel),
        format!("Users: {}", sorted_list(&roster.members)),
        format!("Opers: {}", sorted_list(&roster.operators)),
        format!("Voiced: {}", sorted_list(&roster.voiced)),
    ])
    .await
}

pub async fn help(ctx: &CommandContext<'_>) -> HandlerResult {
    ctx.reply_lines(HELP_LINES).await
}

pub async fn about(ctx: &CommandContext<'_>) -> HandlerResult {
    ctx.reply(&format!(
        "confbot {}: a conference bot for posting needs. Try \"help\".",
        env!("CARGO_PKG_VERSION")
    ))
    .await
}

fn sorted_list(names: &HashSet<String>) -> String {
    let mut names: Vec<&str> = names.iter().map(String::as_str).collect();
    names.sort_unstable();
    names.join(", ")
}
