use tracing::{info, warn};

use crate::{
    domain::NeedId,
    fault::{HandlerFault, HandlerResult},
};

use super::CommandContext;

/// `needs`: list every stored need.
pub async fn list(ctx: &CommandContext<'_>) -> HandlerResult {
    ctx.reply("--- Needs ---").await?;

    let needs = match ctx.store.list_needs() {
        Ok(needs) => needs,
        Err(e) => {
            // An unreadable store reads as an empty one.
            warn!(error = %e, "listing needs failed");
            Vec::new()
        }
    };

    if needs.is_empty() {
        return ctx.reply("No needs yet.").await;
    }

    for need in &needs {
        ctx.reply(&format!("{} {} - {}", need.id, need.requester, need.text))
            .await?;
    }
    Ok(())
}

/// `need <text>`: post a need on behalf of the requester.
pub async fn create(ctx: &CommandContext<'_>, text: Option<&str>) -> HandlerResult {
    let Some(text) = text else {
        return ctx.reply("need requires a string parameter to list").await;
    };

    let id = ctx.store.create_need(ctx.requester, text)?;
    info!(need = %id, requester = %ctx.requester, "need listed");
    ctx.reply(&format!("Need {id} listed: {text}")).await
}

/// `need-remove <id>`: delete one of the requester's own needs.
pub async fn remove(ctx: &CommandContext<'_>, arg: Option<&str>) -> HandlerResult {
    let Some(arg) = arg else {
        return ctx.reply("need-remove requires a numeric need id").await;
    };

    let id: NeedId = arg
        .parse()
        .map_err(|e| HandlerFault::invalid_argument(format!("need id {arg:?}: {e}")))?;

    if ctx.store.delete_need(id, ctx.requester)? {
        info!(need = %id, requester = %ctx.requester, "need deleted");
        return ctx.reply(&format!("Need {id} deleted")).await;
    }

    ctx.reply(&format!("Need {id} not found for nick {}", ctx.requester))
        .await
}
