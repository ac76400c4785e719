use std::{process, sync::Arc};

use anyhow::Context;
use tracing::info;

use confbot_core::{
    config::{Config, USAGE},
    session::SessionController,
    store::JsonNeedStore,
    Error,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    confbot_core::logging::init("confbot")?;

    let cfg = match Config::load(std::env::args().skip(1)) {
        Ok(cfg) => cfg,
        Err(e @ (Error::Usage(_) | Error::Config(_))) => {
            eprintln!("{USAGE}");
            eprintln!("{e}");
            process::exit(1);
        }
        Err(e) => return Err(e.into()),
    };

    let store = JsonNeedStore::open(&cfg.needs_file)
        .with_context(|| format!("failed to open needs file {}", cfg.needs_file.display()))?;
    info!(
        server = %cfg.server,
        port = cfg.port,
        channel = %cfg.channel,
        nick = %cfg.nickname,
        needs_file = %store.path().display(),
        "confbot starting"
    );

    let controller = SessionController::new(&cfg, Arc::new(store));
    confbot_irc::connection::run_forever(&cfg, &controller).await
}
