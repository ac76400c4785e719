use anyhow::Context;
use futures_util::StreamExt;
use irc_proto::{Command, Message};
use tokio::{
    io::AsyncWrite,
    net::TcpStream,
    time::{sleep, timeout},
};
use tokio_util::codec::FramedRead;
use tracing::{debug, info, warn};

use confbot_core::{config::Config, session::SessionController, Result};

use crate::{codec::IrcLineCodec, events, IrcTransport};

/// Upper bound for one inbound line, tags included.
const MAX_LINE_LEN: usize = 8 * 1024;

/// Connect, register and run the session until the server closes the
/// connection.
pub async fn run_connection(cfg: &Config, controller: &SessionController) -> anyhow::Result<()> {
    let addr = format!("{}:{}", cfg.server, cfg.port);
    info!(server = %addr, "connecting");

    let stream = timeout(cfg.connect_timeout, TcpStream::connect(&addr))
        .await
        .with_context(|| format!("connection to {addr} timed out"))?
        .with_context(|| format!("failed to connect to {addr}"))?;
    stream.set_nodelay(true).ok();

    let (read_half, write_half) = stream.into_split();
    let transport = IrcTransport::new(write_half);
    let mut lines = FramedRead::new(read_half, IrcLineCodec::new(MAX_LINE_LEN));

    let nickname = controller.current_identity().await;
    transport
        .register(&nickname)
        .await
        .context("registration failed")?;
    info!(nick = %nickname, "registration sent");

    while let Some(line) = lines.next().await {
        let line = line.context("reading from server failed")?;
        handle_line(&line, &transport, controller).await?;
    }

    info!(server = %addr, "connection closed by server");
    Ok(())
}

/// Run sessions back to back, reconnecting after `reconnect_delay` until a
/// connection ends with reconnects disabled.
pub async fn run_forever(cfg: &Config, controller: &SessionController) -> anyhow::Result<()> {
    loop {
        let outcome = run_connection(cfg, controller).await;
        controller.on_disconnect().await;

        let Some(delay) = cfg.reconnect_delay else {
            return outcome;
        };
        if let Err(e) = outcome {
            warn!("session ended: {e:#}");
        }
        info!(delay_secs = delay.as_secs(), "reconnecting after delay");
        sleep(delay).await;
    }
}

/// Process one raw line from the server.
pub async fn handle_line<W>(
    line: &str,
    transport: &IrcTransport<W>,
    controller: &SessionController,
) -> Result<()>
where
    W: AsyncWrite + Unpin + Send,
{
    let line = line.trim_end_matches('\r');
    if line.is_empty() {
        return Ok(());
    }
    debug!(line = %line, "irc <<");

    let msg: Message = match line.parse() {
        Ok(msg) => msg,
        Err(e) => {
            warn!(error = %e, line = %line, "unparseable line ignored");
            return Ok(());
        }
    };

    if let Command::PING(server, _) = &msg.command {
        return transport.send(Command::PONG(server.clone(), None)).await;
    }

    transport.observe(&msg).await;

    match events::classify(&msg) {
        Some(event) => controller.handle_event(event, transport).await,
        None => Ok(()),
    }
}
