//! IRC adapter.
//!
//! This crate implements the `confbot-core` ChatTransport over a plain IRC
//! connection, using `irc-proto` for the wire format.

use async_trait::async_trait;

use irc_proto::{Command, Message};

use tokio::{
    io::{AsyncWrite, AsyncWriteExt},
    net::tcp::OwnedWriteHalf,
    sync::Mutex,
};
use tracing::debug;

pub mod codec;
pub mod connection;
pub mod events;
pub mod roster;

use confbot_core::{
    domain::ChannelRoster, errors::Error, ports::ChatTransport, Result,
};

use roster::RosterBook;

/// Outbound half of an IRC connection plus the rosters learned from inbound
/// traffic.
pub struct IrcTransport<W = OwnedWriteHalf> {
    writer: Mutex<W>,
    rosters: Mutex<RosterBook>,
}

impl<W> IrcTransport<W>
where
    W: AsyncWrite + Unpin + Send,
{
    pub fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
            rosters: Mutex::new(RosterBook::default()),
        }
    }

    /// Write one command as a CRLF-terminated line.
    pub async fn send(&self, command: Command) -> Result<()> {
        let line = String::from(&command);
        debug!(line = %line, "irc >>");

        let mut writer = self.writer.lock().await;
        writer
            .write_all(format!("{line}\r\n").as_bytes())
            .await
            .map_err(Self::map_err)?;
        writer.flush().await.map_err(Self::map_err)
    }

    /// Open registration: `NICK` followed by `USER`.
    pub async fn register(&self, nickname: &str) -> Result<()> {
        self.send(Command::NICK(nickname.to_string())).await?;
        self.send(Command::USER(
            nickname.to_string(),
            "0".to_string(),
            nickname.to_string(),
        ))
        .await
    }

    /// Feed an inbound message to the roster tracker.
    pub async fn observe(&self, msg: &Message) {
        self.rosters.lock().await.observe(msg);
    }

    fn map_err(e: std::io::Error) -> Error {
        Error::Transport(format!("irc write failed: {e}"))
    }
}

#[async_trait]
impl<W> ChatTransport for IrcTransport<W>
where
    W: AsyncWrite + Unpin + Send,
{
    async fn join(&self, channel: &str) -> Result<()> {
        // The NAMES reply that follows our JOIN rebuilds the roster.
        self.rosters.lock().await.reset(channel);
        self.send(Command::JOIN(channel.to_string(), None, None))
            .await
    }

    async fn set_nickname(&self, nickname: &str) -> Result<()> {
        self.send(Command::NICK(nickname.to_string())).await
    }

    async fn send_directive(&self, target: &str, text: &str) -> Result<()> {
        self.send(Command::PRIVMSG(target.to_string(), text.to_string()))
            .await
    }

    async fn notice(&self, target: &str, text: &str) -> Result<()> {
        // One NOTICE per line; IRC has no multi-line messages.
        for line in text.lines() {
            self.send(Command::NOTICE(target.to_string(), line.to_string()))
                .await?;
        }
        Ok(())
    }

    async fn roster(&self, channel: &str) -> Result<ChannelRoster> {
        Ok(self.rosters.lock().await.get(channel))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn written(transport: &IrcTransport<Vec<u8>>) -> Vec<Command> {
        let bytes = transport.writer.lock().await.clone();
        let text = String::from_utf8(bytes).unwrap();
        assert!(text.ends_with("\r\n"));
        text.split_terminator("\r\n")
            .map(|line| line.parse::<Message>().unwrap().command)
            .collect()
    }

    #[tokio::test]
    async fn registration_lines() {
        let transport = IrcTransport::new(Vec::new());
        transport.register("confbot").await.unwrap();

        let raw = String::from_utf8(transport.writer.lock().await.clone()).unwrap();
        assert!(raw.starts_with("NICK confbot\r\nUSER confbot 0 * "));
        assert_eq!(
            written(&transport).await[0],
            Command::NICK("confbot".to_string())
        );
    }

    #[tokio::test]
    async fn port_actions_map_to_commands() {
        let transport = IrcTransport::new(Vec::new());
        transport.set_nickname("confbot_").await.unwrap();
        transport
            .send_directive("NickServ", "GHOST confbot s3cret")
            .await
            .unwrap();
        transport.notice("alice", "Need 1 listed: X").await.unwrap();
        transport.join("#conf").await.unwrap();

        assert_eq!(
            written(&transport).await,
            vec![
                Command::NICK("confbot_".to_string()),
                Command::PRIVMSG("NickServ".to_string(), "GHOST confbot s3cret".to_string()),
                Command::NOTICE("alice".to_string(), "Need 1 listed: X".to_string()),
                Command::JOIN("#conf".to_string(), None, None),
            ]
        );
    }

    #[tokio::test]
    async fn multi_line_notice_is_split() {
        let transport = IrcTransport::new(Vec::new());
        transport.notice("alice", "one\ntwo").await.unwrap();
        assert_eq!(
            written(&transport).await,
            vec![
                Command::NOTICE("alice".to_string(), "one".to_string()),
                Command::NOTICE("alice".to_string(), "two".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn join_resets_roster_until_names_arrive() {
        let transport = IrcTransport::new(Vec::new());
        transport
            .observe(&":irc.example.net 353 confbot = #conf :@alice bob".parse().unwrap())
            .await;
        assert_eq!(transport.roster("#conf").await.unwrap().members.len(), 2);

        transport.join("#conf").await.unwrap();
        assert!(transport.roster("#conf").await.unwrap().members.is_empty());
    }
}
