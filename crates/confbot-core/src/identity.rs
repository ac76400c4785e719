//! Nickname ownership: collision recovery and identification.
//!
//! Identification is fire-and-forget. `identified` flips to `true` as soon as
//! the IDENTIFY directive has been sent; the nickname service's reply is not
//! tracked.

use tracing::{info, warn};

use crate::{ports::ChatTransport, session::SessionState, utils::irc_eq, Result};

/// Appended to the current nickname while the desired one is occupied.
pub const COLLISION_SUFFIX: &str = "_";

#[derive(Clone, Debug)]
pub struct IdentityManager {
    nick_service: String,
}

impl IdentityManager {
    pub fn new(nick_service: impl Into<String>) -> Self {
        Self {
            nick_service: nick_service.into(),
        }
    }

    pub fn nick_service(&self) -> &str {
        &self.nick_service
    }

    /// The server rejected our nickname as already taken.
    ///
    /// Moves to a fallback nickname, then reclaims the desired one: GHOST the
    /// holder, switch back, IDENTIFY. Repeated collisions replay the same
    /// sequence; there is no retry loop here.
    pub async fn on_identity_in_use(
        &self,
        state: &mut SessionState,
        transport: &dyn ChatTransport,
    ) -> Result<()> {
        let fallback = format!("{}{COLLISION_SUFFIX}", state.current_identity);
        warn!(
            taken = %state.current_identity,
            fallback = %fallback,
            "nickname in use, reclaiming {}", state.desired_identity
        );
        transport.set_nickname(&fallback).await?;
        state.current_identity = fallback;

        let secret = state.auth_secret.as_deref().unwrap_or("");
        transport
            .send_directive(
                &self.nick_service,
                &directive(&["GHOST", &state.desired_identity, secret]),
            )
            .await?;

        transport.set_nickname(&state.desired_identity).await?;
        state.current_identity = state.desired_identity.clone();

        self.identify(state, transport).await
    }

    /// Registration completed: identify once if needed, then join the channel.
    ///
    /// The join does not wait on identification.
    pub async fn on_welcome(
        &self,
        state: &mut SessionState,
        transport: &dyn ChatTransport,
    ) -> Result<()> {
        if !state.identified {
            self.identify(state, transport).await?;
        }
        info!(channel = %state.channel, "joining");
        transport.join(&state.channel).await
    }

    /// Adopt the nickname the server says we hold. Requests sent with
    /// `set_nickname` are only our intent; this is the confirmation.
    pub fn confirm_identity(&self, state: &mut SessionState, nickname: &str) {
        if nickname.is_empty() || nickname == state.current_identity {
            return;
        }
        info!(
            assumed = %state.current_identity,
            confirmed = %nickname,
            "server reports a different nickname"
        );
        state.current_identity = nickname.to_string();
    }

    /// A NICK change seen on the wire; only ours moves `current_identity`.
    pub fn on_nickname_changed(&self, state: &mut SessionState, old: &str, new: &str) {
        if irc_eq(old, &state.current_identity) {
            self.confirm_identity(state, new);
        }
    }

    /// The connection is gone: the next one registers with the desired
    /// nickname and must identify again.
    pub fn on_disconnect(&self, state: &mut SessionState) {
        state.identified = false;
        state.current_identity = state.desired_identity.clone();
    }

    async fn identify(&self, state: &mut SessionState, transport: &dyn ChatTransport) -> Result<()> {
        let secret = state.auth_secret.as_deref().unwrap_or("");
        transport
            .send_directive(&self.nick_service, &directive(&["IDENTIFY", secret]))
            .await?;
        state.identified = true;
        Ok(())
    }
}

/// Space-joined directive without a dangling separator for an empty secret.
fn directive(parts: &[&str]) -> String {
    parts.join(" ").trim_end().to_string()
}
