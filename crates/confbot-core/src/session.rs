use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::{
    audit::{AuditEvent, AuditLogger},
    config::Config,
    domain::InboundEvent,
    fault::HandlerFault,
    handlers::CommandContext,
    identity::IdentityManager,
    ports::{ChatTransport, NeedStore},
    router::{CommandLine, CommandRouter},
    utils::irc_eq,
    Result,
};

/// Connection lifecycle. Identification is tracked separately in
/// [`SessionState::identified`] and can change in any phase.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionPhase {
    Connecting,
    Connected,
    Joined,
}

/// Identity and membership state of the bot's single session.
///
/// Only the [`IdentityManager`] changes `current_identity` and `identified`;
/// the controller only moves `phase`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionState {
    pub(crate) desired_identity: String,
    pub(crate) current_identity: String,
    pub(crate) identified: bool,
    pub(crate) channel: String,
    pub(crate) auth_secret: Option<String>,
    pub(crate) phase: SessionPhase,
}

impl SessionState {
    pub fn new(nickname: &str, channel: &str, auth_secret: Option<String>) -> Self {
        Self {
            desired_identity: nickname.to_string(),
            current_identity: nickname.to_string(),
            identified: false,
            channel: channel.to_string(),
            auth_secret,
            phase: SessionPhase::Connecting,
        }
    }

    pub fn desired_identity(&self) -> &str {
        &self.desired_identity
    }

    pub fn current_identity(&self) -> &str {
        &self.current_identity
    }

    pub fn identified(&self) -> bool {
        self.identified
    }

    pub fn channel(&self) -> &str {
        &self.channel
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }
}

/// Session controller: turns inbound events into identity actions and
/// command dispatches.
///
/// Events are handled one at a time; the state lock is held for the whole
/// event, so a slow handler delays the next event rather than overlapping it.
pub struct SessionController {
    identity: IdentityManager,
    router: CommandRouter,
    store: Arc<dyn NeedStore>,
    audit: Option<AuditLogger>,
    verbose_faults: bool,
    state: Mutex<SessionState>,
}

impl SessionController {
    pub fn new(cfg: &Config, store: Arc<dyn NeedStore>) -> Self {
        Self {
            identity: IdentityManager::new(cfg.nick_service.clone()),
            router: CommandRouter::new(),
            store,
            audit: cfg.audit_log_path.clone().map(AuditLogger::new),
            verbose_faults: cfg.verbose_faults,
            state: Mutex::new(SessionState::new(
                &cfg.nickname,
                &cfg.channel,
                cfg.auth_secret.clone(),
            )),
        }
    }

    /// Snapshot of the current session state.
    pub async fn state(&self) -> SessionState {
        self.state.lock().await.clone()
    }

    /// Nickname to register with on a fresh connection.
    pub async fn current_identity(&self) -> String {
        self.state.lock().await.current_identity.clone()
    }

    /// The connection dropped: forget connection-scoped state before the next
    /// attempt.
    pub async fn on_disconnect(&self) {
        let mut st = self.state.lock().await;
        st.phase = SessionPhase::Connecting;
        self.identity.on_disconnect(&mut st);
    }

    /// Handle one inbound event to completion.
    ///
    /// Errors are transport failures during identity handling; command
    /// failures never escape the fault barrier.
    pub async fn handle_event(
        &self,
        event: InboundEvent,
        transport: &dyn ChatTransport,
    ) -> Result<()> {
        let mut st = self.state.lock().await;
        match event {
            InboundEvent::Welcome { nickname } => {
                st.phase = SessionPhase::Connected;
                self.identity.confirm_identity(&mut st, &nickname);
                self.identity.on_welcome(&mut st, transport).await?;
                st.phase = SessionPhase::Joined;
                info!(nick = %st.current_identity, channel = %st.channel, "session joined");
                Ok(())
            }
            InboundEvent::NicknameInUse => {
                self.identity.on_identity_in_use(&mut st, transport).await
            }
            InboundEvent::NicknameChanged { old, new } => {
                self.identity.on_nickname_changed(&mut st, &old, &new);
                Ok(())
            }
            InboundEvent::PrivateMessage { from, text } => {
                self.dispatch(&st, &from, &text, transport).await;
                Ok(())
            }
            InboundEvent::ChannelMessage {
                from,
                channel,
                text,
            } => {
                if !irc_eq(&channel, &st.channel) {
                    return Ok(());
                }
                let Some(command) = addressed_command(&text, &st.current_identity) else {
                    return Ok(());
                };
                self.dispatch(&st, &from, command, transport).await;
                Ok(())
            }
        }
    }

    /// Fault barrier: run one command; a fault becomes a diagnostic notice to
    /// the requester and the session carries on.
    async fn dispatch(
        &self,
        st: &SessionState,
        requester: &str,
        line: &str,
        transport: &dyn ChatTransport,
    ) {
        let line = CommandLine::parse(line);
        debug!(requester = %requester, command = %line.raw, "dispatching");

        let ctx = CommandContext {
            requester,
            channel: &st.channel,
            transport,
            store: self.store.as_ref(),
        };

        match self.router.dispatch(&ctx, &line).await {
            Ok(()) => self.audit(AuditEvent::command_ok(requester, line.raw)),
            Err(fault) => {
                warn!(requester = %requester, command = %line.raw, fault = %fault, "command failed");
                self.audit(AuditEvent::command_fault(
                    requester,
                    line.raw,
                    &fault.to_string(),
                ));
                self.report_fault(requester, &fault, transport).await;
            }
        }
    }

    async fn report_fault(
        &self,
        requester: &str,
        fault: &HandlerFault,
        transport: &dyn ChatTransport,
    ) {
        let text = if self.verbose_faults {
            fault.diagnostic()
        } else {
            fault.category().to_string()
        };
        if let Err(e) = transport.notice(requester, &text).await {
            warn!(requester = %requester, error = %e, "could not deliver fault notice");
        }
    }

    fn audit(&self, event: AuditEvent) {
        let Some(audit) = &self.audit else {
            return;
        };
        if let Err(e) = audit.write(event) {
            warn!(path = %audit.path().display(), error = %e, "audit write failed");
        }
    }
}

/// Extract the command from `"<nick>: <command>"`, comparing the nickname
/// case-insensitively.
fn addressed_command<'a>(text: &'a str, nickname: &str) -> Option<&'a str> {
    let (target, rest) = text.split_once(':')?;
    irc_eq(target, nickname).then(|| rest.trim())
}
