//! Test doubles shared by the unit tests of this crate.

use std::{path::PathBuf, sync::Mutex};

use async_trait::async_trait;

use crate::{
    domain::{ChannelRoster, Need, NeedId},
    errors::Error,
    ports::{ChatTransport, NeedStore},
    Result,
};

/// One recorded outbound call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outbound {
    Join(String),
    Nick(String),
    Directive { target: String, text: String },
    Notice { target: String, text: String },
}

#[derive(Default)]
pub struct FakeTransport {
    sent: Mutex<Vec<Outbound>>,
    roster: Mutex<ChannelRoster>,
    /// When set, `notice` fails for texts containing this marker.
    fail_notices_containing: Mutex<Option<String>>,
}

impl FakeTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_roster(members: &[&str], operators: &[&str], voiced: &[&str]) -> Self {
        let fake = Self::new();
        {
            let mut r = fake.roster.lock().unwrap();
            r.members = members.iter().map(|s| s.to_string()).collect();
            r.operators = operators.iter().map(|s| s.to_string()).collect();
            r.voiced = voiced.iter().map(|s| s.to_string()).collect();
        }
        fake
    }

    pub fn fail_notices_containing(&self, marker: &str) {
        *self.fail_notices_containing.lock().unwrap() = Some(marker.to_string());
    }

    pub fn sent(&self) -> Vec<Outbound> {
        self.sent.lock().unwrap().clone()
    }

    pub fn take(&self) -> Vec<Outbound> {
        std::mem::take(&mut *self.sent.lock().unwrap())
    }

    /// Texts of notices addressed to `target`, in send order.
    pub fn notices_to(&self, target: &str) -> Vec<String> {
        self.sent()
            .into_iter()
            .filter_map(|o| match o {
                Outbound::Notice { target: t, text } if t == target => Some(text),
                _ => None,
            })
            .collect()
    }
}

#[async_trait]
impl ChatTransport for FakeTransport {
    async fn join(&self, channel: &str) -> Result<()> {
        self.sent
            .lock()
            .unwrap()
            .push(Outbound::Join(channel.to_string()));
        Ok(())
    }

    async fn set_nickname(&self, nickname: &str) -> Result<()> {
        self.sent
            .lock()
            .unwrap()
            .push(Outbound::Nick(nickname.to_string()));
        Ok(())
    }

    async fn send_directive(&self, target: &str, text: &str) -> Result<()> {
        self.sent.lock().unwrap().push(Outbound::Directive {
            target: target.to_string(),
            text: text.to_string(),
        });
        Ok(())
    }

    async fn notice(&self, target: &str, text: &str) -> Result<()> {
        if let Some(marker) = self.fail_notices_containing.lock().unwrap().as_deref() {
            if text.contains(marker) {
                return Err(Error::Transport("connection reset".to_string()));
            }
        }
        self.sent.lock().unwrap().push(Outbound::Notice {
            target: target.to_string(),
            text: text.to_string(),
        });
        Ok(())
    }

    async fn roster(&self, _channel: &str) -> Result<ChannelRoster> {
        Ok(self.roster.lock().unwrap().clone())
    }
}

/// Store whose every call fails, as an unreadable needs file would.
pub struct FailingNeedStore;

impl FailingNeedStore {
    fn error() -> Error {
        Error::Store {
            path: PathBuf::from("/nonexistent/needs.json"),
            reason: "disk on fire".to_string(),
        }
    }
}

impl NeedStore for FailingNeedStore {
    fn create_need(&self, _requester: &str, _text: &str) -> Result<NeedId> {
        Err(Self::error())
    }

    fn list_needs(&self) -> Result<Vec<Need>> {
        Err(Self::error())
    }

    fn delete_need(&self, _id: NeedId, _requester: &str) -> Result<bool> {
        Err(Self::error())
    }
}
