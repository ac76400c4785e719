use async_trait::async_trait;

use crate::{
    domain::{ChannelRoster, Need, NeedId},
    Result,
};

/// Hexagonal port for the chat network connection.
///
/// IRC is the only implementation; the controller never sees protocol lines,
/// only these outbound actions.
#[async_trait]
pub trait ChatTransport: Send + Sync {
    async fn join(&self, channel: &str) -> Result<()>;

    /// Ask the server to switch our nickname.
    async fn set_nickname(&self, nickname: &str) -> Result<()>;

    /// Private administrative message (e.g. to the nickname service).
    async fn send_directive(&self, target: &str, text: &str) -> Result<()>;

    /// Private, non-broadcast reply to a single user.
    async fn notice(&self, target: &str, text: &str) -> Result<()>;

    /// Current roster of `channel`; empty when the channel is unknown.
    async fn roster(&self, channel: &str) -> Result<ChannelRoster>;
}

/// Persistence port for needs.
///
/// Calls are synchronous and complete within the handler's turn; a slow store
/// stalls the session.
pub trait NeedStore: Send + Sync {
    fn create_need(&self, requester: &str, text: &str) -> Result<NeedId>;

    /// All needs in store order (ascending id).
    fn list_needs(&self) -> Result<Vec<Need>>;

    /// Delete the need only when both `id` and `requester` match.
    ///
    /// Returns `false` when no owned need matched; other requesters' needs are
    /// never touched.
    fn delete_need(&self, id: NeedId, requester: &str) -> Result<bool>;
}
