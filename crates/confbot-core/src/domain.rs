use std::{collections::HashSet, fmt, str::FromStr};

use serde::{Deserialize, Serialize};

/// Store-assigned need id (numeric, never reused).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NeedId(pub u64);

impl fmt::Display for NeedId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for NeedId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse::<u64>().map(NeedId)
    }
}

/// A short request posted by a conference attendee.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Need {
    pub id: NeedId,
    /// Nickname of the attendee who posted the need.
    pub requester: String,
    pub text: String,
}

/// Membership snapshot of the joined channel.
///
/// Sets are unordered; presentation order is decided by the `stats` handler.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ChannelRoster {
    pub members: HashSet<String>,
    pub operators: HashSet<String>,
    pub voiced: HashSet<String>,
}

/// Transport-agnostic inbound event model.
///
/// Protocol housekeeping (PING, roster bookkeeping) stays in the adapter; only
/// events the session controller reacts to cross this boundary.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InboundEvent {
    /// Registration finished; `nickname` is the one the server registered.
    Welcome { nickname: String },
    /// The nickname we asked for is taken.
    NicknameInUse,
    /// Someone on the network changed nickname (possibly us).
    NicknameChanged { old: String, new: String },
    /// A message addressed directly to the bot.
    PrivateMessage { from: String, text: String },
    /// A message posted to a channel the bot sits in.
    ChannelMessage {
        from: String,
        channel: String,
        text: String,
    },
}
