use std::collections::{HashMap, HashSet};

use irc_proto::{ChannelMode, Command, Message, Mode, Response};

use confbot_core::{
    domain::ChannelRoster,
    utils::{irc_eq, irc_to_lower},
};

/// Channel rosters rebuilt from NAMES replies and membership traffic.
#[derive(Debug, Default)]
pub struct RosterBook {
    channels: HashMap<String, ChannelRoster>,
}

impl RosterBook {
    /// Forget everything known about `channel` (we are about to (re)join it).
    pub fn reset(&mut self, channel: &str) {
        self.channels
            .insert(irc_to_lower(channel), ChannelRoster::default());
    }

    pub fn get(&self, channel: &str) -> ChannelRoster {
        self.channels
            .get(&irc_to_lower(channel))
            .cloned()
            .unwrap_or_default()
    }

    pub fn observe(&mut self, msg: &Message) {
        let source = msg.source_nickname();
        match &msg.command {
            Command::Response(Response::RPL_NAMREPLY, args) => {
                // <me> <symbol> <channel> :<names>
                if let [_, _, channel, names, ..] = args.as_slice() {
                    self.add_names(channel, names);
                }
            }
            Command::JOIN(channels, _, _) => {
                if let Some(nick) = source {
                    for channel in split_channels(channels) {
                        self.channel_mut(channel).members.insert(nick.to_string());
                    }
                }
            }
            Command::PART(channels, _) => {
                if let Some(nick) = source {
                    for channel in split_channels(channels) {
                        remove_nick(self.channel_mut(channel), nick);
                    }
                }
            }
            Command::KICK(channels, nick, _) => {
                for channel in split_channels(channels) {
                    remove_nick(self.channel_mut(channel), nick);
                }
            }
            Command::QUIT(_) => {
                if let Some(nick) = source {
                    for roster in self.channels.values_mut() {
                        remove_nick(roster, nick);
                    }
                }
            }
            Command::NICK(new_nick) => {
                if let Some(old) = source {
                    for roster in self.channels.values_mut() {
                        rename_nick(roster, old, new_nick);
                    }
                }
            }
            Command::ChannelMODE(channel, modes) => {
                let roster = self.channel_mut(channel);
                for mode in modes {
                    apply_mode(roster, mode);
                }
            }
            _ => {}
        }
    }

    fn channel_mut(&mut self, channel: &str) -> &mut ChannelRoster {
        self.channels.entry(irc_to_lower(channel)).or_default()
    }

    fn add_names(&mut self, channel: &str, names: &str) {
        let roster = self.channel_mut(channel);
        for entry in names.split_whitespace() {
            // Multi-prefix servers may send several status chars (e.g. `@+nick`).
            let nick = entry.trim_start_matches(['~', '&', '@', '%', '+']);
            if nick.is_empty() {
                continue;
            }
            let prefixes = &entry[..entry.len() - nick.len()];
            roster.members.insert(nick.to_string());
            if prefixes.contains('@') {
                roster.operators.insert(nick.to_string());
            }
            if prefixes.contains('+') {
                roster.voiced.insert(nick.to_string());
            }
        }
    }
}

fn split_channels(list: &str) -> impl Iterator<Item = &str> {
    list.split(',').filter(|c| !c.is_empty())
}

fn apply_mode(roster: &mut ChannelRoster, mode: &Mode<ChannelMode>) {
    match mode {
        Mode::Plus(ChannelMode::Oper, Some(nick)) => {
            roster.operators.insert(nick.clone());
        }
        Mode::Minus(ChannelMode::Oper, Some(nick)) => remove_from(&mut roster.operators, nick),
        Mode::Plus(ChannelMode::Voice, Some(nick)) => {
            roster.voiced.insert(nick.clone());
        }
        Mode::Minus(ChannelMode::Voice, Some(nick)) => remove_from(&mut roster.voiced, nick),
        _ => {}
    }
}

fn remove_from(set: &mut HashSet<String>, nick: &str) {
    set.retain(|n| !irc_eq(n, nick));
}

fn remove_nick(roster: &mut ChannelRoster, nick: &str) {
    remove_from(&mut roster.members, nick);
    remove_from(&mut roster.operators, nick);
    remove_from(&mut roster.voiced, nick);
}

fn rename_nick(roster: &mut ChannelRoster, old: &str, new: &str) {
    for set in [
        &mut roster.members,
        &mut roster.operators,
        &mut roster.voiced,
    ] {
        if set.iter().any(|n| irc_eq(n, old)) {
            remove_from(set, old);
            set.insert(new.to_string());
        }
    }
}
