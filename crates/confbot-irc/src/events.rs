use irc_proto::{Command, Message, Response};

use confbot_core::domain::InboundEvent;

/// Map one server message to the session event it carries, if any.
///
/// Protocol housekeeping (PING, roster traffic) is handled by the connection
/// and yields `None` here. NICK is both roster traffic and, when it is ours,
/// an identity update, so it shows up in both places.
pub fn classify(msg: &Message) -> Option<InboundEvent> {
    match &msg.command {
        Command::Response(Response::RPL_WELCOME, args) => Some(InboundEvent::Welcome {
            // 001 is addressed to the nickname the server registered.
            nickname: args.first().cloned().unwrap_or_default(),
        }),
        Command::Response(Response::ERR_NICKNAMEINUSE, _) => Some(InboundEvent::NicknameInUse),
        Command::NICK(new) => Some(InboundEvent::NicknameChanged {
            old: msg.source_nickname()?.to_string(),
            new: new.clone(),
        }),
        Command::PRIVMSG(target, text) => {
            // CTCP requests (ACTION, VERSION...) are not commands.
            if text.starts_with('\u{1}') {
                return None;
            }
            let from = msg.source_nickname()?.to_string();
            if is_channel_name(target) {
                Some(InboundEvent::ChannelMessage {
                    from,
                    channel: target.clone(),
                    text: text.clone(),
                })
            } else {
                Some(InboundEvent::PrivateMessage {
                    from,
                    text: text.clone(),
                })
            }
        }
        _ => None,
    }
}

fn is_channel_name(target: &str) -> bool {
    target.starts_with(['#', '&', '+', '!'])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classify_line(line: &str) -> Option<InboundEvent> {
        classify(&line.parse().unwrap())
    }

    #[test]
    fn numerics() {
        assert_eq!(
            classify_line(":irc.example.net 001 confbot_ :Welcome to the network"),
            Some(InboundEvent::Welcome {
                nickname: "confbot_".into()
            })
        );
        assert_eq!(
            classify_line(":irc.example.net 433 * confbot :Nickname is already in use"),
            Some(InboundEvent::NicknameInUse)
        );
        assert_eq!(classify_line(":irc.example.net 372 confbot :- motd"), None);
    }

    #[test]
    fn channel_and_private_messages() {
        assert_eq!(
            classify_line(":alice!a@host PRIVMSG #conf :confbot: needs"),
            Some(InboundEvent::ChannelMessage {
                from: "alice".into(),
                channel: "#conf".into(),
                text: "confbot: needs".into(),
            })
        );
        assert_eq!(
            classify_line(":bob!b@host PRIVMSG confbot :need coffee"),
            Some(InboundEvent::PrivateMessage {
                from: "bob".into(),
                text: "need coffee".into(),
            })
        );
    }

    #[test]
    fn nick_changes_carry_both_names() {
        assert_eq!(
            classify_line(":confbot!c@host NICK Guest4242"),
            Some(InboundEvent::NicknameChanged {
                old: "confbot".into(),
                new: "Guest4242".into(),
            })
        );
    }

    #[test]
    fn ignores_ctcp_notices_and_sourceless_messages() {
        assert_eq!(
            classify_line(":bob!b@host PRIVMSG confbot :\u{1}VERSION\u{1}"),
            None
        );
        assert_eq!(classify_line(":bob!b@host NOTICE confbot :hi"), None);
        assert_eq!(classify_line("PRIVMSG confbot :hi"), None);
        assert_eq!(classify_line("PING :irc.example.net"), None);
    }
}
