use std::{
    env, fs,
    path::{Path, PathBuf},
    time::Duration,
};

use crate::{errors::Error, Result};

pub const DEFAULT_PORT: u16 = 6667;

pub const USAGE: &str = "Parameters: <server[:port]> <channel> <nickname> [authSecret]";

/// Typed configuration for the bot.
///
/// Connection identity comes from positional arguments; everything else has
/// defaults that can be overridden through `CONFBOT_*` environment variables
/// (or a `.env` file in the working directory).
#[derive(Clone, Debug)]
pub struct Config {
    // Connection
    pub server: String,
    pub port: u16,
    pub channel: String,
    pub nickname: String,
    pub auth_secret: Option<String>,
    pub connect_timeout: Duration,
    /// `None` disables reconnecting after the connection drops.
    pub reconnect_delay: Option<Duration>,

    // Identity
    pub nick_service: String,

    // Storage
    pub needs_file: PathBuf,

    // Diagnostics
    pub verbose_faults: bool,
    pub audit_log_path: Option<PathBuf>,
}

impl Config {
    /// Build the config from process arguments (without the program name).
    pub fn load(args: impl IntoIterator<Item = String>) -> Result<Self> {
        load_dotenv_if_present(Path::new(".env"));
        Self::parse(args, |key| env::var(key).ok())
    }

    pub fn parse(
        args: impl IntoIterator<Item = String>,
        env_lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self> {
        let args: Vec<String> = args.into_iter().collect();
        if args.len() < 3 || args.len() > 4 {
            return Err(Error::Usage(format!(
                "expected 3 or 4 arguments, got {}",
                args.len()
            )));
        }

        let (server, port) = parse_server(&args[0])?;
        let channel = args[1].trim().to_string();
        let nickname = args[2].trim().to_string();
        if channel.is_empty() || nickname.is_empty() {
            return Err(Error::Usage(
                "channel and nickname must not be empty".to_string(),
            ));
        }

        let auth_secret = args
            .get(3)
            .cloned()
            .or_else(|| env_lookup("CONFBOT_AUTH_SECRET"))
            .and_then(non_empty);

        let connect_timeout = Duration::from_secs(
            env_u64(&env_lookup, "CONFBOT_CONNECT_TIMEOUT_SECS").unwrap_or(30),
        );
        let reconnect_delay = match env_u64(&env_lookup, "CONFBOT_RECONNECT_SECS").unwrap_or(60) {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        };

        let nick_service = env_lookup("CONFBOT_NICK_SERVICE")
            .and_then(non_empty)
            .unwrap_or_else(|| "NickServ".to_string());

        let needs_file = env_lookup("CONFBOT_NEEDS_FILE")
            .and_then(non_empty)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("confbot-needs.json"));

        let verbose_faults = env_bool(&env_lookup, "CONFBOT_VERBOSE_FAULTS").unwrap_or(true);
        let audit_log_path = env_lookup("CONFBOT_AUDIT_LOG_PATH")
            .and_then(non_empty)
            .map(PathBuf::from);

        Ok(Self {
            server,
            port,
            channel,
            nickname,
            auth_secret,
            connect_timeout,
            reconnect_delay,
            nick_service,
            needs_file,
            verbose_faults,
            audit_log_path,
        })
    }
}

/// Split `server[:port]`; the port defaults to 6667.
fn parse_server(raw: &str) -> Result<(String, u16)> {
    let raw = raw.trim();
    let Some((host, port)) = raw.split_once(':') else {
        return Ok((raw.to_string(), DEFAULT_PORT));
    };
    let port = port
        .trim()
        .parse::<u16>()
        .map_err(|_| Error::Usage(format!("Erroneous port: {port}")))?;
    if host.is_empty() {
        return Err(Error::Usage("server must not be empty".to_string()));
    }
    Ok((host.to_string(), port))
}

fn load_dotenv_if_present(path: &Path) {
    let Ok(contents) = fs::read_to_string(path) else {
        return;
    };

    for raw in contents.lines() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let Some((k, v)) = line.split_once('=') else {
            continue;
        };

        let key = k.trim();
        if key.is_empty() {
            continue;
        }
        if env::var_os(key).is_some() {
            continue; // do not override existing env
        }

        let mut val = v.trim().to_string();
        // Strip optional surrounding quotes.
        if val.len() >= 2
            && ((val.starts_with('"') && val.ends_with('"'))
                || (val.starts_with('\'') && val.ends_with('\'')))
        {
            val = val[1..val.len() - 1].to_string();
        }

        env::set_var(key, val);
    }
}

fn env_bool(env_lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<bool> {
    env_lookup(key).map(|s| {
        matches!(
            s.trim().to_lowercase().as_str(),
            "1" | "true" | "yes" | "on"
        )
    })
}

fn env_u64(env_lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<u64> {
    env_lookup(key).and_then(|s| s.trim().parse::<u64>().ok())
}

fn non_empty(s: String) -> Option<String> {
    if s.trim().is_empty() {
        None
    } else {
        Some(s)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn args(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn defaults_port_and_env_settings() {
        let cfg = Config::parse(args(&["irc.example.net", "#conf", "confbot"]), no_env).unwrap();
        assert_eq!(cfg.server, "irc.example.net");
        assert_eq!(cfg.port, 6667);
        assert_eq!(cfg.channel, "#conf");
        assert_eq!(cfg.nickname, "confbot");
        assert_eq!(cfg.auth_secret, None);
        assert_eq!(cfg.nick_service, "NickServ");
        assert_eq!(cfg.needs_file, PathBuf::from("confbot-needs.json"));
        assert_eq!(cfg.reconnect_delay, Some(Duration::from_secs(60)));
        assert!(cfg.verbose_faults);
        assert!(cfg.audit_log_path.is_none());
    }

    #[test]
    fn parses_explicit_port_and_secret() {
        let cfg = Config::parse(
            args(&["irc.example.net:6697", "#conf", "confbot", "s3cret"]),
            no_env,
        )
        .unwrap();
        assert_eq!(cfg.port, 6697);
        assert_eq!(cfg.auth_secret.as_deref(), Some("s3cret"));
    }

    #[test]
    fn rejects_bad_port_and_wrong_arg_count() {
        let bad_port = Config::parse(args(&["irc.example.net:abc", "#c", "n"]), no_env);
        assert!(matches!(bad_port, Err(Error::Usage(_))));

        let too_few = Config::parse(args(&["irc.example.net", "#c"]), no_env);
        assert!(matches!(too_few, Err(Error::Usage(_))));

        let too_many = Config::parse(args(&["s", "#c", "n", "secret", "extra"]), no_env);
        assert!(matches!(too_many, Err(Error::Usage(_))));
    }

    #[test]
    fn env_overrides_apply() {
        let env: HashMap<&str, &str> = HashMap::from([
            ("CONFBOT_AUTH_SECRET", "from-env"),
            ("CONFBOT_RECONNECT_SECS", "0"),
            ("CONFBOT_VERBOSE_FAULTS", "off"),
            ("CONFBOT_NICK_SERVICE", "AuthServ"),
            ("CONFBOT_AUDIT_LOG_PATH", "/tmp/confbot-audit.log"),
        ]);
        let cfg = Config::parse(args(&["irc.example.net", "#conf", "confbot"]), |k| {
            env.get(k).map(|v| v.to_string())
        })
        .unwrap();
        assert_eq!(cfg.auth_secret.as_deref(), Some("from-env"));
        assert_eq!(cfg.reconnect_delay, None);
        assert!(!cfg.verbose_faults);
        assert_eq!(cfg.nick_service, "AuthServ");
        assert_eq!(
            cfg.audit_log_path,
            Some(PathBuf::from("/tmp/confbot-audit.log"))
        );
    }
}
