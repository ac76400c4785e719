//! Inbound line framing.
//!
//! Channel traffic is not guaranteed to be UTF-8 and a single peer can send
//! arbitrarily long junk, so neither may end the connection: bad bytes are
//! replaced and overlong lines are dropped.

use std::io;

use bytes::BytesMut;
use tokio_util::codec::Decoder;
use tracing::warn;

/// Newline-terminated lines, decoded lossily, `\r` stripped.
#[derive(Debug)]
pub struct IrcLineCodec {
    /// Index of the next byte to scan for `\n`.
    next_index: usize,
    max_len: usize,
    /// Skipping the rest of an overlong line.
    discarding: bool,
}

impl IrcLineCodec {
    pub fn new(max_len: usize) -> Self {
        Self {
            next_index: 0,
            max_len,
            discarding: false,
        }
    }
}

impl Decoder for IrcLineCodec {
    type Item = String;
    type Error = io::Error;

    fn decode(&mut self, src: &mut BytesMut) -> io::Result<Option<String>> {
        loop {
            let Some(offset) = src[self.next_index..].iter().position(|b| *b == b'\n') else {
                if src.len() > self.max_len {
                    if !self.discarding {
                        warn!(limit = self.max_len, "overlong inbound line dropped");
                    }
                    self.discarding = true;
                    src.clear();
                    self.next_index = 0;
                } else {
                    self.next_index = src.len();
                }
                return Ok(None);
            };

            let line = src.split_to(self.next_index + offset + 1);
            self.next_index = 0;

            if self.discarding {
                // Tail of a line already reported as too long.
                self.discarding = false;
                continue;
            }
            if line.len() > self.max_len {
                warn!(len = line.len(), limit = self.max_len, "overlong inbound line dropped");
                continue;
            }

            let text = String::from_utf8_lossy(&line);
            return Ok(Some(text.trim_end_matches(['\r', '\n']).to_string()));
        }
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> io::Result<Option<String>> {
        if let Some(line) = self.decode(src)? {
            return Ok(Some(line));
        }
        // A final unterminated line is still a line.
        if src.is_empty() || self.discarding {
            src.clear();
            return Ok(None);
        }
        let text = String::from_utf8_lossy(src).trim_end_matches('\r').to_string();
        src.clear();
        self.next_index = 0;
        Ok(Some(text))
    }
}
