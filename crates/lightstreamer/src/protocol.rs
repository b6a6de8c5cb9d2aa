//! TLCP server notifications, one per line.

use percent_encoding::percent_decode_str;

use crate::error::ProtocolError;

pub const PROTOCOL_VERSION: &str = "TLCP-2.1.0";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerMessage {
    ConOk {
        session_id: String,
        request_limit: u64,
        keepalive_ms: u64,
        /// Host to use for control requests, `None` when the server sent `*`.
        control_link: Option<String>,
    },
    ConErr {
        code: i32,
        message: String,
    },
    End {
        code: i32,
        message: String,
    },
    Error {
        code: i32,
        message: String,
    },
    Loop {
        expected_delay_ms: u64,
    },
    SubOk {
        subscription: u32,
        items: usize,
        fields: usize,
    },
    Update {
        subscription: u32,
        item: usize,
        values: String,
    },
    Unsub {
        subscription: u32,
    },
    ReqOk {
        request: u64,
    },
    ReqErr {
        request: u64,
        code: i32,
        message: String,
    },
    Probe,
    /// Informational notifications the client does not act on (SERVNAME, SYNC, ...).
    Other(String),
}

fn malformed(kind: &'static str, line: &str) -> ProtocolError {
    ProtocolError::Malformed {
        kind,
        line: line.to_string(),
    }
}

fn number<T: std::str::FromStr>(
    field: Option<&str>,
    kind: &'static str,
    line: &str,
) -> Result<T, ProtocolError> {
    field
        .and_then(|f| f.parse().ok())
        .ok_or_else(|| malformed(kind, line))
}

fn text(field: Option<&str>) -> String {
    field
        .map(|f| percent_decode_str(f).decode_utf8_lossy().into_owned())
        .unwrap_or_default()
}

/// Parses one notification line (without the trailing CRLF).
pub fn parse_line(line: &str) -> Result<ServerMessage, ProtocolError> {
    let (tag, rest) = line.split_once(',').unwrap_or((line, ""));

    match tag {
        "CONOK" => {
            let mut parts = rest.splitn(4, ',');
            let session_id = parts
                .next()
                .filter(|s| !s.is_empty())
                .ok_or_else(|| malformed("CONOK", line))?
                .to_string();
            let request_limit = number(parts.next(), "CONOK", line)?;
            let keepalive_ms = number(parts.next(), "CONOK", line)?;
            let control_link = match parts.next() {
                None | Some("*") | Some("") => None,
                Some(link) => Some(text(Some(link))),
            };
            Ok(ServerMessage::ConOk {
                session_id,
                request_limit,
                keepalive_ms,
                control_link,
            })
        }
        "CONERR" | "END" | "ERROR" => {
            let mut parts = rest.splitn(2, ',');
            let code = number(parts.next(), "error", line)?;
            let message = text(parts.next());
            Ok(match tag {
                "CONERR" => ServerMessage::ConErr { code, message },
                "END" => ServerMessage::End { code, message },
                _ => ServerMessage::Error { code, message },
            })
        }
        "LOOP" => Ok(ServerMessage::Loop {
            expected_delay_ms: rest.parse().unwrap_or(0),
        }),
        "SUBOK" => {
            let mut parts = rest.split(',');
            Ok(ServerMessage::SubOk {
                subscription: number(parts.next(), "SUBOK", line)?,
                items: number(parts.next(), "SUBOK", line)?,
                fields: number(parts.next(), "SUBOK", line)?,
            })
        }
        "U" => {
            // Values may contain raw commas, so only the first two separators count.
            let mut parts = rest.splitn(3, ',');
            let subscription = number(parts.next(), "U", line)?;
            let item = number(parts.next(), "U", line)?;
            let values = parts
                .next()
                .ok_or_else(|| malformed("U", line))?
                .to_string();
            Ok(ServerMessage::Update {
                subscription,
                item,
                values,
            })
        }
        "UNSUB" => Ok(ServerMessage::Unsub {
            subscription: number(Some(rest), "UNSUB", line)?,
        }),
        "REQOK" => Ok(ServerMessage::ReqOk {
            request: number(rest.split(',').next(), "REQOK", line)?,
        }),
        "REQERR" => {
            let mut parts = rest.splitn(3, ',');
            Ok(ServerMessage::ReqErr {
                request: number(parts.next(), "REQERR", line)?,
                code: number(parts.next(), "REQERR", line)?,
                message: text(parts.next()),
            })
        }
        "PROBE" => Ok(ServerMessage::Probe),
        _ if tag.chars().all(|c| c.is_ascii_uppercase()) && !tag.is_empty() => {
            Ok(ServerMessage::Other(line.to_string()))
        }
        _ => Err(malformed("unknown", line)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conok_with_and_without_control_link() {
        assert_eq!(
            parse_line("CONOK,S1a2b3,50000,5000,*").unwrap(),
            ServerMessage::ConOk {
                session_id: "S1a2b3".into(),
                request_limit: 50000,
                keepalive_ms: 5000,
                control_link: None,
            }
        );
        let ServerMessage::ConOk { control_link, .. } =
            parse_line("CONOK,S1,50000,5000,push2.example.com").unwrap()
        else {
            panic!("expected CONOK");
        };
        assert_eq!(control_link.as_deref(), Some("push2.example.com"));
    }

    #[test]
    fn update_keeps_commas_in_values() {
        assert_eq!(
            parse_line("U,1,3,4000.1|a,b|#").unwrap(),
            ServerMessage::Update {
                subscription: 1,
                item: 3,
                values: "4000.1|a,b|#".into(),
            }
        );
    }

    #[test]
    fn error_messages_are_percent_decoded() {
        assert_eq!(
            parse_line("CONERR,2,Requested%20Adapter%20Set%20not%20available").unwrap(),
            ServerMessage::ConErr {
                code: 2,
                message: "Requested Adapter Set not available".into(),
            }
        );
        assert_eq!(
            parse_line("REQERR,4,19,Specified%20subscription%20not%20found").unwrap(),
            ServerMessage::ReqErr {
                request: 4,
                code: 19,
                message: "Specified subscription not found".into(),
            }
        );
    }

    #[test]
    fn informational_lines_are_tolerated() {
        for line in ["SERVNAME,Lightstreamer%20HTTP%20Server", "SYNC,12", "NOOP,x", "PROG,1"] {
            assert!(matches!(parse_line(line), Ok(ServerMessage::Other(_))), "{line}");
        }
        assert_eq!(parse_line("PROBE").unwrap(), ServerMessage::Probe);
        assert_eq!(
            parse_line("LOOP,0").unwrap(),
            ServerMessage::Loop {
                expected_delay_ms: 0
            }
        );
    }

    #[test]
    fn malformed_lines_are_rejected() {
        assert!(parse_line("CONOK").is_err());
        assert!(parse_line("SUBOK,1,x,2").is_err());
        assert!(parse_line("U,1").is_err());
        assert!(parse_line("hello world").is_err());
    }
}
