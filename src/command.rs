use chrono::NaiveDate;
use serde::Deserialize;

use crate::limits::*;
use crate::model::AppointmentDraft;

/// One request line, tagged by `op`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Command {
    Resources,
    Config,
    Day {
        date: NaiveDate,
    },
    Slots {
        date: NaiveDate,
        #[serde(default)]
        duration: Option<u32>,
    },
    Idle {
        resource_id: String,
        date: NaiveDate,
    },
    Layout {
        date: NaiveDate,
    },
    Now,
    Submit {
        draft: AppointmentDraft,
    },
    Listen {
        resource_id: String,
    },
    Unlisten {
        resource_id: String,
    },
}

pub fn parse_command(line: &str) -> Result<Command, CommandError> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Err(CommandError::Empty);
    }
    let cmd: Command =
        serde_json::from_str(trimmed).map_err(|e| CommandError::Parse(e.to_string()))?;

    match &cmd {
        Command::Slots {
            duration: Some(d), ..
        } if !(MIN_SLOT_MINUTES..=MAX_SLOT_MINUTES).contains(d) => {
            Err(CommandError::OutOfRange("duration"))
        }
        Command::Idle { resource_id, .. }
        | Command::Listen { resource_id }
        | Command::Unlisten { resource_id }
            if resource_id.is_empty() || resource_id.len() > MAX_ID_LEN =>
        {
            Err(CommandError::OutOfRange("resource_id"))
        }
        _ => Ok(cmd),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    Parse(String),
    Empty,
    OutOfRange(&'static str),
}

impl CommandError {
    pub fn code(&self) -> &'static str {
        match self {
            CommandError::Parse(_) => "parse_error",
            CommandError::Empty => "empty_request",
            CommandError::OutOfRange(_) => "out_of_range",
        }
    }
}

impl std::fmt::Display for CommandError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CommandError::Parse(s) => write!(f, "parse error: {s}"),
            CommandError::Empty => write!(f, "empty request"),
            CommandError::OutOfRange(field) => write!(f, "{field} out of range"),
        }
    }
}

impl std::error::Error for CommandError {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::DraftKind;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 2).unwrap()
    }

    #[test]
    fn parse_unit_ops() {
        assert_eq!(parse_command(r#"{"op":"resources"}"#).unwrap(), Command::Resources);
        assert_eq!(parse_command(r#"{"op":"config"}"#).unwrap(), Command::Config);
        assert_eq!(parse_command(r#" {"op":"now"} "#).unwrap(), Command::Now);
    }

    #[test]
    fn parse_day_and_layout() {
        assert_eq!(
            parse_command(r#"{"op":"day","date":"2026-03-02"}"#).unwrap(),
            Command::Day { date: date() }
        );
        assert_eq!(
            parse_command(r#"{"op":"layout","date":"2026-03-02"}"#).unwrap(),
            Command::Layout { date: date() }
        );
    }

    #[test]
    fn parse_slots_duration_optional() {
        assert_eq!(
            parse_command(r#"{"op":"slots","date":"2026-03-02"}"#).unwrap(),
            Command::Slots {
                date: date(),
                duration: None
            }
        );
        assert_eq!(
            parse_command(r#"{"op":"slots","date":"2026-03-02","duration":30}"#).unwrap(),
            Command::Slots {
                date: date(),
                duration: Some(30)
            }
        );
    }

    #[test]
    fn slots_duration_bounds() {
        let err = parse_command(r#"{"op":"slots","date":"2026-03-02","duration":0}"#).unwrap_err();
        assert_eq!(err, CommandError::OutOfRange("duration"));
        assert!(parse_command(r#"{"op":"slots","date":"2026-03-02","duration":1441}"#).is_err());
        assert!(parse_command(r#"{"op":"slots","date":"2026-03-02","duration":1440}"#).is_ok());
    }

    #[test]
    fn parse_submit_draft() {
        let line = concat!(
            r#"{"op":"submit","draft":{"title":"Break","resource_id":"r1","kind":"blackout","#,
            r#""start":"2026-03-02T12:00:00","end":"2026-03-02T12:30:00"}}"#,
        );
        match parse_command(line).unwrap() {
            Command::Submit { draft } => {
                assert_eq!(draft.kind, DraftKind::Blackout);
                assert_eq!(draft.resource_id.as_deref(), Some("r1"));
                assert_eq!(draft.client_name, None);
                assert!(draft.start.is_some() && draft.end.is_some());
            }
            other => panic!("expected Submit, got {other:?}"),
        }
    }

    #[test]
    fn parse_listen() {
        assert_eq!(
            parse_command(r#"{"op":"listen","resource_id":"r2"}"#).unwrap(),
            Command::Listen {
                resource_id: "r2".into()
            }
        );
        assert_eq!(
            parse_command(r#"{"op":"listen","resource_id":""}"#).unwrap_err(),
            CommandError::OutOfRange("resource_id")
        );
    }

    #[test]
    fn rejects_garbage() {
        assert_eq!(parse_command("   ").unwrap_err(), CommandError::Empty);
        assert_eq!(parse_command("SELECT 1").unwrap_err().code(), "parse_error");
        assert_eq!(parse_command(r#"{"op":"drop_table"}"#).unwrap_err().code(), "parse_error");
        let bad_date = parse_command(r#"{"op":"day","date":"March 2"}"#).unwrap_err();
        assert_eq!(bad_date.code(), "parse_error");
    }
}
