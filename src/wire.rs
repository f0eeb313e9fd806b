use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use chrono::NaiveDateTime;
use futures::{SinkExt, StreamExt};
use serde::Serialize;
use serde_json::Value;
use tokio::net::TcpStream;
use tokio::sync::{broadcast, mpsc, watch};
use tokio::task::JoinHandle;
use tokio_util::codec::{Framed, LinesCodec, LinesCodecError};
use tracing::{debug, warn};

use crate::command::{Command, CommandError, parse_command};
use crate::engine::{Engine, EngineError};
use crate::limits::MAX_REQUEST_LINE_LEN;
use crate::model::Event;
use crate::observability::{self, REQUEST_DURATION_SECONDS, REQUESTS_TOTAL};

const NOTIFY_BUFFER: usize = 64;

/// Serve one client: one JSON request per line, one JSON reply per request,
/// with notification lines for listened resources interleaved.
pub async fn process_connection(
    socket: TcpStream,
    engine: Arc<Engine>,
    clock: watch::Receiver<NaiveDateTime>,
) -> Result<(), WireError> {
    let mut framed = Framed::new(socket, LinesCodec::new_with_max_length(MAX_REQUEST_LINE_LEN));
    let (notify_tx, mut notify_rx) = mpsc::channel(NOTIFY_BUFFER);
    let mut session = Session {
        engine,
        clock,
        notify_tx,
        listeners: HashMap::new(),
    };

    loop {
        tokio::select! {
            frame = framed.next() => {
                let line = match frame {
                    None => return Ok(()),
                    Some(Ok(line)) => line,
                    Some(Err(LinesCodecError::MaxLineLengthExceeded)) => {
                        // The codec discards the rest of the line and resyncs.
                        framed.send(error_reply("line_too_long", "request line too long")?).await?;
                        continue;
                    }
                    Some(Err(e)) => return Err(e.into()),
                };
                if line.trim().is_empty() {
                    continue;
                }
                let reply = session.handle(&line)?;
                framed.send(reply).await?;
            }
            Some((resource_id, event)) = notify_rx.recv() => {
                framed.send(notification(&resource_id, &event)?).await?;
            }
        }
    }
}

/// Per-connection state. Dropping it stops every forwarding task.
struct Session {
    engine: Arc<Engine>,
    clock: watch::Receiver<NaiveDateTime>,
    notify_tx: mpsc::Sender<(String, Event)>,
    listeners: HashMap<String, JoinHandle<()>>,
}

impl Drop for Session {
    fn drop(&mut self) {
        for (_, task) in self.listeners.drain() {
            task.abort();
        }
    }
}

impl Session {
    fn handle(&mut self, line: &str) -> Result<String, WireError> {
        let started = Instant::now();
        let (label, outcome) = match parse_command(line) {
            Ok(cmd) => (observability::command_label(&cmd), self.execute(cmd)),
            Err(e) => ("invalid", Err(Failure::from(e))),
        };
        let status = if outcome.is_ok() { "ok" } else { "error" };
        metrics::counter!(REQUESTS_TOTAL, "op" => label, "status" => status).increment(1);
        metrics::histogram!(REQUEST_DURATION_SECONDS, "op" => label)
            .record(started.elapsed().as_secs_f64());

        let reply = match outcome {
            Ok(data) => ok_reply(&data)?,
            Err(failure) => {
                debug!("{label} failed: {} {}", failure.code, failure.message);
                error_reply(failure.code, &failure.message)?
            }
        };
        Ok(reply)
    }

    fn execute(&mut self, cmd: Command) -> Result<Value, Failure> {
        let engine = &self.engine;
        let data = match cmd {
            Command::Resources => serde_json::to_value(engine.resources())?,
            Command::Config => serde_json::to_value(&engine.config)?,
            Command::Day { date } => serde_json::to_value(engine.appointments_for_date(date))?,
            Command::Slots { date, duration } => {
                serde_json::to_value(engine.available_slots(date, duration))?
            }
            Command::Idle { resource_id, date } => {
                serde_json::to_value(engine.idle_spans(&resource_id, date)?)?
            }
            Command::Layout { date } => serde_json::to_value(engine.day_layout(date))?,
            Command::Now => {
                let now = *self.clock.borrow();
                serde_json::to_value(NowReply {
                    now,
                    line: engine.now_line(now),
                })?
            }
            Command::Submit { draft } => serde_json::to_value(engine.submit(draft)?)?,
            Command::Listen { resource_id } => {
                if !engine.store().contains_resource(&resource_id) {
                    return Err(EngineError::NotFound(resource_id).into());
                }
                let channel = channel_name(&resource_id);
                if !self.listeners.contains_key(&resource_id) {
                    let rx = engine.notify.subscribe(&resource_id);
                    let tx = self.notify_tx.clone();
                    let task = tokio::spawn(forward(resource_id.clone(), rx, tx));
                    self.listeners.insert(resource_id, task);
                }
                serde_json::to_value(ChannelReply {
                    channel,
                    listening: true,
                })?
            }
            Command::Unlisten { resource_id } => {
                if let Some(task) = self.listeners.remove(&resource_id) {
                    task.abort();
                }
                serde_json::to_value(ChannelReply {
                    channel: channel_name(&resource_id),
                    listening: false,
                })?
            }
        };
        Ok(data)
    }
}

async fn forward(
    resource_id: String,
    mut rx: broadcast::Receiver<Event>,
    tx: mpsc::Sender<(String, Event)>,
) {
    loop {
        match rx.recv().await {
            Ok(event) => {
                if tx.send((resource_id.clone(), event)).await.is_err() {
                    return;
                }
            }
            Err(broadcast::error::RecvError::Lagged(n)) => {
                warn!("listener on {resource_id} lagged, {n} events dropped");
            }
            Err(broadcast::error::RecvError::Closed) => return,
        }
    }
}

pub fn channel_name(resource_id: &str) -> String {
    format!("resource_{resource_id}")
}

#[derive(Serialize)]
struct NowReply {
    now: NaiveDateTime,
    line: Option<f64>,
}

#[derive(Serialize)]
struct ChannelReply {
    channel: String,
    listening: bool,
}

#[derive(Serialize)]
struct OkReply<'a, T> {
    ok: bool,
    data: &'a T,
}

#[derive(Serialize)]
struct ErrorReply<'a> {
    ok: bool,
    error: ErrorBody<'a>,
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    code: &'a str,
    message: &'a str,
}

#[derive(Serialize)]
struct Notification<'a> {
    notify: String,
    event: &'a Event,
}

fn ok_reply<T: Serialize>(data: &T) -> serde_json::Result<String> {
    serde_json::to_string(&OkReply { ok: true, data })
}

fn error_reply(code: &str, message: &str) -> serde_json::Result<String> {
    serde_json::to_string(&ErrorReply {
        ok: false,
        error: ErrorBody { code, message },
    })
}

fn notification(resource_id: &str, event: &Event) -> serde_json::Result<String> {
    serde_json::to_string(&Notification {
        notify: channel_name(resource_id),
        event,
    })
}

/// A request that failed, as reported to the client.
struct Failure {
    code: &'static str,
    message: String,
}

impl From<EngineError> for Failure {
    fn from(e: EngineError) -> Self {
        Failure {
            code: e.code(),
            message: e.to_string(),
        }
    }
}

impl From<CommandError> for Failure {
    fn from(e: CommandError) -> Self {
        Failure {
            code: e.code(),
            message: e.to_string(),
        }
    }
}

impl From<serde_json::Error> for Failure {
    fn from(e: serde_json::Error) -> Self {
        Failure {
            code: "internal",
            message: e.to_string(),
        }
    }
}

#[derive(Debug)]
pub enum WireError {
    Codec(LinesCodecError),
    Json(serde_json::Error),
}

impl From<LinesCodecError> for WireError {
    fn from(e: LinesCodecError) -> Self {
        WireError::Codec(e)
    }
}

impl From<serde_json::Error> for WireError {
    fn from(e: serde_json::Error) -> Self {
        WireError::Json(e)
    }
}

impl std::fmt::Display for WireError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WireError::Codec(e) => write!(f, "codec error: {e}"),
            WireError::Json(e) => write!(f, "encode error: {e}"),
        }
    }
}

impl std::error::Error for WireError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            WireError::Codec(e) => Some(e),
            WireError::Json(e) => Some(e),
        }
    }
}
