/*
[INPUT]:  WebSocket URL, subscription intents and a HydroListener
[OUTPUT]: Typed listener callbacks over a self-healing connection
[POS]:    WebSocket layer - connection lifecycle and frame routing
[UPDATE]: When changing reconnect behavior or connection logic
*/

use std::any::Any;
use std::fmt;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::atomic::{AtomicU8, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use futures_util::stream::SplitSink;
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message as WsMessage;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::http::HydroError;
use crate::types::ChannelName;
use crate::ws::listener::{HydroListener, dispatch};
use crate::ws::message::{InboundMessage, OutboundCommand};
use crate::ws::queue::OutboundQueue;

/// Push endpoint of the exchange
pub const WS_URL: &str = "wss://ws.ddex.io";

const SUBSCRIPTION_LOG_LIMIT: usize = 10;
const UNKNOWN_LOG_LIMIT: usize = 3;
const PARSE_FAIL_LOG_LIMIT: usize = 3;
const RAW_LOG_MAX_BYTES: usize = 1024;

const LISTENER_PANIC_LOG_LIMIT: usize = 3;

type WsSink = SplitSink<WebSocketStream<MaybeTlsStream<TcpStream>>, WsMessage>;

/// Watcher configuration
#[derive(Debug, Clone)]
pub struct WatcherConfig {
    pub url: String,
    /// Pause between a disconnect and the next attempt; zero reconnects at once
    pub reconnect_delay: Duration,
    /// Maximum queued commands while disconnected; `None` is unbounded
    pub queue_capacity: Option<usize>,
}

impl Default for WatcherConfig {
    fn default() -> Self {
        Self {
            url: WS_URL.to_string(),
            reconnect_delay: Duration::ZERO,
            queue_capacity: None,
        }
    }
}

impl WatcherConfig {
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    pub fn with_reconnect_delay(mut self, delay: Duration) -> Self {
        self.reconnect_delay = delay;
        self
    }

    pub fn with_queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = Some(capacity);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ConnectionState {
    Disconnected = 0,
    Connecting = 1,
    Open = 2,
}

impl ConnectionState {
    fn from_u8(value: u8) -> Self {
        match value {
            1 => ConnectionState::Connecting,
            2 => ConnectionState::Open,
            _ => ConnectionState::Disconnected,
        }
    }
}

/// Why a connection ended
enum Disconnect {
    Cancelled,
    ServerClosed,
    StreamEnded,
    Failed(HydroError),
}

impl fmt::Display for Disconnect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Disconnect::Cancelled => f.write_str("cancelled"),
            Disconnect::ServerClosed => f.write_str("closed by server"),
            Disconnect::StreamEnded => f.write_str("stream ended"),
            Disconnect::Failed(err) => write!(f, "error: {err}"),
        }
    }
}

/// Per-watcher counters for sampled logging
#[derive(Default)]
struct LogSamples {
    commands_sent: AtomicUsize,
    unknown: AtomicUsize,
    parse_failures: AtomicUsize,
    listener_panics: AtomicUsize,
}

impl LogSamples {
    /// Index of this sample, or `None` once `limit` samples were taken
    fn take(counter: &AtomicUsize, limit: usize) -> Option<usize> {
        let count = counter.fetch_add(1, Ordering::Relaxed);
        (count < limit).then_some(count + 1)
    }
}

struct WatcherShared {
    config: WatcherConfig,
    listener: Arc<dyn HydroListener>,
    queue: OutboundQueue,
    state: AtomicU8,
    attempts: AtomicU64,
    cancel: CancellationToken,
    samples: LogSamples,
}

impl WatcherShared {
    fn set_state(&self, state: ConnectionState) {
        self.state.store(state as u8, Ordering::Release);
    }
}

/// Streaming client for the exchange push endpoint
///
/// Owns at most one connection at a time. The connection task starts on the
/// first `subscribe`/`unsubscribe`, reconnects after every close or error and
/// runs until `close()` is called or the watcher is dropped. Commands issued
/// while disconnected are queued and sent in order once the socket opens.
/// Subscriptions are not replayed after a reconnect.
pub struct HydroWatcher {
    shared: Arc<WatcherShared>,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl HydroWatcher {
    /// Watcher on the default endpoint; does not connect yet
    pub fn new(listener: Arc<dyn HydroListener>) -> Self {
        Self::with_config(WatcherConfig::default(), listener)
    }

    pub fn with_config(config: WatcherConfig, listener: Arc<dyn HydroListener>) -> Self {
        let queue = OutboundQueue::new(config.queue_capacity);
        Self {
            shared: Arc::new(WatcherShared {
                config,
                listener,
                queue,
                state: AtomicU8::new(ConnectionState::Disconnected as u8),
                attempts: AtomicU64::new(0),
                cancel: CancellationToken::new(),
                samples: LogSamples::default(),
            }),
            task: Mutex::new(None),
        }
    }

    /// Subscribe to a channel for the given markets
    ///
    /// Must be called inside a Tokio runtime. Never blocks.
    pub fn subscribe<I, S>(&self, channel: ChannelName, market_ids: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let market_ids = market_ids.into_iter().map(Into::into).collect();
        self.enqueue(OutboundCommand::subscribe(channel, market_ids));
    }

    /// Unsubscribe from a channel for the given markets
    pub fn unsubscribe<I, S>(&self, channel: ChannelName, market_ids: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let market_ids = market_ids.into_iter().map(Into::into).collect();
        self.enqueue(OutboundCommand::unsubscribe(channel, market_ids));
    }

    pub fn state(&self) -> ConnectionState {
        ConnectionState::from_u8(self.shared.state.load(Ordering::Acquire))
    }

    /// Connection attempts made so far, successful or not
    pub fn connection_attempts(&self) -> u64 {
        self.shared.attempts.load(Ordering::Acquire)
    }

    /// Commands waiting for an open connection
    pub fn pending_commands(&self) -> usize {
        self.shared.queue.len()
    }

    pub fn is_closed(&self) -> bool {
        self.shared.cancel.is_cancelled()
    }

    /// Stop the connection task and wait for it to exit
    ///
    /// Commands issued afterwards are dropped.
    pub async fn close(&self) {
        self.shared.cancel.cancel();
        let handle = self
            .task
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(handle) = handle
            && let Err(err) = handle.await
        {
            warn!(error = %err, "ws connection task ended abnormally");
        }
        self.shared.set_state(ConnectionState::Disconnected);
    }

    fn enqueue(&self, command: OutboundCommand) {
        if self.shared.cancel.is_cancelled() {
            warn!(command = ?command, "ws watcher closed, dropping command");
            return;
        }

        let text = match command.to_text() {
            Ok(text) => text,
            Err(err) => {
                warn!(error = %err, "ws command serialization failed");
                return;
            }
        };

        self.ensure_started();
        self.shared.queue.push(text);
    }

    fn ensure_started(&self) {
        let mut task = self.task.lock().unwrap_or_else(PoisonError::into_inner);
        match task.as_ref() {
            Some(handle) if !handle.is_finished() => return,
            Some(_) => {
                warn!("ws connection task exited unexpectedly, restarting");
                self.shared.set_state(ConnectionState::Disconnected);
            }
            None => {}
        }

        match tokio::runtime::Handle::try_current() {
            Ok(runtime) => {
                *task = Some(runtime.spawn(run(self.shared.clone())));
            }
            Err(err) => {
                warn!(error = %err, "ws watcher needs a Tokio runtime, connection not started");
            }
        }
    }
}

impl Drop for HydroWatcher {
    fn drop(&mut self) {
        self.shared.cancel.cancel();
    }
}

impl fmt::Debug for HydroWatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HydroWatcher")
            .field("url", &self.shared.config.url)
            .field("state", &self.state())
            .field("connection_attempts", &self.connection_attempts())
            .field("pending_commands", &self.pending_commands())
            .finish_non_exhaustive()
    }
}

async fn run(shared: Arc<WatcherShared>) {
    let url = shared.config.url.as_str();

    while !shared.cancel.is_cancelled() {
        shared.set_state(ConnectionState::Connecting);
        let attempt = shared.attempts.fetch_add(1, Ordering::AcqRel) + 1;
        debug!(attempt, url, "ws connecting");

        let connected = tokio::select! {
            _ = shared.cancel.cancelled() => break,
            result = connect_async(url) => result,
        };

        match connected {
            Ok((stream, _response)) => {
                shared.set_state(ConnectionState::Open);
                info!(attempt, url, "ws connected");

                match run_connection(&shared, stream).await {
                    Disconnect::Cancelled => break,
                    reason => {
                        shared.set_state(ConnectionState::Connecting);
                        info!(
                            attempt,
                            reason = %reason,
                            pending = shared.queue.len(),
                            "ws disconnected, reconnecting"
                        );
                    }
                }
            }
            Err(err) => {
                let err = HydroError::from(err);
                warn!(attempt, url, error = %err, "ws connect failed");
            }
        }

        let delay = shared.config.reconnect_delay;
        if !delay.is_zero() {
            tokio::select! {
                _ = shared.cancel.cancelled() => break,
                _ = tokio::time::sleep(delay) => {}
            }
        }
    }

    shared.set_state(ConnectionState::Disconnected);
    info!(url, "ws watcher stopped");
}

async fn run_connection(
    shared: &WatcherShared,
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
) -> Disconnect {
    let (mut write, mut read) = stream.split();

    if let Err(reason) = flush_queue(shared, &mut write).await {
        return reason;
    }

    loop {
        tokio::select! {
            _ = shared.cancel.cancelled() => {
                let _ = write.send(WsMessage::Close(None)).await;
                return Disconnect::Cancelled;
            }
            _ = shared.queue.notified() => {
                if let Err(reason) = flush_queue(shared, &mut write).await {
                    return reason;
                }
            }
            incoming = read.next() => {
                match incoming {
                    Some(Ok(WsMessage::Text(text))) => handle_text(shared, text.as_str()),
                    Some(Ok(WsMessage::Binary(bytes))) => match std::str::from_utf8(&bytes) {
                        Ok(text) => handle_text(shared, text),
                        Err(err) => debug!(error = %err, bytes = bytes.len(), "ws binary frame is not utf-8"),
                    },
                    Some(Ok(WsMessage::Close(_))) => {
                        let _ = write.send(WsMessage::Close(None)).await;
                        return Disconnect::ServerClosed;
                    }
                    // tungstenite queues the pong reply to a ping itself
                    Some(Ok(_)) => {}
                    Some(Err(err)) => return Disconnect::Failed(err.into()),
                    None => return Disconnect::StreamEnded,
                }
            }
        }
    }
}

/// Write queued commands in order; a failed command goes back to the head
async fn flush_queue(shared: &WatcherShared, write: &mut WsSink) -> Result<(), Disconnect> {
    while let Some(command) = shared.queue.pop_front() {
        if let Err(err) = write.send(WsMessage::Text(command.clone().into())).await {
            shared.queue.push_front(command);
            return Err(Disconnect::Failed(err.into()));
        }
        log_command_sent(&shared.samples, &command);
    }
    Ok(())
}

fn handle_text(shared: &WatcherShared, text: &str) {
    match InboundMessage::parse(text) {
        Ok(InboundMessage::Unknown(discriminator)) => {
            log_unknown_once(&shared.samples, &discriminator, text)
        }
        Ok(message) => {
            let kind = message.kind_name().to_string();
            debug!(kind = %kind, "ws frame");
            // a panicking callback drops this frame only; the connection stays up
            let listener = shared.listener.as_ref();
            if let Err(payload) = catch_unwind(AssertUnwindSafe(|| dispatch(listener, message))) {
                log_listener_panic(&shared.samples, &kind, payload.as_ref());
            }
        }
        Err(err) => log_parse_fail_once(&shared.samples, &err, text),
    }
}

fn log_command_sent(samples: &LogSamples, command: &str) {
    let Some(index) = LogSamples::take(&samples.commands_sent, SUBSCRIPTION_LOG_LIMIT) else {
        return;
    };
    let preview = truncate_for_log(command, RAW_LOG_MAX_BYTES);
    info!(
        sample_index = index,
        sample_limit = SUBSCRIPTION_LOG_LIMIT,
        command = %preview,
        "ws command sent"
    );
}

fn log_unknown_once(samples: &LogSamples, discriminator: &str, raw: &str) {
    if let Some(index) = LogSamples::take(&samples.unknown, UNKNOWN_LOG_LIMIT) {
        let preview = truncate_for_log(raw, RAW_LOG_MAX_BYTES);
        debug!(
            sample_index = index,
            sample_limit = UNKNOWN_LOG_LIMIT,
            discriminator,
            message = %preview,
            "ws message type unrecognized"
        );
    }
}

fn log_parse_fail_once(samples: &LogSamples, err: &serde_json::Error, raw: &str) {
    if let Some(index) = LogSamples::take(&samples.parse_failures, PARSE_FAIL_LOG_LIMIT) {
        info!(
            sample_index = index,
            sample_limit = PARSE_FAIL_LOG_LIMIT,
            error = %err,
            bytes = raw.len(),
            "ws message parse failed"
        );
        let preview = truncate_for_log(raw, RAW_LOG_MAX_BYTES);
        debug!(
            sample_index = index,
            sample_limit = PARSE_FAIL_LOG_LIMIT,
            error = %err,
            message = %preview,
            "ws message parse failed"
        );
    }
}

fn log_listener_panic(samples: &LogSamples, kind: &str, payload: &(dyn Any + Send)) {
    if let Some(index) = LogSamples::take(&samples.listener_panics, LISTENER_PANIC_LOG_LIMIT) {
        let reason = payload
            .downcast_ref::<&str>()
            .copied()
            .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
            .unwrap_or("non-string panic payload");
        warn!(
            sample_index = index,
            sample_limit = LISTENER_PANIC_LOG_LIMIT,
            kind,
            reason,
            "ws listener panicked, frame dropped"
        );
    }
}

fn truncate_for_log(value: &str, max_len: usize) -> String {
    if value.len() <= max_len {
        return value.to_string();
    }
    let mut end = max_len;
    while !value.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &value[..end])
}
