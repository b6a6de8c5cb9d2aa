use std::{collections::HashMap, sync::Arc, time::Duration};

use reqwest::header::CONTENT_TYPE;
use tokio::{
    runtime::Runtime,
    sync::{mpsc::UnboundedSender, watch},
    task::JoinHandle,
    time::{sleep, timeout},
};
use tracing::{debug, info, trace, warn};

use crate::{
    decoder::UpdateDecoder,
    error::{ProtocolError, StreamError},
    events::{DisconnectReason, StreamEvent},
    lines::LineReader,
    protocol::{self, ServerMessage},
    request,
    subscription::{Subscription, SubscriptionId},
};

/// Keepalive assumed until CONOK announces the real one.
const DEFAULT_KEEPALIVE: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub server_address: String,
    pub adapter_set: String,
    /// Sent as `LS_cid`.
    pub client_id: String,
    pub reconnect: bool,
    pub reconnect_delay: Duration,
    /// Added to the server keepalive before the stream counts as stalled.
    pub keepalive_margin: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server_address: "https://push.lightstreamer.com".to_string(),
            adapter_set: "ISSLIVE".to_string(),
            client_id: "mgQkwtwdysogQz2BJ4Ji kOj2Bg".to_string(),
            reconnect: true,
            reconnect_delay: Duration::from_secs(5),
            keepalive_margin: Duration::from_secs(10),
        }
    }
}

/// Long-lived connection to one Lightstreamer server.
///
/// Owns its own Tokio runtime so it can be driven from a non-async host loop.
/// Events are delivered on the channel handed to [`StreamClient::start`].
pub struct StreamClient {
    runtime: Runtime,
    http: reqwest::Client,
    config: ClientConfig,
    subscriptions: Vec<(SubscriptionId, Subscription)>,
    event_sender: Option<UnboundedSender<StreamEvent>>,
    shutdown_tx: Option<watch::Sender<bool>>,
    session_task: Option<JoinHandle<()>>,
}

impl std::fmt::Debug for StreamClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StreamClient")
            .field("server_address", &self.config.server_address)
            .field("subscriptions", &self.subscriptions.len())
            .field("running", &self.is_running())
            .finish()
    }
}

impl StreamClient {
    pub fn new(config: ClientConfig) -> Result<Self, StreamError> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .thread_name("lightstreamer")
            .enable_all()
            .build()
            .map_err(StreamError::Runtime)?;
        let http = reqwest::Client::builder().build()?;

        Ok(Self {
            runtime,
            http,
            config,
            subscriptions: Vec::new(),
            event_sender: None,
            shutdown_tx: None,
            session_task: None,
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Registers a subscription that is added to every session. Ids start at 1.
    pub fn subscribe(&mut self, subscription: Subscription) -> Result<SubscriptionId, StreamError> {
        if self.session_task.is_some() {
            return Err(StreamError::AlreadyStarted);
        }
        let id = SubscriptionId(self.subscriptions.len() as u32 + 1);
        self.subscriptions.push((id, subscription));
        Ok(id)
    }

    pub fn start(&mut self, events: UnboundedSender<StreamEvent>) -> Result<(), StreamError> {
        if self.session_task.is_some() {
            return Err(StreamError::AlreadyStarted);
        }

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let session = Session {
            http: self.http.clone(),
            config: self.config.clone(),
            subscriptions: Arc::new(self.subscriptions.clone()),
            events: events.clone(),
            decoder: UpdateDecoder::new(),
            pending: HashMap::new(),
            next_request_id: 1,
        };

        info!(
            server = %self.config.server_address,
            adapter_set = %self.config.adapter_set,
            subscriptions = self.subscriptions.len(),
            "starting lightstreamer session"
        );
        let handle = self.runtime.spawn(session.run(shutdown_rx));

        self.event_sender = Some(events);
        self.shutdown_tx = Some(shutdown_tx);
        self.session_task = Some(handle);
        Ok(())
    }

    pub fn stop(&mut self) {
        if let Some(shutdown) = self.shutdown_tx.take() {
            let _ = shutdown.send(true);
        }
        if let Some(handle) = self.session_task.take() {
            handle.abort();
            info!("lightstreamer session stopped");
        }
        if let Some(sender) = self.event_sender.take() {
            let _ = sender.send(StreamEvent::Disconnected {
                reason: DisconnectReason::Stopped,
            });
        }
    }

    pub fn is_running(&self) -> bool {
        self.session_task
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }
}

impl Drop for StreamClient {
    fn drop(&mut self) {
        self.stop();
    }
}

enum Next {
    Rebind,
    Closed(DisconnectReason),
}

struct SessionState {
    session_id: Option<String>,
    base: String,
    keepalive: Duration,
}

struct Session {
    http: reqwest::Client,
    config: ClientConfig,
    subscriptions: Arc<Vec<(SubscriptionId, Subscription)>>,
    events: UnboundedSender<StreamEvent>,
    decoder: UpdateDecoder,
    /// Control request id to the subscription it adds.
    pending: HashMap<u64, SubscriptionId>,
    next_request_id: u64,
}

impl Session {
    async fn run(mut self, mut shutdown: watch::Receiver<bool>) {
        for (id, subscription) in self.subscriptions.iter() {
            self.decoder.register(*id, subscription);
        }

        loop {
            let reason = tokio::select! {
                reason = self.run_once() => reason,
                _ = shutdown.changed() => return,
            };

            warn!(%reason, "lightstreamer session ended");
            let _ = self.events.send(StreamEvent::Disconnected {
                reason: reason.clone(),
            });

            if !self.config.reconnect || !reason.is_recoverable() {
                return;
            }

            info!(
                delay_secs = self.config.reconnect_delay.as_secs_f32(),
                "reconnecting"
            );
            tokio::select! {
                _ = sleep(self.config.reconnect_delay) => {}
                _ = shutdown.changed() => return,
            }
        }
    }

    async fn run_once(&mut self) -> DisconnectReason {
        self.decoder.reset();
        self.pending.clear();
        let _ = self.events.send(StreamEvent::Connecting);

        let mut state = SessionState {
            session_id: None,
            base: request::session_base(&self.config.server_address, None),
            keepalive: DEFAULT_KEEPALIVE,
        };

        let body = request::create_session_body(&self.config.adapter_set, &self.config.client_id);
        let mut response = match self
            .post(request::create_session_url(&self.config.server_address), body)
            .await
        {
            Ok(response) => response,
            Err(reason) => return reason,
        };

        loop {
            match self.follow(response, &mut state).await {
                Next::Closed(reason) => return reason,
                Next::Rebind => {
                    let Some(session_id) = state.session_id.as_deref() else {
                        return DisconnectReason::Transport(ProtocolError::NoSession.to_string());
                    };
                    debug!(session = session_id, "rebinding session");
                    let url = request::bind_session_url(&state.base);
                    let body = request::bind_session_body(session_id);
                    response = match self.post(url, body).await {
                        Ok(response) => response,
                        Err(reason) => return reason,
                    };
                }
            }
        }
    }

    async fn post(&self, url: String, body: String) -> Result<reqwest::Response, DisconnectReason> {
        trace!(%url, %body, "POST");
        self.http
            .post(url)
            .header(CONTENT_TYPE, request::FORM_CONTENT_TYPE)
            .body(body)
            .send()
            .await
            .and_then(|response| response.error_for_status())
            .map_err(|err| DisconnectReason::Transport(err.to_string()))
    }

    /// Reads one streaming response until it ends or asks for a rebind.
    async fn follow(&mut self, response: reqwest::Response, state: &mut SessionState) -> Next {
        let rebinding = state.session_id.is_some();
        let mut lines = LineReader::new(Box::pin(response.bytes_stream()));

        loop {
            let deadline = state.keepalive + self.config.keepalive_margin;
            let line = match timeout(deadline, lines.next_line()).await {
                Err(_) => return Next::Closed(DisconnectReason::Stalled),
                Ok(Err(err)) => return Next::Closed(DisconnectReason::Transport(err.to_string())),
                Ok(Ok(None)) => return Next::Closed(DisconnectReason::StreamClosed),
                Ok(Ok(Some(line))) => line,
            };
            if line.is_empty() {
                continue;
            }

            let message = match protocol::parse_line(&line) {
                Ok(message) => message,
                Err(err) => {
                    warn!(%err, "skipping unparseable line");
                    continue;
                }
            };

            match message {
                ServerMessage::ConOk {
                    session_id,
                    keepalive_ms,
                    control_link,
                    ..
                } => {
                    state.keepalive = Duration::from_millis(keepalive_ms);
                    if rebinding {
                        continue;
                    }
                    info!(session = %session_id, keepalive_ms, "session created");
                    state.base =
                        request::session_base(&self.config.server_address, control_link.as_deref());
                    state.session_id = Some(session_id.clone());
                    let _ = self.events.send(StreamEvent::Connected { session_id });
                    if let Err(reason) = self.add_subscriptions(state).await {
                        return Next::Closed(reason);
                    }
                }
                ServerMessage::ConErr { code, message } => {
                    return Next::Closed(DisconnectReason::Refused { code, message });
                }
                ServerMessage::End { code, message } | ServerMessage::Error { code, message } => {
                    return Next::Closed(DisconnectReason::ServerClosed { code, message });
                }
                ServerMessage::Loop { .. } => return Next::Rebind,
                ServerMessage::SubOk {
                    subscription,
                    items,
                    fields,
                } => {
                    debug!(subscription, items, fields, "subscription active");
                    let _ = self.events.send(StreamEvent::Subscribed {
                        subscription: SubscriptionId(subscription),
                        items,
                        fields,
                    });
                }
                ServerMessage::Update {
                    subscription,
                    item,
                    values,
                } => match self.decoder.decode(subscription, item, &values) {
                    Ok(update) => {
                        let _ = self.events.send(StreamEvent::Update(update));
                    }
                    Err(err) => warn!(%err, "dropping update"),
                },
                ServerMessage::Unsub { subscription } => {
                    self.decoder.remove(SubscriptionId(subscription));
                }
                ServerMessage::ReqErr {
                    request,
                    code,
                    message,
                } => self.request_failed(request, code, message),
                ServerMessage::ReqOk { .. } | ServerMessage::Probe | ServerMessage::Other(_) => {
                    trace!(%line, "ignored");
                }
            }
        }
    }

    async fn add_subscriptions(&mut self, state: &SessionState) -> Result<(), DisconnectReason> {
        let Some(session_id) = state.session_id.as_deref() else {
            return Err(DisconnectReason::Transport(ProtocolError::NoSession.to_string()));
        };
        let subscriptions = Arc::clone(&self.subscriptions);

        for (id, subscription) in subscriptions.iter() {
            let request_id = self.next_request_id;
            self.next_request_id += 1;
            self.pending.insert(request_id, *id);

            let body = request::add_subscription_body(session_id, request_id, *id, subscription);
            let response = self.post(request::control_url(&state.base), body).await?;
            let text = response
                .text()
                .await
                .map_err(|err| DisconnectReason::Transport(err.to_string()))?;

            for line in text.lines().map(str::trim).filter(|l| !l.is_empty()) {
                match protocol::parse_line(line) {
                    Ok(ServerMessage::ReqErr {
                        request,
                        code,
                        message,
                    }) => self.request_failed(request, code, message),
                    Ok(ServerMessage::ReqOk { request }) => {
                        trace!(request, "control request accepted");
                    }
                    Ok(ServerMessage::Error { code, message }) => {
                        return Err(DisconnectReason::ServerClosed { code, message });
                    }
                    Ok(_) => {}
                    Err(err) => warn!(%err, "unexpected control response"),
                }
            }
        }
        Ok(())
    }

    fn request_failed(&mut self, request: u64, code: i32, message: String) {
        let Some(subscription) = self.pending.remove(&request) else {
            warn!(request, code, %message, "error for unknown control request");
            return;
        };
        warn!(%subscription, code, %message, "subscription rejected");
        let _ = self.events.send(StreamEvent::SubscriptionError {
            subscription,
            code,
            message,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subscribe_assigns_sequential_ids() {
        let mut client = StreamClient::new(ClientConfig::default()).unwrap();
        let a = client
            .subscribe(Subscription::merge(["A"], ["Value"]))
            .unwrap();
        let b = client
            .subscribe(Subscription::merge(["B"], ["Value"]))
            .unwrap();
        assert_eq!((a, b), (SubscriptionId(1), SubscriptionId(2)));
        assert!(!client.is_running());
    }

    #[test]
    fn stop_without_start_is_a_no_op() {
        let mut client = StreamClient::new(ClientConfig::default()).unwrap();
        client.stop();
        client.stop();
        assert!(!client.is_running());
    }

    #[test]
    fn default_config_points_at_iss_live() {
        let config = ClientConfig::default();
        assert_eq!(config.server_address, "https://push.lightstreamer.com");
        assert_eq!(config.adapter_set, "ISSLIVE");
        assert!(config.reconnect);
    }
}
