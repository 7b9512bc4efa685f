//! WebSocket actor for a single authenticated connection.

use std::time::{Duration, Instant};

use actix::prelude::*;
use actix_web_actors::ws::{self, CloseCode, CloseReason, Message, ProtocolError};
use tokio::sync::mpsc;
use tokio_stream::wrappers::UnboundedReceiverStream;
use tracing::{info, warn};
use uuid::Uuid;

use super::messages::{ClientEvent, ServerEvent};
use super::registry::{EventSender, SocketRegistry};
use crate::metrics;

/// Time between heartbeats to the client.
const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(5);
/// Maximum allowed time between messages from the client before considering it disconnected.
const CLIENT_TIMEOUT: Duration = Duration::from_secs(10);
/// How often joined sockets receive the list of other connected users.
const PRESENCE_INTERVAL: Duration = Duration::from_secs(10);

pub struct NotificationSocket {
    user_id: Uuid,
    socket_id: Uuid,
    registry: SocketRegistry,
    sender: EventSender,
    receiver: Option<mpsc::UnboundedReceiver<ServerEvent>>,
    joined: bool,
    last_heartbeat: Instant,
}

impl NotificationSocket {
    pub fn new(user_id: Uuid, registry: SocketRegistry) -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        Self {
            user_id,
            socket_id: Uuid::new_v4(),
            registry,
            sender,
            receiver: Some(receiver),
            joined: false,
            last_heartbeat: Instant::now(),
        }
    }

    fn send_event(ctx: &mut ws::WebsocketContext<Self>, event: &ServerEvent) {
        ctx.text(event.to_json());
    }

    fn handle_client_event(&mut self, event: ClientEvent, ctx: &mut ws::WebsocketContext<Self>) {
        match event {
            ClientEvent::Join { user_id } => {
                if user_id.is_some_and(|id| id != self.user_id) {
                    warn!(
                        user_id = %self.user_id,
                        "Join rejected: userId does not match the session"
                    );
                    Self::send_event(
                        ctx,
                        &ServerEvent::error("FORBIDDEN", "Cannot join as another user"),
                    );
                    return;
                }

                let registry = self.registry.clone();
                let (user_id, socket_id, sender) =
                    (self.user_id, self.socket_id, self.sender.clone());

                async move { registry.join(user_id, socket_id, sender).await }
                    .into_actor(self)
                    .map(|outcome, actor, _ctx| {
                        actor.joined = true;
                        info!(user_id = %actor.user_id, socket_id = %actor.socket_id, ?outcome, "User joined");
                    })
                    .wait(ctx);
            }
            ClientEvent::Leave => {
                self.joined = false;
                let registry = self.registry.clone();
                let (user_id, socket_id) = (self.user_id, self.socket_id);

                async move { registry.leave(user_id, socket_id).await }
                    .into_actor(self)
                    .map(|_, _, _| ())
                    .wait(ctx);
            }
        }
    }

    fn push_connected_users(&self, ctx: &mut ws::WebsocketContext<Self>) {
        if !self.joined {
            return;
        }

        let registry = self.registry.clone();
        let socket_id = self.socket_id;

        async move { registry.connected_users_except(socket_id).await }
            .into_actor(self)
            .map(|users, _actor, ctx| {
                Self::send_event(ctx, &ServerEvent::connected_users(users));
            })
            .spawn(ctx);
    }
}

impl Actor for NotificationSocket {
    type Context = ws::WebsocketContext<Self>;

    fn started(&mut self, ctx: &mut Self::Context) {
        metrics::ws_connection_opened();
        self.last_heartbeat = Instant::now();

        if let Some(receiver) = self.receiver.take() {
            ctx.add_stream(UnboundedReceiverStream::new(receiver));
        }

        ctx.run_interval(HEARTBEAT_INTERVAL, |actor, ctx| {
            if Instant::now().duration_since(actor.last_heartbeat) > CLIENT_TIMEOUT {
                info!(user_id = %actor.user_id, "WebSocket heartbeat timeout; closing connection");
                ctx.close(Some(CloseReason {
                    code: CloseCode::Normal,
                    description: Some("heartbeat timeout".into()),
                }));
                ctx.stop();
                return;
            }
            ctx.ping(b"");
        });

        ctx.run_interval(PRESENCE_INTERVAL, |actor, ctx| {
            actor.push_connected_users(ctx);
        });
    }

    fn stopped(&mut self, _: &mut Self::Context) {
        metrics::ws_connection_closed();

        let registry = self.registry.clone();
        let (user_id, socket_id) = (self.user_id, self.socket_id);
        actix::spawn(async move {
            registry.leave(user_id, socket_id).await;
        });
    }
}

impl StreamHandler<Result<Message, ProtocolError>> for NotificationSocket {
    fn handle(&mut self, msg: Result<Message, ProtocolError>, ctx: &mut Self::Context) {
        match msg {
            Ok(Message::Ping(payload)) => {
                self.last_heartbeat = Instant::now();
                ctx.pong(&payload);
            }
            Ok(Message::Text(text)) => {
                self.last_heartbeat = Instant::now();
                match serde_json::from_str::<ClientEvent>(&text) {
                    Ok(event) => self.handle_client_event(event, ctx),
                    Err(err) => {
                        warn!(error = %err, "Unrecognised client event");
                        Self::send_event(
                            ctx,
                            &ServerEvent::error("INVALID_MESSAGE", "Unrecognised event"),
                        );
                    }
                }
            }
            Ok(Message::Pong(_)) | Ok(Message::Binary(_)) => {
                self.last_heartbeat = Instant::now();
            }
            Ok(Message::Close(reason)) => {
                ctx.close(reason);
                ctx.stop();
            }
            Ok(Message::Nop) => {}
            Ok(Message::Continuation(_)) => {}
            Err(err) => {
                warn!(error = %err, "WebSocket protocol error");
                ctx.stop();
            }
        }
    }
}

/// Events routed to this socket through the registry
impl StreamHandler<ServerEvent> for NotificationSocket {
    fn handle(&mut self, event: ServerEvent, ctx: &mut Self::Context) {
        Self::send_event(ctx, &event);
    }

    fn finished(&mut self, _: &mut Self::Context) {}
}
