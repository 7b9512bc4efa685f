/// Realtime notification gateway
///
/// - `registry`: which user is joined on which socket
/// - `session`: per-connection actor with heartbeat and presence updates
/// - `messages`: client and server event shapes
pub mod messages;
pub mod registry;
pub mod session;

pub use messages::{ClientEvent, ConnectedUser, NewNotificationPayload, ServerEvent};
pub use registry::{EventSender, JoinOutcome, SocketRegistry};
pub use session::NotificationSocket;
