/// Service layer: business rules between handlers and repositories
pub mod auth_service;
pub mod email_service;
pub mod media_store;
pub mod notification_service;
pub mod post_service;
pub mod user_service;

pub use auth_service::{AuthService, Registration};
pub use email_service::{LogMailer, Mailer, OutgoingEmail, SmtpMailer};
pub use media_store::{MediaStore, NoopMediaStore, S3MediaStore};
pub use notification_service::NotificationService;
pub use post_service::{PostDraft, PostService, FEED_PAGE_SIZE};
pub use user_service::{UserService, SEARCH_LIMIT};
