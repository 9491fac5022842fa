pub mod session;
pub mod api;
pub mod auth;
pub mod post;
pub mod comment;
pub mod follow;
pub mod notification;
pub mod message;
pub mod user;
pub mod toggle;

// 重新导出常用类型
pub use api::{ApiClient, ApiRequest};
pub use auth::AuthService;
pub use comment::CommentService;
pub use follow::FollowService;
pub use message::MessageService;
pub use notification::NotificationService;
pub use post::PostService;
pub use session::{FileSessionStore, MemorySessionStore, SessionStore, SharedSessionStore};
pub use toggle::{ToggleOutcome, ToggleReconciler};
pub use user::UserService;
