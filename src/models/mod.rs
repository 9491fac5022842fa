pub mod post;
pub mod comment;
pub mod notification;
pub mod follow;
pub mod user;
pub mod message;
pub mod response;

// 重新导出常用类型
pub use comment::Comment;
pub use follow::UserSummary;
pub use message::{ConversationMessage, Message};
pub use notification::{Notification, NotificationKind};
pub use post::{Post, PostId, Rating};
pub use user::{TokenPair, UserProfile};
