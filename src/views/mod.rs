pub mod list_state;
pub mod feed;
pub mod follows;
pub mod notifications;
pub mod inbox;

pub use feed::FeedView;
pub use follows::{FollowListKind, FollowListView};
pub use inbox::InboxView;
pub use list_state::{Entity, ListState};
pub use notifications::NotificationsView;

/// 视图操作的结果：失败时已转成可展示的提示
pub type ViewResult<T> = std::result::Result<T, crate::error::ErrorDisplay>;
