//! TechTalk 社交网络的异步客户端
//!
//! 会话令牌统一存放在 [`services::SessionStore`] 中；所有需要认证的请求经过
//! [`services::ApiClient`]，遇到 401 时刷新一次令牌并重试一次；点赞、收藏、关注
//! 等操作通过 [`services::ToggleReconciler`] 乐观更新界面状态。

pub mod config;
pub mod error;
pub mod models;
pub mod services;
pub mod state;
pub mod utils;
pub mod views;

pub use config::Config;
pub use error::{ClientError, ErrorDisplay, Result};
pub use state::AppState;
