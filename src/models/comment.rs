use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::utils::serde_helpers::lenient_timestamp;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub content: String,
    #[serde(default)]
    pub user: String,
    #[serde(with = "lenient_timestamp")]
    pub created_at: DateTime<Utc>,
}

impl Comment {
    /// 提交成功后立即显示的本地评论
    pub fn pending(content: &str, user: &str) -> Self {
        Self {
            id: None,
            content: content.to_string(),
            user: user.to_string(),
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateCommentRequest {
    #[validate(length(min = 1, max = 10000))]
    pub content: String,
}
