use crate::{
    error::Result,
    models::{
        comment::{Comment, CreateCommentRequest},
        post::PostId,
    },
    services::api::{ApiClient, ApiRequest},
    utils::validation,
};
use tracing::debug;

#[derive(Clone)]
pub struct CommentService {
    api: ApiClient,
}

impl CommentService {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    pub async fn list_comments(&self, post_id: PostId) -> Result<Vec<Comment>> {
        debug!("Fetching comments for post {}", post_id);
        self.api
            .get_json(ApiRequest::get(format!("posts/{}/comments", post_id)))
            .await
    }

    /// 发表评论；空白内容在发出请求前就被拒绝
    pub async fn add_comment(&self, post_id: PostId, content: &str) -> Result<String> {
        let content = validation::require_content(content, "Comment")?;

        let request = CreateCommentRequest {
            content: content.clone(),
        };
        self.api
            .execute(ApiRequest::post(format!("posts/{}/comments", post_id)).json(&request)?)
            .await?;

        debug!("Comment added to post {}", post_id);
        Ok(content)
    }
}
