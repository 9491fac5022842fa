use crate::{
    error::Result,
    models::message::{ConversationMessage, Message, ReplyRequest},
    services::api::{ApiClient, ApiRequest},
    utils::validation,
};
use tracing::{debug, info};

#[derive(Clone)]
pub struct MessageService {
    api: ApiClient,
}

impl MessageService {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    pub async fn inbox(&self) -> Result<Vec<Message>> {
        debug!("Fetching inbox");
        self.api
            .get_json(ApiRequest::get("users/me/conversations"))
            .await
    }

    pub async fn conversation(&self, message_id: i64) -> Result<Vec<ConversationMessage>> {
        self.api
            .get_json(ApiRequest::get(format!(
                "users/me/conversations/{}",
                message_id
            )))
            .await
    }

    pub async fn reply(&self, message_id: i64, content: &str) -> Result<()> {
        let content = validation::require_content(content, "Reply content")?;

        self.api
            .execute(
                ApiRequest::post(format!("messages/{}/reply", message_id))
                    .json(&ReplyRequest { content })?,
            )
            .await?;
        info!("Replied to message {}", message_id);
        Ok(())
    }
}
