use crate::{
    error::Result,
    models::notification::{MarkReadRequest, Notification},
    services::api::{ApiClient, ApiRequest},
};
use serde::Serialize;
use tracing::debug;

#[derive(Serialize)]
struct NotificationPage {
    page: u32,
}

#[derive(Clone)]
pub struct NotificationService {
    api: ApiClient,
}

impl NotificationService {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    pub async fn list(&self, page: u32) -> Result<Vec<Notification>> {
        debug!("Fetching notifications page {}", page);
        self.api
            .get_json(ApiRequest::get("notifications").query(&NotificationPage { page })?)
            .await
    }

    pub async fn set_read(&self, id: i64, read: bool) -> Result<()> {
        self.api
            .execute(
                ApiRequest::patch(format!("notifications/{}", id))
                    .json(&MarkReadRequest { read })?,
            )
            .await
    }
}
