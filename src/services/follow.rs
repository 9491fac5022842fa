use crate::{
    error::Result,
    models::follow::{FollowRequest, UserId, UserSummary},
    services::api::{ApiClient, ApiRequest},
    utils::pagination::PageQuery,
};
use tracing::{debug, info};

#[derive(Clone)]
pub struct FollowService {
    api: ApiClient,
}

impl FollowService {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    pub async fn followers(&self, page: PageQuery) -> Result<Vec<UserSummary>> {
        debug!("Fetching followers page {}", page.page);
        self.api
            .get_json(ApiRequest::get("myfollowers").query(&page)?)
            .await
    }

    pub async fn following(&self, page: PageQuery) -> Result<Vec<UserSummary>> {
        debug!("Fetching following page {}", page.page);
        self.api
            .get_json(ApiRequest::get("myfollowing").query(&page)?)
            .await
    }

    pub async fn follow(&self, user_id: UserId) -> Result<()> {
        let request = FollowRequest {
            followed_user_id: user_id,
        };
        self.api
            .execute(ApiRequest::post("follow").json(&request)?)
            .await?;
        info!("Followed user {}", user_id);
        Ok(())
    }

    pub async fn unfollow(&self, user_id: UserId) -> Result<()> {
        let request = FollowRequest {
            followed_user_id: user_id,
        };
        self.api
            .execute(ApiRequest::delete("unfollow").json(&request)?)
            .await?;
        info!("Unfollowed user {}", user_id);
        Ok(())
    }
}
