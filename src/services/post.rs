use crate::{
    config::Config,
    error::Result,
    models::post::{CreatePostRequest, CreateRatingRequest, Post, PostId, Rating},
    services::api::{ApiClient, ApiRequest},
    utils::validation,
};
use tracing::{debug, info};
use validator::Validate;

#[derive(Clone)]
pub struct PostService {
    api: ApiClient,
    min_title_length: usize,
}

impl PostService {
    pub fn new(api: ApiClient, config: &Config) -> Self {
        Self {
            api,
            min_title_length: config.min_title_length,
        }
    }

    /// 当前用户的信息流
    pub async fn list_posts(&self) -> Result<Vec<Post>> {
        debug!("Fetching posts");
        self.api.get_json(ApiRequest::get("posts")).await
    }

    pub async fn create_post(&self, title: &str, content: &str) -> Result<()> {
        let request = CreatePostRequest {
            title: title.trim().to_string(),
            content: content.trim().to_string(),
        };
        request.validate()?;
        validation::validate_post_title(&request.title, self.min_title_length)?;

        self.api
            .execute(ApiRequest::post("posts").json(&request)?)
            .await?;
        info!("Created post \"{}\"", request.title);
        Ok(())
    }

    /// 新建评价（like / dislike）
    pub async fn rate(&self, post_id: PostId, rating: Rating) -> Result<()> {
        let Some(status) = rating.status() else {
            return Ok(());
        };

        let request = CreateRatingRequest {
            post_id,
            status: status.to_string(),
        };
        self.api
            .execute(ApiRequest::post("ratings").json(&request)?)
            .await
    }

    pub async fn delete_rating(&self, post_id: PostId, rating_id: i64) -> Result<()> {
        self.api
            .execute(ApiRequest::delete(format!(
                "posts/{}/ratings/{}",
                post_id, rating_id
            )))
            .await
    }

    pub async fn favorite(&self, post_id: PostId) -> Result<()> {
        self.api
            .execute(ApiRequest::post(format!("posts/{}/favorite", post_id)))
            .await
    }

    pub async fn unfavorite(&self, post_id: PostId) -> Result<()> {
        self.api
            .execute(ApiRequest::delete(format!("posts/{}/favorite", post_id)))
            .await
    }
}
