use crate::{
    error::Result,
    models::{
        follow::UserId,
        user::{ChangePasswordRequest, UpdateProfileRequest, UserProfile},
    },
    services::api::{ApiClient, ApiRequest},
};
use tracing::{debug, info};
use validator::Validate;

#[derive(Clone)]
pub struct UserService {
    api: ApiClient,
}

impl UserService {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    pub async fn get_profile(&self, user_id: UserId) -> Result<UserProfile> {
        debug!("Fetching profile {}", user_id);
        self.api
            .get_json(ApiRequest::get(format!("userprofiles/{}", user_id)))
            .await
    }

    pub async fn update_profile(&self, user_id: UserId, request: UpdateProfileRequest) -> Result<()> {
        request.validate()?;
        self.api
            .execute(ApiRequest::put(format!("userprofiles/{}", user_id)).json(&request)?)
            .await?;
        info!("Profile {} updated", user_id);
        Ok(())
    }

    pub async fn change_password(&self, request: ChangePasswordRequest) -> Result<()> {
        request.validate()?;
        self.api
            .execute(ApiRequest::put("user/password").json(&request)?)
            .await?;
        info!("Password changed");
        Ok(())
    }
}
