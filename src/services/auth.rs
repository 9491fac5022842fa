use crate::{
    config::Config,
    error::{ClientError, Result},
    models::{
        follow::UserId,
        user::{LoginRequest, SignupRequest, TokenPair},
    },
    services::api::{ApiClient, ApiRequest},
    utils::validation,
};
use serde::Deserialize;
use tracing::{debug, info, warn};
use validator::Validate;

/// 注册接口可能直接返回令牌，也可能只返回用户信息
#[derive(Debug, Deserialize)]
struct SignupResponse {
    #[serde(default)]
    access_token: Option<String>,
    #[serde(default)]
    refresh_token: Option<String>,
}

#[derive(Clone)]
pub struct AuthService {
    api: ApiClient,
    min_username_length: usize,
}

impl AuthService {
    pub fn new(api: ApiClient, config: &Config) -> Self {
        Self {
            api,
            min_username_length: config.min_username_length,
        }
    }

    pub fn is_logged_in(&self) -> bool {
        self.api.session().is_authenticated()
    }

    pub async fn login(&self, identifier: &str, password: &str) -> Result<TokenPair> {
        if identifier.trim().is_empty() || password.is_empty() {
            return Err(ClientError::validation(
                "Please enter your email or username and password",
            ));
        }

        let request = LoginRequest::new(identifier, password);
        if let Some(email) = &request.email {
            validation::validate_email_format(email)?;
        }

        debug!("Logging in as {}", identifier.trim());
        let tokens: TokenPair = self
            .api
            .public_json(ApiRequest::post("login").json(&request)?)
            .await?;

        self.api
            .session()
            .set_tokens(&tokens.access_token, &tokens.refresh_token)?;
        info!("Logged in as {}", identifier.trim());
        Ok(tokens)
    }

    /// 注册成功且后端返回令牌时，直接建立会话
    pub async fn signup(&self, request: SignupRequest) -> Result<bool> {
        request.validate()?;
        validation::validate_username(&request.username, self.min_username_length)?;

        let response: SignupResponse = self
            .api
            .public_json(ApiRequest::post("users").json(&request)?)
            .await?;

        match (response.access_token, response.refresh_token) {
            (Some(access), Some(refresh)) => {
                self.api.session().set_tokens(&access, &refresh)?;
                info!("Account {} created and signed in", request.username);
                Ok(true)
            }
            _ => {
                info!("Account {} created", request.username);
                Ok(false)
            }
        }
    }

    pub async fn refresh(&self) -> Result<String> {
        self.api.refresh_access_token().await
    }

    /// 登出：无论后端是否成功，本地会话都会被清除
    pub async fn logout(&self) -> Result<()> {
        let result = self.api.execute(ApiRequest::delete("logout")).await;
        if let Err(e) = &result {
            warn!("Logout request failed, clearing local session anyway: {}", e);
        }

        self.api.session().clear()?;
        info!("Logged out");

        match result {
            // 本来就没有登录，不算失败
            Err(ClientError::Unauthenticated) => Ok(()),
            other => other,
        }
    }

    /// 删除账号，成功后清除会话
    pub async fn delete_account(&self, user_id: UserId) -> Result<()> {
        self.api
            .execute(ApiRequest::delete(format!("userprofiles/{}", user_id)))
            .await?;

        self.api.session().clear()?;
        info!("Account {} deleted", user_id);
        Ok(())
    }
}
