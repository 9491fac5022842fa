use crate::{
    config::Config,
    error::{ClientError, ErrorDisplay, Result},
    models::user::RefreshResponse,
    services::session::{SessionStore, SharedSessionStore},
};
use reqwest::{Client, Method, Response, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use tracing::{debug, error, info, warn};
use url::Url;

/// 一次请求的完整描述，401 后重试时按原样重新发送
#[derive(Debug, Clone)]
pub struct ApiRequest {
    method: Method,
    path: String,
    query: Option<Value>,
    body: Option<Value>,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: None,
            body: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(Method::PATCH, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    pub fn json<B: Serialize>(mut self, body: &B) -> Result<Self> {
        self.body = Some(serde_json::to_value(body)?);
        Ok(self)
    }

    pub fn query<Q: Serialize>(mut self, query: &Q) -> Result<Self> {
        self.query = Some(serde_json::to_value(query)?);
        Ok(self)
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }
}

/// 带 Bearer 令牌的请求封装
///
/// 遇到 401 时最多刷新一次令牌、最多重试一次原请求；
/// 其余错误状态原样交给调用方。
#[derive(Clone)]
pub struct ApiClient {
    base_url: Url,
    http_client: Client,
    session: SharedSessionStore,
}

impl ApiClient {
    pub fn new(config: &Config, session: SharedSessionStore) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.request_timeout() {
            builder = builder.timeout(timeout);
        }
        let http_client = builder
            .build()
            .map_err(|e| ClientError::Config(format!("Failed to create HTTP client: {}", e)))?;

        // 保证以 / 结尾，join 时才不会丢掉最后一段路径
        let mut base = config.api_base_url.trim_end_matches('/').to_string();
        base.push('/');
        let base_url = Url::parse(&base)?;

        Ok(Self {
            base_url,
            http_client,
            session,
        })
    }

    pub fn session(&self) -> &SharedSessionStore {
        &self.session
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn url(&self, path: &str) -> Result<Url> {
        Ok(self.base_url.join(path.trim_start_matches('/'))?)
    }

    async fn send(&self, request: &ApiRequest, bearer: Option<&str>) -> Result<Response> {
        let url = self.url(&request.path)?;
        let mut builder = self.http_client.request(request.method.clone(), url);

        if let Some(token) = bearer {
            builder = builder.bearer_auth(token);
        }
        if let Some(query) = &request.query {
            builder = builder.query(query);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        Ok(builder.send().await?)
    }

    async fn check(response: Response) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(ClientError::request_failed(status, body))
    }

    /// 发送需要认证的请求
    pub async fn call(&self, request: ApiRequest) -> Result<Response> {
        let token = self
            .session
            .get_access_token()
            .ok_or(ClientError::Unauthenticated)?;

        debug!("{} {}", request.method, request.path);
        let response = self.send(&request, Some(&token)).await?;
        if response.status() != StatusCode::UNAUTHORIZED {
            return Self::check(response).await;
        }

        warn!(
            "Access token rejected for {} {}, refreshing",
            request.method, request.path
        );
        let token = self.refresh_access_token().await?;

        // 重试只有这一次，再次 401 直接按普通错误返回
        let response = self.send(&request, Some(&token)).await?;
        Self::check(response).await
    }

    /// 发送不带令牌的请求（登录、注册）
    pub async fn call_public(&self, request: ApiRequest) -> Result<Response> {
        debug!("{} {} (public)", request.method, request.path);
        let response = self.send(&request, None).await?;
        Self::check(response).await
    }

    /// 用刷新令牌换取新的访问令牌，刷新令牌本身保持不变
    ///
    /// 任何失败都视为会话过期；令牌不在这里清除。
    pub async fn refresh_access_token(&self) -> Result<String> {
        let refresh_token = self
            .session
            .get_refresh_token()
            .ok_or(ClientError::SessionExpired)?;

        let request = ApiRequest::post("refresh").json(&serde_json::json!({}))?;
        let response = match self.send(&request, Some(&refresh_token)).await {
            Ok(response) => response,
            Err(e) => {
                error!("Token refresh request failed: {}", e);
                return Err(ClientError::SessionExpired);
            }
        };

        if !response.status().is_success() {
            warn!("Token refresh rejected with status {}", response.status());
            return Err(ClientError::SessionExpired);
        }

        let refreshed: RefreshResponse = response.json().await.map_err(|e| {
            error!("Failed to parse refresh response: {}", e);
            ClientError::SessionExpired
        })?;

        self.session.set_access_token(&refreshed.access_token)?;
        info!("Access token refreshed");
        Ok(refreshed.access_token)
    }

    pub async fn get_json<T: DeserializeOwned>(&self, request: ApiRequest) -> Result<T> {
        let response = self.call(request).await?;
        Ok(response.json().await?)
    }

    /// 发送请求并忽略响应体
    pub async fn execute(&self, request: ApiRequest) -> Result<()> {
        self.call(request).await?;
        Ok(())
    }

    pub async fn public_json<T: DeserializeOwned>(&self, request: ApiRequest) -> Result<T> {
        let response = self.call_public(request).await?;
        Ok(response.json().await?)
    }

    pub fn handle_error(&self, err: &ClientError) -> ErrorDisplay {
        report_error(self.session.as_ref(), err)
    }
}

/// 统一的错误处理策略：认证类错误清除会话，其余只生成提示
pub fn report_error(session: &dyn SessionStore, err: &ClientError) -> ErrorDisplay {
    if err.requires_reauth() {
        if let Err(e) = session.clear() {
            error!("Failed to clear session after auth failure: {}", e);
        }
    }
    err.display()
}
