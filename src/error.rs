use reqwest::StatusCode;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ClientError>;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Not authenticated")]
    Unauthenticated,

    #[error("Session expired")]
    SessionExpired,

    #[error("Request failed with status {status}: {}", .message.as_deref().unwrap_or("no message"))]
    RequestFailed {
        status: StatusCode,
        message: Option<String>,
        body: String,
    },

    #[error("Validation error: {0}")]
    ValidationFailed(String),

    #[error("Validation error: {0}")]
    Validator(#[from] validator::ValidationErrors),

    #[error("Request error: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Inconsistent local state: {0}")]
    InvalidState(String),

    #[error("Session storage error: {0}")]
    Storage(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),

    /// 多步操作中前面的请求已经生效，后面的失败了
    #[error("{0} (partially applied)")]
    PartiallyApplied(Box<ClientError>),
}

/// 错误在界面上的处理方式
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorDisplay {
    /// 需要重新登录，会话已被清除
    Reauthenticate(String),
    /// 行内临时提示
    Inline(String),
    /// 表单校验失败，请求未发出
    Validation(String),
}

impl ErrorDisplay {
    pub fn message(&self) -> &str {
        match self {
            ErrorDisplay::Reauthenticate(msg)
            | ErrorDisplay::Inline(msg)
            | ErrorDisplay::Validation(msg) => msg,
        }
    }
}

impl ClientError {
    /// 是否需要清除会话并要求重新登录
    pub fn requires_reauth(&self) -> bool {
        match self {
            ClientError::Unauthenticated | ClientError::SessionExpired => true,
            ClientError::PartiallyApplied(inner) => inner.requires_reauth(),
            _ => false,
        }
    }

    pub fn is_validation(&self) -> bool {
        match self {
            ClientError::ValidationFailed(_) | ClientError::Validator(_) => true,
            ClientError::PartiallyApplied(inner) => inner.is_validation(),
            _ => false,
        }
    }

    /// 服务端状态已经部分改变，本地不能简单回滚
    pub fn is_partially_applied(&self) -> bool {
        matches!(self, ClientError::PartiallyApplied(_))
    }

    /// HTTP状态码（仅 RequestFailed 携带）
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ClientError::RequestFailed { status, .. } => Some(*status),
            ClientError::PartiallyApplied(inner) => inner.status(),
            _ => None,
        }
    }

    /// 面向用户的错误信息，后端返回的 message 原样展示
    pub fn user_message(&self) -> String {
        match self {
            ClientError::Unauthenticated => "Please log in to continue.".to_string(),
            ClientError::SessionExpired => {
                "Your session has expired. Please log in again.".to_string()
            }
            ClientError::RequestFailed { status, message, .. } => match message {
                Some(msg) => msg.clone(),
                None => format!(
                    "Request failed ({})",
                    status.canonical_reason().unwrap_or("unknown error")
                ),
            },
            ClientError::ValidationFailed(msg) => msg.clone(),
            ClientError::Validator(e) => e
                .field_errors()
                .iter()
                .flat_map(|(field, errors)| {
                    errors.iter().map(move |err| match &err.message {
                        Some(msg) => msg.to_string(),
                        None => format!("Invalid value for {}", field),
                    })
                })
                .next()
                .unwrap_or_else(|| "Invalid input".to_string()),
            ClientError::Request(_) => {
                "Could not reach the server. Please try again.".to_string()
            }
            ClientError::Serialization(_) => "Unexpected response from the server.".to_string(),
            ClientError::Io(_) | ClientError::Storage(_) => {
                "Could not access local session storage.".to_string()
            }
            ClientError::InvalidState(_) => {
                "This item is out of date. Please refresh and try again.".to_string()
            }
            ClientError::Config(msg) => msg.clone(),
            ClientError::Url(_) => "Invalid server address.".to_string(),
            ClientError::PartiallyApplied(inner) => inner.user_message(),
        }
    }

    pub fn display(&self) -> ErrorDisplay {
        let message = self.user_message();
        if self.requires_reauth() {
            ErrorDisplay::Reauthenticate(message)
        } else if self.is_validation() {
            ErrorDisplay::Validation(message)
        } else {
            ErrorDisplay::Inline(message)
        }
    }
}

// 便利函数，用于创建常见错误
impl ClientError {
    pub fn validation(msg: &str) -> Self {
        Self::ValidationFailed(msg.to_string())
    }

    pub fn partially_applied(err: ClientError) -> Self {
        match err {
            partial @ Self::PartiallyApplied(_) => partial,
            other => Self::PartiallyApplied(Box::new(other)),
        }
    }

    pub fn request_failed(status: StatusCode, body: String) -> Self {
        let message = serde_json::from_str::<crate::models::response::ApiErrorBody>(&body)
            .ok()
            .and_then(|b| b.message);

        Self::RequestFailed {
            status,
            message,
            body,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_failed_extracts_message() {
        let err = ClientError::request_failed(
            StatusCode::BAD_REQUEST,
            r#"{"message":"You have already rated this post."}"#.to_string(),
        );
        assert_eq!(err.status(), Some(StatusCode::BAD_REQUEST));
        assert_eq!(err.user_message(), "You have already rated this post.");
        assert!(!err.requires_reauth());
    }

    #[test]
    fn test_request_failed_without_json_body() {
        let err = ClientError::request_failed(
            StatusCode::INTERNAL_SERVER_ERROR,
            "<html>oops</html>".to_string(),
        );
        assert_eq!(err.user_message(), "Request failed (Internal Server Error)");
    }

    #[test]
    fn test_display_classification() {
        assert!(matches!(
            ClientError::SessionExpired.display(),
            ErrorDisplay::Reauthenticate(_)
        ));
        assert!(matches!(
            ClientError::Unauthenticated.display(),
            ErrorDisplay::Reauthenticate(_)
        ));
        assert!(matches!(
            ClientError::validation("Comment cannot be empty").display(),
            ErrorDisplay::Validation(_)
        ));
        assert!(matches!(
            ClientError::request_failed(StatusCode::NOT_FOUND, "{}".into()).display(),
            ErrorDisplay::Inline(_)
        ));
    }

    #[test]
    fn test_partially_applied_keeps_inner_classification() {
        let err = ClientError::partially_applied(ClientError::request_failed(
            StatusCode::INTERNAL_SERVER_ERROR,
            r#"{"message":"Rating failed"}"#.into(),
        ));
        assert!(err.is_partially_applied());
        assert_eq!(err.status(), Some(StatusCode::INTERNAL_SERVER_ERROR));
        assert_eq!(err.display(), ErrorDisplay::Inline("Rating failed".into()));

        // 不会重复包装
        let twice = ClientError::partially_applied(err);
        assert!(matches!(&twice, ClientError::PartiallyApplied(inner) if !inner.is_partially_applied()));

        let expired = ClientError::partially_applied(ClientError::SessionExpired);
        assert!(expired.requires_reauth());
    }
}
