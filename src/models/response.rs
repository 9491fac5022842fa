use serde::{Deserialize, Serialize};

/// 后端错误响应格式，message 字段可选
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default)]
    pub message: Option<String>,
}
