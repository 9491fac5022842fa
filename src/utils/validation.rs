use crate::error::{ClientError, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use std::borrow::Cow;
use validator::ValidationError;

static UPPERCASE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[A-Z]").unwrap());
static SPECIAL_CHAR: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^A-Za-z0-9\s]").unwrap());

const MIN_PASSWORD_LENGTH: usize = 8;

/// 邮箱验证工具函数
pub fn validate_email(email: &str) -> bool {
    validator::validate_email(email)
}

/// 验证邮箱并返回详细错误信息
pub fn validate_email_format(email: &str) -> Result<()> {
    if email.trim().is_empty() {
        return Err(ClientError::validation("Email is required"));
    }

    if !validate_email(email.trim()) {
        return Err(ClientError::validation("Invalid email format"));
    }

    Ok(())
}

/// 用户名至少需要 min_len 个字符
pub fn validate_username(username: &str, min_len: usize) -> Result<()> {
    if username.trim().chars().count() < min_len {
        return Err(ClientError::ValidationFailed(format!(
            "Username must be at least {} characters long",
            min_len
        )));
    }
    Ok(())
}

/// 密码强度：长度、一个大写字母、一个特殊字符
pub fn validate_password_strength(password: &str) -> std::result::Result<(), ValidationError> {
    if password.chars().count() >= MIN_PASSWORD_LENGTH
        && UPPERCASE.is_match(password)
        && SPECIAL_CHAR.is_match(password)
    {
        return Ok(());
    }

    let mut error = ValidationError::new("weak_password");
    error.message = Some(Cow::from(
        "Password must be at least 8 characters long, include one uppercase letter, and one special character",
    ));
    Err(error)
}

/// 帖子标题（去除首尾空白后）长度检查
pub fn validate_post_title(title: &str, min_len: usize) -> Result<()> {
    if title.trim().chars().count() < min_len {
        return Err(ClientError::ValidationFailed(format!(
            "Title must be at least {} characters long",
            min_len
        )));
    }
    Ok(())
}

/// 评论、回复等文本不能为空或只有空白
pub fn require_content(content: &str, what: &str) -> Result<String> {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        return Err(ClientError::ValidationFailed(format!("{} cannot be empty.", what)));
    }
    Ok(trimmed.to_string())
}
