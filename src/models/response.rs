//! 统一响应信封 `{status, data, message}`

use serde::Serialize;

/// 响应状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseStatus {
    /// 请求成功
    Success,
    /// 客户端错误（4xx）
    Failure,
    /// 服务端错误（5xx）
    Error,
}

/// 所有接口返回的响应体
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub status: ResponseStatus,
    pub data: Option<T>,
    pub message: String,
}

impl<T: Serialize> ApiResponse<T> {
    /// 带数据的成功响应
    pub fn success(message: impl Into<String>, data: T) -> Self {
        Self {
            status: ResponseStatus::Success,
            data: Some(data),
            message: message.into(),
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            status: ResponseStatus::Failure,
            data: None,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: ResponseStatus::Error,
            data: None,
            message: message.into(),
        }
    }
}

impl ApiResponse<()> {
    /// 仅包含消息的成功响应，`data` 序列化为 null
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            status: ResponseStatus::Success,
            data: None,
            message: message.into(),
        }
    }
}
