//! Runtime error types

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Provider request failed: {message}")]
    Provider {
        /// Characters in the outbound context when the request failed
        context_chars: usize,
        message: String,
        /// Text received before the failure
        partial: String,
    },

    #[error("A request is already in flight")]
    Busy,

    #[error("Session error: {0}")]
    SessionError(String),

    #[error("Request cancelled")]
    Cancelled,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl RuntimeError {
    pub(crate) fn provider(context_chars: usize, message: impl Into<String>, partial: &str) -> Self {
        RuntimeError::Provider {
            context_chars,
            message: message.into(),
            partial: partial.to_string(),
        }
    }

    /// User-facing analysis block for a failed request.
    ///
    /// Other variants render as their plain message.
    pub fn diagnostic(&self) -> String {
        match self {
            RuntimeError::Provider {
                context_chars,
                message,
                ..
            } => format!(
                "[错误分析]\n\
                 API请求失败，可能原因：\n\
                 1. 上下文过长（当前约：{context_chars}字符）\n\
                 2. API连接问题\n\
                 \n\
                 [修正建议]\n\
                 请尝试以下操作：\n\
                 - 重新组织问题表述\n\
                 - 使用 /new 新建对话以重试\n\
                 - 检查API连接设置\n\
                 \n\
                 技术错误: {message}"
            ),
            other => other.to_string(),
        }
    }

    /// Partial response carried by a provider failure
    pub fn partial(&self) -> Option<&str> {
        match self {
            RuntimeError::Provider { partial, .. } if !partial.is_empty() => Some(partial),
            _ => None,
        }
    }
}

impl From<headline_llms::Error> for RuntimeError {
    fn from(err: headline_llms::Error) -> Self {
        match err {
            headline_llms::Error::MissingApiKey(id) => {
                RuntimeError::ConfigError(format!("missing API key for provider '{id}'"))
            }
            headline_llms::Error::ProviderNotFound(id) => {
                RuntimeError::ConfigError(format!("unknown provider '{id}'"))
            }
            other => RuntimeError::provider(0, other.to_string(), ""),
        }
    }
}

pub type Result<T> = std::result::Result<T, RuntimeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diagnostic_contains_context_size_and_cause() {
        let err = RuntimeError::provider(12345, "API error 401: bad key", "你好");
        let text = err.diagnostic();
        assert!(text.contains("12345字符"));
        assert!(text.contains("API连接问题"));
        assert!(text.contains("技术错误: API error 401: bad key"));
        assert_eq!(err.partial(), Some("你好"));
    }

    #[test]
    fn test_diagnostic_plain_for_other_variants() {
        let err = RuntimeError::Validation("prompt is empty".into());
        assert_eq!(err.diagnostic(), "Validation error: prompt is empty");
        assert!(err.partial().is_none());
    }

    #[test]
    fn test_llm_errors_map_to_config_errors() {
        let err: RuntimeError = headline_llms::Error::MissingApiKey("volcano".into()).into();
        assert!(matches!(err, RuntimeError::ConfigError(ref m) if m.contains("volcano")));

        let err: RuntimeError = headline_llms::Error::Stream("eof".into()).into();
        assert!(matches!(err, RuntimeError::Provider { .. }));
    }
}
