//! System prompt template and session seed text.

use std::path::Path;

use tracing::{debug, warn};

/// Built-in system prompt used when no template file can be read.
pub const DEFAULT_SYSTEM_PROMPT: &str = "你是一个专业的爆款标题生成助手，擅长为各类内容创作者生成吸引人的标题。\n\
请根据我提供的内容，从多个角度生成10个吸引人的标题，标题需要有吸引力、好奇心和价值点。\n\
每个标题请使用《》包裹，并给出简短的创作思路说明。";

/// Assistant turn seeded after the system prompt.
pub const WELCOME_MESSAGE: &str = "您好！我是爆款标题生成助手，可以从多个角度为您的内容生成具有吸引力的标题。请告诉我您想为什么主题或内容生成标题？";

/// Read the prompt template at `path`.
///
/// A missing, unreadable or blank file falls back to [`DEFAULT_SYSTEM_PROMPT`]
/// with a warning; session start never fails on the template.
pub fn load_prompt_template(path: &Path) -> String {
    match std::fs::read_to_string(path) {
        Ok(content) if !content.trim().is_empty() => {
            debug!(path = %path.display(), chars = content.chars().count(), "Loaded prompt template");
            content
        }
        Ok(_) => {
            warn!(path = %path.display(), "Prompt template is empty, using built-in prompt");
            DEFAULT_SYSTEM_PROMPT.to_string()
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Prompt template unavailable, using built-in prompt");
            DEFAULT_SYSTEM_PROMPT.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_loads_file_verbatim() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "自定义提示词\n第二行").unwrap();

        assert_eq!(load_prompt_template(file.path()), "自定义提示词\n第二行");
    }

    #[test]
    fn test_missing_file_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let prompt = load_prompt_template(&dir.path().join("prompt.md"));
        assert_eq!(prompt, DEFAULT_SYSTEM_PROMPT);
        assert!(prompt.contains("《》"));
    }

    #[test]
    fn test_blank_file_falls_back() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "  \n").unwrap();
        assert_eq!(load_prompt_template(file.path()), DEFAULT_SYSTEM_PROMPT);
    }
}
