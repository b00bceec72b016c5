//! In-session `/` commands.

use anyhow::{Context, Result, anyhow};

pub const HELP: &[(&str, &str)] = &[
    ("/new", "开始新对话（清空历史与已提取的标题）"),
    ("/titles", "查看已提取的标题"),
    ("/history", "查看对话记录"),
    ("/settings", "查看当前提供商、模型与参数"),
    ("/provider [id]", "查看或切换提供商"),
    ("/model [name]", "查看或切换模型"),
    ("/temperature <0.0-2.0>", "设置温度"),
    ("/max-tokens <1000-16000>", "设置最大输出长度"),
    ("/budget <4000-32000>", "设置上下文长度（字符）"),
    ("/help", "显示帮助"),
    ("/quit", "退出"),
];

#[derive(Debug, Clone, PartialEq)]
pub enum SlashCommand {
    New,
    Titles,
    History,
    Settings,
    Provider(Option<String>),
    Model(Option<String>),
    Temperature(f32),
    MaxTokens(u32),
    Budget(usize),
    Help,
    Quit,
}

impl SlashCommand {
    /// Parse a REPL line. `Ok(None)` means the line is a prompt, not a command.
    pub fn parse(line: &str) -> Result<Option<Self>> {
        let Some(rest) = line.trim().strip_prefix('/') else {
            return Ok(None);
        };
        let mut parts = rest.split_whitespace();
        let name = parts.next().unwrap_or_default();
        let arg = parts.next().map(str::to_string);

        let command = match name {
            "new" | "reset" => Self::New,
            "titles" => Self::Titles,
            "history" => Self::History,
            "settings" => Self::Settings,
            "provider" => Self::Provider(arg),
            "model" => Self::Model(arg),
            "temperature" | "temp" => Self::Temperature(required(arg, "/temperature <0.0-2.0>")?),
            "max-tokens" => Self::MaxTokens(required(arg, "/max-tokens <1000-16000>")?),
            "budget" => Self::Budget(required(arg, "/budget <4000-32000>")?),
            "help" | "?" => Self::Help,
            "quit" | "exit" | "q" => Self::Quit,
            other => return Err(anyhow!("unknown command '/{other}', try /help")),
        };
        Ok(Some(command))
    }
}

fn required<T>(arg: Option<String>, usage: &str) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let raw = arg.ok_or_else(|| anyhow!("usage: {usage}"))?;
    raw.parse()
        .with_context(|| format!("'{raw}' is not a valid value (usage: {usage})"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_is_not_a_command() {
        assert_eq!(SlashCommand::parse("帮我生成标题").unwrap(), None);
        assert_eq!(SlashCommand::parse("  a/b  ").unwrap(), None);
    }

    #[test]
    fn test_parse_commands() {
        assert_eq!(SlashCommand::parse("/new").unwrap(), Some(SlashCommand::New));
        assert_eq!(SlashCommand::parse(" /quit ").unwrap(), Some(SlashCommand::Quit));
        assert_eq!(
            SlashCommand::parse("/provider siliconflow").unwrap(),
            Some(SlashCommand::Provider(Some("siliconflow".into())))
        );
        assert_eq!(
            SlashCommand::parse("/model").unwrap(),
            Some(SlashCommand::Model(None))
        );
        assert_eq!(
            SlashCommand::parse("/temperature 1.2").unwrap(),
            Some(SlashCommand::Temperature(1.2))
        );
        assert_eq!(
            SlashCommand::parse("/budget 8000").unwrap(),
            Some(SlashCommand::Budget(8000))
        );
    }

    #[test]
    fn test_bad_arguments() {
        assert!(SlashCommand::parse("/temperature").is_err());
        assert!(SlashCommand::parse("/max-tokens many").is_err());
        assert!(SlashCommand::parse("/frobnicate").is_err());
    }
}
