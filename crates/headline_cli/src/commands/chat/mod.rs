//! `headline chat`: the interactive headline session.
//!
//! One task drives everything: while a reply streams, `tokio::select!` races
//! the controller's submit future against incoming events and Ctrl-C.

mod render;
mod slash;

use anyhow::{Context, Result, bail};
use headline_core::{ConversationMessage, SessionEvent};
use headline_runtime::config::{AppSettings, LoadedConfig};
use headline_runtime::{RuntimeError, SessionController, format_titles};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::cli::ChatArgs;
use crate::output;
use render::Renderer;
use slash::{HELP, SlashCommand};

const EVENT_BUFFER: usize = 256;

pub async fn handle(args: ChatArgs, loaded: LoadedConfig) -> Result<()> {
    let (event_tx, events) = mpsc::channel(EVENT_BUFFER);
    let mut controller = SessionController::new(&loaded.config, event_tx)?;
    apply_args(&mut controller, &args)?;

    let mut chat = Chat {
        controller,
        events,
        renderer: Renderer::default(),
    };
    chat.banner(&loaded.config.app);

    if let Some(prompt) = args.prompt.as_deref() {
        output::message(&ConversationMessage::user(prompt));
        let ok = chat.send(prompt).await;
        if args.once {
            if !ok {
                bail!("request did not complete");
            }
            return Ok(());
        }
    }

    chat.repl().await
}

fn apply_args(controller: &mut SessionController, args: &ChatArgs) -> Result<()> {
    if let Some(provider) = &args.provider {
        controller.select_provider(provider)?;
    }
    if let Some(model) = &args.model {
        controller.select_model(model)?;
    }
    if let Some(temperature) = args.temperature {
        controller.set_temperature(temperature)?;
    }
    if let Some(max_tokens) = args.max_tokens {
        controller.set_max_output_tokens(max_tokens)?;
    }
    if let Some(budget) = args.budget {
        controller.set_context_budget(budget)?;
    }
    Ok(())
}

struct Chat {
    controller: SessionController,
    events: mpsc::Receiver<SessionEvent>,
    renderer: Renderer,
}

impl Chat {
    fn banner(&self, app: &AppSettings) {
        output::header(&app.title);
        output::dim(&app.description);
        output::dim("输入 /help 查看命令，Ctrl-C 可中断正在生成的回复");
        self.print_history();
    }

    fn print_history(&self) {
        for message in self.controller.history().visible() {
            output::message(message);
        }
    }

    async fn repl(&mut self) -> Result<()> {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();

        loop {
            output::input_prompt();
            let line = tokio::select! {
                line = lines.next_line() => line.context("failed to read input")?,
                _ = tokio::signal::ctrl_c() => None,
            };
            let Some(line) = line else {
                println!();
                break;
            };

            match SlashCommand::parse(&line) {
                Ok(Some(SlashCommand::Quit)) => break,
                Ok(Some(command)) => self.run_command(command).await,
                Ok(None) if line.trim().is_empty() => continue,
                Ok(None) => {
                    self.send(&line).await;
                }
                Err(e) => output::error(&format!("{e:#}")),
            }
        }
        Ok(())
    }

    /// Submit one prompt and render its events. Returns whether a reply was committed.
    async fn send(&mut self, prompt: &str) -> bool {
        let cancel = CancellationToken::new();
        self.renderer.waiting();

        let result = {
            let submit = self.controller.submit(prompt, Some(cancel.clone()));
            tokio::pin!(submit);
            loop {
                tokio::select! {
                    result = &mut submit => break result,
                    Some(event) = self.events.recv() => self.renderer.render(event),
                    _ = tokio::signal::ctrl_c(), if !cancel.is_cancelled() => {
                        debug!("Ctrl-C received; cancelling reply");
                        cancel.cancel();
                    }
                }
            }
        };
        self.drain_events();
        self.renderer.finish();

        match result {
            Ok(_) => true,
            Err(RuntimeError::Cancelled) => false,
            Err(RuntimeError::Provider { .. }) => {
                // Already rendered from the error event
                self.controller.acknowledge();
                output::dim("可以继续对话，或输入 /new 开始新对话");
                false
            }
            Err(e @ RuntimeError::ConfigError(_)) => {
                output::error(&e.to_string());
                output::dim("运行 `headline config api` 配置 API 密钥，或用 /provider 切换提供商");
                false
            }
            Err(e) => {
                output::error(&e.to_string());
                false
            }
        }
    }

    fn drain_events(&mut self) {
        while let Ok(event) = self.events.try_recv() {
            self.renderer.render(event);
        }
    }

    async fn run_command(&mut self, command: SlashCommand) {
        let result = match command {
            SlashCommand::New => {
                self.controller.reset().await;
                self.drain_events();
                self.print_history();
                Ok(())
            }
            SlashCommand::Titles => {
                self.show_titles();
                Ok(())
            }
            SlashCommand::History => {
                self.print_history();
                Ok(())
            }
            SlashCommand::Settings => {
                self.show_settings();
                Ok(())
            }
            SlashCommand::Provider(None) => {
                self.list_providers();
                Ok(())
            }
            SlashCommand::Provider(Some(id)) => self.controller.select_provider(&id).map(|()| {
                let state = self.controller.state();
                output::success(&format!(
                    "已切换到 {} ({})",
                    state.active_provider_id(),
                    state.active_model_name()
                ));
            }),
            SlashCommand::Model(None) => {
                self.list_models();
                Ok(())
            }
            SlashCommand::Model(Some(name)) => self
                .controller
                .select_model(&name)
                .map(|()| output::success(&format!("模型已切换为 {name}"))),
            SlashCommand::Temperature(value) => self
                .controller
                .set_temperature(value)
                .map(|()| output::success(&format!("温度已设置为 {value}"))),
            SlashCommand::MaxTokens(value) => self
                .controller
                .set_max_output_tokens(value)
                .map(|()| output::success(&format!("最大输出长度已设置为 {value}"))),
            SlashCommand::Budget(value) => self
                .controller
                .set_context_budget(value)
                .map(|()| output::success(&format!("上下文长度已设置为 {value} 字符"))),
            SlashCommand::Help => {
                for (usage, description) in HELP {
                    output::kv(usage, description);
                }
                Ok(())
            }
            SlashCommand::Quit => Ok(()),
        };

        if let Err(e) = result {
            output::error(&e.to_string());
        }
    }

    fn show_titles(&self) {
        let titles = self.controller.titles();
        if titles.is_empty() {
            output::dim("还没有提取到标题，先让助手生成标题吧");
        } else if output::is_json() {
            output::data("titles", &titles);
        } else {
            output::header("已提取的标题");
            println!("{}", format_titles(titles));
        }
    }

    fn show_settings(&self) {
        let state = self.controller.state();
        output::kv("session", state.id().as_str());
        output::kv("provider", state.active_provider_id());
        output::kv("model", state.active_model_name());
        output::kv("temperature", &state.temperature().to_string());
        output::kv("max_tokens", &state.max_output_tokens().to_string());
        output::kv("context_budget", &state.context_budget_chars().to_string());
        output::kv("history_chars", &self.controller.history().total_chars().to_string());
    }

    fn list_providers(&self) {
        let catalog = self.controller.catalog();
        let active = self.controller.state().active_provider_id();
        for id in catalog.provider_ids() {
            let Ok(settings) = catalog.get(id) else {
                continue;
            };
            let marker = if id == active { "*" } else { " " };
            let status = if settings.has_api_key() { "" } else { " (missing API key)" };
            output::kv(&format!("{marker} {id}"), &format!("{}{status}", settings.display_name));
        }
    }

    fn list_models(&self) {
        let state = self.controller.state();
        let provider_id = state.active_provider_id();
        match self.controller.catalog().model_catalog(provider_id) {
            Ok(models) => {
                for model in models {
                    let marker = if model.name == state.active_model_name() { "*" } else { " " };
                    output::kv(&format!("{marker} {}", model.name), &model.id);
                }
            }
            Err(e) => output::error(&e.to_string()),
        }
    }
}
