//! Turns `SessionEvent`s into terminal output.

use headline_core::SessionEvent;
use indicatif::ProgressBar;

use crate::output;

/// Renders session events; owns the spinner shown until the first fragment.
#[derive(Default)]
pub struct Renderer {
    spinner: Option<ProgressBar>,
    mid_line: bool,
}

impl Renderer {
    pub fn waiting(&mut self) {
        self.spinner = Some(output::spinner("正在生成..."));
    }

    fn stop_spinner(&mut self) {
        if let Some(spinner) = self.spinner.take() {
            spinner.finish_and_clear();
        }
    }

    fn end_line(&mut self) {
        if self.mid_line {
            println!();
            self.mid_line = false;
        }
    }

    /// Print outside the spinner so it is not overdrawn.
    fn above_spinner(&self, print: impl FnOnce()) {
        match &self.spinner {
            Some(spinner) => spinner.suspend(print),
            None => print(),
        }
    }

    pub fn render(&mut self, event: SessionEvent) {
        if output::is_json() {
            self.stop_spinner();
            output::json_line(&event);
            return;
        }

        match event {
            SessionEvent::TurnStart { role } => {
                self.stop_spinner();
                output::turn_prefix(role);
                self.mid_line = true;
            }
            SessionEvent::TextDelta { text } => {
                self.stop_spinner();
                output::fragment(&text);
                self.mid_line = !text.ends_with('\n');
            }
            SessionEvent::ThinkingDelta { thinking } => {
                self.stop_spinner();
                output::thinking_fragment(&thinking);
                self.mid_line = !thinking.ends_with('\n');
            }
            SessionEvent::TurnEnd => self.end_line(),
            SessionEvent::TitlesExtracted { titles } => {
                self.end_line();
                output::success(&format!("已提取 {} 个标题，输入 /titles 查看", titles.len()));
            }
            SessionEvent::Status { message } => {
                self.end_line();
                self.above_spinner(|| output::dim(&message));
            }
            SessionEvent::Error { error, partial } => {
                self.stop_spinner();
                self.end_line();
                output::error(&error);
                if let Some(partial) = partial {
                    output::dim(&format!("（已接收 {} 个字符的部分回复，未保存）", partial.chars().count()));
                }
            }
            SessionEvent::SessionReset => {
                self.stop_spinner();
                self.end_line();
                output::success("已开始新对话");
            }
        }
    }

    /// Close any open line and spinner once a turn is over.
    pub fn finish(&mut self) {
        self.stop_spinner();
        self.end_line();
    }
}
