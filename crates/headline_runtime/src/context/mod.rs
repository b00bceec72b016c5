//! Context and prompt building for the session controller.
//!
//! Split into focused submodules:
//! - **prompt**: system prompt template and welcome text
//! - **messages**: history-to-LLM message conversion and request building
//! - **window**: character-budget truncation of the outbound history
//! - **titles**: title extraction from model output

mod messages;
mod prompt;
mod titles;
mod window;

pub use messages::{build_generate_request, to_llm_message};
pub use prompt::{DEFAULT_SYSTEM_PROMPT, WELCOME_MESSAGE, load_prompt_template};
pub use titles::{TitlePattern, extract_titles, format_titles};
pub use window::{MIN_TAIL_MESSAGES, TruncatedView, total_chars, truncate};
