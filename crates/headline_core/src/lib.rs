pub mod error;
pub mod event;
pub mod history;
pub mod message;
pub mod session;

pub use error::{CoreError, Result};
pub use event::SessionEvent;
pub use history::ConversationHistory;
pub use message::{ConversationMessage, Role};
pub use session::{SessionId, SessionPhase};
