mod history;
mod intent;
mod responder;

pub use history::{ChatTurn, ConversationHistory, Role, GREETING};
pub use responder::{ChatReply, Responder};
