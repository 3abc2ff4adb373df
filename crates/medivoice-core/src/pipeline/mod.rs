mod conversation;
mod error;

pub use conversation::{
    ConversationPipeline, InteractionResponse, TextReply, DEFAULT_TOP_K, EMERGENCY_MESSAGE,
    TELEGRAM_EMERGENCY_MESSAGE,
};
pub use error::PipelineError;
