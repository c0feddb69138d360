mod chat;
mod health;
mod metrics;

pub use chat::{REMAINING_HEADER, chat_handler, client_identifier, parse_message};
pub use health::health_handler;
pub use metrics::metrics_handler;
