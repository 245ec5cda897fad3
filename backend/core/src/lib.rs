pub mod error;
pub mod message;
pub mod traits;

pub use error::BotError;
pub use message::Command;
pub use traits::Handler;
