pub mod error;
pub mod message;
pub mod scope;

pub use error::BotkitError;
pub use message::{ChatMessage, Incoming};
pub use scope::CommandScope;
