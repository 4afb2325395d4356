pub mod logger;

pub use logger::{LogOptions, init_logging};
