pub mod config;
pub mod input;
pub mod session;
pub mod tools;

pub use config::SessionConfig;
pub use input::{InputEvent, PointerSample, Samples};
pub use session::Session;
pub use tools::{InkTool, ToolOutcome};
