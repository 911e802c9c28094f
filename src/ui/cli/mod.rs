// Wed Jan 15 2026 - Alex

pub mod args;
pub mod handler;

pub use args::{Args, Command, IndexArgs, ResolveArgs, TypesArgs};
pub use handler::CommandHandler;
