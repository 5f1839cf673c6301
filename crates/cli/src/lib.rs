pub mod cli;
pub mod commands;
pub mod terminal;

// Re-export commonly used items
pub use cli::Shellkit;
pub use terminal::StdioTerminal;
