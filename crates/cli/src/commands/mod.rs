//! Built-in commands of the `shellkit` binary

pub mod cat;
pub mod clear;
pub mod echo;
pub mod exit;
pub mod help;
pub mod prompt;
pub mod settings;
pub mod size;
pub mod upper;
pub mod view;

use anyhow::Result;
use shellkit_core::{CommandContainer, Settings};

/// Every built-in, ready to register.
pub fn builtins(settings: &Settings) -> Result<Vec<CommandContainer>> {
    Ok(vec![
        cat::command()?,
        clear::command()?,
        echo::command()?,
        exit::command()?,
        help::command()?,
        prompt::command()?,
        settings::command(settings.clone())?,
        size::command()?,
        upper::command()?,
        view::command()?,
    ])
}
