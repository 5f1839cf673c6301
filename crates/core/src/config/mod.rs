//! Configuration management for shellkit consoles

mod settings;

pub use settings::{CONFIG_FILE_NAMES, Settings};
