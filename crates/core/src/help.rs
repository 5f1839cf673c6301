//! Help text generated from command metadata

use std::fmt::Write;

use crate::command::{CommandContainer, CommandMetadata};

const HELP_FLAGS: &str = "-h, --help";
const VERSION_FLAGS: &str = "-v, --version";

/// Render help for a command and, for groups, its members.
pub fn render(container: &CommandContainer) -> String {
    let metadata = container.metadata();
    let mut out = String::new();

    let _ = writeln!(out, "{}", title(metadata));
    let _ = writeln!(out);
    let _ = writeln!(out, "Usage: {}", usage(container));

    if !metadata.aliases().is_empty() {
        let _ = writeln!(out, "Aliases: {}", metadata.aliases().join(", "));
    }

    let mut options = Vec::new();
    if metadata.generate_help() {
        options.push((HELP_FLAGS, "Print help"));
    }
    if metadata.version().is_some() {
        options.push((VERSION_FLAGS, "Print version"));
    }
    if !options.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "Options:");
        let width = options.iter().map(|(flags, _)| flags.len()).max().unwrap_or(0);
        for (flags, text) in options {
            let _ = writeln!(out, "  {flags:<width$}  {text}");
        }
    }

    if container.is_group() {
        let _ = writeln!(out);
        let _ = writeln!(out, "Commands:");
        let width = container
            .children()
            .iter()
            .map(|child| child.name().len())
            .max()
            .unwrap_or(0);
        for child in container.children() {
            let _ = writeln!(
                out,
                "  {:<width$}  {}",
                child.name(),
                child.metadata().description()
            );
        }
    }

    out
}

fn title(metadata: &CommandMetadata) -> String {
    match (metadata.description(), metadata.version()) {
        ("", None) => metadata.name().to_string(),
        ("", Some(version)) => format!("{} {version}", metadata.name()),
        (description, None) => format!("{} - {description}", metadata.name()),
        (description, Some(version)) => {
            format!("{} {version} - {description}", metadata.name())
        }
    }
}

fn usage(container: &CommandContainer) -> String {
    let metadata = container.metadata();
    let mut usage = metadata.name().to_string();
    if container.is_group() {
        usage.push_str(" <COMMAND>");
    }
    if metadata.generate_help() || metadata.version().is_some() {
        usage.push_str(" [OPTIONS]");
    }
    if metadata.disable_parsing() {
        usage.push_str(" [LINE]");
    } else {
        usage.push_str(" [ARGS]...");
    }
    usage
}
