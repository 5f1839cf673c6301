//! Integration test for settings discovery and their effect on paging

use std::fs;

use shellkit::{
    CommandContainer, CommandMetadata, CommandResult, Console, Error, Key, ScriptedTerminal,
    Settings, Size, TerminalShell, from_fn,
};
use tempfile::TempDir;

fn pager_command() -> CommandContainer {
    CommandContainer::new(
        CommandMetadata::builder("count").build().unwrap(),
        from_fn(|invocation, _| {
            let text: String = (1..=6).map(|n| format!("line {n}\n")).collect();
            invocation.shell().write(&text, true)?;
            Ok(CommandResult::Success)
        }),
    )
}

#[test]
fn test_nearest_settings_file_wins() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    let project = root.join("project");
    let nested = project.join("src").join("deep");
    fs::create_dir_all(&nested).unwrap();

    let outer = serde_json::json!({ "prompt": "outer> " });
    let inner = serde_json::json!({ "prompt": "inner> ", "paging": false });
    fs::write(root.join("shellkit.json"), outer.to_string()).unwrap();
    fs::write(project.join(".shellkit.json"), inner.to_string()).unwrap();

    let settings = Settings::discover(&nested).unwrap();
    assert_eq!(settings.prompt, "inner> ");
    assert!(!settings.paging);
    assert_eq!(
        settings.source.as_deref(),
        Some(project.join(".shellkit.json").as_path())
    );

    // Unset fields keep their defaults
    assert_eq!(settings.pager_prompt, Settings::default().pager_prompt);
}

#[test]
fn test_invalid_settings_are_rejected() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("shellkit.json");
    fs::write(&path, serde_json::json!({ "paging": "sometimes" }).to_string()).unwrap();

    assert!(matches!(
        Settings::load_from_file(&path),
        Err(Error::Configuration(_))
    ));
}

#[test]
fn test_settings_drive_console_and_pager() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join(".shellkit.json");
    let json = serde_json::json!({ "prompt": "demo> ", "pager_prompt": "[more]" });
    fs::write(&path, json.to_string()).unwrap();
    let settings = Settings::load_from_file(&path).unwrap();

    // Four rows leave three for output before the pager prompt
    let terminal = ScriptedTerminal::new(Size::new(40, 4));
    let shell = TerminalShell::new(terminal.clone()).with_settings(&settings);
    let mut console = Console::builder(shell)
        .settings(settings)
        .command(pager_command())
        .build()
        .unwrap();
    assert_eq!(console.prompt().text(), "demo> ");

    terminal.push_key(Key::Char(' '));
    console.execute("count").unwrap();

    let output = terminal.output();
    assert!(output.contains("[more]"));
    assert!(output.contains("line 6"));
}

#[test]
fn test_paging_off_in_settings() {
    let settings = Settings {
        paging: false,
        ..Default::default()
    };
    let terminal = ScriptedTerminal::new(Size::new(40, 4));
    let shell = TerminalShell::new(terminal.clone()).with_settings(&settings);
    let mut console = Console::builder(shell)
        .settings(settings)
        .command(pager_command())
        .build()
        .unwrap();

    console.execute("count").unwrap();
    let output = terminal.output();
    assert!(!output.contains("--More--"));
    assert_eq!(output.lines().count(), 6);
}
