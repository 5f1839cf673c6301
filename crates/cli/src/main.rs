use anyhow::Result;
use clap::Parser;
use shellkit_cli::Shellkit;

fn main() -> Result<()> {
    // Logs go to stderr so they never mix with command output
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let code = Shellkit::parse().execute()?;
    if code != 0 {
        std::process::exit(code);
    }
    Ok(())
}
