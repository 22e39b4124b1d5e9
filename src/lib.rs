pub mod ai;
pub mod capture;
pub mod cli;
pub mod session;
pub mod settings;
pub mod speech;

use clap::Parser;

use settings::Settings;

/// Parse arguments, load settings and run the terminal session until `quit`
/// or end of input.
pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = cli::Args::parse();
    let path = args.config.clone().unwrap_or_else(Settings::default_path);
    let mut settings = Settings::load(&path)?;
    args.apply(&mut settings);
    if args.save_config {
        settings.save(&path)?;
    }
    log::info!(
        "Starting vision-ar ({:?}, narration {:?})",
        settings.variant,
        settings.narration
    );

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(cli::repl(settings, args.image))
}
