//! debrief - analyze post-mortem notes into themes and recommendations.

use clap::Parser;
use debrief_analyzer::{describe, AnalysisConfig, Analyzer};
use debrief_cli::{Cli, CliError, Formatter, Settings};
use debrief_domain::InputDocument;
use debrief_llm::OpenAiGenerator;
use std::fs;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> debrief_cli::Result<()> {
    let cli = Cli::parse();
    let settings = Settings::from_env()?;

    let color_enabled = !cli.no_color;
    let formatter = Formatter::new(cli.format, color_enabled);

    let text = fs::read_to_string(&cli.file)?;
    let document = InputDocument::from_text(&text);
    tracing::debug!(
        "Read {} ({} non-blank line(s))",
        cli.file.display(),
        document.len()
    );

    let mut config = AnalysisConfig::default();
    if let Some(model) = cli.model.or(settings.model.clone()) {
        config.model = model;
    }
    if let Some(temperature) = cli.temperature {
        config.temperature = temperature;
    }

    let generator = OpenAiGenerator::new(
        &settings.base_url,
        &settings.api_key,
        config.generation_config(),
    )
    .map_err(|e| CliError::Config(e.to_string()))?
    .with_retry_policy(config.retry_policy());

    let analyzer = Analyzer::new(generator, config);

    match analyzer.analyze(&document).await {
        Ok(report) => {
            println!("{}", formatter.format_report(&report)?);
            Ok(())
        }
        Err(e) => {
            let message = describe(&e.failure_record());
            eprint!("{}", formatter.format_failure(&message, cli.verbose));
            std::process::exit(2);
        }
    }
}
