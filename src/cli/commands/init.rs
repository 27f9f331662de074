//! Init command - first-run setup.

use crate::cli::Output;
use crate::config::Settings;
use console::style;

/// Run the init command for first-time setup.
pub fn run_init(settings: &Settings) -> anyhow::Result<()> {
    Output::header("Minne Setup");
    println!();

    // Step 1: API key
    println!("{}", style("Step 1: Checking API configuration").bold().cyan());
    println!();

    if std::env::var("OPENAI_API_KEY").map(|k| k.is_empty()).unwrap_or(true) {
        Output::warning("OPENAI_API_KEY environment variable is not set.");
        println!();
        println!("  Minne requires an OpenAI API key for embeddings and answers.");
        println!("  Set it in your shell configuration (~/.bashrc, ~/.zshrc, etc.):");
        println!("  {}", style("export OPENAI_API_KEY='sk-...'").green());
        println!();
    } else {
        Output::success("OpenAI API key is configured!");
    }

    println!();

    // Step 2: Directories
    println!("{}", style("Step 2: Setting up directories").bold().cyan());
    println!();

    let data_dir = settings.data_dir();
    if !data_dir.exists() {
        std::fs::create_dir_all(&data_dir)?;
        Output::success(&format!("Created data directory: {}", data_dir.display()));
    } else {
        Output::info(&format!("Data directory exists: {}", data_dir.display()));
    }

    let transcripts_dir = settings.transcripts_dir();
    if !transcripts_dir.exists() {
        std::fs::create_dir_all(&transcripts_dir)?;
        Output::success(&format!(
            "Created transcript archive: {}",
            transcripts_dir.display()
        ));
    }

    println!();

    // Step 3: Config file
    println!("{}", style("Step 3: Configuration file").bold().cyan());
    println!();

    let config_path = Settings::default_config_path();
    if config_path.exists() {
        Output::info(&format!("Config file exists: {}", config_path.display()));
    } else {
        settings.save_to(&config_path)?;
        Output::success(&format!("Created config file: {}", config_path.display()));
    }

    println!();
    println!("{}", style("Setup Complete!").bold().green());
    println!();
    println!("Next steps:");
    println!(
        "  {} Drop your links CSV at {}",
        style("1.").cyan(),
        settings.manifest_path().display()
    );
    println!("  {} Ingest it with {}", style("2.").cyan(), style("minne ingest").cyan());
    println!(
        "  {} Ask questions with {}",
        style("3.").cyan(),
        style("minne ask \"<question>\"").cyan()
    );

    Ok(())
}
