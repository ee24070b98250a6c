use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use feedback_pipeline::config::{DataPaths, LlmSettings, PipelineConfig};
use feedback_pipeline::convert::convert_markdown_to_docx;
use feedback_pipeline::llm::{CompletionBackend, LlmClient};
use feedback_pipeline::pipeline::{FeedbackPipeline, StepOutcome};
use feedback_pipeline::report::ReportGenerator;
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "feedback-pipeline")]
#[command(about = "Incremental LLM enrichment and reporting for chatbot feedback")]
#[command(version)]
struct Args {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Data directory (or set FEEDBACK_DATA_DIR, default: ./data)
    #[arg(short, long, global = true)]
    data_dir: Option<PathBuf>,

    /// Maximum concurrent LLM calls (or set MAX_CONCURRENT_REQUESTS, default: 20)
    #[arg(long, global = true)]
    max_concurrent: Option<usize>,

    /// Per-call timeout in seconds, 0 disables it (or set LLM_REQUEST_TIMEOUT_SECS)
    #[arg(long, global = true)]
    timeout_secs: Option<u64>,

    /// DeepSeek API key (or set DEEPSEEK_API_KEY env var)
    #[arg(long, global = true)]
    api_key: Option<String>,
}

#[derive(Subcommand, Clone, PartialEq, Eq)]
enum Commands {
    /// Generate comments for THUMBS_DOWN feedback without one
    Comments,
    /// Classify every question onto the site categories
    Categories,
    /// Classify the failure mode of THUMBS_DOWN comments
    CommentCategories,
    /// Tag questions as provided (A) or open-ended (B)
    Scenarios,
    /// Merge all step outputs into the analyzed file
    Merge,
    /// Run every step, then merge
    Full,
    /// Write the markdown analysis report from the analyzed file
    Report,
    /// Convert a markdown file to .docx with pandoc
    Convert {
        /// Markdown file (default: the report in the data directory)
        input: Option<PathBuf>,
    },
}

impl Commands {
    fn needs_llm(&self) -> bool {
        matches!(
            self,
            Commands::Comments | Commands::Categories | Commands::CommentCategories | Commands::Full
        )
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenv::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    let config = build_config(&args)?;

    let command = match args.command {
        Some(command) => command,
        None => prompt_menu()?,
    };

    match command {
        Commands::Report => generate_report(&config.paths),
        Commands::Convert { input } => convert_report(input.unwrap_or(config.paths.report)),
        step => run_step(step, config, args.api_key).await,
    }
}

fn build_config(args: &Args) -> Result<PipelineConfig> {
    let env = PipelineConfig::from_env().context("Invalid pipeline configuration")?;

    let paths = match &args.data_dir {
        Some(dir) => DataPaths::in_dir(dir),
        None => env.paths,
    };
    let request_timeout = match args.timeout_secs {
        Some(0) => None,
        Some(secs) => Some(Duration::from_secs(secs)),
        None => env.request_timeout,
    };

    Ok(PipelineConfig::new(
        args.max_concurrent.unwrap_or(env.max_concurrent_requests),
        request_timeout,
        paths,
    )?)
}

fn prompt_menu() -> Result<Commands> {
    println!("Choose an option:");
    println!("1. Process comments only (THUMBS_DOWN empty feedback)");
    println!("2. Process categories only");
    println!("3. Process feedback comment categories");
    println!("4. Process scenarios only (map questions to A/B scenarios)");
    println!("5. Merge existing files");
    println!("6. Run full analysis (comments + categories + feedback comment categories + scenarios + merge)");
    print!("\nEnter your choice (1-6): ");
    io::stdout().flush()?;

    let mut choice = String::new();
    io::stdin().read_line(&mut choice)?;

    match choice.trim() {
        "1" => Ok(Commands::Comments),
        "2" => Ok(Commands::Categories),
        "3" => Ok(Commands::CommentCategories),
        "4" => Ok(Commands::Scenarios),
        "5" => Ok(Commands::Merge),
        "6" => Ok(Commands::Full),
        other => Err(anyhow!("Invalid choice '{}'. Please run the program again.", other)),
    }
}

async fn run_step(command: Commands, config: PipelineConfig, api_key: Option<String>) -> Result<()> {
    let backend: Option<Arc<dyn CompletionBackend>> = match LlmSettings::from_env(api_key) {
        Ok(settings) => {
            info!("Using model {} at {}", settings.model, settings.base_url);
            Some(Arc::new(LlmClient::from_settings(&settings)))
        }
        Err(e) if command.needs_llm() => return Err(e.into()),
        Err(_) => None,
    };

    let pipeline = FeedbackPipeline::new(config, backend);
    info!("Run id: {}", pipeline.run_id());

    let outcomes = match command {
        Commands::Comments => vec![pipeline.process_comments().await?],
        Commands::Categories => vec![pipeline.process_categories().await?],
        Commands::CommentCategories => vec![pipeline.process_comment_categories().await?],
        Commands::Scenarios => vec![pipeline.process_scenarios()?],
        Commands::Merge => vec![pipeline.merge_files()?],
        Commands::Full => pipeline.run_full().await?,
        Commands::Report | Commands::Convert { .. } => Vec::new(),
    };

    println!("\n{}", "=".repeat(80));
    println!(" PIPELINE RESULTS (run {})", pipeline.run_id());
    println!("{}", "=".repeat(80));
    for outcome in &outcomes {
        print_outcome(outcome);
    }

    if let Some(last) = outcomes.last() {
        print_preview(last);
    }

    let failed_saves: Vec<String> = outcomes
        .iter()
        .filter_map(|o| o.save_error.as_ref().map(|e| format!("{}: {}", o.report.output.display(), e)))
        .collect();
    if !failed_saves.is_empty() {
        return Err(anyhow!("Failed to save {} output(s): {}", failed_saves.len(), failed_saves.join("; ")));
    }
    Ok(())
}

fn print_outcome(outcome: &StepOutcome) {
    let report = &outcome.report;
    println!(
        "\n {} complete! Shape: ({}, {})",
        report.step,
        outcome.dataset.len(),
        outcome.dataset.headers().len()
    );
    println!("   Source records: {}", report.total_records);
    println!("   Newly processed: {}", report.unprocessed);
    if report.stats.attempted() > 0 || report.stats.skipped > 0 {
        println!(
            "   LLM calls: {} succeeded, {} failed, {} skipped",
            report.stats.succeeded, report.stats.failed, report.stats.skipped
        );
    }
    println!("   Output: {}", report.output.display());
    if let Some(note) = &report.note {
        println!("   Note: {}", note);
    }
    if let Some(e) = &outcome.save_error {
        println!("   ❌ Save failed: {}", e);
    }
}

fn print_preview(outcome: &StepOutcome) {
    if outcome.dataset.is_empty() {
        return;
    }
    println!("\nFirst 3 rows of processed data:");
    println!("{}", "-".repeat(80));
    let (headers, rows) = outcome.dataset.to_rows();
    println!("{}", headers.join(" | "));
    for row in rows.iter().take(3) {
        println!("{}", row.join(" | "));
    }
}

fn generate_report(paths: &DataPaths) -> Result<()> {
    let generator = ReportGenerator::new(paths);
    let report = generator
        .generate_and_save()
        .context("Error generating report")?;

    println!("\n{}", "=".repeat(50));
    println!("REPORT GENERATION COMPLETE");
    println!("{}", "=".repeat(50));
    println!("Report saved to: {}", generator.output_file().display());
    println!("Report length: {} characters", report.chars().count());

    println!("\nReport Preview:");
    println!("{}", "-".repeat(30));
    for line in report.lines().take(10) {
        println!("{}", line);
    }
    println!("...");
    Ok(())
}

fn convert_report(input: PathBuf) -> Result<()> {
    let output = convert_markdown_to_docx(&input)
        .with_context(|| format!("Failed to convert {}", input.display()))?;
    println!("Conversion completed successfully!");
    println!("Output file: {}", output.display());
    Ok(())
}
