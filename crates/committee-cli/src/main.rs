//! AI investment committee CLI
//!
//! Runs the research → analyze → write pipeline for one ticker, or for each
//! ticker typed into an interactive shell.
//!
//! # Usage
//!
//! ```bash
//! # GROQ_API_KEY may also come from a .env file
//! export GROQ_API_KEY="gsk_..."
//!
//! committee --ticker NVDA --output-dir reports
//! committee            # interactive shell
//! ```

mod display;

use anyhow::Context;
use clap::Parser;
use committee_research::{
    AnalysisRequest, AnalysisResult, Pipeline, ResearchConfig, ResearchError, Stage,
};
use committee_utils::{DEFAULT_FILTER, LogFormat};
use display::CardState;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(name = "committee")]
#[command(about = "Automated equity research: news, chart, report and PDF", long_about = None)]
struct Args {
    /// Ticker to analyze; omit for the interactive shell
    #[arg(short, long)]
    ticker: Option<String>,

    /// Directory for the chart and PDF (overrides REPORT_OUTPUT_DIR)
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Skip PDF export
    #[arg(long)]
    no_pdf: bool,

    /// Print the result as JSON instead of tables and markdown
    #[arg(long)]
    json: bool,

    /// Log line format: pretty or json
    #[arg(long, default_value = "pretty")]
    log_format: LogFormat,
}

fn print_banner() {
    println!(
        r#"
╔══════════════════════════════════════════════════════════════╗
║                 AI Investment Committee                      ║
║                                                              ║
║  Type a ticker (e.g. NVDA, AAPL) to run the committee.       ║
║                                                              ║
║  Commands:                                                   ║
║    /reset             - Clear the last result                ║
║    /help              - Show this help                       ║
║    /exit              - Exit                                 ║
╚══════════════════════════════════════════════════════════════╝
"#
    );
}

/// Runs one ticker through the pipeline and prints the outcome
struct Session {
    pipeline: Pipeline,
    export_pdf: bool,
    json: bool,
    last: Option<AnalysisResult>,
}

impl Session {
    async fn submit(&mut self, input: &str) -> Result<(), ResearchError> {
        let request = AnalysisRequest::new(input)?;
        let (tx, rx) = tokio::sync::mpsc::unbounded_channel();

        let (outcome, stopped_at) = tokio::join!(
            self.pipeline.run_with_progress(request.ticker.as_str(), tx),
            display::follow_progress(rx, self.json)
        );

        let result = match outcome {
            Ok(result) => result,
            Err(e) => {
                if !self.json && stopped_at != Stage::Done {
                    println!("{}", display::card_line(stopped_at, CardState::Error));
                }
                return Err(e);
            }
        };

        let pdf = if self.export_pdf {
            match self.pipeline.export_pdf(&result).await {
                Ok(rendered) => Some(rendered.path),
                Err(e) if e.is_fatal() => return Err(e),
                Err(e) => {
                    warn!(error = %e, "PDF export failed");
                    eprintln!("{}", e.user_message());
                    None
                }
            }
        } else {
            None
        };

        if self.json {
            match serde_json::to_string_pretty(&result) {
                Ok(json) => println!("{json}"),
                Err(e) => return Err(e.into()),
            }
        } else {
            display::print_result(&result);
            if let Some(path) = &pdf {
                display::print_pdf(path);
            }
        }

        self.last = Some(result);
        Ok(())
    }

    /// Report a failed submission; `Err` only for errors that end the program
    fn report(error: ResearchError) -> Result<(), ResearchError> {
        if error.is_fatal() {
            return Err(error);
        }
        eprintln!("{}\n", error.user_message());
        Ok(())
    }
}

async fn repl(session: &mut Session) -> anyhow::Result<()> {
    print_banner();

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        print!("committee> ");
        stdout.flush()?;

        let mut input = String::new();
        match stdin.lock().read_line(&mut input) {
            Ok(0) => {
                // EOF
                println!("\nGoodbye!");
                break;
            }
            Ok(_) => {}
            Err(e) => {
                eprintln!("Error reading input: {e}");
                continue;
            }
        }

        let input = input.trim();
        if input.is_empty() {
            continue;
        }

        match input {
            "/exit" | "/quit" => {
                println!("Goodbye!");
                break;
            }
            "/help" => print_banner(),
            "/reset" => {
                match session.last.take() {
                    Some(result) => println!("Cleared result for {}.\n", result.ticker),
                    None => println!("Nothing to clear.\n"),
                }
            }
            command if command.starts_with('/') => {
                println!("Unknown command: {command}. Type /help for commands.\n");
            }
            ticker => {
                if let Err(e) = session.submit(ticker).await {
                    Session::report(e)?;
                }
            }
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // A missing .env is fine; variables may come from the environment
    dotenvy::dotenv().ok();
    committee_utils::init_tracing_with(DEFAULT_FILTER, args.log_format);

    let mut config = ResearchConfig::from_env().context("Failed to load configuration")?;
    if let Some(dir) = args.output_dir {
        config.output_dir = dir;
    }
    std::fs::create_dir_all(&config.output_dir).with_context(|| {
        format!(
            "Failed to create output directory {}",
            config.output_dir.display()
        )
    })?;

    let pipeline = Pipeline::from_config(&config).context("Failed to build pipeline")?;
    info!(model = %config.model, output_dir = %config.output_dir.display(), "Starting committee");

    let mut session = Session {
        pipeline,
        export_pdf: !args.no_pdf,
        json: args.json,
        last: None,
    };

    match args.ticker {
        Some(ticker) => {
            if let Err(e) = session.submit(&ticker).await {
                eprintln!("{}", e.user_message());
                std::process::exit(1);
            }
        }
        None => repl(&mut session).await?,
    }

    Ok(())
}
