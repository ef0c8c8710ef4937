use charla_common::PlayerConfig;
use charla_parser::Parser as CharlaParser;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod console;
use console::Console;

/// Charla - timed dialog playback with inline effects

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Play a dialog from a corpus file
    Run {
        /// Path to the JSON corpus
        corpus_path: PathBuf,
        /// Comma-separated list of inputs (e.g., "f,1,a,q")
        #[arg(default_value = "")]
        input_string: String,
        /// Dialog to play, the first one in the corpus when omitted
        #[arg(short, long)]
        dialog: Option<String>,
        /// Player configuration file (TOML)
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Seconds passed to every tick
        #[arg(short, long, default_value_t = 0.1)]
        tick: f32,
    },
}

fn main() {
    // Logs go to stderr so stdout stays a clean transcript.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Args::parse();

    match cli.command {
        Commands::Run {
            corpus_path,
            input_string,
            dialog,
            config,
            tick,
        } => {
            let config = match config {
                Some(path) => match PlayerConfig::load(&path) {
                    Ok(config) => config,
                    Err(err) => {
                        eprintln!("Error reading config file: {}", err);
                        std::process::exit(1);
                    }
                },
                None => PlayerConfig::default(),
            };

            let parser = CharlaParser::with_file(corpus_path.clone());
            let (corpus, warnings) = match parser.load_corpus() {
                Ok(parsed) => parsed,
                Err(err) => {
                    println!("{}", err);
                    std::process::exit(1);
                }
            };

            let mut stdout = std::io::stdout().lock();

            let file_name = corpus_path
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or("corpus.json");
            if let Err(err) = console::write_warnings(file_name, &warnings, &mut stdout) {
                eprintln!("Error writing output: {}", err);
                std::process::exit(1);
            }

            let dialog = match dialog.or_else(|| corpus.first().map(|(name, _)| name.to_string()))
            {
                Some(dialog) => dialog,
                None => {
                    println!("ERROR: The corpus has no dialogs");
                    std::process::exit(1);
                }
            };

            let mut console = Console::new(corpus, dialog, config, tick);
            if let Err(err) = console.run(&input_string, &mut stdout) {
                eprintln!("Error writing output: {}", err);
                std::process::exit(1);
            }
            tracing::debug!(finished = console.player().is_idle(), "inputs exhausted");
        }
    }
}
