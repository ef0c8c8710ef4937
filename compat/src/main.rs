use clap::Parser;
use colored::Colorize;
use glob::glob;
use std::path::PathBuf;

use charla_common::test_case::TestCase;

mod test_runner;
use test_runner::{Outcome, TestRunner};

/// Runs a charla binary against the compatibility test cases

#[derive(Parser, Debug)]
struct Args {
    /// Runtime path
    runtime: PathBuf,

    /// Compatibility tests glob (e.g., "compatibility-tests/*.md")
    compatibility_tests: String,
}

fn main() {
    let args = Args::parse();

    let paths = match get_compatibility_tests(&args.compatibility_tests) {
        Ok(paths) => paths,
        Err(err) => {
            eprintln!("Invalid pattern `{}`: {}", args.compatibility_tests, err);
            std::process::exit(1);
        }
    };

    let runner = TestRunner::new(args.runtime);
    let (mut passed, mut failed, mut skipped) = (0, 0, 0);

    for path in paths {
        let content = match std::fs::read_to_string(&path) {
            Ok(content) => content,
            Err(err) => {
                println!("{} {}: {}", "FAIL".red(), path.display(), err);
                failed += 1;
                continue;
            }
        };
        let test_case = TestCase::from_string(content, &path);

        if test_case.disabled {
            println!("{} {}", "SKIP".yellow(), test_case.name);
            skipped += 1;
            continue;
        }

        match runner.run(&test_case) {
            Outcome::Pass => {
                println!("{} {}", "PASS".green(), test_case.name);
                passed += 1;
            }
            Outcome::Mismatch { expected, actual } => {
                println!("{} {} ({})", "FAIL".red(), test_case.name, path.display());
                println!("{}\n{}", "Expected:".bold(), expected);
                println!("{}\n{}", "Actual:".bold(), actual);
                failed += 1;
            }
            Outcome::Broken(reason) => {
                println!("{} {}: {}", "FAIL".red(), test_case.name, reason);
                failed += 1;
            }
        }
    }

    println!(
        "\n{} passed, {} failed, {} skipped",
        passed.to_string().green(),
        failed.to_string().red(),
        skipped.to_string().yellow()
    );

    if failed > 0 {
        std::process::exit(1);
    }
}

fn get_compatibility_tests(pattern: &str) -> Result<Vec<PathBuf>, glob::PatternError> {
    let mut paths: Vec<PathBuf> = glob(pattern)?.filter_map(Result::ok).collect();
    paths.sort();
    Ok(paths)
}
