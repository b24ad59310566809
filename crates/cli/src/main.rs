use std::{fs, process};

use cascheck_cli::{App, Command, FormatOutcome};
use cascheck_core::history::CasHistory;
use clap::Parser;
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let app = App::parse();
    match &app.command {
        Command::Verify(args) => verify(args),
        Command::Fmt(args) => format(args),
        Command::Schema => schema(),
    }
}

fn verify(args: &cascheck_cli::VerifyArgs) {
    let algorithm = cascheck_core::Algorithm::from(args.algorithm.clone());
    let mut any_failed = false;

    let mut entries: Vec<_> = fs::read_dir(&args.input_dir)
        .unwrap_or_else(|e| {
            eprintln!("Failed to read input directory: {e}");
            process::exit(1);
        })
        .filter_map(Result::ok)
        .map(|e| e.path())
        .filter(|path| cascheck_cli::is_history_file(path))
        .collect();

    entries.sort();

    if entries.is_empty() {
        eprintln!(
            "No .json or .cas files found in {}",
            args.input_dir.display()
        );
        process::exit(1);
    }

    for path in entries {
        let filename = path.file_name().unwrap_or_default().to_string_lossy();
        let verdict = cascheck_cli::verify_file(&path, algorithm);
        any_failed |= !verdict.is_pass();

        if args.json {
            println!("{}", verdict.to_json(&filename));
        } else if args.verbose {
            println!("{filename}: {}", verdict.label());
            for line in verdict.details() {
                println!("{line}");
            }
        } else {
            println!("{}", verdict.summary(&filename));
        }
    }

    if any_failed {
        process::exit(1);
    }
}

fn format(args: &cascheck_cli::FmtArgs) {
    let files = cascheck_cli::collect_cas_files(&args.paths).unwrap_or_else(|e| {
        eprintln!("Failed to list input paths: {e}");
        process::exit(1);
    });

    let mut any_failed = false;

    for path in files {
        let original = fs::read_to_string(&path).unwrap_or_else(|e| {
            eprintln!("Failed to read {}: {e}", path.display());
            process::exit(1);
        });
        let outcome = cascheck_cli::format_source(&original).unwrap_or_else(|e| {
            eprintln!("Failed to parse {}: {e}", path.display());
            process::exit(1);
        });

        match outcome {
            FormatOutcome::Unchanged => {}
            FormatOutcome::HasComments => {
                any_failed = true;
                println!(
                    "{}: not formatted (contains comments, left unchanged)",
                    path.display()
                );
            }
            FormatOutcome::Reformatted(_) if args.check => {
                any_failed = true;
                println!("{}: not formatted", path.display());
            }
            FormatOutcome::Reformatted(formatted) => {
                fs::write(&path, formatted).unwrap_or_else(|e| {
                    eprintln!("Failed to write {}: {e}", path.display());
                    process::exit(1);
                });
                println!("{}: formatted", path.display());
            }
        }
    }

    if any_failed {
        process::exit(1);
    }
}

fn schema() {
    let schema = schemars::schema_for!(CasHistory<u64>);
    match serde_json::to_string_pretty(&schema) {
        Ok(text) => println!("{text}"),
        Err(e) => {
            eprintln!("Failed to render schema: {e}");
            process::exit(1);
        }
    }
}
