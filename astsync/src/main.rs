use astsync::config::runtime::RuntimeConfig;
use astsync::{batch, logging, pipeline};
use std::env;
use std::path::Path;

/// Options that apply to single files as well as directories
#[derive(Debug, Default)]
struct CliOptions {
    report: bool,
    dump: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    logging::init_global_logging()?;
    let runtime = RuntimeConfig::load()?;

    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        eprintln!("Usage: {} <unit.json|directory> [options]", args[0]);
        eprintln!("       {} --help", args[0]);
        std::process::exit(1);
    }

    if args[1] == "--help" {
        print_help(&args[0]);
        return Ok(());
    }

    let input_path = Path::new(&args[1]);
    let (batch_config, options) = parse_options(&args[2..], &runtime);

    if input_path.is_file() {
        process_single_file(&args[1], &runtime, &options)?;
    } else if input_path.is_dir() {
        process_directory_batch(input_path, &batch_config)?;
    } else {
        eprintln!("Error: Input must be a unit file or a directory of unit files");
        eprintln!("  Path: {}", input_path.display());
        std::process::exit(1);
    }

    Ok(())
}

fn print_help(program_name: &str) {
    println!("astsync v{}", env!("CARGO_PKG_VERSION"));
    println!("Aligns parsed syntax trees with their lexical token streams");
    println!();
    println!("USAGE:");
    println!("    {} <unit.json>                    # Align one unit", program_name);
    println!("    {} <directory> [options]          # Align every unit in a directory", program_name);
    println!();
    println!("OPTIONS:");
    println!("    --help              Show this help message");
    println!("    --sequential        Align units one at a time");
    println!("    --parallel          Align units on worker threads (default)");
    println!("    --threads N         Maximum worker threads (default: auto)");
    println!("    --no-recursive      Don't search subdirectories");
    println!("    --max-files N       Limit the number of units");
    println!("    --fail-fast         Stop after the first failing unit");
    println!("    --quiet             Suppress progress reporting");
    println!("    --report            Print the JSON alignment report (single unit)");
    println!("    --dump              Print the aligned tree with its token links (single unit)");
    println!();
    println!("UNIT FORMAT:");
    println!("    {{ \"file\": ..., \"source\": ..., \"tokens\": [...], \"nodes\": [...], \"root\": 0 }}");
    println!();
    println!("EXAMPLES:");
    println!("    {} units/mod.json --report", program_name);
    println!("    {} units/ --threads 4", program_name);
    println!("    {} units/ --sequential --fail-fast", program_name);
    println!();
    println!("BUILD LIMITS: {}", astsync::config::build_info::source_info());
}

fn parse_options(args: &[String], runtime: &RuntimeConfig) -> (batch::BatchConfig, CliOptions) {
    let mut config = batch::BatchConfig {
        progress_reporting: runtime.batch.progress_reporting,
        unit_extension: runtime.batch.unit_extension.clone(),
        alignment: runtime.alignment.clone(),
        ..batch::BatchConfig::default()
    };
    if !runtime.batch.parallel_by_default {
        config = config.sequential();
    }
    let mut options = CliOptions::default();

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--sequential" => config = config.sequential(),
            "--parallel" => {
                if config.max_threads <= 1 {
                    config = config.with_threads(batch::BatchConfig::default().max_threads);
                }
            }
            "--threads" => match args.get(i + 1).map(|v| v.parse::<usize>()) {
                Some(Ok(threads)) => {
                    config = config.with_threads(threads);
                    i += 1;
                }
                Some(Err(_)) => {
                    eprintln!("Warning: Invalid thread count '{}', using default", args[i + 1]);
                    i += 1;
                }
                None => eprintln!("Warning: --threads requires a number"),
            },
            "--no-recursive" => config.recursive = false,
            "--max-files" => match args.get(i + 1).map(|v| v.parse::<usize>()) {
                Some(Ok(max_files)) => {
                    config.max_files = Some(max_files);
                    i += 1;
                }
                Some(Err(_)) => {
                    eprintln!("Warning: Invalid max files '{}', ignoring", args[i + 1]);
                    i += 1;
                }
                None => eprintln!("Warning: --max-files requires a number"),
            },
            "--fail-fast" => config.fail_fast = true,
            "--quiet" => config.progress_reporting = false,
            "--report" => options.report = true,
            "--dump" => options.dump = true,
            other => eprintln!("Warning: Unknown option '{}'", other),
        }
        i += 1;
    }

    (config, options)
}

fn process_single_file(
    file_path: &str,
    runtime: &RuntimeConfig,
    options: &CliOptions,
) -> Result<(), Box<dyn std::error::Error>> {
    println!("Aligning unit: {}", file_path);

    match pipeline::process_file_with_preferences(file_path, &runtime.alignment) {
        Ok(result) => {
            println!(
                "\nSUCCESS: {} tokens, {} owned, {} comments attached{}",
                result.unit.token_count(),
                result.summary.owned_claims,
                result.summary.comments_attached,
                if result.verified { ", verified" } else { "" }
            );
            if options.report {
                let report = result.report(runtime.alignment.include_token_table);
                println!("{}", report.to_json()?);
            }
            if options.dump {
                print!("{}", pipeline::dump_tree_and_links(&result.unit));
            }
            logging::print_cargo_style_summary();
        }
        Err(error) => {
            eprintln!("\nFAILED [{}]: {}", error.error_code(), error);
            logging::print_cargo_style_summary();
            std::process::exit(1);
        }
    }

    Ok(())
}

fn process_directory_batch(
    dir_path: &Path,
    config: &batch::BatchConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    println!("Starting batch: {}", dir_path.display());
    println!(
        "Configuration: {} threads, recursive={}, fail_fast={}",
        config.max_threads, config.recursive, config.fail_fast
    );
    if let Some(max_files) = config.max_files {
        println!("Unit limit: {} files maximum", max_files);
    }

    match batch::process_directory_with_config(dir_path, config) {
        Ok(results) => {
            print_batch_results(&results);
            logging::print_cargo_style_summary();
            if results.failure_count() > 0 {
                std::process::exit(1);
            }
        }
        Err(error) => {
            eprintln!("Batch failed [{}]: {}", error.error_code(), error);
            logging::print_cargo_style_summary();
            std::process::exit(1);
        }
    }

    Ok(())
}

fn print_batch_results(results: &batch::BatchResults) {
    println!("\n{}", results.summary());
    println!("  Units discovered: {}", results.files_discovered);

    let seconds = results.processing_duration.as_secs_f64();
    if seconds > 0.0 {
        println!("  Throughput: {:.0} tokens/sec", results.total_tokens() as f64 / seconds);
    }

    if results.failure_count() > 0 {
        println!("\nFailed units:");
        for (file_path, error) in &results.failed_files {
            println!("  {}: [{}] {}", file_path.display(), error.error_code(), error_stage(error));
        }
    }
}

fn error_stage(error: &pipeline::PipelineError) -> &'static str {
    match error {
        pipeline::PipelineError::Unit(_) => "unit could not be loaded",
        pipeline::PipelineError::Alignment(_) => "tokens and tree disagree",
        pipeline::PipelineError::Verification(_) => "alignment invariants violated",
        pipeline::PipelineError::Pipeline { .. } => "pipeline error",
    }
}
