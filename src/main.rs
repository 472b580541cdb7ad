use clap::{Parser, Subcommand};
use humanmark::analyzer::AnalysisInput;
use humanmark::classify;
use humanmark::external::{self, Fetcher};
use humanmark::report::{FileVerdict, Summary};
use humanmark::serve::{self, ServerState};
use humanmark::{logging, Analyzer, Config, Database};
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use tracing::warn;
use walkdir::WalkDir;

#[derive(Parser, Debug)]
#[command(name = "humanmark")]
#[command(author, version, about = "Estimate whether content was made by a human or generated by AI")]
struct Args {
    #[command(subcommand)]
    command: Option<Command>,

    /// Files or directories to analyze
    paths: Vec<PathBuf>,

    /// Analyze this text instead of (or as well as) files
    #[arg(long)]
    text: Option<String>,

    /// Download and analyze content from a URL
    #[arg(long)]
    url: Option<String>,

    /// Output report file (.csv, .json)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Number of parallel workers (default: number of CPUs)
    #[arg(short, long)]
    jobs: Option<usize>,

    /// Show every signal
    #[arg(short, long)]
    verbose: bool,

    /// Only show summary
    #[arg(short, long)]
    quiet: bool,

    /// Print results as JSON on stdout
    #[arg(long)]
    json: bool,

    /// Log level (overrides LOG_LEVEL)
    #[arg(long, env = "LOG_LEVEL")]
    log_level: Option<String>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP API
    Serve {
        /// Port to listen on
        #[arg(short, long, env = "PORT")]
        port: Option<u16>,

        /// SQLite database path
        #[arg(long, env = "DATABASE_URL")]
        db: Option<String>,
    },

    /// Inspect stored verdicts
    Jobs {
        /// SQLite database path
        #[arg(long, env = "DATABASE_URL")]
        db: Option<String>,

        #[command(subcommand)]
        action: JobsAction,
    },
}

#[derive(Subcommand, Debug)]
enum JobsAction {
    /// Show one job by id or content hash
    Show { id: String },

    /// List the most recent jobs
    Recent {
        /// Number of jobs to show
        #[arg(short = 'n', long, default_value = "20")]
        limit: i64,
    },

    /// Verdict counts and average score
    Summary,
}

fn main() {
    let args = Args::parse();

    let mut config = Config::from_env();
    if let Some(level) = &args.log_level {
        config.log_level = level.clone();
    }
    logging::init(&config.log_level, config.is_production());

    if let Some(cmd) = args.command {
        match cmd {
            Command::Serve { port, db } => {
                if let Some(port) = port {
                    config.port = port;
                }
                if db.is_some() {
                    config.database_url = db;
                }
                run_server(config);
            }
            Command::Jobs { db, action } => {
                if db.is_some() {
                    config.database_url = db;
                }
                handle_jobs_action(&config, action);
            }
        }
        return;
    }

    let files = collect_files(&args.paths);
    if files.is_empty() && args.text.is_none() && args.url.is_none() {
        eprintln!("Usage: humanmark <PATHS>... | --text <TEXT> | --url <URL>");
        eprintln!("Run 'humanmark --help' for more options.");
        std::process::exit(1);
    }

    if let Some(jobs) = args.jobs {
        rayon::ThreadPoolBuilder::new()
            .num_threads(jobs)
            .build_global()
            .ok();
    }

    let analyzer = build_analyzer(&config);

    if !args.quiet && !args.json {
        eprintln!("\x1b[1mHumanMark - Human vs AI Content Analysis\x1b[0m");
        eprintln!("{}", "─".repeat(70));
        if !files.is_empty() {
            eprintln!("Found {} file(s)\n", files.len());
        }
    }

    let pb = if !args.quiet && !args.json && files.len() > 1 {
        let pb = ProgressBar::new(files.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("=>-"),
        );
        Some(pb)
    } else {
        None
    };

    let mut verdicts: Vec<FileVerdict> = files
        .par_iter()
        .map(|path| {
            let verdict = analyze_file(&analyzer, path);
            if let Some(ref pb) = pb {
                pb.inc(1);
                pb.set_message(verdict.file_name.clone());
            }
            verdict
        })
        .collect();

    if let Some(pb) = pb {
        pb.finish_and_clear();
    }

    if let Some(text) = &args.text {
        let outcome = analyzer.analyze(&AnalysisInput::text(text.as_str()));
        verdicts.push(FileVerdict::new(Path::new("<text>"), outcome));
    }

    if let Some(url) = &args.url {
        let outcome = analyzer.analyze(&AnalysisInput::default().with_url(url.as_str()));
        let mut verdict = FileVerdict::new(Path::new(url), outcome);
        verdict.file_name = url.clone();
        verdicts.push(verdict);
    }

    if args.json {
        match serde_json::to_string_pretty(&verdicts) {
            Ok(json) => println!("{}", json),
            Err(e) => eprintln!("Error serializing results: {}", e),
        }
    } else if !args.quiet {
        for v in &verdicts {
            print_verdict(v, args.verbose);
        }
    }

    let summary = Summary::from_results(&verdicts);

    if !args.quiet && !args.json {
        eprintln!("\n{}", "─".repeat(70));
        eprintln!("\x1b[1mSummary:\x1b[0m");
        eprintln!("  \x1b[32m✓ Human:\x1b[0m  {}", summary.human);
        eprintln!("  \x1b[31m✗ AI:\x1b[0m     {}", summary.ai);
        if summary.errors > 0 {
            eprintln!("  \x1b[90mErrors:\x1b[0m   {}", summary.errors);
        }
    }

    if let Some(ref output_path) = args.output {
        if let Err(e) = humanmark::report::generate(output_path, &verdicts) {
            eprintln!("Failed to write report: {}", e);
            std::process::exit(1);
        }
        if !args.quiet {
            eprintln!("\n\x1b[32mReport saved: {}\x1b[0m", output_path.display());
        }
    }

    std::process::exit(exit_code(&summary));
}

/// 2 if anything looks AI-generated, 1 if anything failed, else 0
fn exit_code(summary: &Summary) -> i32 {
    if summary.ai > 0 {
        2
    } else if summary.errors > 0 {
        1
    } else {
        0
    }
}

fn build_analyzer(config: &Config) -> Analyzer {
    let mut analyzer = Analyzer::new();

    match external::from_config(config) {
        Ok(detectors) => analyzer = analyzer.with_detectors(detectors),
        Err(e) => warn!(error = %e, "external detectors disabled"),
    }

    match Fetcher::new(config.detector_timeout()) {
        Ok(fetcher) => analyzer = analyzer.with_fetcher(fetcher),
        Err(e) => warn!(error = %e, "URL fetching disabled"),
    }

    analyzer
}

/// Expand directories into the files whose extension we can analyze
fn collect_files(paths: &[PathBuf]) -> Vec<PathBuf> {
    let supported = |p: &Path| {
        p.file_name()
            .and_then(|n| n.to_str())
            .map(|n| classify::from_filename(n).is_known())
            .unwrap_or(false)
    };

    let mut files = Vec::new();
    for path in paths {
        if path.is_dir() {
            files.extend(
                WalkDir::new(path)
                    .into_iter()
                    .filter_map(|e| e.ok())
                    .filter(|e| e.file_type().is_file() && supported(e.path()))
                    .map(|e| e.path().to_path_buf()),
            );
        } else {
            files.push(path.clone());
        }
    }
    files
}

fn analyze_file(analyzer: &Analyzer, path: &Path) -> FileVerdict {
    match AnalysisInput::from_path(path) {
        Ok(input) => FileVerdict::new(path, analyzer.analyze(&input)),
        Err(e) => FileVerdict::failed(path, e.to_string()),
    }
}

fn print_verdict(v: &FileVerdict, verbose: bool) {
    let reset = "\x1b[0m";

    match &v.result {
        Some(r) => {
            let (color, label) = if r.human {
                ("\x1b[32m", "HUMAN")
            } else {
                ("\x1b[31m", "AI")
            };
            println!(
                "{}{:<8}{} {:>3.0}%  conf {:>3.0}%  {:<6} {:<24} {}",
                color,
                format!("[{}]", label),
                reset,
                r.ai_score * 100.0,
                r.confidence * 100.0,
                r.content_type,
                truncate(&r.detectors.join(","), 24),
                &v.file_name
            );

            if verbose {
                if let Some(details) = &r.details {
                    let signals: Vec<String> = details
                        .signals()
                        .iter()
                        .map(|(name, value)| format!("{}={:.2}", name, value))
                        .collect();
                    eprintln!("    Signals: {}", signals.join(" "));
                }
                eprintln!("    Hash: {}  ({} ms)", r.content_hash, r.processing_time_ms);
            }
        }
        None => {
            println!(
                "\x1b[90m{:<8}{} {}  {}",
                "[ERROR]",
                reset,
                &v.file_name,
                v.error.as_deref().unwrap_or("")
            );
        }
    }
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let head: String = s.chars().take(max_len - 3).collect();
        format!("{}...", head)
    }
}

fn open_db(config: &Config) -> Database {
    match Database::open_at(config.database_path()) {
        Ok(db) => db,
        Err(e) => {
            eprintln!("Failed to open database {}: {}", config.database_path(), e);
            std::process::exit(1);
        }
    }
}

fn run_server(config: Config) {
    if let Err(e) = config.validate() {
        eprintln!("{}", e);
        std::process::exit(1);
    }

    let state = ServerState {
        analyzer: build_analyzer(&config),
        db: open_db(&config),
        max_upload_size: config.max_upload_size,
    };

    if let Err(e) = serve::start(config.port, state) {
        eprintln!("Server error: {}", e);
        std::process::exit(1);
    }
}

fn handle_jobs_action(config: &Config, action: JobsAction) {
    let db = open_db(config);

    match action {
        JobsAction::Show { id } => {
            let found = db
                .get_job(&id)
                .and_then(|job| match job {
                    Some(job) => Ok(Some(job)),
                    None => db.find_by_hash(&id),
                });

            match found {
                Ok(Some(job)) => match serde_json::to_string_pretty(&job) {
                    Ok(json) => println!("{}", json),
                    Err(e) => eprintln!("Error serializing job: {}", e),
                },
                Ok(None) => {
                    eprintln!("No job with id or hash {}", id);
                    std::process::exit(1);
                }
                Err(e) => {
                    eprintln!("Error: {}", e);
                    std::process::exit(1);
                }
            }
        }

        JobsAction::Recent { limit } => match db.recent_jobs(limit) {
            Ok(jobs) => {
                if jobs.is_empty() {
                    println!("No jobs found.");
                } else {
                    println!("{:<34} {:<6} {:<6} {:>6}  {}", "ID", "TYPE", "HUMAN", "SCORE", "CREATED");
                    println!("{}", "-".repeat(80));
                    for j in jobs {
                        println!(
                            "{:<34} {:<6} {:<6} {:>6.3}  {}",
                            j.id, j.content_type, j.human, j.ai_score, j.created_at
                        );
                    }
                }
            }
            Err(e) => eprintln!("Error: {}", e),
        },

        JobsAction::Summary => match db.get_summary() {
            Ok(s) => {
                println!("Total:   {}", s.total);
                println!("Human:   {}", s.human_count);
                println!("AI:      {}", s.ai_count);
                println!(
                    "Average: {}",
                    s.avg_ai_score
                        .map(|a| format!("{:.3}", a))
                        .unwrap_or_else(|| "n/a".to_string())
                );
            }
            Err(e) => eprintln!("Error: {}", e),
        },
    }
}
