use clap::Parser;
use colored::*;
use env_logger::{Builder, Env, Target};
use log::info;
use std::fs;
use std::sync::atomic::Ordering;
use strfind::cli::{Cli, OutputFormat};
use strfind::progress::{ProgressSink, ScanProgress, SilentProgress};
use strfind::report;
use strfind::{Scanner, SearchConfig, StrfindError};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    setup_logging(&cli)?;
    info!(
        "Scan requested: directory={} pattern='{}'",
        cli.directory.display(),
        cli.pattern
    );

    // JSON output must keep stdout machine-readable, so it implies quiet.
    let mut config = SearchConfig::new(&cli.directory, &cli.pattern)
        .case_sensitive(cli.case_sensitive)
        .recursive(!cli.no_recursive)
        .verbose(!cli.quiet && cli.output != OutputFormat::Json);
    if let Some(max) = cli.max_size {
        config = config.max_read_bytes(max * 1024 * 1024);
    }

    let scanner = Scanner::new(config)?;

    // Ctrl-C stops the walk between files; the partial summary still gets
    // reported below.
    let cancel = scanner.cancel_flag();
    ctrlc::set_handler(move || cancel.store(true, Ordering::SeqCst))?;

    let verbose = scanner.config().verbose;
    if verbose {
        report::print_banner(scanner.config());
    }

    let progress: Box<dyn ProgressSink> = if verbose {
        Box::new(ScanProgress::new())
    } else {
        Box::new(SilentProgress)
    };
    let summary = scanner.scan(progress.as_ref())?;

    match cli.output {
        OutputFormat::Json => println!("{}", report::render_json(&summary)?),
        OutputFormat::Text => report::print_summary(&summary),
    }

    if !summary.files_with_matches.is_empty() {
        let saved = report::save_results(&summary)?;
        if verbose {
            println!("\n{} {}", "Results saved to:".green(), saved.display());
        }
        info!("Results saved to {}", saved.display());
    }

    Ok(())
}

fn setup_logging(cli: &Cli) -> strfind::Result<()> {
    let mut builder = Builder::from_env(Env::default().default_filter_or("warn"));

    builder.format(|buf, record| {
        use std::io::Write;
        writeln!(
            buf,
            "{} [{}] [{}] {}",
            chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
            record.level(),
            record.module_path().unwrap_or("unknown"),
            record.args()
        )
    });

    if let Some(log_path) = &cli.log {
        if let Some(parent_dir) = log_path.parent() {
            if !parent_dir.as_os_str().is_empty() && !parent_dir.exists() {
                fs::create_dir_all(parent_dir)?;
            }
        }
        let log_file = fs::File::create(log_path)?;
        builder.target(Target::Pipe(Box::new(log_file)));
    } else {
        builder.target(Target::Stderr);
    }

    builder
        .try_init()
        .map_err(|e| StrfindError::Other(e.to_string()))?;
    Ok(())
}
