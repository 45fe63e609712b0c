mod cli;

use clipforged::config;
use clipforged::provider::HttpManifestProvider;
use clipforged_av::tools::{self, ToolConfig};
use clipforged_pipeline::{
    CancellationToken, FetchRequest, Orchestrator, ProgressSender, TrimStatus,
};

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands};
use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

/// Exit code for failures that carry no pipeline error kind.
const EXIT_FAILURE: u8 = 1;

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Respect RUST_LOG env var if set, otherwise use defaults based on verbose flag
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            "clipforged=trace,clipforged_core=trace,clipforged_av=trace,clipforged_pipeline=trace"
                .to_string()
        } else {
            "clipforged=debug,clipforged_core=debug,clipforged_av=debug,clipforged_pipeline=debug"
                .to_string()
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .with_writer(std::io::stderr)
        .init();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::from(exit_code(&e))
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Fetch {
            source,
            output,
            start,
            end,
        } => {
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(fetch(source, output, start, end, cli.config.as_deref()))
        }
        Commands::CheckTools => {
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(check_tools(cli.config.as_deref()))
        }
        Commands::Validate { file } => {
            let path = file.or(cli.config);
            validate_config(path.as_deref())
        }
    }
}

/// Map a failure to the process exit code.
fn exit_code(err: &anyhow::Error) -> u8 {
    err.downcast_ref::<clipforged_core::Error>()
        .and_then(|e| u8::try_from(e.exit_code()).ok())
        .unwrap_or(EXIT_FAILURE)
}

async fn fetch(
    source: String,
    output: PathBuf,
    start: Option<String>,
    end: Option<String>,
    config_path: Option<&Path>,
) -> Result<()> {
    let config = config::load_config_or_default(config_path)?;

    let output = normalize_output_path(&output, &config.output.container);
    let tool = ToolConfig::ffmpeg(&config.tools);
    let provider = Arc::new(HttpManifestProvider::new(&config.download)?);

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received, cancelling");
            on_interrupt.cancel();
        }
    });

    let progress = if std::io::stderr().is_terminal() {
        ProgressSender::new(|pct, step| {
            eprint!("\r{step:<16} {pct:>5.1}%");
            if pct >= 100.0 {
                eprintln!();
            }
        })
    } else {
        ProgressSender::noop()
    };

    let orchestrator = Orchestrator::new(provider, tool)
        .with_cancellation(cancel)
        .with_progress(progress);

    tracing::info!("Fetching {source} into {}", output.display());
    let request = FetchRequest::new(source, output).with_window(start, end);
    let outcome = orchestrator.run(&request).await?;

    if let Some(warning) = outcome.warning() {
        eprintln!("Warning: {warning}");
    }

    if let Some(ref title) = outcome.video.title {
        println!("Title: {title}");
    }
    println!(
        "Streams: {}",
        if outcome.selection.needs_merge() {
            "separate video and audio (merged)"
        } else {
            "muxed"
        }
    );
    if let TrimStatus::Applied(ref window) = outcome.trim {
        println!("Trimmed: {window}");
    }
    println!("Output: {}", outcome.output.display());

    Ok(())
}

/// Force `container` as the extension of `path`.
///
/// A matching extension (any case) is kept; a different one is appended to
/// rather than replaced so dotted names survive intact.
fn normalize_output_path(path: &Path, container: &str) -> PathBuf {
    let container = match container.trim_start_matches('.') {
        "" => "mp4",
        c => c,
    };

    match path.extension() {
        Some(ext) if ext.to_string_lossy().eq_ignore_ascii_case(container) => path.to_path_buf(),
        Some(_) => {
            let mut name = path.as_os_str().to_os_string();
            name.push(".");
            name.push(container);
            PathBuf::from(name)
        }
        None => path.with_extension(container),
    }
}

async fn check_tools(config_path: Option<&Path>) -> Result<()> {
    println!("Checking external tools...\n");

    let config = config::load_config_or_default(config_path)?;
    let tool = ToolConfig::ffmpeg(&config.tools);
    let info = tools::check_available(&tool).await;

    let status = if info.available { "✓" } else { "✗" };
    print!("{} {}", status, info.name);
    if let Some(ref version) = info.version {
        print!(" ({})", version);
    }
    println!(" - {}", info.path.display());

    println!();
    if info.available {
        println!("All required tools are available!");
    } else {
        println!("ffmpeg is missing. Install it or set tools.ffmpeg_path.");
    }

    Ok(())
}

fn validate_config(path: Option<&Path>) -> Result<()> {
    let found = config::find_config(path);
    let config = match found {
        Some(ref p) => {
            println!("Validating config: {:?}", p);
            config::load_config(p)?
        }
        None => {
            println!("No config file found, using defaults");
            config::Config::default()
        }
    };

    let warnings = config.validate();
    println!("✓ Configuration is valid");
    println!(
        "  ffmpeg: {}",
        config
            .tools
            .ffmpeg_path
            .as_deref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "(PATH)".to_string())
    );
    match config.tools.timeout_secs {
        Some(secs) => println!("  Tool timeout: {secs}s"),
        None => println!("  Tool timeout: none"),
    }
    println!(
        "  Base URL: {}",
        config.download.base_url.as_deref().unwrap_or("(not set)")
    );
    println!("  Output container: {}", config.output.container);

    if !warnings.is_empty() {
        println!("\nWarnings:");
        for warning in &warnings {
            println!("  - {warning}");
        }
    }

    Ok(())
}
