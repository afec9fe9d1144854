//! Command-line interface for chat-export
//! This binary turns a saved chat page into a standalone HTML export, or shows what the
//! extractor finds on a page.
//!
//! Usage:
//!   chat-export export `<page>` [--output `<file>` | --output-dir `<dir>` | --stdout]
//!   chat-export inspect `<page>` [--view `<view>`]
//!   chat-export --list-views

mod views;

use anyhow::{Context, Result};
use chat_export_config::{ExportConfig, Loader};
use clap::{Arg, ArgAction, ArgMatches, Command};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

fn main() {
    let matches = build_cli().get_matches();

    if matches.get_flag("list-views") {
        handle_list_views_command();
        return;
    }

    let config = match load_config(&matches) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Configuration error: {:#}", e);
            std::process::exit(1);
        }
    };
    init_tracing(&config.logging.filter, matches.get_count("verbose"));

    let Some((command, sub)) = matches.subcommand() else {
        eprintln!("No command given; run `chat-export --help` for usage.");
        std::process::exit(2);
    };

    let span = tracing::info_span!("chat-export", command);
    let result = span.in_scope(|| match command {
        "export" => handle_export_command(sub, &config),
        "inspect" => handle_inspect_command(sub, &config),
        other => Err(anyhow::anyhow!("unknown command: {}", other)),
    });
    drop(span);

    if let Err(e) = result {
        eprintln!("Failed to generate export: {:#}", e);
        std::process::exit(1);
    }
}

fn build_cli() -> Command {
    let page_arg = Arg::new("page")
        .help("Path to the saved chat page (HTML)")
        .required(true)
        .index(1);

    Command::new("chat-export")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Export a rendered chat conversation as a self-contained HTML document")
        .arg_required_else_help(true)
        .arg(
            Arg::new("config")
                .long("config")
                .short('c')
                .global(true)
                .help("Configuration file layered over the defaults and the user config"),
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .global(true)
                .action(ArgAction::Count)
                .help("Log more (-v debug, -vv trace); RUST_LOG takes precedence"),
        )
        .arg(
            Arg::new("list-views")
                .long("list-views")
                .help("List available inspection views")
                .exclusive(true)
                .action(ArgAction::SetTrue),
        )
        .subcommand(
            Command::new("export")
                .about("Write the conversation as a standalone HTML file")
                .arg(page_arg.clone())
                .arg(
                    Arg::new("output")
                        .long("output")
                        .short('o')
                        .help("Exact output file (default: <output-dir>/<derived file name>)")
                        .conflicts_with_all(["output-dir", "stdout"]),
                )
                .arg(
                    Arg::new("output-dir")
                        .long("output-dir")
                        .short('d')
                        .help("Directory for the derived file name (overrides config)"),
                )
                .arg(
                    Arg::new("stdout")
                        .long("stdout")
                        .help("Print the document instead of writing a file")
                        .conflicts_with("output-dir")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(
            Command::new("inspect")
                .about("Show what the extractor finds on a page")
                .arg(page_arg)
                .arg(
                    Arg::new("view")
                        .long("view")
                        .help("View to render (see --list-views)")
                        .default_value("summary"),
                ),
        )
}

fn load_config(matches: &ArgMatches) -> Result<ExportConfig> {
    let mut loader = Loader::new().with_user_file();
    if let Some(path) = matches.get_one::<String>("config") {
        loader = loader.with_file(path);
    }
    if let Some(("export", sub)) = matches.subcommand() {
        if let Some(dir) = sub.get_one::<String>("output-dir") {
            loader = loader.set_override("output.directory", dir.as_str())?;
        }
    }
    loader.build().context("could not load configuration")
}

/// Install the stderr subscriber. Safe to call more than once.
fn init_tracing(default_filter: &str, verbosity: u8) {
    let directive = match verbosity {
        0 => default_filter.to_string(),
        1 => "debug".to_string(),
        _ => "trace".to_string(),
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directive));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn read_page(matches: &ArgMatches) -> Result<String> {
    let path = matches
        .get_one::<String>("page")
        .context("page path is required")?;
    std::fs::read_to_string(path).with_context(|| format!("could not read page {}", path))
}

/// Handle the export command
fn handle_export_command(matches: &ArgMatches, config: &ExportConfig) -> Result<()> {
    let page = read_page(matches)?;
    let generated_at = chrono::Local::now().fixed_offset();
    let artifact = chat_export::generate_export(&page, &config.landmarks, generated_at)?;

    for problem in &artifact.malformed {
        eprintln!(
            "warning: message #{} is malformed ({:?}), exported with fallbacks",
            problem.index, problem.kind
        );
    }

    if matches.get_flag("stdout") {
        print!("{}", artifact.html);
        return Ok(());
    }

    let target = match matches.get_one::<String>("output") {
        Some(path) => PathBuf::from(path),
        None => config.output.directory.join(&artifact.filename),
    };
    write_document(&target, &artifact.html)?;
    tracing::debug!(path = %target.display(), bytes = artifact.html.len(), "wrote export");

    println!(
        "Exported {} messages ({} yours, {} assistant) to {}",
        artifact.stats.total,
        artifact.stats.user,
        artifact.stats.assistant,
        target.display()
    );
    Ok(())
}

fn write_document(target: &Path, html: &str) -> Result<()> {
    if let Some(parent) = target.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("could not create directory {}", parent.display()))?;
    }
    std::fs::write(target, html).with_context(|| format!("could not write {}", target.display()))
}

/// Handle the inspect command
fn handle_inspect_command(matches: &ArgMatches, config: &ExportConfig) -> Result<()> {
    let page = read_page(matches)?;
    let view = matches
        .get_one::<String>("view")
        .map(String::as_str)
        .unwrap_or("summary");
    let output = views::render_view(&page, &config.landmarks, view)?;
    print!("{}", output);
    if !output.ends_with('\n') {
        println!();
    }
    Ok(())
}

/// Handle the list-views command
fn handle_list_views_command() {
    println!("Available inspection views:\n");
    for view in views::AVAILABLE_VIEWS {
        println!("  {}", view);
    }
}
