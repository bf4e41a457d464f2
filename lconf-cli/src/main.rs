//! Command-line interface for lconf
//! This binary checks, reformats and converts lconf documents.
//!
//! Usage:
//!   lconf check `<path>`                                - Parse and report errors
//!   lconf fmt `<path>` [--compact] [--write]            - Re-serialize a document
//!   lconf convert `<path>` --to `<lconf|json|yaml>`     - Emit another format
//!
//! `-` reads the document from standard input. `--config <file>` layers a TOML
//! file over the built-in defaults, `--no-includes` rejects `@"path"`
//! directives. Set `LCONF_LOG` (e.g. `LCONF_LOG=debug`) for diagnostics.

use clap::{Arg, ArgAction, ArgMatches, Command};
use lconf::json::serializer;
use lconf::{Node, SerializeOptions};
use lconf_config::{LconfConfig, Loader};
use std::process;
use tracing_subscriber::EnvFilter;

fn main() {
    init_tracing();
    let matches = build_cli().get_matches();
    let Some((command, sub)) = matches.subcommand() else {
        unreachable!("clap requires a subcommand")
    };
    // Global flags propagate into the subcommand matches
    let config = load_config(sub);

    match command {
        "check" => handle_check_command(path_arg(sub), &config),
        "fmt" => handle_fmt_command(
            path_arg(sub),
            sub.get_flag("compact"),
            sub.get_flag("write"),
            &config,
        ),
        "convert" => {
            let target = sub.get_one::<String>("to").map_or("json", String::as_str);
            handle_convert_command(path_arg(sub), target, &config)
        }
        other => unreachable!("unknown subcommand {}", other),
    }
}

fn build_cli() -> Command {
    let path = Arg::new("path")
        .help("Path to the lconf document, or - for standard input")
        .required(true)
        .index(1);

    Command::new("lconf")
        .version(env!("CARGO_PKG_VERSION"))
        .about("A tool for checking, formatting and converting lconf documents")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("config")
                .long("config")
                .short('c')
                .global(true)
                .help("TOML file layered over the built-in defaults"),
        )
        .arg(
            Arg::new("no-includes")
                .long("no-includes")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Treat @\"path\" include directives as errors"),
        )
        .subcommand(
            Command::new("check")
                .about("Parse a document and report the first error")
                .arg(path.clone()),
        )
        .subcommand(
            Command::new("fmt")
                .about("Re-serialize a document")
                .arg(path.clone())
                .arg(
                    Arg::new("compact")
                        .long("compact")
                        .action(ArgAction::SetTrue)
                        .help("Write everything on one line"),
                )
                .arg(
                    Arg::new("write")
                        .long("write")
                        .short('w')
                        .action(ArgAction::SetTrue)
                        .help("Rewrite the file in place instead of printing"),
                ),
        )
        .subcommand(
            Command::new("convert")
                .about("Convert a document to another format")
                .arg(path)
                .arg(
                    Arg::new("to")
                        .long("to")
                        .short('t')
                        .value_parser(["lconf", "json", "yaml"])
                        .default_value("json")
                        .help("Output format"),
                ),
        )
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_env("LCONF_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn path_arg(matches: &ArgMatches) -> &str {
    matches
        .get_one::<String>("path")
        .map(String::as_str)
        .unwrap_or("-")
}

fn load_config(matches: &ArgMatches) -> LconfConfig {
    let mut loader = Loader::new();
    if let Some(path) = matches.get_one::<String>("config") {
        loader = loader.with_file(path);
    }
    if matches.get_flag("no-includes") {
        loader = loader
            .without_includes()
            .unwrap_or_else(|e| fail(format!("Configuration error: {}", e)));
    }
    loader
        .build()
        .unwrap_or_else(|e| fail(format!("Configuration error: {}", e)))
}

fn load_document(path: &str, config: &LconfConfig) -> Node {
    let result = if path == "-" {
        lconf::parse_stdin(&config.parse)
    } else {
        lconf::parse_file_with(path, &config.parse)
    };
    result.unwrap_or_else(|e| fail(e.to_string()))
}

/// Handle the check command
fn handle_check_command(path: &str, config: &LconfConfig) {
    let node = load_document(path, config);
    tracing::debug!(entries = node.len(), "document parsed");
    println!("{}: ok", path);
}

/// Handle the fmt command
fn handle_fmt_command(path: &str, compact: bool, write: bool, config: &LconfConfig) {
    let node = load_document(path, config);
    let options = SerializeOptions {
        indent: config.serialize.indent && !compact,
        ..config.serialize.clone()
    };

    if write {
        if path == "-" {
            fail("--write needs a file path".to_string());
        }
        lconf::serialize_file_with(&node, path, &options).unwrap_or_else(|e| fail(e.to_string()));
    } else {
        lconf::serialize_writer_with(&node, std::io::stdout().lock(), &options)
            .unwrap_or_else(|e| fail(e.to_string()));
        if !options.indent {
            println!();
        }
    }
}

/// Handle the convert command
fn handle_convert_command(path: &str, target: &str, config: &LconfConfig) {
    let node = load_document(path, config);

    let formatted = match target {
        "json" => serde_json::to_string_pretty(&node)
            .unwrap_or_else(|e| fail(format!("Error formatting JSON: {}", e))),
        "yaml" => serde_yaml::to_string(&node)
            .unwrap_or_else(|e| fail(format!("Error formatting YAML: {}", e))),
        _ => serializer::to_string(&node, &config.serialize),
    };

    print!("{}", formatted);
    if !formatted.ends_with('\n') {
        println!();
    }
}

fn fail(message: String) -> ! {
    eprintln!("{}", message);
    process::exit(1);
}
