pub mod case;
pub mod config;
pub mod directive;
pub mod engine;
pub mod error;
pub mod stylesheet;
pub mod tokens;
pub mod utilities;

pub use config::Config;
pub use directive::{DirectiveSite, StylesheetBuilder, DIRECTIVE_NAME};
pub use engine::DesignTokenUtils;
pub use error::TokenError;

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::mpsc::channel;
use std::time::{Duration, Instant};

use stylesheet::{Node, Stylesheet};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Build(BuildOptions),
    Tokens {
        config: String,
    },
    Watch {
        build: BuildOptions,
        poll: bool,
        poll_interval_ms: u64,
    },
    Help,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildOptions {
    pub config: String,
    pub out: Option<String>,
    pub minify: bool,
    /// Argument list for the custom-properties directive, e.g. `font,space`.
    pub groups: Option<String>,
    pub utilities: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CliError {
    pub message: String,
}

impl From<TokenError> for CliError {
    fn from(err: TokenError) -> Self {
        CliError {
            message: err.to_string(),
        }
    }
}

pub fn run(command: Command) -> Result<(), CliError> {
    match command {
        Command::Build(options) => run_build(&options),
        Command::Tokens { config } => run_tokens(&config),
        Command::Watch {
            build,
            poll,
            poll_interval_ms,
        } => run_watch(&build, poll, poll_interval_ms),
        Command::Help => {
            print_help();
            Ok(())
        }
    }
}

pub fn run_from_env() -> Result<(), CliError> {
    let command = parse_args(env::args().skip(1))?;
    run(command)
}

pub fn parse_args<I>(args: I) -> Result<Command, CliError>
where
    I: IntoIterator<Item = String>,
{
    let mut iter = args.into_iter();
    let Some(cmd) = iter.next() else {
        return Ok(Command::Help);
    };

    match cmd.as_str() {
        "build" => {
            parse_build_args("build", iter.collect()).map(|(build, _)| Command::Build(build))
        }
        "watch" => parse_build_args("watch", iter.collect()).map(|(build, watch)| {
            Command::Watch {
                build,
                poll: watch.poll,
                poll_interval_ms: watch.poll_interval_ms,
            }
        }),
        "tokens" => parse_tokens_args(iter.collect()),
        "-h" | "--help" | "help" => Ok(Command::Help),
        _ => Err(CliError {
            message: format!("unknown command: {}", cmd),
        }),
    }
}

#[derive(Debug, Clone, Copy)]
struct WatchArgs {
    poll: bool,
    poll_interval_ms: u64,
}

fn parse_build_args(
    command: &str,
    args: Vec<String>,
) -> Result<(BuildOptions, WatchArgs), CliError> {
    let mut config = None;
    let mut out = None;
    let mut minify = false;
    let mut groups = None;
    let mut utilities = true;
    let mut watch = WatchArgs {
        poll: false,
        poll_interval_ms: 500,
    };
    let mut idx = 0;

    while idx < args.len() {
        match args[idx].as_str() {
            "--config" | "-c" => {
                config = Some(flag_value(command, &args, &mut idx, "--config")?);
            }
            "--out" | "--output" | "-o" => {
                out = Some(flag_value(command, &args, &mut idx, "--output")?);
            }
            "--groups" | "-g" => {
                groups = Some(flag_value(command, &args, &mut idx, "--groups")?);
            }
            "--minify" => {
                minify = true;
            }
            "--no-utilities" => {
                utilities = false;
            }
            "--poll" if command == "watch" => {
                watch.poll = true;
            }
            "--poll-interval" if command == "watch" => {
                let value = flag_value(command, &args, &mut idx, "--poll-interval")?;
                watch.poll = true;
                watch.poll_interval_ms = parse_u64_arg(&value, "--poll-interval")?;
            }
            "--poll" | "--poll-interval" => {
                return Err(CliError {
                    message: format!("{} is only supported with watch", args[idx]),
                });
            }
            value => {
                return Err(CliError {
                    message: format!("unexpected argument for {}: {}", command, value),
                });
            }
        }
        idx += 1;
    }

    let Some(config) = config else {
        return Err(CliError {
            message: format!("{} requires --config <path>", command),
        });
    };

    Ok((
        BuildOptions {
            config,
            out,
            minify,
            groups,
            utilities,
        },
        watch,
    ))
}

fn parse_tokens_args(args: Vec<String>) -> Result<Command, CliError> {
    let mut config = None;
    let mut idx = 0;

    while idx < args.len() {
        match args[idx].as_str() {
            "--config" | "-c" => {
                config = Some(flag_value("tokens", &args, &mut idx, "--config")?);
            }
            value => {
                return Err(CliError {
                    message: format!("unexpected argument for tokens: {}", value),
                });
            }
        }
        idx += 1;
    }

    match config {
        Some(config) => Ok(Command::Tokens { config }),
        None => Err(CliError {
            message: "tokens requires --config <path>".to_string(),
        }),
    }
}

fn flag_value(
    command: &str,
    args: &[String],
    idx: &mut usize,
    flag: &str,
) -> Result<String, CliError> {
    *idx += 1;
    args.get(*idx).cloned().ok_or_else(|| CliError {
        message: format!("{} requires a value for {}", command, flag),
    })
}

fn parse_u64_arg(value: &str, flag: &str) -> Result<u64, CliError> {
    value.parse::<u64>().map_err(|_| CliError {
        message: format!("{} requires a positive integer, got '{}'", flag, value),
    })
}

/// The document a build renders: a `:root` rule holding the custom-properties
/// directive, followed by the utility-classes directive at the top level.
pub fn build_document(groups: Option<&str>, utilities: bool) -> Stylesheet {
    let params = match groups {
        Some(groups) => format!("(custom-properties: {})", groups),
        None => "(custom-properties)".to_string(),
    };
    let mut nodes = vec![Node::rule(":root", vec![Node::statement(DIRECTIVE_NAME, &params)])];
    if utilities {
        nodes.push(Node::statement(DIRECTIVE_NAME, "(utility-classes)"));
    }
    Stylesheet::new(nodes)
}

/// Loads the config and renders the generated stylesheet.
pub fn render(options: &BuildOptions) -> Result<String, CliError> {
    let config = config::load(Path::new(&options.config))?;
    let engine = DesignTokenUtils::new(&config)?;
    let mut sheet = build_document(options.groups.as_deref(), options.utilities);
    let warnings = stylesheet::transform(&mut sheet, &engine);

    tracing::info!(
        properties = engine.records().len(),
        classes = engine.classes().len(),
        warnings = warnings.len(),
        "generated design token css"
    );

    Ok(sheet.to_css(options.minify))
}

fn run_build(options: &BuildOptions) -> Result<(), CliError> {
    let css = render(options)?;

    if let Some(out_path) = options.out.as_ref() {
        fs::write(out_path, css).map_err(|err| CliError {
            message: format!("failed to write output {}: {}", out_path, err),
        })?;
        tracing::info!(path = %out_path, "wrote stylesheet");
    } else {
        print!("{}", css);
    }

    Ok(())
}

fn run_tokens(config_path: &str) -> Result<(), CliError> {
    let config = config::load(Path::new(config_path))?;
    let engine = DesignTokenUtils::new(&config)?;

    for line in token_listing(&engine) {
        println!("{}", line);
    }

    Ok(())
}

fn token_listing(engine: &DesignTokenUtils) -> Vec<String> {
    engine
        .records()
        .iter()
        .map(|record| match record.group.as_deref() {
            Some(group) => format!("{}: {} [{}]", record.prop, record.value, group),
            None => format!("{}: {}", record.prop, record.value),
        })
        .collect()
}

fn run_watch(options: &BuildOptions, poll: bool, poll_interval_ms: u64) -> Result<(), CliError> {
    run_build(options)?;

    let (tx, rx) = channel();
    let mut watcher: Box<dyn notify::Watcher> = if poll {
        Box::new(
            notify::PollWatcher::new(
                tx,
                notify::Config::default()
                    .with_poll_interval(Duration::from_millis(poll_interval_ms)),
            )
            .map_err(|err| CliError {
                message: format!("failed to start poll watcher: {}", err),
            })?,
        )
    } else {
        Box::new(notify::recommended_watcher(tx).map_err(|err| CliError {
            message: format!("failed to start watcher: {}", err),
        })?)
    };

    let config_path = PathBuf::from(&options.config);
    let root = watch_root(&config_path);
    watcher
        .watch(&root, notify::RecursiveMode::NonRecursive)
        .map_err(|err| CliError {
            message: format!("failed to watch {}: {}", root.display(), err),
        })?;

    if poll {
        tracing::info!("watching {} (polling, press Ctrl+C to stop)", config_path.display());
    } else {
        tracing::info!("watching {} (press Ctrl+C to stop)", config_path.display());
    }

    let mut last_event = Instant::now();
    loop {
        match rx.recv_timeout(Duration::from_millis(200)) {
            Ok(event_result) => {
                let event: notify::Event = match event_result {
                    Ok(event) => event,
                    Err(err) => {
                        tracing::warn!("watch error: {}", err);
                        continue;
                    }
                };
                if !event_touches(&event, &config_path) {
                    continue;
                }
                if last_event.elapsed() < Duration::from_millis(200) {
                    continue;
                }
                last_event = Instant::now();
                tracing::info!("config changed, rebuilding...");
                if let Err(err) = run_build(options) {
                    tracing::error!("build failed: {}", err.message);
                }
            }
            Err(std::sync::mpsc::RecvTimeoutError::Timeout) => continue,
            Err(_) => break,
        }
    }

    Ok(())
}

fn watch_root(config_path: &Path) -> PathBuf {
    match config_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

fn event_touches(event: &notify::Event, config_path: &Path) -> bool {
    let Some(file_name) = config_path.file_name() else {
        return false;
    };
    event
        .paths
        .iter()
        .any(|path| path.file_name() == Some(file_name))
}

fn print_help() {
    println!("design-token-utils");
    println!();
    println!("USAGE:");
    println!(
        "  design-token-utils build --config <path> [--output <path>] [--minify] [--groups <list>] [--no-utilities]"
    );
    println!("  design-token-utils tokens --config <path>");
    println!(
        "  design-token-utils watch --config <path> [--output <path>] [--minify] [--groups <list>] [--poll] [--poll-interval <ms>]"
    );
    println!();
    println!("EXAMPLES:");
    println!("  design-token-utils build -c tokens.toml -o dist/tokens.css");
    println!("  design-token-utils build -c tokens.json --groups all --minify");
    println!("  design-token-utils build -c tokens.toml --groups font,space --no-utilities");
    println!("  design-token-utils tokens -c tokens.toml");
    println!(
        "  design-token-utils watch --poll --poll-interval 250 -c tokens.toml -o dist/tokens.css"
    );
}
