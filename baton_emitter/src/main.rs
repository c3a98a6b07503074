// Baton CLI: send a score to a player, or stand in for one.
//
// Usage:
//   baton emit <score.json> [--host HOST] [--port PORT] [--config FILE] [--dry-run]
//   baton listen [--port PORT]
//
// `emit` loads a JSON score, translates it, and sends the batch to the
// player. With `--dry-run` the batch is printed to stdout as one JSON object
// per message instead of being sent. `listen` runs the built-in receiver on
// localhost and prints every batch it receives the same way, until killed.
//
// Logging goes to stderr through `tracing`; set `RUST_LOG` (e.g.
// `RUST_LOG=baton_emitter=debug`) for more detail. Default level is `info`.

use std::path::PathBuf;

use baton_emitter::config::DEFAULT_PORT;
use baton_emitter::{Emitter, EmitterConfig, RecordingTransport, start_receiver};
use baton_protocol::Batch;
use baton_score::Score;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug, PartialEq)]
enum Command {
    Emit {
        score_path: PathBuf,
        config_path: Option<PathBuf>,
        host: Option<String>,
        port: Option<u16>,
        dry_run: bool,
    },
    Listen {
        port: u16,
    },
    Help,
}

fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let command = parse_command(&args).unwrap_or_else(|message| {
        eprintln!("{message}");
        print_usage();
        std::process::exit(1);
    });

    let result = match command {
        Command::Emit {
            score_path,
            config_path,
            host,
            port,
            dry_run,
        } => emitter_config(config_path, host, port)
            .and_then(|config| run_emit(score_path, &config, dry_run)),
        Command::Listen { port } => run_listen(port),
        Command::Help => {
            print_usage();
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

/// Config file values (or defaults), then flag overrides.
fn emitter_config(
    config_path: Option<PathBuf>,
    host: Option<String>,
    port: Option<u16>,
) -> Result<EmitterConfig, String> {
    let mut config = match config_path {
        Some(path) => EmitterConfig::load(&path).map_err(|e| e.to_string())?,
        None => EmitterConfig::default(),
    };
    if let Some(host) = host {
        config.host = host;
    }
    if let Some(port) = port {
        config.port = port;
    }
    Ok(config)
}

fn run_emit(score_path: PathBuf, config: &EmitterConfig, dry_run: bool) -> Result<(), String> {
    let score = Score::load(&score_path).map_err(|e| e.to_string())?;
    info!(
        "loaded {} ({} parts, {} events)",
        score_path.display(),
        score.parts.len(),
        score.events.len()
    );

    if dry_run {
        let emitter = Emitter::new(config.destination(), RecordingTransport::new());
        emitter.emit_score(&score).map_err(|e| e.to_string())?;
        for (_, batch) in emitter.transport().sent() {
            print_batch(&batch)?;
        }
        return Ok(());
    }

    let emitter = Emitter::from_config(config);
    emitter.emit_score(&score).map_err(|e| e.to_string())?;
    info!(
        "sent {} notes to {}",
        score.note_count(),
        emitter.destination()
    );
    Ok(())
}

fn run_listen(port: u16) -> Result<(), String> {
    let (handle, addr) = start_receiver(port).map_err(|e| format!("failed to listen: {e}"))?;
    info!("listening on {addr}; press Ctrl+C to stop");
    while let Some(batch) = handle.recv() {
        print_batch(&batch)?;
    }
    handle.stop();
    Ok(())
}

fn print_batch(batch: &Batch) -> Result<(), String> {
    for message in batch.messages() {
        let line = serde_json::to_string(message).map_err(|e| e.to_string())?;
        println!("{line}");
    }
    Ok(())
}

/// Parse the arguments after the program name. Each subcommand accepts only
/// its own flags.
fn parse_command(args: &[String]) -> Result<Command, String> {
    let Some(subcommand) = args.first() else {
        return Err("missing command".into());
    };
    let is_emit = match subcommand.as_str() {
        "emit" => true,
        "listen" => false,
        "--help" | "-h" => return Ok(Command::Help),
        other => return Err(format!("unknown command: {other}")),
    };

    let mut score_path = None;
    let mut config_path = None;
    let mut host = None;
    let mut port = None;
    let mut dry_run = false;

    let mut rest = args[1..].iter();
    while let Some(arg) = rest.next() {
        match arg.as_str() {
            "--help" | "-h" => return Ok(Command::Help),
            "--port" => {
                let value = rest.next().and_then(|s| s.parse().ok());
                port = Some(value.ok_or("--port requires a valid port number")?);
            }
            "--host" if is_emit => {
                host = Some(rest.next().cloned().ok_or("--host requires a value")?);
            }
            "--config" if is_emit => {
                let path = rest.next().ok_or("--config requires a path")?;
                config_path = Some(PathBuf::from(path));
            }
            "--dry-run" if is_emit => dry_run = true,
            other if is_emit && !other.starts_with('-') && score_path.is_none() => {
                score_path = Some(PathBuf::from(other));
            }
            other => return Err(format!("unexpected argument for {subcommand}: {other}")),
        }
    }

    if !is_emit {
        return Ok(Command::Listen {
            port: port.unwrap_or(DEFAULT_PORT),
        });
    }
    Ok(Command::Emit {
        score_path: score_path.ok_or("emit requires a score file")?,
        config_path,
        host,
        port,
        dry_run,
    })
}

fn print_usage() {
    println!("Usage:");
    println!("  baton emit <score.json> [OPTIONS]");
    println!("  baton listen [--port <PORT>]");
    println!();
    println!("Options:");
    println!("  --host <HOST>      Player host (default: localhost)");
    println!("  --port <PORT>      Player port (default: {DEFAULT_PORT})");
    println!("  --config <FILE>    JSON emitter config; flags override it");
    println!("  --dry-run          Print the batch as JSON lines instead of sending");
    println!("  --help, -h         Show this help");
}
