//! DmxFlow - console front end for DMX512 colour control
//!
//! Reads commands from stdin and prints one status line per command.
//! Usage: `dmxflow [config.toml]`

#![warn(missing_docs)]

mod commands;
mod logging_setup;

use anyhow::{Context, Result};
use dmxflow_control::{dmx, driver, Command, DmxFlowConfig, Session};
use std::path::PathBuf;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::{error, info, warn};

use commands::{parse_line, ConsoleAction, HELP};

fn main() -> Result<()> {
    let config_path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .or_else(DmxFlowConfig::default_path)
        .unwrap_or_else(|| PathBuf::from("dmxflow.toml"));

    let config = DmxFlowConfig::load_or_default(&config_path)
        .with_context(|| format!("Failed to load config from {:?}", config_path))?;

    let _log_guard = logging_setup::init(&config.log)?;
    info!("DmxFlow starting (config: {:?})", config_path);

    // Everything that touches the frame runs on this one thread
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to start runtime")?;

    runtime.block_on(run(config))
}

async fn run(config: DmxFlowConfig) -> Result<()> {
    let (cmd_tx, cmd_rx) = mpsc::channel(16);
    let (status_tx, mut status_rx) = mpsc::unbounded_channel();
    let driver = tokio::spawn(driver::run(Session::serial(), cmd_rx, status_tx));

    let mut startup = Vec::new();
    if let Some(port) = &config.port {
        startup.push(Command::Connect(port.clone()));
        if config.start_cycle {
            startup.push(Command::StartCycle(config.cycle_interval()));
        }
    }
    for command in startup {
        send(&cmd_tx, &mut status_rx, command).await?;
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await.context("Failed to read stdin")? {
        match parse_line(&line) {
            Ok(ConsoleAction::Session(command)) => {
                send(&cmd_tx, &mut status_rx, command).await?;
            }
            Ok(ConsoleAction::ListPorts) => list_ports(),
            Ok(ConsoleAction::Help) => println!("{}", HELP),
            Ok(ConsoleAction::Quit) => break,
            Ok(ConsoleAction::Nothing) => {}
            Err(msg) => println!("{}", msg),
        }
    }

    // The driver closes the port on shutdown
    cmd_tx
        .send(Command::Shutdown)
        .await
        .context("Driver stopped unexpectedly")?;
    let session = driver.await.context("Driver task failed")?;
    info!("DmxFlow stopped after {} frames", session.frames_sent());

    Ok(())
}

async fn send(
    commands: &mpsc::Sender<Command>,
    status: &mut mpsc::UnboundedReceiver<String>,
    command: Command,
) -> Result<()> {
    commands
        .send(command)
        .await
        .context("Driver stopped unexpectedly")?;
    if let Some(line) = status.recv().await {
        if line.starts_with("Error: ") {
            error!("{}", line);
        }
        println!("{}", line);
    }
    Ok(())
}

fn list_ports() {
    match dmx::available_ports() {
        Ok(ports) if ports.is_empty() => println!("No serial ports found"),
        Ok(ports) => {
            for port in ports {
                println!("{}", port);
            }
        }
        Err(e) => {
            warn!("Port enumeration failed: {}", e);
            println!("Error: {}", e);
        }
    }
}
