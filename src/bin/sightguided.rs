//! sightguided - SightGuide assistive-perception daemon
//!
//! This daemon:
//! 1. Builds the capability stack (devices, model, speech, surface) from
//!    the layered configuration
//! 2. Mounts one session controller and, by default, starts it immediately
//! 3. Serves the two user controls (start/stop toggle, switch camera) as
//!    stdin commands
//! 4. Tears the session down exactly once on quit, EOF, or Ctrl-C

use std::io::BufRead;
use std::sync::mpsc;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;

use sightguide::{open_devices, open_engine, LogSurface, SessionController, SightguideConfig};

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Do not start the session on launch; wait for a `start` command.
    #[arg(long)]
    no_autostart: bool,
}

enum Event {
    Line(String),
    Eof,
    Interrupt,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let config = SightguideConfig::load()?;
    log::info!(
        "sightguided starting (devices {}, model {}, speech {})",
        config.camera.devices_url,
        config.model.url,
        config.speech.url
    );

    let devices = open_devices(
        &config.camera.devices_url,
        config.camera.width,
        config.camera.height,
    )?;
    let engine = open_engine(&config.speech.url)?;
    let surface = Arc::new(LogSurface);
    let mut session = SessionController::new(devices, engine, surface, &config);

    let (tx, rx) = mpsc::channel();

    let interrupt_tx = tx.clone();
    ctrlc::set_handler(move || {
        let _ = interrupt_tx.send(Event::Interrupt);
    })
    .expect("error setting Ctrl-C handler");

    std::thread::spawn(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            match line {
                Ok(line) => {
                    if tx.send(Event::Line(line)).is_err() {
                        return;
                    }
                }
                Err(_) => break,
            }
        }
        let _ = tx.send(Event::Eof);
    });

    if args.no_autostart {
        log::info!("autostart disabled; waiting for 'start'");
    } else if let Err(err) = session.start() {
        // Start failures leave the session stopped; the user can retry.
        report(&err);
    }

    println!("commands: start | stop | switch | status | quit");
    loop {
        match rx.recv() {
            Ok(Event::Line(line)) => {
                if !dispatch(&mut session, line.trim()) {
                    break;
                }
            }
            Ok(Event::Eof) | Ok(Event::Interrupt) | Err(_) => break,
        }
    }

    session.shutdown();
    log::info!("sightguided exiting");
    Ok(())
}

/// Handle one command line. Returns false when the daemon should exit.
fn dispatch(session: &mut SessionController, command: &str) -> bool {
    match command {
        "" => {}
        "start" => {
            if let Err(err) = session.start() {
                report(&err);
            }
        }
        "stop" => session.stop(),
        "switch" => {
            if !session.is_camera_running() {
                println!("camera is not running");
            } else if let Err(err) = session.switch_camera() {
                report(&err);
            }
        }
        "status" => {
            println!(
                "state: {:?} | facing: {} | last announced: {}",
                session.state(),
                session.facing(),
                session.last_announced().as_deref().unwrap_or("none")
            );
        }
        "quit" | "exit" => return false,
        other => println!("unknown command '{other}' (start | stop | switch | status | quit)"),
    }
    true
}

/// Camera errors are alerted directly to the user; model errors are
/// logged only. Either way the session is back at Stopped.
fn report(err: &sightguide::SessionError) {
    if err.is_user_alert() {
        eprintln!("! {err}");
    }
    log::error!("{err}");
}
