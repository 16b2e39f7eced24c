//! demo - end-to-end synthetic run of the SightGuide session

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;

use sightguide::{RecordingSurface, SessionController, SightguideConfig, StubSpeech};
use sightguide::media::SyntheticDevices;

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Duration in seconds to run before switching cameras.
    #[arg(long, default_value_t = 2)]
    seconds: u64,
    /// Sampler tick period in milliseconds.
    #[arg(long, default_value_t = 50)]
    tick_ms: u64,
    /// Scripted detections, one entry per tick (`+` joins classes within
    /// a tick, `-` is an empty tick).
    #[arg(long, default_value = "person,person,dog,-,cup")]
    script: String,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    let mut config = SightguideConfig::default();
    config.model.url = format!("scripted://{}", args.script);
    config.sampler.tick_ms = args.tick_ms.max(1);

    let devices = Arc::new(SyntheticDevices::new(
        &["Front Camera", "Back Camera"],
        config.camera.width,
        config.camera.height,
    ));
    let engine = Arc::new(StubSpeech::new());
    let surface = Arc::new(RecordingSurface::new());
    let mut session =
        SessionController::new(devices, engine.clone(), surface.clone(), &config);

    println!("starting session (script: {})", args.script);
    session.start()?;
    std::thread::sleep(Duration::from_secs(args.seconds));

    println!("switching camera...");
    session.switch_camera()?;
    std::thread::sleep(Duration::from_secs(args.seconds));

    session.stop();

    println!();
    println!("announcements, in order:");
    for utterance in engine.utterances() {
        println!("  \"{utterance}\"");
    }
    println!("draw calls recorded: {}", surface.calls().len());
    println!("speech cancellations: {}", engine.cancellations());

    Ok(())
}
