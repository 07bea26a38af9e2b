//! mimic Avatar Demo
//!
//! Drives a Mixamo-style avatar for a few seconds without a window:
//! - Scripted camera with a face drifting across the frame, then leaving it
//! - Speech bursts on a fixed rhythm
//! - Frame loop at 60 Hz on a tokio interval
//!
//! Usage: `avatar-demo [calm|expressive] [light|dark] [no-camera]`
//! Set `RUST_LOG=mimic=debug` (or `trace`) for controller logs.

use std::time::Duration;

use tokio::time::MissedTickBehavior;
use tracing::info;
use tracing_subscriber::EnvFilter;

use mimic_core::Theme;
use mimic_runtime::{Avatar, AvatarConfig};
use mimic_test::scenarios::mixamo_rig;
use mimic_test::{FaceStep, ScriptedCamera, ScriptedDetector};
use mimic_tracking::TrackingStatus;

const RUN_FOR: Duration = Duration::from_secs(8);
const FACE_LEAVES_AT: Duration = Duration::from_secs(5);

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let has = |flag: &str| args.iter().any(|a| a == flag);

    let mut config = if has("calm") {
        AvatarConfig::calm()
    } else if has("expressive") {
        AvatarConfig::expressive()
    } else {
        AvatarConfig::default()
    };
    if let Some(theme) = args.iter().find_map(|a| Theme::from_name(a)) {
        config.theme = theme;
    }

    let mut avatar = Avatar::mount(mixamo_rig(), config);
    let report = &avatar.rig().report;
    println!("mimic avatar demo");
    println!("  bound:      {:?}", report.bound.iter().map(|(s, _)| s.name()).collect::<Vec<_>>());
    println!("  unresolved: {:?}", report.unresolved.iter().map(|s| s.name()).collect::<Vec<_>>());
    println!("  concepts:   {:?}", report.concepts);
    println!("  palette:    {:?}", avatar.palette());
    println!();

    let detector = ScriptedDetector::fixed(0.0, 0.0);
    if !has("no-camera") {
        avatar.start_tracking(Box::new(ScriptedCamera::new()), Box::new(detector.clone()));
    }

    let mut status = avatar.subscribe_status();
    tokio::spawn(async move {
        while status.changed().await.is_ok() {
            let current: TrackingStatus = *status.borrow_and_update();
            info!(status = current.as_str(), "tracking status");
        }
    });

    let mut interval = tokio::time::interval(Duration::from_micros(16_667));
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut elapsed = Duration::ZERO;
    let mut face_gone = false;

    while elapsed < RUN_FOR {
        interval.tick().await;

        let t = elapsed.as_secs_f32();
        if elapsed < FACE_LEAVES_AT {
            detector.set(FaceStep::Face((t * 0.8).sin() * 0.7, (t * 0.5).cos() * 0.3));
        } else if !face_gone {
            detector.set(FaceStep::Absent);
            face_gone = true;
        }

        // Speak for 1.5 s out of every 2.5 s
        let speaking = t % 2.5 < 1.5;
        avatar.set_speaking(speaking);
        avatar.set_audio_level(if speaking { 0.25 + 0.2 * (t * 9.0).sin().abs() } else { 0.0 });

        let report = avatar.frame_now();
        if report.frame % 30 == 0 {
            let state = avatar.scheduler().state();
            println!(
                "t={:5.2}s  head=({:+.3}, {:+.3})  {:<9} env={:.2}  blink={:.2}  status={}",
                t,
                state.head_pitch,
                state.head_yaw,
                if report.head_mode.is_tracking() { "tracking" } else { "idle" },
                report.envelope,
                report.blink_weight,
                avatar.status().as_str(),
            );
        }

        elapsed += Duration::from_secs_f32(report.dt.max(1.0 / 240.0));
    }

    avatar.unmount();
    println!();
    println!("done");
}
