//! Benchmarks for the avatar frame loop

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use mimic_core::{PerceptualTime, Scene};
use mimic_rig::RigResolver;
use mimic_runtime::{AvatarConfig, FrameScheduler, HostInputs};
use mimic_tracking::TrackingState;

fn rigged_scene() -> Scene {
    Scene::new()
        .with_bone("mixamorig:Hips")
        .with_bone("mixamorig:Spine")
        .with_bone("mixamorig:Neck")
        .with_bone("mixamorig:Head")
        .with_bone("mixamorig:Jaw")
        .with_bone("mixamorig:LeftArm")
        .with_bone("mixamorig:LeftForeArm")
        .with_bone("mixamorig:LeftHand")
        .with_bone("mixamorig:RightArm")
        .with_bone("mixamorig:RightForeArm")
        .with_bone("mixamorig:RightHand")
        .with_mesh(
            "Wolf3D_Head",
            &["viseme_aa", "viseme_O", "viseme_E", "viseme_PP", "viseme_FF", "mouthOpen", "eyeBlinkLeft", "eyeBlinkRight"],
        )
        .with_mesh("Wolf3D_Teeth", &["viseme_aa", "mouthOpen"])
}

fn bench_tick_idle(c: &mut Criterion) {
    let mut scene = rigged_scene();
    let mut scheduler = FrameScheduler::new(RigResolver::new().resolve(&scene), &AvatarConfig::default());
    let inputs = HostInputs::default();
    let tracking = TrackingState::default();

    c.bench_function("tick_idle", |b| {
        b.iter(|| black_box(scheduler.tick(black_box(1.0 / 60.0), &inputs, &tracking, &mut scene)))
    });
}

fn bench_tick_tracking_speaking(c: &mut Criterion) {
    let mut scene = rigged_scene();
    let mut scheduler = FrameScheduler::new(RigResolver::new().resolve(&scene), &AvatarConfig::default());
    let inputs = HostInputs {
        speaking: true,
        audio_level: 0.4,
    };
    let tracking = TrackingState {
        source_active: true,
        target_detected: true,
        position: (0.2, -0.1),
        last_detected_at: PerceptualTime::ZERO,
    };

    c.bench_function("tick_tracking_speaking", |b| {
        b.iter(|| black_box(scheduler.tick(black_box(1.0 / 60.0), &inputs, &tracking, &mut scene)))
    });
}

fn bench_resolve(c: &mut Criterion) {
    let scene = rigged_scene();
    let resolver = RigResolver::new();

    c.bench_function("rig_resolve", |b| b.iter(|| black_box(resolver.resolve(black_box(&scene)))));
}

criterion_group!(benches, bench_tick_idle, bench_tick_tracking_speaking, bench_resolve);
criterion_main!(benches);
