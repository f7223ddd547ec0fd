// Per-frame scene animation, including partially mounted scenes.

use bike_core::constants::*;
use bike_core::*;

fn close(a: f32, b: f32) -> bool {
    (a - b).abs() < 1e-5
}

fn running(wheel_speed: f32, vibration: f32) -> EngineState {
    EngineState {
        is_running: true,
        wheel_speed,
        engine_vibration: vibration,
        current_rpm: 1800.0,
        ..EngineState::default()
    }
}

fn frame(elapsed: f32) -> FrameInfo {
    FrameInfo {
        elapsed,
        viewport_width: 20.0,
    }
}

#[test]
fn missing_body_skips_only_the_body() {
    let mut scene = Scene::mounted(&SceneConfig::default());
    scene.body = None;
    let before: Vec<_> = scene.smoke.as_ref().unwrap().particles().to_vec();
    let mut driver = MotionDriver::new(3);

    driver.update(&running(0.1, 0.003), frame(0.25), scene.handles());

    assert!(scene.body.is_none());
    assert!(close(scene.front_wheel.unwrap().rotation.z, -0.1));
    assert!(close(scene.rear_wheel.unwrap().rotation.z, -0.1));
    let smoke = scene.smoke.as_ref().unwrap();
    assert!(smoke.visible);
    assert_ne!(smoke.particles(), &before[..]);
}

#[test]
fn empty_scene_is_a_no_op() {
    let mut scene = Scene::empty();
    let mut driver = MotionDriver::new(3);
    for i in 0..10 {
        driver.update(&running(0.2, 0.01), frame(i as f32 / 60.0), scene.handles());
    }
    assert!(scene.rig.is_none());
    // the road keeps its own travel even with nothing to show it on
    assert!(driver.road_travel() > 0.0);
}

#[test]
fn wheels_accumulate_rotation_without_wrapping() {
    let mut scene = Scene::mounted(&SceneConfig::default());
    let mut driver = MotionDriver::new(3);
    for i in 0..100 {
        driver.update(&running(0.1, 0.0), frame(i as f32 / 60.0), scene.handles());
    }
    let z = scene.front_wheel.unwrap().rotation.z;
    assert!((z + 10.0).abs() < 1e-3, "{z}");
}

#[test]
fn body_shakes_with_two_unrelated_frequencies() {
    let mut scene = Scene::mounted(&SceneConfig::default());
    let mut driver = MotionDriver::new(3);
    let t = 0.37;
    driver.update(&running(0.1, 0.006), frame(t), scene.handles());
    let body = scene.body.unwrap();
    assert!(close(body.translation.y, (t * 50.0).sin() * 0.006));
    assert!(close(body.rotation.z, (t * 40.0).sin() * 0.003));
}

#[test]
fn rig_hovers_only_while_running_but_always_follows_scroll() {
    let mut scene = Scene::mounted(&SceneConfig::default());
    let mut driver = MotionDriver::new(3);
    let t = 1.1;

    let idle = EngineState {
        scroll_progress: 0.5,
        ..EngineState::default()
    };
    driver.update(&idle, frame(t), scene.handles());
    let rig = scene.rig.unwrap();
    assert_eq!(rig.translation.y, RIG_BASE_Y);
    assert!(close(rig.rotation.y, -0.15));

    let mut state = running(0.1, 0.003);
    state.scroll_progress = 0.5;
    driver.update(&state, frame(t), scene.handles());
    let rig = scene.rig.unwrap();
    assert!(close(rig.translation.y, (t * 2.0).sin() * 0.02 - 0.3));
    assert!(close(rig.rotation.y, -0.15));
}

#[test]
fn rig_scale_follows_the_viewport() {
    let mut scene = Scene::mounted(&SceneConfig::default());
    let mut driver = MotionDriver::new(3);
    let state = EngineState::default();
    for (width, expected) in [(3.0, 0.25), (9.0, 0.75), (10.2, 0.85), (40.0, 0.85)] {
        let info = FrameInfo {
            elapsed: 0.0,
            viewport_width: width,
        };
        driver.update(&state, info, scene.handles());
        let scale = scene.rig.unwrap().scale;
        assert!(close(scale.x, expected), "width {width}: {scale}");
        assert_eq!(scale.x, scale.y);
        assert_eq!(scale.y, scale.z);
    }
}

#[test]
fn smoke_stays_in_its_arena() {
    let config = SceneConfig::default();
    let mut scene = Scene::mounted(&config);
    let mut driver = MotionDriver::new(9);
    let state = running(0.1, 0.003);
    for i in 0..2_000 {
        driver.update(&state, frame(i as f32 / 60.0), scene.handles());
        let smoke = scene.smoke.as_ref().unwrap();
        assert_eq!(smoke.len(), config.particle_count);
        for p in smoke.particles() {
            assert!(p.x >= SMOKE_ORIGIN_X && p.x <= SMOKE_RECYCLE_X, "x {}", p.x);
        }
    }
}

#[test]
fn smoke_freezes_and_hides_when_the_engine_is_off() {
    let mut scene = Scene::mounted(&SceneConfig::default());
    let mut driver = MotionDriver::new(9);
    driver.update(&running(0.1, 0.003), frame(0.0), scene.handles());
    let snapshot: Vec<_> = scene.smoke.as_ref().unwrap().particles().to_vec();
    driver.update(&EngineState::default(), frame(0.1), scene.handles());
    let smoke = scene.smoke.as_ref().unwrap();
    assert!(!smoke.visible);
    assert_eq!(smoke.particles(), &snapshot[..]);
}

#[test]
fn lamps_brighten_when_running() {
    let mut scene = Scene::mounted(&SceneConfig::default());
    let mut driver = MotionDriver::new(1);
    driver.update(&EngineState::default(), frame(0.0), scene.handles());
    assert_eq!(scene.lamps, Some(Lamps::default()));
    driver.update(&running(0.1, 0.003), frame(0.1), scene.handles());
    let lamps = scene.lamps.unwrap();
    assert_eq!(lamps.headlamp, HEADLAMP_RUNNING);
    assert_eq!(lamps.taillamp, TAILLAMP_RUNNING);
}

#[test]
fn road_markings_slide_backwards() {
    let mut scene = Scene::mounted(&SceneConfig::default());
    let mut driver = MotionDriver::new(1);
    driver.update(&running(0.1, 0.003), frame(0.0), scene.handles());
    let road = scene.road_markings.unwrap();
    assert!(close(road.translation.x, -ROAD_STEP));
    assert_eq!(road.translation.y, -2.3);
}
