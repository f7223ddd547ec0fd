// End-to-end behaviour of the scene controller: startup script, scroll and audio.

use bike_core::constants::*;
use bike_core::*;
use std::time::Duration;

const SR: f32 = 8_000.0;

fn close(a: f32, b: f32) -> bool {
    (a - b).abs() < 1e-5
}

fn ms(v: u64) -> Duration {
    Duration::from_millis(v)
}

fn controller() -> (SceneController<SoftwarePlatform>, SoftwareGraph) {
    let platform = SoftwarePlatform::new(SR);
    let graph = platform.graph();
    (SceneController::new(platform, SceneConfig::default()), graph)
}

fn tuple(s: &EngineState) -> (bool, bool, f32, f32, f32) {
    (
        s.is_running,
        s.is_starting,
        s.engine_vibration,
        s.wheel_speed,
        s.current_rpm,
    )
}

#[test]
fn cold_start() {
    let (mut c, _graph) = controller();
    assert_eq!(c.start_engine(Duration::ZERO), Ok(true));
    let s = c.state();
    assert!(s.is_starting);
    assert!(!s.is_running);
    assert_eq!(c.stage(), StartupStage::Cranking);

    c.tick(ms(2600));
    let s = c.state();
    assert!(s.is_running);
    assert_eq!(s.current_rpm, 2500.0);

    c.tick(ms(4100));
    let s = c.state();
    assert!(!s.is_starting);
    assert_eq!(s.current_rpm, 1800.0);
    assert!(close(s.wheel_speed, 0.1));
    assert_eq!(c.stage(), StartupStage::IdleRunning);
}

#[test]
fn startup_writes_the_four_stage_tuples_in_order() {
    let (mut c, _graph) = controller();
    let t0 = ms(10_000);
    c.start_engine(t0).unwrap();

    let expected = [
        (500, (false, true, 0.003, 0.0, 1200.0)),
        (1500, (false, true, 0.008, 0.02, 1200.0)),
        (2500, (true, true, 0.006, 0.06, 2500.0)),
        (4000, (true, false, 0.003, 0.1, 1800.0)),
    ];
    for (offset, tuple_at) in expected {
        // just before the stage nothing new is visible
        c.tick(t0 + ms(offset - 1));
        assert_eq!(
            c.state().is_running,
            offset > 2500,
            "running flag just before {offset}ms"
        );
        c.tick(t0 + ms(offset));
        assert_eq!(tuple(&c.state()), tuple_at, "stage at {offset}ms");
    }
}

#[test]
fn late_frame_collapses_stages() {
    let (mut c, _graph) = controller();
    c.start_engine(Duration::ZERO).unwrap();
    c.tick(ms(5000));
    assert_eq!(c.stage(), StartupStage::IdleRunning);
    assert_eq!(c.next_deadline(), None);
    assert!(c.state().is_settled());
}

#[test]
fn second_interaction_is_ignored() {
    let (mut c, graph) = controller();
    assert_eq!(c.start_engine(Duration::ZERO), Ok(true));
    let nodes = graph.node_count();
    c.tick(ms(600));
    assert_eq!(c.start_engine(ms(700)), Ok(false));
    assert_eq!(graph.node_count(), nodes);
    assert_eq!(c.next_deadline(), Some(ms(1500)));
}

#[test]
fn scroll_while_running_drives_speed_and_rpm() {
    let (mut c, _graph) = controller();
    c.start_engine(Duration::ZERO).unwrap();
    c.tick(ms(4000));
    c.report_scroll(900.0, 900.0);
    c.tick(ms(4016));
    let s = c.state();
    assert_eq!(s.scroll_progress, 1.0);
    assert!(close(s.wheel_speed, 0.3));
    assert!(close(s.current_rpm, 3800.0));
}

#[test]
fn scroll_before_start_only_moves_progress() {
    let (mut c, _graph) = controller();
    c.report_scroll(300.0, 1200.0);
    c.tick(Duration::ZERO);
    let s = c.state();
    assert_eq!(s.scroll_progress, 0.25);
    assert_eq!(s.wheel_speed, 0.0);
    assert_eq!(s.current_rpm, 1200.0);
    assert!(!s.is_running);
}

#[test]
fn scroll_during_startup_waits_for_settle() {
    let (mut c, _graph) = controller();
    c.start_engine(Duration::ZERO).unwrap();
    c.tick(ms(3000));
    c.report_scroll(500.0, 1000.0);
    c.tick(ms(3016));
    let s = c.state();
    assert_eq!(s.scroll_progress, 0.5);
    assert_eq!(s.current_rpm, 2500.0);
    assert!(close(s.wheel_speed, 0.06));

    // settle overwrites; the next report takes over again
    c.tick(ms(4000));
    assert_eq!(c.state().current_rpm, 1800.0);
    c.report_scroll(500.0, 1000.0);
    c.tick(ms(4016));
    assert!(close(c.state().current_rpm, 2800.0));
}

#[test]
fn many_scroll_events_coalesce_into_one_update() {
    let (mut c, _graph) = controller();
    c.start_engine(Duration::ZERO).unwrap();
    c.tick(ms(4000));
    for y in (0..=1000).step_by(10) {
        c.report_scroll(y as f32, 2000.0);
    }
    c.tick(ms(4016));
    assert_eq!(c.state().scroll_progress, 0.5);
}

#[test]
fn rpm_changes_reach_the_voice_bank() {
    let (mut c, graph) = controller();
    c.start_engine(Duration::ZERO).unwrap();
    graph.advance(4.6);
    c.tick(ms(4600));
    c.report_scroll(1000.0, 1000.0);
    c.tick(ms(4616));
    let bank = c.synth().voice_bank().unwrap();
    let thump = &bank.voices()[0];
    assert!((thump.target_hz - 3800.0 / 120.0).abs() < 1e-3);
    assert!(c.synth().master_target() <= 0.5);
}

#[test]
fn idle_sound_matches_the_settled_rpm_after_startup() {
    let (mut c, graph) = controller();
    c.start_engine(Duration::ZERO).unwrap();
    let mut t = 0;
    while t < 6000 {
        graph.advance(0.016);
        t += 16;
        c.tick(ms(t));
    }
    let s = c.state();
    assert_eq!(s.current_rpm, SETTLE_RPM);

    let synth = c.synth();
    let thump = &synth.voice_bank().unwrap().voices()[0];
    assert!(close(thump.target_hz, firing_frequency(SETTLE_RPM)));
    let hz = graph.param_value(thump.oscillator, Param::Frequency).unwrap();
    assert!((hz - thump.target_hz).abs() < 1e-3, "thump at {hz} Hz");
    let cutoff = graph.param_value(thump.filter, Param::Frequency).unwrap();
    assert!((cutoff - thump_cutoff_for(SETTLE_RPM)).abs() < 1e-2, "cutoff {cutoff}");

    let master = synth.master().unwrap();
    let level = graph.param_value(master, Param::Gain).unwrap();
    assert!(close(synth.master_target(), master_gain_for(SETTLE_RPM)));
    assert!((level - synth.master_target()).abs() < 1e-4, "master at {level}");
}

#[test]
fn denied_audio_leaves_the_engine_off_for_a_retry() {
    let platform = SoftwarePlatform::denying(SR, "autoplay blocked");
    let mut c = SceneController::new(platform, SceneConfig::default());
    let err = c.start_engine(Duration::ZERO).unwrap_err();
    assert!(matches!(err, AudioError::ResourceDenied(_)));
    assert_eq!(c.stage(), StartupStage::Off);
    assert_eq!(c.state(), EngineState::default());
    assert_eq!(c.hud(), HudView::StartPrompt);

    c.synth_mut().platform_mut().allow();
    assert_eq!(c.start_engine(ms(2000)), Ok(true));
    assert_eq!(c.hud(), HudView::Starting);
}

#[test]
fn stop_audio_leaves_state_untouched() {
    let (mut c, graph) = controller();
    c.stop_audio();
    assert_eq!(c.state(), EngineState::default());

    c.start_engine(Duration::ZERO).unwrap();
    c.tick(ms(4500));
    let before = c.state();
    c.stop_audio();
    c.stop_audio();
    assert_eq!(c.state(), before);
    assert_eq!(c.stage(), StartupStage::IdleRunning);
    assert!(!c.synth().is_playing());

    // a stale rpm push after stop is harmless
    c.report_scroll(400.0, 800.0);
    graph.advance(1.0);
    c.tick(ms(5500));
    assert!(close(c.state().current_rpm, 2800.0));
}

#[test]
fn rev_only_after_settle() {
    let (mut c, graph) = controller();
    assert!(!c.rev());
    c.start_engine(Duration::ZERO).unwrap();
    c.tick(ms(3000));
    assert!(!c.rev());
    c.tick(ms(4000));
    let nodes = graph.node_count();
    assert!(c.rev());
    assert_eq!(graph.node_count(), nodes + 3);
}

#[test]
fn muted_controller_never_touches_audio() {
    let platform = SoftwarePlatform::new(SR);
    let mut c = SceneController::new(platform, SceneConfig::default().muted());
    assert_eq!(c.start_engine(Duration::ZERO), Ok(true));
    c.tick(ms(4000));
    assert!(c.state().is_settled());
    assert_eq!(c.synth().platform().acquisitions(), 0);
    assert!(!c.rev());
}

#[test]
fn dispose_releases_audio_once() {
    let (mut c, graph) = controller();
    c.start_engine(Duration::ZERO).unwrap();
    c.dispose();
    assert!(c.is_disposed());
    assert_eq!(graph.state(), ContextState::Closed);
    c.dispose();
    let before = c.state();
    c.tick(ms(5000));
    assert_eq!(c.state(), before);
    assert_eq!(c.start_engine(ms(6000)), Ok(false));
}

#[test]
fn drop_closes_the_output() {
    let (mut c, graph) = controller();
    c.start_engine(Duration::ZERO).unwrap();
    drop(c);
    assert_eq!(graph.state(), ContextState::Closed);
}

#[test]
fn frame_animates_the_mounted_scene() {
    let (mut c, _graph) = controller();
    let mut scene = Scene::mounted(c.config());
    c.start_engine(Duration::ZERO).unwrap();
    c.tick(ms(4000));
    c.frame(0.5, 20.0, &mut scene);
    let wheel = scene.front_wheel.unwrap();
    assert!(close(wheel.rotation.z, -0.1));
    assert!(scene.smoke.as_ref().unwrap().visible);
    assert_eq!(scene.lamps.unwrap().headlamp, HEADLAMP_RUNNING);
}
