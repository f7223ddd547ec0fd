// Engine sound scheduling, checked against the software audio graph.

use bike_core::constants::*;
use bike_core::*;

const SR: f32 = 8_000.0;

fn close(a: f32, b: f32) -> bool {
    (a - b).abs() <= 1e-4 * b.abs().max(1.0)
}

fn synth() -> (EngineSynth<SoftwarePlatform>, SoftwareGraph) {
    let platform = SoftwarePlatform::new(SR);
    let graph = platform.graph();
    (EngineSynth::new(platform), graph)
}

#[test]
fn initialize_twice_builds_one_output_and_one_master() {
    let (mut synth, graph) = synth();
    synth.initialize().unwrap();
    let master = synth.master();
    synth.initialize().unwrap();
    assert_eq!(synth.platform().acquisitions(), 1);
    assert_eq!(graph.node_count(), 1);
    assert_eq!(synth.master(), master);
    assert_eq!(graph.param_value(master.unwrap(), Param::Gain), Some(0.0));
}

#[test]
fn suspended_output_is_resumed_not_failed() {
    let platform = SoftwarePlatform::new(SR).suspended();
    let graph = platform.graph();
    let mut synth = EngineSynth::new(platform);
    synth.initialize().unwrap();
    assert_eq!(graph.state(), ContextState::Running);
}

#[test]
fn denied_output_fails_startup() {
    let mut synth = EngineSynth::new(SoftwarePlatform::denying(SR, "autoplay"));
    let err = synth.play_startup().unwrap_err();
    assert!(matches!(err, AudioError::ResourceDenied(_)));
    assert!(!synth.is_playing());
    assert!(synth.graph().is_none());
}

#[test]
fn startup_schedules_the_full_timeline() {
    let (mut synth, graph) = synth();
    let playback = synth.play_startup().unwrap();
    assert_eq!(playback.started_at, 0.0);
    assert_eq!(playback.finishes_at, STARTUP_DURATION_SEC);
    // master + starter chain + pop chain + five voices
    assert_eq!(graph.node_count(), 1 + 3 + 3 + 15);

    let bank = synth.voice_bank().unwrap();
    assert_eq!(bank.voices().len(), 5);
    for v in bank.voices() {
        assert_eq!(graph.schedule_of(v.oscillator), Some((Some(VOICES_START_SEC), None)));
    }

    let master = synth.master().unwrap();
    graph.advance(MASTER_FADE_IN_END_SEC);
    let peak = graph.param_value(master, Param::Gain).unwrap();
    assert!(close(peak, MASTER_FADE_IN_PEAK), "peak {peak}");
    graph.advance(STARTUP_DURATION_SEC - MASTER_FADE_IN_END_SEC);
    let idle = graph.param_value(master, Param::Gain).unwrap();
    assert!(close(idle, IDLE_MASTER_GAIN), "idle {idle}");
}

#[test]
fn startup_ramps_follow_their_curves() {
    let (mut synth, graph) = synth();
    synth.play_startup().unwrap();
    // Nodes are allocated in creation order after the master:
    // starter osc, filter, gain, then pop osc, filter, gain.
    let master = synth.master().unwrap();
    let starter = NodeId(master.0 + 1);
    let starter_gain = NodeId(master.0 + 3);
    let pop_gain = NodeId(master.0 + 6);
    let thump = synth.voice_bank().unwrap().voices()[0].oscillator;
    let at = |node, param| graph.param_value(node, param).unwrap();

    graph.advance(0.25);
    assert!(close(at(starter, Param::Frequency), 225.0));
    graph.advance(0.25);
    assert!(close(at(starter, Param::Frequency), 300.0));
    graph.advance(0.5);
    assert!(close(at(starter, Param::Frequency), 350.0));
    assert!(close(at(starter_gain, Param::Gain), 0.2));
    // failed catch
    graph.advance(0.2);
    assert!(close(at(starter_gain, Param::Gain), 0.05));

    // halfway through the pop decay sits at the geometric mean, not the linear one
    graph.advance(IGNITION_POP_PEAK_SEC - 1.2);
    assert!(close(at(pop_gain, Param::Gain), 0.4));
    graph.advance((IGNITION_POP_DECAY_SEC - IGNITION_POP_PEAK_SEC) / 2.0);
    let pop = at(pop_gain, Param::Gain);
    assert!(close(pop, (0.4f32 * 0.01).sqrt()), "pop {pop}");
    assert!(pop < 0.1);

    graph.advance(REV_PEAK_SEC - (IGNITION_POP_PEAK_SEC + IGNITION_POP_DECAY_SEC) / 2.0);
    assert!(close(at(thump, Param::Frequency), 50.0));
    graph.advance(STARTUP_DURATION_SEC - REV_PEAK_SEC);
    assert!(close(at(thump, Param::Frequency), 20.0));
}

#[test]
fn startup_transients_are_released_after_they_end() {
    let (mut synth, graph) = synth();
    synth.play_startup().unwrap();
    graph.advance(STARTER_STOP_SEC + 0.1);
    synth.poll();
    assert_eq!(graph.node_count(), 1 + 15);
}

#[test]
fn set_rpm_tracks_the_firing_frequency_and_caps_gain() {
    let (mut synth, graph) = synth();
    synth.play_startup().unwrap();
    graph.advance(STARTUP_DURATION_SEC + 0.5);
    let master = synth.master().unwrap();

    for rpm in [0.0, 600.0, 1200.0, 1800.0, 3800.0, 12_000.0, 1.0e6] {
        synth.set_rpm(rpm).unwrap();
        let bank = synth.voice_bank().unwrap();
        for (v, mult) in bank.voices().iter().zip(VOICE_MULTIPLIERS) {
            let expected = mult * (rpm / 60.0) / 2.0;
            assert!(close(v.target_hz, expected), "rpm {rpm}: {} vs {expected}", v.target_hz);
            let scheduled = graph.param_target(v.oscillator, Param::Frequency).unwrap();
            assert!(close(scheduled, expected));
        }
        let gain = graph.param_target(master, Param::Gain).unwrap();
        let expected = (0.3 + (rpm - 1200.0) * 0.0001).min(0.5);
        assert!(close(gain, expected), "rpm {rpm}: gain {gain}");
        assert!(gain <= 0.5);
        assert_eq!(synth.master_target(), gain);
    }
}

#[test]
fn set_rpm_ramps_instead_of_stepping() {
    let (mut synth, graph) = synth();
    synth.play_startup().unwrap();
    graph.advance(STARTUP_DURATION_SEC + 0.5);
    synth.set_rpm(3000.0).unwrap();
    let osc = synth.voice_bank().unwrap().voices()[0].oscillator;
    let before = graph.param_value(osc, Param::Frequency).unwrap();
    graph.advance(0.05);
    let mid = graph.param_value(osc, Param::Frequency).unwrap();
    graph.advance(0.06);
    let after = graph.param_value(osc, Param::Frequency).unwrap();
    assert!(mid > before && mid < after, "{before} {mid} {after}");
    assert!(close(after, 25.0));
}

#[test]
fn stop_without_a_voice_bank_is_a_no_op() {
    let (mut synth, graph) = synth();
    synth.stop().unwrap();
    synth.initialize().unwrap();
    synth.stop().unwrap();
    assert_eq!(graph.node_count(), 1);
}

#[test]
fn stop_fades_then_releases_the_voices() {
    let (mut synth, graph) = synth();
    synth.play_startup().unwrap();
    graph.advance(STARTUP_DURATION_SEC + 0.5);
    synth.poll();
    synth.stop().unwrap();
    assert!(!synth.is_playing());
    assert_eq!(synth.master_target(), 0.0);

    let master = synth.master().unwrap();
    assert_eq!(STOP_FADE_SEC, 0.5);

    // still fading
    graph.advance(STOP_FADE_SEC * 0.5);
    synth.poll();
    assert_eq!(graph.node_count(), 16);
    assert!(graph.param_value(master, Param::Gain).unwrap() > 0.0);

    graph.advance(STOP_FADE_SEC);
    synth.poll();
    assert_eq!(graph.node_count(), 1);
    assert_eq!(graph.param_value(master, Param::Gain), Some(0.0));

    // racing RPM update after the bank is gone
    synth.set_rpm(2500.0).unwrap();
    synth.stop().unwrap();
}

#[test]
fn repeated_rev_blips_do_not_grow_the_graph() {
    let (mut synth, graph) = synth();
    synth.play_startup().unwrap();
    graph.advance(STARTER_STOP_SEC + 0.1);
    synth.poll();
    synth.play_rev().unwrap();
    graph.advance(0.7);
    synth.poll();
    let slots = graph.slot_count();
    for _ in 0..20 {
        synth.play_rev().unwrap();
        graph.advance(0.7);
        synth.poll();
    }
    assert_eq!(graph.slot_count(), slots);
    assert_eq!(graph.node_count(), 1 + 15);
}

#[test]
fn rev_blip_is_a_short_lived_chain() {
    let (mut synth, graph) = synth();
    synth.initialize().unwrap();
    synth.play_rev().unwrap();
    assert_eq!(graph.node_count(), 4);
    graph.advance(0.7);
    synth.poll();
    assert_eq!(graph.node_count(), 1);
}

#[test]
fn teardown_closes_the_output_and_is_repeatable() {
    let (mut synth, graph) = synth();
    synth.play_startup().unwrap();
    synth.teardown();
    assert_eq!(graph.state(), ContextState::Closed);
    assert!(synth.graph().is_none());
    assert!(!synth.is_playing());
    synth.set_rpm(3000.0).unwrap();
    synth.stop().unwrap();
    synth.teardown();
}

#[test]
fn running_engine_is_audible() {
    let (mut synth, graph) = synth();
    synth.play_startup().unwrap();
    graph.advance(STARTUP_DURATION_SEC);
    let mut buf = vec![0.0f32; 2048];
    graph.render(&mut buf, 2);
    let peak = buf.iter().fold(0.0f32, |m, s| m.max(s.abs()));
    assert!(peak > 0.001, "peak {peak}");
    assert!(peak <= 1.0);
}
