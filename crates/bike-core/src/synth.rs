//! Layered single-cylinder engine sound driven by one scalar: RPM.
//!
//! Five oscillator → filter → gain voices feed a master gain. The startup
//! sound (starter whine, ignition pop, first rev) is a fixed automation
//! timeline scheduled in one go; after that, [`EngineSynth::set_rpm`] retunes
//! every voice with short linear ramps.

use crate::audio::{
    AudioError, AudioGraph, AudioPlatform, ContextState, FilterKind, NodeId, Param, Waveform,
};
use crate::automation::Automation;
use crate::constants::*;
use smallvec::SmallVec;

/// Static description of one voice of the engine sound.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VoiceSpec {
    pub waveform: Waveform,
    /// Multiple of the firing frequency (rpm / 60 / 2).
    pub multiplier: f32,
    pub filter: FilterKind,
    pub cutoff_hz: f32,
    pub q: f32,
    pub gain: f32,
}

/// Combustion thump, exhaust note, valve noise, chain/gear whine, block rumble.
pub const VOICE_TABLE: [VoiceSpec; 5] = [
    VoiceSpec {
        waveform: Waveform::Saw,
        multiplier: VOICE_MULTIPLIERS[0],
        filter: FilterKind::Lowpass,
        cutoff_hz: 150.0,
        q: 2.0,
        gain: 0.4,
    },
    VoiceSpec {
        waveform: Waveform::Square,
        multiplier: VOICE_MULTIPLIERS[1],
        filter: FilterKind::Lowpass,
        cutoff_hz: 200.0,
        q: 1.0,
        gain: 0.25,
    },
    VoiceSpec {
        waveform: Waveform::Triangle,
        multiplier: VOICE_MULTIPLIERS[2],
        filter: FilterKind::Bandpass,
        cutoff_hz: 800.0,
        q: 3.0,
        gain: 0.1,
    },
    VoiceSpec {
        waveform: Waveform::Saw,
        multiplier: VOICE_MULTIPLIERS[3],
        filter: FilterKind::Highpass,
        cutoff_hz: 1000.0,
        q: 1.0,
        gain: 0.05,
    },
    VoiceSpec {
        waveform: Waveform::Sine,
        multiplier: VOICE_MULTIPLIERS[4],
        filter: FilterKind::Lowpass,
        cutoff_hz: 80.0,
        q: 5.0,
        gain: 0.3,
    },
];

/// Firing frequency of a four-stroke single: one combustion per two revolutions.
#[inline]
pub fn firing_frequency(rpm: f32) -> f32 {
    rpm.max(0.0) / 60.0 / 2.0
}

/// Master level for a given RPM, capped so the top of the rev range stays safe.
#[inline]
pub fn master_gain_for(rpm: f32) -> f32 {
    (MASTER_GAIN_BASE + (rpm.max(0.0) - IDLE_RPM) * MASTER_GAIN_PER_RPM).min(MASTER_GAIN_MAX)
}

/// Cutoff of the combustion voice's lowpass for a given RPM.
#[inline]
pub fn thump_cutoff_for(rpm: f32) -> f32 {
    (FILTER0_BASE_HZ + (rpm.max(0.0) - IDLE_RPM) * FILTER0_HZ_PER_RPM).max(0.0)
}

#[derive(Clone, Debug)]
pub struct Voice {
    pub spec: VoiceSpec,
    pub oscillator: NodeId,
    pub filter: NodeId,
    pub gain: NodeId,
    /// Frequency the oscillator is ramping towards.
    pub target_hz: f32,
}

/// The five running voices of one engine-sound session.
#[derive(Clone, Debug)]
pub struct VoiceBank {
    voices: Vec<Voice>,
}

impl VoiceBank {
    pub fn voices(&self) -> &[Voice] {
        &self.voices
    }

    fn nodes(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.voices
            .iter()
            .flat_map(|v| [v.oscillator, v.filter, v.gain])
    }
}

struct Transient {
    nodes: SmallVec<[NodeId; 3]>,
    expires_at: f64,
}

/// Timing of a scheduled startup sound, on the audio clock.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StartupPlayback {
    pub started_at: f64,
    pub finishes_at: f64,
}

pub struct EngineSynth<P: AudioPlatform> {
    platform: P,
    graph: Option<P::Graph>,
    master: Option<NodeId>,
    master_target: f32,
    bank: Option<VoiceBank>,
    fading: Vec<(VoiceBank, f64)>,
    transients: Vec<Transient>,
}

impl<P: AudioPlatform> EngineSynth<P> {
    pub fn new(platform: P) -> Self {
        Self {
            platform,
            graph: None,
            master: None,
            master_target: 0.0,
            bank: None,
            fading: Vec::new(),
            transients: Vec::new(),
        }
    }

    pub fn platform(&self) -> &P {
        &self.platform
    }

    pub fn platform_mut(&mut self) -> &mut P {
        &mut self.platform
    }

    pub fn graph(&self) -> Option<&P::Graph> {
        self.graph.as_ref()
    }

    /// Audio clock of the acquired output.
    pub fn current_time(&self) -> Option<f64> {
        self.graph.as_ref().map(|g| g.current_time())
    }

    pub fn master(&self) -> Option<NodeId> {
        self.master
    }

    /// Level the master gain is ramping towards.
    pub fn master_target(&self) -> f32 {
        self.master_target
    }

    pub fn voice_bank(&self) -> Option<&VoiceBank> {
        self.bank.as_ref()
    }

    pub fn is_playing(&self) -> bool {
        self.bank.is_some()
    }

    /// Acquire the audio output and a silent master gain. Idempotent; a
    /// suspended output is resumed rather than treated as a failure.
    pub fn initialize(&mut self) -> Result<(), AudioError> {
        if let Some(graph) = self.graph.as_mut() {
            if graph.state() == ContextState::Suspended {
                log::info!("[audio] resuming suspended output");
                graph.resume()?;
            }
            return Ok(());
        }
        let mut graph = self.platform.acquire().map_err(|e| {
            log::warn!("[audio] output unavailable: {e}");
            e
        })?;
        let master = graph.create_gain(0.0)?;
        let destination = graph.destination();
        graph.connect(master, destination)?;
        if graph.state() == ContextState::Suspended {
            log::info!("[audio] output suspended, resuming");
            graph.resume()?;
        }
        log::info!("[audio] output ready at t={:.3}", graph.current_time());
        self.graph = Some(graph);
        self.master = Some(master);
        self.master_target = 0.0;
        Ok(())
    }

    /// Schedule the full startup sound and bring up the voice bank.
    ///
    /// Returns as soon as everything is scheduled; the sound itself runs for
    /// [`STARTUP_DURATION_SEC`] on the audio clock. Fails only if the audio
    /// output cannot be acquired or the graph rejects a node.
    pub fn play_startup(&mut self) -> Result<StartupPlayback, AudioError> {
        self.initialize()?;
        let (Some(graph), Some(master)) = (self.graph.as_mut(), self.master) else {
            return Err(AudioError::Closed);
        };
        let now = graph.current_time();

        // Starter motor whine with two failed catches.
        let (starter, starter_filter, starter_gain) =
            chain(graph, Waveform::Saw, 200.0, FilterKind::Lowpass, 800.0, 0.0)?;
        for ev in [
            Automation::set(0.0, now),
            Automation::linear(0.15, now + 0.1),
            Automation::linear(0.2, now + 1.0),
            Automation::linear(0.05, now + 1.2),
            Automation::linear(0.2, now + 1.5),
            Automation::linear(0.0, now + 2.5),
        ] {
            graph.automate(starter_gain, Param::Gain, ev)?;
        }
        for ev in [
            Automation::set(150.0, now),
            Automation::linear(300.0, now + 0.5),
            Automation::linear(350.0, now + 1.0),
            Automation::linear(100.0, now + IGNITION_POP_SEC),
        ] {
            graph.automate(starter, Param::Frequency, ev)?;
        }
        graph.start(starter, now)?;
        graph.stop(starter, now + STARTER_STOP_SEC)?;

        // Ignition pop: fast attack, exponential decay.
        let (pop, pop_filter, pop_gain) =
            chain(graph, Waveform::Square, 50.0, FilterKind::Lowpass, 300.0, 0.0)?;
        for ev in [
            Automation::set(0.0, now + IGNITION_POP_SEC),
            Automation::linear(0.4, now + IGNITION_POP_PEAK_SEC),
            Automation::exponential(0.01, now + IGNITION_POP_DECAY_SEC),
        ] {
            graph.automate(pop_gain, Param::Gain, ev)?;
        }
        graph.start(pop, now + IGNITION_POP_SEC)?;
        graph.stop(pop, now + STARTER_STOP_SEC)?;

        self.transients.push(Transient {
            nodes: SmallVec::from_slice(&[starter, starter_filter, starter_gain]),
            expires_at: now + STARTER_STOP_SEC,
        });
        self.transients.push(Transient {
            nodes: SmallVec::from_slice(&[pop, pop_filter, pop_gain]),
            expires_at: now + STARTER_STOP_SEC,
        });

        // Engine catches: voices start, master fades in, first rev, idle settle.
        let bank = build_bank(graph, master)?;
        let voices_at = now + VOICES_START_SEC;
        for v in &bank.voices {
            graph.start(v.oscillator, voices_at)?;
        }
        graph.automate(master, Param::Gain, Automation::set(0.0, voices_at))?;
        graph.automate(
            master,
            Param::Gain,
            Automation::linear(MASTER_FADE_IN_PEAK, now + MASTER_FADE_IN_END_SEC),
        )?;
        let rev_curves: [(NodeId, Param, [f32; 4]); 2] = [
            (bank.voices[0].oscillator, Param::Frequency, [25.0, 50.0, 35.0, 20.0]),
            (bank.voices[1].oscillator, Param::Frequency, [50.0, 100.0, 70.0, 40.0]),
        ];
        for (node, param, [start, peak, fall, settle]) in rev_curves {
            graph.automate(node, param, Automation::set(start, now + REV_START_SEC))?;
            graph.automate(node, param, Automation::linear(peak, now + REV_PEAK_SEC))?;
            graph.automate(node, param, Automation::linear(fall, now + REV_FALL_SEC))?;
            graph.automate(node, param, Automation::linear(settle, now + STARTUP_DURATION_SEC))?;
        }
        let thump_filter = bank.voices[0].filter;
        for ev in [
            Automation::set(150.0, now + REV_START_SEC),
            Automation::linear(400.0, now + REV_PEAK_SEC),
            Automation::linear(150.0, now + STARTUP_DURATION_SEC),
        ] {
            graph.automate(thump_filter, Param::Frequency, ev)?;
        }
        graph.automate(
            master,
            Param::Gain,
            Automation::linear(IDLE_MASTER_GAIN, now + STARTUP_DURATION_SEC),
        )?;
        self.master_target = IDLE_MASTER_GAIN;

        if let Some(previous) = self.bank.replace(bank) {
            log::warn!("[audio] startup replaced a live voice bank");
            retire(graph, previous, now, &mut self.fading)?;
        }
        log::info!("[audio] startup scheduled at t={now:.3}");
        Ok(StartupPlayback {
            started_at: now,
            finishes_at: now + STARTUP_DURATION_SEC,
        })
    }

    /// Retune the voice bank for `rpm`. Silently does nothing when no bank is
    /// live, since RPM updates can race with `stop`/`teardown`.
    pub fn set_rpm(&mut self, rpm: f32) -> Result<(), AudioError> {
        let (Some(graph), Some(master), Some(bank)) =
            (self.graph.as_mut(), self.master, self.bank.as_mut())
        else {
            return Ok(());
        };
        let at = graph.current_time() + RPM_RAMP_SEC;
        let base = firing_frequency(rpm);
        for v in bank.voices.iter_mut() {
            let target = base * v.spec.multiplier;
            graph.automate(v.oscillator, Param::Frequency, Automation::linear(target, at))?;
            v.target_hz = target;
        }
        graph.automate(
            bank.voices[0].filter,
            Param::Frequency,
            Automation::linear(thump_cutoff_for(rpm), at),
        )?;
        let level = master_gain_for(rpm);
        graph.automate(master, Param::Gain, Automation::linear(level, at))?;
        self.master_target = level;
        Ok(())
    }

    /// One-shot throttle blip on top of whatever is playing.
    pub fn play_rev(&mut self) -> Result<(), AudioError> {
        self.initialize()?;
        let Some(graph) = self.graph.as_mut() else {
            return Err(AudioError::Closed);
        };
        let now = graph.current_time();
        let (osc, filter, gain) =
            chain(graph, Waveform::Saw, 30.0, FilterKind::Lowpass, 200.0, 0.0)?;
        let curves: [(NodeId, Param, [f32; 3]); 3] = [
            (gain, Param::Gain, [0.2, 0.35, 0.01]),
            (osc, Param::Frequency, [30.0, 80.0, 25.0]),
            (filter, Param::Frequency, [200.0, 600.0, 150.0]),
        ];
        for (node, param, [start, peak, end]) in curves {
            graph.automate(node, param, Automation::set(start, now))?;
            graph.automate(node, param, Automation::linear(peak, now + 0.15))?;
            let tail = if param == Param::Gain {
                Automation::exponential(end, now + 0.5)
            } else {
                Automation::linear(end, now + 0.5)
            };
            graph.automate(node, param, tail)?;
        }
        graph.start(osc, now)?;
        graph.stop(osc, now + 0.6)?;
        self.transients.push(Transient {
            nodes: SmallVec::from_slice(&[osc, filter, gain]),
            expires_at: now + 0.6,
        });
        Ok(())
    }

    /// Fade the engine out and release the voices once the fade has run.
    /// Does nothing when no voice bank is live.
    pub fn stop(&mut self) -> Result<(), AudioError> {
        let (Some(graph), Some(master)) = (self.graph.as_mut(), self.master) else {
            return Ok(());
        };
        let Some(bank) = self.bank.take() else {
            return Ok(());
        };
        let now = graph.current_time();
        graph.automate(master, Param::Gain, Automation::linear(0.0, now + STOP_FADE_SEC))?;
        self.master_target = 0.0;
        retire(graph, bank, now + STOP_FADE_SEC, &mut self.fading)?;
        log::info!("[audio] engine stopping, fade ends at t={:.3}", now + STOP_FADE_SEC);
        Ok(())
    }

    /// Release nodes whose scheduled end has passed on the audio clock.
    pub fn poll(&mut self) {
        let Some(graph) = self.graph.as_mut() else {
            return;
        };
        let now = graph.current_time();
        self.transients.retain(|t| {
            if t.expires_at <= now {
                for n in &t.nodes {
                    graph.release(*n);
                }
                false
            } else {
                true
            }
        });
        self.fading.retain(|(bank, until)| {
            if *until <= now {
                for n in bank.nodes() {
                    graph.release(n);
                }
                log::debug!("[audio] released faded voice bank");
                false
            } else {
                true
            }
        });
    }

    /// Release every node and hand the audio output back. Safe to repeat.
    pub fn teardown(&mut self) {
        let Some(mut graph) = self.graph.take() else {
            return;
        };
        let banks = self.bank.take().into_iter().chain(self.fading.drain(..).map(|(b, _)| b));
        for bank in banks {
            for n in bank.nodes() {
                graph.release(n);
            }
        }
        for t in self.transients.drain(..) {
            for n in t.nodes {
                graph.release(n);
            }
        }
        if let Some(master) = self.master.take() {
            graph.release(master);
        }
        graph.close();
        self.master_target = 0.0;
        log::info!("[audio] torn down");
    }
}

// osc -> filter -> gain -> destination, filter Q at the WebAudio default of 1.
fn chain<G: AudioGraph>(
    graph: &mut G,
    waveform: Waveform,
    frequency: f32,
    filter: FilterKind,
    cutoff: f32,
    gain: f32,
) -> Result<(NodeId, NodeId, NodeId), AudioError> {
    let osc = graph.create_oscillator(waveform, frequency)?;
    let f = graph.create_filter(filter, cutoff, 1.0)?;
    let g = graph.create_gain(gain)?;
    let destination = graph.destination();
    graph.connect(osc, f)?;
    graph.connect(f, g)?;
    graph.connect(g, destination)?;
    Ok((osc, f, g))
}

fn build_bank<G: AudioGraph>(graph: &mut G, master: NodeId) -> Result<VoiceBank, AudioError> {
    let base = firing_frequency(IDLE_RPM);
    let mut voices = Vec::with_capacity(VOICE_TABLE.len());
    for spec in VOICE_TABLE {
        let hz = base * spec.multiplier;
        let oscillator = graph.create_oscillator(spec.waveform, hz)?;
        let filter = graph.create_filter(spec.filter, spec.cutoff_hz, spec.q)?;
        let gain = graph.create_gain(spec.gain)?;
        graph.connect(oscillator, filter)?;
        graph.connect(filter, gain)?;
        graph.connect(gain, master)?;
        voices.push(Voice {
            spec,
            oscillator,
            filter,
            gain,
            target_hz: hz,
        });
    }
    Ok(VoiceBank { voices })
}

fn retire<G: AudioGraph>(
    graph: &mut G,
    bank: VoiceBank,
    at: f64,
    fading: &mut Vec<(VoiceBank, f64)>,
) -> Result<(), AudioError> {
    for v in &bank.voices {
        graph.stop(v.oscillator, at)?;
    }
    fading.push((bank, at));
    Ok(())
}
