//! Pure-Rust audio graph: oscillators, biquad filters and gains evaluated
//! sample by sample with [`ParamTimeline`] automation.
//!
//! The native frontend pulls samples from it inside the cpal callback; tests
//! drive it with [`SoftwareGraph::advance`] to get a deterministic clock.

use crate::audio::{
    AudioError, AudioGraph, AudioPlatform, ContextState, FilterKind, NodeId, Param, Waveform,
};
use crate::automation::{Automation, ParamTimeline};
use smallvec::SmallVec;
use std::f32::consts::{PI, TAU};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

const DESTINATION: NodeId = NodeId(0);

struct Oscillator {
    waveform: Waveform,
    frequency: ParamTimeline,
    phase: f32, // 0..1
    start: Option<f64>,
    stop: Option<f64>,
}

impl Oscillator {
    fn is_active(&self, t: f64) -> bool {
        self.start.is_some_and(|s| t >= s) && self.stop.map_or(true, |s| t < s)
    }

    fn next(&mut self, t: f64, sample_rate: f32) -> f32 {
        if !self.is_active(t) {
            return 0.0;
        }
        let out = wave_sample(self.waveform, self.phase);
        self.phase += self.frequency.value_at(t).max(0.0) / sample_rate;
        self.phase -= self.phase.floor();
        out
    }
}

fn wave_sample(waveform: Waveform, phase: f32) -> f32 {
    match waveform {
        Waveform::Sine => (phase * TAU).sin(),
        Waveform::Square => {
            if phase < 0.5 {
                1.0
            } else {
                -1.0
            }
        }
        Waveform::Saw => 2.0 * phase - 1.0,
        Waveform::Triangle => 1.0 - 4.0 * (phase - 0.5).abs(),
    }
}

/// RBJ cookbook biquad, transposed direct form II.
struct Biquad {
    kind: FilterKind,
    frequency: ParamTimeline,
    q: ParamTimeline,
    coeffs: [f32; 5], // b0 b1 b2 a1 a2, normalized by a0
    z1: f32,
    z2: f32,
    last: (f32, f32),
}

impl Biquad {
    fn new(kind: FilterKind, frequency: f32, q: f32) -> Self {
        Self {
            kind,
            frequency: ParamTimeline::new(frequency),
            q: ParamTimeline::new(q),
            coeffs: [1.0, 0.0, 0.0, 0.0, 0.0],
            z1: 0.0,
            z2: 0.0,
            last: (f32::NAN, f32::NAN),
        }
    }

    fn update(&mut self, frequency: f32, q: f32, sample_rate: f32) {
        if (frequency, q) == self.last {
            return;
        }
        self.last = (frequency, q);
        let f = frequency.clamp(10.0, sample_rate * 0.45);
        let q = q.max(1e-4);
        let w0 = 2.0 * PI * f / sample_rate;
        let (sin, cos) = w0.sin_cos();
        let alpha = sin / (2.0 * q);
        let (b0, b1, b2) = match self.kind {
            FilterKind::Lowpass => ((1.0 - cos) * 0.5, 1.0 - cos, (1.0 - cos) * 0.5),
            FilterKind::Highpass => ((1.0 + cos) * 0.5, -(1.0 + cos), (1.0 + cos) * 0.5),
            FilterKind::Bandpass => (alpha, 0.0, -alpha),
        };
        let a0 = 1.0 + alpha;
        self.coeffs = [b0 / a0, b1 / a0, b2 / a0, (-2.0 * cos) / a0, (1.0 - alpha) / a0];
    }

    fn next(&mut self, x: f32, t: f64, sample_rate: f32) -> f32 {
        let frequency = self.frequency.value_at(t);
        let q = self.q.value_at(t);
        self.update(frequency, q, sample_rate);
        let [b0, b1, b2, a1, a2] = self.coeffs;
        let y = b0 * x + self.z1;
        self.z1 = b1 * x - a1 * y + self.z2;
        self.z2 = b2 * x - a2 * y;
        y
    }
}

enum NodeKind {
    Destination,
    Oscillator(Oscillator),
    Gain(ParamTimeline),
    Filter(Biquad),
}

struct Node {
    kind: NodeKind,
    inputs: SmallVec<[NodeId; 4]>,
}

struct GraphCore {
    sample_rate: f32,
    time: f64,
    state: ContextState,
    nodes: Vec<Option<Node>>,
    outputs: Vec<f32>,
    /// Released slots, reused before the table grows.
    free: Vec<usize>,
    order: Vec<usize>,
    order_dirty: bool,
}

impl GraphCore {
    fn new(sample_rate: f32, state: ContextState) -> Self {
        Self {
            sample_rate,
            time: 0.0,
            state,
            nodes: vec![Some(Node {
                kind: NodeKind::Destination,
                inputs: SmallVec::new(),
            })],
            outputs: vec![0.0],
            free: Vec::new(),
            order: Vec::new(),
            order_dirty: true,
        }
    }

    fn insert(&mut self, kind: NodeKind) -> Result<NodeId, AudioError> {
        if self.state == ContextState::Closed {
            return Err(AudioError::Closed);
        }
        let node = Node {
            kind,
            inputs: SmallVec::new(),
        };
        if let Some(idx) = self.free.pop() {
            self.nodes[idx] = Some(node);
            self.outputs[idx] = 0.0;
            self.order_dirty = true;
            return Ok(NodeId(idx as u32));
        }
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(Some(node));
        self.outputs.push(0.0);
        Ok(id)
    }

    fn node_mut(&mut self, id: NodeId) -> Result<&mut Node, AudioError> {
        self.nodes
            .get_mut(id.0 as usize)
            .and_then(Option::as_mut)
            .ok_or(AudioError::UnknownNode(id))
    }

    fn param_mut(&mut self, id: NodeId, param: Param) -> Result<&mut ParamTimeline, AudioError> {
        let node = self.node_mut(id)?;
        match (&mut node.kind, param) {
            (NodeKind::Oscillator(o), Param::Frequency) => Ok(&mut o.frequency),
            (NodeKind::Gain(g), Param::Gain) => Ok(g),
            (NodeKind::Filter(f), Param::Frequency) => Ok(&mut f.frequency),
            (NodeKind::Filter(f), Param::Q) => Ok(&mut f.q),
            _ => Err(AudioError::Graph(format!("{id} has no {param:?} parameter"))),
        }
    }

    fn param(&self, id: NodeId, param: Param) -> Option<&ParamTimeline> {
        let node = self.nodes.get(id.0 as usize)?.as_ref()?;
        match (&node.kind, param) {
            (NodeKind::Oscillator(o), Param::Frequency) => Some(&o.frequency),
            (NodeKind::Gain(g), Param::Gain) => Some(g),
            (NodeKind::Filter(f), Param::Frequency) => Some(&f.frequency),
            (NodeKind::Filter(f), Param::Q) => Some(&f.q),
            _ => None,
        }
    }

    fn oscillator_mut(&mut self, id: NodeId) -> Result<&mut Oscillator, AudioError> {
        match &mut self.node_mut(id)?.kind {
            NodeKind::Oscillator(o) => Ok(o),
            _ => Err(AudioError::Graph(format!("{id} is not an oscillator"))),
        }
    }

    // Post-order walk from the destination so every node runs after its inputs.
    fn rebuild_order(&mut self) {
        let mut marks = vec![0u8; self.nodes.len()];
        let mut order = Vec::with_capacity(self.nodes.len());
        let mut stack: Vec<(usize, usize)> = vec![(DESTINATION.0 as usize, 0)];
        marks[DESTINATION.0 as usize] = 1;
        while let Some((idx, child)) = stack.pop() {
            let next = self.nodes[idx]
                .as_ref()
                .and_then(|n| n.inputs.get(child).copied());
            match next {
                Some(input) => {
                    stack.push((idx, child + 1));
                    let i = input.0 as usize;
                    if marks.get(i) == Some(&0) && self.nodes[i].is_some() {
                        marks[i] = 1;
                        stack.push((i, 0));
                    }
                }
                None => {
                    marks[idx] = 2;
                    order.push(idx);
                }
            }
        }
        self.order = order;
        self.order_dirty = false;
    }

    fn tick(&mut self) -> f32 {
        if self.order_dirty {
            self.rebuild_order();
        }
        let t = self.time;
        let sr = self.sample_rate;
        for k in 0..self.order.len() {
            let idx = self.order[k];
            let Some(node) = self.nodes[idx].as_mut() else {
                continue;
            };
            let input: f32 = node
                .inputs
                .iter()
                .map(|i| self.outputs.get(i.0 as usize).copied().unwrap_or(0.0))
                .sum();
            let out = match &mut node.kind {
                NodeKind::Destination => input,
                NodeKind::Oscillator(o) => o.next(t, sr),
                NodeKind::Gain(g) => input * g.value_at(t),
                NodeKind::Filter(f) => f.next(input, t, sr),
            };
            self.outputs[idx] = out;
        }
        self.time += 1.0 / sr as f64;
        self.outputs[DESTINATION.0 as usize].tanh()
    }

    fn prune(&mut self) {
        let t = self.time;
        for node in self.nodes.iter_mut().flatten() {
            match &mut node.kind {
                NodeKind::Oscillator(o) => o.frequency.prune(t),
                NodeKind::Gain(g) => g.prune(t),
                NodeKind::Filter(f) => {
                    f.frequency.prune(t);
                    f.q.prune(t);
                }
                NodeKind::Destination => {}
            }
        }
    }
}

/// Shared handle to a software audio graph. Clones refer to the same graph.
#[derive(Clone)]
pub struct SoftwareGraph {
    core: Arc<Mutex<GraphCore>>,
}

impl SoftwareGraph {
    pub fn new(sample_rate: f32) -> Self {
        Self {
            core: Arc::new(Mutex::new(GraphCore::new(
                sample_rate,
                ContextState::Running,
            ))),
        }
    }

    fn core(&self) -> MutexGuard<'_, GraphCore> {
        self.core.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn sample_rate(&self) -> f32 {
        self.core().sample_rate
    }

    /// Fill an interleaved buffer. A suspended or closed graph emits silence
    /// and its clock stands still.
    pub fn render(&self, out: &mut [f32], channels: usize) {
        let channels = channels.max(1);
        let mut core = self.core();
        if core.state != ContextState::Running {
            out.fill(0.0);
            return;
        }
        for frame in out.chunks_mut(channels) {
            let s = core.tick();
            frame.fill(s);
        }
        core.prune();
    }

    /// Run the graph for `seconds` of audio, discarding the output.
    pub fn advance(&self, seconds: f64) {
        let frames = (seconds * self.sample_rate() as f64).round() as usize;
        let mut scratch = [0.0f32; 256];
        let mut left = frames;
        while left > 0 {
            let n = left.min(scratch.len());
            self.render(&mut scratch[..n], 1);
            left -= n;
        }
    }

    /// Current value of a parameter, if the node exists and has it.
    pub fn param_value(&self, node: NodeId, param: Param) -> Option<f32> {
        let core = self.core();
        let t = core.time;
        core.param(node, param).map(|p| p.value_at(t))
    }

    /// Value a parameter reaches once all scheduled automation has run.
    pub fn param_target(&self, node: NodeId, param: Param) -> Option<f32> {
        self.core().param(node, param).map(|p| p.final_value())
    }

    /// Live nodes, excluding the destination.
    pub fn node_count(&self) -> usize {
        self.core().nodes.iter().skip(1).flatten().count()
    }

    /// Allocated node slots, live or free, excluding the destination.
    pub fn slot_count(&self) -> usize {
        self.core().nodes.len() - 1
    }

    pub fn contains(&self, node: NodeId) -> bool {
        matches!(self.core().nodes.get(node.0 as usize), Some(Some(_)))
    }

    /// Start/stop times of an oscillator.
    pub fn schedule_of(&self, node: NodeId) -> Option<(Option<f64>, Option<f64>)> {
        match self.core().nodes.get(node.0 as usize)?.as_ref()?.kind {
            NodeKind::Oscillator(ref o) => Some((o.start, o.stop)),
            _ => None,
        }
    }
}

impl AudioGraph for SoftwareGraph {
    fn state(&self) -> ContextState {
        self.core().state
    }

    fn resume(&mut self) -> Result<(), AudioError> {
        let mut core = self.core();
        match core.state {
            ContextState::Closed => Err(AudioError::Closed),
            _ => {
                core.state = ContextState::Running;
                Ok(())
            }
        }
    }

    fn close(&mut self) {
        let mut core = self.core();
        core.state = ContextState::Closed;
        core.nodes.truncate(1);
        core.outputs.truncate(1);
        core.free.clear();
        if let Some(dest) = core.nodes[0].as_mut() {
            dest.inputs.clear();
        }
        core.order_dirty = true;
    }

    fn current_time(&self) -> f64 {
        self.core().time
    }

    fn destination(&self) -> NodeId {
        DESTINATION
    }

    fn create_oscillator(
        &mut self,
        waveform: Waveform,
        frequency: f32,
    ) -> Result<NodeId, AudioError> {
        self.core().insert(NodeKind::Oscillator(Oscillator {
            waveform,
            frequency: ParamTimeline::new(frequency),
            phase: 0.0,
            start: None,
            stop: None,
        }))
    }

    fn create_gain(&mut self, gain: f32) -> Result<NodeId, AudioError> {
        self.core().insert(NodeKind::Gain(ParamTimeline::new(gain)))
    }

    fn create_filter(
        &mut self,
        kind: FilterKind,
        frequency: f32,
        q: f32,
    ) -> Result<NodeId, AudioError> {
        self.core()
            .insert(NodeKind::Filter(Biquad::new(kind, frequency, q)))
    }

    fn connect(&mut self, from: NodeId, to: NodeId) -> Result<(), AudioError> {
        let mut core = self.core();
        core.node_mut(from)?;
        let target = core.node_mut(to)?;
        if !target.inputs.contains(&from) {
            target.inputs.push(from);
        }
        core.order_dirty = true;
        Ok(())
    }

    fn automate(
        &mut self,
        node: NodeId,
        param: Param,
        event: Automation,
    ) -> Result<(), AudioError> {
        let mut core = self.core();
        let now = core.time;
        core.param_mut(node, param)?.schedule(event, now);
        Ok(())
    }

    fn start(&mut self, node: NodeId, when: f64) -> Result<(), AudioError> {
        let mut core = self.core();
        let osc = core.oscillator_mut(node)?;
        if osc.start.is_some() {
            return Err(AudioError::Graph(format!("{node} already started")));
        }
        osc.start = Some(when);
        Ok(())
    }

    fn stop(&mut self, node: NodeId, when: f64) -> Result<(), AudioError> {
        let mut core = self.core();
        let osc = core.oscillator_mut(node)?;
        osc.stop = Some(osc.stop.map_or(when, |s| s.min(when)));
        Ok(())
    }

    fn release(&mut self, node: NodeId) {
        if node == DESTINATION {
            return;
        }
        let mut core = self.core();
        let idx = node.0 as usize;
        match core.nodes.get_mut(idx) {
            Some(slot) if slot.is_some() => *slot = None,
            _ => return,
        }
        core.free.push(idx);
        for n in core.nodes.iter_mut().flatten() {
            n.inputs.retain(|i| *i != node);
        }
        if let Some(out) = core.outputs.get_mut(idx) {
            *out = 0.0;
        }
        core.order_dirty = true;
    }
}

/// Hands out one [`SoftwareGraph`]; counts how often it was asked.
pub struct SoftwarePlatform {
    graph: SoftwareGraph,
    acquisitions: usize,
    deny: Option<String>,
    start_suspended: bool,
}

impl SoftwarePlatform {
    pub fn new(sample_rate: f32) -> Self {
        Self {
            graph: SoftwareGraph::new(sample_rate),
            acquisitions: 0,
            deny: None,
            start_suspended: false,
        }
    }

    /// Hand out an existing graph, e.g. one already wired to a device callback.
    pub fn with_graph(graph: SoftwareGraph) -> Self {
        Self {
            graph,
            acquisitions: 0,
            deny: None,
            start_suspended: false,
        }
    }

    /// A platform whose output stays locked, as under a strict autoplay policy.
    pub fn denying(sample_rate: f32, reason: &str) -> Self {
        Self {
            deny: Some(reason.to_owned()),
            ..Self::new(sample_rate)
        }
    }

    /// Hand out the graph in the suspended state; the synthesizer must resume it.
    pub fn suspended(mut self) -> Self {
        self.start_suspended = true;
        self
    }

    pub fn allow(&mut self) {
        self.deny = None;
    }

    /// A handle to the graph for rendering or inspection.
    pub fn graph(&self) -> SoftwareGraph {
        self.graph.clone()
    }

    pub fn acquisitions(&self) -> usize {
        self.acquisitions
    }
}

impl AudioPlatform for SoftwarePlatform {
    type Graph = SoftwareGraph;

    fn acquire(&mut self) -> Result<SoftwareGraph, AudioError> {
        if let Some(reason) = &self.deny {
            return Err(AudioError::ResourceDenied(reason.clone()));
        }
        self.acquisitions += 1;
        {
            let mut core = self.graph.core();
            let sr = core.sample_rate;
            if core.state == ContextState::Closed || self.acquisitions == 1 {
                let state = if self.start_suspended {
                    ContextState::Suspended
                } else {
                    ContextState::Running
                };
                *core = GraphCore::new(sr, state);
            }
        }
        Ok(self.graph.clone())
    }
}
