//! Platform audio output seam.
//!
//! The synthesizer only ever talks to an [`AudioGraph`]: create oscillator,
//! gain and filter primitives, connect them, and automate their parameters at
//! absolute audio-clock times. The web frontend implements this over WebAudio,
//! the native frontend and the tests use [`crate::soft::SoftwarePlatform`].

use crate::automation::Automation;
use std::fmt;
use thiserror::Error;

/// Opaque handle to a node inside one audio graph.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u32);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "node#{}", self.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Waveform {
    Sine,
    Square,
    Saw,
    Triangle,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FilterKind {
    Lowpass,
    Highpass,
    Bandpass,
}

/// Automatable parameter of a node.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Param {
    /// Oscillator pitch or filter cutoff/center, in Hz.
    Frequency,
    Gain,
    Q,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ContextState {
    Running,
    /// Autoplay policy holds the output until a user gesture; resumable.
    Suspended,
    Closed,
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum AudioError {
    /// The platform refused an audio output (e.g. autoplay policy before a gesture).
    #[error("audio output denied: {0}")]
    ResourceDenied(String),
    #[error("audio graph error: {0}")]
    Graph(String),
    #[error("unknown audio {0}")]
    UnknownNode(NodeId),
    #[error("audio graph is closed")]
    Closed,
}

/// Acquires the platform audio output. Called at most once per synthesizer.
pub trait AudioPlatform {
    type Graph: AudioGraph;

    fn acquire(&mut self) -> Result<Self::Graph, AudioError>;
}

/// An audio output plus the node graph feeding it.
pub trait AudioGraph {
    fn state(&self) -> ContextState;

    /// Ask the platform to resume a suspended output. May complete later.
    fn resume(&mut self) -> Result<(), AudioError>;

    /// Stop every node and give the output back to the platform.
    fn close(&mut self);

    /// Audio clock in seconds.
    fn current_time(&self) -> f64;

    /// The output sink every chain ultimately connects to.
    fn destination(&self) -> NodeId;

    fn create_oscillator(&mut self, waveform: Waveform, frequency: f32)
        -> Result<NodeId, AudioError>;

    fn create_gain(&mut self, gain: f32) -> Result<NodeId, AudioError>;

    fn create_filter(
        &mut self,
        kind: FilterKind,
        frequency: f32,
        q: f32,
    ) -> Result<NodeId, AudioError>;

    fn connect(&mut self, from: NodeId, to: NodeId) -> Result<(), AudioError>;

    fn automate(&mut self, node: NodeId, param: Param, event: Automation)
        -> Result<(), AudioError>;

    /// Schedule an oscillator to start at audio time `when`.
    fn start(&mut self, node: NodeId, when: f64) -> Result<(), AudioError>;

    /// Schedule an oscillator to stop at audio time `when`.
    fn stop(&mut self, node: NodeId, when: f64) -> Result<(), AudioError>;

    /// Disconnect and forget a node. Unknown nodes are ignored.
    fn release(&mut self, node: NodeId);
}
