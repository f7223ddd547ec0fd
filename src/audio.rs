//! WebAudio implementation of the audio graph seam.

use bike_core::{
    AudioError, AudioGraph, AudioPlatform, Automation, ContextState, FilterKind, NodeId, Param,
    Waveform,
};
use fnv::FnvHashMap;
use wasm_bindgen::JsValue;
use web_sys as web;

fn graph_err(what: &str, e: JsValue) -> AudioError {
    AudioError::Graph(format!("{what}: {e:?}"))
}

enum WebNode {
    Destination(web::AudioDestinationNode),
    Oscillator(web::OscillatorNode),
    Gain(web::GainNode),
    Filter(web::BiquadFilterNode),
}

impl WebNode {
    fn audio_node(&self) -> &web::AudioNode {
        match self {
            WebNode::Destination(n) => n.as_ref(),
            WebNode::Oscillator(n) => n.as_ref(),
            WebNode::Gain(n) => n.as_ref(),
            WebNode::Filter(n) => n.as_ref(),
        }
    }

    fn param(&self, param: Param) -> Option<web::AudioParam> {
        match (self, param) {
            (WebNode::Oscillator(n), Param::Frequency) => Some(n.frequency()),
            (WebNode::Gain(n), Param::Gain) => Some(n.gain()),
            (WebNode::Filter(n), Param::Frequency) => Some(n.frequency()),
            (WebNode::Filter(n), Param::Q) => Some(n.q()),
            _ => None,
        }
    }
}

/// Creates one `AudioContext` per acquisition. Must be called from a user
/// gesture or the browser keeps the context suspended.
#[derive(Default)]
pub struct WebAudioPlatform;

impl AudioPlatform for WebAudioPlatform {
    type Graph = WebAudioGraph;

    fn acquire(&mut self) -> Result<WebAudioGraph, AudioError> {
        let ctx = web::AudioContext::new()
            .map_err(|e| AudioError::ResourceDenied(format!("{e:?}")))?;
        log::info!("[audio] context at {} Hz", ctx.sample_rate());
        Ok(WebAudioGraph::new(ctx))
    }
}

pub struct WebAudioGraph {
    ctx: web::AudioContext,
    nodes: FnvHashMap<NodeId, WebNode>,
    next_id: u32,
    destination: NodeId,
    closed: bool,
}

impl WebAudioGraph {
    fn new(ctx: web::AudioContext) -> Self {
        let destination = NodeId(0);
        let mut nodes = FnvHashMap::default();
        nodes.insert(destination, WebNode::Destination(ctx.destination()));
        Self {
            ctx,
            nodes,
            next_id: 1,
            destination,
            closed: false,
        }
    }

    fn insert(&mut self, node: WebNode) -> NodeId {
        let id = NodeId(self.next_id);
        self.next_id += 1;
        self.nodes.insert(id, node);
        id
    }

    fn node(&self, id: NodeId) -> Result<&WebNode, AudioError> {
        if self.closed {
            return Err(AudioError::Closed);
        }
        self.nodes.get(&id).ok_or(AudioError::UnknownNode(id))
    }

    fn oscillator(&self, id: NodeId) -> Result<&web::OscillatorNode, AudioError> {
        match self.node(id)? {
            WebNode::Oscillator(o) => Ok(o),
            _ => Err(AudioError::Graph(format!("{id} is not an oscillator"))),
        }
    }

    fn ensure_open(&self) -> Result<(), AudioError> {
        if self.closed {
            Err(AudioError::Closed)
        } else {
            Ok(())
        }
    }
}

impl AudioGraph for WebAudioGraph {
    fn state(&self) -> ContextState {
        if self.closed {
            return ContextState::Closed;
        }
        match self.ctx.state() {
            web::AudioContextState::Running => ContextState::Running,
            web::AudioContextState::Closed => ContextState::Closed,
            _ => ContextState::Suspended,
        }
    }

    fn resume(&mut self) -> Result<(), AudioError> {
        self.ensure_open()?;
        // The promise settles later; the synthesizer re-checks state on poll.
        self.ctx.resume().map(|_| ()).map_err(|e| graph_err("resume", e))
    }

    #[allow(deprecated)]
    fn close(&mut self) {
        if self.closed {
            return;
        }
        for node in self.nodes.values() {
            if let WebNode::Oscillator(o) = node {
                let _ = o.stop();
            }
            let _ = node.audio_node().disconnect();
        }
        self.nodes.clear();
        if let Err(e) = self.ctx.close() {
            log::warn!("[audio] close failed: {e:?}");
        }
        self.closed = true;
    }

    fn current_time(&self) -> f64 {
        self.ctx.current_time()
    }

    fn destination(&self) -> NodeId {
        self.destination
    }

    fn create_oscillator(
        &mut self,
        waveform: Waveform,
        frequency: f32,
    ) -> Result<NodeId, AudioError> {
        self.ensure_open()?;
        let osc = web::OscillatorNode::new(&self.ctx).map_err(|e| graph_err("oscillator", e))?;
        osc.set_type(match waveform {
            Waveform::Sine => web::OscillatorType::Sine,
            Waveform::Square => web::OscillatorType::Square,
            Waveform::Saw => web::OscillatorType::Sawtooth,
            Waveform::Triangle => web::OscillatorType::Triangle,
        });
        osc.frequency().set_value(frequency);
        Ok(self.insert(WebNode::Oscillator(osc)))
    }

    fn create_gain(&mut self, gain: f32) -> Result<NodeId, AudioError> {
        self.ensure_open()?;
        let node = web::GainNode::new(&self.ctx).map_err(|e| graph_err("gain", e))?;
        node.gain().set_value(gain);
        Ok(self.insert(WebNode::Gain(node)))
    }

    fn create_filter(
        &mut self,
        kind: FilterKind,
        frequency: f32,
        q: f32,
    ) -> Result<NodeId, AudioError> {
        self.ensure_open()?;
        let node = web::BiquadFilterNode::new(&self.ctx).map_err(|e| graph_err("filter", e))?;
        node.set_type(match kind {
            FilterKind::Lowpass => web::BiquadFilterType::Lowpass,
            FilterKind::Highpass => web::BiquadFilterType::Highpass,
            FilterKind::Bandpass => web::BiquadFilterType::Bandpass,
        });
        node.frequency().set_value(frequency);
        node.q().set_value(q);
        Ok(self.insert(WebNode::Filter(node)))
    }

    fn connect(&mut self, from: NodeId, to: NodeId) -> Result<(), AudioError> {
        let src = self.node(from)?.audio_node();
        let dst = self.node(to)?.audio_node();
        src.connect_with_audio_node(dst)
            .map(|_| ())
            .map_err(|e| graph_err("connect", e))
    }

    fn automate(
        &mut self,
        node: NodeId,
        param: Param,
        event: Automation,
    ) -> Result<(), AudioError> {
        let p = self
            .node(node)?
            .param(param)
            .ok_or_else(|| AudioError::Graph(format!("{node} has no {param:?} param")))?;
        let res = match event {
            Automation::SetValueAtTime { value, time } => p.set_value_at_time(value, time),
            Automation::LinearRampToValueAtTime { value, time } => {
                p.linear_ramp_to_value_at_time(value, time)
            }
            Automation::ExponentialRampToValueAtTime { value, time } => {
                p.exponential_ramp_to_value_at_time(value, time)
            }
        };
        res.map(|_| ()).map_err(|e| graph_err("automate", e))
    }

    #[allow(deprecated)]
    fn start(&mut self, node: NodeId, when: f64) -> Result<(), AudioError> {
        self.oscillator(node)?
            .start_with_when(when)
            .map_err(|e| graph_err("start", e))
    }

    #[allow(deprecated)]
    fn stop(&mut self, node: NodeId, when: f64) -> Result<(), AudioError> {
        self.oscillator(node)?
            .stop_with_when(when)
            .map_err(|e| graph_err("stop", e))
    }

    fn release(&mut self, node: NodeId) {
        if node == self.destination {
            return;
        }
        if let Some(n) = self.nodes.remove(&node) {
            let _ = n.audio_node().disconnect();
        }
    }
}

impl Drop for WebAudioGraph {
    fn drop(&mut self) {
        self.close();
    }
}
