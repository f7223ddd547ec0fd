//! Parameter automation with WebAudio `AudioParam` semantics.
//!
//! The engine synthesizer expresses everything it does to the audio graph as
//! timed [`Automation`] events. The web frontend forwards them to real
//! `AudioParam`s; the software graph evaluates them with [`ParamTimeline`].

/// One scheduled change of an audio parameter. Times are absolute seconds on
/// the audio clock.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Automation {
    SetValueAtTime { value: f32, time: f64 },
    LinearRampToValueAtTime { value: f32, time: f64 },
    /// Geometric interpolation; used for decays so gain never jumps to zero.
    ExponentialRampToValueAtTime { value: f32, time: f64 },
}

impl Automation {
    #[inline]
    pub fn set(value: f32, time: f64) -> Self {
        Automation::SetValueAtTime { value, time }
    }

    #[inline]
    pub fn linear(value: f32, time: f64) -> Self {
        Automation::LinearRampToValueAtTime { value, time }
    }

    #[inline]
    pub fn exponential(value: f32, time: f64) -> Self {
        Automation::ExponentialRampToValueAtTime { value, time }
    }

    #[inline]
    pub fn time(&self) -> f64 {
        match *self {
            Automation::SetValueAtTime { time, .. }
            | Automation::LinearRampToValueAtTime { time, .. }
            | Automation::ExponentialRampToValueAtTime { time, .. } => time,
        }
    }

    #[inline]
    pub fn value(&self) -> f32 {
        match *self {
            Automation::SetValueAtTime { value, .. }
            | Automation::LinearRampToValueAtTime { value, .. }
            | Automation::ExponentialRampToValueAtTime { value, .. } => value,
        }
    }

    #[inline]
    pub fn is_ramp(&self) -> bool {
        !matches!(self, Automation::SetValueAtTime { .. })
    }
}

#[derive(Clone, Copy, Debug)]
struct Scheduled {
    event: Automation,
    // Audio time when the event was scheduled; a ramp with no earlier event
    // starts here.
    anchor: f64,
}

/// Time-ordered automation events for a single parameter.
#[derive(Clone, Debug)]
pub struct ParamTimeline {
    default: f32,
    events: Vec<Scheduled>,
}

impl ParamTimeline {
    pub fn new(default: f32) -> Self {
        Self {
            default,
            events: Vec::new(),
        }
    }

    /// Insert an event scheduled at audio time `now`. Events sharing a time
    /// keep their insertion order.
    pub fn schedule(&mut self, event: Automation, now: f64) {
        let at = event.time();
        let idx = self.events.partition_point(|e| e.event.time() <= at);
        self.events.insert(idx, Scheduled { event, anchor: now });
    }

    /// Parameter value at audio time `t`.
    pub fn value_at(&self, t: f64) -> f32 {
        let idx = self.events.partition_point(|e| e.event.time() <= t);
        if let Some(next) = self.events.get(idx) {
            if next.event.is_ramp() {
                let (t0, v0) = match idx.checked_sub(1).and_then(|i| self.events.get(i)) {
                    Some(prev) => (prev.event.time(), prev.event.value()),
                    None => (next.anchor, self.default),
                };
                return interpolate(next.event, t0, v0, t);
            }
        }
        match idx.checked_sub(1).and_then(|i| self.events.get(i)) {
            Some(prev) => prev.event.value(),
            None => self.default,
        }
    }

    /// Value the parameter settles at once every scheduled event has run.
    pub fn final_value(&self) -> f32 {
        self.events
            .last()
            .map(|e| e.event.value())
            .unwrap_or(self.default)
    }

    /// Drop events that can no longer influence values at or after `t`.
    /// The most recent past event is kept as the start point of any pending ramp.
    pub fn prune(&mut self, t: f64) {
        let idx = self.events.partition_point(|e| e.event.time() <= t);
        if idx > 1 {
            self.events.drain(..idx - 1);
        }
    }

    #[inline]
    pub fn pending(&self) -> usize {
        self.events.len()
    }
}

fn interpolate(ramp: Automation, t0: f64, v0: f32, t: f64) -> f32 {
    let t1 = ramp.time();
    let v1 = ramp.value();
    let span = t1 - t0;
    if span <= 0.0 || t < t0 {
        return v0;
    }
    let x = ((t - t0) / span).clamp(0.0, 1.0) as f32;
    match ramp {
        Automation::LinearRampToValueAtTime { .. } => v0 + (v1 - v0) * x,
        Automation::ExponentialRampToValueAtTime { .. } => {
            // Undefined through or at zero: hold the start value until the end.
            if v0 <= 0.0 || v1 <= 0.0 {
                v0
            } else {
                v0 * (v1 / v0).powf(x)
            }
        }
        Automation::SetValueAtTime { .. } => v0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn linear_ramp_starts_from_previous_event() {
        let mut p = ParamTimeline::new(0.0);
        p.schedule(Automation::set(0.0, 1.0), 0.0);
        p.schedule(Automation::linear(1.0, 2.0), 0.0);
        assert_eq!(p.value_at(0.5), 0.0);
        assert!((p.value_at(1.5) - 0.5).abs() < 1e-6);
        assert_eq!(p.value_at(3.0), 1.0);
    }

    #[test]
    fn ramp_without_previous_event_starts_at_anchor() {
        let mut p = ParamTimeline::new(20.0);
        p.schedule(Automation::linear(40.0, 1.1), 1.0);
        assert_eq!(p.value_at(0.5), 20.0);
        assert!((p.value_at(1.05) - 30.0).abs() < 1e-3);
        assert_eq!(p.value_at(1.2), 40.0);
    }

    #[test]
    fn exponential_ramp_is_geometric() {
        let mut p = ParamTimeline::new(0.0);
        p.schedule(Automation::set(1.0, 0.0), 0.0);
        p.schedule(Automation::exponential(0.01, 2.0), 0.0);
        assert!((p.value_at(1.0) - 0.1).abs() < 1e-4);
        assert!(p.value_at(1.99) > 0.01);
    }

    #[test]
    fn prune_keeps_ramp_start() {
        let mut p = ParamTimeline::new(0.0);
        p.schedule(Automation::set(0.0, 0.0), 0.0);
        p.schedule(Automation::set(2.0, 1.0), 0.0);
        p.schedule(Automation::linear(4.0, 3.0), 0.0);
        let before = p.value_at(2.0);
        p.prune(2.0);
        assert_eq!(p.pending(), 2);
        assert_eq!(p.value_at(2.0), before);
    }
}
