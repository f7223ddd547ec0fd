// ---------------- Native audio (cpal) ----------------
//
// The engine sound is a `SoftwareGraph`; the output callback pulls samples
// from it, which also drives the graph's audio clock.

use bike_core::SoftwareGraph;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};

pub struct AudioOutput {
    pub graph: SoftwareGraph,
    pub sample_rate: f32,
    // Dropping the stream stops playback.
    _stream: cpal::Stream,
}

/// Open the default output device. `None` when the host has no usable output.
pub fn start_output() -> Option<AudioOutput> {
    let host = cpal::default_host();
    let device = host.default_output_device()?;
    let config = device.default_output_config().ok()?;
    let sample_rate = config.sample_rate().0 as f32;
    let channels = config.channels() as usize;
    let graph = SoftwareGraph::new(sample_rate);

    let err_fn = |err| log::error!("[audio] stream error: {err}");

    let stream = match config.sample_format() {
        cpal::SampleFormat::F32 => {
            build_stream_f32(&device, &config.into(), channels, graph.clone(), err_fn).ok()?
        }
        cpal::SampleFormat::I16 => {
            build_stream_i16(&device, &config.into(), channels, graph.clone(), err_fn).ok()?
        }
        cpal::SampleFormat::U16 => {
            build_stream_u16(&device, &config.into(), channels, graph.clone(), err_fn).ok()?
        }
        other => {
            log::warn!("[audio] unsupported sample format {other:?}");
            return None;
        }
    };

    stream.play().ok()?;
    log::info!("[audio] output at {sample_rate} Hz, {channels} channels");
    Some(AudioOutput {
        graph,
        sample_rate,
        _stream: stream,
    })
}

fn build_stream_f32(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    channels: usize,
    graph: SoftwareGraph,
    err_fn: impl Fn(cpal::StreamError) + Send + 'static,
) -> Result<cpal::Stream, cpal::BuildStreamError> {
    device.build_output_stream(
        config,
        move |data: &mut [f32], _| graph.render(data, channels),
        err_fn,
        None,
    )
}

fn build_stream_i16(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    channels: usize,
    graph: SoftwareGraph,
    err_fn: impl Fn(cpal::StreamError) + Send + 'static,
) -> Result<cpal::Stream, cpal::BuildStreamError> {
    let mut scratch: Vec<f32> = Vec::new();
    device.build_output_stream(
        config,
        move |data: &mut [i16], _| {
            scratch.resize(data.len(), 0.0);
            graph.render(&mut scratch, channels);
            for (out, s) in data.iter_mut().zip(&scratch) {
                *out = (s.clamp(-1.0, 1.0) * i16::MAX as f32) as i16;
            }
        },
        err_fn,
        None,
    )
}

fn build_stream_u16(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    channels: usize,
    graph: SoftwareGraph,
    err_fn: impl Fn(cpal::StreamError) + Send + 'static,
) -> Result<cpal::Stream, cpal::BuildStreamError> {
    let mut scratch: Vec<f32> = Vec::new();
    device.build_output_stream(
        config,
        move |data: &mut [u16], _| {
            scratch.resize(data.len(), 0.0);
            graph.render(&mut scratch, channels);
            for (out, s) in data.iter_mut().zip(&scratch) {
                *out = ((s * 0.5 + 0.5).clamp(0.0, 1.0) * u16::MAX as f32) as u16;
            }
        },
        err_fn,
        None,
    )
}
