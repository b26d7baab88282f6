//! Compiled pipeline operations.
//!
//! Each operation is bound to one engine endpoint and carries only the state
//! it needs to move data: the resolved handle, channel offsets, an owned
//! scratch buffer or the parameter probe. Operations are created once by the
//! pipeline builder and then run for every sub-block.
//!
//! - [`PreRenderOperation`] - host → engine, run before each advance
//! - [`PostRenderOperation`] - engine → host, run after each advance

use blockwire_core::{
    Engine, EndpointHandle, MidiEvent, PrimitiveType, StreamFrames, Value,
};

use crate::block_splitter::RenderContext;
use crate::interleave::{copy_intersection_and_clear_outside, InterleavedBuffer};

/// Zero-argument probe returning a parameter's new value if it changed since
/// the last call.
pub type ParameterProbe = Box<dyn FnMut() -> Option<f32> + Send>;

/// Observer for output events that have no dedicated consumer.
///
/// Receives the absolute frame time (frames since the pipeline was built),
/// the endpoint name and the event.
pub type HandleUnusedEventFn = Box<dyn FnMut(u64, &str, &Value) + Send>;

/// Category of a compiled operation, used for diagnostics and summaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationKind {
    EventParameter,
    StreamParameter,
    ValueParameter,
    MidiInput,
    MonoAudioInput,
    InterleavedAudioInput,
    MidiOutput,
    AudioOutput,
    UnusedEvents,
}

/// A parameter endpoint paired with the probe that reports its changes.
pub struct ParameterInput {
    handle: EndpointHandle,
    value_type: PrimitiveType,
    probe: ParameterProbe,
}

impl ParameterInput {
    pub fn new(handle: EndpointHandle, value_type: PrimitiveType, probe: ParameterProbe) -> Self {
        Self {
            handle,
            value_type,
            probe,
        }
    }

    /// Ask the probe for a new value, converted to the endpoint's type.
    #[inline]
    fn poll(&mut self) -> Option<Value> {
        (self.probe)().map(|value| Value::from_parameter(value, self.value_type))
    }
}

/// Operation applied before each engine advance.
pub enum PreRenderOperation {
    /// Push one event per changed value.
    EventParameter(ParameterInput),
    /// Ramp a sparse stream to each changed value.
    StreamParameter {
        input: ParameterInput,
        ramp_frames: u32,
    },
    /// Set a value endpoint directly, unramped.
    ValueParameter(ParameterInput),
    /// Forward the sub-block's inbound MIDI as typed events.
    MidiInput { handle: EndpointHandle },
    /// Hand the engine the host's channel slice without copying.
    MonoAudioInput {
        handle: EndpointHandle,
        start_channel: usize,
    },
    /// Interleave a host channel range into owned scratch first.
    InterleavedAudioInput {
        handle: EndpointHandle,
        start_channel: usize,
        interleaved: InterleavedBuffer,
    },
}

impl PreRenderOperation {
    pub fn kind(&self) -> OperationKind {
        match self {
            Self::EventParameter(_) => OperationKind::EventParameter,
            Self::StreamParameter { .. } => OperationKind::StreamParameter,
            Self::ValueParameter(_) => OperationKind::ValueParameter,
            Self::MidiInput { .. } => OperationKind::MidiInput,
            Self::MonoAudioInput { .. } => OperationKind::MonoAudioInput,
            Self::InterleavedAudioInput { .. } => OperationKind::InterleavedAudioInput,
        }
    }

    pub fn run<E: Engine + ?Sized>(&mut self, engine: &mut E, rc: &RenderContext<'_, '_, '_>) {
        match self {
            Self::EventParameter(input) => {
                if let Some(value) = input.poll() {
                    engine.add_input_event(input.handle, &value);
                }
            }
            Self::StreamParameter { input, ramp_frames } => {
                if let Some(value) = input.poll() {
                    engine.set_sparse_input_stream_target(input.handle, &value, *ramp_frames, 0.0);
                }
            }
            Self::ValueParameter(input) => {
                if let Some(value) = input.poll() {
                    engine.set_input_value(input.handle, &value);
                }
            }
            Self::MidiInput { handle } => {
                for event in rc.midi_in {
                    engine.add_input_event(*handle, &Value::Midi(event.message));
                }
            }
            Self::MonoAudioInput {
                handle,
                start_channel,
            } => {
                let samples = rc.input_channels.channel(*start_channel);
                engine.set_next_input_stream_frames(*handle, StreamFrames::Mono(samples));
            }
            Self::InterleavedAudioInput {
                handle,
                start_channel,
                interleaved,
            } => {
                let frames = interleaved.interleave_from(&rc.input_channels, *start_channel);
                engine.set_next_input_stream_frames(*handle, frames);
            }
        }
    }
}

/// Operation applied after each engine advance.
pub enum PostRenderOperation {
    /// Drain MIDI output into the host's outbound buffer.
    MidiOutput { handle: EndpointHandle },
    /// Copy produced audio into the host channel range.
    AudioOutput {
        handle: EndpointHandle,
        start_channel: usize,
        num_channels: usize,
    },
    /// Drain events nobody consumes and show them to the observer.
    UnusedEvents {
        handle: EndpointHandle,
        endpoint_name: String,
    },
}

impl PostRenderOperation {
    pub fn kind(&self) -> OperationKind {
        match self {
            Self::MidiOutput { .. } => OperationKind::MidiOutput,
            Self::AudioOutput { .. } => OperationKind::AudioOutput,
            Self::UnusedEvents { .. } => OperationKind::UnusedEvents,
        }
    }

    pub fn run<E: Engine + ?Sized>(
        &mut self,
        engine: &mut E,
        rc: &mut RenderContext<'_, '_, '_>,
        unused_event_handler: Option<&mut HandleUnusedEventFn>,
    ) {
        match self {
            Self::MidiOutput { handle } => {
                let frame_offset = rc.frame_offset;
                let midi_out = &mut *rc.midi_out;

                // Keep draining when full so the engine's queue is emptied;
                // the writer counts what it drops.
                engine.iterate_output_events(*handle, &mut |offset, event| {
                    if let Some(packed) = event.midi_bytes() {
                        midi_out.push(MidiEvent::from_packed_midi_data(frame_offset + offset, packed));
                    }
                    true
                });
            }
            Self::AudioOutput {
                handle,
                start_channel,
                num_channels,
            } => {
                let produced = engine.output_stream_frames(*handle);
                copy_intersection_and_clear_outside(
                    &mut rc.output_channels,
                    *start_channel,
                    *num_channels,
                    produced,
                );
            }
            Self::UnusedEvents {
                handle,
                endpoint_name,
            } => {
                let Some(observer) = unused_event_handler else {
                    return;
                };
                let time_base = rc.total_frames_rendered;
                let name = endpoint_name.as_str();

                engine.iterate_output_events(*handle, &mut |offset, event| {
                    observer(time_base + offset as u64, name, event);
                    true
                });
            }
        }
    }
}
