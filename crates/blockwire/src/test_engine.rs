//! Recording engine and endpoint fixtures shared by the unit tests.

use std::collections::HashMap;

use blockwire_core::{
    EndpointDetails, EndpointHandle, EndpointId, Engine, StreamFrames, Value,
};

/// Synth-like engine: MIDI in, three parameters of each kind, stereo audio in
/// and out, MIDI out and a diagnostic event output.
pub const SYNTH_INPUTS: &str = r#"[
    { "id": "midiIn", "name": "midiIn", "direction": "input", "kind": "event",
      "data_types": ["midi"] },
    { "id": "cutoff", "name": "cutoff", "direction": "input", "kind": "event",
      "data_types": [{ "primitive": "float32" }],
      "annotation": { "name": "Cutoff", "min": 20.0, "max": 20000.0 } },
    { "id": "gain", "name": "gain", "direction": "input", "kind": "stream",
      "data_types": [{ "primitive": "float32" }],
      "annotation": { "name": "Gain", "init": 1.0 } },
    { "id": "mode", "name": "mode", "direction": "input", "kind": "value",
      "data_types": [{ "primitive": "int32" }],
      "annotation": { "text": "sine|saw|square" } },
    { "id": "audioIn", "name": "audioIn", "direction": "input", "kind": "stream",
      "data_types": [{ "vector": ["float32", 2] }] }
]"#;

pub const SYNTH_OUTPUTS: &str = r#"[
    { "id": "audioOut", "name": "audioOut", "direction": "output", "kind": "stream",
      "data_types": [{ "vector": ["float32", 2] }] },
    { "id": "midiOut", "name": "midiOut", "direction": "output", "kind": "event",
      "data_types": ["midi"] },
    { "id": "meter", "name": "meter", "direction": "output", "kind": "event",
      "data_types": [{ "primitive": "float32" }] }
]"#;

pub fn endpoints_from_json(json: &str) -> Vec<EndpointDetails> {
    serde_json::from_str(json).expect("valid endpoint fixture")
}

/// What an audio output produces on each advance.
#[derive(Debug, Clone, Copy)]
pub enum OutputSource {
    /// Every sample set to the given value.
    Constant(f32),
    /// A copy of the frames last given to an input stream.
    EchoInput(EndpointHandle),
    /// Only the first `frames` frames, each set to the given value.
    Short(f32, usize),
}

/// One `set_next_input_stream_frames` call.
#[derive(Debug, Clone)]
pub struct StreamInput {
    pub handle: EndpointHandle,
    /// Address of the first sample, for mono inputs.
    pub mono_ptr: Option<usize>,
    pub num_frames: usize,
    pub num_channels: usize,
}

/// An input event or value change, stamped with the engine time it was
/// received at.
#[derive(Debug, Clone, PartialEq)]
pub struct Received {
    pub handle: EndpointHandle,
    pub value: Value,
    pub at_frame: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Ramp {
    pub handle: EndpointHandle,
    pub target: Value,
    pub ramp_frames: u32,
    pub at_frame: u64,
}

/// In-memory engine recording every call the wrapper makes.
#[derive(Default)]
pub struct MockEngine {
    inputs: Vec<EndpointDetails>,
    outputs: Vec<EndpointDetails>,
    pub advances: Vec<u32>,
    pub events: Vec<Received>,
    pub values: Vec<Received>,
    pub ramps: Vec<Ramp>,
    pub stream_inputs: Vec<StreamInput>,
    frames_advanced: u64,
    last_input: HashMap<EndpointHandle, (Vec<f32>, usize)>,
    output_sources: HashMap<EndpointHandle, OutputSource>,
    produced: HashMap<EndpointHandle, (Vec<f32>, usize)>,
    scheduled: HashMap<EndpointHandle, Vec<(u64, Value)>>,
    pending: HashMap<EndpointHandle, Vec<(u32, Value)>>,
}

impl MockEngine {
    pub fn new(inputs: Vec<EndpointDetails>, outputs: Vec<EndpointDetails>) -> Self {
        Self {
            inputs,
            outputs,
            ..Self::default()
        }
    }

    pub fn from_json(inputs: &str, outputs: &str) -> Self {
        Self::new(endpoints_from_json(inputs), endpoints_from_json(outputs))
    }

    pub fn synth() -> Self {
        Self::from_json(SYNTH_INPUTS, SYNTH_OUTPUTS)
    }

    pub fn handle(&self, id: &str) -> EndpointHandle {
        self.endpoint_handle(&EndpointId::new(id))
    }

    pub fn set_output_source(&mut self, output_id: &str, source: OutputSource) {
        let handle = self.handle(output_id);
        self.output_sources.insert(handle, source);
    }

    /// Emit `value` from an event output at an absolute engine frame.
    pub fn schedule_output_event(&mut self, output_id: &str, at_frame: u64, value: Value) {
        let handle = self.handle(output_id);
        self.scheduled.entry(handle).or_default().push((at_frame, value));
    }

    /// Events produced by an output that nobody has drained yet.
    pub fn pending_output_events(&self, output_id: &str) -> usize {
        self.pending.get(&self.handle(output_id)).map_or(0, Vec::len)
    }

    pub fn frames_advanced(&self) -> u64 {
        self.frames_advanced
    }

    pub fn events_for(&self, id: &str) -> Vec<&Received> {
        let handle = self.handle(id);
        self.events.iter().filter(|e| e.handle == handle).collect()
    }

    fn find_output(&self, handle: EndpointHandle) -> &EndpointDetails {
        let index = handle.0 as usize - self.inputs.len();
        &self.outputs[index]
    }

    fn produce(&self, handle: EndpointHandle, num_frames: usize) -> (Vec<f32>, usize) {
        let channels = self.find_output(handle).num_audio_channels() as usize;
        let source = self
            .output_sources
            .get(&handle)
            .copied()
            .unwrap_or(OutputSource::Constant(0.0));

        match source {
            OutputSource::Constant(v) => (vec![v; num_frames * channels], channels),
            OutputSource::Short(v, frames) => (vec![v; frames.min(num_frames) * channels], channels),
            OutputSource::EchoInput(input) => self
                .last_input
                .get(&input)
                .cloned()
                .unwrap_or_else(|| (Vec::new(), channels)),
        }
    }
}

impl Engine for MockEngine {
    fn input_endpoints(&self) -> &[EndpointDetails] {
        &self.inputs
    }

    fn output_endpoints(&self) -> &[EndpointDetails] {
        &self.outputs
    }

    fn endpoint_handle(&self, id: &EndpointId) -> EndpointHandle {
        let index = self
            .inputs
            .iter()
            .chain(&self.outputs)
            .position(|ep| &ep.id == id)
            .unwrap_or_else(|| panic!("unknown endpoint {id}"));
        EndpointHandle(index as u32)
    }

    fn add_input_event(&mut self, handle: EndpointHandle, event: &Value) {
        self.events.push(Received {
            handle,
            value: *event,
            at_frame: self.frames_advanced,
        });
    }

    fn set_input_value(&mut self, handle: EndpointHandle, value: &Value) {
        self.values.push(Received {
            handle,
            value: *value,
            at_frame: self.frames_advanced,
        });
    }

    fn set_sparse_input_stream_target(
        &mut self,
        handle: EndpointHandle,
        target: &Value,
        ramp_frames: u32,
        _ramp_shape: f32,
    ) {
        self.ramps.push(Ramp {
            handle,
            target: *target,
            ramp_frames,
            at_frame: self.frames_advanced,
        });
    }

    fn set_next_input_stream_frames(&mut self, handle: EndpointHandle, frames: StreamFrames<'_>) {
        let (data, channels, mono_ptr) = match frames {
            StreamFrames::Mono(data) => (data, 1, Some(data.as_ptr() as usize)),
            StreamFrames::Interleaved { data, num_channels } => (data, num_channels, None),
        };

        self.stream_inputs.push(StreamInput {
            handle,
            mono_ptr,
            num_frames: frames.num_frames(),
            num_channels: channels,
        });
        self.last_input.insert(handle, (data.to_vec(), channels));
    }

    fn advance(&mut self, num_frames: u32) {
        let start = self.frames_advanced;
        let end = start + num_frames as u64;

        let audio_outputs: Vec<EndpointHandle> = self
            .outputs
            .iter()
            .filter(|ep| ep.num_audio_channels() > 0)
            .map(|ep| self.endpoint_handle(&ep.id))
            .collect();
        for handle in audio_outputs {
            let produced = self.produce(handle, num_frames as usize);
            self.produced.insert(handle, produced);
        }

        for (handle, scheduled) in &mut self.scheduled {
            let pending = self.pending.entry(*handle).or_default();
            scheduled.retain(|(at, value)| {
                if (start..end).contains(at) {
                    pending.push(((at - start) as u32, *value));
                    false
                } else {
                    true
                }
            });
        }

        self.advances.push(num_frames);
        self.frames_advanced = end;
    }

    fn output_stream_frames(&self, handle: EndpointHandle) -> StreamFrames<'_> {
        match self.produced.get(&handle) {
            Some((data, 1)) => StreamFrames::Mono(data),
            Some((data, channels)) => StreamFrames::Interleaved {
                data,
                num_channels: *channels,
            },
            None => StreamFrames::Mono(&[]),
        }
    }

    fn iterate_output_events(
        &mut self,
        handle: EndpointHandle,
        callback: &mut dyn FnMut(u32, &Value) -> bool,
    ) {
        let Some(pending) = self.pending.get_mut(&handle) else {
            return;
        };

        let mut consumed = 0;
        for (offset, value) in pending.iter() {
            consumed += 1;
            if !callback(*offset, value) {
                break;
            }
        }
        pending.drain(..consumed);
    }
}
