//! Endpoint metadata exposed by a processing engine.
//!
//! An engine declares its inputs and outputs as a list of [`EndpointDetails`].
//! The wrapper only ever reads this metadata: it classifies each endpoint once
//! while building the rendering pipeline and caches the resolved
//! [`EndpointHandle`] plus the few shape facts it needs.
//!
//! The types derive serde traits so an engine can describe its endpoints as
//! JSON:
//!
//! ```ignore
//! let details: EndpointDetails = serde_json::from_str(r#"{
//!     "id": "gain",
//!     "name": "gain",
//!     "direction": "input",
//!     "kind": "value",
//!     "data_types": [{ "primitive": "float32" }],
//!     "annotation": { "name": "Gain", "min": 0.0, "max": 1.0 }
//! }"#)?;
//! ```

use serde::{Deserialize, Serialize};

/// Annotation keys that mark an input as externally controllable.
pub const PARAMETER_ANNOTATION_KEYS: &[&str] = &["name", "min", "max", "init", "step", "unit", "text"];

/// Stable identifier of an endpoint within one engine.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EndpointId(pub String);

impl EndpointId {
    /// Create an identifier from anything string-like.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for EndpointId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Opaque handle the engine hands out for fast access to an endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EndpointHandle(pub u32);

/// Whether data flows into or out of the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Input,
    Output,
}

/// How an endpoint delivers its data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EndpointKind {
    /// Continuous per-frame data (audio, or a sparse ramped stream).
    Stream,
    /// A single value that holds until it is changed.
    Value,
    /// Timestamped discrete events.
    Event,
}

/// Primitive element types an endpoint can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrimitiveType {
    Float32,
    Float64,
    Int32,
    Int64,
    Bool,
}

impl PrimitiveType {
    /// True for `Float32` and `Float64`.
    #[inline]
    pub const fn is_float(self) -> bool {
        matches!(self, Self::Float32 | Self::Float64)
    }

    /// True for every type that can hold an audio sample count.
    #[inline]
    pub const fn is_numeric(self) -> bool {
        !matches!(self, Self::Bool)
    }
}

/// The data type of one endpoint frame or event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    /// A single primitive value.
    Primitive(PrimitiveType),
    /// A fixed-size vector of primitives (one element per channel for audio).
    Vector(PrimitiveType, u32),
    /// The short MIDI message struct (a single packed `midiBytes` integer).
    Midi,
}

impl DataType {
    /// Number of elements in one frame of this type.
    pub const fn num_elements(self) -> u32 {
        match self {
            Self::Primitive(_) | Self::Midi => 1,
            Self::Vector(_, size) => size,
        }
    }

    /// The element type, if this is a primitive or vector.
    pub const fn element_type(self) -> Option<PrimitiveType> {
        match self {
            Self::Primitive(p) | Self::Vector(p, _) => Some(p),
            Self::Midi => None,
        }
    }

    /// True for float scalars and vectors of floats.
    pub fn is_float_family(self) -> bool {
        self.element_type().is_some_and(PrimitiveType::is_float)
    }

    /// True for a scalar primitive.
    pub const fn is_primitive(self) -> bool {
        matches!(self, Self::Primitive(_))
    }
}

/// Full description of one engine endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EndpointDetails {
    /// Identifier used to resolve the endpoint handle.
    pub id: EndpointId,
    /// Human readable name, passed to the unused-event handler.
    pub name: String,
    pub direction: Direction,
    pub kind: EndpointKind,
    /// Frame type for streams and values, accepted event types for events.
    pub data_types: Vec<DataType>,
    /// Free-form annotation attached by the engine.
    #[serde(default)]
    pub annotation: serde_json::Map<String, serde_json::Value>,
}

impl EndpointDetails {
    /// Create an endpoint with no annotation.
    pub fn new(
        id: impl Into<String>,
        direction: Direction,
        kind: EndpointKind,
        data_types: Vec<DataType>,
    ) -> Self {
        let id = id.into();
        Self {
            name: id.clone(),
            id: EndpointId(id),
            direction,
            kind,
            data_types,
            annotation: serde_json::Map::new(),
        }
    }

    /// Attach an annotation entry.
    pub fn with_annotation(mut self, key: &str, value: impl Into<serde_json::Value>) -> Self {
        self.annotation.insert(key.to_owned(), value.into());
        self
    }

    /// Audio stream input with the given channel count.
    pub fn audio_input(id: impl Into<String>, channels: u32) -> Self {
        Self::new(id, Direction::Input, EndpointKind::Stream, vec![audio_frame_type(channels)])
    }

    /// Audio stream output with the given channel count.
    pub fn audio_output(id: impl Into<String>, channels: u32) -> Self {
        Self::new(id, Direction::Output, EndpointKind::Stream, vec![audio_frame_type(channels)])
    }

    /// MIDI event input.
    pub fn midi_input(id: impl Into<String>) -> Self {
        Self::new(id, Direction::Input, EndpointKind::Event, vec![DataType::Midi])
    }

    /// MIDI event output.
    pub fn midi_output(id: impl Into<String>) -> Self {
        Self::new(id, Direction::Output, EndpointKind::Event, vec![DataType::Midi])
    }

    /// A float parameter input of the given kind, annotated with its name.
    pub fn parameter(id: impl Into<String>, kind: EndpointKind) -> Self {
        let id = id.into();
        let name = id.clone();
        Self::new(id, Direction::Input, kind, vec![DataType::Primitive(PrimitiveType::Float32)])
            .with_annotation("name", name)
    }

    #[inline]
    pub fn is_input(&self) -> bool {
        self.direction == Direction::Input
    }

    #[inline]
    pub fn is_stream(&self) -> bool {
        self.kind == EndpointKind::Stream
    }

    #[inline]
    pub fn is_value(&self) -> bool {
        self.kind == EndpointKind::Value
    }

    #[inline]
    pub fn is_event(&self) -> bool {
        self.kind == EndpointKind::Event
    }

    /// The frame type of a stream or value endpoint.
    ///
    /// Returns `None` for event endpoints and for endpoints declaring no type.
    pub fn frame_type(&self) -> Option<DataType> {
        if self.is_event() {
            return None;
        }
        self.data_types.first().copied()
    }

    /// The event type, if this event endpoint accepts exactly one.
    pub fn single_event_type(&self) -> Option<DataType> {
        match self.data_types.as_slice() {
            [single] if self.is_event() => Some(*single),
            _ => None,
        }
    }

    /// True for event endpoints that carry short MIDI messages.
    pub fn is_midi_event_endpoint(&self) -> bool {
        self.single_event_type() == Some(DataType::Midi)
    }

    /// True for inputs that are meant to be driven by a host parameter.
    ///
    /// The endpoint must carry exactly one scalar primitive type and be
    /// annotated with at least one of [`PARAMETER_ANNOTATION_KEYS`].
    pub fn is_parameter_input(&self) -> bool {
        self.is_input()
            && matches!(self.data_types.as_slice(), [t] if t.is_primitive())
            && PARAMETER_ANNOTATION_KEYS
                .iter()
                .any(|key| self.annotation.contains_key(*key))
    }

    /// The scalar type a parameter value should be written as.
    pub fn parameter_type(&self) -> Option<PrimitiveType> {
        match self.data_types.as_slice() {
            [DataType::Primitive(p)] => Some(*p),
            _ => None,
        }
    }

    /// Number of audio channels carried by a stream endpoint, or 0.
    pub fn num_audio_channels(&self) -> u32 {
        if !self.is_stream() {
            return 0;
        }
        match self.frame_type() {
            Some(t) if t.element_type().is_some_and(PrimitiveType::is_numeric) => t.num_elements(),
            _ => 0,
        }
    }
}

fn audio_frame_type(channels: u32) -> DataType {
    if channels == 1 {
        DataType::Primitive(PrimitiveType::Float32)
    } else {
        DataType::Vector(PrimitiveType::Float32, channels)
    }
}
