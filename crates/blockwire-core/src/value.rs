//! Values written into and read out of engine endpoints.

use crate::endpoint::PrimitiveType;
use crate::midi::MidiMessage;

/// A single value or event payload.
///
/// Kept `Copy` so operations can build values on the audio thread without
/// allocating.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Value {
    Float32(f32),
    Float64(f64),
    Int32(i32),
    Int64(i64),
    Bool(bool),
    /// The MIDI message struct, carried as its packed `midiBytes` field.
    Midi(MidiMessage),
}

impl Value {
    /// Convert a host parameter value to an endpoint's declared scalar type.
    ///
    /// Integers are rounded to nearest; booleans are true above 0.5.
    pub fn from_parameter(value: f32, target: PrimitiveType) -> Self {
        match target {
            PrimitiveType::Float32 => Self::Float32(value),
            PrimitiveType::Float64 => Self::Float64(value as f64),
            PrimitiveType::Int32 => Self::Int32(value.round() as i32),
            PrimitiveType::Int64 => Self::Int64(value.round() as i64),
            PrimitiveType::Bool => Self::Bool(value > 0.5),
        }
    }

    /// The `midiBytes` field of a MIDI payload.
    ///
    /// Plain `Int32` payloads are accepted as already-packed messages.
    pub fn midi_bytes(&self) -> Option<i32> {
        match self {
            Self::Midi(msg) => Some(msg.packed()),
            Self::Int32(packed) => Some(*packed),
            _ => None,
        }
    }

    /// Numeric view of the value, if it has one.
    pub fn as_f64(&self) -> Option<f64> {
        match *self {
            Self::Float32(v) => Some(v as f64),
            Self::Float64(v) => Some(v),
            Self::Int32(v) => Some(v as f64),
            Self::Int64(v) => Some(v as f64),
            Self::Bool(v) => Some(if v { 1.0 } else { 0.0 }),
            Self::Midi(_) => None,
        }
    }
}
