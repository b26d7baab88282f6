//! # blockwire-core
//!
//! Core abstractions for the blockwire rendering wrapper.
//!
//! This crate describes the processing engine the wrapper drives and the data
//! it exchanges with it. It contains no rendering logic.
//!
//! ## Main Traits
//!
//! - [`Engine`] - Block-oriented processing engine with typed endpoints
//!
//! ## Types
//!
//! - [`EndpointDetails`] - Endpoint metadata (direction, kind, data types, annotation)
//! - [`Value`] - Values and event payloads written to or read from endpoints
//! - [`MidiEvent`] - Timestamped short MIDI message
//! - [`EventOutput`] - Bounded outbound event writer over a host buffer
//! - [`ChannelArrayView`] / [`ChannelArrayViewMut`] - Host channel views with a frame window
//! - [`StreamFrames`] - Frames handed to or produced by an engine stream
//! - [`WrapperConfig`] - Pipeline configuration
//! - [`WrapperError`] - Configuration errors

pub mod buffer;
pub mod config;
pub mod endpoint;
pub mod engine;
pub mod error;
pub mod midi;
pub mod value;

// Re-exports for convenience
pub use buffer::{ChannelArrayView, ChannelArrayViewMut, StreamFrames};
pub use config::{WrapperConfig, MAX_ENGINE_BLOCK_SIZE};
pub use endpoint::{
    DataType, Direction, EndpointDetails, EndpointHandle, EndpointId, EndpointKind, PrimitiveType,
    PARAMETER_ANNOTATION_KEYS,
};
pub use engine::Engine;
pub use error::{WrapperError, WrapperResult};
pub use midi::{EventOutput, MidiEvent, MidiMessage};
pub use value::Value;
