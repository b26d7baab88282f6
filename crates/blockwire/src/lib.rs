//! # blockwire
//!
//! Drives a block-oriented processing engine from plugin-style render
//! callbacks.
//!
//! The engine declares typed endpoints and advances in blocks of at most
//! [`MAX_ENGINE_BLOCK_SIZE`](blockwire_core::MAX_ENGINE_BLOCK_SIZE) frames.
//! The host hands over channel arrays and a sorted list of MIDI events. This
//! crate compiles the glue between the two once, then splits every host block
//! so each event reaches the engine on its exact frame.
//!
//! ## Architecture
//!
//! ```text
//! Host (channel arrays + timestamped MIDI)
//!        ↓
//! AudioMidiWrapper (sub-block splitting)
//!        ↓
//! Pipeline (pre-render ops → advance → post-render ops)
//!        ↓
//! Engine (typed endpoints)
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use blockwire::prelude::*;
//!
//! let mut wrapper = AudioMidiWrapper::new(&mut engine);
//! wrapper.build_rendering_pipeline(
//!     256,
//!     PipelineCallbacks::new()
//!         .with_parameter_probes(|endpoint| host_parameters.probe(&endpoint.name))
//!         .with_ramp_length(|_| 64),
//! );
//!
//! let num_inputs = wrapper.expected_input_channel_count();
//! let num_outputs = wrapper.expected_output_channel_count();
//!
//! // audio callback
//! let written = wrapper.render(inputs, outputs, &midi_in, &mut midi_out);
//! ```

pub use blockwire_core as core;

pub mod block_splitter;
pub mod interleave;
pub mod operation;
pub mod pipeline;
pub mod wrapper;

#[cfg(test)]
mod test_engine;

pub use block_splitter::{RenderContext, SubBlock, SubBlocks};
pub use interleave::{copy_intersection_and_clear_outside, InterleavedBuffer};
pub use operation::{
    HandleUnusedEventFn, OperationKind, ParameterInput, ParameterProbe, PostRenderOperation,
    PreRenderOperation,
};
pub use pipeline::{ChannelLayout, Pipeline, PipelineCallbacks, PipelineSummary};
pub use wrapper::AudioMidiWrapper;

/// Prelude module for convenient imports.
///
/// ```rust,ignore
/// use blockwire::prelude::*;
/// ```
pub mod prelude {
    pub use crate::operation::{OperationKind, ParameterProbe};
    pub use crate::pipeline::{PipelineCallbacks, PipelineSummary};
    pub use crate::wrapper::AudioMidiWrapper;

    pub use blockwire_core::{
        ChannelArrayView, ChannelArrayViewMut, DataType, Direction, EndpointDetails,
        EndpointHandle, EndpointId, EndpointKind, Engine, MidiEvent, MidiMessage, PrimitiveType,
        StreamFrames, Value, WrapperConfig, WrapperError, WrapperResult, MAX_ENGINE_BLOCK_SIZE,
    };
}
