//! The processing engine interface consumed by the wrapper.
//!
//! An [`Engine`] is a block-oriented DSP runtime. It declares typed endpoints,
//! accepts data for its inputs, advances by a number of frames, and then
//! exposes what its outputs produced during that advance.
//!
//! ```text
//! set inputs (events, values, stream frames)
//!        ↓
//! advance(num_frames)
//!        ↓
//! read outputs (stream frames, events)
//! ```
//!
//! Events added before an `advance` are treated as having happened at the
//! first frame of that advance. The wrapper splits host blocks so this is
//! always the correct time for them.

use crate::buffer::StreamFrames;
use crate::endpoint::{EndpointDetails, EndpointHandle, EndpointId};
use crate::value::Value;

pub trait Engine {
    /// Input endpoints in declaration order.
    fn input_endpoints(&self) -> &[EndpointDetails];

    /// Output endpoints in declaration order.
    fn output_endpoints(&self) -> &[EndpointDetails];

    /// Resolve the handle for a declared endpoint.
    fn endpoint_handle(&self, id: &EndpointId) -> EndpointHandle;

    /// Queue an event for the next advance.
    fn add_input_event(&mut self, handle: EndpointHandle, event: &Value);

    /// Replace the current value of a value endpoint.
    fn set_input_value(&mut self, handle: EndpointHandle, value: &Value);

    /// Ramp a sparse stream towards `target` over `ramp_frames` frames.
    ///
    /// `ramp_shape` of 0.0 is a linear ramp.
    fn set_sparse_input_stream_target(
        &mut self,
        handle: EndpointHandle,
        target: &Value,
        ramp_frames: u32,
        ramp_shape: f32,
    );

    /// Provide the frames a stream input consumes during the next advance.
    ///
    /// The data is only borrowed for the duration of the call.
    fn set_next_input_stream_frames(&mut self, handle: EndpointHandle, frames: StreamFrames<'_>);

    /// Run the engine for `num_frames` frames.
    fn advance(&mut self, num_frames: u32);

    /// Frames a stream output produced during the last advance.
    fn output_stream_frames(&self, handle: EndpointHandle) -> StreamFrames<'_>;

    /// Visit the events an event output produced during the last advance.
    ///
    /// The callback receives the frame offset within the advance and the
    /// event. Returning `false` stops the iteration early.
    fn iterate_output_events(
        &mut self,
        handle: EndpointHandle,
        callback: &mut dyn FnMut(u32, &Value) -> bool,
    );
}
