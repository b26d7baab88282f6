//! Rendering pipeline compiler.
//!
//! [`Pipeline::build`] walks the engine's endpoints once, in declaration
//! order, and compiles one operation per endpoint it knows how to feed or
//! drain. Rendering then only runs the compiled operations; it never looks at
//! endpoint metadata again.
//!
//! # Endpoint Classification
//!
//! | Endpoint | Operation |
//! |----------|-----------|
//! | Parameter input (event) | push an event per changed value |
//! | Parameter input (stream) | ramp to each changed value |
//! | Parameter input (value) | set each changed value |
//! | MIDI input | forward inbound MIDI |
//! | Audio input, 1 channel | zero-copy view over the host channel |
//! | Audio input, N channels | interleave into owned scratch |
//! | MIDI output | drain into the host's outbound buffer |
//! | Audio output | copy into host channels, clear the rest |
//! | Other event output | drain into the unused-event observer, if any |
//!
//! Audio endpoints claim consecutive host channels in declaration order. The
//! totals become the channel layout the host has to provide.
//!
//! # Allocation
//!
//! Building is the only place the pipeline allocates. Scratch buffers are
//! sized for the effective maximum block size.

use blockwire_core::{
    DataType, Engine, EndpointDetails, EndpointKind, PrimitiveType, MAX_ENGINE_BLOCK_SIZE,
};

use crate::block_splitter::RenderContext;
use crate::interleave::InterleavedBuffer;
use crate::operation::{
    HandleUnusedEventFn, OperationKind, ParameterInput, ParameterProbe, PostRenderOperation,
    PreRenderOperation,
};

/// Provider returning a change probe for a parameter input, or `None` to leave
/// the endpoint at its engine default.
pub type GetNewParameterValueFn<'a> =
    Box<dyn FnMut(&EndpointDetails) -> Option<ParameterProbe> + 'a>;

/// Provider returning the ramp length in frames for a stream parameter.
pub type GetRampLengthFn<'a> = Box<dyn FnMut(&EndpointDetails) -> u32 + 'a>;

/// Host callbacks consumed by one pipeline build.
///
/// The two providers are only used while building. The probes they return and
/// the unused-event observer move into the compiled pipeline.
///
/// # Example
///
/// ```ignore
/// let callbacks = PipelineCallbacks::new()
///     .with_parameter_probes(|endpoint| parameters.probe_for(&endpoint.name))
///     .with_ramp_length(|_| 64)
///     .with_unused_event_handler(|time, name, event| log::trace!("{time} {name} {event:?}"));
/// ```
#[derive(Default)]
pub struct PipelineCallbacks<'a> {
    get_new_parameter_value: Option<GetNewParameterValueFn<'a>>,
    get_ramp_length: Option<GetRampLengthFn<'a>>,
    handle_unused_event: Option<HandleUnusedEventFn>,
}

impl<'a> PipelineCallbacks<'a> {
    /// No callbacks: parameters stay at their defaults and unclaimed event
    /// outputs are left undrained.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the change-probe provider for parameter inputs.
    pub fn with_parameter_probes(
        mut self,
        provider: impl FnMut(&EndpointDetails) -> Option<ParameterProbe> + 'a,
    ) -> Self {
        self.get_new_parameter_value = Some(Box::new(provider));
        self
    }

    /// Set the ramp length provider for stream parameters.
    pub fn with_ramp_length(mut self, provider: impl FnMut(&EndpointDetails) -> u32 + 'a) -> Self {
        self.get_ramp_length = Some(Box::new(provider));
        self
    }

    /// Set the observer for event outputs without a dedicated consumer.
    pub fn with_unused_event_handler(
        mut self,
        handler: impl FnMut(u64, &str, &blockwire_core::Value) + Send + 'static,
    ) -> Self {
        self.handle_unused_event = Some(Box::new(handler));
        self
    }

    /// Use a fixed ramp length when no ramp provider has been set.
    pub fn or_ramp_length(mut self, frames: Option<u32>) -> Self {
        if self.get_ramp_length.is_none() {
            if let Some(frames) = frames {
                self.get_ramp_length = Some(Box::new(move |_: &EndpointDetails| frames));
            }
        }
        self
    }
}

/// Host channel counts implied by the engine's audio endpoints.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChannelLayout {
    pub input_channels: u32,
    pub output_channels: u32,
}

/// Shape of a compiled pipeline, for hosts and diagnostics.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PipelineSummary {
    /// Effective sub-block size.
    pub max_block_size: u32,
    pub layout: ChannelLayout,
    /// Pre-render operation kinds in execution order.
    pub pre_render: Vec<OperationKind>,
    /// Post-render operation kinds in execution order.
    pub post_render: Vec<OperationKind>,
}

/// Compiled operations plus the layout they were compiled for.
#[derive(Default)]
pub struct Pipeline {
    pre_render: Vec<PreRenderOperation>,
    post_render: Vec<PostRenderOperation>,
    unused_event_handler: Option<HandleUnusedEventFn>,
    layout: ChannelLayout,
    max_block_size: u32,
}

impl Pipeline {
    /// An unbuilt pipeline. Rendering with it is a programming error.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Compile the operations for `engine`'s current endpoints.
    ///
    /// # Panics
    ///
    /// - `max_block_size` is zero
    /// - a stream parameter receives a probe but no ramp length provider is set
    /// - an audio endpoint uses a non-float element type
    pub fn build<E: Engine + ?Sized>(
        engine: &E,
        max_block_size: u32,
        callbacks: PipelineCallbacks<'_>,
    ) -> Self {
        assert!(max_block_size > 0, "max block size must be greater than zero");

        let effective = max_block_size.min(MAX_ENGINE_BLOCK_SIZE);
        if effective < max_block_size {
            log::warn!(
                "requested block size {} capped at engine maximum {}",
                max_block_size,
                effective
            );
        }

        let mut builder = PipelineBuilder {
            engine,
            callbacks,
            max_block_size: effective,
            layout: ChannelLayout::default(),
            pre_render: Vec::new(),
            post_render: Vec::new(),
        };

        for endpoint in engine.input_endpoints() {
            builder.add_input(endpoint);
        }
        for endpoint in engine.output_endpoints() {
            builder.add_output(endpoint);
        }

        builder.finish()
    }

    #[inline]
    pub fn is_built(&self) -> bool {
        self.max_block_size != 0
    }

    #[inline]
    pub fn max_block_size(&self) -> u32 {
        self.max_block_size
    }

    #[inline]
    pub fn layout(&self) -> ChannelLayout {
        self.layout
    }

    pub fn summary(&self) -> PipelineSummary {
        PipelineSummary {
            max_block_size: self.max_block_size,
            layout: self.layout,
            pre_render: self.pre_render.iter().map(PreRenderOperation::kind).collect(),
            post_render: self.post_render.iter().map(PostRenderOperation::kind).collect(),
        }
    }

    /// Run one sub-block: pre-render operations, one advance, post-render
    /// operations.
    pub fn render_sub_block<E: Engine + ?Sized>(
        &mut self,
        engine: &mut E,
        rc: &mut RenderContext<'_, '_, '_>,
        num_frames: u32,
    ) {
        for op in &mut self.pre_render {
            op.run(engine, rc);
        }

        engine.advance(num_frames);

        for op in &mut self.post_render {
            op.run(engine, rc, self.unused_event_handler.as_mut());
        }
    }
}

/// Single linear pass over the endpoints.
///
/// `layout` grows as audio endpoints claim host channels and is frozen into
/// the finished pipeline.
struct PipelineBuilder<'e, 'c, E: ?Sized> {
    engine: &'e E,
    callbacks: PipelineCallbacks<'c>,
    max_block_size: u32,
    layout: ChannelLayout,
    pre_render: Vec<PreRenderOperation>,
    post_render: Vec<PostRenderOperation>,
}

impl<E: Engine + ?Sized> PipelineBuilder<'_, '_, E> {
    fn add_input(&mut self, endpoint: &EndpointDetails) {
        if endpoint.is_parameter_input() {
            self.add_parameter_input(endpoint);
        } else if endpoint.is_midi_event_endpoint() {
            let handle = self.engine.endpoint_handle(&endpoint.id);
            self.push_pre(endpoint, PreRenderOperation::MidiInput { handle });
        } else {
            let num_channels = endpoint.num_audio_channels();
            if num_channels > 0 {
                self.add_audio_input(endpoint, num_channels);
            } else {
                log::debug!("input '{}' has no host source, left at engine default", endpoint.name);
            }
        }
    }

    fn add_parameter_input(&mut self, endpoint: &EndpointDetails) {
        let probe = match self.callbacks.get_new_parameter_value.as_mut() {
            Some(get_new_parameter_value) => get_new_parameter_value(endpoint),
            None => None,
        };
        let Some(probe) = probe else {
            log::debug!("parameter '{}' not driven by host", endpoint.name);
            return;
        };

        let handle = self.engine.endpoint_handle(&endpoint.id);
        let value_type = endpoint.parameter_type().unwrap_or(PrimitiveType::Float32);
        let input = ParameterInput::new(handle, value_type, probe);

        let op = match endpoint.kind {
            EndpointKind::Event => PreRenderOperation::EventParameter(input),
            EndpointKind::Stream => {
                let ramp_frames = match self.callbacks.get_ramp_length.as_mut() {
                    Some(get_ramp_length) => get_ramp_length(endpoint),
                    None => panic!(
                        "stream parameter '{}' requires a ramp length provider",
                        endpoint.name
                    ),
                };
                PreRenderOperation::StreamParameter { input, ramp_frames }
            }
            EndpointKind::Value => PreRenderOperation::ValueParameter(input),
        };

        self.push_pre(endpoint, op);
    }

    fn add_audio_input(&mut self, endpoint: &EndpointDetails, num_channels: u32) {
        assert_float_frames(endpoint);

        let handle = self.engine.endpoint_handle(&endpoint.id);
        let start_channel = self.layout.input_channels as usize;

        let op = if num_channels == 1 {
            PreRenderOperation::MonoAudioInput {
                handle,
                start_channel,
            }
        } else {
            PreRenderOperation::InterleavedAudioInput {
                handle,
                start_channel,
                interleaved: InterleavedBuffer::new(
                    num_channels as usize,
                    self.max_block_size as usize,
                ),
            }
        };

        self.push_pre(endpoint, op);
        self.layout.input_channels += num_channels;
    }

    fn add_output(&mut self, endpoint: &EndpointDetails) {
        let num_channels = endpoint.num_audio_channels();

        if endpoint.is_midi_event_endpoint() {
            let handle = self.engine.endpoint_handle(&endpoint.id);
            self.push_post(endpoint, PostRenderOperation::MidiOutput { handle });
        } else if num_channels > 0 {
            assert_float_frames(endpoint);

            let handle = self.engine.endpoint_handle(&endpoint.id);
            let start_channel = self.layout.output_channels as usize;
            self.layout.output_channels += num_channels;

            self.push_post(
                endpoint,
                PostRenderOperation::AudioOutput {
                    handle,
                    start_channel,
                    num_channels: num_channels as usize,
                },
            );
        } else if endpoint.is_event() && self.callbacks.handle_unused_event.is_some() {
            let handle = self.engine.endpoint_handle(&endpoint.id);
            self.push_post(
                endpoint,
                PostRenderOperation::UnusedEvents {
                    handle,
                    endpoint_name: endpoint.name.clone(),
                },
            );
        } else {
            log::debug!("output '{}' has no consumer, left undrained", endpoint.name);
        }
    }

    fn push_pre(&mut self, endpoint: &EndpointDetails, op: PreRenderOperation) {
        log::debug!("input '{}' -> {:?}", endpoint.name, op.kind());
        self.pre_render.push(op);
    }

    fn push_post(&mut self, endpoint: &EndpointDetails, op: PostRenderOperation) {
        log::debug!("output '{}' -> {:?}", endpoint.name, op.kind());
        self.post_render.push(op);
    }

    fn finish(self) -> Pipeline {
        log::debug!(
            "rendering pipeline built: {} pre-render and {} post-render operations, \
             {} input / {} output channels, max block {}",
            self.pre_render.len(),
            self.post_render.len(),
            self.layout.input_channels,
            self.layout.output_channels,
            self.max_block_size
        );

        Pipeline {
            pre_render: self.pre_render,
            post_render: self.post_render,
            unused_event_handler: self.callbacks.handle_unused_event,
            layout: self.layout,
            max_block_size: self.max_block_size,
        }
    }
}

/// Audio endpoints must carry float samples; anything else is a
/// configuration error that cannot be rendered.
fn assert_float_frames(endpoint: &EndpointDetails) {
    assert!(
        endpoint.frame_type().is_some_and(DataType::is_float_family),
        "audio endpoint '{}' has a non-float element type",
        endpoint.name
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_engine::MockEngine;

    fn probe_all<'a>() -> PipelineCallbacks<'a> {
        PipelineCallbacks::new().with_parameter_probes(|_: &EndpointDetails| {
            let probe: ParameterProbe = Box::new(|| None);
            Some(probe)
        })
    }

    #[test]
    fn test_empty_pipeline_is_not_built() {
        let pipeline = Pipeline::empty();
        assert!(!pipeline.is_built());
        assert_eq!(pipeline.summary(), PipelineSummary::default());
    }

    #[test]
    fn test_block_size_capped() {
        let engine = MockEngine::synth();
        let pipeline = Pipeline::build(&engine, 4096, PipelineCallbacks::new());
        assert_eq!(pipeline.max_block_size(), MAX_ENGINE_BLOCK_SIZE);

        let pipeline = Pipeline::build(&engine, 1, PipelineCallbacks::new());
        assert_eq!(pipeline.max_block_size(), 1);
    }

    #[test]
    fn test_fallback_ramp_does_not_override_provider() {
        let engine = MockEngine::synth();
        let asked = std::cell::Cell::new(0);
        let callbacks = probe_all()
            .with_ramp_length(|_: &EndpointDetails| {
                asked.set(asked.get() + 1);
                8
            })
            .or_ramp_length(Some(100));

        let pipeline = Pipeline::build(&engine, 512, callbacks);
        assert!(pipeline.summary().pre_render.contains(&OperationKind::StreamParameter));
        assert_eq!(asked.get(), 1);
    }

    #[test]
    fn test_fallback_ramp_satisfies_stream_parameter() {
        let engine = MockEngine::synth();
        let callbacks = probe_all().or_ramp_length(Some(16));
        let summary = Pipeline::build(&engine, 512, callbacks).summary();
        assert_eq!(summary.pre_render.len(), 5);
    }

    #[test]
    fn test_provider_declining_skips_parameter() {
        let engine = MockEngine::synth();
        let callbacks = PipelineCallbacks::new()
            .with_parameter_probes(|endpoint: &EndpointDetails| {
                let probe: ParameterProbe = Box::new(|| None);
                (endpoint.name == "mode").then_some(probe)
            });

        let summary = Pipeline::build(&engine, 512, callbacks).summary();
        assert_eq!(
            summary.pre_render,
            vec![
                OperationKind::MidiInput,
                OperationKind::ValueParameter,
                OperationKind::InterleavedAudioInput,
            ]
        );
    }

    #[test]
    fn test_unclaimed_value_input_is_skipped() {
        let plain = EndpointDetails::new(
            "offset",
            blockwire_core::Direction::Input,
            EndpointKind::Value,
            vec![DataType::Primitive(PrimitiveType::Float32)],
        );
        let engine = MockEngine::new(vec![plain], vec![]);
        let pipeline = Pipeline::build(&engine, 512, probe_all());

        assert!(pipeline.summary().pre_render.is_empty());
        assert_eq!(pipeline.layout(), ChannelLayout::default());
    }
}
