//! Host-facing wrapper around a processing engine.
//!
//! [`AudioMidiWrapper`] turns an [`Engine`] into a classic plugin-style render
//! callback: channel arrays in and out plus timestamped MIDI in and out, one
//! host block at a time.
//!
//! # Lifecycle
//!
//! ```text
//! new(&mut engine)
//!     ↓
//! build_rendering_pipeline(max_block_size, callbacks)   ← again whenever the
//!     ↓                                                   engine's endpoints change
//! expected_input_channel_count() / expected_output_channel_count()
//!     ↓
//! render(...) per host block
//! ```
//!
//! # Real-Time Safety
//!
//! `render` never allocates. All scratch buffers are sized by the build step.

use blockwire_core::{
    ChannelArrayView, ChannelArrayViewMut, Engine, EventOutput, MidiEvent, WrapperConfig,
    WrapperResult,
};

use crate::block_splitter::{RenderContext, SubBlocks};
use crate::pipeline::{Pipeline, PipelineCallbacks, PipelineSummary};

/// Drives an engine from host render callbacks.
///
/// The wrapper borrows the engine for its whole lifetime and owns the
/// compiled pipeline.
pub struct AudioMidiWrapper<'e, E: Engine + ?Sized> {
    engine: &'e mut E,
    pipeline: Pipeline,
    total_frames_rendered: u64,
    dropped_event_count: usize,
}

impl<'e, E: Engine + ?Sized> AudioMidiWrapper<'e, E> {
    /// Wrap an engine. No pipeline is built yet.
    pub fn new(engine: &'e mut E) -> Self {
        Self {
            engine,
            pipeline: Pipeline::empty(),
            total_frames_rendered: 0,
            dropped_event_count: 0,
        }
    }

    /// Discard the compiled pipeline and zero the render counters.
    pub fn reset(&mut self) {
        self.pipeline = Pipeline::empty();
        self.total_frames_rendered = 0;
        self.dropped_event_count = 0;
    }

    /// Compile the pipeline for the engine's current endpoints.
    ///
    /// Always starts from scratch; building twice for the same endpoints
    /// yields the same summary.
    ///
    /// # Panics
    ///
    /// See [`Pipeline::build`].
    pub fn build_rendering_pipeline(
        &mut self,
        max_block_size: u32,
        callbacks: PipelineCallbacks<'_>,
    ) -> PipelineSummary {
        self.reset();
        self.pipeline = Pipeline::build(&*self.engine, max_block_size, callbacks);
        self.pipeline.summary()
    }

    /// Validate `config` and build from it.
    ///
    /// The configured sparse stream ramp length is used when `callbacks`
    /// carries no ramp length provider.
    pub fn build_from_config(
        &mut self,
        config: &WrapperConfig,
        callbacks: PipelineCallbacks<'_>,
    ) -> WrapperResult<PipelineSummary> {
        config.validate()?;
        let callbacks = callbacks.or_ramp_length(config.sparse_stream_ramp_frames);
        Ok(self.build_rendering_pipeline(config.max_block_size, callbacks))
    }

    /// Render one host block.
    ///
    /// `midi_in` must be sorted by frame index. Outbound MIDI is written to
    /// the front of `midi_out`; events beyond its length are dropped (see
    /// [`dropped_event_count`](Self::dropped_event_count)).
    ///
    /// Returns the number of events written to `midi_out`.
    ///
    /// # Panics
    ///
    /// - no pipeline has been built
    /// - input and output frame counts differ
    /// - the host supplies fewer input channels than expected
    pub fn render(
        &mut self,
        input: ChannelArrayView<'_>,
        mut output: ChannelArrayViewMut<'_, '_>,
        midi_in: &[MidiEvent],
        midi_out: &mut [MidiEvent],
    ) -> usize {
        assert!(
            self.pipeline.is_built(),
            "render called before the rendering pipeline was built"
        );
        assert_eq!(
            input.num_frames(),
            output.num_frames(),
            "input and output frame counts differ"
        );
        assert!(
            input.num_channels() >= self.expected_input_channel_count() as usize,
            "host supplied {} input channels, pipeline expects {}",
            input.num_channels(),
            self.expected_input_channel_count()
        );

        let num_frames = input.num_frames() as u32;
        let mut events_out = EventOutput::new(midi_out);

        for block in SubBlocks::new(num_frames, self.pipeline.max_block_size(), midi_in) {
            let start = block.frame_offset as usize;
            let frames = start..start + block.num_frames as usize;

            let mut rc = RenderContext {
                total_frames_rendered: self.total_frames_rendered,
                frame_offset: block.frame_offset,
                input_channels: input.frame_range(frames.clone()),
                output_channels: output.frame_range(frames),
                midi_in: &midi_in[block.events],
                midi_out: &mut events_out,
            };

            self.pipeline
                .render_sub_block(&mut *self.engine, &mut rc, block.num_frames);
            self.total_frames_rendered += u64::from(block.num_frames);
        }

        self.dropped_event_count = events_out.dropped();
        if self.dropped_event_count > 0 {
            log::debug!(
                "outbound MIDI buffer full: {} of {} events dropped",
                self.dropped_event_count,
                self.dropped_event_count + events_out.len()
            );
        }

        events_out.len()
    }

    /// Host input channels the pipeline reads from.
    #[inline]
    pub fn expected_input_channel_count(&self) -> u32 {
        self.pipeline.layout().input_channels
    }

    /// Host output channels the pipeline writes to.
    #[inline]
    pub fn expected_output_channel_count(&self) -> u32 {
        self.pipeline.layout().output_channels
    }

    /// Frames rendered since the last build.
    #[inline]
    pub fn total_frames_rendered(&self) -> u64 {
        self.total_frames_rendered
    }

    /// Effective sub-block size, or 0 before the first build.
    #[inline]
    pub fn max_block_size(&self) -> u32 {
        self.pipeline.max_block_size()
    }

    /// Outbound events dropped during the last `render` call.
    #[inline]
    pub fn dropped_event_count(&self) -> usize {
        self.dropped_event_count
    }

    #[inline]
    pub fn engine(&self) -> &E {
        &*self.engine
    }

    /// Mutable engine access. Rebuild the pipeline if the endpoints change.
    #[inline]
    pub fn engine_mut(&mut self) -> &mut E {
        &mut *self.engine
    }
}
