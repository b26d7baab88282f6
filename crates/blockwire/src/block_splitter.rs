//! Sub-block splitting for sample-accurate event delivery.
//!
//! The engine only accepts events that have already happened: everything
//! queued before an advance takes effect at the first frame of that advance.
//! To deliver an event at frame `t`, the host block is split so that a
//! sub-block starts exactly at `t`.
//!
//! ```text
//! host block:   |0 ............................................ 512|
//! events:                 ^100                   ^300
//! sub-blocks:   [0, 100)  [100, 300)             [300, 512)
//! ```
//!
//! Sub-blocks are additionally capped at the pipeline's maximum block size.

use std::ops::Range;

use blockwire_core::{ChannelArrayView, ChannelArrayViewMut, EventOutput, MidiEvent};

/// One slice of the host block handed to a single engine advance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubBlock {
    /// First frame of the sub-block, relative to the host block.
    pub frame_offset: u32,
    /// Number of frames to advance.
    pub num_frames: u32,
    /// Indices of the inbound events delivered at the start of this sub-block.
    pub events: Range<usize>,
}

/// Iterator over the sub-blocks of one host block.
///
/// Inbound events must be sorted by frame index. Events at or before the
/// current offset are delivered with the current sub-block; the next later
/// event ends it.
pub struct SubBlocks<'a> {
    events: &'a [MidiEvent],
    next_event: usize,
    frame_offset: u32,
    frames_remaining: u32,
    max_frames: u32,
}

impl<'a> SubBlocks<'a> {
    /// Split `num_frames` frames into sub-blocks of at most `max_frames`.
    ///
    /// # Panics
    ///
    /// Panics if `max_frames` is zero while there are frames to render.
    pub fn new(num_frames: u32, max_frames: u32, events: &'a [MidiEvent]) -> Self {
        assert!(max_frames > 0 || num_frames == 0, "sub-block size must be non-zero");
        Self {
            events,
            next_event: 0,
            frame_offset: 0,
            frames_remaining: num_frames,
            max_frames,
        }
    }
}

impl Iterator for SubBlocks<'_> {
    type Item = SubBlock;

    fn next(&mut self) -> Option<SubBlock> {
        if self.frames_remaining == 0 {
            return None;
        }

        let mut frames_to_do = self.max_frames.min(self.frames_remaining);
        let first_event = self.next_event;

        while let Some(event) = self.events.get(self.next_event) {
            if event.frame_index > self.frame_offset {
                frames_to_do = frames_to_do.min(event.frame_index - self.frame_offset);
                break;
            }
            self.next_event += 1;
        }

        let block = SubBlock {
            frame_offset: self.frame_offset,
            num_frames: frames_to_do,
            events: first_event..self.next_event,
        };

        self.frame_offset += frames_to_do;
        self.frames_remaining -= frames_to_do;
        Some(block)
    }
}

/// Everything an operation can see while one sub-block is rendered.
///
/// Created fresh for every sub-block and dropped before the next one.
pub struct RenderContext<'r, 'h, 'm> {
    /// Frames rendered since the pipeline was built, up to this sub-block.
    pub total_frames_rendered: u64,
    /// Start of this sub-block within the host block.
    pub frame_offset: u32,
    /// Host inputs restricted to this sub-block.
    pub input_channels: ChannelArrayView<'r>,
    /// Host outputs restricted to this sub-block.
    pub output_channels: ChannelArrayViewMut<'r, 'h>,
    /// Inbound events delivered at the start of this sub-block.
    pub midi_in: &'r [MidiEvent],
    /// Outbound events collected across the whole host block.
    pub midi_out: &'r mut EventOutput<'m>,
}

impl RenderContext<'_, '_, '_> {
    /// Number of frames in this sub-block.
    #[inline]
    pub fn num_frames(&self) -> usize {
        self.input_channels.num_frames()
    }
}
