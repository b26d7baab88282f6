//! Channel data movers between host channel arrays and engine streams.
//!
//! Single-channel streams are handed to the engine as a direct view over the
//! host slice. Multi-channel streams need frame-major data, so inputs are
//! interleaved into an [`InterleavedBuffer`] owned by the operation, and
//! outputs are de-interleaved by [`copy_intersection_and_clear_outside`].
//!
//! # Real-Time Safety
//!
//! - `InterleavedBuffer` is allocated once, sized to the maximum sub-block
//! - Neither mover allocates during rendering

use blockwire_core::{ChannelArrayView, ChannelArrayViewMut, StreamFrames};

/// Pre-allocated frame-major scratch buffer for one multi-channel stream.
pub struct InterleavedBuffer {
    data: Vec<f32>,
    num_channels: usize,
    max_frames: usize,
}

impl InterleavedBuffer {
    /// Allocate storage for `num_channels * max_frames` samples.
    pub fn new(num_channels: usize, max_frames: usize) -> Self {
        Self {
            data: vec![0.0; num_channels * max_frames],
            num_channels,
            max_frames,
        }
    }

    #[inline]
    pub fn num_channels(&self) -> usize {
        self.num_channels
    }

    #[inline]
    pub fn max_frames(&self) -> usize {
        self.max_frames
    }

    /// Interleave `num_channels` host channels starting at `start_channel`.
    ///
    /// Channels the host did not supply are written as silence. Returns the
    /// interleaved frames for the view's frame window.
    ///
    /// # Panics
    ///
    /// Panics if the view holds more frames than the buffer was sized for.
    pub fn interleave_from(
        &mut self,
        source: &ChannelArrayView<'_>,
        start_channel: usize,
    ) -> StreamFrames<'_> {
        let num_frames = source.num_frames();
        assert!(
            num_frames <= self.max_frames,
            "sub-block of {num_frames} frames exceeds interleave buffer ({})",
            self.max_frames
        );

        let stride = self.num_channels;
        let used = &mut self.data[..num_frames * stride];

        for channel in 0..stride {
            match source.get_channel(start_channel + channel) {
                Some(samples) => {
                    for (frame, &sample) in samples.iter().enumerate() {
                        used[frame * stride + channel] = sample;
                    }
                }
                None => {
                    for frame in 0..num_frames {
                        used[frame * stride + channel] = 0.0;
                    }
                }
            }
        }

        StreamFrames::Interleaved {
            data: used,
            num_channels: stride,
        }
    }
}

/// Copy engine frames into a host channel range, clearing what is left over.
///
/// Writes the intersection of `[start_channel, start_channel + num_channels)`
/// with the host's channels. Any sample in that range the engine did not
/// produce (missing channels or a short frame count) is zeroed so the host
/// never sees stale output.
pub fn copy_intersection_and_clear_outside(
    dest: &mut ChannelArrayViewMut<'_, '_>,
    start_channel: usize,
    num_channels: usize,
    source: StreamFrames<'_>,
) {
    let end_channel = (start_channel + num_channels).min(dest.num_channels());
    let frames = source.num_frames().min(dest.num_frames());
    let source_channels = source.num_channels();

    for (index, host_channel) in (start_channel..end_channel).enumerate() {
        let out = dest.channel_mut(host_channel);

        if index < source_channels {
            for (frame, sample) in out[..frames].iter_mut().enumerate() {
                *sample = source.sample(frame, index);
            }
            out[frames..].fill(0.0);
        } else {
            out.fill(0.0);
        }
    }
}
