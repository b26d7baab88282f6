//! Non-owning views over host audio channels.
//!
//! The host hands the wrapper one slice per channel. The views here add a
//! frame window on top of those slices so the render loop can restrict them
//! to a sub-block without collecting new slice arrays.
//!
//! # Real-Time Safety
//!
//! - Views only hold borrowed slices plus two integers
//! - `frame_range()` is O(1) and never allocates

use std::ops::Range;

/// Read-only channel array restricted to a frame window.
#[derive(Clone, Copy)]
pub struct ChannelArrayView<'a> {
    channels: &'a [&'a [f32]],
    start: usize,
    num_frames: usize,
}

impl<'a> ChannelArrayView<'a> {
    /// Create a view over `num_frames` frames of every channel.
    ///
    /// # Panics
    ///
    /// Panics if any channel is shorter than `num_frames`.
    pub fn new(channels: &'a [&'a [f32]], num_frames: usize) -> Self {
        assert!(
            channels.iter().all(|ch| ch.len() >= num_frames),
            "input channel shorter than {num_frames} frames"
        );
        Self {
            channels,
            start: 0,
            num_frames,
        }
    }

    #[inline]
    pub fn num_channels(&self) -> usize {
        self.channels.len()
    }

    #[inline]
    pub fn num_frames(&self) -> usize {
        self.num_frames
    }

    /// One channel, restricted to the view's frame window.
    #[inline]
    pub fn channel(&self, index: usize) -> &'a [f32] {
        &self.channels[index][self.start..self.start + self.num_frames]
    }

    /// Same as [`channel`](Self::channel) but `None` when out of range.
    #[inline]
    pub fn get_channel(&self, index: usize) -> Option<&'a [f32]> {
        self.channels
            .get(index)
            .map(|ch| &ch[self.start..self.start + self.num_frames])
    }

    /// Sub-view over `range`, relative to this view's window.
    #[inline]
    pub fn frame_range(&self, range: Range<usize>) -> Self {
        assert!(range.start <= range.end && range.end <= self.num_frames);
        Self {
            channels: self.channels,
            start: self.start + range.start,
            num_frames: range.end - range.start,
        }
    }
}

/// Writable channel array restricted to a frame window.
pub struct ChannelArrayViewMut<'s, 'h> {
    channels: &'s mut [&'h mut [f32]],
    start: usize,
    num_frames: usize,
}

impl<'s, 'h> ChannelArrayViewMut<'s, 'h> {
    /// Create a view over `num_frames` frames of every channel.
    ///
    /// # Panics
    ///
    /// Panics if any channel is shorter than `num_frames`.
    pub fn new(channels: &'s mut [&'h mut [f32]], num_frames: usize) -> Self {
        assert!(
            channels.iter().all(|ch| ch.len() >= num_frames),
            "output channel shorter than {num_frames} frames"
        );
        Self {
            channels,
            start: 0,
            num_frames,
        }
    }

    #[inline]
    pub fn num_channels(&self) -> usize {
        self.channels.len()
    }

    #[inline]
    pub fn num_frames(&self) -> usize {
        self.num_frames
    }

    #[inline]
    pub fn channel(&self, index: usize) -> &[f32] {
        &self.channels[index][self.start..self.start + self.num_frames]
    }

    #[inline]
    pub fn channel_mut(&mut self, index: usize) -> &mut [f32] {
        let window = self.start..self.start + self.num_frames;
        &mut self.channels[index][window]
    }

    /// Reborrowed sub-view over `range`, relative to this view's window.
    #[inline]
    pub fn frame_range(&mut self, range: Range<usize>) -> ChannelArrayViewMut<'_, 'h> {
        assert!(range.start <= range.end && range.end <= self.num_frames);
        ChannelArrayViewMut {
            channels: &mut *self.channels,
            start: self.start + range.start,
            num_frames: range.end - range.start,
        }
    }

    /// Zero every channel within the window.
    pub fn clear(&mut self) {
        for index in 0..self.channels.len() {
            self.channel_mut(index).fill(0.0);
        }
    }
}

/// Frames exchanged with an engine stream endpoint.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StreamFrames<'a> {
    /// One channel, one sample per frame.
    Mono(&'a [f32]),
    /// Frame-major interleaved samples.
    Interleaved {
        data: &'a [f32],
        num_channels: usize,
    },
}

impl<'a> StreamFrames<'a> {
    #[inline]
    pub fn num_channels(&self) -> usize {
        match self {
            Self::Mono(_) => 1,
            Self::Interleaved { num_channels, .. } => *num_channels,
        }
    }

    #[inline]
    pub fn num_frames(&self) -> usize {
        match self {
            Self::Mono(data) => data.len(),
            Self::Interleaved { num_channels: 0, .. } => 0,
            Self::Interleaved { data, num_channels } => data.len() / num_channels,
        }
    }

    /// Sample at `frame` of `channel`.
    #[inline]
    pub fn sample(&self, frame: usize, channel: usize) -> f32 {
        match self {
            Self::Mono(data) => data[frame],
            Self::Interleaved { data, num_channels } => data[frame * num_channels + channel],
        }
    }
}
