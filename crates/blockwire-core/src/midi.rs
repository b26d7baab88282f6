//! Short MIDI messages and the bounded outbound event writer.
//!
//! Engines exchange MIDI as a single packed integer (`midiBytes`), laid out as
//! `(status << 16) | (data1 << 8) | data2`. [`MidiMessage`] converts between
//! that form and raw bytes; [`MidiEvent`] adds the frame offset within the
//! current host block.

/// A three-byte short MIDI message.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct MidiMessage {
    pub bytes: [u8; 3],
}

impl MidiMessage {
    pub const fn new(status: u8, data1: u8, data2: u8) -> Self {
        Self {
            bytes: [status, data1, data2],
        }
    }

    /// Unpack from the engine's `midiBytes` integer.
    #[inline]
    pub const fn from_packed(packed: i32) -> Self {
        let packed = packed as u32;
        Self::new((packed >> 16) as u8, (packed >> 8) as u8, packed as u8)
    }

    /// Pack into the engine's `midiBytes` integer.
    #[inline]
    pub const fn packed(self) -> i32 {
        ((self.bytes[0] as i32) << 16) | ((self.bytes[1] as i32) << 8) | self.bytes[2] as i32
    }

    pub const fn note_on(channel: u8, note: u8, velocity: u8) -> Self {
        Self::new(0x90 | (channel & 0x0F), note & 0x7F, velocity & 0x7F)
    }

    pub const fn note_off(channel: u8, note: u8, velocity: u8) -> Self {
        Self::new(0x80 | (channel & 0x0F), note & 0x7F, velocity & 0x7F)
    }

    pub const fn control_change(channel: u8, controller: u8, value: u8) -> Self {
        Self::new(0xB0 | (channel & 0x0F), controller & 0x7F, value & 0x7F)
    }

    /// Status nibble (0x80..=0xF0).
    #[inline]
    pub const fn status(self) -> u8 {
        self.bytes[0] & 0xF0
    }

    /// Channel nibble (0-15).
    #[inline]
    pub const fn channel(self) -> u8 {
        self.bytes[0] & 0x0F
    }
}

/// A MIDI message scheduled at a frame offset within the host block.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MidiEvent {
    /// Frame offset relative to the start of the current host block.
    pub frame_index: u32,
    pub message: MidiMessage,
}

impl MidiEvent {
    pub const fn new(frame_index: u32, message: MidiMessage) -> Self {
        Self {
            frame_index,
            message,
        }
    }

    /// Build an event from the engine's packed representation.
    #[inline]
    pub const fn from_packed_midi_data(frame_index: u32, packed: i32) -> Self {
        Self::new(frame_index, MidiMessage::from_packed(packed))
    }

    #[inline]
    pub const fn packed_midi_data(&self) -> i32 {
        self.message.packed()
    }
}

/// Host-owned outbound event buffer with a fixed capacity.
///
/// Events pushed past capacity are dropped and counted; the host sizes the
/// buffer to keep that count at zero.
pub struct EventOutput<'a> {
    events: &'a mut [MidiEvent],
    count: usize,
    dropped: usize,
}

impl<'a> EventOutput<'a> {
    /// Wrap the host's buffer. Its length is the capacity.
    pub fn new(events: &'a mut [MidiEvent]) -> Self {
        Self {
            events,
            count: 0,
            dropped: 0,
        }
    }

    /// Append an event if there's capacity.
    #[inline]
    pub fn push(&mut self, event: MidiEvent) -> bool {
        match self.events.get_mut(self.count) {
            Some(slot) => {
                *slot = event;
                self.count += 1;
                true
            }
            None => {
                self.dropped += 1;
                false
            }
        }
    }

    /// Number of events written so far.
    #[inline]
    pub fn len(&self) -> usize {
        self.count
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.events.len()
    }

    /// Number of events rejected because the buffer was full.
    #[inline]
    pub fn dropped(&self) -> usize {
        self.dropped
    }

    /// The events written so far.
    #[inline]
    pub fn as_slice(&self) -> &[MidiEvent] {
        &self.events[..self.count]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_packed_layout() {
        let msg = MidiMessage::note_on(2, 60, 100);
        assert_eq!(msg.packed(), (0x92 << 16) | (60 << 8) | 100);
        assert_eq!(MidiMessage::from_packed(msg.packed()), msg);
    }

    #[test]
    fn test_status_and_channel() {
        let msg = MidiMessage::control_change(15, 7, 127);
        assert_eq!(msg.status(), 0xB0);
        assert_eq!(msg.channel(), 15);
    }

    #[test]
    fn test_from_packed_ignores_high_byte() {
        let msg = MidiMessage::from_packed(0x7F80_4020);
        assert_eq!(msg.bytes, [0x80, 0x40, 0x20]);
    }

    #[test]
    fn test_event_output_capacity() {
        let mut storage = [MidiEvent::default(); 2];
        let mut out = EventOutput::new(&mut storage);
        let ev = MidiEvent::new(3, MidiMessage::note_off(0, 60, 0));

        assert!(out.push(ev));
        assert!(out.push(ev));
        assert!(!out.push(ev));
        assert_eq!(out.len(), 2);
        assert_eq!(out.dropped(), 1);
        assert_eq!(out.as_slice()[1], ev);
    }

    #[test]
    fn test_event_output_zero_capacity() {
        let mut out = EventOutput::new(&mut []);
        assert!(!out.push(MidiEvent::default()));
        assert!(out.is_empty());
        assert_eq!(out.capacity(), 0);
    }
}
