// Carton
// Copyright (c) 2026 The Project Carton Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The `formats` module defines the format-agnostic track model and the
//! `ContainerReader` contract every demuxer implements.

use crate::errors::Result;

/// A `Codec` identifies the coded format of a track's payload.
///
/// The codec is detected from container metadata only; it does not imply the
/// payload can be decoded. Audio variants are ordered best-quality-first so
/// the discriminant doubles as a coarse preference rank when selecting a main
/// audio track. Extend the enum with new entries, never by pattern-matching
/// codec ID strings.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum Codec {
    // Audio codecs, in descending order of preference.
    PcmS16Le,
    PcmS16Be,
    PcmS24Le,
    PcmF32Le,
    Flac,
    Alac,
    Dts,
    Ac3,
    Eac3,
    Aac,
    Mp3,
    Vorbis,
    Opus,
    // Video codecs.
    Avc,
    Hevc,
    Vp8,
    Vp9,
    Av1,
    Mpeg4,
    // Anything the closed dictionaries do not map.
    Unknown,
}

impl Codec {
    /// Returns true if the codec carries audio.
    pub fn is_audio(&self) -> bool {
        matches!(
            self,
            Codec::PcmS16Le
                | Codec::PcmS16Be
                | Codec::PcmS24Le
                | Codec::PcmF32Le
                | Codec::Flac
                | Codec::Alac
                | Codec::Dts
                | Codec::Ac3
                | Codec::Eac3
                | Codec::Aac
                | Codec::Mp3
                | Codec::Vorbis
                | Codec::Opus
        )
    }

    /// Returns true if the codec carries video.
    pub fn is_video(&self) -> bool {
        matches!(
            self,
            Codec::Avc | Codec::Hevc | Codec::Vp8 | Codec::Vp9 | Codec::Av1 | Codec::Mpeg4
        )
    }
}

/// Audio-specific track metadata.
#[derive(Clone, Debug, PartialEq)]
pub struct AudioExtra {
    /// The sampling frequency in Hz.
    pub sample_rate: f64,
    /// The number of audio channels.
    pub channels: u32,
    /// The number of bits per sample, if declared.
    pub bit_depth: Option<u32>,
}

/// Video-specific track metadata.
#[derive(Clone, Debug, PartialEq)]
pub struct VideoExtra {
    /// The frame width in pixels.
    pub width: u32,
    /// The frame height in pixels.
    pub height: u32,
    /// The nominal frame rate in frames per second, 0.0 if unknown.
    pub frame_rate: f64,
    /// Codec-private initialization bytes, if the container carries any.
    pub codec_private: Option<Box<[u8]>>,
}

/// Format-specific extra metadata attached to a track.
#[derive(Clone, Debug, PartialEq)]
pub enum TrackExtra {
    Audio(AudioExtra),
    Video(VideoExtra),
}

/// A `Track` is one elementary stream inside a container.
///
/// A track is addressed two ways: by its container-native `id` (not
/// necessarily contiguous) and by `index`, its position in the owning
/// reader's track array. Metadata is immutable after skeleton parsing.
#[derive(Clone, Debug)]
pub struct Track {
    /// The container-native track identifier.
    pub id: u32,
    /// The position of this track in the owning reader's track list.
    pub index: usize,
    /// The track name, if declared.
    pub name: Option<String>,
    /// The track language code. Defaults to `"eng"` when the container does
    /// not declare one.
    pub language: String,
    /// The detected codec.
    pub codec: Codec,
    /// Audio or video specific metadata.
    pub extra: Option<TrackExtra>,
}

/// Accumulates parsed track fields during skeleton parsing. The final,
/// immutable [`Track`] is constructed once its index in the reader's track
/// array is known.
#[derive(Debug)]
pub struct TrackBuilder {
    id: u32,
    name: Option<String>,
    language: Option<String>,
    codec: Codec,
    extra: Option<TrackExtra>,
}

impl TrackBuilder {
    pub fn new(id: u32) -> Self {
        TrackBuilder { id, name: None, language: None, codec: Codec::Unknown, extra: None }
    }

    pub fn with_name(mut self, name: Option<String>) -> Self {
        self.name = name;
        self
    }

    pub fn with_language(mut self, language: Option<String>) -> Self {
        self.language = language;
        self
    }

    pub fn with_codec(mut self, codec: Codec) -> Self {
        self.codec = codec;
        self
    }

    pub fn with_extra(mut self, extra: Option<TrackExtra>) -> Self {
        self.extra = extra;
        self
    }

    /// Freezes the builder into a `Track` at the given reader-local index.
    pub fn build(self, index: usize) -> Track {
        Track {
            id: self.id,
            index,
            name: self.name,
            language: self.language.unwrap_or_else(|| "eng".to_string()),
            codec: self.codec,
            extra: self.extra,
        }
    }
}

/// `ContainerReader` is the contract every demuxer session implements.
///
/// A reader owns exactly one underlying stream cursor. Reading a block for
/// *any* track repositions that shared cursor, so interleaved per-track reads
/// must be serialized by the caller. Not thread-safe: one reader, one thread.
/// Dropping the reader closes the underlying stream.
pub trait ContainerReader {
    /// Gets the tracks resolved during skeleton parsing. Order is fixed for
    /// the session's lifetime and `tracks()[i].index == i` holds for all i.
    fn tracks(&self) -> &[Track];

    /// Gets the total duration of the container in seconds.
    fn duration(&self) -> f64;

    /// Reads the next contiguous byte payload for the given track, advancing
    /// that track's cursor. Returns `Ok(None)` at end of stream.
    fn read_next_block(&mut self, track: usize) -> Result<Option<Box<[u8]>>>;

    /// Cheap, non-consuming lookahead: returns true if a call to
    /// [`ContainerReader::read_next_block`] for this track would yield data.
    fn is_next_block_available(&mut self, track: usize) -> Result<bool>;

    /// Returns true when the track's next block can be decoded independently
    /// of any other block.
    fn is_next_block_keyframe(&mut self, track: usize) -> Result<bool>;

    /// Seeks all tracks to the given position in seconds. Returns the
    /// actually achieved position, or `-1.0` if seeking did not change
    /// position or is unsupported for this container.
    fn seek(&mut self, pos_secs: f64) -> Result<f64>;

    /// Selects the main audio track: the first track whose codec is audio,
    /// preferring the numerically lowest `Codec` discriminant among audio
    /// tracks. Returns the track index, or `None` if no track carries audio.
    fn main_audio_track(&self) -> Option<usize> {
        let mut best: Option<&Track> = None;

        for track in self.tracks() {
            if !track.codec.is_audio() {
                continue;
            }
            match best {
                Some(b) if track.codec >= b.codec => (),
                _ => best = Some(track),
            }
        }

        best.map(|track| track.index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct DummyReader {
        tracks: Vec<Track>,
    }

    impl ContainerReader for DummyReader {
        fn tracks(&self) -> &[Track] {
            &self.tracks
        }
        fn duration(&self) -> f64 {
            0.0
        }
        fn read_next_block(&mut self, _: usize) -> Result<Option<Box<[u8]>>> {
            Ok(None)
        }
        fn is_next_block_available(&mut self, _: usize) -> Result<bool> {
            Ok(false)
        }
        fn is_next_block_keyframe(&mut self, _: usize) -> Result<bool> {
            Ok(false)
        }
        fn seek(&mut self, _: f64) -> Result<f64> {
            Ok(-1.0)
        }
    }

    fn track(index: usize, codec: Codec) -> Track {
        TrackBuilder::new(index as u32 + 1).with_codec(codec).build(index)
    }

    #[test]
    fn verify_main_audio_track_prefers_lowest_codec() {
        let reader = DummyReader {
            tracks: vec![
                track(0, Codec::Avc),
                track(1, Codec::Aac),
                track(2, Codec::PcmS16Le),
                track(3, Codec::Mp3),
            ],
        };
        // PCM ranks above AAC and MP3.
        assert_eq!(reader.main_audio_track(), Some(2));
    }

    #[test]
    fn verify_main_audio_track_first_wins_ties() {
        let reader = DummyReader {
            tracks: vec![track(0, Codec::Avc), track(1, Codec::Aac), track(2, Codec::Aac)],
        };
        assert_eq!(reader.main_audio_track(), Some(1));
    }

    #[test]
    fn verify_main_audio_track_none_without_audio() {
        let reader = DummyReader { tracks: vec![track(0, Codec::Avc), track(1, Codec::Unknown)] };
        assert_eq!(reader.main_audio_track(), None);
    }

    #[test]
    fn verify_track_builder_defaults() {
        let track = TrackBuilder::new(7).build(0);
        assert_eq!(track.id, 7);
        assert_eq!(track.index, 0);
        assert_eq!(track.language, "eng");
        assert_eq!(track.codec, Codec::Unknown);
        assert!(track.extra.is_none());
    }
}
