// Carton
// Copyright (c) 2026 The Project Carton Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use carton_core::errors::{decode_error, Result};
use carton_core::formats::Codec;
use carton_core::io::ReadBytes;

use crate::atoms::{Atom, AtomHeader, AtomType};

/// Maps a sample entry FourCC to a codec. FourCCs outside the closed set stay
/// unknown.
fn codec_from_sample_entry(atom_type: AtomType) -> Codec {
    match atom_type {
        AtomType::AudioSampleEntryMp4a => Codec::Aac,
        AtomType::AudioSampleEntryAc3 => Codec::Ac3,
        AtomType::AudioSampleEntryEc3 => Codec::Eac3,
        AtomType::AudioSampleEntryAlac => Codec::Alac,
        AtomType::AudioSampleEntryFlac => Codec::Flac,
        AtomType::AudioSampleEntryOpus => Codec::Opus,
        AtomType::AudioSampleEntryMp3 => Codec::Mp3,
        AtomType::AudioSampleEntryS16Le => Codec::PcmS16Le,
        AtomType::AudioSampleEntryS16Be => Codec::PcmS16Be,
        AtomType::AudioSampleEntryS24 => Codec::PcmS24Le,
        AtomType::AudioSampleEntryF32 => Codec::PcmF32Le,
        AtomType::AudioSampleEntryLpcm => Codec::PcmS16Le,
        AtomType::VisualSampleEntryAvc1 => Codec::Avc,
        AtomType::VisualSampleEntryHev1 | AtomType::VisualSampleEntryHvc1 => Codec::Hevc,
        AtomType::VisualSampleEntryVp8 => Codec::Vp8,
        AtomType::VisualSampleEntryVp9 => Codec::Vp9,
        AtomType::VisualSampleEntryAv1 => Codec::Av1,
        AtomType::VisualSampleEntryMp4v => Codec::Mpeg4,
        _ => Codec::Unknown,
    }
}

/// One sample description: the detected codec and the format-specific payload
/// following the 6-byte reserved block and data reference index.
#[derive(Debug)]
pub(crate) struct StsdEntry {
    pub codec: Codec,
    pub extra: Box<[u8]>,
}

impl StsdEntry {
    /// Channel count of an audio sample entry, from the format-convention
    /// fixed byte offset of the payload.
    pub(crate) fn audio_channels(&self) -> Option<u32> {
        self.extra.get(8..10).map(|b| u32::from(u16::from_be_bytes([b[0], b[1]])))
    }

    /// Bits per sample of an audio sample entry.
    pub(crate) fn audio_bit_depth(&self) -> Option<u32> {
        self.extra.get(10..12).map(|b| u32::from(u16::from_be_bytes([b[0], b[1]])))
    }

    /// Sample rate of an audio sample entry, a 16.16 fixed-point value.
    pub(crate) fn audio_sample_rate(&self) -> Option<f64> {
        self.extra
            .get(16..20)
            .map(|b| f64::from(u32::from_be_bytes([b[0], b[1], b[2], b[3]]) >> 16))
    }

    /// Width and height of a visual sample entry.
    pub(crate) fn video_dimensions(&self) -> Option<(u32, u32)> {
        let width = self.extra.get(16..18).map(|b| u32::from(u16::from_be_bytes([b[0], b[1]])))?;
        let height = self.extra.get(18..20).map(|b| u32::from(u16::from_be_bytes([b[0], b[1]])))?;
        Some((width, height))
    }
}

/// Sample description atom.
#[derive(Debug)]
pub(crate) struct StsdAtom {
    pub entries: Vec<StsdEntry>,
}

impl StsdAtom {
    /// The first sample description, which describes the track's codec.
    pub(crate) fn primary(&self) -> Option<&StsdEntry> {
        self.entries.first()
    }
}

impl Atom for StsdAtom {
    fn read<B: ReadBytes>(reader: &mut B, header: AtomHeader) -> Result<Self> {
        let (_, _) = header.read_extended_header(reader)?;

        let entry_count = reader.read_be_u32()?;

        let mut entries = Vec::new();

        for _ in 0..entry_count {
            let entry = AtomHeader::read(reader)?;

            let data_len = match entry.data_len() {
                Some(len) if len >= 8 => len,
                _ => return decode_error("isomp4 (stsd): invalid sample entry size"),
            };

            // Six reserved bytes and the data reference index precede the
            // format-specific payload.
            reader.ignore_bytes(8)?;
            let extra = reader.read_boxed_slice_exact((data_len - 8) as usize)?;

            entries.push(StsdEntry { codec: codec_from_sample_entry(entry.atom_type), extra });
        }

        Ok(StsdAtom { entries })
    }
}
