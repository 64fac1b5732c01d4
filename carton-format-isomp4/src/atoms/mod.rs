// Carton
// Copyright (c) 2026 The Project Carton Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use carton_core::errors::{decode_error, Result};
use carton_core::io::ReadBytes;

pub(crate) mod co64;
pub(crate) mod edts;
pub(crate) mod elst;
pub(crate) mod ftyp;
pub(crate) mod mdhd;
pub(crate) mod mdia;
pub(crate) mod minf;
pub(crate) mod moov;
pub(crate) mod mvhd;
pub(crate) mod stbl;
pub(crate) mod stco;
pub(crate) mod stsc;
pub(crate) mod stsd;
pub(crate) mod stss;
pub(crate) mod stsz;
pub(crate) mod stts;
pub(crate) mod tkhd;
pub(crate) mod trak;

pub(crate) use co64::Co64Atom;
pub(crate) use edts::EdtsAtom;
pub(crate) use elst::ElstAtom;
pub(crate) use ftyp::FtypAtom;
pub(crate) use mdhd::MdhdAtom;
pub(crate) use mdia::MdiaAtom;
pub(crate) use minf::MinfAtom;
pub(crate) use moov::MoovAtom;
pub(crate) use mvhd::MvhdAtom;
pub(crate) use stbl::StblAtom;
pub(crate) use stco::StcoAtom;
pub(crate) use stsc::StscAtom;
pub(crate) use stsd::StsdAtom;
pub(crate) use stss::StssAtom;
pub(crate) use stsz::{SampleSize, StszAtom};
pub(crate) use stts::SttsAtom;
pub(crate) use tkhd::TkhdAtom;
pub(crate) use trak::TrakAtom;

/// Atom types. FourCCs outside the recognized set degrade to the opaque
/// `Other` variant carrying the raw code.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum AtomType {
    AudioSampleEntryAc3,
    AudioSampleEntryAlac,
    AudioSampleEntryEc3,
    AudioSampleEntryF32,
    AudioSampleEntryFlac,
    AudioSampleEntryLpcm,
    AudioSampleEntryMp3,
    AudioSampleEntryMp4a,
    AudioSampleEntryOpus,
    AudioSampleEntryS16Be,
    AudioSampleEntryS16Le,
    AudioSampleEntryS24,
    ChunkOffset,
    ChunkOffset64,
    Edit,
    EditList,
    FileType,
    Free,
    Media,
    MediaData,
    MediaHeader,
    MediaInfo,
    Movie,
    MovieHeader,
    SampleDescription,
    SampleSize,
    SampleTable,
    SampleToChunk,
    Skip,
    SyncSample,
    TimeToSample,
    Track,
    TrackHeader,
    VisualSampleEntryAv1,
    VisualSampleEntryAvc1,
    VisualSampleEntryHev1,
    VisualSampleEntryHvc1,
    VisualSampleEntryMp4v,
    VisualSampleEntryVp8,
    VisualSampleEntryVp9,
    Other([u8; 4]),
}

impl From<[u8; 4]> for AtomType {
    fn from(val: [u8; 4]) -> Self {
        match &val {
            b".mp3" => AtomType::AudioSampleEntryMp3,
            b"ac-3" => AtomType::AudioSampleEntryAc3,
            b"alac" => AtomType::AudioSampleEntryAlac,
            b"av01" => AtomType::VisualSampleEntryAv1,
            b"avc1" => AtomType::VisualSampleEntryAvc1,
            b"co64" => AtomType::ChunkOffset64,
            b"ec-3" => AtomType::AudioSampleEntryEc3,
            b"edts" => AtomType::Edit,
            b"elst" => AtomType::EditList,
            b"fl32" => AtomType::AudioSampleEntryF32,
            b"fLaC" => AtomType::AudioSampleEntryFlac,
            b"free" => AtomType::Free,
            b"ftyp" => AtomType::FileType,
            b"hev1" => AtomType::VisualSampleEntryHev1,
            b"hvc1" => AtomType::VisualSampleEntryHvc1,
            b"in24" => AtomType::AudioSampleEntryS24,
            b"lpcm" => AtomType::AudioSampleEntryLpcm,
            b"mdat" => AtomType::MediaData,
            b"mdhd" => AtomType::MediaHeader,
            b"mdia" => AtomType::Media,
            b"minf" => AtomType::MediaInfo,
            b"moov" => AtomType::Movie,
            b"mp4a" => AtomType::AudioSampleEntryMp4a,
            b"mp4v" => AtomType::VisualSampleEntryMp4v,
            b"mvhd" => AtomType::MovieHeader,
            b"Opus" => AtomType::AudioSampleEntryOpus,
            b"skip" => AtomType::Skip,
            b"sowt" => AtomType::AudioSampleEntryS16Le,
            b"stbl" => AtomType::SampleTable,
            b"stco" => AtomType::ChunkOffset,
            b"stsc" => AtomType::SampleToChunk,
            b"stsd" => AtomType::SampleDescription,
            b"stss" => AtomType::SyncSample,
            b"stsz" => AtomType::SampleSize,
            b"stts" => AtomType::TimeToSample,
            b"tkhd" => AtomType::TrackHeader,
            b"trak" => AtomType::Track,
            b"twos" => AtomType::AudioSampleEntryS16Be,
            b"vp08" => AtomType::VisualSampleEntryVp8,
            b"vp09" => AtomType::VisualSampleEntryVp9,
            _ => AtomType::Other(val),
        }
    }
}

/// Common atom header.
#[derive(Copy, Clone, Debug)]
pub(crate) struct AtomHeader {
    /// The atom type.
    pub atom_type: AtomType,
    /// The position of the atom's first byte, i.e. its size field.
    pub atom_pos: u64,
    /// The position of the first payload byte.
    pub data_pos: u64,
    /// The exclusive end position of the atom, if its size is known. An atom
    /// of declared size 0 spans to the end of the stream.
    pub atom_end: Option<u64>,
}

impl AtomHeader {
    /// Size of a standard atom header.
    const HEADER_SIZE: u64 = 8;
    /// Size of an atom header carrying a 64-bit size.
    const LARGE_HEADER_SIZE: u64 = AtomHeader::HEADER_SIZE + 8;

    /// Reads an atom header: a 32-bit size and a FourCC, with the size values
    /// 0 (to end of stream) and 1 (64-bit size follows) handled.
    pub(crate) fn read<B: ReadBytes>(reader: &mut B) -> Result<AtomHeader> {
        let atom_pos = reader.pos();

        let atom_len = u64::from(reader.read_be_u32()?);

        let mut fourcc = [0u8; 4];
        reader.read_buf_exact(&mut fourcc)?;
        let atom_type = AtomType::from(fourcc);

        let atom_end = match atom_len {
            0 => None,
            1 => {
                let large_atom_len = reader.read_be_u64()?;
                if large_atom_len < AtomHeader::LARGE_HEADER_SIZE {
                    return decode_error("isomp4: atom size is invalid");
                }
                Some(atom_pos + large_atom_len)
            }
            _ => {
                if atom_len < AtomHeader::HEADER_SIZE {
                    return decode_error("isomp4: atom size is invalid");
                }
                Some(atom_pos + atom_len)
            }
        };

        Ok(AtomHeader { atom_type, atom_pos, data_pos: reader.pos(), atom_end })
    }

    /// If the atom size is known, gets the total payload size.
    pub(crate) fn data_len(&self) -> Option<u64> {
        self.atom_end.map(|end| end - self.data_pos)
    }

    /// Reads the version and flags fields of a full atom, consuming 4 bytes
    /// of the payload.
    pub(crate) fn read_extended_header<B: ReadBytes>(
        &self,
        reader: &mut B,
    ) -> Result<(u8, u32)> {
        if let Some(data_len) = self.data_len() {
            if data_len < 4 {
                return decode_error("isomp4: full atom too small");
            }
        }
        Ok((reader.read_byte()?, reader.read_be_u24()?))
    }
}

pub(crate) trait Atom: Sized {
    fn read<B: ReadBytes>(reader: &mut B, header: AtomHeader) -> Result<Self>;
}

/// Iterates over sibling atoms within a parent atom or at the top level of a
/// stream.
///
/// After a child atom is yielded and its payload (partially) consumed, the
/// cursor is force-set to the child's end before the next header read. This
/// guarantees forward progress even on partially-understood atoms. `free` and
/// `skip` atoms are skipped in place; they never surface to the caller.
pub(crate) struct AtomIterator<B: ReadBytes> {
    reader: B,
    end: Option<u64>,
    next_atom_pos: u64,
}

impl<B: ReadBytes> AtomIterator<B> {
    /// Creates an iterator over top-level atoms, bounded by `end` if the
    /// total stream length is known.
    pub(crate) fn new_root(reader: B, end: Option<u64>) -> Self {
        let next_atom_pos = reader.pos();
        AtomIterator { reader, end, next_atom_pos }
    }

    /// Creates an iterator over the children of `parent`. The reader must be
    /// positioned at the parent's payload.
    pub(crate) fn new(reader: B, parent: &AtomHeader) -> Self {
        assert_eq!(reader.pos(), parent.data_pos, "unexpected position");
        AtomIterator { reader, end: parent.atom_end, next_atom_pos: parent.data_pos }
    }

    pub(crate) fn inner_mut(&mut self) -> &mut B {
        &mut self.reader
    }

    pub(crate) fn next(&mut self) -> Result<Option<AtomHeader>> {
        loop {
            // Ignore any remaining data in the current atom that was not
            // read, and reject overreads.
            let cur_pos = self.reader.pos();
            if cur_pos < self.next_atom_pos {
                self.reader.ignore_bytes(self.next_atom_pos - cur_pos)?;
            }
            else if cur_pos > self.next_atom_pos {
                return decode_error("isomp4: overread atom");
            }

            if let Some(end) = self.end {
                if self.next_atom_pos >= end {
                    return Ok(None);
                }
            }

            let header = AtomHeader::read(&mut self.reader)?;

            // An atom of unknown size spans the remainder of the parent.
            self.next_atom_pos = match header.atom_end {
                Some(end) => end,
                None => self.end.unwrap_or(u64::MAX),
            };

            match header.atom_type {
                // Free space never becomes a tree node.
                AtomType::Free | AtomType::Skip => continue,
                _ => return Ok(Some(header)),
            }
        }
    }
}
