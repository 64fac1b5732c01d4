// Carton
// Copyright (c) 2026 The Project Carton Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::fs::File;
use std::io;
use std::path::Path;

use carton_core::errors::{decode_error, unsupported_error, Error, Result};
use carton_core::formats::{ContainerReader, Track, TrackBuilder};
use carton_core::io::{MediaSourceStream, ReadBytes};

use log::debug;

use crate::klv::KlvItem;

/// SMPTE universal label prefix shared by all partition packs. The byte after
/// it distinguishes header, body, and footer partitions.
const PARTITION_PACK_PREFIX: [u8; 13] =
    [0x06, 0x0E, 0x2B, 0x34, 0x02, 0x05, 0x01, 0x01, 0x0D, 0x01, 0x02, 0x01, 0x01];

/// Partition kind byte for the header partition.
const HEADER_PARTITION: u8 = 0x02;

/// MXF (SMPTE 377) metadata reader.
///
/// Only the header partition pack is parsed: each essence container label it
/// declares becomes a placeholder track. Essence decoding and seeking are not
/// implemented, so the corresponding operations report an unsupported
/// feature.
pub struct MxfReader {
    tracks: Vec<Track>,
}

impl MxfReader {
    /// Attempts to open an MXF stream and parse its header partition pack.
    pub fn try_new(mut stream: MediaSourceStream) -> Result<Self> {
        // Walk top-level triplets until the header partition pack. Anything
        // ahead of it (a run-in is at most 64 KiB) is stepped over.
        let item = loop {
            let item = match KlvItem::read(&mut stream) {
                Ok(item) => item,
                Err(Error::IoError(err)) if err.kind() == io::ErrorKind::UnexpectedEof => {
                    return decode_error("mxf: missing header partition");
                }
                Err(err) => return Err(err),
            };

            if item.key[..13] == PARTITION_PACK_PREFIX && item.key[13] == HEADER_PARTITION {
                break item;
            }

            if item.data_pos > u64::MAX - item.len {
                return decode_error("mxf: invalid triplet length");
            }
            stream.ignore_bytes(item.len)?;
        };

        // Partition pack layout per SMPTE 377: versions, KAG size, partition
        // and metadata offsets, index and body descriptors, the operational
        // pattern label, then the essence container batch.
        let _major_version = stream.read_be_u16()?;
        let _minor_version = stream.read_be_u16()?;
        let _kag_size = stream.read_be_u32()?;
        let _this_partition = stream.read_be_u64()?;
        let _previous_partition = stream.read_be_u64()?;
        let _footer_partition = stream.read_be_u64()?;
        let _header_byte_count = stream.read_be_u64()?;
        let _index_byte_count = stream.read_be_u64()?;
        let _index_sid = stream.read_be_u32()?;
        let _body_offset = stream.read_be_u64()?;
        let _body_sid = stream.read_be_u32()?;

        let mut operational_pattern = [0u8; 16];
        stream.read_buf_exact(&mut operational_pattern)?;

        let container_count = stream.read_be_u32()?;
        let item_len = stream.read_be_u32()?;

        if item_len != 16 {
            return decode_error("mxf: invalid essence container batch");
        }

        let mut tracks = Vec::with_capacity(container_count as usize);

        for index in 0..container_count {
            let mut label = [0u8; 16];
            stream.read_buf_exact(&mut label)?;

            if stream.pos() > item.end() {
                return decode_error("mxf: overread partition pack");
            }

            // The label alone does not identify a codec; the track is a
            // placeholder until essence parsing exists.
            tracks.push(TrackBuilder::new(index + 1).build(index as usize));
        }

        debug!(
            "header partition with {} essence container(s), operational pattern {:02X?}",
            container_count, operational_pattern
        );

        Ok(Self { tracks })
    }

    /// Opens an MXF file read-only.
    pub fn open_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        Self::try_new(MediaSourceStream::new(Box::new(file)))
    }
}

impl ContainerReader for MxfReader {
    fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    fn duration(&self) -> f64 {
        0.0
    }

    fn read_next_block(&mut self, _track: usize) -> Result<Option<Box<[u8]>>> {
        unsupported_error("mxf: essence reading")
    }

    fn is_next_block_available(&mut self, _track: usize) -> Result<bool> {
        unsupported_error("mxf: essence reading")
    }

    fn is_next_block_keyframe(&mut self, _track: usize) -> Result<bool> {
        unsupported_error("mxf: essence reading")
    }

    fn seek(&mut self, _pos_secs: f64) -> Result<f64> {
        Ok(-1.0)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use carton_core::errors::Error;
    use carton_core::formats::{Codec, ContainerReader};
    use carton_core::io::MediaSourceStream;

    use super::{MxfReader, HEADER_PARTITION, PARTITION_PACK_PREFIX};

    fn header_partition(essence_containers: u32) -> Vec<u8> {
        let mut value = Vec::new();
        value.extend_from_slice(&1u16.to_be_bytes()); // major version
        value.extend_from_slice(&3u16.to_be_bytes()); // minor version
        value.extend_from_slice(&512u32.to_be_bytes()); // KAG size
        value.extend_from_slice(&0u64.to_be_bytes()); // this partition
        value.extend_from_slice(&0u64.to_be_bytes()); // previous partition
        value.extend_from_slice(&0u64.to_be_bytes()); // footer partition
        value.extend_from_slice(&0u64.to_be_bytes()); // header byte count
        value.extend_from_slice(&0u64.to_be_bytes()); // index byte count
        value.extend_from_slice(&0u32.to_be_bytes()); // index SID
        value.extend_from_slice(&0u64.to_be_bytes()); // body offset
        value.extend_from_slice(&0u32.to_be_bytes()); // body SID
        value.extend_from_slice(&[0x06; 16]); // operational pattern

        value.extend_from_slice(&essence_containers.to_be_bytes());
        value.extend_from_slice(&16u32.to_be_bytes());
        for i in 0..essence_containers {
            value.extend_from_slice(&[i as u8; 16]);
        }

        let mut key = [0u8; 16];
        key[..13].copy_from_slice(&PARTITION_PACK_PREFIX);
        key[13] = HEADER_PARTITION;

        let mut bytes = key.to_vec();
        bytes.push(0x82);
        bytes.extend_from_slice(&(value.len() as u16).to_be_bytes());
        bytes.extend_from_slice(&value);
        bytes
    }

    fn reader_for(bytes: Vec<u8>) -> MxfReader {
        MxfReader::try_new(MediaSourceStream::new(Box::new(Cursor::new(bytes)))).unwrap()
    }

    #[test]
    fn header_partition_yields_placeholder_tracks() {
        let reader = reader_for(header_partition(2));

        assert_eq!(reader.tracks().len(), 2);
        assert_eq!(reader.duration(), 0.0);

        for (index, track) in reader.tracks().iter().enumerate() {
            assert_eq!(track.index, index);
            assert_eq!(track.id, index as u32 + 1);
            assert_eq!(track.codec, Codec::Unknown);
            assert!(track.extra.is_none());
        }

        // Placeholder tracks never qualify as audio.
        assert_eq!(reader.main_audio_track(), None);
    }

    #[test]
    fn triplets_ahead_of_header_partition_are_skipped() {
        let mut bytes = [0x42u8; 16].to_vec();
        bytes.push(0x04); // short-form BER length
        bytes.extend_from_slice(&[0u8; 4]);
        bytes.extend(header_partition(1));

        let reader = reader_for(bytes);
        assert_eq!(reader.tracks().len(), 1);
    }

    #[test]
    fn rejects_foreign_stream() {
        let bytes = vec![0u8; 64];
        let result = MxfReader::try_new(MediaSourceStream::new(Box::new(Cursor::new(bytes))));
        assert!(matches!(result, Err(Error::DecodeError(_))));
    }

    #[test]
    fn essence_reading_is_unsupported() {
        let mut reader = reader_for(header_partition(1));

        assert!(matches!(reader.read_next_block(0), Err(Error::Unsupported(_))));
        assert!(matches!(reader.is_next_block_available(0), Err(Error::Unsupported(_))));
        assert!(matches!(reader.is_next_block_keyframe(0), Err(Error::Unsupported(_))));
    }

    #[test]
    fn seek_is_unsupported() {
        let mut reader = reader_for(header_partition(1));
        assert_eq!(reader.seek(1.0).unwrap(), -1.0);
    }
}
