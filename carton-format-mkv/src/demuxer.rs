// Carton
// Copyright (c) 2026 The Project Carton Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::collections::VecDeque;
use std::fs::File;
use std::io;
use std::io::{Seek, SeekFrom};
use std::path::Path;

use carton_core::errors::{decode_error, invalid_track_error, unsupported_error, Error, Result};
use carton_core::formats::{
    AudioExtra, ContainerReader, Track, TrackBuilder, TrackExtra, VideoExtra,
};
use carton_core::io::{MediaSourceStream, ReadBytes};

use log::debug;

use crate::codecs::codec_from_id;
use crate::ebml::{read_unsigned_vint, ElementHeader, ElementIterator};
use crate::element_ids::ElementType;
use crate::lacing::{read_frame_ranges, Lacing};
use crate::segment::{EbmlHeaderElement, InfoElement, TracksElement};

/// Number of parsed clusters retained by the rolling cache. Interleaved reads
/// of multiple tracks revisit recent clusters, so a small window amortizes
/// the cost of re-parsing block groups.
const CLUSTER_CACHE_SLOTS: usize = 5;

/// One frame extracted from a cluster. Frames record byte ranges only; the
/// payload is read from the stream on demand.
#[derive(Copy, Clone, Debug)]
struct Block {
    /// The container-native track number this frame belongs to.
    track: u64,
    /// Whether the frame can be decoded independently.
    keyframe: bool,
    /// Absolute stream offset of the frame payload.
    pos: u64,
    /// Length of the frame payload in bytes.
    len: u32,
}

/// A fully parsed cluster: all frames of all tracks in stream order.
#[derive(Debug)]
struct Cluster {
    blocks: Vec<Block>,
}

/// Recorded position of a cluster found during skeleton parsing.
#[derive(Copy, Clone, Debug)]
struct ClusterPos {
    data_pos: u64,
    data_len: u64,
}

/// Per-track read cursor: the cluster index and the block index to resume
/// scanning from.
#[derive(Copy, Clone, Debug, Default)]
struct TrackCursor {
    cluster: usize,
    block: usize,
}

/// Matroska (MKV/WebM) demuxer.
///
/// The container skeleton is parsed eagerly at construction: segment
/// information, the track list, and the positions of all clusters. Block
/// payloads are resolved lazily per read. Not thread-safe: one reader, one
/// thread.
pub struct MkvReader {
    stream: MediaSourceStream,
    tracks: Vec<Track>,
    /// Container-native track number for each track index.
    track_numbers: Vec<u64>,
    duration: f64,
    clusters: Vec<ClusterPos>,
    cache: VecDeque<(usize, Cluster)>,
    cursors: Vec<TrackCursor>,
    #[cfg(test)]
    parse_count: usize,
}

/// Reads the next sibling header, treating a clean end-of-stream as the end
/// of iteration rather than an error.
fn next_header_or_eof<R: ReadBytes>(
    it: &mut ElementIterator<R>,
) -> Result<Option<ElementHeader>> {
    match it.read_header() {
        Ok(header) => Ok(header),
        Err(Error::IoError(err)) if err.kind() == io::ErrorKind::UnexpectedEof => Ok(None),
        Err(err) => Err(err),
    }
}

/// Parses a block header (track number, relative timestamp, flags) and
/// returns one [`Block`] per laced frame. For simple blocks the keyframe flag
/// comes from the flags byte; block-group blocks get their keyframe state
/// patched by the caller.
fn read_block<R: ReadBytes>(
    reader: &mut R,
    header: ElementHeader,
    is_simple: bool,
) -> Result<Vec<Block>> {
    let data_end = match header.end() {
        Some(end) => end,
        None => return decode_error("mkv: unsized block element"),
    };

    let track = read_unsigned_vint(&mut *reader)?;
    // The block timestamp is relative to the cluster timestamp. It does not
    // affect sequential reading, so it is consumed and dropped.
    let _rel_timestamp = reader.read_be_u16()? as i16;
    let flags = reader.read_byte()?;

    let keyframe = if is_simple { flags & 0x80 != 0 } else { true };
    let lacing = Lacing::from_flags(flags);

    let ranges = read_frame_ranges(reader, lacing, data_end)?;

    Ok(ranges.into_iter().map(|(pos, len)| Block { track, keyframe, pos, len }).collect())
}

impl MkvReader {
    /// Attempts to open a Matroska or WebM stream, eagerly parsing the
    /// container skeleton.
    pub fn try_new(mut stream: MediaSourceStream) -> Result<Self> {
        let mut it = ElementIterator::new(&mut stream, None);

        let header = match next_header_or_eof(&mut it)? {
            Some(header) => header,
            None => return decode_error("mkv: empty stream"),
        };
        if header.etype != ElementType::Ebml {
            return decode_error("mkv: missing EBML header");
        }

        let ebml = it.read_element_data::<EbmlHeaderElement>()?;
        if !matches!(ebml.doc_type.as_str(), "matroska" | "webm") {
            return unsupported_error("mkv: not a matroska / webm file");
        }

        let mut duration = 0.0;
        let mut track_elements = None;
        let mut clusters = Vec::new();
        let mut segment_count = 0usize;

        // A file may legally contain more than one segment. Duration is
        // accumulated across all of them; tracks come from the first only.
        while let Some(header) = next_header_or_eof(&mut it)? {
            if header.etype != ElementType::Segment {
                continue;
            }
            segment_count += 1;

            let mut sit = header.children(it.reader_mut());
            while let Some(child) = next_header_or_eof(&mut sit)? {
                match child.etype {
                    ElementType::Info => {
                        let info = sit.read_element_data::<InfoElement>()?;
                        if let Some(ticks) = info.duration {
                            duration += ticks * info.timestamp_scale as f64 / 1e9;
                        }
                    }
                    ElementType::Tracks if segment_count == 1 => {
                        track_elements = Some(sit.read_element_data::<TracksElement>()?);
                    }
                    ElementType::Cluster => match child.data_len {
                        Some(data_len) => {
                            clusters.push(ClusterPos { data_pos: child.data_pos, data_len });
                        }
                        None => return unsupported_error("mkv: unknown-size cluster"),
                    },
                    // SeekHead, Cues, and anything else are skipped.
                    _ => (),
                }
            }
        }

        debug!(
            "parsed skeleton: {} segment(s), {} cluster(s), duration {:.3}s",
            segment_count,
            clusters.len(),
            duration
        );

        let mut tracks = Vec::new();
        let mut track_numbers = Vec::new();

        if let Some(track_elements) = track_elements {
            for (index, entry) in track_elements.tracks.into_vec().into_iter().enumerate() {
                let bit_depth = entry.audio.as_ref().and_then(|audio| audio.bit_depth);
                let codec = codec_from_id(&entry.codec_id, bit_depth);

                let extra = if let Some(audio) = entry.audio {
                    Some(TrackExtra::Audio(AudioExtra {
                        sample_rate: audio.sampling_frequency,
                        channels: audio.channels as u32,
                        bit_depth: audio.bit_depth.map(|depth| depth as u32),
                    }))
                }
                else if let Some(video) = entry.video {
                    Some(TrackExtra::Video(VideoExtra {
                        width: video.pixel_width as u32,
                        height: video.pixel_height as u32,
                        frame_rate: entry
                            .default_duration
                            .map_or(0.0, |nanos| 1e9 / nanos as f64),
                        codec_private: entry.codec_private,
                    }))
                }
                else {
                    None
                };

                track_numbers.push(entry.number);
                tracks.push(
                    TrackBuilder::new(entry.number as u32)
                        .with_name(entry.name)
                        .with_language(entry.language)
                        .with_codec(codec)
                        .with_extra(extra)
                        .build(index),
                );
            }
        }

        let cursors = vec![TrackCursor::default(); tracks.len()];

        Ok(Self {
            stream,
            tracks,
            track_numbers,
            duration,
            clusters,
            cache: VecDeque::with_capacity(CLUSTER_CACHE_SLOTS),
            cursors,
            #[cfg(test)]
            parse_count: 0,
        })
    }

    /// Opens a Matroska or WebM file read-only.
    pub fn open_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        Self::try_new(MediaSourceStream::new(Box::new(file)))
    }

    /// Parses the cluster at the given index from its recorded stream range.
    fn parse_cluster(&mut self, index: usize) -> Result<Cluster> {
        #[cfg(test)]
        {
            self.parse_count += 1;
        }

        let cluster_pos = self.clusters[index];
        self.stream.seek(SeekFrom::Start(cluster_pos.data_pos))?;

        let end = cluster_pos.data_pos + cluster_pos.data_len;
        let mut it = ElementIterator::new(&mut self.stream, Some(end));

        let mut blocks = Vec::new();

        while let Some(header) = it.read_header()? {
            match header.etype {
                ElementType::SimpleBlock => {
                    blocks.extend(read_block(it.reader_mut(), header, true)?);
                }
                ElementType::BlockGroup => {
                    let mut git = header.children(it.reader_mut());

                    let mut group = Vec::new();
                    let mut keyframe = true;

                    while let Some(child) = git.read_header()? {
                        match child.etype {
                            ElementType::Block => {
                                group.extend(read_block(git.reader_mut(), child, false)?);
                            }
                            ElementType::ReferenceBlock => {
                                // A block that references another one is not
                                // independently decodable.
                                let _ = git.read_data()?;
                                keyframe = false;
                            }
                            _ => (),
                        }
                    }

                    for block in &mut group {
                        block.keyframe = keyframe;
                    }
                    blocks.extend(group);
                }
                // The cluster timestamp only matters for seeking.
                _ => (),
            }
        }

        debug!("parsed cluster {} with {} block(s)", index, blocks.len());

        Ok(Cluster { blocks })
    }

    /// Returns the cache slot holding the cluster at `index`, parsing and
    /// inserting it on a miss. The cache is a fixed-capacity FIFO: a miss
    /// evicts the oldest entry; hits do not reorder.
    fn cluster_slot(&mut self, index: usize) -> Result<usize> {
        if let Some(slot) = self.cache.iter().position(|(i, _)| *i == index) {
            return Ok(slot);
        }

        let cluster = self.parse_cluster(index)?;

        if self.cache.len() >= CLUSTER_CACHE_SLOTS {
            self.cache.pop_front();
        }
        self.cache.push_back((index, cluster));

        Ok(self.cache.len() - 1)
    }

    /// Locates the next block for a track. When `consume` is set the track
    /// cursor advances past the returned block.
    fn next_block_for(&mut self, track: usize, consume: bool) -> Result<Option<(u64, u32, bool)>> {
        if track >= self.tracks.len() {
            return invalid_track_error(track);
        }

        let number = self.track_numbers[track];
        let mut cursor = self.cursors[track];

        loop {
            if cursor.cluster >= self.clusters.len() {
                if consume {
                    self.cursors[track] = cursor;
                }
                return Ok(None);
            }

            let slot = self.cluster_slot(cursor.cluster)?;
            let cluster = &self.cache[slot].1;

            let found = cluster
                .blocks
                .iter()
                .enumerate()
                .skip(cursor.block)
                .find(|(_, block)| block.track == number)
                .map(|(i, block)| (i, block.pos, block.len, block.keyframe));

            if let Some((index, pos, len, keyframe)) = found {
                if consume {
                    cursor.block = index + 1;
                    self.cursors[track] = cursor;
                }
                return Ok(Some((pos, len, keyframe)));
            }

            cursor.cluster += 1;
            cursor.block = 0;
        }
    }

    #[cfg(test)]
    fn cluster_parse_count(&self) -> usize {
        self.parse_count
    }

    #[cfg(test)]
    fn cached_clusters(&self) -> usize {
        self.cache.len()
    }
}

impl ContainerReader for MkvReader {
    fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    fn duration(&self) -> f64 {
        self.duration
    }

    fn read_next_block(&mut self, track: usize) -> Result<Option<Box<[u8]>>> {
        match self.next_block_for(track, false)? {
            Some((pos, len, _)) => {
                self.stream.seek(SeekFrom::Start(pos))?;
                let data = self.stream.read_boxed_slice_exact(len as usize)?;
                // Advance the cursor only once the payload read succeeded,
                // so a failed read leaves the block available for a retry.
                self.next_block_for(track, true)?;
                Ok(Some(data))
            }
            None => Ok(None),
        }
    }

    fn is_next_block_available(&mut self, track: usize) -> Result<bool> {
        Ok(self.next_block_for(track, false)?.is_some())
    }

    fn is_next_block_keyframe(&mut self, track: usize) -> Result<bool> {
        Ok(matches!(self.next_block_for(track, false)?, Some((_, _, true))))
    }

    fn seek(&mut self, _pos_secs: f64) -> Result<f64> {
        // Timestamp-based cluster seeking is not implemented for Matroska.
        // The contract is an explicit -1: the position did not change.
        Ok(-1.0)
    }
}

#[cfg(test)]
mod tests {
    use std::io::{self, Cursor, Read, Seek, SeekFrom};
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    use carton_core::errors::Error;
    use carton_core::formats::{Codec, ContainerReader, TrackExtra};
    use carton_core::io::{MediaSource, MediaSourceStream};

    use super::MkvReader;

    fn tag_bytes(tag: u32) -> Vec<u8> {
        let len = 4 - tag.leading_zeros() as usize / 8;
        tag.to_be_bytes()[4 - len..].to_vec()
    }

    /// Encodes a size as an 8-byte vint so any payload length fits.
    fn size_bytes(len: u64) -> Vec<u8> {
        let mut bytes = vec![0x01];
        bytes.extend_from_slice(&len.to_be_bytes()[1..]);
        bytes
    }

    fn elem(tag: u32, payload: &[u8]) -> Vec<u8> {
        let mut bytes = tag_bytes(tag);
        bytes.extend(size_bytes(payload.len() as u64));
        bytes.extend_from_slice(payload);
        bytes
    }

    /// Encodes an element with the reserved unknown-size marker. Streaming
    /// muxers emit segments this way; the payload runs to the end of the
    /// stream.
    fn unknown_size_elem(tag: u32, payload: &[u8]) -> Vec<u8> {
        let mut bytes = tag_bytes(tag);
        bytes.push(0xFF);
        bytes.extend_from_slice(payload);
        bytes
    }

    fn uint(value: u64) -> Vec<u8> {
        let bytes = value.to_be_bytes();
        let skip = bytes.iter().take_while(|b| **b == 0).count().min(7);
        bytes[skip..].to_vec()
    }

    fn simple_block(track: u8, flags: u8, data: &[u8]) -> Vec<u8> {
        let mut bytes = vec![0x80 | track, 0, 0, flags];
        bytes.extend_from_slice(data);
        bytes
    }

    fn ebml_header(doc_type: &str) -> Vec<u8> {
        elem(0x1A45_DFA3, &elem(0x4282, doc_type.as_bytes()))
    }

    fn info(duration_ticks: f64) -> Vec<u8> {
        let mut payload = elem(0x2A_D7B1, &uint(1_000_000));
        payload.extend(elem(0x4489, &duration_ticks.to_be_bytes()));
        elem(0x1549_A966, &payload)
    }

    fn two_track_entries() -> Vec<u8> {
        let mut video = elem(0xD7, &uint(1));
        video.extend(elem(0x86, b"V_MPEG4/ISO/AVC"));
        let mut vsettings = elem(0xB0, &uint(1920));
        vsettings.extend(elem(0xBA, &uint(1080)));
        video.extend(elem(0xE0, &vsettings));

        let mut audio = elem(0xD7, &uint(2));
        audio.extend(elem(0x86, b"A_PCM/INT/LIT"));
        let mut asettings = elem(0xB5, &48000f64.to_be_bytes());
        asettings.extend(elem(0x9F, &uint(2)));
        asettings.extend(elem(0x6264, &uint(16)));
        audio.extend(elem(0xE1, &asettings));

        let mut entries = elem(0xAE, &video);
        entries.extend(elem(0xAE, &audio));
        elem(0x1654_AE6B, &entries)
    }

    fn cluster(timestamp: u64, blocks: &[Vec<u8>]) -> Vec<u8> {
        let mut payload = elem(0xE7, &uint(timestamp));
        for block in blocks {
            payload.extend(elem(0xA3, block));
        }
        elem(0x1F43_B675, &payload)
    }

    fn reader_for(data: Vec<u8>) -> MkvReader {
        MkvReader::try_new(MediaSourceStream::new(Box::new(Cursor::new(data)))).unwrap()
    }

    fn minimal_mkv() -> Vec<u8> {
        let mut segment = info(5000.0);
        segment.extend(two_track_entries());
        segment.extend(cluster(
            0,
            &[simple_block(1, 0x80, b"vid0"), simple_block(2, 0x80, b"aud0")],
        ));

        let mut file = ebml_header("matroska");
        file.extend(elem(0x1853_8067, &segment));
        file
    }

    #[test]
    fn minimal_two_track_file() {
        let mut reader = reader_for(minimal_mkv());

        assert!((reader.duration() - 5.0).abs() < 1e-9);
        assert_eq!(reader.tracks().len(), 2);

        let audio = &reader.tracks()[1];
        assert_eq!(audio.id, 2);
        assert_eq!(audio.codec, Codec::PcmS16Le);
        assert_eq!(audio.language, "eng");
        match &audio.extra {
            Some(TrackExtra::Audio(extra)) => {
                assert_eq!(extra.sample_rate, 48000.0);
                assert_eq!(extra.channels, 2);
                assert_eq!(extra.bit_depth, Some(16));
            }
            other => panic!("expected audio extra, got {:?}", other),
        }

        let video = &reader.tracks()[0];
        assert_eq!(video.codec, Codec::Avc);
        match &video.extra {
            Some(TrackExtra::Video(extra)) => {
                assert_eq!((extra.width, extra.height), (1920, 1080));
            }
            other => panic!("expected video extra, got {:?}", other),
        }

        assert_eq!(reader.main_audio_track(), Some(1));

        assert!(reader.is_next_block_available(1).unwrap());
        assert!(reader.is_next_block_keyframe(1).unwrap());
        assert_eq!(reader.read_next_block(1).unwrap().as_deref(), Some(&b"aud0"[..]));
        assert_eq!(reader.read_next_block(0).unwrap().as_deref(), Some(&b"vid0"[..]));

        assert_eq!(reader.read_next_block(0).unwrap(), None);
        assert_eq!(reader.read_next_block(1).unwrap(), None);
        assert!(!reader.is_next_block_available(1).unwrap());
    }

    #[test]
    fn seek_is_unsupported() {
        let mut reader = reader_for(minimal_mkv());
        assert_eq!(reader.seek(2.0).unwrap(), -1.0);
    }

    #[test]
    fn invalid_track_index() {
        let mut reader = reader_for(minimal_mkv());
        assert!(matches!(reader.read_next_block(7), Err(Error::InvalidTrack(7))));
    }

    #[test]
    fn rejects_foreign_doc_type() {
        let mut file = ebml_header("avi");
        file.extend(elem(0x1853_8067, &info(100.0)));

        let result = MkvReader::try_new(MediaSourceStream::new(Box::new(Cursor::new(file))));
        assert!(matches!(result, Err(Error::Unsupported(_))));
    }

    #[test]
    fn cluster_cache_amortizes_interleaved_reads() {
        let mut segment = info(10000.0);
        segment.extend(two_track_entries());
        for i in 0..10u64 {
            let vid = format!("vid{}", i);
            let aud = format!("aud{}", i);
            segment.extend(cluster(
                i * 1000,
                &[simple_block(1, 0x80, vid.as_bytes()), simple_block(2, 0x80, aud.as_bytes())],
            ));
        }

        let mut file = ebml_header("matroska");
        file.extend(elem(0x1853_8067, &segment));

        let mut reader = reader_for(file);

        // Round-robin across both tracks: every cluster is shared by the two
        // reads, so each one is parsed exactly once.
        for i in 0..10 {
            let vid = reader.read_next_block(0).unwrap().unwrap();
            let aud = reader.read_next_block(1).unwrap().unwrap();
            assert_eq!(vid.as_ref(), format!("vid{}", i).as_bytes());
            assert_eq!(aud.as_ref(), format!("aud{}", i).as_bytes());
        }

        assert_eq!(reader.cluster_parse_count(), 10);
        assert_eq!(reader.cached_clusters(), 5);
    }

    #[test]
    fn unknown_size_segment_parses_to_end_of_stream() {
        let mut segment = info(5000.0);
        segment.extend(two_track_entries());
        segment.extend(cluster(0, &[simple_block(2, 0x80, b"aud0")]));

        let mut file = ebml_header("matroska");
        file.extend(unknown_size_elem(0x1853_8067, &segment));

        let mut reader = reader_for(file);

        assert!((reader.duration() - 5.0).abs() < 1e-9);
        assert_eq!(reader.tracks().len(), 2);
        assert_eq!(reader.read_next_block(1).unwrap().as_deref(), Some(&b"aud0"[..]));
        assert_eq!(reader.read_next_block(1).unwrap(), None);
    }

    #[test]
    fn empty_info_element_does_not_swallow_siblings() {
        // A zero-length master element has no children. The elements that
        // follow it are siblings, not children.
        let mut segment = elem(0x1549_A966, &[]);
        segment.extend(two_track_entries());
        segment.extend(cluster(0, &[simple_block(2, 0x80, b"aud0")]));

        let mut file = ebml_header("matroska");
        file.extend(elem(0x1853_8067, &segment));

        let mut reader = reader_for(file);

        assert_eq!(reader.duration(), 0.0);
        assert_eq!(reader.tracks().len(), 2);
        assert_eq!(reader.read_next_block(1).unwrap().as_deref(), Some(&b"aud0"[..]));
    }

    /// A seekable source that fails the next read once when armed.
    struct FlakySource {
        inner: Cursor<Vec<u8>>,
        fail_next: Arc<AtomicBool>,
    }

    impl Read for FlakySource {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            if self.fail_next.swap(false, Ordering::SeqCst) {
                return Err(io::Error::new(io::ErrorKind::Other, "device busy"));
            }
            self.inner.read(buf)
        }
    }

    impl Seek for FlakySource {
        fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
            self.inner.seek(pos)
        }
    }

    impl MediaSource for FlakySource {
        fn is_seekable(&self) -> bool {
            true
        }

        fn byte_len(&self) -> Option<u64> {
            Some(self.inner.get_ref().len() as u64)
        }
    }

    #[test]
    fn transient_read_error_does_not_skip_a_block() {
        let fail_next = Arc::new(AtomicBool::new(false));
        let source =
            FlakySource { inner: Cursor::new(minimal_mkv()), fail_next: Arc::clone(&fail_next) };
        let mut reader = MkvReader::try_new(MediaSourceStream::new(Box::new(source))).unwrap();

        // Parse the cluster up front so the armed failure hits the payload
        // read itself.
        assert!(reader.is_next_block_available(1).unwrap());

        fail_next.store(true, Ordering::SeqCst);
        assert!(matches!(reader.read_next_block(1), Err(Error::IoError(_))));

        // The failed read must not have consumed the block.
        assert_eq!(reader.read_next_block(1).unwrap().as_deref(), Some(&b"aud0"[..]));
        assert_eq!(reader.read_next_block(1).unwrap(), None);
    }

    #[test]
    fn block_group_reference_marks_non_keyframe() {
        // Cluster with a block group holding a referenced (non-key) block for
        // track 1, followed by an independent simple block.
        let mut group = elem(0xA1, &simple_block(1, 0x00, b"delta"));
        group.extend(elem(0xFB, &[0x01]));

        let mut payload = elem(0xE7, &uint(0));
        payload.extend(elem(0xA0, &group));
        payload.extend(elem(0xA3, &simple_block(1, 0x80, b"key")));

        let mut segment = info(1000.0);
        segment.extend(two_track_entries());
        segment.extend(elem(0x1F43_B675, &payload));

        let mut file = ebml_header("matroska");
        file.extend(elem(0x1853_8067, &segment));

        let mut reader = reader_for(file);

        assert!(!reader.is_next_block_keyframe(0).unwrap());
        assert_eq!(reader.read_next_block(0).unwrap().as_deref(), Some(&b"delta"[..]));
        assert!(reader.is_next_block_keyframe(0).unwrap());
        assert_eq!(reader.read_next_block(0).unwrap().as_deref(), Some(&b"key"[..]));
    }
}
