// Carton
// Copyright (c) 2026 The Project Carton Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::fs::File;
use std::io;
use std::io::{Seek, SeekFrom};
use std::path::Path;

use carton_core::errors::{decode_error, invalid_track_error, Error, Result};
use carton_core::formats::{
    AudioExtra, ContainerReader, Track, TrackBuilder, TrackExtra, VideoExtra,
};
use carton_core::io::{MediaSourceStream, ReadBytes};
use carton_core::units::TimeBase;

use log::debug;

use crate::atoms::{
    Atom, AtomIterator, AtomType, FtypAtom, MoovAtom, StblAtom, StssAtom, SttsAtom,
};
use crate::sample_map::SampleMap;

/// Per-track demuxing state: the flat sample map, the read cursor, and the
/// tables needed to resolve timestamps.
struct TrackState {
    map: SampleMap,
    /// Index of the next sample to read.
    next_sample: usize,
    timebase: TimeBase,
    stts: SttsAtom,
    stss: Option<StssAtom>,
}

/// ISO Base Media (MP4/M4A/MOV) demuxer.
///
/// The atom tree is parsed eagerly at construction and flattened into one
/// byte-range sample map per track. Sample payloads are resolved lazily per
/// read. Not thread-safe: one reader, one thread.
pub struct Mp4Reader {
    stream: MediaSourceStream,
    tracks: Vec<Track>,
    duration: f64,
    states: Vec<TrackState>,
}

impl Mp4Reader {
    /// Attempts to open an ISO Base Media stream, eagerly parsing the atom
    /// tree.
    pub fn try_new(mut stream: MediaSourceStream) -> Result<Self> {
        let total_len = stream.byte_len();

        let mut ftyp: Option<FtypAtom> = None;
        let mut moov: Option<MoovAtom> = None;

        {
            let mut iter = AtomIterator::new_root(&mut stream, total_len);

            loop {
                let header = match iter.next() {
                    Ok(Some(header)) => header,
                    Ok(None) => break,
                    // A clean end-of-stream at a top-level atom boundary ends
                    // the walk.
                    Err(Error::IoError(err)) if err.kind() == io::ErrorKind::UnexpectedEof => {
                        break;
                    }
                    Err(err) => return Err(err),
                };

                match header.atom_type {
                    AtomType::FileType => {
                        ftyp = Some(FtypAtom::read(iter.inner_mut(), header)?);
                    }
                    AtomType::Movie => {
                        moov = Some(MoovAtom::read(iter.inner_mut(), header)?);
                    }
                    // Media data and unrecognized atoms are stepped over.
                    _ => (),
                }
            }
        }

        if let Some(ftyp) = &ftyp {
            debug!(
                "major brand {}, {} compatible brand(s)",
                String::from_utf8_lossy(&ftyp.major_brand),
                ftyp.compatible_brands.len()
            );
        }

        let moov = match moov {
            Some(moov) => moov,
            None => return decode_error("isomp4: missing moov atom"),
        };

        let mut duration = if moov.mvhd.timescale > 0 {
            moov.mvhd.duration as f64 / f64::from(moov.mvhd.timescale)
        }
        else {
            0.0
        };

        let mut tracks = Vec::with_capacity(moov.traks.len());
        let mut states = Vec::with_capacity(moov.traks.len());
        let mut max_track_secs = 0.0f64;

        for (index, trak) in moov.traks.into_iter().enumerate() {
            let mdhd = trak.mdia.mdhd;
            let stbl = trak.mdia.minf.stbl;

            if mdhd.timescale == 0 {
                return decode_error("isomp4 (mdhd): invalid timescale");
            }

            let (codec, extra) = match stbl.stsd.primary() {
                Some(entry) => {
                    let codec = entry.codec;

                    let extra = if codec.is_audio() {
                        Some(TrackExtra::Audio(AudioExtra {
                            sample_rate: entry
                                .audio_sample_rate()
                                .filter(|rate| *rate > 0.0)
                                .unwrap_or_else(|| f64::from(mdhd.timescale)),
                            channels: entry.audio_channels().unwrap_or(0),
                            bit_depth: entry.audio_bit_depth().filter(|depth| *depth > 0),
                        }))
                    }
                    else if codec.is_video() {
                        let (width, height) = entry
                            .video_dimensions()
                            .filter(|&(w, h)| w > 0 && h > 0)
                            .unwrap_or((trak.tkhd.width, trak.tkhd.height));

                        let frame_rate = if mdhd.duration > 0 {
                            f64::from(stbl.stsz.sample_count) * f64::from(mdhd.timescale)
                                / mdhd.duration as f64
                        }
                        else {
                            0.0
                        };

                        Some(TrackExtra::Video(VideoExtra {
                            width,
                            height,
                            frame_rate,
                            codec_private: Some(entry.extra.clone()),
                        }))
                    }
                    else {
                        None
                    };

                    (codec, extra)
                }
                None => return decode_error("isomp4 (stsd): no sample descriptions"),
            };

            max_track_secs = max_track_secs.max(mdhd.duration as f64 / f64::from(mdhd.timescale));

            let map = SampleMap::build(&stbl);
            let StblAtom { stts, stss, .. } = stbl;

            states.push(TrackState {
                map,
                next_sample: 0,
                timebase: TimeBase::new(1, mdhd.timescale),
                stts,
                stss,
            });

            tracks.push(
                TrackBuilder::new(trak.tkhd.id)
                    .with_language(mdhd.language)
                    .with_codec(codec)
                    .with_extra(extra)
                    .build(index),
            );
        }

        // A movie header with an unknown duration defers to the longest
        // track.
        if duration == 0.0 {
            duration = max_track_secs;
        }

        debug!("parsed skeleton: {} track(s), duration {:.3}s", tracks.len(), duration);

        Ok(Self { stream, tracks, duration, states })
    }

    /// Opens an ISO Base Media file read-only.
    pub fn open_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        Self::try_new(MediaSourceStream::new(Box::new(file)))
    }
}

impl ContainerReader for Mp4Reader {
    fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    fn duration(&self) -> f64 {
        self.duration
    }

    fn read_next_block(&mut self, track: usize) -> Result<Option<Box<[u8]>>> {
        let state = match self.states.get_mut(track) {
            Some(state) => state,
            None => return invalid_track_error(track),
        };

        let (pos, len) = match state.map.get(state.next_sample) {
            Some(sample) => sample,
            None => return Ok(None),
        };
        state.next_sample += 1;

        self.stream.seek(SeekFrom::Start(pos))?;
        Ok(Some(self.stream.read_boxed_slice_exact(len as usize)?))
    }

    fn is_next_block_available(&mut self, track: usize) -> Result<bool> {
        match self.states.get(track) {
            Some(state) => Ok(state.map.get(state.next_sample).is_some()),
            None => invalid_track_error(track),
        }
    }

    fn is_next_block_keyframe(&mut self, track: usize) -> Result<bool> {
        let state = match self.states.get(track) {
            Some(state) => state,
            None => return invalid_track_error(track),
        };

        if state.map.get(state.next_sample).is_none() {
            return Ok(false);
        }

        // Without a sync sample table every sample is a sync sample. The
        // table uses 1-based sample numbers.
        let keyframe = match &state.stss {
            Some(stss) => stss.contains(state.next_sample as u32 + 1),
            None => true,
        };

        Ok(keyframe)
    }

    fn seek(&mut self, pos_secs: f64) -> Result<f64> {
        let mut best_audio: Option<f64> = None;
        let mut best_other: Option<f64> = None;

        for (index, state) in self.states.iter_mut().enumerate() {
            let ticks = state.timebase.calc_timestamp(pos_secs);

            match state.stts.find_sample_for_time(ticks) {
                Some((sample, start_ticks)) => {
                    state.next_sample = (sample as usize).min(state.map.len());

                    let achieved = state.timebase.calc_time(start_ticks);

                    let slot = if self.tracks[index].codec.is_audio() {
                        &mut best_audio
                    }
                    else {
                        &mut best_other
                    };

                    match slot {
                        Some(best) if *best <= achieved => (),
                        _ => *slot = Some(achieved),
                    }
                }
                // Past the end of the track: position it at end-of-stream.
                None => state.next_sample = state.map.len(),
            }
        }

        let achieved = best_audio.or(best_other).unwrap_or(-1.0);
        debug!("seek to {:.3}s achieved {:.3}s", pos_secs, achieved);

        Ok(achieved)
    }
}
