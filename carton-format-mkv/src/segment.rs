// Carton
// Copyright (c) 2026 The Project Carton Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Typed readers for the Matroska segment elements the demuxer consumes.

use carton_core::errors::{corruption_error, Result};
use carton_core::io::ReadBytes;

use crate::ebml::{Element, ElementHeader};
use crate::element_ids::ElementType;

/// The EBML document header. Only the document type is of interest.
#[derive(Debug)]
pub(crate) struct EbmlHeaderElement {
    /// The name of the EBML document type, `"matroska"` or `"webm"` for
    /// streams this demuxer accepts.
    pub doc_type: String,
}

impl Element for EbmlHeaderElement {
    const ID: ElementType = ElementType::Ebml;

    fn read<B: ReadBytes>(reader: &mut B, header: ElementHeader) -> Result<Self> {
        let mut it = header.children(reader);
        let mut doc_type = None;

        while let Some(child) = it.read_child_header()? {
            if child.etype == ElementType::DocType {
                doc_type = Some(it.read_string()?);
            }
        }

        match doc_type {
            Some(doc_type) => Ok(Self { doc_type }),
            None => corruption_error("DocType", header.data_pos),
        }
    }
}

/// The segment information element: timestamp scale and declared duration.
#[derive(Debug)]
pub(crate) struct InfoElement {
    /// Timestamp scale in nanoseconds per tick. Defaults to 1,000,000 (i.e.
    /// timestamps are in milliseconds).
    pub timestamp_scale: u64,
    /// Declared duration in ticks, if present.
    pub duration: Option<f64>,
}

impl Element for InfoElement {
    const ID: ElementType = ElementType::Info;

    fn read<B: ReadBytes>(reader: &mut B, header: ElementHeader) -> Result<Self> {
        let mut it = header.children(reader);
        let mut timestamp_scale = None;
        let mut duration = None;

        while let Some(child) = it.read_child_header()? {
            match child.etype {
                ElementType::TimestampScale => {
                    timestamp_scale = Some(it.read_u64()?);
                }
                ElementType::Duration => {
                    duration = Some(it.read_f64()?);
                }
                _ => (),
            }
        }

        Ok(Self { timestamp_scale: timestamp_scale.unwrap_or(1_000_000), duration })
    }
}

/// The `Tracks` element, a list of track entries.
#[derive(Debug)]
pub(crate) struct TracksElement {
    pub tracks: Box<[TrackElement]>,
}

impl Element for TracksElement {
    const ID: ElementType = ElementType::Tracks;

    fn read<B: ReadBytes>(reader: &mut B, header: ElementHeader) -> Result<Self> {
        let mut it = header.children(reader);
        Ok(Self { tracks: it.read_elements::<TrackElement>()? })
    }
}

/// A single track entry.
#[derive(Debug)]
pub(crate) struct TrackElement {
    /// The container-native track number referenced by blocks.
    pub number: u64,
    /// The track name, if declared.
    pub name: Option<String>,
    /// The ISO 639-2 language code, if declared.
    pub language: Option<String>,
    /// The codec ID string, e.g. `"A_AC3"`.
    pub codec_id: String,
    /// Codec-private initialization data, if declared.
    pub codec_private: Option<Box<[u8]>>,
    /// Duration of a single frame in nanoseconds, if declared.
    pub default_duration: Option<u64>,
    pub audio: Option<AudioElement>,
    pub video: Option<VideoElement>,
}

impl Element for TrackElement {
    const ID: ElementType = ElementType::TrackEntry;

    fn read<B: ReadBytes>(reader: &mut B, header: ElementHeader) -> Result<Self> {
        let mut it = header.children(reader);

        let mut number = None;
        let mut name = None;
        let mut language = None;
        let mut codec_id = None;
        let mut codec_private = None;
        let mut default_duration = None;
        let mut audio = None;
        let mut video = None;

        while let Some(child) = it.read_child_header()? {
            match child.etype {
                ElementType::TrackNumber => {
                    number = Some(it.read_u64()?);
                }
                ElementType::Name => {
                    name = Some(it.read_string()?);
                }
                ElementType::Language => {
                    language = Some(it.read_string()?);
                }
                ElementType::CodecId => {
                    codec_id = Some(it.read_string()?);
                }
                ElementType::CodecPrivate => {
                    codec_private = Some(it.read_boxed_slice()?);
                }
                ElementType::DefaultDuration => {
                    default_duration = Some(it.read_u64()?);
                }
                ElementType::Audio => {
                    audio = Some(it.read_element_data::<AudioElement>()?);
                }
                ElementType::Video => {
                    video = Some(it.read_element_data::<VideoElement>()?);
                }
                _ => (),
            }
        }

        let number = match number {
            Some(number) => number,
            None => return corruption_error("TrackNumber", header.data_pos),
        };
        let codec_id = match codec_id {
            Some(codec_id) => codec_id,
            None => return corruption_error("CodecID", header.data_pos),
        };

        Ok(Self { number, name, language, codec_id, codec_private, default_duration, audio, video })
    }
}

/// Audio settings of a track entry.
#[derive(Debug)]
pub(crate) struct AudioElement {
    /// The sampling frequency in Hz. Defaults to 8000.
    pub sampling_frequency: f64,
    /// The channel count. Defaults to 1.
    pub channels: u64,
    /// Bits per sample, if declared.
    pub bit_depth: Option<u64>,
}

impl Element for AudioElement {
    const ID: ElementType = ElementType::Audio;

    fn read<B: ReadBytes>(reader: &mut B, header: ElementHeader) -> Result<Self> {
        let mut it = header.children(reader);

        let mut sampling_frequency = None;
        let mut channels = None;
        let mut bit_depth = None;

        while let Some(child) = it.read_child_header()? {
            match child.etype {
                ElementType::SamplingFrequency => {
                    sampling_frequency = Some(it.read_f64()?);
                }
                ElementType::Channels => {
                    channels = Some(it.read_u64()?);
                }
                ElementType::BitDepth => {
                    bit_depth = Some(it.read_u64()?);
                }
                _ => (),
            }
        }

        Ok(Self {
            sampling_frequency: sampling_frequency.unwrap_or(8000.0),
            channels: channels.unwrap_or(1),
            bit_depth,
        })
    }
}

/// Video settings of a track entry.
#[derive(Debug)]
pub(crate) struct VideoElement {
    pub pixel_width: u64,
    pub pixel_height: u64,
}

impl Element for VideoElement {
    const ID: ElementType = ElementType::Video;

    fn read<B: ReadBytes>(reader: &mut B, header: ElementHeader) -> Result<Self> {
        let mut it = header.children(reader);

        let mut pixel_width = None;
        let mut pixel_height = None;

        while let Some(child) = it.read_child_header()? {
            match child.etype {
                ElementType::PixelWidth => {
                    pixel_width = Some(it.read_u64()?);
                }
                ElementType::PixelHeight => {
                    pixel_height = Some(it.read_u64()?);
                }
                _ => (),
            }
        }

        Ok(Self {
            pixel_width: pixel_width.unwrap_or(0),
            pixel_height: pixel_height.unwrap_or(0),
        })
    }
}
