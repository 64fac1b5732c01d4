// Carton
// Copyright (c) 2026 The Project Carton Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::collections::HashMap;

use once_cell::sync::Lazy;

/// The primitive data type stored by an EBML element.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum Type {
    /// A master element that contains child elements.
    Master,
    /// An unsigned big-endian integer of 0-8 bytes.
    Unsigned,
    /// A signed big-endian integer of 0-8 bytes.
    Signed,
    /// An IEEE-754 float of 0, 4, or 8 bytes.
    Float,
    /// A UTF-8 or ASCII string.
    String,
    /// Raw binary data.
    Binary,
}

/// The set of EBML elements the demuxer understands. Elements with tags
/// outside this table are leaves whose payload is skipped without recursing.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ElementType {
    Ebml,
    DocType,
    Segment,
    SeekHead,
    Info,
    TimestampScale,
    Duration,
    Tracks,
    TrackEntry,
    TrackNumber,
    Name,
    Language,
    CodecId,
    CodecPrivate,
    DefaultDuration,
    Audio,
    SamplingFrequency,
    Channels,
    BitDepth,
    Video,
    PixelWidth,
    PixelHeight,
    Cluster,
    Timestamp,
    SimpleBlock,
    BlockGroup,
    Block,
    ReferenceBlock,
    Cues,
    Crc32,
    Void,
    Unknown,
}

/// Mapping of element tag (with leading-one marker bits retained) to its data
/// type and element type.
pub(crate) static ELEMENTS: Lazy<HashMap<u32, (Type, ElementType)>> = Lazy::new(|| {
    let mut elems = HashMap::new();

    elems.insert(0x1A45_DFA3, (Type::Master, ElementType::Ebml));
    elems.insert(0x4282, (Type::String, ElementType::DocType));

    elems.insert(0x1853_8067, (Type::Master, ElementType::Segment));
    elems.insert(0x114D_9B74, (Type::Master, ElementType::SeekHead));
    elems.insert(0x1C53_BB6B, (Type::Master, ElementType::Cues));

    elems.insert(0x1549_A966, (Type::Master, ElementType::Info));
    elems.insert(0x2A_D7B1, (Type::Unsigned, ElementType::TimestampScale));
    elems.insert(0x4489, (Type::Float, ElementType::Duration));

    elems.insert(0x1654_AE6B, (Type::Master, ElementType::Tracks));
    elems.insert(0xAE, (Type::Master, ElementType::TrackEntry));
    elems.insert(0xD7, (Type::Unsigned, ElementType::TrackNumber));
    elems.insert(0x536E, (Type::String, ElementType::Name));
    elems.insert(0x22_B59C, (Type::String, ElementType::Language));
    elems.insert(0x86, (Type::String, ElementType::CodecId));
    elems.insert(0x63A2, (Type::Binary, ElementType::CodecPrivate));
    elems.insert(0x23_E383, (Type::Unsigned, ElementType::DefaultDuration));
    elems.insert(0xE1, (Type::Master, ElementType::Audio));
    elems.insert(0xB5, (Type::Float, ElementType::SamplingFrequency));
    elems.insert(0x9F, (Type::Unsigned, ElementType::Channels));
    elems.insert(0x6264, (Type::Unsigned, ElementType::BitDepth));
    elems.insert(0xE0, (Type::Master, ElementType::Video));
    elems.insert(0xB0, (Type::Unsigned, ElementType::PixelWidth));
    elems.insert(0xBA, (Type::Unsigned, ElementType::PixelHeight));

    elems.insert(0x1F43_B675, (Type::Master, ElementType::Cluster));
    elems.insert(0xE7, (Type::Unsigned, ElementType::Timestamp));
    elems.insert(0xA3, (Type::Binary, ElementType::SimpleBlock));
    elems.insert(0xA0, (Type::Master, ElementType::BlockGroup));
    elems.insert(0xA1, (Type::Binary, ElementType::Block));
    elems.insert(0xFB, (Type::Signed, ElementType::ReferenceBlock));

    elems.insert(0xBF, (Type::Binary, ElementType::Crc32));
    elems.insert(0xEC, (Type::Binary, ElementType::Void));

    elems
});
