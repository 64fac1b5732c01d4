// Carton
// Copyright (c) 2026 The Project Carton Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use carton_core::formats::Codec;

/// Closed dictionary mapping Matroska codec ID strings to codecs. Extend it
/// by adding entries, never by pattern-matching on the ID string. PCM IDs are
/// resolved separately because the exact sample format depends on bit depth.
static CODEC_IDS: phf::Map<&'static str, Codec> = phf::phf_map! {
    "A_FLAC" => Codec::Flac,
    "A_ALAC" => Codec::Alac,
    "A_DTS" => Codec::Dts,
    "A_AC3" => Codec::Ac3,
    "A_EAC3" => Codec::Eac3,
    "A_AAC" => Codec::Aac,
    "A_MPEG/L3" => Codec::Mp3,
    "A_VORBIS" => Codec::Vorbis,
    "A_OPUS" => Codec::Opus,
    "V_MPEG4/ISO/AVC" => Codec::Avc,
    "V_MPEGH/ISO/HEVC" => Codec::Hevc,
    "V_VP8" => Codec::Vp8,
    "V_VP9" => Codec::Vp9,
    "V_AV1" => Codec::Av1,
    "V_MPEG4/ISO/ASP" => Codec::Mpeg4,
};

/// Maps a Matroska codec ID string to a [`Codec`]. IDs outside the dictionary
/// map to [`Codec::Unknown`].
pub(crate) fn codec_from_id(codec_id: &str, bit_depth: Option<u64>) -> Codec {
    match codec_id {
        "A_PCM/INT/LIT" => match bit_depth {
            Some(24) => Codec::PcmS24Le,
            _ => Codec::PcmS16Le,
        },
        "A_PCM/INT/BIG" => Codec::PcmS16Be,
        "A_PCM/FLOAT/IEEE" => Codec::PcmF32Le,
        _ => CODEC_IDS.get(codec_id).copied().unwrap_or(Codec::Unknown),
    }
}
