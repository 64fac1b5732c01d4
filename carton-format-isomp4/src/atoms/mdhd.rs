// Carton
// Copyright (c) 2026 The Project Carton Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use carton_core::errors::{decode_error, Result};
use carton_core::io::ReadBytes;

use crate::atoms::{Atom, AtomHeader};

/// Media header atom: the track's timescale, duration, and language.
#[derive(Debug)]
pub(crate) struct MdhdAtom {
    /// Ticks per second for this track's media.
    pub timescale: u32,
    /// Media duration in track timescale ticks, 0 if unknown.
    pub duration: u64,
    /// ISO 639-2 language code, or `None` when unset.
    pub language: Option<String>,
}

/// Unpacks a 16-bit packed ISO 639-2 language code: three 5-bit letters, each
/// biased by 0x60.
fn parse_language(packed: u16) -> Option<String> {
    if !(0x400..0x7FFF).contains(&packed) {
        return None;
    }

    let chars =
        [(packed >> 10) & 0x1F, (packed >> 5) & 0x1F, packed & 0x1F].map(|c| (c as u8) + 0x60);

    Some(String::from_utf8_lossy(&chars).into_owned())
}

impl Atom for MdhdAtom {
    fn read<B: ReadBytes>(reader: &mut B, header: AtomHeader) -> Result<Self> {
        let (version, _) = header.read_extended_header(reader)?;

        let (timescale, duration) = match version {
            0 => {
                reader.ignore_bytes(8)?;
                let timescale = reader.read_be_u32()?;
                let duration = u64::from(reader.read_be_u32()?);
                (timescale, if duration == u64::from(u32::MAX) { 0 } else { duration })
            }
            1 => {
                reader.ignore_bytes(16)?;
                let timescale = reader.read_be_u32()?;
                let duration = reader.read_be_u64()?;
                (timescale, if duration == u64::MAX { 0 } else { duration })
            }
            _ => return decode_error("isomp4 (mdhd): invalid version"),
        };

        let language = parse_language(reader.read_be_u16()?);
        let _pre_defined = reader.read_be_u16()?;

        Ok(MdhdAtom { timescale, duration, language })
    }
}
