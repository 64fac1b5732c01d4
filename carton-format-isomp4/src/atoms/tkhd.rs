// Carton
// Copyright (c) 2026 The Project Carton Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use carton_core::errors::{decode_error, Result};
use carton_core::io::ReadBytes;

use crate::atoms::{Atom, AtomHeader};

/// Track header atom: the container-native track ID, plus presentation width
/// and height for visual tracks.
#[derive(Debug)]
pub(crate) struct TkhdAtom {
    pub id: u32,
    /// Track duration in the movie timescale, 0 if unknown.
    pub duration: u64,
    /// Presentation width in pixels (integer part of the 16.16 value).
    pub width: u32,
    /// Presentation height in pixels (integer part of the 16.16 value).
    pub height: u32,
}

impl Atom for TkhdAtom {
    fn read<B: ReadBytes>(reader: &mut B, header: AtomHeader) -> Result<Self> {
        let (version, _) = header.read_extended_header(reader)?;

        let (id, duration) = match version {
            0 => {
                reader.ignore_bytes(8)?;
                let id = reader.read_be_u32()?;
                reader.ignore_bytes(4)?;
                let duration = u64::from(reader.read_be_u32()?);
                (id, if duration == u64::from(u32::MAX) { 0 } else { duration })
            }
            1 => {
                reader.ignore_bytes(16)?;
                let id = reader.read_be_u32()?;
                reader.ignore_bytes(4)?;
                let duration = reader.read_be_u64()?;
                (id, if duration == u64::MAX { 0 } else { duration })
            }
            _ => return decode_error("isomp4 (tkhd): invalid version"),
        };

        // Reserved, layer, alternate group, volume, reserved, and the 3x3
        // transformation matrix.
        reader.ignore_bytes(8 + 2 + 2 + 2 + 2 + 36)?;

        let width = reader.read_be_u32()? >> 16;
        let height = reader.read_be_u32()? >> 16;

        Ok(TkhdAtom { id, duration, width, height })
    }
}
