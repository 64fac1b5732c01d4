// Carton
// Copyright (c) 2026 The Project Carton Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use carton_core::errors::{decode_error, Result};
use carton_core::io::ReadBytes;

use crate::atoms::{Atom, AtomHeader};

/// Movie header atom: presentation-wide timescale and duration.
#[derive(Debug)]
pub(crate) struct MvhdAtom {
    /// Ticks per second for the whole presentation.
    pub timescale: u32,
    /// Presentation duration in timescale ticks, 0 if unknown.
    pub duration: u64,
}

impl Atom for MvhdAtom {
    fn read<B: ReadBytes>(reader: &mut B, header: AtomHeader) -> Result<Self> {
        let (version, _) = header.read_extended_header(reader)?;

        let (timescale, duration) = match version {
            0 => {
                // Creation and modification times are not used.
                reader.ignore_bytes(8)?;
                let timescale = reader.read_be_u32()?;
                let duration = u64::from(reader.read_be_u32()?);
                // An all-ones duration means unknown.
                (timescale, if duration == u64::from(u32::MAX) { 0 } else { duration })
            }
            1 => {
                reader.ignore_bytes(16)?;
                let timescale = reader.read_be_u32()?;
                let duration = reader.read_be_u64()?;
                (timescale, if duration == u64::MAX { 0 } else { duration })
            }
            _ => return decode_error("isomp4 (mvhd): invalid version"),
        };

        Ok(MvhdAtom { timescale, duration })
    }
}
