// Carton
// Copyright (c) 2026 The Project Carton Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use log::debug;

use carton_core::errors::{decode_error, Result};
use carton_core::io::ReadBytes;

use crate::atoms::{Atom, AtomHeader};

/// One edit list entry.
#[derive(Debug)]
pub(crate) struct ElstEntry {
    pub segment_duration: u64,
    pub media_time: i64,
}

/// Edit list atom.
#[derive(Debug)]
pub(crate) struct ElstAtom {
    pub entries: Vec<ElstEntry>,
}

impl Atom for ElstAtom {
    fn read<B: ReadBytes>(reader: &mut B, header: AtomHeader) -> Result<Self> {
        let (version, _) = header.read_extended_header(reader)?;

        let entry_count = reader.read_be_u32()?;

        let mut entries = Vec::with_capacity(entry_count as usize);

        for _ in 0..entry_count {
            let (segment_duration, media_time) = match version {
                0 => (u64::from(reader.read_be_u32()?), i64::from(reader.read_be_u32()? as i32)),
                1 => (reader.read_be_u64()?, reader.read_be_u64()? as i64),
                _ => return decode_error("isomp4 (elst): invalid version"),
            };

            // media_rate integer and fraction.
            let _ = reader.read_be_u32()?;

            entries.push(ElstEntry { segment_duration, media_time });
        }

        if !entries.is_empty() {
            debug!("edit list with {} entries is not applied", entries.len());
        }

        Ok(ElstAtom { entries })
    }
}
