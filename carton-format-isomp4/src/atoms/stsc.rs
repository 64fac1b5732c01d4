// Carton
// Copyright (c) 2026 The Project Carton Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use carton_core::errors::{decode_error, Result};
use carton_core::io::ReadBytes;

use crate::atoms::{Atom, AtomHeader};

/// One sample-to-chunk run, with the first chunk index rebased to 0.
#[derive(Debug)]
pub(crate) struct StscEntry {
    pub first_chunk: u32,
    pub samples_per_chunk: u32,
}

/// Sample-to-chunk atom.
#[derive(Debug)]
pub(crate) struct StscAtom {
    pub entries: Vec<StscEntry>,
}

impl Atom for StscAtom {
    fn read<B: ReadBytes>(reader: &mut B, header: AtomHeader) -> Result<Self> {
        let (_, _) = header.read_extended_header(reader)?;

        let entry_count = reader.read_be_u32()?;

        let mut entries = Vec::with_capacity(entry_count as usize);

        for _ in 0..entry_count {
            let first_chunk = reader.read_be_u32()?;
            let samples_per_chunk = reader.read_be_u32()?;
            let _sample_description_index = reader.read_be_u32()?;

            if first_chunk < 1 {
                return decode_error("isomp4 (stsc): invalid first chunk");
            }

            if samples_per_chunk < 1 {
                return decode_error("isomp4 (stsc): invalid samples per chunk");
            }

            // Chunk indices are 1-based in the table.
            entries.push(StscEntry { first_chunk: first_chunk - 1, samples_per_chunk });
        }

        if let Some(first) = entries.first() {
            if first.first_chunk != 0 {
                return decode_error("isomp4 (stsc): first entry must start at chunk 1");
            }
        }

        for pair in entries.windows(2) {
            if pair[1].first_chunk <= pair[0].first_chunk {
                return decode_error("isomp4 (stsc): chunk indices not monotonic");
            }
        }

        Ok(StscAtom { entries })
    }
}
