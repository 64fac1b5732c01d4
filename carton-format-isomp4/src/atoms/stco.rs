// Carton
// Copyright (c) 2026 The Project Carton Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use carton_core::errors::Result;
use carton_core::io::ReadBytes;

use crate::atoms::{Atom, AtomHeader};

/// 32-bit chunk offset atom.
#[derive(Debug)]
pub(crate) struct StcoAtom {
    pub offsets: Vec<u64>,
}

impl Atom for StcoAtom {
    fn read<B: ReadBytes>(reader: &mut B, header: AtomHeader) -> Result<Self> {
        let (_, _) = header.read_extended_header(reader)?;

        let entry_count = reader.read_be_u32()?;

        let mut offsets = Vec::with_capacity(entry_count as usize);

        for _ in 0..entry_count {
            offsets.push(u64::from(reader.read_be_u32()?));
        }

        Ok(StcoAtom { offsets })
    }
}
