// Carton
// Copyright (c) 2026 The Project Carton Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use carton_core::errors::Result;
use carton_core::io::ReadBytes;

use crate::atoms::{Atom, AtomHeader};

/// Sync sample atom: 1-based sample numbers of keyframes, sorted ascending.
#[derive(Debug)]
pub(crate) struct StssAtom {
    sync_samples: Vec<u32>,
}

impl StssAtom {
    /// Whether the 1-based sample number is a sync sample.
    pub(crate) fn contains(&self, sample_number: u32) -> bool {
        self.sync_samples.binary_search(&sample_number).is_ok()
    }
}

impl Atom for StssAtom {
    fn read<B: ReadBytes>(reader: &mut B, header: AtomHeader) -> Result<Self> {
        let (_, _) = header.read_extended_header(reader)?;

        let entry_count = reader.read_be_u32()?;

        let mut sync_samples = Vec::with_capacity(entry_count as usize);

        for _ in 0..entry_count {
            sync_samples.push(reader.read_be_u32()?);
        }

        sync_samples.sort_unstable();

        Ok(StssAtom { sync_samples })
    }
}
