// Carton
// Copyright (c) 2026 The Project Carton Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use carton_core::errors::Result;
use carton_core::io::ReadBytes;

use crate::atoms::{Atom, AtomHeader};

/// Sample sizes, either one constant size for all samples or a per-sample
/// table.
#[derive(Debug)]
pub(crate) enum SampleSize {
    Constant(u32),
    Variable(Vec<u32>),
}

/// Sample size atom.
#[derive(Debug)]
pub(crate) struct StszAtom {
    pub sample_count: u32,
    pub sample_sizes: SampleSize,
}

impl StszAtom {
    /// Size of sample `index`, or `None` when the index is out of range.
    pub(crate) fn size_of(&self, index: u32) -> Option<u32> {
        if index >= self.sample_count {
            return None;
        }

        match &self.sample_sizes {
            SampleSize::Constant(size) => Some(*size),
            SampleSize::Variable(sizes) => sizes.get(index as usize).copied(),
        }
    }
}

impl Atom for StszAtom {
    fn read<B: ReadBytes>(reader: &mut B, header: AtomHeader) -> Result<Self> {
        let (_, _) = header.read_extended_header(reader)?;

        let sample_size = reader.read_be_u32()?;
        let sample_count = reader.read_be_u32()?;

        let sample_sizes = if sample_size != 0 {
            SampleSize::Constant(sample_size)
        }
        else {
            let mut sizes = Vec::with_capacity(sample_count as usize);
            for _ in 0..sample_count {
                sizes.push(reader.read_be_u32()?);
            }
            SampleSize::Variable(sizes)
        };

        Ok(StszAtom { sample_count, sample_sizes })
    }
}
