// Carton
// Copyright (c) 2026 The Project Carton Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use carton_core::errors::{corruption_error, Result};
use carton_core::io::ReadBytes;

use crate::atoms::{
    Atom, AtomHeader, AtomIterator, AtomType, Co64Atom, StcoAtom, StscAtom, StsdAtom, StssAtom,
    StszAtom, SttsAtom,
};

/// Sample table atom: everything needed to map samples to byte ranges and
/// timestamps.
#[derive(Debug)]
pub(crate) struct StblAtom {
    pub stsd: StsdAtom,
    pub stts: SttsAtom,
    pub stsc: StscAtom,
    pub stsz: StszAtom,
    pub stco: Option<StcoAtom>,
    pub co64: Option<Co64Atom>,
    pub stss: Option<StssAtom>,
}

impl StblAtom {
    /// Absolute byte offset of every chunk, from the 32- or 64-bit table.
    pub(crate) fn chunk_offsets(&self) -> &[u64] {
        if let Some(co64) = &self.co64 {
            &co64.offsets
        }
        else if let Some(stco) = &self.stco {
            &stco.offsets
        }
        else {
            &[]
        }
    }
}

impl Atom for StblAtom {
    fn read<B: ReadBytes>(reader: &mut B, header: AtomHeader) -> Result<Self> {
        let mut stsd = None;
        let mut stts = None;
        let mut stsc = None;
        let mut stsz = None;
        let mut stco = None;
        let mut co64 = None;
        let mut stss = None;

        let mut iter = AtomIterator::new(reader, &header);

        while let Some(child) = iter.next()? {
            match child.atom_type {
                AtomType::SampleDescription => {
                    stsd = Some(StsdAtom::read(iter.inner_mut(), child)?);
                }
                AtomType::TimeToSample => {
                    stts = Some(SttsAtom::read(iter.inner_mut(), child)?);
                }
                AtomType::SampleToChunk => {
                    stsc = Some(StscAtom::read(iter.inner_mut(), child)?);
                }
                AtomType::SampleSize => {
                    stsz = Some(StszAtom::read(iter.inner_mut(), child)?);
                }
                AtomType::ChunkOffset => {
                    stco = Some(StcoAtom::read(iter.inner_mut(), child)?);
                }
                AtomType::ChunkOffset64 => {
                    co64 = Some(Co64Atom::read(iter.inner_mut(), child)?);
                }
                AtomType::SyncSample => {
                    stss = Some(StssAtom::read(iter.inner_mut(), child)?);
                }
                _ => (),
            }
        }

        let stsd = match stsd {
            Some(stsd) => stsd,
            None => return corruption_error("stsd", header.data_pos),
        };
        let stts = match stts {
            Some(stts) => stts,
            None => return corruption_error("stts", header.data_pos),
        };
        let stsc = match stsc {
            Some(stsc) => stsc,
            None => return corruption_error("stsc", header.data_pos),
        };
        let stsz = match stsz {
            Some(stsz) => stsz,
            None => return corruption_error("stsz", header.data_pos),
        };

        if stco.is_none() && co64.is_none() {
            return corruption_error("stco", header.data_pos);
        }

        Ok(StblAtom { stsd, stts, stsc, stsz, stco, co64, stss })
    }
}
