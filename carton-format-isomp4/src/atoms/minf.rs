// Carton
// Copyright (c) 2026 The Project Carton Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use carton_core::errors::{corruption_error, Result};
use carton_core::io::ReadBytes;

use crate::atoms::{Atom, AtomHeader, AtomIterator, AtomType, StblAtom};

/// Media information atom.
#[derive(Debug)]
pub(crate) struct MinfAtom {
    pub stbl: StblAtom,
}

impl Atom for MinfAtom {
    fn read<B: ReadBytes>(reader: &mut B, header: AtomHeader) -> Result<Self> {
        let mut stbl = None;

        let mut iter = AtomIterator::new(reader, &header);

        while let Some(child) = iter.next()? {
            if child.atom_type == AtomType::SampleTable {
                stbl = Some(StblAtom::read(iter.inner_mut(), child)?);
            }
        }

        match stbl {
            Some(stbl) => Ok(MinfAtom { stbl }),
            None => corruption_error("stbl", header.data_pos),
        }
    }
}
