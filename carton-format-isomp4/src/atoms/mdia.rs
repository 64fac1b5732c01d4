// Carton
// Copyright (c) 2026 The Project Carton Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use carton_core::errors::{corruption_error, Result};
use carton_core::io::ReadBytes;

use crate::atoms::{Atom, AtomHeader, AtomIterator, AtomType, MdhdAtom, MinfAtom};

/// Media atom.
#[derive(Debug)]
pub(crate) struct MdiaAtom {
    pub mdhd: MdhdAtom,
    pub minf: MinfAtom,
}

impl Atom for MdiaAtom {
    fn read<B: ReadBytes>(reader: &mut B, header: AtomHeader) -> Result<Self> {
        let mut mdhd = None;
        let mut minf = None;

        let mut iter = AtomIterator::new(reader, &header);

        while let Some(child) = iter.next()? {
            match child.atom_type {
                AtomType::MediaHeader => {
                    mdhd = Some(MdhdAtom::read(iter.inner_mut(), child)?);
                }
                AtomType::MediaInfo => {
                    minf = Some(MinfAtom::read(iter.inner_mut(), child)?);
                }
                _ => (),
            }
        }

        let mdhd = match mdhd {
            Some(mdhd) => mdhd,
            None => return corruption_error("mdhd", header.data_pos),
        };
        let minf = match minf {
            Some(minf) => minf,
            None => return corruption_error("minf", header.data_pos),
        };

        Ok(MdiaAtom { mdhd, minf })
    }
}
