// Carton
// Copyright (c) 2026 The Project Carton Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use carton_core::errors::{corruption_error, Result};
use carton_core::io::ReadBytes;

use crate::atoms::{Atom, AtomHeader, AtomIterator, AtomType, EdtsAtom, MdiaAtom, TkhdAtom};

/// Track atom. The track header and media atom are required; a missing one is
/// a corruption error naming the box and the offset it was expected at.
#[derive(Debug)]
pub(crate) struct TrakAtom {
    pub tkhd: TkhdAtom,
    pub edts: Option<EdtsAtom>,
    pub mdia: MdiaAtom,
}

impl Atom for TrakAtom {
    fn read<B: ReadBytes>(reader: &mut B, header: AtomHeader) -> Result<Self> {
        let mut tkhd = None;
        let mut edts = None;
        let mut mdia = None;

        let mut iter = AtomIterator::new(reader, &header);

        while let Some(child) = iter.next()? {
            match child.atom_type {
                AtomType::TrackHeader => {
                    tkhd = Some(TkhdAtom::read(iter.inner_mut(), child)?);
                }
                AtomType::Edit => {
                    edts = Some(EdtsAtom::read(iter.inner_mut(), child)?);
                }
                AtomType::Media => {
                    mdia = Some(MdiaAtom::read(iter.inner_mut(), child)?);
                }
                _ => (),
            }
        }

        let tkhd = match tkhd {
            Some(tkhd) => tkhd,
            None => return corruption_error("tkhd", header.data_pos),
        };
        let mdia = match mdia {
            Some(mdia) => mdia,
            None => return corruption_error("mdia", header.data_pos),
        };

        Ok(TrakAtom { tkhd, edts, mdia })
    }
}
