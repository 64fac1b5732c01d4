// Carton
// Copyright (c) 2026 The Project Carton Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use carton_core::errors::{corruption_error, Result};
use carton_core::io::ReadBytes;

use crate::atoms::{Atom, AtomHeader, AtomIterator, AtomType, MvhdAtom, TrakAtom};

/// Movie atom: the movie header plus one track atom per track.
#[derive(Debug)]
pub(crate) struct MoovAtom {
    pub mvhd: MvhdAtom,
    pub traks: Vec<TrakAtom>,
}

impl Atom for MoovAtom {
    fn read<B: ReadBytes>(reader: &mut B, header: AtomHeader) -> Result<Self> {
        let mut mvhd = None;
        let mut traks = Vec::new();

        let mut iter = AtomIterator::new(reader, &header);

        while let Some(child) = iter.next()? {
            match child.atom_type {
                AtomType::MovieHeader => {
                    mvhd = Some(MvhdAtom::read(iter.inner_mut(), child)?);
                }
                AtomType::Track => {
                    traks.push(TrakAtom::read(iter.inner_mut(), child)?);
                }
                _ => (),
            }
        }

        let mvhd = match mvhd {
            Some(mvhd) => mvhd,
            None => return corruption_error("mvhd", header.data_pos),
        };

        Ok(MoovAtom { mvhd, traks })
    }
}
