// Carton
// Copyright (c) 2026 The Project Carton Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use carton_core::errors::Result;
use carton_core::io::ReadBytes;

use crate::atoms::{Atom, AtomHeader, AtomIterator, AtomType, ElstAtom};

/// Edit atom. The edit list is parsed but not applied to timestamps.
#[derive(Debug)]
pub(crate) struct EdtsAtom {
    pub elst: Option<ElstAtom>,
}

impl Atom for EdtsAtom {
    fn read<B: ReadBytes>(reader: &mut B, header: AtomHeader) -> Result<Self> {
        let mut elst = None;

        let mut iter = AtomIterator::new(reader, &header);

        while let Some(child) = iter.next()? {
            if child.atom_type == AtomType::EditList {
                elst = Some(ElstAtom::read(iter.inner_mut(), child)?);
            }
        }

        Ok(EdtsAtom { elst })
    }
}
