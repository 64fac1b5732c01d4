// Carton
// Copyright (c) 2026 The Project Carton Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use carton_core::errors::{decode_error, Result};
use carton_core::io::ReadBytes;

use crate::atoms::{Atom, AtomHeader};

/// File type atom.
#[derive(Debug)]
pub(crate) struct FtypAtom {
    pub major_brand: [u8; 4],
    pub compatible_brands: Vec<[u8; 4]>,
}

impl Atom for FtypAtom {
    fn read<B: ReadBytes>(reader: &mut B, header: AtomHeader) -> Result<Self> {
        let data_len = match header.data_len() {
            Some(len) => len,
            None => return decode_error("isomp4 (ftyp): unknown size"),
        };

        // Major brand, minor version, then a list of compatible brands.
        if data_len < 8 || data_len % 4 != 0 {
            return decode_error("isomp4 (ftyp): invalid size");
        }

        let mut major_brand = [0u8; 4];
        reader.read_buf_exact(&mut major_brand)?;

        let _minor_version = reader.read_be_u32()?;

        let mut compatible_brands = Vec::with_capacity(((data_len - 8) / 4) as usize);
        for _ in 0..(data_len - 8) / 4 {
            let mut brand = [0u8; 4];
            reader.read_buf_exact(&mut brand)?;
            compatible_brands.push(brand);
        }

        Ok(FtypAtom { major_brand, compatible_brands })
    }
}
