// Carton
// Copyright (c) 2026 The Project Carton Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use carton_core::errors::{unsupported_error, Result};
use carton_core::io::ReadBytes;

/// Reads a BER-encoded length.
///
/// A first byte below 0x80 is the length itself. 0x81 through 0x84 announce
/// one to four big-endian length bytes. Longer forms are valid BER but exceed
/// what this reader handles.
pub(crate) fn read_ber_length<B: ReadBytes>(reader: &mut B) -> Result<u64> {
    let first = reader.read_byte()?;

    if first < 0x80 {
        return Ok(u64::from(first));
    }

    let count = match first {
        0x81..=0x84 => first - 0x80,
        _ => return unsupported_error("mxf: BER length form"),
    };

    let mut len = 0u64;
    for _ in 0..count {
        len = (len << 8) | u64::from(reader.read_byte()?);
    }

    Ok(len)
}

/// One KLV triplet located in the stream. Only the key and the position of
/// the value are retained; the value bytes are read on demand by seeking to
/// `data_pos`.
#[derive(Copy, Clone, Debug)]
pub(crate) struct KlvItem {
    /// The 16-byte SMPTE universal label.
    pub key: [u8; 16],
    /// Length of the value in bytes.
    pub len: u64,
    /// Absolute stream offset of the first value byte.
    pub data_pos: u64,
}

impl KlvItem {
    /// Reads the key and length of the next triplet, leaving the reader at
    /// the first value byte.
    pub(crate) fn read<B: ReadBytes>(reader: &mut B) -> Result<KlvItem> {
        let mut key = [0u8; 16];
        reader.read_buf_exact(&mut key)?;

        let len = read_ber_length(reader)?;

        Ok(KlvItem { key, len, data_pos: reader.pos() })
    }

    /// The exclusive end position of the value.
    pub(crate) fn end(&self) -> u64 {
        self.data_pos + self.len
    }
}
