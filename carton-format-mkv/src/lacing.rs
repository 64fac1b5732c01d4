// Carton
// Copyright (c) 2026 The Project Carton Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Block lacing: a single Matroska block may pack multiple frames, with the
//! frame sizes encoded in one of three lace schemes.

use carton_core::errors::{decode_error, Result};
use carton_core::io::ReadBytes;

use crate::ebml::{read_signed_vint, read_unsigned_vint};

/// The lacing scheme of a block, from bits 1-2 of the block flags.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub(crate) enum Lacing {
    None,
    Xiph,
    FixedSize,
    Ebml,
}

impl Lacing {
    pub(crate) fn from_flags(flags: u8) -> Self {
        match (flags >> 1) & 0b11 {
            0b00 => Lacing::None,
            0b01 => Lacing::Xiph,
            0b10 => Lacing::FixedSize,
            _ => Lacing::Ebml,
        }
    }
}

/// Computes the `(offset, len)` byte range of every frame packed into a block
/// whose payload ends at `data_end`. The reader must be positioned
/// immediately after the block's flags byte; on return it has consumed only
/// the lace headers, not the frame data itself.
pub(crate) fn read_frame_ranges<R: ReadBytes>(
    reader: &mut R,
    lacing: Lacing,
    data_end: u64,
) -> Result<Vec<(u64, u32)>> {
    if lacing == Lacing::None {
        let pos = reader.pos();
        if data_end < pos {
            return decode_error("mkv: block payload overruns its element");
        }
        return Ok(vec![(pos, (data_end - pos) as u32)]);
    }

    // Laced blocks start with the frame count minus one.
    let frame_count = usize::from(reader.read_byte()?) + 1;

    // All schemes encode the sizes of the first `frame_count - 1` frames; the
    // last frame occupies the remainder of the payload.
    let mut sizes = Vec::with_capacity(frame_count);

    match lacing {
        Lacing::None => unreachable!(),
        Lacing::Xiph => {
            for _ in 0..frame_count - 1 {
                let mut size = 0u64;
                loop {
                    let byte = reader.read_byte()?;
                    size += u64::from(byte);
                    if byte != 255 {
                        break;
                    }
                }
                sizes.push(size);
            }
        }
        Lacing::Ebml => {
            let mut size = 0i64;
            for i in 0..frame_count - 1 {
                // The first size is absolute, the rest are signed deltas.
                if i == 0 {
                    size = read_unsigned_vint(&mut *reader)? as i64;
                }
                else {
                    size += read_signed_vint(&mut *reader)?;
                }
                if size < 0 {
                    return decode_error("mkv: negative laced frame size");
                }
                sizes.push(size as u64);
            }
        }
        Lacing::FixedSize => {
            let pos = reader.pos();
            if data_end < pos {
                return decode_error("mkv: block payload overruns its element");
            }
            let total = data_end - pos;
            if total % frame_count as u64 != 0 {
                return decode_error("mkv: fixed lacing with non-uniform payload");
            }
            let size = total / frame_count as u64;
            for _ in 0..frame_count - 1 {
                sizes.push(size);
            }
        }
    }

    let mut pos = reader.pos();
    if data_end < pos {
        return decode_error("mkv: block payload overruns its element");
    }

    let mut ranges = Vec::with_capacity(frame_count);
    for size in sizes {
        if size > u64::from(u32::MAX) || pos + size > data_end {
            return decode_error("mkv: laced frame size exceeds block payload");
        }
        ranges.push((pos, size as u32));
        pos += size;
    }

    // The final frame takes whatever remains.
    ranges.push((pos, (data_end - pos) as u32));

    Ok(ranges)
}

#[cfg(test)]
mod tests {
    use carton_core::io::{BufReader, ReadBytes};

    use super::{read_frame_ranges, Lacing};

    #[test]
    fn lacing_flag_decoding() {
        assert_eq!(Lacing::from_flags(0x80), Lacing::None);
        assert_eq!(Lacing::from_flags(0x02), Lacing::Xiph);
        assert_eq!(Lacing::from_flags(0x04), Lacing::FixedSize);
        assert_eq!(Lacing::from_flags(0x06), Lacing::Ebml);
    }

    #[test]
    fn no_lacing_yields_whole_payload() {
        let data = [0u8; 16];
        let mut reader = BufReader::new(&data);
        reader.ignore_bytes(4).unwrap();

        let ranges = read_frame_ranges(&mut reader, Lacing::None, 16).unwrap();
        assert_eq!(ranges, vec![(4, 12)]);
    }

    #[test]
    fn xiph_lacing() {
        // 3 frames: sizes 255+45=300, 10, remainder.
        let mut data = vec![0x02, 255, 45, 10];
        data.extend(std::iter::repeat(0).take(300 + 10 + 7));

        let mut reader = BufReader::new(&data);
        let ranges = read_frame_ranges(&mut reader, Lacing::Xiph, data.len() as u64).unwrap();
        assert_eq!(ranges, vec![(4, 300), (304, 10), (314, 7)]);
    }

    #[test]
    fn fixed_lacing() {
        let mut data = vec![0x03];
        data.extend(std::iter::repeat(0).take(20));

        let mut reader = BufReader::new(&data);
        let ranges = read_frame_ranges(&mut reader, Lacing::FixedSize, data.len() as u64).unwrap();
        assert_eq!(ranges, vec![(1, 5), (6, 5), (11, 5), (16, 5)]);

        // A payload that does not divide evenly is malformed.
        let data = vec![0x02, 0, 0, 0, 0];
        let mut reader = BufReader::new(&data);
        reader.ignore_bytes(0).unwrap();
        assert!(read_frame_ranges(&mut reader, Lacing::FixedSize, 5).is_err());
    }

    #[test]
    fn ebml_lacing() {
        // 3 frames: first size 500 (vint 0x41 0xF4), delta -2 (vint 0xBD).
        let mut data = vec![0x02, 0x41, 0xF4, 0xBD];
        data.extend(std::iter::repeat(0).take(500 + 498 + 9));

        let mut reader = BufReader::new(&data);
        let ranges = read_frame_ranges(&mut reader, Lacing::Ebml, data.len() as u64).unwrap();
        assert_eq!(ranges, vec![(4, 500), (504, 498), (1002, 9)]);
    }
}
