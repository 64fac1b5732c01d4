// Carton
// Copyright (c) 2026 The Project Carton Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::io;
use std::io::{Seek, SeekFrom};

use super::ReadBytes;

#[inline(always)]
fn underrun_error<T>() -> io::Result<T> {
    Err(io::Error::new(io::ErrorKind::UnexpectedEof, "buffer underrun"))
}

/// A `BufReader` reads bytes from a byte buffer.
pub struct BufReader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> BufReader<'a> {
    /// Instantiates a new `BufReader` from a given byte buffer.
    pub fn new(buf: &'a [u8]) -> Self {
        BufReader { buf, pos: 0 }
    }

    /// Returns the number of bytes not yet read.
    pub fn bytes_available(&self) -> u64 {
        (self.buf.len() - self.pos) as u64
    }
}

impl<'a> ReadBytes for BufReader<'a> {
    #[inline(always)]
    fn read_byte(&mut self) -> io::Result<u8> {
        if self.buf.len() - self.pos < 1 {
            return underrun_error();
        }

        self.pos += 1;
        Ok(self.buf[self.pos - 1])
    }

    fn read_buf_exact(&mut self, buf: &mut [u8]) -> io::Result<()> {
        let len = buf.len();

        if self.buf.len() - self.pos < len {
            return underrun_error();
        }

        buf.copy_from_slice(&self.buf[self.pos..self.pos + len]);
        self.pos += len;

        Ok(())
    }

    fn ignore_bytes(&mut self, count: u64) -> io::Result<()> {
        if self.bytes_available() < count {
            return underrun_error();
        }

        self.pos += count as usize;
        Ok(())
    }

    fn pos(&self) -> u64 {
        self.pos as u64
    }
}

impl<'a> Seek for BufReader<'a> {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        let new_pos = match pos {
            SeekFrom::Start(offset) => offset as i64,
            SeekFrom::Current(delta) => self.pos as i64 + delta,
            SeekFrom::End(delta) => self.buf.len() as i64 + delta,
        };

        if new_pos < 0 || new_pos > self.buf.len() as i64 {
            return underrun_error();
        }

        self.pos = new_pos as usize;
        Ok(self.pos as u64)
    }
}

#[cfg(test)]
mod tests {
    use std::io::{Seek, SeekFrom};

    use super::BufReader;
    use crate::io::ReadBytes;

    #[test]
    fn verify_buf_reader() {
        let data = [0x01u8, 0x02, 0x03, 0x04, 0x40, 0x49, 0x0f, 0xdb];
        let mut reader = BufReader::new(&data);

        assert_eq!(reader.read_be_u24().unwrap(), 0x010203);
        assert_eq!(reader.read_byte().unwrap(), 0x04);
        assert!((reader.read_be_f32().unwrap() - std::f32::consts::PI).abs() < 1e-6);
        assert_eq!(reader.bytes_available(), 0);
        assert!(reader.read_byte().is_err());

        reader.seek(SeekFrom::Start(4)).unwrap();
        assert_eq!(reader.read_be_u32().unwrap(), 0x40490fdb);
    }
}
