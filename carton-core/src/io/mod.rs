// Carton
// Copyright (c) 2026 The Project Carton Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The `io` module implements composable stream-based I/O primitives.
//!
//! A demuxer session owns exactly one [`MediaSourceStream`], the single shared
//! cursor over the underlying byte source. Readers never retain buffered data
//! between logical reads: any value that is resolved lazily is read by
//! explicitly repositioning the cursor first.

use std::fs::File;
use std::io;

mod buf_reader;
mod media_source_stream;

pub use buf_reader::BufReader;
pub use media_source_stream::MediaSourceStream;

/// `MediaSource` is a trait implemented by sources of media data.
pub trait MediaSource: io::Read + io::Seek + Send + Sync {
    /// Returns if the source is seekable. This may be an expensive operation.
    fn is_seekable(&self) -> bool;

    /// Returns the length in bytes, if available. This may be an expensive
    /// operation.
    fn byte_len(&self) -> Option<u64>;
}

impl MediaSource for File {
    /// Returns if the `File` backing the `MediaSource` is seekable.
    ///
    /// Note: this operation returns false if the file's metadata could not be
    /// queried.
    fn is_seekable(&self) -> bool {
        match self.metadata() {
            Ok(metadata) => metadata.is_file(),
            _ => false,
        }
    }

    fn byte_len(&self) -> Option<u64> {
        match self.metadata() {
            Ok(metadata) => Some(metadata.len()),
            _ => None,
        }
    }
}

impl<T: AsRef<[u8]> + Send + Sync> MediaSource for io::Cursor<T> {
    fn is_seekable(&self) -> bool {
        true
    }

    fn byte_len(&self) -> Option<u64> {
        Some(self.get_ref().as_ref().len() as u64)
    }
}

/// `ReadBytes` provides methods to read bytes and interpret them as
/// big-endian integers or floating-point values.
pub trait ReadBytes {
    /// Reads a single byte from the stream.
    fn read_byte(&mut self) -> io::Result<u8>;

    /// Reads two bytes and interprets them as a big-endian unsigned integer.
    fn read_be_u16(&mut self) -> io::Result<u16> {
        let mut buf = [0u8; 2];
        self.read_buf_exact(&mut buf)?;
        Ok(u16::from_be_bytes(buf))
    }

    /// Reads three bytes and interprets them as a big-endian unsigned integer.
    fn read_be_u24(&mut self) -> io::Result<u32> {
        let mut buf = [0u8; 4];
        self.read_buf_exact(&mut buf[1..4])?;
        Ok(u32::from_be_bytes(buf))
    }

    /// Reads four bytes and interprets them as a big-endian unsigned integer.
    fn read_be_u32(&mut self) -> io::Result<u32> {
        let mut buf = [0u8; 4];
        self.read_buf_exact(&mut buf)?;
        Ok(u32::from_be_bytes(buf))
    }

    /// Reads eight bytes and interprets them as a big-endian unsigned integer.
    fn read_be_u64(&mut self) -> io::Result<u64> {
        let mut buf = [0u8; 8];
        self.read_buf_exact(&mut buf)?;
        Ok(u64::from_be_bytes(buf))
    }

    /// Reads four bytes and interprets them as a big-endian IEEE-754 float.
    fn read_be_f32(&mut self) -> io::Result<f32> {
        Ok(f32::from_bits(self.read_be_u32()?))
    }

    /// Reads eight bytes and interprets them as a big-endian IEEE-754 double.
    fn read_be_f64(&mut self) -> io::Result<f64> {
        Ok(f64::from_bits(self.read_be_u64()?))
    }

    /// Reads exactly the number of bytes required to fill `buf`.
    fn read_buf_exact(&mut self, buf: &mut [u8]) -> io::Result<()>;

    /// Reads exactly `len` bytes into a boxed slice.
    fn read_boxed_slice_exact(&mut self, len: usize) -> io::Result<Box<[u8]>> {
        let mut buf = vec![0u8; len];
        self.read_buf_exact(&mut buf)?;
        Ok(buf.into_boxed_slice())
    }

    /// Ignores the specified number of bytes from the stream.
    fn ignore_bytes(&mut self, count: u64) -> io::Result<()>;

    /// Gets the position of the stream.
    fn pos(&self) -> u64;
}

impl<'b, R: ReadBytes> ReadBytes for &'b mut R {
    #[inline(always)]
    fn read_byte(&mut self) -> io::Result<u8> {
        (*self).read_byte()
    }

    #[inline(always)]
    fn read_buf_exact(&mut self, buf: &mut [u8]) -> io::Result<()> {
        (*self).read_buf_exact(buf)
    }

    #[inline(always)]
    fn ignore_bytes(&mut self, count: u64) -> io::Result<()> {
        (*self).ignore_bytes(count)
    }

    #[inline(always)]
    fn pos(&self) -> u64 {
        (**self).pos()
    }
}
