// Carton
// Copyright (c) 2026 The Project Carton Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::io;
use std::io::{Read, Seek, SeekFrom};

use super::{MediaSource, ReadBytes};

/// `MediaSourceStream` is the single stream cursor a demuxer session owns.
///
/// It tracks the absolute position of the underlying [`MediaSource`] and
/// performs unbuffered reads: nothing is retained between reads, so callers
/// reposition the cursor explicitly before every lazily-resolved value read.
/// Only one logical read operation may be in flight at a time; the stream is
/// passed by exclusive reference into whichever parser currently owns it.
pub struct MediaSourceStream {
    inner: Box<dyn MediaSource>,
    pos: u64,
}

impl MediaSourceStream {
    pub fn new(source: Box<dyn MediaSource>) -> Self {
        MediaSourceStream { inner: source, pos: 0 }
    }

    /// Returns if the underlying source is seekable.
    pub fn is_seekable(&self) -> bool {
        self.inner.is_seekable()
    }

    /// Returns the total length of the underlying source in bytes, if known.
    pub fn byte_len(&self) -> Option<u64> {
        self.inner.byte_len()
    }
}

impl ReadBytes for MediaSourceStream {
    fn read_byte(&mut self) -> io::Result<u8> {
        let mut buf = [0u8; 1];
        self.inner.read_exact(&mut buf)?;
        self.pos += 1;
        Ok(buf[0])
    }

    fn read_buf_exact(&mut self, buf: &mut [u8]) -> io::Result<()> {
        self.inner.read_exact(buf)?;
        self.pos += buf.len() as u64;
        Ok(())
    }

    fn ignore_bytes(&mut self, count: u64) -> io::Result<()> {
        if count == 0 {
            return Ok(());
        }

        if self.inner.is_seekable() {
            self.seek(SeekFrom::Current(count as i64))?;
        }
        else {
            // Discard in bounded chunks when the source cannot seek.
            let mut remaining = count;
            let mut sink = [0u8; 1024];

            while remaining > 0 {
                let len = remaining.min(sink.len() as u64) as usize;
                self.read_buf_exact(&mut sink[..len])?;
                remaining -= len as u64;
            }
        }

        Ok(())
    }

    fn pos(&self) -> u64 {
        self.pos
    }
}

impl Seek for MediaSourceStream {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        self.pos = self.inner.seek(pos)?;
        Ok(self.pos)
    }
}

#[cfg(test)]
mod tests {
    use std::io::{Cursor, Seek, SeekFrom};

    use super::MediaSourceStream;
    use crate::io::ReadBytes;

    #[test]
    fn verify_stream_position_tracking() {
        let data: Vec<u8> = (0..64).collect();
        let mut stream = MediaSourceStream::new(Box::new(Cursor::new(data)));

        assert_eq!(stream.pos(), 0);
        assert_eq!(stream.read_byte().unwrap(), 0);
        assert_eq!(stream.read_be_u16().unwrap(), 0x0102);
        assert_eq!(stream.read_be_u32().unwrap(), 0x0304_0506);
        assert_eq!(stream.pos(), 7);

        stream.ignore_bytes(9).unwrap();
        assert_eq!(stream.pos(), 16);
        assert_eq!(stream.read_byte().unwrap(), 16);

        stream.seek(SeekFrom::Start(2)).unwrap();
        assert_eq!(stream.pos(), 2);
        assert_eq!(stream.read_byte().unwrap(), 2);
    }

    #[test]
    fn verify_stream_eof() {
        let mut stream = MediaSourceStream::new(Box::new(Cursor::new(vec![1u8, 2])));
        assert!(stream.read_be_u32().is_err());
    }
}
