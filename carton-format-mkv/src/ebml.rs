// Carton
// Copyright (c) 2026 The Project Carton Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! EBML primitives: variable-size integers (RFC 8794), element headers, and
//! an iterator for walking child elements of a master element.

use carton_core::errors::{decode_error, Error, Result};
use carton_core::io::ReadBytes;

use crate::element_ids::{ElementType, Type, ELEMENTS};

/// Reads a single EBML element ID from the stream and returns its value with
/// the leading-one marker bits retained, and its length in bytes (1-4).
pub(crate) fn read_tag<R: ReadBytes>(mut reader: R) -> Result<(u32, u32)> {
    let byte = reader.read_byte()?;

    // The count of leading zeros in the first byte determines how many
    // additional bytes follow. Element IDs are at most 4 bytes.
    let remaining_octets = byte.leading_zeros();
    if remaining_octets > 3 {
        return decode_error("mkv: invalid element tag");
    }

    let mut tag = u32::from(byte);
    for _ in 0..remaining_octets {
        let byte = reader.read_byte()?;
        tag = (tag << 8) | u32::from(byte);
    }

    Ok((tag, remaining_octets + 1))
}

/// Reads an element size, returning `None` for the reserved unknown-size
/// pattern.
pub(crate) fn read_size<R: ReadBytes>(reader: R) -> Result<Option<u64>> {
    let (size, len) = read_vint(reader)?;
    if size == u64::MAX && len == 1 {
        return Ok(None);
    }
    Ok(Some(size))
}

/// Reads a single unsigned variable-size integer from the stream.
pub(crate) fn read_unsigned_vint<R: ReadBytes>(reader: R) -> Result<u64> {
    Ok(read_vint(reader)?.0)
}

/// Reads a single signed variable-size integer from the stream. The encoded
/// unsigned value is re-centered by subtracting half the representable range
/// for its encoded length.
pub(crate) fn read_signed_vint<R: ReadBytes>(mut reader: R) -> Result<i64> {
    let (value, len) = read_vint(&mut reader)?;
    let half_range = i64::pow(2, (len * 7) - 1) - 1;
    Ok(value as i64 - half_range)
}

/// Reads a single unsigned variable-size integer and returns both its value
/// (marker bit stripped) and its length in octets.
fn read_vint<R: ReadBytes>(mut reader: R) -> Result<(u64, u32)> {
    let byte = reader.read_byte()?;
    if byte == 0xFF {
        // Special case: unknown size elements.
        return Ok((u64::MAX, 1));
    }

    let vint_width = byte.leading_zeros();
    let mut vint = u64::from(byte);
    // Clear the VINT_MARKER bit, the single leading one.
    vint ^= 1 << (7 - vint_width);

    for _ in 0..vint_width {
        let byte = reader.read_byte()?;
        vint = (vint << 8) | u64::from(byte);
    }

    Ok((vint, vint_width + 1))
}

/// Reads a fixed-width big-endian unsigned integer of `len` bytes (0-8). Used
/// when the width is already known from an enclosing key-length-value header,
/// so no marker bit is present or stripped.
pub(crate) fn read_uint_fixed<R: ReadBytes>(mut reader: R, len: u64) -> Result<u64> {
    if len > 8 {
        return decode_error("mkv: invalid unsigned integer length");
    }

    let mut buf = [0u8; 8];
    reader.read_buf_exact(&mut buf[8 - len as usize..])?;
    Ok(u64::from_be_bytes(buf))
}

fn sign_extend(value: u64, bits: u32) -> i64 {
    if bits == 0 || bits >= 64 {
        return value as i64;
    }
    let shift = 64 - bits;
    ((value << shift) as i64) >> shift
}

/// A parsed EBML element header.
#[derive(Copy, Clone, Debug)]
pub(crate) struct ElementHeader {
    /// The element tag, marker bits retained.
    pub tag: u32,
    /// The element type.
    pub etype: ElementType,
    /// The element's offset in the stream.
    pub pos: u64,
    /// The element's data offset in the stream.
    pub data_pos: u64,
    /// The size of the payload data, or `None` when the element was written
    /// with the reserved unknown-size pattern.
    pub data_len: Option<u64>,
}

impl ElementHeader {
    /// Reads a single EBML element header from the stream.
    pub(crate) fn read<R: ReadBytes>(mut reader: &mut R) -> Result<ElementHeader> {
        let (tag, tag_len) = read_tag(&mut reader)?;
        let header_start = reader.pos() - u64::from(tag_len);

        let size = read_size(&mut reader)?;
        let data_pos = reader.pos();

        // A declared size that places the element end past the addressable
        // range of the stream cannot be valid.
        if let Some(size) = size {
            if data_pos.checked_add(size).is_none() {
                return decode_error("mkv: element size too large");
            }
        }

        Ok(ElementHeader {
            tag,
            etype: ELEMENTS.get(&tag).map_or(ElementType::Unknown, |(_, etype)| *etype),
            pos: header_start,
            data_pos,
            data_len: size,
        })
    }

    /// Returns an iterator over child elements of this element.
    pub(crate) fn children<R: ReadBytes>(&self, reader: R) -> ElementIterator<R> {
        assert_eq!(reader.pos(), self.data_pos, "unexpected position");
        ElementIterator::new_of(reader, *self)
    }

    /// Position immediately past the last byte of the element, or `None`
    /// when the element size is unknown.
    pub(crate) fn end(&self) -> Option<u64> {
        self.data_len.map(|len| self.data_pos + len)
    }
}

/// A typed EBML element that knows how to read itself from its children.
pub(crate) trait Element: Sized {
    const ID: ElementType;
    fn read<B: ReadBytes>(reader: &mut B, header: ElementHeader) -> Result<Self>;
}

/// Iterates over sibling elements, skipping the payload of any element that
/// is not descended into.
pub(crate) struct ElementIterator<R: ReadBytes> {
    reader: R,
    /// The header most recently returned to the caller.
    current: Option<ElementHeader>,
    /// Position of the next element header that would be read.
    next_pos: u64,
    /// Position immediately past the last byte of the parent element, if the
    /// parent's size is known.
    end: Option<u64>,
}

impl<R: ReadBytes> ElementIterator<R> {
    /// Creates a new iterator over elements starting from the current stream
    /// position.
    pub(crate) fn new(reader: R, end: Option<u64>) -> Self {
        let pos = reader.pos();
        Self { reader, current: None, next_pos: pos, end }
    }

    /// Creates a new iterator over children of the given parent element.
    fn new_of(reader: R, parent: ElementHeader) -> Self {
        Self { reader, current: Some(parent), next_pos: parent.data_pos, end: parent.end() }
    }

    /// Gives direct access to the underlying reader, positioned at the data
    /// of the most recently read header. Used for payloads that are parsed in
    /// place instead of being fetched whole.
    pub(crate) fn reader_mut(&mut self) -> &mut R {
        &mut self.reader
    }

    /// Reads a single element header and moves to its next sibling, ignoring
    /// any children.
    pub(crate) fn read_header(&mut self) -> Result<Option<ElementHeader>> {
        let header = self.read_header_no_consume()?;
        if let Some(header) = &header {
            // An unknown-size element cannot be skipped over. Leave the
            // cursor at its first child so the caller can descend into it.
            self.next_pos = header.end().unwrap_or(header.data_pos);
        }
        Ok(header)
    }

    /// Reads a single element header and shifts the stream to the element's
    /// first child if it is a master element, or to its next sibling
    /// otherwise.
    pub(crate) fn read_child_header(&mut self) -> Result<Option<ElementHeader>> {
        let header = self.read_header_no_consume()?;
        if let Some(header) = &header {
            match ELEMENTS.get(&header.tag).map(|it| it.0) {
                Some(Type::Master) => {
                    self.next_pos = header.data_pos;
                }
                _ => match header.end() {
                    Some(end) => self.next_pos = end,
                    // Only master elements may use the unknown-size pattern.
                    None => return decode_error("mkv: unsized non-master element"),
                },
            }
        }
        Ok(header)
    }

    /// Reads the element header at the current position, or `None` when the
    /// parent element has no more children.
    fn read_header_no_consume(&mut self) -> Result<Option<ElementHeader>> {
        let pos = self.reader.pos();
        if pos < self.next_pos {
            // Skip any payload bytes the caller did not consume.
            self.reader.ignore_bytes(self.next_pos - pos)?;
        }
        else if pos > self.next_pos {
            // A child walk of an unknown-size element legitimately ends past
            // the recorded resume position. For a sized element, overshoot
            // means a payload reader consumed beyond its declared end.
            match &self.current {
                Some(current) if current.data_len.is_none() => self.next_pos = pos,
                _ => return decode_error("mkv: element overread"),
            }
        }

        if self.reader.pos() < self.end.unwrap_or(u64::MAX) {
            let header = ElementHeader::read(&mut self.reader)?;
            self.current = Some(header);
            return Ok(Some(header));
        }

        Ok(None)
    }

    /// Reads the data of the current element as a typed element. Must be used
    /// after [`Self::read_header`] or [`Self::read_child_header`].
    pub(crate) fn read_element_data<E: Element>(&mut self) -> Result<E> {
        let header = match self.current {
            Some(header) => header,
            None => return decode_error("mkv: no current element"),
        };

        if header.etype != E::ID {
            return decode_error("mkv: unexpected EBML element");
        }

        let element = E::read(&mut self.reader, header)?;
        // The element reader may not have consumed the whole payload.
        self.next_pos = self.reader.pos();
        Ok(element)
    }

    /// Reads a collection of elements of the given type until the parent is
    /// exhausted, skipping elements of any other type.
    pub(crate) fn read_elements<E: Element>(&mut self) -> Result<Box<[E]>> {
        let mut elements = vec![];
        while let Some(header) = self.read_header()? {
            if header.etype == ElementType::Crc32 || header.etype == ElementType::Void {
                continue;
            }

            if header.etype != E::ID {
                log::warn!("skipping element with unexpected type {:?}", header.etype);
                continue;
            }

            elements.push(E::read(&mut self.reader, header)?);
        }
        Ok(elements.into_boxed_slice())
    }

    /// Reads the primitive data of the current element.
    pub(crate) fn read_data(&mut self) -> Result<ElementData> {
        let header = match self.current {
            Some(header) => header,
            None => return decode_error("mkv: no current element"),
        };
        self.try_read_data(header)?
            .ok_or(Error::DecodeError("mkv: element has no primitive data"))
    }

    /// Reads the data of the current element as an unsigned integer.
    pub(crate) fn read_u64(&mut self) -> Result<u64> {
        match self.read_data()? {
            ElementData::UnsignedInt(s) => Ok(s),
            _ => decode_error("mkv: expected an unsigned int"),
        }
    }

    /// Reads the data of the current element as a floating-point number.
    pub(crate) fn read_f64(&mut self) -> Result<f64> {
        match self.read_data()? {
            ElementData::Float(s) => Ok(s),
            _ => decode_error("mkv: expected a float"),
        }
    }

    /// Reads the data of the current element as a string.
    pub(crate) fn read_string(&mut self) -> Result<String> {
        match self.read_data()? {
            ElementData::String(s) => Ok(s),
            _ => decode_error("mkv: expected a string"),
        }
    }

    /// Reads the binary data of the current element as a boxed slice.
    pub(crate) fn read_boxed_slice(&mut self) -> Result<Box<[u8]>> {
        match self.read_data()? {
            ElementData::Binary(b) => Ok(b),
            _ => decode_error("mkv: expected binary data"),
        }
    }

    /// Reads the primitive data of the given element header. Returns `None`
    /// for master elements and elements outside the known-element table.
    fn try_read_data(&mut self, header: ElementHeader) -> Result<Option<ElementData>> {
        let ty = match ELEMENTS.get(&header.tag) {
            Some((Type::Master, _)) | None => return Ok(None),
            Some((ty, _)) => *ty,
        };

        assert_eq!(header.data_pos, self.reader.pos(), "invalid stream position");

        // Primitive elements always carry an explicit size.
        let data_len = match header.data_len {
            Some(len) => len,
            None => return decode_error("mkv: unsized primitive element"),
        };

        let data = match ty {
            Type::Master => return Ok(None),
            Type::Unsigned => {
                let value = read_uint_fixed(&mut self.reader, data_len)?;
                ElementData::UnsignedInt(value)
            }
            Type::Signed => {
                let value = read_uint_fixed(&mut self.reader, data_len)?;
                ElementData::SignedInt(sign_extend(value, (data_len as u32) * 8))
            }
            Type::Float => {
                let value = match data_len {
                    0 => 0.0,
                    4 => f64::from(self.reader.read_be_f32()?),
                    8 => self.reader.read_be_f64()?,
                    _ => return decode_error("mkv: invalid float length"),
                };
                ElementData::Float(value)
            }
            Type::String => {
                let data = self.reader.read_boxed_slice_exact(data_len as usize)?;
                let bytes = data.split(|b| *b == 0).next().unwrap_or(&data);
                ElementData::String(String::from_utf8_lossy(bytes).into_owned())
            }
            Type::Binary => {
                ElementData::Binary(self.reader.read_boxed_slice_exact(data_len as usize)?)
            }
        };

        Ok(Some(data))
    }
}

/// Primitive EBML element data.
#[derive(Clone, Debug)]
pub(crate) enum ElementData {
    /// A binary buffer.
    Binary(Box<[u8]>),
    /// A floating point number.
    Float(f64),
    /// A signed integer.
    SignedInt(i64),
    /// A string.
    String(String),
    /// An unsigned integer.
    UnsignedInt(u64),
}

#[cfg(test)]
mod tests {
    use std::io;

    use carton_core::io::{BufReader, ReadBytes};

    use super::{read_signed_vint, read_tag, read_uint_fixed, read_unsigned_vint, ElementHeader};

    /// Re-encodes a tag value of the given length back into bytes.
    fn encode_tag(tag: u32, len: u32) -> Vec<u8> {
        tag.to_be_bytes()[(4 - len as usize)..].to_vec()
    }

    #[test]
    fn element_tag_round_trip() {
        let cases: &[&[u8]] = &[
            &[0x82],
            &[0xD7],
            &[0x40, 0x02],
            &[0x22, 0xB5, 0x9C],
            &[0x1A, 0x45, 0xDF, 0xA3],
            &[0x1F, 0x43, 0xB6, 0x75],
        ];

        for bytes in cases {
            let (tag, len) = read_tag(BufReader::new(bytes)).unwrap();
            assert_eq!(len as usize, bytes.len());
            assert_eq!(encode_tag(tag, len), *bytes);
        }
    }

    #[test]
    fn element_tag_rejects_invalid_first_byte() {
        assert!(read_tag(BufReader::new(&[0x08, 0x00, 0x00, 0x00, 0x01])).is_err());
        assert!(read_tag(BufReader::new(&[0x00, 0x80])).is_err());
    }

    #[test]
    fn unsigned_vint_strips_single_marker_bit() {
        // The same magnitude encoded at every width 1-8.
        assert_eq!(read_unsigned_vint(BufReader::new(&[0x82])).unwrap(), 2);
        assert_eq!(read_unsigned_vint(BufReader::new(&[0x40, 0x02])).unwrap(), 2);
        assert_eq!(read_unsigned_vint(BufReader::new(&[0x20, 0x00, 0x02])).unwrap(), 2);
        assert_eq!(read_unsigned_vint(BufReader::new(&[0x10, 0x00, 0x00, 0x02])).unwrap(), 2);
        assert_eq!(read_unsigned_vint(BufReader::new(&[0x08, 0x00, 0x00, 0x00, 0x02])).unwrap(), 2);
        assert_eq!(
            read_unsigned_vint(BufReader::new(&[0x04, 0x00, 0x00, 0x00, 0x00, 0x02])).unwrap(),
            2
        );
        assert_eq!(
            read_unsigned_vint(BufReader::new(&[0x02, 0x00, 0x00, 0x00, 0x00, 0x00, 0x02]))
                .unwrap(),
            2
        );
        assert_eq!(
            read_unsigned_vint(BufReader::new(&[0x01, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x02]))
                .unwrap(),
            2
        );
    }

    #[test]
    fn signed_vint_recenters() {
        assert_eq!(read_signed_vint(BufReader::new(&[0x80])).unwrap(), -63);
        assert_eq!(read_signed_vint(BufReader::new(&[0xFE])).unwrap(), 63);
        assert_eq!(read_signed_vint(BufReader::new(&[0x40, 0x00])).unwrap(), -8191);
    }

    #[test]
    fn unknown_size_header_has_no_end() {
        // EBML header tag followed by the reserved unknown-size pattern.
        let bytes = [0x1A, 0x45, 0xDF, 0xA3, 0xFF];
        let header = ElementHeader::read(&mut BufReader::new(&bytes)).unwrap();
        assert_eq!(header.data_len, None);
        assert_eq!(header.end(), None);
        assert_eq!(header.data_pos, 5);
    }

    #[test]
    fn zero_size_header_ends_at_its_data() {
        let bytes = [0x1A, 0x45, 0xDF, 0xA3, 0x80];
        let header = ElementHeader::read(&mut BufReader::new(&bytes)).unwrap();
        assert_eq!(header.data_len, Some(0));
        assert_eq!(header.end(), Some(5));
    }

    /// A reader whose reported position starts at the given base offset.
    struct OffsetReader<'a> {
        inner: BufReader<'a>,
        base: u64,
    }

    impl ReadBytes for OffsetReader<'_> {
        fn read_byte(&mut self) -> io::Result<u8> {
            self.inner.read_byte()
        }

        fn read_buf_exact(&mut self, buf: &mut [u8]) -> io::Result<()> {
            self.inner.read_buf_exact(buf)
        }

        fn ignore_bytes(&mut self, count: u64) -> io::Result<()> {
            self.inner.ignore_bytes(count)
        }

        fn pos(&self) -> u64 {
            self.base + self.inner.pos()
        }
    }

    #[test]
    fn element_size_past_the_address_space_is_rejected() {
        // Tag followed by an 8-octet vint size of 2^56 - 1. Near the top of
        // the address space the element end would wrap around.
        let bytes = [0xAE, 0x01, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF];
        let mut reader = OffsetReader { inner: BufReader::new(&bytes), base: u64::MAX - 64 };
        assert!(ElementHeader::read(&mut reader).is_err());
    }

    #[test]
    fn fixed_width_integers() {
        assert_eq!(read_uint_fixed(BufReader::new(&[]), 0).unwrap(), 0);
        assert_eq!(read_uint_fixed(BufReader::new(&[0x0F, 0x42, 0x40]), 3).unwrap(), 1_000_000);
        assert_eq!(
            read_uint_fixed(BufReader::new(&[0xFF; 8]), 8).unwrap(),
            u64::MAX
        );
        assert!(read_uint_fixed(BufReader::new(&[0u8; 9]), 9).is_err());
    }
}
