// Copyright 2019 The Fuchsia Authors. All rights reserved.
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

use {
    std::mem::size_of,
    zerocopy::{ByteSlice, FromBytes, LayoutVerified, Unaligned},
};

/// Forward-only cursor over a byte slice. Every read either succeeds completely or leaves the
/// cursor untouched.
pub struct BufferReader<B> {
    buffer: Option<B>,
    bytes_read: usize,
}

impl<B: ByteSlice> BufferReader<B> {
    pub fn new(bytes: B) -> Self {
        BufferReader { buffer: Some(bytes), bytes_read: 0 }
    }

    pub fn peek<T>(&self) -> Option<LayoutVerified<&[u8], T>>
    where
        T: FromBytes + Unaligned,
    {
        LayoutVerified::new_unaligned_from_prefix(&self.buffer.as_ref()?[..]).map(|(v, _)| v)
    }

    pub fn read<T>(&mut self) -> Option<LayoutVerified<B, T>>
    where
        T: FromBytes + Unaligned,
    {
        if self.bytes_remaining() < size_of::<T>() {
            return None;
        }
        let bytes = self.read_bytes(size_of::<T>())?;
        LayoutVerified::new_unaligned(bytes)
    }

    pub fn peek_byte(&self) -> Option<u8> {
        self.peek_byte_at(0)
    }

    /// Looks `offset` bytes ahead of the cursor without consuming anything.
    pub fn peek_byte_at(&self, offset: usize) -> Option<u8> {
        self.buffer.as_ref()?.get(offset).copied()
    }

    pub fn read_byte(&mut self) -> Option<u8> {
        self.read_bytes(1).map(|b| b[0])
    }

    pub fn read_bytes(&mut self, len: usize) -> Option<B> {
        if self.bytes_remaining() < len {
            return None;
        }
        let (head, tail) = self.buffer.take()?.split_at(len);
        self.buffer = Some(tail);
        self.bytes_read += len;
        Some(head)
    }

    pub fn bytes_read(&self) -> usize {
        self.bytes_read
    }

    pub fn bytes_remaining(&self) -> usize {
        self.buffer.as_ref().map_or(0, |b| b.len())
    }

    pub fn into_remaining(self) -> B {
        // `buffer` is only `None` transiently inside `read_bytes`.
        match self.buffer {
            Some(b) => b,
            None => unreachable!("buffer taken"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(FromBytes, Unaligned)]
    #[repr(C)]
    struct Pair {
        a: u8,
        b: u8,
    }

    #[test]
    fn read_fields_in_order() {
        let bytes = [1u8, 2, 3, 4, 5];
        let mut reader = BufferReader::new(&bytes[..]);
        let pair = reader.read::<Pair>().expect("expected pair");
        assert_eq!((1, 2), (pair.a, pair.b));
        assert_eq!(Some(3), reader.read_byte());
        assert_eq!(2, reader.bytes_remaining());
        assert_eq!(3, reader.bytes_read());
        assert_eq!(&[4, 5], &reader.into_remaining()[..]);
    }

    #[test]
    fn read_past_end_leaves_cursor() {
        let bytes = [1u8, 2, 3];
        let mut reader = BufferReader::new(&bytes[..]);
        assert!(reader.read_bytes(4).is_none());
        assert_eq!(3, reader.bytes_remaining());
        assert_eq!(0, reader.bytes_read());
    }

    #[test]
    fn peek_does_not_consume() {
        let bytes = [7u8, 8];
        let reader = BufferReader::new(&bytes[..]);
        assert_eq!(Some(7), reader.peek_byte());
        assert_eq!(Some(8), reader.peek_byte_at(1));
        assert_eq!(None, reader.peek_byte_at(2));
        assert_eq!(7, reader.peek::<Pair>().expect("expected pair").a);
        assert_eq!(2, reader.bytes_remaining());
    }
}
