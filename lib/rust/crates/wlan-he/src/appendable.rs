// Copyright 2019 The Fuchsia Authors. All rights reserved.
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

use {failure::Fail, zerocopy::AsBytes};

#[derive(Debug, Fail, PartialEq, Eq)]
#[fail(display = "buffer is too small")]
pub struct BufferTooSmall;

/// A byte sink that elements are written into. Writes either fit entirely or fail without
/// touching the sink.
pub trait Appendable {
    fn append_bytes(&mut self, bytes: &[u8]) -> Result<(), BufferTooSmall>;

    fn bytes_written(&self) -> usize;

    fn can_append(&self, bytes: usize) -> bool;

    fn append_byte(&mut self, byte: u8) -> Result<(), BufferTooSmall> {
        self.append_bytes(&[byte])
    }

    fn append_value<T: AsBytes + ?Sized>(&mut self, value: &T) -> Result<(), BufferTooSmall> {
        self.append_bytes(value.as_bytes())
    }
}

impl Appendable for Vec<u8> {
    fn append_bytes(&mut self, bytes: &[u8]) -> Result<(), BufferTooSmall> {
        self.extend_from_slice(bytes);
        Ok(())
    }

    fn bytes_written(&self) -> usize {
        self.len()
    }

    fn can_append(&self, _bytes: usize) -> bool {
        true
    }
}

impl<A: Appendable + ?Sized> Appendable for &mut A {
    fn append_bytes(&mut self, bytes: &[u8]) -> Result<(), BufferTooSmall> {
        (**self).append_bytes(bytes)
    }

    fn bytes_written(&self) -> usize {
        (**self).bytes_written()
    }

    fn can_append(&self, bytes: usize) -> bool {
        (**self).can_append(bytes)
    }
}

/// Appends into a caller supplied, fixed size frame buffer.
pub struct BufferWriter<'a> {
    buf: &'a mut [u8],
    written: usize,
}

impl<'a> BufferWriter<'a> {
    pub fn new(buf: &'a mut [u8]) -> Self {
        BufferWriter { buf, written: 0 }
    }

    pub fn bytes_remaining(&self) -> usize {
        self.buf.len() - self.written
    }

    pub fn into_written(self) -> &'a mut [u8] {
        let BufferWriter { buf, written } = self;
        &mut buf[..written]
    }
}

impl<'a> Appendable for BufferWriter<'a> {
    fn append_bytes(&mut self, bytes: &[u8]) -> Result<(), BufferTooSmall> {
        if !self.can_append(bytes.len()) {
            return Err(BufferTooSmall);
        }
        let end = self.written + bytes.len();
        self.buf[self.written..end].copy_from_slice(bytes);
        self.written = end;
        Ok(())
    }

    fn bytes_written(&self) -> usize {
        self.written
    }

    fn can_append(&self, bytes: usize) -> bool {
        self.bytes_remaining() >= bytes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vec_grows() {
        let mut buf = vec![];
        buf.append_byte(1).expect("append to vec");
        buf.append_bytes(&[2, 3]).expect("append to vec");
        buf.append_value(&[4u8, 5][..]).expect("append to vec");
        assert_eq!(&[1, 2, 3, 4, 5], &buf[..]);
        assert_eq!(5, buf.bytes_written());
    }

    #[test]
    fn buffer_writer_rejects_overflow() {
        let mut bytes = [0u8; 3];
        let mut w = BufferWriter::new(&mut bytes[..]);
        w.append_bytes(&[1, 2]).expect("fits");
        assert_eq!(Err(BufferTooSmall), w.append_bytes(&[3, 4]));
        assert_eq!(2, w.bytes_written());
        w.append_byte(3).expect("fits");
        assert_eq!(&[1, 2, 3], w.into_written());
    }
}
