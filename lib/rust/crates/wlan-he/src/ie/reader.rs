// Copyright 2019 The Fuchsia Authors. All rights reserved.
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

use {
    super::{ExtId, Header, Id},
    crate::buffer_reader::BufferReader,
    std::mem::size_of,
    zerocopy::ByteSlice,
};

/// Iterates over a chain of information elements, yielding each element id and body. Stops at
/// the first element whose body runs past the end of the buffer.
pub struct Reader<B>(BufferReader<B>);

impl<B: ByteSlice> Reader<B> {
    pub fn new(bytes: B) -> Self {
        Reader(BufferReader::new(bytes))
    }
}

impl<B: ByteSlice> Iterator for Reader<B> {
    type Item = (Id, B);

    fn next(&mut self) -> Option<Self::Item> {
        let body_len = self.0.peek::<Header>()?.body_len as usize;
        if self.0.bytes_remaining() < size_of::<Header>() + body_len {
            return None;
        }
        let id = self.0.read::<Header>()?.id;
        let body = self.0.read_bytes(body_len)?;
        Some((id, body))
    }
}

/// Iterates over the extension elements of a chain, yielding the extension id and the body that
/// follows it. Extension elements with an empty body are skipped.
pub struct ExtReader<B>(Reader<B>);

impl<B: ByteSlice> ExtReader<B> {
    pub fn new(bytes: B) -> Self {
        ExtReader(Reader::new(bytes))
    }
}

impl<B: ByteSlice> Iterator for ExtReader<B> {
    type Item = (ExtId, B);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let (id, body) = self.0.next()?;
            if id != Id::EXTENSION || body.len() < 1 {
                continue;
            }
            let ext_id = ExtId(body[0]);
            let (_, rest) = body.split_at(1);
            return Some((ext_id, rest));
        }
    }
}

/// Returns the body of the first extension element with id `ext_id`, not including the
/// extension id byte.
pub fn find_ext_element<B: ByteSlice>(bytes: B, ext_id: ExtId) -> Option<B> {
    ExtReader::new(bytes).find(|(id, _)| *id == ext_id).map(|(_, body)| body)
}
