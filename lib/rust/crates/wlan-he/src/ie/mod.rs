// Copyright 2019 The Fuchsia Authors. All rights reserved.
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

mod fields;
mod he_parser;
mod he_writer;
mod intersect;
mod reader;

pub use {fields::*, he_parser::*, he_writer::*, intersect::*, reader::*};

use {
    crate::appendable::{Appendable, BufferTooSmall},
    zerocopy::{AsBytes, FromBytes, Unaligned},
};

macro_rules! pub_const {
    ($name:ident, $val:expr) => {
        pub const $name: Self = Self($val);
    };
}

// IEEE Std 802.11-2016, 9.4.2.1
#[repr(C)]
#[derive(AsBytes, FromBytes, Unaligned, PartialEq, Eq, Hash, Clone, Copy, Debug)]
pub struct Id(pub u8);

impl Id {
    pub_const!(SSID, 0);
    pub_const!(SUPPORTED_RATES, 1);
    pub_const!(VENDOR_SPECIFIC, 221);
    pub_const!(EXTENSION, 255);
}

// IEEE P802.11ax/D4.3, Table 9-92
#[repr(C)]
#[derive(AsBytes, FromBytes, Unaligned, PartialEq, Eq, Hash, Clone, Copy, Debug)]
pub struct ExtId(pub u8);

impl ExtId {
    pub_const!(HE_CAPABILITIES, 35);
    pub_const!(HE_OPERATION, 36);
    pub_const!(HE_MU_EDCA_PARAMETER_SET, 38);
    pub_const!(HE_SPATIAL_REUSE_PARAMETER_SET, 39);
    pub_const!(HE_NDP_FEEDBACK_REPORT_PARAMETER_SET, 41);
}

#[repr(C)]
#[derive(AsBytes, FromBytes, Unaligned)]
pub struct Header {
    pub id: Id,
    pub body_len: u8,
}

pub const IE_MAX_LEN: usize = 255;

/// Writes `[0xFF][1 + len][ext_id][body]`. Nothing is written if the element does not fit.
pub fn write_ext_element<B: Appendable>(
    buf: &mut B,
    ext_id: ExtId,
    body: &[u8],
) -> Result<(), BufferTooSmall> {
    // The extension id counts towards the element length.
    if body.len() + 1 > IE_MAX_LEN || !buf.can_append(3 + body.len()) {
        return Err(BufferTooSmall);
    }
    buf.append_value(&Header { id: Id::EXTENSION, body_len: (body.len() + 1) as u8 })?;
    buf.append_value(&ext_id)?;
    buf.append_bytes(body)
}
