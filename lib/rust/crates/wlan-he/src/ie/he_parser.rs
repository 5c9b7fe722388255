// Copyright 2019 The Fuchsia Authors. All rights reserved.
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

use {
    super::fields::*,
    crate::{bits, buffer_reader::BufferReader, error::HeCapabLenError},
    log::debug,
    std::{cmp::min, mem::size_of},
    zerocopy::AsBytes,
};

/// Sizes of the variable length sections of an HE Capabilities body, as announced by the body
/// itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeCapabLayout {
    pub mcs_nss_len: usize,
    pub ppe_len: usize,
}

impl HeCapabLayout {
    pub fn min_len(&self) -> usize {
        HE_MAC_PHY_LEN + self.mcs_nss_len + self.ppe_len
    }
}

/// Computes the length an HE Capabilities body must have from its own PHY capabilities and PPE
/// header, and checks `bytes` against it. Bytes past the computed length are ignored.
pub fn validate_he_capabilities_len(bytes: &[u8]) -> Result<HeCapabLayout, HeCapabLenError> {
    let claimed = bytes.len();
    let mut reader = BufferReader::new(bytes);
    let mut min_len = HE_CAPABILITIES_MIN_LEN;

    let too_short = |min| HeCapabLenError::TooShort { claimed, min };
    reader.read_bytes(HE_MAC_CAPAB_LEN).ok_or_else(|| too_short(min_len))?;
    let phy = reader.read_bytes(HE_PHY_CAPAB_LEN).ok_or_else(|| too_short(min_len))?;

    let chan_width_set = phy[HE_PHY_CAP0_IDX];
    let mut mcs_nss_len = HE_MCS_NSS_CHUNK_LEN;
    if bits::is_set(chan_width_set, CHANNEL_WIDTH_SET_B2) {
        mcs_nss_len += HE_MCS_NSS_CHUNK_LEN;
        debug!("HE capabilities minimum length for 160 MHz is {}", HE_MAC_PHY_LEN + mcs_nss_len);
    }
    if bits::is_set(chan_width_set, CHANNEL_WIDTH_SET_B3) {
        if !bits::is_set(chan_width_set, CHANNEL_WIDTH_SET_B2) {
            debug!("HE PHY channel width set {:#04x} is invalid", chan_width_set);
            return Err(HeCapabLenError::InvalidChannelWidthSet);
        }
        mcs_nss_len += HE_MCS_NSS_CHUNK_LEN;
        debug!("HE capabilities minimum length for 80+80 MHz is {}", HE_MAC_PHY_LEN + mcs_nss_len);
    }
    min_len = HE_MAC_PHY_LEN + mcs_nss_len;

    let mut ppe_len = 0;
    if bits::is_set(phy[HE_PHY_CAP6_IDX], HE_PHY_CAP6_PPE_THRESHOLD_PRESENT) {
        // The PPE header must be present to learn how long the PPE field is.
        let ppe0 = reader.peek_byte_at(mcs_nss_len).ok_or_else(|| too_short(min_len + 1))?;
        ppe_len = ppe_size(ppe0);
        min_len += ppe_len;
        debug!(
            "HE capabilities PPE: nss {}, ru bitmask {:#06b} -> {} bytes",
            bits::extract(ppe0, HE_PPE_CAP0_NSS_M1) + 1,
            bits::extract(ppe0, HE_PPE_CAP0_RU_INDEX_BITMASK),
            ppe_len
        );
    }

    if claimed != min_len {
        debug!("HE capabilities length ({}) != ({}): {}", claimed, min_len, hex::encode(bytes));
    }
    if claimed < min_len {
        return Err(too_short(min_len));
    }
    Ok(HeCapabLayout { mcs_nss_len, ppe_len })
}

/// Validates an HE Capabilities body and copies its sections into a record.
pub fn parse_he_capabilities(bytes: &[u8]) -> Result<HeCapabilities, HeCapabLenError> {
    parse_he_capabilities_with_layout(bytes).map(|(caps, _)| caps)
}

/// Like `parse_he_capabilities`, also returning the section sizes found while validating.
pub fn parse_he_capabilities_with_layout(
    bytes: &[u8],
) -> Result<(HeCapabilities, HeCapabLayout), HeCapabLenError> {
    let layout = validate_he_capabilities_len(bytes)?;
    let mut caps = HeCapabilities::default();
    let mut reader = BufferReader::new(bytes);
    // Lengths were checked above.
    let mut sections = [
        (&mut caps.mac_capab_info[..], HE_MAC_CAPAB_LEN),
        (&mut caps.phy_capab_info[..], HE_PHY_CAPAB_LEN),
        (&mut caps.txrx_mcs_support[..], layout.mcs_nss_len),
        (&mut caps.ppe_thresholds[..], layout.ppe_len),
    ];
    for (dst, len) in sections.iter_mut() {
        let src = reader.read_bytes(*len).ok_or(HeCapabLenError::TooShort {
            claimed: bytes.len(),
            min: layout.min_len(),
        })?;
        dst[..*len].copy_from_slice(src);
    }
    Ok((caps, layout))
}

/// Copies at most one HE Operation record worth of bytes. Returns the record and the number of
/// bytes taken from `bytes`.
pub fn parse_he_operation(bytes: &[u8]) -> (HeOperation, usize) {
    let mut oper = HeOperation::default();
    let copy_len = min(size_of::<HeOperation>(), bytes.len());
    oper.as_bytes_mut()[..copy_len].copy_from_slice(&bytes[..copy_len]);
    if copy_len != bytes.len() {
        debug!("HE operation truncated from {} to {} bytes", bytes.len(), copy_len);
    }
    (oper, copy_len)
}
