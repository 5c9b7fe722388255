// Copyright 2019 The Fuchsia Authors. All rights reserved.
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

use {
    super::fields::*,
    log::{debug, error},
    std::{cmp::min, mem::size_of},
    zerocopy::AsBytes,
};

/// Value of a 2 bit MCS/NSS field that wins over any other value.
pub const HE_MCS_NSS_NOT_SUPPORTED: u8 = 3;
const HE_MCS_MAP_LEN: usize = 2;

/// Merges two 2-byte HE-MCS maps field by field: 3 if either side is 3, otherwise the lower
/// value.
pub fn intersect_mcs_nss(ours: [u8; 2], theirs: [u8; 2]) -> [u8; 2] {
    let mut out = [0u8; 2];
    for i in 0..HE_MCS_MAP_LEN {
        for shift in (0..8).step_by(2) {
            let a = (ours[i] >> shift) & 0b11;
            let b = (theirs[i] >> shift) & 0b11;
            let c = if a == HE_MCS_NSS_NOT_SUPPORTED || b == HE_MCS_NSS_NOT_SUPPORTED {
                HE_MCS_NSS_NOT_SUPPORTED
            } else {
                min(a, b)
            };
            out[i] |= c << shift;
        }
    }
    out
}

fn and_masked(peer: u8, ours: u8, mask: u8) -> u8 {
    peer & ours & mask
}

/// Channel width set usable with a peer. B0 to B3 and B6 are plain intersections. The 242-tone
/// bits B4 and B5 only carry over for a peer that advertises none of B0 to B3 and supports the
/// matching 20 MHz operation in PHY capabilities byte 8.
pub fn intersect_chan_width_set(ours: u8, peer: &HeCapabilities) -> u8 {
    let peer_width = peer.chan_width_set();
    let peer_phy8 = peer.phy_capab_info[HE_PHY_CAP8_IDX];
    let twenty_mhz_only = peer_width & CHANNEL_WIDTH_SET_BASE == 0;

    let mut out = and_masked(peer_width, ours, CHANNEL_WIDTH_SET_BASE);
    if twenty_mhz_only && peer_phy8 & HE_PHY_CAP8_20MHZ_IN_40MHZ_HE_PPDU_2_4_GHZ != 0 {
        out |= and_masked(peer_width, ours, CHANNEL_WIDTH_SET_B4);
    }
    if twenty_mhz_only && peer_phy8 & HE_PHY_CAP8_20MHZ_IN_160MHZ_HE_PPDU != 0 {
        out |= and_masked(peer_width, ours, CHANNEL_WIDTH_SET_B5);
    }
    out | and_masked(peer_width, ours, CHANNEL_WIDTH_SET_B6)
}

/// Computes the HE capabilities usable with a peer. Only the first `peer_len` bytes of `peer`
/// are meaningful; the rest of the result is zero. The channel width set is intersected with
/// `hw AND conf_chan_width_set`, and each MCS/NSS map the peer sent is merged with ours.
/// Returns None if the peer sent no HE capabilities.
pub fn intersect_he_capabilities(
    hw: &HeCapabilities,
    conf_chan_width_set: u8,
    peer: Option<&HeCapabilities>,
    peer_len: usize,
) -> Option<HeCapabilities> {
    let peer = match peer {
        Some(peer) => peer,
        None => {
            error!("No matching HE capabilities from peer");
            return None;
        }
    };

    let mut out = HeCapabilities::default();
    let copy_len = min(peer_len, size_of::<HeCapabilities>());
    out.as_bytes_mut()[..copy_len].copy_from_slice(&peer.as_bytes()[..copy_len]);

    let ours = hw.chan_width_set() & conf_chan_width_set;
    out.phy_capab_info[HE_PHY_CAP0_IDX] = intersect_chan_width_set(ours, peer);

    // Maps the peer did not send stay zero.
    let mcs_sent = copy_len.saturating_sub(HE_MAC_PHY_LEN);
    let mcs_len = min(mcs_sent, mcs_nss_size(peer.chan_width_set()));
    for i in (0..mcs_len / HE_MCS_MAP_LEN).map(|i| i * HE_MCS_MAP_LEN) {
        let merged = intersect_mcs_nss(
            [hw.txrx_mcs_support[i], hw.txrx_mcs_support[i + 1]],
            [peer.txrx_mcs_support[i], peer.txrx_mcs_support[i + 1]],
        );
        out.txrx_mcs_support[i..i + HE_MCS_MAP_LEN].copy_from_slice(&merged[..]);
    }

    debug!(
        "HE capabilities from peer: {}, negotiated: {}",
        hex::encode(&peer.as_bytes()[..copy_len]),
        hex::encode(out.as_bytes())
    );
    Some(out)
}
