// Copyright 2019 The Fuchsia Authors. All rights reserved.
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

use {
    crate::bits,
    serde::{Deserialize, Serialize},
    zerocopy::{AsBytes, FromBytes, Unaligned},
};

pub const HE_MAC_CAPAB_LEN: usize = 6;
pub const HE_PHY_CAPAB_LEN: usize = 11;
pub const HE_TXRX_MCS_SUPPORT_LEN: usize = 12;
pub const HE_PPE_THRESHOLDS_MAX_LEN: usize = 25;
/// One Rx map and one Tx map for a single channel width class.
pub const HE_MCS_NSS_CHUNK_LEN: usize = HE_TXRX_MCS_SUPPORT_LEN / 3;
pub const HE_MAC_PHY_LEN: usize = HE_MAC_CAPAB_LEN + HE_PHY_CAPAB_LEN;
/// Shortest valid HE Capabilities body: MAC, PHY and the mandatory <= 80 MHz MCS chunk.
pub const HE_CAPABILITIES_MIN_LEN: usize = HE_MAC_PHY_LEN + HE_MCS_NSS_CHUNK_LEN;

// IEEE P802.11ax/D4.3, 9.4.2.242.3, PHY capabilities byte 0
pub const HE_PHY_CAP0_IDX: usize = 0;
pub const CHANNEL_WIDTH_SET_B0: u8 = 1 << 0; // 40 MHz in 2.4 GHz
pub const CHANNEL_WIDTH_SET_B1: u8 = 1 << 1; // 40 and 80 MHz in 5 GHz
pub const CHANNEL_WIDTH_SET_B2: u8 = 1 << 2; // 160 MHz in 5 GHz
pub const CHANNEL_WIDTH_SET_B3: u8 = 1 << 3; // 160 or 80+80 MHz in 5 GHz
pub const CHANNEL_WIDTH_SET_B4: u8 = 1 << 4; // 242-tone RU in 40 MHz, 2.4 GHz
pub const CHANNEL_WIDTH_SET_B5: u8 = 1 << 5; // 242-tone RU in 160 MHz
pub const CHANNEL_WIDTH_SET_B6: u8 = 1 << 6; // 242-tone RU in 80+80 MHz
pub const CHANNEL_WIDTH_SET_BASE: u8 =
    CHANNEL_WIDTH_SET_B0 | CHANNEL_WIDTH_SET_B1 | CHANNEL_WIDTH_SET_B2 | CHANNEL_WIDTH_SET_B3;

pub const HE_PHY_CAP6_IDX: usize = 6;
pub const HE_PHY_CAP6_PPE_THRESHOLD_PRESENT: u8 = 1 << 7;

pub const HE_PHY_CAP7_IDX: usize = 7;
pub const HE_PHY_CAP7_MAX_NC: u8 = 0b0011_1000;

pub const HE_PHY_CAP8_IDX: usize = 8;
pub const HE_PHY_CAP8_20MHZ_IN_40MHZ_HE_PPDU_2_4_GHZ: u8 = 1 << 1;
pub const HE_PHY_CAP8_20MHZ_IN_160MHZ_HE_PPDU: u8 = 1 << 2;

// IEEE P802.11ax/D4.3, 9.4.2.242.5
pub const HE_PPE_CAP0_NSS_M1: u8 = 0b0000_0111;
pub const HE_PPE_CAP0_RU_INDEX_BITMASK: u8 = 0b0111_1000;
const PPE_HEADER_BITS: usize = 3 + 4;
const PPE_BITS_PER_NSS_RU: usize = 6;

// IEEE P802.11ax/D4.3, 9.4.2.243
pub const HE_OPER_CAP1_IDX: usize = 1;
pub const HE_OPER_CAP1_VHT_OPER_INFO_PRESENT: u8 = 1 << 6;
pub const HE_OPER_CAP1_CO_LOCATED_BSS: u8 = 1 << 7;
pub const HE_OPER_CAP2_IDX: usize = 2;
pub const HE_OPER_CAP2_6GHZ_OPER_INFO_PRESENT: u8 = 1 << 1;

// IEEE P802.11ax/D4.3, 9.4.2.245
pub const HE_SRP_NON_SRG_OFFSET_PRESENT: u8 = 1 << 2;
pub const HE_SRP_SRG_INFO_PRESENT: u8 = 1 << 3;

/// Length of the Supported HE-MCS And NSS Set field for a validated channel width set.
pub fn mcs_nss_size(chan_width_set: u8) -> usize {
    if chan_width_set & CHANNEL_WIDTH_SET_B3 != 0 {
        3 * HE_MCS_NSS_CHUNK_LEN
    } else if chan_width_set & CHANNEL_WIDTH_SET_B2 != 0 {
        2 * HE_MCS_NSS_CHUNK_LEN
    } else {
        HE_MCS_NSS_CHUNK_LEN
    }
}

/// Length of the Supported HE-MCS And NSS Set field an AP emits. Each of the 160 MHz and
/// 80+80 MHz bits adds one map on its own.
pub fn advertised_mcs_nss_size(chan_width_set: u8) -> usize {
    let mut len = HE_MCS_NSS_CHUNK_LEN;
    if chan_width_set & CHANNEL_WIDTH_SET_B2 != 0 {
        len += HE_MCS_NSS_CHUNK_LEN;
    }
    if chan_width_set & CHANNEL_WIDTH_SET_B3 != 0 {
        len += HE_MCS_NSS_CHUNK_LEN;
    }
    len
}

/// Length of the PPE Thresholds field, derived from its first byte.
pub fn ppe_size(ppe0: u8) -> usize {
    let nss = bits::extract(ppe0, HE_PPE_CAP0_NSS_M1) as usize + 1;
    let nru = bits::count_bits(ppe0 & HE_PPE_CAP0_RU_INDEX_BITMASK);
    bits::bits_to_bytes(PPE_HEADER_BITS + PPE_BITS_PER_NSS_RU * nss * nru)
}

// IEEE P802.11ax/D4.3, 9.4.2.242
// Storage for the largest possible element; which bytes are meaningful depends on the PHY
// capabilities.
#[repr(C)]
#[derive(
    AsBytes, FromBytes, Unaligned, Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize,
)]
pub struct HeCapabilities {
    pub mac_capab_info: [u8; HE_MAC_CAPAB_LEN],
    pub phy_capab_info: [u8; HE_PHY_CAPAB_LEN],
    pub txrx_mcs_support: [u8; HE_TXRX_MCS_SUPPORT_LEN],
    pub ppe_thresholds: [u8; HE_PPE_THRESHOLDS_MAX_LEN],
}

impl HeCapabilities {
    pub fn chan_width_set(&self) -> u8 {
        self.phy_capab_info[HE_PHY_CAP0_IDX]
    }

    pub fn ppe_present(&self) -> bool {
        bits::is_set(self.phy_capab_info[HE_PHY_CAP6_IDX], HE_PHY_CAP6_PPE_THRESHOLD_PRESENT)
    }

    pub fn ppe_size(&self) -> usize {
        if self.ppe_present() {
            ppe_size(self.ppe_thresholds[0])
        } else {
            0
        }
    }

    /// Number of bytes this record occupies on the wire.
    pub fn wire_len(&self) -> usize {
        HE_MAC_PHY_LEN + mcs_nss_size(self.chan_width_set()) + self.ppe_size()
    }
}

// IEEE P802.11ax/D4.3, 9.4.2.243
#[repr(C)]
#[derive(
    AsBytes, FromBytes, Unaligned, Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize,
)]
pub struct HeOperation {
    pub oper_params: [u8; 3],
    pub bss_color_info: u8,
    pub mcs_nss_set: [u8; 4],
    pub vht_op_info_chwidth: u8,
    pub vht_op_info_chan_center_freq_seg0_idx: u8,
    pub vht_op_info_chan_center_freq_seg1_idx: u8,
    pub max_co_located_bssid_ind: u8,
    pub he_6ghz_oper_info: [u8; 5],
}

impl HeOperation {
    pub fn vht_oper_info_present(&self) -> bool {
        bits::is_set(self.oper_params[HE_OPER_CAP1_IDX], HE_OPER_CAP1_VHT_OPER_INFO_PRESENT)
    }

    pub fn co_located_bss(&self) -> bool {
        bits::is_set(self.oper_params[HE_OPER_CAP1_IDX], HE_OPER_CAP1_CO_LOCATED_BSS)
    }

    pub fn he_6ghz_oper_info_present(&self) -> bool {
        bits::is_set(self.oper_params[HE_OPER_CAP2_IDX], HE_OPER_CAP2_6GHZ_OPER_INFO_PRESENT)
    }
}

// IEEE P802.11ax/D4.3, 9.4.2.249
#[repr(C)]
#[derive(
    AsBytes, FromBytes, Unaligned, Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize,
)]
pub struct MuEdcaParameterSet {
    pub qos_info: u8,
    pub ac_be: [u8; 3],
    pub ac_bk: [u8; 3],
    pub ac_vi: [u8; 3],
    pub ac_vo: [u8; 3],
}

impl MuEdcaParameterSet {
    /// An all zero parameter set means MU EDCA is not configured.
    pub fn is_unconfigured(&self) -> bool {
        self.as_bytes().iter().all(|b| *b == 0)
    }
}

// IEEE P802.11ax/D4.3, 9.4.2.245
#[repr(C)]
#[derive(
    AsBytes, FromBytes, Unaligned, Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize,
)]
pub struct SpatialReuseParameterSet {
    pub sr_control: u8,
    pub non_srg_obss_pd_max_offset: u8,
    pub srg_obss_pd_min_offset: u8,
    pub srg_obss_pd_max_offset: u8,
    pub srg_bss_color_bitmap: u8,
    pub srg_partial_bssid_bitmap: u8,
}

#[cfg(test)]
mod tests {
    use {super::*, std::mem::size_of, test_case::test_case};

    #[test]
    fn record_sizes() {
        assert_eq!(54, size_of::<HeCapabilities>());
        assert_eq!(17, size_of::<HeOperation>());
        assert_eq!(13, size_of::<MuEdcaParameterSet>());
        assert_eq!(6, size_of::<SpatialReuseParameterSet>());
    }

    #[test_case(0, 4 ; "80 MHz only")]
    #[test_case(CHANNEL_WIDTH_SET_B1 | CHANNEL_WIDTH_SET_B2, 8 ; "160 MHz")]
    #[test_case(CHANNEL_WIDTH_SET_B2 | CHANNEL_WIDTH_SET_B3, 12 ; "80+80 MHz")]
    fn mcs_nss_size_by_width(chan_width_set: u8, expected: usize) {
        assert_eq!(expected, mcs_nss_size(chan_width_set));
        assert_eq!(expected, advertised_mcs_nss_size(chan_width_set));
    }

    #[test_case(CHANNEL_WIDTH_SET_B3, 8 ; "80+80 without 160")]
    #[test_case(CHANNEL_WIDTH_SET_B1 | CHANNEL_WIDTH_SET_B3, 8 ; "40/80 and 80+80")]
    #[test_case(CHANNEL_WIDTH_SET_B2, 8 ; "160 only")]
    fn advertised_mcs_nss_size_is_additive(chan_width_set: u8, expected: usize) {
        assert_eq!(expected, advertised_mcs_nss_size(chan_width_set));
    }

    #[test_case(0b0000_1001, 3 ; "two streams one ru")]
    #[test_case(0b0000_0000, 1 ; "no ru")]
    #[test_case(0b0111_1111, 25 ; "eight streams four ru")]
    #[test_case(0b1111_1111, 25 ; "high bit ignored")]
    fn ppe_size_from_first_byte(ppe0: u8, expected: usize) {
        assert_eq!(expected, ppe_size(ppe0));
    }

    #[test]
    fn capabilities_wire_len() {
        let mut caps = HeCapabilities::default();
        assert_eq!(21, caps.wire_len());
        caps.phy_capab_info[HE_PHY_CAP0_IDX] = CHANNEL_WIDTH_SET_B2;
        caps.phy_capab_info[HE_PHY_CAP6_IDX] = HE_PHY_CAP6_PPE_THRESHOLD_PRESENT;
        caps.ppe_thresholds[0] = 0b0000_1001;
        assert_eq!(28, caps.wire_len());
    }

    #[test]
    fn mu_edca_unconfigured() {
        let mut edca = MuEdcaParameterSet::default();
        assert!(edca.is_unconfigured());
        edca.ac_vo[2] = 1;
        assert!(!edca.is_unconfigured());
    }

    #[test]
    fn operation_presence_bits() {
        let oper = HeOperation { oper_params: [0, 0b1100_0000, 0b10], ..Default::default() };
        assert!(oper.vht_oper_info_present());
        assert!(oper.co_located_bss());
        assert!(oper.he_6ghz_oper_info_present());
        assert!(!HeOperation::default().vht_oper_info_present());
    }
}
