// Copyright 2019 The Fuchsia Authors. All rights reserved.
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

//! Administrative overrides of individual HE capability sub-fields.
//!
//! Every overridable sub-field is described by its section and its bit position inside that
//! section. Sub-fields may straddle a byte boundary, in which case the low bits of the value go
//! to the first byte.

use {
    crate::{
        bits,
        error::ConfigError,
        ie::{HeCapabilities, HE_MAC_CAPAB_LEN, HE_PHY_CAPAB_LEN, HE_TXRX_MCS_SUPPORT_LEN},
    },
    log::debug,
    std::cmp::min,
    zerocopy::AsBytes,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeCapSection {
    Mac,
    Phy,
    McsNss,
    Ppe,
}

impl HeCapSection {
    fn bytes(self, caps: &HeCapabilities) -> &[u8] {
        match self {
            HeCapSection::Mac => &caps.mac_capab_info[..],
            HeCapSection::Phy => &caps.phy_capab_info[..],
            HeCapSection::McsNss => &caps.txrx_mcs_support[..],
            HeCapSection::Ppe => &caps.ppe_thresholds[..],
        }
    }

    fn bytes_mut(self, caps: &mut HeCapabilities) -> &mut [u8] {
        match self {
            HeCapSection::Mac => &mut caps.mac_capab_info[..],
            HeCapSection::Phy => &mut caps.phy_capab_info[..],
            HeCapSection::McsNss => &mut caps.txrx_mcs_support[..],
            HeCapSection::Ppe => &mut caps.ppe_thresholds[..],
        }
    }
}

/// One byte worth of a sub-field. `shift` is the number of value bits held by earlier parts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldPart {
    pub byte_idx: usize,
    pub mask: u8,
    pub shift: u32,
}

macro_rules! he_cap_fields {
    ($($variant:ident => $key:literal, $section:ident, $bit_offset:expr, $width:expr;)*) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum HeCapField {
            $($variant,)*
        }

        impl HeCapField {
            pub const ALL: &'static [HeCapField] = &[$(HeCapField::$variant,)*];

            /// Configuration key of the sub-field.
            pub fn key(self) -> &'static str {
                match self {
                    $(HeCapField::$variant => $key,)*
                }
            }

            pub fn section(self) -> HeCapSection {
                match self {
                    $(HeCapField::$variant => HeCapSection::$section,)*
                }
            }

            /// Bit offset inside the section and width in bits.
            fn position(self) -> (usize, usize) {
                match self {
                    $(HeCapField::$variant => ($bit_offset, $width),)*
                }
            }
        }
    };
}

he_cap_fields! {
    MacPlusHtcHeSupport => "he_mac_plus_htc_he_support", Mac, 0, 1;
    MacTwtRequesterSupport => "he_mac_twt_requester_support", Mac, 1, 1;
    MacTwtResponderSupport => "he_mac_twt_responder_support", Mac, 2, 1;
    MacFragmentation => "he_mac_fragmentation", Mac, 3, 2;
    MacMaximumNumberOfFragmentedMsdusAmsdus =>
        "he_mac_maximum_number_of_fragmented_msdus_amsdus", Mac, 5, 3;
    MacMinimumFragmentSize => "he_mac_minimum_fragment_size", Mac, 8, 2;
    MacTriggerFrameMacPaddingDuration =>
        "he_mac_trigger_frame_mac_padding_duration", Mac, 10, 2;
    MacMultiTidAggregationRxSupport => "he_mac_multi_tid_aggregation_rx_support", Mac, 12, 3;
    MacHeLinkAdaptation => "he_mac_he_link_adaptation", Mac, 15, 2;
    MacAllAckSupport => "he_mac_all_ack_support", Mac, 17, 1;
    MacBsrSupport => "he_mac_bsr_support", Mac, 19, 1;
    MacBroadcastTwtSupport => "he_mac_broadcast_twt_support", Mac, 20, 1;
    Mac32bitBaBitmapSupport => "he_mac_32bit_ba_bitmap_support", Mac, 21, 1;
    MacMuCascadingSupport => "he_mac_mu_cascading_support", Mac, 22, 1;
    MacAckEnabledAggregationSupport => "he_mac_ack_enabled_aggregation_support", Mac, 23, 1;
    MacGroupAddressedMultiStaBlockackInDlMuSupport =>
        "he_mac_group_addressed_multi_sta_blockack_in_dl_mu_support", Mac, 24, 1;
    MacOmControlSupport => "he_mac_om_control_support", Mac, 25, 1;
    MacOfdmaRaSupport => "he_mac_ofdma_ra_support", Mac, 26, 1;
    MacMaximumAMpduLengthExponent => "he_mac_maximum_a_mpdu_length_exponent", Mac, 27, 2;
    MacAMsduFragmentationSupport => "he_mac_a_msdu_fragmentation_support", Mac, 29, 1;
    MacFlexibleTwtScheduleSupport => "he_mac_flexible_twt_schedule_support", Mac, 30, 1;
    MacRxControlFrameToMultibss => "he_mac_rx_control_frame_to_multibss", Mac, 31, 1;
    MacBsrpBqrpAMpduAggregation => "he_mac_bsrp_bqrp_a_mpdu_aggregation", Mac, 32, 1;
    MacQtpSupport => "he_mac_qtp_support", Mac, 33, 1;
    MacBqrSupport => "he_mac_bqr_support", Mac, 34, 1;
    MacNdpFeedbackReportSupport => "he_mac_ndp_feedback_report_support", Mac, 36, 1;
    MacAMsduInAckEnabledAMpduSupport =>
        "he_mac_a_msdu_in_ack_enabled_a_mpdu_support", Mac, 38, 1;
    MacMultiTidAggregationTxSupport => "he_mac_multi_tid_aggregation_tx_support", Mac, 39, 3;
    MacOmControlUlMuDataDisableRxSupport =>
        "he_mac_om_control_ul_mu_data_disable_rx_support", Mac, 44, 1;

    PhyPreamblePuncturingRx => "he_phy_preamble_puncturing_rx", Phy, 8, 4;
    PhyDeviceClass => "he_phy_device_class", Phy, 12, 1;
    PhyLdpcCodingInPayload => "he_phy_ldpc_coding_in_payload", Phy, 13, 1;
    PhySuPpduWith1xHeLtfAnd08UsGi => "he_phy_su_ppdu_with_1x_he_ltf_and_08_us_gi", Phy, 14, 1;
    PhyNdpWith4xHeLtfAnd32UsGi => "he_phy_ndp_with_4x_he_ltf_and_32_us_gi", Phy, 17, 1;
    PhyStbcTxLessThanOrEqual80mhz => "he_phy_stbc_tx_less_than_or_equal_80mhz", Phy, 18, 1;
    PhyStbcRxLessThanOrEqual80mhz => "he_phy_stbc_rx_less_than_or_equal_80mhz", Phy, 19, 1;
    PhyDopplerTx => "he_phy_doppler_tx", Phy, 20, 1;
    PhyDopplerRx => "he_phy_doppler_rx", Phy, 21, 1;
    PhyFullBandwidthUlMuMimo => "he_phy_full_bandwidth_ul_mu_mimo", Phy, 22, 1;
    PhyPartialBandwidthUlMuMimo => "he_phy_partial_bandwidth_ul_mu_mimo", Phy, 23, 1;
    PhyDcmMaxConstellationTx => "he_phy_dcm_max_constellation_tx", Phy, 24, 2;
    PhyDcmMaxNssTx => "he_phy_dcm_max_nss_tx", Phy, 26, 1;
    PhyDcmMaxConstellationRx => "he_phy_dcm_max_constellation_rx", Phy, 27, 2;
    PhyDcmMaxNssRx => "he_phy_dcm_max_nss_rx", Phy, 29, 1;
    PhySuBeamformerCapable => "he_phy_su_beamformer_capable", Phy, 31, 1;
    PhySuBeamformeeCapable => "he_phy_su_beamformee_capable", Phy, 32, 1;
    PhyMuBeamformerCapable => "he_phy_mu_beamformer_capable", Phy, 33, 1;
    PhyBeamformeeStsForLessThanOrEqual80mhz =>
        "he_phy_beamformee_sts_for_less_than_or_equal_80mhz", Phy, 34, 3;
    PhyBeamformeeStsForGreaterThan80mhz =>
        "he_phy_beamformee_sts_for_greater_than_80mhz", Phy, 37, 3;
    PhyNumberOfSoundingDimensionsForLessThanOrEqual80mhz =>
        "he_phy_number_of_sounding_dimensions_for_less_than_or_equal_80mhz", Phy, 40, 3;
    PhyNumberOfSoundingDimensionsForGreaterThan80mhz =>
        "he_phy_number_of_sounding_dimensions_for_greater_than_80mhz", Phy, 43, 3;
    PhyNg16SuFeedback => "he_phy_ng_16_su_feedback", Phy, 46, 1;
    PhyNg16MuFeedback => "he_phy_ng_16_mu_feedback", Phy, 47, 1;
    PhyCodebookSize42ForSuSupport => "he_phy_codebook_size42_for_su_support", Phy, 48, 1;
    PhyCodebookSize75ForMuSupport => "he_phy_codebook_size75_for_mu_support", Phy, 49, 1;
    PhyTriggeredSuBeamformingFeedback => "he_phy_triggered_su_beamforming_feedback", Phy, 50, 1;
    PhyTriggeredMuBeamformingPartialBwFeedback =>
        "he_phy_triggered_mu_beamforming_partial_bw_feedback", Phy, 51, 1;
    PhyTriggeredCqiFeedback => "he_phy_triggered_cqi_feedback", Phy, 52, 1;
    PhyPartialBandwidthExtendedRange => "he_phy_partial_bandwidth_extended_range", Phy, 53, 1;
    PhyPpeThresholdsPresent => "he_phy_ppe_thresholds_present", Phy, 55, 1;
    PhySrpBasedSrSupport => "he_phy_srp_based_sr_support", Phy, 56, 1;
    PhyPowerBoostFactorAlphaSupport => "he_phy_power_boost_factor_alpha_support", Phy, 57, 1;
    PhySuPpduAndHeMuWith4xHeLtfAnd08usGi =>
        "he_phy_su_ppdu_and_he_mu_with_4x_he_ltf_and_08us_gi", Phy, 58, 1;
    PhyMaxNc => "he_phy_max_nc", Phy, 59, 3;
    PhyNominalPacketPadding => "he_phy_nominal_packet_padding", Phy, 78, 2;

    McsNssRxHeMcsMapLessThanOrEqual80Mhz =>
        "he_mcs_nss_rx_he_mcs_map_less_than_or_equal_80_mhz", McsNss, 0, 16;
    McsNssTxHeMcsMapLessThanOrEqual80Mhz =>
        "he_mcs_nss_tx_he_mcs_map_less_than_or_equal_80_mhz", McsNss, 16, 16;
    McsNssRxHeMcsMap160Mhz => "he_mcs_nss_rx_he_mcs_map_160_mhz", McsNss, 32, 16;
    McsNssTxHeMcsMap160Mhz => "he_mcs_nss_tx_he_mcs_map_160_mhz", McsNss, 48, 16;
    McsNssRxHeMcsMap8080Mhz => "he_mcs_nss_rx_he_mcs_map_8080_mhz", McsNss, 64, 16;
    McsNssTxHeMcsMap8080Mhz => "he_mcs_nss_tx_he_mcs_map_8080_mhz", McsNss, 80, 16;

    PpeThresholdsNsts => "he_ppe_thresholds_nsts", Ppe, 0, 3;
    PpeThresholdsRuIndexBitmask => "he_ppe_thresholds_ru_index_bitmask", Ppe, 3, 4;
    PpeThresholdsPpet16ForNsts1ForRu0 => "he_ppe_thresholds_ppet16_for_nsts1_for_ru0", Ppe, ppet(1, 0, 16), 3;
    PpeThresholdsPpet16ForNsts1ForRu1 => "he_ppe_thresholds_ppet16_for_nsts1_for_ru1", Ppe, ppet(1, 1, 16), 3;
    PpeThresholdsPpet16ForNsts1ForRu2 => "he_ppe_thresholds_ppet16_for_nsts1_for_ru2", Ppe, ppet(1, 2, 16), 3;
    PpeThresholdsPpet16ForNsts1ForRu3 => "he_ppe_thresholds_ppet16_for_nsts1_for_ru3", Ppe, ppet(1, 3, 16), 3;
    PpeThresholdsPpet16ForNsts2ForRu0 => "he_ppe_thresholds_ppet16_for_nsts2_for_ru0", Ppe, ppet(2, 0, 16), 3;
    PpeThresholdsPpet16ForNsts2ForRu1 => "he_ppe_thresholds_ppet16_for_nsts2_for_ru1", Ppe, ppet(2, 1, 16), 3;
    PpeThresholdsPpet16ForNsts2ForRu2 => "he_ppe_thresholds_ppet16_for_nsts2_for_ru2", Ppe, ppet(2, 2, 16), 3;
    PpeThresholdsPpet16ForNsts2ForRu3 => "he_ppe_thresholds_ppet16_for_nsts2_for_ru3", Ppe, ppet(2, 3, 16), 3;
    PpeThresholdsPpet16ForNsts3ForRu0 => "he_ppe_thresholds_ppet16_for_nsts3_for_ru0", Ppe, ppet(3, 0, 16), 3;
    PpeThresholdsPpet16ForNsts3ForRu1 => "he_ppe_thresholds_ppet16_for_nsts3_for_ru1", Ppe, ppet(3, 1, 16), 3;
    PpeThresholdsPpet16ForNsts3ForRu2 => "he_ppe_thresholds_ppet16_for_nsts3_for_ru2", Ppe, ppet(3, 2, 16), 3;
    PpeThresholdsPpet16ForNsts3ForRu3 => "he_ppe_thresholds_ppet16_for_nsts3_for_ru3", Ppe, ppet(3, 3, 16), 3;
    PpeThresholdsPpet16ForNsts4ForRu0 => "he_ppe_thresholds_ppet16_for_nsts4_for_ru0", Ppe, ppet(4, 0, 16), 3;
    PpeThresholdsPpet16ForNsts4ForRu1 => "he_ppe_thresholds_ppet16_for_nsts4_for_ru1", Ppe, ppet(4, 1, 16), 3;
    PpeThresholdsPpet16ForNsts4ForRu2 => "he_ppe_thresholds_ppet16_for_nsts4_for_ru2", Ppe, ppet(4, 2, 16), 3;
    PpeThresholdsPpet16ForNsts4ForRu3 => "he_ppe_thresholds_ppet16_for_nsts4_for_ru3", Ppe, ppet(4, 3, 16), 3;
    PpeThresholdsPpet8ForNsts1ForRu0 => "he_ppe_thresholds_ppet8_for_nsts1_for_ru0", Ppe, ppet(1, 0, 8), 3;
    PpeThresholdsPpet8ForNsts1ForRu1 => "he_ppe_thresholds_ppet8_for_nsts1_for_ru1", Ppe, ppet(1, 1, 8), 3;
    PpeThresholdsPpet8ForNsts1ForRu2 => "he_ppe_thresholds_ppet8_for_nsts1_for_ru2", Ppe, ppet(1, 2, 8), 3;
    PpeThresholdsPpet8ForNsts1ForRu3 => "he_ppe_thresholds_ppet8_for_nsts1_for_ru3", Ppe, ppet(1, 3, 8), 3;
    PpeThresholdsPpet8ForNsts2ForRu0 => "he_ppe_thresholds_ppet8_for_nsts2_for_ru0", Ppe, ppet(2, 0, 8), 3;
    PpeThresholdsPpet8ForNsts2ForRu1 => "he_ppe_thresholds_ppet8_for_nsts2_for_ru1", Ppe, ppet(2, 1, 8), 3;
    PpeThresholdsPpet8ForNsts2ForRu2 => "he_ppe_thresholds_ppet8_for_nsts2_for_ru2", Ppe, ppet(2, 2, 8), 3;
    PpeThresholdsPpet8ForNsts2ForRu3 => "he_ppe_thresholds_ppet8_for_nsts2_for_ru3", Ppe, ppet(2, 3, 8), 3;
    PpeThresholdsPpet8ForNsts3ForRu0 => "he_ppe_thresholds_ppet8_for_nsts3_for_ru0", Ppe, ppet(3, 0, 8), 3;
    PpeThresholdsPpet8ForNsts3ForRu1 => "he_ppe_thresholds_ppet8_for_nsts3_for_ru1", Ppe, ppet(3, 1, 8), 3;
    PpeThresholdsPpet8ForNsts3ForRu2 => "he_ppe_thresholds_ppet8_for_nsts3_for_ru2", Ppe, ppet(3, 2, 8), 3;
    PpeThresholdsPpet8ForNsts3ForRu3 => "he_ppe_thresholds_ppet8_for_nsts3_for_ru3", Ppe, ppet(3, 3, 8), 3;
    PpeThresholdsPpet8ForNsts4ForRu0 => "he_ppe_thresholds_ppet8_for_nsts4_for_ru0", Ppe, ppet(4, 0, 8), 3;
    PpeThresholdsPpet8ForNsts4ForRu1 => "he_ppe_thresholds_ppet8_for_nsts4_for_ru1", Ppe, ppet(4, 1, 8), 3;
    PpeThresholdsPpet8ForNsts4ForRu2 => "he_ppe_thresholds_ppet8_for_nsts4_for_ru2", Ppe, ppet(4, 2, 8), 3;
    PpeThresholdsPpet8ForNsts4ForRu3 => "he_ppe_thresholds_ppet8_for_nsts4_for_ru3", Ppe, ppet(4, 3, 8), 3;
}

/// Bit offset of a PPET16 or PPET8 threshold. After the 7 bit header each NSS carries, per RU,
/// a 3 bit PPET16 followed by a 3 bit PPET8.
const fn ppet(nsts: usize, ru: usize, kind: usize) -> usize {
    7 + 6 * (4 * (nsts - 1) + ru) + if kind == 8 { 3 } else { 0 }
}

impl HeCapField {
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|f| f.key() == key)
    }

    /// Splits the sub-field into per-byte parts, lowest bits first.
    pub fn parts(self) -> Vec<FieldPart> {
        let (mut bit, mut remaining) = self.position();
        let mut shift = 0;
        let mut parts = vec![];
        while remaining > 0 {
            let bit_in_byte = bit % 8;
            let n = min(8 - bit_in_byte, remaining);
            let mask = (((1u16 << n) - 1) << bit_in_byte) as u8;
            parts.push(FieldPart { byte_idx: bit / 8, mask, shift });
            shift += n as u32;
            bit += n;
            remaining -= n;
        }
        parts
    }

    /// ORs `value` into the sub-field. Value bits that do not fit are dropped. Whole byte parts,
    /// as in the MCS maps, are replaced instead.
    pub fn set(self, caps: &mut HeCapabilities, value: u32) {
        let bytes = self.section().bytes_mut(caps);
        for part in self.parts() {
            let contribution = bits::pack((value >> part.shift) as u8, part.mask);
            if part.mask == 0xff {
                bytes[part.byte_idx] = contribution;
            } else {
                bytes[part.byte_idx] |= contribution;
            }
        }
    }

    pub fn get(self, caps: &HeCapabilities) -> u32 {
        let bytes = self.section().bytes(caps);
        self.parts().iter().fold(0, |value, part| {
            value | (bits::extract(bytes[part.byte_idx], part.mask) as u32) << part.shift
        })
    }

    /// Overwrites the sub-field in `dst` with its value in `src`.
    pub fn merge(self, dst: &mut HeCapabilities, src: &HeCapabilities) {
        let section = self.section();
        for part in self.parts() {
            let src_byte = section.bytes(src)[part.byte_idx];
            let dst_bytes = section.bytes_mut(dst);
            dst_bytes[part.byte_idx] =
                bits::merge_masked(dst_bytes[part.byte_idx], src_byte, part.mask);
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

/// Set of sub-fields an administrator has overridden.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HeOverrideSelector(u128);

impl HeOverrideSelector {
    pub fn is_selected(&self, field: HeCapField) -> bool {
        self.0 & (1 << field.index()) != 0
    }

    pub fn select(&mut self, field: HeCapField) {
        self.0 |= 1 << field.index();
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    pub fn iter(&self) -> impl Iterator<Item = HeCapField> + '_ {
        HeCapField::ALL.iter().copied().filter(move |f| self.is_selected(*f))
    }

    /// Applies one `key = value` override to the configured capabilities and records it.
    pub fn apply_override(
        &mut self,
        caps: &mut HeCapabilities,
        key: &str,
        value: u32,
    ) -> Result<(), ConfigError> {
        let field = HeCapField::from_key(key)
            .ok_or_else(|| ConfigError::UnknownOverride(key.to_string()))?;
        field.set(caps, value);
        self.select(field);
        debug!("HE override {} = {:#x}", key, value);
        Ok(())
    }

    /// Copies the selected sub-fields of `conf` into `dst`, leaving all other bits alone.
    pub fn merge_into(&self, dst: &mut HeCapabilities, conf: &HeCapabilities) {
        for field in self.iter() {
            field.merge(dst, conf);
        }
    }
}

/// Bytes of advertised capabilities handed to the driver in debug mode: MAC, PHY, MCS/NSS and
/// the PPE thresholds for up to four streams.
pub const HE_ADVERTISED_CAP_LEN: usize = 42;
const HE_DEBUG_PPE_LEN: usize =
    HE_ADVERTISED_CAP_LEN - HE_MAC_CAPAB_LEN - HE_PHY_CAPAB_LEN - HE_TXRX_MCS_SUPPORT_LEN;

#[repr(C)]
#[derive(AsBytes, Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeDebugModeData {
    pub enable_debug_mode: u8,
    pub he_debug_capab: [u8; HE_ADVERTISED_CAP_LEN],
}

impl HeDebugModeData {
    /// Starts from the hardware capabilities and applies the selected overrides from `conf`.
    pub fn new(
        enable: bool,
        hw: &HeCapabilities,
        conf: &HeCapabilities,
        selector: &HeOverrideSelector,
    ) -> Self {
        let mut caps = *hw;
        selector.merge_into(&mut caps, conf);
        let mut he_debug_capab = [0u8; HE_ADVERTISED_CAP_LEN];
        let (mac, rest) = he_debug_capab.split_at_mut(HE_MAC_CAPAB_LEN);
        let (phy, rest) = rest.split_at_mut(HE_PHY_CAPAB_LEN);
        let (mcs, ppe) = rest.split_at_mut(HE_TXRX_MCS_SUPPORT_LEN);
        mac.copy_from_slice(&caps.mac_capab_info[..]);
        phy.copy_from_slice(&caps.phy_capab_info[..]);
        mcs.copy_from_slice(&caps.txrx_mcs_support[..]);
        ppe.copy_from_slice(&caps.ppe_thresholds[..HE_DEBUG_PPE_LEN]);
        HeDebugModeData { enable_debug_mode: enable as u8, he_debug_capab }
    }
}
