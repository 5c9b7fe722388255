// Copyright 2019 The Fuchsia Authors. All rights reserved.
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

use {
    super::{fields::*, write_ext_element, ExtId},
    crate::{
        appendable::{Appendable, BufferTooSmall},
        bits,
    },
    log::trace,
    zerocopy::AsBytes,
};

/// Writes the HE Capabilities element advertised by the AP. Every section comes from the
/// hardware record except the channel width set, which is limited to what is also configured.
pub fn write_he_capabilities<B: Appendable>(
    buf: &mut B,
    hw: &HeCapabilities,
    conf_chan_width_set: u8,
) -> Result<(), BufferTooSmall> {
    let chan_width_set = hw.chan_width_set() & conf_chan_width_set;
    let mcs_nss_len = advertised_mcs_nss_size(chan_width_set);

    let mut phy = hw.phy_capab_info;
    phy[HE_PHY_CAP0_IDX] = chan_width_set;
    phy[HE_PHY_CAP7_IDX] = bits::merge_masked(
        phy[HE_PHY_CAP7_IDX],
        hw.phy_capab_info[HE_PHY_CAP7_IDX],
        HE_PHY_CAP7_MAX_NC,
    );

    let mut body = Vec::with_capacity(std::mem::size_of::<HeCapabilities>());
    body.extend_from_slice(&hw.mac_capab_info[..]);
    body.extend_from_slice(&phy[..]);
    body.extend_from_slice(&hw.txrx_mcs_support[..mcs_nss_len]);
    // PPE thresholds follow the hardware record, not the negotiated width.
    if hw.ppe_present() {
        body.extend_from_slice(&hw.ppe_thresholds[..ppe_size(hw.ppe_thresholds[0])]);
    }
    trace!("HE capabilities: {}", hex::encode(&body));
    write_ext_element(buf, ExtId::HE_CAPABILITIES, &body[..])
}

pub fn write_he_operation<B: Appendable>(
    buf: &mut B,
    oper: &HeOperation,
) -> Result<(), BufferTooSmall> {
    let mut body = Vec::with_capacity(std::mem::size_of::<HeOperation>());
    body.extend_from_slice(&oper.oper_params[..]);
    body.push(oper.bss_color_info);
    body.extend_from_slice(&oper.mcs_nss_set[..]);
    if oper.vht_oper_info_present() {
        body.push(oper.vht_op_info_chwidth);
        body.push(oper.vht_op_info_chan_center_freq_seg0_idx);
        body.push(oper.vht_op_info_chan_center_freq_seg1_idx);
    }
    if oper.co_located_bss() {
        body.push(oper.max_co_located_bssid_ind);
    }
    if oper.he_6ghz_oper_info_present() {
        body.extend_from_slice(&oper.he_6ghz_oper_info[..]);
    }
    trace!("HE operation: {}", hex::encode(&body));
    write_ext_element(buf, ExtId::HE_OPERATION, &body[..])
}

/// Writes nothing if the parameter set is all zeroes.
pub fn write_he_mu_edca_parameter_set<B: Appendable>(
    buf: &mut B,
    edca: &MuEdcaParameterSet,
) -> Result<(), BufferTooSmall> {
    if edca.is_unconfigured() {
        return Ok(());
    }
    trace!("HE MU EDCA parameter set: {}", hex::encode(edca.as_bytes()));
    write_ext_element(buf, ExtId::HE_MU_EDCA_PARAMETER_SET, edca.as_bytes())
}

pub fn write_he_spatial_reuse_parameter_set<B: Appendable>(
    buf: &mut B,
    sr: &SpatialReuseParameterSet,
) -> Result<(), BufferTooSmall> {
    let mut body = vec![sr.sr_control];
    if bits::is_set(sr.sr_control, HE_SRP_NON_SRG_OFFSET_PRESENT) {
        body.push(sr.non_srg_obss_pd_max_offset);
    }
    if bits::is_set(sr.sr_control, HE_SRP_SRG_INFO_PRESENT) {
        body.extend_from_slice(&[
            sr.srg_obss_pd_min_offset,
            sr.srg_obss_pd_max_offset,
            sr.srg_bss_color_bitmap,
            sr.srg_partial_bssid_bitmap,
        ]);
    }
    trace!("HE spatial reuse parameter set: {}", hex::encode(&body));
    write_ext_element(buf, ExtId::HE_SPATIAL_REUSE_PARAMETER_SET, &body[..])
}

pub fn write_he_ndp_feedback_report_parameter_set<B: Appendable>(
    buf: &mut B,
    buffer_threshold: u8,
) -> Result<(), BufferTooSmall> {
    trace!("HE NDP feedback report parameter set: {:#04x}", buffer_threshold);
    write_ext_element(buf, ExtId::HE_NDP_FEEDBACK_REPORT_PARAMETER_SET, &[buffer_threshold])
}
