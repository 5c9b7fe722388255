// Copyright 2019 The Fuchsia Authors. All rights reserved.
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

use {
    crate::{
        appendable::{Appendable, BufferTooSmall},
        config::IfaceConfig,
        hw::CurrentMode,
        ie,
    },
    log::debug,
};

/// Writes the HE elements an AP interface advertises in beacons and probe responses.
pub struct HeElementWriter<'a, M> {
    modes: &'a M,
    conf: &'a mut IfaceConfig,
}

impl<'a, M: CurrentMode> HeElementWriter<'a, M> {
    pub fn new(modes: &'a M, conf: &'a mut IfaceConfig) -> Self {
        HeElementWriter { modes, conf }
    }

    pub fn write_he_capabilities<B: Appendable>(&self, buf: &mut B) -> Result<(), BufferTooSmall> {
        match self.modes.current_mode() {
            Some(mode) => {
                ie::write_he_capabilities(buf, &mode.he_capab, self.conf.chan_width_set())
            }
            None => Ok(()),
        }
    }

    /// Refreshes the VHT operation information of the configured HE operation from the
    /// interface's VHT settings before writing, if the element carries it.
    pub fn write_he_operation<B: Appendable>(&mut self, buf: &mut B) -> Result<(), BufferTooSmall> {
        if self.modes.current_mode().is_none() {
            return Ok(());
        }
        let conf = &mut *self.conf;
        if conf.he_oper.vht_oper_info_present() {
            conf.he_oper.vht_op_info_chwidth = conf.vht_oper_chwidth;
            conf.he_oper.vht_op_info_chan_center_freq_seg0_idx = conf.vht_oper_centr_freq_seg0_idx;
            conf.he_oper.vht_op_info_chan_center_freq_seg1_idx = conf.vht_oper_centr_freq_seg1_idx;
        }
        ie::write_he_operation(buf, &conf.he_oper)
    }

    pub fn write_he_mu_edca_parameter_set<B: Appendable>(
        &self,
        buf: &mut B,
    ) -> Result<(), BufferTooSmall> {
        ie::write_he_mu_edca_parameter_set(buf, &self.conf.he_mu_edca)
    }

    pub fn write_he_spatial_reuse_parameter_set<B: Appendable>(
        &self,
        buf: &mut B,
    ) -> Result<(), BufferTooSmall> {
        match self.modes.current_mode() {
            Some(_) => ie::write_he_spatial_reuse_parameter_set(buf, &self.conf.he_spatial_reuse),
            None => Ok(()),
        }
    }

    pub fn write_he_ndp_feedback_report_parameter_set<B: Appendable>(
        &self,
        buf: &mut B,
    ) -> Result<(), BufferTooSmall> {
        ie::write_he_ndp_feedback_report_parameter_set(buf, self.conf.he_nfr_buffer_threshold)
    }

    /// Writes every HE element in beacon order. Writes nothing unless HE is enabled.
    pub fn write_he_elements<B: Appendable>(&mut self, buf: &mut B) -> Result<(), BufferTooSmall> {
        if !self.conf.he_enabled() {
            debug!("HE disabled, not advertising HE elements");
            return Ok(());
        }
        self.write_he_capabilities(buf)?;
        self.write_he_operation(buf)?;
        self.write_he_spatial_reuse_parameter_set(buf)?;
        self.write_he_mu_edca_parameter_set(buf)?;
        self.write_he_ndp_feedback_report_parameter_set(buf)
    }
}
