// Copyright 2019 The Fuchsia Authors. All rights reserved.
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

use {
    crate::{
        error::ConfigError,
        ie::{HeCapabilities, HeOperation, MuEdcaParameterSet, SpatialReuseParameterSet},
        override_capab::{HeDebugModeData, HeOverrideSelector},
    },
    log::info,
    serde::{Deserialize, Serialize},
    std::{collections::BTreeMap, fs, path::Path},
};

/// HE related settings of one AP interface.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IfaceConfig {
    pub ieee80211ax: bool,
    pub disable_11ax: bool,
    pub vht_oper_chwidth: u8,
    pub vht_oper_centr_freq_seg0_idx: u8,
    pub vht_oper_centr_freq_seg1_idx: u8,
    /// Configured capabilities. PHY byte 0 limits the advertised channel width set.
    pub he_capab: HeCapabilities,
    pub he_oper: HeOperation,
    pub he_mu_edca: MuEdcaParameterSet,
    pub he_spatial_reuse: SpatialReuseParameterSet,
    pub he_nfr_buffer_threshold: u8,
    pub he_debug_mode: bool,
    /// Sub-field overrides by key, applied on load.
    pub he_overrides: BTreeMap<String, u32>,
    #[serde(skip)]
    pub he_override_selector: HeOverrideSelector,
}

impl IfaceConfig {
    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        let mut conf: IfaceConfig = serde_json::from_str(s)?;
        conf.apply_overrides()?;
        Ok(conf)
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let conf = Self::from_json_str(&fs::read_to_string(path.as_ref())?)?;
        info!(
            "Loaded {} with {} HE override(s)",
            path.as_ref().display(),
            conf.he_override_selector.len()
        );
        Ok(conf)
    }

    fn apply_overrides(&mut self) -> Result<(), ConfigError> {
        for (key, value) in &self.he_overrides {
            self.he_override_selector.apply_override(&mut self.he_capab, key, *value)?;
        }
        Ok(())
    }

    /// HE is advertised and negotiated only when enabled and not disabled.
    pub fn he_enabled(&self) -> bool {
        self.ieee80211ax && !self.disable_11ax
    }

    pub fn chan_width_set(&self) -> u8 {
        self.he_capab.chan_width_set()
    }

    /// Capability blob for the driver: hardware capabilities with the overridden sub-fields
    /// replaced by their configured values.
    pub fn he_debug_mode_data(&self, hw: &HeCapabilities) -> HeDebugModeData {
        HeDebugModeData::new(
            self.he_debug_mode,
            hw,
            &self.he_capab,
            &self.he_override_selector,
        )
    }
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        crate::override_capab::HeCapField,
        std::io::Write,
    };

    #[test]
    fn defaults() {
        let conf = IfaceConfig::from_json_str("{}").expect("empty config is valid");
        assert!(!conf.he_enabled());
        assert_eq!(HeCapabilities::default(), conf.he_capab);
        assert!(conf.he_override_selector.is_empty());
    }

    #[test]
    fn load_with_overrides() {
        let mut file = tempfile::NamedTempFile::new().expect("create temp file");
        write!(
            file,
            r#"{{
                "ieee80211ax": true,
                "vht_oper_chwidth": 1,
                "vht_oper_centr_freq_seg0_idx": 42,
                "he_nfr_buffer_threshold": 100,
                "he_debug_mode": true,
                "he_overrides": {{
                    "he_mac_he_link_adaptation": 3,
                    "he_phy_max_nc": 1,
                    "he_mcs_nss_rx_he_mcs_map_less_than_or_equal_80_mhz": 65530
                }}
            }}"#
        )
        .expect("write temp file");

        let conf = IfaceConfig::load_from_file(file.path()).expect("valid config");
        assert!(conf.he_enabled());
        assert_eq!(42, conf.vht_oper_centr_freq_seg0_idx);
        assert_eq!(100, conf.he_nfr_buffer_threshold);
        assert_eq!(0b1000_0000, conf.he_capab.mac_capab_info[1]);
        assert_eq!(0b0000_0001, conf.he_capab.mac_capab_info[2]);
        assert_eq!(0b0000_1000, conf.he_capab.phy_capab_info[7]);
        assert_eq!([0xfa, 0xff], conf.he_capab.txrx_mcs_support[..2]);
        assert_eq!(3, conf.he_override_selector.len());
        assert!(conf.he_override_selector.is_selected(HeCapField::MacHeLinkAdaptation));
    }

    #[test]
    fn unknown_override_rejected() {
        let result =
            IfaceConfig::from_json_str(r#"{"he_overrides": {"he_mac_does_not_exist": 1}}"#);
        match result {
            Err(ConfigError::UnknownOverride(key)) => assert_eq!("he_mac_does_not_exist", key),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn missing_file() {
        let dir = tempfile::tempdir().expect("create temp dir");
        match IfaceConfig::load_from_file(dir.path().join("missing.json")) {
            Err(ConfigError::Io(_)) => (),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn debug_mode_data_uses_overrides_only() {
        let conf = IfaceConfig::from_json_str(
            r#"{"he_debug_mode": true, "he_overrides": {"he_phy_device_class": 1}}"#,
        )
        .expect("valid config");
        let mut hw = HeCapabilities::default();
        hw.phy_capab_info[1] = 0b0010_0000;
        hw.mac_capab_info[0] = 0x0f;

        let data = conf.he_debug_mode_data(&hw);
        assert_eq!(1, data.enable_debug_mode);
        assert_eq!(0x0f, data.he_debug_capab[0]);
        assert_eq!(0b0011_0000, data.he_debug_capab[6 + 1]);
    }
}
