// Copyright 2019 The Fuchsia Authors. All rights reserved.
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

use {
    crate::{
        config::IfaceConfig,
        error::StatusCode,
        hw::CurrentMode,
        ie::{
            find_ext_element, intersect_he_capabilities, parse_he_capabilities,
            parse_he_operation, ExtId, HeCapabilities, HeOperation,
        },
    },
    log::{debug, info},
    std::collections::HashMap,
};

pub type MacAddr = [u8; 6];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StaFlags(pub u32);

impl StaFlags {
    pub const HE: Self = Self(1 << 0);

    pub fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn insert(&mut self, other: Self) {
        self.0 |= other.0;
    }

    pub fn remove(&mut self, other: Self) {
        self.0 &= !other.0;
    }
}

/// HE state of one associated station.
#[derive(Debug, Default)]
pub struct StaInfo {
    pub flags: StaFlags,
    pub he_capabilities: Option<Box<HeCapabilities>>,
    pub he_capabilities_len_from_sta: usize,
    pub he_operation: Option<Box<HeOperation>>,
    pub he_operation_len_from_sta: usize,
}

impl StaInfo {
    fn clear_he_capabilities(&mut self) {
        self.flags.remove(StaFlags::HE);
        self.he_capabilities = None;
        self.he_capabilities_len_from_sta = 0;
    }
}

/// Stores the HE capabilities a station sent. An absent or malformed element, or HE being
/// disabled on the interface, leaves the station without HE capabilities; the association
/// itself still succeeds.
pub fn copy_sta_he_capab(
    sta: &mut StaInfo,
    he_capab: Option<&[u8]>,
    conf: &IfaceConfig,
) -> StatusCode {
    let bytes = match he_capab {
        Some(bytes) if conf.he_enabled() => bytes,
        _ => {
            sta.clear_he_capabilities();
            return StatusCode::SUCCESS;
        }
    };
    let caps = match parse_he_capabilities(bytes) {
        Ok(caps) => caps,
        Err(e) => {
            debug!("Ignoring HE capabilities from station: {}", e);
            sta.clear_he_capabilities();
            return StatusCode::SUCCESS;
        }
    };
    match sta.he_capabilities.as_mut() {
        Some(stored) => **stored = caps,
        None => sta.he_capabilities = Some(Box::new(caps)),
    }
    sta.he_capabilities_len_from_sta = bytes.len();
    sta.flags.insert(StaFlags::HE);
    StatusCode::SUCCESS
}

/// Stores up to one HE Operation record worth of the element a station sent.
pub fn copy_sta_he_operation(
    sta: &mut StaInfo,
    he_oper: Option<&[u8]>,
    conf: &IfaceConfig,
) -> StatusCode {
    let bytes = match he_oper {
        Some(bytes) if conf.he_enabled() => bytes,
        _ => {
            sta.he_operation = None;
            sta.he_operation_len_from_sta = 0;
            return StatusCode::SUCCESS;
        }
    };
    let (oper, len) = parse_he_operation(bytes);
    match sta.he_operation.as_mut() {
        Some(stored) => **stored = oper,
        None => sta.he_operation = Some(Box::new(oper)),
    }
    sta.he_operation_len_from_sta = len;
    StatusCode::SUCCESS
}

/// Stations associated with one AP interface.
#[derive(Debug, Default)]
pub struct StationTable {
    stations: HashMap<MacAddr, StaInfo>,
}

impl StationTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, addr: &MacAddr) -> Option<&StaInfo> {
        self.stations.get(addr)
    }

    pub fn get_mut(&mut self, addr: &MacAddr) -> Option<&mut StaInfo> {
        self.stations.get_mut(addr)
    }

    pub fn remove(&mut self, addr: &MacAddr) -> Option<StaInfo> {
        let sta = self.stations.remove(addr);
        if sta.is_some() {
            info!("Station {} removed", hex::encode(addr));
        }
        sta
    }

    pub fn len(&self) -> usize {
        self.stations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stations.is_empty()
    }

    /// Handles the information elements of a (re)association request. Elements missing from
    /// `ies` clear what was stored from an earlier request.
    pub fn on_assoc_request(
        &mut self,
        addr: MacAddr,
        ies: &[u8],
        conf: &IfaceConfig,
    ) -> StatusCode {
        let sta = self.stations.entry(addr).or_insert_with(StaInfo::default);
        let status = copy_sta_he_capab(sta, find_ext_element(ies, ExtId::HE_CAPABILITIES), conf);
        if status != StatusCode::SUCCESS {
            return status;
        }
        let status = copy_sta_he_operation(sta, find_ext_element(ies, ExtId::HE_OPERATION), conf);
        debug!(
            "Station {} associated, HE: {}",
            hex::encode(addr),
            sta.flags.contains(StaFlags::HE)
        );
        status
    }

    /// HE capabilities usable with a station, or None if it has none or the interface has no
    /// hardware mode yet.
    pub fn negotiated_he_capabilities<M: CurrentMode>(
        &self,
        addr: &MacAddr,
        modes: &M,
        conf: &IfaceConfig,
    ) -> Option<HeCapabilities> {
        let mode = modes.current_mode()?;
        let sta = self.stations.get(addr)?;
        intersect_he_capabilities(
            &mode.he_capab,
            conf.chan_width_set(),
            sta.he_capabilities.as_ref().map(|caps| &**caps),
            sta.he_capabilities_len_from_sta,
        )
    }
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        crate::{
            hw::HwMode,
            ie::{write_ext_element, Id, CHANNEL_WIDTH_SET_B1, CHANNEL_WIDTH_SET_B2},
        },
        test_case::test_case,
    };

    const ADDR: MacAddr = [2, 0, 0, 0, 0, 1];

    fn conf() -> IfaceConfig {
        let mut conf = IfaceConfig { ieee80211ax: true, ..Default::default() };
        conf.he_capab.phy_capab_info[0] = 0xff;
        conf
    }

    #[rustfmt::skip]
    fn he_capab_body() -> Vec<u8> {
        vec![
            // MAC capabilities
            0x01, 0x00, 0x08, 0x12, 0x00, 0x10,
            // PHY capabilities: 40/80 MHz and 160 MHz
            0b0000_0110, 0x20, 0x20, 0x02, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
            // MCS/NSS <= 80 MHz
            0xfa, 0xff, 0xfa, 0xff,
            // MCS/NSS 160 MHz
            0xfe, 0xff, 0xfe, 0xff,
        ]
    }

    fn sta_with_caps() -> StaInfo {
        let mut sta = StaInfo::default();
        let status = copy_sta_he_capab(&mut sta, Some(&he_capab_body()[..]), &conf());
        assert_eq!(StatusCode::SUCCESS, status);
        assert!(sta.he_capabilities.is_some());
        sta
    }

    #[test]
    fn stores_valid_caps() {
        let sta = sta_with_caps();
        assert!(sta.flags.contains(StaFlags::HE));
        assert_eq!(25, sta.he_capabilities_len_from_sta);
        let caps = sta.he_capabilities.expect("stored caps");
        assert_eq!([0x01, 0x00, 0x08, 0x12, 0x00, 0x10], caps.mac_capab_info);
        assert_eq!(0b0000_0110, caps.chan_width_set());
    }

    #[test]
    fn stored_record_is_reused() {
        let mut sta = sta_with_caps();
        let before = sta.he_capabilities.as_ref().map(|b| &**b as *const HeCapabilities);
        let mut body = he_capab_body();
        body[0] = 0x03;
        copy_sta_he_capab(&mut sta, Some(&body[..]), &conf());
        let after = sta.he_capabilities.as_ref().map(|b| &**b as *const HeCapabilities);
        assert_eq!(before, after);
        assert_eq!(Some(0x03), sta.he_capabilities.as_ref().map(|c| c.mac_capab_info[0]));
    }

    #[test_case(None ; "absent")]
    #[test_case(Some(&[0u8; 24][..]) ; "one byte short of 160 MHz")]
    #[test_case(Some(&[][..]) ; "empty")]
    fn absent_and_short_are_equivalent(input: Option<&[u8]>) {
        let mut sta = sta_with_caps();
        let mut input = input.map(|b| b.to_vec());
        // Keep the 160 MHz bit so 24 bytes is one short.
        if let Some(bytes) = input.as_mut().filter(|b| b.len() > 6) {
            bytes[6] = 0b0000_0110;
        }
        let status = copy_sta_he_capab(&mut sta, input.as_ref().map(|b| &b[..]), &conf());
        assert_eq!(StatusCode::SUCCESS, status);
        assert!(sta.he_capabilities.is_none());
        assert!(!sta.flags.contains(StaFlags::HE));
        assert_eq!(0, sta.he_capabilities_len_from_sta);
    }

    #[test]
    fn disabled_11ax_ignores_caps() {
        let mut sta = sta_with_caps();
        let mut conf = conf();
        conf.disable_11ax = true;
        let status = copy_sta_he_capab(&mut sta, Some(&he_capab_body()[..]), &conf);
        assert_eq!(StatusCode::SUCCESS, status);
        assert!(sta.he_capabilities.is_none());
    }

    #[test]
    fn operation_copied_and_cleared() {
        let mut sta = StaInfo::default();
        copy_sta_he_operation(&mut sta, Some(&[0xaa; 20][..]), &conf());
        assert_eq!(17, sta.he_operation_len_from_sta);
        assert_eq!(Some(0xaa), sta.he_operation.as_ref().map(|o| o.bss_color_info));

        copy_sta_he_operation(&mut sta, None, &conf());
        assert!(sta.he_operation.is_none());
        assert_eq!(0, sta.he_operation_len_from_sta);
    }

    fn assoc_ies(he_capab: Option<&[u8]>) -> Vec<u8> {
        // SSID "ap"
        let mut ies = vec![Id::SSID.0, 2, b'a', b'p'];
        if let Some(body) = he_capab {
            write_ext_element(&mut ies, ExtId::HE_CAPABILITIES, body).expect("write to vec");
        }
        write_ext_element(&mut ies, ExtId::HE_OPERATION, &[0, 0, 0, 0x3f]).expect("write to vec");
        ies
    }

    #[test]
    fn assoc_request_updates_table() {
        let mut table = StationTable::new();
        let body = he_capab_body();
        let ies = assoc_ies(Some(&body[..]));
        assert_eq!(StatusCode::SUCCESS, table.on_assoc_request(ADDR, &ies[..], &conf()));
        let sta = table.get(&ADDR).expect("station added");
        assert!(sta.flags.contains(StaFlags::HE));
        assert_eq!(4, sta.he_operation_len_from_sta);

        // Reassociation without HE capabilities drops the stored record.
        let ies = assoc_ies(None);
        table.on_assoc_request(ADDR, &ies[..], &conf());
        let sta = table.get(&ADDR).expect("station kept");
        assert!(sta.he_capabilities.is_none());
        assert!(sta.he_operation.is_some());

        assert!(table.remove(&ADDR).is_some());
        assert!(table.is_empty());
    }

    #[test]
    fn negotiated_caps() {
        let mut table = StationTable::new();
        let body = he_capab_body();
        let mut conf = conf();
        conf.he_capab.phy_capab_info[0] = CHANNEL_WIDTH_SET_B1;
        table.on_assoc_request(ADDR, &assoc_ies(Some(&body[..]))[..], &conf);

        let mut hw = HwMode::default();
        hw.he_capab.phy_capab_info[0] = CHANNEL_WIDTH_SET_B1 | CHANNEL_WIDTH_SET_B2;
        hw.he_capab.txrx_mcs_support = [0xff; 12];

        let no_mode: Option<HwMode> = None;
        assert!(table.negotiated_he_capabilities(&ADDR, &no_mode, &conf).is_none());

        let caps = table.negotiated_he_capabilities(&ADDR, &hw, &conf).expect("negotiated");
        assert_eq!(CHANNEL_WIDTH_SET_B1, caps.chan_width_set());
        assert_eq!(&[0xff; 8][..], &caps.txrx_mcs_support[..8]);
        assert_eq!(&[0; 4][..], &caps.txrx_mcs_support[8..]);
    }
}
