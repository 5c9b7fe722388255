// Copyright 2019 The Fuchsia Authors. All rights reserved.
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

use {
    failure::{Error, ResultExt},
    std::{fmt::Write, path::Path},
    wlan_he::{
        beacon::HeElementWriter,
        config::IfaceConfig,
        hw::HwMode,
        ie::{self, ExtReader},
    },
};

/// Decodes an HE Capabilities element body given as hex.
pub fn he_parse(body_hex: &str) -> Result<String, Error> {
    let body = hex::decode(body_hex.trim()).context("invalid hex")?;
    let (caps, layout) = ie::parse_he_capabilities_with_layout(&body[..])?;
    let mut out = String::new();
    writeln!(out, "mac_capab_info: {}", hex::encode(&caps.mac_capab_info[..]))?;
    writeln!(out, "phy_capab_info: {}", hex::encode(&caps.phy_capab_info[..]))?;
    writeln!(out, "channel_width_set: {:#04x}", caps.chan_width_set())?;
    writeln!(
        out,
        "txrx_mcs_support: {}",
        hex::encode(&caps.txrx_mcs_support[..layout.mcs_nss_len])
    )?;
    if layout.ppe_len > 0 {
        writeln!(out, "ppe_thresholds: {}", hex::encode(&caps.ppe_thresholds[..layout.ppe_len]))?;
    }
    writeln!(out, "length: {} of {}", layout.min_len(), body.len())?;
    Ok(out)
}

/// Lists the HE elements an interface configuration advertises on the given hardware.
pub fn he_elements(iface: &Path, hw_mode: &Path) -> Result<String, Error> {
    let mut conf = IfaceConfig::load_from_file(iface)
        .with_context(|_| format!("failed to load {}", iface.display()))?;
    let mode = HwMode::load_from_file(hw_mode)
        .with_context(|_| format!("failed to load {}", hw_mode.display()))?;
    let mut buf = vec![];
    HeElementWriter::new(&mode, &mut conf).write_he_elements(&mut buf)?;
    let mut out = String::new();
    for (ext_id, body) in ExtReader::new(&buf[..]) {
        writeln!(out, "{}: {}", ext_id.0, hex::encode(body))?;
    }
    Ok(out)
}
