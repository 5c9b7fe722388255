// Copyright 2019 The Fuchsia Authors. All rights reserved.
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

use {
    crate::{error::ConfigError, ie::HeCapabilities},
    serde::{Deserialize, Serialize},
    std::{fs, path::Path},
};

/// Capabilities the radio reports for the band it currently operates in.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HwMode {
    #[serde(default)]
    pub name: String,
    pub he_capab: HeCapabilities,
}

impl HwMode {
    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(s)?)
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        Self::from_json_str(&fs::read_to_string(path)?)
    }
}

/// Source of the interface's current hardware mode. There is none until the interface has been
/// brought up on a band.
pub trait CurrentMode {
    fn current_mode(&self) -> Option<&HwMode>;
}

impl CurrentMode for HwMode {
    fn current_mode(&self) -> Option<&HwMode> {
        Some(self)
    }
}

impl CurrentMode for Option<HwMode> {
    fn current_mode(&self) -> Option<&HwMode> {
        self.as_ref()
    }
}
