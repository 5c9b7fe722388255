// Copyright 2019 The Fuchsia Authors. All rights reserved.
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

use {failure::Fail, std::io};

/// Status reported to the association path, IEEE Std 802.11-2016, 9.4.1.9.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StatusCode(pub u16);

impl StatusCode {
    pub const SUCCESS: Self = Self(0);
    pub const UNSPECIFIED_FAILURE: Self = Self(1);
}

#[derive(Debug, Fail, PartialEq, Eq)]
pub enum HeCapabLenError {
    #[fail(display = "HE PHY channel width set is invalid: 80+80 MHz without 160 MHz")]
    InvalidChannelWidthSet,
    #[fail(display = "HE capabilities length {} is shorter than required {}", claimed, min)]
    TooShort { claimed: usize, min: usize },
}

#[derive(Debug, Fail)]
pub enum ConfigError {
    #[fail(display = "failed to read config: {}", _0)]
    Io(#[cause] io::Error),
    #[fail(display = "failed to parse config: {}", _0)]
    Json(#[cause] serde_json::Error),
    #[fail(display = "unknown HE capability override '{}'", _0)]
    UnknownOverride(String),
}

impl From<io::Error> for ConfigError {
    fn from(e: io::Error) -> Self {
        ConfigError::Io(e)
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(e: serde_json::Error) -> Self {
        ConfigError::Json(e)
    }
}
