// Copyright 2019 The Fuchsia Authors. All rights reserved.
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

//! IEEE 802.11ax (HE) information elements for an access point: encoding the elements it
//! advertises, validating and storing the ones stations send, and negotiating the capabilities
//! usable with each station.

pub mod appendable;
pub mod beacon;
pub mod bits;
pub mod buffer_reader;
pub mod config;
pub mod error;
pub mod hw;
pub mod ie;
pub mod override_capab;
pub mod station;

pub use crate::error::StatusCode;
