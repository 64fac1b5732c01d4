// Carton
// Copyright (c) 2026 The Project Carton Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Project Carton's shared foundation: the error taxonomy, the stream I/O
//! layer, time units, and the format-agnostic [`formats::Track`] /
//! [`formats::ContainerReader`] contract implemented by every demuxer crate.

#![warn(rust_2018_idioms)]
#![forbid(unsafe_code)]

pub mod errors;
pub mod formats;
pub mod io;
pub mod units;
