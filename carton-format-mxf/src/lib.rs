// Carton
// Copyright (c) 2026 The Project Carton Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! MXF (SMPTE 377) metadata reader for Project Carton.

#![warn(rust_2018_idioms)]
#![forbid(unsafe_code)]

mod demuxer;
mod klv;

pub use demuxer::MxfReader;
