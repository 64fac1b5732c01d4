// Carton
// Copyright (c) 2026 The Project Carton Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! ISO Base Media (MP4/M4A/MOV) demuxer for Project Carton.

#![warn(rust_2018_idioms)]
#![forbid(unsafe_code)]

mod atoms;
mod demuxer;
mod sample_map;

pub use demuxer::Mp4Reader;
