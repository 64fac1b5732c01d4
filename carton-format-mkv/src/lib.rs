// Carton
// Copyright (c) 2026 The Project Carton Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Matroska/WebM demuxer for project Carton.
//!
//! The EBML skeleton (segment information, track list, cluster positions) is
//! parsed eagerly when a [`MkvReader`] is created. Block payloads are read
//! lazily, cluster by cluster, through a small rolling cluster cache.

#![warn(rust_2018_idioms)]
#![forbid(unsafe_code)]

mod codecs;
mod demuxer;
mod ebml;
mod element_ids;
mod lacing;
mod segment;

pub use demuxer::MkvReader;
