// Carton
// Copyright (c) 2026 The Project Carton Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use carton_core::errors::Result;
use carton_core::io::ReadBytes;

use crate::atoms::{Atom, AtomHeader};

/// One run of consecutive samples sharing a duration.
#[derive(Debug)]
pub(crate) struct SttsEntry {
    pub sample_count: u32,
    pub sample_duration: u32,
}

/// Time-to-sample atom.
#[derive(Debug)]
pub(crate) struct SttsAtom {
    pub entries: Vec<SttsEntry>,
    /// Sum of all sample durations in media timescale ticks.
    pub total_duration: u64,
}

impl SttsAtom {
    /// Finds the sample covering the media time `ticks`. Returns the sample
    /// number and the timestamp at which that sample starts, or `None` when
    /// `ticks` lies at or beyond the end of the table.
    pub(crate) fn find_sample_for_time(&self, ticks: u64) -> Option<(u32, u64)> {
        let mut sample = 0u32;
        let mut time = 0u64;

        for entry in &self.entries {
            let run = u64::from(entry.sample_count) * u64::from(entry.sample_duration);

            if ticks < time + run {
                let n = (ticks - time) / u64::from(entry.sample_duration);
                return Some((sample + n as u32, time + n * u64::from(entry.sample_duration)));
            }

            sample += entry.sample_count;
            time += run;
        }

        None
    }
}

impl Atom for SttsAtom {
    fn read<B: ReadBytes>(reader: &mut B, header: AtomHeader) -> Result<Self> {
        let (_, _) = header.read_extended_header(reader)?;

        let entry_count = reader.read_be_u32()?;

        let mut entries = Vec::with_capacity(entry_count as usize);
        let mut total_duration = 0u64;

        for _ in 0..entry_count {
            let sample_count = reader.read_be_u32()?;
            let sample_duration = reader.read_be_u32()?;

            total_duration += u64::from(sample_count) * u64::from(sample_duration);
            entries.push(SttsEntry { sample_count, sample_duration });
        }

        Ok(SttsAtom { entries, total_duration })
    }
}

#[cfg(test)]
mod tests {
    use super::{SttsAtom, SttsEntry};

    #[test]
    fn sample_lookup_is_monotonic() {
        // 20 samples of 100 ticks each.
        let stts = SttsAtom {
            entries: vec![SttsEntry { sample_count: 20, sample_duration: 100 }],
            total_duration: 2000,
        };

        for k in 0..20u64 {
            assert_eq!(stts.find_sample_for_time(k * 100), Some((k as u32, k * 100)));
        }

        // Mid-sample times resolve to the sample's start.
        assert_eq!(stts.find_sample_for_time(150), Some((1, 100)));

        // At or past the total duration there is no sample.
        assert_eq!(stts.find_sample_for_time(2000), None);
        assert_eq!(stts.find_sample_for_time(5000), None);
    }

    #[test]
    fn sample_lookup_spans_runs() {
        let stts = SttsAtom {
            entries: vec![
                SttsEntry { sample_count: 2, sample_duration: 100 },
                SttsEntry { sample_count: 3, sample_duration: 50 },
            ],
            total_duration: 350,
        };

        assert_eq!(stts.find_sample_for_time(0), Some((0, 0)));
        assert_eq!(stts.find_sample_for_time(199), Some((1, 100)));
        assert_eq!(stts.find_sample_for_time(200), Some((2, 200)));
        assert_eq!(stts.find_sample_for_time(320), Some((4, 300)));
        assert_eq!(stts.find_sample_for_time(350), None);
    }
}
