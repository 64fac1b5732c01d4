// Carton
// Copyright (c) 2026 The Project Carton Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use log::warn;

use crate::atoms::StblAtom;

/// Flat per-sample byte map: the absolute position and length of every sample
/// of a track, in sample order.
///
/// Built once per track by walking the chunk offset, sample-to-chunk, and
/// sample size tables together. A truncated chunk offset table ends the map
/// early rather than failing, so a damaged file still yields its leading
/// samples.
#[derive(Debug, Default)]
pub(crate) struct SampleMap {
    samples: Vec<(u64, u32)>,
}

impl SampleMap {
    pub(crate) fn build(stbl: &StblAtom) -> SampleMap {
        let chunk_offsets = stbl.chunk_offsets();
        let total = stbl.stsz.sample_count;

        let mut samples = Vec::with_capacity(total as usize);

        let mut run = 0;
        let mut chunk = 0usize;
        let mut sample = 0u32;

        'chunks: while sample < total {
            let Some(&chunk_pos) = chunk_offsets.get(chunk)
            else {
                break;
            };

            // Advance to the sample-to-chunk run covering this chunk. The
            // last run extends over all remaining chunks.
            while let Some(next) = stbl.stsc.entries.get(run + 1) {
                if (next.first_chunk as usize) > chunk {
                    break;
                }
                run += 1;
            }

            let Some(entry) = stbl.stsc.entries.get(run)
            else {
                break;
            };

            let mut pos = chunk_pos;

            for _ in 0..entry.samples_per_chunk {
                if sample >= total {
                    break 'chunks;
                }

                let Some(len) = stbl.stsz.size_of(sample)
                else {
                    break 'chunks;
                };

                samples.push((pos, len));
                pos += u64::from(len);
                sample += 1;
            }

            chunk += 1;
        }

        if sample < total {
            warn!(
                "sample tables cover {} of {} samples, ignoring the remainder",
                sample, total
            );
        }

        SampleMap { samples }
    }

    /// Position and length of sample `index`.
    pub(crate) fn get(&self, index: usize) -> Option<(u64, u32)> {
        self.samples.get(index).copied()
    }

    /// Number of mapped samples.
    pub(crate) fn len(&self) -> usize {
        self.samples.len()
    }
}

#[cfg(test)]
mod tests {
    use super::SampleMap;
    use crate::atoms::stco::StcoAtom;
    use crate::atoms::stsc::{StscAtom, StscEntry};
    use crate::atoms::stsd::StsdAtom;
    use crate::atoms::stsz::{SampleSize, StszAtom};
    use crate::atoms::stts::SttsAtom;
    use crate::atoms::StblAtom;

    fn stbl(offsets: &[u64], runs: &[(u32, u32)], sizes: SampleSize, total: u32) -> StblAtom {
        StblAtom {
            stsd: StsdAtom { entries: Vec::new() },
            stts: SttsAtom { entries: Vec::new(), total_duration: 0 },
            stsc: StscAtom {
                entries: runs
                    .iter()
                    .map(|&(first_chunk, samples_per_chunk)| StscEntry {
                        first_chunk,
                        samples_per_chunk,
                    })
                    .collect(),
            },
            stsz: StszAtom { sample_count: total, sample_sizes: sizes },
            stco: Some(StcoAtom { offsets: offsets.to_vec() }),
            co64: None,
            stss: None,
        }
    }

    fn collect(map: &SampleMap) -> Vec<(u64, u32)> {
        (0..map.len()).filter_map(|i| map.get(i)).collect()
    }

    #[test]
    fn map_is_deterministic_over_repeated_builds() {
        // 100 samples of 100 bytes, 4 chunks of 25 samples.
        let offsets = [1000u64, 5000, 9000, 13000];
        let tables = stbl(&offsets, &[(0, 25)], SampleSize::Constant(100), 100);

        let first = collect(&SampleMap::build(&tables));
        assert_eq!(first.len(), 100);
        assert_eq!(first[0], (1000, 100));
        assert_eq!(first[24], (1000 + 24 * 100, 100));
        assert_eq!(first[25], (5000, 100));
        assert_eq!(first[99], (13000 + 24 * 100, 100));

        for _ in 0..3 {
            assert_eq!(collect(&SampleMap::build(&tables)), first);
        }
    }

    #[test]
    fn last_run_extends_over_remaining_chunks() {
        // First chunk holds 2 samples, every later chunk holds 3.
        let offsets = [100u64, 200, 300];
        let tables = stbl(&offsets, &[(0, 2), (1, 3)], SampleSize::Variable(vec![10; 8]), 8);

        let map = collect(&SampleMap::build(&tables));
        assert_eq!(map.len(), 8);
        assert_eq!(map[0], (100, 10));
        assert_eq!(map[1], (110, 10));
        assert_eq!(map[2], (200, 10));
        assert_eq!(map[5], (300, 10));
        assert_eq!(map[7], (320, 10));
    }

    #[test]
    fn truncated_chunk_table_ends_map_early() {
        // The size table declares 10 samples but only one chunk of 5 exists.
        let tables = stbl(&[100u64], &[(0, 5)], SampleSize::Constant(4), 10);

        let map = collect(&SampleMap::build(&tables));
        assert_eq!(map.len(), 5);
        assert_eq!(map[4], (116, 4));
    }
}
