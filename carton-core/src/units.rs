// Carton
// Copyright (c) 2026 The Project Carton Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The `units` module provides conversion between container-native timestamps
//! and wall-clock seconds.

/// A `TimeBase` is the conversion factor between a timestamp in container
/// ticks and seconds: one tick equals `numer / denom` seconds.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct TimeBase {
    /// The numerator.
    pub numer: u32,
    /// The denominator.
    pub denom: u32,
}

impl TimeBase {
    /// Creates a new `TimeBase`. Panics if either the numerator or denominator
    /// is zero.
    pub fn new(numer: u32, denom: u32) -> Self {
        assert!(numer > 0 && denom > 0, "timebase must be non-zero");
        TimeBase { numer, denom }
    }

    /// Converts a timestamp in ticks into seconds.
    pub fn calc_time(&self, ts: u64) -> f64 {
        ts as f64 * f64::from(self.numer) / f64::from(self.denom)
    }

    /// Converts a time in seconds into a timestamp in ticks, truncating any
    /// fractional tick.
    pub fn calc_timestamp(&self, seconds: f64) -> u64 {
        if seconds <= 0.0 {
            return 0;
        }
        (seconds * f64::from(self.denom) / f64::from(self.numer)) as u64
    }
}

#[cfg(test)]
mod tests {
    use super::TimeBase;

    #[test]
    fn verify_timebase() {
        // 48 kHz track: 48000 ticks is exactly one second.
        let tb = TimeBase::new(1, 48000);
        assert_eq!(tb.calc_time(48000), 1.0);
        assert_eq!(tb.calc_time(24000), 0.5);
        assert_eq!(tb.calc_timestamp(1.0), 48000);
        assert_eq!(tb.calc_timestamp(0.0), 0);
        assert_eq!(tb.calc_timestamp(-1.0), 0);

        // Millisecond timescale.
        let ms = TimeBase::new(1, 1000);
        assert_eq!(ms.calc_time(5000), 5.0);
        assert_eq!(ms.calc_timestamp(2.5), 2500);
    }
}
