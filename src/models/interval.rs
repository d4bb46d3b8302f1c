//! Instrument transposition and tonal pitch classes
//!
//! Tonal pitch classes (tpc) sit on the line of fifths with C at 14:
//! F=13, G=15, Bb=12, F#=20 and so on.

use serde::{Deserialize, Serialize};

pub const TPC_C: i32 = 14;
pub const TPC_MIN: i32 = -1;
pub const TPC_MAX: i32 = 33;
const TPC_F_B: i32 = 6;
const TPC_B_S: i32 = 26;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Interval {
    pub diatonic: i32,
    pub chromatic: i32,
}

impl Interval {
    pub fn new(diatonic: i32, chromatic: i32) -> Self {
        Self { diatonic, chromatic }
    }

    pub fn is_zero(&self) -> bool {
        self.diatonic == 0 && self.chromatic == 0
    }
}

/// Letter step, C=0 .. B=6
pub fn tpc2step(tpc: i32) -> i32 {
    ((tpc - TPC_C) * 4).rem_euclid(7)
}

/// Pitch class, C=0 .. B=11
pub fn tpc2pitch(tpc: i32) -> i32 {
    ((tpc - TPC_C) * 7).rem_euclid(12)
}

/// Transpose a tpc by an interval, spelling the result on the given letter
pub fn transpose_tpc(tpc: i32, interval: Interval, use_double_sharps_flats: bool) -> i32 {
    if interval.is_zero() {
        return tpc;
    }
    let step = (tpc2step(tpc) + interval.diatonic).rem_euclid(7);
    let pitch = (tpc2pitch(tpc) + interval.chromatic).rem_euclid(12);
    let spell = |min: i32, max: i32| (min..=max).find(|&t| tpc2step(t) == step && tpc2pitch(t) == pitch);

    let found = if use_double_sharps_flats {
        spell(TPC_MIN, TPC_MAX)
    } else {
        spell(TPC_F_B, TPC_B_S).or_else(|| spell(TPC_MIN, TPC_MAX))
    };
    found.unwrap_or_else(|| {
        log::debug!("transpose_tpc: no spelling for tpc {} by {:?}", tpc, interval);
        tpc
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tpc_step_and_pitch() {
        assert_eq!(tpc2step(15), 4); // G
        assert_eq!(tpc2pitch(15), 7);
        assert_eq!(tpc2step(12), 6); // Bb
        assert_eq!(tpc2pitch(12), 10);
    }

    #[test]
    fn test_transpose_by_b_flat_instrument() {
        // Bb clarinet sounds a major second lower than written
        let bb = Interval::new(-1, -2);
        assert_eq!(transpose_tpc(TPC_C, bb, true), 12); // C -> Bb
        assert_eq!(transpose_tpc(16, bb, true), TPC_C); // D -> C
    }

    #[test]
    fn test_zero_interval_is_identity() {
        assert_eq!(transpose_tpc(20, Interval::default(), false), 20);
    }
}
