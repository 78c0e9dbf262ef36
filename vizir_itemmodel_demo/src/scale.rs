// Copyright 2025 the VizIR Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Scales mapping array positions and values into screen coordinates.

/// A linear mapping from a continuous domain to a continuous range.
#[derive(Clone, Copy, Debug)]
pub(crate) struct ScaleLinear {
    domain: (f64, f64),
    range: (f64, f64),
}

impl ScaleLinear {
    pub(crate) fn new(domain: (f64, f64), range: (f64, f64)) -> Self {
        Self { domain, range }
    }

    /// Maps a value from domain space into range space.
    pub(crate) fn map(&self, x: f64) -> f64 {
        let (d0, d1) = self.domain;
        let (r0, r1) = self.range;
        let denom = d1 - d0;
        if denom == 0.0 {
            return r0;
        }
        r0 + (x - d0) / denom * (r1 - r0)
    }
}

/// Splits a span into `count` equal slots separated by gaps.
///
/// Gaps are given as fractions of a slot: `gap` between neighbours and `margin` at each end.
#[derive(Clone, Copy, Debug)]
pub(crate) struct ScaleBand {
    start: f64,
    step: f64,
    width: f64,
}

impl ScaleBand {
    pub(crate) fn new(span: (f64, f64), count: usize, gap: f64, margin: f64) -> Self {
        let (gap, margin) = (gap.max(0.0), margin.max(0.0));
        let n = f64::from(u32::try_from(count).unwrap_or(u32::MAX));
        let units = n + gap * (n - 1.0).max(0.0) + 2.0 * margin;
        let width = if count == 0 {
            0.0
        } else {
            (span.1 - span.0).abs() / units
        };
        Self {
            start: span.0.min(span.1) + width * margin,
            step: width * (1.0 + gap),
            width,
        }
    }

    /// Returns the `(start, end)` of slot `index`.
    pub(crate) fn slot(&self, index: usize) -> (f64, f64) {
        let x0 = self.start + self.step * f64::from(u32::try_from(index).unwrap_or(u32::MAX));
        (x0, x0 + self.width)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slots_tile_the_span() {
        let band = ScaleBand::new((0.0, 100.0), 4, 0.0, 0.0);
        assert_eq!(band.slot(3), (75.0, 100.0));
        let padded = ScaleBand::new((0.0, 120.0), 2, 1.0, 0.5);
        assert_eq!(padded.slot(0), (15.0, 45.0));
        assert_eq!(padded.slot(1), (75.0, 105.0));
        assert_eq!(ScaleBand::new((0.0, 100.0), 0, 0.2, 0.1).slot(0), (0.0, 0.0));
    }

    #[test]
    fn linear_maps_and_inverts_ranges() {
        let y = ScaleLinear::new((0.0, 10.0), (200.0, 0.0));
        assert_eq!(y.map(0.0), 200.0);
        assert_eq!(y.map(5.0), 100.0);
        assert_eq!(ScaleLinear::new((1.0, 1.0), (3.0, 9.0)).map(7.0), 3.0);
    }
}
