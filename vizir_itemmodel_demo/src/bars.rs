// Copyright 2025 the VizIR Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Grouped bar layout of a value array.

use kurbo::{Rect, Size};
use peniko::Color;
use vizir_array::ValueArray;

use crate::scale::{ScaleBand, ScaleLinear};

const PALETTE: [Color; 4] = [
    Color::from_rgba8(0x4c, 0x78, 0xa8, 0xff),
    Color::from_rgba8(0xf5, 0x85, 0x18, 0xff),
    Color::from_rgba8(0xe4, 0x57, 0x56, 0xff),
    Color::from_rgba8(0x72, 0xb7, 0xb2, 0xff),
];

/// One laid-out bar.
#[derive(Clone, Debug)]
pub(crate) struct Bar {
    pub(crate) row: usize,
    pub(crate) column: usize,
    pub(crate) rect: Rect,
    pub(crate) fill: Color,
}

/// Lays out one group per array row and one bar per column inside each group.
///
/// The value axis always includes zero; negative values hang below the baseline.
pub(crate) fn layout(array: &ValueArray, size: Size) -> Vec<Bar> {
    let (rows, columns) = array.dimensions();
    let (min, max) = array.value_limits(0..rows, 0..columns);
    let y = ScaleLinear::new((min, max), (size.height, 0.0));
    let groups = ScaleBand::new((0.0, size.width), rows, 0.2, 0.1);
    let baseline = y.map(0.0);

    let mut out = Vec::with_capacity(rows * columns);
    for (r, row) in array.rows().iter().enumerate() {
        let bars = ScaleBand::new(groups.slot(r), columns, 0.05, 0.0);
        for (c, item) in row.iter().enumerate() {
            let (x0, x1) = bars.slot(c);
            let top = y.map(item.value);
            out.push(Bar {
                row: r,
                column: c,
                rect: Rect::new(x0, top.min(baseline), x1, top.max(baseline)),
                fill: PALETTE[c % PALETTE.len()],
            });
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use vizir_array::ValueItem;

    use super::*;

    #[test]
    fn bars_grow_from_the_zero_baseline() {
        let array = ValueArray::from_rows(vec![vec![ValueItem::new(10.0), ValueItem::new(-10.0)]])
            .unwrap();
        let bars = layout(&array, Size::new(100.0, 150.0));
        assert_eq!(bars.len(), 2);
        let baseline = 75.0;
        assert_eq!(bars[0].rect.y0, 0.0);
        assert_eq!(bars[0].rect.y1, baseline);
        assert_eq!(bars[1].rect.y0, baseline);
        assert_eq!(bars[1].rect.y1, 150.0);
        assert!(bars[0].rect.x1 <= bars[1].rect.x0, "bars do not overlap");
        assert_eq!((bars[1].row, bars[1].column), (0, 1));
    }

    #[test]
    fn empty_arrays_lay_out_nothing() {
        assert!(layout(&ValueArray::new(), Size::new(10.0, 10.0)).is_empty(), "no bars");
    }
}
