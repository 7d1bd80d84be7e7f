//! Symbol-to-benchmark alignment.
//!
//! Critical: no interpolation and no forward-fill. A symbol bar lands in a
//! slot only when its timestamp matches the benchmark exactly; everything
//! else is dropped and reported.

use ashare_types::Bar;

/// Result of aligning one symbol series to the benchmark timeline.
#[derive(Debug)]
pub struct AlignmentOutcome {
    /// One slot per benchmark timestamp; `None` where the symbol has no bar.
    pub slots: Vec<Option<Bar>>,
    /// Bars whose timestamps were not on the timeline.
    pub dropped: usize,
}

/// Walks the benchmark timestamps and the (sorted) symbol bars together,
/// placing exact matches and counting the rest as dropped.
///
/// Input bars may arrive unsorted; they are sorted by timestamp first.
/// Duplicate timestamps keep the last bar seen, mirroring how a data vendor
/// revision overwrites the earlier print.
#[must_use]
pub fn align_to_timeline(timeline: &[i64], mut bars: Vec<Bar>) -> AlignmentOutcome {
    bars.sort_by_key(|b| b.timestamp_ns);

    let mut slots: Vec<Option<Bar>> = vec![None; timeline.len()];
    let mut dropped = 0usize;
    let mut cursor = 0usize;

    for bar in bars {
        while cursor < timeline.len() && timeline[cursor] < bar.timestamp_ns {
            cursor += 1;
        }
        if cursor < timeline.len() && timeline[cursor] == bar.timestamp_ns {
            if slots[cursor].is_some() {
                dropped += 1;
            }
            slots[cursor] = Some(bar);
        } else {
            dropped += 1;
        }
    }

    AlignmentOutcome { slots, dropped }
}
