//! Node split strategies.
//!
//! A split receives the boxes of an overflowing node, the staged new entry
//! last, and partitions their indices into two groups. Only the quadratic
//! algorithm is implemented; the R-star-like variant reuses it.

use std::cmp::Ordering;

use crate::bounding_box::BoundingBox;

use super::rtree_config::TreeVariant;
use super::rtree_types::{SpatialError, SpatialResult};

/// Index partition produced by a split, in assignment order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitGroups {
    pub first: Vec<usize>,
    pub second: Vec<usize>,
}

/// Dispatches to the split algorithm of `variant`.
pub fn split_groups(
    variant: TreeVariant,
    boxes: &[BoundingBox],
    min_fill: usize,
) -> SpatialResult<SplitGroups> {
    match variant {
        TreeVariant::Quadratic | TreeVariant::RStarLike => quadratic_split(boxes, min_fill),
        TreeVariant::Linear | TreeVariant::Exponential => {
            log::warn!("split requested for unsupported variant {:?}", variant);
            Err(SpatialError::Unsupported(format!(
                "{:?} split is not implemented",
                variant
            )))
        }
    }
}

/// Picks the pair of entries that would waste the most area if grouped
/// together: `area(union) - area(a) - area(b)`. The first maximum wins.
pub fn pick_seeds(boxes: &[BoundingBox]) -> (usize, usize) {
    let mut inefficiency = f64::NEG_INFINITY;
    let mut seeds = (0, 1);

    for i in 0..boxes.len() {
        for j in i + 1..boxes.len() {
            let waste = boxes[i].merge(&boxes[j]).area() - boxes[i].area() - boxes[j].area();
            if waste > inefficiency {
                inefficiency = waste;
                seeds = (i, j);
            }
        }
    }
    seeds
}

/// Guttman's quadratic split.
///
/// Both groups end with at least `min_fill` entries as long as
/// `2 * min_fill <= boxes.len()`, which the tree configuration guarantees.
pub fn quadratic_split(boxes: &[BoundingBox], min_fill: usize) -> SpatialResult<SplitGroups> {
    let total = boxes.len();
    if total < 2 {
        return Err(SpatialError::InvalidOperation(format!(
            "cannot split {} entries",
            total
        )));
    }

    let (seed1, seed2) = pick_seeds(boxes);
    let mut placed = vec![false; total];
    placed[seed1] = true;
    placed[seed2] = true;

    let mut groups = SplitGroups {
        first: vec![seed1],
        second: vec![seed2],
    };
    let mut mbr1 = boxes[seed1].clone();
    let mut mbr2 = boxes[seed2].clone();
    let mut remaining = total - 2;

    while remaining > 0 {
        if min_fill.saturating_sub(groups.first.len()) == remaining {
            groups.first.extend((0..total).filter(|&i| !placed[i]));
            break;
        }
        if min_fill.saturating_sub(groups.second.len()) == remaining {
            groups.second.extend((0..total).filter(|&i| !placed[i]));
            break;
        }

        // Entry with the strongest preference for one group
        let mut best: Option<(usize, f64, f64)> = None;
        let mut best_diff = f64::NEG_INFINITY;
        for i in (0..total).filter(|&i| !placed[i]) {
            let cost1 = mbr1.enlargement(&boxes[i]);
            let cost2 = mbr2.enlargement(&boxes[i]);
            let diff = (cost1 - cost2).abs();
            if best.is_none() || diff > best_diff {
                best_diff = diff;
                best = Some((i, cost1, cost2));
            }
        }
        let Some((selected, cost1, cost2)) = best else {
            break;
        };

        let to_first = match cost1.partial_cmp(&cost2) {
            Some(Ordering::Less) => true,
            Some(Ordering::Greater) => false,
            _ => match mbr1.area().partial_cmp(&mbr2.area()) {
                Some(Ordering::Less) => true,
                Some(Ordering::Greater) => false,
                _ => groups.first.len() <= groups.second.len(),
            },
        };

        placed[selected] = true;
        remaining -= 1;
        if to_first {
            groups.first.push(selected);
            mbr1.expand(&boxes[selected]);
        } else {
            groups.second.push(selected);
            mbr2.expand(&boxes[selected]);
        }
    }

    Ok(groups)
}

/// Moves `items` into the two groups, keeping each group's assignment order.
pub(crate) fn distribute<T>(items: Vec<T>, groups: &SplitGroups) -> (Vec<T>, Vec<T>) {
    let mut slots: Vec<Option<T>> = items.into_iter().map(Some).collect();
    let first = groups
        .first
        .iter()
        .filter_map(|&i| slots.get_mut(i).and_then(Option::take))
        .collect();
    let second = groups
        .second
        .iter()
        .filter_map(|&i| slots.get_mut(i).and_then(Option::take))
        .collect();
    (first, second)
}
