use std::ops::RangeInclusive;

/// Vertical traversal mode for one pass of a physics stage.
///
/// `Elementwise` formulas are independent per cell, but levels are still
/// visited in ascending order within a column so that per-column folds
/// (e.g. the `kbm`/`kmax` threshold scans, where the last satisfying level
/// must win) keep their in-order update semantics. `Forward` additionally
/// permits the formula at level `k` to read results written at `k - 1`
/// earlier in the same pass; `Backward` is the mirror, reading from `k + 1`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Sweep {
    Elementwise,
    Forward,
    Backward,
}

/// Runs `formula(column, level)` over every column for the given level
/// range. Columns are mutually independent in every mode; the level order
/// within a column is the mode's contract and is never reordered.
pub fn apply<F>(sweep: Sweep, num_columns: usize, levels: RangeInclusive<usize>, mut formula: F)
where
    F: FnMut(usize, usize),
{
    let first_level = *levels.start();
    let last_level = *levels.end();

    assert!(
        first_level >= 1,
        "Level range must start at 1 or above, got {}.",
        first_level
    );
    assert!(
        first_level <= last_level,
        "Empty level range {}..={} passed to stencil pass.",
        first_level,
        last_level
    );

    for column_idx in 1..=num_columns {
        match sweep {
            Sweep::Elementwise | Sweep::Forward => {
                for level_idx in first_level..=last_level {
                    formula(column_idx, level_idx);
                }
            }
            Sweep::Backward => {
                for level_idx in (first_level..=last_level).rev() {
                    formula(column_idx, level_idx);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::Field2D;

    #[test]
    fn elementwise_visits_every_cell_once() {
        let mut visits = Field2D::<i32>::new(3, 4);
        apply(Sweep::Elementwise, 3, 1..=4, |i, k| {
            visits.set(i, k, visits.get(i, k) + 1);
        });
        assert!(visits.iter().all(|&v| v == 1));
    }

    #[test]
    fn forward_sweep_sees_lower_level_results() {
        // Running sum down each column only comes out right if level k - 1
        // was written before level k.
        let mut sum = Field2D::<f64>::new(2, 5);
        apply(Sweep::Elementwise, 2, 1..=5, |i, k| {
            sum.set(i, k, k as f64);
        });
        apply(Sweep::Forward, 2, 2..=5, |i, k| {
            sum.set(i, k, sum.get(i, k) + sum.get_offset(i, k, -1));
        });
        assert_eq!(sum.get(1, 5), 15.0);
        assert_eq!(sum.get(2, 5), 15.0);
        assert_eq!(sum.get(1, 3), 6.0);
    }

    #[test]
    fn backward_sweep_sees_upper_level_results() {
        let mut sum = Field2D::<f64>::new(1, 5);
        apply(Sweep::Elementwise, 1, 1..=5, |i, k| {
            sum.set(i, k, k as f64);
        });
        apply(Sweep::Backward, 1, 1..=4, |i, k| {
            sum.set(i, k, sum.get(i, k) + sum.get_offset(i, k, 1));
        });
        assert_eq!(sum.get(1, 1), 15.0);
        assert_eq!(sum.get(1, 4), 9.0);
    }

    #[test]
    fn backward_order_is_descending() {
        let mut seen = Vec::new();
        apply(Sweep::Backward, 1, 1..=4, |_, k| seen.push(k));
        assert_eq!(seen, vec![4, 3, 2, 1]);
    }

    #[test]
    #[should_panic]
    fn level_range_starting_at_zero_is_rejected() {
        apply(Sweep::Elementwise, 1, 0..=3, |_, _| {});
    }
}
