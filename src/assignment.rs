//! Rectangular linear sum assignment.
//!
//! Given an `m x n` cost matrix, [`linear_sum_assignment`] selects the
//! `min(m, n)` disjoint (row, column) pairs of minimum total cost by
//! successive shortest augmenting paths under reduced costs, maintaining a
//! dual potential per row and column (the Jonker-Volgenant formulation).
//! Entries equal to `+inf` mark forbidden pairings.

use log::trace;
use nalgebra::{Dim, Matrix, RawStorage, Scalar};
use num_traits::Float;

use crate::error::{Error, Result};

/// Sentinel for an unassigned row or column.
const NONE: usize = usize::MAX;

/// A set of disjoint (row, column) pairs, sorted by row.
///
/// Reusable across solves: pass `&mut` to [`linear_sum_assignment`] and the
/// previous contents are replaced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Assignment {
    rows: Vec<usize>,
    cols: Vec<usize>,
}

impl Assignment {
    /// Number of assigned pairs, `min(m, n)` after a successful solve.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// The assigned (row, column) pairs in ascending row order.
    pub fn pairs(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.rows.iter().copied().zip(self.cols.iter().copied())
    }

    /// Column assigned to `row`, if any.
    pub fn column_of(&self, row: usize) -> Option<usize> {
        self.rows.binary_search(&row).ok().map(|k| self.cols[k])
    }

    /// Sum of the cost entries selected by this assignment.
    pub fn total_cost<T, R, C, S>(&self, costs: &Matrix<T, R, C, S>) -> T
    where
        T: Scalar + Float,
        R: Dim,
        C: Dim,
        S: RawStorage<T, R, C>,
    {
        self.pairs()
            .map(|pair| costs[pair])
            .fold(T::zero(), |acc, c| acc + c)
    }

    fn load(&mut self, col4row: &[usize], transposed: bool) {
        self.rows.clear();
        self.cols.clear();
        if transposed {
            // the solved rows were the original columns; re-sort by row
            let mut order: Vec<usize> = (0..col4row.len()).collect();
            order.sort_unstable_by_key(|&k| col4row[k]);
            for k in order {
                self.rows.push(col4row[k]);
                self.cols.push(k);
            }
        } else {
            for (i, &j) in col4row.iter().enumerate() {
                self.rows.push(i);
                self.cols.push(j);
            }
        }
    }
}

/// Solves the rectangular linear sum assignment problem for `costs`.
///
/// On success `out` holds `min(m, n)` disjoint pairs minimizing the total
/// cost. `+inf` entries are never selected; if every complete assignment
/// would need one, the solve fails with [`Error::Infeasible`]. Matrices with
/// a zero dimension or with NaN / `-inf` entries are rejected before any
/// algorithmic work. The result is deterministic: ties between equal-cost
/// optima are broken by a fixed column scan order, so a constant matrix
/// yields the identity assignment.
pub fn linear_sum_assignment<T, R, C, S>(
    costs: &Matrix<T, R, C, S>,
    out: &mut Assignment,
) -> Result<()>
where
    T: Scalar + Float,
    R: Dim,
    C: Dim,
    S: RawStorage<T, R, C>,
{
    out.rows.clear();
    out.cols.clear();

    let (rows, cols) = costs.shape();
    if rows == 0 || cols == 0 {
        return Err(Error::EmptyCostMatrix { rows, cols });
    }
    if costs
        .iter()
        .any(|&c| c.is_nan() || c == T::neg_infinity())
    {
        return Err(Error::InvalidCost);
    }

    // solve tall matrices on the transpose so that nr <= nc
    let transposed = cols < rows;
    let (nr, nc) = if transposed { (cols, rows) } else { (rows, cols) };
    let at = |i: usize, j: usize| {
        if transposed {
            costs[(j, i)]
        } else {
            costs[(i, j)]
        }
    };

    let mut u = vec![T::zero(); nr];
    let mut v = vec![T::zero(); nc];
    let mut shortest_path_costs = vec![T::infinity(); nc];
    let mut path = vec![NONE; nc];
    let mut col4row = vec![NONE; nr];
    let mut row4col = vec![NONE; nc];
    let mut sr = vec![false; nr];
    let mut sc = vec![false; nc];
    let mut remaining = vec![0usize; nc];

    for cur_row in 0..nr {
        let Some((sink, min_val)) = augmenting_path(
            nc,
            &at,
            &u,
            &v,
            &mut path,
            &row4col,
            &mut shortest_path_costs,
            cur_row,
            &mut sr,
            &mut sc,
            &mut remaining,
        ) else {
            return Err(Error::Infeasible);
        };
        trace!("augmented row {cur_row} into column {sink} at path cost {min_val:?}");

        // update dual variables
        u[cur_row] = u[cur_row] + min_val;
        for i in 0..nr {
            if sr[i] && i != cur_row {
                let j = col4row[i];
                if j == NONE {
                    return Err(Error::Numerical(
                        "dual update reached an unassigned row".into(),
                    ));
                }
                u[i] = u[i] + min_val - shortest_path_costs[j];
            }
        }
        for j in 0..nc {
            if sc[j] {
                v[j] = v[j] - (min_val - shortest_path_costs[j]);
            }
        }

        // augment along the recorded path
        let mut j = sink;
        loop {
            let i = path[j];
            if i == NONE {
                return Err(Error::Numerical(
                    "augmenting path lost its backtrack".into(),
                ));
            }
            row4col[j] = i;
            std::mem::swap(&mut col4row[i], &mut j);
            if i == cur_row {
                break;
            }
        }
    }

    out.load(&col4row, transposed);
    Ok(())
}

/// Dijkstra-like scan for the shortest augmenting path from `start` under
/// reduced costs. Returns the sink column and the path cost, or `None` when
/// every reachable column is forbidden.
#[allow(clippy::too_many_arguments)]
fn augmenting_path<T, F>(
    nc: usize,
    cost: &F,
    u: &[T],
    v: &[T],
    path: &mut [usize],
    row4col: &[usize],
    shortest_path_costs: &mut [T],
    start: usize,
    sr: &mut [bool],
    sc: &mut [bool],
    remaining: &mut [usize],
) -> Option<(usize, T)>
where
    T: Scalar + Float,
    F: Fn(usize, usize) -> T,
{
    let mut min_val = T::zero();
    let mut num_remaining = nc;
    for (it, slot) in remaining.iter_mut().enumerate() {
        // reverse scan order, so a constant cost matrix resolves to the
        // identity assignment
        *slot = nc - it - 1;
    }

    sr.fill(false);
    sc.fill(false);
    shortest_path_costs.fill(T::infinity());

    let mut i = start;
    loop {
        let mut index = None;
        let mut lowest = T::infinity();
        sr[i] = true;

        for it in 0..num_remaining {
            let j = remaining[it];
            let r = min_val + cost(i, j) - u[i] - v[j];
            if r < shortest_path_costs[j] {
                path[j] = i;
                shortest_path_costs[j] = r;
            }

            // on ties, prefer a column that terminates the path
            if shortest_path_costs[j] < lowest
                || (shortest_path_costs[j] == lowest && row4col[j] == NONE)
            {
                lowest = shortest_path_costs[j];
                index = Some(it);
            }
        }

        min_val = lowest;
        let index = match index {
            Some(index) if min_val.is_finite() => index,
            // the unmatched columns all sit behind forbidden pairings
            _ => return None,
        };

        let j = remaining[index];
        sc[j] = true;
        num_remaining -= 1;
        remaining[index] = remaining[num_remaining];

        if row4col[j] == NONE {
            return Some((j, min_val));
        }
        i = row4col[j];
    }
}
