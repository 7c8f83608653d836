//! Rectangular minimum-cost assignment.
//!
//! Implements the Hungarian (Kuhn-Munkres) algorithm with row/column potentials,
//! `O(n^2 * m)` for an `n x m` matrix with `n <= m`. Taller matrices are solved
//! on their transpose.

use crate::error::{LesionTrackError, Result};

/// Dense row-major cost matrix.
#[derive(Debug, Clone, PartialEq)]
pub struct CostMatrix {
    rows: usize,
    cols: usize,
    data: Vec<f64>,
}

impl CostMatrix {
    /// Build a matrix by evaluating `cost(row, col)` for every cell.
    ///
    /// # Example
    ///
    /// ```
    /// use lesion_track::assignment::CostMatrix;
    ///
    /// let matrix = CostMatrix::from_fn(2, 3, |r, c| (r * 3 + c) as f64);
    /// assert_eq!(matrix.get(1, 2), 5.0);
    /// ```
    pub fn from_fn<F>(rows: usize, cols: usize, mut cost: F) -> Self
    where
        F: FnMut(usize, usize) -> f64,
    {
        let mut data = Vec::with_capacity(rows * cols);
        for r in 0..rows {
            for c in 0..cols {
                data.push(cost(r, c));
            }
        }
        Self { rows, cols, data }
    }

    /// Build a matrix from nested rows.
    ///
    /// # Errors
    ///
    /// Returns an error if the rows have different lengths.
    pub fn from_rows(rows: &[Vec<f64>]) -> Result<Self> {
        let cols = rows.first().map_or(0, Vec::len);
        if let Some(bad) = rows.iter().position(|row| row.len() != cols) {
            return Err(LesionTrackError::InvalidGeometry(format!(
                "Cost matrix row {} has {} entries, expected {}",
                bad,
                rows[bad].len(),
                cols
            )));
        }
        Ok(Self {
            rows: rows.len(),
            cols,
            data: rows.iter().flatten().copied().collect(),
        })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn is_empty(&self) -> bool {
        self.rows == 0 || self.cols == 0
    }

    /// Cost at `(row, col)`.
    ///
    /// # Panics
    ///
    /// Panics if the index is out of bounds.
    pub fn get(&self, row: usize, col: usize) -> f64 {
        assert!(row < self.rows && col < self.cols, "cost matrix index out of bounds");
        self.data[row * self.cols + col]
    }

    /// Reject NaN and infinite costs.
    pub fn validate(&self) -> Result<()> {
        if let Some(idx) = self.data.iter().position(|v| !v.is_finite()) {
            return Err(LesionTrackError::InvalidGeometry(format!(
                "Non-finite cost {} at ({}, {})",
                self.data[idx],
                idx / self.cols,
                idx % self.cols
            )));
        }
        Ok(())
    }
}

/// A partial bijection between row and column positions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    row_to_col: Vec<Option<usize>>,
    col_to_row: Vec<Option<usize>>,
}

impl Assignment {
    fn empty(rows: usize, cols: usize) -> Self {
        Self {
            row_to_col: vec![None; rows],
            col_to_row: vec![None; cols],
        }
    }

    fn assign(&mut self, row: usize, col: usize) {
        self.row_to_col[row] = Some(col);
        self.col_to_row[col] = Some(row);
    }

    /// Column assigned to `row`.
    pub fn col_for_row(&self, row: usize) -> Option<usize> {
        self.row_to_col.get(row).copied().flatten()
    }

    /// Row assigned to `col`.
    pub fn row_for_col(&self, col: usize) -> Option<usize> {
        self.col_to_row.get(col).copied().flatten()
    }

    /// Assigned `(row, col)` pairs in row order.
    pub fn pairs(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.row_to_col
            .iter()
            .enumerate()
            .filter_map(|(row, col)| col.map(|c| (row, c)))
    }

    /// Number of assigned pairs.
    pub fn len(&self) -> usize {
        self.pairs().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Rows left without a column.
    pub fn unassigned_rows(&self) -> Vec<usize> {
        self.row_to_col
            .iter()
            .enumerate()
            .filter(|(_, col)| col.is_none())
            .map(|(row, _)| row)
            .collect()
    }

    /// Columns left without a row.
    pub fn unassigned_cols(&self) -> Vec<usize> {
        self.col_to_row
            .iter()
            .enumerate()
            .filter(|(_, row)| row.is_none())
            .map(|(col, _)| col)
            .collect()
    }

    /// Sum of `matrix` over the assigned cells.
    pub fn total_cost(&self, matrix: &CostMatrix) -> f64 {
        self.pairs().map(|(r, c)| matrix.get(r, c)).sum()
    }
}

/// Solve the rectangular assignment problem on `matrix`.
///
/// Exactly `min(rows, cols)` pairs are assigned and their summed cost is minimal
/// over all such pairings.
///
/// # Errors
///
/// Returns an error if any cost is NaN or infinite.
///
/// # Example
///
/// ```
/// use lesion_track::assignment::{solve_assignment, CostMatrix};
///
/// let matrix = CostMatrix::from_rows(&[
///     vec![4.0, 1.0, 3.0],
///     vec![2.0, 0.0, 5.0],
///     vec![3.0, 2.0, 2.0],
/// ]).unwrap();
/// let assignment = solve_assignment(&matrix).unwrap();
/// assert_eq!(assignment.total_cost(&matrix), 5.0);
/// ```
pub fn solve_assignment(matrix: &CostMatrix) -> Result<Assignment> {
    matrix.validate()?;

    let mut assignment = Assignment::empty(matrix.rows, matrix.cols);
    if matrix.is_empty() {
        return Ok(assignment);
    }

    if matrix.rows <= matrix.cols {
        let cols = hungarian(matrix.rows, matrix.cols, |r, c| matrix.get(r, c));
        for (row, col) in cols.into_iter().enumerate() {
            assignment.assign(row, col);
        }
    } else {
        let rows = hungarian(matrix.cols, matrix.rows, |c, r| matrix.get(r, c));
        for (col, row) in rows.into_iter().enumerate() {
            assignment.assign(row, col);
        }
    }

    Ok(assignment)
}

/// Shortest augmenting path Hungarian algorithm for `n <= m`.
///
/// Returns the column chosen for each of the `n` rows. Indices inside are
/// 1-based with slot 0 used as the virtual root.
fn hungarian<F>(n: usize, m: usize, cost: F) -> Vec<usize>
where
    F: Fn(usize, usize) -> f64,
{
    debug_assert!(n <= m);

    let mut u = vec![0.0_f64; n + 1];
    let mut v = vec![0.0_f64; m + 1];
    // p[j]: row matched to column j (0 = free)
    let mut p = vec![0_usize; m + 1];
    let mut way = vec![0_usize; m + 1];

    for i in 1..=n {
        p[0] = i;
        let mut j0 = 0;
        let mut minv = vec![f64::INFINITY; m + 1];
        let mut used = vec![false; m + 1];

        loop {
            used[j0] = true;
            let i0 = p[j0];
            let mut delta = f64::INFINITY;
            let mut j1 = 0;

            for j in 1..=m {
                if used[j] {
                    continue;
                }
                let reduced = cost(i0 - 1, j - 1) - u[i0] - v[j];
                if reduced < minv[j] {
                    minv[j] = reduced;
                    way[j] = j0;
                }
                if minv[j] < delta {
                    delta = minv[j];
                    j1 = j;
                }
            }

            for j in 0..=m {
                if used[j] {
                    u[p[j]] += delta;
                    v[j] -= delta;
                } else {
                    minv[j] -= delta;
                }
            }

            j0 = j1;
            if p[j0] == 0 {
                break;
            }
        }

        // Flip the augmenting path back to the root.
        loop {
            let j1 = way[j0];
            p[j0] = p[j1];
            j0 = j1;
            if j0 == 0 {
                break;
            }
        }
    }

    let mut row_to_col = vec![0_usize; n];
    for j in 1..=m {
        if p[j] != 0 {
            row_to_col[p[j] - 1] = j - 1;
        }
    }
    row_to_col
}
