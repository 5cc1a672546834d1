//! N-Queens problem test fixtures.
//!
//! Places N queens on an N×N board so that no two queens share a row or a
//! diagonal. Each queen is fixed to its column; `row` is the planning
//! variable.
//!
//! # Example
//!
//! ```
//! use searchforge_test::nqueens::{calculate_conflicts, NQueensSolution};
//! use searchforge_core::SimpleScore;
//!
//! let solution = NQueensSolution::with_rows(&[1, 3, 0, 2]);
//! assert_eq!(calculate_conflicts(&solution), SimpleScore::of(0));
//! ```

use searchforge_core::domain::{
    EntityDescriptor, PlanningSolution, SolutionDescriptor, VariableDescriptor,
};
use searchforge_core::score::SimpleScore;

/// A queen entity in the N-Queens problem.
///
/// - `id`: planning id (the column index)
/// - `column`: fixed column on the board
/// - `row`: planning variable, `None` if unassigned
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Queen {
    pub id: i64,
    pub column: i64,
    pub row: Option<i64>,
}

impl Queen {
    pub fn new(id: i64, column: i64, row: Option<i64>) -> Self {
        Self { id, column, row }
    }

    pub fn assigned(id: i64, column: i64, row: i64) -> Self {
        Self::new(id, column, Some(row))
    }

    pub fn unassigned(id: i64, column: i64) -> Self {
        Self::new(id, column, None)
    }
}

/// N-Queens problem solution.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NQueensSolution {
    pub n: usize,
    pub queens: Vec<Queen>,
    pub score: Option<SimpleScore>,
}

impl NQueensSolution {
    /// Creates a solution with n queens and no rows assigned.
    pub fn uninitialized(n: usize) -> Self {
        let queens = (0..n)
            .map(|i| Queen::unassigned(i as i64, i as i64))
            .collect();
        Self {
            n,
            queens,
            score: None,
        }
    }

    /// Creates a solution with queens at the given rows, one per column.
    pub fn with_rows(rows: &[i64]) -> Self {
        let queens = rows
            .iter()
            .enumerate()
            .map(|(i, &row)| Queen::assigned(i as i64, i as i64, row))
            .collect();
        Self {
            n: rows.len(),
            queens,
            score: None,
        }
    }

    pub fn rows(&self) -> Vec<Option<i64>> {
        self.queens.iter().map(|q| q.row).collect()
    }
}

impl PlanningSolution for NQueensSolution {
    type Score = SimpleScore;

    fn score(&self) -> Option<Self::Score> {
        self.score
    }

    fn set_score(&mut self, score: Option<Self::Score>) {
        self.score = score;
    }

    fn is_initialized(&self) -> bool {
        self.queens.iter().all(|q| q.row.is_some())
    }
}

pub fn queen_count(s: &NQueensSolution) -> usize {
    s.queens.len()
}

/// Typed getter for the `row` planning variable.
pub fn get_queen_row(s: &NQueensSolution, idx: usize) -> Option<i64> {
    s.queens.get(idx).and_then(|q| q.row)
}

/// Typed setter for the `row` planning variable.
pub fn set_queen_row(s: &mut NQueensSolution, idx: usize, v: Option<i64>) {
    if let Some(queen) = s.queens.get_mut(idx) {
        queen.row = v;
    }
}

/// The row value range: `0..n`.
pub fn row_range(s: &NQueensSolution) -> Vec<i64> {
    (0..s.n as i64).collect()
}

/// Counts row and diagonal conflicts between all pairs of queens.
///
/// Returns a negative score where 0 means no conflicts (optimal).
pub fn calculate_conflicts(solution: &NQueensSolution) -> SimpleScore {
    let mut conflicts = 0i64;
    let queens = &solution.queens;

    for i in 0..queens.len() {
        for j in (i + 1)..queens.len() {
            if let (Some(row_i), Some(row_j)) = (queens[i].row, queens[j].row) {
                if row_i == row_j {
                    conflicts += 1;
                }
                let col_diff = (queens[j].column - queens[i].column).abs();
                if (row_i - row_j).abs() == col_diff {
                    conflicts += 1;
                }
            }
        }
    }

    SimpleScore::of(-conflicts)
}

pub fn create_nqueens_descriptor() -> SolutionDescriptor<NQueensSolution> {
    SolutionDescriptor::new("NQueensSolution").with_entity(
        EntityDescriptor::new("Queen", queen_count)
            .with_variable(VariableDescriptor::genuine("row"))
            .with_planning_id(|s, i| s.queens[i].id as u64),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_solution_creation() {
        let s1 = NQueensSolution::uninitialized(4);
        assert_eq!(s1.queens.len(), 4);
        assert!(!s1.is_initialized());

        let s2 = NQueensSolution::with_rows(&[0, 2, 1, 3]);
        assert_eq!(s2.rows(), vec![Some(0), Some(2), Some(1), Some(3)]);
        assert_eq!(row_range(&s2), vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_conflict_calculation() {
        assert_eq!(
            calculate_conflicts(&NQueensSolution::with_rows(&[1, 3, 0, 2])),
            SimpleScore::of(0)
        );
        // Same row: one conflict.
        assert_eq!(
            calculate_conflicts(&NQueensSolution::with_rows(&[0, 0, 3, 1])),
            SimpleScore::of(-1)
        );
        // All on row 0: six row pairs.
        assert_eq!(
            calculate_conflicts(&NQueensSolution::with_rows(&[0, 0, 0, 0])),
            SimpleScore::of(-6)
        );
    }

    #[test]
    fn test_descriptor_lookup() {
        let descriptor = create_nqueens_descriptor();
        let solution = NQueensSolution::with_rows(&[0, 1, 2]);
        assert_eq!(descriptor.lookup_entity(&solution, 0, 2), Some(2));
        assert!(descriptor.validate().unwrap().is_empty());
    }
}
