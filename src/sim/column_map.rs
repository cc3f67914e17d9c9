//! Per-lane stack heights
//!
//! `tops[c]` is the row a block falling in column `c` stops against: the
//! topmost occupied row of the stack, or `rows` (the floor) for an empty lane.
//! Rows grow downward, so a taller stack means a smaller value.

use serde::Serialize;

/// Column height map, the single source of truth for stacking
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnHeightMap {
    rows: i32,
    tops: Vec<i32>,
}

impl ColumnHeightMap {
    pub fn new(cols: usize, rows: i32) -> Self {
        Self {
            rows,
            tops: vec![rows; cols],
        }
    }

    /// Fill every lane with the floor value
    pub fn reset(&mut self, cols: usize, rows: i32) {
        self.rows = rows;
        self.tops.clear();
        self.tops.resize(cols, rows);
    }

    #[inline]
    pub fn cols(&self) -> usize {
        self.tops.len()
    }

    #[inline]
    pub fn rows(&self) -> i32 {
        self.rows
    }

    /// Value meaning "lane forced open by a push block"
    #[inline]
    pub fn ejection_sentinel(&self) -> i32 {
        self.rows * 2
    }

    /// Current stop row of `col`.
    ///
    /// Panics if `col` is out of range; movement rules go through [`Self::get`].
    #[inline]
    pub fn top_of(&self, col: usize) -> i32 {
        self.tops[col]
    }

    /// Checked variant of [`Self::top_of`]
    #[inline]
    pub fn get(&self, col: usize) -> Option<i32> {
        self.tops.get(col).copied()
    }

    /// Grow the stack in `col` upward by `by` rows.
    ///
    /// Block settling levels every lane under a block to its surface with
    /// [`Self::push`] instead, which agrees with this on level lanes.
    pub fn raise(&mut self, col: usize, by: i32) {
        let top = self.tops[col] - by;
        self.tops[col] = top.clamp(0, self.ejection_sentinel());
    }

    /// Force `col` to an explicit value
    pub fn push(&mut self, col: usize, to: i32) {
        self.tops[col] = to.clamp(0, self.ejection_sentinel());
    }

    /// Set `col` back to `to`, never deeper than the floor
    pub fn restore(&mut self, col: usize, to: i32) {
        self.tops[col] = to.clamp(0, self.rows);
    }

    pub fn is_ejected(&self, col: usize) -> bool {
        self.tops[col] >= self.ejection_sentinel()
    }

    /// All lane values, leftmost first
    pub fn as_slice(&self) -> &[i32] {
        &self.tops
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_fills_floor() {
        let map = ColumnHeightMap::new(4, 10);
        assert_eq!(map.as_slice(), &[10, 10, 10, 10]);
        assert_eq!(map.ejection_sentinel(), 20);
    }

    #[test]
    fn test_raise_and_push() {
        let mut map = ColumnHeightMap::new(3, 8);
        map.raise(1, 2);
        assert_eq!(map.top_of(1), 6);
        map.push(2, 16);
        assert!(map.is_ejected(2));
        assert!(!map.is_ejected(1));
    }

    #[test]
    fn test_values_stay_in_bounds() {
        let mut map = ColumnHeightMap::new(2, 5);
        map.raise(0, 50);
        assert_eq!(map.top_of(0), 0);
        map.push(1, 99);
        assert_eq!(map.top_of(1), 10);
        map.restore(1, 12);
        assert_eq!(map.top_of(1), 5);
    }

    #[test]
    fn test_reset_after_play() {
        let mut map = ColumnHeightMap::new(2, 5);
        map.raise(0, 3);
        map.reset(3, 6);
        assert_eq!(map.as_slice(), &[6, 6, 6]);
        assert_eq!(map.get(3), None);
    }
}
