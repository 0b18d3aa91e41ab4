use std::any::Any;
use std::fmt::Debug;

pub trait Scalar: Copy + PartialEq + Debug + Any {}
impl<T: Copy + PartialEq + Debug + Any> Scalar for T {}

/// Dense (column, level) field with 1-based Fortran-style indices.
///
/// Levels of one column are stored contiguously so a vertical sweep walks
/// memory in order. All access is bounds-asserted: the flat index arithmetic
/// would otherwise let a level overrun alias silently into the next column.
pub struct Field2D<T: Scalar> {
    values: Vec<T>,

    num_columns: usize,
    num_levels: usize,
}

impl<T: Scalar> Field2D<T>
where
    T: Default,
{
    pub fn new(num_columns: usize, num_levels: usize) -> Self {
        Field2D {
            num_columns,
            num_levels,
            values: vec![T::default(); num_columns * num_levels],
        }
    }

    pub fn num_columns(&self) -> usize {
        self.num_columns
    }

    pub fn num_levels(&self) -> usize {
        self.num_levels
    }

    #[inline(always)]
    pub fn get(&self, column_idx: usize, level_idx: usize) -> T {
        let idx = self.index_from_column_and_level(column_idx, level_idx);
        self.values[idx]
    }

    /// Reads the vertical neighbor at `level_idx + offset`. Only the
    /// directly adjacent levels are addressable; anything further is a
    /// programming error in the calling sweep.
    #[inline(always)]
    pub fn get_offset(&self, column_idx: usize, level_idx: usize, offset: isize) -> T {
        assert!(
            offset >= -1 && offset <= 1,
            "Vertical offset access is limited to adjacent levels, got offset {}.",
            offset
        );
        let neighbor_idx = level_idx as isize + offset;
        assert!(
            neighbor_idx >= 1,
            "Offset access below level 1 at column {}, level {}.",
            column_idx,
            level_idx
        );
        self.get(column_idx, neighbor_idx as usize)
    }

    #[inline(always)]
    pub fn set(&mut self, column_idx: usize, level_idx: usize, value: T) {
        let idx = self.index_from_column_and_level(column_idx, level_idx);
        self.values[idx] = value
    }

    pub fn set_all(&mut self, value: T) {
        self.values.iter_mut().map(|x| *x = value).count();
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.values.iter()
    }

    #[inline(always)]
    fn index_from_column_and_level(&self, column_idx: usize, level_idx: usize) -> usize {
        assert!(
            column_idx >= 1 && column_idx <= self.num_columns,
            "Column index {} outside 1..={}.",
            column_idx,
            self.num_columns
        );
        assert!(
            level_idx >= 1 && level_idx <= self.num_levels,
            "Level index {} outside 1..={}.",
            level_idx,
            self.num_levels
        );
        (level_idx - 1) + (column_idx - 1) * self.num_levels
    }
}

/// Per-column array with the same 1-based indexing as `Field2D`.
pub struct Field1D<T: Scalar> {
    values: Vec<T>,
}

impl<T: Scalar> Field1D<T>
where
    T: Default,
{
    pub fn new(num_columns: usize) -> Self {
        Field1D {
            values: vec![T::default(); num_columns],
        }
    }

    pub fn num_columns(&self) -> usize {
        self.values.len()
    }

    #[inline(always)]
    pub fn get(&self, column_idx: usize) -> T {
        assert!(
            column_idx >= 1 && column_idx <= self.values.len(),
            "Column index {} outside 1..={}.",
            column_idx,
            self.values.len()
        );
        self.values[column_idx - 1]
    }

    #[inline(always)]
    pub fn set(&mut self, column_idx: usize, value: T) {
        assert!(
            column_idx >= 1 && column_idx <= self.values.len(),
            "Column index {} outside 1..={}.",
            column_idx,
            self.values.len()
        );
        self.values[column_idx - 1] = value
    }

    pub fn set_all(&mut self, value: T) {
        self.values.iter_mut().map(|x| *x = value).count();
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.values.iter()
    }
}
