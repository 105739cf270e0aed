//! Weight tables of the n-tuple network.

use std::ops::{Index, IndexMut};

use crate::pattern::{NUM_TUPLES, TUPLE_TABLE_SIZE};

/// One weight table, addressed by a tuple index.
#[derive(Clone, Debug, PartialEq)]
pub struct WeightTable {
    values: Box<[f32]>,
}

impl WeightTable {
    /// Zero-filled table with `len` entries.
    pub fn new(len: usize) -> Self {
        Self {
            values: vec![0.0f32; len].into_boxed_slice(),
        }
    }

    /// Table owning the given values.
    pub fn from_values(values: Vec<f32>) -> Self {
        Self {
            values: values.into_boxed_slice(),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    #[inline]
    pub fn values(&self) -> &[f32] {
        &self.values
    }

    #[inline]
    pub fn values_mut(&mut self) -> &mut [f32] {
        &mut self.values
    }
}

impl Index<usize> for WeightTable {
    type Output = f32;

    #[inline]
    fn index(&self, index: usize) -> &f32 {
        &self.values[index]
    }
}

impl IndexMut<usize> for WeightTable {
    #[inline]
    fn index_mut(&mut self, index: usize) -> &mut f32 {
        &mut self.values[index]
    }
}

/// Fixed collection of weight tables; table `k` belongs to tuple `k`.
///
/// # Memory
///
/// The default store holds 8 x 50625 f32 entries, about 1.6 MB.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct WeightStore {
    tables: Vec<WeightTable>,
}

impl WeightStore {
    /// Store without tables.
    pub fn new() -> Self {
        Self::default()
    }

    /// The default network: 8 zeroed tables of 50625 entries.
    ///
    /// # Examples
    ///
    /// ```
    /// use tdl2048::weight::WeightStore;
    ///
    /// let store = WeightStore::with_default_tables();
    /// assert_eq!(store.len(), 8);
    /// assert_eq!(store.table(0).len(), 50625);
    /// ```
    pub fn with_default_tables() -> Self {
        Self::from_tables((0..NUM_TUPLES).map(|_| WeightTable::new(TUPLE_TABLE_SIZE)).collect())
    }

    pub fn from_tables(tables: Vec<WeightTable>) -> Self {
        Self { tables }
    }

    /// Number of tables.
    #[inline]
    pub fn len(&self) -> usize {
        self.tables.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    #[inline]
    pub fn table(&self, table: usize) -> &WeightTable {
        &self.tables[table]
    }

    #[inline]
    pub fn tables(&self) -> &[WeightTable] {
        &self.tables
    }

    /// Weight at `index` of `table`.
    ///
    /// # Panics
    ///
    /// When `table` or `index` is out of range.
    #[inline]
    pub fn get(&self, table: usize, index: usize) -> f32 {
        self.tables[table][index]
    }

    /// Overwrite the weight at `index` of `table`.
    #[inline]
    pub fn set(&mut self, table: usize, index: usize, value: f32) {
        self.tables[table][index] = value;
    }

    /// Add `delta` to the weight at `index` of `table`.
    #[inline]
    pub fn add(&mut self, table: usize, index: usize, delta: f32) {
        self.tables[table][index] += delta;
    }

    /// Total number of entries over all tables.
    pub fn total_entries(&self) -> usize {
        self.tables.iter().map(WeightTable::len).sum()
    }

    /// Number of entries that are not exactly zero.
    pub fn nonzero_entries(&self) -> usize {
        self.tables
            .iter()
            .map(|t| t.values().iter().filter(|&&w| w != 0.0).count())
            .sum()
    }

    /// Memory used by the weights in bytes.
    pub fn memory_usage(&self) -> usize {
        self.total_entries() * std::mem::size_of::<f32>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_tables_are_zero() {
        let store = WeightStore::with_default_tables();
        assert_eq!(store.len(), NUM_TUPLES);
        assert_eq!(store.total_entries(), NUM_TUPLES * TUPLE_TABLE_SIZE);
        assert_eq!(store.nonzero_entries(), 0);
    }

    #[test]
    fn test_get_set_add() {
        let mut store = WeightStore::with_default_tables();
        store.set(3, 1234, 1.5);
        store.add(3, 1234, 0.25);
        store.add(7, 0, -2.0);
        assert_eq!(store.get(3, 1234), 1.75);
        assert_eq!(store.get(7, 0), -2.0);
        assert_eq!(store.get(3, 1235), 0.0);
        assert_eq!(store.nonzero_entries(), 2);
    }

    #[test]
    fn test_tables_are_independent() {
        let mut store = WeightStore::with_default_tables();
        store.set(0, 42, 9.0);
        for table in 1..NUM_TUPLES {
            assert_eq!(store.get(table, 42), 0.0);
        }
    }

    #[test]
    fn test_memory_usage() {
        let store = WeightStore::with_default_tables();
        assert_eq!(store.memory_usage(), NUM_TUPLES * TUPLE_TABLE_SIZE * 4);
    }

    #[test]
    #[should_panic]
    fn test_out_of_range_index_panics() {
        let store = WeightStore::with_default_tables();
        store.get(0, TUPLE_TABLE_SIZE);
    }
}
