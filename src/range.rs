//! Bounded candidate-index range, optionally indirected through an explicit
//! id list.
//!
//! Every generation strategy is written against this one abstraction, whether
//! the candidate universe is "all points of the cloud" or an explicit subset
//! produced by a spatial query. Bounds are half-open: the lower bound is
//! inclusive, the upper bound exclusive, and uniform draws use the same
//! convention. For an indirected range the *slot* is validated, never the
//! stored value; mapping a slot to a stored id that exceeds the point cloud
//! is caught later by the cloud lookup itself.

use rand::Rng;

use crate::{CurvatureError, Result};

#[derive(Debug, Clone, Copy)]
pub struct NeighborRange<'a> {
    min: usize,
    max: usize,
    ids: Option<&'a [usize]>,
}

impl<'a> NeighborRange<'a> {
    /// Range over the raw indices `[0, max)`.
    pub fn dense(max: usize) -> Self {
        Self::dense_from(0, max)
    }

    /// Range over the raw indices `[min, max)`.
    pub fn dense_from(min: usize, max: usize) -> Self {
        Self {
            min,
            max: max.max(min),
            ids: None,
        }
    }

    /// Range over the slots of an explicit candidate id list; `get` and
    /// `sample` return the stored ids, iteration yields them in slot order.
    pub fn mapped(ids: &'a [usize]) -> Self {
        Self {
            min: 0,
            max: ids.len(),
            ids: Some(ids),
        }
    }

    pub fn len(&self) -> usize {
        self.max - self.min
    }

    pub fn is_empty(&self) -> bool {
        self.max == self.min
    }

    fn check(&self, slot: usize) -> Result<()> {
        if slot < self.min || slot >= self.max {
            return Err(CurvatureError::OutOfRange {
                index: slot,
                min: self.min,
                max: self.max,
            });
        }
        Ok(())
    }

    /// Resolve the candidate at `slot`: the slot itself for a dense range,
    /// the stored id for an indirected one.
    pub fn get(&self, slot: usize) -> Result<usize> {
        self.check(slot)?;
        Ok(match self.ids {
            Some(ids) => ids[slot],
            None => slot,
        })
    }

    /// Draw one candidate uniformly from `[min, max)`.
    pub fn sample<R: Rng>(&self, rng: &mut R) -> Result<usize> {
        if self.is_empty() {
            return Err(CurvatureError::OutOfRange {
                index: self.min,
                min: self.min,
                max: self.max,
            });
        }
        self.get(rng.gen_range(self.min..self.max))
    }

    /// Iterate every candidate in slot order.
    pub fn iter(&self) -> impl Iterator<Item = usize> + 'a {
        let ids = self.ids;
        (self.min..self.max).map(move |slot| match ids {
            Some(ids) => ids[slot],
            None => slot,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dense_range_is_half_open() {
        let range = NeighborRange::dense(5);
        assert_eq!(range.len(), 5);
        assert_eq!(range.get(0).unwrap(), 0);
        assert_eq!(range.get(4).unwrap(), 4);
        assert!(matches!(
            range.get(5),
            Err(CurvatureError::OutOfRange { index: 5, max: 5, .. })
        ));
        assert_eq!(range.iter().collect::<Vec<_>>(), vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn dense_range_with_lower_bound() {
        let range = NeighborRange::dense_from(2, 6);
        assert_eq!(range.len(), 4);
        assert!(range.get(1).is_err());
        assert_eq!(range.iter().collect::<Vec<_>>(), vec![2, 3, 4, 5]);
    }

    #[test]
    fn mapped_range_resolves_stored_ids() {
        let ids = [7usize, 3, 9];
        let range = NeighborRange::mapped(&ids);
        assert_eq!(range.len(), 3);
        assert_eq!(range.get(0).unwrap(), 7);
        assert_eq!(range.get(2).unwrap(), 9);
        // The slot is validated, not the stored value.
        assert!(range.get(3).is_err());
        assert_eq!(range.iter().collect::<Vec<_>>(), vec![7, 3, 9]);
    }

    #[test]
    fn sample_stays_in_bounds() {
        let ids = [4usize, 8, 15, 16];
        let range = NeighborRange::mapped(&ids);
        let mut rng = rand::thread_rng();
        for _ in 0..100 {
            let id = range.sample(&mut rng).unwrap();
            assert!(ids.contains(&id));
        }
    }

    #[test]
    fn sample_from_empty_range_fails() {
        let range = NeighborRange::dense(0);
        let mut rng = rand::thread_rng();
        assert!(range.sample(&mut rng).is_err());
    }
}
