//! # Ragged batches
//!
//! A [`RaggedBatch`] stores a variable number of rows per group in one flat
//! tensor. The group tables ([`Grouping`]) are derived once from the widths
//! and never change afterwards; a batch with different membership is a new
//! batch.
//!
//! `inverse[i]` names the group owning flat row `i`, so any lane working on a
//! row finds its group in O(1) without searching.

use std::ops::Range;
use std::sync::Arc;

use bytemuck::Pod;
use compute::{Device, DeviceId, Tensor};

use crate::error::{ensure_device, SimError};

/// Widths, exclusive starts and the row-to-group inverse table.
#[derive(Debug, Clone, PartialEq)]
pub struct Grouping {
    widths: Tensor<u32>,
    starts: Tensor<u32>,
    inverse: Tensor<u32>,
}

impl Grouping {
    /// Derives `starts` and `inverse` from `widths`.
    ///
    /// # Errors
    ///
    /// Fails when `widths` lives on another device, is not one-dimensional,
    /// or sums past `u32::MAX`.
    pub fn new(device: &Device, widths: Tensor<u32>) -> Result<Self, SimError> {
        device.check(&widths)?;
        if widths.rank() != 1 {
            return Err(SimError::shape(format!(
                "widths must be one-dimensional, got shape {:?}",
                widths.shape()
            )));
        }
        let starts = widths.cumsum(device)?.sub(device, &widths)?;
        let inverse = inverses(device, &widths, &starts)?;
        Ok(Self { widths, starts, inverse })
    }

    /// Number of groups.
    #[must_use]
    pub fn groups(&self) -> usize {
        self.widths.len()
    }

    /// Total number of rows across all groups.
    #[must_use]
    pub fn rows(&self) -> usize {
        self.inverse.len()
    }

    #[must_use]
    pub fn widths(&self) -> &[u32] {
        self.widths.as_slice()
    }

    #[must_use]
    pub fn starts(&self) -> &[u32] {
        self.starts.as_slice()
    }

    #[must_use]
    pub fn inverse(&self) -> &[u32] {
        self.inverse.as_slice()
    }

    /// Flat rows owned by group `g`, or `None` past the last group.
    #[must_use]
    pub fn range(&self, g: usize) -> Option<Range<usize>> {
        let start = *self.starts().get(g)? as usize;
        let width = *self.widths().get(g)? as usize;
        Some(start..start + width)
    }

    #[must_use]
    pub fn device(&self) -> DeviceId {
        self.widths.device()
    }
}

/// Builds the row-to-group table without searching.
///
/// A `1` is added at every group start into a zeroed array of one slot per
/// row; the inclusive scan of that array, minus one, counts the group starts
/// at or before each row. Markers are added rather than assigned so that
/// empty groups sharing a start still advance the count. Starts equal to the
/// row count belong to trailing empty groups and own no row.
fn inverses(device: &Device, widths: &Tensor<u32>, starts: &Tensor<u32>) -> Result<Tensor<u32>, SimError> {
    let total = widths.sum(device)?;
    let marked: Vec<u32> = starts.as_slice().iter().copied().filter(|&s| s < total).collect();
    let marked = Tensor::vector(device, marked);
    let flags = Tensor::<u32>::ones(device, vec![marked.len()]);
    let rows = vec![total as usize];
    let counts = Tensor::<u32>::zeros(device, rows.clone()).scatter_add(device, &marked, &flags)?;
    Ok(counts.cumsum(device)?.sub(device, &Tensor::ones(device, rows))?)
}

/// Variable-length groups of rows in one contiguous tensor.
///
/// The leading dimension of `vals` indexes rows; any further dimensions are
/// the per-row shape, so a group is `width * row_len` contiguous values.
#[derive(Debug, Clone)]
pub struct RaggedBatch<T> {
    vals: Tensor<T>,
    grouping: Arc<Grouping>,
}

impl<T: Pod> RaggedBatch<T> {
    /// # Errors
    ///
    /// Fails when the operands live on different devices or when
    /// `sum(widths)` differs from the number of rows in `vals`.
    pub fn new(device: &Device, vals: Tensor<T>, widths: Tensor<u32>) -> Result<Self, SimError> {
        device.check(&vals)?;
        let grouping = Grouping::new(device, widths)?;
        Self::with_grouping(device, vals, Arc::new(grouping))
    }

    /// Attaches `vals` to an existing grouping, sharing its tables.
    ///
    /// # Errors
    ///
    /// Fails on a device mismatch, a rank-0 `vals`, or a row count that
    /// disagrees with the grouping.
    pub fn with_grouping(device: &Device, vals: Tensor<T>, grouping: Arc<Grouping>) -> Result<Self, SimError> {
        device.check(&vals)?;
        ensure_device(device, grouping.device())?;
        let rows = vals
            .size(0)
            .ok_or_else(|| SimError::shape("ragged values need a leading row dimension"))?;
        if rows != grouping.rows() {
            return Err(SimError::shape(format!(
                "widths sum to {} but values hold {rows} rows",
                grouping.rows()
            )));
        }
        Ok(Self { vals, grouping })
    }

    /// One group per inner vector, one row per element.
    ///
    /// # Errors
    ///
    /// Fails when a group is wider than `u32::MAX` rows.
    pub fn from_groups(device: &Device, groups: Vec<Vec<T>>) -> Result<Self, SimError> {
        let widths = groups
            .iter()
            .map(|g| u32::try_from(g.len()))
            .collect::<Result<Vec<u32>, _>>()
            .map_err(|_| SimError::shape("group too wide for u32 widths"))?;
        let vals: Vec<T> = groups.into_iter().flatten().collect();
        Self::new(device, Tensor::vector(device, vals), Tensor::vector(device, widths))
    }

    /// A new batch over `vals` with this batch's grouping.
    ///
    /// # Errors
    ///
    /// Same as [`RaggedBatch::with_grouping`].
    pub fn with_values<U: Pod>(&self, device: &Device, vals: Tensor<U>) -> Result<RaggedBatch<U>, SimError> {
        RaggedBatch::with_grouping(device, vals, Arc::clone(&self.grouping))
    }

    /// `dim == 0`: the number of groups. Otherwise the extent of `vals`
    /// along that per-row dimension, or `None` past its rank.
    #[must_use]
    pub fn size(&self, dim: usize) -> Option<usize> {
        if dim == 0 {
            Some(self.groups())
        } else {
            self.vals.size(dim)
        }
    }

    #[must_use]
    pub fn groups(&self) -> usize {
        self.grouping.groups()
    }

    #[must_use]
    pub fn rows(&self) -> usize {
        self.grouping.rows()
    }

    /// Values per row.
    #[must_use]
    pub fn row_len(&self) -> usize {
        self.vals.shape()[1..].iter().product()
    }

    /// The rows of group `g`, without copying.
    ///
    /// # Panics
    ///
    /// Panics if `g >= self.groups()`.
    #[must_use]
    pub fn group(&self, g: usize) -> &[T] {
        match self.get_group(g) {
            Some(rows) => rows,
            None => panic!("group {g} out of range for {} groups", self.groups()),
        }
    }

    #[must_use]
    pub fn get_group(&self, g: usize) -> Option<&[T]> {
        let rows = self.grouping.range(g)?;
        let row_len = self.row_len();
        self.vals.as_slice().get(rows.start * row_len..rows.end * row_len)
    }

    /// The group owning flat row `i`.
    ///
    /// # Panics
    ///
    /// Panics if `i >= self.rows()`.
    #[must_use]
    pub fn inverse_of(&self, i: usize) -> usize {
        self.grouping.inverse()[i] as usize
    }

    #[must_use]
    pub fn widths(&self) -> &[u32] {
        self.grouping.widths()
    }

    #[must_use]
    pub fn starts(&self) -> &[u32] {
        self.grouping.starts()
    }

    #[must_use]
    pub fn inverse(&self) -> &[u32] {
        self.grouping.inverse()
    }

    #[must_use]
    pub fn grouping(&self) -> &Arc<Grouping> {
        &self.grouping
    }

    /// Whether both batches reference the very same group tables.
    #[must_use]
    pub fn shares_grouping<U>(&self, other: &RaggedBatch<U>) -> bool {
        Arc::ptr_eq(&self.grouping, &other.grouping)
    }

    #[must_use]
    pub fn vals(&self) -> &Tensor<T> {
        &self.vals
    }

    /// All rows, flat.
    #[must_use]
    pub fn values(&self) -> &[T] {
        self.vals.as_slice()
    }

    /// Row contents may change; the grouping may not.
    pub fn values_mut(&mut self) -> &mut [T] {
        self.vals.as_mut_slice()
    }

    #[must_use]
    pub fn device(&self) -> DeviceId {
        self.vals.device()
    }
}
