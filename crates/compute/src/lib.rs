#![deny(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
//! # Compute
//!
//! Dense-array primitive and kernel-launch substrate for the batched
//! simulation core.
//!
//! -   [`Tensor`] is a contiguous, row-major array of `bytemuck::Pod`
//!     elements that remembers which [`Device`] it was created on.
//! -   Dense operations (`cumsum`, `sum`, `sub`, `scatter_add`) are described
//!     by a [`Kernel`] and executed by a [`ComputeBackend`] over byte-level
//!     [`BufferView`]s. [`CpuBackend`] is the reference implementation.
//! -   Per-lane work (one closure invocation per drone, texel, ...) is launched
//!     through [`Device::map_lanes`] and [`Device::update_lanes`].
//!
//! There is no ambient "current device": every construction and every
//! operation names its device explicitly.

use std::sync::Arc;
use thiserror::Error;

pub mod backend;
pub mod cpu_backend;
pub mod device;
pub mod kernels;
pub mod layout;
pub mod tensor;

pub use backend::ComputeBackend;
pub use cpu_backend::CpuBackend;
pub use device::{Device, DeviceId};
pub use tensor::{Scalar, Tensor};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ComputeError {
    #[error("buffer shape mismatch: {0}")]
    ShapeMismatch(&'static str),
    #[error("tensor lives on device {found}, expected device {expected}")]
    DeviceMismatch { expected: DeviceId, found: DeviceId },
    #[error("backend not available")]
    BackendUnavailable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kernel {
    // Scans and reductions
    Cumsum,
    ReduceSum,

    // Element-wise
    Sub,

    // Scatters
    ScatterAdd,
}

impl Kernel {
    #[must_use]
    pub const fn binding_count(&self) -> u32 {
        layout::binding_count(self)
    }
}

#[derive(Clone, Debug)]
pub struct BufferView {
    pub data: Arc<[u8]>,
    pub shape: Vec<usize>, // Number of elements per dimension
    pub element_size_in_bytes: usize, // Size of a single element described by the innermost dimension of shape
}

impl BufferView {
    #[must_use]
    pub fn new(data: Arc<[u8]>, shape: Vec<usize>, element_size_in_bytes: usize) -> Self {
        Self { data, shape, element_size_in_bytes }
    }

    /// Builds a one-dimensional view over a copy of `values`.
    #[must_use]
    pub fn from_slice<T: bytemuck::Pod>(values: &[T]) -> Self {
        Self::new(
            bytemuck::cast_slice(values).to_vec().into(),
            vec![values.len()],
            std::mem::size_of::<T>(),
        )
    }

    #[must_use]
    pub fn element_count(&self) -> usize {
        self.shape.iter().product()
    }
}

/// Returns the default compute backend.
///
/// Only the CPU backend ships with this crate; it is always available.
#[must_use]
pub fn default_backend() -> Arc<dyn ComputeBackend> {
    tracing::info!("Using CpuBackend.");
    Arc::new(CpuBackend::new())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mismatch_shape_fails() {
        let cpu = CpuBackend::new();
        let bad_buf = BufferView::new(vec![0u8; 12].into(), vec![4], 4);
        let good_buf = BufferView::new(vec![0u8; 16].into(), vec![4], 4);
        let out_buf = BufferView::new(vec![0u8; 16].into(), vec![4], 4);
        let cfg = BufferView::new(vec![0u8; 4].into(), vec![1], 4);
        let result = cpu.dispatch(&Kernel::Sub, &[bad_buf, good_buf, out_buf, cfg], [1, 1, 1]);
        assert!(
            matches!(result, Err(ComputeError::ShapeMismatch(_))),
            "Expected ShapeMismatch error, got {result:?}"
        );
    }

    #[test]
    fn correct_shape_succeeds() {
        let cpu = CpuBackend::new();
        let good_buf = BufferView::new(vec![0u8; 16].into(), vec![4], 4);
        let out_buf = BufferView::new(vec![0u8; 16].into(), vec![4], 4);
        let cfg = BufferView::new(vec![0u8; 4].into(), vec![1], 4);
        let result = cpu.dispatch(&Kernel::Sub, &[good_buf.clone(), good_buf, out_buf, cfg], [1, 1, 1]);
        assert!(result.is_ok(), "Expected Ok, got {result:?}");
    }

    #[test]
    fn empty_binds_fails() {
        let cpu = CpuBackend::new();
        let result = cpu.dispatch(&Kernel::Sub, &[], [1, 1, 1]);
        assert!(matches!(result, Err(ComputeError::ShapeMismatch(_))));
    }

    #[test]
    fn shape_product_is_zero() {
        let cpu = CpuBackend::new();
        let empty = BufferView::new(vec![0u8; 0].into(), vec![0], 4);
        let cfg = BufferView::new(vec![0u8; 4].into(), vec![1], 4);
        let result = cpu.dispatch(&Kernel::Cumsum, &[empty.clone(), empty.clone(), cfg.clone()], [1, 1, 1]);
        assert!(result.is_ok(), "Expected Ok for zero-product shape with zero data, got {result:?}");

        let nonzero_data_zero_prod = BufferView::new(vec![0u8; 4].into(), vec![0, 4], 4);
        let result = cpu.dispatch(&Kernel::Cumsum, &[nonzero_data_zero_prod, empty, cfg], [1, 1, 1]);
        assert!(
            matches!(result, Err(ComputeError::ShapeMismatch(_))),
            "Expected ShapeMismatch for zero-product shape with non-zero data, got {result:?}"
        );
    }

    #[test]
    fn kernel_binding_counts() {
        use crate::layout::binding_count;

        assert_eq!(binding_count(&Kernel::Cumsum), 3);
        assert_eq!(binding_count(&Kernel::ReduceSum), 3);
        assert_eq!(binding_count(&Kernel::Sub), 4);
        assert_eq!(binding_count(&Kernel::ScatterAdd), 4);
        assert_eq!(Kernel::ScatterAdd.binding_count(), 4);
    }
}
