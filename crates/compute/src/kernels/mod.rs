// This module re-exports handlers for each kernel operation.

use crate::{BufferView, ComputeError};

// Scans and reductions
pub mod cumsum_op;
pub use cumsum_op::handle_cumsum;
pub mod reduce_sum_op;
pub use reduce_sum_op::handle_reduce_sum;

// Element-wise operations
pub mod sub_op;
pub use sub_op::handle_sub;

// Scatters
pub mod scatter_add_op;
pub use scatter_add_op::handle_scatter_add;

/// Decodes a `u32` buffer without assuming the byte slice is 4-aligned.
pub(crate) fn read_u32s(view: &BufferView, what: &'static str) -> Result<Vec<u32>, ComputeError> {
    if view.element_size_in_bytes != std::mem::size_of::<u32>() {
        return Err(ComputeError::ShapeMismatch(what));
    }
    Ok(decode_u32s(&view.data))
}

pub(crate) fn decode_u32s(bytes: &[u8]) -> Vec<u32> {
    bytes
        .chunks_exact(std::mem::size_of::<u32>())
        .map(bytemuck::pod_read_unaligned)
        .collect()
}

pub(crate) fn write_u32s(values: &[u32]) -> Vec<u8> {
    bytemuck::cast_slice(values).to_vec()
}
