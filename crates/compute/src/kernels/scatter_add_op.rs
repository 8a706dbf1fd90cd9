use super::{read_u32s, write_u32s};
use crate::{BufferView, ComputeError};

/// Adds `values[i]` into `accumulator[indices[i]]` for every `i`.
pub fn handle_scatter_add(binds: &[BufferView]) -> Result<Vec<Vec<u8>>, ComputeError> {
    if binds.len() < 4 {
        return Err(ComputeError::ShapeMismatch(
            "ScatterAdd kernel expects 4 buffers",
        ));
    }
    let values_to_add = read_u32s(
        &binds[0],
        "ScatterAdd kernel currently only supports u32 data for values to add",
    )?;
    let indices = read_u32s(
        &binds[1],
        "ScatterAdd kernel currently only supports u32 for indices",
    )?;
    let mut output_accumulator = read_u32s(
        &binds[2],
        "ScatterAdd kernel currently only supports u32 for the accumulator buffer",
    )?;

    if values_to_add.len() != indices.len() {
        return Err(ComputeError::ShapeMismatch(
            "ScatterAdd requires the number of values to add to match the number of indices",
        ));
    }

    for (&value_to_add, &scatter_idx) in values_to_add.iter().zip(indices.iter()) {
        let slot = output_accumulator
            .get_mut(scatter_idx as usize)
            .ok_or(ComputeError::ShapeMismatch(
                "ScatterAdd index out of bounds for the output accumulator buffer",
            ))?;
        *slot = slot.wrapping_add(value_to_add);
    }

    Ok(vec![write_u32s(&output_accumulator)])
}
