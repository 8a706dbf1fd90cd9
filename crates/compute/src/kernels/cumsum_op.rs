use super::{read_u32s, write_u32s};
use crate::{BufferView, ComputeError};

/// Inclusive prefix sum over a one-dimensional `u32` buffer.
pub fn handle_cumsum(binds: &[BufferView]) -> Result<Vec<Vec<u8>>, ComputeError> {
    if binds.len() < 3 {
        return Err(ComputeError::ShapeMismatch(
            "Cumsum kernel expects 3 buffers (input, output_placeholder, config)",
        ));
    }
    let input_view = &binds[0];
    let output_view = &binds[1];
    if input_view.shape.len() != 1 {
        return Err(ComputeError::ShapeMismatch(
            "Cumsum kernel only scans one-dimensional buffers",
        ));
    }
    if output_view.shape != input_view.shape {
        return Err(ComputeError::ShapeMismatch(
            "Cumsum output placeholder must have the input's shape",
        ));
    }
    let values = read_u32s(
        input_view,
        "Cumsum kernel currently only supports u32 input data",
    )?;

    let mut running = 0u32;
    let scanned: Vec<u32> = values
        .iter()
        .map(|&v| {
            running = running.wrapping_add(v);
            running
        })
        .collect();
    Ok(vec![write_u32s(&scanned)])
}
