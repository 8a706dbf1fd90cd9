use super::{read_u32s, write_u32s};
use crate::{BufferView, ComputeError};

pub fn handle_sub(binds: &[BufferView]) -> Result<Vec<Vec<u8>>, ComputeError> {
    if binds.len() < 4 {
        // IN1, IN2, OUT, CONFIG per layout.rs
        return Err(ComputeError::ShapeMismatch(
            "Sub kernel expects 4 buffers (input_a, input_b, output_placeholder, config)",
        ));
    }
    let input_a_view = &binds[0];
    let input_b_view = &binds[1];

    if input_a_view.shape != input_b_view.shape {
        return Err(ComputeError::ShapeMismatch(
            "Input buffers for Sub must have the same shape",
        ));
    }

    let input_a_values = read_u32s(input_a_view, "Sub kernel currently only supports u32 data for both inputs")?;
    let input_b_values = read_u32s(input_b_view, "Sub kernel currently only supports u32 data for both inputs")?;

    let output_values = input_a_values
        .iter()
        .zip(input_b_values.iter())
        .map(|(&a, &b)| a.checked_sub(b))
        .collect::<Option<Vec<u32>>>()
        .ok_or(ComputeError::ShapeMismatch("Sub underflowed u32"))?;
    Ok(vec![write_u32s(&output_values)])
}
