use super::{read_u32s, write_u32s};
use crate::{BufferView, ComputeError};

pub fn handle_reduce_sum(binds: &[BufferView]) -> Result<Vec<Vec<u8>>, ComputeError> {
    if binds.len() < 3 {
        return Err(ComputeError::ShapeMismatch(
            "ReduceSum kernel expects 3 buffers",
        ));
    }
    let input_values = read_u32s(
        &binds[0],
        "ReduceSum kernel currently only supports u32 input data",
    )?;
    let sum_value = input_values
        .iter()
        .try_fold(0u32, |acc, &v| acc.checked_add(v))
        .ok_or(ComputeError::ShapeMismatch("ReduceSum overflowed u32"))?;
    Ok(vec![write_u32s(&[sum_value])])
}

#[cfg(test)]
mod tests {
    use crate::{BufferView, ComputeBackend, ComputeError, CpuBackend, Kernel};

    fn reduce(values: &[u32]) -> Result<Vec<Vec<u8>>, ComputeError> {
        let cpu = CpuBackend::new();
        let input = BufferView::from_slice(values);
        let output = BufferView::from_slice(&[0u32]);
        let config = BufferView::from_slice(&[0u32]);
        cpu.dispatch(&Kernel::ReduceSum, &[input, output, config], [1, 1, 1])
    }

    #[test]
    fn reduce_sum_computes_sum() {
        let result_buffers = reduce(&[1, 2, 3, 4, 5]).expect("Dispatch for ReduceSum failed");
        assert_eq!(result_buffers.len(), 1);
        let output_value: u32 = bytemuck::pod_read_unaligned(&result_buffers[0]);
        assert_eq!(output_value, 15);
    }

    #[test]
    fn reduce_sum_of_nothing_is_zero() {
        let result_buffers = reduce(&[]).expect("Dispatch for ReduceSum failed");
        let output_value: u32 = bytemuck::pod_read_unaligned(&result_buffers[0]);
        assert_eq!(output_value, 0);
    }

    #[test]
    fn reduce_sum_reports_overflow() {
        let result = reduce(&[u32::MAX, 1]);
        assert!(matches!(result, Err(ComputeError::ShapeMismatch(_))));
    }
}
