use crate::{kernels, BufferView, ComputeBackend, ComputeError, Kernel};

/// Reference backend: runs every kernel on the host, one handler per kernel.
#[derive(Default, Debug, Clone)]
pub struct CpuBackend;

impl CpuBackend {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl ComputeBackend for CpuBackend {
    fn dispatch(
        &self,
        shader: &Kernel,
        binds: &[BufferView],
        _workgroups: [u32; 3],
    ) -> Result<Vec<Vec<u8>>, ComputeError> {
        if binds.len() < shader.binding_count() as usize {
            return Err(ComputeError::ShapeMismatch(
                "fewer buffers bound than the kernel layout requires",
            ));
        }
        for buffer_view in binds {
            let expected_bytes = buffer_view.element_count() * buffer_view.element_size_in_bytes;

            if buffer_view.data.len() != expected_bytes {
                return Err(ComputeError::ShapeMismatch(
                    "Buffer data length does not match product of shape dimensions and element size",
                ));
            }
        }
        match shader {
            Kernel::Cumsum => kernels::handle_cumsum(binds),
            Kernel::ReduceSum => kernels::handle_reduce_sum(binds),
            Kernel::Sub => kernels::handle_sub(binds),
            Kernel::ScatterAdd => kernels::handle_scatter_add(binds),
        }
    }
}
