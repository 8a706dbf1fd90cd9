use crate::{BufferView, ComputeError, Kernel};

/// Executes dense kernels over byte buffers.
pub trait ComputeBackend: Send + Sync + 'static {
    /// Runs `shader` over `binds`, laid out as [`crate::layout::binding_count`]
    /// describes, and returns the bytes of every buffer it writes.
    ///
    /// # Errors
    ///
    /// Returns [`ComputeError::ShapeMismatch`] when the bindings do not fit the
    /// kernel, or any other variant the backend raises.
    fn dispatch(
        &self,
        shader: &Kernel,
        binds: &[BufferView],
        workgroups: [u32; 3],
    ) -> Result<Vec<Vec<u8>>, ComputeError>;
}
