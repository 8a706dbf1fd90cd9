use crate::Kernel;

/// Buffers a kernel expects: its operands, an output placeholder and a
/// trailing config buffer.
#[must_use]
pub const fn binding_count(kernel: &Kernel) -> u32 {
    match kernel {
        Kernel::Cumsum | Kernel::ReduceSum => 3,
        Kernel::Sub | Kernel::ScatterAdd => 4,
    }
}
