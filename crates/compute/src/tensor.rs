//! # Dense tensors
//!
//! [`Tensor`] is the dense-array primitive: contiguous row-major storage of
//! `Pod` elements plus a shape and the id of the device it was built on.
//! Index arithmetic on `u32` tensors is dispatched as [`Kernel`]s through the
//! device's backend.

use bytemuck::Pod;

use crate::device::calculate_workgroups;
use crate::kernels::decode_u32s;
use crate::{BufferView, ComputeError, Device, DeviceId, Kernel};

/// Element types with a multiplicative identity, for [`Tensor::ones`].
pub trait Scalar: Pod + Send + Sync {
    const ONE: Self;
}

impl Scalar for u32 {
    const ONE: Self = 1;
}

impl Scalar for i32 {
    const ONE: Self = 1;
}

impl Scalar for f32 {
    const ONE: Self = 1.0;
}

#[derive(Clone, Debug, PartialEq)]
pub struct Tensor<T> {
    data: Vec<T>,
    shape: Vec<usize>,
    device: DeviceId,
}

impl<T: Pod> Tensor<T> {
    /// Wraps `data` as a tensor of the given shape on `device`.
    ///
    /// # Errors
    ///
    /// Returns [`ComputeError::ShapeMismatch`] when the shape's element count
    /// differs from `data.len()`.
    pub fn from_vec(device: &Device, data: Vec<T>, shape: Vec<usize>) -> Result<Self, ComputeError> {
        if shape.iter().product::<usize>() != data.len() {
            return Err(ComputeError::ShapeMismatch(
                "tensor data length does not match product of shape dimensions",
            ));
        }
        Ok(Self { data, shape, device: device.id() })
    }

    /// One-dimensional tensor holding `data`.
    #[must_use]
    pub fn vector(device: &Device, data: Vec<T>) -> Self {
        let shape = vec![data.len()];
        Self { data, shape, device: device.id() }
    }

    #[must_use]
    pub fn full(device: &Device, shape: Vec<usize>, value: T) -> Self {
        let len = shape.iter().product();
        Self { data: vec![value; len], shape, device: device.id() }
    }

    #[must_use]
    pub fn zeros(device: &Device, shape: Vec<usize>) -> Self {
        Self::full(device, shape, T::zeroed())
    }

    /// Allocates storage of the given shape. The contents are unspecified by
    /// contract; this implementation zero-fills them.
    #[must_use]
    pub fn empty(device: &Device, shape: Vec<usize>) -> Self {
        Self::zeros(device, shape)
    }

    #[must_use]
    pub fn device(&self) -> DeviceId {
        self.device
    }

    #[must_use]
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    /// Extent along `dim`, or `None` past the tensor's rank.
    #[must_use]
    pub fn size(&self, dim: usize) -> Option<usize> {
        self.shape.get(dim).copied()
    }

    #[must_use]
    pub fn rank(&self) -> usize {
        self.shape.len()
    }

    /// Number of elements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.data
    }

    #[must_use]
    pub fn into_vec(self) -> Vec<T> {
        self.data
    }

    #[must_use]
    pub fn to_view(&self) -> BufferView {
        BufferView::new(
            bytemuck::cast_slice(&self.data).to_vec().into(),
            self.shape.clone(),
            std::mem::size_of::<T>(),
        )
    }
}

impl<T: Scalar> Tensor<T> {
    #[must_use]
    pub fn ones(device: &Device, shape: Vec<usize>) -> Self {
        Self::full(device, shape, T::ONE)
    }
}

impl Tensor<u32> {
    /// Inclusive prefix sum of a one-dimensional tensor.
    ///
    /// # Errors
    ///
    /// Fails on a foreign device or a tensor that is not one-dimensional.
    pub fn cumsum(&self, device: &Device) -> Result<Self, ComputeError> {
        device.check(self)?;
        let placeholder = Self::zeros(device, self.shape.clone());
        let data = dispatch_u32(device, Kernel::Cumsum, &[self.to_view(), placeholder.to_view()], self.len())?;
        Self::from_vec(device, data, self.shape.clone())
    }

    /// Sum of all elements.
    ///
    /// # Errors
    ///
    /// Fails on a foreign device or when the sum overflows `u32`.
    pub fn sum(&self, device: &Device) -> Result<u32, ComputeError> {
        device.check(self)?;
        let placeholder = Self::zeros(device, vec![1]);
        let data = dispatch_u32(device, Kernel::ReduceSum, &[self.to_view(), placeholder.to_view()], self.len())?;
        data.first()
            .copied()
            .ok_or(ComputeError::ShapeMismatch("ReduceSum produced no output"))
    }

    /// Elementwise `self - other`.
    ///
    /// # Errors
    ///
    /// Fails on a foreign device, mismatched shapes, or underflow.
    pub fn sub(&self, device: &Device, other: &Self) -> Result<Self, ComputeError> {
        device.check(self)?;
        device.check(other)?;
        let placeholder = Self::zeros(device, self.shape.clone());
        let data = dispatch_u32(
            device,
            Kernel::Sub,
            &[self.to_view(), other.to_view(), placeholder.to_view()],
            self.len(),
        )?;
        Self::from_vec(device, data, self.shape.clone())
    }

    /// Returns a copy of `self` with `values[i]` added at `indices[i]`.
    ///
    /// # Errors
    ///
    /// Fails on a foreign device, mismatched index/value counts, or an index
    /// past the end of `self`.
    pub fn scatter_add(&self, device: &Device, indices: &Self, values: &Self) -> Result<Self, ComputeError> {
        device.check(self)?;
        device.check(indices)?;
        device.check(values)?;
        let data = dispatch_u32(
            device,
            Kernel::ScatterAdd,
            &[values.to_view(), indices.to_view(), self.to_view()],
            values.len(),
        )?;
        Self::from_vec(device, data, self.shape.clone())
    }
}

/// Dispatches a `u32` kernel, appending the empty config binding, and decodes
/// its single output buffer.
fn dispatch_u32(
    device: &Device,
    kernel: Kernel,
    binds: &[BufferView],
    num_elements: usize,
) -> Result<Vec<u32>, ComputeError> {
    let mut binds = binds.to_vec();
    binds.push(BufferView::from_slice(&[0u32]));
    let results = device
        .backend()
        .dispatch(&kernel, &binds, [calculate_workgroups(num_elements), 1, 1])?;
    let output = results
        .into_iter()
        .next()
        .ok_or(ComputeError::ShapeMismatch("kernel produced no output buffer"))?;
    Ok(decode_u32s(&output))
}
