//! Non-owning views over host-owned voxel sample memory.
//!
//! The host keeps ownership of the sample data for the duration of one
//! operator call; a view borrows it and is dropped before the call returns,
//! so no pointer ever outlives the host's lock on the buffer.

use std::marker::PhantomData;
use std::ptr::NonNull;

use crate::{ElementType, GridLayout};

/// Read-only view over a strided voxel grid.
#[derive(Debug, Clone, Copy)]
pub struct GridView<'a> {
    layout: GridLayout,
    data: NonNull<u8>,
    _marker: PhantomData<&'a [u8]>,
}

// The view only ever reads through an immutable borrow, so it can be shared
// freely across fork-join workers.
unsafe impl Send for GridView<'_> {}
unsafe impl Sync for GridView<'_> {}

impl<'a> GridView<'a> {
    /// Packed single-plane `F32` view over a slice.
    pub fn from_f32_slice(data: &'a [f32], dims: [usize; 3]) -> crate::Result<Self> {
        let layout = GridLayout::packed(dims, ElementType::F32, 1);
        let expected = layout
            .checked_voxel_count()
            .ok_or_else(|| crate::Error::InvalidInput(format!("grid extents {dims:?} overflow")))?;
        if data.len() != expected {
            return Err(crate::Error::InvalidInput(format!(
                "sample count mismatch: got {}, expected {} for extents {dims:?}",
                data.len(),
                expected
            )));
        }
        // SAFETY: slice pointers are never null.
        let data = unsafe { NonNull::new_unchecked(data.as_ptr() as *mut u8) };
        Ok(Self {
            layout,
            data,
            _marker: PhantomData,
        })
    }

    /// # Safety
    ///
    /// `data` must point to readable memory covering every sample `layout`
    /// addresses, and stay valid and unmutated for the lifetime `'a`.
    pub unsafe fn from_raw_parts(layout: GridLayout, data: NonNull<u8>) -> Self {
        Self {
            layout,
            data,
            _marker: PhantomData,
        }
    }

    pub fn layout(&self) -> &GridLayout {
        &self.layout
    }

    pub fn dims(&self) -> [usize; 3] {
        self.layout.dims
    }

    pub fn element(&self) -> ElementType {
        self.layout.element
    }

    pub fn planes(&self) -> usize {
        self.layout.planes
    }

    /// Checked sample read. Returns `None` outside the grid, for a plane the
    /// grid does not carry, or when the grid is not `F32`.
    pub fn get(&self, x: usize, y: usize, z: usize, plane: usize) -> Option<f32> {
        if self.layout.element != ElementType::F32
            || plane >= self.layout.planes
            || !self.layout.contains(x, y, z)
        {
            return None;
        }
        let offset = self.layout.byte_offset(x, y, z)
            + (plane * self.layout.element.size_bytes()) as isize;
        // SAFETY: the coordinate and plane were bounds-checked above.
        Some(unsafe { (self.data.as_ptr().offset(offset) as *const f32).read_unaligned() })
    }

    /// Plane-0 read for the convolution hot loop.
    ///
    /// # Safety
    ///
    /// `(x, y, z)` must be inside the grid and the element type must be `F32`.
    pub unsafe fn sample_unchecked(&self, x: usize, y: usize, z: usize) -> f32 {
        let offset = self.layout.byte_offset(x, y, z);
        (self.data.as_ptr().offset(offset) as *const f32).read_unaligned()
    }
}

/// Mutable view over a strided voxel grid.
#[derive(Debug)]
pub struct GridViewMut<'a> {
    layout: GridLayout,
    data: NonNull<u8>,
    _marker: PhantomData<&'a mut [u8]>,
}

unsafe impl Send for GridViewMut<'_> {}

impl<'a> GridViewMut<'a> {
    /// Packed single-plane `F32` view over a mutable slice.
    pub fn from_f32_slice_mut(data: &'a mut [f32], dims: [usize; 3]) -> crate::Result<Self> {
        let layout = GridLayout::packed(dims, ElementType::F32, 1);
        let expected = layout
            .checked_voxel_count()
            .ok_or_else(|| crate::Error::InvalidOutput(format!("grid extents {dims:?} overflow")))?;
        if data.len() != expected {
            return Err(crate::Error::InvalidOutput(format!(
                "sample count mismatch: got {}, expected {} for extents {dims:?}",
                data.len(),
                expected
            )));
        }
        // SAFETY: slice pointers are never null.
        let data = unsafe { NonNull::new_unchecked(data.as_mut_ptr() as *mut u8) };
        Ok(Self {
            layout,
            data,
            _marker: PhantomData,
        })
    }

    /// # Safety
    ///
    /// `data` must point to writable memory covering every sample `layout`
    /// addresses, exclusively borrowed for the lifetime `'a`.
    pub unsafe fn from_raw_parts(layout: GridLayout, data: NonNull<u8>) -> Self {
        Self {
            layout,
            data,
            _marker: PhantomData,
        }
    }

    pub fn layout(&self) -> &GridLayout {
        &self.layout
    }

    pub fn dims(&self) -> [usize; 3] {
        self.layout.dims
    }

    pub fn element(&self) -> ElementType {
        self.layout.element
    }

    pub fn planes(&self) -> usize {
        self.layout.planes
    }

    pub fn get(&self, x: usize, y: usize, z: usize, plane: usize) -> Option<f32> {
        self.as_view().get(x, y, z, plane)
    }

    /// Checked sample write.
    pub fn set(&mut self, x: usize, y: usize, z: usize, plane: usize, value: f32) -> crate::Result<()> {
        if self.layout.element != ElementType::F32 {
            return Err(crate::Error::InvalidOutput(
                "grid element type is not F32".into(),
            ));
        }
        if plane >= self.layout.planes || !self.layout.contains(x, y, z) {
            return Err(crate::Error::InvalidOutput(format!(
                "voxel ({x}, {y}, {z}) plane {plane} is outside the grid"
            )));
        }
        let offset = self.layout.byte_offset(x, y, z)
            + (plane * self.layout.element.size_bytes()) as isize;
        // SAFETY: the coordinate and plane were bounds-checked above.
        unsafe { (self.data.as_ptr().offset(offset) as *mut f32).write_unaligned(value) };
        Ok(())
    }

    /// Read-only reborrow of this view.
    pub fn as_view(&self) -> GridView<'_> {
        GridView {
            layout: self.layout,
            data: self.data,
            _marker: PhantomData,
        }
    }

    /// Shared write handle for fork-join workers. The writer borrows this
    /// view exclusively, so no other access to the grid can overlap it.
    pub fn writer(&mut self) -> SliceWriter<'_> {
        SliceWriter {
            layout: self.layout,
            data: self.data.as_ptr(),
            _marker: PhantomData,
        }
    }
}

/// Write handle shared by fork-join workers.
///
/// Concurrent callers must write disjoint voxels; the convolution pass
/// satisfies this by giving each worker its own z-slice range, which is what
/// makes the partitioned output pass race-free without any locking.
#[derive(Debug)]
pub struct SliceWriter<'a> {
    layout: GridLayout,
    data: *mut u8,
    _marker: PhantomData<&'a mut [u8]>,
}

unsafe impl Send for SliceWriter<'_> {}
unsafe impl Sync for SliceWriter<'_> {}

impl SliceWriter<'_> {
    pub fn dims(&self) -> [usize; 3] {
        self.layout.dims
    }

    /// Plane-0 write.
    ///
    /// # Safety
    ///
    /// `(x, y, z)` must be inside the grid, the element type must be `F32`,
    /// and no other thread may write the same voxel.
    pub unsafe fn write(&self, x: usize, y: usize, z: usize, value: f32) {
        debug_assert!(self.layout.contains(x, y, z));
        debug_assert_eq!(self.layout.element, ElementType::F32);
        let offset = self.layout.byte_offset(x, y, z);
        (self.data.offset(offset) as *mut f32).write_unaligned(value);
    }
}

/// Grid descriptor and data pointer exactly as the host hands them over.
#[derive(Debug, Clone, Copy)]
pub struct RawGrid {
    pub layout: GridLayout,
    pub data: *mut u8,
}

impl RawGrid {
    /// Read view over the described samples. Returns `None` when the data
    /// pointer is null or the descriptor is malformed (zero planes).
    ///
    /// # Safety
    ///
    /// A non-null `data` must point to readable memory covering `layout` for
    /// the duration of the returned borrow.
    pub unsafe fn view(&self) -> Option<GridView<'_>> {
        if self.layout.planes == 0 {
            return None;
        }
        NonNull::new(self.data).map(|data| GridView::from_raw_parts(self.layout, data))
    }

    /// Write view over the described samples. Returns `None` when the data
    /// pointer is null or the descriptor is malformed (zero planes).
    ///
    /// # Safety
    ///
    /// A non-null `data` must point to writable memory covering `layout`,
    /// exclusively borrowed for the duration of the returned borrow.
    pub unsafe fn view_mut(&mut self) -> Option<GridViewMut<'_>> {
        if self.layout.planes == 0 {
            return None;
        }
        NonNull::new(self.data).map(|data| GridViewMut::from_raw_parts(self.layout, data))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slice_view_reads_packed_samples() {
        let data: Vec<f32> = (0..24).map(|i| i as f32).collect();
        let view = GridView::from_f32_slice(&data, [2, 3, 4]).unwrap();

        assert_eq!(view.get(0, 0, 0, 0), Some(0.0));
        assert_eq!(view.get(1, 0, 0, 0), Some(1.0));
        assert_eq!(view.get(0, 1, 0, 0), Some(2.0));
        assert_eq!(view.get(0, 0, 1, 0), Some(6.0));
        assert_eq!(view.get(1, 2, 3, 0), Some(23.0));
    }

    #[test]
    fn slice_view_rejects_length_mismatch() {
        let data = vec![0.0f32; 7];
        assert!(GridView::from_f32_slice(&data, [2, 2, 2]).is_err());
    }

    #[test]
    fn get_is_none_out_of_bounds() {
        let data = vec![0.0f32; 8];
        let view = GridView::from_f32_slice(&data, [2, 2, 2]).unwrap();
        assert_eq!(view.get(2, 0, 0, 0), None);
        assert_eq!(view.get(0, 0, 0, 1), None);
    }

    #[test]
    fn mut_view_set_then_get() {
        let mut data = vec![0.0f32; 8];
        let mut view = GridViewMut::from_f32_slice_mut(&mut data, [2, 2, 2]).unwrap();

        view.set(1, 1, 1, 0, 42.0).unwrap();
        assert_eq!(view.get(1, 1, 1, 0), Some(42.0));
        assert!(view.set(2, 0, 0, 0, 1.0).is_err());
        drop(view);
        assert_eq!(data[7], 42.0);
    }

    #[test]
    fn writer_targets_plane_zero() {
        let mut data = vec![0.0f32; 8];
        let mut view = GridViewMut::from_f32_slice_mut(&mut data, [2, 2, 2]).unwrap();
        {
            let writer = view.writer();
            unsafe { writer.write(1, 0, 0, 5.0) };
        }
        assert_eq!(view.get(1, 0, 0, 0), Some(5.0));
    }

    #[test]
    fn raw_grid_with_null_data_yields_no_view() {
        let layout = GridLayout::packed([2, 2, 2], ElementType::F32, 1);
        let mut raw = RawGrid {
            layout,
            data: std::ptr::null_mut(),
        };
        assert!(unsafe { raw.view() }.is_none());
        assert!(unsafe { raw.view_mut() }.is_none());
    }

    #[test]
    fn raw_grid_with_zero_planes_yields_no_view() {
        let mut bytes = [0u8; 32];
        let layout = GridLayout {
            planes: 0,
            ..GridLayout::packed([2, 2, 2], ElementType::F32, 1)
        };
        let raw = RawGrid {
            layout,
            data: bytes.as_mut_ptr(),
        };
        assert!(unsafe { raw.view() }.is_none());
    }

    #[test]
    fn raw_grid_round_trips_samples() {
        let mut samples = [1.5f32, 2.5, 3.5, 4.5];
        let layout = GridLayout::packed([4, 1, 1], ElementType::F32, 1);
        let raw = RawGrid {
            layout,
            data: samples.as_mut_ptr() as *mut u8,
        };
        let view = unsafe { raw.view() }.unwrap();
        assert_eq!(view.get(2, 0, 0, 0), Some(3.5));
    }

    #[test]
    fn negative_stride_view_reads_reversed() {
        let mut samples = [10.0f32, 20.0, 30.0, 40.0];
        // Point at the last element and step backwards along x.
        let layout = GridLayout {
            dims: [4, 1, 1],
            strides: [-4, 16, 16],
            element: ElementType::F32,
            planes: 1,
        };
        let base = unsafe { samples.as_mut_ptr().add(3) };
        let raw = RawGrid {
            layout,
            data: base as *mut u8,
        };
        let view = unsafe { raw.view() }.unwrap();
        assert_eq!(view.get(0, 0, 0, 0), Some(40.0));
        assert_eq!(view.get(3, 0, 0, 0), Some(10.0));
    }
}
