use std::ptr::NonNull;

use crate::{ElementType, GridLayout, GridView, GridViewMut, RawGrid};

/// Owned, packed voxel buffer.
///
/// Stands in for the host's matrix storage in tests, benchmarks, and
/// self-contained pipelines. Operators never require it: they work on views
/// and raw descriptors, which this type hands out over its own allocation.
#[derive(Debug, Clone)]
pub struct GridBuffer {
    layout: GridLayout,
    data: Vec<u8>,
}

impl GridBuffer {
    /// Zero-initialized buffer with a packed x-fastest layout.
    pub fn new(dims: [usize; 3], element: ElementType, planes: usize) -> crate::Result<Self> {
        if planes == 0 {
            return Err(crate::Error::InvalidInput(
                "plane count must be at least 1".into(),
            ));
        }
        let layout = GridLayout::packed(dims, element, planes);
        let bytes = layout.checked_byte_len().ok_or_else(|| {
            crate::Error::OutOfMemory(format!("grid extents {dims:?} overflow the address space"))
        })?;
        let mut data = Vec::new();
        data.try_reserve_exact(bytes)
            .map_err(|e| crate::Error::OutOfMemory(format!("grid of {bytes} bytes: {e}")))?;
        data.resize(bytes, 0);
        Ok(Self { layout, data })
    }

    /// Single-plane `F32` buffer initialized from `samples` in packed order.
    pub fn from_f32(dims: [usize; 3], samples: &[f32]) -> crate::Result<Self> {
        let mut buffer = Self::new(dims, ElementType::F32, 1)?;
        let expected = buffer.layout.voxel_count();
        if samples.len() != expected {
            return Err(crate::Error::InvalidInput(format!(
                "sample count mismatch: got {}, expected {} for extents {dims:?}",
                samples.len(),
                expected
            )));
        }
        for (chunk, value) in buffer.data.chunks_exact_mut(4).zip(samples) {
            chunk.copy_from_slice(&value.to_ne_bytes());
        }
        Ok(buffer)
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

    pub fn view(&self) -> GridView<'_> {
        // SAFETY: the packed allocation covers the layout, and Vec pointers
        // are never null.
        unsafe {
            GridView::from_raw_parts(self.layout, NonNull::new_unchecked(self.data.as_ptr() as *mut u8))
        }
    }

    pub fn view_mut(&mut self) -> GridViewMut<'_> {
        // SAFETY: as above, with exclusive access through &mut self.
        unsafe {
            GridViewMut::from_raw_parts(self.layout, NonNull::new_unchecked(self.data.as_mut_ptr()))
        }
    }

    /// Descriptor + pointer pair in the shape the host hands to operators.
    pub fn as_raw(&mut self) -> RawGrid {
        RawGrid {
            layout: self.layout,
            data: self.data.as_mut_ptr(),
        }
    }

    /// Fill one plane from a per-voxel function, converting the value to the
    /// buffer's element type.
    pub fn fill_with<F>(&mut self, plane: usize, mut f: F) -> crate::Result<()>
    where
        F: FnMut(usize, usize, usize) -> f32,
    {
        if plane >= self.layout.planes {
            return Err(crate::Error::InvalidInput(format!(
                "plane {plane} is outside the grid (planes = {})",
                self.layout.planes
            )));
        }
        let [dim_x, dim_y, dim_z] = self.layout.dims;
        for z in 0..dim_z {
            for y in 0..dim_y {
                for x in 0..dim_x {
                    self.write_sample(x, y, z, plane, f(x, y, z));
                }
            }
        }
        Ok(())
    }

    /// Copy one plane out as `f32`, converting from the buffer's element type.
    pub fn to_f32_vec(&self, plane: usize) -> crate::Result<Vec<f32>> {
        if plane >= self.layout.planes {
            return Err(crate::Error::InvalidInput(format!(
                "plane {plane} is outside the grid (planes = {})",
                self.layout.planes
            )));
        }
        let mut samples = Vec::new();
        samples
            .try_reserve_exact(self.layout.voxel_count())
            .map_err(|e| {
                crate::Error::OutOfMemory(format!(
                    "plane copy of {} samples: {e}",
                    self.layout.voxel_count()
                ))
            })?;
        let [dim_x, dim_y, dim_z] = self.layout.dims;
        for z in 0..dim_z {
            for y in 0..dim_y {
                for x in 0..dim_x {
                    samples.push(self.read_sample(x, y, z, plane));
                }
            }
        }
        Ok(samples)
    }

    fn sample_range(&self, x: usize, y: usize, z: usize, plane: usize) -> std::ops::Range<usize> {
        let size = self.layout.element.size_bytes();
        let start = self.layout.byte_offset(x, y, z) as usize + plane * size;
        start..start + size
    }

    fn write_sample(&mut self, x: usize, y: usize, z: usize, plane: usize, value: f32) {
        let range = self.sample_range(x, y, z, plane);
        let bytes = &mut self.data[range];
        match self.layout.element {
            ElementType::U8 => bytes[0] = value as u8,
            ElementType::I32 => bytes.copy_from_slice(&(value as i32).to_ne_bytes()),
            ElementType::F32 => bytes.copy_from_slice(&value.to_ne_bytes()),
            ElementType::F64 => bytes.copy_from_slice(&(value as f64).to_ne_bytes()),
        }
    }

    fn read_sample(&self, x: usize, y: usize, z: usize, plane: usize) -> f32 {
        let range = self.sample_range(x, y, z, plane);
        let bytes = &self.data[range];
        match self.layout.element {
            ElementType::U8 => bytes[0] as f32,
            ElementType::I32 => {
                let mut raw = [0u8; 4];
                raw.copy_from_slice(bytes);
                i32::from_ne_bytes(raw) as f32
            }
            ElementType::F32 => {
                let mut raw = [0u8; 4];
                raw.copy_from_slice(bytes);
                f32::from_ne_bytes(raw)
            }
            ElementType::F64 => {
                let mut raw = [0u8; 8];
                raw.copy_from_slice(bytes);
                f64::from_ne_bytes(raw) as f32
            }
        }
    }
}
