#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementType {
    U8,
    I32,
    F32,
    F64,
}

impl ElementType {
    pub fn size_bytes(&self) -> usize {
        match self {
            ElementType::U8 => 1,
            ElementType::I32 | ElementType::F32 => 4,
            ElementType::F64 => 8,
        }
    }
}

/// Descriptor for a three-axis voxel grid.
///
/// **Layout Convention:**
/// Axis 0 (x) is the fastest-varying axis of a packed grid, followed by
/// y and then z. Strides are byte offsets per axis and may describe
/// non-contiguous or transposed sub-views; the planes of one voxel are
/// interleaved, so plane `p` lives at `byte_offset(x, y, z) + p * element.size_bytes()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridLayout {
    pub dims: [usize; 3],
    pub strides: [isize; 3],
    pub element: ElementType,
    pub planes: usize,
}

impl GridLayout {
    /// Packed x-fastest layout with interleaved planes.
    pub fn packed(dims: [usize; 3], element: ElementType, planes: usize) -> Self {
        let x_stride = (planes * element.size_bytes()) as isize;
        let y_stride = x_stride * dims[0] as isize;
        let z_stride = y_stride * dims[1] as isize;
        Self {
            dims,
            strides: [x_stride, y_stride, z_stride],
            element,
            planes,
        }
    }

    pub fn voxel_count(&self) -> usize {
        self.dims[0]
            .saturating_mul(self.dims[1])
            .saturating_mul(self.dims[2])
    }

    pub fn checked_voxel_count(&self) -> Option<usize> {
        self.dims[0]
            .checked_mul(self.dims[1])
            .and_then(|partial| partial.checked_mul(self.dims[2]))
    }

    /// Total bytes a packed buffer of this layout occupies.
    pub fn checked_byte_len(&self) -> Option<usize> {
        self.checked_voxel_count()
            .and_then(|voxels| voxels.checked_mul(self.planes))
            .and_then(|samples| samples.checked_mul(self.element.size_bytes()))
    }

    /// A zero extent on any axis makes the iteration space empty.
    pub fn is_empty(&self) -> bool {
        self.dims.iter().any(|&extent| extent == 0)
    }

    pub fn contains(&self, x: usize, y: usize, z: usize) -> bool {
        x < self.dims[0] && y < self.dims[1] && z < self.dims[2]
    }

    /// Byte offset of plane 0 of the voxel at `(x, y, z)`.
    pub fn byte_offset(&self, x: usize, y: usize, z: usize) -> isize {
        x as isize * self.strides[0] + y as isize * self.strides[1] + z as isize * self.strides[2]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn element_sizes_match_host_formats() {
        assert_eq!(ElementType::U8.size_bytes(), 1);
        assert_eq!(ElementType::I32.size_bytes(), 4);
        assert_eq!(ElementType::F32.size_bytes(), 4);
        assert_eq!(ElementType::F64.size_bytes(), 8);
    }

    #[test]
    fn packed_layout_is_x_fastest() {
        let layout = GridLayout::packed([4, 3, 2], ElementType::F32, 1);
        assert_eq!(layout.strides, [4, 16, 48]);
        assert_eq!(layout.byte_offset(1, 0, 0), 4);
        assert_eq!(layout.byte_offset(0, 1, 0), 16);
        assert_eq!(layout.byte_offset(0, 0, 1), 48);
    }

    #[test]
    fn packed_layout_interleaves_planes() {
        let layout = GridLayout::packed([4, 3, 2], ElementType::F32, 2);
        assert_eq!(layout.strides[0], 8);
        assert_eq!(layout.checked_byte_len(), Some(4 * 3 * 2 * 2 * 4));
    }

    #[test]
    fn voxel_count_handles_overflow() {
        let layout = GridLayout {
            dims: [usize::MAX, 2, 2],
            strides: [1, 1, 1],
            element: ElementType::U8,
            planes: 1,
        };
        assert_eq!(layout.checked_voxel_count(), None);
        assert_eq!(layout.voxel_count(), usize::MAX);
    }

    #[test]
    fn zero_extent_is_empty() {
        assert!(GridLayout::packed([0, 4, 4], ElementType::F32, 1).is_empty());
        assert!(GridLayout::packed([4, 0, 4], ElementType::F32, 1).is_empty());
        assert!(!GridLayout::packed([1, 1, 1], ElementType::F32, 1).is_empty());
    }

    #[test]
    fn contains_checks_every_axis() {
        let layout = GridLayout::packed([2, 3, 4], ElementType::F32, 1);
        assert!(layout.contains(1, 2, 3));
        assert!(!layout.contains(2, 0, 0));
        assert!(!layout.contains(0, 3, 0));
        assert!(!layout.contains(0, 0, 4));
    }

    #[test]
    fn byte_offset_follows_negative_strides() {
        // Reversed x-axis sub-view.
        let layout = GridLayout {
            dims: [4, 1, 1],
            strides: [-4, 16, 16],
            element: ElementType::F32,
            planes: 1,
        };
        assert_eq!(layout.byte_offset(3, 0, 0), -12);
    }
}
