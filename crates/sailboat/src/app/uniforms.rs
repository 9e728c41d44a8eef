//! Typed uniform channel.
//!
//! Each program's uniform block is described by a closed enum of slots. A slot
//! resolves to a byte offset and a value kind once, following WGSL struct
//! layout rules, so setting a value never looks anything up by name. Values
//! are staged in a [`UniformBlock`] and uploaded by [`UniformBuffer::flush`]
//! only when something changed.

use std::marker::PhantomData;

use glam::{Mat4, Vec3, Vec4};

/// Shape of a value stored in a uniform slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UniformKind {
    F32,
    U32,
    Vec3,
    Vec4,
    Mat4,
}

impl UniformKind {
    /// Bytes written for a value of this kind.
    pub const fn size(self) -> usize {
        match self {
            UniformKind::F32 | UniformKind::U32 => 4,
            UniformKind::Vec3 => 12,
            UniformKind::Vec4 => 16,
            UniformKind::Mat4 => 64,
        }
    }

    /// WGSL alignment of this kind.
    pub const fn align(self) -> usize {
        match self {
            UniformKind::F32 | UniformKind::U32 => 4,
            UniformKind::Vec3 | UniformKind::Vec4 | UniformKind::Mat4 => 16,
        }
    }
}

/// A value headed for a uniform slot.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum UniformValue {
    F32(f32),
    U32(u32),
    Vec3(Vec3),
    Vec4(Vec4),
    Mat4(Mat4),
}

impl UniformValue {
    pub fn kind(&self) -> UniformKind {
        match self {
            UniformValue::F32(_) => UniformKind::F32,
            UniformValue::U32(_) => UniformKind::U32,
            UniformValue::Vec3(_) => UniformKind::Vec3,
            UniformValue::Vec4(_) => UniformKind::Vec4,
            UniformValue::Mat4(_) => UniformKind::Mat4,
        }
    }

    /// Write the value's bytes; `dst` must be exactly `kind().size()` long.
    fn write(&self, dst: &mut [u8]) {
        match self {
            UniformValue::F32(v) => dst.copy_from_slice(bytemuck::bytes_of(v)),
            UniformValue::U32(v) => dst.copy_from_slice(bytemuck::bytes_of(v)),
            UniformValue::Vec3(v) => dst.copy_from_slice(bytemuck::cast_slice(&v.to_array())),
            UniformValue::Vec4(v) => dst.copy_from_slice(bytemuck::cast_slice(&v.to_array())),
            UniformValue::Mat4(m) => dst.copy_from_slice(bytemuck::cast_slice(&m.to_cols_array())),
        }
    }
}

impl From<f32> for UniformValue {
    fn from(v: f32) -> Self {
        UniformValue::F32(v)
    }
}

impl From<u32> for UniformValue {
    fn from(v: u32) -> Self {
        UniformValue::U32(v)
    }
}

impl From<Vec3> for UniformValue {
    fn from(v: Vec3) -> Self {
        UniformValue::Vec3(v)
    }
}

impl From<Vec4> for UniformValue {
    fn from(v: Vec4) -> Self {
        UniformValue::Vec4(v)
    }
}

impl From<Mat4> for UniformValue {
    fn from(v: Mat4) -> Self {
        UniformValue::Mat4(v)
    }
}

/// Error returned when a value does not fit its slot.
#[derive(Debug, Clone, PartialEq)]
pub enum UniformError {
    KindMismatch {
        slot: &'static str,
        expected: UniformKind,
        found: UniformKind,
    },
}

impl std::fmt::Display for UniformError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UniformError::KindMismatch { slot, expected, found } => write!(
                f,
                "Uniform '{}' expects {:?}, got {:?}",
                slot, expected, found
            ),
        }
    }
}

impl std::error::Error for UniformError {}

/// Closed set of uniforms belonging to one program's block.
pub trait UniformSlot: Copy + std::fmt::Debug + 'static {
    /// Size of the whole block in bytes, including trailing padding.
    const BLOCK_SIZE: usize;
    /// Every slot, in declaration order.
    const ALL: &'static [Self];

    /// Byte offset and kind of this slot.
    fn layout(self) -> (usize, UniformKind);

    /// Member name in the WGSL struct.
    fn name(self) -> &'static str;
}

/// Shared per-frame block: camera and sun.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SceneSlot {
    ViewProj,
    View,
    Projection,
    InverseViewProj,
    CameraPosition,
    Time,
    SunDirection,
    SunAltitude,
    SunAmbient,
    SunDiffuse,
    SunSpecular,
    SunPosition,
}

impl UniformSlot for SceneSlot {
    const BLOCK_SIZE: usize = 352;
    const ALL: &'static [Self] = &[
        SceneSlot::ViewProj,
        SceneSlot::View,
        SceneSlot::Projection,
        SceneSlot::InverseViewProj,
        SceneSlot::CameraPosition,
        SceneSlot::Time,
        SceneSlot::SunDirection,
        SceneSlot::SunAltitude,
        SceneSlot::SunAmbient,
        SceneSlot::SunDiffuse,
        SceneSlot::SunSpecular,
        SceneSlot::SunPosition,
    ];

    fn layout(self) -> (usize, UniformKind) {
        match self {
            SceneSlot::ViewProj => (0, UniformKind::Mat4),
            SceneSlot::View => (64, UniformKind::Mat4),
            SceneSlot::Projection => (128, UniformKind::Mat4),
            SceneSlot::InverseViewProj => (192, UniformKind::Mat4),
            SceneSlot::CameraPosition => (256, UniformKind::Vec3),
            SceneSlot::Time => (268, UniformKind::F32),
            SceneSlot::SunDirection => (272, UniformKind::Vec3),
            SceneSlot::SunAltitude => (284, UniformKind::F32),
            SceneSlot::SunAmbient => (288, UniformKind::Vec3),
            SceneSlot::SunDiffuse => (304, UniformKind::Vec3),
            SceneSlot::SunSpecular => (320, UniformKind::Vec3),
            SceneSlot::SunPosition => (336, UniformKind::Vec3),
        }
    }

    fn name(self) -> &'static str {
        match self {
            SceneSlot::ViewProj => "view_proj",
            SceneSlot::View => "view",
            SceneSlot::Projection => "projection",
            SceneSlot::InverseViewProj => "inv_view_proj",
            SceneSlot::CameraPosition => "camera_pos",
            SceneSlot::Time => "time",
            SceneSlot::SunDirection => "sun_direction",
            SceneSlot::SunAltitude => "sun_altitude",
            SceneSlot::SunAmbient => "sun_ambient",
            SceneSlot::SunDiffuse => "sun_diffuse",
            SceneSlot::SunSpecular => "sun_specular",
            SceneSlot::SunPosition => "sun_position",
        }
    }
}

/// Parameters of both water compute stages.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum WaterComputeSlot {
    Time,
    GridRes,
    GridSize,
}

impl UniformSlot for WaterComputeSlot {
    const BLOCK_SIZE: usize = 16;
    const ALL: &'static [Self] = &[
        WaterComputeSlot::Time,
        WaterComputeSlot::GridRes,
        WaterComputeSlot::GridSize,
    ];

    fn layout(self) -> (usize, UniformKind) {
        match self {
            WaterComputeSlot::Time => (0, UniformKind::F32),
            WaterComputeSlot::GridRes => (4, UniformKind::U32),
            WaterComputeSlot::GridSize => (8, UniformKind::F32),
        }
    }

    fn name(self) -> &'static str {
        match self {
            WaterComputeSlot::Time => "time",
            WaterComputeSlot::GridRes => "grid_res",
            WaterComputeSlot::GridSize => "grid_size",
        }
    }
}

/// Per-object block for lit meshes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ModelSlot {
    Model,
    Tint,
}

impl UniformSlot for ModelSlot {
    const BLOCK_SIZE: usize = 80;
    const ALL: &'static [Self] = &[ModelSlot::Model, ModelSlot::Tint];

    fn layout(self) -> (usize, UniformKind) {
        match self {
            ModelSlot::Model => (0, UniformKind::Mat4),
            ModelSlot::Tint => (64, UniformKind::Vec4),
        }
    }

    fn name(self) -> &'static str {
        match self {
            ModelSlot::Model => "model",
            ModelSlot::Tint => "tint",
        }
    }
}

/// CPU staging copy of a uniform block.
pub struct UniformBlock<S: UniformSlot> {
    bytes: Vec<u8>,
    dirty: bool,
    _slots: PhantomData<S>,
}

impl<S: UniformSlot> Default for UniformBlock<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: UniformSlot> UniformBlock<S> {
    /// Zeroed block, marked dirty so the first flush uploads it.
    pub fn new() -> Self {
        Self {
            bytes: vec![0; S::BLOCK_SIZE],
            dirty: true,
            _slots: PhantomData,
        }
    }

    pub fn set(&mut self, slot: S, value: impl Into<UniformValue>) -> Result<(), UniformError> {
        let value = value.into();
        let (offset, kind) = slot.layout();
        if value.kind() != kind {
            return Err(UniformError::KindMismatch {
                slot: slot.name(),
                expected: kind,
                found: value.kind(),
            });
        }

        let mut staged = [0u8; 64];
        let staged = &mut staged[..kind.size()];
        value.write(staged);

        let dst = &mut self.bytes[offset..offset + kind.size()];
        if dst != staged {
            dst.copy_from_slice(staged);
            self.dirty = true;
        }
        Ok(())
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Clear the dirty flag, returning whether it was set.
    pub fn take_dirty(&mut self) -> bool {
        std::mem::replace(&mut self.dirty, false)
    }
}

/// A [`UniformBlock`] paired with the GPU buffer it uploads into.
pub struct UniformBuffer<S: UniformSlot> {
    block: UniformBlock<S>,
    buffer: wgpu::Buffer,
}

impl<S: UniformSlot> UniformBuffer<S> {
    pub fn new(device: &wgpu::Device, label: &str) -> Self {
        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(label),
            size: S::BLOCK_SIZE as wgpu::BufferAddress,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        Self {
            block: UniformBlock::new(),
            buffer,
        }
    }

    /// Stage a value. A kind mismatch is logged and the slot left unchanged.
    pub fn set(&mut self, slot: S, value: impl Into<UniformValue>) {
        if let Err(e) = self.block.set(slot, value) {
            log::error!("{}", e);
        }
    }

    /// Upload the staged block if it changed since the last flush.
    pub fn flush(&mut self, queue: &wgpu::Queue) {
        if self.block.take_dirty() {
            queue.write_buffer(&self.buffer, 0, self.block.bytes());
        }
    }

    pub fn binding(&self) -> wgpu::BindingResource<'_> {
        self.buffer.as_entire_binding()
    }

    pub fn min_binding_size() -> Option<wgpu::BufferSize> {
        wgpu::BufferSize::new(S::BLOCK_SIZE as u64)
    }
}

/// Layout entry for a uniform block of `S` at `binding`.
pub fn uniform_entry<S: UniformSlot>(
    binding: u32,
    visibility: wgpu::ShaderStages,
) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset: false,
            min_binding_size: UniformBuffer::<S>::min_binding_size(),
        },
        count: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check_table<S: UniformSlot>() {
        let mut prev_end = 0;
        for &slot in S::ALL {
            let (offset, kind) = slot.layout();
            assert_eq!(offset % kind.align(), 0, "{:?} misaligned", slot);
            assert!(offset >= prev_end, "{:?} overlaps previous slot", slot);
            prev_end = offset + kind.size();
        }
        assert!(prev_end <= S::BLOCK_SIZE);
        assert_eq!(S::BLOCK_SIZE % 16, 0);
    }

    #[test]
    fn test_slot_tables_are_well_formed() {
        check_table::<SceneSlot>();
        check_table::<WaterComputeSlot>();
        check_table::<ModelSlot>();
    }

    #[test]
    fn test_set_writes_at_offset() {
        let mut block = UniformBlock::<WaterComputeSlot>::new();
        block.set(WaterComputeSlot::GridRes, 32u32).unwrap();
        block.set(WaterComputeSlot::Time, 1.5f32).unwrap();
        let words: [u32; 4] = bytemuck::pod_read_unaligned(block.bytes());
        assert_eq!(f32::from_bits(words[0]), 1.5);
        assert_eq!(words[1], 32);
        assert_eq!(words[2], 0);
    }

    #[test]
    fn test_kind_mismatch_rejected() {
        let mut block = UniformBlock::<SceneSlot>::new();
        let err = block.set(SceneSlot::Time, Vec3::ONE).unwrap_err();
        assert_eq!(
            err,
            UniformError::KindMismatch {
                slot: "time",
                expected: UniformKind::F32,
                found: UniformKind::Vec3,
            }
        );
        assert!(block.bytes().iter().all(|&b| b == 0));
    }

    #[test]
    fn test_dirty_only_on_change() {
        let mut block = UniformBlock::<ModelSlot>::new();
        assert!(block.take_dirty());
        block.set(ModelSlot::Tint, Vec4::ONE).unwrap();
        assert!(block.take_dirty());
        block.set(ModelSlot::Tint, Vec4::ONE).unwrap();
        assert!(!block.is_dirty());
    }

    #[test]
    fn test_mat4_column_major() {
        let mut block = UniformBlock::<ModelSlot>::new();
        let m = Mat4::from_translation(Vec3::new(1.0, 2.0, 3.0));
        block.set(ModelSlot::Model, m).unwrap();
        let floats: [f32; 16] = bytemuck::pod_read_unaligned(&block.bytes()[..64]);
        assert_eq!(&floats[12..15], &[1.0, 2.0, 3.0]);
    }
}
