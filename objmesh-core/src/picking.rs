/// Color-coded object picking: reversible mapping between item ids and RGB
use crate::error::{MeshError, MeshResult};

/// Largest id that fits in one RGB8 pixel.
pub const MAX_PICK_ID: u32 = 0x00FF_FFFF;

/// Encodes item ids as colors for the offscreen picking pass.
pub trait PickEncoder {
    fn id_to_color(&self, id: u32) -> MeshResult<[f32; 3]>;
}

/// Little-endian packing: red holds the low byte.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RgbPicking;

impl PickEncoder for RgbPicking {
    fn id_to_color(&self, id: u32) -> MeshResult<[f32; 3]> {
        if id > MAX_PICK_ID {
            return Err(MeshError::PickIdOutOfRange { id });
        }
        let channel = |shift: u32| ((id >> shift) & 0xff) as f32 / 255.0;
        Ok([channel(0), channel(8), channel(16)])
    }
}

impl RgbPicking {
    /// Recover the id from a pixel read back from the picking target.
    pub fn color_to_id(pixel: [u8; 3]) -> u32 {
        u32::from(pixel[0]) | (u32::from(pixel[1]) << 8) | (u32::from(pixel[2]) << 16)
    }
}
