use crate::{
    asset::{swap_channels, Asset},
    code::CodeRegistry,
    stream::DataCursor,
    ByteString, Error, GameVersion,
};

pub struct Sprite {
    pub name: ByteString,

    /// Width and height, inherited from the first frame of animation
    /// (1x1 for a sprite with no frames).
    pub width: u32,
    pub height: u32,

    pub origin_x: u32,
    pub origin_y: u32,

    pub frames: Vec<Frame>,

    /// Whether each frame carries its own collision map. If false there is
    /// exactly one shared map.
    pub separate_collision: bool,
    pub collision_maps: Vec<CollisionMap>,
}

/// One frame of animation, stored as RGBA (channel-swapped on read from the
/// container's BGRA).
pub struct Frame {
    pub width: u32,
    pub height: u32,
    pub data: Box<[u8]>,
}

pub struct CollisionMap {
    pub width: u32,
    pub height: u32,
    pub bbox_left: u32,
    pub bbox_right: u32,
    pub bbox_bottom: u32,
    pub bbox_top: u32,

    /// width * height cells, row-major
    pub data: Vec<bool>,
}

fn read_collision_map(cur: &mut DataCursor) -> Result<CollisionMap, Error> {
    cur.skip(4)?; // data version, 800
    let width = cur.read_u32()?;
    let height = cur.read_u32()?;
    let bbox_left = cur.read_u32()?;
    let bbox_right = cur.read_u32()?;
    let bbox_bottom = cur.read_u32()?;
    let bbox_top = cur.read_u32()?;

    let cells = width as usize * height as usize;
    let mut data = Vec::with_capacity(cells.min(cur.remaining() / 4));
    for _ in 0..cells {
        data.push(cur.read_bool()?);
    }

    Ok(CollisionMap { width, height, bbox_left, bbox_right, bbox_bottom, bbox_top, data })
}

impl Asset for Sprite {
    fn deserialize(
        cur: &mut DataCursor,
        _version: GameVersion,
        _registry: &mut dyn CodeRegistry,
    ) -> Result<Self, Error> {
        let name = cur.read_pas_string()?;
        cur.skip(4)?; // data version, 800
        let origin_x = cur.read_u32()?;
        let origin_y = cur.read_u32()?;

        let frame_count = cur.read_u32()? as usize;
        let mut frames = Vec::with_capacity(frame_count);
        let mut separate_collision = false;
        let mut collision_maps = Vec::new();
        let (mut width, mut height) = (1, 1);

        if frame_count != 0 {
            for i in 0..frame_count {
                cur.skip(4)?; // data version, 800
                let frame_width = cur.read_u32()?;
                let frame_height = cur.read_u32()?;
                let pixel_len = cur.read_u32()? as usize;
                if pixel_len as u64 != u64::from(frame_width) * u64::from(frame_height) * 4 {
                    return Err(Error::CorruptBlock(format!(
                        "sprite '{}' frame {} has {} pixel bytes for {}x{}",
                        name, i, pixel_len, frame_width, frame_height
                    )))
                }

                let mut data = cur.take(pixel_len)?.to_vec();
                swap_channels(&mut data); // BGRA -> RGBA

                // the sprite inherits its size from the first frame
                if i == 0 {
                    width = frame_width;
                    height = frame_height;
                }
                frames.push(Frame { width: frame_width, height: frame_height, data: data.into_boxed_slice() });
            }

            separate_collision = cur.read_bool()?;
            let map_count = if separate_collision { frame_count } else { 1 };
            collision_maps.reserve(map_count);
            for _ in 0..map_count {
                collision_maps.push(read_collision_map(cur)?);
            }
        }

        Ok(Sprite {
            name,
            width,
            height,
            origin_x,
            origin_y,
            frames,
            separate_collision,
            collision_maps,
        })
    }
}
