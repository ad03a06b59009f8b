use crate::{
    asset::Asset,
    code::{CodeHandle, CodeRegistry},
    stream::DataCursor,
    ByteString, Error, GameVersion,
};

pub struct Room {
    pub name: ByteString,
    pub caption: ByteString,
    pub width: u32,
    pub height: u32,

    /// Room speed in frames per second
    pub speed: u32,

    pub persistent: bool,
    pub bg_colour: u32,
    pub clear_screen: bool,
    pub creation_code: CodeHandle,
    pub backgrounds: Vec<RoomBackground>,
    pub views_enabled: bool,
    pub views: Vec<RoomView>,
    pub instances: Vec<RoomInstance>,
    pub tiles: Vec<RoomTile>,
}

pub struct RoomBackground {
    pub visible_on_start: bool,

    /// If true this is drawn over instances instead of behind them
    pub is_foreground: bool,

    pub source_bg: Option<u32>,
    pub xoffset: i32,
    pub yoffset: i32,
    pub tile_horizontal: bool,
    pub tile_vertical: bool,
    pub hspeed: i32,
    pub vspeed: i32,
    pub stretch: bool,
}

pub struct RoomView {
    pub visible: bool,
    pub source_x: i32,
    pub source_y: i32,
    pub source_w: u32,
    pub source_h: u32,
    pub port_x: i32,
    pub port_y: i32,
    pub port_w: u32,
    pub port_h: u32,
    pub following_hborder: i32,
    pub following_vborder: i32,
    pub following_hspeed: i32,
    pub following_vspeed: i32,
    pub following_target: Option<u32>,
}

pub struct RoomInstance {
    pub x: i32,
    pub y: i32,
    pub object_index: u32,
    pub id: u32,
    pub creation: CodeHandle,
}

pub struct RoomTile {
    pub x: i32,
    pub y: i32,
    pub source_bg: Option<u32>,
    pub tile_x: u32,
    pub tile_y: u32,
    pub width: u32,
    pub height: u32,
    pub depth: i32,
    pub id: u32,
}

impl Asset for Room {
    fn deserialize(
        cur: &mut DataCursor,
        _version: GameVersion,
        registry: &mut dyn CodeRegistry,
    ) -> Result<Self, Error> {
        let name = cur.read_pas_string()?;
        cur.skip(4)?; // data version, 541
        let caption = cur.read_pas_string()?;
        let width = cur.read_u32()?;
        let height = cur.read_u32()?;
        let speed = cur.read_u32()?;
        let persistent = cur.read_bool()?;
        let bg_colour = cur.read_u32()?;
        let clear_screen = cur.read_bool()?;
        let creation_code = registry.register(cur.read_pas_string()?.as_ref());

        let count = cur.read_u32()? as usize;
        let mut backgrounds = Vec::with_capacity(count.min(cur.remaining() / 40));
        for _ in 0..count {
            backgrounds.push(RoomBackground {
                visible_on_start: cur.read_bool()?,
                is_foreground: cur.read_bool()?,
                source_bg: cur.read_index()?,
                xoffset: cur.read_i32()?,
                yoffset: cur.read_i32()?,
                tile_horizontal: cur.read_bool()?,
                tile_vertical: cur.read_bool()?,
                hspeed: cur.read_i32()?,
                vspeed: cur.read_i32()?,
                stretch: cur.read_bool()?,
            });
        }

        let views_enabled = cur.read_bool()?;
        let count = cur.read_u32()? as usize;
        let mut views = Vec::with_capacity(count.min(cur.remaining() / 56));
        for _ in 0..count {
            views.push(RoomView {
                visible: cur.read_bool()?,
                source_x: cur.read_i32()?,
                source_y: cur.read_i32()?,
                source_w: cur.read_u32()?,
                source_h: cur.read_u32()?,
                port_x: cur.read_i32()?,
                port_y: cur.read_i32()?,
                port_w: cur.read_u32()?,
                port_h: cur.read_u32()?,
                following_hborder: cur.read_i32()?,
                following_vborder: cur.read_i32()?,
                following_hspeed: cur.read_i32()?,
                following_vspeed: cur.read_i32()?,
                following_target: cur.read_index()?,
            });
        }

        let count = cur.read_u32()? as usize;
        let mut instances = Vec::with_capacity(count.min(cur.remaining() / 20));
        for _ in 0..count {
            instances.push(RoomInstance {
                x: cur.read_i32()?,
                y: cur.read_i32()?,
                object_index: cur.read_u32()?,
                id: cur.read_u32()?,
                creation: registry.register(cur.read_pas_string()?.as_ref()),
            });
        }

        let count = cur.read_u32()? as usize;
        let mut tiles = Vec::with_capacity(count.min(cur.remaining() / 36));
        for _ in 0..count {
            tiles.push(RoomTile {
                x: cur.read_i32()?,
                y: cur.read_i32()?,
                source_bg: cur.read_index()?,
                tile_x: cur.read_u32()?,
                tile_y: cur.read_u32()?,
                width: cur.read_u32()?,
                height: cur.read_u32()?,
                depth: cur.read_i32()?,
                id: cur.read_u32()?,
            });
        }

        Ok(Room {
            name,
            caption,
            width,
            height,
            speed,
            persistent,
            bg_colour,
            clear_screen,
            creation_code,
            backgrounds,
            views_enabled,
            views,
            instances,
            tiles,
        })
    }
}
