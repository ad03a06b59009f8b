use crate::{
    asset::Asset,
    code::CodeRegistry,
    stream::DataCursor,
    ByteString, Error, GameVersion,
};

/// Coordinate data per character: x, y, width, height, cursor offset,
/// cursor distance. Characters 0-255, so 1536 dwords total.
pub const CHAR_MAP_LEN: usize = 0x600;

pub struct Font {
    pub name: ByteString,

    /// Name of the system font this was rendered from
    pub sys_name: ByteString,

    pub size: u32,
    pub bold: bool,
    pub italic: bool,
    pub range_begin: u32,
    pub range_end: u32,

    /// Windows charset id, 8.1 only (still in its packed position)
    pub charset: u32,
    /// Anti-aliasing level, 8.1 only (still in its packed position)
    pub aa_level: u32,

    pub char_map: Box<[u32]>,

    /// The rendered glyph atlas: white RGBA with the stored alpha expanded
    /// into the fourth channel.
    pub width: u32,
    pub height: u32,
    pub image: Box<[u8]>,
}

impl Asset for Font {
    fn deserialize(
        cur: &mut DataCursor,
        version: GameVersion,
        _registry: &mut dyn CodeRegistry,
    ) -> Result<Self, Error> {
        let name = cur.read_pas_string()?;
        cur.skip(4)?; // data version, 800
        let sys_name = cur.read_pas_string()?;
        let size = cur.read_u32()?;
        let bold = cur.read_bool()?;
        let italic = cur.read_bool()?;
        let mut range_begin = cur.read_u32()?;
        let range_end = cur.read_u32()?;

        let (charset, aa_level) = match version {
            GameVersion::GameMaker8_0 => (0, 0),
            GameVersion::GameMaker8_1 => {
                let charset = range_begin & 0xFF00_0000;
                let aa_level = range_begin & 0x00FF_0000;
                range_begin &= 0x0000_FFFF;
                (charset, aa_level)
            },
        };

        let mut char_map = vec![0u32; CHAR_MAP_LEN].into_boxed_slice();
        for entry in char_map.iter_mut() {
            *entry = cur.read_u32()?;
        }

        let width = cur.read_u32()?;
        let height = cur.read_u32()?;
        let alpha_len = cur.read_u32()? as usize;
        if alpha_len as u64 != u64::from(width) * u64::from(height) {
            return Err(Error::CorruptBlock(format!(
                "font '{}' has {} alpha bytes for a {}x{} atlas",
                name, alpha_len, width, height
            )))
        }

        let alpha = cur.take(alpha_len)?;
        let mut image = vec![0xFF; alpha_len * 4];
        for (px, &a) in image.chunks_exact_mut(4).zip(alpha) {
            px[3] = a;
        }

        Ok(Font {
            name,
            sys_name,
            size,
            bold,
            italic,
            range_begin,
            range_end,
            charset,
            aa_level,
            char_map,
            width,
            height,
            image: image.into_boxed_slice(),
        })
    }
}
