use crate::{
    asset::{swap_channels, Asset},
    code::CodeRegistry,
    stream::DataCursor,
    ByteString, Error, GameVersion,
};

pub struct Background {
    pub name: ByteString,
    pub width: u32,
    pub height: u32,

    /// Pixel data, channel-swapped on read. Empty backgrounds have none.
    pub data: Option<Box<[u8]>>,
}

impl Asset for Background {
    fn deserialize(
        cur: &mut DataCursor,
        _version: GameVersion,
        _registry: &mut dyn CodeRegistry,
    ) -> Result<Self, Error> {
        let name = cur.read_pas_string()?;
        cur.skip(8)?; // two data version dwords (710, then 800 for the image)
        let width = cur.read_u32()?;
        let height = cur.read_u32()?;
        let data = if width > 0 && height > 0 {
            let len = cur.read_u32()? as usize;
            let mut pixels = cur.take(len)?.to_vec();
            swap_channels(&mut pixels);
            Some(pixels.into_boxed_slice())
        } else {
            None
        };
        Ok(Background { name, width, height, data })
    }
}
