use crate::{
    asset::Asset,
    code::CodeRegistry,
    stream::DataCursor,
    ByteString, Error, GameVersion,
};

pub struct Sound {
    pub name: ByteString,

    /// The sound type (0 - normal, 1 - background, 2 - 3d, 3 - multimedia player)
    pub kind: u32,

    /// File extension of the source file, e.g. ".wav"
    pub extension: ByteString,

    /// Name of the source file
    pub source: ByteString,

    /// The raw filedata, if it was embedded in the exe
    pub data: Option<Box<[u8]>>,

    /// Volume between 1.0 and 0.0 (the editor won't go below 0.3)
    pub volume: f64,

    /// Stereo pan between -1.0 and 1.0
    pub pan: f64,

    pub preload: bool,
}

impl Asset for Sound {
    fn deserialize(
        cur: &mut DataCursor,
        _version: GameVersion,
        _registry: &mut dyn CodeRegistry,
    ) -> Result<Self, Error> {
        let name = cur.read_pas_string()?;
        cur.skip(4)?; // data version, 800
        let kind = cur.read_u32()?;
        let extension = cur.read_pas_string()?;
        let source = cur.read_pas_string()?;
        let data = if cur.read_bool()? {
            let len = cur.read_u32()? as usize;
            Some(cur.take(len)?.to_vec().into_boxed_slice())
        } else {
            None
        };
        cur.skip(4)?; // effects bitmask, unused by the runner
        let volume = cur.read_f64()?;
        let pan = cur.read_f64()?;
        let preload = cur.read_bool()?;
        Ok(Sound { name, kind, extension, source, data, volume, pan, preload })
    }
}
