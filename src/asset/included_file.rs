use crate::{
    asset::Asset,
    code::CodeRegistry,
    stream::DataCursor,
    ByteString, Error, GameVersion,
};

pub struct IncludedFile {
    /// The name of the file as it was bundled
    pub file_name: ByteString,

    /// The path the file originally lived at on the author's machine
    pub file_path: ByteString,

    /// Size of the original file; kept even when the data itself is not
    pub source_length: u32,

    /// File contents, present only when it was stored inside the executable
    pub data: Option<Box<[u8]>>,

    pub export_settings: ExportSetting,
    pub overwrite: bool,
    pub free_memory: bool,
    pub remove_at_end: bool,
}

pub enum ExportSetting {
    NoExport,
    TempFolder,
    GameFolder,
    CustomFolder(ByteString),
}

impl Asset for IncludedFile {
    fn deserialize(
        cur: &mut DataCursor,
        _version: GameVersion,
        _registry: &mut dyn CodeRegistry,
    ) -> Result<Self, Error> {
        cur.skip(4)?; // data version, 800
        let file_name = cur.read_pas_string()?;
        let file_path = cur.read_pas_string()?;
        let mut in_exe = cur.read_bool()?;
        let source_length = cur.read_u32()?;
        in_exe &= cur.read_bool()?;

        let data = if in_exe {
            let len = cur.read_u32()? as usize;
            Some(cur.take(len)?.to_vec().into_boxed_slice())
        } else {
            None
        };

        let export_flag = cur.read_u32()?;
        let export_folder = cur.read_pas_string()?;
        let export_settings = match export_flag {
            0 => ExportSetting::NoExport,
            1 => ExportSetting::TempFolder,
            2 => ExportSetting::GameFolder,
            3 => ExportSetting::CustomFolder(export_folder),
            f => return Err(Error::CorruptBlock(format!("bad export setting {} for '{}'", f, file_name))),
        };

        let overwrite = cur.read_bool()?;
        let free_memory = cur.read_bool()?;
        let remove_at_end = cur.read_bool()?;

        Ok(IncludedFile {
            file_name,
            file_path,
            source_length,
            data,
            export_settings,
            overwrite,
            free_memory,
            remove_at_end,
        })
    }
}
