use crate::{
    asset::Asset,
    code::{CodeHandle, CodeRegistry},
    stream::DataCursor,
    ByteString, Error, GameVersion,
};

pub struct Script {
    pub name: ByteString,

    /// The script body, registered with the code collaborator.
    pub code: CodeHandle,
}

impl Asset for Script {
    fn deserialize(
        cur: &mut DataCursor,
        _version: GameVersion,
        registry: &mut dyn CodeRegistry,
    ) -> Result<Self, Error> {
        let name = cur.read_pas_string()?;
        cur.skip(4)?; // data version, 800
        let source = cur.read_pas_string()?;
        let code = registry.register(source.as_ref());
        Ok(Script { name, code })
    }
}
