use crate::{
    asset::{Asset, CodeAction},
    code::CodeRegistry,
    stream::DataCursor,
    ByteString, Error, GameVersion,
};
use std::collections::BTreeMap;

pub struct Timeline {
    pub name: ByteString,

    /// Action lists keyed by moment (step offset), sorted ascending.
    pub moments: BTreeMap<u32, Vec<CodeAction>>,
}

impl Asset for Timeline {
    fn deserialize(
        cur: &mut DataCursor,
        _version: GameVersion,
        registry: &mut dyn CodeRegistry,
    ) -> Result<Self, Error> {
        let name = cur.read_pas_string()?;
        cur.skip(4)?; // data version, 500
        let count = cur.read_u32()? as usize;
        let mut moments = BTreeMap::new();
        for _ in 0..count {
            let moment = cur.read_u32()?;
            moments.insert(moment, CodeAction::read_list(cur, registry)?);
        }
        Ok(Timeline { name, moments })
    }
}
