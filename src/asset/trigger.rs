use crate::{
    asset::Asset,
    code::{CodeHandle, CodeRegistry},
    stream::DataCursor,
    ByteString, Error, GameVersion,
};

pub struct Trigger {
    pub name: ByteString,

    /// The condition expression, registered as a question with the code
    /// collaborator.
    pub condition: CodeHandle,

    /// When the trigger is checked (0 - begin step, 1 - step, 2 - end step)
    pub moment: u32,

    /// Name the trigger can be referred to by in code
    pub constant_name: ByteString,
}

impl Asset for Trigger {
    fn deserialize(
        cur: &mut DataCursor,
        _version: GameVersion,
        registry: &mut dyn CodeRegistry,
    ) -> Result<Self, Error> {
        cur.skip(4)?; // data version, 800
        let name = cur.read_pas_string()?;
        let condition_source = cur.read_pas_string()?;
        let moment = cur.read_u32()?;
        let constant_name = cur.read_pas_string()?;
        let condition = registry.register_question(condition_source.as_ref());
        Ok(Trigger { name, condition, moment, constant_name })
    }
}
