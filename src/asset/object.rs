use crate::{
    asset::{Asset, CodeAction},
    code::CodeRegistry,
    stream::DataCursor,
    ByteString, Error, GameVersion,
};
use std::collections::{BTreeMap, BTreeSet};

/// Events are stored in 12 fixed categories (create, destroy, alarm, step,
/// collision, keyboard, mouse, other, draw, keypress, keyrelease, trigger).
pub const EVENT_CATEGORIES: usize = 12;

pub struct Object {
    pub name: ByteString,

    pub sprite_index: Option<u32>,
    pub solid: bool,
    pub visible: bool,
    pub depth: i32,
    pub persistent: bool,
    pub parent_index: Option<u32>,
    pub mask_index: Option<u32>,

    /// Sub-events per category, keyed by sub-event id (alarm number,
    /// colliding object, key code, ...).
    pub events: [BTreeMap<u32, Vec<CodeAction>>; EVENT_CATEGORIES],

    /// This object's index plus those of all its ancestors. Filled in after
    /// the whole list is read, once every parent link can be followed.
    pub identities: BTreeSet<u32>,

    /// Direct and indirect children of this object, plus itself.
    pub children: BTreeSet<u32>,
}

impl Asset for Object {
    fn deserialize(
        cur: &mut DataCursor,
        _version: GameVersion,
        registry: &mut dyn CodeRegistry,
    ) -> Result<Self, Error> {
        let name = cur.read_pas_string()?;
        cur.skip(4)?; // data version, 430
        let sprite_index = cur.read_index()?;
        let solid = cur.read_bool()?;
        let visible = cur.read_bool()?;
        let depth = cur.read_i32()?;
        let persistent = cur.read_bool()?;
        let parent_index = cur.read_index()?;
        let mask_index = cur.read_index()?;
        cur.skip(4)?; // highest category index, always 11

        let mut events: [BTreeMap<u32, Vec<CodeAction>>; EVENT_CATEGORIES] = Default::default();
        for category in events.iter_mut() {
            loop {
                let index = cur.read_i32()?;
                if index == -1 {
                    break
                }
                category.insert(index as u32, CodeAction::read_list(cur, registry)?);
            }
        }

        Ok(Object {
            name,
            sprite_index,
            solid,
            visible,
            depth,
            persistent,
            parent_index,
            mask_index,
            events,
            identities: BTreeSet::new(),
            children: BTreeSet::new(),
        })
    }
}
