//! Post-load passes over the decoded assets: resolving object parent chains
//! into identity sets, and handing every registered code handle to the
//! collaborator for compilation.

use crate::{asset::Object, code::CodeRegistry, AssetList, Error, GameAssets};
use log::debug;
use std::collections::BTreeSet;

/// Fills in each object's `identities` (itself plus all ancestors) and
/// `children` (itself plus all descendants). Dangling parent indices are
/// ignored and a parent cycle stops where it closes.
pub fn object_identities(objects: &mut AssetList<Object>) {
    let mut chains: Vec<Option<BTreeSet<u32>>> = Vec::with_capacity(objects.len());
    for (index, slot) in objects.iter().enumerate() {
        chains.push(slot.as_ref().map(|object| {
            let mut identities = BTreeSet::new();
            identities.insert(index as u32);
            let mut parent = object.parent_index;
            while let Some(p) = parent {
                if !identities.insert(p) {
                    break
                }
                parent = objects.get(p as usize).and_then(|slot| slot.as_ref()).and_then(|o| o.parent_index);
            }
            identities
        }));
    }

    for (index, chain) in chains.iter().enumerate() {
        if let Some(chain) = chain {
            for &ancestor in chain {
                if let Some(Some(object)) = objects.get_mut(ancestor as usize) {
                    object.children.insert(index as u32);
                }
            }
        }
    }

    for (slot, chain) in objects.iter_mut().zip(chains) {
        if let (Some(object), Some(chain)) = (slot, chain) {
            object.identities = chain;
        }
    }

    debug!("resolved identities for {} objects", objects.iter().flatten().count());
}

/// Compiles every registered code handle, in the same order the assets were
/// read: scripts, timelines, objects, triggers, then room creation code with
/// each room's instance creation code.
pub fn compile(assets: &GameAssets, registry: &mut dyn CodeRegistry) -> Result<(), Error> {
    for script in assets.scripts.iter().flatten() {
        registry.compile(script.code).map_err(Error::Compile)?;
    }
    for timeline in assets.timelines.iter().flatten() {
        for actions in timeline.moments.values() {
            for handle in actions.iter().flat_map(|action| action.handles()) {
                registry.compile(handle).map_err(Error::Compile)?;
            }
        }
    }
    for object in assets.objects.iter().flatten() {
        for category in &object.events {
            for actions in category.values() {
                for handle in actions.iter().flat_map(|action| action.handles()) {
                    registry.compile(handle).map_err(Error::Compile)?;
                }
            }
        }
    }
    for trigger in assets.triggers.iter().flatten() {
        registry.compile(trigger.condition).map_err(Error::Compile)?;
    }
    for room in assets.rooms.iter().flatten() {
        registry.compile(room.creation_code).map_err(Error::Compile)?;
        for instance in &room.instances {
            registry.compile(instance.creation).map_err(Error::Compile)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ByteString;

    fn object(name: &str, parent_index: Option<u32>) -> Option<Box<Object>> {
        Some(Box::new(Object {
            name: ByteString::from(name.as_bytes()),
            sprite_index: None,
            solid: false,
            visible: true,
            depth: 0,
            persistent: false,
            parent_index,
            mask_index: None,
            events: Default::default(),
            identities: BTreeSet::new(),
            children: BTreeSet::new(),
        }))
    }

    fn ids(set: &BTreeSet<u32>) -> Vec<u32> {
        set.iter().copied().collect()
    }

    #[test]
    fn parent_chains_become_identity_sets() {
        // 0 <- 1 <- 2, and 3 stands alone with a deleted slot in between
        let mut objects = vec![
            object("base", None),
            object("middle", Some(0)),
            object("leaf", Some(1)),
            None,
            object("loner", None),
        ];
        object_identities(&mut objects);

        assert_eq!(ids(&objects[0].as_ref().unwrap().identities), [0]);
        assert_eq!(ids(&objects[1].as_ref().unwrap().identities), [0, 1]);
        assert_eq!(ids(&objects[2].as_ref().unwrap().identities), [0, 1, 2]);
        assert_eq!(ids(&objects[4].as_ref().unwrap().identities), [4]);

        assert_eq!(ids(&objects[0].as_ref().unwrap().children), [0, 1, 2]);
        assert_eq!(ids(&objects[1].as_ref().unwrap().children), [1, 2]);
        assert_eq!(ids(&objects[2].as_ref().unwrap().children), [2]);
        assert_eq!(ids(&objects[4].as_ref().unwrap().children), [4]);
    }

    #[test]
    fn parent_cycle_terminates() {
        let mut objects = vec![object("a", Some(1)), object("b", Some(0))];
        object_identities(&mut objects);
        assert_eq!(ids(&objects[0].as_ref().unwrap().identities), [0, 1]);
        assert_eq!(ids(&objects[1].as_ref().unwrap().identities), [0, 1]);
    }

    #[test]
    fn dangling_parent_is_kept_but_not_followed() {
        let mut objects = vec![object("orphan", Some(42))];
        object_identities(&mut objects);
        assert_eq!(ids(&objects[0].as_ref().unwrap().identities), [0, 42]);
        assert_eq!(ids(&objects[0].as_ref().unwrap().children), [0]);
    }
}
