//! Typed records for every asset category in the gamedata, and their
//! deserializers.

pub mod background;
pub mod code_action;
pub mod extension;
pub mod font;
pub mod included_file;
pub mod object;
pub mod path;
pub mod room;
pub mod script;
pub mod sound;
pub mod sprite;
pub mod timeline;
pub mod trigger;

pub use self::{
    background::Background,
    code_action::{ActionParam, CodeAction},
    extension::Extension,
    font::Font,
    included_file::IncludedFile,
    object::Object,
    path::Path,
    room::Room,
    script::Script,
    sound::Sound,
    sprite::{CollisionMap, Frame, Sprite},
    timeline::Timeline,
    trigger::Trigger,
};

use crate::{code::CodeRegistry, stream::DataCursor, ByteString, Error, GameVersion};

/// One block-compressed asset record. The caller has already inflated the
/// block and consumed the leading exists flag; `deserialize` reads the rest.
pub trait Asset: Sized {
    fn deserialize(
        cur: &mut DataCursor,
        version: GameVersion,
        registry: &mut dyn CodeRegistry,
    ) -> Result<Self, Error>;
}

/// A named constant expression. Constants are not block-compressed; they're
/// plain string pairs in the asset stream.
pub struct Constant {
    pub name: ByteString,
    pub expression: ByteString,
}

/// Swaps the first and third channel of every 4-byte pixel, converting
/// between the container's BGRA and the RGBA handed to the renderer. Its own
/// inverse when applied twice.
pub(crate) fn swap_channels(pixels: &mut [u8]) {
    for px in pixels.chunks_exact_mut(4) {
        px.swap(0, 2);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn channel_swap_is_idempotent_under_two_applications() {
        let original: Vec<u8> = (0..64u8).collect();
        let mut pixels = original.clone();
        swap_channels(&mut pixels);
        assert_eq!(&pixels[..4], &[2, 1, 0, 3]);
        swap_channels(&mut pixels);
        assert_eq!(pixels, original);
    }
}
