//! Loader for the gamedata container embedded in GameMaker 8.0 and 8.1 game
//! executables. The entry points are [`reader::from_exe`] and
//! [`reader::from_file`], which decode the entire container into a
//! [`GameAssets`] collection in one pass.

pub mod asset;
pub mod code;
pub mod gamedata;
pub mod reader;
pub mod resolve;
pub mod settings;
pub mod stream;
pub mod zlib;

use std::{
    fmt::{self, Display},
    io,
};

/// The two container format revisions this crate recognizes.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum GameVersion {
    GameMaker8_0,
    GameMaker8_1,
}

/// An asset table: fixed-size, pre-reserved, indexed by asset id.
/// `None` marks a reserved placeholder slot (a deleted asset).
pub type AssetList<T> = Vec<Option<Box<T>>>;

/// A length-prefixed byte string from the gamedata. These are not
/// NUL-terminated and may contain embedded NUL bytes, so they are kept as
/// raw bytes rather than `String`.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ByteString(pub Vec<u8>);

impl ByteString {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl AsRef<[u8]> for ByteString {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<&[u8]> for ByteString {
    fn from(bytes: &[u8]) -> Self {
        ByteString(bytes.to_vec())
    }
}

impl Display for ByteString {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", String::from_utf8_lossy(&self.0))
    }
}

#[derive(Debug)]
pub enum Error {
    /// The input file could not be read at all.
    Io(io::Error),
    /// Missing MZ signature, or the file is too small to be an executable.
    InvalidExeHeader,
    /// No recognizable GM8.0 or GM8.1 gamedata header in the executable.
    UnknownFormat,
    /// A read ran past the end of the buffer.
    Truncated { pos: usize, wanted: usize },
    /// Decompression failure or a structural inconsistency in a data block.
    CorruptBlock(String),
    /// The external code collaborator failed to compile a registered handle.
    Compile(String),
}

impl std::error::Error for Error {}
impl Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", match self {
            Error::Io(err) => format!("io error: {}", err),
            Error::InvalidExeHeader => "invalid exe header".into(),
            Error::UnknownFormat => "unknown format, could not identify file".into(),
            Error::Truncated { pos, wanted } => {
                format!("data truncated: wanted {} bytes at position {}", wanted, pos)
            },
            Error::CorruptBlock(what) => format!("corrupt data block: {}", what),
            Error::Compile(what) => format!("code compilation error: {}", what),
        })
    }
}

macro_rules! from_err {
    ($t: ident, $e: ty, $variant: ident) => {
        impl From<$e> for $t {
            fn from(err: $e) -> Self {
                $t::$variant(err)
            }
        }
    };
}

from_err!(Error, io::Error, Io);

use asset::{
    Background, Constant, Extension, Font, IncludedFile, Object, Path, Room, Script, Sound, Sprite, Timeline,
    Trigger,
};
use settings::{GameHelpDialog, Settings};

/// Everything decoded from one gamedata container.
pub struct GameAssets {
    pub extensions: Vec<Extension>,
    pub triggers: AssetList<Trigger>,
    pub constants: Vec<Constant>,
    pub sounds: AssetList<Sound>,
    pub sprites: AssetList<Sprite>,
    pub backgrounds: AssetList<Background>,
    pub paths: AssetList<Path>,
    pub scripts: AssetList<Script>,
    pub fonts: AssetList<Font>,
    pub timelines: AssetList<Timeline>,
    pub objects: AssetList<Object>,
    pub rooms: AssetList<Room>,
    pub included_files: AssetList<IncludedFile>,

    pub version: GameVersion,
    pub settings: Settings,
    pub help_dialog: GameHelpDialog,
    pub game_id: u32,
    pub guid: [u32; 4],
    pub last_instance_id: u32,
    pub last_tile_id: u32,

    /// GML strings run at game start to initialize the action libraries
    pub library_init_strings: Vec<ByteString>,

    pub room_order: Vec<u32>,
}
