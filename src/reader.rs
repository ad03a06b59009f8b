//! Top-level decoding: from a packaged executable's bytes to [`GameAssets`].

use crate::{
    asset::{
        included_file::ExportSetting, path::ConnectionKind, Asset, Background, Constant, Extension, Font,
        IncludedFile, Object, Path, Room, Script, Sound, Sprite, Timeline, Trigger,
    },
    code::CodeRegistry,
    gamedata::{self, gm80},
    resolve, settings,
    stream::DataCursor,
    zlib, AssetList, Error, GameAssets, GameVersion,
};
use log::debug;
use std::fs;

/// Reads a game executable from disk and decodes its gamedata.
pub fn from_file<P: AsRef<std::path::Path>>(
    path: P,
    registry: &mut dyn CodeRegistry,
) -> Result<GameAssets, Error> {
    from_exe(fs::read(path)?, registry)
}

/// Decodes the gamedata container out of a game executable's bytes. The
/// buffer is taken mutably because the encryption layers are removed in
/// place; everything returned is an owned copy.
pub fn from_exe<I>(mut exe: I, registry: &mut dyn CodeRegistry) -> Result<GameAssets, Error>
where
    I: AsRef<[u8]> + AsMut<[u8]>,
{
    let exe = exe.as_mut();

    // Windows EXE must always start with "MZ"
    if exe.get(0..2).unwrap_or(b"XX") != b"MZ" {
        return Err(Error::InvalidExeHeader)
    }

    // Identify the game version in use and locate the gamedata header
    let (version, header_pos) = gamedata::find(exe)?;
    let mut scratch = Vec::new();

    // Game Settings
    debug!("Reading settings chunk...");
    let mut pos = header_pos + 4; // data version
    let settings = {
        let mut cur = DataCursor::with_position(exe, pos);
        let len = zlib::inflate_block(&mut cur, &mut scratch)?;
        pos = cur.position();
        settings::deserialize(&mut DataCursor::new(&scratch[..len]), version)?
    };

    // Embedded DirectX DLL, which we have no use for
    {
        let mut cur = DataCursor::with_position(exe, pos);
        let dll_name = cur.read_pas_string()?;
        debug!("Skipping embedded DLL '{}'", dll_name);
        let dll_len = cur.read_u32()? as usize;
        cur.skip(dll_len)?;
        pos = cur.position();
    }

    // The rest of the container sits under another encryption layer
    gm80::decrypt(exe, &mut pos)?;

    let mut cur = DataCursor::with_position(exe, pos);

    // Garbage field - random bytes
    let garbage_dwords = cur.read_u32()? as usize;
    cur.skip(garbage_dwords * 4)?;
    debug!("Skipped {} garbage DWORDs", garbage_dwords);

    // GM8 Pro flag, game ID
    let pro_flag = cur.read_bool()?;
    let game_id = cur.read_u32()?;
    debug!("Pro flag: {}", pro_flag);
    debug!("Game ID: {}", game_id);

    let guid = [cur.read_u32()?, cur.read_u32()?, cur.read_u32()?, cur.read_u32()?];

    // Extensions
    cur.skip(4)?; // data version, 700
    let extension_count = cur.read_u32()? as usize;
    let mut extensions = Vec::with_capacity(extension_count);
    for _ in 0..extension_count {
        let ext = Extension::deserialize(&mut cur, &mut scratch)?;
        debug!("+ Added extension '{}' (files: {})", ext.name, ext.files.len());
        extensions.push(ext);
    }

    // Triggers
    let triggers: AssetList<Trigger> = get_assets(&mut cur, version, registry, &mut scratch)?;
    triggers.iter().flatten().for_each(|trigger| {
        debug!(" + Added trigger '{}' (moment: {})", trigger.name, trigger.moment);
    });

    // Constants
    cur.skip(4)?; // data version, 800
    let constant_count = cur.read_u32()? as usize;
    let mut constants = Vec::with_capacity(constant_count);
    for _ in 0..constant_count {
        let name = cur.read_pas_string()?;
        let expression = cur.read_pas_string()?;
        debug!(" + Added constant '{}' (expression: {})", name, expression);
        constants.push(Constant { name, expression });
    }

    // Sounds
    let sounds: AssetList<Sound> = get_assets(&mut cur, version, registry, &mut scratch)?;
    sounds.iter().flatten().for_each(|sound| {
        debug!(" + Added sound '{}' ({})", sound.name, sound.source);
    });

    // Sprites
    let sprites: AssetList<Sprite> = get_assets(&mut cur, version, registry, &mut scratch)?;
    sprites.iter().flatten().for_each(|sprite| {
        let framecount = sprite.frames.len();
        debug!(
            " + Added sprite '{}' ({}x{}, {} frame{})",
            sprite.name,
            sprite.width,
            sprite.height,
            framecount,
            if framecount > 1 { "s" } else { "" }
        );
    });

    // Backgrounds
    let backgrounds: AssetList<Background> = get_assets(&mut cur, version, registry, &mut scratch)?;
    backgrounds.iter().flatten().for_each(|background| {
        debug!(" + Added background '{}' ({}x{})", background.name, background.width, background.height);
    });

    // Paths
    let paths: AssetList<Path> = get_assets(&mut cur, version, registry, &mut scratch)?;
    paths.iter().flatten().for_each(|path| {
        debug!(
            " + Added path '{}' ({}, {}, {} point{}, precision: {})",
            path.name,
            match path.connection {
                ConnectionKind::StraightLine => "straight",
                ConnectionKind::SmoothCurve => "smooth",
            },
            if path.closed { "closed" } else { "open" },
            path.points.len(),
            if path.points.len() > 1 { "s" } else { "" },
            path.precision
        );
    });

    // Scripts
    let scripts: AssetList<Script> = get_assets(&mut cur, version, registry, &mut scratch)?;
    scripts.iter().flatten().for_each(|script| {
        debug!(" + Added script '{}'", script.name);
    });

    // Fonts
    let fonts: AssetList<Font> = get_assets(&mut cur, version, registry, &mut scratch)?;
    fonts.iter().flatten().for_each(|font| {
        debug!(
            " + Added font '{}' ({}, {}px{}{})",
            font.name,
            font.sys_name,
            font.size,
            if font.bold { ", bold" } else { "" },
            if font.italic { ", italic" } else { "" }
        );
    });

    // Timelines
    let timelines: AssetList<Timeline> = get_assets(&mut cur, version, registry, &mut scratch)?;
    timelines.iter().flatten().for_each(|timeline| {
        debug!(" + Added timeline '{}' (moments: {})", timeline.name, timeline.moments.len());
    });

    // Objects
    let mut objects: AssetList<Object> = get_assets(&mut cur, version, registry, &mut scratch)?;
    objects.iter().flatten().for_each(|object| {
        debug!(
            " + Added object {} ({}{}{}depth {})",
            object.name,
            if object.solid { "solid; " } else { "" },
            if object.visible { "visible; " } else { "" },
            if object.persistent { "persistent; " } else { "" },
            object.depth,
        );
    });

    // Rooms
    let rooms: AssetList<Room> = get_assets(&mut cur, version, registry, &mut scratch)?;
    rooms.iter().flatten().for_each(|room| {
        debug!(
            " + Added room '{}' ({}x{}, {}FPS{})",
            room.name,
            room.width,
            room.height,
            room.speed,
            if room.persistent { ", persistent" } else { "" },
        );
    });

    // Last instance and tile id placed in the room editor
    let last_instance_id = cur.read_u32()?;
    let last_tile_id = cur.read_u32()?;

    // Included Files
    let included_files: AssetList<IncludedFile> = get_assets(&mut cur, version, registry, &mut scratch)?;
    for file in included_files.iter().flatten() {
        debug!(
            " + Added included file '{}' (len: {}, export mode: {})",
            file.file_name,
            file.source_length,
            match &file.export_settings {
                ExportSetting::NoExport => "no export".into(),
                ExportSetting::TempFolder => "temp folder".into(),
                ExportSetting::GameFolder => "game folder".into(),
                ExportSetting::CustomFolder(p) => format!("custom path: '{}'", p),
            }
        );
    }

    // Help Dialog
    cur.skip(4)?; // data version, 800
    let help_dialog = {
        let len = zlib::inflate_block(&mut cur, &mut scratch)?;
        let dialog = settings::read_help_dialog(&mut DataCursor::new(&scratch[..len]))?;
        debug!(" + Help dialog: '{}'", dialog.caption);
        dialog
    };

    // Action library initialization code. These are GML strings which get
    // run at game start, in order.
    cur.skip(4)?; // data version, 500
    let str_count = cur.read_u32()? as usize;
    let mut library_init_strings = Vec::with_capacity(str_count);
    for _ in 0..str_count {
        library_init_strings.push(cur.read_pas_string()?);
    }
    debug!(" + Read {} action library initialization strings", str_count);

    // Room Order
    cur.skip(4)?; // data version, 700
    let ro_count = cur.read_u32()? as usize;
    let mut room_order = Vec::with_capacity(ro_count);
    for _ in 0..ro_count {
        room_order.push(cur.read_u32()?);
    }
    debug!(" + Added room order LUT: {:?}", room_order);

    resolve::object_identities(&mut objects);

    let assets = GameAssets {
        extensions,
        triggers,
        constants,
        sounds,
        sprites,
        backgrounds,
        paths,
        scripts,
        fonts,
        timelines,
        objects,
        rooms,
        included_files,

        version,
        settings,
        help_dialog,
        game_id,
        guid,
        last_instance_id,
        last_tile_id,
        library_init_strings,
        room_order,
    };

    resolve::compile(&assets, registry)?;

    Ok(assets)
}

/// Reads one asset category: a data version dword, a count, then that many
/// length-prefixed zlib blocks. Each block starts with an exists flag; a
/// cleared flag is a reserved slot for a deleted asset and becomes `None`.
fn get_assets<T: Asset>(
    cur: &mut DataCursor,
    version: GameVersion,
    registry: &mut dyn CodeRegistry,
    scratch: &mut Vec<u8>,
) -> Result<AssetList<T>, Error> {
    cur.skip(4)?; // category data version
    let count = cur.read_u32()? as usize;
    let mut assets: AssetList<T> = Vec::with_capacity(count.min(cur.remaining() / 4));
    for _ in 0..count {
        let len = cur.read_u32()? as usize;
        let chunk = cur.take(len)?;

        // A deleted asset is a deflated `00 00 00 00` and GM8 always emits
        // this exact block for one, so it can be skipped without inflating.
        if chunk == [0x78, 0x9C, 0x63, 0x60, 0x60, 0x60, 0x00, 0x00, 0x00, 0x04, 0x00, 0x01] {
            assets.push(None);
            continue
        }

        let len = zlib::inflate(chunk, scratch)?;
        let mut block = DataCursor::new(&scratch[..len]);
        if block.read_bool()? {
            assets.push(Some(Box::new(T::deserialize(&mut block, version, registry)?)));
        } else {
            assets.push(None);
        }
    }
    Ok(assets)
}
