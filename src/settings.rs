//! The global game settings chunk and the game information (help dialog)
//! block.

use crate::{stream::DataCursor, zlib, ByteString, Error, GameVersion};
use log::debug;

pub struct Settings {
    /// Start in fullscreen mode
    pub fullscreen: bool,

    /// Interpolate colours between pixels
    pub interpolate_pixels: bool,

    /// Don't draw a border in windowed mode
    pub dont_draw_border: bool,

    /// Display the cursor
    pub display_cursor: bool,

    /// Scaling: fixed scale as a percentage, -1 for max, 0 for max with AR preserved
    pub scaling: i32,

    /// Allow the player to resize the game window
    pub allow_resize: bool,

    /// Let the game window always stay on top
    pub window_on_top: bool,

    /// Colour outside the room region (RGBA)
    pub clear_colour: u32,

    /// Set the resolution of the screen
    pub set_resolution: bool,

    /// Colour depth (0 - no change, 1 - 16bit, 2 - 32bit)
    pub colour_depth: u32,

    /// Resolution (0 - no change, 1..=6 - 320x240 up to 1600x1200)
    pub resolution: u32,

    /// Frequency (0 - no change, 1..=5 - 60Hz up to 120Hz)
    pub frequency: u32,

    /// Don't show the buttons in the window caption
    pub dont_show_buttons: bool,

    /// Use synchronization to avoid tearing
    pub vsync: bool,

    /// Use software rendering (bit-packed with vsync, 8.1 only)
    pub force_cpu_render: bool,

    /// Disable screensavers and power saving actions
    pub disable_screensaver: bool,

    /// Let <F4> switch between screen modes
    pub f4_fullscreen_toggle: bool,

    /// Let <F1> show the game information
    pub f1_help_menu: bool,

    /// Let <Esc> end the game
    pub esc_close_game: bool,

    /// Let <F5> save the game and <F6> load a game
    pub f5_save_f6_load: bool,

    /// Let <F9> take a screenshot of the game
    pub f9_screenshot: bool,

    /// Treat the close button as the <Esc> key
    pub treat_close_as_esc: bool,

    /// Game process priority (0 - normal, 1 - high, 2 - highest)
    pub priority: u32,

    /// Freeze the game window when it loses focus
    pub freeze_on_lose_focus: bool,

    /// Loading bar mode (0 - none, 1 - default, 2 - own images)
    pub loading_bar: u32,

    /// Loading bar background image, decompressed
    pub backdata: Option<Box<[u8]>>,

    /// Loading bar foreground image, decompressed
    pub frontdata: Option<Box<[u8]>>,

    /// Custom image shown while loading, decompressed (a BMP file)
    pub custom_load_image: Option<Box<[u8]>>,

    /// Make the load image partially transparent
    pub transparent: bool,

    /// Translucency of the load image (0-255)
    pub translucency: u32,

    /// Scale the progress bar image
    pub scale_progress_bar: bool,

    /// Display error messages
    pub show_error_messages: bool,

    /// Write error messages to game_errors.log
    pub log_errors: bool,

    /// Abort on all error messages
    pub always_abort: bool,

    /// Treat uninitialized variables as value 0
    pub zero_uninitialized_vars: bool,

    /// Throw an error when arguments aren't initialized correctly
    /// (bit-packed with the above, 8.1 only)
    pub error_on_uninitialized_args: bool,
}

/// The game information text shown in its own window when F1 is pressed.
pub struct GameHelpDialog {
    pub bg_colour: u32,
    pub new_window: bool,
    pub caption: ByteString,
    pub left: i32,
    pub top: i32,
    pub width: u32,
    pub height: u32,
    pub border: bool,
    pub resizable: bool,
    pub window_on_top: bool,
    pub freeze_game: bool,
    pub info: ByteString,
}

/// Parses the inflated settings chunk. The loading bar images and custom
/// load image are themselves compressed blocks and are inflated even though
/// they're stored opaquely.
pub fn deserialize(cur: &mut DataCursor, version: GameVersion) -> Result<Settings, Error> {
    fn read_image_block(cur: &mut DataCursor) -> Result<Box<[u8]>, Error> {
        let mut buf = Vec::new();
        let len = zlib::inflate_block(cur, &mut buf)?;
        buf.truncate(len);
        Ok(buf.into_boxed_slice())
    }

    let fullscreen = cur.read_bool()?;
    let interpolate_pixels = cur.read_bool()?;
    let dont_draw_border = cur.read_bool()?;
    let display_cursor = cur.read_bool()?;
    let scaling = cur.read_i32()?;
    let allow_resize = cur.read_bool()?;
    let window_on_top = cur.read_bool()?;
    let clear_colour = cur.read_u32()?;
    let set_resolution = cur.read_bool()?;
    let colour_depth = cur.read_u32()?;
    let resolution = cur.read_u32()?;
    let frequency = cur.read_u32()?;
    let dont_show_buttons = cur.read_bool()?;
    let (vsync, force_cpu_render) = match (version, cur.read_u32()?) {
        (GameVersion::GameMaker8_0, x) => (x != 0, true), // see 8.1.141 changelog
        (GameVersion::GameMaker8_1, x) => ((x & 1) != 0, (x & (1 << 7)) != 0),
    };
    let disable_screensaver = cur.read_bool()?;
    let f4_fullscreen_toggle = cur.read_bool()?;
    let f1_help_menu = cur.read_bool()?;
    let esc_close_game = cur.read_bool()?;
    let f5_save_f6_load = cur.read_bool()?;
    let f9_screenshot = cur.read_bool()?;
    let treat_close_as_esc = cur.read_bool()?;
    let priority = cur.read_u32()?;
    let freeze_on_lose_focus = cur.read_bool()?;

    let loading_bar = cur.read_u32()?;
    let (backdata, frontdata) = if loading_bar != 0 {
        let backdata = if cur.read_bool()? { Some(read_image_block(cur)?) } else { None };
        let frontdata = if cur.read_bool()? { Some(read_image_block(cur)?) } else { None };
        (backdata, frontdata)
    } else {
        (None, None)
    };
    let custom_load_image = if cur.read_bool()? { Some(read_image_block(cur)?) } else { None };

    let transparent = cur.read_bool()?;
    let translucency = cur.read_u32()?;
    let scale_progress_bar = cur.read_bool()?;
    let show_error_messages = cur.read_bool()?;
    let log_errors = cur.read_bool()?;
    let always_abort = cur.read_bool()?;
    let (zero_uninitialized_vars, error_on_uninitialized_args) = match (version, cur.read_u32()?) {
        (GameVersion::GameMaker8_0, x) => (x != 0, false),
        (GameVersion::GameMaker8_1, x) => ((x & 1) != 0, (x & 2) != 0),
    };

    debug!(" + Loaded settings structure");
    debug!("   - Start in full-screen mode: {}", fullscreen);
    debug!("   - Scaling: {}", scaling);
    debug!("   - Loading bar: {}", loading_bar);
    debug!("   - Show your own image while loading: {}", custom_load_image.is_some());

    Ok(Settings {
        fullscreen,
        interpolate_pixels,
        dont_draw_border,
        display_cursor,
        scaling,
        allow_resize,
        window_on_top,
        clear_colour,
        set_resolution,
        colour_depth,
        resolution,
        frequency,
        dont_show_buttons,
        vsync,
        force_cpu_render,
        disable_screensaver,
        f4_fullscreen_toggle,
        f1_help_menu,
        esc_close_game,
        f5_save_f6_load,
        f9_screenshot,
        treat_close_as_esc,
        priority,
        freeze_on_lose_focus,
        loading_bar,
        backdata,
        frontdata,
        custom_load_image,
        transparent,
        translucency,
        scale_progress_bar,
        show_error_messages,
        log_errors,
        always_abort,
        zero_uninitialized_vars,
        error_on_uninitialized_args,
    })
}

pub fn read_help_dialog(cur: &mut DataCursor) -> Result<GameHelpDialog, Error> {
    Ok(GameHelpDialog {
        bg_colour: cur.read_u32()?,
        new_window: cur.read_bool()?,
        caption: cur.read_pas_string()?,
        left: cur.read_i32()?,
        top: cur.read_i32()?,
        width: cur.read_u32()?,
        height: cur.read_u32()?,
        border: cur.read_bool()?,
        resizable: cur.read_bool()?,
        window_on_top: cur.read_bool()?,
        freeze_game: cur.read_bool()?,
        info: cur.read_pas_string()?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dword(buf: &mut Vec<u8>, x: u32) {
        buf.extend_from_slice(&x.to_le_bytes());
    }

    #[test]
    fn plain_settings_consume_no_sub_blocks() {
        // 23 fixed fields, then loading_bar = 0 and custom_load_image = 0,
        // then the 7 trailing fields. No sub-block data follows at all, so
        // the parse must consume exactly these 32 dwords.
        let mut buf = Vec::new();
        for _ in 0..4 {
            dword(&mut buf, 1);
        }
        dword(&mut buf, 0xFFFF_FFFF); // scaling = -1
        for _ in 5..23 {
            dword(&mut buf, 0);
        }
        dword(&mut buf, 0); // loading_bar
        dword(&mut buf, 0); // custom_load_image
        for _ in 0..6 {
            dword(&mut buf, 0);
        }
        dword(&mut buf, 1); // treat uninitialized as zero

        let mut cur = DataCursor::new(&buf);
        let settings = deserialize(&mut cur, GameVersion::GameMaker8_0).unwrap();
        assert_eq!(cur.remaining(), 0);
        assert!(settings.fullscreen);
        assert_eq!(settings.scaling, -1);
        assert_eq!(settings.loading_bar, 0);
        assert!(settings.backdata.is_none());
        assert!(settings.frontdata.is_none());
        assert!(settings.custom_load_image.is_none());
        assert!(settings.zero_uninitialized_vars);
        assert!(!settings.error_on_uninitialized_args);
    }

    #[test]
    fn bit_packed_fields_are_split_on_81() {
        let mut buf = Vec::new();
        for _ in 0..13 {
            dword(&mut buf, 0);
        }
        dword(&mut buf, 0x81); // vsync on, software rendering on
        for _ in 14..23 {
            dword(&mut buf, 0);
        }
        dword(&mut buf, 0); // loading_bar
        dword(&mut buf, 0); // custom_load_image
        for _ in 0..6 {
            dword(&mut buf, 0);
        }
        dword(&mut buf, 3); // zero uninitialized + error on uninitialized args

        let settings = deserialize(&mut DataCursor::new(&buf), GameVersion::GameMaker8_1).unwrap();
        assert!(settings.vsync);
        assert!(settings.force_cpu_render);
        assert!(settings.zero_uninitialized_vars);
        assert!(settings.error_on_uninitialized_args);
    }
}
