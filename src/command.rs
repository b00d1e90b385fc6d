//! Every user command, with its menu label and keyboard shortcut.

use eframe::egui::{Key, KeyboardShortcut, Modifiers};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Command {
    Open,
    SaveImage,
    Quit,
    ToggleSidePanel,
    ToggleFullscreen,
    Calibrate,
    NewCaliper,
    RemoveCalipers,
    ToggleDoodle,
    ClearDoodle,
    Preferences,
    RotateLeft,
    RotateRight,
    Crop,
    PreviousImage,
    NextImage,
    NewPlaylist,
    EditPlaylist,
    About,
    Shortcuts,
}

impl Command {
    pub const ALL: [Command; 20] = [
        Command::Open,
        Command::SaveImage,
        Command::Quit,
        Command::ToggleSidePanel,
        Command::ToggleFullscreen,
        Command::Calibrate,
        Command::NewCaliper,
        Command::RemoveCalipers,
        Command::ToggleDoodle,
        Command::ClearDoodle,
        Command::Preferences,
        Command::RotateLeft,
        Command::RotateRight,
        Command::Crop,
        Command::PreviousImage,
        Command::NextImage,
        Command::NewPlaylist,
        Command::EditPlaylist,
        Command::About,
        Command::Shortcuts,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Command::Open => "Open…",
            Command::SaveImage => "Save image…",
            Command::Quit => "Quit",
            Command::ToggleSidePanel => "Show side panel",
            Command::ToggleFullscreen => "Fullscreen",
            Command::Calibrate => "Calibrate",
            Command::NewCaliper => "New caliper",
            Command::RemoveCalipers => "Remove all calipers",
            Command::ToggleDoodle => "Doodle",
            Command::ClearDoodle => "Clear doodle",
            Command::Preferences => "Preferences…",
            Command::RotateLeft => "Rotate left",
            Command::RotateRight => "Rotate right",
            Command::Crop => "Crop",
            Command::PreviousImage => "Previous image",
            Command::NextImage => "Next image",
            Command::NewPlaylist => "New playlist…",
            Command::EditPlaylist => "Edit playlist…",
            Command::About => "About",
            Command::Shortcuts => "Keyboard shortcuts",
        }
    }

    pub fn shortcut(self) -> Option<KeyboardShortcut> {
        let ctrl = |key| Some(KeyboardShortcut::new(Modifiers::COMMAND, key));
        match self {
            Command::Open => ctrl(Key::O),
            Command::SaveImage => ctrl(Key::S),
            Command::Quit => ctrl(Key::Q),
            Command::ToggleFullscreen => ctrl(Key::F),
            Command::Calibrate => ctrl(Key::B),
            Command::NewCaliper => ctrl(Key::C),
            Command::ToggleDoodle => ctrl(Key::D),
            Command::ClearDoodle => ctrl(Key::X),
            Command::RotateLeft => ctrl(Key::L),
            Command::RotateRight => ctrl(Key::R),
            Command::PreviousImage => Some(KeyboardShortcut::new(Modifiers::NONE, Key::PageUp)),
            Command::NextImage => Some(KeyboardShortcut::new(Modifiers::NONE, Key::PageDown)),
            _ => None,
        }
    }

    /// Commands that act on the displayed image.
    pub fn needs_image(self) -> bool {
        matches!(
            self,
            Command::SaveImage
                | Command::Calibrate
                | Command::NewCaliper
                | Command::RemoveCalipers
                | Command::ToggleDoodle
                | Command::ClearDoodle
                | Command::RotateLeft
                | Command::RotateRight
                | Command::Crop
        )
    }
}
