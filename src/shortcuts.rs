//! # Shortcuts Module
//!
//! Maps egui input events onto viewer actions.

use crate::viewer::CopyFormat;
use egui::{Event, Key, Modifiers};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Leave fullscreen, or quit.
    Escape,
    ToggleBrowserMode,
    ToggleFullscreen,
    Copy(CopyFormat),
    Open,
    Reload,
    ZoomIn,
    ZoomOut,
}

/// Actions triggered by this frame's events, in order.
pub fn actions(events: &[Event], modifiers: Modifiers) -> Vec<Action> {
    events
        .iter()
        .filter_map(|event| action_for(event, modifiers))
        .collect()
}

/// The action bound to a single event.
///
/// The windowing layer turns Ctrl+C into [`Event::Copy`] before any key event
/// is produced, so the copy variant is picked from the held modifiers.
pub fn action_for(event: &Event, modifiers: Modifiers) -> Option<Action> {
    match event {
        Event::Copy => Some(Action::Copy(copy_format(modifiers))),
        Event::Key {
            key,
            pressed: true,
            modifiers,
            ..
        } => key_action(*key, *modifiers),
        _ => None,
    }
}

fn key_action(key: Key, modifiers: Modifiers) -> Option<Action> {
    if modifiers.command {
        return match key {
            Key::B => Some(Action::ToggleBrowserMode),
            Key::C => Some(Action::Copy(copy_format(modifiers))),
            Key::M => Some(Action::Copy(CopyFormat::Markdown)),
            Key::O => Some(Action::Open),
            Key::Equals | Key::Plus => Some(Action::ZoomIn),
            Key::Minus => Some(Action::ZoomOut),
            _ => None,
        };
    }

    match key {
        Key::Escape => Some(Action::Escape),
        Key::F11 => Some(Action::ToggleFullscreen),
        Key::F5 => Some(Action::Reload),
        _ => None,
    }
}

fn copy_format(modifiers: Modifiers) -> CopyFormat {
    if modifiers.shift {
        CopyFormat::RichText
    } else if modifiers.alt {
        CopyFormat::Html
    } else {
        CopyFormat::PlainText
    }
}
