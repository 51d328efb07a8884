use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::app::{App, Home, Message, Overlay, View};

/// A declarative keybinding map that can be composed and extended.
#[derive(Clone)]
pub struct Keymap {
    bindings: Vec<(KeyCode, KeyModifiers, Message)>,
}

impl Keymap {
    pub const fn new() -> Self {
        Self {
            bindings: Vec::new(),
        }
    }

    /// Add a key binding with no modifiers.
    pub fn bind(mut self, code: KeyCode, message: Message) -> Self {
        self.bindings.push((code, KeyModifiers::NONE, message));
        self
    }

    /// Add a key binding with Ctrl modifier.
    pub fn bind_ctrl(mut self, code: KeyCode, message: Message) -> Self {
        self.bindings.push((code, KeyModifiers::CONTROL, message));
        self
    }

    /// Look up a message for a key event.
    /// Later bindings take precedence over earlier ones.
    pub fn get(&self, event: &KeyEvent) -> Option<Message> {
        self.bindings
            .iter()
            .rev()
            .find(|(code, mods, _)| *code == event.code && event.modifiers.contains(*mods))
            .map(|(_, _, msg)| msg.clone())
    }

    /// Extend this keymap with another. The other keymap's bindings take precedence.
    pub fn extend(mut self, other: Self) -> Self {
        self.bindings.extend(other.bindings);
        self
    }

    /// Find the first key bound to a specific message.
    pub fn find_key(&self, message: &Message) -> Option<(KeyCode, KeyModifiers)> {
        self.bindings
            .iter()
            .find(|(_, _, msg)| msg == message)
            .map(|(code, mods, _)| (*code, *mods))
    }
}

impl Default for Keymap {
    fn default() -> Self {
        Self::new()
    }
}

/// Format a key binding for display in help text.
pub fn format_key(code: KeyCode, mods: KeyModifiers) -> String {
    let key_str = match code {
        KeyCode::Char(' ') => "Space".to_string(),
        KeyCode::Char(c) => c.to_string(),
        KeyCode::Enter => "Enter".to_string(),
        KeyCode::Esc => "Esc".to_string(),
        KeyCode::Up => "↑".to_string(),
        KeyCode::Down => "↓".to_string(),
        KeyCode::Left => "←".to_string(),
        KeyCode::Right => "→".to_string(),
        KeyCode::Backspace => "Bksp".to_string(),
        KeyCode::Tab => "Tab".to_string(),
        KeyCode::F(n) => format!("F{n}"),
        _ => "?".to_string(),
    };
    if mods.contains(KeyModifiers::CONTROL) {
        format!("C-{key_str}")
    } else if mods.contains(KeyModifiers::ALT) {
        format!("M-{key_str}")
    } else {
        key_str
    }
}

/// Builds a status bar hint like `j:next  k:prev` from the keys bound in `keymap`.
pub fn hint(keymap: &Keymap, entries: &[(Message, &str)]) -> String {
    entries
        .iter()
        .filter_map(|(msg, label)| {
            let (code, mods) = keymap.find_key(msg)?;
            Some(format!("{}:{}", format_key(code, mods), label))
        })
        .collect::<Vec<_>>()
        .join("  ")
}

/// Global keybindings that work in all views.
pub fn global_keymap() -> Keymap {
    Keymap::new()
        .bind(KeyCode::Char('q'), Message::Quit)
        .bind_ctrl(KeyCode::Char('c'), Message::Quit)
        .bind(KeyCode::Char('`'), Message::ToggleDebug)
        .bind(KeyCode::Char('?'), Message::ToggleHelp)
}

fn navigation_keymap() -> Keymap {
    Keymap::new()
        .bind(KeyCode::Char('j'), Message::SelectNext)
        .bind(KeyCode::Down, Message::SelectNext)
        .bind(KeyCode::Char('k'), Message::SelectPrev)
        .bind(KeyCode::Up, Message::SelectPrev)
        .bind(KeyCode::Char('h'), Message::PrevImage)
        .bind(KeyCode::Left, Message::PrevImage)
        .bind(KeyCode::Char('l'), Message::NextImage)
        .bind(KeyCode::Right, Message::NextImage)
        .bind(KeyCode::Char('o'), Message::OpenLink)
        .bind(KeyCode::Char('r'), Message::Refresh)
}

/// Feed view keybindings.
pub fn feed_keymap() -> Keymap {
    navigation_keymap().extend(
        Keymap::new()
            .bind(KeyCode::Char('g'), Message::SelectFirst)
            .bind(KeyCode::Char('G'), Message::SelectLast)
            .bind_ctrl(KeyCode::Char('d'), Message::PageDown)
            .bind_ctrl(KeyCode::Char('u'), Message::PageUp)
            .bind(KeyCode::Enter, Message::OpenStory)
            .bind(KeyCode::Char('m'), Message::LoadMore)
            .bind(KeyCode::Char('s'), Message::OpenSources)
            .bind(KeyCode::Char('/'), Message::StartSearch)
            .bind(KeyCode::Char('x'), Message::ClearSearch),
    )
}

/// Story detail keybindings.
pub fn detail_keymap() -> Keymap {
    navigation_keymap().extend(
        Keymap::new()
            .bind(KeyCode::Enter, Message::OpenLink)
            .bind(KeyCode::Esc, Message::Back)
            .bind(KeyCode::Backspace, Message::Back),
    )
}

/// Keybindings while the home feed could not be loaded.
pub fn unavailable_keymap() -> Keymap {
    Keymap::new().bind(KeyCode::Char('r'), Message::Refresh)
}

/// Keybindings for the source picker popup.
pub fn sources_keymap() -> Keymap {
    Keymap::new()
        .bind(KeyCode::Char('j'), Message::OverlayDown)
        .bind(KeyCode::Down, Message::OverlayDown)
        .bind(KeyCode::Char('k'), Message::OverlayUp)
        .bind(KeyCode::Up, Message::OverlayUp)
        .bind(KeyCode::Char(' '), Message::ToggleSource)
        .bind(KeyCode::Enter, Message::ToggleSource)
        .bind(KeyCode::Esc, Message::CloseOverlay)
        .bind(KeyCode::Char('s'), Message::CloseOverlay)
        .bind(KeyCode::Char('q'), Message::CloseOverlay)
        .bind_ctrl(KeyCode::Char('c'), Message::CloseOverlay)
}

fn search_keymap() -> Keymap {
    Keymap::new()
        .bind(KeyCode::Enter, Message::SubmitSearch)
        .bind(KeyCode::Backspace, Message::SearchBackspace)
        .bind(KeyCode::Esc, Message::CloseOverlay)
        .bind_ctrl(KeyCode::Char('c'), Message::CloseOverlay)
}

/// Search input captures printable characters; only control keys are bound.
fn handle_search_key(key: KeyEvent) -> Option<Message> {
    if let Some(msg) = search_keymap().get(&key) {
        return Some(msg);
    }
    match key.code {
        KeyCode::Char(c)
            if !key
                .modifiers
                .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) =>
        {
            Some(Message::SearchInput(c))
        }
        _ => None,
    }
}

pub fn handle_key(key: KeyEvent, app: &App) -> Option<Message> {
    // Overlays take priority when open
    match &app.overlay {
        Some(Overlay::Search { .. }) => return handle_search_key(key),
        Some(Overlay::Sources { .. }) => return sources_keymap().get(&key),
        None => {}
    }

    if let Some(msg) = global_keymap().get(&key) {
        return Some(msg);
    }

    if let Home::Unavailable { .. } = app.home {
        return unavailable_keymap().get(&key);
    }

    match app.view {
        View::Feed => feed_keymap().get(&key),
        View::Detail(_) => detail_keymap().get(&key),
    }
}
