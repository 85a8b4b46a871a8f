use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use file_encrypter::{AppEvent, AppState};

/// What a key press asks for.
#[derive(Debug)]
pub enum Action {
    /// Forward to the controller.
    App(AppEvent),
    Up,
    Down,
    Open,
    Parent,
}

pub fn map_key(key: KeyEvent, state: AppState) -> Option<Action> {
    if key.kind != KeyEventKind::Press {
        return None;
    }
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return Some(Action::App(AppEvent::QuitRequested));
    }
    match (state, key.code) {
        (_, KeyCode::Char('q')) => Some(Action::App(AppEvent::QuitRequested)),
        (_, KeyCode::Char('?')) => Some(Action::App(AppEvent::HelpToggled)),

        (AppState::Browsing, KeyCode::Up | KeyCode::Char('k')) => Some(Action::Up),
        (AppState::Browsing, KeyCode::Down | KeyCode::Char('j')) => Some(Action::Down),
        (AppState::Browsing, KeyCode::Enter | KeyCode::Right | KeyCode::Char('l')) => {
            Some(Action::Open)
        }
        (AppState::Browsing, KeyCode::Backspace | KeyCode::Left | KeyCode::Char('h')) => {
            Some(Action::Parent)
        }

        (AppState::FileOpened, KeyCode::Char('e')) => Some(Action::App(AppEvent::EncryptRequested)),
        (AppState::FileOpened, KeyCode::Char('d')) => Some(Action::App(AppEvent::DecryptRequested)),
        (AppState::FileOpened, KeyCode::Char('b') | KeyCode::Esc) => {
            Some(Action::App(AppEvent::BackRequested))
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn command_keys_only_apply_to_an_open_file() {
        assert!(matches!(
            map_key(press(KeyCode::Char('e')), AppState::FileOpened),
            Some(Action::App(AppEvent::EncryptRequested))
        ));
        assert!(map_key(press(KeyCode::Char('e')), AppState::Browsing).is_none());
        assert!(matches!(
            map_key(press(KeyCode::Esc), AppState::FileOpened),
            Some(Action::App(AppEvent::BackRequested))
        ));
    }

    #[test]
    fn navigation_keys_only_apply_while_browsing() {
        assert!(matches!(
            map_key(press(KeyCode::Char('j')), AppState::Browsing),
            Some(Action::Down)
        ));
        assert!(map_key(press(KeyCode::Enter), AppState::FileOpened).is_none());
    }

    #[test]
    fn ctrl_c_quits_everywhere() {
        let key = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert!(matches!(
            map_key(key, AppState::FileOpened),
            Some(Action::App(AppEvent::QuitRequested))
        ));
    }

    #[test]
    fn releases_are_ignored() {
        let mut key = press(KeyCode::Char('q'));
        key.kind = KeyEventKind::Release;
        assert!(map_key(key, AppState::Browsing).is_none());
    }
}
