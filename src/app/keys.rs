use super::View;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// ctrl+c: leave immediately from any view, without a command.
    Interrupt,
    Quit,
    Cancel,
    Confirm,
    MoveUp,
    MoveDown,
    FocusNext,
    FocusPrev,
    ScrollUp,
    ScrollDown,
    OpenSettings,
    OpenPicker,
    Insert(char),
    Backspace,
    Delete,
    CursorLeft,
    CursorRight,
    CursorHome,
    CursorEnd,
}

fn is_ctrl(key: &KeyEvent, ch: char) -> bool {
    key.code == KeyCode::Char(ch) && key.modifiers.contains(KeyModifiers::CONTROL)
}

fn printable(key: &KeyEvent) -> Option<char> {
    match key.code {
        KeyCode::Char(ch)
            if !key
                .modifiers
                .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) =>
        {
            Some(ch)
        }
        _ => None,
    }
}

/// Maps a key to the action it means in `view`. `filtering` is whether the
/// task list currently has filter input open, which is when `q` types
/// instead of quitting.
pub fn action_from_key(view: View, filtering: bool, key: KeyEvent) -> Option<Action> {
    if key.kind == KeyEventKind::Release {
        return None;
    }
    if is_ctrl(&key, 'c') {
        return Some(Action::Interrupt);
    }
    match view {
        View::List => {
            if is_ctrl(&key, 'p') {
                return Some(Action::OpenSettings);
            }
            match key.code {
                KeyCode::Enter => Some(Action::Confirm),
                KeyCode::Up => Some(Action::MoveUp),
                KeyCode::Down => Some(Action::MoveDown),
                KeyCode::PageUp => Some(Action::ScrollUp),
                KeyCode::PageDown => Some(Action::ScrollDown),
                KeyCode::Esc => Some(Action::Cancel),
                KeyCode::Backspace => Some(Action::Backspace),
                KeyCode::Char('q') if !filtering && key.modifiers.is_empty() => Some(Action::Quit),
                _ => printable(&key).map(Action::Insert),
            }
        }
        View::Generating => match key.code {
            KeyCode::Esc => Some(Action::Cancel),
            _ => None,
        },
        View::ProviderSelect => match key.code {
            KeyCode::Enter => Some(Action::Confirm),
            KeyCode::Up | KeyCode::BackTab => Some(Action::MoveUp),
            KeyCode::Down | KeyCode::Tab => Some(Action::MoveDown),
            KeyCode::Esc => Some(Action::Cancel),
            _ => None,
        },
        View::ModelSelect => match key.code {
            KeyCode::Enter => Some(Action::Confirm),
            KeyCode::Up => Some(Action::MoveUp),
            KeyCode::Down => Some(Action::MoveDown),
            KeyCode::Esc => Some(Action::Cancel),
            KeyCode::Backspace => Some(Action::Backspace),
            _ => printable(&key).map(Action::Insert),
        },
        View::ParameterInput | View::ApiKeyInput | View::ModelInput => {
            if is_ctrl(&key, 'f') {
                return Some(Action::OpenPicker);
            }
            match key.code {
                KeyCode::Enter => Some(Action::Confirm),
                KeyCode::Esc => Some(Action::Cancel),
                KeyCode::Tab | KeyCode::Down => Some(Action::FocusNext),
                KeyCode::BackTab | KeyCode::Up => Some(Action::FocusPrev),
                KeyCode::Backspace => Some(Action::Backspace),
                KeyCode::Delete => Some(Action::Delete),
                KeyCode::Left => Some(Action::CursorLeft),
                KeyCode::Right => Some(Action::CursorRight),
                KeyCode::Home => Some(Action::CursorHome),
                KeyCode::End => Some(Action::CursorEnd),
                _ => printable(&key).map(Action::Insert),
            }
        }
    }
}
