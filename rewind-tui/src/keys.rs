//! Keybinding definitions for the TUI.

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Quit,
    TogglePlay,
    StepForward,
    StepBackward,
    JumpFirst,
    JumpLast,
    SpeedUp,
    SpeedDown,
    NextError,
    PromptAgent,
    PromptStep,
    Reset,
    Export,
    ToggleDetail,
    OpenHelp,
    Confirm,
    Cancel,
}

/// Map a key press outside of a prompt to an action.
pub fn map_key(event: KeyEvent) -> Option<Action> {
    let KeyEvent {
        code,
        modifiers,
        kind,
        ..
    } = event;

    if kind == KeyEventKind::Release {
        return None;
    }

    if modifiers.contains(KeyModifiers::CONTROL) {
        return match code {
            KeyCode::Char('c') => Some(Action::Quit),
            _ => None,
        };
    }

    match code {
        KeyCode::Char('q') => Some(Action::Quit),
        KeyCode::Char(' ') => Some(Action::TogglePlay),
        KeyCode::Right | KeyCode::Char('l') => Some(Action::StepForward),
        KeyCode::Left | KeyCode::Char('h') => Some(Action::StepBackward),
        KeyCode::Home | KeyCode::Char('g') => Some(Action::JumpFirst),
        KeyCode::End | KeyCode::Char('G') => Some(Action::JumpLast),
        KeyCode::Char('+') | KeyCode::Char('=') => Some(Action::SpeedUp),
        KeyCode::Char('-') => Some(Action::SpeedDown),
        KeyCode::Char('e') => Some(Action::NextError),
        KeyCode::Char('a') => Some(Action::PromptAgent),
        KeyCode::Char(':') => Some(Action::PromptStep),
        KeyCode::Char('r') => Some(Action::Reset),
        KeyCode::Char('x') => Some(Action::Export),
        KeyCode::Tab => Some(Action::ToggleDetail),
        KeyCode::Char('?') => Some(Action::OpenHelp),
        KeyCode::Enter => Some(Action::Confirm),
        KeyCode::Esc => Some(Action::Cancel),
        _ => None,
    }
}

/// Map a key press while a prompt is open. Everything else is text input.
pub fn map_prompt_key(event: KeyEvent) -> Option<Action> {
    if event.kind == KeyEventKind::Release {
        return None;
    }
    match event.code {
        KeyCode::Enter => Some(Action::Confirm),
        KeyCode::Esc => Some(Action::Cancel),
        KeyCode::Char('c') if event.modifiers.contains(KeyModifiers::CONTROL) => {
            Some(Action::Cancel)
        }
        _ => None,
    }
}

/// Help text shown in the `?` modal.
pub const HELP_TEXT: &str = "\
Space  play / pause
l / →  step forward      h / ←  step back
Home   first step        End    last step
+ / -  faster / slower   e      next error
a      jump to agent     :      jump to step
r      reset             x      export JSON
Tab    record / state    q      quit";
