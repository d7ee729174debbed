//! Application state and input handling.

use crate::config::TuiConfig;
use crate::error::TuiError;
use crate::export::write_export;
use crate::keys::Action;
use crate::notifications::{Notification, NotificationLevel};
use crate::persistence::PersistedState;
use crate::theme::SynthBruteTheme;
use chrono::{DateTime, Utc};
use crossterm::event::KeyEvent;
use rewind_core::{RunSources, MAX_PLAYBACK_SPEED, MIN_PLAYBACK_SPEED};
use rewind_player::{JumpOutcome, ReplaySession, TickScheduler, TokioScheduler};
use std::collections::VecDeque;
use tui_textarea::TextArea;

/// Notifications kept for the footer; older ones are dropped.
pub const MAX_NOTIFICATIONS: usize = 16;

/// Speeds the `+`/`-` keys step through.
pub const SPEED_LADDER: [f64; 5] = [MIN_PLAYBACK_SPEED, 0.5, 1.0, 2.0, MAX_PLAYBACK_SPEED];

/// Next rung above `current`, or the top rung.
pub fn faster(current: f64) -> f64 {
    SPEED_LADDER
        .iter()
        .copied()
        .find(|&speed| speed > current)
        .unwrap_or(MAX_PLAYBACK_SPEED)
}

/// Next rung below `current`, or the bottom rung.
pub fn slower(current: f64) -> f64 {
    SPEED_LADDER
        .iter()
        .rev()
        .copied()
        .find(|&speed| speed < current)
        .unwrap_or(MIN_PLAYBACK_SPEED)
}

#[derive(Debug, Clone, PartialEq)]
pub enum SourceStatus {
    Connecting,
    Live { updated_at: DateTime<Utc> },
    Failed(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetailTab {
    /// Raw JSON of the current step's record.
    Record,
    /// Everything replayed so far, grouped by type.
    State,
}

impl DetailTab {
    pub fn toggle(self) -> Self {
        match self {
            DetailTab::Record => DetailTab::State,
            DetailTab::State => DetailTab::Record,
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            DetailTab::Record => "Record",
            DetailTab::State => "State so far",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptKind {
    JumpToAgent,
    JumpToStep,
}

impl PromptKind {
    pub fn title(&self) -> &'static str {
        match self {
            PromptKind::JumpToAgent => "Jump to agent role",
            PromptKind::JumpToStep => "Jump to step number",
        }
    }
}

pub struct Prompt {
    pub kind: PromptKind,
    pub input: TextArea<'static>,
}

impl Prompt {
    pub fn new(kind: PromptKind) -> Self {
        let mut input = TextArea::default();
        input.set_placeholder_text(match kind {
            PromptKind::JumpToAgent => "planner",
            PromptKind::JumpToStep => "1",
        });
        Self { kind, input }
    }

    pub fn text(&self) -> String {
        self.input.lines().join("").trim().to_string()
    }
}

#[derive(Debug, Clone)]
pub struct Modal {
    pub title: String,
    pub message: String,
}

pub struct App<S: TickScheduler = TokioScheduler> {
    pub config: TuiConfig,
    pub theme: SynthBruteTheme,
    pub session: ReplaySession<S>,
    pub source_label: String,
    pub source_status: SourceStatus,
    pub detail_tab: DetailTab,
    pub notifications: VecDeque<Notification>,
    pub prompt: Option<Prompt>,
    pub modal: Option<Modal>,
    pending_restore: Option<PersistedState>,
}

impl<S: TickScheduler> App<S> {
    pub fn new(config: TuiConfig, source_label: String, scheduler: S) -> Result<Self, TuiError> {
        let session = ReplaySession::new(config.replay_config(), RunSources::empty(), scheduler)?;
        Ok(Self {
            config,
            theme: SynthBruteTheme::synthbrute(),
            session,
            source_label,
            source_status: SourceStatus::Connecting,
            detail_tab: DetailTab::Record,
            notifications: VecDeque::with_capacity(MAX_NOTIFICATIONS),
            prompt: None,
            modal: None,
            pending_restore: None,
        })
    }

    /// Restore `state` once the first non-empty timeline arrives.
    pub fn restore_on_load(&mut self, state: PersistedState) {
        if state.run_id == self.config.run_id {
            self.pending_restore = Some(state);
        }
    }

    pub fn notify(&mut self, level: NotificationLevel, message: impl Into<String>) {
        if self.notifications.len() == MAX_NOTIFICATIONS {
            self.notifications.pop_front();
        }
        self.notifications.push_back(Notification::new(level, message));
    }

    pub fn persisted_state(&self) -> PersistedState {
        let snapshot = self.session.snapshot();
        PersistedState {
            run_id: self.config.run_id.clone(),
            current_step_index: snapshot.current_step_index,
            playback_speed: snapshot.playback_speed,
        }
    }

    // === Source updates ===

    pub fn apply_sources(&mut self, sources: RunSources) {
        self.source_status = SourceStatus::Live {
            updated_at: Utc::now(),
        };
        if !self.session.update_sources(sources) {
            return;
        }

        if self.session.snapshot().total_steps > 0 {
            if let Some(state) = self.pending_restore.take() {
                let index = self
                    .session
                    .restore(state.current_step_index, state.playback_speed);
                self.notify(
                    NotificationLevel::Info,
                    format!("Resumed at step {}", index + 1),
                );
            }
        }
    }

    pub fn source_unchanged(&mut self) {
        self.source_status = SourceStatus::Live {
            updated_at: Utc::now(),
        };
    }

    pub fn source_failed(&mut self, message: String) {
        let first_failure = !matches!(self.source_status, SourceStatus::Failed(_));
        self.source_status = SourceStatus::Failed(message.clone());
        if first_failure {
            self.notify(NotificationLevel::Error, format!("Fetch failed: {}", message));
        }
    }

    // === Input ===

    /// Route a raw key press to the open prompt. Returns `false` when no
    /// prompt is open.
    pub fn prompt_input(&mut self, key: KeyEvent) -> bool {
        match self.prompt.as_mut() {
            Some(prompt) => {
                prompt.input.input(key);
                true
            }
            None => false,
        }
    }

    /// Apply an action. Returns `true` when the app should quit.
    pub fn apply(&mut self, action: Action) -> bool {
        if self.prompt.is_some() {
            match action {
                Action::Confirm => self.confirm_prompt(),
                Action::Cancel => self.prompt = None,
                _ => {}
            }
            return false;
        }

        if self.modal.is_some() {
            if matches!(action, Action::Confirm | Action::Cancel | Action::OpenHelp) {
                self.modal = None;
            }
            return action == Action::Quit;
        }

        match action {
            Action::Quit => return true,
            Action::TogglePlay => {
                self.session.toggle_playback();
            }
            Action::StepForward => {
                self.session.step_forward();
            }
            Action::StepBackward => {
                self.session.step_backward();
            }
            Action::JumpFirst => {
                self.session.jump_to_step(0);
            }
            Action::JumpLast => {
                self.session.jump_to_step(i64::MAX);
            }
            Action::SpeedUp => {
                let current = self.session.snapshot().playback_speed;
                self.session.set_playback_speed(faster(current));
            }
            Action::SpeedDown => {
                let current = self.session.snapshot().playback_speed;
                self.session.set_playback_speed(slower(current));
            }
            Action::NextError => {
                if self.session.jump_to_next_error() == JumpOutcome::NoMatch {
                    self.notify(NotificationLevel::Info, "No errors in this run");
                }
            }
            Action::PromptAgent => self.prompt = Some(Prompt::new(PromptKind::JumpToAgent)),
            Action::PromptStep => self.prompt = Some(Prompt::new(PromptKind::JumpToStep)),
            Action::Reset => self.session.reset(),
            Action::Export => self.export(),
            Action::ToggleDetail => self.detail_tab = self.detail_tab.toggle(),
            Action::OpenHelp => {
                self.modal = Some(Modal {
                    title: "Keybindings".to_string(),
                    message: crate::keys::HELP_TEXT.to_string(),
                })
            }
            Action::Confirm | Action::Cancel => {}
        }
        false
    }

    fn confirm_prompt(&mut self) {
        let Some(prompt) = self.prompt.take() else {
            return;
        };
        let text = prompt.text();
        if text.is_empty() {
            return;
        }

        match prompt.kind {
            PromptKind::JumpToAgent => {
                if self.session.jump_to_agent(&text) == JumpOutcome::NoMatch {
                    self.notify(
                        NotificationLevel::Warning,
                        format!("No step for agent '{}'", text),
                    );
                }
            }
            PromptKind::JumpToStep => match text.parse::<i64>() {
                Ok(number) => {
                    self.session.jump_to_step(number.saturating_sub(1));
                }
                Err(_) => self.notify(
                    NotificationLevel::Error,
                    format!("'{}' is not a step number", text),
                ),
            },
        }
    }

    fn export(&mut self) {
        let export = self.session.export(&self.config.run_id, Utc::now());
        match write_export(&self.config.export_dir, &export) {
            Ok(path) => {
                tracing::info!(
                    run_id = %self.config.run_id,
                    path = %path.display(),
                    steps = export.total_steps,
                    "Replay exported"
                );
                self.notify(
                    NotificationLevel::Success,
                    format!("Exported to {}", path.display()),
                );
            }
            Err(err) => {
                tracing::error!(run_id = %self.config.run_id, error = %err, "Export failed");
                self.notify(NotificationLevel::Error, format!("Export failed: {}", err));
            }
        }
    }
}
