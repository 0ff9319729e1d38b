use std::collections::VecDeque;
use std::time::{Duration, Instant};

use crate::viewer::ViewerNotice;

const MAX_MESSAGES: usize = 6;
const MESSAGE_LIFETIME: Duration = Duration::from_secs(8);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MessageLevel {
    Info,
    Warning,
    Error,
}

#[derive(Clone, Debug)]
pub struct UiMessage {
    pub level: MessageLevel,
    pub text: String,
    pub shown_at: Instant,
}

pub struct UiState {
    pub vsync_enabled: bool,
    pub show_stats: bool,
    pub show_help: bool,
    /// A native file picker is on screen.
    pub picker_open: bool,
    messages: VecDeque<UiMessage>,
}

impl UiState {
    pub fn new(vsync_enabled: bool) -> Self {
        Self {
            vsync_enabled,
            show_stats: true,
            show_help: true,
            picker_open: false,
            messages: VecDeque::with_capacity(MAX_MESSAGES),
        }
    }

    pub fn push_notice(&mut self, notice: &ViewerNotice) {
        let level = match notice {
            ViewerNotice::Loading { .. } | ViewerNotice::Loaded { .. } => MessageLevel::Info,
            ViewerNotice::Warning(_) => MessageLevel::Warning,
            ViewerNotice::Failed(_) => MessageLevel::Error,
        };
        self.push_message(level, notice.message());
    }

    pub fn push_message(&mut self, level: MessageLevel, text: impl Into<String>) {
        if self.messages.len() == MAX_MESSAGES {
            self.messages.pop_front();
        }
        self.messages.push_back(UiMessage {
            level,
            text: text.into(),
            shown_at: Instant::now(),
        });
    }

    /// Drops messages older than their display lifetime. Errors stay until
    /// pushed out by newer messages.
    pub fn expire_messages(&mut self, now: Instant) {
        self.messages.retain(|m| {
            m.level == MessageLevel::Error || now.duration_since(m.shown_at) < MESSAGE_LIFETIME
        });
    }

    pub fn messages(&self) -> impl Iterator<Item = &UiMessage> {
        self.messages.iter()
    }
}

impl Default for UiState {
    fn default() -> Self {
        Self::new(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ViewerError;

    #[test]
    fn message_log_keeps_the_newest_entries() {
        let mut state = UiState::default();
        for i in 0..(MAX_MESSAGES + 2) {
            state.push_message(MessageLevel::Info, format!("m{}", i));
        }
        let texts: Vec<_> = state.messages().map(|m| m.text.clone()).collect();
        assert_eq!(texts.len(), MAX_MESSAGES);
        assert_eq!(texts[0], "m2");
        assert_eq!(texts.last().map(String::as_str), Some("m7"));
    }

    #[test]
    fn notices_map_to_levels() {
        let mut state = UiState::default();
        state.push_notice(&ViewerNotice::Warning(ViewerError::DegenerateMesh));
        state.push_notice(&ViewerNotice::Failed(ViewerError::FileType {
            file_name: "a.stl".into(),
        }));
        let levels: Vec<_> = state.messages().map(|m| m.level).collect();
        assert_eq!(levels, vec![MessageLevel::Warning, MessageLevel::Error]);
    }

    #[test]
    fn only_errors_outlive_their_lifetime() {
        let mut state = UiState::default();
        state.push_message(MessageLevel::Info, "loaded");
        state.push_message(MessageLevel::Error, "broken");
        state.expire_messages(Instant::now() + MESSAGE_LIFETIME * 2);
        let texts: Vec<_> = state.messages().map(|m| m.text.as_str()).collect();
        assert_eq!(texts, vec!["broken"]);
    }
}
