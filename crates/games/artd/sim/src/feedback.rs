use sim_core::Tick;
use tracing::debug;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Severity {
    Success,
    Error,
    Info,
}

/// Fire-and-forget user feedback: toasts and the "searching for surfaces"
/// indicator. Nothing the game does depends on what an implementation shows.
pub trait Feedback {
    fn show_message(&mut self, text: &str, severity: Severity);
    fn show_tracking_indicator(&mut self, tracking: bool);

    /// Called once at the start of every tick.
    fn begin_tick(&mut self, _tick: Tick) {}
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FeedbackMessage {
    pub tick: Tick,
    pub text: String,
    pub severity: Severity,
}

/// Records everything it is asked to show.
///
/// Indicator updates are only recorded when the value changes.
#[derive(Clone, Debug, Default)]
pub struct FeedbackLog {
    tick: Tick,
    messages: Vec<FeedbackMessage>,
    indicator: Option<bool>,
    indicator_changes: Vec<(Tick, bool)>,
}

impl FeedbackLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stamps subsequent entries with `tick`.
    pub fn set_tick(&mut self, tick: Tick) {
        self.tick = tick;
    }

    pub fn messages(&self) -> &[FeedbackMessage] {
        &self.messages
    }

    pub fn last_message(&self) -> Option<&FeedbackMessage> {
        self.messages.last()
    }

    pub fn count(&self, text: &str) -> usize {
        self.messages.iter().filter(|m| m.text == text).count()
    }

    pub fn indicator(&self) -> Option<bool> {
        self.indicator
    }

    pub fn indicator_changes(&self) -> &[(Tick, bool)] {
        &self.indicator_changes
    }

    /// Drops messages that were already consumed, e.g. printed by the runner.
    pub fn drain(&mut self) -> Vec<FeedbackMessage> {
        std::mem::take(&mut self.messages)
    }
}

impl Feedback for FeedbackLog {
    fn show_message(&mut self, text: &str, severity: Severity) {
        debug!(tick = self.tick, ?severity, text, "feedback");
        self.messages.push(FeedbackMessage {
            tick: self.tick,
            text: text.to_string(),
            severity,
        });
    }

    fn show_tracking_indicator(&mut self, tracking: bool) {
        if self.indicator == Some(tracking) {
            return;
        }
        self.indicator = Some(tracking);
        self.indicator_changes.push((self.tick, tracking));
    }

    fn begin_tick(&mut self, tick: Tick) {
        self.set_tick(tick);
    }
}
