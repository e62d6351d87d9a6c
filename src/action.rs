use color_eyre::Result;
use std::time::Duration;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Action {
    Toggle,
    Restart,
    Quit,
}

/// Delivers one [`Action`] per user gesture.
pub trait InputSource {
    /// Waits at most `timeout` for the next action.
    fn next_action(&mut self, timeout: Duration) -> Result<Option<Action>>;
}
