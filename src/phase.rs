#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Running,
    Complete,
}

impl Default for Phase {
    fn default() -> Self {
        Self::Idle
    }
}
