/// Per-process values that outlive a single command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionState {
    last_status: i32,
    last_background: Option<i32>,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last_status(&self) -> i32 {
        self.last_status
    }

    pub fn last_background(&self) -> Option<i32> {
        self.last_background
    }

    pub fn record_foreground_status(&mut self, status: i32) {
        self.last_status = status;
    }

    pub fn record_background_pid(&mut self, pid: i32) {
        self.last_background = Some(pid);
    }
}
