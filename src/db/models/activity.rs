/// Rolling moderation counters read back from the audit tables
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActivityCounts {
    pub judged: i64,
    pub spam: i64,
    pub warned: i64,
    pub kicked: i64,
    pub banned: i64,
    /// Users whose violation record is still inside the reset window
    pub active_violators: i64,
}

impl ActivityCounts {
    /// Fold a punishment-log action count into the matching counter
    pub fn add_action(&mut self, action: &str, count: i64) {
        match action {
            "warning" => self.warned += count,
            "kick" => self.kicked += count,
            "ban" => self.banned += count,
            _ => {}
        }
    }
}
