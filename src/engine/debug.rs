use super::DragEngine;

impl<P: Clone> DragEngine<P> {
    /// Record an engine decision in the debug ring buffer (when enabled).
    pub(super) fn debug_log_event(&mut self, message: impl Into<String>) {
        if !self.options.debug_event_log {
            return;
        }
        let cap = self.options.debug_event_log_capacity.clamp(1, 10_000);
        while self.debug_log.len() >= cap {
            self.debug_log.pop_front();
        }
        self.debug_seq = self.debug_seq.wrapping_add(1);
        self.debug_log
            .push_back(format!("[#{}] {}", self.debug_seq, message.into()));
    }

    pub fn debug_log_clear(&mut self) {
        self.debug_log.clear();
    }

    /// All retained debug log lines, newest last. Handy for copy-paste or `tail`-style dumps.
    pub fn debug_log_text(&self) -> String {
        self.debug_log
            .iter()
            .cloned()
            .collect::<Vec<_>>()
            .join("\n")
    }
}
