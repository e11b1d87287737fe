//! Typed contract event logs

/// Append-only log of a contract's typed events.
#[derive(Clone, Debug)]
pub struct EventLog<E> {
    events: Vec<E>,
}

impl<E> Default for EventLog<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> EventLog<E> {
    /// Create an empty log.
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    /// Record an event.
    pub fn emit(&mut self, event: E) {
        self.events.push(event);
    }

    /// All emitted events in emission order.
    pub fn all(&self) -> &[E] {
        &self.events
    }

    /// The most recent event, if any.
    pub fn last(&self) -> Option<&E> {
        self.events.last()
    }

    /// Number of emitted events.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Whether any events were emitted.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_emit_and_read() {
        let mut log = EventLog::new();
        log.emit("first");
        log.emit("second");

        assert_eq!(log.len(), 2);
        assert_eq!(log.last(), Some(&"second"));
        assert_eq!(log.all(), &["first", "second"]);
    }
}
