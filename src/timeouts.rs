use std::time::Duration;

use crate::config::ClientSettings;

/// Kinds of calls made against the service, each with its own total budget.
/// The connect timeout is shared and set once on the client.
#[derive(Debug, Clone, Copy)]
pub enum InterfaceClass {
    Probe,
    Statement,
}

impl InterfaceClass {
    fn total_ms(self, settings: &ClientSettings) -> u64 {
        match self {
            InterfaceClass::Probe => settings.probe_timeout_ms,
            InterfaceClass::Statement => settings.statement_timeout_ms,
        }
    }

    /// `None` when the budget is zero, which disables the per-request timeout.
    pub fn request_budget(self, settings: &ClientSettings) -> Option<Duration> {
        let ms = self.total_ms(settings);
        (ms > 0).then(|| Duration::from_millis(ms))
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use crate::config::ClientSettings;

    use super::InterfaceClass;

    #[test]
    fn each_class_uses_its_own_budget() {
        let settings = ClientSettings {
            connect_timeout_ms: 100,
            statement_timeout_ms: 2500,
            probe_timeout_ms: 700,
        };
        assert_eq!(
            InterfaceClass::Statement.request_budget(&settings),
            Some(Duration::from_millis(2500))
        );
        assert_eq!(
            InterfaceClass::Probe.request_budget(&settings),
            Some(Duration::from_millis(700))
        );
    }

    #[test]
    fn zero_total_disables_budget() {
        let settings = ClientSettings {
            statement_timeout_ms: 0,
            ..ClientSettings::default()
        };
        assert_eq!(InterfaceClass::Statement.request_budget(&settings), None);
        assert!(InterfaceClass::Probe.request_budget(&settings).is_some());
    }
}
