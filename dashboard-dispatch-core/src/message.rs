//! Message trait shared by commands, events and slice actions

use std::fmt::Debug;

/// Marker trait for typed messages flowing through the dispatcher
///
/// Commands, events and slice actions are all closed enums. Each variant
/// carries a stable string tag (`name()`) used for routing, logging and
/// predicate matching. Messages should be:
/// - Clone: they may be logged, replayed, or delivered to several handlers
/// - Debug: for logging
/// - Send + 'static: for async dispatch across tasks
///
/// Use `#[derive(Message)]` from `dashboard-dispatch-macros` to auto-implement this trait.
pub trait Message: Clone + Debug + Send + 'static {
    /// Type tag of the message, e.g. `"ChangeDateFilterSelection"`
    fn name(&self) -> &'static str;

    /// Optional grouping (e.g. `"layout"`, `"filter_context"`)
    fn category(&self) -> Option<&'static str> {
        None
    }
}

/// Short human-readable representation used by the message log
///
/// Defaults to the `Debug` output; override for data-heavy payloads.
pub trait MessageSummary: Message {
    fn summary(&self) -> String {
        format!("{:?}", self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, Debug)]
    enum Ping {
        Short,
        Long(Vec<u8>),
    }

    impl Message for Ping {
        fn name(&self) -> &'static str {
            match self {
                Ping::Short => "Short",
                Ping::Long(_) => "Long",
            }
        }
    }

    impl MessageSummary for Ping {
        fn summary(&self) -> String {
            match self {
                Ping::Long(bytes) => format!("Long({} bytes)", bytes.len()),
                _ => format!("{:?}", self),
            }
        }
    }

    #[test]
    fn test_default_category_is_none() {
        assert_eq!(Ping::Short.category(), None);
    }

    #[test]
    fn test_summary_override() {
        assert_eq!(Ping::Short.summary(), "Short");
        assert_eq!(Ping::Long(vec![0; 64]).summary(), "Long(64 bytes)");
    }
}
