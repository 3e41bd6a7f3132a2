use oc_plugins::capability::CapabilityTable;
use oc_plugins::error::InitError;
use serde_json::{Value, json};

/// Fired once plugins are initialized.
pub const START: &str = "start";

/// Fired when plugin initialization fails.
pub const ERROR: &str = "error";

/// Fired when the registry is closed.
pub const STOP: &str = "stop";

/// `code` of the [`ERROR`] payload for initialization failures.
pub const PLUGIN_INITIALISATION_FAILED: &str = "plugin_initialisation_failed";

/// `{"plugins": [names]}`, names in table order.
#[must_use]
pub fn start_payload(plugins: &CapabilityTable) -> Value {
    json!({ "plugins": plugins.names() })
}

/// `{"code": ..., "kind": ..., "message": ...}` describing `err`.
#[must_use]
pub fn error_payload(err: &InitError) -> Value {
    json!({
        "code": PLUGIN_INITIALISATION_FAILED,
        "kind": err.kind(),
        "message": err.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_payload_carries_message_and_kind() {
        let err = InitError::DependencyCycle(vec!["a".into(), "b".into(), "a".into()]);
        assert_eq!(
            error_payload(&err),
            json!({
                "code": "plugin_initialisation_failed",
                "kind": "dependency_cycle",
                "message": "Dependency Cycle Found: a -> b -> a",
            })
        );
    }

    #[test]
    fn start_payload_of_empty_table() {
        assert_eq!(start_payload(&CapabilityTable::new()), json!({ "plugins": [] }));
    }
}
