//! Shared building blocks for the store binaries and adapters:
//! response envelopes, logging setup and startup environment checks.

pub mod types;
pub mod utils;
pub mod env;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn health_type_ok() {
        let h = types::Health { status: "ok" };
        assert_eq!(h.status, "ok");
    }

    #[test]
    fn message_without_data_omits_field() {
        let body = types::MessageResponse::<()>::message("done");
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json, serde_json::json!({"message": "done"}));
    }

    #[test]
    fn message_with_data_serializes_payload() {
        let body = types::MessageResponse::with_data("found", "{\"a\":1}");
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["data"], "{\"a\":1}");
    }
}
