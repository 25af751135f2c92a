// src/event.rs
use serde::{Deserialize, Serialize};

/// Invocation payload:
/// `{"src-bucketname", "key", "dst-bucketname", "dst-key-prefix"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvocationEvent {
    #[serde(rename = "src-bucketname")]
    pub src_bucket: String,
    pub key: String,
    #[serde(rename = "dst-bucketname")]
    pub dst_bucket: String,
    #[serde(rename = "dst-key-prefix")]
    pub dst_prefix: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Status {
    Ok,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvocationResponse {
    pub status: Status,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_uses_dashed_field_names() {
        let json = r#"{
            "src-bucketname": "raw",
            "key": "zips/On_Time_2015_3.zip",
            "dst-bucketname": "curated",
            "dst-key-prefix": "flights/daily"
        }"#;
        let event: InvocationEvent = serde_json::from_str(json).unwrap();
        assert_eq!(event.src_bucket, "raw");
        assert_eq!(event.key, "zips/On_Time_2015_3.zip");
        assert_eq!(event.dst_bucket, "curated");
        assert_eq!(event.dst_prefix, "flights/daily");
    }

    #[test]
    fn event_missing_a_field_is_rejected() {
        let json = r#"{"src-bucketname": "raw", "key": "a.zip", "dst-bucketname": "out"}"#;
        assert!(serde_json::from_str::<InvocationEvent>(json).is_err());
    }

    #[test]
    fn response_serializes_uppercase_status() {
        let ok = InvocationResponse { status: Status::Ok };
        let err = InvocationResponse { status: Status::Error };
        assert_eq!(serde_json::to_string(&ok).unwrap(), r#"{"status":"OK"}"#);
        assert_eq!(serde_json::to_string(&err).unwrap(), r#"{"status":"ERROR"}"#);
    }
}
