#![allow(clippy::unwrap_used, clippy::expect_used)]

use mobgate_core::*;
use serde_json::json;

// ---------------------------------------------------------------------------
// 1. Upload metadata extraction
// ---------------------------------------------------------------------------

#[test]
fn upload_metadata_from_complete_response() {
    let body = json!({
        "hash": "abc",
        "scan_type": "apk",
        "file_name": "app.apk",
        "analyzer": "static_analyzer"
    });

    let meta = UploadMetadata::from_response(&body).unwrap();
    assert_eq!(
        meta,
        UploadMetadata {
            hash: "abc".to_string(),
            scan_type: "apk".to_string(),
            file_name: "app.apk".to_string(),
        }
    );
}

#[test]
fn upload_metadata_lists_missing_keys_sorted() {
    let body = json!({ "scan_type": "apk" });

    let err = UploadMetadata::from_response(&body).unwrap_err();
    assert!(matches!(err, MobgateError::MalformedResponse(_)));
    assert_eq!(err.to_string(), "Upload response missing keys: file_name, hash");
}

#[test]
fn upload_metadata_rejects_non_object() {
    let err = UploadMetadata::from_response(&json!(["abc"])).unwrap_err();
    assert!(matches!(err, MobgateError::MalformedResponse(_)));
    assert!(!err.is_network());
}

#[test]
fn upload_metadata_keeps_non_string_values_as_text() {
    let body = json!({ "hash": 42, "scan_type": "ipa", "file_name": "a.ipa" });
    let meta = UploadMetadata::from_response(&body).unwrap();
    assert_eq!(meta.hash, "42");
}

// ---------------------------------------------------------------------------
// 2. Request bodies
// ---------------------------------------------------------------------------

fn sample_meta() -> UploadMetadata {
    UploadMetadata {
        hash: "abc".to_string(),
        scan_type: "apk".to_string(),
        file_name: "app.apk".to_string(),
    }
}

#[test]
fn scan_request_carries_upload_metadata() {
    let meta = sample_meta();
    let body = serde_json::to_value(ScanRequest::from(&meta)).unwrap();
    assert_eq!(
        body,
        json!({ "scan_type": "apk", "file_name": "app.apk", "hash": "abc" })
    );
}

#[test]
fn masvs_request_adds_level() {
    let meta = sample_meta();
    let body = serde_json::to_value(MasvsRequest::new(&meta, "L1")).unwrap();
    assert_eq!(body["masvs_level"], "L1");
    assert_eq!(body["hash"], "abc");
}
