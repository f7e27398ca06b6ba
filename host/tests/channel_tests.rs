#![allow(clippy::unwrap_used, clippy::arithmetic_side_effects)]
//! The JSON-lines channel end to end, over the software platform.

use biocipher_host::build_facade;
use biocipher_host::channel::{handle_line, serve};
use biocipher_host::config::{
    AvailabilitySetting, BiometryConfig, ConsentConfig, ConsentMode, HostConfig, TpmBackend,
    TpmConfig,
};
use biocipher_service::{ErrorCode, MethodResult, RequestFacade};
use serde_json::Value;
use tokio::io::BufReader;

fn config(consent: ConsentMode) -> HostConfig {
    HostConfig {
        tpm: TpmConfig {
            backend: TpmBackend::Fixed,
            platform_type: "TPM-Version:2.0".into(),
        },
        consent: ConsentConfig {
            mode: consent,
            ..ConsentConfig::default()
        },
        ..HostConfig::default()
    }
}

async fn run_script(facade: &RequestFacade, script: &str) -> String {
    let mut out = Vec::new();
    serve(facade, BufReader::new(script.as_bytes()), &mut out)
        .await
        .unwrap();
    String::from_utf8(out).unwrap()
}

#[tokio::test]
async fn scripted_session() {
    let facade = build_facade(&config(ConsentMode::AutoApprove));
    let script = r#"
{"id":1,"method":"getTPMStatus"}
{"id":2,"method":"getBiometryStatus","arguments":null}
{"id":3,"method":"configure","arguments":{"windowsDataToSign":"hello"}}
{"id":4,"method":"generateKey","arguments":{"tag":"t"}}
{"id":5,"method":"generateKey","arguments":{"tag":"t"}}
{"id":6,"method":"encrypt","arguments":{"tag":"nope","data":"x"}}
{"id":7,"method":"deleteKey","arguments":{"tag":"t"}}
{"id":8,"method":"deleteKey","arguments":{"tag":"t"}}
{"id":9,"method":"exportKey"}
{"id":10,"method":"deleteKey","arguments":{}}
"#;
    let output = run_script(&facade, script).await;
    insta::assert_snapshot!(output.trim_end(), @r###"
    {"id":1,"status":"success","result":0}
    {"id":2,"status":"success","result":0}
    {"id":3,"status":"success","result":null}
    {"id":4,"status":"success","result":null}
    {"id":5,"status":"error","code":"KEY_ALREADY_EXISTS","message":"key credential already exists"}
    {"id":6,"status":"error","code":"KEY_NOT_FOUND","message":"key credential not found"}
    {"id":7,"status":"success","result":null}
    {"id":8,"status":"success","result":null}
    {"id":9,"status":"notImplemented"}
    {"id":10,"status":"error","code":"INVALID_ARGUMENT","message":"invalid argument: Argument tag is missing."}
    "###);
}

#[tokio::test]
async fn encrypt_decrypt_roundtrip_over_channel() {
    let facade = build_facade(&config(ConsentMode::AutoApprove));
    handle_line(
        &facade,
        r#"{"id":"c","method":"configure","arguments":{"windowsDataToSign":"hello"}}"#,
    )
    .await;
    handle_line(&facade, r#"{"method":"generateKey","arguments":{"tag":"wallet"}}"#).await;

    let sealed = handle_line(
        &facade,
        r#"{"id":"e","method":"encrypt","arguments":{"tag":"wallet","data":"correct horse"}}"#,
    )
    .await;
    let envelope = match sealed.outcome {
        MethodResult::Success {
            result: Value::String(envelope),
        } => envelope,
        other => panic!("encrypt failed: {other:?}"),
    };

    let request = serde_json::json!({
        "id": "d",
        "method": "decrypt",
        "arguments": { "tag": "wallet", "data": envelope },
    });
    let opened = handle_line(&facade, &request.to_string()).await;
    assert_eq!(opened.id, Value::from("d"));
    assert_eq!(
        opened.outcome,
        MethodResult::Success {
            result: Value::from("correct horse")
        }
    );
}

#[tokio::test]
async fn error_response_shape() {
    let facade = build_facade(&config(ConsentMode::AutoApprove));
    let response = handle_line(
        &facade,
        r#"{"id":7,"method":"decrypt","arguments":{"tag":"t","data":"AAAA"}}"#,
    )
    .await;
    insta::assert_json_snapshot!(response, @r###"
    {
      "id": 7,
      "status": "error",
      "code": "DECRYPT_ERROR",
      "message": "decrypt error: Data to sign is empty"
    }
    "###);
}

#[tokio::test]
async fn denied_consent_is_user_canceled() {
    let facade = build_facade(&config(ConsentMode::Deny));
    let response = handle_line(&facade, r#"{"method":"generateKey","arguments":{"tag":"t"}}"#).await;
    assert_eq!(
        response.outcome.error_code(),
        Some(ErrorCode::AuthenticationUserCanceled)
    );
}

#[tokio::test]
async fn malformed_line_is_invalid_argument_and_loop_continues() {
    let facade = build_facade(&config(ConsentMode::AutoApprove));
    let output = run_script(&facade, "not json\n\n{\"id\":2,\"method\":\"getTPMStatus\"}\n").await;
    let lines: Vec<Value> = output
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0]["id"], Value::Null);
    assert_eq!(lines[0]["code"], "INVALID_ARGUMENT");
    assert_eq!(lines[1]["result"], 0);
}

#[tokio::test]
async fn unavailable_biometry_and_missing_tpm() {
    let facade = build_facade(&HostConfig {
        tpm: TpmConfig {
            backend: TpmBackend::None,
            platform_type: String::new(),
        },
        biometry: BiometryConfig {
            supported: false,
            availability: AvailabilitySetting::DisabledByPolicy,
        },
        ..config(ConsentMode::AutoApprove)
    });
    let output = run_script(
        &facade,
        "{\"id\":1,\"method\":\"getTPMStatus\"}\n{\"id\":2,\"method\":\"getBiometryStatus\"}\n{\"id\":3,\"method\":\"generateKey\",\"arguments\":{\"tag\":\"t\"}}\n",
    )
    .await;
    insta::assert_snapshot!(output.trim_end(), @r###"
    {"id":1,"status":"success","result":1}
    {"id":2,"status":"success","result":4}
    {"id":3,"status":"error","code":"BIOMETRY_NOT_SUPPORTED","message":"biometry is not supported"}
    "###);
}
