use serde::Serialize;

use crate::domain::SendMessage;

#[derive(Debug, Serialize)]
struct SendMessageJsonRequest<'a> {
    messages: Vec<MessageJson<'a>>,
    #[serde(rename = "SendOptions", skip_serializing_if = "Option::is_none")]
    send_options: Option<SendOptionsJson<'a>>,
}

#[derive(Debug, Serialize)]
struct MessageJson<'a> {
    destination: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct SendOptionsJson<'a> {
    #[serde(rename = "senderId")]
    sender_id: &'a str,
}

/// Encode a [`SendMessage`] into the `BulkMessages` JSON body.
///
/// `SendOptions` is omitted entirely when no option is set, matching the
/// vendor's expected shape.
pub fn encode_send_message_body(request: &SendMessage) -> String {
    let messages = request
        .messages()
        .iter()
        .map(|message| MessageJson {
            destination: message.destination().as_str(),
            content: message.content().as_str(),
        })
        .collect();

    let send_options = request
        .options()
        .sender_id
        .as_ref()
        .map(|sender_id| SendOptionsJson {
            sender_id: sender_id.as_str(),
        });

    let body = SendMessageJsonRequest {
        messages,
        send_options,
    };

    // Serialization of these borrowed structs cannot fail.
    serde_json::to_string(&body).unwrap_or_default()
}

/// The `statusCode` field of a `BulkMessages` response, when present.
pub fn response_status_code(response: &serde_json::Map<String, serde_json::Value>) -> Option<i64> {
    response.get("statusCode").and_then(serde_json::Value::as_i64)
}

/// Extract the vendor's fault detail from a `BulkMessages` response.
///
/// Checks `errors` first, then `ErrorReport.Faults`; the hit is returned
/// serialized, as the error message carried to the caller.
pub fn extract_fault_report(
    response: &serde_json::Map<String, serde_json::Value>,
) -> Option<String> {
    let faults = response.get("errors").or_else(|| {
        response
            .get("ErrorReport")
            .and_then(|report| report.get("Faults"))
    })?;
    serde_json::to_string(faults).ok()
}

#[cfg(test)]
mod tests {
    use crate::domain::{Destination, MessageText, SenderId};

    use super::*;

    fn response_map(json: &str) -> serde_json::Map<String, serde_json::Value> {
        match serde_json::from_str(json).unwrap() {
            serde_json::Value::Object(map) => map,
            other => panic!("expected object, got {other:?}"),
        }
    }

    #[test]
    fn encode_single_message_matches_vendor_shape() {
        let request = SendMessage::single(
            Destination::new("+27000000000").unwrap(),
            MessageText::new("hi").unwrap(),
        );
        assert_eq!(
            encode_send_message_body(&request),
            r#"{"messages":[{"destination":"+27000000000","content":"hi"}]}"#
        );
    }

    #[test]
    fn encode_adds_send_options_only_with_sender_id() {
        let request = SendMessage::single(
            Destination::new("+27000000000").unwrap(),
            MessageText::new("hi").unwrap(),
        )
        .with_sender_id(SenderId::new("+27111111111").unwrap());
        assert_eq!(
            encode_send_message_body(&request),
            r#"{"messages":[{"destination":"+27000000000","content":"hi"}],"SendOptions":{"senderId":"+27111111111"}}"#
        );
    }

    #[test]
    fn encode_preserves_batch_order() {
        let request = crate::domain::SendMessage::new(vec![
            crate::domain::Message::new(
                Destination::new("+27000000001").unwrap(),
                MessageText::new("first").unwrap(),
            ),
            crate::domain::Message::new(
                Destination::new("+27000000002").unwrap(),
                MessageText::new("second").unwrap(),
            ),
        ])
        .unwrap();
        assert_eq!(
            encode_send_message_body(&request),
            r#"{"messages":[{"destination":"+27000000001","content":"first"},{"destination":"+27000000002","content":"second"}]}"#
        );
    }

    #[test]
    fn fault_report_prefers_errors_field() {
        let response = response_map(
            r#"{"errors":[{"errorMessage":"bad destination"}],"ErrorReport":{"Faults":["x"]}}"#,
        );
        assert_eq!(
            extract_fault_report(&response).as_deref(),
            Some(r#"[{"errorMessage":"bad destination"}]"#)
        );
    }

    #[test]
    fn fault_report_falls_back_to_error_report_faults() {
        let response = response_map(r#"{"ErrorReport":{"Faults":["no credits"]}}"#);
        assert_eq!(
            extract_fault_report(&response).as_deref(),
            Some(r#"["no credits"]"#)
        );
    }

    #[test]
    fn fault_report_absent_on_clean_response() {
        let response = response_map(r#"{"cost":1,"remainingBalance":100}"#);
        assert!(extract_fault_report(&response).is_none());
    }

    #[test]
    fn status_code_field_is_read_when_present() {
        let response = response_map(r#"{"statusCode":400}"#);
        assert_eq!(response_status_code(&response), Some(400));

        let response = response_map(r#"{"cost":1}"#);
        assert_eq!(response_status_code(&response), None);
    }
}
