use serde::Deserialize;

use crate::domain::{ApiToken, UnixTimestamp};
use crate::transport::TransportError;

#[derive(Debug, Clone, Deserialize)]
struct AuthenticationJsonResponse {
    #[serde(default)]
    token: Option<String>,
    #[serde(default)]
    schema: Option<String>,
    #[serde(default, rename = "expiresInMinutes")]
    expires_in_minutes: Option<u64>,
}

/// Decode the body of an `Authentication` response into an [`ApiToken`].
///
/// Returns `Ok(None)` when the body parses but carries no usable `token`
/// field; the caller decides how to report that as an authentication failure.
pub fn decode_authentication_json_response(
    body: &str,
    issued_at: UnixTimestamp,
) -> Result<Option<ApiToken>, TransportError> {
    let parsed: AuthenticationJsonResponse = serde_json::from_str(body)?;

    let Some(token) = parsed.token.filter(|token| !token.trim().is_empty()) else {
        return Ok(None);
    };

    Ok(Some(ApiToken::issued(
        token,
        parsed.schema,
        parsed.expires_in_minutes.unwrap_or(0),
        issued_at,
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_token_schema_and_expiry() {
        let body = r#"{"token":"my_api_token","schema":"JWT","expiresInMinutes":1440}"#;
        let token = decode_authentication_json_response(body, UnixTimestamp::new(1_000))
            .unwrap()
            .unwrap();
        assert_eq!(token.token, "my_api_token");
        assert_eq!(token.schema.as_deref(), Some("JWT"));
        assert_eq!(token.expires_in_minutes, 1440);
        assert_eq!(token.expires_at, UnixTimestamp::new(1_000 + 1440 * 60));
    }

    #[test]
    fn missing_or_blank_token_yields_none() {
        let body = r#"{"schema":"JWT","expiresInMinutes":1440}"#;
        let decoded =
            decode_authentication_json_response(body, UnixTimestamp::new(0)).unwrap();
        assert!(decoded.is_none());

        let body = r#"{"token":"   "}"#;
        let decoded =
            decode_authentication_json_response(body, UnixTimestamp::new(0)).unwrap();
        assert!(decoded.is_none());
    }

    #[test]
    fn invalid_json_is_a_transport_error() {
        let err =
            decode_authentication_json_response("{ not json }", UnixTimestamp::new(0)).unwrap_err();
        assert!(matches!(err, TransportError::Json(_)));
    }

    #[test]
    fn missing_expiry_defaults_to_already_stale() {
        let body = r#"{"token":"my_api_token"}"#;
        let token = decode_authentication_json_response(body, UnixTimestamp::new(500))
            .unwrap()
            .unwrap();
        assert!(!token.is_valid_at(UnixTimestamp::new(500)));
    }
}
