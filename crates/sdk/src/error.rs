//! Mapping of HTTP failures onto the client error taxonomy

use crate::types::ErrorResponse;
use quasar_core::ClientError;
use reqwest::StatusCode;

/// Map a non-success response onto a `ClientError`
pub fn status_error(status: StatusCode, body: &str) -> ClientError {
    let message = match serde_json::from_str::<ErrorResponse>(body) {
        Ok(envelope) if envelope.error.code.is_empty() => envelope.error.message,
        Ok(envelope) => format!("{}: {}", envelope.error.code, envelope.error.message),
        Err(_) if body.trim().is_empty() => status
            .canonical_reason()
            .unwrap_or("unknown error")
            .to_string(),
        Err(_) => body.to_string(),
    };

    match status {
        StatusCode::BAD_REQUEST => ClientError::InvalidArgument(message),
        StatusCode::NOT_FOUND => ClientError::NotFound(message),
        StatusCode::CONFLICT => ClientError::Conflict(message),
        _ => ClientError::Server {
            status: status.as_u16(),
            message,
        },
    }
}

/// Connection, TLS, timeout and body read failures
pub fn transport_error(err: reqwest::Error) -> ClientError {
    ClientError::Transport(err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conflict_envelope_is_unpacked() {
        let err = status_error(
            StatusCode::CONFLICT,
            r#"{"error":{"code":"InvalidJobCancellationRequest","message":"Job already finished"}}"#,
        );
        match err {
            ClientError::Conflict(message) => {
                assert_eq!(message, "InvalidJobCancellationRequest: Job already finished")
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_status_codes_map_to_taxonomy() {
        assert!(matches!(
            status_error(StatusCode::BAD_REQUEST, "bad"),
            ClientError::InvalidArgument(_)
        ));
        assert!(matches!(
            status_error(StatusCode::NOT_FOUND, ""),
            ClientError::NotFound(m) if m == "Not Found"
        ));
        assert!(matches!(
            status_error(StatusCode::SERVICE_UNAVAILABLE, "down"),
            ClientError::Server { status: 503, message } if message == "down"
        ));
    }
}
