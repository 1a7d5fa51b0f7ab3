use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;

/// Checks that a string is a well-formed base64 data URL
/// (`data:<mime>;base64,<payload>`), decoding the payload to confirm it.
pub fn validate_data_url(candidate: &str) -> Result<(), String> {
    let rest = candidate
        .strip_prefix("data:")
        .ok_or_else(|| "expected a data: URL".to_string())?;
    let (_mime, payload) = rest
        .split_once(";base64,")
        .ok_or_else(|| "expected base64-encoded data URL".to_string())?;
    if payload.is_empty() {
        return Err("data URL payload is empty".to_string());
    }
    BASE64
        .decode(payload)
        .map_err(|err| format!("data URL payload is not valid base64: {err}"))?;
    Ok(())
}
