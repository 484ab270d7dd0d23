use axum::http::HeaderMap;
use axum::http::header::AUTHORIZATION;
use base64::engine::general_purpose::{GeneralPurpose, GeneralPurposeConfig};
use base64::engine::DecodePaddingMode;
use base64::{Engine, alphabet};
use subtle::ConstantTimeEq;
use tracing::info;

use super::{AuthError, AuthGate, BasicPrincipal, Principal};

/// Role granted to every basic-auth principal.
pub const BASIC_USER_ROLE: &str = "basic-user";

const BASIC_PREFIX: &str = "Basic ";

/// Standard alphabet, padding optional on decode.
const CREDENTIALS_ENGINE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Decode `Basic <base64(user:pass)>` into its username and password.
///
/// The password is everything after the first `:` and may itself contain
/// colons. Both parts must be non-empty.
pub fn decode_basic_credentials(header: &str) -> Result<(String, String), AuthError> {
    let encoded = header
        .strip_prefix(BASIC_PREFIX)
        .ok_or(AuthError::MissingBasicHeader)?
        .trim();

    let bytes = CREDENTIALS_ENGINE
        .decode(encoded)
        .map_err(|_| AuthError::InvalidEncoding)?;
    let decoded = String::from_utf8(bytes).map_err(|_| AuthError::InvalidEncoding)?;

    match decoded.split_once(':') {
        Some((username, password)) if !username.is_empty() && !password.is_empty() => {
            Ok((username.to_string(), password.to_string()))
        }
        _ => Err(AuthError::InvalidFormat),
    }
}

impl AuthGate {
    pub(super) fn authenticate_basic(&self, headers: &HeaderMap) -> Result<Principal, AuthError> {
        let header = headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or(AuthError::MissingBasicHeader)?;

        let (username, password) = decode_basic_credentials(header)?;
        info!(username = %username, "Basic credentials received");

        if !constant_time_eq(&username, &self.basic.username)
            || !constant_time_eq(&password, &self.basic.password)
        {
            return Err(AuthError::InvalidCredentials);
        }

        Ok(Principal::Basic(BasicPrincipal {
            username,
            roles: vec![BASIC_USER_ROLE.to_string()],
        }))
    }
}

fn constant_time_eq(a: &str, b: &str) -> bool {
    a.as_bytes().ct_eq(b.as_bytes()).into()
}
