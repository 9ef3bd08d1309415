//! Compact JWS encoding of [`Claims`] with HMAC-SHA256.
//!
//! The codec only proves integrity. Freshness is checked one layer up by the
//! validator so that signature and expiry failures stay distinguishable.
//!
//! The MAC is checked over the raw `header.payload` text before either
//! segment is parsed, so any edit to them reports a signature failure.

use crate::error::AuthError;
use crate::jwt::claims::Claims;
use crate::jwt::key::SigningKey;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, crypto, decode, encode};

const ALGORITHM: Algorithm = Algorithm::HS256;

/// Signs and verifies tokens with the shared key.
pub struct TokenCodec {
    header: Header,
    validation: Validation,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl TokenCodec {
    /// Build a codec bound to `key`.
    #[must_use]
    pub fn new(key: &SigningKey) -> Self {
        let mut validation = Validation::new(ALGORITHM);
        validation.validate_exp = false;
        validation.validate_nbf = false;
        validation.validate_aud = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp"]);

        Self {
            header: Header::new(ALGORITHM),
            validation,
            encoding_key: EncodingKey::from_secret(key.expose()),
            decoding_key: DecodingKey::from_secret(key.expose()),
        }
    }

    /// Serialize and sign. Same claims and key always give the same string.
    ///
    /// # Errors
    ///
    /// [`AuthError::InternalSigning`] if the signing primitive fails.
    pub fn encode(&self, claims: &Claims) -> Result<String, AuthError> {
        encode(&self.header, claims, &self.encoding_key).map_err(|e| AuthError::signing(e.to_string()))
    }

    /// Verify the MAC and parse the claims. Expiry is not checked.
    ///
    /// # Errors
    ///
    /// [`AuthError::Malformed`] when the token is not three `.`-separated
    /// segments or an authentic segment cannot be parsed,
    /// [`AuthError::SignatureInvalid`] for every verification failure.
    pub fn decode(&self, token: &str) -> Result<Claims, AuthError> {
        self.verify_mac(token)?;
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| classify(e.kind()))
    }

    /// Constant-time MAC check over the unparsed `header.payload` text.
    fn verify_mac(&self, token: &str) -> Result<(), AuthError> {
        let (message, signature) = token.rsplit_once('.').ok_or(AuthError::Malformed)?;
        if !message.contains('.') {
            return Err(AuthError::Malformed);
        }

        match crypto::verify(signature, message.as_bytes(), &self.decoding_key, ALGORITHM) {
            Ok(true) => Ok(()),
            _ => Err(AuthError::SignatureInvalid),
        }
    }
}

fn classify(kind: &ErrorKind) -> AuthError {
    match kind {
        ErrorKind::InvalidToken
        | ErrorKind::Base64(_)
        | ErrorKind::Json(_)
        | ErrorKind::Utf8(_)
        | ErrorKind::MissingRequiredClaim(_)
        | ErrorKind::MissingAlgorithm => AuthError::Malformed,
        // Library signature errors and any other verification failure share one code.
        _ => AuthError::SignatureInvalid,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jwt::claims::DEFAULT_EXPIRY;
    use chrono::{TimeZone, Utc};

    fn codec(secret: &[u8]) -> TokenCodec {
        TokenCodec::new(&SigningKey::new(secret.to_vec()).unwrap())
    }

    fn claims() -> Claims {
        Claims::new("alice", Utc.with_ymd_and_hms(2026, 10, 16, 9, 0, 0).unwrap(), DEFAULT_EXPIRY)
    }

    #[test]
    fn test_round_trip() {
        let codec = codec(b"test-secret-key-for-testing-only");
        let token = codec.encode(&claims()).unwrap();
        assert_eq!(token.split('.').count(), 3);
        assert_eq!(codec.decode(&token).unwrap(), claims());
    }

    #[test]
    fn test_encode_is_deterministic() {
        let codec = codec(b"test-secret-key-for-testing-only");
        assert_eq!(codec.encode(&claims()).unwrap(), codec.encode(&claims()).unwrap());
    }

    #[test]
    fn test_decode_does_not_check_expiry() {
        let codec = codec(b"k");
        let old = Claims::new("alice", Utc.with_ymd_and_hms(2001, 1, 1, 0, 0, 0).unwrap(), DEFAULT_EXPIRY);
        let token = codec.encode(&old).unwrap();
        assert_eq!(codec.decode(&token).unwrap(), old);
    }

    #[test]
    fn test_wrong_key_is_signature_invalid() {
        let token = codec(b"key-one").encode(&claims()).unwrap();
        assert_eq!(codec(b"key-two").decode(&token), Err(AuthError::SignatureInvalid));
    }

    /// Token built from raw segments with a valid MAC over them.
    fn signed(secret: &[u8], header_json: &str, payload_json: &str) -> String {
        use base64::Engine;
        let b64 = base64::engine::general_purpose::URL_SAFE_NO_PAD;
        let message = format!("{}.{}", b64.encode(header_json), b64.encode(payload_json));
        let mac = crypto::sign(message.as_bytes(), &EncodingKey::from_secret(secret), ALGORITHM).unwrap();
        format!("{message}.{mac}")
    }

    #[test]
    fn test_too_few_segments_is_malformed() {
        let codec = codec(b"k");
        assert_eq!(codec.decode(""), Err(AuthError::Malformed));
        assert_eq!(codec.decode("not-a-token"), Err(AuthError::Malformed));
        assert_eq!(codec.decode("a.b"), Err(AuthError::Malformed));
    }

    #[test]
    fn test_unauthenticated_garbage_is_signature_invalid() {
        let codec = codec(b"k");
        assert_eq!(codec.decode("!!!.???.***"), Err(AuthError::SignatureInvalid));
        assert_eq!(codec.decode("a.b.c.d"), Err(AuthError::SignatureInvalid));
    }

    #[test]
    fn test_authentic_but_unparsable_is_malformed() {
        let secret = b"k";
        let codec = codec(secret);
        let header = r#"{"alg":"HS256","typ":"JWT"}"#;

        let not_json = signed(secret, header, "not json");
        assert_eq!(codec.decode(&not_json), Err(AuthError::Malformed));

        let no_exp = signed(secret, header, r#"{"sub":"alice"}"#);
        assert_eq!(codec.decode(&no_exp), Err(AuthError::Malformed));

        let bad_header = signed(secret, "not json", r#"{"sub":"alice","exp":1900000000}"#);
        assert_eq!(codec.decode(&bad_header), Err(AuthError::Malformed));

        let ok = signed(secret, header, r#"{"sub":"alice","exp":1900000000}"#);
        assert_eq!(codec.decode(&ok).unwrap().subject(), "alice");
    }

    #[test]
    fn test_header_edit_is_signature_invalid() {
        let codec = codec(b"test-secret-key-for-testing-only");
        let token = codec.encode(&claims()).unwrap();

        for replacement in [b'A', b'.', b'!', b'='] {
            let mut bytes = token.clone().into_bytes();
            bytes[0] = if bytes[0] == replacement { b'B' } else { replacement };
            let tampered = String::from_utf8(bytes).unwrap();
            assert_eq!(codec.decode(&tampered), Err(AuthError::SignatureInvalid), "{tampered}");
        }
    }

    #[test]
    fn test_payload_byte_turned_into_dot_is_signature_invalid() {
        let codec = codec(b"test-secret-key-for-testing-only");
        let token = codec.encode(&claims()).unwrap();
        let dot = token.find('.').unwrap();

        let mut bytes = token.into_bytes();
        bytes[dot + 3] = b'.';
        let tampered = String::from_utf8(bytes).unwrap();
        assert_eq!(codec.decode(&tampered), Err(AuthError::SignatureInvalid));
    }

    #[test]
    fn test_other_algorithm_is_signature_invalid() {
        let secret = b"shared";
        let foreign = encode(
            &Header::new(Algorithm::HS512),
            &claims(),
            &EncodingKey::from_secret(secret),
        )
        .unwrap();
        assert_eq!(codec(secret).decode(&foreign), Err(AuthError::SignatureInvalid));
    }
}
