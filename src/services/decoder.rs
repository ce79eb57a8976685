// src/services/decoder.rs - Ugly URL decoding and validation
use std::sync::Arc;

use base64::{
    alphabet,
    engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig},
    Engine,
};
use log::{debug, warn};

use crate::config::{NamingPools, SecurityConfig};
use crate::errors::DecoderError;
use crate::models::QueryParams;
use crate::validations::rejection_reason;

type Result<T> = std::result::Result<T, DecoderError>;

/// URL-safe base64 that accepts both padded and unpadded input.
const PADDING_TOLERANT: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Finds the carrier value, trying carrier names in their declared order.
///
/// For repeated parameters the first value wins; a name with no values at
/// all counts as absent.
pub fn extract_encoded_token<'a>(params: &'a QueryParams, pools: &NamingPools) -> Result<&'a str> {
    pools
        .carrier_param_names
        .iter()
        .find_map(|name| params.get(name).and_then(|value| value.first()))
        .ok_or(DecoderError::NotFound)
}

/// Number of `=` appended to a stripped token: always 1 to 4, so a token
/// that is already aligned gets a full surplus quantum.
pub fn padding_len(token: &str) -> usize {
    4 - token.len() % 4
}

pub fn pad_token(token: &str) -> String {
    let mut padded = String::with_capacity(token.len() + 4);
    padded.push_str(token);
    padded.push_str(&"=".repeat(padding_len(token)));
    padded
}

/// A trailing `====` carries no data and is dropped before decoding.
fn without_surplus_padding(padded: &str) -> &str {
    padded.strip_suffix("====").unwrap_or(padded)
}

/// Re-pads and decodes a token produced by `encode_original_url`.
pub fn decode_token(token: &str) -> Result<String> {
    let padded = pad_token(token);
    let bytes = PADDING_TOLERANT.decode(without_surplus_padding(&padded))?;
    Ok(String::from_utf8(bytes)?)
}

/// Recovers original URLs from ugly URL query parameters.
pub struct DecoderService {
    pools: Arc<NamingPools>,
    security: Arc<SecurityConfig>,
}

impl DecoderService {
    pub fn new(pools: Arc<NamingPools>, security: Arc<SecurityConfig>) -> Self {
        Self { pools, security }
    }

    /// Extracts, decodes and validates. Only a URL that passes validation is
    /// ever returned.
    pub fn decode(&self, params: &QueryParams) -> Result<String> {
        let token = extract_encoded_token(params, &self.pools)?;
        let url = decode_token(token)?;

        if let Some(reason) = rejection_reason(&url, &self.security) {
            warn!("Rejected decoded URL: {}", reason);
            return Err(DecoderError::InvalidUrl);
        }

        debug!("Decoded URL of {} characters", url.len());
        Ok(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::QueryValue;
    use crate::services::uglifier::encode_original_url;

    fn decoder() -> DecoderService {
        DecoderService::new(
            Arc::new(NamingPools::default()),
            Arc::new(SecurityConfig::default()),
        )
    }

    fn params(pairs: &[(&str, &str)]) -> QueryParams {
        pairs
            .iter()
            .map(|(name, value)| (name.to_string(), value.to_string()))
            .collect()
    }

    #[test]
    fn test_extract_follows_declared_order() {
        // `ref` is declared before `url`
        let query = params(&[("url", "second"), ("utm_source", "x"), ("ref", "first")]);
        assert_eq!(
            extract_encoded_token(&query, &NamingPools::default()),
            Ok("first")
        );
    }

    #[test]
    fn test_extract_takes_first_of_multiple() {
        let mut query = QueryParams::default();
        query.insert("goto", vec!["one".to_string(), "two".to_string()]);
        assert_eq!(extract_encoded_token(&query, &NamingPools::default()), Ok("one"));
    }

    #[test]
    fn test_extract_skips_empty_multiple() {
        let mut query = QueryParams::default();
        query.insert("ref", QueryValue::Multiple(Vec::new()));
        query.insert("return", "last");
        assert_eq!(extract_encoded_token(&query, &NamingPools::default()), Ok("last"));

        let mut only_empty = QueryParams::default();
        only_empty.insert("ref", QueryValue::Multiple(Vec::new()));
        assert_eq!(
            extract_encoded_token(&only_empty, &NamingPools::default()),
            Err(DecoderError::NotFound)
        );
    }

    #[test]
    fn test_extract_not_found() {
        let query = params(&[("utm_source", "google_ads"), ("fbclid", "IwAR")]);
        assert_eq!(
            extract_encoded_token(&query, &NamingPools::default()),
            Err(DecoderError::NotFound)
        );
        assert_eq!(
            extract_encoded_token(&QueryParams::default(), &NamingPools::default()),
            Err(DecoderError::NotFound)
        );
    }

    #[test]
    fn test_padding_formula() {
        assert_eq!(padding_len("abc"), 1);
        assert_eq!(padding_len("ab"), 2);
        assert_eq!(padding_len("a"), 3);
        assert_eq!(padding_len("abcd"), 4);
        assert_eq!(padding_len(""), 4);
    }

    #[test]
    fn test_aligned_token_still_decodes() {
        let token = encode_original_url("https://a.co");
        assert_eq!(token.len() % 4, 0);

        let padded = pad_token(&token);
        assert_eq!(padded.len(), token.len() + 4);
        assert!(padded.ends_with("===="));

        assert_eq!(decode_token(&token).unwrap(), "https://a.co");
    }

    #[test]
    fn test_unaligned_tokens_decode() {
        for url in ["https://a.c", "https://a.com", "https://ab.com/", "https://example.com/ü"] {
            let token = encode_original_url(url);
            assert_eq!(decode_token(&token).unwrap(), url);
        }
    }

    #[test]
    fn test_padded_token_is_tolerated() {
        // A token that kept its padding gets four more `=` and still decodes
        assert_eq!(decode_token("aHR0cHM6Ly9hLmNvbQ==").unwrap(), "https://a.com");
    }

    #[test]
    fn test_decode_token_errors() {
        assert!(matches!(decode_token("!!!notbase64!!!"), Err(DecoderError::Decode(_))));
        // One leftover character can never be valid base64
        assert!(matches!(decode_token("abcde"), Err(DecoderError::Decode(_))));

        let not_utf8 = base64::engine::general_purpose::URL_SAFE_NO_PAD.encode([0xffu8, 0xfe, 0xfd]);
        assert!(matches!(decode_token(&not_utf8), Err(DecoderError::Decode(_))));
    }

    #[test]
    fn test_decode_success() {
        let token = encode_original_url("https://example.com/page?q=1");
        let query = params(&[("utm_medium", "cpc"), ("destination", token.as_str())]);
        assert_eq!(decoder().decode(&query).unwrap(), "https://example.com/page?q=1");
    }

    #[test]
    fn test_decode_classifies_failures() {
        let none = params(&[("utm_source", "bing_ads")]);
        assert_eq!(decoder().decode(&none), Err(DecoderError::NotFound));

        let garbage = params(&[("ref", "!!!notbase64!!!")]);
        assert!(matches!(decoder().decode(&garbage), Err(DecoderError::Decode(_))));

        let script = encode_original_url("javascript:alert(1)");
        let dangerous = params(&[("next", script.as_str())]);
        assert_eq!(decoder().decode(&dangerous), Err(DecoderError::InvalidUrl));
    }

    #[test]
    fn test_decode_rejects_unsafe_targets() {
        for url in ["ftp://example.com", "https://", "", "https:example.com"] {
            let token = encode_original_url(url);
            let query = params(&[("link", token.as_str())]);
            assert_eq!(decoder().decode(&query), Err(DecoderError::InvalidUrl), "{}", url);
        }

        let long = encode_original_url(&format!("https://{}", "a".repeat(9000)));
        let query = params(&[("target", long.as_str())]);
        assert_eq!(decoder().decode(&query), Err(DecoderError::InvalidUrl));
    }
}
