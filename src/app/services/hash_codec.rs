//! Location-fragment encoding of the two documents.
//!
//! Wire format: `base64url(zlib(utf8({"j": data, "m": template})))`, no
//! padding. Decoding also accepts padding, the standard base64 alphabet, raw
//! deflate streams, comments inside the envelope, and the legacy long field
//! names `json` / `mustache`.

use std::io::{Read, Write};

use base64::Engine as _;
use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use flate2::Compression;
use flate2::read::{DeflateDecoder, ZlibDecoder};
use flate2::write::ZlibEncoder;
use serde::{Deserialize, Serialize};

use crate::app::domain::payload::StatePayload;
use crate::app::infrastructure::error::CodecError;
use crate::app::services::relaxed_json;

const FRAGMENT_ENGINE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new()
        .with_encode_padding(false)
        .with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

#[derive(Serialize)]
struct Envelope<'a> {
    j: &'a str,
    m: &'a str,
}

#[derive(Deserialize)]
struct AnyEnvelope {
    j: Option<String>,
    m: Option<String>,
    json: Option<String>,
    mustache: Option<String>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct HashCodec;

impl HashCodec {
    pub fn new() -> Self {
        Self
    }

    /// Encode a payload into fragment text (without the leading `#`).
    pub fn encode(&self, payload: &StatePayload) -> Result<String, CodecError> {
        let envelope = Envelope {
            j: &payload.data_text,
            m: &payload.template_text,
        };
        let json =
            serde_json::to_vec(&envelope).map_err(|e| CodecError::Envelope(e.to_string()))?;

        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::best());
        encoder
            .write_all(&json)
            .map_err(|e| CodecError::Deflate(e.to_string()))?;
        let compressed = encoder
            .finish()
            .map_err(|e| CodecError::Deflate(e.to_string()))?;

        Ok(FRAGMENT_ENGINE.encode(compressed))
    }

    /// Decode fragment text (a leading `#` is ignored) into a payload.
    pub fn decode(&self, fragment: &str) -> Result<StatePayload, CodecError> {
        let cleaned: String = fragment
            .trim()
            .trim_start_matches('#')
            .chars()
            .map(|c| match c {
                '+' => '-',
                '/' => '_',
                other => other,
            })
            .collect();

        let compressed = FRAGMENT_ENGINE
            .decode(cleaned.as_bytes())
            .map_err(|e| CodecError::Base64(e.to_string()))?;
        let text = inflate(&compressed)?;

        let value = relaxed_json::parse(&text).map_err(|e| CodecError::Envelope(e.to_string()))?;
        if !value.is_object() {
            return Err(CodecError::Envelope("envelope is not an object".to_string()));
        }
        let envelope: AnyEnvelope =
            serde_json::from_value(value).map_err(|e| CodecError::Envelope(e.to_string()))?;

        let data_text = envelope.j.or(envelope.json);
        let template_text = envelope.m.or(envelope.mustache);
        if data_text.is_none() && template_text.is_none() {
            return Err(CodecError::MissingFields);
        }

        Ok(StatePayload {
            data_text: data_text.unwrap_or_default(),
            template_text: template_text.unwrap_or_default(),
        })
    }
}

fn inflate(compressed: &[u8]) -> Result<String, CodecError> {
    let mut text = String::new();
    if ZlibDecoder::new(compressed).read_to_string(&mut text).is_ok() {
        return Ok(text);
    }

    text.clear();
    DeflateDecoder::new(compressed)
        .read_to_string(&mut text)
        .map_err(|e| CodecError::Inflate(e.to_string()))?;
    Ok(text)
}
