//! Compact text encoding for remote payloads: json, deflated with zlib, then
//! base64 so it fits in a json string field.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use flate2::Compression;
use std::io::{Read, Write};

#[derive(Debug, thiserror::Error)]
pub enum CompressionError {
    #[error("unable to serialize payload: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("unable to deflate payload: {0}")]
    Deflate(#[from] std::io::Error),
}

#[derive(Debug, thiserror::Error)]
pub enum DecompressionError {
    #[error("payload is not valid base64: {0}")]
    Encoding(#[from] base64::DecodeError),
    #[error("unable to inflate payload: {0}")]
    Inflate(#[from] std::io::Error),
    #[error("decompressed payload is empty")]
    Empty,
    #[error("decompressed payload is not valid json: {0}")]
    Json(#[from] serde_json::Error),
}

pub fn compress<T>(payload: &T) -> Result<String, CompressionError>
where
    T: serde::Serialize + ?Sized,
{
    let encoded = serde_json::to_vec(payload)?;
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(&encoded)?;
    let deflated = encoder.finish()?;
    Ok(STANDARD.encode(deflated))
}

pub fn decompress<T>(text: &str) -> Result<T, DecompressionError>
where
    T: serde::de::DeserializeOwned,
{
    let deflated = STANDARD.decode(text.trim())?;
    let mut decoder = ZlibDecoder::new(deflated.as_slice());
    let mut inflated = Vec::new();
    decoder.read_to_end(&mut inflated)?;
    if inflated.iter().all(u8::is_ascii_whitespace) {
        return Err(DecompressionError::Empty);
    }
    Ok(serde_json::from_slice(&inflated)?)
}

#[cfg(test)]
mod tests {
    use super::{compress, decompress, DecompressionError};
    use proptest::prelude::*;
    use serde_json::{json, Value};

    #[test]
    fn should_shrink_repetitive_payload() {
        let structure = "The party of the first part agrees with {{NAME}}. ".repeat(200);
        let payload = json!({ "templates": [{ "id": "a", "structure": structure }] });
        let compressed = compress(&payload).unwrap();
        assert!(compressed.len() < serde_json::to_string(&payload).unwrap().len());
        assert_eq!(decompress::<Value>(&compressed).unwrap(), payload);
    }

    #[test]
    fn should_keep_unicode() {
        let payload = json!({ "name": "عقد إيجار", "structure": "{{اسم_المؤجر}}" });
        assert_eq!(decompress::<Value>(&compress(&payload).unwrap()).unwrap(), payload);
    }

    #[test]
    fn fails_on_plain_text() {
        let err = decompress::<Value>("hello world").unwrap_err();
        assert!(matches!(err, DecompressionError::Encoding(_)));
    }

    #[test]
    fn fails_on_base64_that_is_not_deflated() {
        let err = decompress::<Value>("aGVsbG8gd29ybGQ=").unwrap_err();
        assert!(matches!(err, DecompressionError::Inflate(_)));
    }

    #[test]
    fn fails_on_empty_payload() {
        let err = decompress::<Value>(&compress_raw(b"")).unwrap_err();
        assert!(matches!(err, DecompressionError::Empty));
    }

    #[test]
    fn fails_on_invalid_json() {
        let err = decompress::<Value>(&compress_raw(b"{\"templates\": [")).unwrap_err();
        assert!(matches!(err, DecompressionError::Json(_)));
    }

    fn compress_raw(input: &[u8]) -> String {
        use base64::Engine as _;
        use std::io::Write;

        let mut encoder =
            flate2::write::ZlibEncoder::new(Vec::new(), flate2::Compression::default());
        encoder.write_all(input).unwrap();
        base64::engine::general_purpose::STANDARD.encode(encoder.finish().unwrap())
    }

    fn json_value() -> impl Strategy<Value = Value> {
        let leaf = prop_oneof![
            Just(Value::Null),
            any::<bool>().prop_map(Value::from),
            any::<i64>().prop_map(Value::from),
            ".*".prop_map(Value::from),
        ];
        leaf.prop_recursive(3, 32, 6, |inner| {
            prop_oneof![
                prop::collection::vec(inner.clone(), 0..6).prop_map(Value::from),
                prop::collection::btree_map(".*", inner, 0..6)
                    .prop_map(|map| Value::Object(map.into_iter().collect())),
            ]
        })
    }

    proptest! {
        #[test]
        fn decompress_reverses_compress(payload in json_value()) {
            let compressed = compress(&payload).unwrap();
            prop_assert_eq!(decompress::<Value>(&compressed).unwrap(), payload);
        }
    }
}
