//! Conversion between transport headers and [`MetadataBag`]
//!
//! Only ASCII entries are carried over. Binary (`-bin`) metadata and values
//! that are not visible ASCII cannot hold a correlation id and are skipped.

use correlation_core::{CorrelationError, MetadataBag, Result, Slot, SlotKeys};
use http::header::{HeaderMap, HeaderName, HeaderValue};
use tonic::metadata::{AsciiMetadataKey, AsciiMetadataValue, KeyAndValueRef, MetadataMap};

/// Snapshot gRPC request metadata into a bag
pub fn bag_from_metadata(metadata: &MetadataMap) -> MetadataBag {
    let pairs = metadata.iter().filter_map(|entry| match entry {
        KeyAndValueRef::Ascii(key, value) => value
            .to_str()
            .ok()
            .map(|value| (key.as_str().to_string(), value.to_string())),
        KeyAndValueRef::Binary(_, _) => None,
    });
    MetadataBag::from_pairs(pairs)
}

/// Snapshot HTTP request headers into a bag
pub fn bag_from_headers(headers: &HeaderMap) -> MetadataBag {
    let pairs = headers.iter().filter_map(|(name, value)| {
        value
            .to_str()
            .ok()
            .map(|value| (name.as_str().to_string(), value.to_string()))
    });
    MetadataBag::from_pairs(pairs)
}

/// Parse the three slot keys as gRPC metadata keys
pub fn metadata_keys(keys: &SlotKeys) -> Result<[AsciiMetadataKey; 3]> {
    let parse = |slot: Slot| {
        let key = keys.key(slot);
        AsciiMetadataKey::from_bytes(key.as_bytes())
            .map_err(|_| CorrelationError::invalid_key(key, "not a valid gRPC metadata key"))
    };
    Ok([
        parse(Slot::Correlation)?,
        parse(Slot::Trace)?,
        parse(Slot::Request)?,
    ])
}

/// Encode `id` as a gRPC metadata value
pub fn metadata_value(keys: &SlotKeys, id: &str) -> Result<AsciiMetadataValue> {
    id.parse::<AsciiMetadataValue>()
        .map_err(|_| CorrelationError::invalid_value(keys.correlation(), id))
}

/// Replace the three slot entries in `metadata` with `id`
///
/// On error `metadata` is left unchanged.
pub fn write_slots(metadata: &mut MetadataMap, keys: &SlotKeys, id: &str) -> Result<()> {
    let value = metadata_value(keys, id)?;
    for key in metadata_keys(keys)? {
        metadata.insert(key, value.clone());
    }
    Ok(())
}

/// Replace the three slot headers in `headers` with `id`
///
/// On error `headers` is left unchanged.
pub fn write_header_slots(headers: &mut HeaderMap, keys: &SlotKeys, id: &str) -> Result<()> {
    let value = HeaderValue::from_str(id)
        .map_err(|_| CorrelationError::invalid_value(keys.correlation(), id))?;
    let parse = |slot: Slot| {
        let key = keys.key(slot);
        HeaderName::from_bytes(key.as_bytes())
            .map_err(|_| CorrelationError::invalid_key(key, "not a valid HTTP header name"))
    };
    let names = [
        parse(Slot::Correlation)?,
        parse(Slot::Trace)?,
        parse(Slot::Request)?,
    ];

    for name in names {
        headers.insert(name, value.clone());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use correlation_core::{CORRELATION_ID_HEADER, REQUEST_ID_HEADER, TRACE_ID_HEADER};
    use tonic::metadata::{BinaryMetadataValue, MetadataValue};

    #[test]
    fn test_bag_from_metadata_keeps_all_values() {
        let mut metadata = MetadataMap::new();
        metadata.insert(TRACE_ID_HEADER, MetadataValue::from_static("t1"));
        metadata.append(TRACE_ID_HEADER, MetadataValue::from_static("t2"));
        metadata.insert(REQUEST_ID_HEADER, MetadataValue::from_static("r"));

        let bag = bag_from_metadata(&metadata);
        assert_eq!(
            bag.get(TRACE_ID_HEADER),
            Some(&["t1".to_string(), "t2".to_string()][..])
        );
        assert_eq!(bag.first(REQUEST_ID_HEADER), Some("r"));
    }

    #[test]
    fn test_bag_from_metadata_skips_binary() {
        let mut metadata = MetadataMap::new();
        metadata.insert_bin("trace-bin", BinaryMetadataValue::from_bytes(b"\x00\x01"));

        let bag = bag_from_metadata(&metadata);
        assert!(bag.is_empty());
    }

    #[test]
    fn test_bag_from_headers() {
        let mut headers = HeaderMap::new();
        headers.insert(
            HeaderName::from_bytes(b"X-Request-ID").unwrap(),
            HeaderValue::from_static("r"),
        );

        let bag = bag_from_headers(&headers);
        assert_eq!(bag.first(REQUEST_ID_HEADER), Some("r"));
    }

    #[test]
    fn test_write_slots_replaces_existing() {
        let mut metadata = MetadataMap::new();
        metadata.insert(TRACE_ID_HEADER, MetadataValue::from_static("old"));
        metadata.append(TRACE_ID_HEADER, MetadataValue::from_static("older"));

        write_slots(&mut metadata, &SlotKeys::default(), "canonical").unwrap();

        for key in [CORRELATION_ID_HEADER, TRACE_ID_HEADER, REQUEST_ID_HEADER] {
            let values: Vec<_> = metadata.get_all(key).iter().collect();
            assert_eq!(values.len(), 1);
            assert_eq!(values[0].to_str().unwrap(), "canonical");
        }
    }

    #[test]
    fn test_write_slots_rejects_non_ascii() {
        let mut metadata = MetadataMap::new();
        let err = write_slots(&mut metadata, &SlotKeys::default(), "id\u{00e9}").unwrap_err();

        assert!(matches!(err, CorrelationError::InvalidValue { .. }));
        assert!(metadata.is_empty());
    }

    #[test]
    fn test_write_header_slots_rejects_non_ascii() {
        let mut headers = HeaderMap::new();
        headers.insert(TRACE_ID_HEADER, HeaderValue::from_static("old"));

        let err = write_header_slots(&mut headers, &SlotKeys::default(), "caf\u{e9}").unwrap_err();

        assert!(matches!(err, CorrelationError::InvalidValue { .. }));
        assert_eq!(headers.len(), 1);
        assert_eq!(headers.get(TRACE_ID_HEADER).unwrap(), "old");
    }

    #[test]
    fn test_write_header_slots() {
        let mut headers = HeaderMap::new();
        write_header_slots(&mut headers, &SlotKeys::default(), "canonical").unwrap();

        assert_eq!(headers.len(), 3);
        assert_eq!(headers.get(TRACE_ID_HEADER).unwrap(), "canonical");
    }
}
