use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

/// Characters left as-is in an encoded object key: RFC 3986 unreserved plus
/// the `/` path separator.
const KEY_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'/')
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Key of a manifest entry under the source prefix.
pub fn source_object_key(source_prefix: &str, key: &str) -> String {
    format!("{source_prefix}/{key}")
}

/// `bucket/key` form expected by S3 `CopyObject`, with the key URL-encoded.
pub fn copy_source(bucket: &str, key: &str) -> String {
    format!("{bucket}/{}", utf8_percent_encode(key, KEY_ENCODE_SET))
}
