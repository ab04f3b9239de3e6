//! Gzip response path.

use std::io::Write;

use flate2::write::GzEncoder;
use flate2::Compression;

/// Gzip `data` for the response body.
pub fn gzip(data: &[u8]) -> std::io::Result<Vec<u8>> {
    let mut enc = GzEncoder::new(Vec::new(), Compression::default());
    enc.write_all(data)?;
    enc.finish()
}

/// True when the client advertised gzip support.
pub fn accepts_gzip(headers: &axum::http::HeaderMap) -> bool {
    headers
        .get(axum::http::header::ACCEPT_ENCODING)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.contains("gzip"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;

    #[test]
    fn gzip_round_trip() {
        let body = br#"{"status":"ok"}"#;
        let packed = gzip(body).unwrap();
        let mut dec = flate2::read::GzDecoder::new(packed.as_slice());
        let mut out = Vec::new();
        dec.read_to_end(&mut out).unwrap();
        assert_eq!(out, body);
    }

    #[test]
    fn accepts_gzip_reads_header() {
        let mut headers = axum::http::HeaderMap::new();
        assert!(!accepts_gzip(&headers));
        headers.insert(
            axum::http::header::ACCEPT_ENCODING,
            "gzip, deflate".parse().unwrap(),
        );
        assert!(accepts_gzip(&headers));
    }
}
