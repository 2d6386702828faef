//! Object key naming
//!
//! Storage has no notion of an album, so albums are emulated with key
//! prefixes. Album names are percent-escaped before they become part of a
//! key; photo file names are appended as-is.

use crate::models::AlbumName;
use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

/// Everything except the RFC 3986 unreserved characters.
const DATA_ESCAPE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

pub const DELIMITER: &str = "/";

pub fn url_escape(value: &str) -> String {
    utf8_percent_encode(value, DATA_ESCAPE).to_string()
}

/// Decodes `%XX` sequences. Bytes that do not form valid UTF-8 stay escaped;
/// the rest of the value is still decoded.
pub fn url_unescape(value: &str) -> String {
    let bytes: Vec<u8> = percent_decode_str(value).collect();
    let mut decoded = String::with_capacity(bytes.len());
    for chunk in bytes.utf8_chunks() {
        decoded.push_str(chunk.valid());
        for byte in chunk.invalid() {
            decoded.push_str(&format!("%{:02X}", byte));
        }
    }
    if decoded.len() != bytes.len() {
        tracing::warn!("{:?} contains escapes that are not UTF-8", value);
    }
    decoded
}

/// `urlEscape(name) + "/"`
pub fn album_prefix(album: &AlbumName) -> String {
    format!("{}{}", url_escape(album.as_str()), DELIMITER)
}

/// Album prefix followed by the raw file name, with no escaping of the file name.
pub fn photo_key(album: &AlbumName, file_name: &str) -> String {
    format!("{}{}", album_prefix(album), file_name)
}

/// Turns a common prefix from a delimited listing back into a display name.
pub fn album_name_from_prefix(prefix: &str) -> String {
    url_unescape(prefix.trim_end_matches(DELIMITER))
}

/// Public (unsigned) URL for an object. The whole key is escaped, so the
/// `%` and `/` in it are encoded again.
pub fn public_url(base_url: &str, key: &str) -> String {
    format!("{}/{}", base_url.trim_end_matches('/'), url_escape(key))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashSet;

    fn album(name: &str) -> AlbumName {
        AlbumName::parse(name).unwrap()
    }

    #[test]
    fn test_album_prefix_escapes_spaces() {
        assert_eq!(album_prefix(&album("Paris Trip")), "Paris%20Trip/");
    }

    #[test]
    fn test_escape_keeps_unreserved_characters() {
        assert_eq!(url_escape("a-Z_0.9~"), "a-Z_0.9~");
        assert_eq!(url_escape("a+b&c"), "a%2Bb%26c");
        assert_eq!(url_escape("été"), "%C3%A9t%C3%A9");
    }

    #[test]
    fn test_photo_key_does_not_escape_file_name() {
        assert_eq!(
            photo_key(&album("Paris Trip"), "photo.jpg"),
            "Paris%20Trip/photo.jpg"
        );
        assert_eq!(
            photo_key(&album("Paris Trip"), "my photo #1.jpg"),
            "Paris%20Trip/my photo #1.jpg"
        );
    }

    #[test]
    fn test_album_name_from_prefix() {
        assert_eq!(album_name_from_prefix("Paris%20Trip/"), "Paris Trip");
        assert_eq!(album_name_from_prefix("plain/"), "plain");
    }

    #[test]
    fn test_unescape_keeps_only_invalid_sequences_escaped() {
        assert_eq!(url_unescape("bad%FF"), "bad%FF");
        assert_eq!(url_unescape("Z%C3%BCrich%FF"), "Zürich%FF");
        assert_eq!(url_unescape("%C3%20x"), "%C3 x");
        assert_eq!(url_unescape("%e2%82%ac"), "€");
    }

    #[test]
    fn test_names_round_trip_through_prefix() {
        for name in [
            "Paris Trip",
            "100% fun",
            "Zürich 2024",
            "a?b=c&d",
            "tabs\tand~tilde",
        ] {
            let prefix = album_prefix(&album(name));
            assert_eq!(album_name_from_prefix(&prefix), name);
        }
    }

    #[test]
    fn test_album_prefix_is_injective() {
        let names = ["a b", "a%20b", "a+b", "a%2Bb", "A B", "ab", "a  b"];
        let prefixes: HashSet<String> = names
            .iter()
            .map(|n| album_prefix(&album(n)))
            .collect();
        assert_eq!(prefixes.len(), names.len());
    }

    #[test]
    fn test_public_url_escapes_whole_key() {
        assert_eq!(
            public_url("https://b.s3.amazonaws.com", "Paris%20Trip/photo.jpg"),
            "https://b.s3.amazonaws.com/Paris%2520Trip%2Fphoto.jpg"
        );
        assert_eq!(
            public_url("https://b.s3.amazonaws.com/", "x/y.png"),
            "https://b.s3.amazonaws.com/x%2Fy.png"
        );
    }
}
