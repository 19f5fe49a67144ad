//! Property tests for the encoded-word decoder.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use proptest::prelude::*;

use mailbridge_mime::decode_encoded_words;

fn q_encode(text: &str) -> String {
    let mut out = String::new();
    for b in text.bytes() {
        match b {
            b' ' => out.push('_'),
            b'a'..=b'z' | b'A'..=b'Z' | b'0'..=b'9' => out.push(char::from(b)),
            _ => out.push_str(&format!("={b:02X}")),
        }
    }
    out
}

proptest! {
    #[test]
    fn base64_word_decodes_fully(text in "[^\\s]\\PC{0,40}[^\\s]") {
        let field = format!("=?UTF-8?B?{}?=", STANDARD.encode(text.as_bytes()));
        let decoded = decode_encoded_words(&field);
        prop_assert!(!decoded.contains("=?UTF-8?B?"));
        prop_assert_eq!(decoded, text.trim());
    }

    #[test]
    fn q_word_maps_underscores_and_escapes(text in "[a-zA-Z0-9 éü€]{1,40}") {
        let field = format!("=?UTF-8?Q?{}?=", q_encode(&text));
        prop_assert_eq!(decode_encoded_words(&field), text.trim());
    }

    #[test]
    fn text_without_markers_is_only_trimmed(text in "[^=]{0,60}") {
        prop_assert_eq!(decode_encoded_words(&text), text.trim());
    }

    #[test]
    fn decoder_never_panics(text in "\\PC{0,80}") {
        let _ = decode_encoded_words(&text);
    }
}
