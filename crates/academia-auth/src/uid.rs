//! User-id encoding for password-reset links.

use data_encoding::BASE64URL_NOPAD;
use uuid::Uuid;

pub fn encode_uid(id: &Uuid) -> String {
    BASE64URL_NOPAD.encode(id.to_string().as_bytes())
}

/// `None` for anything that is not an encoded user id.
pub fn decode_uid(uid: &str) -> Option<Uuid> {
    let raw = BASE64URL_NOPAD.decode(uid.as_bytes()).ok()?;
    let text = String::from_utf8(raw).ok()?;
    Uuid::parse_str(&text).ok()
}
