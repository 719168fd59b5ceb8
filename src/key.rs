use base64::{
    alphabet,
    engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig},
    Engine,
};

use crate::error::{Result, ToggleError};

pub const PUBLIC_KEY_PREFIX: &str = "public_";

// Keys are issued both with and without trailing padding.
const KEY_ENGINE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Checks the textual shape of a public API key before it is accepted.
pub fn validate_public_key(key: &str) -> Result<()> {
    if key.starts_with(PUBLIC_KEY_PREFIX) {
        Ok(())
    } else {
        Err(ToggleError::InvalidKeyFormat)
    }
}

/// Extracts the organization id bound into a public API key.
///
/// The key format is `public_<base64(orgId:secret)>`; the prefix is optional.
/// Anything that does not decode into a valid org id yields `None`.
pub fn decode_organization_id(public_key: Option<&str>) -> Option<String> {
    let key = public_key?;
    let payload = key.strip_prefix(PUBLIC_KEY_PREFIX).unwrap_or(key);
    let bytes = KEY_ENGINE.decode(payload).ok()?;
    let decoded = String::from_utf8(bytes).ok()?;
    let org_id = decoded.split(':').next().unwrap_or_default();

    if is_valid_organization_id(org_id) {
        Some(org_id.to_string())
    } else {
        None
    }
}

fn is_valid_organization_id(org_id: &str) -> bool {
    !org_id.is_empty()
        && org_id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}
