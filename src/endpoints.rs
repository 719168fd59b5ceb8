use crate::key::decode_organization_id;

pub const DEFAULT_HORIZON_URL: &str = "https://toggle.hyphen.cloud";
const HORIZON_DOMAIN: &str = "toggle.hyphen.cloud";

/// Builds the horizon URL a key should talk to when none are configured.
///
/// Keys carrying a valid organization id get the organization scoped host,
/// everything else falls back to [`DEFAULT_HORIZON_URL`].
pub fn default_horizon_url(public_key: Option<&str>) -> String {
    match decode_organization_id(public_key) {
        Some(org_id) => format!("https://{}.{}", org_id, HORIZON_DOMAIN),
        None => DEFAULT_HORIZON_URL.to_string(),
    }
}
