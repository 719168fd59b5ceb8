use rand::Rng;

use crate::models::ToggleContext;

const SUFFIX_CHARSET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";
const SUFFIX_LENGTH: usize = 7;

/// Picks the targeting key for a context: explicit key, then user id, then
/// the client's default target key.
pub fn resolve_target_key(context: &ToggleContext, default_target_key: &str) -> String {
    context_target_key(context)
        .unwrap_or(default_target_key)
        .to_string()
}

/// The identity a context carries on its own, if any.
pub(crate) fn context_target_key(context: &ToggleContext) -> Option<&str> {
    if !context.targeting_key.is_empty() {
        return Some(&context.targeting_key);
    }
    context
        .user
        .as_ref()
        .map(|user| user.id.as_str())
        .filter(|id| !id.is_empty())
}

/// Generates a target key of the form `<application>-<environment>-<random>`.
pub fn generate_target_key(application_id: &str, environment: &str) -> String {
    generate_target_key_with(&mut rand::thread_rng(), application_id, environment)
}

/// Same as [`generate_target_key`] with a caller supplied random source.
/// Empty components are left out rather than joined as empty segments.
pub fn generate_target_key_with<R: Rng + ?Sized>(
    rng: &mut R,
    application_id: &str,
    environment: &str,
) -> String {
    let suffix: String = (0..SUFFIX_LENGTH)
        .map(|_| SUFFIX_CHARSET[rng.gen_range(0..SUFFIX_CHARSET.len())] as char)
        .collect();

    [application_id, environment, suffix.as_str()]
        .iter()
        .filter(|part| !part.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join("-")
}

#[cfg(test)]
mod test {
    use rand::{rngs::StdRng, SeedableRng};

    use crate::models::ToggleUser;

    use super::*;

    #[test]
    fn test_resolve_precedence() {
        let mut context = ToggleContext {
            user: Some(ToggleUser::new("user-1".to_string())),
            ..ToggleContext::new("explicit".to_string())
        };
        assert_eq!(resolve_target_key(&context, "fallback"), "explicit");

        context.targeting_key = String::new();
        assert_eq!(resolve_target_key(&context, "fallback"), "user-1");

        context.user = None;
        assert_eq!(resolve_target_key(&context, "fallback"), "fallback");

        context.user = Some(ToggleUser::new(String::new()));
        assert_eq!(resolve_target_key(&context, "fallback"), "fallback");
    }

    #[test]
    fn test_generate_all_components() {
        let key = generate_target_key("myapp", "production");
        let parts: Vec<&str> = key.split('-').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], "myapp");
        assert_eq!(parts[1], "production");
        assert_eq!(parts[2].len(), SUFFIX_LENGTH);
        assert!(parts[2]
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit()));
    }

    #[test]
    fn test_generate_skips_empty_components() {
        let key = generate_target_key("", "production");
        let parts: Vec<&str> = key.split('-').collect();
        assert_eq!(parts.len(), 2);
        assert_eq!(parts[0], "production");

        let key = generate_target_key("", "");
        assert_eq!(key.len(), SUFFIX_LENGTH);
        assert!(!key.contains('-'));
    }

    #[test]
    fn test_generate_is_deterministic_with_seeded_rng() {
        let a = generate_target_key_with(&mut StdRng::seed_from_u64(7), "app", "staging");
        let b = generate_target_key_with(&mut StdRng::seed_from_u64(7), "app", "staging");
        assert_eq!(a, b);
        assert!(a.starts_with("app-staging-"));
    }

    #[test]
    fn test_generate_differs_between_calls() {
        let mut rng = StdRng::seed_from_u64(42);
        let a = generate_target_key_with(&mut rng, "myapp", "production");
        let b = generate_target_key_with(&mut rng, "myapp", "production");
        assert_ne!(a, b);
        assert!(a.starts_with("myapp-production-"));
        assert!(b.starts_with("myapp-production-"));
    }
}
