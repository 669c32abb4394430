/// Fills `field` from the environment when it was left empty.
///
/// An explicit value always wins; an unset or empty variable falls back to
/// `fallback`.
pub fn default_to_env(field: &mut String, env: &str, fallback: &str) {
    if !field.is_empty() {
        return;
    }

    *field = match std::env::var(env) {
        Ok(val) if !val.is_empty() => val,
        _ => fallback.to_string(),
    };
}
