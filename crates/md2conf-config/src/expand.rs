//! `${VAR}` expansion for configuration strings.
//!
//! Only the braced form is recognised. `${VAR:-default}` falls back to the
//! default when `VAR` is unset; a bare `${VAR}` that is unset is an error.

use crate::ConfigError;

/// Expand variable references in `value` using the process environment.
pub(crate) fn expand_env(value: &str, field: &str) -> Result<String, ConfigError> {
    expand_with(value, field, |name| std::env::var(name).ok())
}

/// Expand variable references in `value` using `lookup` to resolve names.
///
/// Text outside `${...}` spans is copied verbatim, so a bare `$` in a URL or
/// password survives expansion.
pub(crate) fn expand_with<F>(value: &str, field: &str, lookup: F) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut out = String::with_capacity(value.len());
    let mut rest = value;

    while let Some(start) = rest.find("${") {
        let Some(len) = rest[start..].find('}') else {
            break;
        };
        let end = start + len + 1;
        out.push_str(&rest[..start]);
        out.push_str(&expand_span(&rest[start..end], field, &lookup)?);
        rest = &rest[end..];
    }

    out.push_str(rest);
    Ok(out)
}

/// Expand a single `${VAR}` or `${VAR:-default}` span.
fn expand_span<F>(span: &str, field: &str, lookup: &F) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    shellexpand::env_with_context(span, |var| match lookup(var) {
        Some(val) => Ok(Some(val)),
        None => Err(UnsetVar(var.to_owned())),
    })
    .map(std::borrow::Cow::into_owned)
    .map_err(|e| ConfigError::EnvVar {
        field: field.to_owned(),
        message: format!("${{{}}} not set", e.cause.0),
    })
}

/// Name of a variable that could not be resolved.
struct UnsetVar(String);
