use crate::types::Envelope;
use serde_json::Value;
use tracing::debug;

/// Capabilities compiled into this binary, resolvable without touching the filesystem.
pub const BUILTIN_PACKAGES: [&str; 7] = [
    "stackoverflow",
    "reqwest",
    "serde_json",
    "tokio",
    "scraper",
    "regex",
    "tracing",
];

/// True when `name` is a compiled-in capability or an executable on `PATH`.
pub fn is_resolvable(name: &str) -> bool {
    let name = name.trim();
    if name.is_empty() {
        return false;
    }
    if BUILTIN_PACKAGES.contains(&name) {
        return true;
    }
    match which::which(name) {
        Ok(path) => {
            debug!("check_package: {} resolved to {}", name, path.display());
            true
        }
        Err(_) => false,
    }
}

/// `check_package` built-in. Never fails: an unresolvable or missing name is
/// reported as `success: false`.
pub fn check_package(package: Option<&Value>) -> Envelope {
    let name = match package {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Null) | None => "None".to_string(),
        Some(other) => other.to_string(),
    };

    let installed = package.and_then(|v| v.as_str()).is_some_and(is_resolvable);
    if installed {
        Envelope::message(true, format!("{} is installed", name))
    } else {
        Envelope::message(false, format!("{} is not installed", name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn builtin_capabilities_resolve() {
        let env = check_package(Some(&json!("stackoverflow")));
        assert!(env.success);
        assert_eq!(env.message.as_deref(), Some("stackoverflow is installed"));
    }

    #[test]
    fn unknown_names_do_not_resolve() {
        let env = check_package(Some(&json!("definitely-not-a-real-package-xyz")));
        assert!(!env.success);
        assert_eq!(
            env.message.as_deref(),
            Some("definitely-not-a-real-package-xyz is not installed")
        );
    }

    #[test]
    fn missing_or_non_string_names_are_not_installed() {
        let env = check_package(None);
        assert!(!env.success);
        assert_eq!(env.message.as_deref(), Some("None is not installed"));

        let env = check_package(Some(&json!(12)));
        assert!(!env.success);
        assert!(env.error.is_none());
    }

    #[cfg(unix)]
    #[test]
    fn executables_on_path_resolve() {
        assert!(is_resolvable("sh"));
    }
}
