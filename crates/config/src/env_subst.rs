//! `${ENV_VAR}` expansion for raw config text, so passwords and key paths
//! can live in the environment instead of the config file.

/// Expand `${NAME}` placeholders from the process environment.
///
/// Unset variables and malformed placeholders are kept verbatim.
pub fn substitute_env(input: &str) -> String {
    expand_with(input, |name| std::env::var(name).ok())
}

fn expand_with(input: &str, lookup: impl Fn(&str) -> Option<String>) -> String {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(start) = rest.find("${") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let Some(end) = after.find('}') else {
            // Unterminated: copy the remainder untouched.
            out.push_str(&rest[start..]);
            return out;
        };
        let name = &after[..end];
        match (!name.is_empty()).then(|| lookup(name)).flatten() {
            Some(value) => out.push_str(&value),
            None => out.push_str(&rest[start..start + 2 + end + 1]),
        }
        rest = &after[end + 1..];
    }

    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lookup(name: &str) -> Option<String> {
        match name {
            "CIPHERKIT_PASSWORD" => Some("secret".to_string()),
            "KEY_DIR" => Some("/etc/keys".to_string()),
            _ => None,
        }
    }

    #[test]
    fn expands_known_variables() {
        assert_eq!(
            expand_with("password = \"${CIPHERKIT_PASSWORD}\"", lookup),
            "password = \"secret\""
        );
        assert_eq!(
            expand_with("${KEY_DIR}/public.pem and ${KEY_DIR}/private.pem", lookup),
            "/etc/keys/public.pem and /etc/keys/private.pem"
        );
    }

    #[test]
    fn keeps_unknown_variables() {
        assert_eq!(expand_with("${NOT_SET_ANYWHERE}", lookup), "${NOT_SET_ANYWHERE}");
    }

    #[test]
    fn keeps_empty_and_unterminated_placeholders() {
        assert_eq!(expand_with("a ${} b", lookup), "a ${} b");
        assert_eq!(expand_with("tail ${KEY_DIR", lookup), "tail ${KEY_DIR");
    }

    #[test]
    fn plain_text_is_untouched() {
        assert_eq!(substitute_env("salt = \"pepper\""), "salt = \"pepper\"");
    }
}
