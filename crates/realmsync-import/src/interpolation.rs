//! Variable interpolation over raw file content
//!
//! Tokens have the form `<prefix>name<suffix>` (`${name}` by default):
//!
//! - `${name:-fallback}` uses `fallback` when `name` is undefined
//! - `${env:NAME}` reads the process environment directly
//! - `$${name}` is emitted as the literal text `${name}`
//! - resolved values are interpolated again, so values may reference other values
//! - with `in-variables` enabled, tokens inside a name are resolved first (`${a_${b}}`)
//!
//! A token without a closing suffix is left as text.

use crate::properties::PropertyLookup;
use realmsync_core::VarSubstitution;
use std::sync::Arc;
use thiserror::Error;

const ESCAPE: char = '$';
const DEFAULT_SEPARATOR: &str = ":-";
const ENV_NAMESPACE: &str = "env:";

/// Why a substitution could not be completed
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SubstitutionError {
    #[error("undefined variable '{0}'")]
    Undefined(String),

    #[error("cyclic variable reference: {0}")]
    Cyclic(String),
}

/// Replaces variable tokens using a property lookup
#[derive(Clone)]
pub struct Interpolator {
    prefix: String,
    suffix: String,
    in_variables: bool,
    undefined_is_error: bool,
    properties: Arc<dyn PropertyLookup>,
}

impl Interpolator {
    pub fn new(settings: &VarSubstitution, properties: Arc<dyn PropertyLookup>) -> Self {
        Self {
            prefix: settings.prefix.clone(),
            suffix: settings.suffix.clone(),
            in_variables: settings.in_variables,
            undefined_is_error: settings.undefined_is_error,
            properties,
        }
    }

    /// Substitute every token in `text`
    pub fn interpolate(&self, text: &str) -> Result<String, SubstitutionError> {
        let mut resolving = Vec::new();
        self.substitute(text, &mut resolving)
    }

    fn substitute(&self, text: &str, resolving: &mut Vec<String>) -> Result<String, SubstitutionError> {
        let prefix = self.prefix.as_str();
        let mut out = String::with_capacity(text.len());
        let mut rest = text;

        while let Some(start) = rest.find(prefix) {
            let before = &rest[..start];
            let after = &rest[start + prefix.len()..];

            if let Some(literal) = before.strip_suffix(ESCAPE) {
                out.push_str(literal);
                out.push_str(prefix);
                rest = after;
                continue;
            }

            out.push_str(before);
            match self.token_end(after) {
                Some(end) => {
                    let raw = &after[..end];
                    out.push_str(&self.resolve_token(raw, resolving)?);
                    rest = &after[end + self.suffix.len()..];
                }
                None => {
                    out.push_str(&rest[start..]);
                    rest = "";
                }
            }
        }

        out.push_str(rest);
        Ok(out)
    }

    /// Offset of the suffix closing a token whose prefix was just consumed
    fn token_end(&self, text: &str) -> Option<usize> {
        if !self.in_variables {
            return text.find(self.suffix.as_str());
        }

        let mut depth = 1usize;
        let mut i = 0;
        while i < text.len() {
            let tail = &text[i..];
            if tail.starts_with(self.prefix.as_str()) {
                depth += 1;
                i += self.prefix.len();
            } else if tail.starts_with(self.suffix.as_str()) {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
                i += self.suffix.len();
            } else {
                i += tail.chars().next().map_or(1, char::len_utf8);
            }
        }
        None
    }

    fn resolve_token(&self, raw: &str, resolving: &mut Vec<String>) -> Result<String, SubstitutionError> {
        let expression = if self.in_variables {
            self.substitute(raw, resolving)?
        } else {
            raw.to_string()
        };

        let (name, fallback) = match expression.split_once(DEFAULT_SEPARATOR) {
            Some((name, fallback)) => (name, Some(fallback)),
            None => (expression.as_str(), None),
        };

        if resolving.iter().any(|active| active == name) {
            let mut chain = resolving.join(" -> ");
            chain.push_str(" -> ");
            chain.push_str(name);
            return Err(SubstitutionError::Cyclic(chain));
        }

        match self.lookup(name) {
            Some(value) => {
                resolving.push(name.to_string());
                let resolved = self.substitute(&value, resolving);
                resolving.pop();
                resolved
            }
            None => match fallback {
                Some(fallback) => self.substitute(fallback, resolving),
                None if self.undefined_is_error => Err(SubstitutionError::Undefined(name.to_string())),
                None => Ok(format!("{}{}{}", self.prefix, raw, self.suffix)),
            },
        }
    }

    fn lookup(&self, name: &str) -> Option<String> {
        match name.strip_prefix(ENV_NAMESPACE) {
            Some(variable) => std::env::var(variable).ok(),
            None => self.properties.lookup(name),
        }
    }
}

impl std::fmt::Debug for Interpolator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Interpolator")
            .field("prefix", &self.prefix)
            .field("suffix", &self.suffix)
            .field("in_variables", &self.in_variables)
            .field("undefined_is_error", &self.undefined_is_error)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::properties::MapProperties;
    use serial_test::serial;
    use test_case::test_case;

    fn settings() -> VarSubstitution {
        VarSubstitution {
            enabled: true,
            ..VarSubstitution::default()
        }
    }

    fn interpolator(settings: VarSubstitution) -> Interpolator {
        let props: MapProperties = [
            ("realm", "prod"),
            ("host", "auth.${realm}.example"),
            ("url", "https://${host}/"),
            ("loop_a", "${loop_b}"),
            ("loop_b", "${loop_a}"),
            ("name_prod", "Production"),
            ("suffix", "prod"),
        ]
        .into_iter()
        .collect();
        Interpolator::new(&settings, Arc::new(props))
    }

    #[test_case("realm: ${realm}", "realm: prod" ; "simple")]
    #[test_case("${url}", "https://auth.prod.example/" ; "values are resolved recursively")]
    #[test_case("${missing:-fallback}", "fallback" ; "default value")]
    #[test_case("$${realm}", "${realm}" ; "escaped token")]
    #[test_case("cost: $5 ${realm}", "cost: $5 prod" ; "lone escape char")]
    #[test_case("open ${realm", "open ${realm" ; "unterminated token")]
    #[test_case("no tokens", "no tokens" ; "plain text")]
    #[test_case("${realm}-${realm}", "prod-prod" ; "repeated token")]
    fn test_interpolate(input: &str, expected: &str) {
        assert_eq!(interpolator(settings()).interpolate(input).unwrap(), expected);
    }

    #[test]
    fn test_undefined_is_error() {
        let err = interpolator(settings()).interpolate("${nope}").unwrap_err();
        assert_eq!(err, SubstitutionError::Undefined("nope".to_string()));
    }

    #[test]
    fn test_undefined_left_verbatim() {
        let settings = VarSubstitution {
            undefined_is_error: false,
            ..settings()
        };
        assert_eq!(
            interpolator(settings).interpolate("a ${nope} b").unwrap(),
            "a ${nope} b"
        );
    }

    #[test]
    fn test_cycle_detected() {
        let err = interpolator(settings()).interpolate("${loop_a}").unwrap_err();
        assert_eq!(
            err,
            SubstitutionError::Cyclic("loop_a -> loop_b -> loop_a".to_string())
        );
    }

    #[test]
    fn test_nested_names_require_flag() {
        let nested = VarSubstitution {
            in_variables: true,
            ..settings()
        };
        let nested = interpolator(nested);
        assert_eq!(nested.interpolate("${name_${suffix}}").unwrap(), "Production");
        assert_eq!(nested.interpolate("${missing:-${realm}}").unwrap(), "prod");

        let flat = interpolator(settings()).interpolate("${name_${suffix}}");
        assert!(flat.is_err());
    }

    #[test]
    fn test_custom_delimiters() {
        let custom = VarSubstitution {
            prefix: "{{".to_string(),
            suffix: "}}".to_string(),
            ..settings()
        };
        assert_eq!(
            interpolator(custom).interpolate("realm: {{realm}} ${realm}").unwrap(),
            "realm: prod ${realm}"
        );
    }

    #[test]
    #[serial]
    fn test_env_namespace() {
        std::env::set_var("REALMSYNC_TEST_INTERPOLATION", "from-env");
        let result = interpolator(settings()).interpolate("${env:REALMSYNC_TEST_INTERPOLATION}");
        std::env::remove_var("REALMSYNC_TEST_INTERPOLATION");
        assert_eq!(result.unwrap(), "from-env");
    }
}
