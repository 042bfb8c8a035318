//! Resource content loading
//!
//! Resource files may reference variables as `${NAME}`. They are resolved
//! against an explicit environment map before the content is sent:
//!
//! - `${NAME}` is replaced by the value of `NAME`, and left untouched when
//!   `NAME` is not set
//! - `${NAME:-fallback}` uses `fallback` when `NAME` is not set
//! - `$${NAME}` escapes the placeholder and yields a literal `${NAME}`

use super::source::ResourceSource;
use crate::error::Result;
use regex::{Captures, Regex};
use std::collections::HashMap;
use std::sync::OnceLock;

fn placeholder() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(\$)?\$\{([^}:]+)(?::-([^}]*))?\}").expect("valid placeholder regex")
    })
}

/// Replace `${NAME}` placeholders with values from `environment`
pub fn interpolate(content: &str, environment: &HashMap<String, String>) -> String {
    placeholder()
        .replace_all(content, |caps: &Captures| {
            let whole = &caps[0];
            if caps.get(1).is_some() {
                return whole[1..].to_string();
            }

            let name = &caps[2];
            match (environment.get(name), caps.get(3)) {
                (Some(value), _) => value.clone(),
                (None, Some(fallback)) => fallback.as_str().to_string(),
                (None, None) => {
                    tracing::debug!("No value for variable [{}], leaving it as is", name);
                    whole.to_string()
                }
            }
        })
        .into_owned()
}

/// Reads resource files and resolves their variables
pub struct ContentReader<'a> {
    source: &'a dyn ResourceSource,
    environment: &'a HashMap<String, String>,
}

impl<'a> ContentReader<'a> {
    pub fn new(source: &'a dyn ResourceSource, environment: &'a HashMap<String, String>) -> Self {
        Self {
            source,
            environment,
        }
    }

    /// Interpolated content of the file at `path`, `None` when it does not exist
    pub fn read(&self, path: &str) -> Result<Option<String>> {
        tracing::debug!("Reading [{}] from {}", path, self.source.describe());
        let content = self.source.read(path)?;
        Ok(content.map(|c| interpolate(&c, self.environment)))
    }

    /// Content of the file at `path`, as stored (bulk files are sent verbatim)
    pub fn read_raw(&self, path: &str) -> Result<Option<String>> {
        tracing::debug!("Reading [{}] from {}", path, self.source.describe());
        self.source.read(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::source::DirectorySource;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_interpolate_known_variable() {
        let environment = env(&[("NUMBER_OF_REPLICAS", "2")]);
        assert_eq!(
            interpolate(r#"{"number_of_replicas": "${NUMBER_OF_REPLICAS}"}"#, &environment),
            r#"{"number_of_replicas": "2"}"#
        );
    }

    #[test]
    fn test_interpolate_leaves_unknown_variable() {
        let environment = env(&[]);
        assert_eq!(interpolate("a ${MISSING} b", &environment), "a ${MISSING} b");
    }

    #[test]
    fn test_interpolate_fallback() {
        let environment = env(&[("SHARDS", "3")]);
        assert_eq!(interpolate("${SHARDS:-1}/${REPLICAS:-0}", &environment), "3/0");
        assert_eq!(interpolate("${EMPTY:-}", &environment), "");
    }

    #[test]
    fn test_interpolate_escaped_placeholder() {
        let environment = env(&[("NAME", "value")]);
        assert_eq!(interpolate("$${NAME} ${NAME}", &environment), "${NAME} value");
    }

    #[test]
    fn test_reader_interpolates_but_raw_does_not() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("es/twitter")).unwrap();
        std::fs::write(dir.path().join("es/twitter/_settings.json"), "${REPLICAS}").unwrap();

        let source = DirectorySource::new(dir.path());
        let environment = env(&[("REPLICAS", "2")]);
        let reader = ContentReader::new(&source, &environment);

        assert_eq!(reader.read("es/twitter/_settings.json").unwrap().as_deref(), Some("2"));
        assert_eq!(
            reader.read_raw("es/twitter/_settings.json").unwrap().as_deref(),
            Some("${REPLICAS}")
        );
        assert_eq!(reader.read("es/twitter/_missing.json").unwrap(), None);
    }
}
