// Secret values
//
// Passwords and API keys stay wrapped in `SecretString` from the moment
// they are read. A value of the form `file:///path` is replaced by the
// contents of that file when the runtime configs are built.

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Deserializer, Serializer};

use crate::error::ConfigError;

const FILE_PREFIX: &str = "file://";

/// Resolve a `file://` reference; any other value passes through.
pub fn resolve_secret(secret: &SecretString) -> Result<SecretString, ConfigError> {
    let raw = secret.expose_secret();
    let Some(path) = raw.strip_prefix(FILE_PREFIX) else {
        return Ok(secret.clone());
    };

    let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::SecretFile {
        path: path.to_owned(),
        source,
    })?;
    Ok(SecretString::from(contents.trim().to_owned()))
}

/// Serde adapter for `Option<SecretString>`.
///
/// Serialization only happens when figment layers a parsed file over the
/// defaults, so the plain value never leaves the process.
pub(crate) mod opt {
    use super::{Deserialize, Deserializer, ExposeSecret, SecretString, Serializer};

    #[allow(clippy::ref_option)]
    pub fn serialize<S: Serializer>(
        value: &Option<SecretString>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(secret) => serializer.serialize_some(secret.expose_secret()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<SecretString>, D::Error> {
        Ok(Option::<String>::deserialize(deserializer)?.map(SecretString::from))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn plain_value_passes_through() {
        let secret = SecretString::from("hunter2".to_owned());
        assert_eq!(resolve_secret(&secret).unwrap().expose_secret(), "hunter2");
    }

    #[test]
    fn file_reference_is_read_and_trimmed() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "  s3cret\t").unwrap();

        let reference = format!("file://{}", file.path().display());
        let resolved = resolve_secret(&SecretString::from(reference)).unwrap();
        assert_eq!(resolved.expose_secret(), "s3cret");
    }

    #[test]
    fn missing_file_names_the_path() {
        let result = resolve_secret(&SecretString::from("file:///nonexistent/up.pass".to_owned()));
        assert!(
            matches!(&result, Err(ConfigError::SecretFile { path, .. }) if path == "/nonexistent/up.pass"),
            "{:?}",
            result.err()
        );
    }
}
