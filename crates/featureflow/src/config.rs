//! Parser configuration.
//!
//! [`ParserConfig`] selects the source encoding and the default dialect
//! language. Both can be overridden from the environment through
//! `FEATUREFLOW_ENCODING` and `FEATUREFLOW_LANGUAGE`.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Environment variable selecting the source encoding.
pub const ENCODING_ENV: &str = "FEATUREFLOW_ENCODING";
/// Environment variable selecting the default dialect language.
pub const LANGUAGE_ENV: &str = "FEATUREFLOW_LANGUAGE";

/// Errors raised while reading configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// A variable holds a value that cannot be used.
    #[error("invalid value {value:?} for {variable}: {reason}")]
    InvalidValue {
        /// Name of the offending variable.
        variable: &'static str,
        /// The rejected value.
        value: String,
        /// Why the value was rejected.
        reason: &'static str,
    },
}

/// Text encoding of feature files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SourceEncoding {
    /// Strict UTF-8. A leading byte order mark is kept as text.
    #[default]
    Utf8,
    /// UTF-8 with an optional byte order mark, which is dropped.
    Utf8Sig,
    /// ISO 8859-1; every byte maps to the code point of the same value.
    Latin1,
}

const BOM: &[u8] = b"\xEF\xBB\xBF";

impl SourceEncoding {
    /// Canonical name of the encoding.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Utf8 => "utf-8",
            Self::Utf8Sig => "utf-8-sig",
            Self::Latin1 => "latin-1",
        }
    }

    /// Decode `bytes` to text.
    ///
    /// # Errors
    /// Returns the UTF-8 error for invalid input under the UTF-8 encodings.
    /// Latin-1 decoding never fails.
    ///
    /// # Examples
    /// ```
    /// use featureflow::config::SourceEncoding;
    ///
    /// let text = SourceEncoding::Latin1.decode(b"caf\xE9").expect("latin-1 never fails");
    /// assert_eq!(text, "café");
    /// ```
    pub fn decode(self, bytes: &[u8]) -> Result<String, std::str::Utf8Error> {
        match self {
            Self::Utf8 => std::str::from_utf8(bytes).map(str::to_owned),
            Self::Utf8Sig => {
                let body = bytes.strip_prefix(BOM).unwrap_or(bytes);
                std::str::from_utf8(body).map(str::to_owned)
            }
            Self::Latin1 => Ok(bytes.iter().copied().map(char::from).collect()),
        }
    }
}

impl fmt::Display for SourceEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SourceEncoding {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalised = value.trim().to_ascii_lowercase().replace('_', "-");
        match normalised.as_str() {
            "utf-8" | "utf8" => Ok(Self::Utf8),
            "utf-8-sig" | "utf8-sig" => Ok(Self::Utf8Sig),
            "latin-1" | "latin1" | "iso-8859-1" => Ok(Self::Latin1),
            _ => Err(ConfigError::InvalidValue {
                variable: ENCODING_ENV,
                value: value.to_owned(),
                reason: "expected utf-8, utf-8-sig or latin-1",
            }),
        }
    }
}

/// Settings used when reading feature files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParserConfig {
    /// Encoding of the feature file bytes.
    pub encoding: SourceEncoding,
    /// Dialect language used when a file has no `# language:` header.
    pub language: String,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            encoding: SourceEncoding::Utf8,
            language: "en".to_owned(),
        }
    }
}

fn parse_language(value: &str) -> Result<String, ConfigError> {
    let trimmed = value.trim();
    let valid = !trimmed.is_empty()
        && trimmed
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if valid {
        Ok(trimmed.to_owned())
    } else {
        Err(ConfigError::InvalidValue {
            variable: LANGUAGE_ENV,
            value: value.to_owned(),
            reason: "expected a dialect code such as `en` or `pt-BR`",
        })
    }
}

impl ParserConfig {
    /// Read the configuration from the process environment.
    ///
    /// # Errors
    /// Returns [`ConfigError::InvalidValue`] when a variable is set to an
    /// unusable value.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read the configuration through `lookup`, starting from the defaults.
    ///
    /// # Errors
    /// Returns [`ConfigError::InvalidValue`] when a variable is set to an
    /// unusable value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        if let Some(value) = lookup(ENCODING_ENV) {
            config.encoding = value.parse()?;
        }
        if let Some(value) = lookup(LANGUAGE_ENV) {
            config.language = parse_language(&value)?;
        }
        log::debug!(
            "parser configuration: encoding={}, language={}",
            config.encoding,
            config.language
        );
        Ok(config)
    }

    /// Replace the encoding.
    #[must_use]
    pub fn with_encoding(mut self, encoding: SourceEncoding) -> Self {
        self.encoding = encoding;
        self
    }

    /// Replace the default language.
    #[must_use]
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }
}
