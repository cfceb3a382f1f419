use std::fmt;
use std::time::Duration;

use reqwest::blocking::Client;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, warn};

pub const DEFAULT_ENDPOINT: &str = "https://translation.googleapis.com/language/translate/v2";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Error)]
pub enum TranslateError {
    #[error("no translation API key configured (set TANDEM_API_KEY or translator.api_key)")]
    MissingApiKey,
    #[error("translation request failed")]
    Http(#[from] reqwest::Error),
    #[error("translation service returned {code}: {message}")]
    Api { code: u16, message: String },
    #[error("unexpected translation response: {0}")]
    Malformed(String),
}

pub trait Translator {
    /// Short name used in the status line and in logs.
    fn name(&self) -> &str;

    /// Translates text that holds something besides whitespace.
    fn translate_text(&self, text: &str, target: &str) -> Result<String, TranslateError>;

    /// Translates `text` into the language with code `target`. Blank input
    /// comes back unchanged without reaching the backend.
    fn translate(&self, text: &str, target: &str) -> Result<String, TranslateError> {
        if text.trim().is_empty() {
            return Ok(text.to_string());
        }
        self.translate_text(text, target)
    }
}

/// Google Cloud Translation, REST API v2, authenticated with an API key.
pub struct GoogleTranslator {
    client: Client,
    endpoint: String,
    api_key: String,
}

impl GoogleTranslator {
    pub fn new(
        api_key: impl Into<String>,
        endpoint: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, TranslateError> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(TranslateError::MissingApiKey);
        }
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
            api_key,
        })
    }
}

impl Translator for GoogleTranslator {
    fn name(&self) -> &str {
        "Google Translate"
    }

    fn translate_text(&self, text: &str, target: &str) -> Result<String, TranslateError> {
        debug!(chars = text.chars().count(), language = target, "requesting translation");
        let response = self
            .client
            .post(&self.endpoint)
            .query(&[("key", self.api_key.as_str())])
            .form(&[("q", text), ("target", target), ("format", "text")])
            .send()?;

        let status = response.status();
        let body = response.text()?;
        if !status.is_success() {
            let err = parse_api_error(status.as_u16(), &body);
            warn!(%err, "translation request rejected");
            return Err(err);
        }
        parse_translation(&body)
    }
}

/// Stands in when no API key is configured. The viewer still works; every
/// translation attempt reports the missing key.
#[derive(Clone, Copy, Debug, Default)]
pub struct Unconfigured;

impl Translator for Unconfigured {
    fn name(&self) -> &str {
        "not configured"
    }

    fn translate_text(&self, _text: &str, _target: &str) -> Result<String, TranslateError> {
        Err(TranslateError::MissingApiKey)
    }
}

#[derive(Deserialize)]
struct TranslateResponse {
    data: TranslationData,
}

#[derive(Deserialize)]
struct TranslationData {
    translations: Vec<Translation>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Translation {
    translated_text: String,
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    code: Option<u16>,
    message: String,
}

pub(crate) fn parse_translation(body: &str) -> Result<String, TranslateError> {
    let response: TranslateResponse =
        serde_json::from_str(body).map_err(|err| TranslateError::Malformed(err.to_string()))?;
    response
        .data
        .translations
        .into_iter()
        .next()
        .map(|translation| translation.translated_text)
        .ok_or_else(|| TranslateError::Malformed("response holds no translations".to_string()))
}

pub(crate) fn parse_api_error(status: u16, body: &str) -> TranslateError {
    match serde_json::from_str::<ErrorResponse>(body) {
        Ok(response) => TranslateError::Api {
            code: response.error.code.unwrap_or(status),
            message: response.error.message,
        },
        Err(_) => TranslateError::Api {
            code: status,
            message: body.trim().to_string(),
        },
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Language {
    pub name: &'static str,
    pub code: &'static str,
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.code)
    }
}

pub const LANGUAGES: [Language; 6] = [
    Language {
        name: "English",
        code: "en",
    },
    Language {
        name: "Vietnamese",
        code: "vi",
    },
    Language {
        name: "French",
        code: "fr",
    },
    Language {
        name: "Spanish",
        code: "es",
    },
    Language {
        name: "German",
        code: "de",
    },
    Language {
        name: "Chinese (Simplified)",
        code: "zh-CN",
    },
];

pub const DEFAULT_LANGUAGE_INDEX: usize = 1;

pub fn default_language() -> Language {
    LANGUAGES[DEFAULT_LANGUAGE_INDEX]
}

/// Looks up a catalogue entry, ignoring ASCII case.
pub fn language_by_code(code: &str) -> Option<Language> {
    LANGUAGES
        .iter()
        .copied()
        .find(|language| language.code.eq_ignore_ascii_case(code.trim()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    struct Counting {
        calls: Cell<usize>,
    }

    impl Translator for Counting {
        fn name(&self) -> &str {
            "counting"
        }

        fn translate_text(&self, text: &str, target: &str) -> Result<String, TranslateError> {
            self.calls.set(self.calls.get() + 1);
            Ok(format!("[{target}] {text}"))
        }
    }

    #[test]
    fn blank_text_never_reaches_the_backend() {
        let translator = Counting {
            calls: Cell::new(0),
        };
        assert_eq!(translator.translate("  \n", "vi").unwrap(), "  \n");
        assert_eq!(translator.translate("", "vi").unwrap(), "");
        assert_eq!(translator.calls.get(), 0);

        assert_eq!(translator.translate("hello", "vi").unwrap(), "[vi] hello");
        assert_eq!(translator.calls.get(), 1);
    }

    #[test]
    fn unconfigured_translator_reports_missing_key() {
        assert!(matches!(
            Unconfigured.translate("hello", "fr"),
            Err(TranslateError::MissingApiKey)
        ));
        assert_eq!(Unconfigured.translate(" ", "fr").unwrap(), " ");
    }

    #[test]
    fn google_translator_requires_a_key() {
        let result = GoogleTranslator::new("  ", DEFAULT_ENDPOINT, DEFAULT_TIMEOUT);
        assert!(matches!(result, Err(TranslateError::MissingApiKey)));
    }

    #[test]
    fn parses_first_translation() {
        let body = r#"{
            "data": {
                "translations": [
                    {"translatedText": "Xin chào", "detectedSourceLanguage": "en"},
                    {"translatedText": "ignored"}
                ]
            }
        }"#;
        assert_eq!(parse_translation(body).unwrap(), "Xin chào");
    }

    #[test]
    fn empty_or_invalid_responses_are_malformed() {
        let empty = r#"{"data": {"translations": []}}"#;
        assert!(matches!(
            parse_translation(empty),
            Err(TranslateError::Malformed(_))
        ));
        assert!(matches!(
            parse_translation("<html>oops</html>"),
            Err(TranslateError::Malformed(_))
        ));
    }

    #[test]
    fn api_errors_keep_the_service_message() {
        let body = r#"{"error": {"code": 400, "message": "API key not valid.", "errors": []}}"#;
        match parse_api_error(403, body) {
            TranslateError::Api { code, message } => {
                assert_eq!(code, 400);
                assert_eq!(message, "API key not valid.");
            }
            other => panic!("unexpected error: {other:?}"),
        }

        match parse_api_error(502, " Bad Gateway \n") {
            TranslateError::Api { code, message } => {
                assert_eq!(code, 502);
                assert_eq!(message, "Bad Gateway");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn languages_are_found_by_code() {
        assert_eq!(default_language().code, "vi");
        assert_eq!(language_by_code("zh-cn").unwrap().name, "Chinese (Simplified)");
        assert_eq!(language_by_code(" DE ").unwrap().code, "de");
        assert_eq!(language_by_code("xx"), None);
        assert_eq!(default_language().to_string(), "Vietnamese (vi)");
    }
}
