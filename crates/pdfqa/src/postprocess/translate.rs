//! Translation of English answers into Spanish

use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

use crate::config::TranslationConfig;
use crate::error::{Error, Result};

use super::language::{detect_language, DetectedLanguage};

/// Language every answer is delivered in
pub const TARGET_LANG: &str = "es";

/// Returned when an English answer cannot be translated at all
pub const UNTRANSLATABLE_MESSAGE: &str =
    "Lo siento, no puedo encontrar esa información en los documentos proporcionados.";

/// Phrase substitutions applied in order when the translation API is unavailable
const PHRASE_TABLE: &[(&str, &str)] = &[
    ("The flight departs at", "El vuelo sale a las"),
    (
        "The document does not contain information about",
        "El documento no contiene información sobre",
    ),
    ("I don't have that information", "No tengo esa información"),
    ("I cannot find", "No puedo encontrar"),
    ("I'm sorry", "Lo siento"),
    ("Based on the document", "Según el documento"),
    ("According to the document", "De acuerdo con el documento"),
    ("The document mentions", "El documento menciona"),
    ("There is no information", "No hay información"),
    ("The context does not provide", "El contexto no proporciona"),
    ("The information is not available", "La información no está disponible"),
    ("No information found", "No se encontró información"),
    ("Not mentioned in the document", "No se menciona en el documento"),
    ("International Airport", "Aeropuerto Internacional"),
    ("Intl Airport", "Aeropuerto Internacional"),
];

/// Texts up to this many characters are passed through when no phrase matches
const MAX_UNMATCHED_PASSTHROUGH: usize = 10;

/// Machine translation service
#[async_trait]
pub trait Translator: Send + Sync {
    /// Translate `text` from `source` to `target` (ISO 639-1 codes)
    async fn translate(&self, text: &str, source: &str, target: &str) -> Result<String>;

    /// Get translator name
    fn name(&self) -> &str;
}

/// Google Translate web endpoint client
pub struct GoogleTranslator {
    client: Client,
    base_url: String,
}

impl GoogleTranslator {
    /// Create a client for the configured endpoint
    pub fn new(config: &TranslationConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
        })
    }
}

#[async_trait]
impl Translator for GoogleTranslator {
    async fn translate(&self, text: &str, source: &str, target: &str) -> Result<String> {
        let response = self
            .client
            .get(&self.base_url)
            .query(&[
                ("client", "gtx"),
                ("sl", source),
                ("tl", target),
                ("dt", "t"),
                ("q", text),
            ])
            .send()
            .await
            .map_err(|e| Error::translation(format!("Request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(Error::translation(format!("HTTP {}", response.status())));
        }

        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| Error::translation(format!("Failed to parse response: {}", e)))?;

        parse_google_response(&body)
    }

    fn name(&self) -> &str {
        "google"
    }
}

/// Translator used when remote translation is disabled; always fails so the
/// phrase table takes over
pub struct OfflineTranslator;

#[async_trait]
impl Translator for OfflineTranslator {
    async fn translate(&self, _text: &str, _source: &str, _target: &str) -> Result<String> {
        Err(Error::translation("Remote translation is disabled"))
    }

    fn name(&self) -> &str {
        "offline"
    }
}

/// Concatenate the translated segments of a `translate_a/single` response
///
/// The body looks like `[[["Hola", "Hello", ...], ...], ...]`.
fn parse_google_response(body: &serde_json::Value) -> Result<String> {
    let segments = body
        .get(0)
        .and_then(|v| v.as_array())
        .ok_or_else(|| Error::translation("Unexpected response shape"))?;

    let text: String = segments
        .iter()
        .filter_map(|segment| segment.get(0).and_then(|s| s.as_str()))
        .collect();

    if text.trim().is_empty() {
        return Err(Error::translation("Empty translation"));
    }

    Ok(text)
}

/// Language tag of a normalized answer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputLanguage {
    /// Known to be Spanish
    Spanish,
    /// Left as received or only partially translated
    Unknown,
}

/// Answer text after language normalization
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedText {
    pub text: String,
    pub language: OutputLanguage,
}

impl NormalizedText {
    fn new(text: impl Into<String>, language: OutputLanguage) -> Self {
        Self {
            text: text.into(),
            language,
        }
    }
}

/// Ensure an answer is in Spanish
///
/// English text goes to the translator; if that fails the phrase table is
/// applied instead. Spanish and other languages pass through untouched.
pub async fn normalize_language(text: &str, translator: &dyn Translator) -> NormalizedText {
    let detection = detect_language(text);
    tracing::debug!(
        language = ?detection.language,
        method = ?detection.method,
        "Detected answer language"
    );

    match detection.language {
        DetectedLanguage::Spanish => NormalizedText::new(text, OutputLanguage::Spanish),
        DetectedLanguage::English => match translator.translate(text, "en", TARGET_LANG).await {
            Ok(translated) if !translated.trim().is_empty() => {
                tracing::debug!(translator = translator.name(), "Translated answer to Spanish");
                NormalizedText::new(translated, OutputLanguage::Spanish)
            }
            Ok(_) => {
                tracing::warn!(translator = translator.name(), "Empty translation, using phrase table");
                translate_with_mapping(text)
            }
            Err(e) => {
                tracing::warn!(translator = translator.name(), "Translation failed, using phrase table: {}", e);
                translate_with_mapping(text)
            }
        },
        DetectedLanguage::Other(_) | DetectedLanguage::Unknown => {
            NormalizedText::new(text, OutputLanguage::Unknown)
        }
    }
}

/// Offline fallback: substitute known English phrases
///
/// When nothing matched and the text is longer than a few words, the whole
/// answer is replaced with a Spanish apology.
pub fn translate_with_mapping(text: &str) -> NormalizedText {
    let translated = PHRASE_TABLE
        .iter()
        .fold(text.to_string(), |acc, (english, spanish)| acc.replace(english, spanish));

    if translated != text {
        NormalizedText::new(translated, OutputLanguage::Unknown)
    } else if text.chars().count() > MAX_UNMATCHED_PASSTHROUGH {
        NormalizedText::new(UNTRANSLATABLE_MESSAGE, OutputLanguage::Spanish)
    } else {
        NormalizedText::new(text, OutputLanguage::Unknown)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    struct FixedTranslator(&'static str);

    #[async_trait]
    impl Translator for FixedTranslator {
        async fn translate(&self, _text: &str, _source: &str, _target: &str) -> Result<String> {
            Ok(self.0.to_string())
        }

        fn name(&self) -> &str {
            "fixed"
        }
    }

    const ENGLISH_ANSWER: &str =
        "The flight departs at 10:00 AM from the international airport and arrives in Madrid at noon.";

    #[test]
    fn test_mapping_replaces_known_phrases() {
        let out = translate_with_mapping("The flight departs at 10:00 AM");
        assert_eq!(out.text, "El vuelo sale a las 10:00 AM");
        assert_eq!(out.language, OutputLanguage::Unknown);
    }

    #[test]
    fn test_mapping_airport_names() {
        let out = translate_with_mapping("Barajas International Airport");
        assert_eq!(out.text, "Barajas Aeropuerto Internacional");
    }

    #[test]
    fn test_mapping_unmatched_long_text_is_apology() {
        let out = translate_with_mapping("Completely unrelated English sentence");
        assert_eq!(out.text, UNTRANSLATABLE_MESSAGE);
        assert_eq!(out.language, OutputLanguage::Spanish);
    }

    #[test]
    fn test_mapping_unmatched_short_text_passes() {
        let out = translate_with_mapping("At 10 AM");
        assert_eq!(out.text, "At 10 AM");
    }

    #[test]
    fn test_parse_google_response_concatenates_segments() {
        let body = json!([[["Hola. ", "Hello. ", null], ["Adiós.", "Bye.", null]], null, "en"]);
        assert_eq!(parse_google_response(&body).unwrap(), "Hola. Adiós.");
    }

    #[test]
    fn test_parse_google_response_rejects_garbage() {
        assert!(parse_google_response(&json!({"error": "nope"})).is_err());
        assert!(parse_google_response(&json!([[]])).is_err());
    }

    #[tokio::test]
    async fn test_english_answer_is_translated() {
        let translator = FixedTranslator("El vuelo sale a las 10:00 AM.");
        let out = normalize_language(ENGLISH_ANSWER, &translator).await;
        assert_eq!(out.text, "El vuelo sale a las 10:00 AM.");
        assert_eq!(out.language, OutputLanguage::Spanish);
    }

    #[tokio::test]
    async fn test_failed_translation_uses_phrase_table() {
        let out = normalize_language(ENGLISH_ANSWER, &OfflineTranslator).await;
        assert!(out.text.starts_with("El vuelo sale a las 10:00 AM"));
    }

    #[tokio::test]
    async fn test_spanish_answer_untouched() {
        let answer = "El vuelo sale a las diez de la mañana desde el aeropuerto internacional de Madrid.";
        let translator = FixedTranslator("should not be used");
        let out = normalize_language(answer, &translator).await;
        assert_eq!(out.text, answer);
    }

    #[tokio::test]
    async fn test_google_translator_against_mock() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/translate_a/single"))
            .and(query_param("client", "gtx"))
            .and(query_param("sl", "en"))
            .and(query_param("tl", "es"))
            .and(query_param("q", "Hello"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!([[["Hola", "Hello", null, null, 10]], null, "en"])),
            )
            .mount(&server)
            .await;

        let config = TranslationConfig {
            base_url: format!("{}/translate_a/single", server.uri()),
            ..Default::default()
        };
        let translator = GoogleTranslator::new(&config).unwrap();

        assert_eq!(translator.translate("Hello", "en", "es").await.unwrap(), "Hola");
    }

    #[tokio::test]
    async fn test_google_translator_http_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(429))
            .mount(&server)
            .await;

        let config = TranslationConfig {
            base_url: server.uri(),
            ..Default::default()
        };
        let translator = GoogleTranslator::new(&config).unwrap();

        let err = translator.translate("Hello", "en", "es").await.unwrap_err();
        assert!(matches!(err, Error::Translation(_)));
    }
}
