//! Dictionary lookup client
//!
//! Enriches newly seen words with a definition, pronunciation and part of
//! speech from the Free Dictionary API (`/api/v2/entries/en/{word}`).
//!
//! Outbound traffic is bounded twice: a semaphore caps lookups in flight and
//! a governor quota caps the request rate.

use async_trait::async_trait;
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use serde::{Deserialize, Serialize};
use std::num::NonZeroU32;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::Semaphore;
use wordtrack_common::config::{get_user_agent, DictionaryConfig};
use wordtrack_common::db::Enrichment;

/// Dictionary client errors
#[derive(Debug, Error)]
pub enum DictionaryError {
    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("API error {0}: {1}")]
    ApiError(u16, String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Not a dictionary word: {0}")]
    InvalidWord(String),

    #[error("Client error: {0}")]
    ClientError(String),
}

/// Enrichment data returned for one word
///
/// `text` is `None` when the entry carries a pronunciation or part of speech
/// but no usable definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Definition {
    pub text: Option<String>,
    pub pronunciation: Option<String>,
    pub part_of_speech: Option<String>,
}

impl From<Definition> for Enrichment {
    fn from(definition: Definition) -> Self {
        Enrichment {
            definition: definition.text,
            pronunciation: definition.pronunciation,
            part_of_speech: definition.part_of_speech,
        }
    }
}

/// Word → definition lookup
///
/// `Ok(None)` means the service answered but has no entry for the word;
/// `Err` covers transport, server and decoding failures. The pipeline treats
/// both as "no enrichment" and only logs them differently.
#[async_trait]
pub trait DictionaryClient: Send + Sync {
    async fn lookup_definition(&self, word: &str) -> Result<Option<Definition>, DictionaryError>;
}

/// Free Dictionary API response entry
#[derive(Debug, Clone, Deserialize)]
pub struct DictionaryEntry {
    pub word: Option<String>,
    pub phonetic: Option<String>,
    pub phonetics: Option<Vec<Phonetic>>,
    pub meanings: Option<Vec<Meaning>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Phonetic {
    pub text: Option<String>,
    pub audio: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Meaning {
    #[serde(rename = "partOfSpeech")]
    pub part_of_speech: Option<String>,
    pub definitions: Option<Vec<DefinitionItem>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DefinitionItem {
    pub definition: String,
    pub example: Option<String>,
}

fn non_empty(value: Option<&String>) -> Option<String> {
    value
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Pick the enrichment fields out of a lookup response
///
/// Uses the first entry only. Pronunciation comes from `phonetic`, falling
/// back to the first non-empty `phonetics[].text`. Definition and part of
/// speech come from the first meaning that carries a definition; without one,
/// part of speech comes from the first meaning that names it. Returns `None`
/// only when all three fields are missing.
pub fn extract_definition(entries: &[DictionaryEntry]) -> Option<Definition> {
    let entry = entries.first()?;
    let meanings = || entry.meanings.iter().flatten();

    let defined = meanings().find_map(|meaning| {
        meaning
            .definitions
            .iter()
            .flatten()
            .find(|d| !d.definition.trim().is_empty())
            .map(|item| (meaning, item))
    });

    let (text, part_of_speech) = match defined {
        Some((meaning, item)) => (
            Some(item.definition.trim().to_string()),
            non_empty(meaning.part_of_speech.as_ref()),
        ),
        None => (
            None,
            meanings().find_map(|meaning| non_empty(meaning.part_of_speech.as_ref())),
        ),
    };

    let pronunciation = non_empty(entry.phonetic.as_ref()).or_else(|| {
        entry
            .phonetics
            .iter()
            .flatten()
            .find_map(|p| non_empty(p.text.as_ref()))
    });

    if text.is_none() && pronunciation.is_none() && part_of_speech.is_none() {
        return None;
    }

    Some(Definition {
        text,
        pronunciation,
        part_of_speech,
    })
}

/// Free Dictionary API client
pub struct FreeDictionaryClient {
    http_client: reqwest::Client,
    base_url: String,
    in_flight: Semaphore,
    rate_limiter: Option<DefaultDirectRateLimiter>,
}

impl FreeDictionaryClient {
    pub fn new(config: &DictionaryConfig) -> Result<Self, DictionaryError> {
        let http_client = reqwest::Client::builder()
            .user_agent(get_user_agent())
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .build()
            .map_err(|e| DictionaryError::ClientError(e.to_string()))?;

        // Zero disables the quota
        let rate_limiter = NonZeroU32::new(config.requests_per_second)
            .map(|rps| RateLimiter::direct(Quota::per_second(rps)));

        Ok(Self {
            http_client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            in_flight: Semaphore::new(config.max_concurrent_lookups.max(1)),
            rate_limiter,
        })
    }

    fn entry_url(&self, word: &str) -> String {
        format!("{}/api/v2/entries/en/{}", self.base_url, word)
    }
}

#[async_trait]
impl DictionaryClient for FreeDictionaryClient {
    async fn lookup_definition(&self, word: &str) -> Result<Option<Definition>, DictionaryError> {
        if word.is_empty() || !word.chars().all(|c| c.is_ascii_alphabetic() || c == '\'') {
            return Err(DictionaryError::InvalidWord(word.to_string()));
        }

        let _permit = self
            .in_flight
            .acquire()
            .await
            .map_err(|e| DictionaryError::ClientError(e.to_string()))?;

        if let Some(limiter) = &self.rate_limiter {
            limiter.until_ready().await;
        }

        let url = self.entry_url(word);
        tracing::debug!(word = %word, url = %url, "Querying dictionary API");

        let response = self
            .http_client
            .get(&url)
            .send()
            .await
            .map_err(|e| DictionaryError::NetworkError(e.to_string()))?;

        let status = response.status();

        // The service answers 404 with a "No Definitions Found" body
        if status == reqwest::StatusCode::NOT_FOUND {
            tracing::debug!(word = %word, "No dictionary entry");
            return Ok(None);
        }

        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(DictionaryError::ApiError(status.as_u16(), error_text));
        }

        let entries: Vec<DictionaryEntry> = response
            .json()
            .await
            .map_err(|e| DictionaryError::ParseError(e.to_string()))?;

        let definition = extract_definition(&entries);

        tracing::debug!(
            word = %word,
            entries = entries.len(),
            found = definition.is_some(),
            "Dictionary lookup finished"
        );

        Ok(definition)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> Vec<DictionaryEntry> {
        serde_json::from_str(json).expect("valid test JSON")
    }

    #[test]
    fn test_extract_full_entry() {
        let entries = parse(
            r#"[{
                "word": "hello",
                "phonetic": "həˈləʊ",
                "phonetics": [{"text": "həˈləʊ", "audio": ""}],
                "meanings": [
                    {"partOfSpeech": "exclamation",
                     "definitions": [{"definition": "used as a greeting", "example": "hello there"}]},
                    {"partOfSpeech": "noun",
                     "definitions": [{"definition": "an utterance of hello"}]}
                ],
                "license": {"name": "CC BY-SA 3.0"},
                "sourceUrls": ["https://en.wiktionary.org/wiki/hello"]
            }]"#,
        );

        let definition = extract_definition(&entries).unwrap();
        assert_eq!(definition.text.as_deref(), Some("used as a greeting"));
        assert_eq!(definition.pronunciation.as_deref(), Some("həˈləʊ"));
        assert_eq!(definition.part_of_speech.as_deref(), Some("exclamation"));
    }

    #[test]
    fn test_pronunciation_falls_back_to_phonetics() {
        let entries = parse(
            r#"[{
                "word": "tomato",
                "phonetics": [{"text": ""}, {"text": "/təˈmɑːtəʊ/"}],
                "meanings": [{"partOfSpeech": "noun",
                              "definitions": [{"definition": "a red fruit"}]}]
            }]"#,
        );

        let definition = extract_definition(&entries).unwrap();
        assert_eq!(definition.pronunciation.as_deref(), Some("/təˈmɑːtəʊ/"));
    }

    #[test]
    fn test_skips_meanings_without_definitions() {
        let entries = parse(
            r#"[{
                "word": "run",
                "phonetic": null,
                "phonetics": null,
                "meanings": [
                    {"partOfSpeech": "verb", "definitions": []},
                    {"partOfSpeech": "noun", "definitions": [{"definition": "an act of running"}]}
                ]
            }]"#,
        );

        let definition = extract_definition(&entries).unwrap();
        assert_eq!(definition.text.as_deref(), Some("an act of running"));
        assert_eq!(definition.part_of_speech.as_deref(), Some("noun"));
        assert_eq!(definition.pronunciation, None);
    }

    #[test]
    fn test_empty_result_is_none() {
        assert_eq!(extract_definition(&[]), None);

        let entries = parse(r#"[{"word": "ghost", "meanings": []}]"#);
        assert_eq!(extract_definition(&entries), None);
    }

    #[test]
    fn test_entry_without_definitions_keeps_other_fields() {
        let entries = parse(
            r#"[{
                "word": "hmm",
                "phonetic": "/hm/",
                "meanings": [
                    {"partOfSpeech": "", "definitions": []},
                    {"partOfSpeech": "interjection", "definitions": [{"definition": "  "}]}
                ]
            }]"#,
        );

        let definition = extract_definition(&entries).unwrap();
        assert_eq!(definition.text, None);
        assert_eq!(definition.pronunciation.as_deref(), Some("/hm/"));
        assert_eq!(definition.part_of_speech.as_deref(), Some("interjection"));

        let enrichment: Enrichment = definition.into();
        assert_eq!(enrichment.definition, None);
        assert!(!enrichment.is_empty());
    }

    #[test]
    fn test_definition_into_enrichment() {
        let enrichment: Enrichment = Definition {
            text: Some("a small dog".to_string()),
            pronunciation: None,
            part_of_speech: Some("noun".to_string()),
        }
        .into();

        assert_eq!(enrichment.definition.as_deref(), Some("a small dog"));
        assert_eq!(enrichment.part_of_speech.as_deref(), Some("noun"));
        assert!(!enrichment.is_empty());
    }

    #[test]
    fn test_client_creation_and_url() {
        let config = DictionaryConfig {
            base_url: "http://localhost:8080/".to_string(),
            ..Default::default()
        };
        let client = FreeDictionaryClient::new(&config).unwrap();
        assert_eq!(
            client.entry_url("fox's"),
            "http://localhost:8080/api/v2/entries/en/fox's"
        );
    }

    #[tokio::test]
    async fn test_rejects_non_word_input() {
        let client = FreeDictionaryClient::new(&DictionaryConfig::default()).unwrap();
        let result = client.lookup_definition("../etc/passwd").await;
        assert!(matches!(result, Err(DictionaryError::InvalidWord(_))));
    }
}
