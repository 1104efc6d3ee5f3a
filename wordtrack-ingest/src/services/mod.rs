//! External service clients used by the ingestion pipeline

pub mod dictionary_client;

pub use dictionary_client::{
    Definition, DictionaryClient, DictionaryError, FreeDictionaryClient,
};
