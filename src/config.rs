//! Environment-driven settings.
//!
//! Credentials and tunables come from the process environment (a `.env`
//! file is honored via `dotenvy`). Missing required credentials are
//! reported together as a single startup-fatal configuration error.

use std::env;

use crate::types::RagError;

const DEFAULT_INDEX_NAME: &str = "estate-properties";
const DEFAULT_REGION: &str = "us-east-1";
const DEFAULT_GROQ_MODEL: &str = "llama-3.3-70b-versatile";
const DEFAULT_EMBEDDING_MODEL: &str = "llama-text-embed-v2";
const DEFAULT_EMBEDDING_DIMENSION: usize = 1024;
const DEFAULT_CHUNK_SIZE: usize = 512;
const DEFAULT_CHUNK_OVERLAP: usize = 50;
const DEFAULT_TOP_K: usize = 5;
const DEFAULT_TEMPERATURE: f32 = 0.1;
const DEFAULT_MAX_TOKENS: u32 = 1024;
const DEFAULT_SERVER_ADDR: &str = "0.0.0.0:8000";

/// Resolved configuration for ingestion and query serving.
#[derive(Clone, Debug)]
pub struct Settings {
    pub pinecone_api_key: String,
    pub pinecone_index_name: String,
    pub pinecone_region: String,
    pub groq_api_key: String,
    pub groq_model: String,
    pub embedding_model: String,
    pub embedding_dimension: usize,
    pub chunk_size: usize,
    pub chunk_overlap: usize,
    pub top_k: usize,
    pub temperature: f32,
    pub max_tokens: u32,
    pub server_addr: String,
}

impl Settings {
    /// Loads settings from the environment, failing on missing credentials
    /// or a chunk overlap that would stall the chunker.
    pub fn from_env() -> Result<Self, RagError> {
        dotenvy::dotenv().ok();

        let mut missing = Vec::new();
        let pinecone_api_key = require("PINECONE_API_KEY", &mut missing);
        let groq_api_key = require("GROQ_API_KEY", &mut missing);
        if !missing.is_empty() {
            return Err(RagError::Configuration(format!(
                "missing required environment variables: {}",
                missing.join(", ")
            )));
        }

        let settings = Self {
            pinecone_api_key,
            pinecone_index_name: var_or("PINECONE_INDEX_NAME", DEFAULT_INDEX_NAME),
            pinecone_region: var_or("PINECONE_REGION", DEFAULT_REGION),
            groq_api_key,
            groq_model: var_or("GROQ_MODEL", DEFAULT_GROQ_MODEL),
            embedding_model: var_or("EMBEDDING_MODEL", DEFAULT_EMBEDDING_MODEL),
            embedding_dimension: parsed_or("EMBEDDING_DIMENSION", DEFAULT_EMBEDDING_DIMENSION)?,
            chunk_size: parsed_or("CHUNK_SIZE", DEFAULT_CHUNK_SIZE)?,
            chunk_overlap: parsed_or("CHUNK_OVERLAP", DEFAULT_CHUNK_OVERLAP)?,
            top_k: parsed_or("TOP_K_RESULTS", DEFAULT_TOP_K)?,
            temperature: parsed_or("TEMPERATURE", DEFAULT_TEMPERATURE)?,
            max_tokens: parsed_or("MAX_TOKENS", DEFAULT_MAX_TOKENS)?,
            server_addr: var_or("SERVER_ADDR", DEFAULT_SERVER_ADDR),
        };

        if settings.chunk_overlap >= settings.chunk_size {
            return Err(RagError::Configuration(format!(
                "CHUNK_OVERLAP {} must be smaller than CHUNK_SIZE {}",
                settings.chunk_overlap, settings.chunk_size
            )));
        }

        Ok(settings)
    }
}

fn require(key: &str, missing: &mut Vec<String>) -> String {
    match env::var(key) {
        Ok(value) if !value.trim().is_empty() => value,
        _ => {
            missing.push(key.to_string());
            String::new()
        }
    }
}

fn var_or(key: &str, default: &str) -> String {
    env::var(key)
        .ok()
        .filter(|value| !value.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn parsed_or<T>(key: &str, default: T) -> Result<T, RagError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .map_err(|err| RagError::Configuration(format!("invalid value for {key}: {err}"))),
        _ => Ok(default),
    }
}
