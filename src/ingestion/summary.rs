//! Canonical listing summaries and chunk construction.
//!
//! A record renders into a fixed-order, labeled multi-line summary; absent
//! fields are omitted entirely instead of appearing as empty labels. The
//! summary is then split by the chunker and each segment wrapped with
//! positional metadata.

use serde::{Deserialize, Serialize};

use crate::chunking::chunk_text;
use crate::ingestion::records::PropertyRecord;
use crate::types::RagError;

/// A bounded text segment derived from one record.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PropertyChunk {
    pub text: String,
    pub metadata: ChunkMetadata,
}

/// Positional and identifying metadata carried by each chunk.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ChunkMetadata {
    pub property_url: String,
    pub title: String,
    pub location: String,
    pub price: String,
    pub property_type: String,
    pub bedrooms: String,
    pub area: String,
    pub chunk_index: usize,
    pub total_chunks: usize,
}

/// Collapses whitespace runs (including newlines) to single spaces.
pub fn clean_text(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Assembles the present fields of a record into its canonical summary.
pub fn summarize(record: &PropertyRecord) -> String {
    let mut parts: Vec<String> = Vec::new();

    if let Some(title) = &record.title {
        parts.push(format!("Property: {title}"));
    }
    if let Some(price) = &record.price {
        parts.push(format!("Price: {price}"));
    }
    if let Some(location) = &record.location {
        parts.push(format!("Location: {location}"));
    }

    let mut details: Vec<String> = Vec::new();
    if let Some(property_type) = &record.property_type {
        details.push(format!("Type: {property_type}"));
    }
    if let Some(bedrooms) = &record.bedrooms {
        details.push(bedrooms.clone());
    }
    if let Some(bathrooms) = &record.bathrooms {
        details.push(bathrooms.clone());
    }
    if let Some(area) = &record.area {
        details.push(format!("Area: {area}"));
    }
    if !details.is_empty() {
        parts.push(format!("Details: {}", details.join(", ")));
    }

    if let Some(builder) = &record.builder {
        parts.push(format!("Builder: {builder}"));
    }
    if let Some(description) = &record.description {
        parts.push(format!("Description: {}", clean_text(description)));
    }
    if !record.amenities.is_empty() {
        parts.push(format!("Amenities: {}", record.amenities.join(", ")));
    }
    if let Some(locality_info) = &record.locality_info {
        parts.push(format!("Locality: {}", clean_text(locality_info)));
    }
    if !record.url.is_empty() {
        parts.push(format!("URL: {}", record.url));
    }

    parts.join("\n")
}

/// Summarizes a record and splits it into metadata-tagged chunks.
pub fn build_chunks(
    record: &PropertyRecord,
    chunk_size: usize,
    overlap: usize,
) -> Result<Vec<PropertyChunk>, RagError> {
    let summary = summarize(record);
    let segments = chunk_text(&summary, chunk_size, overlap)?;
    let total_chunks = segments.len();

    Ok(segments
        .into_iter()
        .enumerate()
        .map(|(chunk_index, text)| PropertyChunk {
            text,
            metadata: ChunkMetadata {
                property_url: record.url.clone(),
                title: record.title.clone().unwrap_or_default(),
                location: record.location.clone().unwrap_or_default(),
                price: record.price.clone().unwrap_or_default(),
                property_type: record.property_type.clone().unwrap_or_default(),
                bedrooms: record.bedrooms.clone().unwrap_or_default(),
                area: record.area.clone().unwrap_or_default(),
                chunk_index,
                total_chunks,
            },
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingestion::records::sample_records;
    use chrono::Utc;

    fn electronic_city_fixture() -> PropertyRecord {
        sample_records()
            .into_iter()
            .find(|r| r.url.ends_with("property-sample-2"))
            .unwrap()
    }

    #[test]
    fn summary_contains_labeled_fields_in_order() {
        let summary = summarize(&electronic_city_fixture());
        assert!(summary.contains("Property: 2BHK Flat in Electronic City"));
        assert!(summary.contains("Price: ₹ 75 Lakh"));
        let details = summary
            .lines()
            .find(|line| line.starts_with("Details: "))
            .unwrap();
        assert!(details.contains("2 BHK"));
        assert!(details.contains("Area: 1100 sq.ft"));
        assert!(summary.contains("Amenities: Gym, Power Backup, Parking"));
        assert!(!summary.contains("N/A"));

        let labels: Vec<&str> = summary
            .lines()
            .filter_map(|line| line.split(':').next())
            .collect();
        assert_eq!(
            labels,
            vec![
                "Property",
                "Price",
                "Location",
                "Details",
                "Builder",
                "Description",
                "Amenities",
                "Locality",
                "URL"
            ]
        );
    }

    #[test]
    fn absent_fields_are_omitted_not_rendered_empty() {
        let record = PropertyRecord {
            url: "https://example.com/listings/bare-1".to_string(),
            scraped_at: Utc::now(),
            title: Some("Bare Plot".to_string()),
            price: None,
            location: None,
            property_type: None,
            bedrooms: None,
            bathrooms: None,
            area: None,
            amenities: Vec::new(),
            description: None,
            builder: None,
            locality_info: None,
        };
        let summary = summarize(&record);
        assert_eq!(
            summary,
            "Property: Bare Plot\nURL: https://example.com/listings/bare-1"
        );
    }

    #[test]
    fn description_whitespace_is_normalized() {
        let mut record = electronic_city_fixture();
        record.description = Some("Spacious\n\n  2BHK\tapartment.".to_string());
        let summary = summarize(&record);
        assert!(summary.contains("Description: Spacious 2BHK apartment."));
    }

    #[test]
    fn chunk_indices_cover_zero_to_total() {
        let mut record = electronic_city_fixture();
        // Inflate the description so the summary needs several windows.
        record.description = Some("The apartment features a modern kitchen. ".repeat(30));
        let chunks = build_chunks(&record, 256, 32).unwrap();
        let total = chunks.len();
        assert!(total > 1);
        for (i, chunk) in chunks.iter().enumerate() {
            assert_eq!(chunk.metadata.chunk_index, i);
            assert_eq!(chunk.metadata.total_chunks, total);
            assert_eq!(chunk.metadata.property_url, record.url);
            assert!(!chunk.text.is_empty());
        }
    }

    #[test]
    fn short_summary_yields_single_chunk() {
        let chunks = build_chunks(&electronic_city_fixture(), 2048, 50).unwrap();
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].metadata.chunk_index, 0);
        assert_eq!(chunks[0].metadata.total_chunks, 1);
    }
}
