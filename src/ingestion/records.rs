//! Listing records and the scraping-provider adapter.
//!
//! Records are immutable once ingested. The scraping provider returns
//! loosely-shaped JSON items; [`PropertyRecord::from_provider_item`]
//! normalizes them at the boundary with a fixed field mapping and fallback
//! keys. Absent fields and the provider's `"N/A"` sentinel both resolve to
//! `None` rather than surviving as magic strings.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One structured property listing.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PropertyRecord {
    pub url: String,
    pub scraped_at: DateTime<Utc>,
    pub title: Option<String>,
    pub price: Option<String>,
    pub location: Option<String>,
    pub property_type: Option<String>,
    pub bedrooms: Option<String>,
    pub bathrooms: Option<String>,
    pub area: Option<String>,
    pub amenities: Vec<String>,
    pub description: Option<String>,
    pub builder: Option<String>,
    pub locality_info: Option<String>,
}

impl PropertyRecord {
    /// Maps one raw provider item into a record.
    ///
    /// Each field tries its primary key first, then the provider's known
    /// alternate spelling (e.g. `title` falls back to `propertyName`).
    pub fn from_provider_item(item: &Value) -> Self {
        Self {
            url: field(item, &["url"]).unwrap_or_default(),
            scraped_at: Utc::now(),
            title: field(item, &["title", "propertyName"]),
            price: field(item, &["price"]),
            location: field(item, &["location", "locality"]),
            property_type: field(item, &["propertyType"]),
            bedrooms: field(item, &["bedrooms", "bhkType"]),
            bathrooms: field(item, &["bathrooms"]),
            area: field(item, &["area", "carpetArea"]),
            amenities: string_list(item, "amenities"),
            description: field(item, &["description", "propertyDescription"]),
            builder: field(item, &["builder", "builderName"]),
            locality_info: field(item, &["localityInfo", "aboutLocality"]),
        }
    }
}

/// Returns the first present, non-empty, non-`"N/A"` string among `keys`.
fn field(item: &Value, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|key| item.get(*key))
        .filter_map(Value::as_str)
        .map(str::trim)
        .find(|value| !value.is_empty() && *value != "N/A")
        .map(str::to_string)
}

fn string_list(item: &Value, key: &str) -> Vec<String> {
    item.get(key)
        .and_then(Value::as_array)
        .map(|entries| {
            entries
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

/// Built-in Bangalore fixture listings, used when no scraped input is
/// available or configured.
pub fn sample_records() -> Vec<PropertyRecord> {
    let now = Utc::now();
    let record = |url: &str,
                  title: &str,
                  price: &str,
                  location: &str,
                  property_type: &str,
                  bedrooms: &str,
                  bathrooms: &str,
                  area: &str,
                  amenities: &[&str],
                  description: &str,
                  builder: &str,
                  locality_info: &str| PropertyRecord {
        url: url.to_string(),
        scraped_at: now,
        title: Some(title.to_string()),
        price: Some(price.to_string()),
        location: Some(location.to_string()),
        property_type: Some(property_type.to_string()),
        bedrooms: Some(bedrooms.to_string()),
        bathrooms: Some(bathrooms.to_string()),
        area: Some(area.to_string()),
        amenities: amenities.iter().map(|a| a.to_string()).collect(),
        description: Some(description.to_string()),
        builder: Some(builder.to_string()),
        locality_info: Some(locality_info.to_string()),
    };

    vec![
        record(
            "https://www.magicbricks.com/property-sample-1",
            "Luxury 3BHK Apartment in Whitefield, Bangalore",
            "₹ 1.2 Cr",
            "Whitefield, Bangalore",
            "Apartment",
            "3 BHK",
            "3 Bathrooms",
            "1650 sq.ft",
            &[
                "Swimming Pool",
                "Gym",
                "Club House",
                "Power Backup",
                "Parking",
                "Security",
                "Lift",
            ],
            "Premium 3BHK apartment in Whitefield with modern amenities. Close to IT parks, schools, and shopping centers.",
            "Prestige Group",
            "Whitefield is a major IT hub with excellent infrastructure.",
        ),
        record(
            "https://www.magicbricks.com/property-sample-2",
            "2BHK Flat in Electronic City, Bangalore",
            "₹ 75 Lakh",
            "Electronic City, Bangalore",
            "Apartment",
            "2 BHK",
            "2 Bathrooms",
            "1100 sq.ft",
            &[
                "Gym",
                "Power Backup",
                "Parking",
                "Security",
                "Children Play Area",
            ],
            "Spacious 2BHK apartment in Electronic City Phase 1. Near major IT companies.",
            "Brigade Group",
            "Electronic City is Bangalore's largest IT park.",
        ),
        record(
            "https://www.magicbricks.com/property-sample-3",
            "4BHK Villa in Sarjapur Road, Bangalore",
            "₹ 2.5 Cr",
            "Sarjapur Road, Bangalore",
            "Villa",
            "4 BHK",
            "4 Bathrooms",
            "2800 sq.ft",
            &[
                "Private Garden",
                "Swimming Pool",
                "Gym",
                "Club House",
                "Power Backup",
                "Parking",
                "24x7 Security",
                "Gated Community",
            ],
            "Luxurious 4BHK villa with private garden and premium fittings. Perfect for families.",
            "Sobha Developers",
            "Sarjapur Road is rapidly developing with excellent IT parks and schools.",
        ),
        record(
            "https://www.magicbricks.com/property-sample-4",
            "3BHK Apartment in Indiranagar, Bangalore",
            "₹ 2.1 Cr",
            "Indiranagar, Bangalore",
            "Apartment",
            "3 BHK",
            "3 Bathrooms",
            "1800 sq.ft",
            &[
                "Gym",
                "Club House",
                "Power Backup",
                "Parking",
                "Lift",
                "Intercom",
                "Piped Gas",
            ],
            "Premium apartment in the heart of Indiranagar. Walking distance to restaurants and cafes.",
            "Shriram Properties",
            "Indiranagar is one of Bangalore's most sought-after neighborhoods.",
        ),
        record(
            "https://www.magicbricks.com/property-sample-5",
            "1BHK Studio Apartment in Koramangala, Bangalore",
            "₹ 55 Lakh",
            "Koramangala, Bangalore",
            "Studio Apartment",
            "1 BHK",
            "1 Bathroom",
            "650 sq.ft",
            &["Power Backup", "Parking", "Security", "Lift"],
            "Compact studio apartment perfect for young professionals. Located in the startup hub.",
            "Purva Properties",
            "Koramangala is Bangalore's startup district with numerous cafes and restaurants.",
        ),
        record(
            "https://www.magicbricks.com/property-sample-6",
            "2BHK Apartment in HSR Layout, Bangalore",
            "₹ 95 Lakh",
            "HSR Layout, Bangalore",
            "Apartment",
            "2 BHK",
            "2 Bathrooms",
            "1200 sq.ft",
            &[
                "Gym",
                "Swimming Pool",
                "Power Backup",
                "Parking",
                "Security",
                "Lift",
                "Club House",
            ],
            "Well-maintained 2BHK in HSR Layout Sector 2. Great connectivity to ORR and metro.",
            "Sobha Developers",
            "HSR Layout is a well-developed residential area with excellent amenities.",
        ),
        record(
            "https://www.magicbricks.com/property-sample-7",
            "3BHK Penthouse in JP Nagar, Bangalore",
            "₹ 1.8 Cr",
            "JP Nagar, Bangalore",
            "Penthouse",
            "3 BHK",
            "3 Bathrooms",
            "2200 sq.ft",
            &[
                "Private Terrace",
                "Swimming Pool",
                "Gym",
                "Club House",
                "Power Backup",
                "Parking",
                "Security",
            ],
            "Stunning penthouse with private terrace and city views. Premium fittings throughout.",
            "Puravankara",
            "JP Nagar is a mature residential area with excellent schools and hospitals.",
        ),
        record(
            "https://www.magicbricks.com/property-sample-8",
            "1BHK Apartment in Bommanahalli, Bangalore",
            "₹ 42 Lakh",
            "Bommanahalli, Bangalore",
            "Apartment",
            "1 BHK",
            "1 Bathroom",
            "580 sq.ft",
            &["Power Backup", "Parking", "Security"],
            "Compact 1BHK apartment near Electronic City. Ideal for first-time buyers.",
            "Mantri Developers",
            "Bommanahalli offers affordable housing near Electronic City.",
        ),
    ]
}
