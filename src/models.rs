use serde::Deserialize;

/// Shown wherever a rocket has no image of its own.
pub const PLACEHOLDER_IMAGE_URL: &str =
    "https://images.unsplash.com/photo-1516849841032-87cbac4d88f7?w=800";

// ---------------------------------------------------------------------------
// Remote shape: one entry of `GET /rockets`
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CatalogRecord {
    pub id: String,
    pub name: String,
    pub description: String,
    pub active: bool,
    #[serde(default)]
    pub cost_per_launch: Option<i64>,
    pub first_flight: String,
    #[serde(default)]
    pub flickr_images: Vec<String>,
    #[serde(default)]
    pub height: Option<Dimension>,
    #[serde(default)]
    pub mass: Option<Mass>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Dimension {
    #[serde(default)]
    pub meters: Option<f64>,
    #[serde(default)]
    pub feet: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Mass {
    #[serde(default)]
    pub kg: Option<i64>,
    #[serde(default)]
    pub lb: Option<i64>,
}

// ---------------------------------------------------------------------------
// Local shape: one row of the `rockets` table
// ---------------------------------------------------------------------------

/// A rocket as persisted locally. Only the first remote image survives and
/// imperial units are dropped.
#[derive(Debug, Clone, PartialEq)]
pub struct RocketEntity {
    pub id: String,
    pub name: String,
    pub description: String,
    pub active: bool,
    pub cost_per_launch: i64,
    pub first_flight: String,
    pub image_url: Option<String>,
    pub height_meters: Option<f64>,
    pub mass_kg: Option<i64>,
}

impl From<CatalogRecord> for RocketEntity {
    fn from(record: CatalogRecord) -> Self {
        Self {
            id: record.id,
            name: record.name,
            description: record.description,
            active: record.active,
            cost_per_launch: record.cost_per_launch.unwrap_or(0),
            first_flight: record.first_flight,
            image_url: record.flickr_images.into_iter().next(),
            height_meters: record.height.and_then(|h| h.meters),
            mass_kg: record.mass.and_then(|m| m.kg),
        }
    }
}

// ---------------------------------------------------------------------------
// Presentation shape
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct Rocket {
    pub id: String,
    pub name: String,
    pub description: String,
    pub active: bool,
    pub cost_per_launch: i64,
    pub first_flight: String,
    pub flickr_images: Vec<String>,
    pub height_meters: Option<f64>,
    pub mass_kg: Option<i64>,
}

impl From<RocketEntity> for Rocket {
    fn from(entity: RocketEntity) -> Self {
        Self {
            id: entity.id,
            name: entity.name,
            description: entity.description,
            active: entity.active,
            cost_per_launch: entity.cost_per_launch,
            first_flight: entity.first_flight,
            flickr_images: entity.image_url.into_iter().collect(),
            height_meters: entity.height_meters,
            mass_kg: entity.mass_kg,
        }
    }
}

impl Rocket {
    /// First image, or [`PLACEHOLDER_IMAGE_URL`].
    pub fn cover_image(&self) -> &str {
        self.flickr_images
            .first()
            .map(String::as_str)
            .unwrap_or(PLACEHOLDER_IMAGE_URL)
    }

    /// Year part of `first_flight` (`"2010-06-04"` → `"2010"`).
    pub fn first_flight_year(&self) -> &str {
        self.first_flight
            .split('-')
            .next()
            .unwrap_or(&self.first_flight)
    }

    pub fn mass_tonnes(&self) -> f64 {
        self.mass_kg.unwrap_or(0) as f64 / 1000.0
    }

    /// Launch cost in whole millions of dollars.
    pub fn cost_millions(&self) -> i64 {
        self.cost_per_launch / 1_000_000
    }

    pub fn wikipedia_url(&self) -> String {
        format!(
            "https://en.wikipedia.org/wiki/{}",
            self.name.replace(' ', "_")
        )
    }

    /// Case-insensitive substring match against name or description. An
    /// empty query matches everything.
    pub fn matches(&self, query: &str) -> bool {
        if query.is_empty() {
            return true;
        }
        let needle = query.to_lowercase();
        self.name.to_lowercase().contains(&needle)
            || self.description.to_lowercase().contains(&needle)
    }
}
