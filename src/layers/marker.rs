use crate::{
    core::{
        geo::{NormalizedPosition, Point},
        viewport::{project_content_to_screen, ViewGeometry, ViewportState},
    },
    MapError, Result,
};
use fxhash::FxHashMap as HashMap;
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// Stable identifier of a waste point
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MarkerId(String);

impl MarkerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MarkerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for MarkerId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for MarkerId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Kind of site a marker represents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Collection,
    Valorisation,
    Distribution,
}

impl Category {
    pub const ALL: [Category; 3] = [
        Category::Collection,
        Category::Valorisation,
        Category::Distribution,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Category::Collection => "collection",
            Category::Valorisation => "valorisation",
            Category::Distribution => "distribution",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Category filter; `All` shows every marker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CategoryFilter {
    #[default]
    All,
    Only(Category),
}

impl CategoryFilter {
    pub fn matches(self, category: Category) -> bool {
        match self {
            CategoryFilter::All => true,
            CategoryFilter::Only(wanted) => wanted == category,
        }
    }
}

impl fmt::Display for CategoryFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CategoryFilter::All => f.write_str("all"),
            CategoryFilter::Only(category) => category.fmt(f),
        }
    }
}

impl FromStr for CategoryFilter {
    type Err = MapError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(CategoryFilter::All),
            "collection" => Ok(CategoryFilter::Only(Category::Collection)),
            "valorisation" | "valorization" => Ok(CategoryFilter::Only(Category::Valorisation)),
            "distribution" => Ok(CategoryFilter::Only(Category::Distribution)),
            other => Err(MapError::InvalidConfig(format!(
                "unknown category filter '{other}'"
            ))),
        }
    }
}

impl Serialize for CategoryFilter {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for CategoryFilter {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Contact details of a site, when the data source has them
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ContactDetails {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
}

impl ContactDetails {
    pub fn is_empty(&self) -> bool {
        self.address.is_none()
            && self.phone.is_none()
            && self.email.is_none()
            && self.website.is_none()
    }
}

/// Display fields carried by a marker; the core never interprets them
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MarkerMetadata {
    pub name: String,
    #[serde(default, alias = "wasteType")]
    pub waste_type: String,
    #[serde(default)]
    pub amount: String,
    #[serde(default)]
    pub distance: String,
    #[serde(default, alias = "updatedAt")]
    pub updated_at: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact: Option<ContactDetails>,
}

/// Marker record as supplied by a data source, with `lat%`/`lng%` placement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkerRecord {
    pub id: String,
    pub lat: f64,
    pub lng: f64,
    pub category: Category,
    #[serde(flatten)]
    pub metadata: MarkerMetadata,
}

/// One waste point on the map. Immutable once ingested.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "MarkerRecord", into = "MarkerRecord")]
pub struct MarkerPoint {
    pub id: MarkerId,
    pub position: NormalizedPosition,
    pub category: Category,
    pub metadata: MarkerMetadata,
}

impl MarkerPoint {
    pub fn new(
        id: impl Into<MarkerId>,
        position: NormalizedPosition,
        category: Category,
        metadata: MarkerMetadata,
    ) -> Self {
        Self {
            id: id.into(),
            position,
            category,
            metadata,
        }
    }

    pub fn name(&self) -> &str {
        &self.metadata.name
    }
}

impl TryFrom<MarkerRecord> for MarkerPoint {
    type Error = MapError;

    /// Ingests a record. Out-of-range coordinates are clamped into `[0, 100]`
    /// with a warning; only a missing id is rejected.
    fn try_from(record: MarkerRecord) -> Result<Self> {
        if record.id.trim().is_empty() {
            return Err(MapError::InvalidMarker("marker id is empty".to_string()));
        }
        if !NormalizedPosition::is_valid(record.lng, record.lat) {
            log::warn!(
                "marker {} has out-of-range position lat={} lng={}, clamping",
                record.id,
                record.lat,
                record.lng
            );
        }

        let position = NormalizedPosition::from_lat_lng_percent(record.lat, record.lng);
        let contact = record.metadata.contact.filter(|c| !c.is_empty());
        Ok(Self {
            id: MarkerId(record.id),
            position,
            category: record.category,
            metadata: MarkerMetadata {
                contact,
                ..record.metadata
            },
        })
    }
}

impl From<MarkerPoint> for MarkerRecord {
    fn from(marker: MarkerPoint) -> Self {
        Self {
            id: marker.id.0,
            lat: marker.position.y,
            lng: marker.position.x,
            category: marker.category,
            metadata: marker.metadata,
        }
    }
}

/// The fixed set of waste points and the category filter applied to it.
///
/// Filtering only changes which markers are reported as visible; the marker
/// set itself is never touched.
#[derive(Debug, Clone, Default)]
pub struct MarkerLayer {
    markers: Vec<MarkerPoint>,
    index: HashMap<MarkerId, usize>,
    filter: CategoryFilter,
}

impl MarkerLayer {
    /// Builds a layer, rejecting duplicate ids.
    pub fn new(markers: Vec<MarkerPoint>) -> Result<Self> {
        let mut index = HashMap::default();
        for (position, marker) in markers.iter().enumerate() {
            if index.insert(marker.id.clone(), position).is_some() {
                return Err(MapError::InvalidMarker(format!(
                    "duplicate marker id '{}'",
                    marker.id
                )));
            }
        }
        Ok(Self {
            markers,
            index,
            filter: CategoryFilter::All,
        })
    }

    /// Parses a JSON array of marker records.
    pub fn from_json(json: &str) -> Result<Self> {
        let markers: Vec<MarkerPoint> = serde_json::from_str(json)?;
        Self::new(markers)
    }

    /// Swaps the marker set, keeping the current filter.
    pub fn replace(&mut self, markers: Vec<MarkerPoint>) -> Result<()> {
        let filter = self.filter;
        *self = Self::new(markers)?;
        self.filter = filter;
        Ok(())
    }

    pub fn set_filter(&mut self, filter: CategoryFilter) {
        if self.filter != filter {
            log::debug!("marker filter: {} -> {}", self.filter, filter);
        }
        self.filter = filter;
    }

    pub fn filter(&self) -> CategoryFilter {
        self.filter
    }

    /// Every marker, regardless of the filter
    pub fn all(&self) -> &[MarkerPoint] {
        &self.markers
    }

    pub fn len(&self) -> usize {
        self.markers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }

    /// Markers passing the current filter, in data order
    pub fn visible(&self) -> impl Iterator<Item = &MarkerPoint> + '_ {
        let filter = self.filter;
        self.markers.iter().filter(move |m| filter.matches(m.category))
    }

    pub fn visible_count(&self) -> usize {
        self.visible().count()
    }

    pub fn get(&self, id: &MarkerId) -> Option<&MarkerPoint> {
        self.index.get(id).and_then(|&i| self.markers.get(i))
    }

    pub fn is_visible(&self, id: &MarkerId) -> bool {
        self.get(id)
            .map_or(false, |marker| self.filter.matches(marker.category))
    }

    /// Number of markers per category, over the full set
    pub fn counts(&self) -> HashMap<Category, usize> {
        let mut counts: HashMap<Category, usize> =
            Category::ALL.iter().map(|c| (*c, 0)).collect();
        for marker in &self.markers {
            *counts.entry(marker.category).or_insert(0) += 1;
        }
        counts
    }

    /// Screen positions of the visible markers for a viewport state.
    pub fn screen_positions<'a>(
        &'a self,
        state: &ViewportState,
        geometry: &ViewGeometry,
    ) -> impl Iterator<Item = (&'a MarkerPoint, Point)> + 'a {
        let (state, geometry) = (*state, *geometry);
        self.visible()
            .map(move |m| (m, project_content_to_screen(&m.position, &state, &geometry)))
    }

    /// The visible marker under a screen point, if any.
    ///
    /// Markers later in the data are drawn on top, so the last hit within
    /// `radius` wins.
    pub fn marker_at(
        &self,
        screen: Point,
        state: &ViewportState,
        geometry: &ViewGeometry,
        radius: f64,
    ) -> Option<&MarkerPoint> {
        self.screen_positions(state, geometry)
            .filter(|(_, position)| position.distance_to(&screen) <= radius)
            .last()
            .map(|(marker, _)| marker)
    }
}
