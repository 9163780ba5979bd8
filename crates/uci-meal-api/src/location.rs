use crate::resolver::ResolveError;

/// A dining hall known to the upstream provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Location {
    /// internal identifier used in requests and cache keys
    pub key: &'static str,
    pub official_name: &'static str,
    pub upstream_id: u32,
    /// path segment of the overview page (`/LocationsAndMenus/{slug}`)
    pub slug: &'static str,
}

pub const LOCATIONS: &[Location] = &[
    Location {
        key: "anteatery",
        official_name: "Anteatery",
        upstream_id: 3056,
        slug: "TheAnteatery",
    },
    Location {
        key: "brandywine",
        official_name: "Brandywine",
        upstream_id: 3314,
        slug: "Brandywine",
    },
];

pub fn resolve(key: &str) -> Result<&'static Location, ResolveError> {
    LOCATIONS.iter()
        .find(|v| v.key == key)
        .ok_or_else(|| ResolveError::InvalidLocation(key.to_owned()))
}

impl Location {
    pub fn overview_path(&self) -> String {
        format!("/LocationsAndMenus/{}", self.slug)
    }
}
