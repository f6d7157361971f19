// Zone domain module
// Team-owned convex home regions and the catalog that answers containment
// queries against them

pub mod catalog;
pub mod polygon;

pub use catalog::{Zone, ZoneCatalog, ZoneId};
pub use polygon::Polygon;
