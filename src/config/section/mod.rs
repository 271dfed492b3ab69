//! Configuration section definitions.
//!
//! Each module corresponds to a section in `taxa.toml`:
//!
//! | Module       | TOML Section     | Purpose                                  |
//! |--------------|------------------|------------------------------------------|
//! | `site`       | `[site]`         | Title, index template, item title field  |
//! | `build`      | `[build]`        | Output and templates directories         |
//! | `data`       | `[data]`         | Record sources, structured fields        |
//! | `taxonomies` | `[taxonomies]`   | Taxonomy id -> source field              |

mod build;
mod data;
mod site;
mod taxonomies;

pub use build::BuildSectionConfig;
pub use data::DataConfig;
pub use site::SiteSectionConfig;
pub use taxonomies::TaxonomiesConfig;
