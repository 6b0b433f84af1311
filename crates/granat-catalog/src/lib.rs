//! Component catalog building blocks for Granat.
//!
//! The catalog is a remote table (component, containing file, tags, link).
//! This crate parses it into [`CatalogRecord`] rows, keeps a time-to-live
//! snapshot with stale fallback in [`CatalogCache`], and answers tag searches
//! scoped to the mobile or web component families.
//!
//! ```rust
//! use granat_catalog::{parse_catalog_table, search_records, CategoryScope};
//!
//! let table = "Component,File,Tags,Link\nButton,App Components,\"кнопка, button\",https://figma/1\n";
//! let records = parse_catalog_table(table).expect("table parses");
//! let found = search_records(&records, "КНОП", Some(CategoryScope::Mobile));
//! assert_eq!(found.len(), 1);
//! assert_eq!(found[0].name, "Button");
//! ```

pub mod catalog_cache;
pub mod catalog_error;
pub mod catalog_record;
pub mod catalog_search;
pub mod catalog_source;

pub use catalog_cache::*;
pub use catalog_error::*;
pub use catalog_record::*;
pub use catalog_search::*;
pub use catalog_source::*;
