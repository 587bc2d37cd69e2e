//! On-disk extension registry: the scanner and the two registry files.
//!
//! Everything in this module only reads the extensions root except for the
//! two registry files it owns, `.obsolete` and `extensions.json`. Directory
//! trees themselves are written solely by the store.

pub mod metadata;
pub mod obsolete;
pub mod scanner;

pub use metadata::MetadataEntry;
pub use obsolete::ObsoleteSet;
