//! Crop yield prediction server.
//!
//! Loads a trained model together with its scaler and column lists once at
//! startup, then serves single-record predictions over HTTP.

pub mod api;
pub mod artifacts;
pub mod config;
pub mod features;
pub mod model;
pub mod record;
pub mod scaler;

pub use artifacts::Artifacts;
pub use config::AppConfig;
pub use record::CropRecord;
