//! Data layer: schema, metadata join, loading, and aggregation.
//!
//! Architecture:
//! ```text
//!  metadata.csv          data/*.csv
//!        │                    │
//!        ▼                    ▼
//!   ┌──────────┐        ┌──────────┐
//!   │ metadata  │──────▶│  loader   │  one file → MeasurementTable (+ metadata)
//!   └──────────┘        └──────────┘
//!                             │  rayon, one task per file
//!                             ▼
//!                       ┌──────────┐
//!                       │  corpus   │  discover + concat → unified table
//!                       └──────────┘
//!                             │
//!                             ▼
//!                       ┌───────────┐
//!                       │ aggregate  │  group by (battery_id, test_id)
//!                       └───────────┘
//! ```

pub mod aggregate;
pub mod corpus;
pub mod loader;
pub mod metadata;
pub mod model;
pub mod schema;
