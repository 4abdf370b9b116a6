//! Data layer: trace model, loading, filtering, column processing, aggregation.
//!
//! Architecture:
//! ```text
//!  .parquet / .json / .csv   (one file per data-set)
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  loader   │  library dir → TraceCollection
//!   └──────────┘
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  filter   │  drop samples with velocity ≤ 0
//!   └──────────┘
//!        │
//!        ▼
//!   ┌───────────┐
//!   │ processor  │  rename / derive throughput columns per UE model
//!   └───────────┘
//!        │
//!        ▼
//!   ┌───────────┐
//!   │ aggregate  │  restrict + concatenate → AggregatedTable
//!   └───────────┘
//! ```

pub mod aggregate;
pub mod error;
pub mod filter;
pub mod loader;
pub mod model;
pub mod processor;
