/// Data layer: core types, loading, profiling, transformations and charts.
///
/// Architecture:
/// ```text
///  .csv / .xlsx
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse bytes → Table (column types inferred once)
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  model    │  Table = ordered, uniquely named, equal-length columns
///   └──────────┘
///        │
///        ├──────────────► profile    stats, nulls, types, correlation (read-only)
///        ├──────────────► chart      table + selections → Chart (read-only)
///        ├──────────────► transform  request → new Table (uses filter)
///        └──────────────► export     Table → CSV bytes
/// ```

pub mod chart;
pub mod export;
pub mod filter;
pub mod loader;
pub mod model;
pub mod profile;
pub mod transform;
