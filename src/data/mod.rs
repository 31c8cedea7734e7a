/// Data layer: core types, loading, statistics and filtering.
///
/// Architecture:
/// ```text
///  .csv / .json / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → Dataset (kind inferred per column)
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  Dataset  │  Vec<Column>, numeric / categorical partition
///   └──────────┘
///        │
///        ├──────────────┐
///        ▼              ▼
///   ┌──────────┐   ┌──────────┐
///   │  stats    │   │  filter   │  category == value → sub-table
///   └──────────┘   └──────────┘
///   describe / correlation
/// ```

pub mod filter;
pub mod loader;
pub mod model;
pub mod stats;
