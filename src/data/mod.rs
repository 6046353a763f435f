/// Data layer: DBnomics access, selection, joining and filtering.
///
/// Architecture:
/// ```text
///   DBnomics /series/IMF/{CPI,PGI}
///        │
///        ▼
///   ┌───────────┐
///   │ dbnomics   │  metadata → label dictionaries, key → SeriesTable
///   └───────────┘
///        │
///        ▼
///   ┌───────────┐
///   │ selection  │  dropdown values → QueryKey
///   └───────────┘
///        │
///        ▼
///   ┌───────────┐
///   │  merge     │  inner join on period → CombinedTable
///   └───────────┘
///        │
///        ▼
///   ┌───────────┐
///   │  filter    │  inclusive date range → filtered CombinedTable
///   └───────────┘
/// ```

pub mod dbnomics;
pub mod export;
pub mod filter;
pub mod merge;
pub mod model;
pub mod selection;
