/// Data layer: table types, loading, encoding, filtering and aggregation.
///
/// Architecture:
/// ```text
///  .csv / .json / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader  │  parse file → raw Table (text / integer / float cells)
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │ encoder  │  categorical columns → integer codes, EncoderBank
///   └──────────┘
///        │
///        ├──────────────┬───────────────┐
///        ▼              ▼               ▼
///   ┌──────────┐   ┌───────────┐   ┌──────────┐
///   │  filter  │   │ aggregate │   │  export  │  decoded CSV
///   └──────────┘   └───────────┘   └──────────┘
/// ```

pub mod aggregate;
pub mod encoder;
pub mod export;
pub mod filter;
pub mod loader;
pub mod model;
