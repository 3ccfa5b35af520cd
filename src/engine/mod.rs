// ==========================================
// 商品目录导入引擎 - 引擎层
// ==========================================
// 职责: 实现导入与对账业务规则,不拼 SQL
// 红线: Engine 不拼 SQL, 所有数据访问通过 Repository
// ==========================================

pub mod column_shift;
pub mod error;
pub mod importer;
pub mod normalizer;
pub mod progress;
pub mod reconciler;
pub mod sku_allocator;
pub mod splitter;

// 重导出核心引擎
pub use column_shift::{correct_shift, is_shifted, recovered_sku_field};
pub use error::ImportError;
pub use importer::CatalogImporter;
pub use normalizer::{normalize_header, normalize_row, normalize_value, RawRow, RowReader};
pub use progress::{ImportProgressStore, NoOpProgressReporter, ProgressReporter, ProgressSnapshot};
pub use reconciler::ReconciliationEngine;
pub use sku_allocator::{SkuPrescan, SkuSequence};
pub use splitter::{split_list, split_list_positional, split_row, SplitRow, VariationTuple};
