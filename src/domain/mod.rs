// ==========================================
// 商品目录导入引擎 - 领域模型层
// ==========================================
// 职责: 定义领域实体与类型
// 红线: 不含数据访问逻辑,不含引擎逻辑
// ==========================================

pub mod catalog;
pub mod types;

// 重导出核心类型
pub use catalog::{CatalogEntry, ImportResult, ImportRun, TenantUser, VariationEntry};
pub use types::{ProgressState, UpsertOutcome};
