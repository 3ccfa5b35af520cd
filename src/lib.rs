// ==========================================
// 商品目录导入引擎 - 核心库
// ==========================================
// 技术栈: Rust + SQLite
// 系统定位: 目录导入与 SKU 对账引擎 (上层 CRUD 由外部系统承担)
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 数据访问
pub mod repository;

// 引擎层 - 导入与对账规则
pub mod engine;

// 配置层 - 运行级配置
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一）
pub mod db;

// 日志系统
pub mod logging;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{ProgressState, UpsertOutcome};

// 领域实体
pub use domain::{CatalogEntry, ImportResult, ImportRun, TenantUser, VariationEntry};

// 引擎
pub use engine::{
    CatalogImporter, ImportError, ImportProgressStore, NoOpProgressReporter, ProgressReporter,
    ProgressSnapshot, ReconciliationEngine, SkuPrescan, SkuSequence,
};

// 配置
pub use config::ImportConfig;

// 仓储
pub use repository::catalog_repo::CatalogRepository;
pub use repository::catalog_repo_impl::SqliteCatalogRepository;
pub use repository::error::{RepositoryError, RepositoryResult};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "商品目录导入引擎";

// ==========================================
// 预编译检查
// ==========================================
