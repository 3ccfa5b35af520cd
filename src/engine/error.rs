// ==========================================
// 商品目录导入引擎 - 引擎层错误类型
// ==========================================
// 分级: 致命错误向调用方抛出; 行级错误收敛到 ImportResult.errors
// 工具: thiserror 派生宏
// ==========================================

use crate::repository::error::RepositoryError;
use thiserror::Error;

/// 引擎层错误类型
///
/// # 传播策略
/// - MissingTenantUser / Csv / Io: 运行级致命错误，整个导入中止
/// - InvalidNumber / MissingField: 行级可恢复错误，由 importer 捕获后跳过该行
/// - Repository: 行内发生时按行级处理，行外（播种/前置校验）按致命处理
#[derive(Error, Debug)]
pub enum ImportError {
    // ===== 致命/前置条件错误 =====
    #[error("租户无可用用户: tenant_id={tenant_id}")]
    MissingTenantUser { tenant_id: String },

    #[error("CSV 解析失败: {0}")]
    Csv(#[from] csv::Error),

    #[error("文件读取失败: {0}")]
    Io(#[from] std::io::Error),

    // ===== 行级可恢复错误 =====
    #[error("数值字段非法 (field={field}): {value}")]
    InvalidNumber { field: String, value: String },

    #[error("必填字段缺失: {0}")]
    MissingField(&'static str),

    // ===== 仓储错误 =====
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
