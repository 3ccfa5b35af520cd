// ==========================================
// 商品目录导入引擎 - 目录领域模型
// ==========================================
// 职责: 父商品/变体/导入运行的实体定义
// 红线: SKU 以文本存储（外观为数字），比较时不做数值转换
// ==========================================

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ==========================================
// CatalogEntry - 父商品
// ==========================================
// 不变式: 同一租户内, 父商品 sku 不得与任何变体 sku 重复,
//         也不得与其他父商品/变体预留的 sku 重复
// 生命周期: 首次出现商品名(或单 SKU)时创建; 之后每次出现更新; 本引擎不删除
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogEntry {
    // ===== 主键与归属 =====
    pub id: String,        // 实体唯一标识（UUID）
    pub tenant_id: String, // 租户标识
    pub sku: String,       // 父商品 SKU（租户内唯一，文本存储）

    // ===== 基础信息 =====
    pub name: String,                // 商品名称（匹配主键）
    pub description: Option<String>, // 商品描述
    pub price: f64,                  // 基准价格
    pub quantity: i64,               // 聚合库存（变体库存之和，或自身库存）
    pub tags: Option<String>,        // 标签串
    pub materials: Option<String>,   // 材质串
    pub image: Option<String>,       // 首图引用

    // ===== 变体轴定义（最多两个）=====
    pub axis1_name: Option<String>,  // 第一变体轴类型（VARIATION 1 TYPE）
    pub axis1_label: Option<String>, // 第一变体轴显示名（VARIATION 1 NAME）
    pub axis2_name: Option<String>,  // 第二变体轴类型（VARIATION 2 TYPE）
    pub axis2_label: Option<String>, // 第二变体轴显示名（VARIATION 2 NAME）

    // ===== 审计字段 =====
    pub created_at: DateTime<Utc>, // 记录创建时间
    pub updated_at: DateTime<Utc>, // 记录更新时间
}

// ==========================================
// VariationEntry - 变体（子 SKU）
// ==========================================
// 主键: (entry_id, sku) 组合, id 为派生复合标识 "{entry_id}:{sku}"
// 生命周期: SKU 令牌首次出现时创建, 之后更新; 本引擎不删除（文档化的保留行为）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VariationEntry {
    // ===== 主键与关联 =====
    pub id: String,       // 派生复合标识（"{entry_id}:{sku}"）
    pub entry_id: String, // 所属父商品 ID（FK，父删子删）
    pub sku: String,      // 变体 SKU（父商品内唯一）

    // ===== 销售信息 =====
    pub price: f64,    // 变体价格
    pub quantity: i64, // 变体库存

    // ===== 变体轴取值（最多两对）=====
    pub axis1_label: Option<String>, // 第一轴显示名
    pub axis1_value: Option<String>, // 第一轴取值
    pub axis2_label: Option<String>, // 第二轴显示名
    pub axis2_value: Option<String>, // 第二轴取值

    // ===== 审计字段 =====
    pub created_at: DateTime<Utc>, // 记录创建时间
    pub updated_at: DateTime<Utc>, // 记录更新时间
}

impl VariationEntry {
    /// 派生复合标识
    ///
    /// 同一 (父商品, sku) 在多次导入之间保持稳定
    pub fn derive_id(entry_id: &str, sku: &str) -> String {
        format!("{entry_id}:{sku}")
    }
}

// ==========================================
// TenantUser - 租户用户（前置条件校验用）
// ==========================================
// 用途: 导入运行的致命前置条件（租户必须存在至少一个用户）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TenantUser {
    pub id: String,            // 用户唯一标识
    pub tenant_id: String,     // 租户标识
    pub email: Option<String>, // 邮箱（本引擎不使用，仅存储）
}

// ==========================================
// ImportRun - 导入运行聚合（瞬态）
// ==========================================
// 生命周期: 文件导入开始时创建, 文件消费完毕后 finish() 固化为 ImportResult
#[derive(Debug, Clone)]
pub struct ImportRun {
    pub file_name: String,          // 源文件名
    pub started_at: DateTime<Utc>,  // 运行开始时间
    pub rows_seen: usize,           // 已处理行数
    pub created: usize,             // 新建父商品数
    pub updated: usize,             // 更新父商品数
    pub errors: Vec<String>,        // 行级错误消息（有序）
}

impl ImportRun {
    /// 创建新的导入运行
    pub fn new(file_name: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
            started_at: Utc::now(),
            rows_seen: 0,
            created: 0,
            updated: 0,
            errors: Vec::new(),
        }
    }

    /// 记录一条行级错误（跳过该行, 运行继续）
    pub fn record_error(&mut self, row_number: usize, message: impl std::fmt::Display) {
        self.errors.push(format!("row {row_number}: {message}"));
    }

    /// 固化为最终导入结果
    ///
    /// success 语义: 运行完成且无行级错误; 有跳过行时报告部分失败
    pub fn finish(self) -> ImportResult {
        ImportResult {
            success: self.errors.is_empty(),
            products_created: self.created,
            products_updated: self.updated,
            errors: self.errors,
            file_name: self.file_name,
        }
    }
}

// ==========================================
// ImportResult - 导入结果
// ==========================================
// 对齐: 调用方可展示 "N 成功, M 失败" 摘要; 线上格式为 camelCase
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportResult {
    pub success: bool,           // 运行完成且无行级错误
    pub products_created: usize, // 新建父商品数
    pub products_updated: usize, // 更新父商品数
    pub errors: Vec<String>,     // 行级错误消息（有序）
    pub file_name: String,       // 源文件名
}
