// ==========================================
// 商品目录导入引擎 - 目录 Repository Trait
// ==========================================
// 职责: 定义目录存储的数据访问接口（Catalog Store 协作方边界）
// 红线: Repository 不含业务规则，只做数据 CRUD
// ==========================================

use crate::domain::catalog::{CatalogEntry, TenantUser, VariationEntry};
use crate::repository::error::RepositoryResult;
use async_trait::async_trait;

// ==========================================
// CatalogRepository Trait
// ==========================================
// 用途: 导入引擎对目录存储的全部访问入口
// 实现者: SqliteCatalogRepository（使用 rusqlite）
// 约束: 引擎逐行 await, 实现方不得跨行持锁
#[async_trait]
pub trait CatalogRepository: Send + Sync {
    // ===== 前置条件校验 =====

    /// 检查租户是否存在至少一个用户
    ///
    /// # 返回
    /// - Ok(true): 租户可用，允许导入
    /// - Ok(false): 致命前置条件失败，整个运行中止
    async fn tenant_user_exists(&self, tenant_id: &str) -> RepositoryResult<bool>;

    /// 插入租户用户
    async fn insert_tenant_user(&self, user: TenantUser) -> RepositoryResult<()>;

    // ===== SKU 序列种子查询 =====

    /// 查询租户下父商品与变体的最大数字 SKU
    ///
    /// # 说明
    /// - 仅统计纯数字 SKU，文本 SKU 忽略
    /// - 用于 Phase 2 之前的序列播种
    ///
    /// # 返回
    /// - Ok(Some(max)): 存在数字 SKU
    /// - Ok(None): 租户下没有数字 SKU
    async fn max_numeric_sku(&self, tenant_id: &str) -> RepositoryResult<Option<u64>>;

    // ===== 父商品匹配与写入 =====

    /// 按商品名查找父商品（匹配顺序第一优先级）
    async fn find_entry_by_name(
        &self,
        tenant_id: &str,
        name: &str,
    ) -> RepositoryResult<Option<CatalogEntry>>;

    /// 按 SKU 查找父商品（单 SKU 行的第二优先级匹配）
    async fn find_entry_by_sku(
        &self,
        tenant_id: &str,
        sku: &str,
    ) -> RepositoryResult<Option<CatalogEntry>>;

    /// 插入父商品
    async fn insert_entry(&self, entry: CatalogEntry) -> RepositoryResult<()>;

    /// 更新父商品（全字段覆盖写）
    async fn update_entry(&self, entry: CatalogEntry) -> RepositoryResult<()>;

    /// 查询租户下全部父商品
    async fn list_entries(&self, tenant_id: &str) -> RepositoryResult<Vec<CatalogEntry>>;

    // ===== 变体匹配与写入 =====

    /// 按 (父商品, sku) 查找变体
    async fn find_variation(
        &self,
        entry_id: &str,
        sku: &str,
    ) -> RepositoryResult<Option<VariationEntry>>;

    /// 插入变体
    async fn insert_variation(&self, variation: VariationEntry) -> RepositoryResult<()>;

    /// 更新变体（价格/库存/轴取值覆盖写）
    async fn update_variation(&self, variation: VariationEntry) -> RepositoryResult<()>;

    /// 查询父商品下全部变体
    async fn list_variations(&self, entry_id: &str) -> RepositoryResult<Vec<VariationEntry>>;
}
