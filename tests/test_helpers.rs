// ==========================================
// 测试辅助函数
// ==========================================
// 职责: 提供测试所需的数据库初始化、目录文件生成、导入器装配
// ==========================================

#![allow(dead_code)]

use catalog_import_engine::config::ImportConfig;
use catalog_import_engine::domain::catalog::{CatalogEntry, TenantUser, VariationEntry};
use catalog_import_engine::engine::{CatalogImporter, ImportProgressStore};
use catalog_import_engine::repository::catalog_repo::CatalogRepository;
use catalog_import_engine::repository::catalog_repo_impl::SqliteCatalogRepository;
use chrono::Utc;
use std::error::Error;
use std::sync::Arc;
use tempfile::{NamedTempFile, TempDir};
use uuid::Uuid;

/// 目录导出文件的标准表头（15 命名列）
pub const CATALOG_HEADER: &str = "TITLE,DESCRIPTION,PRICE,CURRENCY CODE,QUANTITY,TAGS,MATERIALS,IMAGE1,VARIATION 1 TYPE,VARIATION 1 NAME,VARIATION 1 VALUES,VARIATION 2 TYPE,VARIATION 2 NAME,VARIATION 2 VALUES,SKU";

/// 创建临时测试数据库并初始化 schema
///
/// # 返回
/// - NamedTempFile: 临时数据库文件（需要保持存活）
/// - Arc<SqliteCatalogRepository>: 已初始化的仓储
pub fn create_test_repo() -> Result<(NamedTempFile, Arc<SqliteCatalogRepository>), Box<dyn Error>> {
    let temp_file = NamedTempFile::new()?;
    let db_path = temp_file
        .path()
        .to_str()
        .ok_or("temp path is not valid UTF-8")?
        .to_string();

    let repo = SqliteCatalogRepository::new(&db_path)?;
    Ok((temp_file, Arc::new(repo)))
}

/// 为租户写入一个用户（满足导入的致命前置条件）
pub async fn seed_tenant_user(
    repo: &SqliteCatalogRepository,
    tenant_id: &str,
) -> Result<(), Box<dyn Error>> {
    repo.insert_tenant_user(TenantUser {
        id: Uuid::new_v4().to_string(),
        tenant_id: tenant_id.to_string(),
        email: Some(format!("user@{tenant_id}.test")),
    })
    .await?;
    Ok(())
}

/// 预置一个既有父商品（仅填充匹配相关字段）
pub async fn seed_entry(
    repo: &SqliteCatalogRepository,
    tenant_id: &str,
    name: &str,
    sku: &str,
) -> Result<String, Box<dyn Error>> {
    let now = Utc::now();
    let id = Uuid::new_v4().to_string();
    repo.insert_entry(CatalogEntry {
        id: id.clone(),
        tenant_id: tenant_id.to_string(),
        sku: sku.to_string(),
        name: name.to_string(),
        description: None,
        price: 1.0,
        quantity: 0,
        tags: None,
        materials: None,
        image: None,
        axis1_name: None,
        axis1_label: None,
        axis2_name: None,
        axis2_label: None,
        created_at: now,
        updated_at: now,
    })
    .await?;
    Ok(id)
}

/// 为既有父商品预置一个变体（仅填充匹配相关字段）
pub async fn seed_variation(
    repo: &SqliteCatalogRepository,
    entry_id: &str,
    sku: &str,
) -> Result<(), Box<dyn Error>> {
    let now = Utc::now();
    repo.insert_variation(VariationEntry {
        id: VariationEntry::derive_id(entry_id, sku),
        entry_id: entry_id.to_string(),
        sku: sku.to_string(),
        price: 1.0,
        quantity: 0,
        axis1_label: None,
        axis1_value: None,
        axis2_label: None,
        axis2_value: None,
        created_at: now,
        updated_at: now,
    })
    .await?;
    Ok(())
}

/// 把数据行写成目录导出文件（自动加表头）, 返回文件路径
///
/// 导入器会在运行结束后删除该文件, 因此写在 TempDir 下
pub fn write_catalog_file(
    dir: &TempDir,
    file_name: &str,
    rows: &[&str],
) -> Result<String, Box<dyn Error>> {
    let path = dir.path().join(file_name);
    let mut content = String::from(CATALOG_HEADER);
    for row in rows {
        content.push('\n');
        content.push_str(row);
    }
    content.push('\n');
    std::fs::write(&path, content)?;
    Ok(path.to_str().ok_or("temp path is not valid UTF-8")?.to_string())
}

/// 装配测试用导入器（默认配置 + 内存进度存储）
pub fn create_test_importer(
    repo: Arc<SqliteCatalogRepository>,
    progress: Arc<ImportProgressStore>,
) -> CatalogImporter<SqliteCatalogRepository, ImportProgressStore> {
    CatalogImporter::new(repo, progress, ImportConfig::default())
}
