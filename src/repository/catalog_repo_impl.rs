// ==========================================
// 商品目录导入引擎 - 目录 Repository 实现 (SQLite)
// ==========================================
// 职责: CatalogRepository 的 rusqlite 实现
// 约束: 所有查询参数化; 唯一约束兜底 SKU 不变式
// ==========================================

use crate::db::open_sqlite_connection;
use crate::domain::catalog::{CatalogEntry, TenantUser, VariationEntry};
use crate::repository::catalog_repo::CatalogRepository;
use crate::repository::error::{RepositoryError, RepositoryResult};
use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::sync::{Arc, Mutex, MutexGuard};

// ==========================================
// 建库 SQL
// ==========================================
// 唯一约束:
// - catalog_entry(tenant_id, sku): 租户内父商品 SKU 唯一
// - variation_entry(entry_id, sku): 父商品内变体 SKU 唯一
const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS tenant_user (
    id         TEXT PRIMARY KEY,
    tenant_id  TEXT NOT NULL,
    email      TEXT
);
CREATE INDEX IF NOT EXISTS idx_tenant_user_tenant ON tenant_user(tenant_id);

CREATE TABLE IF NOT EXISTS catalog_entry (
    id          TEXT PRIMARY KEY,
    tenant_id   TEXT NOT NULL,
    sku         TEXT NOT NULL,
    name        TEXT NOT NULL,
    description TEXT,
    price       REAL NOT NULL DEFAULT 0,
    quantity    INTEGER NOT NULL DEFAULT 0,
    tags        TEXT,
    materials   TEXT,
    image       TEXT,
    axis1_name  TEXT,
    axis1_label TEXT,
    axis2_name  TEXT,
    axis2_label TEXT,
    created_at  TEXT NOT NULL,
    updated_at  TEXT NOT NULL,
    UNIQUE(tenant_id, sku)
);
CREATE INDEX IF NOT EXISTS idx_catalog_entry_name ON catalog_entry(tenant_id, name);

CREATE TABLE IF NOT EXISTS variation_entry (
    id          TEXT PRIMARY KEY,
    entry_id    TEXT NOT NULL REFERENCES catalog_entry(id) ON DELETE CASCADE,
    sku         TEXT NOT NULL,
    price       REAL NOT NULL DEFAULT 0,
    quantity    INTEGER NOT NULL DEFAULT 0,
    axis1_label TEXT,
    axis1_value TEXT,
    axis2_label TEXT,
    axis2_value TEXT,
    created_at  TEXT NOT NULL,
    updated_at  TEXT NOT NULL,
    UNIQUE(entry_id, sku)
);
"#;

// ==========================================
// SqliteCatalogRepository
// ==========================================
pub struct SqliteCatalogRepository {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteCatalogRepository {
    /// 创建新的 Repository 实例（建表幂等）
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)
            .map_err(|e| RepositoryError::DatabaseConnectionError(e.to_string()))?;
        conn.execute_batch(SCHEMA_SQL)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    fn lock(&self) -> RepositoryResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::InternalError(format!("连接锁获取失败: {e}")))
    }

    fn row_to_entry(row: &Row) -> rusqlite::Result<CatalogEntry> {
        Ok(CatalogEntry {
            id: row.get("id")?,
            tenant_id: row.get("tenant_id")?,
            sku: row.get("sku")?,
            name: row.get("name")?,
            description: row.get("description")?,
            price: row.get("price")?,
            quantity: row.get("quantity")?,
            tags: row.get("tags")?,
            materials: row.get("materials")?,
            image: row.get("image")?,
            axis1_name: row.get("axis1_name")?,
            axis1_label: row.get("axis1_label")?,
            axis2_name: row.get("axis2_name")?,
            axis2_label: row.get("axis2_label")?,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }

    fn row_to_variation(row: &Row) -> rusqlite::Result<VariationEntry> {
        Ok(VariationEntry {
            id: row.get("id")?,
            entry_id: row.get("entry_id")?,
            sku: row.get("sku")?,
            price: row.get("price")?,
            quantity: row.get("quantity")?,
            axis1_label: row.get("axis1_label")?,
            axis1_value: row.get("axis1_value")?,
            axis2_label: row.get("axis2_label")?,
            axis2_value: row.get("axis2_value")?,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }
}

#[async_trait]
impl CatalogRepository for SqliteCatalogRepository {
    async fn tenant_user_exists(&self, tenant_id: &str) -> RepositoryResult<bool> {
        let conn = self.lock()?;
        let exists: Option<i64> = conn
            .query_row(
                "SELECT 1 FROM tenant_user WHERE tenant_id = ?1 LIMIT 1",
                params![tenant_id],
                |row| row.get(0),
            )
            .optional()?;
        Ok(exists.is_some())
    }

    async fn insert_tenant_user(&self, user: TenantUser) -> RepositoryResult<()> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO tenant_user (id, tenant_id, email) VALUES (?1, ?2, ?3)",
            params![user.id, user.tenant_id, user.email],
        )?;
        Ok(())
    }

    async fn max_numeric_sku(&self, tenant_id: &str) -> RepositoryResult<Option<u64>> {
        let conn = self.lock()?;
        // 仅统计纯数字 SKU（NOT GLOB '*[^0-9]*' 排除任何非数字字符）
        let max: Option<i64> = conn.query_row(
            r#"
            SELECT MAX(n) FROM (
                SELECT CAST(sku AS INTEGER) AS n FROM catalog_entry
                 WHERE tenant_id = ?1 AND sku != '' AND sku NOT GLOB '*[^0-9]*'
                UNION ALL
                SELECT CAST(v.sku AS INTEGER) AS n FROM variation_entry v
                  JOIN catalog_entry e ON e.id = v.entry_id
                 WHERE e.tenant_id = ?1 AND v.sku != '' AND v.sku NOT GLOB '*[^0-9]*'
            )
            "#,
            params![tenant_id],
            |row| row.get(0),
        )?;
        Ok(max.and_then(|n| u64::try_from(n).ok()))
    }

    async fn find_entry_by_name(
        &self,
        tenant_id: &str,
        name: &str,
    ) -> RepositoryResult<Option<CatalogEntry>> {
        let conn = self.lock()?;
        let entry = conn
            .query_row(
                "SELECT * FROM catalog_entry WHERE tenant_id = ?1 AND name = ?2 LIMIT 1",
                params![tenant_id, name],
                Self::row_to_entry,
            )
            .optional()?;
        Ok(entry)
    }

    async fn find_entry_by_sku(
        &self,
        tenant_id: &str,
        sku: &str,
    ) -> RepositoryResult<Option<CatalogEntry>> {
        let conn = self.lock()?;
        let entry = conn
            .query_row(
                "SELECT * FROM catalog_entry WHERE tenant_id = ?1 AND sku = ?2 LIMIT 1",
                params![tenant_id, sku],
                Self::row_to_entry,
            )
            .optional()?;
        Ok(entry)
    }

    async fn insert_entry(&self, entry: CatalogEntry) -> RepositoryResult<()> {
        let conn = self.lock()?;
        conn.execute(
            r#"
            INSERT INTO catalog_entry (
                id, tenant_id, sku, name, description, price, quantity,
                tags, materials, image,
                axis1_name, axis1_label, axis2_name, axis2_label,
                created_at, updated_at
            ) VALUES (
                ?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16
            )
            "#,
            params![
                entry.id,
                entry.tenant_id,
                entry.sku,
                entry.name,
                entry.description,
                entry.price,
                entry.quantity,
                entry.tags,
                entry.materials,
                entry.image,
                entry.axis1_name,
                entry.axis1_label,
                entry.axis2_name,
                entry.axis2_label,
                entry.created_at,
                entry.updated_at,
            ],
        )?;
        Ok(())
    }

    async fn update_entry(&self, entry: CatalogEntry) -> RepositoryResult<()> {
        let conn = self.lock()?;
        let affected = conn.execute(
            r#"
            UPDATE catalog_entry SET
                sku = ?2, name = ?3, description = ?4, price = ?5, quantity = ?6,
                tags = ?7, materials = ?8, image = ?9,
                axis1_name = ?10, axis1_label = ?11, axis2_name = ?12, axis2_label = ?13,
                updated_at = ?14
            WHERE id = ?1
            "#,
            params![
                entry.id,
                entry.sku,
                entry.name,
                entry.description,
                entry.price,
                entry.quantity,
                entry.tags,
                entry.materials,
                entry.image,
                entry.axis1_name,
                entry.axis1_label,
                entry.axis2_name,
                entry.axis2_label,
                entry.updated_at,
            ],
        )?;
        if affected == 0 {
            return Err(RepositoryError::NotFound {
                entity: "CatalogEntry".to_string(),
                id: entry.id,
            });
        }
        Ok(())
    }

    async fn list_entries(&self, tenant_id: &str) -> RepositoryResult<Vec<CatalogEntry>> {
        let conn = self.lock()?;
        let mut stmt =
            conn.prepare("SELECT * FROM catalog_entry WHERE tenant_id = ?1 ORDER BY name")?;
        let entries = stmt
            .query_map(params![tenant_id], Self::row_to_entry)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(entries)
    }

    async fn find_variation(
        &self,
        entry_id: &str,
        sku: &str,
    ) -> RepositoryResult<Option<VariationEntry>> {
        let conn = self.lock()?;
        let variation = conn
            .query_row(
                "SELECT * FROM variation_entry WHERE entry_id = ?1 AND sku = ?2 LIMIT 1",
                params![entry_id, sku],
                Self::row_to_variation,
            )
            .optional()?;
        Ok(variation)
    }

    async fn insert_variation(&self, variation: VariationEntry) -> RepositoryResult<()> {
        let conn = self.lock()?;
        conn.execute(
            r#"
            INSERT INTO variation_entry (
                id, entry_id, sku, price, quantity,
                axis1_label, axis1_value, axis2_label, axis2_value,
                created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
            "#,
            params![
                variation.id,
                variation.entry_id,
                variation.sku,
                variation.price,
                variation.quantity,
                variation.axis1_label,
                variation.axis1_value,
                variation.axis2_label,
                variation.axis2_value,
                variation.created_at,
                variation.updated_at,
            ],
        )?;
        Ok(())
    }

    async fn update_variation(&self, variation: VariationEntry) -> RepositoryResult<()> {
        let conn = self.lock()?;
        let affected = conn.execute(
            r#"
            UPDATE variation_entry SET
                price = ?2, quantity = ?3,
                axis1_label = ?4, axis1_value = ?5, axis2_label = ?6, axis2_value = ?7,
                updated_at = ?8
            WHERE id = ?1
            "#,
            params![
                variation.id,
                variation.price,
                variation.quantity,
                variation.axis1_label,
                variation.axis1_value,
                variation.axis2_label,
                variation.axis2_value,
                variation.updated_at,
            ],
        )?;
        if affected == 0 {
            return Err(RepositoryError::NotFound {
                entity: "VariationEntry".to_string(),
                id: variation.id,
            });
        }
        Ok(())
    }

    async fn list_variations(&self, entry_id: &str) -> RepositoryResult<Vec<VariationEntry>> {
        let conn = self.lock()?;
        let mut stmt =
            conn.prepare("SELECT * FROM variation_entry WHERE entry_id = ?1 ORDER BY sku")?;
        let variations = stmt
            .query_map(params![entry_id], Self::row_to_variation)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(variations)
    }
}
