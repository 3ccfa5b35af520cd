// ==========================================
// 商品目录导入引擎 - 对账/Upsert 引擎
// ==========================================
// 职责: 把规范化、已修复移位、已切分的行对账到目录存储
// 匹配顺序: (1) 租户内同名父商品; (2) 单 SKU 行按 SKU 精确匹配; 无匹配则新建
// 红线: 行内先解析后写入 —— 失败行整行跳过, 不得半写
// 说明: 本引擎从不删除变体（陈旧变体保留为文档化的已知限制）
// ==========================================

use crate::domain::catalog::{CatalogEntry, VariationEntry};
use crate::domain::types::UpsertOutcome;
use crate::engine::error::ImportError;
use crate::engine::normalizer::{columns, RawRow};
use crate::engine::sku_allocator::SkuSequence;
use crate::engine::splitter::{split_row, VariationTuple};
use crate::repository::catalog_repo::CatalogRepository;
use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

// ==========================================
// 字段解析辅助
// ==========================================

/// 解析价格（接受逗号作为小数分隔符: "12,99" → 12.99）
fn parse_price(raw: &str) -> Result<f64, ImportError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ImportError::MissingField(columns::PRICE));
    }
    trimmed
        .replace(',', ".")
        .parse::<f64>()
        .map_err(|_| ImportError::InvalidNumber {
            field: columns::PRICE.to_string(),
            value: raw.to_string(),
        })
}

/// 解析库存令牌（空令牌视为 0）
fn parse_stock(raw: &str) -> Result<i64, ImportError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(0);
    }
    trimmed
        .parse::<i64>()
        .map_err(|_| ImportError::InvalidNumber {
            field: columns::QUANTITY.to_string(),
            value: raw.to_string(),
        })
}

/// 非空修剪值（空串 → None）
fn opt(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

// ==========================================
// 父 SKU 决策规则
// ==========================================
/// 决定本行父商品的 SKU（分配器是新值的唯一来源）
///
/// # 规则
/// - 行含 ≥2 个变体 SKU: 既有父商品的 SKU 与行内所有变体 SKU 都不同则沿用,
///   否则分配新值（阻断遗留的父子同 SKU 冲突继续扩散,
///   也保证新建变体商品的父 SKU 永不与自家子 SKU 相同）
/// - 行只有一个 SKU: 有既有父商品则沿用其 SKU;
///   否则直接使用行内的单个令牌; 令牌也没有时分配新值
pub(crate) fn choose_parent_sku(
    existing: Option<&CatalogEntry>,
    skus: &[String],
    seq: &mut SkuSequence,
) -> String {
    if skus.len() >= 2 {
        match existing {
            Some(entry) if !skus.iter().any(|s| s == &entry.sku) => entry.sku.clone(),
            _ => seq.next_sku(),
        }
    } else {
        match existing {
            Some(entry) => entry.sku.clone(),
            None => skus
                .first()
                .cloned()
                .unwrap_or_else(|| seq.next_sku()),
        }
    }
}

// ==========================================
// ReconciliationEngine
// ==========================================
/// 对账引擎
///
/// # 职责
/// 1. 匹配既有父商品（按名, 再按单 SKU）
/// 2. 依据 SKU 决策规则计算父 SKU（创建与更新都覆盖写, 允许自愈）
/// 3. 父商品全字段覆盖写
/// 4. 变体按 (父商品, sku) upsert, 从不删除
pub struct ReconciliationEngine<R: ?Sized>
where
    R: CatalogRepository,
{
    repo: Arc<R>,
}

impl<R: ?Sized> ReconciliationEngine<R>
where
    R: CatalogRepository,
{
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    /// 对账一行（含该行全部变体）
    ///
    /// # 参数
    /// - tenant_id: 租户标识
    /// - row: 已规范化、已修复移位的数据行
    /// - seq: 运行级 SKU 序列（&mut 穿透）
    ///
    /// # 返回
    /// - Ok(UpsertOutcome): 父商品是新建还是更新
    /// - Err: 行级错误（调用方捕获后跳过该行）
    pub async fn reconcile_row(
        &self,
        tenant_id: &str,
        row: &RawRow,
        seq: &mut SkuSequence,
    ) -> Result<UpsertOutcome, ImportError> {
        let name = row.get(columns::TITLE).trim().to_string();
        if name.is_empty() {
            return Err(ImportError::MissingField(columns::TITLE));
        }

        let split = split_row(row);

        // === 步骤 1: 先解析全部数值字段（失败则整行跳过, 不触碰存储）===
        let price = parse_price(row.get(columns::PRICE))?;

        let variations: Vec<(VariationTuple, i64)> = if split.is_variated() {
            split
                .tuples()
                .into_iter()
                .map(|t| parse_stock(&t.stock).map(|stock| (t, stock)))
                .collect::<Result<_, _>>()?
        } else {
            Vec::new()
        };

        let total_stock: i64 = if split.is_variated() {
            variations.iter().map(|(_, stock)| stock).sum()
        } else {
            split
                .stocks
                .iter()
                .map(|s| parse_stock(s))
                .sum::<Result<i64, _>>()?
        };

        // === 步骤 2: 匹配既有父商品 ===
        let mut existing = self.repo.find_entry_by_name(tenant_id, &name).await?;
        if existing.is_none() && split.skus.len() == 1 {
            existing = self
                .repo
                .find_entry_by_sku(tenant_id, &split.skus[0])
                .await?;
        }

        // === 步骤 3: 父 SKU 决策 ===
        let sku = choose_parent_sku(existing.as_ref(), &split.skus, seq);

        // === 步骤 4: 父商品覆盖写 ===
        let now = Utc::now();
        let (entry_id, created_at, outcome) = match &existing {
            Some(entry) => (entry.id.clone(), entry.created_at, UpsertOutcome::Updated),
            None => (
                Uuid::new_v4().to_string(),
                now,
                UpsertOutcome::Created,
            ),
        };

        let entry = CatalogEntry {
            id: entry_id.clone(),
            tenant_id: tenant_id.to_string(),
            sku,
            name,
            description: opt(row.get(columns::DESCRIPTION)),
            price,
            quantity: total_stock,
            tags: opt(row.get(columns::TAGS)),
            materials: opt(row.get(columns::MATERIALS)),
            image: opt(row.get(columns::IMAGE1)),
            axis1_name: opt(row.get(columns::VARIATION1_TYPE)),
            axis1_label: opt(row.get(columns::VARIATION1_NAME)),
            axis2_name: opt(row.get(columns::VARIATION2_TYPE)),
            axis2_label: opt(row.get(columns::VARIATION2_NAME)),
            created_at,
            updated_at: now,
        };

        let axis1_label = entry.axis1_label.clone();
        let axis2_label = entry.axis2_label.clone();

        match outcome {
            UpsertOutcome::Created => self.repo.insert_entry(entry).await?,
            UpsertOutcome::Updated => self.repo.update_entry(entry).await?,
        }

        // === 步骤 5: 变体 upsert（仅 ≥2 SKU 的变体行）===
        for (tuple, stock) in variations {
            match self.repo.find_variation(&entry_id, &tuple.sku).await? {
                Some(mut variation) => {
                    variation.price = price;
                    variation.quantity = stock;
                    variation.axis1_label = axis1_label.clone();
                    variation.axis1_value = tuple.value1;
                    variation.axis2_label = axis2_label.clone();
                    variation.axis2_value = tuple.value2;
                    variation.updated_at = now;
                    self.repo.update_variation(variation).await?;
                }
                None => {
                    self.repo
                        .insert_variation(VariationEntry {
                            id: VariationEntry::derive_id(&entry_id, &tuple.sku),
                            entry_id: entry_id.clone(),
                            sku: tuple.sku,
                            price,
                            quantity: stock,
                            axis1_label: axis1_label.clone(),
                            axis1_value: tuple.value1,
                            axis2_label: axis2_label.clone(),
                            axis2_value: tuple.value2,
                            created_at: now,
                            updated_at: now,
                        })
                        .await?;
                }
            }
        }

        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry_with_sku(sku: &str) -> CatalogEntry {
        let now = Utc::now();
        CatalogEntry {
            id: "E1".to_string(),
            tenant_id: "T1".to_string(),
            sku: sku.to_string(),
            name: "Scarf".to_string(),
            description: None,
            price: 0.0,
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
        }
    }

    fn skus(tokens: &[&str]) -> Vec<String> {
        tokens.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_price_accepts_decimal_comma() {
        assert_eq!(parse_price("12,99").unwrap(), 12.99);
        assert_eq!(parse_price("9.50").unwrap(), 9.5);
        assert!(matches!(
            parse_price("abc"),
            Err(ImportError::InvalidNumber { .. })
        ));
        assert!(matches!(
            parse_price(""),
            Err(ImportError::MissingField(_))
        ));
    }

    #[test]
    fn test_parse_stock() {
        assert_eq!(parse_stock(" 7 ").unwrap(), 7);
        assert_eq!(parse_stock("").unwrap(), 0);
        assert!(parse_stock("many").is_err());
    }

    #[test]
    fn test_variated_row_reuses_distinct_existing_sku() {
        let mut seq = SkuSequence::seeded(100);
        let existing = entry_with_sku("42");
        let sku = choose_parent_sku(Some(&existing), &skus(&["10", "11"]), &mut seq);
        assert_eq!(sku, "42");
        // 序列未被消耗
        assert_eq!(seq.current(), 100);
    }

    #[test]
    fn test_variated_row_heals_colliding_parent_sku() {
        // 遗留父商品的 SKU 与自家子 SKU 冲突: 必须换新
        let mut seq = SkuSequence::seeded(100);
        let existing = entry_with_sku("10");
        let sku = choose_parent_sku(Some(&existing), &skus(&["10", "11"]), &mut seq);
        assert_eq!(sku, "101");
    }

    #[test]
    fn test_new_variated_product_gets_fresh_sku() {
        let mut seq = SkuSequence::seeded(100);
        let sku = choose_parent_sku(None, &skus(&["10", "11"]), &mut seq);
        assert_eq!(sku, "101");
    }

    #[test]
    fn test_single_sku_row_uses_own_token() {
        let mut seq = SkuSequence::seeded(100);
        assert_eq!(choose_parent_sku(None, &skus(&["77"]), &mut seq), "77");

        // 既有商品优先沿用其 SKU
        let existing = entry_with_sku("42");
        assert_eq!(
            choose_parent_sku(Some(&existing), &skus(&["77"]), &mut seq),
            "42"
        );

        // 无 SKU 令牌时分配新值
        assert_eq!(choose_parent_sku(None, &[], &mut seq), "101");
    }
}
