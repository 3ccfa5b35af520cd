// ==========================================
// 商品目录导入引擎 - 多值字段切分器
// ==========================================
// 职责: 把逗号拼接的 SKU/库存/变体取值串切成按位置对齐的平行列表
// 对齐规则: SKU 第 i 个令牌 ↔ 库存第 i 个令牌 ↔ 各变体取值第 i 个令牌
//           (取值列表较短时回落到第 0 个令牌, 表示整轴共享单值)
// ==========================================

use crate::engine::normalizer::{columns, RawRow};

/// 按逗号切分并去除令牌两侧空白（空令牌丢弃）
///
/// 仅用于 SKU 清单: SKU 令牌数决定展开基数, 空槽位无意义
pub fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(str::to_string)
        .collect()
}

/// 按逗号切分并去除令牌两侧空白（空令牌保留占位）
///
/// 用于库存与变体取值清单: 中间空槽位必须占住位置,
/// 否则其后所有令牌整体左移一位, 与 SKU 错配
pub fn split_list_positional(raw: &str) -> Vec<String> {
    if raw.trim().is_empty() {
        return Vec::new();
    }
    raw.split(',').map(|token| token.trim().to_string()).collect()
}

// ==========================================
// SplitRow - 切分后的平行列表
// ==========================================
#[derive(Debug, Clone)]
pub struct SplitRow {
    pub skus: Vec<String>,    // SKU 令牌列表
    pub stocks: Vec<String>,  // 库存令牌列表（与 skus 按位置对齐）
    pub values1: Vec<String>, // 第一变体轴取值列表
    pub values2: Vec<String>, // 第二变体轴取值列表
}

/// 变体展开元组（父商品下一个变体的全部输入）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariationTuple {
    pub sku: String,
    pub stock: String,
    pub value1: Option<String>,
    pub value2: Option<String>,
}

impl SplitRow {
    /// 是否为变体商品（≥2 个 SKU 令牌才展开子变体）
    ///
    /// 单 SKU 行是普通商品: 不产出变体, 否则父 SKU 会与唯一子 SKU 冲突
    pub fn is_variated(&self) -> bool {
        self.skus.len() >= 2
    }

    /// 展开为按位置对齐的变体元组
    ///
    /// - 库存列表缺位或空槽位补 "0"
    /// - 取值列表较短时回落到第 0 个令牌（整轴共享单值）
    pub fn tuples(&self) -> Vec<VariationTuple> {
        self.skus
            .iter()
            .enumerate()
            .map(|(i, sku)| VariationTuple {
                sku: sku.clone(),
                stock: match self.stocks.get(i) {
                    Some(token) if !token.is_empty() => token.clone(),
                    _ => "0".to_string(),
                },
                value1: aligned_value(&self.values1, i),
                value2: aligned_value(&self.values2, i),
            })
            .collect()
    }
}

/// 位置对齐取值: 第 i 个令牌, 列表较短时回落到第 0 个
///
/// 空槽位表示该位置无取值, 不触发回落
fn aligned_value(values: &[String], i: usize) -> Option<String> {
    let token = values.get(i).or_else(|| values.first())?;
    if token.is_empty() {
        None
    } else {
        Some(token.clone())
    }
}

/// 切分一行（已规范化、已修复移位）的多值字段
pub fn split_row(row: &RawRow) -> SplitRow {
    SplitRow {
        skus: split_list(row.get(columns::SKU)),
        stocks: split_list_positional(row.get(columns::QUANTITY)),
        values1: split_list_positional(row.get(columns::VARIATION1_VALUES)),
        values2: split_list_positional(row.get(columns::VARIATION2_VALUES)),
    }
}
