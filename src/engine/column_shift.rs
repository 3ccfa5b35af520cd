// ==========================================
// 商品目录导入引擎 - 列移位检测与修复
// ==========================================
// 问题: 价格字段中的未加引号小数逗号被当作分隔符,
//       导致该行从货币列起整体左移一位, SKU 被挤入无名尾随列
// 职责: 纯谓词 + 纯修复函数, 与文件 IO 解耦, 可独立单测
// 说明: 检测是启发式窄匹配, 误检行会被静默"修复"(已接受的风险)
// ==========================================

use crate::engine::normalizer::{columns, RawRow};

/// 判断一行是否发生列移位
///
/// # 检测规则（两个条件同时满足才算移位）
/// - 货币列里是全数字令牌（价格的小数部分落进来了）
/// - 库存列里是 3 个大写字母（货币码落进来了）
///
/// 规则刻意收窄, 避免对格式正常的行产生误报
pub fn is_shifted(row: &RawRow) -> bool {
    let currency = row.get(columns::CURRENCY_CODE);
    let quantity = row.get(columns::QUANTITY);

    let currency_is_digits =
        !currency.is_empty() && currency.chars().all(|c| c.is_ascii_digit());
    let quantity_is_currency_code =
        quantity.len() == 3 && quantity.chars().all(|c| c.is_ascii_uppercase());

    currency_is_digits && quantity_is_currency_code
}

/// 撤销一行的列移位
///
/// # 修复内容
/// - 还原真实价格: price + "," + currency（恢复小数分隔符）
/// - 自货币列起逐字段左移回位（库存 ← 标签旧槽位, 标签 ← 材质旧槽位, ...）
/// - 从最高位置的 overflow 列恢复真实 SKU 清单,
///   覆盖名义 SKU 列里现在已经错位的值
///
/// # 前置条件
/// - 调用方已用 is_shifted 判定; 对未移位行调用会破坏该行
pub fn correct_shift(row: &mut RawRow) {
    let old_price = row.get(columns::PRICE).to_string();
    let old_currency = row.get(columns::CURRENCY_CODE).to_string();
    let old_quantity = row.get(columns::QUANTITY).to_string();
    let old_tags = row.get(columns::TAGS).to_string();
    let old_materials = row.get(columns::MATERIALS).to_string();
    let old_image1 = row.get(columns::IMAGE1).to_string();
    let old_variation1_type = row.get(columns::VARIATION1_TYPE).to_string();
    let old_variation2_type = row.get(columns::VARIATION2_TYPE).to_string();
    let old_sku = row.get(columns::SKU).to_string();

    row.set(columns::PRICE, format!("{old_price},{old_currency}"));
    row.set(columns::CURRENCY_CODE, old_quantity);
    row.set(columns::QUANTITY, old_tags);
    row.set(columns::TAGS, old_materials);
    row.set(columns::MATERIALS, old_image1);
    row.set(columns::IMAGE1, old_variation1_type);
    row.set(columns::VARIATION1_VALUES, old_variation2_type);
    row.set(columns::VARIATION2_VALUES, old_sku);

    // overflow 最高位置列为权威 SKU 来源
    if let Some(last) = row.overflow.last() {
        let sku = last.clone();
        row.set(columns::SKU, sku);
    }
}

/// 恢复一行的真实 SKU 字段（只读, 供 Phase 1 预扫描使用）
///
/// 移位行取最高位置 overflow 列, 正常行取名义 SKU 列
pub fn recovered_sku_field(row: &RawRow) -> String {
    if is_shifted(row) {
        if let Some(last) = row.overflow.last() {
            return last.clone();
        }
    }
    row.get(columns::SKU).to_string()
}
