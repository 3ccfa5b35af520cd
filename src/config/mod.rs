// ==========================================
// 商品目录导入引擎 - 运行级配置
// ==========================================
// 职责: 定义单次导入运行的配置项
// 红线: 配置随运行传递，不使用全局/静态可变状态
// ==========================================

/// SKU 序列分配器的默认下限
///
/// 新生成的 SKU 永远严格大于该值，避开人工低位号段
pub const DEFAULT_SKU_FLOOR: u64 = 10_000;

/// 导入运行配置
///
/// # 说明
/// - 按值传入 CatalogImporter，作用域为单次运行
/// - 多租户并发导入时各自持有独立配置
#[derive(Debug, Clone)]
pub struct ImportConfig {
    /// SKU 序列种子下限（分配值严格大于种子）
    pub sku_floor: u64,
    /// 字段分隔符（目录导出为逗号分隔文本）
    pub delimiter: u8,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            sku_floor: DEFAULT_SKU_FLOOR,
            delimiter: b',',
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ImportConfig::default();
        assert_eq!(config.sku_floor, DEFAULT_SKU_FLOOR);
        assert_eq!(config.delimiter, b',');
    }
}
