// ==========================================
// 商品目录导入引擎 - SKU 序列分配器
// ==========================================
// 职责: 两阶段扫描/生成, 产出无冲突的数字 SKU
// Phase 1: 全文件只读预扫描(移位感知), 记录出现过的最大数字 SKU
// Phase 2: 计数器自增生成; 不再回查存储 —— 正确性完全依赖
//          预扫描与种子先于生成完成(O(n) 预扫换 O(1) 无冲突分配)
// 红线: 计数器为运行级状态, 以 &mut 穿透调用链, 严禁静态变量
// ==========================================

use crate::engine::column_shift::recovered_sku_field;
use crate::engine::normalizer::RawRow;
use crate::engine::splitter::split_list;

// ==========================================
// SkuPrescan - Phase 1 预扫描累加器
// ==========================================
/// 流式预扫描: 逐行喂入, 统计行数与最大数字 SKU
///
/// 对每行只恢复 SKU 字段(移位行取 overflow 最高位置列),
/// 逐令牌按整数解析, 非数字令牌忽略
#[derive(Debug, Default)]
pub struct SkuPrescan {
    max_sku: u64,
    rows: usize,
}

impl SkuPrescan {
    pub fn new() -> Self {
        Self::default()
    }

    /// 观察一行（Phase 1 只读, 不修改行）
    pub fn observe(&mut self, row: &RawRow) {
        self.rows += 1;
        for token in split_list(&recovered_sku_field(row)) {
            if let Ok(value) = token.parse::<u64>() {
                self.max_sku = self.max_sku.max(value);
            }
        }
    }

    /// 文件内出现过的最大数字 SKU（没有数字 SKU 时为 0）
    pub fn max_sku(&self) -> u64 {
        self.max_sku
    }

    /// 数据行总数（进度上报的 total）
    pub fn rows(&self) -> usize {
        self.rows
    }
}

// ==========================================
// SkuSequence - Phase 2 序列生成器
// ==========================================
/// 运行级单调递增计数器
///
/// # 不变式
/// - 种子 = max(文件内最大数字 SKU, 存量最大数字 SKU, 固定下限)
/// - 每次分配的值严格大于种子和本运行所有已分配值
#[derive(Debug)]
pub struct SkuSequence {
    current: u64,
}

impl SkuSequence {
    /// 以种子创建序列（首次分配值为 seed + 1）
    pub fn seeded(seed: u64) -> Self {
        Self { current: seed }
    }

    /// 分配下一个 SKU（文本形式返回, 与存储口径一致）
    pub fn next_sku(&mut self) -> String {
        self.current += 1;
        self.current.to_string()
    }

    /// 当前计数器值（最近一次分配值, 或种子）
    pub fn current(&self) -> u64 {
        self.current
    }
}
