// ==========================================
// 商品目录导入引擎 - 行规范化器 (Row Normalizer)
// ==========================================
// 职责: 修复表头/取值的编码残缺, 把字段名规范为标准列名
// 约束: 幂等 —— 已规范的行再过一遍必须是 no-op
// 说明: 无错误分支; 缺失的列保持缺失
// ==========================================

use std::collections::HashMap;
use std::fs::File;

// ==========================================
// 标准列名
// ==========================================
// 目录导出的命名列; 其后出现的无名尾随列为 overflow 列(见 column_shift)
pub mod columns {
    pub const TITLE: &str = "TITLE";
    pub const DESCRIPTION: &str = "DESCRIPTION";
    pub const PRICE: &str = "PRICE";
    pub const CURRENCY_CODE: &str = "CURRENCY_CODE";
    pub const QUANTITY: &str = "QUANTITY";
    pub const TAGS: &str = "TAGS";
    pub const MATERIALS: &str = "MATERIALS";
    pub const IMAGE1: &str = "IMAGE1";
    pub const VARIATION1_TYPE: &str = "VARIATION 1 TYPE";
    pub const VARIATION1_NAME: &str = "VARIATION 1 NAME";
    pub const VARIATION1_VALUES: &str = "VARIATION 1 VALUES";
    pub const VARIATION2_TYPE: &str = "VARIATION 2 TYPE";
    pub const VARIATION2_NAME: &str = "VARIATION 2 NAME";
    pub const VARIATION2_VALUES: &str = "VARIATION 2 VALUES";
    pub const SKU: &str = "SKU";
}

// ==========================================
// 编码修复表
// ==========================================

/// 已知的 UTF-8 双重解码残缺序列 → 标准字符
///
/// 替换后的字符不再含任何键序列, 因此替换天然幂等
const MOJIBAKE_TABLE: &[(&str, &str)] = &[
    ("Ã¤", "ä"),
    ("Ã¶", "ö"),
    ("Ã¼", "ü"),
    ("Ã„", "Ä"),
    ("Ã–", "Ö"),
    ("Ãœ", "Ü"),
    ("ÃŸ", "ß"),
    ("Ã©", "é"),
    ("Ã¨", "è"),
    ("Ã¡", "á"),
    ("â‚¬", "€"),
    ("â€“", "–"),
    ("â€™", "’"),
];

/// BOM 残缺前缀（与首列表头黏连出现）
const BOM_PREFIXES: &[&str] = &["\u{feff}", "ï»¿"];

/// 已知的完整残缺表头 → 标准表头
///
/// 字符级修复覆盖不到的整头替换（历史导出工具的变体写法）
const HEADER_REPLACEMENTS: &[(&str, &str)] = &[
    ("CURRENCY CODE", "CURRENCY_CODE"),
    ("CURRENCYCODE", "CURRENCY_CODE"),
    ("IMAGE 1", "IMAGE1"),
    ("VARIATION 1 VALUE", "VARIATION 1 VALUES"),
    ("VARIATION 2 VALUE", "VARIATION 2 VALUES"),
];

/// 修复取值中的编码残缺
pub fn normalize_value(raw: &str) -> String {
    let mut value = raw.to_string();
    for (broken, fixed) in MOJIBAKE_TABLE {
        if value.contains(broken) {
            value = value.replace(broken, fixed);
        }
    }
    value
}

/// 把原始表头规范为标准列名
///
/// # 流程
/// 1. 去除黏连的 BOM 残缺前缀
/// 2. 字符级编码修复
/// 3. 去空白 + 大写（大小写容忍）
/// 4. 整头替换表兜底
pub fn normalize_header(raw: &str) -> String {
    let mut header = raw;
    for prefix in BOM_PREFIXES {
        if let Some(stripped) = header.strip_prefix(prefix) {
            header = stripped;
        }
    }

    let mut header = normalize_value(header).trim().to_uppercase();
    for (broken, canonical) in HEADER_REPLACEMENTS {
        if header == *broken {
            header = (*canonical).to_string();
            break;
        }
    }
    header
}

/// 规范化整行映射（表头键 + 取值）
///
/// 已规范的行过一遍为 no-op
pub fn normalize_row(fields: HashMap<String, String>) -> HashMap<String, String> {
    fields
        .into_iter()
        .map(|(k, v)| (normalize_header(&k), normalize_value(&v)))
        .collect()
}

// ==========================================
// RawRow - 规范化后的数据行
// ==========================================
/// 一条规范化后的目录数据行
///
/// - fields: 标准列名 → 取值
/// - overflow: 表头未命名的尾随列（按位置有序, 移位行的语义载体）
/// - row_number: 文件内行号（表头为第 1 行, 数据行从 2 起）
#[derive(Debug, Clone, Default)]
pub struct RawRow {
    pub fields: HashMap<String, String>,
    pub overflow: Vec<String>,
    pub row_number: usize,
}

impl RawRow {
    /// 读取字段值（缺失视为空串）
    pub fn get(&self, column: &str) -> &str {
        self.fields.get(column).map(String::as_str).unwrap_or("")
    }

    /// 写入字段值
    pub fn set(&mut self, column: &str, value: impl Into<String>) {
        self.fields.insert(column.to_string(), value.into());
    }
}

// ==========================================
// RowReader - 目录文件读取器
// ==========================================
/// 流式读取目录导出文件, 产出规范化的 RawRow
///
/// # 说明
/// - flexible 模式: 行宽允许超过表头宽度（移位行会多出尾随列）
/// - 表头在 open 时一次性规范化
pub struct RowReader {
    reader: csv::Reader<File>,
    headers: Vec<String>,
    next_row_number: usize,
}

impl RowReader {
    /// 打开目录文件
    ///
    /// # 参数
    /// - path: 本地文件路径
    /// - delimiter: 字段分隔符
    pub fn open(path: &str, delimiter: u8) -> Result<Self, csv::Error> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .delimiter(delimiter)
            .from_path(path)?;

        let headers = reader
            .headers()?
            .iter()
            .map(normalize_header)
            .collect::<Vec<_>>();

        Ok(Self {
            reader,
            headers,
            next_row_number: 2, // 行号从1开始, 且跳过header
        })
    }

    /// 表头列数（命名列的宽度）
    pub fn header_width(&self) -> usize {
        self.headers.len()
    }

    fn record_to_row(&self, record: &csv::StringRecord, row_number: usize) -> RawRow {
        let mut fields = HashMap::with_capacity(self.headers.len());
        let mut overflow = Vec::new();

        for (idx, value) in record.iter().enumerate() {
            let value = normalize_value(value);
            match self.headers.get(idx) {
                Some(header) => {
                    fields.insert(header.clone(), value);
                }
                // 表头未覆盖的尾随列按位置保留
                None => overflow.push(value),
            }
        }

        RawRow {
            fields,
            overflow,
            row_number,
        }
    }
}

impl Iterator for RowReader {
    type Item = Result<RawRow, csv::Error>;

    fn next(&mut self) -> Option<Self::Item> {
        let mut record = csv::StringRecord::new();
        match self.reader.read_record(&mut record) {
            Ok(false) => None,
            Ok(true) => {
                let row_number = self.next_row_number;
                self.next_row_number += 1;
                Some(Ok(self.record_to_row(&record, row_number)))
            }
            Err(err) => {
                self.next_row_number += 1;
                Some(Err(err))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_normalize_value_fixes_mojibake() {
        assert_eq!(normalize_value("GrÃ¼ne MÃ¼tze"), "Grüne Mütze");
        assert_eq!(normalize_value("12,99 â‚¬"), "12,99 €");
        // 已修复的取值不再变化
        assert_eq!(normalize_value("Grüne Mütze"), "Grüne Mütze");
    }

    #[test]
    fn test_normalize_header_strips_bom() {
        assert_eq!(normalize_header("\u{feff}TITLE"), "TITLE");
        assert_eq!(normalize_header("ï»¿TITLE"), "TITLE");
        assert_eq!(normalize_header("title"), "TITLE");
        assert_eq!(normalize_header("Currency Code"), "CURRENCY_CODE");
        assert_eq!(normalize_header("VARIATION 1 VALUE"), "VARIATION 1 VALUES");
    }

    #[test]
    fn test_normalize_row_idempotent() {
        let mut fields = HashMap::new();
        fields.insert("ï»¿TITLE".to_string(), "MÃ¼tze".to_string());
        fields.insert("sku".to_string(), "10001".to_string());

        let once = normalize_row(fields);
        let twice = normalize_row(once.clone());
        assert_eq!(once, twice);
        assert_eq!(once.get("TITLE").map(String::as_str), Some("Mütze"));
        assert_eq!(once.get("SKU").map(String::as_str), Some("10001"));
    }

    #[test]
    fn test_row_reader_collects_overflow() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "TITLE,PRICE,SKU").unwrap();
        writeln!(file, "Scarf,9.50,10001").unwrap();
        // 行宽超过表头: 多出的两列进入 overflow
        writeln!(file, "Hat,12,99,10002").unwrap();
        file.flush().unwrap();

        let reader = RowReader::open(file.path().to_str().unwrap(), b',').unwrap();
        let rows: Vec<RawRow> = reader.map(|r| r.unwrap()).collect();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].get(columns::TITLE), "Scarf");
        assert!(rows[0].overflow.is_empty());
        assert_eq!(rows[0].row_number, 2);

        assert_eq!(rows[1].get(columns::SKU), "99");
        assert_eq!(rows[1].overflow, vec!["10002".to_string()]);
        assert_eq!(rows[1].row_number, 3);
    }
}
