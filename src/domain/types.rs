// ==========================================
// 商品目录导入引擎 - 领域类型定义
// ==========================================
// 职责: 定义跨层共享的枚举类型
// ==========================================

use serde::{Deserialize, Serialize};

// ==========================================
// ProgressState - 导入进度状态
// ==========================================
// 用途: 进度快照的状态机（IDLE → PROCESSING → COMPLETED/ERROR）
// 对齐: 进度轮询接口的线上格式（全大写）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProgressState {
    /// 空闲（尚未开始导入）
    Idle,
    /// 处理中（逐行对账阶段）
    Processing,
    /// 已完成
    Completed,
    /// 运行级错误终止
    Error,
}

// ==========================================
// UpsertOutcome - 对账结果
// ==========================================
// 用途: Reconciliation Engine 对单行的父商品处理结论
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    /// 新建父商品
    Created,
    /// 更新既有父商品
    Updated,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_state_serialization() {
        // 线上格式要求全大写状态值
        let json = serde_json::to_string(&ProgressState::Processing).unwrap();
        assert_eq!(json, "\"PROCESSING\"");
        let json = serde_json::to_string(&ProgressState::Error).unwrap();
        assert_eq!(json, "\"ERROR\"");
    }
}
