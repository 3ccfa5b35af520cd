// ==========================================
// 商品目录导入引擎 - 进度上报
// ==========================================
// 职责: 定义进度上报 trait, 实现依赖倒置
// 说明: Engine 层定义 trait; 轮询端点读取进度存储, 其生命周期不归引擎管
// 约束: 按租户独立键, 多租户并发上报必须安全
// ==========================================

use crate::domain::types::ProgressState;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

// ==========================================
// ProgressSnapshot - 进度快照
// ==========================================
/// 单个租户的导入进度快照（轮询端点的线上格式）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressSnapshot {
    /// 状态机: IDLE → PROCESSING → COMPLETED/ERROR
    pub state: ProgressState,
    /// 完成百分比 0-100
    pub progress: u8,
    /// 数据行总数（Phase 1 预扫描统计）
    pub total: usize,
    /// 已处理行数
    pub current: usize,
    /// 当前条目的人读标签
    pub message: String,
    /// 运行级错误消息（仅 ERROR 状态）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Default for ProgressSnapshot {
    fn default() -> Self {
        Self {
            state: ProgressState::Idle,
            progress: 0,
            total: 0,
            current: 0,
            message: String::new(),
            error: None,
        }
    }
}

// ==========================================
// ProgressReporter Trait
// ==========================================
/// 进度上报者 Trait
///
/// 引擎在每行处理后推送离散事件: start / increment / complete / error。
/// 引擎只负责推送, 不管理存储端的生命周期
pub trait ProgressReporter: Send + Sync {
    /// 运行开始（total = 数据行总数）
    fn start(&self, tenant_id: &str, total: usize);

    /// 一行处理完毕（current 单调递增, message 为当前条目标签）
    fn increment(&self, tenant_id: &str, current: usize, message: &str);

    /// 运行完成（附带最终计数）
    fn complete(&self, tenant_id: &str, created: usize, updated: usize);

    /// 运行级错误终止
    fn error(&self, tenant_id: &str, message: &str);
}

// ==========================================
// NoOpProgressReporter - 空操作上报者
// ==========================================
/// 用于不需要进度上报的场景（如单元测试）
#[derive(Debug, Clone, Default)]
pub struct NoOpProgressReporter;

impl ProgressReporter for NoOpProgressReporter {
    fn start(&self, tenant_id: &str, total: usize) {
        tracing::debug!("NoOpProgressReporter: 跳过进度上报 - tenant={tenant_id}, total={total}");
    }

    fn increment(&self, _tenant_id: &str, _current: usize, _message: &str) {}

    fn complete(&self, tenant_id: &str, created: usize, updated: usize) {
        tracing::debug!(
            "NoOpProgressReporter: 跳过完成上报 - tenant={tenant_id}, created={created}, updated={updated}"
        );
    }

    fn error(&self, _tenant_id: &str, _message: &str) {}
}

// ==========================================
// ImportProgressStore - 租户键进度存储
// ==========================================
/// 内存态进度存储（租户 ID → 快照）
///
/// # 并发
/// - RwLock 保护; 不同租户的并发导入写各自的键, 互不干扰
/// - 引擎仅调用 ProgressReporter 面; 轮询端点用 snapshot() 读取
#[derive(Clone, Default)]
pub struct ImportProgressStore {
    sessions: Arc<RwLock<HashMap<String, ProgressSnapshot>>>,
}

impl ImportProgressStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 读取租户当前进度快照
    pub fn snapshot(&self, tenant_id: &str) -> Option<ProgressSnapshot> {
        // 进度是纯展示数据, 锁中毒时取内层值继续即可
        let sessions = self
            .sessions
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        sessions.get(tenant_id).cloned()
    }

    fn update<F>(&self, tenant_id: &str, apply: F)
    where
        F: FnOnce(&mut ProgressSnapshot),
    {
        let mut sessions = self
            .sessions
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let snapshot = sessions.entry(tenant_id.to_string()).or_default();
        apply(snapshot);
    }
}

impl ProgressReporter for ImportProgressStore {
    fn start(&self, tenant_id: &str, total: usize) {
        self.update(tenant_id, |s| {
            *s = ProgressSnapshot {
                state: ProgressState::Processing,
                progress: 0,
                total,
                current: 0,
                message: String::new(),
                error: None,
            };
        });
    }

    fn increment(&self, tenant_id: &str, current: usize, message: &str) {
        self.update(tenant_id, |s| {
            s.current = current;
            s.progress = if s.total == 0 {
                0
            } else {
                ((current * 100) / s.total).min(100) as u8
            };
            s.message = message.to_string();
        });
    }

    fn complete(&self, tenant_id: &str, created: usize, updated: usize) {
        self.update(tenant_id, |s| {
            s.state = ProgressState::Completed;
            s.progress = 100;
            s.message = format!("{created} created, {updated} updated");
        });
    }

    fn error(&self, tenant_id: &str, message: &str) {
        self.update(tenant_id, |s| {
            s.state = ProgressState::Error;
            s.error = Some(message.to_string());
        });
    }
}
