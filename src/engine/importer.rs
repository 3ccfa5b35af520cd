// ==========================================
// 商品目录导入引擎 - 目录导入引擎
// ==========================================
// 职责: 两遍扫描编排 + 进度上报 + 结果聚合
// 流程: Phase 1 只读预扫描(最大数字 SKU/行数) → 序列播种 →
//       Phase 2 逐行 规范化→移位修复→切分→分配→对账
// 红线: 单运行严格串行 —— SKU 计数器是顺序敏感的共享状态,
//       行级并行会重新引入两阶段设计所要消除的冲突风险
// 红线: 所有数据库操作通过 Repository
// ==========================================

use crate::config::ImportConfig;
use crate::domain::catalog::{ImportResult, ImportRun};
use crate::domain::types::UpsertOutcome;
use crate::engine::column_shift::{correct_shift, is_shifted};
use crate::engine::error::ImportError;
use crate::engine::normalizer::{columns, RowReader};
use crate::engine::progress::ProgressReporter;
use crate::engine::reconciler::ReconciliationEngine;
use crate::engine::sku_allocator::{SkuPrescan, SkuSequence};
use crate::repository::catalog_repo::CatalogRepository;
use chrono::Utc;
use std::path::Path;
use std::sync::Arc;

// ==========================================
// CatalogImporter - 目录导入引擎
// ==========================================
/// 目录导入引擎
///
/// # 职责
/// 1. 致命前置条件校验（租户必须有用户）
/// 2. Phase 1 预扫描: 文件内最大数字 SKU + 数据行总数
/// 3. 序列播种: max(文件最大值, 存量最大值, 固定下限)
/// 4. Phase 2 逐行对账, 行级错误收敛, 进度上报
/// 5. 无论成败删除源文件（防止旧上传被重复处理）
///
/// # 并发
/// - 单运行内严格串行; 多租户可各自持有独立实例并发运行
pub struct CatalogImporter<R: ?Sized, P: ?Sized>
where
    R: CatalogRepository,
    P: ProgressReporter,
{
    repo: Arc<R>,
    progress: Arc<P>,
    config: ImportConfig,
}

impl<R: ?Sized, P: ?Sized> CatalogImporter<R, P>
where
    R: CatalogRepository,
    P: ProgressReporter,
{
    /// 创建新的 CatalogImporter 实例
    ///
    /// # 参数
    /// - repo: 目录存储仓储
    /// - progress: 进度上报者
    /// - config: 运行级配置
    pub fn new(repo: Arc<R>, progress: Arc<P>, config: ImportConfig) -> Self {
        Self {
            repo,
            progress,
            config,
        }
    }

    /// 从目录导出文件导入（主入口）
    ///
    /// # 参数
    /// - file_path: 本地文件路径
    /// - tenant_id: 租户标识
    ///
    /// # 返回
    /// - Ok(ImportResult): 运行完成（行级错误收敛在 errors 内）
    /// - Err(ImportError): 致命错误, 整个运行中止
    ///
    /// # 后置条件
    /// - 源文件已删除（成功与失败路径一致）
    /// - 致命错误同时推送到进度存储的 ERROR 状态
    pub async fn import_from_csv(
        &self,
        file_path: &str,
        tenant_id: &str,
    ) -> Result<ImportResult, ImportError> {
        let outcome = self.run(file_path, tenant_id).await;

        // 无论成败删除源文件, 防止旧上传被重复处理
        if let Err(err) = tokio::fs::remove_file(file_path).await {
            tracing::warn!("源文件删除失败: path={file_path}, err={err}");
        }

        match outcome {
            Ok(result) => {
                tracing::info!(
                    "导入完成: tenant={tenant_id}, created={}, updated={}, errors={}",
                    result.products_created,
                    result.products_updated,
                    result.errors.len()
                );
                Ok(result)
            }
            Err(err) => {
                tracing::error!("导入中止: tenant={tenant_id}, err={err}");
                self.progress.error(tenant_id, &err.to_string());
                Err(err)
            }
        }
    }

    async fn run(&self, file_path: &str, tenant_id: &str) -> Result<ImportResult, ImportError> {
        let file_name = Path::new(file_path)
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("unknown")
            .to_string();

        // === 步骤 1: 致命前置条件 ===
        if !self.repo.tenant_user_exists(tenant_id).await? {
            return Err(ImportError::MissingTenantUser {
                tenant_id: tenant_id.to_string(),
            });
        }

        // === 步骤 2: Phase 1 预扫描（原子: 任一行读取失败则整个运行中止,
        //     部分预扫得到的最大值不可用于播种）===
        let mut prescan = SkuPrescan::new();
        for row in RowReader::open(file_path, self.config.delimiter)? {
            prescan.observe(&row?);
        }

        // === 步骤 3: 序列播种 ===
        let store_max = self.repo.max_numeric_sku(tenant_id).await?.unwrap_or(0);
        let seed = prescan
            .max_sku()
            .max(store_max)
            .max(self.config.sku_floor);
        let mut seq = SkuSequence::seeded(seed);
        tracing::debug!(
            "序列播种: tenant={tenant_id}, file_max={}, store_max={store_max}, seed={seed}",
            prescan.max_sku()
        );

        // === 步骤 4: Phase 2 逐行对账 ===
        self.progress.start(tenant_id, prescan.rows());
        let reconciler = ReconciliationEngine::new(self.repo.clone());
        let mut run = ImportRun::new(file_name);
        let mut current = 0usize;

        for row in RowReader::open(file_path, self.config.delimiter)? {
            current += 1;
            run.rows_seen = current;

            let mut row = match row {
                Ok(row) => row,
                Err(err) => {
                    run.record_error(current + 1, err);
                    self.progress.increment(tenant_id, current, "");
                    continue;
                }
            };

            if is_shifted(&row) {
                tracing::debug!("修复移位行: row={}", row.row_number);
                correct_shift(&mut row);
            }

            let label = row.get(columns::TITLE).to_string();
            match reconciler.reconcile_row(tenant_id, &row, &mut seq).await {
                Ok(UpsertOutcome::Created) => run.created += 1,
                Ok(UpsertOutcome::Updated) => run.updated += 1,
                Err(err) => {
                    tracing::warn!("跳过失败行: row={}, err={err}", row.row_number);
                    run.record_error(row.row_number, err);
                }
            }
            self.progress.increment(tenant_id, current, &label);
        }

        // === 步骤 5: 完成上报与结果固化 ===
        self.progress.complete(tenant_id, run.created, run.updated);
        let elapsed = Utc::now().signed_duration_since(run.started_at);
        tracing::info!(
            "逐行对账完成: tenant={tenant_id}, rows={}, elapsed_ms={}",
            run.rows_seen,
            elapsed.num_milliseconds()
        );
        Ok(run.finish())
    }
}
