// ==========================================
// 导入引擎集成测试 - 运行边界与错误路径
// ==========================================
// 测试目标: 致命前置条件、行级错误收敛、源文件删除后置条件、父 SKU 自愈
// ==========================================

mod test_helpers;

use catalog_import_engine::domain::types::ProgressState;
use catalog_import_engine::engine::{ImportError, ImportProgressStore};
use catalog_import_engine::logging;
use catalog_import_engine::repository::catalog_repo::CatalogRepository;
use std::path::Path;
use std::sync::Arc;

const TENANT: &str = "T1";

// ==========================================
// 测试用例 1: 致命前置条件 - 租户无用户
// ==========================================

#[tokio::test]
async fn test_missing_tenant_user_aborts_run() {
    logging::init_test();

    let (_db, repo) = test_helpers::create_test_repo().expect("create repo");
    // 刻意不写入租户用户

    let dir = tempfile::tempdir().expect("tempdir");
    let path = test_helpers::write_catalog_file(
        &dir,
        "catalog.csv",
        &["Hat,,5.00,EUR,1,,,,,,,,,,10001"],
    )
    .expect("write file");

    let progress = Arc::new(ImportProgressStore::new());
    let importer = test_helpers::create_test_importer(repo.clone(), progress.clone());

    let err = importer
        .import_from_csv(&path, TENANT)
        .await
        .expect_err("run must abort");
    assert!(matches!(err, ImportError::MissingTenantUser { .. }));

    // 致命错误同样删除源文件
    assert!(!Path::new(&path).exists(), "源文件必须被删除");

    // 进度存储进入 ERROR 状态并携带错误消息
    let snapshot = progress.snapshot(TENANT).expect("snapshot");
    assert_eq!(snapshot.state, ProgressState::Error);
    assert!(snapshot.error.is_some());

    // 存储未被触碰
    let entries = repo.list_entries(TENANT).await.expect("list entries");
    assert!(entries.is_empty());
}

// ==========================================
// 测试用例 2: 行级错误收敛, 运行继续
// ==========================================

#[tokio::test]
async fn test_row_errors_are_collected_and_run_continues() {
    logging::init_test();

    let (_db, repo) = test_helpers::create_test_repo().expect("create repo");
    test_helpers::seed_tenant_user(&repo, TENANT)
        .await
        .expect("seed user");

    let dir = tempfile::tempdir().expect("tempdir");
    let path = test_helpers::write_catalog_file(
        &dir,
        "catalog.csv",
        &[
            "Hat A,,5.00,EUR,1,,,,,,,,,,10001",
            "Hat B,,not-a-price,EUR,1,,,,,,,,,,10002",
            "Hat C,,7.00,EUR,1,,,,,,,,,,10003",
        ],
    )
    .expect("write file");

    let importer = test_helpers::create_test_importer(repo.clone(), Arc::new(ImportProgressStore::new()));
    let result = importer
        .import_from_csv(&path, TENANT)
        .await
        .expect("run completes despite row errors");

    assert!(!result.success, "有跳过行时报告部分失败");
    assert_eq!(result.products_created, 2);
    assert_eq!(result.errors.len(), 1);
    // 错误消息携带文件内行号（表头为第 1 行）
    assert!(result.errors[0].starts_with("row 3:"), "got: {}", result.errors[0]);

    // 失败行整行跳过, 未半写
    let entries = repo.list_entries(TENANT).await.expect("list entries");
    assert_eq!(entries.len(), 2);
    assert!(entries.iter().all(|e| e.name != "Hat B"));
}

// ==========================================
// 测试用例 3: 成功路径删除源文件
// ==========================================

#[tokio::test]
async fn test_source_file_deleted_after_success() {
    logging::init_test();

    let (_db, repo) = test_helpers::create_test_repo().expect("create repo");
    test_helpers::seed_tenant_user(&repo, TENANT)
        .await
        .expect("seed user");

    let dir = tempfile::tempdir().expect("tempdir");
    let path = test_helpers::write_catalog_file(
        &dir,
        "upload.csv",
        &["Hat,,5.00,EUR,1,,,,,,,,,,10001"],
    )
    .expect("write file");

    let importer = test_helpers::create_test_importer(repo.clone(), Arc::new(ImportProgressStore::new()));
    let result = importer.import_from_csv(&path, TENANT).await.expect("import");

    assert!(result.success);
    assert_eq!(result.file_name, "upload.csv");
    assert!(!Path::new(&path).exists(), "源文件必须被删除");
}

// ==========================================
// 测试用例 4: 按单 SKU 匹配更新（名称变更）
// ==========================================

#[tokio::test]
async fn test_single_sku_match_updates_renamed_entry() {
    logging::init_test();

    let (_db, repo) = test_helpers::create_test_repo().expect("create repo");
    test_helpers::seed_tenant_user(&repo, TENANT)
        .await
        .expect("seed user");

    let id = test_helpers::seed_entry(&repo, TENANT, "Old Name", "10001")
        .await
        .expect("seed entry");

    let dir = tempfile::tempdir().expect("tempdir");
    let path = test_helpers::write_catalog_file(
        &dir,
        "catalog.csv",
        &["New Name,,5.00,EUR,1,,,,,,,,,,10001"],
    )
    .expect("write file");

    let importer = test_helpers::create_test_importer(repo.clone(), Arc::new(ImportProgressStore::new()));
    let result = importer.import_from_csv(&path, TENANT).await.expect("import");

    assert_eq!(result.products_created, 0);
    assert_eq!(result.products_updated, 1);

    let entries = repo.list_entries(TENANT).await.expect("list entries");
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].id, id, "按 SKU 匹配沿用既有实体");
    assert_eq!(entries[0].name, "New Name");
    assert_eq!(entries[0].sku, "10001");
}

// ==========================================
// 测试用例 5: 父 SKU 冲突自愈
// ==========================================
// 遗留数据: 父商品 SKU 与自家子 SKU 相同; 重导必须换新父 SKU

#[tokio::test]
async fn test_parent_sku_collision_is_healed() {
    logging::init_test();

    let (_db, repo) = test_helpers::create_test_repo().expect("create repo");
    test_helpers::seed_tenant_user(&repo, TENANT)
        .await
        .expect("seed user");

    test_helpers::seed_entry(&repo, TENANT, "Beanie", "10001")
        .await
        .expect("seed entry");

    let dir = tempfile::tempdir().expect("tempdir");
    let path = test_helpers::write_catalog_file(
        &dir,
        "catalog.csv",
        &["Beanie,,5.00,EUR,\"1, 2\",,,,Color,Colour,\"Red, Blue\",,,,\"10001, 10002\""],
    )
    .expect("write file");

    let importer = test_helpers::create_test_importer(repo.clone(), Arc::new(ImportProgressStore::new()));
    let result = importer.import_from_csv(&path, TENANT).await.expect("import");
    assert!(result.success, "errors: {:?}", result.errors);
    assert_eq!(result.products_updated, 1);

    let entries = repo.list_entries(TENANT).await.expect("list entries");
    assert_eq!(entries.len(), 1);
    let parent = &entries[0];
    assert_ne!(parent.sku, "10001");
    assert_ne!(parent.sku, "10002");
    let fresh: u64 = parent.sku.parse().expect("fresh sku numeric");
    assert!(fresh > 10_002, "新父 SKU 严格大于文件与存量最大值");

    let variations = repo.list_variations(&parent.id).await.expect("list variations");
    assert_eq!(variations.len(), 2);
}
