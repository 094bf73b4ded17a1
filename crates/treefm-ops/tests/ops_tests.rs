use std::fs;

use tempfile::TempDir;
use treefm_core::{PathInfo, PathKind};
use treefm_ops::{OperationExecutor, OperationKind, OperationRequest};

fn create_test_tree() -> TempDir {
    let temp = TempDir::new().unwrap();
    let root = temp.path();

    fs::create_dir_all(root.join("docs").join("drafts")).unwrap();
    fs::write(root.join("docs").join("readme.md"), b"# readme").unwrap();
    fs::write(root.join("docs").join("drafts").join("v1.txt"), b"first").unwrap();
    fs::write(root.join("single.txt"), b"single").unwrap();

    temp
}

#[tokio::test]
async fn test_delete_then_stat_reports_missing() {
    let temp = create_test_tree();
    let executor = OperationExecutor::new();

    for target in [temp.path().join("single.txt"), temp.path().join("docs")] {
        let result = executor.submit(OperationRequest::delete(&target)).wait().await;
        assert!(result.success, "{}", result.message);
        assert_eq!(PathInfo::resolve(&target).kind, PathKind::Missing);
    }
}

#[tokio::test]
async fn test_move_same_device() {
    let temp = create_test_tree();
    let executor = OperationExecutor::new();
    let src = temp.path().join("docs");
    let dest = temp.path().join("archive");

    let result = executor
        .submit(OperationRequest::move_to(&src, &dest))
        .wait()
        .await;

    assert!(result.success, "{}", result.message);
    assert!(!src.exists());
    assert_eq!(fs::read(dest.join("drafts").join("v1.txt")).unwrap(), b"first");
}

#[tokio::test]
async fn test_copy_directory_leaves_source() {
    let temp = create_test_tree();
    let executor = OperationExecutor::new();
    let src = temp.path().join("docs");
    let dest = temp.path().join("docs-copy");

    let handle = executor.submit(OperationRequest::copy(&src, &dest));
    assert_eq!(handle.request().kind, OperationKind::Copy);
    let result = handle.wait().await;

    assert!(result.success, "{}", result.message);
    assert_eq!(result.message, "Copied 'docs'");
    assert!(src.join("readme.md").exists());
    assert_eq!(fs::read(dest.join("readme.md")).unwrap(), b"# readme");
}

#[tokio::test]
async fn test_failure_message_carries_error_text() {
    let temp = create_test_tree();
    let executor = OperationExecutor::new();
    let missing = temp.path().join("missing.txt");

    let result = executor
        .submit(OperationRequest::copy(&missing, temp.path().join("x.txt")))
        .wait()
        .await;

    assert!(!result.success);
    assert!(result.message.contains("missing.txt"), "{}", result.message);
}

#[tokio::test]
async fn test_existing_destination_needs_overwrite() {
    let temp = create_test_tree();
    let executor = OperationExecutor::new();
    let src = temp.path().join("single.txt");
    let dest = temp.path().join("docs").join("readme.md");

    let refused = executor
        .submit(OperationRequest::move_to(&src, &dest))
        .wait()
        .await;
    assert!(!refused.success);
    assert!(src.exists());

    let replaced = executor
        .submit(OperationRequest::move_to(&src, &dest).with_overwrite(true))
        .wait()
        .await;
    assert!(replaced.success, "{}", replaced.message);
    assert!(!src.exists());
    assert_eq!(fs::read(&dest).unwrap(), b"single");
}

#[tokio::test]
async fn test_create_directory_request() {
    let temp = create_test_tree();
    let executor = OperationExecutor::new();
    let dir = temp.path().join("New Folder");

    let first = executor
        .submit(OperationRequest::create_directory(&dir))
        .wait()
        .await;
    assert!(first.success, "{}", first.message);
    assert!(dir.is_dir());

    let second = executor
        .submit(OperationRequest::create_directory(&dir))
        .wait()
        .await;
    assert!(!second.success);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_independent_requests_each_report_once() {
    let temp = create_test_tree();
    let executor = OperationExecutor::new();

    let handles: Vec<_> = (0..4)
        .map(|i| {
            let src = temp.path().join("single.txt");
            let dest = temp.path().join(format!("copy-{i}.txt"));
            executor.submit(OperationRequest::copy(src, dest))
        })
        .collect();

    let ids: Vec<u64> = handles.iter().map(|h| h.id()).collect();
    assert_eq!(ids, vec![0, 1, 2, 3]);

    for handle in handles {
        assert!(handle.wait().await.success);
    }
    for i in 0..4 {
        assert!(temp.path().join(format!("copy-{i}.txt")).exists());
    }
}
