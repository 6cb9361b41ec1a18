use crate::component::clip_collection::{ClipCollection, ClipRecord};
use crate::error::ClipError;
use indicatif::ProgressBar;
use log::{info, warn};
use rayon::prelude::*;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};

/// 一批匯入的結果
#[derive(Debug, Default)]
pub struct ImportSummary {
    pub added: usize,
    pub failed: Vec<(PathBuf, ClipError)>,
    pub interrupted: bool,
}

/// 平行建立所有項目後依原順序一次加入清單
///
/// `shutdown_signal` 被設起時尚未開始的檔案會被略過，已完成的仍會加入
pub fn import_paths(
    collection: &ClipCollection,
    paths: &[PathBuf],
    progress: &ProgressBar,
    shutdown_signal: &AtomicBool,
) -> ImportSummary {
    let probe = collection.probe();

    let results: Vec<Option<Result<ClipRecord, ClipError>>> = paths
        .par_iter()
        .map(|path| {
            if shutdown_signal.load(Ordering::SeqCst) {
                return None;
            }
            let result = ClipRecord::new(path, probe);
            progress.inc(1);
            Some(result)
        })
        .collect();

    let mut summary = ImportSummary::default();
    let mut records = Vec::with_capacity(results.len());

    for (path, result) in paths.iter().zip(results) {
        match result {
            Some(Ok(record)) => records.push(record),
            Some(Err(e)) => {
                warn!("無法加入影片 {}: {e}", path.display());
                summary.failed.push((path.clone(), e));
            }
            None => summary.interrupted = true,
        }
    }

    summary.added = collection.extend(records);
    info!(
        "匯入完成 - 加入: {}, 失敗: {}{}",
        summary.added,
        summary.failed.len(),
        if summary.interrupted { " (已中斷)" } else { "" }
    );
    summary
}

/// 互動匯入資料夾用：先清除上一次留下的 Ctrl-C 旗標，結束後再清除一次
pub fn import_folder(
    collection: &ClipCollection,
    paths: &[PathBuf],
    progress: &ProgressBar,
    shutdown_signal: &AtomicBool,
) -> ImportSummary {
    shutdown_signal.store(false, Ordering::SeqCst);
    let summary = import_paths(collection, paths, progress, shutdown_signal);
    shutdown_signal.store(false, Ordering::SeqCst);
    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{FixedProbe, make_files};
    use std::sync::Arc;
    use std::sync::atomic::AtomicUsize;
    use tempfile::TempDir;

    #[test]
    fn test_import_preserves_order_and_notifies_once() {
        let dir = TempDir::new().unwrap();
        let names: Vec<String> = (0..40).map(|i| format!("clip{i:02}.mp4")).collect();
        let refs: Vec<&str> = names.iter().map(String::as_str).collect();
        let paths = make_files(dir.path(), &refs);

        let collection = ClipCollection::new(Arc::new(FixedProbe::with_duration(1)));
        let notified = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&notified);
        collection.set_change_listener(move |_: &ClipCollection| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        let summary = import_paths(
            &collection,
            &paths,
            &ProgressBar::hidden(),
            &AtomicBool::new(false),
        );

        assert_eq!(summary.added, 40);
        assert!(summary.failed.is_empty());
        assert!(!summary.interrupted);
        assert_eq!(notified.load(Ordering::SeqCst), 1);

        let imported: Vec<String> = collection
            .snapshot()
            .iter()
            .map(|c| c.display_name().to_string())
            .collect();
        assert_eq!(imported, names);
    }

    #[test]
    fn test_import_reports_failures() {
        let dir = TempDir::new().unwrap();
        let mut paths = make_files(dir.path(), &["a.mp4", "b.mp4"]);
        paths.insert(1, dir.path().join("missing.mp4"));

        let collection = ClipCollection::new(Arc::new(FixedProbe::failing()));
        let summary = import_paths(
            &collection,
            &paths,
            &ProgressBar::hidden(),
            &AtomicBool::new(false),
        );

        assert_eq!(summary.added, 2);
        assert_eq!(summary.failed.len(), 1);
        assert_eq!(summary.failed[0].0, dir.path().join("missing.mp4"));
        assert_eq!(collection.count(), 2);
    }

    #[test]
    fn test_import_interrupted_before_start() {
        let dir = TempDir::new().unwrap();
        let paths = make_files(dir.path(), &["a.mp4", "b.mp4"]);

        let collection = ClipCollection::new(Arc::new(FixedProbe::failing()));
        let summary = import_paths(
            &collection,
            &paths,
            &ProgressBar::hidden(),
            &AtomicBool::new(true),
        );

        assert!(summary.interrupted);
        assert_eq!(summary.added, 0);
        assert!(collection.is_empty());
    }

    #[test]
    fn test_folder_import_ignores_stale_signal() {
        let dir = TempDir::new().unwrap();
        let paths = make_files(dir.path(), &["a.mp4", "b.mp4"]);
        let collection = ClipCollection::new(Arc::new(FixedProbe::with_duration(1)));
        let signal = AtomicBool::new(true);

        let summary = import_folder(&collection, &paths, &ProgressBar::hidden(), &signal);

        assert_eq!(summary.added, 2);
        assert!(!summary.interrupted);
        assert_eq!(collection.count(), 2);
        assert!(!signal.load(Ordering::SeqCst));
    }
}
