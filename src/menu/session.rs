use crate::component::ClipCollection;
use crate::config::Config;
use crate::tools::FfprobeProbe;
use parking_lot::Mutex;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// 一次執行期間的編輯狀態：清單、設定與目前的專案檔
pub struct Session {
    pub config: Config,
    collection: ClipCollection,
    shutdown_signal: Arc<AtomicBool>,
    modified: Arc<AtomicBool>,
    saved_paths: Arc<Mutex<Vec<PathBuf>>>,
    project_path: Option<PathBuf>,
}

fn clip_paths(collection: &ClipCollection) -> Vec<PathBuf> {
    collection
        .snapshot()
        .iter()
        .map(|clip| clip.path().to_path_buf())
        .collect()
}

impl Session {
    pub fn new(config: Config, shutdown_signal: Arc<AtomicBool>) -> Self {
        let tools = &config.settings.tools;
        let probe = FfprobeProbe::new(
            &tools.ffprobe_path,
            &tools.ffmpeg_path,
            tools.generate_thumbnails,
        );
        let collection = ClipCollection::new(Arc::new(probe));

        // 只有內容或順序和上次儲存時不同才算修改，單純改變選取不算
        let modified = Arc::new(AtomicBool::new(false));
        let saved_paths = Arc::new(Mutex::new(Vec::new()));
        let flag = Arc::clone(&modified);
        let saved = Arc::clone(&saved_paths);
        collection.set_change_listener(move |collection: &ClipCollection| {
            let changed = clip_paths(collection) != *saved.lock();
            flag.store(changed, Ordering::SeqCst);
        });

        Self {
            config,
            collection,
            shutdown_signal,
            modified,
            saved_paths,
            project_path: None,
        }
    }

    #[must_use]
    pub const fn collection(&self) -> &ClipCollection {
        &self.collection
    }

    #[must_use]
    pub fn shutdown_signal(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.shutdown_signal)
    }

    /// 上次儲存或載入後清單是否有變動
    #[must_use]
    pub fn is_modified(&self) -> bool {
        self.modified.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn project_path(&self) -> Option<&Path> {
        self.project_path.as_deref()
    }

    pub fn mark_saved(&mut self, path: &Path) {
        self.project_path = Some(path.to_path_buf());
        *self.saved_paths.lock() = clip_paths(&self.collection);
        self.modified.store(false, Ordering::SeqCst);
    }

    /// 清空清單並脫離目前的專案檔
    pub fn reset(&mut self) {
        self.saved_paths.lock().clear();
        self.collection.clear();
        self.project_path = None;
        self.modified.store(false, Ordering::SeqCst);
    }
}
