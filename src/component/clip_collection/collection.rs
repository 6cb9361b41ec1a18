use super::clip::ClipRecord;
use crate::error::ClipError;
use crate::tools::{FfprobeProbe, MediaProbe};
use log::{debug, warn};
use parking_lot::RwLock;
use std::path::Path;
use std::sync::{Arc, OnceLock};
use std::time::Duration;

/// 集合變更通知
///
/// 在寫入鎖釋放後、於執行變更的執行緒上同步呼叫。實作可以讀取集合，
/// 但不可在通知期間再修改集合。
pub trait ChangeListener: Send + Sync {
    fn on_change(&self, collection: &ClipCollection);
}

impl<F> ChangeListener for F
where
    F: Fn(&ClipCollection) + Send + Sync,
{
    fn on_change(&self, collection: &ClipCollection) {
        self(collection);
    }
}

/// 影片清單與選取游標
///
/// 結構規則都在這裡，`ClipCollection` 只負責加鎖與通知。
#[derive(Debug, Clone, Default)]
pub struct CollectionState {
    items: Vec<Arc<ClipRecord>>,
    selected: Option<usize>,
}

impl CollectionState {
    #[must_use]
    pub fn items(&self) -> &[Arc<ClipRecord>] {
        &self.items
    }

    #[must_use]
    pub const fn selected(&self) -> Option<usize> {
        self.selected
    }

    pub fn push(&mut self, record: Arc<ClipRecord>) {
        self.items.push(record);
    }

    /// 刪除選取的項目，刪到最後一項時選取往前移，清單空了則取消選取
    pub fn remove_selected(&mut self) -> Option<Arc<ClipRecord>> {
        let index = self.selected.filter(|&i| i < self.items.len())?;
        let removed = self.items.remove(index);

        if index >= self.items.len() {
            self.selected = self.items.len().checked_sub(1);
        }

        Some(removed)
    }

    pub fn move_up(&mut self) -> bool {
        match self.selected {
            Some(index) if index > 0 && index < self.items.len() => {
                self.items.swap(index, index - 1);
                self.selected = Some(index - 1);
                true
            }
            _ => false,
        }
    }

    pub fn move_down(&mut self) -> bool {
        match self.selected {
            Some(index) if index + 1 < self.items.len() => {
                self.items.swap(index, index + 1);
                self.selected = Some(index + 1);
                true
            }
            _ => false,
        }
    }

    /// 取出 `from` 的項目後，插入到縮短後清單的 `to` 位置（拖放排序語意）
    pub fn move_item(&mut self, from: usize, to: usize) -> bool {
        let len = self.items.len();
        if from == to || from >= len || to >= len {
            return false;
        }

        let record = self.items.remove(from);
        self.items.insert(to, record);
        self.selected = Some(to);
        true
    }

    /// 超出範圍的索引視為取消選取
    pub fn set_selected(&mut self, index: Option<usize>) {
        self.selected = index.filter(|&i| i < self.items.len());
    }

    pub fn clear(&mut self) {
        self.items.clear();
        self.selected = None;
    }
}

/// 執行緒安全的影片集合
///
/// `items` 與 `selected` 由同一把讀寫鎖保護，讀取端不會看到只完成一半的變更。
/// 所有讀取都回傳複本。
pub struct ClipCollection {
    state: RwLock<CollectionState>,
    probe: Arc<dyn MediaProbe>,
    listener: OnceLock<Box<dyn ChangeListener>>,
}

impl Default for ClipCollection {
    fn default() -> Self {
        Self::new(Arc::new(FfprobeProbe::default()))
    }
}

impl ClipCollection {
    pub fn new(probe: Arc<dyn MediaProbe>) -> Self {
        Self {
            state: RwLock::new(CollectionState::default()),
            probe,
            listener: OnceLock::new(),
        }
    }

    /// 設定變更通知，只能設定一次
    pub fn set_change_listener(&self, listener: impl ChangeListener + 'static) -> bool {
        if self.listener.set(Box::new(listener)).is_err() {
            warn!("變更通知已設定，忽略重複設定");
            return false;
        }
        true
    }

    #[must_use]
    pub fn probe(&self) -> &dyn MediaProbe {
        self.probe.as_ref()
    }

    pub fn add(&self, path: impl AsRef<Path>) -> Result<(), ClipError> {
        let record = ClipRecord::new(path, self.probe.as_ref())?;
        debug!("加入影片: {}", record.path().display());

        self.mutate(|state| {
            state.push(Arc::new(record));
            true
        });
        Ok(())
    }

    /// 依序加入已建立好的項目，整批只通知一次
    pub fn extend(&self, records: impl IntoIterator<Item = ClipRecord>) -> usize {
        let records: Vec<_> = records.into_iter().map(Arc::new).collect();
        let count = records.len();

        self.mutate(|state| {
            for record in records {
                state.push(record);
            }
            count > 0
        });
        count
    }

    pub fn remove_selected(&self) -> Option<Arc<ClipRecord>> {
        let mut removed = None;
        self.mutate(|state| {
            removed = state.remove_selected();
            removed.is_some()
        });
        removed
    }

    pub fn move_up(&self) -> bool {
        self.mutate(CollectionState::move_up)
    }

    pub fn move_down(&self) -> bool {
        self.mutate(CollectionState::move_down)
    }

    /// 只要不是 no-op 就會通知，即使結果順序與原本相同
    pub fn move_item(&self, from: usize, to: usize) -> bool {
        self.mutate(|state| state.move_item(from, to))
    }

    pub fn set_selected(&self, index: Option<usize>) {
        self.mutate(|state| {
            state.set_selected(index);
            true
        });
    }

    pub fn clear(&self) {
        self.mutate(|state| {
            state.clear();
            true
        });
    }

    #[must_use]
    pub fn snapshot(&self) -> Vec<Arc<ClipRecord>> {
        self.state.read().items().to_vec()
    }

    #[must_use]
    pub fn selected_index(&self) -> Option<usize> {
        self.state.read().selected()
    }

    #[must_use]
    pub fn selected(&self) -> Option<Arc<ClipRecord>> {
        let state = self.state.read();
        state.selected().map(|i| Arc::clone(&state.items()[i]))
    }

    #[must_use]
    pub fn count(&self) -> usize {
        self.state.read().items().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.count() == 0
    }

    /// 已知長度的總和，沒有任何影片有長度時回傳 `None`
    #[must_use]
    pub fn total_duration(&self) -> Option<Duration> {
        let state = self.state.read();
        state
            .items()
            .iter()
            .filter_map(|record| record.duration())
            .reduce(|total, d| total + d)
    }

    /// 在寫入鎖內套用變更，鎖釋放後才通知
    fn mutate<F>(&self, change: F) -> bool
    where
        F: FnOnce(&mut CollectionState) -> bool,
    {
        let changed = {
            let mut state = self.state.write();
            change(&mut state)
        };

        if changed {
            if let Some(listener) = self.listener.get() {
                listener.on_change(self);
            }
        }
        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{FixedProbe, make_files};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;
    use tempfile::TempDir;

    fn collection() -> ClipCollection {
        ClipCollection::new(Arc::new(FixedProbe::with_duration(10)))
    }

    fn names(collection: &ClipCollection) -> Vec<String> {
        collection
            .snapshot()
            .iter()
            .map(|r| r.display_name().to_string())
            .collect()
    }

    fn filled(dir: &TempDir, names: &[&str]) -> ClipCollection {
        let collection = collection();
        for path in make_files(dir.path(), names) {
            collection.add(path).unwrap();
        }
        collection
    }

    #[test]
    fn test_add_appends_without_selecting() {
        let dir = TempDir::new().unwrap();
        let collection = filled(&dir, &["a.mp4", "b.mp4"]);

        assert_eq!(names(&collection), vec!["a.mp4", "b.mp4"]);
        assert_eq!(collection.selected_index(), None);

        collection.set_selected(Some(0));
        collection.add(dir.path().join("a.mp4")).unwrap();
        assert_eq!(collection.count(), 3);
        assert_eq!(collection.selected_index(), Some(0));
    }

    #[test]
    fn test_add_missing_path_leaves_collection_unchanged() {
        let dir = TempDir::new().unwrap();
        let collection = filled(&dir, &["a.mp4"]);
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        collection.set_change_listener(move |_: &ClipCollection| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        let result = collection.add(dir.path().join("missing.mp4"));
        assert!(matches!(result, Err(ClipError::Inaccessible { .. })));
        assert_eq!(collection.count(), 1);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_duplicates_are_distinct_records() {
        let dir = TempDir::new().unwrap();
        let collection = filled(&dir, &["a.mp4"]);
        collection.add(dir.path().join("a.mp4")).unwrap();

        let snapshot = collection.snapshot();
        assert_eq!(snapshot.len(), 2);
        assert!(!Arc::ptr_eq(&snapshot[0], &snapshot[1]));
    }

    #[test]
    fn test_remove_selected_reanchors_to_last() {
        let dir = TempDir::new().unwrap();
        let collection = filled(&dir, &["a.mp4", "b.mp4", "c.mp4"]);

        collection.set_selected(Some(2));
        let removed = collection.remove_selected().unwrap();
        assert_eq!(removed.display_name(), "c.mp4");
        assert_eq!(collection.selected_index(), Some(1));

        collection.set_selected(Some(0));
        collection.remove_selected();
        assert_eq!(names(&collection), vec!["b.mp4"]);
        assert_eq!(collection.selected_index(), Some(0));

        collection.remove_selected();
        assert_eq!(collection.count(), 0);
        assert_eq!(collection.selected_index(), None);
    }

    #[test]
    fn test_remove_selected_always_leaves_valid_selection() {
        let dir = TempDir::new().unwrap();
        for len in 1..=4 {
            let files: Vec<String> = (0..len).map(|i| format!("{len}_{i}.mp4")).collect();
            let refs: Vec<&str> = files.iter().map(String::as_str).collect();
            let collection = filled(&dir, &refs);

            for selected in 0..len {
                let copy = collection_clone(&collection);
                copy.set_selected(Some(selected));
                copy.remove_selected();
                match copy.selected_index() {
                    None => assert_eq!(copy.count(), 0),
                    Some(i) => assert!(i < copy.count()),
                }
            }
        }
    }

    fn collection_clone(source: &ClipCollection) -> ClipCollection {
        let copy = collection();
        copy.extend(source.snapshot().iter().map(|r| (**r).clone()));
        copy
    }

    #[test]
    fn test_remove_without_selection_is_noop() {
        let dir = TempDir::new().unwrap();
        let collection = filled(&dir, &["a.mp4"]);
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        collection.set_change_listener(move |_: &ClipCollection| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        assert!(collection.remove_selected().is_none());
        assert_eq!(collection.count(), 1);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_move_up_down_follows_selection_and_round_trips() {
        let dir = TempDir::new().unwrap();
        let collection = filled(&dir, &["a.mp4", "b.mp4", "c.mp4"]);
        collection.set_selected(Some(1));
        let before = collection.snapshot();
        let selected = collection.selected().unwrap();

        assert!(collection.move_up());
        assert_eq!(names(&collection), vec!["b.mp4", "a.mp4", "c.mp4"]);
        assert_eq!(collection.selected_index(), Some(0));

        assert!(collection.move_down());
        let after = collection.snapshot();
        assert!(before.iter().zip(&after).all(|(x, y)| Arc::ptr_eq(x, y)));
        assert!(Arc::ptr_eq(&collection.selected().unwrap(), &selected));
    }

    #[test]
    fn test_move_at_boundaries_is_noop() {
        let dir = TempDir::new().unwrap();
        let collection = filled(&dir, &["a.mp4", "b.mp4"]);
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        collection.set_change_listener(move |_: &ClipCollection| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        assert!(!collection.move_up());
        assert!(!collection.move_down());

        collection.set_selected(Some(0));
        assert!(!collection.move_up());
        collection.set_selected(Some(1));
        assert!(!collection.move_down());

        assert_eq!(names(&collection), vec!["a.mp4", "b.mp4"]);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_move_item_two_clips() {
        let dir = TempDir::new().unwrap();
        let collection = filled(&dir, &["a.mp4", "b.mp4"]);

        assert!(collection.move_item(0, 1));
        assert_eq!(names(&collection), vec!["b.mp4", "a.mp4"]);
        assert_eq!(collection.selected_index(), Some(1));
    }

    #[test]
    fn test_move_item_to_first_and_last() {
        let dir = TempDir::new().unwrap();
        let collection = filled(&dir, &["a.mp4", "b.mp4", "c.mp4", "d.mp4"]);

        assert!(collection.move_item(2, 0));
        assert_eq!(names(&collection), vec!["c.mp4", "a.mp4", "b.mp4", "d.mp4"]);
        assert_eq!(collection.selected_index(), Some(0));

        assert!(collection.move_item(1, 3));
        assert_eq!(names(&collection), vec!["c.mp4", "b.mp4", "d.mp4", "a.mp4"]);
        assert_eq!(collection.selected_index(), Some(3));
        assert_eq!(collection.count(), 4);
    }

    #[test]
    fn test_move_item_rejects_noop_and_out_of_range() {
        let dir = TempDir::new().unwrap();
        let collection = filled(&dir, &["a.mp4", "b.mp4", "c.mp4"]);
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        collection.set_change_listener(move |_: &ClipCollection| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        assert!(!collection.move_item(2, 2));
        assert!(!collection.move_item(3, 0));
        assert!(!collection.move_item(0, 3));
        assert_eq!(collection.selected_index(), None);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_move_item_back_and_forth_notifies_each_time() {
        let dir = TempDir::new().unwrap();
        let collection = filled(&dir, &["a.mp4", "b.mp4"]);
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        collection.set_change_listener(move |_: &ClipCollection| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        assert!(collection.move_item(0, 1));
        assert!(collection.move_item(1, 0));
        assert_eq!(names(&collection), vec!["a.mp4", "b.mp4"]);
        assert_eq!(collection.selected_index(), Some(0));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_set_selected_out_of_range_means_none() {
        let dir = TempDir::new().unwrap();
        let collection = filled(&dir, &["a.mp4", "b.mp4"]);

        collection.set_selected(Some(1));
        assert_eq!(collection.selected_index(), Some(1));
        collection.set_selected(Some(5));
        assert_eq!(collection.selected_index(), None);
        collection.set_selected(Some(0));
        collection.set_selected(None);
        assert_eq!(collection.selected_index(), None);
    }

    #[test]
    fn test_clear_resets_state() {
        let dir = TempDir::new().unwrap();
        let collection = filled(&dir, &["a.mp4", "b.mp4"]);
        collection.set_selected(Some(1));

        collection.clear();
        assert!(collection.is_empty());
        assert_eq!(collection.selected_index(), None);
        assert!(collection.snapshot().is_empty());
    }

    #[test]
    fn test_listener_sees_committed_state() {
        let dir = TempDir::new().unwrap();
        let collection = filled(&dir, &["a.mp4", "b.mp4", "c.mp4"]);
        let seen = Arc::new(parking_lot::Mutex::new(Vec::new()));
        let log = Arc::clone(&seen);
        collection.set_change_listener(move |c: &ClipCollection| {
            let order: Vec<String> = c
                .snapshot()
                .iter()
                .map(|r| r.display_name().to_string())
                .collect();
            log.lock().push((order, c.selected_index()));
        });

        collection.set_selected(Some(2));
        collection.move_up();
        collection.remove_selected();
        collection.clear();

        let seen = seen.lock();
        assert_eq!(seen.len(), 4);
        assert_eq!(seen[1].0, vec!["a.mp4", "c.mp4", "b.mp4"]);
        assert_eq!(seen[1].1, Some(1));
        assert_eq!(seen[2].0, vec!["a.mp4", "b.mp4"]);
        assert_eq!(seen[2].1, Some(1));
        assert!(seen[3].0.is_empty());
        assert_eq!(seen[3].1, None);
    }

    #[test]
    fn test_listener_can_only_be_set_once() {
        let collection = collection();
        assert!(collection.set_change_listener(|_: &ClipCollection| {}));
        assert!(!collection.set_change_listener(|_: &ClipCollection| {}));
    }

    #[test]
    fn test_extend_notifies_once() {
        let dir = TempDir::new().unwrap();
        let paths = make_files(dir.path(), &["a.mp4", "b.mp4"]);
        let collection = collection();
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        collection.set_change_listener(move |_: &ClipCollection| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        let records = paths
            .iter()
            .map(|p| ClipRecord::new(p, collection.probe()).unwrap());
        assert_eq!(collection.extend(records), 2);
        assert_eq!(collection.extend(Vec::new()), 0);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_total_duration() {
        let dir = TempDir::new().unwrap();
        assert_eq!(collection().total_duration(), None);

        let collection = filled(&dir, &["a.mp4", "b.mp4"]);
        assert_eq!(collection.total_duration(), Some(Duration::from_secs(20)));
    }

    #[test]
    fn test_concurrent_mutation_keeps_selection_valid() {
        let dir = TempDir::new().unwrap();
        let files: Vec<String> = (0..8).map(|i| format!("{i}.mp4")).collect();
        let refs: Vec<&str> = files.iter().map(String::as_str).collect();
        let collection = Arc::new(filled(&dir, &refs));
        collection.set_selected(Some(3));

        let writers: Vec<_> = (0..4)
            .map(|t| {
                let collection = Arc::clone(&collection);
                let path = dir.path().join("0.mp4");
                thread::spawn(move || {
                    for i in 0..200 {
                        match (t + i) % 5 {
                            0 => {
                                collection.move_up();
                            }
                            1 => {
                                collection.move_down();
                            }
                            2 => {
                                collection.move_item(i % 8, (i * 3) % 8);
                            }
                            3 => {
                                collection.remove_selected();
                            }
                            _ => {
                                collection.add(&path).unwrap();
                                collection.set_selected(Some(i % 10));
                            }
                        }
                    }
                })
            })
            .collect();

        let readers: Vec<_> = (0..2)
            .map(|_| {
                let collection = Arc::clone(&collection);
                thread::spawn(move || {
                    for _ in 0..500 {
                        let state = collection.state.read().clone();
                        if let Some(i) = state.selected() {
                            assert!(i < state.items().len());
                        }
                    }
                })
            })
            .collect();

        for handle in writers.into_iter().chain(readers) {
            handle.join().unwrap();
        }

        if let Some(i) = collection.selected_index() {
            assert!(i < collection.count());
        }
    }
}
