use log::warn;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// 註冊 Ctrl-C 處理器，回傳共用的中斷旗標
///
/// 旗標只在長時間作業（匯出、資料夾掃描）期間被檢查，作業結束後由呼叫端重設
#[must_use]
pub fn setup_shutdown_signal() -> Arc<AtomicBool> {
    let shutdown_signal = Arc::new(AtomicBool::new(false));
    let signal_clone = Arc::clone(&shutdown_signal);

    if let Err(e) = ctrlc::set_handler(move || {
        signal_clone.store(true, Ordering::SeqCst);
        eprintln!("\n收到中斷信號，正在停止目前的作業...");
    }) {
        warn!("無法設定 Ctrl-C 處理器: {e}");
    }

    shutdown_signal
}
