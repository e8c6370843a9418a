use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::task::JoinHandle;

/// ステータスメッセージを表示しておく時間。
pub const STATUS_DISPLAY_WINDOW: Duration = Duration::from_secs(5);

/// 一定時間で消えるステータスメッセージ。
///
/// メッセージを消すタスクは新しいメッセージを表示した時と、
/// `StatusLine`を破棄した時に中断される。
pub struct StatusLine {
    message: Arc<Mutex<Option<String>>>,
    clear_task: Option<JoinHandle<()>>,
    display_for: Duration,
}

impl StatusLine {
    /// 新しい`StatusLine`を返す。
    ///
    /// tokioのランタイム内で利用する。
    pub fn new(display_for: Duration) -> Self {
        Self {
            message: Arc::new(Mutex::new(None)),
            clear_task: None,
            display_for,
        }
    }

    /// メッセージを表示し、表示時間の経過後に消す。
    pub fn show(&mut self, message: impl Into<String>) {
        self.cancel_clear();
        set_message(&self.message, Some(message.into()));

        let shared = Arc::clone(&self.message);
        let display_for = self.display_for;
        self.clear_task = Some(tokio::spawn(async move {
            tokio::time::sleep(display_for).await;
            set_message(&shared, None);
        }));
    }

    /// 表示中のメッセージを返す。
    pub fn current(&self) -> Option<String> {
        self.message
            .lock()
            .map(|message| message.clone())
            .unwrap_or_else(|poisoned| poisoned.into_inner().clone())
    }

    fn cancel_clear(&mut self) {
        if let Some(task) = self.clear_task.take() {
            task.abort();
        }
    }
}

impl Default for StatusLine {
    fn default() -> Self {
        Self::new(STATUS_DISPLAY_WINDOW)
    }
}

impl Drop for StatusLine {
    fn drop(&mut self) {
        self.cancel_clear();
    }
}

fn set_message(shared: &Mutex<Option<String>>, value: Option<String>) {
    let mut message = shared
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    *message = value;
}
