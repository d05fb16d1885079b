//! ObserverList: 登録された全 observer へ通知を配信する
//!
//! 弱参照で保持するため、observer 側の寿命を延ばさない。破棄済み・削除済みの observer には配信しない。
//! 通知中はロックを保持しないので、コールバック内から add / remove してもデッドロックしない。

use std::sync::{Arc, Mutex, Weak};

/// observer の登録簿（`T` は通常 `dyn SomeObserver`）
pub struct ObserverList<T: ?Sized> {
    observers: Mutex<Vec<Weak<T>>>,
}

impl<T: ?Sized> ObserverList<T> {
    pub fn new() -> Self {
        Self {
            observers: Mutex::new(Vec::new()),
        }
    }

    /// 登録する。同じ observer の二重登録は無視する。
    pub fn add_observer(&self, observer: &Arc<T>) {
        let weak = Arc::downgrade(observer);
        if let Ok(mut observers) = self.observers.lock() {
            if !observers.iter().any(|o| Weak::ptr_eq(o, &weak)) {
                observers.push(weak);
            }
        }
    }

    pub fn remove_observer(&self, observer: &Arc<T>) {
        let weak = Arc::downgrade(observer);
        if let Ok(mut observers) = self.observers.lock() {
            observers.retain(|o| !Weak::ptr_eq(o, &weak));
        }
    }

    /// 生存中の observer 数
    pub fn len(&self) -> usize {
        self.observers
            .lock()
            .map(|o| o.iter().filter(|w| w.strong_count() > 0).count())
            .unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// 生存中の全 observer に `f` を適用する（登録順）
    pub fn notify(&self, mut f: impl FnMut(&T)) {
        let live: Vec<Arc<T>> = match self.observers.lock() {
            Ok(mut observers) => {
                observers.retain(|o| o.strong_count() > 0);
                observers.iter().filter_map(Weak::upgrade).collect()
            }
            Err(_) => return,
        };
        for observer in &live {
            f(observer);
        }
    }
}

impl<T: ?Sized> Default for ObserverList<T> {
    fn default() -> Self {
        Self::new()
    }
}
