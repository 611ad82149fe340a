// ==========================================
// 班级课表排课系统 - 时段锁注册表
// ==========================================
// 职责: 按 (学期, 星期) 串行化 "读取已有条目 → 校验 → 写入" 序列
// 红线: 不同 (学期, 星期) 的请求互不阻塞
// 容量: 只保留正在使用或等待中的锁, 空闲锁在释放时移除
// ==========================================

use crate::domain::Day;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

type SlotKey = (String, Day);

/// (学期, 星期) → 互斥锁
#[derive(Debug, Default)]
pub struct SlotLockRegistry {
    locks: Mutex<HashMap<SlotKey, Arc<Mutex<()>>>>,
}

impl SlotLockRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn registry(&self) -> MutexGuard<'_, HashMap<SlotKey, Arc<Mutex<()>>>> {
        // 中毒的注册表仍可安全使用: 只存放锁句柄
        self.locks.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// 获取 (或创建) 指定键的锁
    fn lock_for(&self, key: &SlotKey) -> Arc<Mutex<()>> {
        self.registry()
            .entry(key.clone())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// 无其他持有者时移除锁
    ///
    /// 新的持有者只能在注册表锁内取得句柄, 因此计数为 2 (注册表 + 本调用) 时可安全移除
    fn release(&self, key: &SlotKey, lock: &Arc<Mutex<()>>) {
        let mut locks = self.registry();
        if Arc::strong_count(lock) == 2 {
            locks.remove(key);
        }
    }

    /// 持有 (学期, 星期) 锁执行闭包
    ///
    /// 闭包内 panic 导致的锁中毒会被清除, 锁本身不保护任何数据
    pub fn with_lock<T>(&self, term: &str, day: Day, f: impl FnOnce() -> T) -> T {
        let key = (term.to_string(), day);
        let lock = self.lock_for(&key);
        let result = {
            let _guard: MutexGuard<'_, ()> = lock.lock().unwrap_or_else(PoisonError::into_inner);
            f()
        };
        self.release(&key, &lock);
        result
    }

    /// 正在使用或等待中的锁数量
    pub fn len(&self) -> usize {
        self.registry().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
