//! 髒標記追蹤
//!
//! 記錄自上次成功排程以來被樂觀修改的行，
//! 決定下一個自動儲存負載包含哪些行

use boq_core::RowId;
use std::collections::HashSet;

/// 髒標記追蹤器
#[derive(Debug, Default)]
pub struct DirtyTracker {
    dirty_rows: HashSet<RowId>,
}

impl DirtyTracker {
    /// 創建新的追蹤器
    pub fn new() -> Self {
        Self::default()
    }

    /// 標記行為髒
    pub fn mark_dirty(&mut self, row_id: RowId) {
        self.dirty_rows.insert(row_id);
    }

    /// 檢查行是否為髒
    pub fn is_dirty(&self, row_id: &RowId) -> bool {
        self.dirty_rows.contains(row_id)
    }

    /// 取走全部髒行並清空標記
    pub fn take(&mut self) -> Vec<RowId> {
        self.dirty_rows.drain().collect()
    }

    /// 清除所有髒標記
    pub fn clear(&mut self) {
        self.dirty_rows.clear();
    }

    pub fn len(&self) -> usize {
        self.dirty_rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dirty_rows.is_empty()
    }
}
