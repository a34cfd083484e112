//! 防抖自動儲存
//!
//! 本地修改先樂觀生效，之後在防抖計時器上持久化：
//! 安靜期內的連續編輯合併為一次寫入，較新的負載直接取代待存的
//! （被取代的計時等同清除，無顯式取消）。保存失敗只記日誌並留待
//! 下個防抖週期以當前狀態重試，永不回滾本地狀態。
//! 併發編輯為整次保存粒度的 last-write-wins，引擎不做記錄級鎖。

use std::sync::Arc;
use std::time::Duration;

use boq_core::SelectedLine;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::store::VersionItemStore;

/// 預設安靜期
pub const DEFAULT_QUIET_PERIOD: Duration = Duration::from_millis(800);

/// 保存請求：一次完整的工作集寫入
#[derive(Debug, Clone)]
pub struct SaveRequest {
    /// 專案ID
    pub project_id: Uuid,

    /// 版本ID
    pub version_id: Uuid,

    /// 待保存的行
    pub rows: Vec<SelectedLine>,
}

/// 自動儲存器
pub struct Autosaver {
    tx: mpsc::UnboundedSender<SaveRequest>,
}

impl Autosaver {
    /// 啟動防抖保存任務
    pub fn spawn<S>(store: Arc<S>, quiet_period: Duration) -> (Self, JoinHandle<()>)
    where
        S: VersionItemStore + 'static,
    {
        let (tx, rx) = mpsc::unbounded_channel();
        let handle = tokio::spawn(run(store, rx, quiet_period));
        (Self { tx }, handle)
    }

    /// 排程一次保存（樂觀更新已先行生效）
    pub fn schedule(&self, request: SaveRequest) {
        if self.tx.send(request).is_err() {
            tracing::warn!("自動儲存任務已結束，本次排程被丟棄");
        }
    }
}

async fn run<S>(
    store: Arc<S>,
    mut rx: mpsc::UnboundedReceiver<SaveRequest>,
    quiet_period: Duration,
) where
    S: VersionItemStore,
{
    while let Some(mut pending) = rx.recv().await {
        // 防抖：安靜期內收到的較新請求取代待存的
        loop {
            match tokio::time::timeout(quiet_period, rx.recv()).await {
                Ok(Some(next)) => pending = next,
                Ok(None) => {
                    // 發送端已關閉：保存最後一筆後收工
                    flush(store.as_ref(), pending).await;
                    return;
                }
                Err(_) => break,
            }
        }
        flush(store.as_ref(), pending).await;
    }
}

async fn flush<S: VersionItemStore>(store: &S, request: SaveRequest) {
    let row_count = request.rows.len();
    match store
        .upsert_rows(request.project_id, request.version_id, request.rows)
        .await
    {
        Ok(()) => {
            tracing::debug!("自動儲存完成：{} 行", row_count);
        }
        Err(err) => {
            // 非致命：不回滾本地狀態，下個防抖週期以當前狀態重試
            tracing::warn!("自動儲存失敗（{}），待下個週期重試", err);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::InMemoryStore;
    use boq_core::{BatchId, MaterialCategory, RowId, Unit, WorkPackageType};
    use rust_decimal::Decimal;

    fn row(material_id: &str, rate: i64) -> SelectedLine {
        SelectedLine {
            row_id: RowId::new(BatchId::from_raw("b1"), material_id),
            material_id: material_id.to_string(),
            product_name: material_id.to_string(),
            category: MaterialCategory::Hardware,
            unit: Unit::Nos,
            quantity: Decimal::ONE,
            supply_rate: Decimal::from(rate),
            install_rate: Decimal::ZERO,
            brand: String::new(),
            shop_id: None,
            shop_name: None,
            package_type: WorkPackageType::FlushDoor,
            sub_option: None,
            glazing_type: None,
            unit_count: 1,
        }
    }

    fn request(project_id: Uuid, version_id: Uuid, rate: i64) -> SaveRequest {
        SaveRequest {
            project_id,
            version_id,
            rows: vec![row("MAT-001", rate)],
        }
    }

    #[tokio::test]
    async fn test_rapid_edits_coalesce_to_one_write() {
        let store = Arc::new(InMemoryStore::new());
        let (saver, handle) = Autosaver::spawn(store.clone(), Duration::from_millis(30));
        let project_id = Uuid::new_v4();
        let version_id = Uuid::new_v4();

        // 三次快速編輯落在同一安靜期內
        saver.schedule(request(project_id, version_id, 100));
        saver.schedule(request(project_id, version_id, 110));
        saver.schedule(request(project_id, version_id, 120));

        tokio::time::sleep(Duration::from_millis(120)).await;

        // 只有最後一筆落盤
        let saved = store.saved_rows(project_id, version_id);
        assert_eq!(saved.len(), 1);
        assert_eq!(saved[0].supply_rate, Decimal::from(120));

        drop(saver);
        let _ = handle.await;
    }

    #[tokio::test]
    async fn test_failed_save_retries_next_cycle() {
        let store = Arc::new(InMemoryStore::new());
        let (saver, handle) = Autosaver::spawn(store.clone(), Duration::from_millis(20));
        let project_id = Uuid::new_v4();
        let version_id = Uuid::new_v4();

        // 第一個週期：存儲故障，保存失敗但不致命
        store.set_fail_saves(true);
        saver.schedule(request(project_id, version_id, 100));
        tokio::time::sleep(Duration::from_millis(80)).await;
        assert!(store.saved_rows(project_id, version_id).is_empty());

        // 故障恢復後，下一次編輯以當前狀態重試成功
        store.set_fail_saves(false);
        saver.schedule(request(project_id, version_id, 130));
        tokio::time::sleep(Duration::from_millis(80)).await;

        let saved = store.saved_rows(project_id, version_id);
        assert_eq!(saved.len(), 1);
        assert_eq!(saved[0].supply_rate, Decimal::from(130));

        drop(saver);
        let _ = handle.await;
    }

    #[tokio::test]
    async fn test_drop_flushes_last_pending() {
        let store = Arc::new(InMemoryStore::new());
        let (saver, handle) = Autosaver::spawn(store.clone(), Duration::from_millis(500));
        let project_id = Uuid::new_v4();
        let version_id = Uuid::new_v4();

        saver.schedule(request(project_id, version_id, 100));
        drop(saver); // 關閉發送端：最後一筆仍須落盤

        let _ = handle.await;
        assert_eq!(store.saved_rows(project_id, version_id).len(), 1);
    }
}
