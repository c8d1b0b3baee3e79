//! ワードローブ画像の生成待ちポーラー
//!
//! コーデ保存後、服アイテムごとのサムネイルはサーバー側で非同期に生成される。
//! 完了通知は来ないので、待ちのある行だけを定期的にまとめて再取得し、
//! 新しく届いたURLをローカルの行にマージして呼び出し側へ渡す。
//!
//! - 入力が変わったら `start` を呼び直す（前回の実行は必ず止まる）
//! - `stop` / drop 後に新しいフェッチは発生しない。stop と同時に結果を処理中だったティックの
//!   コールバックだけは完了し得る（キャンセル済みなら処理前に破棄する）
//! - ティックはタイマー駆動で、前のフェッチの完了を待たない。フェッチ自体に時間制限は設けない
//! - 各フェッチはティック番号付きで、適用済みより古い番号の結果は捨てる

pub mod merge;

use crate::error::Result;
use crate::notify::Notifier;
use crate::wardrobe::{ClothingItemsById, WardrobeSource};
use merge::{ids_needing_polling, merge_updates, pending_image_count};
use rate_my_fit_common::WardrobeItem;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::{JoinHandle, JoinSet};
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone, Copy)]
pub struct PollerConfig {
    pub interval: Duration,
    /// 「生成中」案内の最短間隔
    pub notice_cooldown: Duration,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(5),
            notice_cooldown: Duration::from_secs(30),
        }
    }
}

type LocalUpdate = Box<dyn FnMut(Vec<WardrobeItem>) + Send>;
type ItemsUpdated = Box<dyn FnMut() + Send>;

/// マージ結果の受け取り口
pub struct PollerCallbacks {
    local_update: LocalUpdate,
    on_items_updated: Option<ItemsUpdated>,
}

impl PollerCallbacks {
    pub fn new(local_update: impl FnMut(Vec<WardrobeItem>) + Send + 'static) -> Self {
        Self {
            local_update: Box::new(local_update),
            on_items_updated: None,
        }
    }

    pub fn on_items_updated(mut self, callback: impl FnMut() + Send + 'static) -> Self {
        self.on_items_updated = Some(Box::new(callback));
        self
    }
}

/// ポーリングタスクのハンドル（drop で停止）
pub struct WardrobePoller {
    source: Arc<dyn WardrobeSource>,
    notifier: Arc<dyn Notifier>,
    config: PollerConfig,
    last_notice: Option<Instant>,
    cancel: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl WardrobePoller {
    pub fn new(
        source: Arc<dyn WardrobeSource>,
        notifier: Arc<dyn Notifier>,
        config: PollerConfig,
    ) -> Self {
        Self {
            source,
            notifier,
            config,
            last_notice: None,
            cancel: CancellationToken::new(),
            task: None,
        }
    }

    /// 入力の行でポーリングを（再）開始する
    ///
    /// 前回の実行は無条件に止める。待ちが1件もなければタスクを作らず `false`。
    /// tokio ランタイム上で呼ぶこと。
    pub fn start(&mut self, items: Vec<WardrobeItem>, callbacks: PollerCallbacks) -> bool {
        self.stop();

        let pending_ids = ids_needing_polling(&items);
        if pending_ids.is_empty() {
            log::debug!("no wardrobe images pending, poller idle");
            return false;
        }

        self.announce(pending_image_count(&items));
        log::info!(
            "polling {} wardrobe items every {:?}",
            pending_ids.len(),
            self.config.interval
        );

        let cancel = CancellationToken::new();
        self.cancel = cancel.clone();
        self.task = Some(tokio::spawn(poll_loop(
            items,
            Arc::clone(&self.source),
            Arc::clone(&self.notifier),
            self.config.interval,
            cancel,
            callbacks,
        )));
        true
    }

    pub fn stop(&mut self) {
        self.cancel.cancel();
        if let Some(task) = self.task.take() {
            task.abort();
            log::debug!("wardrobe poller stopped");
        }
    }

    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }

    /// 全サムネイルが揃う（または停止される）まで待つ
    pub async fn wait(&mut self) {
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                if e.is_panic() {
                    log::error!("wardrobe poller task panicked: {}", e);
                }
            }
        }
    }

    fn announce(&mut self, pending_images: usize) {
        let now = Instant::now();
        let cooled_down = self
            .last_notice
            .map_or(true, |last| now.duration_since(last) >= self.config.notice_cooldown);
        if cooled_down {
            self.notifier.info(&format!(
                "{}件のアイテム画像を生成中です。完成すると自動で反映されます",
                pending_images
            ));
            self.last_notice = Some(now);
        }
    }
}

impl Drop for WardrobePoller {
    fn drop(&mut self) {
        self.stop();
    }
}

async fn poll_loop(
    mut items: Vec<WardrobeItem>,
    source: Arc<dyn WardrobeSource>,
    notifier: Arc<dyn Notifier>,
    interval: Duration,
    cancel: CancellationToken,
    mut callbacks: PollerCallbacks,
) {
    let mut ticker = tokio::time::interval_at(Instant::now() + interval, interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // drop 時に未完了のフェッチも abort される
    let mut in_flight: JoinSet<(u64, Result<ClothingItemsById>)> = JoinSet::new();
    let mut tick: u64 = 0;
    let mut applied_tick: u64 = 0;

    loop {
        if ids_needing_polling(&items).is_empty() {
            log::info!("all wardrobe images ready after {} ticks", tick);
            break;
        }

        tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            Some(joined) = in_flight.join_next() => {
                let (fetched_tick, fetched) = match joined {
                    Ok(done) => done,
                    Err(e) => {
                        if e.is_panic() {
                            log::error!("wardrobe fetch task panicked: {}", e);
                        }
                        continue;
                    }
                };

                if fetched_tick <= applied_tick {
                    log::debug!(
                        "discarding stale fetch from tick {} (applied {})",
                        fetched_tick,
                        applied_tick
                    );
                    continue;
                }

                let fetched = match fetched {
                    Ok(fetched) => fetched,
                    Err(e) => {
                        log::warn!("wardrobe fetch failed on tick {}: {}", fetched_tick, e);
                        continue;
                    }
                };
                applied_tick = fetched_tick;

                if let Some(outcome) = merge_updates(&items, &fetched) {
                    if cancel.is_cancelled() {
                        break;
                    }
                    log::debug!(
                        "tick {}: {} new render images",
                        fetched_tick,
                        outcome.newly_completed
                    );
                    items = outcome.items;
                    (callbacks.local_update)(items.clone());
                    notifier.success(&format!(
                        "{}件の新しいアイテム画像が届きました",
                        outcome.newly_completed
                    ));
                    if let Some(on_items_updated) = callbacks.on_items_updated.as_mut() {
                        on_items_updated();
                    }
                }
            }
            _ = ticker.tick() => {
                tick += 1;
                if !in_flight.is_empty() {
                    log::debug!("tick {}: {} fetches still in flight", tick, in_flight.len());
                }
                let ids = ids_needing_polling(&items);
                let source = Arc::clone(&source);
                let this_tick = tick;
                in_flight.spawn(async move {
                    (this_tick, source.fetch_clothing_items(&ids).await)
                });
            }
        }
    }
}
