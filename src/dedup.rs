//! 解析リクエストの重複抑止
//!
//! 同じ (画像, 性別, モード) の解析が一定時間内に二重発行されるのを防ぎ、
//! 同時実行数に上限を設ける。メモリ上のみのベストエフォートな仕組みで、
//! 再起動をまたがない。
//!
//! 呼び出し側は `is_duplicate` / `can_make_request` の判定から `start_request` までの間に
//! `.await` を挟まないこと（判定と登録が分断される）。

use rate_my_fit_common::{compute_fingerprint, FeedbackMode, Gender, RequestFingerprint};
use std::collections::HashMap;
use std::time::Duration;
use tokio::time::Instant;

#[derive(Debug, Clone, Copy)]
pub struct DedupConfig {
    /// 同一リクエストを抑止する期間
    pub dedup_window: Duration,
    pub max_concurrent_requests: usize,
}

impl Default for DedupConfig {
    fn default() -> Self {
        Self {
            dedup_window: Duration::from_millis(30_000),
            max_concurrent_requests: 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestStatus {
    Pending,
    Completed,
    Failed,
}

#[derive(Debug, Clone)]
pub struct TrackedRequest {
    pub id: RequestFingerprint,
    pub created_at: Instant,
    pub status: RequestStatus,
}

#[derive(Debug, Default)]
pub struct Deduplicator {
    config: DedupConfig,
    requests: HashMap<RequestFingerprint, TrackedRequest>,
}

impl Deduplicator {
    pub fn new(config: DedupConfig) -> Self {
        Self {
            config,
            requests: HashMap::new(),
        }
    }

    pub fn config(&self) -> &DedupConfig {
        &self.config
    }

    pub fn compute_fingerprint(
        &self,
        image_data: &[u8],
        gender: Gender,
        feedback_mode: FeedbackMode,
    ) -> RequestFingerprint {
        compute_fingerprint(image_data, gender, feedback_mode)
    }

    /// 期間内に Pending / Completed の同一リクエストがあるか
    ///
    /// Failed は即座に再試行できるよう重複扱いしない。
    pub fn is_duplicate(
        &mut self,
        image_data: &[u8],
        gender: Gender,
        feedback_mode: FeedbackMode,
    ) -> bool {
        let now = Instant::now();
        self.purge_expired(now);

        let fingerprint = compute_fingerprint(image_data, gender, feedback_mode);
        let duplicate = self.requests.get(&fingerprint).is_some_and(|req| {
            now.duration_since(req.created_at) < self.config.dedup_window
                && matches!(req.status, RequestStatus::Pending | RequestStatus::Completed)
        });

        if duplicate {
            log::debug!("duplicate analysis request suppressed: {}", fingerprint);
        }
        duplicate
    }

    pub fn can_make_request(&self) -> bool {
        self.pending_count() < self.config.max_concurrent_requests
    }

    /// Pending として登録（同じ指紋は上書き）
    pub fn start_request(
        &mut self,
        image_data: &[u8],
        gender: Gender,
        feedback_mode: FeedbackMode,
    ) -> RequestFingerprint {
        let fingerprint = compute_fingerprint(image_data, gender, feedback_mode);
        self.requests.insert(
            fingerprint.clone(),
            TrackedRequest {
                id: fingerprint.clone(),
                created_at: Instant::now(),
                status: RequestStatus::Pending,
            },
        );
        log::debug!("analysis request started: {}", fingerprint);
        fingerprint
    }

    pub fn complete_request(&mut self, fingerprint: &RequestFingerprint) {
        self.transition(fingerprint, RequestStatus::Completed);
    }

    pub fn fail_request(&mut self, fingerprint: &RequestFingerprint) {
        self.transition(fingerprint, RequestStatus::Failed);
    }

    pub fn status(&self, fingerprint: &RequestFingerprint) -> Option<RequestStatus> {
        self.requests.get(fingerprint).map(|req| req.status)
    }

    pub fn pending_count(&self) -> usize {
        self.requests
            .values()
            .filter(|req| req.status == RequestStatus::Pending)
            .count()
    }

    pub fn len(&self) -> usize {
        self.requests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }

    // 既に期限切れで消えていても何もしない
    fn transition(&mut self, fingerprint: &RequestFingerprint, status: RequestStatus) {
        match self.requests.get_mut(fingerprint) {
            Some(req) => req.status = status,
            None => log::debug!("request already expired: {}", fingerprint),
        }
    }

    fn purge_expired(&mut self, now: Instant) {
        let window = self.config.dedup_window;
        self.requests
            .retain(|_, req| now.duration_since(req.created_at) < window);
    }
}
