//! 아카이브 작업 — 컷오프 이전 로그의 월별 내보내기와 일괄 삭제
//!
//! 실행 시점에 컷오프를 한 번 계산하고, 그보다 오래된 행만 다룹니다 —
//! 실행 중에 삽입되는 현재 월의 새 행은 건드리지 않습니다.
//! 모든 그룹의 파일 쓰기가 성공한 뒤에야 원본 행을 한 트랜잭션으로
//! 삭제합니다. 중간 실패 시 원본은 그대로 남고, 다음 실행이 같은
//! 윈도우를 재시도합니다 (at-least-once — 이미 기록된 CSV 행이
//! 다시 덧붙을 수 있다는 것이 허용된 실패 모드입니다).

use std::collections::BTreeMap;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Datelike, Duration, Utc};

use logward_core::metrics::{ARCHIVE_ROWS_TOTAL, ARCHIVE_RUNS_TOTAL, LABEL_RESULT};
use logward_core::types::LogRecord;
use logward_store::{Store, logs};

use crate::csv;
use crate::error::ArchiveJobError;

/// 아카이브 작업
#[derive(Debug, Clone)]
pub struct Archiver {
    root: PathBuf,
    retention_days: u32,
}

impl Archiver {
    /// 루트 디렉토리와 보존 기간으로 아카이버를 만듭니다.
    pub fn new(root: impl Into<PathBuf>, retention_days: u32) -> Self {
        Self {
            root: root.into(),
            retention_days,
        }
    }

    /// 보존 기간(일)을 반환합니다.
    pub fn retention_days(&self) -> u32 {
        self.retention_days
    }

    /// 아카이브 한 사이클을 실행하고 내보낸 행 수를 반환합니다.
    ///
    /// 대상 행이 없으면 파일 시스템을 건드리지 않고 0을 반환합니다.
    pub fn run(&self, store: &Store, now: DateTime<Utc>) -> Result<usize, ArchiveJobError> {
        let cutoff = now - Duration::days(i64::from(self.retention_days));
        let rows = store.with_conn(|conn| logs::older_than(conn, cutoff))?;
        if rows.is_empty() {
            tracing::debug!(cutoff = %cutoff, "no logs eligible for archiving");
            return Ok(0);
        }

        let grouped = group_by_month(&rows, now);
        for ((year, month), group) in &grouped {
            if let Err(e) = self.append_group(*year, *month, group) {
                metrics::counter!(ARCHIVE_RUNS_TOTAL, LABEL_RESULT => "failure").increment(1);
                // 어떤 행도 삭제되기 전에 중단 — 다음 실행이 재시도
                return Err(e);
            }
        }

        let ids: Vec<i64> = rows.iter().map(|r| r.id).collect();
        let deleted = store.with_tx(|tx| logs::delete_by_ids(tx, &ids))?;

        metrics::counter!(ARCHIVE_ROWS_TOTAL).increment(rows.len() as u64);
        metrics::counter!(ARCHIVE_RUNS_TOTAL, LABEL_RESULT => "success").increment(1);
        tracing::info!(
            archived = rows.len(),
            deleted,
            months = grouped.len(),
            cutoff = %cutoff,
            "archive run completed"
        );
        Ok(rows.len())
    }

    /// 한 (연, 월) 그룹을 해당 월 파일에 덧붙입니다.
    ///
    /// 새 파일에는 헤더를 먼저 쓰고, 기존 파일에는 헤더 없이
    /// 덧붙입니다.
    fn append_group(
        &self,
        year: i32,
        month: u32,
        rows: &[&LogRecord],
    ) -> Result<(), ArchiveJobError> {
        let year_dir = self.root.join(year.to_string());
        fs::create_dir_all(&year_dir).map_err(|e| ArchiveJobError::Write {
            path: year_dir.clone(),
            source: e,
        })?;

        let file_path = year_dir.join(format!("{year}-{month:02}.csv"));
        let is_new_file = !file_path.exists();

        let write_all = |path: &Path| -> std::io::Result<()> {
            let mut file = OpenOptions::new().create(true).append(true).open(path)?;
            if is_new_file {
                writeln!(file, "{}", csv::HEADER)?;
            }
            for row in rows {
                writeln!(file, "{}", csv::format_row(row))?;
            }
            file.flush()
        };

        write_all(&file_path).map_err(|e| ArchiveJobError::Write {
            path: file_path.clone(),
            source: e,
        })?;

        tracing::debug!(
            file = %file_path.display(),
            rows = rows.len(),
            new_file = is_new_file,
            "archive group written"
        );
        Ok(())
    }
}

/// 행을 (연, 월)로 묶습니다. 타임스탬프가 없는 행은 처리 시각으로
/// 귀속됩니다.
fn group_by_month(
    rows: &[LogRecord],
    now: DateTime<Utc>,
) -> BTreeMap<(i32, u32), Vec<&LogRecord>> {
    let mut grouped: BTreeMap<(i32, u32), Vec<&LogRecord>> = BTreeMap::new();
    for row in rows {
        let ts = row.timestamp.unwrap_or(now);
        grouped.entry((ts.year(), ts.month())).or_default().push(row);
    }
    grouped
}
