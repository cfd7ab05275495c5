//! 스케줄러 상태 스냅샷.

use crate::job::{JobRecord, JobState};
use chrono::{DateTime, Utc};
use market_core::{MarketSession, Timeframe};
use serde::Serialize;
use std::fmt;

/// 스케줄러 전체 생명주기.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Lifecycle {
    Stopped,
    Starting,
    Started,
    Stopping,
}

impl fmt::Display for Lifecycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Lifecycle::Stopped => "stopped",
            Lifecycle::Starting => "starting",
            Lifecycle::Started => "started",
            Lifecycle::Stopping => "stopping",
        };
        f.write_str(s)
    }
}

/// 작업별 상태.
#[derive(Debug, Clone, Serialize)]
pub struct JobStatus {
    pub timeframe: Timeframe,
    pub policy: String,
    pub trigger: String,
    #[serde(flatten)]
    pub record: JobRecord,
}

/// 스케줄러 상태 스냅샷.
#[derive(Debug, Clone, Serialize)]
pub struct SchedulerStatus {
    pub lifecycle: Lifecycle,
    pub generated_at: DateTime<Utc>,
    pub market_session: MarketSession,
    pub next_market_open: DateTime<Utc>,
    pub universe_size: usize,
    pub jobs: Vec<JobStatus>,
    /// 다음 보관 기간 정리 예정 시각
    pub next_cleanup: Option<DateTime<Utc>>,
}

impl SchedulerStatus {
    pub fn job(&self, timeframe: Timeframe) -> Option<&JobStatus> {
        self.jobs.iter().find(|j| j.timeframe == timeframe)
    }

    pub fn running_jobs(&self) -> usize {
        self.jobs
            .iter()
            .filter(|j| j.record.state == JobState::Running)
            .count()
    }
}

fn fmt_time(ts: Option<DateTime<Utc>>) -> String {
    ts.map(|t| t.format("%Y-%m-%d %H:%M:%S UTC").to_string())
        .unwrap_or_else(|| "-".to_string())
}

impl fmt::Display for SchedulerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Scheduler:     {}", self.lifecycle)?;
        writeln!(f, "Market:        {}", self.market_session)?;
        writeln!(f, "Next open:     {}", fmt_time(Some(self.next_market_open)))?;
        writeln!(f, "Universe:      {} symbols", self.universe_size)?;
        writeln!(f, "Next cleanup:  {}", fmt_time(self.next_cleanup))?;
        writeln!(f)?;
        writeln!(
            f,
            "{:<5} {:<8} {:<9} {:<25} {:<25} {:>5} {:>5}  {}",
            "TF", "STATE", "POLICY", "LAST UPDATE", "NEXT FIRE", "RUNS", "FAIL", "LAST"
        )?;
        for job in &self.jobs {
            let r = &job.record;
            writeln!(
                f,
                "{:<5} {:<8} {:<9} {:<25} {:<25} {:>5} {:>5}  {}",
                job.timeframe.to_string(),
                r.state.to_string(),
                job.policy,
                fmt_time(r.last_update),
                fmt_time(r.next_fire),
                r.runs,
                r.failures,
                r.last_outcome.as_deref().unwrap_or("-"),
            )?;
            if let Some(err) = &r.last_error {
                writeln!(f, "      error: {}", err)?;
            }
        }
        Ok(())
    }
}
