//! Nightly maintenance jobs
//!
//! At local midnight the scheduler generates the daily digest and runs the
//! memory bank audit. On Sundays it also regenerates the memory map of the
//! configured entry file. Jobs go through the router like any other caller
//! and a failing job never stops the others.

use chrono::{DateTime, Datelike, Days, Local, TimeZone, Weekday};
use sdk::core_tool::RouterHandle;
use sdk::protocol::ToolRequest;
use sdk::types::{DailyDigestArgs, MemoryBankArgs, MemoryBankResult, MemoryMapArgs};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::config::Config;

/// Outcome of one nightly run
#[derive(Debug, Default, Clone, PartialEq)]
pub struct NightlyRun {
    pub digest_path: Option<String>,
    pub audit_log_path: Option<String>,
    pub memory_map_path: Option<String>,
    pub failures: Vec<String>,
}

/// The first midnight strictly after `now`, in `now`'s time zone
pub fn next_midnight<Tz: TimeZone>(now: &DateTime<Tz>) -> Option<DateTime<Tz>> {
    now.date_naive()
        .checked_add_days(Days::new(1))?
        .and_hms_opt(0, 0, 0)?
        .and_local_timezone(now.timezone())
        .earliest()
}

pub struct Scheduler {
    router: RouterHandle,
    config: Arc<Config>,
}

impl Scheduler {
    pub fn new(router: RouterHandle, config: Arc<Config>) -> Self {
        Self { router, config }
    }

    /// Run the jobs due on `weekday`
    pub async fn run_nightly(&self, weekday: Weekday) -> NightlyRun {
        let mut run = NightlyRun::default();

        match self
            .router
            .call(ToolRequest::DailyDigest(DailyDigestArgs::default()))
            .await
            .and_then(|r| r.into_digest())
        {
            Ok(digest) => run.digest_path = Some(digest.path),
            Err(e) => {
                warn!("Scheduled daily digest failed: {}", e);
                run.failures.push(format!("daily_digest: {}", e));
            }
        }

        let audit = MemoryBankArgs::audit_daily(Some(self.config.memory.audit_report.clone()));
        match self
            .router
            .call(ToolRequest::MemoryBank(audit))
            .await
            .and_then(|r| r.into_memory_bank())
        {
            Ok(MemoryBankResult::Audit(report)) => {
                run.audit_log_path = Some(report.audit_log_path)
            }
            Ok(_) => run.failures.push("audit_daily: unexpected result".to_string()),
            Err(e) => {
                warn!("Scheduled memory audit failed: {}", e);
                run.failures.push(format!("audit_daily: {}", e));
            }
        }

        if weekday == Weekday::Sun {
            let entry = self.config.schedule.memory_map_entry.clone();
            match self
                .router
                .call(ToolRequest::MemoryMap(MemoryMapArgs { file_path: entry }))
                .await
                .and_then(|r| r.into_memory_map())
            {
                Ok(map) => run.memory_map_path = Some(map.memory_map_path),
                Err(e) => {
                    warn!("Scheduled memory map failed: {}", e);
                    run.failures.push(format!("generate_memory_map: {}", e));
                }
            }
        }

        info!(
            "Nightly run finished with {} failure(s)",
            run.failures.len()
        );
        run
    }

    /// Sleep until each local midnight and run the due jobs, forever
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(async move {
            loop {
                let now = Local::now();
                let wait = next_midnight(&now)
                    .and_then(|next| (next - now).to_std().ok())
                    .unwrap_or(Duration::from_secs(3600));

                info!("Next scheduled run in {}s", wait.as_secs());
                tokio::time::sleep(wait).await;

                self.run_nightly(Local::now().weekday()).await;
            }
        })
    }
}
