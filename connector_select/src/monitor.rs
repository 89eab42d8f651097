//! Polling PeopleSoft Process Scheduler instances until they complete.
//!
//! The classification of status codes ([ProcessStatus], [BatchStatus]) is pure.
//! Waiting goes through a [Clock] and progress display through the `on_poll`
//! callback, so the loop can run without real time passing.

use std::fmt;
use std::thread;
use std::time::{Duration, Instant};

use chrono::NaiveDateTime;

use crate::database::Select;
use crate::errors::MonitorError;
use crate::format::{format_list, SqlLiteral};
use crate::row::{Row, RowType};

const WORKING_CODES: &[i64] = &[5, 6, 7, 11, 14, 15, 16, 18];
const FINISHED_CODES: &[i64] = &[9];

pub const DEFAULT_FREQUENCY: Duration = Duration::from_secs(5);
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60 * 60 * 4);

/// State of a single process, derived from its run status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessStatus {
    Working,
    Finished,
    Failed,
}

impl ProcessStatus {
    /// Codes that are neither finished nor working (error, cancelled, ...) count as failed.
    pub fn from_code(code: i64) -> Self {
        if FINISHED_CODES.contains(&code) {
            ProcessStatus::Finished
        } else if WORKING_CODES.contains(&code) {
            ProcessStatus::Working
        } else {
            ProcessStatus::Failed
        }
    }
}

impl fmt::Display for ProcessStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ProcessStatus::Working => "Working",
            ProcessStatus::Finished => "Finished",
            ProcessStatus::Failed => "Failed",
        })
    }
}

/// State of a whole set of processes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchStatus {
    Complete,
    Failed,
    Working,
}

impl BatchStatus {
    /// Failed if any process failed, complete if all have finished.
    pub fn of(records: &[ProcessRecord]) -> Self {
        if records.iter().any(|r| r.status == ProcessStatus::Failed) {
            BatchStatus::Failed
        } else if records.iter().all(|r| r.status == ProcessStatus::Finished) {
            BatchStatus::Complete
        } else {
            BatchStatus::Working
        }
    }
}

impl fmt::Display for BatchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            BatchStatus::Complete => "Complete",
            BatchStatus::Failed => "Failed",
            BatchStatus::Working => "Working",
        })
    }
}

/// One row of the process list.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessRecord {
    pub instance: i64,
    pub name: String,
    pub process_type: String,
    pub run_control_id: String,
    pub run_status: i64,
    pub begin: Option<NaiveDateTime>,
    pub end: Option<NaiveDateTime>,
    pub status: ProcessStatus,
}

impl TryFrom<&Row> for ProcessRecord {
    type Error = MonitorError;

    fn try_from(row: &Row) -> Result<Self, Self::Error> {
        let get = |name: &'static str| row.get(name).ok_or(MonitorError::MissingColumn(name));
        let text = |name: &'static str| -> Result<String, MonitorError> {
            let value = get(name)?;
            Ok(if value.is_null() {
                String::new()
            } else {
                value.to_string()
            })
        };

        let instance_value = get("prcsinstance")?;
        let instance = instance_value
            .as_i64()
            .ok_or_else(|| MonitorError::InvalidStatus {
                instance: instance_value.to_string(),
                status: "<invalid instance>".to_string(),
            })?;

        let status_value = get("runstatus")?;
        let run_status = status_value
            .as_i64()
            .ok_or_else(|| MonitorError::InvalidStatus {
                instance: instance.to_string(),
                status: status_value.to_string(),
            })?;

        Ok(ProcessRecord {
            instance,
            name: text("prcsname")?,
            process_type: text("prcstype")?,
            run_control_id: text("runcntlid")?,
            run_status,
            begin: get("begindttm")?.as_timestamp(),
            end: get("enddttm")?.as_timestamp(),
            status: ProcessStatus::from_code(run_status),
        })
    }
}

/// Process instance ids to monitor: a single id or a list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessIds(Vec<String>);

impl ProcessIds {
    pub fn as_slice(&self) -> &[String] {
        &self.0
    }
}

macro_rules! impl_process_ids_from {
    ($($t: ty,)+) => {
        $(
            impl From<$t> for ProcessIds {
                fn from(id: $t) -> Self {
                    ProcessIds(vec![id.to_string()])
                }
            }

            impl From<Vec<$t>> for ProcessIds {
                fn from(ids: Vec<$t>) -> Self {
                    ProcessIds(ids.iter().map(|id| id.to_string()).collect())
                }
            }

            impl From<&[$t]> for ProcessIds {
                fn from(ids: &[$t]) -> Self {
                    ProcessIds(ids.iter().map(|id| id.to_string()).collect())
                }
            }

            impl<const N: usize> From<[$t; N]> for ProcessIds {
                fn from(ids: [$t; N]) -> Self {
                    ProcessIds(ids.iter().map(|id| id.to_string()).collect())
                }
            }
        )+
    };
}

impl_process_ids_from!(i32, i64, u32, u64, String, &str,);

/// Query selecting the process list rows of all `ids`.
pub fn status_query(ids: &ProcessIds) -> Result<String, MonitorError> {
    let list = format_list(ids.0.iter().map(SqlLiteral::from), false)?;
    Ok(format!(
        "SELECT prcsinstance, prcsname, prcstype, runcntlid, runstatus, begindttm, enddttm \
         FROM ps_pmn_prcslist \
         WHERE prcsinstance IN ({list}) \
         ORDER BY prcsinstance"
    ))
}

/// Source of time for the poll loop.
pub trait Clock {
    fn now(&self) -> Instant;

    fn sleep(&self, duration: Duration);
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn sleep(&self, duration: Duration) {
        thread::sleep(duration)
    }
}

/// What a single poll saw, passed to the `on_poll` callback.
#[derive(Debug)]
pub struct PollReport<'a> {
    pub at: chrono::DateTime<chrono::Local>,
    pub status: BatchStatus,
    pub records: &'a [ProcessRecord],
}

pub type RecordsCallback<'a> = Box<dyn FnMut(&[ProcessRecord]) + 'a>;
pub type PollCallback<'a> = Box<dyn FnMut(&PollReport) + 'a>;

/// Polls the process list every `frequency` until all processes finished,
/// one of them failed, or `timeout` passed.
pub struct ProcessMonitor<'a> {
    frequency: Duration,
    timeout: Duration,
    on_success: Option<RecordsCallback<'a>>,
    on_failure: Option<RecordsCallback<'a>>,
    on_poll: PollCallback<'a>,
    clock: Box<dyn Clock + 'a>,
}

impl<'a> Default for ProcessMonitor<'a> {
    fn default() -> Self {
        ProcessMonitor {
            frequency: DEFAULT_FREQUENCY,
            timeout: DEFAULT_TIMEOUT,
            on_success: None,
            on_failure: None,
            on_poll: Box::new(log_poll),
            clock: Box::new(SystemClock),
        }
    }
}

impl<'a> ProcessMonitor<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn frequency(mut self, frequency: Duration) -> Self {
        self.frequency = frequency;
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Called with all processes once all of them have finished.
    pub fn on_success(mut self, f: impl FnMut(&[ProcessRecord]) + 'a) -> Self {
        self.on_success = Some(Box::new(f));
        self
    }

    /// Called with all processes once any of them has failed.
    pub fn on_failure(mut self, f: impl FnMut(&[ProcessRecord]) + 'a) -> Self {
        self.on_failure = Some(Box::new(f));
        self
    }

    /// Called after every poll. Replaces the default, which logs the status.
    pub fn on_poll(mut self, f: impl FnMut(&PollReport) + 'a) -> Self {
        self.on_poll = Box::new(f);
        self
    }

    pub fn clock(mut self, clock: impl Clock + 'a) -> Self {
        self.clock = Box::new(clock);
        self
    }

    /// Poll until the processes reach a terminal state.
    ///
    /// Returns the final process list if all of them finished.
    pub fn run<S: Select>(
        &mut self,
        db: &S,
        ids: impl Into<ProcessIds>,
    ) -> Result<Vec<ProcessRecord>, MonitorError> {
        let sql = status_query(&ids.into())?;
        let start = self.clock.now();

        while self.clock.now().duration_since(start) <= self.timeout {
            let records = poll(db, &sql)?;
            let status = BatchStatus::of(&records);

            (self.on_poll)(&PollReport {
                at: chrono::Local::now(),
                status,
                records: records.as_slice(),
            });

            match status {
                BatchStatus::Complete => {
                    if let Some(on_success) = self.on_success.as_mut() {
                        on_success(records.as_slice());
                    }
                    return Ok(records);
                }
                BatchStatus::Failed => {
                    if let Some(on_failure) = self.on_failure.as_mut() {
                        on_failure(records.as_slice());
                    }
                    return Err(MonitorError::JobFailure);
                }
                BatchStatus::Working => self.clock.sleep(self.frequency),
            }
        }
        Err(MonitorError::Timeout(self.timeout))
    }
}

fn poll<S: Select>(db: &S, sql: &str) -> Result<Vec<ProcessRecord>, MonitorError> {
    let rows = db.select(sql, None, 0, RowType::Dict)?;
    if rows.is_empty() {
        return Err(MonitorError::NoProcesses);
    }
    rows.iter().map(ProcessRecord::try_from).collect()
}

fn log_poll(report: &PollReport) {
    log::info!("{}: {}", report.at.format("%I:%M:%S %p"), report.status);
    for record in report.records {
        log::debug!(
            "{} {} {} {}",
            record.instance,
            record.name,
            record.run_control_id,
            record.status
        );
    }
}

/// Monitor `processes` with optional callbacks, see [ProcessMonitor].
pub fn process_monitor<'a, S: Select>(
    db: &S,
    processes: impl Into<ProcessIds>,
    frequency: Duration,
    timeout: Duration,
    on_success: Option<RecordsCallback<'a>>,
    on_failure: Option<RecordsCallback<'a>>,
) -> Result<Vec<ProcessRecord>, MonitorError> {
    let mut monitor = ProcessMonitor::new().frequency(frequency).timeout(timeout);
    monitor.on_success = on_success;
    monitor.on_failure = on_failure;
    monitor.run(db, processes)
}
