use std::path::PathBuf;
use std::time::Duration;

use connector_select::monitor::ProcessStatus;
use connector_select::sqlite::SQLiteDriver;
use connector_select::{
    Binds, ConnectParams, ConnectorError, Database, MonitorError, ProcessMonitor, Row, RowType,
    Select, Value,
};
use tempfile::TempDir;

use crate::util::{init_logging, FakeClock};

struct Fixture {
    // keeps the directory alive
    _dir: TempDir,
    path: PathBuf,
}

impl Fixture {
    fn new() -> Self {
        init_logging();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hr.db");

        let conn = rusqlite::Connection::open(&path).unwrap();
        conn.execute_batch(
            "
            CREATE TABLE employees (
                emplid VARCHAR(11) NOT NULL,
                name VARCHAR(50),
                salary REAL,
                hired DATETIME,
                notes CLOB,
                photo BLOB
            );
            INSERT INTO employees VALUES
                ('KU0001', 'Ada', 5100.5, '2001-02-03 04:05:06', 'first hire', x'0102'),
                ('KU0002', 'Grace', 4800, '2003-04-05 06:07:08', NULL, NULL),
                ('KU0003', 'Linus', NULL, NULL, 'part time', NULL);

            CREATE TABLE ps_pmn_prcslist (
                prcsinstance INTEGER PRIMARY KEY,
                prcsname VARCHAR(12),
                prcstype VARCHAR(30),
                runcntlid VARCHAR(30),
                runstatus VARCHAR(2),
                begindttm DATETIME,
                enddttm DATETIME
            );
            INSERT INTO ps_pmn_prcslist VALUES
                (101, 'AEJOB', 'Application Engine', 'nightly', '9', '2024-03-01 01:00:00', '2024-03-01 01:05:00'),
                (102, 'SQRRPT', 'SQR Report', 'nightly', '9', '2024-03-01 01:00:00', '2024-03-01 01:07:30'),
                (103, 'COBOL1', 'COBOL SQL', 'nightly', '3', '2024-03-01 01:00:00', NULL);
            ",
        )
        .unwrap();
        conn.close().unwrap();

        Fixture { _dir: dir, path }
    }

    fn database(&self) -> Database<SQLiteDriver> {
        let url = format!("sqlite://{}", self.path.display());
        Database::new(SQLiteDriver, ConnectParams::from_url(&url).unwrap())
    }
}

#[test]
fn select_dicts() {
    let fixture = Fixture::new();
    let rows = fixture
        .database()
        .select_all("SELECT * FROM employees ORDER BY emplid")
        .unwrap();

    assert_eq!(rows.len(), 3);
    let ada = &rows[0];
    assert_eq!(ada.get("EMPLID"), Some(&Value::Text("KU0001".into())));
    assert_eq!(ada.get("salary"), Some(&Value::Float(5100.5)));
    assert_eq!(
        ada.get("hired").and_then(Value::as_timestamp).map(|t| t.to_string()),
        Some("2001-02-03 04:05:06".to_string())
    );
    assert_eq!(ada.get("notes"), Some(&Value::Text("first hire".into())));
    assert_eq!(ada.get("photo"), Some(&Value::Bytes(vec![1, 2])));

    let linus = &rows[2];
    assert_eq!(linus.get("salary"), Some(&Value::Null));
    assert_eq!(linus.get("hired"), Some(&Value::Null));
}

#[test]
fn select_records() {
    let fixture = Fixture::new();
    let rows = fixture
        .database()
        .select(
            "SELECT emplid, name FROM employees ORDER BY emplid",
            None,
            2,
            RowType::Record,
        )
        .unwrap();

    assert_eq!(rows.len(), 2);
    let Row::Record(grace) = &rows[1] else {
        panic!("expected a record");
    };
    assert_eq!(grace.fields(), ["emplid", "name"]);
    assert_eq!(grace[1], Value::Text("Grace".into()));
    assert_eq!(grace.get("NAME"), Some(&Value::Text("Grace".into())));
}

#[test]
fn positional_binds() {
    let fixture = Fixture::new();
    let binds = Binds::positional([4900]);
    let rows = fixture
        .database()
        .select(
            "SELECT name FROM employees WHERE salary < ?",
            Some(&binds),
            0,
            RowType::Dict,
        )
        .unwrap();

    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].get("name"), Some(&Value::Text("Grace".into())));
}

#[test]
fn named_binds() {
    let fixture = Fixture::new();
    let db = fixture.database();

    let binds = Binds::named([("emplid", "KU0003")]);
    let rows = db
        .select(
            "SELECT name FROM employees WHERE emplid = :emplid",
            Some(&binds),
            0,
            RowType::Dict,
        )
        .unwrap();
    assert_eq!(rows[0].get("name"), Some(&Value::Text("Linus".into())));

    // prefixed names are passed as they are
    let binds = Binds::named([("$id", "KU0001")]);
    let rows = db
        .select(
            "SELECT name FROM employees WHERE emplid = $id",
            Some(&binds),
            0,
            RowType::Dict,
        )
        .unwrap();
    assert_eq!(rows[0].get("name"), Some(&Value::Text("Ada".into())));
}

#[test]
fn batches_over_a_large_result() {
    let fixture = Fixture::new();
    let sql = "
        WITH RECURSIVE seq(n) AS (SELECT 1 UNION ALL SELECT n + 1 FROM seq WHERE n < 2500)
        SELECT n FROM seq
    ";

    let mut iter = fixture.database().select_iter(sql, None, 1000, None).unwrap();
    assert_eq!(iter.fields(), ["n"]);

    let mut sizes = Vec::new();
    let mut last = None;
    for batch in &mut iter {
        let batch = batch.unwrap();
        sizes.push(batch.len());
        last = batch.last().and_then(|row| row.get("n").cloned());
    }

    assert_eq!(sizes, [1000, 1000, 500]);
    assert_eq!(last, Some(Value::Integer(2500)));
    assert!(iter.is_closed());
}

#[test]
fn batches_stop_after_max_rows() {
    let fixture = Fixture::new();
    let sizes: Vec<_> = fixture
        .database()
        .select_iter("SELECT * FROM employees", None, 2, Some(1))
        .unwrap()
        .map(|batch| batch.unwrap().len())
        .collect();

    assert_eq!(sizes, [2]);
}

#[test]
fn invalid_sql() {
    let fixture = Fixture::new();
    let db = fixture.database();

    let err = db.select_all("SELECT * FROM nope").unwrap_err();
    assert!(matches!(err, ConnectorError::SQLite(_)));
    assert!(err.to_string().contains("no such table"));

    // the connection was released, the database is still usable
    assert_eq!(db.select_all("SELECT 1 AS one").unwrap().len(), 1);
}

#[test]
fn memory_url() {
    init_logging();
    let params = ConnectParams::from_url("sqlite::memory:").unwrap();
    let db = Database::new(SQLiteDriver, params);

    let rows = db.select_all("SELECT 'it''s' AS quote").unwrap();
    insta::assert_snapshot!(rows[0].to_json(), @r###"{"quote":"it's"}"###);
}

#[test]
fn monitor_against_the_process_list() {
    let fixture = Fixture::new();
    let db = fixture.database();
    let clock = FakeClock::new();

    let records = ProcessMonitor::new()
        .on_poll(|_| {})
        .clock(&clock)
        .run(&db, [101, 102])
        .unwrap();

    assert_eq!(records.len(), 2);
    assert_eq!(records[1].name, "SQRRPT");
    assert_eq!(records[1].run_status, 9);
    assert_eq!(
        records[1].end.map(|t| t.to_string()).as_deref(),
        Some("2024-03-01 01:07:30")
    );

    let err = ProcessMonitor::new()
        .on_poll(|_| {})
        .clock(&clock)
        .timeout(Duration::from_secs(30))
        .run(&db, vec![101, 102, 103])
        .unwrap_err();
    assert!(matches!(err, MonitorError::JobFailure));
    assert_eq!(clock.sleeps.get(), 0);

    let records = ProcessMonitor::new()
        .on_poll(|_| {})
        .clock(&clock)
        .on_failure(|records| assert_eq!(records[0].status, ProcessStatus::Failed))
        .run(&db, 103);
    assert!(records.is_err());
}
