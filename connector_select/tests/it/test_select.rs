use connector_select::{Binds, ConnectorError, Row, RowType, Select, Value};

use crate::util::{init_logging, MockDriver};

#[test]
fn select_all_rows() {
    init_logging();
    let driver = MockDriver::with_rows(25);

    for row_type in [RowType::Dict, RowType::Record] {
        let rows = driver
            .database()
            .select("SELECT * FROM t", None, 0, row_type)
            .unwrap();
        assert_eq!(rows.len(), 25);
    }
    driver.events.assert_all_closed();
    assert_eq!(driver.events.connects.get(), 2);
}

#[test]
fn select_at_most_fetch_rows() {
    let driver = MockDriver::with_rows(25);
    let db = driver.database();

    let count = |fetch| {
        db.select("SELECT * FROM t", None, fetch, RowType::Dict)
            .unwrap()
            .len()
    };
    assert_eq!(count(10), 10);
    assert_eq!(count(25), 25);
    assert_eq!(count(100), 25);
    driver.events.assert_all_closed();
}

#[test]
fn select_empty_result() {
    let driver = MockDriver::with_rows(0);
    let rows = driver.database().select_all("SELECT * FROM t").unwrap();
    assert!(rows.is_empty());
    driver.events.assert_all_closed();
}

#[test]
fn row_shapes() {
    let driver = MockDriver::with_rows(2);
    let db = driver.database();

    let rows = db.select("SELECT * FROM t", None, 0, RowType::Dict).unwrap();
    assert!(matches!(rows[1], Row::Map(_)));
    assert_eq!(rows[1].get("id"), Some(&Value::Integer(1)));
    assert_eq!(rows[1].get("name"), Some(&Value::Text("row 1".into())));

    let rows = db.select("SELECT * FROM t", None, 0, RowType::Record).unwrap();
    let Row::Record(record) = &rows[0] else {
        panic!("expected a record");
    };
    assert_eq!(record.fields(), ["id", "name"]);
    assert_eq!(record.values(), [Value::Integer(0), Value::Text("row 0".into())]);
}

#[test]
fn closes_once_on_execute_error() {
    let driver = MockDriver {
        fail_execute: true,
        ..MockDriver::with_rows(3)
    };

    let err = driver
        .database()
        .select("SELECT * FROM missing", None, 0, RowType::Dict)
        .unwrap_err();

    assert!(err.to_string().contains("ORA-00942"));
    assert_eq!(driver.events.connects.get(), 1);
    assert_eq!(driver.events.cursor_closes.get(), 1);
    assert_eq!(driver.events.conn_closes.get(), 1);
}

#[test]
fn closes_once_on_fetch_error() {
    let driver = MockDriver {
        fail_fetch_at: Some(2),
        ..MockDriver::with_rows(5)
    };

    let err = driver
        .database()
        .select("SELECT * FROM t", None, 0, RowType::Dict)
        .unwrap_err();

    assert!(err.to_string().contains("ORA-03113"));
    assert_eq!(driver.events.cursor_closes.get(), 1);
    assert_eq!(driver.events.conn_closes.get(), 1);
}

#[test]
fn fetch_error_past_the_limit_is_not_reached() {
    let driver = MockDriver {
        fail_fetch_at: Some(3),
        ..MockDriver::with_rows(5)
    };

    let rows = driver
        .database()
        .select("SELECT * FROM t", None, 3, RowType::Dict)
        .unwrap();
    assert_eq!(rows.len(), 3);
    driver.events.assert_all_closed();
}

#[test]
fn schema_is_applied_to_every_connection() {
    let driver = MockDriver::with_rows(1);
    let db = driver.database_with_schema("SYSADM");

    db.select_all("SELECT 1 FROM dual").unwrap();
    db.select_all("SELECT 1 FROM dual").unwrap();

    assert_eq!(*driver.events.schemas.borrow(), ["SYSADM", "SYSADM"]);
}

#[test]
fn schema_failure_closes_connection() {
    let driver = MockDriver {
        fail_schema: true,
        ..MockDriver::with_rows(1)
    };

    let err = driver
        .database_with_schema("NOPE")
        .select_all("SELECT 1 FROM dual")
        .unwrap_err();

    assert!(matches!(err, ConnectorError::InvalidArgument(_)));
    assert_eq!(driver.events.conn_closes.get(), 1);
    assert_eq!(driver.events.cursor_opens.get(), 0);
}

#[test]
fn binds_are_passed_to_the_driver() {
    let driver = MockDriver::with_rows(1);
    let db = driver.database();

    let binds = Binds::named([("emplid", "KU0001")]);
    db.select(
        "SELECT * FROM t WHERE emplid = :emplid",
        Some(&binds),
        0,
        RowType::Dict,
    )
    .unwrap();

    // empty binds are the same as no binds
    let empty = Binds::Positional(vec![]);
    db.select("SELECT * FROM t", Some(&empty), 0, RowType::Dict).unwrap();

    let executed = driver.events.executed.borrow();
    assert_eq!(executed[0].1, Some(binds));
    assert_eq!(executed[1].1, None);
}
