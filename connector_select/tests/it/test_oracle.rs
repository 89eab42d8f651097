use std::env;

use connector_select::oracle::OracleDriver;
use connector_select::{Binds, ConnectParams, Database, Row, RowType, Select, Value};

use crate::util::init_logging;

fn database() -> Database<OracleDriver> {
    init_logging();
    let url = env::var("ORACLE_URL").unwrap();
    Database::new(OracleDriver, ConnectParams::from_url(&url).unwrap())
}

#[test]
fn unreachable_server_is_an_error() {
    init_logging();
    let db = Database::new(
        OracleDriver,
        ConnectParams::new("//127.0.0.1:1/NOPE", "scott", "tiger"),
    );
    assert!(db.select_all("SELECT 1 FROM dual").is_err());
}

#[test]
#[ignore]
fn test_types() {
    let rows = database()
        .select(
            "SELECT 1 AS n, 1.5 AS f, 'varchar1' AS s, TO_CLOB('clob1') AS c, \
             TO_DATE('2024-03-01 10:15:00', 'YYYY-MM-DD HH24:MI:SS') AS d \
             FROM dual",
            None,
            0,
            RowType::Record,
        )
        .unwrap();

    let Row::Record(record) = &rows[0] else {
        panic!("expected a record");
    };
    assert_eq!(record.fields(), ["n", "f", "s", "c", "d"]);
    assert_eq!(record.get("S"), Some(&Value::Text("varchar1".into())));
    assert_eq!(record.get("c"), Some(&Value::Text("clob1".into())));
    assert_eq!(
        record.get("d").and_then(Value::as_timestamp).map(|t| t.to_string()),
        Some("2024-03-01 10:15:00".to_string())
    );
}

#[test]
#[ignore]
fn test_named_binds() {
    let binds = Binds::named([("n", 41)]);
    let rows = database()
        .select("SELECT :n + 1 AS answer FROM dual", Some(&binds), 0, RowType::Dict)
        .unwrap();
    assert_eq!(rows[0].get("answer").and_then(Value::as_i64), Some(42));
}

#[test]
#[ignore]
fn test_batches() {
    let sizes: Vec<_> = database()
        .select_iter("SELECT level AS n FROM dual CONNECT BY level <= 2500", None, 1000, None)
        .unwrap()
        .map(|batch| batch.unwrap().len())
        .collect();
    assert_eq!(sizes, [1000, 1000, 500]);
}
