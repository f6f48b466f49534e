use chrono::{TimeZone, Utc};
use serde_json::json;
use sqlite_driver::prelude::*;

const CREATE_SQL: &str = "CREATE TABLE users(
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name VARCHAR(64) NOT NULL,
    age INTEGER NOT NULL
)";
const INSERT_SQL: &str = "INSERT INTO users(name, age) VALUES(?, ?)";
const SELECT_SQL: &str = "SELECT name FROM users WHERE age = ?";
const SELECT_ALL_SQL: &str = "SELECT name, age FROM users";

fn users_db() -> Result<SqliteConnection, SqliteDriverError> {
    let conn = SqliteDriver.open(":memory:")?;
    conn.prepare(CREATE_SQL)?.exec(&[])?;
    Ok(conn)
}

fn insert_users(conn: &SqliteConnection, n: i64) -> Result<(), SqliteDriverError> {
    let mut stmt = conn.prepare(INSERT_SQL)?;
    for i in 0..n {
        stmt.exec(&[Value::from(format!("foobar{i}")), Value::from(13 + i)])?;
    }
    stmt.close()
}

#[test]
fn num_input_counts_placeholders() -> Result<(), Box<dyn std::error::Error>> {
    let conn = users_db()?;
    assert_eq!(conn.prepare(INSERT_SQL)?.num_input(), 2);
    assert_eq!(conn.prepare(SELECT_SQL)?.num_input(), 1);
    assert_eq!(conn.prepare(SELECT_ALL_SQL)?.num_input(), 0);
    assert_eq!(
        conn.prepare("SELECT ?, ?, ? FROM users WHERE age > ?")?
            .num_input(),
        4
    );
    conn.close()?;
    Ok(())
}

#[test]
fn arity_mismatch_is_rejected() -> Result<(), Box<dyn std::error::Error>> {
    let conn = users_db()?;
    let mut stmt = conn.prepare(INSERT_SQL)?;

    for args in [vec![], vec![Value::from("x")], vec![Value::Null; 3]] {
        let err = stmt.exec(&args).unwrap_err();
        assert!(matches!(
            err,
            SqliteDriverError::BindArity { expected: 2, actual } if actual == args.len()
        ));
        assert!(matches!(
            stmt.query(&args),
            Err(SqliteDriverError::BindArity { expected: 2, .. })
        ));
    }
    stmt.close()?;

    // nothing was inserted
    let mut count = conn.prepare("SELECT COUNT(*) FROM users")?;
    let rs = build_result_set(&mut count, &[])?;
    assert_eq!(rs.results[0].get_by_index(0), Some(&Value::Int(0)));
    Ok(())
}

#[test]
fn insert_then_scan_round_trips_text_and_integer() -> Result<(), Box<dyn std::error::Error>> {
    let conn = users_db()?;
    let mut insert = conn.prepare(INSERT_SQL)?;
    let res = insert.exec(&[Value::from("foobar0"), Value::from(13_i64)])?;
    assert_eq!(res.last_insert_id(), 1);
    assert_eq!(res.rows_affected(), 1);
    insert.close()?;

    let mut select = conn.prepare(SELECT_SQL)?;
    let mut rows = select.query(&[Value::from(13_i64)])?;
    assert_eq!(rows.columns(), ["name"]);
    let mut dest = vec![Value::Null; 1];
    rows.next(&mut dest)?;
    assert_eq!(convert_value::<String>(&dest[0])?, "foobar0");
    assert!(rows.next(&mut dest).unwrap_err().is_end_of_data());
    rows.close()?;
    select.close()?;

    let mut select_all = conn.prepare(SELECT_ALL_SQL)?;
    let rs = build_result_set(&mut select_all, &[])?;
    assert_eq!(rs.len(), 1);
    assert_eq!(rs.results[0].try_get::<String>("name")?, "foobar0");
    assert_eq!(rs.results[0].get("age"), Some(&Value::Int(13)));
    select_all.close()?;
    conn.close()?;
    Ok(())
}

#[test]
fn n_rows_then_exactly_one_end_of_data() -> Result<(), Box<dyn std::error::Error>> {
    let conn = users_db()?;
    insert_users(&conn, 10)?;

    let mut stmt = conn.prepare(SELECT_ALL_SQL)?;
    let mut rows = stmt.query(&[])?;
    let mut dest = vec![Value::Null; rows.columns().len()];
    let mut seen = Vec::new();
    loop {
        assert_eq!(rows.columns(), ["name", "age"]);
        match rows.next(&mut dest) {
            Ok(()) => seen.push((convert_value::<String>(&dest[0])?, dest[1].clone())),
            Err(e) if e.is_end_of_data() => break,
            Err(e) => return Err(e.into()),
        }
    }
    assert_eq!(seen.len(), 10);
    assert_eq!(seen[0], ("foobar0".to_string(), Value::Int(13)));
    assert_eq!(seen[9], ("foobar9".to_string(), Value::Int(22)));

    // exhausted cursors stay exhausted
    assert!(rows.next(&mut dest).unwrap_err().is_end_of_data());
    assert_eq!(rows.columns(), ["name", "age"]);
    Ok(())
}

#[test]
fn zero_rows_end_immediately() -> Result<(), Box<dyn std::error::Error>> {
    let conn = users_db()?;
    let mut stmt = conn.prepare(SELECT_ALL_SQL)?;
    let mut rows = stmt.query(&[])?;
    let mut dest = vec![Value::Null; 2];
    assert!(matches!(
        rows.next(&mut dest),
        Err(SqliteDriverError::EndOfData)
    ));
    Ok(())
}

#[test]
fn empty_string_and_null_stay_distinct() -> Result<(), Box<dyn std::error::Error>> {
    let conn = SqliteDriver.open(":memory:")?;
    conn.prepare("CREATE TABLE t (a TEXT, b TEXT)")?.exec(&[])?;
    conn.prepare("INSERT INTO t (a, b) VALUES (?, ?)")?
        .exec(&[Value::from(""), Value::Null])?;

    let mut stmt = conn.prepare("SELECT a, b, typeof(a), typeof(b) FROM t")?;
    let rs = build_result_set(&mut stmt, &[])?;
    let row = &rs.results[0];
    assert_eq!(row.get("a"), Some(&Value::Blob(Vec::new())));
    assert_eq!(row.try_get::<String>("a")?, "");
    assert_eq!(row.get("b"), Some(&Value::Null));
    assert_eq!(row.try_get::<Option<String>>("b")?, None);
    assert_eq!(row.try_get::<String>("typeof(a)")?, "text");
    assert_eq!(row.try_get::<String>("typeof(b)")?, "null");
    Ok(())
}

#[test]
fn each_value_kind_binds_to_its_storage_class() -> Result<(), Box<dyn std::error::Error>> {
    let conn = SqliteDriver.open(":memory:")?;
    let mut stmt = conn.prepare("SELECT typeof(?), ?")?;

    let ts = Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap()
        + chrono::Duration::microseconds(123_456);
    let cases = [
        (Value::Null, "null", Value::Null),
        (Value::Int(-7), "integer", Value::Int(-7)),
        (Value::Float(2.5), "real", Value::Float(2.5)),
        (Value::Bool(true), "integer", Value::Int(1)),
        (Value::Bool(false), "integer", Value::Int(0)),
        (
            Value::Blob(vec![0, 1, 2, 255]),
            "blob",
            Value::Blob(vec![0, 1, 2, 255]),
        ),
        (Value::Blob(Vec::new()), "blob", Value::Blob(Vec::new())),
        (
            Value::from("héllo"),
            "text",
            Value::Blob("héllo".as_bytes().to_vec()),
        ),
        (
            Value::from(ts),
            "text",
            Value::Blob(b"2024-05-01 10:00:00.123456".to_vec()),
        ),
        (
            Value::from(json!({"a": 1})),
            "text",
            Value::Blob(br#"{"a":1}"#.to_vec()),
        ),
    ];

    for (arg, storage, expected) in cases {
        let args = [arg.clone(), arg];
        let rs = build_result_set(&mut stmt, &args)?;
        let row = &rs.results[0];
        assert_eq!(convert_value::<String>(&row.values[0])?, storage);
        assert_eq!(row.values[1], expected);
    }
    stmt.close()?;
    Ok(())
}

#[test]
fn timestamps_read_back_as_utc() -> Result<(), Box<dyn std::error::Error>> {
    let conn = SqliteDriver.open(":memory:")?;
    conn.prepare("CREATE TABLE events (at TEXT)")?.exec(&[])?;
    let ts = Utc.with_ymd_and_hms(2023, 12, 31, 23, 59, 59).unwrap()
        + chrono::Duration::milliseconds(250);
    conn.prepare("INSERT INTO events (at) VALUES (?)")?
        .exec(&[Value::from(ts)])?;

    let mut stmt = conn.prepare("SELECT at FROM events")?;
    let rs = build_result_set(&mut stmt, &[])?;
    assert_eq!(
        rs.results[0].try_get::<String>("at")?,
        "2023-12-31 23:59:59.25"
    );
    assert_eq!(
        rs.results[0].try_get::<chrono::DateTime<Utc>>("at")?,
        ts
    );
    Ok(())
}

#[test]
fn cells_are_typed_per_row_not_per_column() -> Result<(), Box<dyn std::error::Error>> {
    let conn = SqliteDriver.open(":memory:")?;
    let mut stmt = conn.prepare(
        "SELECT 1 AS x UNION ALL SELECT 'a' UNION ALL SELECT 2.5 UNION ALL SELECT NULL",
    )?;
    let rs = build_result_set(&mut stmt, &[])?;
    let cells: Vec<Value> = rs.results.iter().map(|r| r.values[0].clone()).collect();
    assert_eq!(
        cells,
        vec![
            Value::Int(1),
            Value::Blob(b"a".to_vec()),
            Value::Float(2.5),
            Value::Null
        ]
    );
    Ok(())
}

#[test]
fn query_caches_names_and_declared_types() -> Result<(), Box<dyn std::error::Error>> {
    let conn = users_db()?;
    let mut stmt = conn.prepare("SELECT name, age, age + 1 AS next_age FROM users")?;
    assert!(stmt.columns().is_empty());
    stmt.query(&[])?;
    assert_eq!(stmt.columns(), ["name", "age", "next_age"]);
    assert_eq!(stmt.column_decltypes(), ["VARCHAR(64)", "INTEGER", ""]);
    Ok(())
}

#[test]
fn statements_are_reusable() -> Result<(), Box<dyn std::error::Error>> {
    let conn = users_db()?;
    insert_users(&conn, 5)?;

    let mut stmt = conn.prepare(SELECT_SQL)?;
    for i in 0..5 {
        let rs = build_result_set(&mut stmt, &[Value::from(13 + i)])?;
        assert_eq!(rs.len(), 1);
        assert_eq!(rs.results[0].try_get::<String>("name")?, format!("foobar{i}"));
    }

    // abandon a cursor half way, then query again
    {
        let mut rows = stmt.query(&[Value::from(13_i64)])?;
        let mut dest = vec![Value::Null];
        rows.next(&mut dest)?;
    }
    let rs = build_result_set(&mut stmt, &[Value::from(14_i64)])?;
    assert_eq!(rs.results[0].try_get::<String>("name")?, "foobar1");
    stmt.close()?;
    Ok(())
}

#[test]
fn exec_reports_rowid_and_changes() -> Result<(), Box<dyn std::error::Error>> {
    let conn = users_db()?;
    insert_users(&conn, 3)?;
    assert_eq!(conn.last_insert_rowid(), 3);

    let mut update = conn.prepare("UPDATE users SET age = age + 1 WHERE age >= ?")?;
    let res = update.exec(&[Value::from(14_i64)])?;
    assert_eq!(res.rows_affected(), 2);
    assert_eq!(res.last_insert_id(), 3);
    assert_eq!(conn.changes(), 2);
    Ok(())
}

#[test]
fn exec_requires_the_statement_to_complete() -> Result<(), Box<dyn std::error::Error>> {
    let conn = users_db()?;
    let mut stmt = conn.prepare("SELECT 1")?;
    assert!(matches!(
        stmt.exec(&[]),
        Err(SqliteDriverError::Step { code: 100 })
    ));
    Ok(())
}

#[test]
fn constraint_failures_surface_as_step_errors() -> Result<(), Box<dyn std::error::Error>> {
    let conn = users_db()?;
    let mut stmt = conn.prepare(INSERT_SQL)?;
    let err = stmt.exec(&[Value::Null, Value::from(1_i64)]).unwrap_err();
    assert!(matches!(err, SqliteDriverError::Step { code: 19 }));
    assert_eq!(err.native_code(), Some(19));

    // the statement is still usable after a failed run
    let res = stmt.exec(&[Value::from("ok"), Value::from(1_i64)])?;
    assert_eq!(res.rows_affected(), 1);
    stmt.close()?;
    Ok(())
}

#[test]
fn prepare_failures_carry_the_native_code() -> Result<(), Box<dyn std::error::Error>> {
    let conn = users_db()?;
    assert!(matches!(
        conn.prepare("SELEC name FROM users"),
        Err(SqliteDriverError::Prepare { code: 1 })
    ));
    assert!(matches!(
        conn.prepare("SELECT * FROM missing_table"),
        Err(SqliteDriverError::Prepare { code: 1 })
    ));
    assert!(matches!(
        conn.prepare("   -- nothing here"),
        Err(SqliteDriverError::Misuse(_))
    ));
    Ok(())
}

#[test]
fn trailing_statements_are_ignored() -> Result<(), Box<dyn std::error::Error>> {
    let conn = users_db()?;
    let mut stmt = conn.prepare("SELECT 1; DROP TABLE users")?;
    let rs = build_result_set(&mut stmt, &[])?;
    assert_eq!(rs.results[0].get_by_index(0), Some(&Value::Int(1)));
    stmt.close()?;
    // users still exists
    conn.prepare(SELECT_ALL_SQL)?.close()?;
    Ok(())
}

#[test]
fn narrow_destination_is_misuse() -> Result<(), Box<dyn std::error::Error>> {
    let conn = users_db()?;
    insert_users(&conn, 1)?;
    let mut stmt = conn.prepare(SELECT_ALL_SQL)?;
    let mut rows = stmt.query(&[])?;
    let mut dest = vec![Value::Null; 1];
    assert!(matches!(
        rows.next(&mut dest),
        Err(SqliteDriverError::Misuse(_))
    ));
    // nothing was stepped
    let mut dest = vec![Value::Null; 2];
    rows.next(&mut dest)?;
    assert_eq!(dest[1], Value::Int(13));
    Ok(())
}

#[test]
fn begin_is_not_implemented() -> Result<(), Box<dyn std::error::Error>> {
    let conn = users_db()?;
    assert!(matches!(
        conn.begin(),
        Err(SqliteDriverError::NotImplemented(_))
    ));
    insert_users(&conn, 2)?;
    assert!(matches!(
        conn.begin(),
        Err(SqliteDriverError::NotImplemented(_))
    ));
    conn.close()?;
    Ok(())
}

#[test]
fn open_failure_carries_the_native_code() {
    let err = SqliteDriver
        .open("/nonexistent-dir/for/sure/db.sqlite")
        .unwrap_err();
    assert!(matches!(err, SqliteDriverError::Open { code: 14 }));

    let err = SqliteDriver.open("bad\0name").unwrap_err();
    assert!(matches!(err, SqliteDriverError::ConfigError(_)));
}

#[test]
fn file_databases_persist_across_connections() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("users.db");
    let path = path.to_string_lossy().into_owned();

    let conn = SqliteDriver.open(&path)?;
    conn.prepare(CREATE_SQL)?.exec(&[])?;
    insert_users(&conn, 3)?;
    conn.close()?;

    let read_only = SqliteOptions::builder(path.as_str()).read_only(true).finish();
    let conn = SqliteDriver.open_with(&read_only)?;
    let mut stmt = conn.prepare(SELECT_ALL_SQL)?;
    let rs = build_result_set(&mut stmt, &[])?;
    assert_eq!(rs.len(), 3);
    stmt.close()?;

    let mut insert = conn.prepare(INSERT_SQL)?;
    let err = insert
        .exec(&[Value::from("nope"), Value::from(1_i64)])
        .unwrap_err();
    // SQLITE_READONLY
    assert!(matches!(err, SqliteDriverError::Step { code: 8 }));
    // finalize reports the failed run, and still releases the statement
    assert!(matches!(
        insert.close(),
        Err(SqliteDriverError::Finalize { code: 8 })
    ));
    conn.close()?;
    Ok(())
}
