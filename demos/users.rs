use clap::Parser;
use sqlite_driver::prelude::*;
use tracing_subscriber::EnvFilter;

const CREATE_SQL: &str = "CREATE TABLE IF NOT EXISTS users(
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name VARCHAR(64) NOT NULL,
    age INTEGER NOT NULL
)";
const INSERT_SQL: &str = "INSERT INTO users(name, age) VALUES(?, ?)";
const SELECT_SQL: &str = "SELECT name FROM users WHERE age = ?";
const SELECT_ALL_SQL: &str = "SELECT name, age FROM users";

#[derive(Parser, Debug)]
#[command(about = "Insert a few users and read them back through the sqlite3 driver")]
struct Args {
    /// Database path; `:memory:` keeps everything in memory
    #[arg(long, default_value = ":memory:")]
    db: String,

    /// Number of extra users to insert
    #[arg(long, default_value_t = 10)]
    rows: i64,

    /// Base name for inserted users
    #[arg(long, default_value = "foobar")]
    name: String,

    /// Age of the first user
    #[arg(long, default_value_t = 13)]
    age: i64,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
    let args = Args::parse();

    register_driver();
    let conn = registry::open(DRIVER_NAME, &args.db)?;

    {
        let mut create = conn.prepare(CREATE_SQL)?;
        let res = create.exec(&[])?;
        tracing::info!(sql = CREATE_SQL, ?res, "exec");
        create.close()?;

        let mut insert = conn.prepare(INSERT_SQL)?;
        let res = insert.exec(&[Value::from(args.name.as_str()), Value::from(args.age)])?;
        tracing::info!(sql = INSERT_SQL, ?res, "exec");
        for i in 0..args.rows {
            insert.exec(&[
                Value::from(format!("{}{i}", args.name)),
                Value::from(args.age + i),
            ])?;
        }
        insert.close()?;

        let mut select_all = conn.prepare(SELECT_ALL_SQL)?;
        let users = {
            let mut rows = select_all.query(&[])?;
            collect_users(rows.as_mut())?
        };
        tracing::info!(count = users.len(), ?users, "all users");
        select_all.close()?;

        let mut select = conn.prepare(SELECT_SQL)?;
        let mut rows = select.query(&[Value::from(args.age)])?;
        let mut dest = vec![Value::Null; rows.columns().len()];
        loop {
            match rows.next(&mut dest) {
                Ok(()) => {
                    let name = String::from_value(&dest[0])?;
                    tracing::info!(%name, "scanned");
                }
                Err(e) if e.is_end_of_data() => break,
                Err(e) => return Err(e.into()),
            }
        }
        rows.close()?;
        select.close()?;
    }

    conn.close()?;
    Ok(())
}

fn collect_users(rows: &mut dyn Rows) -> Result<Vec<(String, i64)>, SqliteDriverError> {
    let mut users = Vec::new();
    let mut dest = vec![Value::Null; rows.columns().len()];
    loop {
        match rows.next(&mut dest) {
            Ok(()) => users.push((String::from_value(&dest[0])?, i64::from_value(&dest[1])?)),
            Err(SqliteDriverError::EndOfData) => return Ok(users),
            Err(e) => return Err(e),
        }
    }
}
