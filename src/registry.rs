//! Process-wide table of drivers, keyed by name.
//!
//! Drivers register once; callers then open connections by driver name and
//! data-source string without naming a concrete driver type.

use std::collections::HashMap;
use std::sync::{Arc, LazyLock, RwLock};

use crate::driver::{Conn, Driver};
use crate::error::SqliteDriverError;

type DriverMap = RwLock<HashMap<String, Arc<dyn Driver>>>;

static DRIVERS: LazyLock<DriverMap> = LazyLock::new(|| RwLock::new(HashMap::new()));

/// Make `driver` available under `name`.
///
/// # Errors
///
/// Returns `SqliteDriverError::DuplicateDriver` if `name` is taken.
pub fn register(name: &str, driver: Arc<dyn Driver>) -> Result<(), SqliteDriverError> {
    let mut drivers = match DRIVERS.write() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    };
    if drivers.contains_key(name) {
        return Err(SqliteDriverError::DuplicateDriver(name.to_owned()));
    }
    drivers.insert(name.to_owned(), driver);
    tracing::debug!(driver = name, "registered sql driver");
    Ok(())
}

/// Look up a registered driver.
#[must_use]
pub fn driver(name: &str) -> Option<Arc<dyn Driver>> {
    let drivers = match DRIVERS.read() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    };
    drivers.get(name).cloned()
}

/// Names of all registered drivers, sorted.
#[must_use]
pub fn drivers() -> Vec<String> {
    let drivers = match DRIVERS.read() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    };
    let mut names: Vec<String> = drivers.keys().cloned().collect();
    names.sort();
    names
}

/// Open a connection through the driver registered as `driver_name`.
///
/// # Errors
///
/// Returns `SqliteDriverError::UnknownDriver` for an unregistered name, or
/// whatever the driver's `open` returns.
pub fn open(driver_name: &str, data_source: &str) -> Result<Box<dyn Conn>, SqliteDriverError> {
    let driver = driver(driver_name)
        .ok_or_else(|| SqliteDriverError::UnknownDriver(driver_name.to_owned()))?;
    driver.open(data_source)
}
