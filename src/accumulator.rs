//! Cumulative energy estimate for tenants whose API never reports a total.
//!
//! Each observation adds `power × elapsed time` to a running total. The total
//! lives in a versioned record behind [`CounterStore`]; every update is a
//! compare-and-swap against the version that was read, so two overlapping
//! requests cannot both apply their increment to the same starting point.
//!
//! [`MemoryStore`] is best-effort and starts from scratch whenever the
//! process restarts. [`FileStore`] keeps the record on disk.

use crate::api::Error;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::{SystemTime, UNIX_EPOCH};

const MS_PER_HOUR: f64 = 3_600_000.0;
const MAX_ATTEMPTS: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AccumulatorState {
    pub total_kwh: f64,
    pub last_observed_ms: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Versioned {
    pub version: u64,
    pub state: AccumulatorState,
}

pub trait CounterStore: Send + Sync {
    fn load(&self) -> Result<Option<Versioned>, Error>;

    /// Store `state` only if the current version is still `expected`
    /// (`None` meaning no record yet). Returns whether the write happened.
    fn compare_and_swap(
        &self,
        expected: Option<u64>,
        state: AccumulatorState,
    ) -> Result<bool, Error>;
}

fn next(
    current: Option<Versioned>,
    expected: Option<u64>,
    state: AccumulatorState,
) -> Option<Versioned> {
    if current.map(|record| record.version) != expected {
        return None;
    }
    Some(Versioned {
        version: expected.map_or(1, |v| v + 1),
        state,
    })
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    record: Mutex<Option<Versioned>>,
}

impl CounterStore for MemoryStore {
    fn load(&self) -> Result<Option<Versioned>, Error> {
        self.record
            .lock()
            .map(|record| *record)
            .map_err(|e| Error::InternalError(e.to_string()))
    }

    fn compare_and_swap(
        &self,
        expected: Option<u64>,
        state: AccumulatorState,
    ) -> Result<bool, Error> {
        let mut record = self
            .record
            .lock()
            .map_err(|e| Error::InternalError(e.to_string()))?;

        match next(*record, expected, state) {
            Some(updated) => {
                *record = Some(updated);
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

/// JSON record on disk, replaced through a temporary file and a rename.
/// The compare-and-swap is guarded within this process only.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    guard: Mutex<()>,
}

impl FileStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        FileStore {
            path: path.as_ref().to_path_buf(),
            guard: Mutex::new(()),
        }
    }

    fn read(&self) -> Result<Option<Versioned>, Error> {
        match fs::read_to_string(&self.path) {
            Ok(text) => serde_json::from_str(&text).map(Some).map_err(|e| {
                Error::InternalError(format!(
                    "Corrupt accumulator record {}: {}",
                    self.path.display(),
                    e
                ))
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(Error::InternalError(format!(
                "Reading {}: {}",
                self.path.display(),
                e
            ))),
        }
    }

    fn write(&self, record: &Versioned) -> Result<(), Error> {
        let io_err = |e: std::io::Error| {
            Error::InternalError(format!("Writing {}: {}", self.path.display(), e))
        };
        let text =
            serde_json::to_string(record).map_err(|e| Error::InternalError(e.to_string()))?;
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, text).map_err(io_err)?;
        fs::rename(&tmp, &self.path).map_err(io_err)
    }
}

impl CounterStore for FileStore {
    fn load(&self) -> Result<Option<Versioned>, Error> {
        let _guard = self
            .guard
            .lock()
            .map_err(|e| Error::InternalError(e.to_string()))?;
        self.read()
    }

    fn compare_and_swap(
        &self,
        expected: Option<u64>,
        state: AccumulatorState,
    ) -> Result<bool, Error> {
        let _guard = self
            .guard
            .lock()
            .map_err(|e| Error::InternalError(e.to_string()))?;

        match next(self.read()?, expected, state) {
            Some(updated) => self.write(&updated).map(|_| true),
            None => Ok(false),
        }
    }
}

pub struct Accumulator {
    store: Box<dyn CounterStore>,
}

pub fn to_ms(time: SystemTime) -> u64 {
    time.duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or_default()
}

fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

impl Accumulator {
    pub fn new(store: Box<dyn CounterStore>) -> Self {
        Accumulator { store }
    }

    pub fn in_memory() -> Self {
        Accumulator::new(Box::new(MemoryStore::default()))
    }

    /// Record `power_w` observed at `now` and return the running total in
    /// kWh, rounded to two decimals. The first observation seeds the total
    /// with `seed_kwh`. A clock that went backwards adds nothing, and a
    /// non-finite power or seed counts as zero so the record stays readable.
    pub fn observe(&self, power_w: f64, now: SystemTime, seed_kwh: f64) -> Result<f64, Error> {
        let now_ms = to_ms(now);
        let power_w = finite_or_zero(power_w);
        let seed_kwh = finite_or_zero(seed_kwh);

        for _ in 0..MAX_ATTEMPTS {
            let current = self.store.load()?;
            let state = match current {
                None => AccumulatorState {
                    total_kwh: seed_kwh,
                    last_observed_ms: now_ms,
                },
                Some(record) => {
                    let elapsed_ms = now_ms.saturating_sub(record.state.last_observed_ms);
                    let hours = elapsed_ms as f64 / MS_PER_HOUR;
                    let increment = power_w.max(0.0) / 1000.0 * hours;
                    AccumulatorState {
                        total_kwh: record.state.total_kwh + increment,
                        last_observed_ms: now_ms,
                    }
                }
            };

            if self
                .store
                .compare_and_swap(current.map(|record| record.version), state)?
            {
                log::debug!("Accumulated {:.3} kWh at {} W", state.total_kwh, power_w);
                return Ok(round2(state.total_kwh));
            }
            log::debug!("Accumulator record changed underneath, retrying");
        }

        Err(Error::InternalError(String::from(
            "Accumulator update kept conflicting",
        )))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::time::Duration;

    fn at(seconds: u64) -> SystemTime {
        UNIX_EPOCH + Duration::from_secs(1_700_000_000 + seconds)
    }

    #[test]
    fn power_times_elapsed() {
        let accumulator = Accumulator::in_memory();
        assert_eq!(100.0, accumulator.observe(2000.0, at(0), 100.0).unwrap());
        /* 2 kW for half an hour */
        assert_eq!(101.0, accumulator.observe(2000.0, at(1800), 0.0).unwrap());
        /* 1.5 kW for 20 minutes */
        assert_eq!(101.5, accumulator.observe(1500.0, at(3000), 0.0).unwrap());
    }

    #[test]
    fn rounds_to_two_decimals() {
        let accumulator = Accumulator::in_memory();
        accumulator.observe(0.0, at(0), 0.0).unwrap();
        /* 0.1 kW for 10 s = 0.000277.. kWh */
        assert_eq!(0.0, accumulator.observe(100.0, at(10), 0.0).unwrap());
        /* 3.33 kW for an hour */
        assert_eq!(3.33, accumulator.observe(3330.0, at(3610), 0.0).unwrap());
    }

    #[test]
    fn clock_going_backwards_adds_nothing() {
        let accumulator = Accumulator::in_memory();
        accumulator.observe(1000.0, at(3600), 5.0).unwrap();
        assert_eq!(5.0, accumulator.observe(1000.0, at(0), 0.0).unwrap());
        /* last observation now sits at `at(0)` */
        assert_eq!(6.0, accumulator.observe(1000.0, at(3600), 0.0).unwrap());
    }

    #[test]
    fn stale_version_is_rejected() {
        let store = MemoryStore::default();
        let state = AccumulatorState {
            total_kwh: 1.0,
            last_observed_ms: 0,
        };
        assert!(store.compare_and_swap(None, state).unwrap());
        assert!(!store.compare_and_swap(None, state).unwrap());
        assert!(store.compare_and_swap(Some(1), state).unwrap());
        assert!(!store.compare_and_swap(Some(1), state).unwrap());
        assert_eq!(2, store.load().unwrap().unwrap().version);
    }

    #[test]
    fn file_store_survives_reopen() {
        let path = std::env::temp_dir().join(format!(
            "solarman-accumulator-{}-{}.json",
            std::process::id(),
            to_ms(SystemTime::now())
        ));

        {
            let accumulator = Accumulator::new(Box::new(FileStore::new(&path)));
            accumulator.observe(1000.0, at(0), 10.0).unwrap();
        }

        let accumulator = Accumulator::new(Box::new(FileStore::new(&path)));
        assert_eq!(12.0, accumulator.observe(1000.0, at(7200), 0.0).unwrap());

        let record = FileStore::new(&path).load().unwrap().unwrap();
        assert_eq!(2, record.version);
        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn non_finite_power_keeps_record_readable() {
        let path = std::env::temp_dir().join(format!(
            "solarman-accumulator-inf-{}-{}.json",
            std::process::id(),
            to_ms(SystemTime::now())
        ));

        let accumulator = Accumulator::new(Box::new(FileStore::new(&path)));
        assert_eq!(0.0, accumulator.observe(1000.0, at(0), f64::NAN).unwrap());
        assert_eq!(0.0, accumulator.observe(f64::INFINITY, at(3600), 0.0).unwrap());
        assert_eq!(1.0, accumulator.observe(1000.0, at(7200), 0.0).unwrap());

        let record = FileStore::new(&path).load().unwrap().unwrap();
        assert!(record.state.total_kwh.is_finite());
        assert_eq!(3, record.version);
        fs::remove_file(&path).unwrap();
    }
}
