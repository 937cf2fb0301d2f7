//! Continuous-series assembly.
//!
//! Contracts are visited in expiry order and every surviving row of every
//! contract is kept; the final stable sort by timestamp decides how
//! overlapping contracts interleave. `rollover_days` is reported with each
//! contract but never trims a contract's tail.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use tickstitch_core::config::SeriesConfig;
use tickstitch_core::contract::{rollover_date, sort_by_expiry};
use tickstitch_core::{
    ContinuousSeries, ContractCode, Error, EventSink, PipelineEvent, Result, Tick, TickFields,
};

use crate::discovery::{find_contract_files, ContractFile};
use crate::reader::read_raw_file;
use crate::schema::detect_positional;
use crate::timestamp::{ensure_decodable, normalize_timestamps, TimeEncoding};

/// Builds one ticker's continuous series from its contract files.
pub struct ContinuousSeriesBuilder<'a> {
    config: &'a SeriesConfig,
    sink: &'a dyn EventSink,
}

impl<'a> ContinuousSeriesBuilder<'a> {
    /// Create a builder reporting to `sink`.
    pub fn new(config: &'a SeriesConfig, sink: &'a dyn EventSink) -> Self {
        Self { config, sink }
    }

    /// Discover and stitch all contract files under `ticker_dir`.
    pub fn build(&self, ticker: &str, ticker_dir: &Path) -> Result<ContinuousSeries> {
        let files = find_contract_files(
            ticker_dir,
            &self.config.sessions,
            &self.config.file_extension,
        )?;
        self.build_from_files(ticker, files)
    }

    /// Stitch an explicit set of contract files.
    ///
    /// Fails only when there are no files or every file failed.
    pub fn build_from_files(
        &self,
        ticker: &str,
        files: Vec<ContractFile>,
    ) -> Result<ContinuousSeries> {
        if files.is_empty() {
            return Err(Error::no_files(format!("no contract files for {ticker}")));
        }

        let mut by_contract: BTreeMap<ContractCode, Vec<PathBuf>> = BTreeMap::new();
        for file in files {
            by_contract.entry(file.contract).or_default().push(file.path);
        }

        let mut order: Vec<ContractCode> = by_contract.keys().cloned().collect();
        sort_by_expiry(&mut order);

        let mut ticks: Vec<Tick> = Vec::new();
        let mut contracts = BTreeSet::new();
        let mut attempted = 0usize;
        let mut failed = 0usize;

        for contract in order {
            let Some(mut paths) = by_contract.remove(&contract) else {
                continue;
            };
            paths.sort();

            self.sink.emit(PipelineEvent::ContractOrdered {
                ticker: ticker.to_string(),
                contract: contract.to_string(),
                expiry: contract.expiry().ok(),
                rollover_date: rollover_date(&contract, self.config.rollover_days).ok(),
                files: paths.len(),
            });

            for path in paths {
                attempted += 1;
                match self.ingest_file(&path) {
                    Ok(mut file_ticks) => {
                        ticks.append(&mut file_ticks);
                        contracts.insert(contract.clone());
                    }
                    Err(e) => {
                        failed += 1;
                        self.sink.emit(PipelineEvent::FileSkipped {
                            path,
                            reason: e.to_string(),
                        });
                    }
                }
            }
        }

        if failed == attempted {
            return Err(Error::AllFilesFailed {
                ticker: ticker.to_string(),
                failed,
            });
        }

        // Stable: equal timestamps keep contract-then-path order.
        ticks.sort_by_key(|t| t.timestamp);

        let series = ContinuousSeries {
            ticker: ticker.to_string(),
            ticks,
            contracts,
        };

        self.sink.emit(PipelineEvent::SeriesBuilt {
            ticker: ticker.to_string(),
            rows: series.len(),
            contracts: series.contracts.iter().map(ToString::to_string).collect(),
            start: series.start(),
            end: series.end(),
            rollover_days: self.config.rollover_days,
        });

        Ok(series)
    }

    /// Read, detect, normalize and convert one raw export.
    pub fn ingest_file(&self, path: &Path) -> Result<Vec<Tick>> {
        let table = read_raw_file(path)?;
        self.sink.emit(PipelineEvent::FileRead {
            path: path.to_path_buf(),
            delimiter: table.attempt.delimiter_char(),
            strategy: table.attempt.strategy.as_str(),
            rows: table.len(),
            columns: table.columns,
        });

        let (date_col, time_col) = detect_positional(&table)?.date_time()?;
        self.sink.emit(PipelineEvent::SchemaDetected {
            path: path.to_path_buf(),
            date_col,
            time_col,
        });

        let dates: Vec<&str> = table.column(date_col).collect();
        let times: Vec<&str> = table.column(time_col).collect();
        let timestamps = normalize_timestamps(&dates, &times, TimeEncoding::MilliAware);
        ensure_decodable(&timestamps, &path.display().to_string())?;

        Ok(table
            .rows
            .iter()
            .zip(timestamps)
            .filter_map(|(row, ts)| {
                ts.map(|timestamp| Tick {
                    timestamp,
                    fields: TickFields::from_row(row),
                })
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tickstitch_core::MemorySink;

    fn write(dir: &Path, rel: &str, content: &str) -> PathBuf {
        let path = dir.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_contracts_ordered_by_expiry_and_sorted() {
        let dir = tempfile::tempdir().unwrap();
        write(
            dir.path(),
            "DAY/ag2106_a.csv",
            "20210401,90000000,1,1,4600\n20210402,90000000,2,1,4610\n",
        );
        write(
            dir.path(),
            "NIGHT/ag2103_a.csv",
            "20210301,210000500,3,1,4500\n20210402,90000000,4,1,4505\n",
        );

        let config = SeriesConfig::default();
        let sink = MemorySink::new();
        let builder = ContinuousSeriesBuilder::new(&config, &sink);
        let series = builder.build("ag", dir.path()).unwrap();

        assert_eq!(series.len(), 4);
        let ids: Vec<&str> = series.ticks.iter().map(|t| t.fields.trade_id.as_str()).collect();
        // Tie at 2021-04-02 09:00 keeps ag2103 (earlier expiry) first.
        assert_eq!(ids, vec!["3", "1", "4", "2"]);
        assert!(series.ticks.windows(2).all(|w| w[0].timestamp <= w[1].timestamp));
        assert_eq!(series.contracts.len(), 2);

        let ordered: Vec<String> = sink
            .events()
            .into_iter()
            .filter_map(|e| match e {
                PipelineEvent::ContractOrdered { contract, .. } => Some(contract),
                _ => None,
            })
            .collect();
        assert_eq!(ordered, vec!["ag2103", "ag2106"]);
    }

    #[test]
    fn test_millisecond_times_preserved() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(dir.path(), "DAY/ag2103_a.csv", "20210301;93015500;7\n20210301;93016;8\n");

        let config = SeriesConfig::default();
        let sink = MemorySink::new();
        let ticks = ContinuousSeriesBuilder::new(&config, &sink)
            .ingest_file(&path)
            .unwrap();

        assert_eq!(ticks.len(), 2);
        assert_eq!(ticks[0].timestamp.format("%H%M%S%.3f").to_string(), "093015.500");
        assert_eq!(ticks[0].fields.trade_id, "7");
    }

    #[test]
    fn test_bad_file_skipped_good_file_kept() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "DAY/ag2103_a.csv", "20210301,90000,1,1,4500\n");
        write(dir.path(), "DAY/ag2103_b.csv", "no dates here\njust text\n");

        let config = SeriesConfig::default();
        let sink = MemorySink::new();
        let series = ContinuousSeriesBuilder::new(&config, &sink)
            .build("ag", dir.path())
            .unwrap();

        assert_eq!(series.len(), 1);
        let failures = sink.failures();
        assert_eq!(failures.len(), 1);
        assert!(matches!(
            &failures[0],
            PipelineEvent::FileSkipped { path, .. } if path.ends_with("ag2103_b.csv")
        ));
    }

    #[test]
    fn test_undecodable_timestamps_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(dir.path(), "DAY/ag2103_a.csv", "20211399,90000\n20211398,90001\n");

        let config = SeriesConfig::default();
        let sink = MemorySink::new();
        let err = ContinuousSeriesBuilder::new(&config, &sink)
            .ingest_file(&path)
            .unwrap_err();
        assert!(matches!(err, Error::UndecodableTimestamps(_)));
    }

    #[test]
    fn test_no_files_and_all_failed() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("DAY")).unwrap();

        let config = SeriesConfig::default();
        let sink = MemorySink::new();
        let builder = ContinuousSeriesBuilder::new(&config, &sink);
        assert!(matches!(builder.build("ag", dir.path()), Err(Error::NoFiles(_))));

        write(dir.path(), "DAY/ag2103_a.csv", "nothing\n");
        assert!(matches!(
            builder.build("ag", dir.path()),
            Err(Error::AllFilesFailed { failed: 1, .. })
        ));
    }

    #[test]
    fn test_rollover_days_never_trims() {
        let dir = tempfile::tempdir().unwrap();
        // ag2103 trades right up to expiry, well inside any rollover window.
        write(dir.path(), "DAY/ag2103_a.csv", "20210330,90000,1\n20210331,90000,2\n");
        write(dir.path(), "DAY/ag2106_a.csv", "20210329,90000,3\n");

        let config = SeriesConfig {
            rollover_days: 10,
            ..SeriesConfig::default()
        };
        let sink = MemorySink::new();
        let series = ContinuousSeriesBuilder::new(&config, &sink)
            .build("ag", dir.path())
            .unwrap();
        assert_eq!(series.len(), 3);
    }
}
