//! CSV Import/Export Module
//! Reads saved price files and writes the displayed series using Polars.

use crate::data::{Metric, PriceBar, PriceSeries};
use crate::stats::Indicators;
use chrono::NaiveDate;
use polars::prelude::*;
use std::fs::File;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("Failed to process CSV: {0}")]
    CsvError(#[from] PolarsError),
    #[error("Failed to access file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Missing column: {0}")]
    MissingColumn(String),
    #[error("No data loaded")]
    NoData,
}

/// Moves price series in and out of CSV files.
pub struct DataLoader;

impl DataLoader {
    /// Load a price CSV (Date + OHLCV, any header case, extra columns ignored).
    ///
    /// Date cells may carry a time part (`2023-01-03 00:00:00+05:30`); only the
    /// calendar date is kept. Rows with unparseable dates are skipped.
    pub fn load_csv(path: &Path, ticker: &str) -> Result<PriceSeries, LoaderError> {
        let df = LazyCsvReader::new(path)
            .with_infer_schema_length(Some(10000))
            .with_ignore_errors(true)
            .finish()?
            .collect()?;

        let columns: Vec<String> = df
            .get_column_names()
            .iter()
            .map(|s| s.to_string())
            .collect();

        let date_col = Self::find_column(&columns, "Date")?;
        let dates = df.column(&date_col)?.cast(&DataType::String)?;
        let dates = dates.as_materialized_series().str()?;

        let mut values: Vec<Vec<f64>> = Vec::with_capacity(Metric::ALL.len());
        for metric in Metric::ALL {
            let name = Self::find_column(&columns, metric.label())?;
            let as_f64 = df.column(&name)?.cast(&DataType::Float64)?;
            let ca = as_f64.f64()?;
            values.push(ca.into_iter().map(|v| v.unwrap_or(f64::NAN)).collect());
        }

        let mut skipped = 0usize;
        let bars: Vec<PriceBar> = dates
            .into_iter()
            .enumerate()
            .filter_map(|(i, raw)| {
                let parsed = raw.and_then(Self::parse_date);
                if parsed.is_none() {
                    skipped += 1;
                }
                Some(PriceBar {
                    date: parsed?,
                    open: values[0][i],
                    high: values[1][i],
                    low: values[2][i],
                    close: values[3][i],
                    volume: values[4][i],
                })
            })
            .collect();

        if skipped > 0 {
            log::warn!("{}: skipped {skipped} rows without a valid date", path.display());
        }
        if bars.is_empty() {
            return Err(LoaderError::NoData);
        }

        log::info!("Loaded {} rows from {}", bars.len(), path.display());
        Ok(PriceSeries::from_bars(ticker, bars))
    }

    /// Build a DataFrame of the series, plus indicator columns when given.
    pub fn to_dataframe(
        series: &PriceSeries,
        indicators: Option<&Indicators>,
    ) -> Result<DataFrame, LoaderError> {
        let dates: Vec<String> = series
            .dates()
            .iter()
            .map(|d| d.format("%Y-%m-%d").to_string())
            .collect();

        let mut columns = vec![Column::new("Date".into(), dates)];
        for metric in Metric::ALL {
            columns.push(Column::new(metric.label().into(), series.column(metric)));
        }

        if let Some(ind) = indicators {
            for (name, values) in ind.named_columns() {
                columns.push(Column::new(name.into(), values.to_vec()));
            }
        }

        Ok(DataFrame::new(columns)?)
    }

    /// Write the series (and indicators) to a CSV file.
    pub fn write_csv(
        series: &PriceSeries,
        indicators: Option<&Indicators>,
        path: &Path,
    ) -> Result<(), LoaderError> {
        let mut df = Self::to_dataframe(series, indicators)?;
        let mut file = File::create(path)?;
        CsvWriter::new(&mut file)
            .include_header(true)
            .finish(&mut df)?;

        log::info!("Wrote {} rows to {}", df.height(), path.display());
        Ok(())
    }

    fn find_column(columns: &[String], wanted: &str) -> Result<String, LoaderError> {
        columns
            .iter()
            .find(|c| c.trim().eq_ignore_ascii_case(wanted))
            .cloned()
            .ok_or_else(|| LoaderError::MissingColumn(wanted.to_string()))
    }

    fn parse_date(raw: &str) -> Option<NaiveDate> {
        let raw = raw.trim();
        let day = raw.get(..10).unwrap_or(raw);
        NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn loads_yfinance_style_csv() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("infy.csv");
        let mut file = File::create(&path).unwrap();
        writeln!(file, "Date,Open,High,Low,Close,Volume,Dividends,Stock Splits").unwrap();
        writeln!(file, "2023-01-04 00:00:00+05:30,1500.0,1510.0,1490.0,1505.5,120000,0.0,0.0").unwrap();
        writeln!(file, "2023-01-03 00:00:00+05:30,1490.0,1502.0,1480.0,1499.0,110000,0.0,0.0").unwrap();
        writeln!(file, "not a date,1.0,1.0,1.0,1.0,1,0.0,0.0").unwrap();
        drop(file);

        let series = DataLoader::load_csv(&path, "INFY.BO").unwrap();
        assert_eq!(series.len(), 2);
        assert_eq!(
            series.first_date(),
            NaiveDate::from_ymd_opt(2023, 1, 3)
        );
        assert_eq!(series.closes(), vec![1499.0, 1505.5]);
    }

    #[test]
    fn lowercase_headers_are_accepted() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lower.csv");
        std::fs::write(
            &path,
            "date,open,high,low,close,volume\n2023-01-03,1,2,0.5,1.5,100\n",
        )
        .unwrap();
        let series = DataLoader::load_csv(&path, "X").unwrap();
        assert_eq!(series.closes(), vec![1.5]);
    }

    #[test]
    fn missing_close_column_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.csv");
        std::fs::write(&path, "Date,Open,High,Low,Volume\n2023-01-03,1,2,0.5,100\n").unwrap();
        let err = DataLoader::load_csv(&path, "X").unwrap_err();
        assert!(matches!(err, LoaderError::MissingColumn(c) if c == "Close"));
    }

    #[test]
    fn written_csv_loads_back() {
        let bars = (3..=6)
            .map(|d| PriceBar {
                date: NaiveDate::from_ymd_opt(2023, 1, d).unwrap(),
                open: d as f64,
                high: d as f64 + 1.0,
                low: d as f64 - 1.0,
                close: d as f64 + 0.5,
                volume: 1000.0,
            })
            .collect();
        let series = PriceSeries::from_bars("AAPL", bars);
        let indicators = Indicators::compute(&series);

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        DataLoader::write_csv(&series, Some(&indicators), &path).unwrap();

        let header = std::fs::read_to_string(&path).unwrap();
        assert!(header.starts_with("Date,Open,High,Low,Close,Volume,MA50"));

        let loaded = DataLoader::load_csv(&path, "AAPL").unwrap();
        assert_eq!(loaded.dates(), series.dates());
        assert_eq!(loaded.closes(), series.closes());
    }
}
