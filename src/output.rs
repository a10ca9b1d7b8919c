use crate::error::{PipelineError, Result};
use crate::util::format_int;
use serde::Serialize;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use tabled::{settings::Style, Table, Tabled};

/// Destination for the named output tables.
pub trait TableSink {
    /// Persist `rows` as table `name`, replacing any earlier version.
    fn write_table<T>(&self, name: &str, rows: &[T]) -> Result<PathBuf>
    where
        T: Serialize + Tabled;
}

/// Writes each table to `<dir>/<name>.csv`.
#[derive(Debug, Clone)]
pub struct CsvSink {
    dir: PathBuf,
}

impl CsvSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{}.csv", name))
    }
}

impl TableSink for CsvSink {
    fn write_table<T>(&self, name: &str, rows: &[T]) -> Result<PathBuf>
    where
        T: Serialize + Tabled,
    {
        let path = self.path_for(name);
        let io_err = |source| PipelineError::Io {
            path: path.clone(),
            source,
        };
        fs::create_dir_all(&self.dir).map_err(io_err)?;
        let file = File::create(&path).map_err(io_err)?;

        // Header comes from the row type so empty tables still get one.
        let mut wtr = csv::WriterBuilder::new().has_headers(false).from_writer(file);
        let csv_err = |source| PipelineError::Csv {
            path: path.clone(),
            source,
        };
        let headers = T::headers();
        wtr.write_record(headers.iter().map(|h| h.as_bytes()))
            .map_err(csv_err)?;
        for r in rows {
            wtr.serialize(r).map_err(csv_err)?;
        }
        wtr.flush().map_err(io_err)?;

        tracing::info!(table = name, rows = rows.len(), path = %path.display(), "wrote table");
        Ok(path)
    }
}

pub fn preview_table<T>(title: &str, rows: &[T], max_rows: usize)
where
    T: Tabled + Clone,
{
    println!("{} ({} rows)", title, format_int(rows.len()));
    let slice: Vec<T> = rows.iter().cloned().take(max_rows).collect();
    if slice.is_empty() {
        println!("(no rows)\n");
        return;
    }
    let table_str = Table::new(slice).with(Style::markdown()).to_string();
    println!("{}\n", table_str);
}
