//! CSV export of the filtered rows of a list screen.
//!
//! One-way: the file is written and forgotten, nothing reads it back.

use std::{
    fs::File,
    io::Write,
    path::{Path, PathBuf},
};

use chrono::Local;
use tracing::info;

use crate::{
    error::AppError,
    model::{
        list_item::{ItemStatus, ListItem},
        screen_spec::{Column, ScreenId},
    },
};

/// Write a header (`id`, `status`, column titles) and one record per item.
/// Returns the number of records written.
pub fn write_csv<'a, W, S, I>(writer: W, columns: &[Column], items: I) -> Result<usize, AppError>
where
    W: Write,
    S: ItemStatus,
    I: IntoIterator<Item = &'a ListItem<S>>,
{
    let mut csv_writer = csv::Writer::from_writer(writer);

    let header = ["id", "status"]
        .into_iter()
        .chain(columns.iter().map(|column| column.title));
    csv_writer.write_record(header)?;

    let mut rows = 0;
    for item in items {
        let record = [item.id.as_str(), item.status.code()]
            .into_iter()
            .chain(columns.iter().map(|column| item.field(column.field).unwrap_or("")));
        csv_writer.write_record(record)?;
        rows += 1;
    }

    csv_writer.flush()?;
    Ok(rows)
}

/// `<dir>/<screen>-<YYYYmmdd-HHMMSS>-<suffix>.csv`; the random suffix keeps
/// exports taken within the same second apart.
#[must_use]
pub fn export_path(dir: &Path, screen: ScreenId) -> PathBuf {
    let stamp = Local::now().format("%Y%m%d-%H%M%S");
    let suffix = nanoid::nanoid!(6);
    dir.join(format!("{}-{stamp}-{suffix}.csv", screen.slug()))
}

/// Create the export file and hand its writer to `write`.
pub fn export_to_dir<F>(dir: &Path, screen: ScreenId, write: F) -> Result<(PathBuf, usize), AppError>
where
    F: FnOnce(&mut dyn Write) -> Result<usize, AppError>,
{
    std::fs::create_dir_all(dir).map_err(|e| AppError::file_io(dir, e))?;

    let path = export_path(dir, screen);
    // never replace an earlier export
    let mut file = File::create_new(&path).map_err(|e| AppError::file_io(&path, e))?;
    let rows = write(&mut file)?;

    info!(
        marker = "CSV_EXPORTED",
        operation_type = "export",
        screen = screen.slug(),
        rows,
        path = %path.display(),
        "exported filtered rows"
    );

    Ok((path, rows))
}
