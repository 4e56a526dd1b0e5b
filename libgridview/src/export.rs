use std::path::PathBuf;

use rfd::FileDialog;
use thiserror::Error;
use tracing::info;

use crate::state::TableView;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Failed to write {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

fn create_save_dialog(title: &str) -> FileDialog {
    FileDialog::new()
        .set_title(title)
        .add_filter("CSV files (*.csv)", &["csv"])
        .add_filter("All files", &["*"])
        .set_file_name("export.csv")
}

impl TableView {
    /// Exports the working set.
    ///
    /// A download function installed with [`TableView::on_download`] receives
    /// the rows and nothing is written. Otherwise the CSV is written to `path`,
    /// or to a file picked in a save dialog. Returns the written path, or
    /// `None` when nothing was written.
    pub fn download(&mut self, path: Option<PathBuf>) -> Result<Option<PathBuf>, ExportError> {
        if let Some(download) = &mut self.download_handler {
            download(&self.runtime.rows);
            return Ok(None);
        }

        let Some(path) =
            path.or_else(|| create_save_dialog(self.locale.get("download")).save_file())
        else {
            info!("Export cancelled");
            return Ok(None);
        };

        let csv = self.export_csv();
        std::fs::write(&path, csv).map_err(|source| ExportError::Io {
            path: path.clone(),
            source,
        })?;
        info!("Exported {} rows to {}", self.runtime.rows.len(), path.display());
        Ok(Some(path))
    }
}
