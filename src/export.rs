use std::path::Path;

use csv::WriterBuilder;

use crate::transaction::CanonicalTransaction;

/// Write transactions to a CSV file in canonical field order, category
/// included. This is the download surface the dashboard exposes for the
/// currently filtered set.
pub(crate) fn export_csv(
    file_path: &Path,
    transactions: &[&CanonicalTransaction],
) -> anyhow::Result<()> {
    let mut csv_writer = WriterBuilder::new().has_headers(true).from_path(file_path)?;
    for t in transactions {
        csv_writer.serialize(t)?;
    }
    csv_writer.flush()?;

    Ok(())
}
