//! Output writers for simulation results.

use crate::metrics::{CsvSummaryRow, SessionMetrics};
use crate::types::OutputFormat;
use flate2::write::GzEncoder;
use flate2::Compression;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

pub struct OutputWriter {
    detail_writer: Box<dyn Write + Send>,
    csv_writer: csv::Writer<BufWriter<File>>,
    format: OutputFormat,
    /// Sessions held back for a single JSON array under `OutputFormat::Json`.
    buffered: Vec<SessionMetrics>,
    detail_path: PathBuf,
    csv_path: PathBuf,
}

impl OutputWriter {
    pub fn new(
        output_dir: &str,
        format: &OutputFormat,
        compress: bool,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        let dir = Path::new(output_dir);
        std::fs::create_dir_all(dir)?;

        let timestamp = time::OffsetDateTime::now_utc()
            .format(&time::format_description::well_known::Iso8601::DEFAULT)
            .unwrap_or_else(|_| "unknown".to_string())
            .replace(':', "-");

        let extension = match format {
            OutputFormat::Jsonl => "jsonl",
            OutputFormat::Json => "json",
        };
        let filename = format!("simulation_{timestamp}.{extension}");
        let (detail_writer, detail_path): (Box<dyn Write + Send>, PathBuf) = if compress {
            let gz_path = dir.join(format!("{filename}.gz"));
            let writer = BufWriter::new(GzEncoder::new(
                File::create(&gz_path)?,
                Compression::default(),
            ));
            (Box::new(writer), gz_path)
        } else {
            let path = dir.join(&filename);
            (Box::new(BufWriter::new(create_truncated(&path)?)), path)
        };

        // Header row comes from CsvSummaryRow's field names
        let csv_path = dir.join(format!("simulation_{timestamp}_summary.csv"));
        let csv_writer = csv::Writer::from_writer(BufWriter::new(create_truncated(&csv_path)?));

        Ok(Self {
            detail_writer,
            csv_writer,
            format: format.clone(),
            buffered: Vec::new(),
            detail_path,
            csv_path,
        })
    }

    pub fn write_session(
        &mut self,
        metrics: SessionMetrics,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let row = CsvSummaryRow::from(&metrics);
        self.csv_writer.serialize(&row)?;
        self.csv_writer.flush()?;

        match self.format {
            OutputFormat::Jsonl => {
                let json = serde_json::to_string(&metrics)?;
                writeln!(self.detail_writer, "{json}")?;
                self.detail_writer.flush()?;
            }
            OutputFormat::Json => self.buffered.push(metrics),
        }
        Ok(())
    }

    pub fn finish(mut self) -> Result<(), Box<dyn std::error::Error>> {
        if matches!(self.format, OutputFormat::Json) {
            serde_json::to_writer_pretty(&mut self.detail_writer, &self.buffered)?;
            writeln!(self.detail_writer)?;
        }
        self.detail_writer.flush()?;
        self.csv_writer.flush()?;
        Ok(())
    }

    pub fn output_paths(&self) -> (&Path, &Path) {
        (&self.detail_path, &self.csv_path)
    }
}

fn create_truncated(path: &Path) -> std::io::Result<File> {
    OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(path)
}
