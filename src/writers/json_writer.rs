use crate::error::Result;
use crate::models::AggregateResult;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::info;

pub struct JsonReportWriter {
    pretty: bool,
}

impl JsonReportWriter {
    pub fn new() -> Self {
        Self { pretty: true }
    }

    pub fn with_pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    pub fn render(&self, result: &AggregateResult) -> Result<String> {
        let json = if self.pretty {
            serde_json::to_string_pretty(result)?
        } else {
            serde_json::to_string(result)?
        };
        Ok(json)
    }

    pub fn write(&self, result: &AggregateResult, path: &Path) -> Result<()> {
        let mut writer = BufWriter::new(File::create(path)?);
        if self.pretty {
            serde_json::to_writer_pretty(&mut writer, result)?;
        } else {
            serde_json::to_writer(&mut writer, result)?;
        }
        writer.write_all(b"\n")?;
        writer.flush()?;

        info!("Wrote aggregate report to {}", path.display());
        Ok(())
    }
}

impl Default for JsonReportWriter {
    fn default() -> Self {
        Self::new()
    }
}
