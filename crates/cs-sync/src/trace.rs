//! CSV step trace.
//!
//! One row per setup/step:
//!
//! ```text
//! step,joint_time_secs,included,excluded,sampled_out,pass_through,mapped
//! ```

use std::fs::File;
use std::io::Write;
use std::path::Path;

use csv::Writer;

use crate::{EngineObserver, StepReport};

/// An [`EngineObserver`] writing per-step counts as CSV.
///
/// Errors are stored because observer methods return nothing.  Check with
/// [`take_error`][Self::take_error] after the run.
pub struct CsvStepTrace<W: Write = File> {
    writer:     Writer<W>,
    finished:   bool,
    last_error: Option<csv::Error>,
}

impl CsvStepTrace<File> {
    /// Create (or truncate) `path` and write the header row.
    pub fn create(path: &Path) -> Result<Self, csv::Error> {
        Self::from_writer_inner(Writer::from_path(path)?)
    }
}

impl<W: Write> CsvStepTrace<W> {
    pub fn from_writer(inner: W) -> Result<Self, csv::Error> {
        Self::from_writer_inner(Writer::from_writer(inner))
    }

    fn from_writer_inner(mut writer: Writer<W>) -> Result<Self, csv::Error> {
        writer.write_record([
            "step", "joint_time_secs", "included", "excluded", "sampled_out", "pass_through", "mapped",
        ])?;
        Ok(Self { writer, finished: false, last_error: None })
    }

    /// Take the first stored write error, if any.
    pub fn take_error(&mut self) -> Option<csv::Error> {
        self.last_error.take()
    }

    /// Flush and return the inner writer.
    pub fn into_inner(self) -> Result<W, csv::Error> {
        self.writer.into_inner().map_err(|e| csv::Error::from(e.into_error()))
    }

    fn write_row(&mut self, r: &StepReport<'_>) {
        let rec = &r.reconciliation;
        let result = self.writer.write_record(&[
            r.step.to_string(),
            format!("{:.3}", r.joint_time.as_secs_f64()),
            rec.included.len().to_string(),
            rec.excluded.len().to_string(),
            rec.sampled_out.len().to_string(),
            rec.pass_through.len().to_string(),
            r.mapped.to_string(),
        ]);
        self.store_err(result);
    }

    fn store_err(&mut self, result: Result<(), csv::Error>) {
        if let Err(e) = result {
            if self.last_error.is_none() {
                self.last_error = Some(e);
            }
        }
    }
}

impl<W: Write> EngineObserver for CsvStepTrace<W> {
    fn on_setup(&mut self, r: &StepReport<'_>) {
        self.write_row(r);
    }

    fn on_step(&mut self, r: &StepReport<'_>) {
        self.write_row(r);
    }

    fn on_stop(&mut self, _steps: u64) {
        if self.finished {
            return;
        }
        self.finished = true;
        let result = self.writer.flush().map_err(csv::Error::from);
        self.store_err(result);
    }
}
