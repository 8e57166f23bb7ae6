use log::{debug, error, info, warn};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::{
    common::{DbLoadError, Error},
    generator::ValueGenerator,
    invoker::Invoker,
    schema::TableSchema,
    statement::{Statement, StatementBuilder, StatementKind},
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailurePolicy {
    /// Stop at the first failed statement.
    #[default]
    Abort,
    /// Issue the whole batch, failures are collected in the report.
    Continue,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failure {
    pub kind: StatementKind,
    pub exit_code: Option<i32>,
    pub statement: String,
}

impl From<Failure> for DbLoadError {
    fn from(failure: Failure) -> Self {
        Self::InvocationFailed {
            kind: failure.kind,
            exit_code: failure.exit_code,
            statement: failure.statement,
        }
    }
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct BatchReport {
    /// Statements submitted, failed ones included.
    pub issued: usize,
    pub failures: Vec<Failure>,
}

/// Drives one batch: create table, `rows` inserts, select.
pub struct BatchRunner<'a, I: Invoker, R: Rng> {
    schema: &'a TableSchema,
    invoker: &'a mut I,
    generator: ValueGenerator<R>,
    policy: FailurePolicy,
}

impl<'a, I: Invoker, R: Rng> BatchRunner<'a, I, R> {
    #[must_use]
    pub fn new(
        schema: &'a TableSchema,
        invoker: &'a mut I,
        generator: ValueGenerator<R>,
        policy: FailurePolicy,
    ) -> Self {
        Self {
            schema,
            invoker,
            generator,
            policy,
        }
    }

    /// # Errors
    ///
    /// Under [`FailurePolicy::Abort`] the first failed statement ends the batch with
    /// [`DbLoadError::InvocationFailed`]. Under [`FailurePolicy::Continue`] failures only land
    /// in the report. Submission errors always end the batch. A schema failing
    /// [`TableSchema::validate`] is rejected before anything is submitted.
    pub fn run(&mut self, rows: u32) -> Result<BatchReport, Error> {
        let schema = self.schema;
        schema.validate()?;

        let builder = StatementBuilder::new(schema);
        let mut report = BatchReport::default();

        info!("Starting batch on table {} with {rows} rows", schema.name);

        self.submit(&builder.create_table(), &mut report)?;
        (1..=i64::from(rows)).try_for_each(|row_id| {
            let row = self.generator.generate_row(schema, row_id);
            self.submit(&builder.insert(&row), &mut report)
        })?;
        self.submit(&builder.select_all(), &mut report)?;

        info!(
            "Batch done, {} statements issued, {} failed",
            report.issued,
            report.failures.len()
        );
        Ok(report)
    }

    fn submit(&mut self, statement: &Statement, report: &mut BatchReport) -> Result<(), Error> {
        debug!("Submitting: {statement}");

        let invocation = self.invoker.invoke(statement)?;
        report.issued += 1;

        if !invocation.output.is_empty() {
            debug!("Output: {}", invocation.output.trim_end());
        }
        if invocation.success() {
            return Ok(());
        }

        let failure = Failure {
            kind: statement.kind,
            exit_code: invocation.exit_code,
            statement: statement.text.clone(),
        };

        match self.policy {
            FailurePolicy::Abort => {
                error!(
                    "{} statement failed with exit code {:?}, aborting",
                    failure.kind, failure.exit_code
                );
                Err(DbLoadError::from(failure).into())
            }
            FailurePolicy::Continue => {
                warn!(
                    "{} statement failed with exit code {:?}, continuing",
                    failure.kind, failure.exit_code
                );
                report.failures.push(failure);
                Ok(())
            }
        }
    }
}
