use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::{
    schema::{ColumnSpec, Domain, TableSchema},
    value::Value,
};

const LETTERS: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";
const DIGITS: &[u8] = b"0123456789";

pub const DEFAULT_NULL_PROBABILITY: f64 = 0.5;

/// Produces rows of literals for a table schema.
///
/// The random source is owned by the generator. Use [`ValueGenerator::new`] with a seed for
/// reproducible rows, or [`ValueGenerator::with_rng`] to bring any `Rng`.
pub struct ValueGenerator<R: Rng> {
    rng: R,
    null_probability: f64,
}

impl ValueGenerator<StdRng> {
    /// Seeded when `seed` is given, otherwise seeded from the OS.
    #[must_use]
    pub fn new(seed: Option<u64>, null_probability: f64) -> Self {
        let rng = seed.map_or_else(StdRng::from_os_rng, StdRng::seed_from_u64);
        Self::with_rng(rng, null_probability)
    }
}

impl<R: Rng> ValueGenerator<R> {
    /// `null_probability` is clamped into `0.0..=1.0`, NaN counts as zero.
    #[must_use]
    pub fn with_rng(rng: R, null_probability: f64) -> Self {
        let null_probability = if null_probability.is_nan() {
            0.0
        } else {
            null_probability.clamp(0.0, 1.0)
        };

        Self {
            rng,
            null_probability,
        }
    }

    /// One literal per column, in schema order. `row_id` is the 1-based ordinal of the row.
    pub fn generate_row(&mut self, schema: &TableSchema, row_id: i64) -> Vec<Value> {
        schema
            .columns
            .values()
            .map(|column| self.generate_value(column, row_id))
            .collect()
    }

    fn generate_value(&mut self, column: &ColumnSpec, row_id: i64) -> Value {
        if column.nullable && self.rng.random_bool(self.null_probability) {
            return Value::NULL;
        }

        match &column.domain {
            Domain::RowId => Value::Int(row_id),
            Domain::IntRange { min, max } => Value::Int(self.rng.random_range(*min..=*max)),
            Domain::Letters { len } => Value::Str(self.random_chars(LETTERS, *len)),
            Domain::Email { local_len, host } => {
                Value::Str(format!("{}@{host}", self.random_chars(LETTERS, *local_len)))
            }
            Domain::Digits { len } => {
                let mut digits = self.random_chars(&DIGITS[1..], 1);
                digits.push_str(&self.random_chars(DIGITS, len.saturating_sub(1)));
                Value::Str(digits)
            }
            Domain::OneOf(options) => {
                Value::Str(options[self.rng.random_range(0..options.len())].clone())
            }
        }
    }

    fn random_chars(&mut self, charset: &[u8], len: usize) -> String {
        (0..len)
            .map(|_| char::from(charset[self.rng.random_range(0..charset.len())]))
            .collect()
    }
}
