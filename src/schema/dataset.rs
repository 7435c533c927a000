//! Supervised-learning datasets.
//!
//! Text format: a header line `num_inputs,num_outputs,num_samples` followed by
//! `num_samples` rows of `num_inputs` input values then `num_outputs` expected
//! output values, all comma-separated. Blank lines are ignored.

use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Dataset construction errors.
#[derive(Debug, thiserror::Error)]
pub enum DatasetError {
    #[error("Failed to read dataset: {0}")]
    Io(#[from] std::io::Error),
    #[error("Line {line}: {message}")]
    Parse { line: usize, message: String },
    #[error("Invalid dataset shape: {0}")]
    Shape(String),
}

/// Input/expected-output samples, stored row-major.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "DatasetRecord")]
pub struct Dataset {
    num_inputs: usize,
    num_outputs: usize,
    num_samples: usize,
    inputs: Vec<f32>,
    outputs: Vec<f32>,
}

impl Dataset {
    /// Build from flat row-major arrays of `num_samples * num_inputs` inputs
    /// and `num_samples * num_outputs` outputs.
    pub fn from_arrays(
        num_inputs: usize,
        num_outputs: usize,
        num_samples: usize,
        inputs: &[f32],
        outputs: &[f32],
    ) -> Result<Self, DatasetError> {
        if num_inputs == 0 || num_outputs == 0 {
            return Err(DatasetError::Shape(format!(
                "need at least one input and one output, got {num_inputs} and {num_outputs}"
            )));
        }
        let expected = |width: usize| {
            num_samples.checked_mul(width).ok_or_else(|| {
                DatasetError::Shape(format!("{num_samples} samples of width {width} overflow"))
            })
        };
        let (expected_inputs, expected_outputs) = (expected(num_inputs)?, expected(num_outputs)?);
        if inputs.len() != expected_inputs {
            return Err(DatasetError::Shape(format!(
                "expected {expected_inputs} input values, got {}",
                inputs.len()
            )));
        }
        if outputs.len() != expected_outputs {
            return Err(DatasetError::Shape(format!(
                "expected {expected_outputs} output values, got {}",
                outputs.len()
            )));
        }

        Ok(Self {
            num_inputs,
            num_outputs,
            num_samples,
            inputs: inputs.to_vec(),
            outputs: outputs.to_vec(),
        })
    }

    /// Load a dataset file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, DatasetError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)?;
        let dataset: Self = text.parse()?;
        log::debug!(
            "Loaded {} samples ({} inputs, {} outputs) from {}",
            dataset.num_samples,
            dataset.num_inputs,
            dataset.num_outputs,
            path.display()
        );
        Ok(dataset)
    }

    #[inline]
    pub fn num_inputs(&self) -> usize {
        self.num_inputs
    }

    #[inline]
    pub fn num_outputs(&self) -> usize {
        self.num_outputs
    }

    #[inline]
    pub fn num_samples(&self) -> usize {
        self.num_samples
    }

    /// Input vector of sample `index`.
    ///
    /// # Panics
    /// If `index >= num_samples()`.
    #[inline]
    pub fn sample_inputs(&self, index: usize) -> &[f32] {
        let start = index * self.num_inputs;
        &self.inputs[start..start + self.num_inputs]
    }

    /// Expected output vector of sample `index`.
    ///
    /// # Panics
    /// If `index >= num_samples()`.
    #[inline]
    pub fn sample_outputs(&self, index: usize) -> &[f32] {
        let start = index * self.num_outputs;
        &self.outputs[start..start + self.num_outputs]
    }

    /// Iterate over `(inputs, expected outputs)` pairs.
    pub fn samples(&self) -> impl Iterator<Item = (&[f32], &[f32])> + '_ {
        self.inputs
            .chunks_exact(self.num_inputs)
            .zip(self.outputs.chunks_exact(self.num_outputs))
    }
}

/// Serialized form of a [`Dataset`], checked through [`Dataset::from_arrays`].
#[derive(Deserialize)]
struct DatasetRecord {
    num_inputs: usize,
    num_outputs: usize,
    num_samples: usize,
    inputs: Vec<f32>,
    outputs: Vec<f32>,
}

impl TryFrom<DatasetRecord> for Dataset {
    type Error = DatasetError;

    fn try_from(record: DatasetRecord) -> Result<Self, Self::Error> {
        Self::from_arrays(
            record.num_inputs,
            record.num_outputs,
            record.num_samples,
            &record.inputs,
            &record.outputs,
        )
    }
}

fn parse_values<T: FromStr>(line: &str, line_no: usize) -> Result<Vec<T>, DatasetError>
where
    T::Err: fmt::Display,
{
    line.split(',')
        .map(|field| {
            field.trim().parse::<T>().map_err(|e| DatasetError::Parse {
                line: line_no,
                message: format!("'{}': {e}", field.trim()),
            })
        })
        .collect()
}

impl FromStr for Dataset {
    type Err = DatasetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut lines = s
            .lines()
            .enumerate()
            .map(|(i, line)| (i + 1, line.trim()))
            .filter(|(_, line)| !line.is_empty());

        let (header_no, header) = lines
            .next()
            .ok_or_else(|| DatasetError::Shape("missing header line".to_string()))?;
        let header: Vec<usize> = parse_values(header, header_no)?;
        let [num_inputs, num_outputs, num_samples] = header[..] else {
            return Err(DatasetError::Parse {
                line: header_no,
                message: format!(
                    "header needs num_inputs,num_outputs,num_samples; found {} fields",
                    header.len()
                ),
            });
        };

        let width = num_inputs
            .checked_add(num_outputs)
            .ok_or_else(|| DatasetError::Shape("header dimensions overflow".to_string()))?;
        let mut inputs = Vec::new();
        let mut outputs = Vec::new();
        let mut rows = 0;

        for (line_no, line) in lines {
            let values: Vec<f32> = parse_values(line, line_no)?;
            if values.len() != width {
                return Err(DatasetError::Parse {
                    line: line_no,
                    message: format!("expected {width} values, found {}", values.len()),
                });
            }
            inputs.extend_from_slice(&values[..num_inputs]);
            outputs.extend_from_slice(&values[num_inputs..]);
            rows += 1;
        }

        if rows != num_samples {
            return Err(DatasetError::Shape(format!(
                "header declares {num_samples} samples but {rows} rows were found"
            )));
        }

        Self::from_arrays(num_inputs, num_outputs, num_samples, &inputs, &outputs)
    }
}

impl fmt::Display for Dataset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "DATA SET")?;
        writeln!(
            f,
            "Inputs: {}, Outputs: {}, Samples: {}",
            self.num_inputs, self.num_outputs, self.num_samples
        )?;
        for (inputs, outputs) in self.samples() {
            for value in inputs {
                write!(f, "{value:.6} ")?;
            }
            write!(f, " : ")?;
            for value in outputs {
                write!(f, "{value:.6} ")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
