//! Raw model output tensors.
//!
//! `TensorView` is a borrowed 2D view over the flat `f32` buffer an inference
//! engine hands back. Which axis holds the predictions is not stored here; it
//! is declared by [`Layout`] in the decode configuration. A leading batch
//! dimension of size 1 (`[1, rows, cols]`, as emitted by YOLOv5 exports) is
//! folded away at construction.

use crate::util::{DecodeError, DecodeResult};

/// Axis order of a detection tensor.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Layout {
    /// `[num_predictions][num_attributes]`, one row per prediction.
    #[default]
    PredictionMajor,
    /// `[num_attributes][num_predictions]`, one row per attribute.
    AttributeMajor,
}

/// Borrowed row-major 2D view into a flat output buffer.
#[derive(Copy, Clone, Debug)]
pub struct TensorView<'a> {
    data: &'a [f32],
    rows: usize,
    cols: usize,
}

impl<'a> TensorView<'a> {
    /// Creates a view over exactly `rows * cols` elements.
    pub fn new(data: &'a [f32], rows: usize, cols: usize) -> DecodeResult<Self> {
        let needed = required_len(rows, cols)?;
        if data.len() != needed {
            return Err(DecodeError::BufferSizeMismatch {
                needed,
                got: data.len(),
            });
        }
        Ok(Self { data, rows, cols })
    }

    /// Creates a view from an engine-reported shape (`[r, c]` or `[1, r, c]`).
    pub fn from_shape(data: &'a [f32], shape: &[usize]) -> DecodeResult<Self> {
        let (rows, cols) = fold_shape(shape)?;
        Self::new(data, rows, cols)
    }

    /// Number of rows in the view.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of columns in the view.
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Returns the backing slice.
    pub fn as_slice(&self) -> &'a [f32] {
        self.data
    }

    /// Returns the element at `(row, col)` if it is within bounds.
    pub fn get(&self, row: usize, col: usize) -> Option<f32> {
        if row >= self.rows || col >= self.cols {
            return None;
        }
        self.data.get(row * self.cols + col).copied()
    }

    /// Returns row `row` as a contiguous slice.
    pub fn row(&self, row: usize) -> Option<&'a [f32]> {
        if row >= self.rows {
            return None;
        }
        let start = row * self.cols;
        self.data.get(start..start + self.cols)
    }

    /// Number of predictions under `layout`.
    pub fn num_predictions(&self, layout: Layout) -> usize {
        match layout {
            Layout::PredictionMajor => self.rows,
            Layout::AttributeMajor => self.cols,
        }
    }

    /// Number of attributes per prediction under `layout`.
    pub fn num_attributes(&self, layout: Layout) -> usize {
        match layout {
            Layout::PredictionMajor => self.cols,
            Layout::AttributeMajor => self.rows,
        }
    }

    /// Reads attribute `attr` of prediction `pred` under `layout`.
    #[inline]
    pub(crate) fn attribute(&self, layout: Layout, pred: usize, attr: usize) -> f32 {
        let idx = match layout {
            Layout::PredictionMajor => pred * self.cols + attr,
            Layout::AttributeMajor => attr * self.cols + pred,
        };
        self.data[idx]
    }
}

/// Owned output tensor, as returned by an inference session.
#[derive(Clone, Debug, PartialEq)]
pub struct RawTensor {
    data: Vec<f32>,
    rows: usize,
    cols: usize,
}

impl RawTensor {
    /// Wraps an owned buffer of exactly `rows * cols` elements.
    pub fn new(data: Vec<f32>, rows: usize, cols: usize) -> DecodeResult<Self> {
        TensorView::new(&data, rows, cols)?;
        Ok(Self { data, rows, cols })
    }

    /// Wraps an owned buffer with an engine-reported shape.
    pub fn from_shape(data: Vec<f32>, shape: &[usize]) -> DecodeResult<Self> {
        let (rows, cols) = fold_shape(shape)?;
        Self::new(data, rows, cols)
    }

    /// Builds a prediction-major tensor from per-prediction attribute rows.
    pub fn from_predictions(predictions: &[Vec<f32>]) -> DecodeResult<Self> {
        let rows = predictions.len();
        let cols = predictions.first().map_or(0, Vec::len);
        let mut data = Vec::with_capacity(rows.saturating_mul(cols));
        for row in predictions {
            if row.len() != cols {
                return Err(DecodeError::BufferSizeMismatch {
                    needed: cols,
                    got: row.len(),
                });
            }
            data.extend_from_slice(row);
        }
        Self::new(data, rows, cols)
    }

    /// Returns a borrowed view of the tensor.
    pub fn view(&self) -> TensorView<'_> {
        TensorView {
            data: &self.data,
            rows: self.rows,
            cols: self.cols,
        }
    }

    /// Returns the transposed tensor (swaps prediction- and attribute-major).
    pub fn transposed(&self) -> Self {
        let mut data = Vec::with_capacity(self.data.len());
        for c in 0..self.cols {
            for r in 0..self.rows {
                data.push(self.data[r * self.cols + c]);
            }
        }
        Self {
            data,
            rows: self.cols,
            cols: self.rows,
        }
    }

    /// Number of rows.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of columns.
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Consumes the tensor and returns the flat buffer.
    pub fn into_vec(self) -> Vec<f32> {
        self.data
    }
}

fn required_len(rows: usize, cols: usize) -> DecodeResult<usize> {
    if rows == 0 || cols == 0 {
        return Err(DecodeError::InvalidDimensions { rows, cols });
    }
    rows.checked_mul(cols)
        .ok_or(DecodeError::InvalidDimensions { rows, cols })
}

fn fold_shape(shape: &[usize]) -> DecodeResult<(usize, usize)> {
    match *shape {
        [rows, cols] => Ok((rows, cols)),
        [1, rows, cols] => Ok((rows, cols)),
        [batch, _, _] => Err(DecodeError::UnsupportedRank { rank: 3, batch }),
        _ => Err(DecodeError::UnsupportedRank {
            rank: shape.len(),
            batch: shape.first().copied().unwrap_or(0),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::{Layout, RawTensor};

    #[test]
    fn transposed_swaps_axes() {
        let t = RawTensor::new(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0], 2, 3).unwrap();
        let tt = t.transposed();
        assert_eq!((tt.rows(), tt.cols()), (3, 2));
        assert_eq!(tt.view().row(0).unwrap(), &[1.0f32, 4.0]);
        assert_eq!(tt.transposed(), t);
    }

    #[test]
    fn attribute_reads_follow_layout() {
        let t = RawTensor::new(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0], 2, 3).unwrap();
        let view = t.view();
        assert_eq!(view.attribute(Layout::PredictionMajor, 1, 2), 6.0);
        assert_eq!(view.attribute(Layout::AttributeMajor, 2, 1), 6.0);
        assert_eq!(view.num_predictions(Layout::AttributeMajor), 3);
        assert_eq!(view.num_attributes(Layout::AttributeMajor), 2);
    }
}
