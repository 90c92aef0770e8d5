use ndarray::{Array1, Array2, ArrayView2};

use crate::{ChannelErr, Phase, Result, trace::TraceSource};

/// Builds the channel out of the empirical traces of every user.
///
/// Each user's trace is normalized into `[0, 1]` and its transposed view is subsampled at
/// `n_ant` evenly spaced rows of the `iteration`-th column. User `u` fills the `u`-th column
/// of the channel.
pub fn calculate_channel(
    traces: &dyn TraceSource,
    n_ant: usize,
    n_user: usize,
    iteration: usize,
    phase: Phase,
) -> Result<Array2<f32>> {
    let mut h = Array2::zeros((n_ant, n_user));

    for (user, mut column) in h.columns_mut().into_iter().enumerate() {
        let trace = traces.load(phase, user + 1)?;
        let samples = sample_user(trace.t(), n_ant, iteration).map_err(|len| {
            ChannelErr::TraceExhausted {
                user: user + 1,
                iteration,
                len,
            }
        })?;

        column.assign(&samples);
    }

    Ok(h)
}

/// Samples `n_ant` normalized magnitudes of a trace at the given iteration.
///
/// # Returns
/// The samples, or the amount of available iterations if `iteration` is out of range.
fn sample_user(
    trace: ArrayView2<f32>,
    n_ant: usize,
    iteration: usize,
) -> std::result::Result<Array1<f32>, usize> {
    let (rows, cols) = trace.dim();
    if iteration >= cols || rows == 0 {
        return Err(cols);
    }

    let (min, max) = trace
        .iter()
        .fold((f32::INFINITY, f32::NEG_INFINITY), |(min, max), &x| {
            (min.min(x), max.max(x))
        });
    let range = max - min;

    let samples = antenna_rows(rows, n_ant)
        .map(|row| {
            if range > 0. {
                (trace[[row, iteration]] - min) / range
            } else {
                0.
            }
        })
        .collect();

    Ok(samples)
}

/// Evenly spaced rows from the first to the last one, rounded down.
fn antenna_rows(rows: usize, n_ant: usize) -> impl Iterator<Item = usize> {
    let last = rows - 1;
    let steps = n_ant.saturating_sub(1).max(1);
    (0..n_ant).map(move |i| i * last / steps)
}
