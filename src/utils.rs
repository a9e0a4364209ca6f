use anyhow::{Context, Result, bail};
use std::{fmt::Debug, ops::RangeBounds};

pub fn check_num<T, R>(num: T, range: R) -> Result<()>
where
    T: PartialOrd + Debug,
    R: RangeBounds<T> + Debug,
{
    if !range.contains(&num) {
        bail!("number must be in the range {range:?}, but is {num:?}");
    }
    Ok(())
}

/// Check length and sign of a real vector.
///
/// Every element must be finite and non-negative, or strictly positive
/// when `pos_only` is set.
pub fn check_vec(vec: &[f64], exp_len: usize, pos_only: bool) -> Result<()> {
    let len = vec.len();
    if len != exp_len {
        bail!("vector length must be {exp_len}, but is {len}");
    }
    if let Some(ele) = vec.iter().find(|ele| !ele.is_finite()) {
        bail!("vector must have only finite elements, but has {ele}");
    }
    if pos_only {
        if vec.iter().any(|&ele| ele <= 0.0) {
            bail!("vector must have only positive elements");
        }
    } else if vec.iter().any(|&ele| ele < 0.0) {
        bail!("vector must have only non-negative elements");
    }
    Ok(())
}

pub fn check_mat(mat: &[Vec<f64>], exp_dim: (usize, usize)) -> Result<()> {
    let (exp_n_rows, exp_n_cols) = exp_dim;
    let n_rows = mat.len();
    if n_rows != exp_n_rows {
        bail!("matrix must have {exp_n_rows} rows, but has {n_rows}");
    }
    for (i_row, row) in mat.iter().enumerate() {
        check_vec(row, exp_n_cols, false).with_context(|| format!("invalid row {i_row}"))?;
    }
    Ok(())
}

/// Check that every index refers to one of `n` sites.
pub fn check_idxs(idxs: &[usize], n: usize) -> Result<()> {
    if let Some(idx) = idxs.iter().find(|&&idx| idx >= n) {
        bail!("index must be smaller than {n}, but is {idx}");
    }
    Ok(())
}
