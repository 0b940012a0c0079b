#[cfg(feature = "python-bindings")]
use ndarray::{Array1, Array2};

#[cfg(feature = "python-bindings")]
use pyo3::{exceptions::PyTypeError, prelude::*, types::PyAny};

#[cfg(feature = "python-bindings")]
use numpy::{
    IntoPyArray,    // Vec → PyArray
    PyArrayMethods, // .readonly()
    PyReadonlyArray1, PyReadonlyArray2,
};

#[cfg(feature = "python-bindings")]
use crate::did::{BootType, IpwDidOptions, RcData};

#[cfg(feature = "python-bindings")]
#[inline]
pub fn extract_f64_array<'py>(
    py: Python<'py>, raw_data: &Bound<'py, PyAny>,
) -> PyResult<PyReadonlyArray1<'py, f64>> {
    if let Ok(arr_ro) = raw_data.extract::<PyReadonlyArray1<f64>>() {
        return Ok(arr_ro);
    }

    if let Ok(obj) = raw_data.call_method("to_numpy", (false,), None) {
        if let Ok(series_ro) = obj.extract::<PyReadonlyArray1<f64>>() {
            return Ok(series_ro);
        }
    }

    let vec: Vec<f64> = raw_data.extract().map_err(|_| {
        PyTypeError::new_err("expected a 1-D numpy.ndarray, pandas.Series, or sequence of float64")
    })?;
    Ok(vec.into_pyarray(py).readonly())
}

/// Copy a 1-D array-like into an owned vector; `name` labels type errors.
#[cfg(feature = "python-bindings")]
pub fn extract_vector<'py>(
    py: Python<'py>, raw_data: &Bound<'py, PyAny>, name: &str,
) -> PyResult<Array1<f64>> {
    let arr = extract_f64_array(py, raw_data)
        .map_err(|_| PyTypeError::new_err(format!("{name} must be a 1-D float64 array-like")))?;
    Ok(arr.as_array().to_owned())
}

/// Copy a 2-D array-like (ndarray, DataFrame, or nested sequence) into an
/// owned `n × k` matrix. A 1-D input is read as a single column.
#[cfg(feature = "python-bindings")]
pub fn extract_f64_matrix<'py>(
    py: Python<'py>, raw_data: &Bound<'py, PyAny>,
) -> PyResult<Array2<f64>> {
    if let Ok(arr_ro) = raw_data.extract::<PyReadonlyArray2<f64>>() {
        return Ok(arr_ro.as_array().to_owned());
    }

    if let Ok(obj) = raw_data.call_method("to_numpy", (), None) {
        if let Ok(frame_ro) = obj.extract::<PyReadonlyArray2<f64>>() {
            return Ok(frame_ro.as_array().to_owned());
        }
    }

    if let Ok(rows) = raw_data.extract::<Vec<Vec<f64>>>() {
        let nrows = rows.len();
        let ncols = rows.first().map_or(0, Vec::len);
        if rows.iter().any(|r| r.len() != ncols) {
            return Err(PyTypeError::new_err("covariates rows must all have the same length"));
        }
        let flat: Vec<f64> = rows.into_iter().flatten().collect();
        return Array2::from_shape_vec((nrows, ncols), flat)
            .map_err(|e| PyTypeError::new_err(e.to_string()));
    }

    let column = extract_f64_array(py, raw_data).map_err(|_| {
        PyTypeError::new_err("covariates must be a 2-D numpy.ndarray, pandas.DataFrame, or nested sequence of float64")
    })?;
    let column = column.as_array().to_owned();
    let n = column.len();
    column.into_shape((n, 1)).map_err(|e| PyTypeError::new_err(e.to_string()))
}

/// Build the validated sample from Python array-likes.
#[cfg(feature = "python-bindings")]
pub fn extract_rc_data<'py>(
    py: Python<'py>, y: &Bound<'py, PyAny>, post: &Bound<'py, PyAny>, d: &Bound<'py, PyAny>,
    covariates: Option<&Bound<'py, PyAny>>, i_weights: Option<&Bound<'py, PyAny>>,
) -> PyResult<RcData> {
    let y = extract_vector(py, y, "y")?;
    let post = extract_vector(py, post, "post")?;
    let d = extract_vector(py, d, "D")?;
    let covariates = covariates.map(|c| extract_f64_matrix(py, c)).transpose()?;
    let weights = i_weights.map(|w| extract_vector(py, w, "i_weights")).transpose()?;
    Ok(RcData::new(y, post, d, covariates, weights)?)
}

/// Build and validate estimator options from keyword arguments.
#[cfg(feature = "python-bindings")]
pub fn extract_ipw_options(
    boot: bool, boot_type: &str, nboot: usize, influence_func: bool, trim_level: f64,
    seed: Option<u64>,
) -> PyResult<IpwDidOptions> {
    let boot_type: BootType = boot_type.parse()?;
    let opts = IpwDidOptions::new(boot, boot_type, nboot, influence_func, trim_level)?;
    Ok(match seed {
        Some(seed) => opts.with_seed(seed),
        None => opts,
    })
}
