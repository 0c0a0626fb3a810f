use ndarray::{Array1, Array2, ArrayView2, Axis};

use crate::{
    error::{RecommenderError, RecommenderResult},
    models::SimilarityMethod,
};

/// Pairwise similarity between `k` reference rows and `n` catalog rows, producing `[k x n]`
pub type KernelFn = fn(ArrayView2<'_, f64>, ArrayView2<'_, f64>, &KernelParams) -> Array2<f64>;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct KernelParams {
    /// RBF width; `1 / n_features` when unset
    pub gamma: Option<f64>,
}

/// Kernel implementations, indexed by method
const KERNEL_TABLE: [(SimilarityMethod, KernelFn); 2] = [
    (SimilarityMethod::Linear, linear_kernel),
    (SimilarityMethod::Rbf, rbf_kernel),
];

/// A similarity method resolved to its implementation
#[derive(Clone, Copy)]
pub struct Kernel {
    method: SimilarityMethod,
    func: KernelFn,
    params: KernelParams,
}

impl std::fmt::Debug for Kernel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Kernel")
            .field("method", &self.method)
            .field("params", &self.params)
            .finish()
    }
}

impl Kernel {
    /// Looks the method up once; chunks reuse the resolved function
    pub fn resolve(method: SimilarityMethod, params: KernelParams) -> RecommenderResult<Self> {
        if let Some(gamma) = params.gamma {
            if !gamma.is_finite() || gamma <= 0.0 {
                return Err(RecommenderError::InvalidConfiguration(format!(
                    "rbf gamma must be a positive finite number, got {gamma}"
                )));
            }
        }

        KERNEL_TABLE
            .iter()
            .find(|(candidate, _)| *candidate == method)
            .map(|(_, func)| Self {
                method,
                func: *func,
                params,
            })
            .ok_or_else(|| RecommenderError::UnknownSimilarityMethod(method.to_string()))
    }

    pub fn method(&self) -> SimilarityMethod {
        self.method
    }

    pub fn compute(&self, reference: ArrayView2<'_, f64>, all: ArrayView2<'_, f64>) -> Array2<f64> {
        (self.func)(reference, all, &self.params)
    }
}

/// Inner product of every reference row with every catalog row
pub fn linear_kernel(
    reference: ArrayView2<'_, f64>,
    all: ArrayView2<'_, f64>,
    _params: &KernelParams,
) -> Array2<f64> {
    reference.dot(&all.t())
}

/// `exp(-gamma * ||x - y||^2)` for every reference/catalog pair
///
/// Squared distances are expanded as `|x|^2 + |y|^2 - 2 x.y` and clamped at
/// zero, since rounding can push identical rows slightly negative.
pub fn rbf_kernel(
    reference: ArrayView2<'_, f64>,
    all: ArrayView2<'_, f64>,
    params: &KernelParams,
) -> Array2<f64> {
    let n_features = reference.ncols().max(1);
    let gamma = params.gamma.unwrap_or(1.0 / n_features as f64);

    let reference_norms: Array1<f64> = reference.map_axis(Axis(1), |row| row.dot(&row));
    let all_norms: Array1<f64> = all.map_axis(Axis(1), |row| row.dot(&row));

    let mut distances = reference.dot(&all.t());
    distances.mapv_inplace(|cross| -2.0 * cross);
    distances += &reference_norms.insert_axis(Axis(1));
    distances += &all_norms.insert_axis(Axis(0));

    distances.mapv_inplace(|squared| (-gamma * squared.max(0.0)).exp());
    distances
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn assert_close(actual: &Array2<f64>, expected: &Array2<f64>) {
        assert_eq!(actual.dim(), expected.dim());
        for (a, e) in actual.iter().zip(expected.iter()) {
            assert!((a - e).abs() < 1e-12, "{a} != {e}");
        }
    }

    #[test]
    fn test_linear_kernel() {
        let all = array![[1.0, 0.0], [0.0, 1.0], [1.0, 1.0]];
        let reference = array![[1.0, 1.0], [2.0, 0.0]];

        let kernel = Kernel::resolve(SimilarityMethod::Linear, KernelParams::default()).unwrap();
        let result = kernel.compute(reference.view(), all.view());

        assert_close(&result, &array![[1.0, 1.0, 2.0], [2.0, 0.0, 2.0]]);
    }

    #[test]
    fn test_rbf_kernel_default_gamma() {
        let all = array![[0.0, 0.0], [1.0, 1.0], [1.0, 0.0]];
        let reference = array![[0.0, 0.0]];

        let kernel = Kernel::resolve(SimilarityMethod::Rbf, KernelParams::default()).unwrap();
        let result = kernel.compute(reference.view(), all.view());

        // gamma = 1/2
        let expected = array![[1.0, (-1.0f64).exp(), (-0.5f64).exp()]];
        assert_close(&result, &expected);
    }

    #[test]
    fn test_rbf_kernel_explicit_gamma() {
        let all = array![[3.0], [1.0]];
        let reference = array![[1.0]];
        let params = KernelParams { gamma: Some(0.25) };

        let result = rbf_kernel(reference.view(), all.view(), &params);
        assert_close(&result, &array![[(-1.0f64).exp(), 1.0]]);
    }

    #[test]
    fn test_rbf_self_similarity_is_one() {
        let all = array![[0.1, 0.7, 0.3], [0.9, 0.2, 0.4]];
        let result = rbf_kernel(all.view(), all.view(), &KernelParams::default());
        assert!((result[[0, 0]] - 1.0).abs() < 1e-12);
        assert!((result[[1, 1]] - 1.0).abs() < 1e-12);
        assert!(result[[0, 1]] < 1.0);
    }

    #[test]
    fn test_invalid_gamma_rejected() {
        let result = Kernel::resolve(SimilarityMethod::Rbf, KernelParams { gamma: Some(0.0) });
        assert!(matches!(result, Err(RecommenderError::InvalidConfiguration(_))));
    }

    #[test]
    fn test_every_method_has_a_kernel() {
        for method in [SimilarityMethod::Linear, SimilarityMethod::Rbf] {
            let kernel = Kernel::resolve(method, KernelParams::default()).unwrap();
            assert_eq!(kernel.method(), method);
        }
    }
}
