//! Numeric primitives over attribute vectors.

/// Sum of elementwise products. Both vectors must share a dimension.
pub fn dot(a: &[f64], b: &[f64]) -> f64 {
    debug_assert_eq!(a.len(), b.len(), "vectors must share a dimension");
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

/// Euclidean norm
pub fn norm(a: &[f64]) -> f64 {
    dot(a, a).sqrt()
}

/// Cosine of the angle between `a` and `b`, in `[-1, 1]`.
///
/// Returns `None` when either vector has zero norm, where the angle is
/// undefined.
pub fn cosine_similarity(a: &[f64], b: &[f64]) -> Option<f64> {
    let denominator = norm(a) * norm(b);
    if denominator == 0.0 {
        return None;
    }
    Some((dot(a, b) / denominator).clamp(-1.0, 1.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-12;

    #[test]
    fn test_dot_and_norm() {
        assert_eq!(dot(&[1.0, 2.0, 3.0], &[4.0, -5.0, 6.0]), 12.0);
        assert_eq!(norm(&[3.0, 4.0]), 5.0);
        assert_eq!(norm(&[0.0, 0.0]), 0.0);
    }

    #[test]
    fn test_self_similarity() {
        for v in [vec![1.0, 0.0], vec![3.0, 7.0, 1.5], vec![-2.0, 9.0, 4.0, 4.0]] {
            let sim = cosine_similarity(&v, &v).unwrap();
            assert!((sim - 1.0).abs() < EPS, "self similarity of {:?} was {}", v, sim);
        }
    }

    #[test]
    fn test_symmetry() {
        let a = [7.0, 2.0, 9.0, 1.0];
        let b = [1.0, 8.0, 3.0, 5.0];
        assert_eq!(cosine_similarity(&a, &b), cosine_similarity(&b, &a));
    }

    #[test]
    fn test_orthogonal_and_opposite() {
        assert_eq!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]), Some(0.0));
        let opposite = cosine_similarity(&[1.0, 2.0], &[-1.0, -2.0]).unwrap();
        assert!((opposite + 1.0).abs() < EPS);
    }

    #[test]
    fn test_zero_vector_is_undefined() {
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 1.0]), None);
        assert_eq!(cosine_similarity(&[1.0, 1.0], &[0.0, 0.0]), None);
    }

    #[test]
    fn test_known_angle() {
        let sim = cosine_similarity(&[1.0, 0.0], &[1.0, 1.0]).unwrap();
        assert!((sim - std::f64::consts::FRAC_1_SQRT_2).abs() < EPS);
    }
}
