// crates/fsi_mesh/src/mapping.rs

//! Q1 等参映射
//!
//! 参考单元为 `[0,1]²`，顶点按字典序编号：
//!
//! ```text
//!  2 ---- 3
//!  |      |
//!  |      |
//!  0 ---- 1
//! ```
//!
//! 局部面编号：0 = (ξ=0)，1 = (ξ=1)，2 = (η=0)，3 = (η=1)。
//! 物理坐标 `x(ξ) = Σ N_i(ξ) x_i`，Jacobian 按列存储 `J = [∂x/∂ξ, ∂x/∂η]`。

use glam::{DMat2, DVec2};

/// 每个单元的顶点数
pub const VERTICES_PER_CELL: usize = 4;

/// 每个单元的面数
pub const FACES_PER_CELL: usize = 4;

/// 局部面到局部顶点的映射（沿面参数 s 从第一个顶点指向第二个顶点）
pub const FACE_VERTICES: [[usize; 2]; FACES_PER_CELL] = [[0, 2], [1, 3], [0, 1], [2, 3]];

/// 参考单元上的外法向
pub const REFERENCE_FACE_NORMALS: [DVec2; FACES_PER_CELL] = [
    DVec2::new(-1.0, 0.0),
    DVec2::new(1.0, 0.0),
    DVec2::new(0.0, -1.0),
    DVec2::new(0.0, 1.0),
];

/// Newton 反映射最大迭代次数
const MAX_NEWTON_ITERATIONS: usize = 20;

/// Newton 收敛的相对残差（相对单元尺寸）
const NEWTON_RELATIVE_TOL: f64 = 1e-13;

/// 双线性形函数值
#[inline]
pub fn shape_values(xi: DVec2) -> [f64; VERTICES_PER_CELL] {
    let (x, y) = (xi.x, xi.y);
    [
        (1.0 - x) * (1.0 - y),
        x * (1.0 - y),
        (1.0 - x) * y,
        x * y,
    ]
}

/// 双线性形函数在参考单元上的梯度
#[inline]
pub fn shape_gradients(xi: DVec2) -> [DVec2; VERTICES_PER_CELL] {
    let (x, y) = (xi.x, xi.y);
    [
        DVec2::new(-(1.0 - y), -(1.0 - x)),
        DVec2::new(1.0 - y, -x),
        DVec2::new(-y, 1.0 - x),
        DVec2::new(y, x),
    ]
}

/// 参考坐标 -> 物理坐标
#[inline]
pub fn map_to_real(vertices: &[DVec2; VERTICES_PER_CELL], xi: DVec2) -> DVec2 {
    let n = shape_values(xi);
    vertices
        .iter()
        .zip(n.iter())
        .fold(DVec2::ZERO, |acc, (v, w)| acc + *v * *w)
}

/// 映射的 Jacobian（列为 ∂x/∂ξ 与 ∂x/∂η）
#[inline]
pub fn jacobian(vertices: &[DVec2; VERTICES_PER_CELL], xi: DVec2) -> DMat2 {
    let grads = shape_gradients(xi);
    let mut dx_dxi = DVec2::ZERO;
    let mut dx_deta = DVec2::ZERO;
    for (v, g) in vertices.iter().zip(grads.iter()) {
        dx_dxi += *v * g.x;
        dx_deta += *v * g.y;
    }
    DMat2::from_cols(dx_dxi, dx_deta)
}

/// 物理坐标 -> 参考坐标（Newton 迭代）
///
/// 返回的参考坐标不做投影，可能落在单元外；调用方用
/// [`distance_to_unit_cell`] 判断是否在单元内。
/// 单元退化或迭代不收敛时返回 `None`。
pub fn map_to_unit(
    vertices: &[DVec2; VERTICES_PER_CELL],
    point: DVec2,
    degenerate_tol: f64,
) -> Option<DVec2> {
    let scale = cell_diameter(vertices).max(f64::MIN_POSITIVE);
    let residual_tol = NEWTON_RELATIVE_TOL * scale;

    let mut xi = DVec2::splat(0.5);
    for _ in 0..MAX_NEWTON_ITERATIONS {
        let residual = map_to_real(vertices, xi) - point;
        if residual.length() <= residual_tol {
            return Some(xi);
        }

        let jac = jacobian(vertices, xi);
        let det = jac.determinant();
        if det.abs() <= degenerate_tol * scale * scale {
            return None;
        }

        xi -= jac.inverse() * residual;
        if !xi.is_finite() || xi.abs().max_element() > 1e6 {
            return None;
        }
    }

    let residual = map_to_real(vertices, xi) - point;
    (residual.length() <= residual_tol * 1e3).then_some(xi)
}

/// 参考坐标到单位单元的距离（∞ 范数，单元内为 0）
#[inline]
pub fn distance_to_unit_cell(xi: DVec2) -> f64 {
    let mut result = 0.0_f64;
    for d in [xi.x, xi.y] {
        if d < 0.0 {
            result = result.max(-d);
        } else if d > 1.0 {
            result = result.max(d - 1.0);
        }
    }
    result
}

/// 将参考坐标投影到单位单元
#[inline]
pub fn project_to_unit_cell(xi: DVec2) -> DVec2 {
    xi.clamp(DVec2::ZERO, DVec2::ONE)
}

/// 面参数 s ∈ [0,1] 对应的参考坐标
#[inline]
pub fn face_point(face: usize, s: f64) -> DVec2 {
    match face {
        0 => DVec2::new(0.0, s),
        1 => DVec2::new(1.0, s),
        2 => DVec2::new(s, 0.0),
        _ => DVec2::new(s, 1.0),
    }
}

/// 单元直径（最长对角线）
#[inline]
pub fn cell_diameter(vertices: &[DVec2; VERTICES_PER_CELL]) -> f64 {
    vertices[0]
        .distance(vertices[3])
        .max(vertices[1].distance(vertices[2]))
}

/// 单元面积（逆时针多边形 0-1-3-2 的鞋带公式，带符号）
#[inline]
pub fn signed_area(vertices: &[DVec2; VERTICES_PER_CELL]) -> f64 {
    let ring = [vertices[0], vertices[1], vertices[3], vertices[2]];
    let mut twice = 0.0;
    for i in 0..4 {
        let a = ring[i];
        let b = ring[(i + 1) % 4];
        twice += a.perp_dot(b);
    }
    0.5 * twice
}

#[cfg(test)]
mod tests {
    use super::*;

    fn skewed_cell() -> [DVec2; 4] {
        [
            DVec2::new(0.0, 0.0),
            DVec2::new(2.0, 0.2),
            DVec2::new(0.3, 1.0),
            DVec2::new(2.5, 1.4),
        ]
    }

    #[test]
    fn test_partition_of_unity() {
        let xi = DVec2::new(0.3, 0.8);
        let sum: f64 = shape_values(xi).iter().sum();
        assert!((sum - 1.0).abs() < 1e-14);
        let grad_sum = shape_gradients(xi)
            .iter()
            .fold(DVec2::ZERO, |acc, g| acc + *g);
        assert!(grad_sum.length() < 1e-14);
    }

    #[test]
    fn test_vertices_map_to_corners() {
        let v = skewed_cell();
        let corners = [
            DVec2::new(0.0, 0.0),
            DVec2::new(1.0, 0.0),
            DVec2::new(0.0, 1.0),
            DVec2::new(1.0, 1.0),
        ];
        for (i, c) in corners.iter().enumerate() {
            assert!(map_to_real(&v, *c).distance(v[i]) < 1e-14);
        }
    }

    #[test]
    fn test_inverse_mapping_round_trip() {
        let v = skewed_cell();
        let xi = DVec2::new(0.37, 0.71);
        let p = map_to_real(&v, xi);
        let back = map_to_unit(&v, p, 1e-12).unwrap();
        assert!(back.distance(xi) < 1e-10);
        assert!(distance_to_unit_cell(back) == 0.0);
    }

    #[test]
    fn test_inverse_mapping_outside() {
        let v = skewed_cell();
        let back = map_to_unit(&v, DVec2::new(-0.5, 0.5), 1e-12).unwrap();
        assert!(distance_to_unit_cell(back) > 0.1);
    }

    #[test]
    fn test_distance_and_projection() {
        assert_eq!(distance_to_unit_cell(DVec2::new(0.5, 0.5)), 0.0);
        assert!((distance_to_unit_cell(DVec2::new(1.25, -0.5)) - 0.5).abs() < 1e-15);
        assert_eq!(project_to_unit_cell(DVec2::new(1.25, -0.5)), DVec2::new(1.0, 0.0));
    }

    #[test]
    fn test_signed_area() {
        let unit = [
            DVec2::new(0.0, 0.0),
            DVec2::new(1.0, 0.0),
            DVec2::new(0.0, 1.0),
            DVec2::new(1.0, 1.0),
        ];
        assert!((signed_area(&unit) - 1.0).abs() < 1e-15);
        assert!((jacobian(&unit, DVec2::splat(0.5)).determinant() - 1.0).abs() < 1e-15);
    }
}
