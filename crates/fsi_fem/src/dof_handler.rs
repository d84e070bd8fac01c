// crates/fsi_fem/src/dof_handler.rs

//! 自由度编号
//!
//! 节点型 Q1 元的每个网格节点上有 `n_components` 个自由度，
//! 编号为 `node * n_components + component`。流体场使用 3 个分量
//! (u, v, p)，固体场使用 2 个分量 (u_x, u_y)。

use crate::error::{check_len, FemResult};
use fsi_mesh::{QuadMesh, VERTICES_PER_CELL};
use glam::DVec2;
use serde::{Deserialize, Serialize};

/// 自由度编号器
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DofHandler {
    n_nodes: usize,
    n_components: usize,
}

impl DofHandler {
    /// 为网格分配 `n_components` 分量的节点自由度
    pub fn new(mesh: &QuadMesh, n_components: usize) -> Self {
        debug_assert!(n_components > 0, "分量数必须为正");
        Self {
            n_nodes: mesh.n_nodes(),
            n_components,
        }
    }

    #[inline]
    pub fn n_nodes(&self) -> usize {
        self.n_nodes
    }

    #[inline]
    pub fn n_components(&self) -> usize {
        self.n_components
    }

    #[inline]
    pub fn n_dofs(&self) -> usize {
        self.n_nodes * self.n_components
    }

    /// 节点 `node` 上第 `component` 个分量的自由度编号
    #[inline]
    pub fn dof_index(&self, node: usize, component: usize) -> usize {
        debug_assert!(component < self.n_components);
        node * self.n_components + component
    }

    /// 单元所有自由度（节点主序）
    pub fn cell_dofs(&self, mesh: &QuadMesh, cell: usize) -> Vec<usize> {
        let nodes = mesh.cell_nodes(cell);
        let mut dofs = Vec::with_capacity(VERTICES_PER_CELL * self.n_components);
        for node in nodes {
            for c in 0..self.n_components {
                dofs.push(self.dof_index(node, c));
            }
        }
        dofs
    }

    /// 校验系数向量与网格是否匹配
    pub fn check_compatible(&self, mesh: &QuadMesh, coefficients: &[f64]) -> FemResult<()> {
        check_len("dof handler nodes", mesh.n_nodes(), self.n_nodes)?;
        check_len("coefficient vector", self.n_dofs(), coefficients.len())
    }

    /// 取每个节点上从 `first_component` 开始的两个分量组成的向量
    ///
    /// 对位移场而言即每个顶点的位移。
    pub fn nodal_vectors(&self, coefficients: &[f64], first_component: usize) -> FemResult<Vec<DVec2>> {
        check_len("coefficient vector", self.n_dofs(), coefficients.len())?;
        check_len(
            "vector components",
            self.n_components.max(first_component + 2),
            self.n_components,
        )?;
        Ok((0..self.n_nodes)
            .map(|n| {
                DVec2::new(
                    coefficients[self.dof_index(n, first_component)],
                    coefficients[self.dof_index(n, first_component + 1)],
                )
            })
            .collect())
    }

    /// 节点插值：在每个节点上求值 `f` 并写入系数向量
    pub fn interpolate<F>(&self, mesh: &QuadMesh, coefficients: &mut [f64], mut f: F) -> FemResult<()>
    where
        F: FnMut(DVec2, &mut [f64]),
    {
        self.check_compatible(mesh, coefficients)?;
        for (node, chunk) in coefficients.chunks_exact_mut(self.n_components).enumerate() {
            f(mesh.node(node), chunk);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fsi_mesh::RectMeshGenerator;

    #[test]
    fn test_numbering() {
        let mesh = RectMeshGenerator::square(2, 1.0).build().unwrap();
        let dofs = DofHandler::new(&mesh, 3);
        assert_eq!(dofs.n_dofs(), 27);
        assert_eq!(dofs.dof_index(4, 2), 14);
        assert_eq!(dofs.cell_dofs(&mesh, 0).len(), 12);
    }

    #[test]
    fn test_interpolate_and_nodal_vectors() {
        let mesh = RectMeshGenerator::square(2, 1.0).build().unwrap();
        let dofs = DofHandler::new(&mesh, 2);
        let mut u = vec![0.0; dofs.n_dofs()];
        dofs.interpolate(&mesh, &mut u, |p, out| {
            out[0] = 2.0 * p.x;
            out[1] = -p.y;
        })
        .unwrap();

        let vectors = dofs.nodal_vectors(&u, 0).unwrap();
        for (n, v) in vectors.iter().enumerate() {
            let p = mesh.node(n);
            assert!(v.distance(DVec2::new(2.0 * p.x, -p.y)) < 1e-15);
        }
    }

    #[test]
    fn test_mismatch() {
        let mesh = RectMeshGenerator::square(1, 1.0).build().unwrap();
        let dofs = DofHandler::new(&mesh, 2);
        assert!(dofs.check_compatible(&mesh, &[0.0; 3]).is_err());
        assert!(dofs.nodal_vectors(&[0.0; 8], 1).is_err());
        let scalar = DofHandler::new(&mesh, 1);
        assert!(scalar.nodal_vectors(&[0.0; 4], 0).is_err());
    }
}
