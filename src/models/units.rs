//! # 能量单位换算
//!
//! eV / nm / Hartree 之间的换算常数与函数。
//!
//! ## 依赖关系
//! - 被 `models/excited_state.rs`, `parsers/`, `spectrum/` 使用

/// 1 Hartree 对应的 eV
pub const HARTREE2EV: f64 = 27.211386;

/// λ(nm) = EV2NM / E(eV)
pub const EV2NM: f64 = 1239.84193;

/// eV -> nm
pub fn ev_to_nm(ev: f64) -> f64 {
    EV2NM / ev
}

/// nm -> eV
pub fn nm_to_ev(nm: f64) -> f64 {
    EV2NM / nm
}

/// Hartree -> eV
pub fn hartree_to_ev(hartree: f64) -> f64 {
    hartree * HARTREE2EV
}

/// nm -> 波数 (cm⁻¹)
pub fn nm_to_wavenumber(nm: f64) -> f64 {
    1e7 / nm
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_hartree_wavelength() {
        // 1 Eh ≈ 45.563 nm
        assert_relative_eq!(ev_to_nm(hartree_to_ev(1.0)), 45.56335, max_relative = 1e-5);
    }

    #[test]
    fn test_ev_nm_inverse() {
        let nm = ev_to_nm(4.0);
        assert_relative_eq!(nm, 309.96, epsilon = 0.01);
        assert_relative_eq!(nm_to_ev(nm), 4.0, epsilon = 1e-12);
    }
}
