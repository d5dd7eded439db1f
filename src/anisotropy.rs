//! Anisotropy tensors and the external Kent statistics script protocol.
//!
//! Kent and Hext confidence ellipses for sets of anisotropy tensors are
//! computed by external scripts. This module covers the text protocol:
//! building the argument list, writing the tensor input file contents and
//! reading the script output back into [`KentParams`]. Running the process
//! and managing the temporary file are left to the caller.

use crate::error::{PalaeomagError, Result};
use crate::kent::{leading_numbers, KentParams};
use crate::math::vector::require_finite;
use crate::math::{Eigens, Vec3};
use nalgebra::Matrix3;

/// A symmetric second-rank anisotropy tensor.
#[derive(Debug, Clone, PartialEq)]
pub struct Tensor {
    matrix: Matrix3<f64>,
    eigens: Eigens,
}

impl Tensor {
    /// Tensor from its six independent components.
    ///
    /// # Errors
    ///
    /// Returns an error if any component is not finite.
    pub fn new(k11: f64, k22: f64, k33: f64, k12: f64, k23: f64, k13: f64) -> Result<Self> {
        for (value, name) in [
            (k11, "k11"),
            (k22, "k22"),
            (k33, "k33"),
            (k12, "k12"),
            (k23, "k23"),
            (k13, "k13"),
        ] {
            require_finite(value, name)?;
        }
        Ok(Self::from_matrix(Matrix3::new(
            k11, k12, k13, //
            k12, k22, k23, //
            k13, k23, k33,
        )))
    }

    fn from_matrix(matrix: Matrix3<f64>) -> Self {
        Self {
            eigens: Eigens::from_tensor(&matrix),
            matrix,
        }
    }

    /// Tensor rotated by a correction matrix `C`, giving `C·K·Cᵀ`.
    ///
    /// Chaining a sample correction and then a formation correction gives
    /// a tensor whose axes are the original axes corrected in the same way.
    #[must_use]
    pub fn corrected(&self, correction: &Matrix3<f64>) -> Self {
        Self::from_matrix(correction * self.matrix * correction.transpose())
    }

    /// Full symmetric matrix.
    #[must_use]
    pub const fn matrix(&self) -> &Matrix3<f64> {
        &self.matrix
    }

    /// Components in the order k11 k22 k33 k12 k23 k13.
    #[must_use]
    pub fn components(&self) -> [f64; 6] {
        let m = &self.matrix;
        [m[(0, 0)], m[(1, 1)], m[(2, 2)], m[(0, 1)], m[(1, 2)], m[(0, 2)]]
    }

    /// Principal axis `i` (0 = maximum, 2 = minimum). Signs are arbitrary.
    #[must_use]
    pub fn axis(&self, i: usize) -> Vec3 {
        self.eigens.vector(i)
    }

    /// Eigen decomposition of the tensor.
    #[must_use]
    pub const fn eigens(&self) -> &Eigens {
        &self.eigens
    }

    /// The six components with five decimals, separated by spaces.
    #[must_use]
    pub fn to_component_string(&self) -> String {
        self.components()
            .iter()
            .map(|k| format!("{k:.5}"))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Statistic computed by an external anisotropy script.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KentMethod {
    /// Non-parametric bootstrap.
    Bootstrap,
    /// Parametric bootstrap.
    ParametricBootstrap,
    /// Hext (1963) statistics; no τ uncertainty is reported.
    Hext,
}

impl KentMethod {
    /// Index of the first result line in the script output.
    #[must_use]
    pub const fn first_result_line(self) -> usize {
        match self {
            Self::Bootstrap | Self::ParametricBootstrap => 4,
            Self::Hext => 2,
        }
    }
}

/// Number of result lines, one per principal axis.
const RESULT_LINES: usize = 3;

/// Invocation details for an external Kent statistics script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KentScript {
    script_path: String,
    method: KentMethod,
}

impl KentScript {
    #[must_use]
    pub fn new(script_path: impl Into<String>, method: KentMethod) -> Self {
        Self {
            script_path: script_path.into(),
            method,
        }
    }

    #[must_use]
    pub const fn method(&self) -> KentMethod {
        self.method
    }

    /// Full command line: `script -f input [-par]`.
    #[must_use]
    pub fn arguments(&self, input_path: &str) -> Vec<String> {
        let mut args = vec![self.script_path.clone(), "-f".to_string(), input_path.to_string()];
        if self.method == KentMethod::ParametricBootstrap {
            args.push("-par".to_string());
        }
        args
    }

    /// Input file contents: one component line per tensor.
    #[must_use]
    pub fn input_contents(tensors: &[Tensor]) -> String {
        tensors
            .iter()
            .map(|t| t.to_component_string() + "\n")
            .collect()
    }

    /// Read the three principal-axis records from the script output.
    ///
    /// Bootstrap records have ten fields. Hext records have nine, lacking
    /// τσ, which is set to zero.
    ///
    /// # Errors
    ///
    /// Returns an error if the output is too short or a record does not
    /// start with enough numeric fields.
    pub fn parse_output(&self, output: &str) -> Result<Vec<KentParams>> {
        let first = self.method.first_result_line();
        let lines: Vec<&str> = output.lines().collect();
        if lines.len() < first + RESULT_LINES {
            return Err(PalaeomagError::parse(format!(
                "script output has {} lines, expected at least {}",
                lines.len(),
                first + RESULT_LINES
            )));
        }
        lines[first..first + RESULT_LINES]
            .iter()
            .map(|line| self.parse_record(line))
            .collect()
    }

    fn parse_record(&self, line: &str) -> Result<KentParams> {
        let mut fields = [0.0; 10];
        if self.method == KentMethod::Hext {
            let values = leading_numbers(line, 9)?;
            fields[0] = values[0];
            fields[2..].copy_from_slice(&values[1..]);
        } else {
            fields.copy_from_slice(&leading_numbers(line, 10)?);
        }
        Ok(KentParams::from_fields(fields))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn canned_output() -> String {
        "1 2 3 4 5 6 7 8 9 10\n".repeat(9)
    }

    #[test]
    fn test_components_and_string() {
        let t = Tensor::new(1.0, 2.0, 3.0, 4.0, 5.0, 6.0).unwrap();
        assert_eq!(t.components(), [1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        assert_eq!(t.to_component_string(), "1.00000 2.00000 3.00000 4.00000 5.00000 6.00000");
        assert_eq!(Tensor::new(-0.123_456, 0.0, 0.0, 0.0, 0.0, 0.0).unwrap().to_component_string(),
            "-0.12346 0.00000 0.00000 0.00000 0.00000 0.00000");
    }

    #[test]
    fn test_non_finite_components_rejected() {
        assert!(matches!(
            Tensor::new(f64::NAN, 1.0, 1.0, 0.0, 0.0, 0.0),
            Err(PalaeomagError::NonFinite { .. })
        ));
        assert!(Tensor::new(1.0, 1.0, 1.0, 0.0, f64::INFINITY, 0.0).is_err());
    }

    #[test]
    fn test_axes_match_eigens() {
        let t = Tensor::new(0.3, -0.2, 0.9, 0.1, -0.4, 0.25).unwrap();
        let direct = Eigens::from_tensor(t.matrix());
        for i in 0..3 {
            assert_relative_eq!(t.axis(i).dot(direct.vector(i)).abs(), 1.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_corrections_rotate_axes() {
        let t = Tensor::new(0.3, -0.2, 0.9, 0.1, -0.4, 0.25).unwrap();
        let (s_az, s_dip, f_az, f_dip) = (1.1, 0.4, 2.5, -0.3);
        let scm = Vec3::sample_correction_matrix(s_az, s_dip).unwrap();
        let fcm = Vec3::formation_correction_matrix(f_az, f_dip).unwrap();
        let corrected = t.corrected(&scm).corrected(&fcm);
        for i in 0..3 {
            let expected = t.axis(i).correct_sample(s_az, s_dip).unwrap().correct_form(f_az, f_dip).unwrap();
            assert_relative_eq!(corrected.axis(i).dot(expected).abs(), 1.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_arguments() {
        let boot = KentScript::new("/opt/bootams.py", KentMethod::Bootstrap);
        assert_eq!(boot.arguments("/tmp/in"), vec!["/opt/bootams.py", "-f", "/tmp/in"]);
        let par = KentScript::new("/opt/bootams.py", KentMethod::ParametricBootstrap);
        assert_eq!(par.arguments("/tmp/in"), vec!["/opt/bootams.py", "-f", "/tmp/in", "-par"]);
        let hext = KentScript::new("/opt/s_hext.py", KentMethod::Hext);
        assert_eq!(hext.arguments("/tmp/in").len(), 3);
    }

    #[test]
    fn test_input_contents() {
        let tensors = [
            Tensor::new(1.0, 2.0, 3.0, 4.0, 5.0, 6.0).unwrap(),
            Tensor::new(6.0, 5.0, 4.0, 3.0, 2.0, 1.0).unwrap(),
        ];
        assert_eq!(
            KentScript::input_contents(&tensors),
            "1.00000 2.00000 3.00000 4.00000 5.00000 6.00000\n\
             6.00000 5.00000 4.00000 3.00000 2.00000 1.00000\n"
        );
    }

    #[test]
    fn test_parse_bootstrap_output() {
        let script = KentScript::new("boot", KentMethod::Bootstrap);
        let records = script.parse_output(&canned_output()).unwrap();
        assert_eq!(records.len(), 3);
        assert_relative_eq!(records[0].tau(), 1.0);
        assert_relative_eq!(records[0].tau_sigma(), 2.0);
        assert_relative_eq!(records[2].zeta_dir().inc_deg(), 10.0, epsilon = 1e-10);
    }

    #[test]
    fn test_parse_hext_output() {
        let script = KentScript::new("hext", KentMethod::Hext);
        let records = script.parse_output(&canned_output()).unwrap();
        let r = &records[1];
        assert_relative_eq!(r.tau(), 1.0);
        assert_eq!(r.tau_sigma(), 0.0);
        assert_relative_eq!(r.mean().dec_deg(), 2.0, epsilon = 1e-10);
        assert_relative_eq!(r.mean().inc_deg(), 3.0, epsilon = 1e-10);
        assert_relative_eq!(r.zeta_dir().inc_deg(), 9.0, epsilon = 1e-10);
    }

    #[test]
    fn test_short_output_rejected() {
        let script = KentScript::new("boot", KentMethod::Bootstrap);
        assert!(matches!(
            script.parse_output("header\n1 2 3\n"),
            Err(PalaeomagError::Parse(_))
        ));
        let garbled = "x\n".repeat(4) + "1 2 3\n".repeat(3).as_str();
        assert!(script.parse_output(&garbled).is_err());
    }
}
