use crate::BoundingBox;
use anyhow::{anyhow, Result};
use nalgebra::Matrix4;
use ndarray::*;

/**
A simple Kalman filter for tracking bounding boxes in image space.

The 7-dimensional state space:
    u, v, s, r, vu, vv, vs
contains the bounding box center position (u, v), area s, aspect ratio r and the velocities of the center and area.

Object motion follows a constant velocity model with a constant aspect ratio. The bounding box location (u, v, s, r) is taken as direct observation of the state space (linear observation model).
*/
#[derive(Debug, Clone)]
pub struct KalmanFilter {
    motion_mat: Array2<f32>,
    update_mat: Array2<f32>,
    initial_cov: Array2<f32>,
    process_cov: Array2<f32>,
    measurement_cov: Array2<f32>,
}

impl Default for KalmanFilter {
    fn default() -> Self {
        Self::new()
    }
}

impl KalmanFilter {
    /// Returns a new KalmanFilter
    pub fn new() -> KalmanFilter {
        let ndim = 4;
        let nvel = 3;

        // Create Kalman filter model matrices and set initial values
        let mut motion_mat = Array2::from_diag(&Array1::<f32>::ones(ndim + nvel));
        for i in 0..nvel {
            motion_mat[[i, ndim + i]] = 1.0;
        }

        let update_mat = concatenate!(
            Axis(1),
            Array2::from_diag(&Array1::<f32>::ones(ndim)),
            Array2::zeros((ndim, nvel))
        );

        // Unobserved velocities start with a very high uncertainty, the area and
        // aspect ratio measurements are noisier than the center.
        let initial_cov =
            Array2::from_diag(&arr1::<f32>(&[10.0, 10.0, 10.0, 10.0, 1e4, 1e4, 1e4]));
        let process_cov =
            Array2::from_diag(&arr1::<f32>(&[1.0, 1.0, 1.0, 1.0, 1e-2, 1e-2, 1e-4]));
        let measurement_cov = Array2::from_diag(&arr1::<f32>(&[1.0, 1.0, 10.0, 10.0]));

        KalmanFilter {
            motion_mat,
            update_mat,
            initial_cov,
            process_cov,
            measurement_cov,
        }
    }

    /// Create track from unassociated measurement.
    ///
    /// # Arguments
    ///
    /// - `bbox`: Bounding box object of the new measurement.
    ///
    /// # Returns
    ///
    /// A tuple with the following two entries of the new track:
    /// - The mean vector (7 dimensional).
    /// - The covariance matrix (7x7 dimensional).
    ///
    /// Unobserved velocities are initialized to 0 mean.
    pub fn initiate(&self, bbox: &BoundingBox) -> (Array1<f32>, Array2<f32>) {
        let mean_pos = bbox.to_z();
        let mean_vel = Array1::<f32>::zeros(3);
        let mean = concatenate![Axis(0), mean_pos, mean_vel];

        (mean, self.initial_cov.clone())
    }

    /// Run Kalman filter prediction step.
    ///
    /// If the predicted area would become non-positive the area velocity is zeroed first.
    ///
    /// # Arguments
    ///
    /// - `mean`: The 7 dimensional mean vector of the object state at the previous time step.
    /// - `covariance`: The 7x7 dimensional covariance matrix of the object state at the previous time step.
    ///
    /// # Returns
    ///
    /// A tuple with the following two entries of the predicted state:
    /// - The mean vector (7 dimensional).
    /// - The covariance matrix (7x7 dimensional).
    pub fn predict(
        &self,
        mean: &Array1<f32>,
        covariance: &Array2<f32>,
    ) -> (Array1<f32>, Array2<f32>) {
        let mut mean = mean.to_owned();
        if mean[6] + mean[2] <= 0.0 {
            mean[6] = 0.0;
        }

        let mean = self.motion_mat.dot(&mean);
        let covariance =
            self.motion_mat.dot(covariance).dot(&self.motion_mat.t()) + &self.process_cov;

        (mean, covariance)
    }

    /// Project state distribution to measurement space.
    ///
    /// # Arguments
    ///
    /// - `mean`: The state's mean vector (7 dimensional array).
    /// - `covariance`: The state's covariance matrix (7x7 dimensional).
    ///
    /// # Returns
    ///
    /// A tuple with the following two entries of the given state estimate:
    /// - The mean vector (4 dimensional).
    /// - The covariance matrix (4x4 dimensional).
    pub fn project(
        &self,
        mean: &Array1<f32>,
        covariance: &Array2<f32>,
    ) -> (Array1<f32>, Array2<f32>) {
        let mean = self.update_mat.dot(mean);
        let covariance =
            self.update_mat.dot(covariance).dot(&self.update_mat.t()) + &self.measurement_cov;

        (mean, covariance)
    }

    /// Run Kalman filter correction step.
    ///
    /// # Arguments
    ///
    /// - `mean`: The state's mean vector (7 dimensional array).
    /// - `covariance`: The state's covariance matrix (7x7 dimensional).
    /// - `measurement`: The 4 dimensional measurement vector (u, v, s, r), where (u, v) is the center position, s the area, and r the aspect ratio of the bounding box.
    ///
    /// # Returns
    ///
    /// A tuple with the following two entries of the measurement-corrected state distribution:
    /// - The mean vector (7 dimensional).
    /// - The covariance matrix (7x7 dimensional).
    pub fn update(
        &self,
        mean: &Array1<f32>,
        covariance: &Array2<f32>,
        measurement: &Array1<f32>,
    ) -> Result<(Array1<f32>, Array2<f32>)> {
        let (projected_mean, projected_cov) = self.project(mean, covariance);
        if projected_cov.iter().any(|v| !v.is_finite()) {
            return Err(anyhow!("innovation covariance is not finite"));
        }

        let innovation_cov = Matrix4::<f32>::from_fn(|i, j| projected_cov[[i, j]]);
        let innovation_cov_inv = innovation_cov
            .cholesky()
            .ok_or_else(|| anyhow!("innovation covariance is not positive definite"))?
            .inverse();
        let innovation_cov_inv = Array2::from_shape_fn((4, 4), |(i, j)| innovation_cov_inv[(i, j)]);

        let kalman_gain = covariance
            .dot(&self.update_mat.t())
            .dot(&innovation_cov_inv);

        let innovation = measurement - &projected_mean;

        let new_mean = mean + &kalman_gain.dot(&innovation);
        let new_covariance = covariance - &kalman_gain.dot(&projected_cov).dot(&kalman_gain.t());

        Ok((new_mean, new_covariance))
    }
}
