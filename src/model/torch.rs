use std::path::Path;
use tch::{kind::Kind, CModule, Device, Tensor};

use super::Regressor;
use crate::error::{ModelLoadError, PredictionError};

/// TorchScript regressor: `[1, in_dim] -> [1, 1]` (or `[1]`).
pub struct TorchModel {
    model: CModule,
    device: Device,
    in_dim: usize,
}

impl TorchModel {
    pub fn load(path: &Path, in_dim: usize) -> Result<Self, ModelLoadError> {
        let device = Device::Cpu;

        let model = CModule::load_on_device(path, device).map_err(|e| ModelLoadError::Corrupt {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        // Check output shape with a dummy forward: expect a single scalar per row
        let dummy = Tensor::zeros([1, in_dim as i64], (Kind::Float, device));
        let t = model
            .forward_ts(&[dummy])
            .map_err(|e| ModelLoadError::SchemaMismatch(format!("shape check forward failed: {}", e)))?;
        let sz = t.size();
        if sz.iter().product::<i64>() != 1 {
            return Err(ModelLoadError::SchemaMismatch(format!(
                "unexpected model output size: {:?}",
                sz
            )));
        }

        Ok(Self { model, device, in_dim })
    }
}

impl Regressor for TorchModel {
    fn in_dim(&self) -> usize {
        self.in_dim
    }

    fn forward(&self, x: &[f32]) -> Result<f64, PredictionError> {
        if x.len() != self.in_dim {
            return Err(PredictionError::ShapeMismatch {
                expected: self.in_dim,
                got: x.len(),
            });
        }

        let input = Tensor::from_slice(x)
            .reshape([1, self.in_dim as i64])
            .to_device(self.device);

        let t = self
            .model
            .forward_ts(&[input])
            .map_err(|e| PredictionError::Inference(e.to_string()))?;

        Ok(t.flatten(0, -1).double_value(&[0]))
    }
}
