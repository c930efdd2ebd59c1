use anyhow::{Result, ensure};
use candle_core::{DType, Tensor};

/// Mean of the unmasked token states followed by L2 normalization.
///
/// `hidden` is `[B, T, H]`, `attention_mask` is `[B, T]` (1 = token, 0 = pad).
/// Returns `[B, H]`.
pub fn masked_mean_l2(hidden: &Tensor, attention_mask: &Tensor) -> Result<Tensor> {
    let dims = hidden.dims();
    ensure!(dims.len() == 3, "hidden shape must be [B,T,H], got {:?}", dims);
    let (batch, hidden_dim) = (dims[0], dims[2]);

    let mask = attention_mask.to_device(hidden.device())?.to_dtype(hidden.dtype())?;
    let mask_broadcast = mask.unsqueeze(2)?.broadcast_as(hidden.shape())?;
    let summed = (hidden * &mask_broadcast)?.sum(1)?;
    let lengths = mask.sum_keepdim(1)?;
    let mean = summed.broadcast_div(&lengths)?;

    let eps_val = match hidden.dtype() { DType::F16 => 1e-6f64, _ => 1e-12f64 };
    let norm = (mean.sqr()?.sum_keepdim(1)?.sqrt()? + eps_val)?;
    let normalized = mean.broadcast_div(&norm)?;
    ensure!(normalized.dims() == [batch, hidden_dim], "pooled shape mismatch: {:?}", normalized.dims());
    Ok(normalized)
}
