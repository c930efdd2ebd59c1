use anyhow::{Result, anyhow};
use candle_core::{Device, Tensor};
use tokenizers::Tokenizer;

/// Encoded single-sequence model inputs, each shaped `[1, T]`.
pub struct EncodedInput {
    pub input_ids: Tensor,
    pub attention_mask: Tensor,
    pub token_type_ids: Tensor,
}

/// Encode `text` without padding, truncating to `max_len` tokens.
pub fn tokenize_on_device(tokenizer: &Tokenizer, text: &str, max_len: usize, device: &Device) -> Result<EncodedInput> {
    let enc = tokenizer.encode(text, true).map_err(|e| anyhow!("Tokenization failed: {}", e))?;
    let mut ids = enc.get_ids().to_vec();
    let mut mask = enc.get_attention_mask().to_vec();
    if ids.len() > max_len { ids.truncate(max_len); mask.truncate(max_len); }
    let len = ids.len();
    let input_ids = Tensor::from_vec(ids, (1, len), device)?;
    let attention_mask = Tensor::from_vec(mask, (1, len), device)?;
    let token_type_ids = input_ids.zeros_like()?;
    Ok(EncodedInput { input_ids, attention_mask, token_type_ids })
}
