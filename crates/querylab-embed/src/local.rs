use anyhow::{Result, anyhow};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Instant;

use candle_core::{Device, Tensor, DType};
use candle_nn::VarBuilder;
use candle_transformers::models::bert::{BertModel, Config as BertConfig};
use tokenizers::Tokenizer;
use tracing::{debug, info};

use querylab_core::config::expand_path;
use querylab_core::error::Error;
use querylab_core::traits::Embedder;

use crate::device::select_device;
use crate::pool::masked_mean_l2;
use crate::tokenize::tokenize_on_device;

/// Sentence-Transformers style BERT encoder (e.g. all-MiniLM-L6-v2) running
/// locally through candle: mean pooling over tokens, then L2 normalization.
pub struct LocalEmbedder {
    model: BertModel,
    tokenizer: Tokenizer,
    device: Device,
    dim: usize,
    max_len: usize,
    label: String,
}

impl LocalEmbedder {
    pub fn load(model_dir: &Path, model_id: &str, max_len: usize) -> Result<Self> {
        let device = select_device();
        info!("Loading {} from {}", model_id, model_dir.display());
        let tokenizer_path = model_dir.join("tokenizer.json");
        let tokenizer = Tokenizer::from_file(&tokenizer_path)
            .map_err(|e| anyhow!("Failed to load tokenizer from {}: {}", tokenizer_path.display(), e))?;
        let config_path = model_dir.join("config.json");
        let config: BertConfig = serde_json::from_str(&std::fs::read_to_string(&config_path)?)?;
        let weights = load_weights(model_dir, &device)?;
        let vb = VarBuilder::from_tensors(weights, DType::F32, &device);
        let model = BertModel::load(vb, &config)?;
        let dim = config.hidden_size;
        info!("{} loaded (dim {})", model_id, dim);
        Ok(Self { model, tokenizer, device, dim, max_len, label: format!("Sentence-Transformers {model_id}") })
    }

    pub fn embed_text(&self, text: &str) -> Result<Vec<f32>> {
        let start = Instant::now();
        let enc = tokenize_on_device(&self.tokenizer, text, self.max_len, &self.device)?;
        let hidden = self.model.forward(&enc.input_ids, &enc.token_type_ids, Some(&enc.attention_mask))?;
        let pooled = masked_mean_l2(&hidden, &enc.attention_mask)?;
        let emb = pooled.to_device(&Device::Cpu)?.squeeze(0)?.to_vec1::<f32>()?;
        if emb.len() != self.dim { return Err(anyhow!("expected {} dims, model produced {}", self.dim, emb.len())); }
        debug!("Embedded {} chars in {:?}", text.len(), start.elapsed());
        Ok(emb)
    }
}

impl Embedder for LocalEmbedder {
    fn label(&self) -> &str { &self.label }
    fn dim(&self) -> usize { self.dim }
    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        texts.iter().map(|t| self.embed_text(t)).collect()
    }
}

/// Prefer `model.safetensors`, fall back to `pytorch_model.bin`.
fn load_weights(model_dir: &Path, device: &Device) -> Result<HashMap<String, Tensor>> {
    let safetensors = model_dir.join("model.safetensors");
    if safetensors.exists() {
        return Ok(candle_core::safetensors::load(&safetensors, device)?);
    }
    let pickle = model_dir.join("pytorch_model.bin");
    let weights = candle_core::pickle::read_all(&pickle)?;
    Ok(weights.into_iter().collect())
}

/// Locate the model files: configured dir, then `models/<id>` and `../models/<id>`.
pub fn resolve_model_dir(configured: Option<&str>, model_id: &str) -> Result<PathBuf> {
    if let Some(dir) = configured {
        let p = expand_path(dir);
        if p.exists() { return Ok(p); }
        return Err(Error::NotFound(format!("configured model dir {}", p.display())).into());
    }
    for candidate in [Path::new("models").join(model_id), Path::new("../models").join(model_id)] {
        if candidate.exists() { debug!("Using model dir {}", candidate.display()); return Ok(candidate); }
    }
    Err(Error::NotFound(format!("model directory for {model_id} (set embedding.model_dir)")).into())
}
