use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

// ============================================================================
// Top-level config
// ============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct KaiConfig {
    pub emotion: EmotionConfig,
    pub memory: MemoryConfig,
    pub personality: PersonalityConfig,
    pub boundary: BoundaryConfig,
    pub social: SocialConfig,
    pub context: ContextConfig,
    pub initiator: InitiatorConfig,
    pub responder: ResponderConfig,
    pub storage: StorageConfig,
    pub gateway: GatewayConfig,
    /// Seed for the session's random source. `None` draws from OS entropy.
    pub rng_seed: Option<u64>,
}

impl KaiConfig {
    /// Load config from a TOML file, falling back to defaults for missing fields.
    /// After loading, env var overrides are applied.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;
        let mut config: KaiConfig =
            toml::from_str(&content).with_context(|| "Failed to parse TOML config")?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Try to load from path; if the file is missing or invalid, return defaults with env overrides.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Self {
        match Self::load(path) {
            Ok(cfg) => cfg,
            Err(e) => {
                tracing::info!("Config file not found or invalid ({:#}), using defaults", e);
                let mut cfg = Self::default();
                cfg.apply_env_overrides();
                cfg
            }
        }
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(v) = std::env::var("KAI_DATA_DIR") {
            self.storage.data_dir = PathBuf::from(v);
        }
        if let Ok(v) = std::env::var("KAI_USE_LLM") {
            match v.to_ascii_lowercase().as_str() {
                "ollama" | "1" | "true" => self.responder.backend = ResponderBackend::Ollama,
                "template" | "0" | "false" => self.responder.backend = ResponderBackend::Template,
                other => tracing::warn!("Ignoring unknown KAI_USE_LLM value: {}", other),
            }
        }
        if let Ok(v) = std::env::var("KAI_OLLAMA_MODEL") {
            self.responder.model = v;
        }
        if let Ok(v) = std::env::var("OLLAMA_BASE_URL") {
            self.responder.base_url = v;
        }
        if let Ok(v) = std::env::var("KAI_INITIATE_INTERVAL") {
            if let Ok(n) = v.parse() {
                self.initiator.interval_secs = n;
            }
        }
        if let Ok(v) = std::env::var("KAI_INITIATE_MIN_SECONDS") {
            if let Ok(n) = v.parse() {
                self.initiator.min_seconds_since_user = n;
            }
        }
        if let Ok(v) = std::env::var("KAI_SEED") {
            if let Ok(n) = v.parse() {
                self.rng_seed = Some(n);
            }
        }
        if let Ok(v) = std::env::var("KAI_GATEWAY_PORT") {
            if let Ok(n) = v.parse() {
                self.gateway.port = n;
            }
        }
    }
}

// ============================================================================
// Sub-configs
// ============================================================================

/// Per-field floors and ceilings enforced by the regulation pass,
/// plus the hard caps applied on every clamp.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EmotionConfig {
    pub hope_floor: f32,
    pub joy_floor: f32,
    pub dopamine_floor: f32,
    pub serotonin_floor: f32,
    pub testosterone_floor: f32,
    pub cortisol_ceiling: f32,
    pub amygdala_ceiling: f32,
    pub loneliness_ceiling: f32,
    pub oxytocin_cap: f32,
    pub attachment_cap: f32,
    /// Multiplicative oxytocin decay applied every turn.
    pub attachment_decay: f32,
    /// Rate used by the daily `tick()`.
    pub daily_decay_rate: f32,
    /// Half-width of the uniform per-turn noise.
    pub micro_drift: f32,
}

impl Default for EmotionConfig {
    fn default() -> Self {
        Self {
            hope_floor: 0.25,
            joy_floor: 0.15,
            dopamine_floor: 0.2,
            serotonin_floor: 0.25,
            testosterone_floor: 0.2,
            cortisol_ceiling: 0.85,
            amygdala_ceiling: 0.8,
            loneliness_ceiling: 0.85,
            oxytocin_cap: 0.8,
            attachment_cap: 0.4,
            attachment_decay: 0.995,
            daily_decay_rate: 0.01,
            micro_drift: 0.01,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MemoryConfig {
    pub forget_threshold: f32,
    pub short_term_threshold: f32,
    pub long_term_threshold: f32,
    pub identity_threshold: f32,
    pub trauma_threshold: f32,
    pub short_term_capacity: usize,
    pub long_term_cap: usize,
    pub conscious_cap: usize,
    pub consolidation_decay: f32,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            forget_threshold: 0.2,
            short_term_threshold: 0.4,
            long_term_threshold: 0.6,
            identity_threshold: 0.8,
            trauma_threshold: 0.8,
            short_term_capacity: 7,
            long_term_cap: 1000,
            conscious_cap: 100,
            consolidation_decay: 0.01,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PersonalityConfig {
    pub learning_rate: f32,
    pub stability: f32,
    pub responsibility_threshold: f32,
    pub stress_threshold: f32,
    pub low_confidence: f32,
    pub happiness_threshold: f32,
    pub energy_threshold: f32,
}

impl Default for PersonalityConfig {
    fn default() -> Self {
        Self {
            learning_rate: 0.1,
            stability: 0.9,
            responsibility_threshold: 0.6,
            stress_threshold: 0.7,
            low_confidence: 0.4,
            happiness_threshold: 0.6,
            energy_threshold: 0.5,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BoundaryConfig {
    pub abuse_threshold: u32,
    pub disengage_after: u32,
    pub disengage_for: u32,
    pub repeat_toxic: usize,
    pub recovery_reset_after: u32,
}

impl Default for BoundaryConfig {
    fn default() -> Self {
        Self {
            abuse_threshold: 3,
            disengage_after: 5,
            disengage_for: 3,
            repeat_toxic: 5,
            recovery_reset_after: 5,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SocialConfig {
    /// Attachment lost per day without contact.
    pub decay_per_day: f32,
    pub floor: f32,
    /// Weight of the previous loneliness value when blending in the ledger's factor.
    pub loneliness_smoothing: f32,
}

impl Default for SocialConfig {
    fn default() -> Self {
        Self {
            decay_per_day: 0.01,
            floor: 0.2,
            loneliness_smoothing: 0.7,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ContextConfig {
    pub max_history: usize,
    pub max_life_events: usize,
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            max_history: 30,
            max_life_events: 50,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct InitiatorConfig {
    pub enabled: bool,
    pub interval_secs: u64,
    pub min_seconds_since_user: u64,
    pub max_pending: usize,
}

impl Default for InitiatorConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_secs: 90,
            min_seconds_since_user: 120,
            max_pending: 5,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponderBackend {
    /// Canned replies picked from mode/emotion pools
    #[default]
    Template,
    /// Local model served by Ollama
    Ollama,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ResponderConfig {
    pub backend: ResponderBackend,
    pub model: String,
    pub base_url: String,
    pub temperature: f32,
    pub timeout_secs: u64,
}

impl Default for ResponderConfig {
    fn default() -> Self {
        Self {
            backend: ResponderBackend::Template,
            model: "llama3.2".to_string(),
            base_url: "http://localhost:11434".to_string(),
            temperature: 0.7,
            timeout_secs: 60,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub data_dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    pub host: String,
    pub port: u16,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8000,
        }
    }
}
