//! Promo code registry.
//!
//! Codes are case-insensitive (stored upper-case) and map to a whole-percent
//! discount between 1 and 99. Entries live until overwritten.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::{Arc, RwLock};
use thiserror::Error;
use tracing::{debug, info};

#[derive(Debug, Error)]
pub enum PromoError {
    #[error("Promo code must not be empty")]
    EmptyCode,

    #[error("Discount must be between 1 and 99, got {0}")]
    InvalidDiscount(i64),

    #[error("Promo file error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Promo file is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
}

/// On-disk shape: `{"codes": {"SAVE10": 10}}`.
#[derive(Debug, Default, Serialize, Deserialize)]
struct PromoFile {
    #[serde(default)]
    codes: BTreeMap<String, u8>,
}

/// Shared registry. Clones see the same codes.
#[derive(Debug, Clone, Default)]
pub struct PromoRegistry {
    codes: Arc<RwLock<BTreeMap<String, u8>>>,
}

fn normalize(code: &str) -> String {
    code.trim().to_uppercase()
}

impl PromoRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the discount percentage for `code`, ignoring case.
    pub fn lookup(&self, code: &str) -> Option<u8> {
        let codes = self.codes.read().unwrap_or_else(|p| p.into_inner());
        codes.get(&normalize(code)).copied()
    }

    /// Registers or overwrites a code. Returns the normalized code.
    pub fn upsert(&self, code: &str, discount_percent: i64) -> Result<String, PromoError> {
        let code = normalize(code);
        if code.is_empty() {
            return Err(PromoError::EmptyCode);
        }
        let percent = u8::try_from(discount_percent)
            .ok()
            .filter(|p| (1..=99).contains(p))
            .ok_or(PromoError::InvalidDiscount(discount_percent))?;

        self.codes
            .write()
            .unwrap_or_else(|p| p.into_inner())
            .insert(code.clone(), percent);
        info!(%code, percent, "Promo code registered");
        Ok(code)
    }

    /// Loads codes from `path`. A missing file yields an empty registry;
    /// entries outside 1–99 are skipped.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, PromoError> {
        let path = path.as_ref();
        let registry = Self::new();
        let file: PromoFile = match std::fs::read_to_string(path) {
            Ok(text) => serde_json::from_str(&text)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "No promo file, starting empty");
                return Ok(registry);
            }
            Err(e) => return Err(e.into()),
        };
        for (code, percent) in file.codes {
            if let Err(e) = registry.upsert(&code, i64::from(percent)) {
                debug!(%code, error = %e, "Skipping promo entry");
            }
        }
        Ok(registry)
    }

    /// Writes every code to `path` as pretty JSON.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), PromoError> {
        let file = PromoFile {
            codes: self.codes.read().unwrap_or_else(|p| p.into_inner()).clone(),
        };
        std::fs::write(path, serde_json::to_string_pretty(&file)?)?;
        Ok(())
    }
}
