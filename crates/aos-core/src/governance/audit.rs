//! Append-only launch decision log.
//!
//! The file backend writes one JSON object per line. Each line carries the
//! SHA-256 of its record body and is verified when read back.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::debug;

use super::engine::{DecisionOption, LaunchDecision};
use crate::domain::{AosError, Result};

/// One logged decision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecisionRecord {
    pub key: String,
    pub options: Vec<DecisionOption>,
    pub chosen: DecisionOption,
    pub rationale: String,
    pub recorded_at: DateTime<Utc>,
    pub decision: LaunchDecision,
}

impl DecisionRecord {
    pub fn new(key: &str, decision: &LaunchDecision) -> Self {
        Self {
            key: key.to_string(),
            options: DecisionOption::ALL.to_vec(),
            chosen: decision.rule.chosen_option(),
            rationale: decision.summary.clone(),
            recorded_at: Utc::now(),
            decision: decision.clone(),
        }
    }
}

/// Where decisions are appended. Records are never rewritten.
#[async_trait]
pub trait DecisionLog: Send + Sync {
    async fn log_decision(&self, record: DecisionRecord) -> Result<()>;

    /// Records under `key`, oldest first.
    async fn records(&self, key: &str) -> Result<Vec<DecisionRecord>>;
}

/// Process-local log.
#[derive(Debug, Default)]
pub struct MemoryDecisionLog {
    records: Mutex<Vec<DecisionRecord>>,
}

impl MemoryDecisionLog {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DecisionLog for MemoryDecisionLog {
    async fn log_decision(&self, record: DecisionRecord) -> Result<()> {
        self.records.lock().await.push(record);
        Ok(())
    }

    async fn records(&self, key: &str) -> Result<Vec<DecisionRecord>> {
        Ok(self
            .records
            .lock()
            .await
            .iter()
            .filter(|r| r.key == key)
            .cloned()
            .collect())
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct SealedLine {
    digest: String,
    record: Value,
}

fn sha256_hex(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

/// JSON-lines file log with per-record digests.
#[derive(Debug)]
pub struct JsonlDecisionLog {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonlDecisionLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn seal(record: &DecisionRecord) -> Result<String> {
        let body = serde_json::to_value(record)?;
        let digest = sha256_hex(serde_json::to_string(&body)?.as_bytes());
        let mut line = serde_json::to_string(&SealedLine {
            digest,
            record: body,
        })?;
        line.push('\n');
        Ok(line)
    }

    fn unseal(line_no: usize, line: &str) -> Result<DecisionRecord> {
        let sealed: SealedLine = serde_json::from_str(line)
            .map_err(|e| AosError::AuditLog(format!("line {line_no}: {e}")))?;
        let actual = sha256_hex(serde_json::to_string(&sealed.record)?.as_bytes());
        if actual != sealed.digest {
            return Err(AosError::DigestMismatch {
                expected: sealed.digest,
                actual,
            });
        }
        Ok(serde_json::from_value(sealed.record)?)
    }
}

#[async_trait]
impl DecisionLog for JsonlDecisionLog {
    async fn log_decision(&self, record: DecisionRecord) -> Result<()> {
        let line = Self::seal(&record)?;
        let _guard = self.write_lock.lock().await;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        file.write_all(line.as_bytes()).await?;
        file.flush().await?;

        debug!(event = "audit.appended", key = %record.key, chosen = ?record.chosen);
        Ok(())
    }

    async fn records(&self, key: &str) -> Result<Vec<DecisionRecord>> {
        let raw = match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut out = Vec::new();
        for (i, line) in raw.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let record = Self::unseal(i + 1, line)?;
            if record.key == key {
                out.push(record);
            }
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::governance::engine::{aggregate, GovernanceThresholds};

    fn decision(kill_switch: bool) -> LaunchDecision {
        aggregate(kill_switch, Vec::new(), &GovernanceThresholds::default(), "CEO")
    }

    #[tokio::test]
    async fn test_memory_log_filters_by_key() {
        let log = MemoryDecisionLog::new();
        log.log_decision(DecisionRecord::new("a", &decision(true)))
            .await
            .unwrap();
        log.log_decision(DecisionRecord::new("b", &decision(false)))
            .await
            .unwrap();

        let records = log.records("a").await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].chosen, DecisionOption::Block);
        assert_eq!(records[0].options, DecisionOption::ALL.to_vec());
    }

    #[tokio::test]
    async fn test_missing_file_reads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let log = JsonlDecisionLog::new(dir.path().join("none.jsonl"));
        assert!(log.records("launch").await.unwrap().is_empty());
    }

    #[test]
    fn test_seal_unseal() {
        let record = DecisionRecord::new("launch", &decision(true));
        let line = JsonlDecisionLog::seal(&record).unwrap();
        assert!(line.ends_with('\n'));
        let back = JsonlDecisionLog::unseal(1, line.trim_end()).unwrap();
        assert_eq!(back, record);
    }

    #[test]
    fn test_garbage_line_is_audit_error() {
        let err = JsonlDecisionLog::unseal(3, "not json").unwrap_err();
        assert!(matches!(err, AosError::AuditLog(msg) if msg.starts_with("line 3")));
    }
}
