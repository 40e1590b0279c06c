//! Human-readable receipt numbers: `{prefix}{YYYYMMDD}{10000 + seq}`, e.g. `LND2026031410001`.

use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicU32, Ordering};

#[derive(Debug)]
pub struct ReceiptBook {
    prefix: String,
    seq: AtomicU32,
}

impl ReceiptBook {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            seq: AtomicU32::new(1),
        }
    }

    pub fn next(&self, at: DateTime<Utc>) -> String {
        let seq = self.seq.fetch_add(1, Ordering::SeqCst);
        format!("{}{}{}", self.prefix, at.format("%Y%m%d"), 10000 + seq)
    }
}
