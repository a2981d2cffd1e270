//! Market statistics for display.
//!
//! The stats endpoint is an opaque JSON source. Anything that goes wrong
//! fetching or parsing it collapses into [`StatsView::Unavailable`] and
//! never reaches the animation core.

use std::collections::BTreeMap;

use log::warn;
use serde::{Deserialize, Serialize};

use crate::error::Result;

pub const UNAVAILABLE: &str = "Market data unavailable";

/// Frames a counter takes to reach its value.
pub const COUNTER_STEPS: u32 = 60;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketStat {
    pub value: f64,
    pub unit: String,
    pub year: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub citation: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatsResponse {
    pub data: BTreeMap<String, MarketStat>,
    pub timestamp: String,
    pub count: usize,
}

impl StatsResponse {
    pub fn parse(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }
}

/// One display line.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatLine {
    pub key: String,
    pub label: String,
    pub text: String,
    pub year: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", content = "body", rename_all = "lowercase")]
pub enum StatsView {
    Ready(Vec<StatLine>),
    Unavailable(String),
}

impl StatsView {
    pub fn from_result(result: Result<StatsResponse>) -> Self {
        match result {
            Ok(resp) => Self::from_response(&resp),
            Err(e) => {
                warn!("stats unavailable: {e}");
                Self::Unavailable(UNAVAILABLE.to_string())
            }
        }
    }

    pub fn from_json(text: &str) -> Self {
        Self::from_result(StatsResponse::parse(text))
    }

    pub fn from_response(resp: &StatsResponse) -> Self {
        let lines = resp
            .data
            .iter()
            .map(|(key, stat)| StatLine {
                key: key.clone(),
                label: stat.label.clone().unwrap_or_else(|| key.clone()),
                text: format_value(stat.value, "", &format!(" {}", stat.unit)),
                year: stat.year,
                source: stat.source.clone(),
            })
            .collect();
        Self::Ready(lines)
    }

    pub fn is_available(&self) -> bool {
        matches!(self, Self::Ready(_))
    }
}

/// Two decimals below 10, one otherwise.
pub fn format_value(value: f64, prefix: &str, suffix: &str) -> String {
    if value < 10.0 {
        format!("{prefix}{value:.2}{suffix}")
    } else {
        format!("{prefix}{value:.1}{suffix}")
    }
}

/// Count-up animation from 0 to a target in [`COUNTER_STEPS`] equal steps.
#[derive(Debug, Clone, PartialEq)]
pub struct Counter {
    target: f64,
    duration: f32,
    delay: f32,
    clock: f32,
    step: u32,
    prefix: String,
    suffix: String,
}

impl Counter {
    /// Count to `target` over `duration` seconds.
    pub fn new(target: f64, duration: f32) -> Self {
        Self {
            target,
            duration: duration.max(0.0),
            delay: 0.0,
            clock: 0.0,
            step: 0,
            prefix: String::new(),
            suffix: String::new(),
        }
    }

    pub fn with_delay(mut self, delay: f32) -> Self {
        self.delay = delay.max(0.0);
        self
    }

    pub fn with_affixes(mut self, prefix: &str, suffix: &str) -> Self {
        self.prefix = prefix.to_string();
        self.suffix = suffix.to_string();
        self
    }

    pub fn advance(&mut self, dt: f32) {
        if self.is_done() {
            return;
        }
        self.clock += dt.max(0.0);
        let running = self.clock - self.delay;
        if running < 0.0 {
            return;
        }
        self.step = if self.duration <= 0.0 {
            COUNTER_STEPS
        } else {
            ((running * COUNTER_STEPS as f32 / self.duration) as u32).min(COUNTER_STEPS)
        };
    }

    pub fn value(&self) -> f64 {
        if self.is_done() {
            self.target
        } else {
            self.target / COUNTER_STEPS as f64 * self.step as f64
        }
    }

    pub fn is_done(&self) -> bool {
        self.step >= COUNTER_STEPS
    }

    pub fn text(&self) -> String {
        format_value(self.value(), &self.prefix, &self.suffix)
    }
}
