use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 未指定或數值不合法時的轉場秒數
pub const DEFAULT_TRANSITION_SECONDS: f64 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Transition {
    #[default]
    None,
    Fade,
    Crossfade,
}

impl Transition {
    pub const ALL: [Self; 3] = [Self::None, Self::Fade, Self::Crossfade];

    /// 對應的 ffmpeg `xfade` 轉場名稱
    #[must_use]
    pub const fn xfade_name(self) -> Option<&'static str> {
        match self {
            Self::None => None,
            Self::Fade => Some("fadeblack"),
            Self::Crossfade => Some("fade"),
        }
    }
}

impl fmt::Display for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => write!(f, "None"),
            Self::Fade => write!(f, "Fade"),
            Self::Crossfade => write!(f, "Crossfade"),
        }
    }
}

impl FromStr for Transition {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" => Ok(Self::None),
            "fade" => Ok(Self::Fade),
            "crossfade" => Ok(Self::Crossfade),
            other => Err(format!("unknown transition: {other}")),
        }
    }
}

/// 匯出選項，建立後不可變
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExportOptions {
    transition: Transition,
    transition_duration: f64,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self::new(Transition::None, None)
    }
}

impl ExportOptions {
    /// 轉場秒數未提供、非正數或非有限值時使用 1.0
    #[must_use]
    pub fn new(transition: Transition, duration_seconds: Option<f64>) -> Self {
        let transition_duration = duration_seconds
            .filter(|d| d.is_finite() && *d > 0.0)
            .unwrap_or(DEFAULT_TRANSITION_SECONDS);

        Self {
            transition,
            transition_duration,
        }
    }

    #[must_use]
    pub const fn transition(&self) -> Transition {
        self.transition
    }

    #[must_use]
    pub const fn transition_duration(&self) -> f64 {
        self.transition_duration
    }
}
