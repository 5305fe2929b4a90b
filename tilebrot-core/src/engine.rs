use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Which algorithm fills the iteration buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EngineType {
    /// Boundary tracing with interior fill.
    #[default]
    Border,
    /// Plain scalar loop.
    Standard,
    /// Eight-lane batched loop.
    Simd,
    /// Fragment shader in single precision.
    #[serde(rename = "gpuf", alias = "gpu")]
    GpuFloat,
    /// Fragment shader in double precision (needs adapter support).
    #[serde(rename = "gpud")]
    GpuDouble,
}

impl EngineType {
    /// Every engine, in the order [`next`](Self::next) cycles through.
    pub const ALL: [EngineType; 5] = [
        EngineType::Border,
        EngineType::Standard,
        EngineType::Simd,
        EngineType::GpuFloat,
        EngineType::GpuDouble,
    ];

    pub fn is_gpu(self) -> bool {
        matches!(self, EngineType::GpuFloat | EngineType::GpuDouble)
    }

    /// The engine after this one, wrapping back to the first.
    pub fn next(self) -> Self {
        let idx = Self::ALL.iter().position(|&e| e == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }

    /// Canonical short name, as accepted by [`FromStr`].
    pub fn as_str(self) -> &'static str {
        match self {
            EngineType::Border => "border",
            EngineType::Standard => "standard",
            EngineType::Simd => "simd",
            EngineType::GpuFloat => "gpuf",
            EngineType::GpuDouble => "gpud",
        }
    }
}

impl fmt::Display for EngineType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EngineType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "border" => Ok(EngineType::Border),
            "standard" => Ok(EngineType::Standard),
            "simd" => Ok(EngineType::Simd),
            "gpuf" | "gpu" => Ok(EngineType::GpuFloat),
            "gpud" => Ok(EngineType::GpuDouble),
            _ => Err(CoreError::UnknownEngine(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_canonical_names() {
        for engine in EngineType::ALL {
            assert_eq!(engine.to_string().parse::<EngineType>().unwrap(), engine);
        }
    }

    #[test]
    fn parse_alias_and_case() {
        assert_eq!("gpu".parse::<EngineType>().unwrap(), EngineType::GpuFloat);
        assert_eq!(" SIMD ".parse::<EngineType>().unwrap(), EngineType::Simd);
    }

    #[test]
    fn parse_unknown_is_error() {
        let err = "cuda".parse::<EngineType>().unwrap_err();
        assert!(matches!(err, CoreError::UnknownEngine(ref name) if name == "cuda"));
    }

    #[test]
    fn next_cycles_through_all() {
        let mut engine = EngineType::default();
        assert_eq!(engine, EngineType::Border);
        for expected in EngineType::ALL.iter().skip(1) {
            engine = engine.next();
            assert_eq!(engine, *expected);
        }
        assert_eq!(engine.next(), EngineType::Border);
    }

    #[test]
    fn only_shader_engines_are_gpu() {
        let gpu: Vec<_> = EngineType::ALL.iter().filter(|e| e.is_gpu()).collect();
        assert_eq!(gpu, [&EngineType::GpuFloat, &EngineType::GpuDouble]);
    }

    #[test]
    fn serde_uses_short_names() {
        let json = serde_json::to_string(&EngineType::GpuDouble).unwrap();
        assert_eq!(json, "\"gpud\"");
        let parsed: EngineType = serde_json::from_str("\"gpu\"").unwrap();
        assert_eq!(parsed, EngineType::GpuFloat);
        let parsed: EngineType = serde_json::from_str("\"border\"").unwrap();
        assert_eq!(parsed, EngineType::Border);
    }
}
