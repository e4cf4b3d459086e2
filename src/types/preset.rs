//! Sampling presets
//!
//! A preset is a complete set of sampling parameters. Every field must be
//! present in the source file, even when unused: set mirostat fields to 0 and
//! penalties to their neutral value (1.0 for `repeat_penalty`) to disable them.
//!
//! Float fields are kept as `f64` so the recorded preset echoes the source
//! numbers exactly; the engine narrows them to `f32` when sampling.

use serde::{Deserialize, Serialize};

/// Ten sampling parameters applied to a single generation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Preset {
    /// Tail-free sampling z (1.0 = disabled)
    pub tfs_z: f64,
    pub temperature: f64,
    /// Top-k cutoff (0 or less = disabled)
    pub top_k: i32,
    pub top_p: f64,
    /// 0 = off, 1 = mirostat, 2 = mirostat 2.0
    pub mirostat_mode: i32,
    pub mirostat_eta: f64,
    pub mirostat_tau: f64,

    pub repeat_penalty: f64,
    pub presence_penalty: f64,
    pub frequency_penalty: f64,
}

impl Preset {
    pub const REQUIRED_FIELDS: [&'static str; 10] = [
        "tfs_z",
        "temperature",
        "top_k",
        "top_p",
        "mirostat_mode",
        "mirostat_eta",
        "mirostat_tau",
        "repeat_penalty",
        "presence_penalty",
        "frequency_penalty",
    ];

    /// Float fields by name, in serialized order
    pub fn float_fields(&self) -> [(&'static str, f64); 8] {
        [
            ("tfs_z", self.tfs_z),
            ("temperature", self.temperature),
            ("top_p", self.top_p),
            ("mirostat_eta", self.mirostat_eta),
            ("mirostat_tau", self.mirostat_tau),
            ("repeat_penalty", self.repeat_penalty),
            ("presence_penalty", self.presence_penalty),
            ("frequency_penalty", self.frequency_penalty),
        ]
    }

    /// First float field the engine cannot represent as a finite `f32`
    pub fn out_of_range_field(&self) -> Option<&'static str> {
        self.float_fields()
            .into_iter()
            .find(|(_, value)| !(*value as f32).is_finite())
            .map(|(name, _)| name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Preset {
        Preset {
            tfs_z: 1.0,
            temperature: 0.7,
            top_k: 40,
            top_p: 0.95,
            mirostat_mode: 0,
            mirostat_eta: 0.1,
            mirostat_tau: 5.0,
            repeat_penalty: 1.1,
            presence_penalty: 0.0,
            frequency_penalty: 0.0,
        }
    }

    #[test]
    fn test_required_fields_match_struct() {
        let value = serde_json::to_value(sample()).unwrap();
        let keys: Vec<&str> = value
            .as_object()
            .unwrap()
            .keys()
            .map(String::as_str)
            .collect();
        let mut expected = Preset::REQUIRED_FIELDS.to_vec();
        let mut actual = keys;
        expected.sort_unstable();
        actual.sort_unstable();
        assert_eq!(actual, expected);
    }

    #[test]
    fn test_preset_parsing() {
        let json = r#"{
            "tfs_z": 1.0, "temperature": 0.7, "top_k": 40, "top_p": 0.95,
            "mirostat_mode": 0, "mirostat_eta": 0.1, "mirostat_tau": 5.0,
            "repeat_penalty": 1.1, "presence_penalty": 0.0, "frequency_penalty": 0.0
        }"#;
        let preset: Preset = serde_json::from_str(json).unwrap();
        assert_eq!(preset, sample());
    }

    #[test]
    fn test_out_of_range_field() {
        assert_eq!(sample().out_of_range_field(), None);

        let mut preset = sample();
        preset.repeat_penalty = 1e40;
        assert_eq!(preset.out_of_range_field(), Some("repeat_penalty"));

        preset.repeat_penalty = 1.1;
        preset.temperature = -1e39;
        assert_eq!(preset.out_of_range_field(), Some("temperature"));
    }

    #[test]
    fn test_source_precision_kept() {
        let json = r#"{
            "tfs_z": 1.0, "temperature": 0.123456789, "top_k": 40, "top_p": 0.95,
            "mirostat_mode": 0, "mirostat_eta": 0.1, "mirostat_tau": 5.0,
            "repeat_penalty": 1.1, "presence_penalty": 0.0, "frequency_penalty": 0.0
        }"#;
        let preset: Preset = serde_json::from_str(json).unwrap();
        let echoed = serde_json::to_value(&preset).unwrap();
        assert_eq!(echoed["temperature"], serde_json::json!(0.123456789));
    }

    #[test]
    fn test_preset_without_field_is_rejected() {
        let json = r#"{
            "tfs_z": 1.0, "temperature": 0.7, "top_k": 40, "top_p": 0.95,
            "mirostat_mode": 0, "mirostat_eta": 0.1, "mirostat_tau": 5.0,
            "repeat_penalty": 1.1, "presence_penalty": 0.0
        }"#;
        assert!(serde_json::from_str::<Preset>(json).is_err());
    }
}
