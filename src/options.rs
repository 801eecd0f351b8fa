use crate::graph::InputValue;
use crate::script::is_python_identifier;
use serde::{Deserialize, Serialize};

const DEFAULT_LOOP_VARIABLE: &str = "q";

/// Formatting and code-generation switches for the emitted script.
///
/// Every field has a default, so a partial JSON document deserializes into a
/// complete set of options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScriptOptions {
    /// Wrap `main` in `with torch.inference_mode():`.
    pub inference_mode: bool,
    /// Emit the helpers that locate the node library at runtime.
    pub path_discovery: bool,
    /// Directory name the path discovery helpers search for.
    pub host_directory: String,
    /// Draw a fresh random value for seed inputs on every iteration.
    pub randomize_seeds: bool,
    /// Input names treated as seeds.
    pub seed_inputs: Vec<String>,
    /// Name of the queue loop's counter. Names Python would reject fall back to `q`.
    pub loop_variable: String,
}

impl Default for ScriptOptions {
    fn default() -> Self {
        Self {
            inference_mode: true,
            path_discovery: true,
            host_directory: "ComfyUI".to_string(),
            randomize_seeds: true,
            seed_inputs: vec!["seed".to_string(), "noise_seed".to_string()],
            loop_variable: DEFAULT_LOOP_VARIABLE.to_string(),
        }
    }
}

impl ScriptOptions {
    /// The loop counter name as emitted: `loop_variable` when it is a valid
    /// identifier, `q` otherwise.
    pub fn loop_counter(&self) -> &str {
        if is_python_identifier(&self.loop_variable) {
            &self.loop_variable
        } else {
            DEFAULT_LOOP_VARIABLE
        }
    }

    /// Whether this input is re-drawn at random on every iteration.
    pub fn is_randomized(&self, name: &str, value: &InputValue) -> bool {
        self.randomize_seeds
            && matches!(value, InputValue::Literal(_))
            && self.seed_inputs.iter().any(|seed| seed == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loop_counter_keeps_valid_names() {
        let options = ScriptOptions {
            loop_variable: "run_index".to_string(),
            ..ScriptOptions::default()
        };
        assert_eq!(options.loop_counter(), "run_index");
    }

    #[test]
    fn loop_counter_rejects_names_python_cannot_bind() {
        for name in ["my var", "", "1st", "for"] {
            let options = ScriptOptions {
                loop_variable: name.to_string(),
                ..ScriptOptions::default()
            };
            assert_eq!(options.loop_counter(), "q", "{:?}", name);
        }
    }
}
