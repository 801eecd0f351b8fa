use super::{ClassOrigin, NodeClassInfo, ReturnShape};
use ahash::AHashMap;

/// How a built-in class may be scheduled across queue iterations.
#[derive(Clone, Copy)]
enum Reuse {
    /// Deterministic; computed once when all inputs are constant.
    Cached,
    /// Random or side-effecting; runs every iteration.
    PerRun,
    /// Editor previews; left out of the script.
    DisplayOnly,
}

/// Master macro to define the built-in node classes and their registration.
macro_rules! define_builtin_classes {
    ( $( ($class:literal, $function:literal, $reuse:ident, $shape:ident, [$($required:literal),* $(,)?], [$($widget:literal),* $(,)?]) ),* $(,)? ) => {
        pub(super) fn register_builtin_classes(entries: &mut AHashMap<String, NodeClassInfo>) {
            $(
                let reuse = Reuse::$reuse;
                entries.insert(
                    $class.to_string(),
                    NodeClassInfo {
                        function: $function.to_string(),
                        is_async: false,
                        cacheable: matches!(reuse, Reuse::Cached),
                        return_shape: ReturnShape::$shape,
                        origin: ClassOrigin::Builtin,
                        display_only: matches!(reuse, Reuse::DisplayOnly),
                        required: vec![$($required.to_string()),*],
                        widget_inputs: vec![$($widget.to_string()),*],
                        hidden: Vec::new(),
                    },
                );
            )*
        }

        /// Names of every class in [`NodeCatalog::builtin`](super::NodeCatalog::builtin).
        pub fn builtin_class_names() -> &'static [&'static str] {
            &[$($class),*]
        }
    };
}

define_builtin_classes! {
    // Loaders
    ("CheckpointLoaderSimple", "load_checkpoint", Cached, Sequence, ["ckpt_name"], []),
    ("CheckpointLoader", "load_checkpoint", Cached, Sequence, ["config_name", "ckpt_name"], []),
    ("VAELoader", "load_vae", Cached, Sequence, ["vae_name"], []),
    ("CLIPLoader", "load_clip", Cached, Sequence, ["clip_name"], []),
    ("LoraLoader", "load_lora", Cached, Sequence, ["model", "clip", "lora_name", "strength_model", "strength_clip"], []),
    ("LoraLoaderModelOnly", "load_lora_model_only", Cached, Sequence, ["model", "lora_name", "strength_model"], []),
    ("ControlNetLoader", "load_controlnet", Cached, Sequence, ["control_net_name"], []),
    ("UpscaleModelLoader", "load_model", Cached, Sequence, ["model_name"], []),
    ("LoadImage", "load_image", Cached, Sequence, ["image"], ["upload"]),
    ("LoadImageMask", "load_image", Cached, Sequence, ["image", "channel"], ["upload"]),

    // Conditioning
    ("CLIPSetLastLayer", "set_last_layer", Cached, Sequence, ["clip", "stop_at_clip_layer"], []),
    ("CLIPTextEncode", "encode", Cached, Sequence, ["text", "clip"], []),
    ("ConditioningCombine", "combine", Cached, Sequence, ["conditioning_1", "conditioning_2"], []),
    ("ControlNetApply", "apply_controlnet", Cached, Sequence, ["conditioning", "control_net", "image", "strength"], []),

    // Latents and images
    ("EmptyLatentImage", "generate", Cached, Sequence, ["width", "height", "batch_size"], []),
    ("LatentUpscale", "upscale", Cached, Sequence, ["samples", "upscale_method", "width", "height", "crop"], []),
    ("VAEDecode", "decode", Cached, Sequence, ["samples", "vae"], []),
    ("VAEDecodeTiled", "decode", Cached, Sequence, ["samples", "vae", "tile_size"], []),
    ("VAEEncode", "encode", Cached, Sequence, ["pixels", "vae"], []),
    ("ImageScale", "upscale", Cached, Sequence, ["image", "upscale_method", "width", "height", "crop"], []),
    ("ImageUpscaleWithModel", "upscale", Cached, Sequence, ["upscale_model", "image"], []),

    // Sampling
    ("KSampler", "sample", PerRun, Sequence,
        ["model", "seed", "steps", "cfg", "sampler_name", "scheduler", "positive", "negative", "latent_image", "denoise"], []),
    ("KSamplerAdvanced", "sample", PerRun, Sequence,
        ["model", "add_noise", "noise_seed", "steps", "cfg", "sampler_name", "scheduler", "positive", "negative",
         "latent_image", "start_at_step", "end_at_step", "return_with_leftover_noise"], []),

    // Outputs
    ("SaveImage", "save_images", PerRun, Mapping, ["images", "filename_prefix"], []),
    ("SaveLatent", "save", PerRun, Mapping, ["samples", "filename_prefix"], []),
    ("PreviewImage", "save_images", DisplayOnly, Mapping, ["images"], []),
}
