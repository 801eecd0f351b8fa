//! Common test fixtures: workflow exports and catalogs.
use utsushi::prelude::*;

/// A cacheable image loader feeding a saver.
#[allow(dead_code)]
pub const LOAD_AND_SAVE: &str = r#"{
    "1": {"class_type": "LoadImage", "inputs": {"path": "in.png"}},
    "2": {"class_type": "SaveImage", "inputs": {"image": ["1", 0]}}
}"#;

/// Two nodes linking to each other.
#[allow(dead_code)]
pub const TWO_NODE_CYCLE: &str = r#"{
    "1": {"class_type": "LoadImage", "inputs": {"image": "a.png"}},
    "2": {"class_type": "VAEDecode", "inputs": {"samples": ["3", 0]}},
    "3": {"class_type": "VAEEncode", "inputs": {"pixels": ["2", 0]}}
}"#;

/// The default text-to-image workflow of the editor, as exported in API format.
#[allow(dead_code)]
pub const TEXT_TO_IMAGE: &str = r#"{
    "3": {
        "inputs": {
            "seed": 156680208700286,
            "steps": 20,
            "cfg": 8.0,
            "sampler_name": "euler",
            "scheduler": "normal",
            "denoise": 1.0,
            "model": ["4", 0],
            "positive": ["6", 0],
            "negative": ["7", 0],
            "latent_image": ["5", 0]
        },
        "class_type": "KSampler",
        "_meta": {"title": "KSampler"}
    },
    "4": {
        "inputs": {"ckpt_name": "v1-5-pruned-emaonly.safetensors"},
        "class_type": "CheckpointLoaderSimple",
        "_meta": {"title": "Load Checkpoint"}
    },
    "5": {
        "inputs": {"width": 512, "height": 512, "batch_size": 1},
        "class_type": "EmptyLatentImage",
        "_meta": {"title": "Empty Latent Image"}
    },
    "6": {
        "inputs": {"text": "beautiful scenery nature glass bottle landscape", "clip": ["4", 1]},
        "class_type": "CLIPTextEncode",
        "_meta": {"title": "CLIP Text Encode (Prompt)"}
    },
    "7": {
        "inputs": {"text": "text, watermark", "clip": ["4", 1]},
        "class_type": "CLIPTextEncode",
        "_meta": {"title": "CLIP Text Encode (Prompt)"}
    },
    "8": {
        "inputs": {"samples": ["3", 0], "vae": ["4", 2]},
        "class_type": "VAEDecode",
        "_meta": {"title": "VAE Decode"}
    },
    "9": {
        "inputs": {"filename_prefix": "ComfyUI", "images": ["8", 0]},
        "class_type": "SaveImage",
        "_meta": {"title": "Save Image"}
    },
    "10": {
        "inputs": {"images": ["8", 0]},
        "class_type": "PreviewImage",
        "_meta": {"title": "Preview Image"}
    }
}"#;

/// A workflow mixing built-in and extension classes.
#[allow(dead_code)]
pub const WITH_CUSTOM_NODES: &str = r#"{
    "1": {"class_type": "LoadImage", "inputs": {"image": "face.png", "upload": "image"}},
    "2": {"class_type": "FaceDetailer", "inputs": {"image": ["1", 0], "guide_size": 384}},
    "3": {"class_type": "SaveImage", "inputs": {"images": ["2", 0], "filename_prefix": "out"}}
}"#;

/// Parses a fixture, panicking on malformed test data.
#[allow(dead_code)]
pub fn graph(json: &str) -> WorkflowGraph {
    WorkflowGraph::from_json(json).expect("fixture must parse")
}

/// Extension classes used by [`WITH_CUSTOM_NODES`].
#[allow(dead_code)]
pub fn custom_catalog() -> NodeCatalog {
    let mut extra = NodeCatalog::new();
    extra.insert(
        "FaceDetailer",
        NodeClassInfo::new("doit")
            .return_shape(ReturnShape::Sequence)
            .required(["image"])
            .hidden(["unique_id"]),
    );
    NodeCatalog::builtin().merge(extra)
}

/// Options that leave out the path-discovery prelude, for shorter assertions.
#[allow(dead_code)]
pub fn compact_options() -> ScriptOptions {
    ScriptOptions {
        path_discovery: false,
        ..ScriptOptions::default()
    }
}

/// Number of lines assigning to `variable`.
#[allow(dead_code)]
pub fn assignments(source: &str, variable: &str) -> usize {
    let prefix = format!("{} = ", variable);
    source
        .lines()
        .filter(|line| line.trim_start().starts_with(&prefix))
        .count()
}

/// The lines inside the queue loop.
#[allow(dead_code)]
pub fn loop_body(source: &str) -> Vec<&str> {
    let mut lines = source.lines().skip_while(|line| !line.trim_start().starts_with("for q in range("));
    let Some(header) = lines.next() else {
        return Vec::new();
    };
    let depth = header.len() - header.trim_start().len();
    lines
        .take_while(|line| line.len() - line.trim_start().len() > depth && !line.trim().is_empty())
        .map(str::trim)
        .collect()
}
