use clap::Parser;
use rand::Rng;
use rand::rngs::ThreadRng;
use rand::seq::IndexedRandom;
use serde_json::{Map, Value, json};
use std::fs;

const CHECKPOINTS: &[&str] = &["v1-5-pruned-emaonly.safetensors", "sd_xl_base_1.0.safetensors"];
const LORAS: &[&str] = &["detail_tweaker.safetensors", "film_grain.safetensors"];
const SAMPLERS: &[&str] = &["euler", "euler_ancestral", "dpmpp_2m", "ddim"];
const SCHEDULERS: &[&str] = &["normal", "karras", "simple"];
const SUBJECTS: &[&str] = &["a lighthouse", "a fox", "an old library", "a mountain lake"];
const STYLES: &[&str] = &["at dusk", "in watercolor", "with volumetric light", "in winter"];

/// Generates random acyclic workflow graphs over the built-in node classes
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// The path to write the generated JSON file to
    #[arg(short, long, default_value = "generated_workflow.json")]
    output: String,

    /// Number of independent text-to-image pipelines in the graph
    #[arg(short, long, default_value_t = 1)]
    pipelines: usize,

    /// Maximum number of LoRA loaders chained after each checkpoint
    #[arg(long, default_value_t = 2)]
    max_loras: usize,
}

/// Hands out ascending node ids and collects the nodes.
struct GraphBuilder {
    nodes: Map<String, Value>,
    next_id: u32,
}

impl GraphBuilder {
    fn new() -> Self {
        Self {
            nodes: Map::new(),
            next_id: 1,
        }
    }

    fn add(&mut self, class_type: &str, inputs: Value) -> String {
        let id = self.next_id.to_string();
        self.next_id += 1;
        self.nodes.insert(
            id.clone(),
            json!({
                "inputs": inputs,
                "class_type": class_type,
                "_meta": { "title": class_type },
            }),
        );
        id
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let mut rng = rand::rng();

    if cli.pipelines == 0 {
        eprintln!("Error: --pipelines must be at least 1");
        std::process::exit(1);
    }

    let mut graph = GraphBuilder::new();
    for _ in 0..cli.pipelines {
        add_pipeline(&mut graph, &mut rng, cli.max_loras);
    }

    let node_count = graph.nodes.len();
    let json_output = serde_json::to_string_pretty(&Value::Object(graph.nodes))?;
    fs::write(&cli.output, json_output)?;

    println!(
        "Successfully generated a workflow with {} nodes and saved it to '{}'",
        node_count, cli.output
    );

    Ok(())
}

/// Adds one checkpoint -> prompts -> sampler -> decode -> output chain.
fn add_pipeline(graph: &mut GraphBuilder, rng: &mut ThreadRng, max_loras: usize) {
    let checkpoint = graph.add(
        "CheckpointLoaderSimple",
        json!({ "ckpt_name": pick(rng, CHECKPOINTS) }),
    );
    let (mut model, mut clip) = ((checkpoint.clone(), 0), (checkpoint.clone(), 1));

    for _ in 0..rng.random_range(0..=max_loras) {
        let lora = graph.add(
            "LoraLoader",
            json!({
                "lora_name": pick(rng, LORAS),
                "strength_model": round2(rng.random_range(0.2..1.2)),
                "strength_clip": round2(rng.random_range(0.2..1.2)),
                "model": [model.0, model.1],
                "clip": [clip.0, clip.1],
            }),
        );
        model = (lora.clone(), 0);
        clip = (lora, 1);
    }

    let prompt = format!("{} {}", pick(rng, SUBJECTS), pick(rng, STYLES));
    let positive = graph.add(
        "CLIPTextEncode",
        json!({ "text": prompt, "clip": [clip.0, clip.1] }),
    );
    let negative = graph.add(
        "CLIPTextEncode",
        json!({ "text": "blurry, low quality", "clip": [clip.0, clip.1] }),
    );

    let side = *[512, 768, 1024].choose(rng).unwrap_or(&512);
    let latent = graph.add(
        "EmptyLatentImage",
        json!({ "width": side, "height": side, "batch_size": rng.random_range(1..=4) }),
    );

    let mut samples = graph.add(
        "KSampler",
        json!({
            "seed": rng.random_range(0..u32::MAX as u64),
            "steps": rng.random_range(10..=40),
            "cfg": round2(rng.random_range(4.0..9.0)),
            "sampler_name": pick(rng, SAMPLERS),
            "scheduler": pick(rng, SCHEDULERS),
            "denoise": 1.0,
            "model": [model.0, model.1],
            "positive": [positive, 0],
            "negative": [negative, 0],
            "latent_image": [latent, 0],
        }),
    );

    if rng.random_bool(0.3) {
        let upscaled = graph.add(
            "LatentUpscale",
            json!({
                "upscale_method": "nearest-exact",
                "width": side * 2,
                "height": side * 2,
                "crop": "disabled",
                "samples": [samples, 0],
            }),
        );
        samples = graph.add(
            "KSampler",
            json!({
                "seed": rng.random_range(0..u32::MAX as u64),
                "steps": rng.random_range(10..=25),
                "cfg": round2(rng.random_range(4.0..9.0)),
                "sampler_name": pick(rng, SAMPLERS),
                "scheduler": pick(rng, SCHEDULERS),
                "denoise": round2(rng.random_range(0.3..0.7)),
                "model": [model.0, model.1],
                "positive": [positive, 0],
                "negative": [negative, 0],
                "latent_image": [upscaled, 0],
            }),
        );
    }

    let image = graph.add(
        "VAEDecode",
        json!({ "samples": [samples, 0], "vae": [checkpoint, 2] }),
    );
    if rng.random_bool(0.5) {
        graph.add("PreviewImage", json!({ "images": [image, 0] }));
    }
    graph.add(
        "SaveImage",
        json!({ "filename_prefix": "generated", "images": [image, 0] }),
    );
}

fn pick<'a>(rng: &mut ThreadRng, choices: &[&'a str]) -> &'a str {
    choices.choose(rng).copied().unwrap_or_default()
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
