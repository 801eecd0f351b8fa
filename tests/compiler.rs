//! Tests for compilation: placement, naming, emitted calls and diagnostics.
mod common;
use common::*;
use utsushi::prelude::*;

fn compile_with(json: &str, iterations: u32, catalog: NodeCatalog) -> CompiledScript {
    Compiler::builder(graph(json))
        .iterations(iterations)
        .with_catalog(catalog)
        .options(compact_options())
        .build()
        .compile()
        .expect("Failed to compile")
}

#[test]
fn test_cacheable_loader_runs_once_and_saver_every_iteration() {
    let script = compile_with(LOAD_AND_SAVE, 3, NodeCatalog::builtin());

    let load = &script.bindings[&NodeId::from("1")];
    let save = &script.bindings[&NodeId::from("2")];
    assert_eq!(load.placement, Placement::Cached);
    assert_eq!(save.placement, Placement::PerIteration);

    assert_eq!(assignments(&script.source, "loadimage"), 1);
    assert_eq!(assignments(&script.source, "loadimage_1"), 1);
    assert!(script.source.contains("for q in range(3):"));

    // The fixture names its inputs `path` and `image`, so every required input is unbound
    let unbound = |node: &str, class: &str, input: &str| Diagnostic::UnboundRequiredInput {
        node_id: NodeId::from(node),
        class_type: class.to_string(),
        input: input.to_string(),
    };
    assert_eq!(
        script.diagnostics,
        vec![
            unbound("1", "LoadImage", "image"),
            unbound("2", "SaveImage", "images"),
            unbound("2", "SaveImage", "filename_prefix"),
        ]
    );

    let body = loop_body(&script.source);
    assert!(body.contains(&"saveimage_2 = saveimage.save_images(image=loadimage_1[0])"));
    assert!(!body.iter().any(|line| line.contains("loadimage.load_image")));
}

#[test]
fn test_text_to_image_layout() {
    let script = compile_with(TEXT_TO_IMAGE, 10, NodeCatalog::builtin());

    assert!(script.is_clean(), "{:?}", script.diagnostics);
    let order: Vec<&str> = script.plan.iter().map(NodeId::as_str).collect();
    assert_eq!(order, vec!["4", "5", "6", "7", "3", "8", "9", "10"]);

    assert!(script.source.contains(
        "from nodes import CLIPTextEncode, CheckpointLoaderSimple, EmptyLatentImage, KSampler, SaveImage, VAEDecode\n"
    ));
    assert_eq!(
        loop_body(&script.source),
        vec![
            "ksampler_3 = ksampler.sample(seed=random.randint(1, 2**64), steps=20, cfg=8.0, \
             sampler_name=\"euler\", scheduler=\"normal\", denoise=1.0, model=checkpointloadersimple_4[0], \
             positive=cliptextencode_6[0], negative=cliptextencode_7[0], latent_image=emptylatentimage_5[0])",
            "vaedecode_8 = vaedecode.decode(samples=ksampler_3[0], vae=checkpointloadersimple_4[2])",
            "saveimage_9 = saveimage.save_images(filename_prefix=\"ComfyUI\", images=vaedecode_8[0])",
        ]
    );

    // The factory of a class used only inside the loop is still built once, up front
    let setup_end = script.source.find("for q in range(").unwrap();
    assert!(script.source[..setup_end].contains("vaedecode = VAEDecode()"));
}

#[test]
fn test_display_only_nodes_are_omitted() {
    let script = compile_with(TEXT_TO_IMAGE, 1, NodeCatalog::builtin());
    assert!(!script.source.contains("PreviewImage"));
    assert!(!script.source.contains("previewimage"));
    assert!(!script.bindings.contains_key(&NodeId::from("10")));
    assert!(script.plan.position(&NodeId::from("10")).is_some());
}

#[test]
fn test_same_class_nodes_get_id_suffixes() {
    let script = compile_with(TEXT_TO_IMAGE, 1, NodeCatalog::builtin());
    let positive = &script.bindings[&NodeId::from("6")];
    let negative = &script.bindings[&NodeId::from("7")];
    assert_eq!(positive.handle, "cliptextencode");
    assert_eq!(negative.handle, "cliptextencode");
    assert_eq!(positive.result, "cliptextencode_6");
    assert_eq!(negative.result, "cliptextencode_7");

    let again = compile_with(TEXT_TO_IMAGE, 1, NodeCatalog::builtin());
    assert_eq!(again.bindings, script.bindings);
}

#[test]
fn test_kept_seeds_allow_caching() {
    let json = r#"{
        "1": {"class_type": "Noise", "inputs": {"seed": 42, "strength": 0.5}}
    }"#;
    let mut catalog = NodeCatalog::new();
    catalog.insert("Noise", NodeClassInfo::new("make").cacheable(true).origin(ClassOrigin::Builtin));

    let redrawn = compile_with(json, 2, catalog.clone());
    assert_eq!(redrawn.bindings[&NodeId::from("1")].placement, Placement::PerIteration);
    assert!(redrawn.source.contains("seed=random.randint(1, 2**64)"));

    let kept = Compiler::builder(graph(json))
        .with_catalog(catalog)
        .options(ScriptOptions {
            randomize_seeds: false,
            ..compact_options()
        })
        .build()
        .compile()
        .unwrap();
    assert_eq!(kept.bindings[&NodeId::from("1")].placement, Placement::Cached);
    assert!(kept.source.contains("noise_1 = noise.make(seed=42, strength=0.5)"));
    assert_eq!(loop_body(&kept.source), vec!["pass"]);
}

#[test]
fn test_unknown_class_is_emitted_with_warning() {
    let json = r#"{
        "1": {"class_type": "LoadImage", "inputs": {"image": "a.png"}},
        "2": {"class_type": "Mystery Node", "inputs": {"image": ["1", 0]}}
    }"#;
    let script = compile_with(json, 1, NodeCatalog::builtin());

    assert_eq!(
        script.diagnostics,
        vec![Diagnostic::UnknownNodeClass {
            node_id: NodeId::from("2"),
            class_type: "Mystery Node".to_string(),
        }]
    );
    assert!(script.source.contains("mystery_node = NODE_CLASS_MAPPINGS[\"Mystery Node\"]()"));
    assert!(script.source.contains("from nodes import LoadImage, NODE_CLASS_MAPPINGS\n"));
    assert!(script.source.contains("def import_custom_nodes() -> None:"));
    assert_eq!(
        loop_body(&script.source),
        vec![
            "# WARNING: Node '2' uses class 'Mystery Node' which is not in the node catalog",
            "mystery_node_2 = mystery_node.execute(image=loadimage_1[0])",
        ]
    );
}

#[test]
fn test_missing_required_input_is_flagged() {
    let json = r#"{
        "1": {"class_type": "VAEDecode", "inputs": {"samples": ["2", 0]}},
        "2": {"class_type": "EmptyLatentImage", "inputs": {"width": 64, "height": 64, "batch_size": 1}}
    }"#;
    let script = compile_with(json, 1, NodeCatalog::builtin());

    assert_eq!(
        script.diagnostics,
        vec![Diagnostic::UnboundRequiredInput {
            node_id: NodeId::from("1"),
            class_type: "VAEDecode".to_string(),
            input: "vae".to_string(),
        }]
    );
    assert!(script.source.contains(
        "        # WARNING: Node '1' (VAEDecode) has no value for required input 'vae'\n        vaedecode_1 = vaedecode.decode(samples=emptylatentimage_2[0])\n"
    ));
}

#[test]
fn test_link_to_display_only_node_is_unbound() {
    let json = r#"{
        "1": {"class_type": "LoadImage", "inputs": {"image": "a.png"}},
        "2": {"class_type": "PreviewImage", "inputs": {"images": ["1", 0]}},
        "3": {"class_type": "SaveImage", "inputs": {"images": ["2", 0], "filename_prefix": "x"}}
    }"#;
    let script = compile_with(json, 1, NodeCatalog::builtin());
    assert_eq!(
        script.diagnostics,
        vec![Diagnostic::UnboundRequiredInput {
            node_id: NodeId::from("3"),
            class_type: "SaveImage".to_string(),
            input: "images".to_string(),
        }]
    );
    assert!(script.source.contains("saveimage_3 = saveimage.save_images(filename_prefix=\"x\")"));
}

#[test]
fn test_custom_nodes_and_hidden_unique_id() {
    let script = compile_with(WITH_CUSTOM_NODES, 2, custom_catalog());

    assert!(script.is_clean(), "{:?}", script.diagnostics);
    assert!(script.source.contains("from nodes import LoadImage, SaveImage, NODE_CLASS_MAPPINGS\n"));
    assert!(script.source.contains("def main():\n    import_custom_nodes()\n"));
    assert!(script.source.contains("facedetailer = NODE_CLASS_MAPPINGS[\"FaceDetailer\"]()"));
    assert!(script.source.contains("loadimage_1 = loadimage.load_image(image=\"face.png\")"));
    assert_eq!(
        loop_body(&script.source),
        vec![
            "facedetailer_2 = facedetailer.doit(image=loadimage_1[0], guide_size=384, unique_id=\"2\")",
            "saveimage_3 = saveimage.save_images(images=facedetailer_2[0], filename_prefix=\"out\")",
        ]
    );
}

#[test]
fn test_async_classes_make_main_async() {
    let json = r#"{
        "1": {"class_type": "RemoteGenerate", "inputs": {"prompt": "a cat"}},
        "2": {"class_type": "SaveImage", "inputs": {"images": ["1", 0], "filename_prefix": "r"}}
    }"#;
    let script = Compiler::builder(graph(json))
        .iterations(1)
        .with_class_info(
            "RemoteGenerate",
            NodeClassInfo::new("generate").asynchronous(true),
        )
        .options(compact_options())
        .build()
        .compile()
        .unwrap();

    assert!(script.source.starts_with("import asyncio\n"));
    assert!(script.source.contains("async def import_custom_nodes() -> None:"));
    assert!(script.source.contains("async def main():\n    await import_custom_nodes()\n"));
    assert!(script.source.contains("remotegenerate_1 = await remotegenerate.generate(prompt=\"a cat\")"));
    assert!(script.source.contains("saveimage_2 = saveimage.save_images(images=get_value_at_index(remotegenerate_1, 0), filename_prefix=\"r\")"));
    assert!(script.source.ends_with("if __name__ == \"__main__\":\n    asyncio.run(main())\n"));
}

#[test]
fn test_compiler_with_type_mapping() {
    let json = r#"{
        "1": {"class_type": "Loader|pack", "inputs": {"image": "a.png"}}
    }"#;
    let script = Compiler::builder(graph(json))
        .with_type_mapping("Loader|pack", "LoadImage")
        .with_type_mapping("Other", "DoesNotExist")
        .options(compact_options())
        .build()
        .compile()
        .unwrap();

    assert!(script.is_clean());
    assert_eq!(script.bindings[&NodeId::from("1")].placement, Placement::Cached);
    assert!(script.source.contains("loaderpack = NODE_CLASS_MAPPINGS[\"Loader|pack\"]()"));
    assert!(script.source.contains("loaderpack_1 = loaderpack.load_image(image=\"a.png\")"));
    // The mapping only exists once the extensions are loaded
    assert!(script.source.contains("def import_custom_nodes() -> None:"));
    assert!(script.source.contains("def main():\n    import_custom_nodes()\n"));
}

#[test]
fn test_type_mapping_alias_is_never_imported_from_nodes() {
    let json = r#"{
        "1": {"class_type": "MyLoader", "inputs": {"image": "a.png"}}
    }"#;
    let script = Compiler::builder(graph(json))
        .with_type_mapping("MyLoader", "LoadImage")
        .options(compact_options())
        .build()
        .compile()
        .unwrap();

    assert!(script.is_clean());
    assert!(
        !script
            .source
            .lines()
            .any(|line| line.starts_with("from nodes import") && line.contains("MyLoader"))
    );
    assert!(script.source.contains("myloader = NODE_CLASS_MAPPINGS[\"MyLoader\"]()"));
    assert!(script.source.contains("    import_custom_nodes()\n"));
}

#[test]
fn test_invalid_loop_variable_falls_back_to_q() {
    let options = ScriptOptions {
        loop_variable: "my var".to_string(),
        ..compact_options()
    };
    let script = Compiler::builder(graph(LOAD_AND_SAVE))
        .iterations(2)
        .options(options)
        .build()
        .compile()
        .unwrap();

    assert!(script.source.contains("for q in range(2):"));
    assert!(!script.source.contains("my var"));
}
