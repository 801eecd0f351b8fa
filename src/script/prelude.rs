//! Python helper functions copied verbatim into every generated script.

/// Output indexing that works for both tuple and `{"result": ...}` returns.
pub const GET_VALUE_AT_INDEX: &str = r#"def get_value_at_index(obj: Union[Sequence, Mapping], index: int) -> Any:
    """Returns the value at the given index of a sequence or mapping.

    Nodes that return a mapping carry their outputs under the "result" key.
    """
    try:
        return obj[index]
    except KeyError:
        return obj["result"][index]"#;

/// Upward directory search used to locate the node library at runtime.
pub const FIND_PATH: &str = r#"def find_path(name: str, path: str = None) -> str:
    """Walks up from `path` (default: the working directory) until `name` is found."""
    if path is None:
        path = os.getcwd()

    if name in os.listdir(path):
        path_name = os.path.join(path, name)
        print(f"{name} found: {path_name}")
        return path_name

    parent_directory = os.path.dirname(path)
    if parent_directory == path:
        return None

    return find_path(name, parent_directory)"#;

/// `{host}` is replaced with the quoted name of the library directory.
pub const ADD_HOST_DIRECTORY: &str = r#"def add_comfyui_directory_to_sys_path() -> None:
    """Adds the node library's directory to sys.path."""
    comfyui_path = find_path({host})
    if comfyui_path is not None and os.path.isdir(comfyui_path):
        sys.path.append(comfyui_path)
        print(f"'{comfyui_path}' added to sys.path")"#;

pub const ADD_EXTRA_MODEL_PATHS: &str = r#"def add_extra_model_paths() -> None:
    """Loads extra_model_paths.yaml when one exists next to the library."""
    try:
        from main import load_extra_path_config
    except ImportError:
        from utils.extra_config import load_extra_path_config

    extra_model_paths = find_path("extra_model_paths.yaml")

    if extra_model_paths is not None:
        load_extra_path_config(extra_model_paths)
    else:
        print("Could not find the extra_model_paths config file.")"#;

pub const PATH_SETUP_CALLS: &str = "add_comfyui_directory_to_sys_path()\nadd_extra_model_paths()";

/// Registers custom nodes from a synchronous `main`.
pub const IMPORT_CUSTOM_NODES: &str = r#"def import_custom_nodes() -> None:
    """Loads custom nodes so they register in NODE_CLASS_MAPPINGS.

    Custom node initialisation expects a PromptServer, so one is created on
    a fresh event loop first.
    """
    import asyncio
    import execution
    from nodes import init_extra_nodes
    import server

    loop = asyncio.new_event_loop()
    asyncio.set_event_loop(loop)

    server_instance = server.PromptServer(loop)
    execution.PromptQueue(server_instance)

    loop.run_until_complete(init_extra_nodes())"#;

/// Registers custom nodes from inside an already running event loop.
pub const IMPORT_CUSTOM_NODES_ASYNC: &str = r#"async def import_custom_nodes() -> None:
    """Loads custom nodes so they register in NODE_CLASS_MAPPINGS.

    Custom node initialisation expects a PromptServer bound to the running
    event loop.
    """
    import asyncio
    import execution
    from nodes import init_extra_nodes
    import server

    loop = asyncio.get_running_loop()
    server_instance = server.PromptServer(loop)
    execution.PromptQueue(server_instance)

    await init_extra_nodes()"#;

/// Names the prelude and script skeleton define or import at module level.
pub const RESERVED_NAMES: &[&str] = &[
    "os",
    "random",
    "sys",
    "torch",
    "asyncio",
    "Sequence",
    "Mapping",
    "Any",
    "Union",
    "get_value_at_index",
    "find_path",
    "add_comfyui_directory_to_sys_path",
    "add_extra_model_paths",
    "import_custom_nodes",
    "NODE_CLASS_MAPPINGS",
    "main",
    // Builtins the script calls
    "range",
    "print",
    "float",
    "getattr",
];
