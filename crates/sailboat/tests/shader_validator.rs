use std::fs;
use std::path::{Path, PathBuf};

fn shader_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("src/gpu/shaders")
}

fn parse(path: &Path) -> Result<naga::Module, String> {
    let source = fs::read_to_string(path).map_err(|e| format!("Failed to read {:?}: {e}", path))?;
    naga::front::wgsl::parse_str(&source)
        .map_err(|e| format!("Failed to parse {:?}:\n{}", path.file_name().unwrap(), e.emit_to_string(&source)))
}

fn wgsl_files() -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = fs::read_dir(shader_dir())
        .expect("shader directory")
        .map(|entry| entry.unwrap().path())
        .filter(|path| path.extension().map_or(false, |ext| ext == "wgsl"))
        .collect();
    files.sort();
    files
}

#[test]
fn validate_all_shaders() {
    let files = wgsl_files();
    assert!(!files.is_empty(), "no shaders under {:?}", shader_dir());

    let mut errors = Vec::new();
    for path in &files {
        let module = match parse(path) {
            Ok(module) => module,
            Err(e) => {
                errors.push(e);
                continue;
            }
        };
        let mut validator = naga::valid::Validator::new(
            naga::valid::ValidationFlags::all(),
            naga::valid::Capabilities::all(),
        );
        if let Err(e) = validator.validate(&module) {
            errors.push(format!("Failed to validate {:?}:\n{:?}", path.file_name().unwrap(), e));
        }
    }

    if !errors.is_empty() {
        panic!("Shader validation failed:\n{}", errors.join("\n"));
    }
}

fn entry_points(name: &str) -> Vec<(String, naga::ShaderStage)> {
    let module = parse(&shader_dir().join(name)).unwrap_or_else(|e| panic!("{e}"));
    module
        .entry_points
        .iter()
        .map(|ep| (ep.name.clone(), ep.stage))
        .collect()
}

#[test]
fn render_shaders_export_vs_and_fs_main() {
    for name in ["water.wgsl", "mesh.wgsl", "particle.wgsl", "skybox.wgsl", "sun.wgsl"] {
        let eps = entry_points(name);
        assert!(
            eps.contains(&("vs_main".to_string(), naga::ShaderStage::Vertex)),
            "{name} is missing vs_main"
        );
        assert!(
            eps.contains(&("fs_main".to_string(), naga::ShaderStage::Fragment)),
            "{name} is missing fs_main"
        );
    }
}

#[test]
fn water_compute_stages_use_16x16_workgroups() {
    for name in ["water_height.wgsl", "water_normals.wgsl"] {
        let module = parse(&shader_dir().join(name)).unwrap_or_else(|e| panic!("{e}"));
        let main = module
            .entry_points
            .iter()
            .find(|ep| ep.name == "main")
            .unwrap_or_else(|| panic!("{name} has no main"));
        assert_eq!(main.stage, naga::ShaderStage::Compute);
        assert_eq!(main.workgroup_size, [ocean_sim::water::WORKGROUP_SIZE, ocean_sim::water::WORKGROUP_SIZE, 1]);
    }
}
