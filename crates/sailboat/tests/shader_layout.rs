//! WGSL struct layouts and constants checked against the Rust side.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use ocean_sim::water::WAVES;
use sailboat::app::{ModelSlot, SceneSlot, UniformSlot, WaterComputeSlot};

struct WgslLayout {
    size: u32,
    offsets: HashMap<String, u32>,
}

fn read_shader(shader: &str) -> String {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("src/gpu/shaders").join(shader);
    fs::read_to_string(&path).unwrap_or_else(|e| panic!("Failed to read {:?}: {e}", path))
}

fn wgsl_struct_layout(shader: &str, struct_name: &str) -> WgslLayout {
    let source = read_shader(shader);
    let module = naga::front::wgsl::parse_str(&source)
        .unwrap_or_else(|e| panic!("Failed to parse {shader}: {}", e.emit_to_string(&source)));

    let mut layouter = naga::proc::Layouter::default();
    let gctx = naga::proc::GlobalCtx {
        types: &module.types,
        constants: &module.constants,
        overrides: &module.overrides,
        global_expressions: &module.global_expressions,
    };
    layouter
        .update(gctx)
        .unwrap_or_else(|e| panic!("Failed to compute layout for {shader}: {e}"));

    let (handle, ty) = module
        .types
        .iter()
        .find(|(_, ty)| ty.name.as_deref() == Some(struct_name))
        .unwrap_or_else(|| panic!("Struct {struct_name} not found in {shader}"));

    let members = match &ty.inner {
        naga::TypeInner::Struct { members, .. } => members,
        _ => panic!("Type {struct_name} is not a struct in {shader}"),
    };

    let offsets = members
        .iter()
        .filter_map(|m| m.name.clone().map(|name| (name, m.offset)))
        .collect();

    WgslLayout {
        size: layouter[handle].size,
        offsets,
    }
}

fn assert_slots_match<S: UniformSlot>(shader: &str, struct_name: &str) {
    let layout = wgsl_struct_layout(shader, struct_name);
    assert_eq!(layout.size as usize, S::BLOCK_SIZE, "{shader}::{struct_name} size");
    for &slot in S::ALL {
        let (offset, _) = slot.layout();
        let wgsl = layout
            .offsets
            .get(slot.name())
            .unwrap_or_else(|| panic!("{shader}::{struct_name} has no member {}", slot.name()));
        assert_eq!(*wgsl as usize, offset, "{shader}::{struct_name}.{}", slot.name());
    }
}

#[test]
fn scene_block_matches_every_render_shader() {
    for shader in ["water.wgsl", "mesh.wgsl", "particle.wgsl", "skybox.wgsl", "sun.wgsl"] {
        assert_slots_match::<SceneSlot>(shader, "Scene");
    }
}

#[test]
fn model_block_matches_mesh_shader() {
    assert_slots_match::<ModelSlot>("mesh.wgsl", "Model");
}

#[test]
fn water_params_match_both_compute_stages() {
    assert_slots_match::<WaterComputeSlot>("water_height.wgsl", "WaterParams");
    assert_slots_match::<WaterComputeSlot>("water_normals.wgsl", "WaterParams");
}

/// `h += wave(p, vec2<f32>(dx, dz), k, amplitude, speed, phase);`
fn parse_wave_line(line: &str) -> Vec<f32> {
    line.trim()
        .trim_start_matches("h += wave(p,")
        .replace("vec2<f32>", "")
        .split(|c: char| "(), ;".contains(c))
        .filter(|s| !s.is_empty())
        .map(|s| s.parse::<f32>().unwrap_or_else(|e| panic!("bad literal {s:?}: {e}")))
        .collect()
}

#[test]
fn height_stage_wave_table_matches_cpu_table() {
    let source = read_shader("water_height.wgsl");
    let rows: Vec<Vec<f32>> = source
        .lines()
        .filter(|l| l.trim_start().starts_with("h += wave("))
        .map(parse_wave_line)
        .collect();
    assert_eq!(rows.len(), WAVES.len());

    for (row, wave) in rows.iter().zip(WAVES.iter()) {
        let expected = [
            wave.direction[0],
            wave.direction[1],
            wave.wavenumber,
            wave.amplitude,
            wave.speed,
            wave.phase,
        ];
        assert_eq!(row.as_slice(), expected.as_slice());
    }
}
