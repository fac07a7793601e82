//! End-to-end CLI workflow through the command functions.
//!
//! Run with: cargo test -p survey-cli --test workflow_test

use std::fs;
use std::path::PathBuf;
use survey_cli::commands::{
    elevation::{self, ElevationArgs},
    export::{self, ExportArgs},
    init::{self, CrsArg, InitArgs},
    params::{self, ParamsArgs},
    preview::{self, PreviewArgs},
    selection::{self, DeselectArgs, SelectArgs},
    CellTarget,
};
use survey_cli::{Config, OpenProject};

fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("survey-cli-{}-{}", name, std::process::id()));
    fs::create_dir_all(&dir).unwrap();
    dir
}

fn at(col: u32, row: u32) -> CellTarget {
    CellTarget {
        col: Some(col),
        row: Some(row),
        ..CellTarget::default()
    }
}

fn select_args(project: &PathBuf, target: CellTarget) -> SelectArgs {
    SelectArgs {
        project: project.clone(),
        target,
        rect: None,
        vertices: Vec::new(),
        toggle: false,
    }
}

#[test]
fn test_plan_survey_end_to_end() {
    let dir = scratch_dir("workflow");
    let project = dir.join("survey.json");
    let config = Config::default();

    init::run(
        InitArgs {
            project: project.clone(),
            crs: CrsArg::Projected,
            origin: [0.0, 0.0],
            cols: 4,
            rows: 4,
            cell_size_m: Some(500.0),
            force: true,
        },
        &config,
    )
    .unwrap();

    for (col, row) in [(0, 0), (1, 0), (0, 1), (1, 1)] {
        selection::select(select_args(&project, at(col, row)), &config).unwrap();
    }
    // polygon covering the third column, bottom row
    let mut area = select_args(&project, CellTarget::default());
    area.vertices = vec![[1_100.0, 100.0], [1_400.0, 100.0], [1_400.0, 400.0], [1_100.0, 400.0]];
    selection::select(area, &config).unwrap();

    elevation::run(
        ElevationArgs {
            project: project.clone(),
            target: at(0, 0),
            min: Some(120.0),
            max: Some(400.0),
            clear: false,
        },
        &config,
    )
    .unwrap();

    params::run(
        ParamsArgs {
            project: project.clone(),
            sensor_width_px: None,
            sensor_height_px: None,
            pixel_pitch_um: None,
            focal_length_mm: None,
            image_scale: Some(20_000.0),
            forward_overlap_pct: None,
            side_overlap_pct: None,
            speed_kmh: None,
            airport: None,
            no_airport: false,
        },
        &config,
    )
    .unwrap();

    let mut open = OpenProject::load(&project).unwrap();
    let engine = &mut open.project.engine;
    assert_eq!(engine.len(), 5);
    assert_eq!(engine.flight_parameters().image_scale, 20_000.0);
    assert_eq!(engine.selected_area_m2(), 5.0 * 250_000.0);
    assert_eq!(engine.merged_outline().len(), 1);
    let first = engine.cells().next().unwrap().id.clone();
    let terrain = engine.cell_terrain(&first).unwrap();
    assert_eq!(terrain.result().unwrap().absolute_height, 2_240.0 + 260.0);

    let geojson = dir.join("survey.geojson");
    export::run(
        ExportArgs {
            project: project.clone(),
            out: Some(geojson.clone()),
        },
        &config,
    )
    .unwrap();
    let exported: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&geojson).unwrap()).unwrap();
    assert_eq!(exported["type"], "FeatureCollection");
    assert_eq!(exported["features"].as_array().unwrap().len(), 6);

    let svg = dir.join("survey.svg");
    preview::run(PreviewArgs {
        project: project.clone(),
        out: svg.clone(),
        size_px: 400.0,
    })
    .unwrap();
    assert!(fs::read_to_string(&svg).unwrap().contains("<polygon"));

    selection::deselect(
        DeselectArgs {
            project: project.clone(),
            target: at(1, 1),
        },
        &config,
    )
    .unwrap();
    assert_eq!(OpenProject::load(&project).unwrap().project.engine.len(), 4);

    fs::remove_dir_all(&dir).ok();
}

#[test]
fn test_init_refuses_to_overwrite() {
    let dir = scratch_dir("overwrite");
    let project = dir.join("survey.json");
    let config = Config::default();
    let args = || InitArgs {
        project: project.clone(),
        crs: CrsArg::Geographic,
        origin: [20.0, 45.0],
        cols: 2,
        rows: 2,
        cell_size_m: None,
        force: false,
    };

    init::run(args(), &config).unwrap();
    let err = init::run(args(), &config).unwrap_err();
    assert!(err.to_string().contains("already exists"));

    fs::remove_dir_all(&dir).ok();
}

#[test]
fn test_invalid_params_leave_project_untouched() {
    let dir = scratch_dir("params");
    let project = dir.join("survey.json");
    let config = Config::default();
    init::run(
        InitArgs {
            project: project.clone(),
            crs: CrsArg::Projected,
            origin: [0.0, 0.0],
            cols: 2,
            rows: 2,
            cell_size_m: Some(100.0),
            force: true,
        },
        &config,
    )
    .unwrap();
    let before = fs::read_to_string(&project).unwrap();

    let result = params::run(
        ParamsArgs {
            project: project.clone(),
            sensor_width_px: None,
            sensor_height_px: None,
            pixel_pitch_um: None,
            focal_length_mm: Some(-1.0),
            image_scale: None,
            forward_overlap_pct: None,
            side_overlap_pct: None,
            speed_kmh: None,
            airport: None,
            no_airport: false,
        },
        &config,
    );
    assert!(result.is_err());
    assert_eq!(fs::read_to_string(&project).unwrap(), before);

    fs::remove_dir_all(&dir).ok();
}

#[test]
fn test_params_can_remove_the_airport() {
    let dir = scratch_dir("airport");
    let project = dir.join("survey.json");
    let config = Config::default();
    init::run(
        InitArgs {
            project: project.clone(),
            crs: CrsArg::Geographic,
            origin: [20.0, 45.0],
            cols: 2,
            rows: 2,
            cell_size_m: None,
            force: true,
        },
        &config,
    )
    .unwrap();

    let params_args = |airport: Option<[f64; 2]>, no_airport: bool| ParamsArgs {
        project: project.clone(),
        sensor_width_px: None,
        sensor_height_px: None,
        pixel_pitch_um: None,
        focal_length_mm: None,
        image_scale: None,
        forward_overlap_pct: None,
        side_overlap_pct: None,
        speed_kmh: None,
        airport,
        no_airport,
    };

    params::run(params_args(Some([45.5, 20.5]), false), &config).unwrap();
    let open = OpenProject::load(&project).unwrap();
    assert!(open.project.engine.flight_parameters().airport.is_some());

    params::run(params_args(None, true), &config).unwrap();
    let open = OpenProject::load(&project).unwrap();
    assert_eq!(open.project.engine.flight_parameters().airport, None);

    fs::remove_dir_all(&dir).ok();
}
