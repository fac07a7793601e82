pub mod dissolve;
pub mod engine;
pub mod error;
pub mod export;
pub mod geometry;
pub mod grid;
pub mod mission;
pub mod models;
pub mod persistence;
pub mod photogrammetry;
pub mod style;
pub mod terrain;
pub mod units;

pub use dissolve::dissolve;
pub use engine::{CellView, SurveyEngine, SurveySink};
pub use error::{
    DissolveError, EngineError, InvalidElevationRange, InvalidParameterError, MalformedCellError,
    PersistError,
};
pub use export::{Feature, FeatureCollection, Geometry};
pub use geometry::{area_m2, contains_point, extent, Extent};
pub use grid::{GridIndex, SurveyGrid};
pub use mission::{plan_mission, MissionPlan};
pub use models::{
    AirportLocation, CellElevation, CellId, CellRing, CellShape, CellTerrain, CoordinateSystem,
    DerivedFootprint, FlightParameters, FlightParametersUpdate, GridCell, ReliefType, Ring,
    TerrainResult,
};
pub use persistence::{
    deserialize, serialize, CellRecord, LoadReport, ShapeKind, SurveyProject, SurveyRecord,
    RECORD_VERSION,
};
pub use photogrammetry::compute_footprint;
pub use style::StyleSettings;
pub use terrain::{compute_terrain, TerrainSummary};
