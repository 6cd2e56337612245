use crate::core::configuration::Configuration;
use crate::core::models::topology::Topology;
use crate::engine::config::HullConfig;
use crate::engine::error::EngineError;
use crate::engine::progress::{Progress, ProgressReporter};
use tracing::{info, instrument};

/// Returns a copy of `state` whose boundary is the convex hull of its object
/// centres, grown around every atom when `config.expand` is set.
///
/// A topology named in `config` replaces the one `state` carries.
#[instrument(skip_all, name = "hull_workflow")]
pub fn run(
    state: &Configuration,
    config: &HullConfig,
    reporter: &ProgressReporter,
) -> Result<Configuration, EngineError> {
    reporter.report(Progress::PhaseStart {
        name: "Convex Hull",
    });
    let mut result = state.clone();
    if let Some(path) = &config.topology_path {
        result.add_topology(Topology::load(path)?);
    }
    result.check_resources(None)?;

    let hull = result.convex_hull(config.expand)?;
    info!(
        vertices = hull.n_vertex(),
        area = hull.area(),
        expand = config.expand,
        "Convex hull computed."
    );
    result.set_poly(hull);
    reporter.report(Progress::PhaseFinish);
    Ok(result)
}
