use crate::core::io::source_model::{DefaultConverter, parse_source_model_file};
use crate::core::logictree::gsim::GsimLogicTree;
use crate::core::logictree::source::SourceModelRealization;
use crate::core::models::source_model::SourceModel;
use crate::core::sources::split::MeshSplitter;
use crate::engine::assoc::RealizationAssociation;
use crate::engine::composite::{CompositeSourceModel, assign_group_ids};
use crate::engine::config::BuildConfig;
use crate::engine::error::EngineError;
use crate::engine::progress::{Progress, ProgressReporter};
use tracing::{info, instrument};

#[derive(Debug, Clone)]
pub struct BuildResult {
    pub composite: CompositeSourceModel<GsimLogicTree>,
    pub association: RealizationAssociation,
}

#[instrument(skip_all, name = "build_workflow")]
pub fn run(config: &BuildConfig, reporter: &ProgressReporter) -> Result<BuildResult, EngineError> {
    // === Phase 1: Source-model logic tree ===
    let smlt = config.source_model_lt()?;
    let sm_rlzs = reporter.phase("Selecting Source Models", || smlt.realizations())?;
    info!(
        num_source_models = sm_rlzs.len(),
        sampling = config.is_sampling(),
        "Source-model logic tree processed."
    );

    // === Phase 2: Read and split the source models ===
    let mut source_models = load_source_models(config, &sm_rlzs, reporter)?;

    // === Phase 3: Assemble the composite model ===
    assign_group_ids(&mut source_models);
    let mut composite = CompositeSourceModel::new(
        config.logic_tree.random_seed,
        config.logic_tree.number_of_logic_tree_samples,
        source_models,
    )?;

    // === Phase 4: Realizations ===
    let association = reporter.phase("Building Realizations", || composite.build_association())?;
    for diagnostic in association.diagnostics() {
        reporter.report(Progress::Message(diagnostic.to_string()));
    }

    info!(
        "Workflow complete. {} realization(s) over {} source model(s).",
        association.realizations().len(),
        composite.len()
    );
    Ok(BuildResult {
        composite,
        association,
    })
}

fn load_source_models(
    config: &BuildConfig,
    sm_rlzs: &[SourceModelRealization],
    reporter: &ProgressReporter,
) -> Result<Vec<SourceModel<GsimLogicTree>>, EngineError> {
    reporter.report(Progress::PhaseStart {
        name: "Reading Source Models",
    });
    reporter.report(Progress::TaskStart {
        total_steps: sm_rlzs.len() as u64,
    });

    let mut source_models = Vec::with_capacity(sm_rlzs.len());
    for (ordinal, sm_rlz) in sm_rlzs.iter().enumerate() {
        let path = config.base_path.join(&sm_rlz.file);
        let mut groups = parse_source_model_file(&path, &DefaultConverter, |_| {})?;
        for group in &mut groups {
            group.split_and_recount(config.area_source_discretization, &MeshSplitter);
        }

        let sm = SourceModel::new(
            &sm_rlz.name,
            sm_rlz.weight,
            sm_rlz.path.clone(),
            groups,
            config.gsim_logic_tree.clone(),
            ordinal,
            sm_rlz.samples,
        );
        reporter.report(Progress::SourceModelLoaded {
            ordinal,
            name: sm.name.clone(),
            num_sources: sm.num_sources(),
        });
        reporter.report(Progress::TaskIncrement);
        source_models.push(sm);
    }

    reporter.report(Progress::TaskFinish);
    reporter.report(Progress::PhaseFinish);
    Ok(source_models)
}
