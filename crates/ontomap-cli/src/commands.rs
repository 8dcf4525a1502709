use anyhow::{Context, Result, bail};
use serde::Serialize;
use tracing::{info, info_span};

use ontomap_cli::input::load_queries;
use ontomap_cli::reference::{FileReference, ReferenceSpec, RegistryReference, open_registry};
use ontomap_cli::summary::{print_inspect, print_search, print_sources, print_standardize};
use ontomap_map::{Entity, Scorer, TieBreak};
use ontomap_model::QueryBatch;

use crate::cli::{
    InspectArgs, QueryArgs, ReferenceArgs, ScorerArg, SearchArgs, SourcesArgs, StandardizeArgs,
    TieBreakArg,
};

pub fn run_inspect(args: &InspectArgs) -> Result<()> {
    let entity = open_reference(&args.reference)?;
    let queries = queries_from(&args.queries)?;
    let span = info_span!("inspect", entity = %entity.config().entity, field = %args.field);
    let _guard = span.enter();

    let mut options = entity.inspect_options();
    if args.case_insensitive {
        options = options.with_case_sensitive(false);
    }
    let outcome = entity
        .inspect_with(&queries, &args.field, &options)
        .with_context(|| format!("inspect field '{}'", args.field))?;
    info!(summary = %outcome.report.summary(), "inspected");

    if args.json {
        print_json(&outcome)
    } else {
        print_inspect(&outcome);
        Ok(())
    }
}

pub fn run_standardize(args: &StandardizeArgs) -> Result<()> {
    let entity = open_reference(&args.reference)?;
    let queries = queries_from(&args.queries)?;
    let span = info_span!("standardize", entity = %entity.config().entity, field = %args.field);
    let _guard = span.enter();

    let mut options = entity.standardize_options().with_tie_break(tie_break(args.tie_break));
    if args.no_synonyms {
        options.synonyms_field = None;
    }
    if args.case_insensitive {
        options = options.with_case_sensitive(false);
    }
    if let Some(field) = &args.return_field {
        options = options.with_return_field(field.as_str());
    }
    let outcome = entity
        .standardize_with(&queries, &args.field, &options)
        .with_context(|| format!("standardize onto field '{}'", args.field))?;
    info!(
        summary = %outcome.report.summary(),
        ambiguous = outcome.ambiguities.len(),
        "standardized"
    );

    if args.json {
        print_json(&outcome)
    } else {
        print_standardize(&outcome);
        Ok(())
    }
}

pub fn run_search(args: &SearchArgs) -> Result<()> {
    let entity = open_reference(&args.reference)?;
    let span = info_span!("search", entity = %entity.config().entity, field = %args.field);
    let _guard = span.enter();

    let mut options = entity
        .search_options()
        .with_scorer(scorer(args.scorer))
        .with_case_sensitive(args.case_sensitive);
    options = if args.best {
        options.best_match()
    } else {
        options.with_limit(args.limit)
    };
    if args.no_synonyms {
        options.synonyms_field = None;
    }
    if let Some(min_score) = args.min_score {
        options = options.with_min_score(min_score);
    }
    let hits = entity
        .search_with(&args.query, &args.field, &options)
        .with_context(|| format!("search field '{}'", args.field))?;

    if args.json {
        print_json(&hits)
    } else {
        print_search(&args.query, &hits);
        Ok(())
    }
}

pub fn run_sources(args: &SourcesArgs) -> Result<()> {
    let (registry, summary) = open_registry(args.sources.as_deref())?;
    let sources: Vec<_> = registry
        .sources()
        .iter()
        .filter(|source| {
            args.entity
                .as_deref()
                .is_none_or(|entity| source.entity == entity)
        })
        .collect();
    if let Some(entity) = &args.entity
        && sources.is_empty()
    {
        bail!(
            "no source registered for entity '{entity}' in {}",
            summary.sources_dir.display()
        );
    }

    if args.json {
        print_json(&sources)
    } else {
        print_sources(&summary, &sources);
        Ok(())
    }
}

fn open_reference(args: &ReferenceArgs) -> Result<Entity> {
    reference_spec(args)?.open()
}

fn reference_spec(args: &ReferenceArgs) -> Result<ReferenceSpec> {
    if let Some(path) = &args.reference {
        let id_field = args
            .id_field
            .clone()
            .context("--id-field is required with --reference")?;
        return Ok(ReferenceSpec::File(FileReference {
            path: path.clone(),
            id_field,
            synonyms_field: args.synonyms_field.clone(),
            delimiter: args.delimiter.clone(),
            list_fields: args.list_fields.clone(),
        }));
    }
    let Some(entity) = &args.entity else {
        bail!("either --reference or --entity is required");
    };
    Ok(ReferenceSpec::Registry(RegistryReference {
        sources: args.sources.clone(),
        entity: entity.clone(),
        source: args.source.clone(),
        version: args.source_version.clone(),
    }))
}

fn queries_from(args: &QueryArgs) -> Result<QueryBatch> {
    load_queries(&args.queries, args.input.as_deref(), args.column.as_deref())
}

fn tie_break(arg: TieBreakArg) -> TieBreak {
    match arg {
        TieBreakArg::Shortest => TieBreak::Shortest,
        TieBreakArg::First => TieBreak::First,
        TieBreakArg::Last => TieBreak::Last,
        TieBreakArg::Unresolved => TieBreak::Unresolved,
    }
}

fn scorer(arg: ScorerArg) -> Scorer {
    match arg {
        ScorerArg::Ratio => Scorer::Ratio,
        ScorerArg::JaroWinkler => Scorer::JaroWinkler,
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("serialize output")?;
    println!("{json}");
    Ok(())
}
