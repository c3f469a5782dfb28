mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use log::info;
use std::fs::File;
use std::io::BufWriter;

use cmnet::config::{ReferenceConfig, ReferenceTables};
use cmnet::io;
use cmnet::pipeline::{self, References};
use cmnet::{ModelLevel, TaxonomicLevel};

use crate::cli::{Cli, Commands, MarkpCommand, TaxaCommand};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    let mut builder = env_logger::Builder::from_default_env();
    if let Some(log_file) = cli.log_file {
        let file = File::create(log_file)?;
        builder.target(env_logger::Target::Pipe(Box::new(file)));
    }
    if cli.verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.init();

    // Set up parallel processing
    if let Some(threads) = cli.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
            .context("Failed to initialize thread pool")?;
    }

    match cli.command {
        Commands::Markp(markp_cmd) => handle_markp_command(markp_cmd)?,
        Commands::Taxa(taxa_cmd) => handle_taxa_command(taxa_cmd)?,
    }

    Ok(())
}

fn handle_markp_command(cmd: MarkpCommand) -> Result<()> {
    let level = ModelLevel::try_from(TaxonomicLevel::from(cmd.model))?;

    let explicit = ReferenceTables {
        copy_number: cmd.copy_number,
        model_function: cmd.model_function,
        function_group: cmd.function_group,
    };
    let tables = match &cmd.references {
        Some(path) => explicit.or(ReferenceConfig::from_file(path)?.tables(level).clone()),
        None => explicit,
    };

    let output_dir = io::make_output_dir(&cmd.output, cmd.strict)?;

    // Load tables
    let otutab = io::read_seqabun(&cmd.otutab)?;
    let taxtab = io::read_taxatable(&cmd.taxonomy, cmd.taxonomy_format.dialect())?;
    let references = References::load(&tables)?;

    let outputs = pipeline::run(&otutab, &taxtab, level, &references)
        .with_context(|| format!("Failed to calculate {} abundance", level))?;

    io::write_table_file(&outputs.model, output_dir.join("model.tsv"))?;
    io::write_table_file(&outputs.normalized, output_dir.join("model_normalized.tsv"))?;
    if let Some(function) = &outputs.function {
        io::write_table_file(function, output_dir.join("function.tsv"))?;
    }
    if let Some(group) = &outputs.group {
        io::write_table_file(group, output_dir.join("group.tsv"))?;
    }

    info!("Results written to {}", output_dir.display());
    Ok(())
}

fn handle_taxa_command(cmd: TaxaCommand) -> Result<()> {
    let taxtab = io::read_taxatable(&cmd.taxonomy, cmd.taxonomy_format.dialect())?;

    match cmd.output {
        Some(path) => {
            let file = File::create(&path)
                .with_context(|| format!("Failed to create file: {}", path.display()))?;
            io::write_taxatable(&taxtab, BufWriter::new(file))?;
            info!("Wrote taxonomy for {} entities to {}", taxtab.len(), path.display());
        }
        None => io::write_taxatable(&taxtab, std::io::stdout().lock())?,
    }

    Ok(())
}
