//! graft demo driver.

mod cli;

use clap::Parser;
use cli::{Cli, Command, RunArgs};
use graft::passes::{FixpointConfig, PassRegistry, PipelineOptions, skeleton};
use graft::{Result, ir, logging, sample};

fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let result = match cli.command {
        Command::Run(args) => run(args),
        Command::Passes => list_passes(),
    };
    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

fn registry() -> Result<PassRegistry> {
    let mut registry = PassRegistry::new();
    skeleton::register(&mut registry)?;
    Ok(registry)
}

fn run(args: RunArgs) -> Result<()> {
    let registry = registry()?;
    let options = PipelineOptions {
        outcome: args.scan.into(),
        fixpoint: args.fixpoint.then_some(FixpointConfig {
            max_iterations: args.max_iterations,
        }),
    };
    let mut pipeline = match &args.passes {
        Some(text) => registry.parse_pipeline(text, &options)?,
        None => registry.build_pipeline(&options),
    };

    let mut module = sample::binop_chain(&args.ops)?;
    println!("; before");
    print!("{module}");

    let report = pipeline.run(&mut module)?;

    println!("\n; after");
    print!("{module}");
    println!();
    for record in &report.passes {
        println!("; {}: {}", record.name, record.verdict);
    }
    println!("; pipeline: {}", report.preserved);

    let integrity = ir::validate_module(&module);
    if !integrity.is_ok() {
        tracing::warn!("{integrity}");
    }
    Ok(())
}

fn list_passes() -> Result<()> {
    let registry = registry()?;
    for plugin in registry.plugins() {
        println!(
            "{} {} (api v{})",
            plugin.name, plugin.version, plugin.api_version
        );
    }
    for name in registry.pass_names() {
        println!("  {name}");
    }
    Ok(())
}
