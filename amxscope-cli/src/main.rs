mod app;

use std::{fs, io::BufWriter, io::Write};

use anyhow::Context;
use clap::Parser;

use crate::app::Cli;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Listing goes to the output file, diagnostics to stderr; RUST_LOG overrides.
    let level = if cli.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };
    env_logger::Builder::new()
        .filter_module("amxscope", level)
        .filter_module("amxdasm", level)
        .parse_default_env()
        .target(env_logger::Target::Stderr)
        .format_timestamp(None)
        .format_module_path(false)
        .format_target(false)
        .init();

    let output = cli
        .output
        .clone()
        .unwrap_or_else(|| cli.input.with_extension("lst"));

    let module = amxscope::AmxModule::from_file(&cli.input)
        .with_context(|| format!("unable to load module \"{}\"", cli.input.display()))?;
    log::debug!(
        "loaded module \"{}\": {} bytes of code, debug info {}",
        module.header().name,
        module.header().code_size(),
        if module.debug_info().is_some() {
            "present"
        } else {
            "absent"
        }
    );

    let mut writer = BufWriter::new(
        fs::File::create(&output)
            .with_context(|| format!("unable to create output file \"{}\"", output.display()))?,
    );
    amxscope::Disassembler::new(&module, &mut writer)
        .run()
        .with_context(|| format!("failed to disassemble \"{}\"", cli.input.display()))?;
    writer
        .flush()
        .with_context(|| format!("unable to write output file \"{}\"", output.display()))?;

    log::info!("listing written to \"{}\"", output.display());
    Ok(())
}
