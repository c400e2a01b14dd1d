// v2-samplesheet-maker: Conversion between Illumina v2 samplesheets, JSON and RunInfo.xml.
//
// Copyright 2025 Tommi Mäklin [tommi@maklin.fi].
//
// Copyrights in this project are retained by contributors. No copyright assignment
// is required to contribute to this project.
//
// Except as otherwise noted (below and/or in individual files), this
// project is licensed under the Apache License, Version 2.0
// <LICENSE-APACHE> or <http://www.apache.org/licenses/LICENSE-2.0> or
// the MIT license, <LICENSE-MIT> or <http://opensource.org/licenses/MIT>,
// at your option.
//
use std::io::Cursor;
use std::path::Path;

use clap::Parser;

use v2_samplesheet_maker::files;
use v2_samplesheet_maker::run_info::RunOptions;

mod cli;

type E = Box<dyn std::error::Error>;

/// Initializes the logger with verbosity given in `log_max_level`.
fn init_log(log_max_level: usize) {
    if let Err(e) = stderrlog::new()
        .module(module_path!())
        .quiet(false)
        .verbosity(log_max_level)
        .timestamp(stderrlog::Timestamp::Off)
        .init() {
        eprintln!("Failed to initialize logging: {}", e);
    }
}

/// Check both paths, run `convert` on the input and write its output.
fn run<F>(
    input_file: &Path,
    output_file: &Path,
    convert: F,
) -> Result<(), E>
where
    F: FnOnce(&mut Cursor<Vec<u8>>, &mut Vec<u8>) -> Result<(), E>,
{
    files::check_input(input_file)?;
    files::check_output(output_file)?;

    let mut conn_in = Cursor::new(files::read_input(input_file)?);
    let mut bytes: Vec<u8> = Vec::new();
    convert(&mut conn_in, &mut bytes)?;

    files::write_output(output_file, &bytes)?;
    log::info!("Wrote {}", output_file.display());
    Ok(())
}

fn main() {
    let cli = cli::Cli::parse();

    // Subcommands:
    let res = match &cli.command {
        // JSON to samplesheet
        cli::Commands::JsonToCsv {
            input_file,
            output_file,
            verbose,
        } => {
            init_log(if *verbose { 2 } else { 1 });
            run(input_file, output_file, |conn_in, conn_out| {
                v2_samplesheet_maker::json_to_samplesheet(conn_in, conn_out)
            })
        },

        // Samplesheet to JSON
        cli::Commands::CsvToJson {
            input_file,
            output_file,
            verbose,
        } => {
            init_log(if *verbose { 2 } else { 1 });
            run(input_file, output_file, |conn_in, conn_out| {
                v2_samplesheet_maker::samplesheet_to_json(conn_in, conn_out)
            })
        },

        // RunInfo.xml to JSON
        cli::Commands::XmlToJson {
            input_file,
            output_file,
            keep_flowcell_layout,
            verbose,
        } => {
            init_log(if *verbose { 2 } else { 1 });
            run(input_file, output_file, |conn_in, conn_out| {
                v2_samplesheet_maker::run_info_xml_to_json(conn_in, conn_out, *keep_flowcell_layout)
            })
        },

        // JSON to RunInfo.xml
        cli::Commands::JsonToXml {
            input_file,
            output_file,
            complete,
            verbose,
        } => {
            init_log(if *verbose { 2 } else { 1 });
            run(input_file, output_file, |conn_in, conn_out| {
                v2_samplesheet_maker::run_info_json_to_xml(conn_in, conn_out, *complete)
            })
        },

        // Samplesheet to RunInfo.xml
        cli::Commands::CsvToXml {
            input_file,
            output_file,
            run_id,
            run_number,
            flowcell,
            instrument,
            date,
            align_to_phix,
            verbose,
        } => {
            init_log(if *verbose { 2 } else { 1 });
            let opts = RunOptions {
                run_id: run_id.clone(),
                run_number: *run_number,
                flowcell: flowcell.clone(),
                instrument: instrument.clone(),
                date: *date,
                align_to_phix: *align_to_phix,
            };
            run(input_file, output_file, |conn_in, conn_out| {
                v2_samplesheet_maker::samplesheet_to_run_info_xml(conn_in, conn_out, &opts)
            })
        },
    };

    if let Err(e) = res {
        log::error!("{}", e);
        std::process::exit(1);
    }
}
