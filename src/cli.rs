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
use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(version)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

fn parse_run_date(
    s: &str,
) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s, "%Y%m%d").map_err(|e| format!("'{}' is not a YYYYMMDD date: {}", s, e))
}

#[derive(Subcommand)]
pub enum Commands {
    // Write a samplesheet from JSON
    JsonToCsv {
        // Input JSON file, `-` for stdin
        #[arg(group = "input", required = true, help = "Input JSON")]
        input_file: PathBuf,

        // Output samplesheet, `-` for stdout
        #[arg(required = true, help = "Output samplesheet")]
        output_file: PathBuf,

        // Verbosity
        #[arg(long = "verbose", default_value_t = false)]
        verbose: bool,
    },

    // Read a samplesheet into JSON
    CsvToJson {
        // Input samplesheet
        #[arg(group = "input", required = true, help = "Input samplesheet")]
        input_file: PathBuf,

        // Output JSON file
        #[arg(required = true, help = "Output JSON")]
        output_file: PathBuf,

        // Verbosity
        #[arg(long = "verbose", default_value_t = false)]
        verbose: bool,
    },

    // Read RunInfo.xml into JSON
    XmlToJson {
        // Input RunInfo.xml
        #[arg(group = "input", required = true, help = "Input RunInfo.xml")]
        input_file: PathBuf,

        // Output JSON file
        #[arg(required = true, help = "Output JSON")]
        output_file: PathBuf,

        // Keep RunInfo.Run.FlowcellLayout
        #[arg(long = "keep-flowcell-layout", default_value_t = false)]
        keep_flowcell_layout: bool,

        // Verbosity
        #[arg(long = "verbose", default_value_t = false)]
        verbose: bool,
    },

    // Write RunInfo.xml from JSON
    JsonToXml {
        // Input JSON file
        #[arg(group = "input", required = true, help = "Input JSON")]
        input_file: PathBuf,

        // Output RunInfo.xml
        #[arg(required = true, help = "Output RunInfo.xml")]
        output_file: PathBuf,

        // Fill in a minimal document from the run id
        #[arg(long = "complete", default_value_t = false)]
        complete: bool,

        // Verbosity
        #[arg(long = "verbose", default_value_t = false)]
        verbose: bool,
    },

    // Create RunInfo.xml from a samplesheet
    CsvToXml {
        // Input samplesheet
        #[arg(group = "input", required = true, help = "Input samplesheet")]
        input_file: PathBuf,

        // Output RunInfo.xml
        #[arg(required = true, help = "Output RunInfo.xml")]
        output_file: PathBuf,

        // Run id, e.g. 240229_A01052_0184_AHNVH5DMXY
        #[arg(long = "run-id", required = true)]
        run_id: String,

        // Fields derived from the run id unless given
        #[arg(long = "run-number", required = false)]
        run_number: Option<u32>,

        #[arg(long = "flowcell", required = false)]
        flowcell: Option<String>,

        #[arg(long = "instrument", required = false)]
        instrument: Option<String>,

        #[arg(long = "date", required = false, value_parser = parse_run_date, help = "Run date as YYYYMMDD")]
        date: Option<NaiveDate>,

        #[arg(long = "align-to-phix", default_value_t = false)]
        align_to_phix: bool,

        // Verbosity
        #[arg(long = "verbose", default_value_t = false)]
        verbose: bool,
    },
}
