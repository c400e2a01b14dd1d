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

//! v2-samplesheet-maker is a library and a command-line client for:
//!
//!   - Converting Illumina v2 samplesheets between the sectioned text format
//!     (SampleSheet.csv) and JSON.
//!   - Converting RunInfo.xml to JSON and back.
//!   - Creating a RunInfo.xml from a samplesheet and a run id.
//!
//! Samplesheets are validated on every conversion. Each section is checked
//! against a fixed field schema, pipeline URNs in the per-tool settings are
//! collected into `[Cloud_Settings]`, and `[Cloud_Data]` is filled in from
//! the per-tool sample rows when it is not given.
//!
//! The following sections are supported:
//!   - `[Header]`, `[Reads]` and `[Sequencing]`
//!   - [BCLConvert](https://support-docs.illumina.com/SW/dragen_v42/Content/SW/DRAGEN/SampleSheet.htm)
//!     `[BCLConvert_Settings]` and `[BCLConvert_Data]`
//!   - TSO500 liquid and solid, `[TSO500L_*]` and `[TSO500S_*]`, with their
//!     `[Cloud_*]` variants
//!   - [Cloud auto-launch](https://help.ica.illumina.com/sequencer-integration/analysis_autolaunch)
//!     `[Cloud_Settings]` and `[Cloud_Data]`
//!
//! ## Usage
//!
//! ### Command line
//!
//! The v2-samplesheet-maker CLI supports the following subcommands:
//!   - `v2-samplesheet-maker json-to-csv` write a samplesheet from JSON.
//!   - `v2-samplesheet-maker csv-to-json` read a samplesheet into JSON.
//!   - `v2-samplesheet-maker xml-to-json` read RunInfo.xml into JSON.
//!   - `v2-samplesheet-maker json-to-xml` write RunInfo.xml from JSON.
//!   - `v2-samplesheet-maker csv-to-xml` create RunInfo.xml from a samplesheet.
//!
//! Every subcommand takes an input and an output path, `-` reads from stdin
//! or writes to stdout.
//!
//! ### Rust API
//!
//! The API provides several functions for converting between structs that
//! implement [Read] and [Write]. These are meant for converting a whole
//! document at a time.
//!
//! For access to the validated contents, the following are provided:
//!
//!   - [Parser](parser::Parser): takes a [Read] and assembles a [SampleSheet](samplesheet::SampleSheet) or a nested value from it.
//!   - [SampleSheet](samplesheet::SampleSheet): the validated sections in canonical order.
//!   - [Printer](printer::Printer): takes a [SampleSheet](samplesheet::SampleSheet) and formats it as text or JSON.
//!   - [run_info]: functions for building and completing RunInfo documents.
//!
//! See documentation for the appropriate functions or structs for usage examples.
//!

use parser::Parser;
use printer::Printer;
use printer::json::format_json;
use printer::xml::format_xml;
use run_info::RunOptions;
use samplesheet::SampleSheet;

use std::io::Read;
use std::io::Write;

pub mod files;
pub mod parser;
pub mod printer;
pub mod registry;
pub mod run_info;
pub mod samplesheet;
pub mod schema;
pub mod sections;

type E = Box<dyn std::error::Error>;

/// Supported document formats.
#[non_exhaustive]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Format {
    /// Sectioned samplesheet text.
    #[default]
    Text,
    Json,
    Xml,
}

impl std::fmt::Display for Format {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Format::Text => write!(f, "text"),
            Format::Json => write!(f, "JSON"),
            Format::Xml => write!(f, "XML"),
        }
    }
}

fn print_samplesheet<W: Write>(
    samplesheet: &SampleSheet,
    format: Format,
    conn_out: &mut W,
) -> Result<(), E> {
    let printer = Printer::new(samplesheet, format)?;
    for block in printer {
        conn_out.write_all(&block)?;
    }
    conn_out.flush()?;
    Ok(())
}

/// Convert a samplesheet from the text format to JSON.
///
/// ## Errors
///
/// Returns the first error met while reading or validating the input,
/// nothing is written to `conn_out` in that case.
///
/// ## Usage
///
/// ```rust
/// use v2_samplesheet_maker::samplesheet_to_json;
/// use std::io::Cursor;
///
/// let mut input: Vec<u8> = Vec::new();
/// input.append(&mut b"[Header]\n".to_vec());
/// input.append(&mut b"FileFormatVersion,2\n".to_vec());
/// input.append(&mut b"\n".to_vec());
/// input.append(&mut b"[Reads]\n".to_vec());
/// input.append(&mut b"Read1Cycles,151\n".to_vec());
///
/// let mut output: Vec<u8> = Vec::new();
/// samplesheet_to_json(&mut Cursor::new(input), &mut output).unwrap();
///
/// let expected = "{\n  \"header\": {\n    \"file_format_version\": 2\n  },\n  \"reads\": {\n    \"read_1_cycles\": 151\n  }\n}\n";
/// assert_eq!(String::from_utf8(output).unwrap(), expected);
/// ```
///
pub fn samplesheet_to_json<R: Read, W: Write>(
    conn_in: &mut R,
    conn_out: &mut W,
) -> Result<(), E> {
    let samplesheet = Parser::with_format(conn_in, Format::Text)?.read_samplesheet()?;
    print_samplesheet(&samplesheet, Format::Json, conn_out)
}

/// Convert a samplesheet from JSON to the text format.
///
/// ## Usage
///
/// ```rust
/// use v2_samplesheet_maker::json_to_samplesheet;
/// use std::io::Cursor;
///
/// let input = br#"{
///     "header": {"file_format_version": 2},
///     "reads": {"read_1_cycles": 151, "index_1_cycles": 10},
///     "bclconvert_settings": {"software_version": "4.2.7", "urn": "urn:ica:pipeline:abc"},
///     "bclconvert_data": [
///         {"sample_id": "MyFirstSample", "index": "AAAAAAAAAA"},
///         {"sample_id": "MySecondSample", "index": "GGGGGGGGGG"}
///     ]
/// }"#.to_vec();
///
/// let mut output: Vec<u8> = Vec::new();
/// json_to_samplesheet(&mut Cursor::new(input), &mut output).unwrap();
///
/// let mut expected = String::new();
/// expected += "[Header]\nFileFormatVersion,2\n\n";
/// expected += "[Reads]\nRead1Cycles,151\nIndex1Cycles,10\n\n";
/// expected += "[BCLConvert_Settings]\nSoftwareVersion,4.2.7\n\n";
/// expected += "[BCLConvert_Data]\nSample_ID,index\nMyFirstSample,AAAAAAAAAA\nMySecondSample,GGGGGGGGGG\n\n";
/// expected += "[Cloud_Settings]\nCloud_Workflow,ica_workflow_1\nBCLConvert_Pipeline,urn:ica:pipeline:abc\n\n";
/// expected += "[Cloud_Data]\nSample_ID,LibraryName\nMyFirstSample,MyFirstSample_AAAAAAAAAA\nMySecondSample,MySecondSample_GGGGGGGGGG\n";
///
/// assert_eq!(String::from_utf8(output).unwrap(), expected);
/// ```
///
pub fn json_to_samplesheet<R: Read, W: Write>(
    conn_in: &mut R,
    conn_out: &mut W,
) -> Result<(), E> {
    let samplesheet = Parser::with_format(conn_in, Format::Json)?.read_samplesheet()?;
    print_samplesheet(&samplesheet, Format::Text, conn_out)
}

/// Convert RunInfo.xml to JSON.
///
/// The bulky `RunInfo.Run.FlowcellLayout` element is left out unless
/// `keep_flowcell_layout` is set. The JSON is indented by four spaces.
///
/// ## Usage
///
/// ```rust
/// use v2_samplesheet_maker::run_info_xml_to_json;
/// use std::io::Cursor;
///
/// let input = br#"<?xml version="1.0"?>
/// <RunInfo Version="5">
///     <Run Id="240229_A01052_0184_AHNVH5DMXY" Number="184">
///         <Flowcell>HNVH5DMXY</Flowcell>
///         <FlowcellLayout LaneCount="2" SurfaceCount="2"/>
///     </Run>
/// </RunInfo>"#.to_vec();
///
/// let mut output: Vec<u8> = Vec::new();
/// run_info_xml_to_json(&mut Cursor::new(input), &mut output, false).unwrap();
///
/// let got: serde_json::Value = serde_json::from_slice(&output).unwrap();
/// assert_eq!(got["RunInfo"]["Run"]["Flowcell"], "HNVH5DMXY");
/// assert!(got["RunInfo"]["Run"].get("FlowcellLayout").is_none());
/// ```
///
pub fn run_info_xml_to_json<R: Read, W: Write>(
    conn_in: &mut R,
    conn_out: &mut W,
    keep_flowcell_layout: bool,
) -> Result<(), E> {
    let mut run_info = Parser::with_format(conn_in, Format::Xml)?.read_value()?;
    if !keep_flowcell_layout && run_info::remove_flowcell_layout(&mut run_info) {
        log::debug!("Removed RunInfo.Run.FlowcellLayout");
    }
    conn_out.write_all(&format_json(&run_info, 4)?)?;
    conn_out.flush()?;
    Ok(())
}

/// Convert a RunInfo JSON document to RunInfo.xml.
///
/// If `complete` is set, a minimal document holding only the run id is
/// filled in with [complete_run_info](run_info::complete_run_info).
///
/// ## Usage
///
/// ```rust
/// use v2_samplesheet_maker::run_info_json_to_xml;
/// use std::io::Cursor;
///
/// let input = br#"{"RunInfo": {"@Version": "5", "Run": {"@Id": "my-run", "Flowcell": "HNVH5DMXY"}}}"#.to_vec();
///
/// let mut output: Vec<u8> = Vec::new();
/// run_info_json_to_xml(&mut Cursor::new(input), &mut output, false).unwrap();
///
/// let mut expected = String::new();
/// expected += "<?xml version=\"1.0\" encoding=\"utf-8\"?>\n";
/// expected += "<RunInfo Version=\"5\">\n";
/// expected += "\t<Run Id=\"my-run\">\n";
/// expected += "\t\t<Flowcell>HNVH5DMXY</Flowcell>\n";
/// expected += "\t</Run>\n";
/// expected += "</RunInfo>\n";
///
/// assert_eq!(String::from_utf8(output).unwrap(), expected);
/// ```
///
pub fn run_info_json_to_xml<R: Read, W: Write>(
    conn_in: &mut R,
    conn_out: &mut W,
    complete: bool,
) -> Result<(), E> {
    let mut run_info = Parser::with_format(conn_in, Format::Json)?.read_value()?;
    if complete {
        run_info = run_info::complete_run_info(&run_info)?;
    }
    conn_out.write_all(&format_xml(&run_info)?)?;
    conn_out.flush()?;
    Ok(())
}

/// Create RunInfo.xml from a samplesheet in the text format.
///
/// The read structure comes from the `[Reads]` section and the run fields
/// from `opts`, see [samplesheet_to_run_info](run_info::samplesheet_to_run_info).
///
/// ## Usage
///
/// ```rust
/// use v2_samplesheet_maker::samplesheet_to_run_info_xml;
/// use v2_samplesheet_maker::run_info::RunOptions;
/// use std::io::Cursor;
///
/// let input = b"[Reads]\nRead1Cycles,151\nRead2Cycles,151\nIndex1Cycles,10\n".to_vec();
/// let opts = RunOptions { run_id: "240229_A01052_0184_AHNVH5DMXY".to_string(), ..Default::default() };
///
/// let mut output: Vec<u8> = Vec::new();
/// samplesheet_to_run_info_xml(&mut Cursor::new(input), &mut output, &opts).unwrap();
///
/// let mut expected = String::new();
/// expected += "<?xml version=\"1.0\" encoding=\"utf-8\"?>\n";
/// expected += "<RunInfo Version=\"5\">\n";
/// expected += "\t<Run Id=\"240229_A01052_0184_AHNVH5DMXY\" Number=\"184\">\n";
/// expected += "\t\t<Flowcell>HNVH5DMXY</Flowcell>\n";
/// expected += "\t\t<Instrument>A01052</Instrument>\n";
/// expected += "\t\t<Date>02/29/2024 12:00:00 AM</Date>\n";
/// expected += "\t\t<Reads>\n";
/// expected += "\t\t\t<Read Number=\"1\" NumCycles=\"151\" IsIndexedRead=\"N\"/>\n";
/// expected += "\t\t\t<Read Number=\"2\" NumCycles=\"10\" IsIndexedRead=\"Y\"/>\n";
/// expected += "\t\t\t<Read Number=\"3\" NumCycles=\"151\" IsIndexedRead=\"N\"/>\n";
/// expected += "\t\t</Reads>\n";
/// expected += "\t\t<AlignToPhiX/>\n";
/// expected += "\t\t<ImageDimensions Width=\"3200\" Height=\"3607\"/>\n";
/// expected += "\t\t<ImageChannels>\n";
/// expected += "\t\t\t<Name>RED</Name>\n";
/// expected += "\t\t\t<Name>GREEN</Name>\n";
/// expected += "\t\t</ImageChannels>\n";
/// expected += "\t</Run>\n";
/// expected += "</RunInfo>\n";
///
/// assert_eq!(String::from_utf8(output).unwrap(), expected);
/// ```
///
pub fn samplesheet_to_run_info_xml<R: Read, W: Write>(
    conn_in: &mut R,
    conn_out: &mut W,
    opts: &RunOptions,
) -> Result<(), E> {
    let samplesheet = Parser::with_format(conn_in, Format::Text)?.read_samplesheet()?;
    let run_info = run_info::samplesheet_to_run_info(&samplesheet, opts)?;
    conn_out.write_all(&format_xml(&run_info)?)?;
    conn_out.flush()?;
    Ok(())
}

// Tests
#[cfg(test)]
mod tests {

    #[test]
    fn text_round_trip() {
        use super::{json_to_samplesheet, samplesheet_to_json};
        use std::io::Cursor;

        let mut data = String::new();
        data += "[Header]\nFileFormatVersion,2\nRunName,my-illumina-sequencing-run\nInstrumentPlatform,NovaSeq 6000\n\n";
        data += "[Reads]\nRead1Cycles,151\nRead2Cycles,151\nIndex1Cycles,10\nIndex2Cycles,10\n\n";
        data += "[Sequencing]\nLibraryPrepKits,KitA;KitB\nCustomRead1Primer,false\n\n";
        data += "[BCLConvert_Settings]\nAdapterBehavior,trim\nAdapterRead1,AGATCGGAAGAGCACACGTCTGAACTCCAGTCA\nAdapterStringency,0.9\nOverrideCycles,Y151;I10;I10;Y151\nCreateFastqForIndexReads,true\nFastqCompressionFormat,gzip\nSoftwareVersion,4.2.7\n\n";
        data += "[BCLConvert_Data]\nLane,Sample_ID,index,index2,Sample_Project\n1,MyFirstSample,AAAAAAAAAA,CCCCCCCCCC,Proj\n2,MySecondSample,GGGGGGGGGG,TTTTTTTTTT,Proj\n\n";
        data += "[Cloud_Settings]\nGeneratedVersion,0.0.0\nCloud_Workflow,ica_workflow_1\nBCLConvert_Pipeline,urn:ica:pipeline:abc\n\n";
        data += "[Cloud_Data]\nSample_ID,ProjectName,LibraryName\nMyFirstSample,Proj,MyFirstSample_AAAAAAAAAA_CCCCCCCCCC\nMySecondSample,Proj,MySecondSample_GGGGGGGGGG_TTTTTTTTTT\n";

        let mut json: Vec<u8> = Vec::new();
        samplesheet_to_json(&mut Cursor::new(data.as_bytes().to_vec()), &mut json).unwrap();

        let mut got: Vec<u8> = Vec::new();
        json_to_samplesheet(&mut Cursor::new(json), &mut got).unwrap();

        assert_eq!(String::from_utf8(got).unwrap(), data);
    }

    #[test]
    fn cloud_tso500l_round_trip() {
        use super::{json_to_samplesheet, samplesheet_to_json};
        use std::io::Cursor;

        let mut data = String::new();
        data += "[Cloud_TSO500L_Settings]\nSoftwareVersion,2.5.2\nStartsFromFastq,false\n\n";
        data += "[Cloud_TSO500L_Data]\nSample_ID,Index_ID,Sample_Type,Index,Index2\nS1,UDP0001,DNA,AAAA,TTTT\n\n";
        data += "[Cloud_Settings]\nCloud_Workflow,ica_workflow_1\nCloud_TSO500L_Pipeline,urn:ica:pipeline:tso\n\n";
        data += "[Cloud_Data]\nSample_ID,LibraryName\nS1,S1_AAAA_TTTT\n";

        let mut json: Vec<u8> = Vec::new();
        samplesheet_to_json(&mut Cursor::new(data.as_bytes().to_vec()), &mut json).unwrap();

        let mut got: Vec<u8> = Vec::new();
        json_to_samplesheet(&mut Cursor::new(json), &mut got).unwrap();

        assert_eq!(String::from_utf8(got).unwrap(), data);
    }

    #[test]
    fn invalid_json_input() {
        use super::json_to_samplesheet;
        use crate::parser::MalformedDocumentError;
        use std::io::Cursor;

        let mut output: Vec<u8> = Vec::new();
        let got = json_to_samplesheet(&mut Cursor::new(b"{\"header\": ".to_vec()), &mut output).unwrap_err();

        assert!(got.downcast_ref::<MalformedDocumentError>().is_some());
        assert!(output.is_empty());
    }

    #[test]
    fn run_info_xml_json_round_trip() {
        use super::{run_info_json_to_xml, run_info_xml_to_json};
        use std::io::Cursor;

        let mut data = String::new();
        data += "<?xml version=\"1.0\" encoding=\"utf-8\"?>\n";
        data += "<RunInfo Version=\"5\">\n";
        data += "\t<Run Id=\"240229_A01052_0184_AHNVH5DMXY\" Number=\"184\">\n";
        data += "\t\t<Flowcell>HNVH5DMXY</Flowcell>\n";
        data += "\t\t<Reads>\n";
        data += "\t\t\t<Read Number=\"1\" NumCycles=\"151\" IsIndexedRead=\"N\"/>\n";
        data += "\t\t\t<Read Number=\"2\" NumCycles=\"10\" IsIndexedRead=\"Y\"/>\n";
        data += "\t\t</Reads>\n";
        data += "\t\t<AlignToPhiX/>\n";
        data += "\t</Run>\n";
        data += "</RunInfo>\n";

        let mut json: Vec<u8> = Vec::new();
        run_info_xml_to_json(&mut Cursor::new(data.as_bytes().to_vec()), &mut json, true).unwrap();

        let mut got: Vec<u8> = Vec::new();
        run_info_json_to_xml(&mut Cursor::new(json), &mut got, false).unwrap();

        assert_eq!(String::from_utf8(got).unwrap(), data);
    }
}
