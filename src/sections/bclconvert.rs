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

//! `[BCLConvert_Settings]` and `[BCLConvert_Data]`.
//!
//! See <https://support-docs.illumina.com/SW/dragen_v42/Content/SW/DRAGEN/SampleSheet.htm>
//!
use crate::schema::Field;
use crate::schema::Schema;

pub const ADAPTER_BEHAVIOUR: [&str; 2] = ["trim", "mask"];
pub const FASTQ_COMPRESSION_FORMAT: [&str; 3] = ["gzip", "dragen", "dragen-interleaved"];

pub static SETTINGS_FIELDS: [Field; 18] = [
    Field::one_of("adapter_behavior", "AdapterBehavior", &ADAPTER_BEHAVIOUR),
    Field::string("adapter_read_1", "AdapterRead1"),
    Field::string("adapter_read_2", "AdapterRead2"),
    Field::float("adapter_stringency", "AdapterStringency"),
    Field::integer("barcode_mismatches_index_1", "BarcodeMismatchesIndex1"),
    Field::integer("barcode_mismatches_index_2", "BarcodeMismatchesIndex2"),
    Field::integer("minimum_trimmed_read_length", "MinimumTrimmedReadLength"),
    Field::integer("minimum_adapter_overlap", "MinimumAdapterOverlap"),
    Field::integer("mask_short_reads", "MaskShortReads"),
    Field::string("override_cycles", "OverrideCycles"),
    Field::boolean("trim_umi", "TrimUMI"),
    Field::boolean("create_fastq_for_index_reads", "CreateFastqForIndexReads"),
    Field::boolean("no_lane_splitting", "NoLaneSplitting"),
    Field::one_of("fastq_compression_format", "FastqCompressionFormat", &FASTQ_COMPRESSION_FORMAT),
    Field::boolean("find_adapters_with_indels", "FindAdaptersWithIndels"),
    Field::list("independent_index_collision_check", "IndependentIndexCollisionCheck"),
    // Required when auto-launching in the cloud
    Field::string("software_version", "SoftwareVersion"),
    // Written to [Cloud_Settings] as BCLConvert_Pipeline
    Field::string("urn", "Urn").hidden(),
];
pub static SETTINGS_SCHEMA: Schema = Schema { fields: &SETTINGS_FIELDS };

pub static DATA_FIELDS: [Field; 15] = [
    Field::integer("lane", "Lane"),
    Field::string("sample_id", "Sample_ID").required(),
    Field::string("index", "index"),
    Field::string("index2", "index2"),
    Field::string("sample_project", "Sample_Project"),
    Field::string("sample_name", "Sample_Name"),
    // Per sample settings
    Field::string("override_cycles", "OverrideCycles"),
    Field::integer("barcode_mismatches_index_1", "BarcodeMismatchesIndex1"),
    Field::integer("barcode_mismatches_index_2", "BarcodeMismatchesIndex2"),
    Field::string("adapter_read_1", "AdapterRead1"),
    Field::string("adapter_read_2", "AdapterRead2"),
    Field::one_of("adapter_behavior", "AdapterBehavior", &ADAPTER_BEHAVIOUR),
    Field::float("adapter_stringency", "AdapterStringency"),
    // Only used to fill in [Cloud_Data]
    Field::string("library_prep_kit_name", "LibraryPrepKitName").hidden(),
    Field::string("index_adapter_kit_name", "IndexAdapterKitName").hidden(),
];
pub static DATA_SCHEMA: Schema = Schema { fields: &DATA_FIELDS };

// Rows keep the order they were given in.
pub const DATA_SORT_BY: [&str; 0] = [];
