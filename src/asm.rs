//! The assembly pipeline: source text in, 128 KiB memory image out. Each
//! stage consumes the previous stage's output; any error aborts the run
//! with nothing written.

use std::path::Path;

use tracing::debug;

use crate::encoder;
use crate::error::AsmError;
use crate::image::MemoryImage;
use crate::parser;
use crate::preprocess;

pub fn assemble(source: &str) -> Result<MemoryImage, AsmError> {
    let lines: Vec<&str> = source.lines().collect();
    let expanded = preprocess::preprocess(&lines)?;
    let unit = parser::parse(&expanded)?;
    if let Some(entry) = &unit.entry_point {
        debug!(%entry, "entry point");
    }

    let labels = encoder::build_label_table(unit.instr_entries())?;
    let code = encoder::encode_instr_section(unit.instr_entries(), &labels)?;
    let data = encoder::encode_data_section(unit.data_entries())?;
    debug!(
        code_bytes = code.len(),
        data_bytes = data.len(),
        "sections encoded"
    );

    MemoryImage::compose(&code, &data)
}

pub fn assemble_file(path: &Path) -> Result<MemoryImage, AsmError> {
    let source = std::fs::read_to_string(path)?;
    assemble(&source)
}
