//! Best-effort rendering of a memory image: mnemonic formatting, the
//! instruction-region listing, and the data-region hex/ASCII dump. Nothing
//! here fails on malformed input; undecodable words degrade to a raw
//! `.word` line.

use std::fmt::Write as _;

use serde::Serialize;

use crate::decoder::{decode_word, Decoded, Operands};
use crate::image::{MemoryImage, DATA_BASE, INSTR_BASE, MEMORY_SIZE};

const DATA_ROW_BYTES: usize = 16;

pub fn fmt_decoded(d: &Decoded) -> String {
    match d.ops {
        Operands::Reg3 { rd, rm, rn } => {
            format!("{:<6} {}, {}, {}", d.mnemonic, rd.name(), rm.name(), rn.name())
        }
        Operands::RegImm { r, imm } => {
            format!("{:<6} {}, 0x{:02X}", d.mnemonic, r.name(), imm)
        }
        Operands::Rel { disp } => format!("{:<6} rel {:+}", d.mnemonic, disp),
        Operands::MemPair { r, hi, lo } => {
            format!("{:<6} {}, [{}:{}]", d.mnemonic, r.name(), hi.name(), lo.name())
        }
        Operands::Imm { imm } => format!("{:<6} {}", d.mnemonic, imm),
        Operands::None => d.mnemonic.to_string(),
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct InsnLine {
    pub addr: u32,
    pub word: u16,
    pub text: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct DataRow {
    pub addr: u32,
    pub bytes: Vec<u8>,
    pub ascii: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Listing {
    pub instructions: Vec<InsnLine>,
    pub data_rows: Vec<DataRow>,
}

/// Walk both fixed regions of an image. All-zero words and all-zero data
/// rows are unused memory and are skipped, not rendered.
pub fn disassemble(img: &MemoryImage) -> Listing {
    let mut instructions = Vec::new();
    for addr in (INSTR_BASE..DATA_BASE).step_by(2) {
        let word = img.word(addr);
        if word == 0 {
            continue;
        }
        let text = match decode_word(word) {
            Some(d) => fmt_decoded(&d),
            None => format!(".word 0x{word:04X}"),
        };
        instructions.push(InsnLine {
            addr: addr as u32,
            word,
            text,
        });
    }

    let mut data_rows = Vec::new();
    for addr in (DATA_BASE..MEMORY_SIZE).step_by(DATA_ROW_BYTES) {
        let row = &img.as_bytes()[addr..addr + DATA_ROW_BYTES];
        if row.iter().all(|&b| b == 0) {
            continue;
        }
        let ascii = row
            .iter()
            .map(|&b| if (0x20..=0x7E).contains(&b) { b as char } else { '.' })
            .collect();
        data_rows.push(DataRow {
            addr: addr as u32,
            bytes: row.to_vec(),
            ascii,
        });
    }

    Listing {
        instructions,
        data_rows,
    }
}

pub fn render_text(listing: &Listing) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "===== Instruction Memory =====");
    for line in &listing.instructions {
        let _ = writeln!(
            out,
            "0x{:04X}: {:<20} ; 0x{:04X}, {:016b}",
            line.addr, line.text, line.word, line.word
        );
    }
    let _ = writeln!(out, "\n===== Data Memory (0x10000 ~ 0x1FFFF) =====");
    for row in &listing.data_rows {
        let hex = row
            .bytes
            .iter()
            .map(|b| format!("{b:02X}"))
            .collect::<Vec<_>>()
            .join(" ");
        let _ = writeln!(out, "0x{:05X}: {:<47} ; {}", row.addr, hex, row.ascii);
    }
    out
}
