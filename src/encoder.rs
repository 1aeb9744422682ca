//! Instruction and data encoding: the label-table pass, the per-mnemonic
//! bit packer, and the sparse data map builder. All field layouts come from
//! the shared table in `isa::r16`.

use std::collections::{BTreeMap, HashMap};

use tracing::debug;

use crate::error::{AsmError, EncodingError};
use crate::isa::r16::{self, Format, Reg, Shape, HALT_MNEMONIC, HALT_WORD, WORD_BYTES};
use crate::literal;
use crate::parser::Entry;

/// Label name -> byte offset within the instruction region.
pub type LabelTable = HashMap<String, u16>;

/// Sparse data map: region-relative address -> byte value.
pub type DataMap = BTreeMap<u32, u8>;

/// Highest valid region-relative data address (64 KiB region).
pub const DATA_REGION_END: u32 = 0xFFFF;

/// Single forward pass over the instruction section. Labels record the
/// running offset; every instruction advances it by one word. Redefining a
/// label is a hard error.
pub fn build_label_table<'a>(
    entries: impl Iterator<Item = &'a Entry>,
) -> Result<LabelTable, AsmError> {
    let mut pc: u16 = 0;
    let mut labels = LabelTable::new();
    for entry in entries {
        match entry {
            Entry::Label(name) => {
                if labels.insert(name.clone(), pc).is_some() {
                    return Err(EncodingError::DuplicateLabel(name.clone()).into());
                }
            }
            Entry::Inst(_) => pc = pc.wrapping_add(WORD_BYTES),
            Entry::Data { .. } => {}
        }
    }
    debug!(labels = labels.len(), "label table built");
    Ok(labels)
}

/// Encode every instruction entry to its little-endian byte pair.
pub fn encode_instr_section<'a>(
    entries: impl Iterator<Item = &'a Entry>,
    labels: &LabelTable,
) -> Result<Vec<u8>, AsmError> {
    let mut out = Vec::new();
    let mut pc: u16 = 0;
    for entry in entries {
        let Entry::Inst(text) = entry else { continue };
        let word = encode_line(text, pc, labels)?;
        out.extend_from_slice(&word.to_le_bytes());
        pc = pc.wrapping_add(WORD_BYTES);
    }
    Ok(out)
}

/// Encode one instruction line at the given byte offset.
pub fn encode_line(line: &str, pc: u16, labels: &LabelTable) -> Result<u16, AsmError> {
    let text = line.replace(',', " ");
    let mut tokens = text.split_whitespace();
    let mnemonic = tokens
        .next()
        .ok_or_else(|| EncodingError::MalformedOperand(line.to_string()))?
        .to_lowercase();
    let args: Vec<&str> = tokens.collect();

    // The sentinel sits outside normal dispatch on both sides.
    if mnemonic == HALT_MNEMONIC {
        expect_args(line, &args, 0)?;
        return Ok(HALT_WORD);
    }

    let desc = r16::by_mnemonic(&mnemonic)
        .ok_or_else(|| EncodingError::UnsupportedInstruction(line.to_string()))?;

    let word = match desc.shape {
        Shape::Reg3 => {
            expect_args(line, &args, 3)?;
            let rd = reg(args[0])?;
            let rm = reg(args[1])?;
            let rn = reg(args[2])?;
            r16::pack_r(desc.fn2, rm, rn, rd, desc.fn3)
        }
        Shape::RegImm => {
            expect_args(line, &args, 2)?;
            let r = reg(args[0])?;
            let imm = int_operand(line, args[1])? as u8;
            r16::pack_i(imm, r, desc.fn3)
        }
        Shape::Rel => {
            expect_args(line, &args, 1)?;
            let to_addr = *labels
                .get(args[0])
                .ok_or_else(|| EncodingError::UndefinedLabel(args[0].to_string()))?;
            r16::pack_j(branch_offset(pc, to_addr)?, desc.fn3)
        }
        Shape::MemPair => {
            expect_args(line, &args, 2)?;
            let r = reg(args[0])?;
            let (hi, lo) = mem_pair(line, args[1])?;
            r16::pack_t_pair(desc.fn2, hi, lo, r)
        }
        Shape::Imm4 => {
            expect_args(line, &args, 1)?;
            let imm = int_operand(line, args[0])? as u16;
            r16::pack_t_imm(desc.fn2, imm)
        }
        Shape::None => {
            expect_args(line, &args, 0)?;
            match desc.format {
                Format::J => r16::pack_j(0, desc.fn3),
                _ => r16::pack_t_bare(desc.fn2),
            }
        }
    };
    Ok(word)
}

/// Word-granularity displacement from the branch instruction to its target,
/// masked to the 11-bit field after an explicit range check.
pub fn branch_offset(from_pc: u16, to_addr: u16) -> Result<u16, AsmError> {
    let offset = (i32::from(to_addr) - i32::from(from_pc)) / 2;
    if !(-1024..1024).contains(&offset) {
        return Err(EncodingError::OffsetOutOfRange(offset).into());
    }
    Ok(offset as u16 & 0x7FF)
}

/// Build the sparse byte map from `addr: value` entries. String constants
/// are laid out byte-by-byte from the entry address; everything else is a
/// single byte. Later entries overwrite earlier ones.
pub fn encode_data_section<'a>(
    entries: impl Iterator<Item = &'a Entry>,
) -> Result<DataMap, AsmError> {
    let mut map = DataMap::new();
    for entry in entries {
        let Entry::Data { addr, value } = entry else {
            continue;
        };
        if let Some(rest) = string_entry(value) {
            let bytes = literal::parse_string(rest)
                .ok_or_else(|| EncodingError::MalformedOperand(value.clone()))?;
            for (i, byte) in bytes.iter().enumerate() {
                place(&mut map, addr.wrapping_add(i as u32), *byte)?;
            }
        } else {
            let v = literal::parse_int(value)
                .ok_or_else(|| EncodingError::MalformedOperand(value.clone()))?;
            place(&mut map, *addr, v as u8)?;
        }
    }
    debug!(bytes = map.len(), "data map built");
    Ok(map)
}

/// `str "…"` / `str '…'` marker; returns the literal part.
fn string_entry(value: &str) -> Option<&str> {
    value
        .strip_prefix("str")
        .filter(|rest| rest.starts_with(char::is_whitespace))
}

fn place(map: &mut DataMap, addr: u32, byte: u8) -> Result<(), AsmError> {
    if addr > DATA_REGION_END {
        return Err(EncodingError::AddressOutOfRange(addr).into());
    }
    map.insert(addr, byte);
    Ok(())
}

fn reg(name: &str) -> Result<Reg, AsmError> {
    Reg::from_name(name).ok_or_else(|| EncodingError::UnknownRegister(name.to_string()).into())
}

fn int_operand(line: &str, text: &str) -> Result<i64, AsmError> {
    literal::parse_int(text).ok_or_else(|| EncodingError::MalformedOperand(line.to_string()).into())
}

/// `[HI:LO]` register-pair operand.
fn mem_pair(line: &str, text: &str) -> Result<(Reg, Reg), AsmError> {
    let malformed = || AsmError::from(EncodingError::MalformedOperand(line.to_string()));
    let inner = text
        .strip_prefix('[')
        .and_then(|t| t.strip_suffix(']'))
        .ok_or_else(malformed)?;
    let (hi, lo) = inner.split_once(':').ok_or_else(malformed)?;
    Ok((reg(hi.trim())?, reg(lo.trim())?))
}

fn expect_args(line: &str, args: &[&str], count: usize) -> Result<(), AsmError> {
    if args.len() == count {
        Ok(())
    } else {
        Err(EncodingError::MalformedOperand(line.to_string()).into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_overwrite_is_last_write_wins() {
        let entries = [
            Entry::Data {
                addr: 4,
                value: "0x11".into(),
            },
            Entry::Data {
                addr: 4,
                value: "0x22".into(),
            },
        ];
        let map = encode_data_section(entries.iter()).unwrap();
        assert_eq!(map.get(&4), Some(&0x22));
    }

    #[test]
    fn data_address_outside_region_is_rejected() {
        let entries = [Entry::Data {
            addr: 0x10000,
            value: "1".into(),
        }];
        let err = encode_data_section(entries.iter()).unwrap_err();
        assert!(matches!(
            err,
            AsmError::Encoding(EncodingError::AddressOutOfRange(0x10000))
        ));
    }
}
