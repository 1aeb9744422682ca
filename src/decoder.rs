use serde::Serialize;

use crate::isa::r16::{self, Format, Reg, Shape, HALT_MNEMONIC, HALT_WORD};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Operands {
    Reg3 { rd: Reg, rm: Reg, rn: Reg },
    RegImm { r: Reg, imm: u8 },
    Rel { disp: i16 },
    MemPair { r: Reg, hi: Reg, lo: Reg },
    Imm { imm: u8 },
    None,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Decoded {
    pub mnemonic: &'static str,
    pub ops: Operands,
}

/// Decode one raw word. Returns `None` for bit patterns outside the opcode
/// table; the caller decides how to render those.
pub fn decode_word(word: u16) -> Option<Decoded> {
    // Sentinel check precedes any field decomposition.
    if word == HALT_WORD {
        return Some(Decoded {
            mnemonic: HALT_MNEMONIC,
            ops: Operands::None,
        });
    }

    match r16::discriminant(word) {
        0b00 => {
            let (fn2, rm, rn, rd, fn3) = r16::unpack_r(word);
            let desc = r16::lookup(Format::R, fn2, fn3)?;
            Some(Decoded {
                mnemonic: desc.mnemonic,
                ops: Operands::Reg3 { rd, rm, rn },
            })
        }
        0b01 => {
            let (imm, r, fn3) = r16::unpack_i(word);
            let desc = r16::lookup(Format::I, 0, fn3)?;
            Some(Decoded {
                mnemonic: desc.mnemonic,
                ops: Operands::RegImm { r, imm },
            })
        }
        0b10 => {
            let (disp11, fn3) = r16::unpack_j(word);
            let desc = r16::lookup(Format::J, 0, fn3)?;
            let ops = match desc.shape {
                Shape::None => Operands::None, // jr carries no displacement
                _ => Operands::Rel {
                    disp: r16::sign_extend_11(disp11),
                },
            };
            Some(Decoded {
                mnemonic: desc.mnemonic,
                ops,
            })
        }
        _ => {
            let fn2 = r16::t_fn2(word);
            let desc = r16::lookup(Format::T, fn2, 0)?;
            let ops = match desc.shape {
                Shape::MemPair => {
                    let (hi, lo, r) = r16::unpack_t_pair(word);
                    Operands::MemPair { r, hi, lo }
                }
                Shape::Imm4 => Operands::Imm {
                    imm: r16::unpack_t_imm(word) as u8,
                },
                _ => Operands::None,
            };
            Some(Decoded {
                mnemonic: desc.mnemonic,
                ops,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn halt_wins_over_t_format_dispatch() {
        let d = decode_word(0xFFFF).unwrap();
        assert_eq!(d.mnemonic, "halt");
        assert_eq!(d.ops, Operands::None);
    }

    #[test]
    fn unmapped_r_pattern_decodes_to_none() {
        // disc=00 with (fn2=11, fn3=111): no table row.
        let word = 0b11 << 14 | 0b111 << 2;
        assert!(decode_word(word).is_none());
    }
}
