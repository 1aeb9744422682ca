use pretty_assertions::assert_eq;

use risc16_rs::decoder::{decode_word, Operands};
use risc16_rs::encoder::{branch_offset, encode_line, LabelTable};
use risc16_rs::error::{AsmError, EncodingError};
use risc16_rs::isa::r16::pack_j;

fn labels(pairs: &[(&str, u16)]) -> LabelTable {
    pairs.iter().map(|(n, a)| (n.to_string(), *a)).collect()
}

#[test]
fn backward_jump_encodes_masked_twos_complement() {
    // Label at offset 0, jmp at offset 2: displacement (0 - 2) / 2 = -1.
    let word = encode_line("jmp loop", 2, &labels(&[("loop", 0)])).unwrap();
    assert_eq!(word, 0xFFE2);
    assert_eq!(word.to_le_bytes(), [0xE2, 0xFF]);

    let d = decode_word(word).unwrap();
    assert_eq!(d.mnemonic, "jmp");
    assert_eq!(d.ops, Operands::Rel { disp: -1 });
}

#[test]
fn branch_displacement_round_trips() {
    for (from, to) in [(0u16, 0u16), (0, 2), (2, 0), (100, 4), (4, 100), (0, 2046)] {
        let expected = (i32::from(to) - i32::from(from)) / 2;
        let word = pack_j(branch_offset(from, to).unwrap(), 0b000);
        let d = decode_word(word).unwrap();
        assert_eq!(
            d.ops,
            Operands::Rel {
                disp: expected as i16
            },
            "from {from} to {to}"
        );
    }
}

#[test]
fn offset_boundaries() {
    // -1024 and 1023 encode; 1024 and -1025 are out of range.
    assert_eq!(branch_offset(2048, 0).unwrap(), 0x400);
    assert_eq!(branch_offset(0, 2046).unwrap(), 0x3FF);

    let err = branch_offset(0, 2048).unwrap_err();
    assert!(matches!(
        err,
        AsmError::Encoding(EncodingError::OffsetOutOfRange(1024))
    ));
    let err = branch_offset(2050, 0).unwrap_err();
    assert!(matches!(
        err,
        AsmError::Encoding(EncodingError::OffsetOutOfRange(-1025))
    ));
}

#[test]
fn every_conditional_branch_uses_the_same_offset_field() {
    for mn in ["jmp", "jeq", "jneq", "jgt", "jlt", "jegt", "jelt"] {
        let word = encode_line(&format!("{mn} target"), 0, &labels(&[("target", 8)])).unwrap();
        let d = decode_word(word).unwrap();
        assert_eq!(d.mnemonic, mn);
        assert_eq!(d.ops, Operands::Rel { disp: 4 });
    }
}

#[test]
fn jr_takes_no_target() {
    let word = encode_line("jr", 0, &LabelTable::new()).unwrap();
    let d = decode_word(word).unwrap();
    assert_eq!(d.mnemonic, "jr");
    assert_eq!(d.ops, Operands::None);
}

#[test]
fn undefined_label_is_rejected() {
    let err = encode_line("jmp nowhere", 0, &LabelTable::new()).unwrap_err();
    assert!(matches!(
        err,
        AsmError::Encoding(EncodingError::UndefinedLabel(name)) if name == "nowhere"
    ));
}
