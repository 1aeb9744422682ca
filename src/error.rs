use thiserror::Error;

/// Top-level error for the assembly pipeline. Any variant aborts the run
/// with no partial output written.
#[derive(Debug, Error)]
pub enum AsmError {
    #[error(transparent)]
    Macro(#[from] MacroError),
    #[error(transparent)]
    Section(#[from] SectionError),
    #[error(transparent)]
    Encoding(#[from] EncodingError),
    #[error(transparent)]
    Image(#[from] ImageError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Error)]
pub enum MacroError {
    #[error("undefined macro: `{0}`")]
    UndefinedMacro(String),
    #[error("macro `{name}` expects {expected} argument(s), got {got}")]
    ArgumentMismatch {
        name: String,
        expected: usize,
        got: usize,
    },
    #[error("malformed macro definition: {0}")]
    MalformedDefinition(String),
}

#[derive(Debug, Error)]
pub enum SectionError {
    #[error("content outside any section: {0}")]
    UnscopedContent(String),
    #[error("unknown section: `{0}`")]
    UnknownSection(String),
    #[error("malformed data entry: {0}")]
    MalformedEntry(String),
}

#[derive(Debug, Error)]
pub enum EncodingError {
    #[error("unsupported instruction: {0}")]
    UnsupportedInstruction(String),
    #[error("unknown register: `{0}`")]
    UnknownRegister(String),
    #[error("undefined label: `{0}`")]
    UndefinedLabel(String),
    #[error("branch offset out of range: {0}")]
    OffsetOutOfRange(i32),
    #[error("duplicate label: `{0}`")]
    DuplicateLabel(String),
    #[error("malformed operand in `{0}`")]
    MalformedOperand(String),
    #[error("data address {0:#07x} outside the 64 KiB data region")]
    AddressOutOfRange(u32),
}

#[derive(Debug, Error)]
pub enum ImageError {
    #[error("input is {len} bytes, larger than the 128 KiB memory image")]
    Oversized { len: usize },
    #[error("instruction stream is {len} bytes, larger than the 64 KiB instruction region")]
    CodeTooLarge { len: usize },
}
