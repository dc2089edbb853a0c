//! The script-visible operation table.
//!
//! Hosts register one function per entry instead of dispatching on names at
//! call time. Entries that exist for both sources share a name, so the stream
//! and buffer libraries line up.

use crate::fixed::FixedFormat;
use crate::scalar::{ScalarFormat, Width};

/// What an operation does, independent of the source it reads from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Scalar(ScalarFormat),
    Fixed(FixedFormat),
    CardinalTable,
    IntegerTable,
    /// Raw bytes as separate return values.
    Bytes,
    /// Raw bytes as one table.
    ByteTable,
    ReadLine,
    GetPosition,
    SetPosition,
    SkipPosition,
}

/// Which source namespaces carry an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Sources {
    Both,
    StreamOnly,
}

impl Sources {
    pub const fn stream(self) -> bool {
        true
    }

    pub const fn buffer(self) -> bool {
        matches!(self, Sources::Both)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OperationSpec {
    pub name: &'static str,
    pub operation: Operation,
    pub sources: Sources,
}

const fn both(name: &'static str, operation: Operation) -> OperationSpec {
    OperationSpec {
        name,
        operation,
        sources: Sources::Both,
    }
}

const fn stream_only(name: &'static str, operation: Operation) -> OperationSpec {
    OperationSpec {
        name,
        operation,
        sources: Sources::StreamOnly,
    }
}

const fn cardinal(width: Width) -> Operation {
    Operation::Scalar(ScalarFormat::cardinal(width))
}

const fn integer(width: Width) -> Operation {
    Operation::Scalar(ScalarFormat::integer(width))
}

const fn cardinal_le(width: Width) -> Operation {
    Operation::Scalar(ScalarFormat::cardinal(width).little_endian())
}

const fn integer_le(width: Width) -> Operation {
    Operation::Scalar(ScalarFormat::integer(width).little_endian())
}

/// Every operation, in registration order.
///
/// Single-byte `le` names decode exactly like their big-endian twins.
pub static OPERATIONS: &[OperationSpec] = &[
    both("readcardinal1", cardinal(Width::One)),
    both("readcardinal2", cardinal(Width::Two)),
    both("readcardinal3", cardinal(Width::Three)),
    both("readcardinal4", cardinal(Width::Four)),
    both("readcardinal1le", cardinal(Width::One)),
    both("readcardinal2le", cardinal_le(Width::Two)),
    both("readcardinal3le", cardinal_le(Width::Three)),
    both("readcardinal4le", cardinal_le(Width::Four)),
    both("readcardinaltable", Operation::CardinalTable),
    both("readinteger1", integer(Width::One)),
    both("readinteger2", integer(Width::Two)),
    both("readinteger3", integer(Width::Three)),
    both("readinteger4", integer(Width::Four)),
    both("readinteger1le", integer(Width::One)),
    both("readinteger2le", integer_le(Width::Two)),
    both("readinteger3le", integer_le(Width::Three)),
    both("readinteger4le", integer_le(Width::Four)),
    both("readintegertable", Operation::IntegerTable),
    both("readfixed2", Operation::Fixed(FixedFormat::Fixed2)),
    both("readfixed4", Operation::Fixed(FixedFormat::Fixed4)),
    both("read2dot14", Operation::Fixed(FixedFormat::TwoDotFourteen)),
    stream_only("setposition", Operation::SetPosition),
    stream_only("getposition", Operation::GetPosition),
    stream_only("skipposition", Operation::SkipPosition),
    both("readbytes", Operation::Bytes),
    both("readbytetable", Operation::ByteTable),
    stream_only("readline", Operation::ReadLine),
];

impl Operation {
    pub fn by_name(name: &str) -> Option<&'static OperationSpec> {
        OPERATIONS.iter().find(|spec| spec.name == name)
    }
}

impl OperationSpec {
    pub fn stream_operations() -> impl Iterator<Item = &'static OperationSpec> {
        OPERATIONS.iter().filter(|spec| spec.sources.stream())
    }

    pub fn buffer_operations() -> impl Iterator<Item = &'static OperationSpec> {
        OPERATIONS.iter().filter(|spec| spec.sources.buffer())
    }
}
