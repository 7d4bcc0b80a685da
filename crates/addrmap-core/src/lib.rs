//! Bus address-space allocation and address-map verification for FPGA
//! platform designs.

/// Address literal codec.
pub mod numeric;
pub use numeric::{
    format_binary, format_hex, parse_binary, parse_decimal, parse_hex, parse_literal,
    parse_literal_or_zero, LiteralError, BINARY_PREFIX, HEX_PREFIX,
};

/// Per-bus interval bookkeeping.
pub mod space;
pub use space::{AddressRange, AddressSpace, BusRangeTable, SpaceError, BUS_DOMAIN_END, BUS_DOMAIN_START};

/// Core instances and the address windows they declare.
pub mod design;
pub use design::{BusInterface, Core, CoreAddressRangeInfo, Parameter};

/// Descriptor provider collaborator.
pub mod descriptor;
pub use descriptor::{DescriptorProvider, ProviderError, StaticDescriptorProvider};

/// Validity-condition collaborator.
pub mod condition;
pub use condition::{AlwaysValid, ConditionError, ConditionEvaluator, ParameterConditionEvaluator};

/// Address-map records and store collaborator.
pub mod record;
pub use record::{
    AddressMap, AddressMapRecord, AddressMapStore, AddressUpdate, RecordKey, StoreError,
};

/// Verifier configuration.
pub mod config;
pub use config::{VerifierConfig, DEFAULT_ADDRESS_DIGITS};

/// Per-window verification results.
pub mod report;
pub use report::{VerificationReport, WindowOutcome, WindowReport};

/// Verification pass orchestration.
pub mod verifier;
pub use verifier::{verify, VerificationError, VerificationSession};

#[cfg(test)]
use proptest as _;
#[cfg(test)]
use rstest as _;
