//! Translation catalog engine for RustLinguist.
//!
//! The crate covers the full life of a TS catalog: parsing and serializing
//! the textual format, point lookups with CLDR plural selection and `%N`
//! placeholder substitution at runtime, and reconciling a catalog against a
//! fresh scan of the host sources so translator work survives extraction
//! runs. Catalogs are immutable once built; language switches publish a new
//! store instead of mutating the shared one.

pub mod message;
pub mod placeholder;
pub mod plurals;
pub mod reconcile;
pub mod store;
pub mod translator;
pub mod tsfile;

pub use message::{Location, Message, MessageStatus, Translation};
pub use placeholder::substitute;
pub use plurals::{PluralError, PluralRuleSet};
pub use reconcile::{reconcile, Occurrence};
pub use store::{Catalog, CatalogError, MessageKey, TsContext};
pub use translator::{CatalogStats, TranslateError, Translator};
pub use tsfile::{parse, serialize, TsParseError};
