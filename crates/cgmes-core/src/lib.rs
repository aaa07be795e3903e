//! # cgmes-core: CGMES Model Resolution
//!
//! Domain types and the in-memory model facade for Common Grid Model Exchange
//! Standard (CGMES) data. Everything here works on records that have already
//! been extracted from RDF/XML; reading files and archives is the job of
//! `cgmes-io`.
//!
//! ## Design Philosophy
//!
//! A CGMES model is split over several files, one per **subset**:
//! - **EQ**: equipment and its containment hierarchy
//! - **TP**: bus-branch topology (topological nodes)
//! - **SSH / SV**: steady-state hypothesis and solved state
//! - **EQ_BD / TP_BD**: boundary data shared between operators
//!
//! Records of every subset are exposed through the [`RecordQuery`] seam as
//! loosely typed [`PropertyBag`]s. The [`CgmesModel`] facade turns them into
//! typed views:
//! - Terminals with their node, voltage level and substation resolved
//! - Node and container maps
//! - Transformer ends grouped per transformer, with the controlling tap changer
//! - Base voltages
//!
//! Views are computed lazily, once, and are safe to read from many threads.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use cgmes_core::*;
//!
//! let records = InMemoryRecords::new().with(
//!     CgmesSubset::Equipment,
//!     names::TERMINAL,
//!     vec![PropertyBag::new()
//!         .with("Terminal", PropertyValue::id("#_T1"))
//!         .with("ConductingEquipment", PropertyValue::id("#_L1"))],
//! );
//!
//! let model = CgmesModel::new(records, ModelConfig::default());
//! let terminal = model.terminal_for_equipment("_L1")?.expect("terminal");
//! assert_eq!(terminal.id(), "_T1");
//! # Ok::<(), CgmesError>(())
//! ```
//!
//! ## Terminal Consistency
//!
//! Topology fields of a [`CgmesTerminal`] are write-once. A later assignment
//! that disagrees with an earlier one is rejected under
//! [`ConsistencyPolicy::Strict`] (the default) or logged and ignored under
//! [`ConsistencyPolicy::Warn`].
//!
//! ## Modules
//!
//! - [`subset`] - Subset classification of file names
//! - [`namespace`] - CIM versions, namespaces and profile URIs
//! - [`model`] - The model facade and its derived views
//! - [`metadata`] - Per-file `FullModel` headers

pub mod container;
pub mod error;
pub mod metadata;
pub mod model;
pub mod names;
pub mod namespace;
pub mod power_flow;
pub mod record;
pub mod subset;
pub mod terminal;
pub mod winding;

pub use container::CgmesContainer;
pub use error::{CgmesError, CgmesResult};
pub use metadata::CgmesMetadataModel;
pub use model::{CgmesModel, ModelConfig};
pub use power_flow::PowerFlow;
pub use record::{InMemoryRecords, PropertyBag, PropertyBags, PropertyValue, RecordQuery};
pub use subset::CgmesSubset;
pub use terminal::{CgmesTerminal, ConsistencyPolicy};
pub use winding::WindingType;
